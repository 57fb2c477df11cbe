mod common;

use proptest::prelude::*;
use safe_custody_adapters::{
    codec, seed_from_phrase, verify_with_public_key, CustodyAdapterConfig,
    Ed25519HierarchicalPrivateKey,
};
use safe_custody_core::SignerPort;

use common::{unhex32, vector_1_seed};

#[test]
fn master_key_matches_vector_1() {
    let key = Ed25519HierarchicalPrivateKey::master_from_seed(&vector_1_seed()).expect("master");
    assert_eq!(
        *key.private_key_bytes(),
        unhex32("2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7")
    );
    assert_eq!(
        *key.chain_code(),
        unhex32("90046a93de5380a72b5e45010748567d5ea02bbf6522f979e05c0d8d8ca9fffb")
    );
    assert_eq!(
        key.public_key_bytes(),
        unhex32("a4b2856bfec510abab89753fac1ac0e1112364e7d250545963f135f2a33188ed")
    );
}

#[test]
fn first_hardened_child_matches_vector_1() {
    let key = Ed25519HierarchicalPrivateKey::derive_path(&vector_1_seed(), &[0]).expect("m/0'");
    assert_eq!(
        *key.private_key_bytes(),
        unhex32("68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3")
    );
    assert_eq!(
        *key.chain_code(),
        unhex32("8b59aa11380b624e81507a27fedda59fea6d0b779a778918a2fd3590e16e9c69")
    );
}

#[test]
fn root_seed_uses_custody_path() {
    let seed = vector_1_seed();
    let from_root = Ed25519HierarchicalPrivateKey::from_root_seed(&seed).expect("root");
    let explicit =
        Ed25519HierarchicalPrivateKey::derive_path(&seed, &[44, 501, 0, 0]).expect("explicit");
    let configured = CustodyAdapterConfig::default()
        .derive_key(&seed)
        .expect("configured");
    assert_eq!(from_root.private_key_bytes(), explicit.private_key_bytes());
    assert_eq!(from_root.public_key_bytes(), configured.public_key_bytes());
    assert_ne!(
        from_root.public_key_bytes(),
        Ed25519HierarchicalPrivateKey::derive_path(&seed, &[44, 501, 0, 1])
            .expect("sibling")
            .public_key_bytes()
    );
}

#[test]
fn mnemonic_seed_matches_bip39_vector() {
    let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    let seed = seed_from_phrase(phrase, "TREZOR");
    assert_eq!(
        codec::to_hex(&seed[..]),
        "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
    );
}

#[test]
fn signer_port_round_trip() {
    let key = Ed25519HierarchicalPrivateKey::from_root_seed(&vector_1_seed()).expect("key");
    let signature = key.sign_payload(b"recovery payload").expect("sign");
    assert_eq!(signature.len(), 64);
    assert!(key.verify_payload(b"recovery payload", &signature));
    assert!(verify_with_public_key(&key.public_key(), b"recovery payload", &signature));
    assert!(!key.verify_payload(b"other payload", &signature));

    let encoded = codec::from_base58(&key.public_key_base58()).expect("base58");
    assert_eq!(encoded, key.public_key());
}

proptest! {
    #[test]
    fn tampered_signatures_fail(
        seed in proptest::collection::vec(any::<u8>(), 16..64),
        payload in proptest::collection::vec(any::<u8>(), 0..128),
        flip in 0usize..64,
    ) {
        let key = Ed25519HierarchicalPrivateKey::from_root_seed(&seed).expect("key");
        let mut signature = key.sign_data(&payload).expect("sign");
        prop_assert!(key.verify_signature(&payload, &signature));
        signature[flip] ^= 0x01;
        prop_assert!(!key.verify_signature(&payload, &signature));
    }

    #[test]
    fn tampered_data_fails(
        seed in proptest::collection::vec(any::<u8>(), 16..64),
        payload in proptest::collection::vec(any::<u8>(), 1..128),
        flip in any::<usize>(),
    ) {
        let key = Ed25519HierarchicalPrivateKey::from_root_seed(&seed).expect("key");
        let signature = key.sign_data(&payload).expect("sign");
        let mut tampered = payload.clone();
        tampered[flip % payload.len()] ^= 0x01;
        prop_assert!(key.verify_signature(&payload, &signature));
        prop_assert!(!key.verify_signature(&tampered, &signature));
    }

    #[test]
    fn derivation_is_deterministic(
        seed in proptest::collection::vec(any::<u8>(), 16..64),
        path in proptest::collection::vec(0u32..1_000, 0..5),
    ) {
        let a = Ed25519HierarchicalPrivateKey::derive_path(&seed, &path).expect("a");
        let b = Ed25519HierarchicalPrivateKey::derive_path(&seed, &path).expect("b");
        prop_assert_eq!(a.private_key_bytes(), b.private_key_bytes());
        prop_assert_eq!(a.chain_code(), b.chain_code());
    }
}
