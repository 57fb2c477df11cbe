//! SLIP-10 hierarchical Ed25519 keys.
//!
//! Only hardened derivation exists for ed25519; every index is hardened
//! before it is mixed into the HMAC input.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::Zeroizing;

use safe_custody_core::{CustodyError, SignerPort};

use crate::codec;

type HmacSha512 = Hmac<Sha512>;

pub const ED25519_SEED_KEY: &[u8] = b"ed25519 seed";
pub const HARDENED_OFFSET: u32 = 0x8000_0000;
pub const SEED_ROUNDS: u32 = 2048;

const SELF_TEST_PAYLOAD: &[u8] = b"safe-custody key self test";

pub struct Ed25519HierarchicalPrivateKey {
    signing_key: SigningKey,
    chain_code: Zeroizing<[u8; 32]>,
}

impl fmt::Debug for Ed25519HierarchicalPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519HierarchicalPrivateKey")
            .field("public_key", &self.public_key_base58())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl Ed25519HierarchicalPrivateKey {
    /// Master key for `seed`, derived down `path` (indices are hardened here).
    pub fn derive_path(seed: &[u8], path: &[u32]) -> Result<Self, CustodyError> {
        let key = path
            .iter()
            .try_fold(Self::master_from_seed(seed)?, |key, index| key.derive_child(*index))?;
        key.self_test()?;
        tracing::debug!(depth = path.len(), public_key = %key.public_key_base58(), "derived ed25519 key");
        Ok(key)
    }

    /// Key at the custody derivation path `m/44'/501'/0'/0'`.
    pub fn from_root_seed(seed: &[u8]) -> Result<Self, CustodyError> {
        Self::derive_path(seed, &crate::config::DEFAULT_DERIVATION_PATH)
    }

    pub fn master_from_seed(seed: &[u8]) -> Result<Self, CustodyError> {
        let digest = hmac_sha512(ED25519_SEED_KEY, &[seed])?;
        Ok(Self::from_digest(&digest))
    }

    fn derive_child(&self, index: u32) -> Result<Self, CustodyError> {
        let hardened = (index | HARDENED_OFFSET).to_be_bytes();
        let digest = hmac_sha512(
            &self.chain_code[..],
            &[&[0u8][..], &self.signing_key.as_bytes()[..], &hardened[..]],
        )?;
        Ok(Self::from_digest(&digest))
    }

    fn from_digest(digest: &[u8; 64]) -> Self {
        let mut secret = Zeroizing::new([0u8; 32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(&digest[..32]);
        chain_code.copy_from_slice(&digest[32..]);
        Self {
            signing_key: SigningKey::from_bytes(&secret),
            chain_code,
        }
    }

    fn self_test(&self) -> Result<(), CustodyError> {
        let signature = self.signing_key.sign(SELF_TEST_PAYLOAD);
        if !self.verify_signature(SELF_TEST_PAYLOAD, &signature.to_bytes()) {
            return Err(CustodyError::SelfVerification(
                "derived key failed sign/verify self test".to_owned(),
            ));
        }
        Ok(())
    }

    /// Signs `data` and re-verifies the signature before handing it out.
    pub fn sign_data(&self, data: &[u8]) -> Result<[u8; 64], CustodyError> {
        let signature = self.signing_key.sign(data).to_bytes();
        if !self.verify_signature(data, &signature) {
            tracing::error!(public_key = %self.public_key_base58(), "signature did not verify");
            return Err(CustodyError::SelfVerification(
                "produced signature does not verify".to_owned(),
            ));
        }
        Ok(signature)
    }

    pub fn verify_signature(&self, data: &[u8], signature: &[u8]) -> bool {
        verify_with_public_key(&self.public_key_bytes(), data, signature)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key().to_bytes()
    }

    pub fn public_key_base58(&self) -> String {
        codec::to_base58(&self.public_key_bytes())
    }

    pub fn chain_code(&self) -> Zeroizing<[u8; 32]> {
        self.chain_code.clone()
    }

    pub fn private_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }
}

impl SignerPort for Ed25519HierarchicalPrivateKey {
    fn public_key(&self) -> Vec<u8> {
        self.public_key_bytes().to_vec()
    }

    fn sign_payload(&self, payload: &[u8]) -> Result<Vec<u8>, CustodyError> {
        Ok(self.sign_data(payload)?.to_vec())
    }

    fn verify_payload(&self, payload: &[u8], signature: &[u8]) -> bool {
        self.verify_signature(payload, signature)
    }
}

/// Verifies an ed25519 signature against a raw 32-byte public key.
/// Malformed keys or signatures verify as `false`.
pub fn verify_with_public_key(public_key: &[u8], data: &[u8], signature: &[u8]) -> bool {
    let Ok(public_key) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(data, &signature).is_ok()
}

/// BIP-39 style seed: PBKDF2-HMAC-SHA512 over the phrase, salted with
/// `"mnemonic" || passphrase`. The phrase is not checked against a wordlist.
pub fn seed_from_phrase(phrase: &str, passphrase: &str) -> Zeroizing<[u8; 64]> {
    let normalized = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));
    let salt = format!("mnemonic{passphrase}");
    let mut seed = Zeroizing::new([0u8; 64]);
    pbkdf2_hmac::<Sha512>(normalized.as_bytes(), salt.as_bytes(), SEED_ROUNDS, &mut seed[..]);
    seed
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>, CustodyError> {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(key)
        .map_err(|e| CustodyError::Validation(format!("hmac init failed: {e}")))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}
