#![allow(dead_code)]

use alloy::primitives::{hex, Address};

/// SLIP-10 test vector 1 seed.
pub const VECTOR_1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

pub fn vector_1_seed() -> Vec<u8> {
    hex::decode(VECTOR_1_SEED).expect("valid seed hex")
}

pub fn safe_address() -> Address {
    "0x000000000000000000000000000000000000beef"
        .parse()
        .expect("valid safe address")
}

pub fn unhex32(raw: &str) -> [u8; 32] {
    let bytes = hex::decode(raw).expect("valid hex");
    bytes.try_into().expect("32 bytes")
}
