#![allow(dead_code)]

use alloy::primitives::Address;
use safe_custody_core::Policy;

/// Distinct, lexicographically ordered test addresses: `owner(1) < owner(2)`.
pub fn owner(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0x10;
    bytes[19] = n;
    Address::from(bytes)
}

pub fn policy(owners: &[u8], threshold: u64) -> Policy {
    Policy::new(owners.iter().copied().map(owner).collect(), threshold).expect("valid policy")
}

pub fn safe_address() -> Address {
    "0x000000000000000000000000000000000000beef"
        .parse()
        .expect("valid safe address")
}

pub fn org_vault_address() -> Address {
    "0x00000000000000000000000000000000000000a1"
        .parse()
        .expect("valid org vault address")
}

pub fn recovery_contract_address() -> Address {
    "0x00000000000000000000000000000000000000c0"
        .parse()
        .expect("valid recovery contract address")
}
