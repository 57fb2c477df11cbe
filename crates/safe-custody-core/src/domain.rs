use std::fmt;

use alloy::primitives::{hex, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Polygon,
    Bitcoin,
    Offchain,
}

impl Chain {
    /// Chains whose custody lives in a Safe.
    pub fn is_evm(self) -> bool {
        matches!(self, Chain::Ethereum | Chain::Polygon)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Chain::Ethereum => "ethereum",
            Chain::Polygon => "polygon",
            Chain::Bitcoin => "bitcoin",
            Chain::Offchain => "offchain",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    #[default]
    Call,
    DelegateCall,
}

impl Operation {
    pub fn as_u8(self) -> u8 {
        match self {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        }
    }
}

/// The nine SafeTx fields plus nonce, as signed by Safe owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTxRequest {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: U256,
}

impl SafeTxRequest {
    /// Zero value, zero gas refund parameters.
    pub fn new(to: Address, data: Bytes, operation: Operation, nonce: u64) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data,
            operation,
            safe_tx_gas: U256::ZERO,
            base_gas: U256::ZERO,
            gas_price: U256::ZERO,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce: U256::from(nonce),
        }
    }
}

/// A named whitelist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmDestination {
    pub name: String,
    pub address: Address,
}

impl EvmDestination {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    /// First 12 bytes of SHA-256(name).
    pub fn name_hash_bytes(&self) -> [u8; 12] {
        let digest = Sha256::digest(self.name.as_bytes());
        let mut out = [0u8; 12];
        out.copy_from_slice(&digest[..12]);
        out
    }

    pub fn name_hash(&self) -> String {
        hex::encode(self.name_hash_bytes())
    }

    pub fn name_hash_and_address(&self) -> String {
        format!("{}{}", self.name_hash(), hex::encode(self.address.as_slice()))
    }
}

/// One 32-byte word of a guard whitelist update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhitelistInstruction(pub B256);

impl WhitelistInstruction {
    pub fn add(destination: &EvmDestination) -> Self {
        let mut word = [0u8; 32];
        word[..12].copy_from_slice(&destination.name_hash_bytes());
        word[12..].copy_from_slice(destination.address.as_slice());
        Self(B256::from(word))
    }

    /// Removes `count` consecutive entries following `prev`.
    pub fn remove_run(count: u64, prev: Address) -> Self {
        let mut word = [0u8; 32];
        word[4..12].copy_from_slice(&count.to_be_bytes());
        word[12..].copy_from_slice(prev.as_slice());
        Self(B256::from(word))
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0.as_slice())
    }
}

impl fmt::Display for WhitelistInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistSettings {
    pub whitelist_enabled: bool,
    pub dapps_enabled: bool,
}

impl WhitelistSettings {
    pub const fn new(whitelist_enabled: bool, dapps_enabled: bool) -> Self {
        Self {
            whitelist_enabled,
            dapps_enabled,
        }
    }
}
