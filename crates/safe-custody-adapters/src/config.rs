use serde::{Deserialize, Serialize};

use safe_custody_core::CustodyError;

use crate::crypto::Ed25519HierarchicalPrivateKey;
use crate::hashing::SafeUtilsHashingAdapter;

/// `m/44'/501'/0'/0'`, hardening applied at derivation time.
pub const DEFAULT_DERIVATION_PATH: [u32; 4] = [44, 501, 0, 0];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustodyAdapterConfig {
    pub safe_version: String,
    pub derivation_path: Vec<u32>,
}

impl Default for CustodyAdapterConfig {
    fn default() -> Self {
        Self {
            safe_version: "1.3.0".to_owned(),
            derivation_path: DEFAULT_DERIVATION_PATH.to_vec(),
        }
    }
}

impl CustodyAdapterConfig {
    pub fn hasher(&self) -> SafeUtilsHashingAdapter {
        SafeUtilsHashingAdapter::new(self.safe_version.clone())
    }

    pub fn derive_key(&self, seed: &[u8]) -> Result<Ed25519HierarchicalPrivateKey, CustodyError> {
        Ed25519HierarchicalPrivateKey::derive_path(seed, &self.derivation_path)
    }
}
