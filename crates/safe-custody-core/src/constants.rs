//! Well-known Safe deployment addresses and guard contract names.
//!
//! Defaults are the canonical Safe v1.3.0 deployment. Every field can be
//! overridden from configuration for chains with non-canonical deployments.

use alloy::primitives::{address, b256, hex, Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Head-of-list marker in the Safe owner and guard whitelist linked lists.
pub const SENTINEL_ADDRESS: Address = address!("0000000000000000000000000000000000000001");

/// keccak256("guard_manager.guard.address")
pub const GUARD_STORAGE_SLOT: B256 =
    b256!("4a204f620c8c5ccdca3fd54d003badd85ba500436a431f0cbda4f558c93c34c8");

pub const CENSO_GUARD: &str = "CensoGuard";
pub const CENSO_TRANSFERS_ONLY_GUARD: &str = "CensoTransfersOnlyGuard";
pub const CENSO_WHITELISTING_GUARD: &str = "CensoWhitelistingGuard";
pub const CENSO_TRANSFERS_ONLY_WHITELISTING_GUARD: &str = "CensoTransfersOnlyWhitelistingGuard";

/// Name assumed when the installed guard is not in the address table.
pub const DEFAULT_GUARD_NAME: &str = CENSO_GUARD;

/// A deployed guard contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardContract {
    pub name: String,
    pub address: Address,
}

impl GuardContract {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractTable {
    pub sentinel: Address,
    pub multisend: Address,
    pub multisend_call_only: Address,
    pub safe_singleton: Address,
    pub safe_l2_singleton: Address,
    pub proxy_factory: Address,
    pub sign_message_lib: Address,
    pub guard_storage_slot: B256,
    /// Creation code of the Safe proxy, used for CREATE2 address prediction.
    pub proxy_creation_code: Bytes,
    pub guards: Vec<GuardContract>,
}

/// `GnosisSafeProxy` creation code (Safe v1.3.0, solc 0.7.6), as returned by
/// `GnosisSafeProxyFactory.proxyCreationCode()`.
pub const GNOSIS_SAFE_PROXY_CREATION_CODE: &[u8] = &hex!(
    "608060405234801561001057600080fd5b506040516101e63803806101e683398181016040526020"
    "81101561003357600080fd5b8101908080519060200190929190505050600073ffffffffffffffff"
    "ffffffffffffffffffffffff168173ffffffffffffffffffffffffffffffffffffffff1614156100"
    "ca576040517f08c379a0000000000000000000000000000000000000000000000000000000008152"
    "6004018080602001828103825260228152602001806101c460229139604001915050604051809103"
    "90fd5b806000806101000a81548173ffffffffffffffffffffffffffffffffffffffff0219169083"
    "73ffffffffffffffffffffffffffffffffffffffff1602179055505060ab806101196000396000f3"
    "fe608060405273ffffffffffffffffffffffffffffffffffffffff600054167fa619486e00000000"
    "00000000000000000000000000000000000000000000000060003514156050578060005260206000"
    "f35b3660008037600080366000845af43d6000803e60008114156070573d6000fd5b3d6000f3fea2"
    "646970667358221220d1429297349653a4918076d650332de1a1068c5f3e07c5c82360c277770b95"
    "5264736f6c63430007060033496e76616c69642073696e676c65746f6e2061646472657373207072"
    "6f7669646564"
);

impl Default for ContractTable {
    fn default() -> Self {
        Self {
            sentinel: SENTINEL_ADDRESS,
            multisend: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
            multisend_call_only: address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D"),
            safe_singleton: address!("d9Db270c1B5E3Bd161E8c8503c55cEABeE709552"),
            safe_l2_singleton: address!("3E5c63644E683549055b9Be8653de26E0B4CD36E"),
            proxy_factory: address!("a6B71E26C5e0845f74c812102Ca7114b6a896AB2"),
            sign_message_lib: address!("A65387F16B013cf2Af4605Ad8aA5ec25a2cbA3a2"),
            guard_storage_slot: GUARD_STORAGE_SLOT,
            proxy_creation_code: Bytes::from_static(GNOSIS_SAFE_PROXY_CREATION_CODE),
            guards: Vec::new(),
        }
    }
}

impl ContractTable {
    pub fn guard_address(&self, name: &str) -> Option<Address> {
        self.guards
            .iter()
            .find(|guard| guard.name == name)
            .map(|guard| guard.address)
    }

    pub fn guard_name(&self, address: Address) -> Option<&str> {
        self.guards
            .iter()
            .find(|guard| guard.address == address)
            .map(|guard| guard.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::keccak256;

    #[test]
    fn guard_storage_slot_matches_keccak() {
        assert_eq!(keccak256("guard_manager.guard.address"), GUARD_STORAGE_SLOT);
    }

    #[test]
    fn sentinel_is_address_one() {
        let mut expected = [0u8; 20];
        expected[19] = 1;
        assert_eq!(SENTINEL_ADDRESS.as_slice(), &expected);
    }

    #[test]
    fn table_deserializes_partial_overrides() {
        let json = r#"{
            "guards": [{"name": "CensoGuard", "address": "0x00000000000000000000000000000000000000c1"}]
        }"#;
        let table: ContractTable = serde_json::from_str(json).expect("table");
        assert_eq!(table.multisend, ContractTable::default().multisend);
        assert_eq!(
            table.guard_address(CENSO_GUARD),
            Some(address!("00000000000000000000000000000000000000c1"))
        );
        assert_eq!(
            table.guard_name(address!("00000000000000000000000000000000000000c1")),
            Some(CENSO_GUARD)
        );
    }
}
