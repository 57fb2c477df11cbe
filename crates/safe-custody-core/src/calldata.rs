//! ABI encoding of Safe management calls and MultiSend batches.

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::constants::ContractTable;
use crate::domain::Operation;
use crate::policy::SafeTx;
use crate::ports::CustodyError;

sol! {
    /// Safe v1.3.0 OwnerManager, GuardManager and ModuleManager entry points
    interface ISafe {
        function swapOwner(address prevOwner, address oldOwner, address newOwner) external;
        function addOwnerWithThreshold(address owner, uint256 _threshold) external;
        function removeOwner(address prevOwner, address owner, uint256 _threshold) external;
        function changeThreshold(uint256 _threshold) external;
        function setGuard(address guard) external;
        function execTransactionFromModule(
            address to,
            uint256 value,
            bytes data,
            uint8 operation
        ) external returns (bool success);
    }

    /// MultiSend batch entry point
    interface IMultiSend {
        /// @param transactions Packed encoding of transactions:
        ///        operation (1 byte) | to (20 bytes) | value (32 bytes) | data length (32 bytes) | data
        function multiSend(bytes transactions) external payable;
    }
}

/// One call inside a MultiSend batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSendTx {
    pub operation: Operation,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl MultiSendTx {
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            operation: Operation::Call,
            to,
            value: U256::ZERO,
            data,
        }
    }
}

/// A single Safe-executable call: where to send it, what, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeCall {
    pub to: Address,
    pub data: Bytes,
    pub operation: Operation,
}

impl SafeTx {
    /// Calldata for the OwnerManager function this transaction maps to.
    pub fn calldata(&self) -> Bytes {
        let encoded = match *self {
            SafeTx::SwapOwner { prev, old, new } => ISafe::swapOwnerCall {
                prevOwner: prev,
                oldOwner: old,
                newOwner: new,
            }
            .abi_encode(),
            SafeTx::AddOwnerWithThreshold { owner, threshold } => {
                ISafe::addOwnerWithThresholdCall {
                    owner,
                    _threshold: U256::from(threshold),
                }
                .abi_encode()
            }
            SafeTx::RemoveOwner {
                prev,
                owner,
                threshold,
            } => ISafe::removeOwnerCall {
                prevOwner: prev,
                owner,
                _threshold: U256::from(threshold),
            }
            .abi_encode(),
            SafeTx::ChangeThreshold { threshold } => ISafe::changeThresholdCall {
                _threshold: U256::from(threshold),
            }
            .abi_encode(),
        };
        Bytes::from(encoded)
    }
}

pub fn set_guard_calldata(guard: Address) -> Bytes {
    Bytes::from(ISafe::setGuardCall { guard }.abi_encode())
}

pub fn exec_transaction_from_module_calldata(
    to: Address,
    data: Bytes,
    operation: Operation,
) -> Bytes {
    Bytes::from(
        ISafe::execTransactionFromModuleCall {
            to,
            value: U256::ZERO,
            data,
            operation: operation.as_u8(),
        }
        .abi_encode(),
    )
}

/// Packs `txs` into the MultiSend byte layout.
pub fn pack_multisend(txs: &[MultiSendTx]) -> Bytes {
    let mut packed = Vec::new();
    for tx in txs {
        packed.push(tx.operation.as_u8());
        packed.extend_from_slice(tx.to.as_slice());
        packed.extend_from_slice(&tx.value.to_be_bytes::<32>());
        packed.extend_from_slice(&U256::from(tx.data.len()).to_be_bytes::<32>());
        packed.extend_from_slice(&tx.data);
    }
    Bytes::from(packed)
}

/// `multiSend(bytes)` calldata wrapping the packed batch.
pub fn encode_multisend(txs: &[MultiSendTx]) -> Bytes {
    Bytes::from(
        IMultiSend::multiSendCall {
            transactions: pack_multisend(txs),
        }
        .abi_encode(),
    )
}

/// Collapses `txs` into one call the Safe executes: a direct call when
/// there is one, a DELEGATECALL into MultiSend otherwise. Management calls
/// never move value.
pub fn batch_calls(txs: Vec<MultiSendTx>, contracts: &ContractTable) -> Result<SafeCall, CustodyError> {
    if txs.iter().any(|tx| tx.value != U256::ZERO) {
        return Err(CustodyError::Validation(
            "value transfers are not supported in management calls".to_owned(),
        ));
    }
    match txs.len() {
        0 => Err(CustodyError::Validation("no transactions to batch".to_owned())),
        1 => {
            let tx = txs.into_iter().next().ok_or_else(|| {
                CustodyError::Invariant("single transaction batch was empty".to_owned())
            })?;
            Ok(SafeCall {
                to: tx.to,
                data: tx.data,
                operation: tx.operation,
            })
        }
        _ => Ok(SafeCall {
            to: contracts.multisend,
            data: encode_multisend(&txs),
            operation: Operation::DelegateCall,
        }),
    }
}

/// The Safe call that applies owner `txs` to `safe_address`.
pub fn policy_update(
    safe_address: Address,
    txs: &[SafeTx],
    contracts: &ContractTable,
) -> Result<SafeCall, CustodyError> {
    batch_calls(
        txs.iter()
            .map(|tx| MultiSendTx::call(safe_address, tx.calldata()))
            .collect(),
        contracts,
    )
}

/// keccak256 of `proxy_creation_code ++ uint256(singleton)`.
pub fn proxy_init_code_hash(contracts: &ContractTable) -> Result<B256, CustodyError> {
    if contracts.proxy_creation_code.is_empty() {
        return Err(CustodyError::Validation(
            "proxy creation code is not configured".to_owned(),
        ));
    }
    let mut deployment = contracts.proxy_creation_code.to_vec();
    deployment.extend_from_slice(&[0u8; 12]);
    deployment.extend_from_slice(contracts.safe_singleton.as_slice());
    Ok(keccak256(&deployment))
}

/// CREATE2 address of a Safe proxy deployed through `createProxyWithNonce`.
pub fn predict_safe_address(
    contracts: &ContractTable,
    initializer: &[u8],
    salt_nonce: U256,
) -> Result<Address, CustodyError> {
    let init_code_hash = proxy_init_code_hash(contracts)?;
    let mut salt_input = keccak256(initializer).to_vec();
    salt_input.extend_from_slice(&salt_nonce.to_be_bytes::<32>());
    let salt = keccak256(&salt_input);
    Ok(contracts.proxy_factory.create2(salt, init_code_hash))
}
