//! Org-admin recovery: per-chain Safe transaction hashes plus an offchain
//! digest of the whole request.
//!
//! The recovery contract is a module on the org vault, the org vault a module
//! on each vault, and each vault a module on its wallets. A swap deeper in
//! that chain is reached by nesting `execTransactionFromModule` calls.

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

use crate::calldata::{batch_calls, exec_transaction_from_module_calldata, MultiSendTx};
use crate::constants::ContractTable;
use crate::domain::{Chain, Operation, SafeTxRequest};
use crate::encoding::{canonical_json_bytes, sha256_b256};
use crate::policy::SafeTx;
use crate::ports::{CustodyError, HashingPort, SignerPort};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RecoverySafeTx {
    #[serde(rename_all = "camelCase")]
    OrgVaultSwapOwner { prev: Address },
    #[serde(rename_all = "camelCase")]
    VaultSwapOwner {
        prev: Address,
        vault_safe_address: Address,
    },
    #[serde(rename_all = "camelCase")]
    WalletSwapOwner {
        prev: Address,
        vault_safe_address: Address,
        wallet_safe_address: Address,
    },
}

impl RecoverySafeTx {
    fn prev(&self) -> Address {
        match self {
            RecoverySafeTx::OrgVaultSwapOwner { prev }
            | RecoverySafeTx::VaultSwapOwner { prev, .. }
            | RecoverySafeTx::WalletSwapOwner { prev, .. } => *prev,
        }
    }

    /// Safes from the org vault down to the one whose owner is swapped.
    fn module_path(&self, org_vault: Address) -> Vec<Address> {
        match self {
            RecoverySafeTx::OrgVaultSwapOwner { .. } => vec![org_vault],
            RecoverySafeTx::VaultSwapOwner {
                vault_safe_address, ..
            } => vec![org_vault, *vault_safe_address],
            RecoverySafeTx::WalletSwapOwner {
                vault_safe_address,
                wallet_safe_address,
                ..
            } => vec![org_vault, *vault_safe_address, *wallet_safe_address],
        }
    }

    /// The call the recovery contract makes to perform this swap.
    pub fn call(&self, batch: &RecoveryTxs) -> MultiSendTx {
        let swap = SafeTx::SwapOwner {
            prev: self.prev(),
            old: batch.old_owner_address,
            new: batch.new_owner_address,
        };
        let path = self.module_path(batch.org_vault_safe_address);
        let mut payload = swap.calldata();
        for i in (0..path.len()).rev() {
            let target = path.get(i + 1).copied().unwrap_or(path[i]);
            payload = exec_transaction_from_module_calldata(target, payload, Operation::Call);
        }
        MultiSendTx::call(batch.org_vault_safe_address, payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainPubkey {
    pub chain: Chain,
    pub key: String,
}

/// Recovery swaps for one chain, executed by the recovery contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryTxs {
    pub chain: Chain,
    pub recovery_contract_address: Address,
    pub org_vault_safe_address: Address,
    pub old_owner_address: Address,
    pub new_owner_address: Address,
    pub txs: Vec<RecoverySafeTx>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySigningData {
    pub chain: Chain,
    pub chain_id: u64,
    pub recovery_contract_nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgAdminRecoveryRequest {
    pub device_key: String,
    pub chain_keys: Vec<ChainPubkey>,
    pub recovery_txs: Vec<RecoveryTxs>,
    pub signing_data: Vec<RecoverySigningData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SignableRecoveryData {
    #[serde(rename_all = "camelCase")]
    Evm { chain: Chain, safe_tx_hash: B256 },
    #[serde(rename_all = "camelCase")]
    Offchain { data_to_sign: B256 },
}

impl SignableRecoveryData {
    pub fn chain(&self) -> Chain {
        match self {
            SignableRecoveryData::Evm { chain, .. } => *chain,
            SignableRecoveryData::Offchain { .. } => Chain::Offchain,
        }
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            SignableRecoveryData::Evm { safe_tx_hash, .. } => safe_tx_hash.as_slice(),
            SignableRecoveryData::Offchain { data_to_sign } => data_to_sign.as_slice(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedRecoveryData {
    pub chain: Chain,
    pub signature: Bytes,
}

pub struct RecoveryBuilder<'a, H: HashingPort> {
    hasher: &'a H,
    contracts: &'a ContractTable,
}

impl<'a, H: HashingPort> RecoveryBuilder<'a, H> {
    pub fn new(hasher: &'a H, contracts: &'a ContractTable) -> Self {
        Self { hasher, contracts }
    }

    /// The Safe transaction the recovery contract executes for `batch`.
    pub fn safe_tx_request(
        &self,
        batch: &RecoveryTxs,
        signing: &RecoverySigningData,
    ) -> Result<SafeTxRequest, CustodyError> {
        ensure_evm(batch.chain)?;
        let calls = batch.txs.iter().map(|tx| tx.call(batch)).collect();
        let call = batch_calls(calls, self.contracts)?;
        Ok(SafeTxRequest::new(
            call.to,
            call.data,
            call.operation,
            signing.recovery_contract_nonce,
        ))
    }

    /// One EVM hash per chain batch, then the offchain request digest.
    pub fn signable_data(
        &self,
        request: &OrgAdminRecoveryRequest,
    ) -> Result<Vec<SignableRecoveryData>, CustodyError> {
        let mut out = Vec::with_capacity(request.recovery_txs.len() + 1);
        for batch in &request.recovery_txs {
            ensure_evm(batch.chain)?;
            let signing = request
                .signing_data
                .iter()
                .find(|s| s.chain == batch.chain)
                .ok_or(CustodyError::MissingSigningData(batch.chain))?;
            let tx = self.safe_tx_request(batch, signing)?;
            let safe_tx_hash =
                self.hasher
                    .safe_tx_hash(signing.chain_id, batch.recovery_contract_address, &tx)?;
            tracing::debug!(chain = %batch.chain, swaps = batch.txs.len(), %safe_tx_hash, "recovery hash");
            out.push(SignableRecoveryData::Evm {
                chain: batch.chain,
                safe_tx_hash,
            });
        }
        let data_to_sign = sha256_b256(&canonical_json_bytes(request)?);
        out.push(SignableRecoveryData::Offchain { data_to_sign });
        tracing::info!(signables = out.len(), "built org admin recovery signables");
        Ok(out)
    }
}

fn ensure_evm(chain: Chain) -> Result<(), CustodyError> {
    if !chain.is_evm() {
        return Err(CustodyError::Validation(format!(
            "recovery batch on non-EVM chain {chain}"
        )));
    }
    Ok(())
}

/// Signs every payload, in order.
pub fn sign_signables<S: SignerPort>(
    signer: &S,
    signables: &[SignableRecoveryData],
) -> Result<Vec<SignedRecoveryData>, CustodyError> {
    signables
        .iter()
        .map(|signable| -> Result<SignedRecoveryData, CustodyError> {
            Ok(SignedRecoveryData {
                chain: signable.chain(),
                signature: Bytes::from(signer.sign_payload(signable.payload())?),
            })
        })
        .collect()
}
