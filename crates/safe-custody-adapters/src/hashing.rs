use alloy::primitives::{hex, Address, B256};

use safe_custody_core::{CustodyError, HashingPort, SafeTxRequest};
use safe_utils::{CallDataHasher, DomainHasher, SafeHasher, SafeWalletVersion, TxMessageHasher};

/// [`HashingPort`] backed by the `safe_utils` hashers, version aware.
#[derive(Debug, Clone)]
pub struct SafeUtilsHashingAdapter {
    pub safe_version: String,
}

impl SafeUtilsHashingAdapter {
    pub fn new(safe_version: impl Into<String>) -> Self {
        Self {
            safe_version: safe_version.into(),
        }
    }
}

impl Default for SafeUtilsHashingAdapter {
    fn default() -> Self {
        Self::new("1.3.0")
    }
}

impl HashingPort for SafeUtilsHashingAdapter {
    fn safe_tx_hash(
        &self,
        chain_id: u64,
        safe_address: Address,
        tx: &SafeTxRequest,
    ) -> Result<B256, CustodyError> {
        let safe_version = SafeWalletVersion::parse(&self.safe_version)
            .map_err(|e| CustodyError::Validation(format!("invalid safeVersion: {e}")))?;

        let data_hash = CallDataHasher::new(hex::encode(&tx.data))
            .hash()
            .map_err(|e| CustodyError::Validation(format!("failed to hash data: {e}")))?;
        let domain_hash = DomainHasher::new(safe_version.clone(), chain_id, safe_address).hash();
        let message_hash = TxMessageHasher::new(
            safe_version,
            tx.to,
            tx.value,
            data_hash,
            tx.operation.as_u8(),
            tx.safe_tx_gas,
            tx.base_gas,
            tx.gas_price,
            tx.gas_token,
            tx.refund_receiver,
            tx.nonce,
        )
        .hash();

        let safe_tx_hash = SafeHasher::new(domain_hash, message_hash).hash();
        tracing::trace!(chain_id, %safe_address, %safe_tx_hash, "safe_utils safe tx hash");
        Ok(safe_tx_hash)
    }
}
