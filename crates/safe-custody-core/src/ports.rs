use alloy::primitives::{Address, B256};
use thiserror::Error;

use crate::domain::{Chain, SafeTxRequest};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    #[error("invariant violation: {0}")]
    Invariant(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unknown guard name: {0}")]
    UnknownGuard(String),
    #[error("signature self-verification failed: {0}")]
    SelfVerification(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("missing signing data for chain {0}")]
    MissingSigningData(Chain),
}

/// Computes the EIP-712 hash a Safe expects its owners to sign.
pub trait HashingPort {
    fn safe_tx_hash(
        &self,
        chain_id: u64,
        safe_address: Address,
        tx: &SafeTxRequest,
    ) -> Result<B256, CustodyError>;
}

/// Signs opaque payloads with a key the caller controls.
pub trait SignerPort {
    fn public_key(&self) -> Vec<u8>;
    fn sign_payload(&self, payload: &[u8]) -> Result<Vec<u8>, CustodyError>;
    fn verify_payload(&self, payload: &[u8], signature: &[u8]) -> bool;
}
