//! Native EIP-712 hashing of Safe transactions (Safe >= 1.3.0 domain).

use alloy::primitives::{Address, B256, U256};
use alloy::sol;
use alloy::sol_types::{Eip712Domain, SolStruct};

use crate::domain::SafeTxRequest;
use crate::ports::{CustodyError, HashingPort};

sol! {
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }
}

pub fn compute_safe_transaction_hash(
    chain_id: u64,
    safe_address: Address,
    tx: &SafeTxRequest,
) -> B256 {
    let domain = Eip712Domain::new(
        None,
        None,
        Some(U256::from(chain_id)),
        Some(safe_address),
        None,
    );
    let message = SafeTx {
        to: tx.to,
        value: tx.value,
        data: tx.data.clone(),
        operation: tx.operation.as_u8(),
        safeTxGas: tx.safe_tx_gas,
        baseGas: tx.base_gas,
        gasPrice: tx.gas_price,
        gasToken: tx.gas_token,
        refundReceiver: tx.refund_receiver,
        nonce: tx.nonce,
    };
    message.eip712_signing_hash(&domain)
}

/// [`HashingPort`] backed by alloy's EIP-712 implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eip712Hasher;

impl HashingPort for Eip712Hasher {
    fn safe_tx_hash(
        &self,
        chain_id: u64,
        safe_address: Address,
        tx: &SafeTxRequest,
    ) -> Result<B256, CustodyError> {
        Ok(compute_safe_transaction_hash(chain_id, safe_address, tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{keccak256, Bytes};

    use crate::domain::Operation;

    #[test]
    fn struct_type_hash_matches_safe_contract() {
        let expected = keccak256(
            "SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)",
        );
        let message = SafeTx {
            to: Address::ZERO,
            value: U256::ZERO,
            data: Bytes::new(),
            operation: 0,
            safeTxGas: U256::ZERO,
            baseGas: U256::ZERO,
            gasPrice: U256::ZERO,
            gasToken: Address::ZERO,
            refundReceiver: Address::ZERO,
            nonce: U256::ZERO,
        };
        assert_eq!(message.eip712_type_hash(), expected);
    }

    #[test]
    fn hash_commits_to_chain_nonce_and_operation() {
        let safe = Address::repeat_byte(0x5a);
        let tx = SafeTxRequest::new(Address::repeat_byte(0x01), Bytes::new(), Operation::Call, 7);
        let base = compute_safe_transaction_hash(1, safe, &tx);
        assert_eq!(base, compute_safe_transaction_hash(1, safe, &tx));
        assert_ne!(base, compute_safe_transaction_hash(137, safe, &tx));

        let mut other_nonce = tx.clone();
        other_nonce.nonce = U256::from(8);
        assert_ne!(base, compute_safe_transaction_hash(1, safe, &other_nonce));

        let mut delegate = tx;
        delegate.operation = Operation::DelegateCall;
        assert_ne!(base, compute_safe_transaction_hash(1, safe, &delegate));
    }

    #[test]
    fn hash_matches_manual_encoding() {
        let safe = Address::repeat_byte(0x5a);
        let tx = SafeTxRequest::new(
            Address::repeat_byte(0x01),
            Bytes::from(vec![0xde, 0xad]),
            Operation::Call,
            3,
        );

        let domain_type = keccak256("EIP712Domain(uint256 chainId,address verifyingContract)");
        let mut domain = domain_type.to_vec();
        domain.extend_from_slice(&U256::from(5u64).to_be_bytes::<32>());
        domain.extend_from_slice(&[0u8; 12]);
        domain.extend_from_slice(safe.as_slice());
        let domain_separator = keccak256(&domain);

        let type_hash = keccak256(
            "SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)",
        );
        let word = |bytes: &[u8]| {
            let mut w = [0u8; 32];
            w[32 - bytes.len()..].copy_from_slice(bytes);
            w
        };
        let mut message = type_hash.to_vec();
        message.extend_from_slice(&word(tx.to.as_slice()));
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(keccak256(&tx.data).as_slice());
        message.extend_from_slice(&word(&[0]));
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(&word(&[3]));
        let struct_hash = keccak256(&message);

        let mut digest = vec![0x19, 0x01];
        digest.extend_from_slice(domain_separator.as_slice());
        digest.extend_from_slice(struct_hash.as_slice());

        assert_eq!(compute_safe_transaction_hash(5, safe, &tx), keccak256(&digest));
    }
}
