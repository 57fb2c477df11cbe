//! Text encodings for keys and signatures.

use alloy::primitives::hex;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use safe_custody_core::CustodyError;

pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn from_hex(raw: &str) -> Result<Vec<u8>, CustodyError> {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(stripped).map_err(|e| CustodyError::Validation(format!("invalid hex: {e}")))
}

pub fn to_base58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

pub fn from_base58(raw: &str) -> Result<Vec<u8>, CustodyError> {
    bs58::decode(raw.trim())
        .into_vec()
        .map_err(|e| CustodyError::Validation(format!("invalid base58: {e}")))
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn from_base64(raw: &str) -> Result<Vec<u8>, CustodyError> {
    STANDARD
        .decode(raw.trim())
        .map_err(|e| CustodyError::Validation(format!("invalid base64: {e}")))
}
