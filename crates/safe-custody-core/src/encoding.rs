//! Address, padding and canonical JSON helpers.

use alloy::primitives::{hex, Address, B256};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ports::CustodyError;

/// Left-pads `bytes` with zeros to `width`.
///
/// A value exactly one byte wider than `width` with a leading zero is a
/// sign-padded integer and loses that byte. Anything else wider is rejected.
pub fn left_pad(bytes: &[u8], width: usize) -> Result<Vec<u8>, CustodyError> {
    let bytes = if bytes.len() == width + 1 && bytes[0] == 0 {
        &bytes[1..]
    } else {
        bytes
    };
    if bytes.len() > width {
        return Err(CustodyError::Validation(format!(
            "value of {} bytes does not fit in {width}",
            bytes.len()
        )));
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(bytes);
    Ok(out)
}

/// Parses a possibly short, long or unprefixed hex string into an address.
pub fn normalize_address(raw: &str) -> Result<Address, CustodyError> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw)
        .trim_start_matches('0');
    let digits = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_owned()
    };
    let bytes = hex::decode(&digits)
        .map_err(|e| CustodyError::Validation(format!("invalid address hex '{raw}': {e}")))?;
    let padded = left_pad(&bytes, 20)
        .map_err(|e| CustodyError::Validation(format!("invalid address '{raw}': {e}")))?;
    Ok(Address::from_slice(&padded))
}

pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CustodyError> {
    let value = serde_json::to_value(value)
        .map_err(|e| CustodyError::Validation(format!("canonical json serialization failed: {e}")))?;
    let normalized = normalize_json(&value);
    serde_json::to_vec(&normalized)
        .map_err(|e| CustodyError::Validation(format!("canonical json serialization failed: {e}")))
}

pub fn sha256_b256(payload: &[u8]) -> B256 {
    B256::from_slice(&Sha256::digest(payload))
}

fn normalize_json(value: &serde_json::Value) -> serde_json::Value {
    use serde_json::{Map, Value};
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            let mut out = Map::with_capacity(keys.len());
            for key in keys {
                if let Some(v) = map.get(key) {
                    out.insert(key.clone(), normalize_json(v));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize_json).collect()),
        _ => value.clone(),
    }
}
