//! Response decoding - unwrap the encrypted `data` field in place
//!
//! Responses are JSON objects whose `data` field is usually a base64
//! ciphertext string, but some endpoints legitimately return a plain
//! string or a non-string value there. A failed decrypt-then-parse keeps
//! the raw string and logs a warning instead of failing the call; silent
//! swallowing would hide real protocol drift, so the degradation is
//! always observable through tracing.

use crate::crypto::PayloadCipher;
use crate::error::SmartGenError;
use serde_json::Value;
use tracing::warn;

/// Decoded top-level response object.
pub type ResponseMap = serde_json::Map<String, Value>;

/// Conventional name of the encrypted payload field.
pub const PAYLOAD_FIELD: &str = "data";

/// Replace a string `data` field with its decrypted, parsed JSON value.
///
/// All sibling fields pass through untouched, as does a non-string
/// `data`. Failures in the decrypt-then-parse attempt are downgraded to
/// a warning and leave the original string in place.
pub fn decode(mut wrapper: ResponseMap, cipher: &PayloadCipher) -> ResponseMap {
    let raw = match wrapper.get(PAYLOAD_FIELD) {
        Some(Value::String(raw)) => raw.clone(),
        _ => return wrapper,
    };
    match decrypt_payload(&raw, cipher) {
        Ok(parsed) => {
            wrapper.insert(PAYLOAD_FIELD.to_string(), parsed);
        }
        Err(err) => {
            warn!(error = %err, "response payload kept as opaque string");
        }
    }
    wrapper
}

fn decrypt_payload(raw: &str, cipher: &PayloadCipher) -> Result<Value, SmartGenError> {
    let clear = cipher.decrypt(raw)?;
    let parsed = serde_json::from_str(&clear)?;
    Ok(parsed)
}

/// Pull the session token out of a decoded login response.
///
/// Ordered fallback: top-level `token` first, then `token` inside the
/// decoded `data` object. No other locations are tried.
pub fn extract_token(wrapper: &ResponseMap) -> Option<String> {
    if let Some(Value::String(token)) = wrapper.get("token") {
        return Some(token.clone());
    }
    wrapper
        .get(PAYLOAD_FIELD)?
        .get("token")?
        .as_str()
        .map(str::to_owned)
}
