use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

use crate::error::{AuthError, AuthResult};

/// Decode a base64url claims segment into JSON.
pub fn decode_claims(segment: &str) -> AuthResult<Value> {
    let raw = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|err| AuthError::InvalidEncoding(err.to_string()))?;
    serde_json::from_slice(&raw).map_err(|err| AuthError::InvalidJson(err.to_string()))
}

/// Look up a string claim by name.
pub fn extract_claim(claims: &Value, name: &str) -> AuthResult<String> {
    let object = claims.as_object().ok_or(AuthError::ClaimsNotObject)?;
    let value = object
        .get(name)
        .ok_or_else(|| AuthError::ClaimMissing(name.to_string()))?;
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| AuthError::ClaimNotString(name.to_string()))
}
