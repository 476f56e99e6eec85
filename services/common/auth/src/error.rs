use authnz_crypto::CryptoError;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("token is not in compact serialization")]
    MalformedToken,
    #[error("failed to create verification context: {0}")]
    ContextCreation(String),
    #[error("failed to register verification key: {0}")]
    KeyRegistration(String),
    #[error("token signature does not match")]
    SignatureMismatch,
    #[error("authentication cookie missing")]
    CookieAbsent,
    #[error("request is not routed to the authentication handler")]
    HandlerNotApplicable,
    #[error("claims segment is not valid base64url: {0}")]
    InvalidEncoding(String),
    #[error("claims segment is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("claims segment is not a JSON object")]
    ClaimsNotObject,
    #[error("claim '{0}' missing")]
    ClaimMissing(String),
    #[error("claim '{0}' is not a string")]
    ClaimNotString(String),
}

impl AuthError {
    /// Stable label for diagnostics. Never sent to the client.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MalformedToken => "malformed_token",
            AuthError::ContextCreation(_) => "context_creation",
            AuthError::KeyRegistration(_) => "key_registration",
            AuthError::SignatureMismatch => "signature_mismatch",
            AuthError::CookieAbsent => "cookie_absent",
            AuthError::HandlerNotApplicable => "handler_not_applicable",
            AuthError::InvalidEncoding(_) => "invalid_encoding",
            AuthError::InvalidJson(_) => "invalid_json",
            AuthError::ClaimsNotObject => "claims_not_object",
            AuthError::ClaimMissing(_) => "claim_missing",
            AuthError::ClaimNotString(_) => "claim_not_string",
        }
    }

    /// Errors that leave the request to the rest of the pipeline instead of
    /// producing a verdict.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, AuthError::CookieAbsent | AuthError::HandlerNotApplicable)
    }
}

impl From<CryptoError> for AuthError {
    fn from(value: CryptoError) -> Self {
        match value {
            CryptoError::UnsupportedAlgorithm(_) | CryptoError::ContextCreation(_) => {
                Self::ContextCreation(value.to_string())
            }
            CryptoError::KeyRegistration(_) | CryptoError::InvalidMacKey => {
                Self::KeyRegistration(value.to_string())
            }
        }
    }
}
