use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors produced while preparing a verification context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("failed to create verification context: {0}")]
    ContextCreation(String),
    #[error("failed to register key: {0}")]
    KeyRegistration(&'static str),
    #[error("invalid HMAC key")]
    InvalidMacKey,
}

/// Signing algorithms a verification context can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Algorithm {
    Hs256,
}

impl Algorithm {
    /// Identifier as it appears in a token header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Hs256 => "HS256",
        }
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(value: &str) -> CryptoResult<Self> {
        match value {
            "HS256" => Ok(Algorithm::Hs256),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared secret bound to an algorithm. The bytes are wiped when dropped.
#[derive(Clone)]
pub struct KeyMaterial {
    algorithm: Algorithm,
    bytes: Zeroizing<Vec<u8>>,
}

impl KeyMaterial {
    /// Copy `secret` into zeroizing storage bound to `algorithm`.
    pub fn new<B>(algorithm: Algorithm, secret: B) -> Self
    where
        B: AsRef<[u8]>,
    {
        Self {
            algorithm,
            bytes: Zeroizing::new(secret.as_ref().to_vec()),
        }
    }

    /// HS256 key from a literal secret.
    pub fn hs256<B>(secret: B) -> Self
    where
        B: AsRef<[u8]>,
    {
        Self::new(Algorithm::Hs256, secret)
    }

    /// Algorithm the key signs for.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Byte length of the secret.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when no secret bytes are held.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("len", &self.len())
            .field("bytes", &"***redacted***")
            .finish()
    }
}

/// Request-scoped binding of one algorithm to one key.
///
/// The context keeps its own copy of the key so it does not borrow from the
/// configuration that seeded it. That copy is zeroized when the context is
/// dropped, whichever way the caller leaves the scope.
pub struct VerificationContext {
    algorithm: Algorithm,
    key: Option<Zeroizing<Vec<u8>>>,
}

impl VerificationContext {
    /// Create an empty context for the given algorithm identifier.
    pub fn create(algorithm: &str) -> CryptoResult<Self> {
        let algorithm = algorithm
            .parse::<Algorithm>()
            .map_err(|err| CryptoError::ContextCreation(err.to_string()))?;
        Ok(Self {
            algorithm,
            key: None,
        })
    }

    /// Algorithm fixed at creation.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Whether a key has been registered.
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Bind `key` to this context, copying its bytes.
    ///
    /// Fails on an algorithm mismatch, an empty key, or a second key.
    pub fn register_key(&mut self, key: &KeyMaterial) -> CryptoResult<()> {
        if key.algorithm() != self.algorithm {
            return Err(CryptoError::KeyRegistration(
                "key algorithm does not match context",
            ));
        }
        if key.is_empty() {
            return Err(CryptoError::KeyRegistration("key is empty"));
        }
        if self.key.is_some() {
            return Err(CryptoError::KeyRegistration("context already holds a key"));
        }
        self.key = Some(Zeroizing::new(key.as_bytes().to_vec()));
        Ok(())
    }

    /// Check a base64url signature segment against `signing_input`.
    ///
    /// Returns false for a context without a key, an undecodable segment, or
    /// any mismatch. The digest comparison is constant time.
    pub fn verify(&self, signing_input: &[u8], signature: &str) -> bool {
        let key = match &self.key {
            Some(key) => key,
            None => return false,
        };
        let provided = match URL_SAFE_NO_PAD.decode(signature) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let mut mac = match <HmacSha256 as Mac>::new_from_slice(key) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        mac.update(signing_input);
        mac.verify_slice(&provided).is_ok()
    }
}

impl fmt::Debug for VerificationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationContext")
            .field("algorithm", &self.algorithm)
            .field("has_key", &self.has_key())
            .finish()
    }
}

/// Produce the base64url HMAC-SHA256 signature segment for `signing_input`.
pub fn sign(key: &KeyMaterial, signing_input: &[u8]) -> CryptoResult<String> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::InvalidMacKey)?;
    mac.update(signing_input);
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}
