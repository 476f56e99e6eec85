use std::fmt;
use std::str::FromStr;

use authnz_crypto::KeyMaterial;
use thiserror::Error;

pub const DEFAULT_CLAIM_NAME: &str = "name";
pub const DEFAULT_COOKIE_NAME: &str = "jwt";

pub const DIRECTIVE_KEY: &str = "key";
pub const DIRECTIVE_COOKIE_NAME: &str = "cookie-name";
pub const DIRECTIVE_CLAIM_NAME: &str = "claim-name";
pub const DIRECTIVE_VERIFY_MODE: &str = "verify-mode";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown directive '{0}'")]
    UnknownDirective(String),
    #[error("invalid value '{value}' for directive '{directive}'")]
    InvalidValue {
        directive: &'static str,
        value: String,
    },
}

/// A configuration value paired with whether an administrator set it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting<T> {
    value: T,
    is_set: bool,
}

impl<T> Setting<T> {
    /// Default value, not marked as set.
    pub fn default_value(value: T) -> Self {
        Self {
            value,
            is_set: false,
        }
    }

    /// Store an administrator-supplied value.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.is_set = true;
    }

    /// Current value, default or set.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Whether the value came from a directive.
    pub fn is_set(&self) -> bool {
        self.is_set
    }
}

/// How the cookie value is handed to the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    /// The whole cookie value goes to the verifier, which checks the
    /// three-segment shape itself and never reads the claims.
    #[default]
    RawCookie,
    /// The cookie value is split first, the parts are verified, and the
    /// configured claim is reported on success.
    Compact,
}

impl VerifyMode {
    /// Directive argument spelling of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyMode::RawCookie => "raw-cookie",
            VerifyMode::Compact => "compact",
        }
    }
}

impl FromStr for VerifyMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw-cookie" | "raw" => Ok(VerifyMode::RawCookie),
            "compact" => Ok(VerifyMode::Compact),
            _ => Err(ConfigError::InvalidValue {
                directive: DIRECTIVE_VERIFY_MODE,
                value: value.to_string(),
            }),
        }
    }
}

/// Per-location authentication settings.
///
/// Built while configuration loads and read-only afterwards. Nothing is
/// validated here: an empty key is stored as-is and simply makes every
/// verification fail at request time.
#[derive(Clone, PartialEq, Eq)]
pub struct DirConfig {
    claim_name: Setting<String>,
    cookie_name: Setting<String>,
    key: Setting<String>,
    verify_mode: Setting<VerifyMode>,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            claim_name: Setting::default_value(DEFAULT_CLAIM_NAME.to_string()),
            cookie_name: Setting::default_value(DEFAULT_COOKIE_NAME.to_string()),
            key: Setting::default_value(String::new()),
            verify_mode: Setting::default_value(VerifyMode::default()),
        }
    }
}

impl DirConfig {
    /// Defaults: claim `name`, cookie `jwt`, empty key, raw-cookie mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the HS256 shared secret verbatim.
    pub fn set_key(&mut self, arg: &str) {
        self.key.set(arg.to_string());
    }

    /// Store the name of the cookie carrying the token.
    pub fn set_cookie_name(&mut self, arg: &str) {
        self.cookie_name.set(arg.to_string());
    }

    /// Store the claim reported on success in compact mode.
    pub fn set_claim_name(&mut self, arg: &str) {
        self.claim_name.set(arg.to_string());
    }

    /// Parse and store the verify mode.
    pub fn set_verify_mode(&mut self, arg: &str) -> Result<(), ConfigError> {
        let mode = arg.parse::<VerifyMode>()?;
        self.verify_mode.set(mode);
        Ok(())
    }

    /// Apply one `directive argument` pair.
    pub fn apply_directive(&mut self, directive: &str, arg: &str) -> Result<(), ConfigError> {
        match directive {
            DIRECTIVE_KEY => self.set_key(arg),
            DIRECTIVE_COOKIE_NAME => self.set_cookie_name(arg),
            DIRECTIVE_CLAIM_NAME => self.set_claim_name(arg),
            DIRECTIVE_VERIFY_MODE => self.set_verify_mode(arg)?,
            other => return Err(ConfigError::UnknownDirective(other.to_string())),
        }
        Ok(())
    }

    /// Builder form of [`DirConfig::set_key`].
    pub fn with_key(mut self, arg: &str) -> Self {
        self.set_key(arg);
        self
    }

    /// Builder form of [`DirConfig::set_cookie_name`].
    pub fn with_cookie_name(mut self, arg: &str) -> Self {
        self.set_cookie_name(arg);
        self
    }

    /// Builder form of [`DirConfig::set_claim_name`].
    pub fn with_claim_name(mut self, arg: &str) -> Self {
        self.set_claim_name(arg);
        self
    }

    /// Builder form of [`DirConfig::set_verify_mode`].
    pub fn with_verify_mode(mut self, mode: VerifyMode) -> Self {
        self.verify_mode.set(mode);
        self
    }

    /// Claim looked up after a successful compact verification.
    pub fn claim_name(&self) -> &str {
        self.claim_name.value()
    }

    /// Cookie the token is read from.
    pub fn cookie_name(&self) -> &str {
        self.cookie_name.value()
    }

    /// How the cookie value reaches the verifier.
    pub fn verify_mode(&self) -> VerifyMode {
        *self.verify_mode.value()
    }

    /// Byte length of the configured key string.
    pub fn key_length(&self) -> usize {
        self.key.value().len()
    }

    /// Whether `claim-name` was configured.
    pub fn claim_name_is_set(&self) -> bool {
        self.claim_name.is_set()
    }

    /// Whether `cookie-name` was configured.
    pub fn cookie_name_is_set(&self) -> bool {
        self.cookie_name.is_set()
    }

    /// Whether `key` was configured, even to an empty string.
    pub fn key_is_set(&self) -> bool {
        self.key.is_set()
    }

    /// Whether `verify-mode` was configured.
    pub fn verify_mode_is_set(&self) -> bool {
        self.verify_mode.is_set()
    }

    /// HS256 key material built from the literal key string.
    pub fn key_material(&self) -> KeyMaterial {
        KeyMaterial::hs256(self.key.value().as_bytes())
    }
}

impl fmt::Debug for DirConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirConfig")
            .field("claim_name", &self.claim_name)
            .field("cookie_name", &self.cookie_name)
            .field("key_length", &self.key_length())
            .field("key_is_set", &self.key_is_set())
            .field("verify_mode", &self.verify_mode)
            .finish()
    }
}
