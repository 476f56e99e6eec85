pub mod claims;
pub mod config;
pub mod cookies;
pub mod error;
pub mod gate;
pub mod token;
pub mod verify;

pub use claims::{decode_claims, extract_claim};
pub use config::{ConfigError, DirConfig, Setting, VerifyMode};
pub use error::{AuthError, AuthResult};
pub use gate::{evaluate, GATE_HANDLER, VERDICT_CONTENT_TYPE};
pub use token::TokenParts;
pub use verify::{authenticate, verify_compact, verify_parts, verify_raw, Verdict};
