use authnz_crypto::VerificationContext;
use tracing::debug;

use crate::claims::{decode_claims, extract_claim};
use crate::config::{DirConfig, VerifyMode};
use crate::error::{AuthError, AuthResult};
use crate::token::TokenParts;

/// The only algorithm a location can be configured for.
pub const ALGORITHM: &str = "HS256";

pub const BODY_AUTHENTICATED: &str = "Is Authenticated";
pub const BODY_NOT_AUTHENTICATED: &str = "Not Authenticated";

/// Outcome visible to the client. Every failure collapses into
/// `NotAuthenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Authenticated { subject: Option<String> },
    NotAuthenticated,
}

impl Verdict {
    /// True for either authenticated form.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Verdict::Authenticated { .. })
    }

    /// Literal response body for this verdict.
    pub fn body(&self) -> String {
        match self {
            Verdict::Authenticated { subject: Some(subject) } => {
                format!("{subject} is Authenticated")
            }
            Verdict::Authenticated { subject: None } => BODY_AUTHENTICATED.to_string(),
            Verdict::NotAuthenticated => BODY_NOT_AUTHENTICATED.to_string(),
        }
    }
}

fn open_context(config: &DirConfig) -> AuthResult<VerificationContext> {
    let mut context = VerificationContext::create(ALGORITHM)?;
    context.register_key(&config.key_material())?;
    Ok(context)
}

/// Verify the raw cookie value as the verifier receives it.
///
/// The value must hold exactly three non-empty segments; the signing input
/// is the first two as they appear in the token. Claims are not inspected.
pub fn verify_raw(token: &str, config: &DirConfig) -> AuthResult<()> {
    let context = open_context(config)?;

    let (signing_input, signature) = compact_segments(token)?;
    if context.verify(signing_input.as_bytes(), signature) {
        Ok(())
    } else {
        Err(AuthError::SignatureMismatch)
    }
}

/// `(header.claims, signature)` for a value with exactly three non-empty
/// segments.
fn compact_segments(token: &str) -> AuthResult<(&str, &str)> {
    let mut segments = token.split('.');
    let (Some(header), Some(claims), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::MalformedToken);
    };
    if header.is_empty() || claims.is_empty() || signature.is_empty() {
        return Err(AuthError::MalformedToken);
    }

    let signing_input = &token[..header.len() + 1 + claims.len()];
    Ok((signing_input, signature))
}

/// Verify parts produced by the splitter.
pub fn verify_parts(parts: &TokenParts, config: &DirConfig) -> AuthResult<()> {
    let context = open_context(config)?;

    if context.verify(parts.signing_input().as_bytes(), parts.signature()) {
        Ok(())
    } else {
        Err(AuthError::SignatureMismatch)
    }
}

/// Split, verify, then resolve the configured claim. A missing or
/// non-string claim does not revoke a valid signature.
pub fn verify_compact(token: &str, config: &DirConfig) -> AuthResult<Option<String>> {
    let parts = TokenParts::split(token)?;
    verify_parts(&parts, config)?;

    let subject = decode_claims(parts.claims())
        .and_then(|claims| extract_claim(&claims, config.claim_name()));
    match subject {
        Ok(subject) => Ok(Some(subject)),
        Err(err) => {
            debug!(reason = err.kind(), claim = config.claim_name(), "claim unavailable");
            Ok(None)
        }
    }
}

/// Run the configured verify mode and collapse every failure into
/// `NotAuthenticated`.
pub fn authenticate(token: &str, config: &DirConfig) -> Verdict {
    let result = match config.verify_mode() {
        VerifyMode::RawCookie => verify_raw(token, config).map(|()| None),
        VerifyMode::Compact => verify_compact(token, config),
    };

    match result {
        Ok(subject) => Verdict::Authenticated { subject },
        Err(err) => {
            debug!(reason = err.kind(), mode = config.verify_mode().as_str(), "token rejected");
            Verdict::NotAuthenticated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authnz_crypto::{sign, KeyMaterial};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde_json::json;

    const SECRET: &str = "correct horse battery staple";

    fn mint(secret: &str, claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{header}.{payload}");
        let signature =
            sign(&KeyMaterial::hs256(secret), signing_input.as_bytes()).expect("sign");
        format!("{signing_input}.{signature}")
    }

    fn config() -> DirConfig {
        DirConfig::new().with_key(SECRET)
    }

    #[test]
    fn raw_accepts_valid_token() {
        let token = mint(SECRET, json!({ "name": "alice" }));
        assert_eq!(verify_raw(&token, &config()), Ok(()));
        assert_eq!(
            authenticate(&token, &config()),
            Verdict::Authenticated { subject: None }
        );
    }

    #[test]
    fn raw_rejects_wrong_key() {
        let token = mint("another secret", json!({ "name": "alice" }));
        assert_eq!(
            verify_raw(&token, &config()),
            Err(AuthError::SignatureMismatch)
        );
    }

    #[test]
    fn single_byte_signature_change_fails() {
        let token = mint(SECRET, json!({ "name": "alice" }));
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 5;
        bytes[last] = if bytes[last] == b'x' { b'y' } else { b'x' };
        let token = String::from_utf8(bytes).expect("ascii");
        assert_eq!(authenticate(&token, &config()), Verdict::NotAuthenticated);
    }

    #[test]
    fn empty_key_fails_every_token() {
        let unset = DirConfig::new();
        let token = mint("", json!({ "name": "alice" }));
        assert!(matches!(
            verify_raw(&token, &unset),
            Err(AuthError::KeyRegistration(_))
        ));
        assert_eq!(authenticate(&token, &unset), Verdict::NotAuthenticated);
        assert_eq!(authenticate("garbage", &unset), Verdict::NotAuthenticated);
    }

    #[test]
    fn raw_rejects_tokens_without_signing_delimiter() {
        assert_eq!(verify_raw("abc", &config()), Err(AuthError::MalformedToken));
        assert_eq!(verify_raw("abc.def", &config()), Err(AuthError::MalformedToken));
    }

    #[test]
    fn raw_rejects_empty_header_and_claims() {
        let key = KeyMaterial::hs256(SECRET);
        let signature = sign(&key, b".").expect("sign");
        let token = format!("..{signature}");

        assert_eq!(verify_raw(&token, &config()), Err(AuthError::MalformedToken));
        assert_eq!(authenticate(&token, &config()), Verdict::NotAuthenticated);

        for signing_input in ["abc.", ".def"] {
            let signature = sign(&key, signing_input.as_bytes()).expect("sign");
            let token = format!("{signing_input}.{signature}");
            assert_eq!(authenticate(&token, &config()), Verdict::NotAuthenticated);
        }
    }

    #[test]
    fn raw_rejects_extra_segments() {
        let key = KeyMaterial::hs256(SECRET);
        for signing_input in ["a.b.c", "a.b.c.d.e"] {
            let signature = sign(&key, signing_input.as_bytes()).expect("sign");
            let token = format!("{signing_input}.{signature}");
            assert_eq!(
                verify_raw(&token, &config()),
                Err(AuthError::MalformedToken),
                "{token:?} should be rejected"
            );
            assert_eq!(authenticate(&token, &config()), Verdict::NotAuthenticated);
            assert!(verify_compact(&token, &config()).is_err());
        }
    }

    #[test]
    fn raw_rejects_empty_signature() {
        assert_eq!(verify_raw("abc.def.", &config()), Err(AuthError::MalformedToken));
    }

    #[test]
    fn raw_does_not_read_claims() {
        // Signature is valid over a claims segment that is not base64 JSON.
        let key = KeyMaterial::hs256(SECRET);
        let signature = sign(&key, b"hdr.not-json").expect("sign");
        let token = format!("hdr.not-json.{signature}");
        assert_eq!(
            authenticate(&token, &config()),
            Verdict::Authenticated { subject: None }
        );
    }

    #[test]
    fn compact_reports_configured_claim() {
        let token = mint(SECRET, json!({ "name": "alice", "sub": "u-42" }));
        let compact = config().with_verify_mode(VerifyMode::Compact);
        let verdict = authenticate(&token, &compact);
        assert_eq!(
            verdict,
            Verdict::Authenticated {
                subject: Some("alice".into())
            }
        );
        assert_eq!(verdict.body(), "alice is Authenticated");

        let by_sub = compact.with_claim_name("sub");
        assert_eq!(
            verify_compact(&token, &by_sub),
            Ok(Some("u-42".to_string()))
        );
    }

    #[test]
    fn compact_keeps_valid_signature_without_claim() {
        let token = mint(SECRET, json!({ "admin": true }));
        let compact = config().with_verify_mode(VerifyMode::Compact);
        let verdict = authenticate(&token, &compact);
        assert_eq!(verdict, Verdict::Authenticated { subject: None });
        assert_eq!(verdict.body(), BODY_AUTHENTICATED);
    }

    #[test]
    fn compact_rejects_malformed_token() {
        let compact = config().with_verify_mode(VerifyMode::Compact);
        assert_eq!(
            verify_compact("abc..ghi", &compact),
            Err(AuthError::MalformedToken)
        );
        assert_eq!(authenticate("abc", &compact), Verdict::NotAuthenticated);
    }

    #[test]
    fn verdict_bodies() {
        assert_eq!(Verdict::NotAuthenticated.body(), "Not Authenticated");
        assert_eq!(
            Verdict::Authenticated { subject: None }.body(),
            "Is Authenticated"
        );
    }
}
