use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::DirConfig;
use crate::cookies;
use crate::error::{AuthError, AuthResult};
use crate::verify::{authenticate, Verdict};

/// Handler name a location must be routed to for the gate to engage.
pub const GATE_HANDLER: &str = "jwt-handler";

pub const VERDICT_CONTENT_TYPE: &str = "application/json";

/// Decide what to do with a request.
///
/// `Err` is only ever `HandlerNotApplicable` or `CookieAbsent`, both of
/// which mean the request continues untouched. Once a cookie is found the
/// result is always a verdict.
pub fn evaluate(
    handler: Option<&str>,
    headers: &HeaderMap,
    config: &DirConfig,
) -> AuthResult<Verdict> {
    if handler != Some(GATE_HANDLER) {
        return Err(AuthError::HandlerNotApplicable);
    }

    let token = cookies::lookup(headers, config.cookie_name()).ok_or(AuthError::CookieAbsent)?;
    Ok(authenticate(&token, config))
}

impl IntoResponse for Verdict {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(CONTENT_TYPE, HeaderValue::from_static(VERDICT_CONTENT_TYPE))],
            self.body(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn other_handlers_pass_through() {
        let headers = with_cookie("jwt=abc.def.ghi");
        let config = DirConfig::new().with_key("secret");
        assert_eq!(
            evaluate(None, &headers, &config),
            Err(AuthError::HandlerNotApplicable)
        );
        assert_eq!(
            evaluate(Some("default-handler"), &headers, &config),
            Err(AuthError::HandlerNotApplicable)
        );
    }

    #[test]
    fn missing_cookie_passes_through() {
        let config = DirConfig::new().with_key("secret");
        assert_eq!(
            evaluate(Some(GATE_HANDLER), &HeaderMap::new(), &config),
            Err(AuthError::CookieAbsent)
        );
        assert_eq!(
            evaluate(Some(GATE_HANDLER), &with_cookie("session=abc"), &config),
            Err(AuthError::CookieAbsent)
        );
    }

    #[test]
    fn malformed_token_is_not_authenticated() {
        let config = DirConfig::new().with_key("secret");
        assert_eq!(
            evaluate(Some(GATE_HANDLER), &with_cookie("jwt=not-a-token"), &config),
            Ok(Verdict::NotAuthenticated)
        );
    }

    #[test]
    fn configured_cookie_name_is_used() {
        let config = DirConfig::new().with_key("secret").with_cookie_name("auth");
        assert_eq!(
            evaluate(Some(GATE_HANDLER), &with_cookie("jwt=abc.def.ghi"), &config),
            Err(AuthError::CookieAbsent)
        );
        assert_eq!(
            evaluate(Some(GATE_HANDLER), &with_cookie("auth=abc.def.ghi"), &config),
            Ok(Verdict::NotAuthenticated)
        );
    }

    #[test]
    fn verdict_response_is_plain_body_with_json_type() {
        let response = Verdict::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).expect("content type"),
            VERDICT_CONTENT_TYPE
        );
    }
}
