use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use cookie::Cookie;

/// Value of the first cookie named `name` across all `cookie` headers.
pub fn lookup(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}
