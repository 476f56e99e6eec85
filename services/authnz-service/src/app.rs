use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use authnz_jwt::{AuthError, AuthResult, Verdict};
use tracing::debug;

use crate::config::Locations;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<Locations>,
}

impl AppState {
    pub fn new(locations: Locations) -> Self {
        Self {
            locations: Arc::new(locations),
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Router with the gate in front of everything except `/healthz`.
pub fn build_router(state: AppState) -> Router {
    let gate_state = state.clone();
    Router::new()
        .fallback(not_found)
        .layer(middleware::from_fn(move |request, next| {
            let state = gate_state.clone();
            async move { gate_middleware(state, request, next).await }
        }))
        .route("/healthz", get(health))
}

async fn gate_middleware(state: AppState, request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path();
    let location = state.locations.resolve(path);
    let handler = location.and_then(|location| location.handler.as_deref());

    let outcome = match location {
        Some(location) => authnz_jwt::evaluate(handler, request.headers(), &location.dir),
        None => Err(AuthError::HandlerNotApplicable),
    };

    match gate_verdict(outcome) {
        Some(verdict) => {
            debug!(
                path,
                authenticated = verdict.is_authenticated(),
                "verdict emitted"
            );
            verdict.into_response()
        }
        None => {
            debug!(path, "passing request through");
            next.run(request).await
        }
    }
}

/// `None` lets the request continue; any error that is not a passthrough
/// collapses into `NotAuthenticated`.
fn gate_verdict(outcome: AuthResult<Verdict>) -> Option<Verdict> {
    match outcome {
        Ok(verdict) => Some(verdict),
        Err(reason) if reason.is_passthrough() => {
            debug!(reason = reason.kind(), "gate declined");
            None
        }
        Err(reason) => {
            debug!(reason = reason.kind(), "gate failed");
            Some(Verdict::NotAuthenticated)
        }
    }
}
