use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints outside the protected prefix. The edge gate lets these through
/// untouched.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check; returns "ok".
        .route("/health", get(handlers::health))
        // GET /login?redirect=...
        // Where the gate sends requests that carry no session evidence.
        .route("/login", get(handlers::login_page))
        // GET /session
        // What the gate sees for this request; no backend call.
        .route("/session", get(handlers::session_status))
}
