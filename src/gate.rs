use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::form_urlencoded;

use crate::{config::AppConfig, role::admin_route_for_token, session::SessionTokens};

/// GateDecision
///
/// The outcome of running the edge gate over one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Hand the request to the router untouched.
    Allow,
    /// No session evidence; send the user to log in and come back.
    RedirectToLogin { location: String },
    /// Signed in, but outside this role's area.
    RedirectToRole { location: String },
}

impl GateDecision {
    /// Short name recorded on the request span.
    pub fn label(&self) -> &'static str {
        match self {
            GateDecision::Allow => "allow",
            GateDecision::RedirectToLogin { .. } => "login",
            GateDecision::RedirectToRole { .. } => "role",
        }
    }
}

/// True when `path` is `prefix` itself or nested below it. `/administrator` is not
/// under `/admin`.
pub fn is_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// `<login_path>?redirect=<path>`, with the path percent-encoded.
pub fn login_location(login_path: &str, original_path: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(original_path.as_bytes()).collect();
    format!("{login_path}?redirect={encoded}")
}

/// evaluate
///
/// Decides what happens to a request from its path and headers alone.
///
/// 1. Paths outside the protected prefix pass through.
/// 2. No session evidence redirects to the login page with the original path.
/// 3. Otherwise the role route is derived from the access token (sessions backed
///    only by a refresh cookie get the default route).
/// 4. Paths at or below the role route pass through; anything else is sent there.
///
/// Pure and synchronous: no I/O, no state carried between requests.
pub fn evaluate(path: &str, headers: &HeaderMap, config: &AppConfig) -> GateDecision {
    if !is_under(path, &config.admin_prefix) {
        return GateDecision::Allow;
    }

    let tokens = SessionTokens::from_headers(headers, config);
    if !tokens.has_valid_session() {
        return GateDecision::RedirectToLogin {
            location: login_location(&config.login_path, path),
        };
    }

    let role_route = admin_route_for_token(
        &config.admin_prefix,
        tokens.access.as_deref().unwrap_or_default(),
    );
    if is_under(path, &role_route) {
        GateDecision::Allow
    } else {
        GateDecision::RedirectToRole {
            location: role_route,
        }
    }
}

/// edge_gate
///
/// Axum middleware wrapping [`evaluate`]. Installed outermost so it runs before
/// any handler. Redirects are `307 Temporary Redirect`. The decision is recorded
/// on the request span's `gate` field.
pub async fn edge_gate(
    State(config): State<AppConfig>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let decision = evaluate(&path, request.headers(), &config);
    tracing::Span::current().record("gate", decision.label());

    match decision {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectToLogin { location } => {
            tracing::debug!(%path, %location, "no session evidence, redirecting to login");
            Redirect::temporary(&location).into_response()
        }
        GateDecision::RedirectToRole { location } => {
            tracing::debug!(%path, %location, "path outside role area, redirecting");
            Redirect::temporary(&location).into_response()
        }
    }
}
