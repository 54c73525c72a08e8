use axum::{
    Json,
    extract::{OriginalUri, Query, State},
    http::{HeaderMap, Uri},
};
use serde::Deserialize;

use crate::{
    config::AppConfig,
    models::{AdminLanding, LoginPrompt, SessionStatus},
    role::admin_route_for_token,
    session::SessionTokens,
    token,
};

/// LoginQuery
///
/// Query parameters accepted by `GET /login`.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LoginQuery {
    /// Path to return to after a successful login, as set by the edge gate.
    pub redirect: Option<String>,
}

/// health
///
/// [Public Route] Liveness check for load balancers.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// login_page
///
/// [Public Route] Entry point the edge gate redirects anonymous users to.
/// Only echoes the return path; credentials are exchanged with the backend directly.
#[utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses((status = 200, description = "Login prompt", body = LoginPrompt))
)]
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginPrompt> {
    // Only same-site paths are echoed back.
    let redirect = query
        .redirect
        .filter(|path| path.starts_with('/') && !path.starts_with("//"));
    Json(LoginPrompt { redirect })
}

/// session_status
///
/// [Public Route] Reports what the edge gate would see for the calling request,
/// plus whether the access token is expired under the configured policy. Lets the
/// UI decide between a silent refresh and a login prompt without a backend call.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Session evidence", body = SessionStatus))
)]
pub async fn session_status(
    State(config): State<AppConfig>,
    headers: HeaderMap,
) -> Json<SessionStatus> {
    let tokens = SessionTokens::from_headers(&headers, &config);
    let access = tokens.access.as_deref().unwrap_or_default();
    let now = token::now_ms();

    Json(SessionStatus {
        has_session: tokens.has_valid_session(),
        access_valid: token::is_valid(access, true, now, config.missing_expiry),
        has_refresh: tokens.refresh.is_some(),
        role_route: admin_route_for_token(&config.admin_prefix, access),
    })
}

fn landing(area: &str, uri: &Uri) -> Json<AdminLanding> {
    Json(AdminLanding {
        area: area.to_string(),
        path: uri.path().to_string(),
    })
}

/// admin_home
///
/// [Admin Route] Landing for admins and super admins, and the default for any role
/// the gate does not recognize.
#[utoipa::path(
    get,
    path = "/admin",
    responses((status = 200, description = "Admin root", body = AdminLanding))
)]
pub async fn admin_home(OriginalUri(uri): OriginalUri) -> Json<AdminLanding> {
    landing("root", &uri)
}

/// [Admin Route] Support agents' area.
#[utoipa::path(
    get,
    path = "/admin/support",
    responses((status = 200, description = "Support area", body = AdminLanding))
)]
pub async fn support_home(OriginalUri(uri): OriginalUri) -> Json<AdminLanding> {
    landing("support", &uri)
}

/// [Admin Route] Developers' area.
#[utoipa::path(
    get,
    path = "/admin/dev",
    responses((status = 200, description = "Developer area", body = AdminLanding))
)]
pub async fn dev_home(OriginalUri(uri): OriginalUri) -> Json<AdminLanding> {
    landing("dev", &uri)
}
