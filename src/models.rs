use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// User
///
/// The signed-in user as the backend's `/me` endpoint describes it. Only `id` and
/// `email` are guaranteed; tenants differ on the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// ApiEnvelope
///
/// The `{ success, data }` wrapper every backend response comes in. `data` is
/// optional so that a bare `{ "success": false }` still parses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
}

/// AdminLanding
///
/// Response body for the admin area landing routes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminLanding {
    /// Which admin area this is: "root", "support" or "dev".
    pub area: String,
    /// The path that was requested, including any nested segments.
    pub path: String,
}

/// LoginPrompt
///
/// Response body for `GET /login`. The real login form lives in the UI bundle;
/// this tells it where to send the user afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginPrompt {
    pub redirect: Option<String>,
}

/// SessionStatus
///
/// Response body for `GET /session`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionStatus {
    /// Whether the edge gate would accept this request as signed in.
    pub has_session: bool,
    /// Access token present, decodable and unexpired.
    pub access_valid: bool,
    pub has_refresh: bool,
    /// Admin area the role claim maps to.
    pub role_route: String,
}
