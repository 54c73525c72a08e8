use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Landing routes for each admin area, nested under `/admin`. Each area also
/// answers for anything below it, so `/admin/support/tickets` reaches the support
/// landing once the gate has decided the caller belongs there.
///
/// Which caller may see which area is decided by the edge gate from the role
/// claim, not here.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Admins, super admins, and every unrecognized role.
        .route("/", get(handlers::admin_home))
        // GET /admin/support[/...]
        .route("/support", get(handlers::support_home))
        .route("/support/{*rest}", get(handlers::support_home))
        // GET /admin/dev[/...]
        .route("/dev", get(handlers::dev_home))
        .route("/dev/{*rest}", get(handlers::dev_home))
        // Remaining admin pages are served by the UI bundle; answer with the root
        // landing so deep links still resolve.
        .route("/{*rest}", get(handlers::admin_home))
}
