use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Request-time gate: token inspection, session evidence, role routing.
pub mod config;
pub mod gate;
pub mod role;
pub mod session;
pub mod token;

// Client-side session restore and the state it reconciles.
pub mod error;
pub mod restore;
pub mod storage;
pub mod store;

// HTTP surface.
pub mod handlers;
pub mod models;
pub mod routes;
use routes::{admin, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use gate::{GateDecision, edge_gate, evaluate};
pub use restore::{HttpMeClient, MeClient, RestoreOutcome, SessionRestorer};
pub use store::{AuthSnapshot, AuthStore};

/// ApiDoc
///
/// OpenAPI document for the routes this service answers itself, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::login_page, handlers::session_status,
        handlers::admin_home, handlers::support_home, handlers::dev_home,
    ),
    components(
        schemas(
            models::User, models::AdminLanding, models::LoginPrompt, models::SessionStatus,
        )
    ),
    tags(
        (name = "suite-gate", description = "Admin edge gate")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state for every request. The gate is stateless, so this is
/// only the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, wraps them in the edge gate, then adds request-id,
/// tracing and CORS layers around everything.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let public_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes());

    // Landings live wherever the gate protects. A root prefix cannot be nested.
    let base_router = match state.config.admin_prefix.as_str() {
        "/" => public_router.merge(admin::admin_routes()),
        prefix => public_router.nest(prefix, admin::admin_routes()),
    }
    .with_state(state.clone());

    // The gate wraps every route, so no handler runs before it has decided.
    // It sits inside the tracing layers so its redirects are logged with the
    // request id.
    let gated_router = base_router.layer(middleware::from_fn_with_state(
        state.config,
        gate::edge_gate,
    ));

    gated_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span, tagging it with the `x-request-id` set above so
/// every log line for one request can be correlated. `gate` starts empty and is
/// filled by [`gate::edge_gate`] once it has decided.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
        gate = tracing::field::Empty,
    )
}
