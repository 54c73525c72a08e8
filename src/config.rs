use std::env;

use crate::token::MissingExpiryPolicy;

/// AppConfig
///
/// Holds the gate's entire configuration state. Immutable once loaded and shared
/// with the middleware and handlers through `FromRef`, so every request sees the
/// same prefixes, cookie names and expiry policy.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format and fail-fast rules.
    pub env: Env,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Base URL of the REST backend; `/me` is resolved against it.
    pub api_base_url: String,
    // Path prefix guarded by the edge gate.
    pub admin_prefix: String,
    // Where unauthenticated requests are sent.
    pub login_path: String,
    // Cookie carrying the access token when no bearer header is sent.
    pub access_cookie: String,
    // Cookie whose mere presence counts as session evidence.
    pub refresh_cookie: String,
    // How tokens without an `exp` claim are treated.
    pub missing_expiry: MissingExpiryPolicy,
}

/// Env
///
/// The runtime context. Local gets human-readable logs and lenient defaults,
/// Production gets JSON logs and refuses to start without a backend URL.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Test-safe configuration that needs no environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "0.0.0.0:3000".to_string(),
            api_base_url: "http://localhost:8080/api".to_string(),
            admin_prefix: "/admin".to_string(),
            login_path: "/login".to_string(),
            access_cookie: "auth_token".to_string(),
            refresh_cookie: "refresh_token".to_string(),
            missing_expiry: MissingExpiryPolicy::NeverExpires,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, falling back to the
    /// defaults above for anything optional.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `API_BASE_URL` is not set. The gate itself
    /// never calls the backend, but the restore flow does, and starting a
    /// production instance pointed at localhost is never what anyone wants.
    pub fn load() -> Self {
        let defaults = Self::default();

        let env = match env::var("APP_ENV").unwrap_or_default().as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
        };

        let missing_expiry = match env::var("STRICT_TOKEN_EXPIRY").ok().as_deref() {
            Some("1") | Some("true") => MissingExpiryPolicy::Expired,
            _ => MissingExpiryPolicy::NeverExpires,
        };

        Self {
            env,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            admin_prefix: normalize_prefix(
                &env::var("ADMIN_PREFIX").unwrap_or(defaults.admin_prefix),
            ),
            login_path: env::var("LOGIN_PATH").unwrap_or(defaults.login_path),
            access_cookie: env::var("ACCESS_COOKIE_NAME").unwrap_or(defaults.access_cookie),
            refresh_cookie: env::var("REFRESH_COOKIE_NAME").unwrap_or(defaults.refresh_cookie),
            missing_expiry,
        }
    }
}

// "/admin/" and "admin" both become "/admin".
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
