use serial_test::serial;
use std::{env, panic};
use suite_gate::{AppConfig, config::Env, token::MissingExpiryPolicy};

const VARS: [&str; 8] = [
    "APP_ENV",
    "API_BASE_URL",
    "BIND_ADDR",
    "ADMIN_PREFIX",
    "LOGIN_PATH",
    "ACCESS_COOKIE_NAME",
    "REFRESH_COOKIE_NAME",
    "STRICT_TOKEN_EXPIRY",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with `vars` set (and every other gate variable removed), then
/// restores the original environment even if the test panicked.
fn with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    unsafe {
        for (key, original) in originals {
            match original {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn production_requires_backend_url() {
    let result = with_env(&[("APP_ENV", "production")], || {
        panic::catch_unwind(AppConfig::load)
    });
    assert!(
        result.is_err(),
        "production config loading should panic without API_BASE_URL"
    );
}

#[test]
#[serial]
fn local_defaults_apply() {
    let config = with_env(&[("APP_ENV", "local")], AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.admin_prefix, "/admin");
    assert_eq!(config.login_path, "/login");
    assert_eq!(config.access_cookie, "auth_token");
    assert_eq!(config.refresh_cookie, "refresh_token");
    assert_eq!(config.missing_expiry, MissingExpiryPolicy::NeverExpires);
}

#[test]
#[serial]
fn overrides_are_read_and_normalized() {
    let config = with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.example.com/v1/"),
            ("ADMIN_PREFIX", "console/"),
            ("REFRESH_COOKIE_NAME", "rt"),
            ("STRICT_TOKEN_EXPIRY", "true"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_base_url, "https://api.example.com/v1");
    assert_eq!(config.admin_prefix, "/console");
    assert_eq!(config.refresh_cookie, "rt");
    assert_eq!(config.missing_expiry, MissingExpiryPolicy::Expired);
}
