use axum::http::{HeaderMap, header};
use axum_extra::extract::CookieJar;

use crate::{config::AppConfig, token::decode_claims};

/// SessionTokens
///
/// Whatever credentials a request carries, read without any verification.
/// `access` comes from the bearer header first, then the access cookie.
/// `refresh` comes only from the refresh cookie.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl SessionTokens {
    pub fn from_headers(headers: &HeaderMap, config: &AppConfig) -> Self {
        let jar = CookieJar::from_headers(headers);

        let access = bearer_token(headers)
            .or_else(|| cookie_value(&jar, &config.access_cookie));
        let refresh = cookie_value(&jar, &config.refresh_cookie);

        Self { access, refresh }
    }

    /// has_valid_session
    ///
    /// Coarse session evidence: an access token that decodes (expiry is not checked
    /// here), or a refresh token of any content. The backend does the real
    /// enforcement; this only filters out requests with nothing at all.
    pub fn has_valid_session(&self) -> bool {
        let access_decodes = self
            .access
            .as_deref()
            .is_some_and(|token| decode_claims(token).is_some());

        access_decodes || self.refresh.is_some()
    }
}

/// Shorthand for `SessionTokens::from_headers(..).has_valid_session()`.
pub fn has_valid_session(headers: &HeaderMap, config: &AppConfig) -> bool {
    SessionTokens::from_headers(headers, config).has_valid_session()
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
