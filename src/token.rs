use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use serde_json::{Map, Value};

/// SessionClaims
///
/// The claim set read out of a bearer token's payload. Every field is optional and
/// nothing here has been verified: the signature segment is never looked at, so
/// these values are routing hints only and must not back a trust decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub roles: Vec<String>,
    pub user_role: Option<String>,
    /// Expiry, epoch seconds.
    pub exp: Option<i64>,
    /// Issued at, epoch seconds.
    pub iat: Option<i64>,
    /// Everything else the issuer put in the payload.
    pub extra: Map<String, Value>,
}

/// What to do with a token that carries no `exp` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingExpiryPolicy {
    /// Treat it as non-expiring. Lenient, and what existing deployments rely on.
    #[default]
    NeverExpires,
    /// Treat it as already expired.
    Expired,
}

impl SessionClaims {
    /// Builds a claim set from a decoded JSON object. Known claims with an unexpected
    /// JSON type are treated as absent rather than failing the whole decode.
    fn from_object(mut object: Map<String, Value>) -> Self {
        let sub = object.remove("sub").and_then(string_or_number);
        let email = object.remove("email").and_then(non_blank_string);
        let role = object.remove("role").and_then(non_blank_string);
        let roles = match object.remove("roles") {
            Some(Value::Array(items)) => items.into_iter().filter_map(non_blank_string).collect(),
            _ => Vec::new(),
        };
        let user_role = object.remove("userRole").and_then(non_blank_string);
        let exp = object.remove("exp").and_then(epoch_seconds);
        let iat = object.remove("iat").and_then(epoch_seconds);

        Self {
            sub,
            email,
            role,
            roles,
            user_role,
            exp,
            iat,
            extra: object,
        }
    }

    /// True when the claim set's expiry has passed at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64, policy: MissingExpiryPolicy) -> bool {
        match self.exp {
            Some(exp) => now_ms >= exp.saturating_mul(1000),
            None => policy == MissingExpiryPolicy::Expired,
        }
    }
}

fn non_blank_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn string_or_number(value: Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        other => non_blank_string(other),
    }
}

fn epoch_seconds(value: Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

/// decode_claims
///
/// Splits `token` into `header.payload.signature`, base64url-decodes the payload
/// and parses it as a JSON object. Returns `None` for anything malformed: wrong
/// segment count, bad base64, bad JSON, or JSON that is not an object.
pub fn decode_claims(token: &str) -> Option<SessionClaims> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let payload = segments[1];
    // Issuers disagree on padding; accept both forms.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .ok()?;

    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(object) => Some(SessionClaims::from_object(object)),
        _ => None,
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// is_expired
///
/// Expired iff `now_ms >= exp * 1000`. A token without `exp` follows `policy`.
/// A token that cannot be decoded carries no expiry and is not expired; pair
/// with [`is_valid`] to reject it.
pub fn is_expired(token: &str, now_ms: i64, policy: MissingExpiryPolicy) -> bool {
    decode_claims(token).is_some_and(|claims| claims.is_expired_at(now_ms, policy))
}

/// is_valid
///
/// False for blank or undecodable tokens, and, when `check_expiry` is set, for
/// expired ones. True otherwise.
pub fn is_valid(
    token: &str,
    check_expiry: bool,
    now_ms: i64,
    policy: MissingExpiryPolicy,
) -> bool {
    if token.trim().is_empty() {
        return false;
    }
    let Some(claims) = decode_claims(token) else {
        return false;
    };
    !(check_expiry && claims.is_expired_at(now_ms, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with(payload: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn rejects_wrong_segment_counts() {
        for raw in ["", "abc", "a.b", "a.b.c.d", "...."] {
            assert!(decode_claims(raw).is_none(), "{raw:?} should not decode");
        }
    }

    #[test]
    fn rejects_bad_base64_and_bad_json() {
        assert!(decode_claims("h.!!!not-base64!!!.s").is_none());
        let not_json = URL_SAFE_NO_PAD.encode("not json at all");
        assert!(decode_claims(&format!("h.{not_json}.s")).is_none());
        let array = URL_SAFE_NO_PAD.encode("[1,2,3]");
        assert!(decode_claims(&format!("h.{array}.s")).is_none());
    }

    #[test]
    fn header_and_signature_are_not_inspected() {
        let body = URL_SAFE_NO_PAD.encode(r#"{"sub":"u-1"}"#);
        let claims = decode_claims(&format!("garbage.{body}.")).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u-1"));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let body = URL_SAFE.encode(r#"{"sub":"a"}"#);
        assert!(body.ends_with('='));
        assert!(decode_claims(&format!("h.{body}.s")).is_some());
    }

    #[test]
    fn reads_known_claims_and_keeps_extras() {
        let token = token_with(&json!({
            "sub": 42,
            "email": "ops@example.com",
            "roles": ["support", 7, ""],
            "userRole": "dev",
            "exp": 1_700_000_000,
            "iat": 1_699_990_000.0,
            "tenant": "acme"
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.email.as_deref(), Some("ops@example.com"));
        assert_eq!(claims.role, None);
        assert_eq!(claims.roles, vec!["support".to_string()]);
        assert_eq!(claims.user_role.as_deref(), Some("dev"));
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(claims.iat, Some(1_699_990_000));
        assert_eq!(claims.extra.get("tenant"), Some(&json!("acme")));
    }

    #[test]
    fn missing_exp_never_expires_by_default() {
        let token = token_with(&json!({ "sub": "u" }));
        for now in [0, 1_700_000_000_000, i64::MAX] {
            assert!(!is_expired(&token, now, MissingExpiryPolicy::NeverExpires));
        }
        assert!(is_expired(&token, 0, MissingExpiryPolicy::Expired));
    }

    #[test]
    fn exp_boundary_is_inclusive() {
        let token = token_with(&json!({ "exp": 1_000 }));
        let policy = MissingExpiryPolicy::default();
        assert!(!is_expired(&token, 999_999, policy));
        assert!(is_expired(&token, 1_000_000, policy));
        assert!(is_expired(&token, 1_000_001, policy));
    }

    #[test]
    fn undecodable_token_is_not_expired() {
        for policy in [MissingExpiryPolicy::NeverExpires, MissingExpiryPolicy::Expired] {
            assert!(!is_expired("", i64::MAX, policy));
            assert!(!is_expired("not-a-token", i64::MAX, policy));
            assert!(!is_expired("a.!!!.c", i64::MAX, policy));
        }
    }

    #[test]
    fn validity_honours_check_expiry_flag() {
        let policy = MissingExpiryPolicy::default();
        let expired = token_with(&json!({ "exp": 10 }));
        assert!(is_valid(&expired, false, 20_000, policy));
        assert!(!is_valid(&expired, true, 20_000, policy));
        assert!(!is_valid("   ", false, 0, policy));
        assert!(!is_valid("a.b.c", false, 0, policy));
    }
}
