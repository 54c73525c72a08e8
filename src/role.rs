use crate::token::{SessionClaims, decode_claims};

/// Admin root used when no prefix is configured.
pub const DEFAULT_ADMIN_PREFIX: &str = "/admin";

/// AdminRole
///
/// The role vocabulary the gate understands. Anything outside it is `Other` and
/// lands on the admin root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Support,
    Developer,
    Other,
}

impl AdminRole {
    /// Case-insensitive exact lookup; no prefix or substring matching.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "SUPER_ADMIN" | "SUPERADMIN" => AdminRole::SuperAdmin,
            "ADMIN" => AdminRole::Admin,
            "SUPPORT_AGENT" | "SUPPORT" => AdminRole::Support,
            "DEVELOPER" | "DEV" => AdminRole::Developer,
            _ => AdminRole::Other,
        }
    }

    /// Path below the admin prefix this role lands on. Empty means the prefix itself.
    pub fn area_path(self) -> &'static str {
        match self {
            AdminRole::SuperAdmin | AdminRole::Admin | AdminRole::Other => "",
            AdminRole::Support => "/support",
            AdminRole::Developer => "/dev",
        }
    }

    /// Home route under `prefix`, so role targets always stay inside the gated area.
    pub fn home_route(self, prefix: &str) -> String {
        let prefix = prefix.trim_end_matches('/');
        match (prefix.is_empty(), self.area_path()) {
            (true, "") => "/".to_string(),
            (_, area) => format!("{prefix}{area}"),
        }
    }
}

/// First present of `role`, `roles[0]`, `userRole`.
pub fn role_claim(claims: &SessionClaims) -> Option<&str> {
    claims
        .role
        .as_deref()
        .or_else(|| claims.roles.first().map(String::as_str))
        .or(claims.user_role.as_deref())
}

/// admin_route_for_role
///
/// Maps a raw role string to its route under `prefix`. `None` and unknown roles
/// get the prefix itself.
pub fn admin_route_for_role(prefix: &str, role: Option<&str>) -> String {
    role.map(AdminRole::parse)
        .unwrap_or(AdminRole::Other)
        .home_route(prefix)
}

/// Role route for an access token. Undecodable tokens and tokens with no role
/// claim get the default route.
pub fn admin_route_for_token(prefix: &str, token: &str) -> String {
    let claims = decode_claims(token);
    admin_route_for_role(prefix, claims.as_ref().and_then(role_claim))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(role: Option<&str>) -> String {
        admin_route_for_role(DEFAULT_ADMIN_PREFIX, role)
    }

    #[test]
    fn unknown_and_absent_roles_default_to_root() {
        assert_eq!(route(None), "/admin");
        assert_eq!(route(Some("unknown")), "/admin");
        assert_eq!(route(Some("")), "/admin");
        // No partial matches.
        assert_eq!(route(Some("support_agent_lead")), "/admin");
    }

    #[test]
    fn role_lookup_is_case_insensitive() {
        assert_eq!(route(Some("support_agent")), "/admin/support");
        assert_eq!(route(Some("Support")), "/admin/support");
        assert_eq!(route(Some("dev")), "/admin/dev");
        assert_eq!(route(Some("Developer")), "/admin/dev");
        assert_eq!(route(Some("superadmin")), "/admin");
        assert_eq!(route(Some("SUPER_ADMIN")), "/admin");
        assert_eq!(route(Some("admin")), "/admin");
    }

    #[test]
    fn routes_follow_configured_prefix() {
        assert_eq!(admin_route_for_role("/console", Some("support")), "/console/support");
        assert_eq!(admin_route_for_role("/console", Some("dev")), "/console/dev");
        assert_eq!(admin_route_for_role("/console", None), "/console");
        assert_eq!(admin_route_for_role("/", None), "/");
        assert_eq!(admin_route_for_role("/", Some("dev")), "/dev");
    }

    #[test]
    fn role_claim_precedence() {
        let mut claims = SessionClaims {
            roles: vec!["DEV".into()],
            user_role: Some("SUPPORT".into()),
            ..Default::default()
        };
        assert_eq!(role_claim(&claims), Some("DEV"));

        claims.role = Some("ADMIN".into());
        assert_eq!(role_claim(&claims), Some("ADMIN"));

        claims.role = None;
        claims.roles.clear();
        assert_eq!(role_claim(&claims), Some("SUPPORT"));
    }

    #[test]
    fn garbage_token_gets_default_route() {
        assert_eq!(admin_route_for_token(DEFAULT_ADMIN_PREFIX, "not-a-token"), "/admin");
    }
}
