use crate::core::{PortalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Route unauthorized visitors are sent to.
pub const SIGN_IN_ROUTE: &str = "/sign-in";

pub const USER_ID_COOKIE: &str = "userId";
pub const USER_TYPE_COOKIE: &str = "userType";

/// Portal role tag carried in the `userType` cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Resident: own maintenance requests and visitors
    Resident,
    /// Administrator: every maintenance request
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Resident => "RESIDENT",
            Role::Admin => "ADMIN",
        }
    }

    /// Landing route after a successful sign-up.
    pub fn dashboard_route(&self) -> &'static str {
        match self {
            Role::Resident => "/user-dashboard",
            Role::Admin => "/admin-dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim() {
            "RESIDENT" => Ok(Role::Resident),
            "ADMIN" => Ok(Role::Admin),
            other => Err(PortalError::Unauthorized(format!("unknown user type '{}'", other))),
        }
    }
}

/// Identity + role pair owned by whoever signed the user in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user_id: String,
    role: Role,
}

impl Session {
    /// Creates a session; an empty or `0` user id is not a session.
    pub fn new(user_id: impl Into<String>, role: Role) -> Option<Self> {
        let user_id = user_id.into().trim().to_string();
        if user_id.is_empty() || user_id == "0" {
            return None;
        }
        Some(Self { user_id, role })
    }

    /// Reads the `userId` / `userType` pair out of a `Cookie` header value.
    ///
    /// Missing cookies, an unknown role or a placeholder user id all yield
    /// `None`.
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        let mut user_id = None;
        let mut user_type = None;

        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            match name.trim() {
                USER_ID_COOKIE => user_id = Some(value.trim().to_string()),
                USER_TYPE_COOKIE => user_type = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let role = user_type?.parse::<Role>().ok()?;
        Self::new(user_id?, role)
    }

    pub fn to_cookie_header(&self) -> String {
        format!(
            "{}={}; {}={}",
            USER_ID_COOKIE, self.user_id, USER_TYPE_COOKIE, self.role
        )
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Result of running a [`SessionGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow(Session),
    Redirect(&'static str),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow(_))
    }

    pub fn into_result(self) -> Result<Session> {
        match self {
            GateDecision::Allow(session) => Ok(session),
            GateDecision::Redirect(route) => Err(PortalError::Unauthorized(format!(
                "redirect to {}",
                route
            ))),
        }
    }
}

/// Role check run before a screen mounts.
///
/// Absent sessions and role mismatches are indistinguishable: both redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGate {
    required: Role,
}

impl SessionGate {
    pub fn new(required: Role) -> Self {
        Self { required }
    }

    pub fn required(&self) -> Role {
        self.required
    }

    pub fn check(&self, session: Option<&Session>) -> GateDecision {
        match session {
            Some(session) if session.role == self.required => {
                GateDecision::Allow(session.clone())
            }
            _ => GateDecision::Redirect(SIGN_IN_ROUTE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_parsing() {
        let session = Session::from_cookie_header("theme=dark; userId=42; userType=RESIDENT").unwrap();
        assert_eq!(session.user_id(), "42");
        assert_eq!(session.role(), Role::Resident);
        assert_eq!(session.to_cookie_header(), "userId=42; userType=RESIDENT");
    }

    #[test]
    fn test_cookie_header_rejects_incomplete_pairs() {
        assert!(Session::from_cookie_header("userId=42").is_none());
        assert!(Session::from_cookie_header("userType=ADMIN").is_none());
        assert!(Session::from_cookie_header("userId=0; userType=RESIDENT").is_none());
        assert!(Session::from_cookie_header("userId=7; userType=GUEST").is_none());
        assert!(Session::from_cookie_header("").is_none());
    }

    #[test]
    fn test_gate_allows_matching_role() {
        let gate = SessionGate::new(Role::Admin);
        let admin = Session::new("1", Role::Admin).unwrap();

        assert_eq!(gate.check(Some(&admin)), GateDecision::Allow(admin.clone()));
        assert_eq!(gate.check(Some(&admin)).into_result().unwrap(), admin);
    }

    #[test]
    fn test_gate_redirects_mismatch_and_absence() {
        let gate = SessionGate::new(Role::Resident);
        let admin = Session::new("1", Role::Admin).unwrap();

        assert_eq!(gate.check(Some(&admin)), GateDecision::Redirect(SIGN_IN_ROUTE));
        assert_eq!(gate.check(None), GateDecision::Redirect(SIGN_IN_ROUTE));
        assert!(matches!(
            gate.check(None).into_result(),
            Err(PortalError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_role_round_trip_and_routes() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Resident.dashboard_route(), "/user-dashboard");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }
}
