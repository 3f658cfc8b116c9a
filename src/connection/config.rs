use crate::core::{PortalError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_USER_SERVICE_URL: &str = "http://localhost:8082/communityhub/user";
pub const DEFAULT_MAINTENANCE_SERVICE_URL: &str =
    "http://localhost:8083/communityhub/user/maintenance";
pub const DEFAULT_VISITOR_SERVICE_URL: &str = "http://localhost:8084/communityhub/user/visitors";
pub const DEFAULT_ADMIN_CODE: &str = "TVH";

/// Portal client configuration
///
/// One base URL per backing REST service plus client-side knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// User service (sign-up, existence checks)
    pub user_service_url: String,

    /// Maintenance request service
    pub maintenance_service_url: String,

    /// Visitor log service
    pub visitor_service_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Code an applicant must present to register as ADMIN
    pub admin_code: String,
}

impl PortalConfig {
    pub fn new() -> Self {
        Self {
            user_service_url: DEFAULT_USER_SERVICE_URL.to_string(),
            maintenance_service_url: DEFAULT_MAINTENANCE_SERVICE_URL.to_string(),
            visitor_service_url: DEFAULT_VISITOR_SERVICE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            admin_code: DEFAULT_ADMIN_CODE.to_string(),
        }
    }

    /// Loads `.env` (if any) and reads `PORTAL_*` variables over the defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(url) = lookup("PORTAL_USER_SERVICE_URL") {
            config.user_service_url = url;
        }
        if let Some(url) = lookup("PORTAL_MAINTENANCE_SERVICE_URL") {
            config.maintenance_service_url = url;
        }
        if let Some(url) = lookup("PORTAL_VISITOR_SERVICE_URL") {
            config.visitor_service_url = url;
        }
        if let Some(raw) = lookup("PORTAL_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                PortalError::Config(format!("PORTAL_TIMEOUT_SECS must be a whole number, got '{}'", raw))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(code) = lookup("PORTAL_ADMIN_CODE") {
            config.admin_code = code;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the user service URL
    pub fn user_service_url(mut self, url: &str) -> Self {
        self.user_service_url = url.to_string();
        self
    }

    /// Set the maintenance service URL
    pub fn maintenance_service_url(mut self, url: &str) -> Self {
        self.maintenance_service_url = url.to_string();
        self
    }

    /// Set the visitor service URL
    pub fn visitor_service_url(mut self, url: &str) -> Self {
        self.visitor_service_url = url.to_string();
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the admin registration code
    pub fn admin_code(mut self, code: &str) -> Self {
        self.admin_code = code.to_string();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("user_service_url", &self.user_service_url),
            ("maintenance_service_url", &self.maintenance_service_url),
            ("visitor_service_url", &self.visitor_service_url),
        ] {
            if url.trim().is_empty() {
                return Err(PortalError::Config(format!("{} cannot be empty", name)));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(PortalError::Config("request_timeout must be > 0".to_string()));
        }

        Ok(())
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = PortalConfig::default();
        assert_eq!(config.maintenance_service_url, DEFAULT_MAINTENANCE_SERVICE_URL);
        assert_eq!(config.admin_code, "TVH");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder_pattern() {
        let config = PortalConfig::new()
            .visitor_service_url("http://visitors.internal")
            .request_timeout(Duration::from_secs(3))
            .admin_code("XYZ");

        assert_eq!(config.visitor_service_url, "http://visitors.internal");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.admin_code, "XYZ");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("PORTAL_USER_SERVICE_URL", "http://users:9000"),
            ("PORTAL_TIMEOUT_SECS", "4"),
        ]))
        .unwrap();

        assert_eq!(config.user_service_url, "http://users:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(4));
        assert_eq!(config.visitor_service_url, DEFAULT_VISITOR_SERVICE_URL);
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = PortalConfig::from_lookup(lookup_from(&[("PORTAL_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, PortalError::Config(_)));

        let zero = PortalConfig::from_lookup(lookup_from(&[("PORTAL_TIMEOUT_SECS", "0")]));
        assert!(zero.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(PortalConfig::new().validate().is_ok());
        assert!(PortalConfig::new().user_service_url("  ").validate().is_err());
    }
}
