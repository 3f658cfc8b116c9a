//! Account registration against the user service.
//!
//! Every local check, the admin code included, runs before the first
//! network call. The session is only handed out once the service has
//! accepted the registration.

use crate::connection::http::RestClient;
use crate::connection::{PortalConfig, Role, Session, path_segment};
use crate::core::{PortalError, Result};
use crate::notify::Notification;
use crate::schema::rules;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const FILL_ALL_DETAILS: &str = "Please fill in all details.";
pub const ADMIN_CODE_MISSING: &str = "Please enter the ADMIN code.";
pub const ADMIN_CODE_INVALID: &str = "Invalid ADMIN code.";
pub const FIRST_NAME_LETTERS: &str = "First name should contain only letters.";
pub const LAST_NAME_LETTERS: &str = "Last name should contain only letters.";
pub const USERNAME_LETTERS: &str = "Username should contain only letters.";
pub const PASSWORD_RULE: &str =
    "Password should be at least 5 characters long and contain at least one letter and one number.";
pub const MOBILE_RULE: &str = "Mobile number should be 10 digits long and start with 6, 7, 8, or 9.";
pub const SIGNED_UP: &str = "Successfully signed up!";

/// Body the user service answers with when a username is taken.
const USERNAME_TAKEN_BODY: &str = "Username already exist";

/// Registration form as posted to `/signUp`.
///
/// `admin_code` is checked locally and never leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub mobile_number: String,
    pub present_address: String,
    pub user_type: Role,
    #[serde(skip)]
    pub admin_code: String,
}

impl SignUpForm {
    pub fn new(user_type: Role) -> Self {
        Self {
            user_id: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            password: String::new(),
            mobile_number: String::new(),
            present_address: String::new(),
            user_type,
            admin_code: String::new(),
        }
    }

    fn text_fields(&self) -> [&str; 7] {
        [
            self.user_id.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.username.as_str(),
            self.password.as_str(),
            self.mobile_number.as_str(),
            self.present_address.as_str(),
        ]
    }
}

/// Existence checks and registration offered by the user service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, user_id: &str) -> Result<bool>;

    async fn username_taken(&self, username: &str) -> Result<bool>;

    async fn sign_up(&self, form: &SignUpForm) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: RestClient,
}

impl HttpUserDirectory {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self> {
        Ok(Self::new(RestClient::new(
            &config.user_service_url,
            config.request_timeout,
        )?))
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn user_exists(&self, user_id: &str) -> Result<bool> {
        let path = format!("/getUser/{}", path_segment(user_id));
        let found: Value = self.client.get_json(&path).await?;
        Ok(matches!(found, Value::Array(rows) if !rows.is_empty()))
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        let path = format!("/username/{}", path_segment(username));
        let body = self.client.get_text(&path).await?;
        Ok(body.trim().trim_matches('"') == USERNAME_TAKEN_BODY)
    }

    async fn sign_up(&self, form: &SignUpForm) -> Result<()> {
        self.client.post_unit("/signUp", form).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// A check failed; nothing after it ran.
    Rejected(Notification),
    Registered {
        session: Session,
        redirect: &'static str,
    },
    /// An existence check or the registration call failed.
    Failed(PortalError),
}

impl SignUpOutcome {
    pub fn notification(&self) -> Notification {
        match self {
            SignUpOutcome::Rejected(notification) => notification.clone(),
            SignUpOutcome::Registered { .. } => Notification::success(SIGNED_UP),
            SignUpOutcome::Failed(error) => {
                Notification::error(format!("Error checking user existence: {}", error))
            }
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SignUpOutcome::Registered { session, .. } => Some(session),
            _ => None,
        }
    }
}

pub struct SignUpFlow<D: UserDirectory> {
    directory: D,
    admin_code: String,
}

impl<D: UserDirectory> SignUpFlow<D> {
    pub fn new(directory: D, admin_code: impl Into<String>) -> Self {
        Self {
            directory,
            admin_code: admin_code.into(),
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Runs every check in order and stops at the first failure.
    pub async fn submit(&self, form: &SignUpForm) -> SignUpOutcome {
        if let Some(rejection) = self.check_locally(form) {
            debug!(user = %form.user_id, reason = %rejection.message, "sign-up rejected");
            return SignUpOutcome::Rejected(rejection);
        }

        match self.register(form).await {
            Ok(Some(rejection)) => {
                debug!(user = %form.user_id, reason = %rejection.message, "sign-up rejected");
                SignUpOutcome::Rejected(rejection)
            }
            Ok(None) => match Session::new(form.user_id.clone(), form.user_type) {
                Some(session) => {
                    info!(user = %form.user_id, role = %form.user_type, "user signed up");
                    SignUpOutcome::Registered {
                        session,
                        redirect: form.user_type.dashboard_route(),
                    }
                }
                None => SignUpOutcome::Failed(PortalError::Unauthorized(format!(
                    "user id '{}' cannot hold a session",
                    form.user_id
                ))),
            },
            Err(error) => {
                warn!(user = %form.user_id, error = %error, "sign-up failed");
                SignUpOutcome::Failed(error)
            }
        }
    }

    fn check_locally(&self, form: &SignUpForm) -> Option<Notification> {
        if form.text_fields().iter().any(|field| field.trim().is_empty()) {
            return Some(Notification::warning(FILL_ALL_DETAILS));
        }

        if form.user_type == Role::Admin {
            if form.admin_code.is_empty() {
                return Some(Notification::error(ADMIN_CODE_MISSING));
            }
            if form.admin_code != self.admin_code {
                return Some(Notification::error(ADMIN_CODE_INVALID));
            }
        }

        let format_checks = [
            (rules::is_letters_only(&form.first_name), FIRST_NAME_LETTERS),
            (rules::is_letters_only(&form.last_name), LAST_NAME_LETTERS),
            (rules::is_letters_only(&form.username), USERNAME_LETTERS),
            (rules::is_acceptable_password(&form.password), PASSWORD_RULE),
            (rules::is_mobile_number(&form.mobile_number), MOBILE_RULE),
        ];
        format_checks
            .into_iter()
            .find(|(ok, _)| !ok)
            .map(|(_, message)| Notification::error(message))
    }

    /// Remote half: uniqueness checks, then the registration itself.
    async fn register(&self, form: &SignUpForm) -> Result<Option<Notification>> {
        if self.directory.user_exists(&form.user_id).await? {
            return Ok(Some(Notification::error(format!(
                "User ID {} is already registered.",
                form.user_id
            ))));
        }
        if self.directory.username_taken(&form.username).await? {
            return Ok(Some(Notification::error(format!(
                "Username {} is already registered.",
                form.username
            ))));
        }
        self.directory.sign_up(form).await?;
        Ok(None)
    }
}

impl SignUpFlow<HttpUserDirectory> {
    pub fn from_config(config: &PortalConfig) -> Result<Self> {
        Ok(Self::new(
            HttpUserDirectory::from_config(config)?,
            config.admin_code.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_wire_shape_omits_admin_code() {
        let mut form = SignUpForm::new(Role::Admin);
        form.user_id = "12".into();
        form.admin_code = "TVH".into();

        let wire = serde_json::to_value(&form).unwrap();
        assert_eq!(wire["userId"], json!("12"));
        assert_eq!(wire["userType"], json!("ADMIN"));
        assert!(wire.get("adminCode").is_none());
        assert!(wire.get("presentAddress").is_some());
    }

    #[test]
    fn test_failure_notification_text() {
        let outcome = SignUpOutcome::Failed(PortalError::Transport("connection refused".into()));
        assert_eq!(
            outcome.notification().message,
            "Error checking user existence: Transport error: connection refused"
        );
        assert!(outcome.session().is_none());
    }
}
