/// Sign-up flow tests
///
/// Run with: cargo test --test signup_tests

use async_trait::async_trait;
use communityhub_portal::connection::Role;
use communityhub_portal::core::{PortalError, Result};
use communityhub_portal::notify::{Level, Notification};
use communityhub_portal::signup::{SignUpFlow, SignUpForm, SignUpOutcome, UserDirectory};
use std::sync::Mutex;

/// Directory that records every call it receives.
#[derive(Default)]
struct RecordingDirectory {
    calls: Mutex<Vec<String>>,
    existing_ids: Vec<String>,
    taken_usernames: Vec<String>,
    fail_sign_up: bool,
}

impl RecordingDirectory {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl UserDirectory for RecordingDirectory {
    async fn user_exists(&self, user_id: &str) -> Result<bool> {
        self.record(format!("getUser/{}", user_id));
        Ok(self.existing_ids.iter().any(|id| id == user_id))
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        self.record(format!("username/{}", username));
        Ok(self.taken_usernames.iter().any(|name| name == username))
    }

    async fn sign_up(&self, form: &SignUpForm) -> Result<()> {
        self.record(format!("signUp/{}", form.user_id));
        if self.fail_sign_up {
            return Err(PortalError::Network {
                status: 500,
                body: "database down".into(),
            });
        }
        Ok(())
    }
}

fn complete_form(role: Role) -> SignUpForm {
    let mut form = SignUpForm::new(role);
    form.user_id = "101".into();
    form.first_name = "Asha".into();
    form.last_name = "Rao".into();
    form.username = "asharao".into();
    form.password = "secret1".into();
    form.mobile_number = "9876543210".into();
    form.present_address = "B2-304, Lake View".into();
    form
}

fn flow(directory: RecordingDirectory) -> SignUpFlow<RecordingDirectory> {
    SignUpFlow::new(directory, "TVH")
}

#[tokio::test]
async fn test_admin_without_code_is_blocked_before_any_network_call() {
    let flow = flow(RecordingDirectory::default());
    let form = complete_form(Role::Admin);

    let outcome = flow.submit(&form).await;

    assert_eq!(
        outcome,
        SignUpOutcome::Rejected(Notification::error("Please enter the ADMIN code."))
    );
    assert!(flow.directory().calls().is_empty());
}

#[tokio::test]
async fn test_wrong_admin_code_is_rejected_locally() {
    let flow = flow(RecordingDirectory::default());
    let mut form = complete_form(Role::Admin);
    form.admin_code = "XYZ".into();

    let outcome = flow.submit(&form).await;

    assert_eq!(outcome.notification().message, "Invalid ADMIN code.");
    assert!(flow.directory().calls().is_empty());
}

#[tokio::test]
async fn test_blank_field_is_a_warning() {
    let flow = flow(RecordingDirectory::default());
    let mut form = complete_form(Role::Resident);
    form.present_address = "   ".into();

    let outcome = flow.submit(&form).await;

    let notification = outcome.notification();
    assert_eq!(notification.level, Level::Warning);
    assert_eq!(notification.message, "Please fill in all details.");
    assert!(flow.directory().calls().is_empty());
}

#[tokio::test]
async fn test_format_rules_run_in_order() {
    let cases = [
        (
            ("Asha1", "Rao", "asharao", "secret1", "9876543210"),
            "First name should contain only letters.",
        ),
        (
            ("Asha", "Rao", "asha_rao", "secret1", "9876543210"),
            "Username should contain only letters.",
        ),
        (
            ("Asha", "Rao", "asharao", "secret", "9876543210"),
            "Password should be at least 5 characters long and contain at least one letter and one number.",
        ),
        (
            ("Asha", "Rao", "asharao", "secret1", "5876543210"),
            "Mobile number should be 10 digits long and start with 6, 7, 8, or 9.",
        ),
    ];

    for ((first, last, username, password, mobile), expected) in cases {
        let flow = flow(RecordingDirectory::default());
        let mut form = complete_form(Role::Resident);
        form.first_name = first.into();
        form.last_name = last.into();
        form.username = username.into();
        form.password = password.into();
        form.mobile_number = mobile.into();

        let outcome = flow.submit(&form).await;
        assert_eq!(outcome.notification().message, expected);
        assert!(flow.directory().calls().is_empty());
    }
}

#[tokio::test]
async fn test_existing_user_id_stops_before_username_check() {
    let flow = flow(RecordingDirectory {
        existing_ids: vec!["101".into()],
        ..Default::default()
    });

    let outcome = flow.submit(&complete_form(Role::Resident)).await;

    assert_eq!(
        outcome.notification().message,
        "User ID 101 is already registered."
    );
    assert_eq!(flow.directory().calls(), vec!["getUser/101".to_string()]);
}

#[tokio::test]
async fn test_taken_username_is_rejected() {
    let flow = flow(RecordingDirectory {
        taken_usernames: vec!["asharao".into()],
        ..Default::default()
    });

    let outcome = flow.submit(&complete_form(Role::Resident)).await;

    assert_eq!(
        outcome.notification().message,
        "Username asharao is already registered."
    );
    assert!(outcome.session().is_none());
    assert_eq!(
        flow.directory().calls(),
        vec!["getUser/101".to_string(), "username/asharao".to_string()]
    );
}

#[tokio::test]
async fn test_admin_registration_yields_session_and_dashboard() {
    let flow = flow(RecordingDirectory::default());
    let mut form = complete_form(Role::Admin);
    form.admin_code = "TVH".into();

    let outcome = flow.submit(&form).await;

    let SignUpOutcome::Registered { session, redirect } = &outcome else {
        panic!("expected registration, got {:?}", outcome);
    };
    assert_eq!(session.user_id(), "101");
    assert!(session.is_admin());
    assert_eq!(*redirect, "/admin-dashboard");
    assert_eq!(outcome.notification().message, "Successfully signed up!");
    assert_eq!(flow.directory().calls().last().unwrap(), "signUp/101");
}

#[tokio::test]
async fn test_failed_registration_hands_out_no_session() {
    let flow = flow(RecordingDirectory {
        fail_sign_up: true,
        ..Default::default()
    });

    let outcome = flow.submit(&complete_form(Role::Resident)).await;

    assert!(matches!(outcome, SignUpOutcome::Failed(_)));
    assert!(outcome.session().is_none());
    assert_eq!(
        outcome.notification().message,
        "Error checking user existence: Request failed with status 500: database down"
    );
}
