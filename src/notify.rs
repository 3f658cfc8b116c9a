//! Transient success/failure notifications.
//!
//! Controller operations return an [`Outcome`]; [`Notifier`] maps outcomes to
//! [`Notification`]s and hands them to whatever [`NotificationSink`] the front
//! end uses. Sinks never feed back into controller state.

use crate::controller::{Action, Outcome};
use crate::schema::ResourceMessages;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Buffers notifications for a front end (or a test) to drain.
///
/// Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        match self.inner.lock() {
            Ok(buffer) => buffer.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn drain(&self) -> Vec<Notification> {
        match self.inner.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|n| n.message).collect()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        match self.inner.lock() {
            Ok(mut buffer) => buffer.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

/// Writes every notification to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => info!(text = %notification.message, "notification"),
            Level::Warning | Level::Error => {
                warn!(level = %notification.level, text = %notification.message, "notification")
            }
        }
    }
}

/// Maps operation outcomes to notifications using a resource's texts.
pub struct Notifier;

impl Notifier {
    pub fn notifications(messages: &ResourceMessages, outcome: &Outcome) -> Vec<Notification> {
        match outcome {
            Outcome::Rejected(errors) => errors
                .messages()
                .into_iter()
                .map(Notification::error)
                .collect(),
            Outcome::Created(_) => success(&messages.created),
            Outcome::Updated(_) => success(&messages.updated),
            Outcome::Removed(_) => success(&messages.removed),
            Outcome::Failed { action, error } => {
                let text = match action {
                    // A failed list is logged by the controller, not shown.
                    Action::Load => return Vec::new(),
                    Action::Create => &messages.create_failed,
                    Action::Update => &messages.update_failed,
                    Action::Delete => &messages.remove_failed,
                };
                let message = match text {
                    Some(text) => text.clone(),
                    None => error.to_string(),
                };
                vec![Notification::error(message)]
            }
            Outcome::Loaded { .. }
            | Outcome::StaleLoad(_)
            | Outcome::EditStarted(_)
            | Outcome::EditCancelled
            | Outcome::DraftReset
            | Outcome::NoSuchRecord(_)
            | Outcome::NotEditable
            | Outcome::NotEditing(_) => Vec::new(),
        }
    }

    pub fn emit(sink: &dyn NotificationSink, messages: &ResourceMessages, outcome: &Outcome) {
        for notification in Self::notifications(messages, outcome) {
            sink.notify(notification);
        }
    }
}

fn success(text: &Option<String>) -> Vec<Notification> {
    text.iter().map(Notification::success).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldErrors, Identity, PortalError};

    fn messages() -> ResourceMessages {
        ResourceMessages::default()
            .created("Visitor added successfully!", None)
            .removed("Visitor deleted successfully!", Some("Failed to delete visitor"))
    }

    #[test]
    fn test_rejected_emits_one_error_per_field() {
        let sink = MemorySink::new();
        let mut errors = FieldErrors::new();
        errors.insert("visitorFullName", "Please enter visitor name.");
        errors.insert("purpose", "Please enter purpose.");

        Notifier::emit(&sink, &messages(), &Outcome::Rejected(errors));

        assert_eq!(
            sink.snapshot(),
            vec![
                Notification::error("Please enter visitor name."),
                Notification::error("Please enter purpose."),
            ]
        );
    }

    #[test]
    fn test_failures_use_configured_text_or_error_display() {
        let sink = MemorySink::new();
        let error = PortalError::Network {
            status: 500,
            body: "boom".into(),
        };

        for action in [Action::Create, Action::Load, Action::Delete] {
            Notifier::emit(
                &sink,
                &messages(),
                &Outcome::Failed {
                    action,
                    error: error.clone(),
                },
            );
        }

        assert_eq!(
            sink.snapshot(),
            vec![
                Notification::error(error.to_string()),
                Notification::error("Failed to delete visitor"),
            ]
        );
    }

    #[test]
    fn test_success_and_drain() {
        let sink = MemorySink::new();
        Notifier::emit(&sink, &messages(), &Outcome::Removed(Identity::Int(3)));
        Notifier::emit(&sink, &messages(), &Outcome::Loaded { count: 3 });

        let drained = sink.drain();
        assert_eq!(drained, vec![Notification::success("Visitor deleted successfully!")]);
        assert!(sink.snapshot().is_empty());
    }
}
