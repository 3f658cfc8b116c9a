use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    #[error("Request failed with status {status}: {body}")]
    Network { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PortalError {
    /// True for every failure that came back from (or never reached) a remote service.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Transport(_) | Self::Decode(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

/// Ordered mapping of field name to a human-readable validation message.
///
/// Iteration follows insertion order, which validators keep equal to field
/// declaration order. An empty mapping means the input is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Records a message for `field`. A second message for the same field
    /// replaces the text but keeps the original position.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((field, message)),
        }
    }

    pub fn extend(&mut self, other: FieldErrors) {
        for (field, message) in other.entries {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, message)| message.as_str()).collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.messages().join("; ");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_keep_insertion_order() {
        let mut errors = FieldErrors::new();
        errors.insert("requesterName", "Please enter requester name.");
        errors.insert("roomNumber", "Please enter room number.");
        errors.insert("requesterName", "Requester name is too long.");

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.messages(),
            vec!["Requester name is too long.", "Please enter room number."]
        );
        assert_eq!(errors.get("roomNumber"), Some("Please enter room number."));
    }

    #[test]
    fn test_network_classification() {
        assert!(PortalError::Network { status: 500, body: "boom".into() }.is_network());
        assert!(PortalError::Transport("refused".into()).is_network());
        assert!(!PortalError::Unauthorized("role".into()).is_network());
        assert_eq!(
            PortalError::Network { status: 404, body: "<empty>".into() }.status(),
            Some(404)
        );
    }
}
