use crate::core::{FieldErrors, Identity, PortalError};
use std::fmt;

/// Remote action a controller operation performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Load,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Load => "load",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Monotonic token identifying one issued load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(pub(crate) u64);

impl LoadTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// What an operation did. Display concerns live in [`crate::notify`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Loaded { count: usize },
    /// A superseded load answered; its rows were discarded.
    StaleLoad(LoadTicket),
    EditStarted(Identity),
    EditCancelled,
    Updated(Identity),
    Created(Identity),
    Removed(Identity),
    DraftReset,
    NoSuchRecord(Identity),
    /// The schema has no inline-editable field.
    NotEditable,
    /// Commit requested for a row that is not in edit mode.
    NotEditing(Identity),
    /// Local validation failed; nothing was sent.
    Rejected(FieldErrors),
    Failed { action: Action, error: PortalError },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::Loaded { .. }
                | Outcome::EditStarted(_)
                | Outcome::EditCancelled
                | Outcome::Updated(_)
                | Outcome::Created(_)
                | Outcome::Removed(_)
                | Outcome::DraftReset
        )
    }

    pub fn error(&self) -> Option<&PortalError> {
        match self {
            Outcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
