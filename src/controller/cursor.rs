use crate::core::Identity;

/// Which existing record, if any, is open for inline editing.
///
/// Only one row can be in edit mode at a time. Beginning an edit on another
/// row replaces the cursor and drops the previous buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditCursor {
    #[default]
    Idle,
    Editing { identity: Identity, buffer: String },
}

impl EditCursor {
    pub fn editing(identity: Identity, buffer: impl Into<String>) -> Self {
        EditCursor::Editing {
            identity,
            buffer: buffer.into(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            EditCursor::Idle => None,
            EditCursor::Editing { identity, .. } => Some(identity),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditCursor::Idle)
    }

    pub fn is_editing(&self, identity: &Identity) -> bool {
        self.identity() == Some(identity)
    }

    pub fn buffer(&self) -> Option<&str> {
        match self {
            EditCursor::Idle => None,
            EditCursor::Editing { buffer, .. } => Some(buffer.as_str()),
        }
    }

    pub(crate) fn set_buffer(&mut self, value: String) -> bool {
        match self {
            EditCursor::Idle => false,
            EditCursor::Editing { buffer, .. } => {
                *buffer = value;
                true
            }
        }
    }
}
