use super::cursor::EditCursor;
use crate::core::Record;
use crate::schema::{FieldKind, ResourceSchema};
use chrono::Local;

const DISPLAY_TIMESTAMP: &str = "%B %-d, %Y %-I:%M %p";

/// How one table cell should be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<'a> {
    Static(String),
    /// Editable input holding the current edit buffer.
    Editing(&'a str),
}

impl Cell<'_> {
    pub fn text(&self) -> &str {
        match self {
            Cell::Static(text) => text,
            Cell::Editing(buffer) => buffer,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Cell::Editing(_))
    }
}

/// Decides static-vs-input rendering per cell from the edit cursor.
#[derive(Debug, Clone, Copy)]
pub struct FieldEditor<'a> {
    schema: &'a ResourceSchema,
    cursor: &'a EditCursor,
}

impl<'a> FieldEditor<'a> {
    pub fn new(schema: &'a ResourceSchema, cursor: &'a EditCursor) -> Self {
        Self { schema, cursor }
    }

    pub fn cell(&self, record: &Record, field: &str) -> Cell<'a> {
        if self.is_edit_cell(record, field) {
            if let Some(buffer) = self.cursor.buffer() {
                return Cell::Editing(buffer);
            }
        }

        let is_timestamp = self
            .schema
            .field_spec(field)
            .is_some_and(|spec| spec.kind == FieldKind::Timestamp);
        if is_timestamp {
            if let Some(at) = record.timestamp(field) {
                let local = at.with_timezone(&Local);
                return Cell::Static(local.format(DISPLAY_TIMESTAMP).to_string());
            }
        }
        Cell::Static(record.text(field))
    }

    /// Label of the row's edit button: the same button begins and commits.
    pub fn action_label(&self, record: &Record) -> &'static str {
        match record.identity(&self.schema.identity_field) {
            Some(identity) if self.cursor.is_editing(&identity) => "Save",
            _ => "Update",
        }
    }

    fn is_edit_cell(&self, record: &Record, field: &str) -> bool {
        let Some(editable) = &self.schema.editable else {
            return false;
        };
        editable.field == field
            && record
                .identity(&self.schema.identity_field)
                .is_some_and(|identity| self.cursor.is_editing(&identity))
    }
}
