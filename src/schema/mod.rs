//! Per-screen resource description.
//!
//! A [`ResourceSchema`] tells the generic controller which field is the row
//! key, which fields make up a draft, which single field is editable inline,
//! and what to say when an operation succeeds or fails.

pub mod rules;
pub mod validator;

use crate::core::{Record, format_timestamp};
use chrono::{DateTime, Utc};
use serde_json::Value;

pub use validator::{
    RequiredFields, SchemaValidator, TemporalWindow, ValidationContext, Validator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Timestamp,
}

/// Initial value of a draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTemplate {
    /// Empty string for text, `null` for timestamps
    Empty,
    /// The clock's current time
    Now,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    /// Message reported when the field is blank; `None` means optional.
    pub required: Option<String>,
    pub template: FieldTemplate,
}

impl FieldSpec {
    pub fn text(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Text,
            required: None,
            template: FieldTemplate::Empty,
        }
    }

    pub fn timestamp(name: &str, label: &str) -> Self {
        Self {
            kind: FieldKind::Timestamp,
            ..Self::text(name, label)
        }
    }

    pub fn required(mut self, message: &str) -> Self {
        self.required = Some(message.to_string());
        self
    }

    pub fn defaults_to_now(mut self) -> Self {
        self.template = FieldTemplate::Now;
        self
    }

    fn initial_value(&self, now: DateTime<Utc>) -> Value {
        match (self.template, self.kind) {
            (FieldTemplate::Now, _) => Value::from(format_timestamp(now)),
            (FieldTemplate::Empty, FieldKind::Text) => Value::from(""),
            (FieldTemplate::Empty, FieldKind::Timestamp) => Value::Null,
        }
    }
}

/// A display column of the collection table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: String,
    pub label: String,
}

impl Column {
    pub fn new(field: &str, label: &str) -> Self {
        Self {
            field: field.to_string(),
            label: label.to_string(),
        }
    }
}

/// The one field of existing records that may be edited inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableField {
    pub field: String,
    pub required: String,
}

/// Start/end field pair subject to the scheduling rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

/// Success and failure texts, one pair per remote action.
///
/// A `None` failure text means the failure is logged but not shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMessages {
    pub created: Option<String>,
    pub create_failed: Option<String>,
    pub updated: Option<String>,
    pub update_failed: Option<String>,
    pub removed: Option<String>,
    pub remove_failed: Option<String>,
}

impl ResourceMessages {
    pub fn created(mut self, ok: &str, failed: Option<&str>) -> Self {
        self.created = Some(ok.to_string());
        self.create_failed = failed.map(str::to_string);
        self
    }

    pub fn updated(mut self, ok: &str, failed: Option<&str>) -> Self {
        self.updated = Some(ok.to_string());
        self.update_failed = failed.map(str::to_string);
        self
    }

    pub fn removed(mut self, ok: &str, failed: Option<&str>) -> Self {
        self.removed = Some(ok.to_string());
        self.remove_failed = failed.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSchema {
    pub resource: String,
    pub identity_field: String,
    pub fields: Vec<FieldSpec>,
    pub columns: Vec<Column>,
    pub editable: Option<EditableField>,
    pub window: Option<TimeWindow>,
    pub owner_field: Option<String>,
    pub defaults: Vec<(String, Value)>,
    pub messages: ResourceMessages,
}

impl ResourceSchema {
    pub fn new(resource: &str, identity_field: &str) -> Self {
        Self {
            resource: resource.to_string(),
            identity_field: identity_field.to_string(),
            fields: Vec::new(),
            columns: Vec::new(),
            editable: None,
            window: None,
            owner_field: None,
            defaults: Vec::new(),
            messages: ResourceMessages::default(),
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn column(mut self, field: &str, label: &str) -> Self {
        self.columns.push(Column::new(field, label));
        self
    }

    pub fn editable(mut self, field: &str, required: &str) -> Self {
        self.editable = Some(EditableField {
            field: field.to_string(),
            required: required.to_string(),
        });
        self
    }

    pub fn window(mut self, start: &str, end: &str) -> Self {
        self.window = Some(TimeWindow {
            start: start.to_string(),
            end: end.to_string(),
        });
        self
    }

    pub fn owner_field(mut self, field: &str) -> Self {
        self.owner_field = Some(field.to_string());
        self
    }

    pub fn default_value(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.defaults.push((field.to_string(), value.into()));
        self
    }

    pub fn messages(mut self, messages: ResourceMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Empty draft, one entry per declared field in declaration order.
    pub fn draft_template(&self, now: DateTime<Utc>) -> Record {
        let mut draft = Record::new();
        for spec in &self.fields {
            draft.set(spec.name.clone(), spec.initial_value(now));
        }
        draft
    }
}
