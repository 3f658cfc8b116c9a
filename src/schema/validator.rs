use super::{FieldKind, FieldSpec, ResourceSchema, TimeWindow};
use crate::core::{FieldErrors, Record};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const START_IN_PAST_MESSAGE: &str = "Check-in date cannot be before current date and time.";
pub const END_NOT_AFTER_START_MESSAGE: &str = "Check-out date must be after check-in date.";

/// Inputs a validator may depend on besides the draft itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub now: DateTime<Utc>,
}

impl ValidationContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

/// Pluggable draft validation: an empty mapping means valid.
pub trait Validator: Send + Sync {
    fn validate(&self, draft: &Record, ctx: &ValidationContext) -> FieldErrors;
}

impl<F> Validator for F
where
    F: Fn(&Record, &ValidationContext) -> FieldErrors + Send + Sync,
{
    fn validate(&self, draft: &Record, ctx: &ValidationContext) -> FieldErrors {
        self(draft, ctx)
    }
}

/// Presence checks for every field that declares a required message.
///
/// A required timestamp also counts as missing when it does not parse. An
/// optional one may stay blank, but text that does not parse is rejected.
#[derive(Debug, Clone)]
pub struct RequiredFields {
    fields: Vec<FieldSpec>,
}

impl RequiredFields {
    pub fn new(fields: &[FieldSpec]) -> Self {
        Self {
            fields: fields.to_vec(),
        }
    }
}

impl Validator for RequiredFields {
    fn validate(&self, draft: &Record, _ctx: &ValidationContext) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for spec in &self.fields {
            let Some(message) = &spec.required else {
                if spec.kind == FieldKind::Timestamp
                    && !draft.is_blank(&spec.name)
                    && draft.timestamp(&spec.name).is_none()
                {
                    errors.insert(spec.name.clone(), invalid_date_message(&spec.label));
                }
                continue;
            };
            let missing = match spec.kind {
                FieldKind::Text => draft.is_blank(&spec.name),
                FieldKind::Timestamp => draft.timestamp(&spec.name).is_none(),
            };
            if missing {
                errors.insert(spec.name.clone(), message.clone());
            }
        }
        errors
    }
}

pub fn invalid_date_message(label: &str) -> String {
    format!("{} is not a valid date.", label)
}

/// Scheduling rule over a start/end pair: start must not be in the past and
/// end must be strictly after start.
///
/// Both violations are reported when both apply, start first. When either
/// side is missing the rule stays silent and leaves it to [`RequiredFields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalWindow {
    pub start: String,
    pub end: String,
    pub start_in_past: String,
    pub end_not_after_start: String,
}

impl TemporalWindow {
    pub fn new(window: &TimeWindow) -> Self {
        Self {
            start: window.start.clone(),
            end: window.end.clone(),
            start_in_past: START_IN_PAST_MESSAGE.to_string(),
            end_not_after_start: END_NOT_AFTER_START_MESSAGE.to_string(),
        }
    }
}

impl Validator for TemporalWindow {
    fn validate(&self, draft: &Record, ctx: &ValidationContext) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let (Some(start), Some(end)) = (draft.timestamp(&self.start), draft.timestamp(&self.end))
        else {
            return errors;
        };

        if start < ctx.now {
            errors.insert(self.start.clone(), self.start_in_past.clone());
        }
        if end <= start {
            errors.insert(self.end.clone(), self.end_not_after_start.clone());
        }
        errors
    }
}

/// Validation derived from a [`ResourceSchema`]: required fields, then the
/// window rule if the schema declares one, then any extra validators.
#[derive(Clone)]
pub struct SchemaValidator {
    required: RequiredFields,
    window: Option<TemporalWindow>,
    extra: Vec<Arc<dyn Validator>>,
}

impl SchemaValidator {
    pub fn new(schema: &ResourceSchema) -> Self {
        Self {
            required: RequiredFields::new(&schema.fields),
            window: schema.window.as_ref().map(TemporalWindow::new),
            extra: Vec::new(),
        }
    }

    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.extra.push(Arc::new(validator));
        self
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, draft: &Record, ctx: &ValidationContext) -> FieldErrors {
        let mut errors = self.required.validate(draft, ctx);
        if let Some(window) = &self.window {
            errors.extend(window.validate(draft, ctx));
        }
        for validator in &self.extra {
            errors.extend(validator.validate(draft, ctx));
        }
        errors
    }
}
