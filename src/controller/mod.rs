//! Generic CRUD list controller
//!
//! Keeps a local, newest-first copy of one REST collection and routes every
//! create/update/delete through the backend. Local state changes only after
//! the backend confirms, so a failed call never needs a rollback.

pub mod cursor;
pub mod editor;
pub mod outcome;

use crate::connection::{CollectionBackend, ListScope, Session};
use crate::core::{FieldErrors, Identity, PortalError, Record, Result, format_timestamp};
use crate::schema::{FieldKind, ResourceSchema, SchemaValidator, ValidationContext, Validator};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub use cursor::EditCursor;
pub use editor::{Cell, FieldEditor};
pub use outcome::{Action, LoadTicket, Outcome};

/// Source of "now" for validation and draft templates.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Where [`CrudListController::update_field`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget<'a> {
    /// The inline edit buffer of the row under the cursor
    EditBuffer,
    /// One field of the create draft
    Draft(&'a str),
}

/// An issued list request, detached from the controller.
///
/// Resolving it does not need the controller, so several loads may be in
/// flight at once; only the latest ticket is applied.
pub struct PendingLoad {
    ticket: LoadTicket,
    fetch: BoxFuture<'static, Result<Vec<Record>>>,
}

impl PendingLoad {
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    pub async fn resolve(self) -> LoadResponse {
        LoadResponse {
            ticket: self.ticket,
            result: self.fetch.await,
        }
    }
}

/// A list response tagged with the ticket of the request that produced it.
#[derive(Debug)]
pub struct LoadResponse {
    pub ticket: LoadTicket,
    pub result: Result<Vec<Record>>,
}

pub struct CrudListController<B: CollectionBackend> {
    schema: ResourceSchema,
    backend: Arc<B>,
    session: Session,
    scope: ListScope,
    validator: Arc<dyn Validator>,
    clock: Clock,
    collection: Vec<Record>,
    draft: Record,
    cursor: EditCursor,
    issued_loads: u64,
}

impl<B: CollectionBackend> CrudListController<B> {
    pub fn new(schema: ResourceSchema, backend: B, session: Session, scope: ListScope) -> Self {
        let validator: Arc<dyn Validator> = Arc::new(SchemaValidator::new(&schema));
        let clock: Clock = Arc::new(Utc::now);
        let draft = schema.draft_template(clock());
        Self {
            schema,
            backend: Arc::new(backend),
            session,
            scope,
            validator,
            clock,
            collection: Vec::new(),
            draft,
            cursor: EditCursor::Idle,
            issued_loads: 0,
        }
    }

    /// Replaces the schema-derived validator.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Replaces the wall clock and rebuilds the draft from it.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self.draft = self.schema.draft_template((self.clock)());
        self
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scope(&self) -> &ListScope {
        &self.scope
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Newest-first local copy of the collection.
    pub fn records(&self) -> &[Record] {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn draft(&self) -> &Record {
        &self.draft
    }

    pub fn cursor(&self) -> &EditCursor {
        &self.cursor
    }

    pub fn editor(&self) -> FieldEditor<'_> {
        FieldEditor::new(&self.schema, &self.cursor)
    }

    pub fn find(&self, identity: &Identity) -> Option<&Record> {
        self.collection
            .iter()
            .find(|record| record.identity(&self.schema.identity_field).as_ref() == Some(identity))
    }

    pub fn identity_of(&self, record: &Record) -> Option<Identity> {
        record.identity(&self.schema.identity_field)
    }

    /// Runs the current validator against the draft without submitting.
    pub fn validate_draft(&self) -> FieldErrors {
        let ctx = ValidationContext::at((self.clock)());
        self.validator.validate(&self.draft, &ctx)
    }

    // ------------------------------------------------------------------
    // load
    // ------------------------------------------------------------------

    /// Fetches the whole collection and replaces the local copy.
    pub async fn load(&mut self) -> Outcome {
        let pending = self.start_load();
        let response = pending.resolve().await;
        self.apply_load(response)
    }

    /// Issues a list request under a fresh ticket, superseding earlier ones.
    pub fn start_load(&mut self) -> PendingLoad {
        self.issued_loads += 1;
        let ticket = LoadTicket(self.issued_loads);
        let backend = Arc::clone(&self.backend);
        let scope = self.scope.clone();
        debug!(resource = %self.schema.resource, ticket = ticket.value(), "load issued");

        PendingLoad {
            ticket,
            fetch: async move { backend.list(&scope).await }.boxed(),
        }
    }

    pub fn latest_ticket(&self) -> Option<LoadTicket> {
        (self.issued_loads > 0).then_some(LoadTicket(self.issued_loads))
    }

    /// Applies a list response if it answers the latest issued request.
    pub fn apply_load(&mut self, response: LoadResponse) -> Outcome {
        if response.ticket.value() != self.issued_loads {
            debug!(
                resource = %self.schema.resource,
                ticket = response.ticket.value(),
                latest = self.issued_loads,
                "stale load discarded"
            );
            return Outcome::StaleLoad(response.ticket);
        }

        let rows = match response.result {
            Ok(rows) => rows,
            Err(error) => {
                warn!(resource = %self.schema.resource, error = %error, "failed to load collection");
                return Outcome::Failed {
                    action: Action::Load,
                    error,
                };
            }
        };

        let identity_field = &self.schema.identity_field;
        let mut rows: Vec<Record> = rows
            .into_iter()
            .filter(|record| {
                let keyed = record.identity(identity_field).is_some();
                if !keyed {
                    warn!(
                        resource = %self.schema.resource,
                        field = %identity_field,
                        "dropping record without identity"
                    );
                }
                keyed
            })
            .collect();
        rows.reverse();
        self.collection = rows;

        if let Some(identity) = self.cursor.identity().cloned() {
            if self.find(&identity).is_none() {
                self.cursor = EditCursor::Idle;
            }
        }

        Outcome::Loaded {
            count: self.collection.len(),
        }
    }

    // ------------------------------------------------------------------
    // inline edit
    // ------------------------------------------------------------------

    /// Opens `identity` for editing, or commits when it already is.
    ///
    /// The same affordance both begins and saves an edit.
    pub async fn begin_edit(&mut self, identity: &Identity) -> Outcome {
        if self.cursor.is_editing(identity) {
            return self.commit_edit(identity).await;
        }

        let Some(editable) = &self.schema.editable else {
            return Outcome::NotEditable;
        };
        let Some(record) = self.find(identity) else {
            return Outcome::NoSuchRecord(identity.clone());
        };

        let seed = record.text(&editable.field);
        self.cursor = EditCursor::editing(identity.clone(), seed);
        debug!(resource = %self.schema.resource, identity = %identity, "edit started");
        Outcome::EditStarted(identity.clone())
    }

    /// Sends the edit buffer of `identity` to the backend.
    ///
    /// On failure the row stays in edit mode so the user can retry.
    pub async fn commit_edit(&mut self, identity: &Identity) -> Outcome {
        let Some(editable) = self.schema.editable.clone() else {
            return Outcome::NotEditable;
        };
        let buffer = match &self.cursor {
            EditCursor::Editing {
                identity: current,
                buffer,
            } if current == identity => buffer.clone(),
            _ => return Outcome::NotEditing(identity.clone()),
        };

        if buffer.trim().is_empty() {
            return Outcome::Rejected(FieldErrors::single(editable.field, editable.required));
        }

        let value = Value::from(buffer);
        if let Err(error) = self.backend.update(identity, value.clone()).await {
            warn!(
                resource = %self.schema.resource,
                identity = %identity,
                error = %error,
                "failed to update record"
            );
            return Outcome::Failed {
                action: Action::Update,
                error,
            };
        }

        let identity_field = &self.schema.identity_field;
        if let Some(record) = self
            .collection
            .iter_mut()
            .find(|record| record.identity(identity_field).as_ref() == Some(identity))
        {
            record.set(editable.field, value);
        }
        self.cursor = EditCursor::Idle;
        Outcome::Updated(identity.clone())
    }

    pub fn cancel_edit(&mut self) -> Outcome {
        self.cursor = EditCursor::Idle;
        Outcome::EditCancelled
    }

    /// Local-only input handling; never touches the backend.
    ///
    /// Returns `false` when there is nothing to write to: no row in edit
    /// mode, or a field the draft does not declare.
    pub fn update_field(&mut self, target: FieldTarget<'_>, value: impl Into<String>) -> bool {
        let value = value.into();
        match target {
            FieldTarget::EditBuffer => self.cursor.set_buffer(value),
            FieldTarget::Draft(field) => {
                let Some(spec) = self.schema.field_spec(field) else {
                    return false;
                };
                let value = match spec.kind {
                    FieldKind::Timestamp if value.trim().is_empty() => Value::Null,
                    _ => Value::from(value),
                };
                self.draft.set(field, value);
                true
            }
        }
    }

    // ------------------------------------------------------------------
    // create / delete
    // ------------------------------------------------------------------

    /// Validates and creates the draft.
    ///
    /// Validation errors abort before any request. A failed request keeps
    /// the draft so no input is lost.
    pub async fn submit_draft(&mut self) -> Outcome {
        let errors = self.validate_draft();
        if !errors.is_empty() {
            debug!(resource = %self.schema.resource, errors = errors.len(), "draft rejected");
            return Outcome::Rejected(errors);
        }

        let body = self.create_body();
        let created = match self.backend.create(body).await {
            Ok(created) => created,
            Err(error) => {
                warn!(resource = %self.schema.resource, error = %error, "failed to create record");
                return Outcome::Failed {
                    action: Action::Create,
                    error,
                };
            }
        };

        let identity_field = self.schema.identity_field.clone();
        let Some(identity) = created.identity(&identity_field) else {
            let error = PortalError::Decode(format!(
                "create response has no '{}' field",
                identity_field
            ));
            warn!(resource = %self.schema.resource, error = %error, "failed to create record");
            return Outcome::Failed {
                action: Action::Create,
                error,
            };
        };

        self.collection
            .retain(|record| record.identity(&identity_field).as_ref() != Some(&identity));
        self.collection.insert(0, created);
        self.draft = self.schema.draft_template((self.clock)());
        Outcome::Created(identity)
    }

    pub fn reset_draft(&mut self) -> Outcome {
        self.draft = self.schema.draft_template((self.clock)());
        Outcome::DraftReset
    }

    pub async fn remove(&mut self, identity: &Identity) -> Outcome {
        if let Err(error) = self.backend.delete(identity).await {
            warn!(
                resource = %self.schema.resource,
                identity = %identity,
                error = %error,
                "failed to delete record"
            );
            return Outcome::Failed {
                action: Action::Delete,
                error,
            };
        }

        let identity_field = &self.schema.identity_field;
        self.collection
            .retain(|record| record.identity(identity_field).as_ref() != Some(identity));
        if self.cursor.is_editing(identity) {
            self.cursor = EditCursor::Idle;
        }
        Outcome::Removed(identity.clone())
    }

    /// Request body for a create: the draft without any identity, timestamps
    /// normalized, plus owner and fixed defaults.
    fn create_body(&self) -> Record {
        let mut body = self.draft.clone();
        body.remove(&self.schema.identity_field);

        for spec in &self.schema.fields {
            if spec.kind == FieldKind::Timestamp {
                if let Some(at) = self.draft.timestamp(&spec.name) {
                    body.set(spec.name.clone(), format_timestamp(at));
                }
            }
        }

        if let Some(owner_field) = &self.schema.owner_field {
            body.set(owner_field.clone(), self.session.user_id());
        }
        for (field, value) in &self.schema.defaults {
            body.set(field.clone(), value.clone());
        }
        body
    }
}
