// ============================================================================
// CommunityHub Portal Library
// ============================================================================

pub mod connection;
pub mod controller;
pub mod core;
pub mod notify;
pub mod prelude;
pub mod resources;
pub mod schema;
pub mod signup;

// Re-export main types for convenience
pub use crate::core::{FieldErrors, Identity, PortalError, Record, Result};

// Re-export connection API
pub use connection::{
    CollectionBackend, Endpoints, GateDecision, HttpCollection, ListScope, MemoryCollection,
    PortalConfig, Role, Session, SessionGate, UpdateShape,
};

pub use controller::{CrudListController, EditCursor, FieldEditor, FieldTarget, Outcome};
pub use notify::{MemorySink, Notification, NotificationSink, Notifier, TracingSink};
pub use resources::{Screen, mount, open_screen};
pub use schema::{ResourceSchema, Validator};
pub use signup::{HttpUserDirectory, SignUpFlow, SignUpForm, SignUpOutcome, UserDirectory};
