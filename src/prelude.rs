//! Recommended imports grouped by abstraction level.
//!
//! `screens` covers front ends that only mount the portal's own screens.
//! `building` is for wiring a new collection screen from parts.

pub mod screens {
    //! Mount a screen, drive its controller, show its notifications.
    pub use crate::connection::{PortalConfig, Role, Session};
    pub use crate::controller::{CrudListController, FieldTarget, Outcome};
    pub use crate::notify::{MemorySink, Notification, Notifier};
    pub use crate::resources::{Screen, mount, open_screen};
    pub use crate::signup::{SignUpFlow, SignUpForm, SignUpOutcome};
}

pub mod building {
    //! Schema, validation and backend seams of the generic controller.
    pub use crate::connection::{
        CollectionBackend, Endpoints, HttpCollection, ListScope, MemoryCollection, UpdateShape,
    };
    pub use crate::controller::{Cell, EditCursor, FieldEditor, LoadTicket, PendingLoad};
    pub use crate::core::{FieldErrors, Identity, PortalError, Record};
    pub use crate::schema::{
        FieldSpec, ResourceMessages, ResourceSchema, SchemaValidator, TemporalWindow,
        ValidationContext, Validator,
    };
}
