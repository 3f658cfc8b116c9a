pub mod error;
pub mod types;

pub use error::{FieldErrors, PortalError, Result};
pub use types::{Identity, Record, format_timestamp, parse_timestamp};
