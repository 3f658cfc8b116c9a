//! Maintenance requests: residents raise and withdraw them, admins move their
//! status along.

use crate::connection::{Endpoints, UpdateShape};
use crate::schema::{FieldSpec, ResourceMessages, ResourceSchema};

pub const IDENTITY_FIELD: &str = "id";
pub const STATUS_FIELD: &str = "status";

fn with_request_columns(schema: ResourceSchema) -> ResourceSchema {
    schema
        .column("requesterName", "REQUESTER NAME")
        .column("roomNumber", "ROOM NUMBER")
        .column("buildingNumber", "BUILDING NUMBER")
        .column("requestHeading", "REQUEST HEADING")
        .column("description", "DESCRIPTION")
        .column("dateOfIssue", "DATE OF ISSUE")
        .column(STATUS_FIELD, "STATUS")
}

/// A resident's own requests. New requests are stamped with the current time.
pub fn resident_schema() -> ResourceSchema {
    let schema = ResourceSchema::new("maintenance request", IDENTITY_FIELD)
        .field(FieldSpec::text("requesterName", "Requester name").required("Please enter requester name."))
        .field(FieldSpec::text("roomNumber", "Room number").required("Please enter room number."))
        .field(
            FieldSpec::text("buildingNumber", "Building number")
                .required("Please enter building number."),
        )
        .field(
            FieldSpec::text("requestHeading", "Request heading")
                .required("Please enter request heading."),
        )
        .field(FieldSpec::text("description", "Description").required("Please enter description."))
        .field(FieldSpec::timestamp("dateOfIssue", "Date of issue").defaults_to_now())
        .owner_field("userId")
        .default_value("userType", "RESIDENT")
        .messages(
            ResourceMessages::default()
                .created(
                    "Maintenance request raised successfully",
                    Some("Failed to raise maintenance request"),
                )
                .removed(
                    "Maintenance request deleted successfully",
                    Some("Failed to delete maintenance request"),
                ),
        );
    with_request_columns(schema)
}

/// Every request in the building; only the status is editable.
pub fn admin_schema() -> ResourceSchema {
    let schema = ResourceSchema::new("maintenance request", IDENTITY_FIELD)
        .field(FieldSpec::timestamp("dateOfIssue", "Date of issue"))
        .editable(STATUS_FIELD, "Please enter status.")
        .messages(
            ResourceMessages::default().updated("Successfully Updated", Some("Failed to update status")),
        );
    with_request_columns(schema)
}

pub fn endpoints() -> Endpoints {
    Endpoints::new().create("/raise")
}

pub fn update_shape() -> UpdateShape {
    UpdateShape::new("requestId", "newStatus")
}
