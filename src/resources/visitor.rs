//! Visitor log: residents pre-register visits inside a check-in/check-out
//! window.

use crate::connection::Endpoints;
use crate::schema::{FieldSpec, ResourceMessages, ResourceSchema};

pub const IDENTITY_FIELD: &str = "visitorId";

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("visitor", IDENTITY_FIELD)
        .field(FieldSpec::text("visitorFullName", "Visitor name").required("Please enter visitor name."))
        .field(
            FieldSpec::text("buildingNumber", "Building number")
                .required("Please enter building number."),
        )
        .field(FieldSpec::text("purpose", "Purpose").required("Please enter purpose."))
        .field(FieldSpec::timestamp("checkInDate", "Check-in date").required("Please select check-in date."))
        .field(
            FieldSpec::timestamp("checkOutDate", "Check-out date")
                .required("Please select check-out date."),
        )
        .window("checkInDate", "checkOutDate")
        .owner_field("userId")
        .default_value("userType", "RESIDENT")
        .column("visitorFullName", "VISITOR NAME")
        .column("buildingNumber", "BUILDING NUMBER")
        .column("purpose", "PURPOSE")
        .column("checkInDate", "CHECK-IN DATE")
        .column("checkOutDate", "CHECK-OUT DATE")
        .messages(
            ResourceMessages::default()
                .created("Visitor added successfully!", Some("Failed to add visitor"))
                .removed("Visitor deleted successfully!", Some("Failed to delete visitor")),
        )
}

pub fn endpoints() -> Endpoints {
    Endpoints::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validator::{END_NOT_AFTER_START_MESSAGE, START_IN_PAST_MESSAGE};
    use crate::schema::{SchemaValidator, ValidationContext, Validator};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_window_rule_applies_to_visits() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let schema = schema();
        let draft = schema
            .draft_template(now)
            .with("visitorFullName", "Asha")
            .with("buildingNumber", "B2")
            .with("purpose", "Delivery")
            .with("checkInDate", "2026-10-19T11:00:00Z")
            .with("checkOutDate", "2026-10-19T10:00:00Z");

        let errors = SchemaValidator::new(&schema).validate(&draft, &ValidationContext::at(now));
        assert_eq!(
            errors.messages(),
            vec![START_IN_PAST_MESSAGE, END_NOT_AFTER_START_MESSAGE]
        );
    }

    #[test]
    fn test_missing_dates_use_select_messages() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let schema = schema();
        let draft = schema.draft_template(now);

        let errors = SchemaValidator::new(&schema).validate(&draft, &ValidationContext::at(now));
        assert_eq!(errors.get("checkInDate"), Some("Please select check-in date."));
        assert_eq!(errors.get("checkOutDate"), Some("Please select check-out date."));
        assert_eq!(errors.len(), 5);
    }
}
