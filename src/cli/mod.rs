pub mod app;
pub mod ui;

use chrono::{Duration, Utc};
use communityhub_portal::connection::{MemoryCollection, Session};
use communityhub_portal::core::{Record, format_timestamp};
use communityhub_portal::resources::Screen;

/// In-process collection with a few rows, for `--offline` runs.
pub async fn offline_backend(screen: Screen, session: &Session) -> MemoryCollection {
    let schema = screen.schema();
    let backend = match screen.update_field() {
        Some(field) => MemoryCollection::new(&schema.identity_field, field),
        None => MemoryCollection::read_only(&schema.identity_field),
    }
    .with_owner_field("userId");
    let now = Utc::now();

    match screen {
        Screen::ResidentMaintenance | Screen::AdminMaintenance => {
            let rows = [
                ("Leaking tap", "Kitchen tap drips all night", "OPEN"),
                ("Lift stuck", "Lift B stops between floors 3 and 4", "IN_PROGRESS"),
            ];
            for (days, (heading, description, status)) in rows.into_iter().enumerate() {
                backend
                    .seed(
                        Record::new()
                            .with("requesterName", "Asha")
                            .with("roomNumber", "304")
                            .with("buildingNumber", "B2")
                            .with("requestHeading", heading)
                            .with("description", description)
                            .with("dateOfIssue", format_timestamp(now - Duration::days(days as i64 + 1)))
                            .with("status", status)
                            .with("userId", session.user_id()),
                    )
                    .await;
            }
        }
        Screen::Visitors => {
            backend
                .seed(
                    Record::new()
                        .with("visitorFullName", "Ravi Kumar")
                        .with("buildingNumber", "B2")
                        .with("purpose", "Delivery")
                        .with("checkInDate", format_timestamp(now + Duration::hours(2)))
                        .with("checkOutDate", format_timestamp(now + Duration::hours(3)))
                        .with("userId", session.user_id()),
                )
                .await;
        }
    }
    backend
}
