use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Point-in-time snapshot of an event and its seating layout.
///
/// `booked_seats` values are copied out of the live counters at read time;
/// the snapshot itself is plain data and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDateTime,
    #[serde(rename = "createdAt")]
    pub created_at: NaiveDateTime,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: Uuid,
    pub name: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "totalSeats")]
    pub total_seats: u32,
    #[serde(rename = "bookedSeats")]
    pub booked_seats: u32,
}

impl Row {
    pub fn available_seats(&self) -> u32 {
        self.total_seats - self.booked_seats
    }
}

/// Creation payload for `POST /events`. Section and row identifiers are
/// assigned by the store, so row identity is unique across the whole event
/// by construction.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    #[validate(nested)]
    pub sections: Vec<CreateSectionRequest>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSectionRequest {
    #[validate(length(min = 1, message = "Section name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub rows: Vec<CreateRowRequest>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRowRequest {
    #[validate(length(min = 1, message = "Row name is required"))]
    pub name: String,
    #[serde(rename = "totalSeats")]
    pub total_seats: u32,
}

/// Read-only availability projection for one section.
#[derive(Debug, Clone, Serialize)]
pub struct SectionAvailability {
    pub id: Uuid,
    pub name: String,
    pub rows: Vec<RowAvailability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowAvailability {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "availableSeats")]
    pub available_seats: u32,
}
