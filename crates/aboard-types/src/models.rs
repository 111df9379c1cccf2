use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::seats::SeatId;

/// A guest's submission as it exists before persistence.
///
/// `selected_seats` is kept duplicate-free by the form controller; the
/// submit-time invariant is `selected_seats.len() == guests as usize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary: Option<String>,
    pub guests: u32,
    pub selected_seats: Vec<SeatId>,
}

/// A persisted booking. Created once at submission time, appended to the
/// local store, never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(flatten)]
    pub request: BookingRequest,
    /// Creation time in epoch milliseconds; doubles as the record id.
    pub id: i64,
    /// Human-facing identifier, `ADA` + the id's trailing six digits.
    /// Not guaranteed globally unique.
    pub confirmation_number: String,
    pub timestamp: DateTime<Utc>,
}
