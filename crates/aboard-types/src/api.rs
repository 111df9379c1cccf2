use serde::{Deserialize, Serialize};

use crate::models::BookingRecord;
use crate::seats::SeatId;

// -- Mail dispatcher --

/// Body of `POST /send-confirmation`.
///
/// Every field is optional at the wire level so the handler can enforce the
/// required-field contract itself and answer with a 400 body instead of a
/// deserialization rejection. Empty strings count as missing, matching what
/// the form would never legitimately send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConfirmationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub selected_seats: Option<Vec<String>>,
    pub guests: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary: Option<String>,
    pub confirmation_number: Option<String>,
}

impl SendConfirmationRequest {
    /// Payload the form controller sends for a freshly persisted booking.
    pub fn from_record(record: &BookingRecord) -> Self {
        Self {
            name: Some(record.request.name.clone()),
            email: Some(record.request.email.clone()),
            selected_seats: Some(
                record
                    .request
                    .selected_seats
                    .iter()
                    .map(SeatId::to_string)
                    .collect(),
            ),
            guests: Some(record.request.guests),
            phone: record.request.phone.clone(),
            dietary: record.request.dietary.clone(),
            confirmation_number: Some(record.confirmation_number.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConfirmationResponse {
    pub success: bool,
    pub message_id: String,
    pub message: String,
}

/// Error body for 400/500 responses: `details` and `code` carry the mail
/// provider's diagnostics when the relay rejects a send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

// -- Health --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
