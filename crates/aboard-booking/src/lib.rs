//! Client-side booking pipeline: the form controller state machine, the
//! HTTP client for the mail dispatcher, and the decorative cabin seat map.

pub mod controller;
pub mod mailer;
pub mod seatmap;

pub use controller::{BookingController, EmailOutcome, Phase, FALLBACK_PHONE};
pub use mailer::{ConfirmationMailer, DispatchError, HttpMailer};
pub use seatmap::SeatMap;
