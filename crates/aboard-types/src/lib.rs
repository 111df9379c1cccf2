pub mod api;
pub mod models;
pub mod seats;

/// Flight code printed on the boarding pass and every confirmation email.
pub const FLIGHT_NUMBER: &str = "ADA2024";
