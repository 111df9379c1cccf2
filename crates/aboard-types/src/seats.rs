use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cabin rows, front to back.
pub const ROWS: [char; 10] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Seats per row (three either side of the aisle).
pub const COLUMNS_PER_ROW: u8 = 6;

/// A single cabin seat, e.g. `A1` or `J6`.
///
/// Seat ids are advisory only: nothing in the pipeline reserves them
/// server-side, two bookings may legitimately end up claiming the same seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    row: char,
    column: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeatParseError {
    #[error("seat id must be a row letter followed by a column number, got {0:?}")]
    Malformed(String),
    #[error("row {0:?} is outside A-J")]
    RowOutOfRange(char),
    #[error("column {0} is outside 1-{max}", max = COLUMNS_PER_ROW)]
    ColumnOutOfRange(u8),
}

impl SeatId {
    pub fn new(row: char, column: u8) -> Result<Self, SeatParseError> {
        if !ROWS.contains(&row) {
            return Err(SeatParseError::RowOutOfRange(row));
        }
        if column < 1 || column > COLUMNS_PER_ROW {
            return Err(SeatParseError::ColumnOutOfRange(column));
        }
        Ok(Self { row, column })
    }

    pub fn row(&self) -> char {
        self.row
    }

    pub fn column(&self) -> u8 {
        self.column
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl FromStr for SeatId {
    type Err = SeatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let row = chars
            .next()
            .ok_or_else(|| SeatParseError::Malformed(s.to_string()))?;
        let column: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| SeatParseError::Malformed(s.to_string()))?;
        Self::new(row.to_ascii_uppercase(), column)
    }
}

impl TryFrom<String> for SeatId {
    type Error = SeatParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.to_string()
    }
}

/// Render a selection the way the confirmation email expects it: `"A1, A2"`.
pub fn format_seats(seats: &[SeatId]) -> String {
    seats
        .iter()
        .map(SeatId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
