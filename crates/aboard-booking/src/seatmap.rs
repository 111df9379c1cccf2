use std::collections::BTreeSet;

use rand::Rng;

use aboard_types::seats::{SeatId, COLUMNS_PER_ROW, ROWS};

/// Chance that any given seat renders as occupied.
pub const OCCUPIED_PROBABILITY: f64 = 0.3;

/// Decorative cabin occupancy for the seat-selection screen.
///
/// This is cosmetic UI state only: the draw is per render, backed by no
/// shared ledger, and never consulted when a booking is submitted. Two
/// sessions can — and will — see different occupancy for the same seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatMap {
    occupied: BTreeSet<SeatId>,
}

impl SeatMap {
    /// Draw a fresh advisory occupancy sample.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let occupied = Self::seats()
            .filter(|_| rng.random_bool(OCCUPIED_PROBABILITY))
            .collect();
        Self { occupied }
    }

    /// Every seat in the cabin, row by row.
    pub fn seats() -> impl Iterator<Item = SeatId> {
        ROWS.into_iter().flat_map(|row| {
            (1..=COLUMNS_PER_ROW).map(move |column| {
                // Rows and columns come straight from the cabin constants.
                SeatId::new(row, column).unwrap()
            })
        })
    }

    pub fn is_occupied(&self, seat: SeatId) -> bool {
        self.occupied.contains(&seat)
    }

    pub fn occupied(&self) -> &BTreeSet<SeatId> {
        &self.occupied
    }
}
