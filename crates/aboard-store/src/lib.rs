use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use aboard_types::models::{BookingRecord, BookingRequest};

/// Storage key the booking list lives under, as `{key}.json` in the store
/// directory. Fixed so every session of the same client reads one list.
pub const STORAGE_KEY: &str = "ada2024_bookings";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium could not be read or written. Fatal to the
    /// submission in progress; the caller must not confirm the booking.
    #[error("booking storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Append-only local persistence for bookings.
///
/// The whole list is kept as one JSON document and rewritten on every save,
/// mirroring how a single-session client treats its local storage. Records
/// are never mutated or deleted once written.
pub struct BookingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl BookingStore {
    /// Open (or create) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{STORAGE_KEY}.json"));
        info!("Booking store at {}", path.display());
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Persist a submission: mint the id and confirmation number, stamp the
    /// time, append, write the full list back.
    pub fn save(&self, request: BookingRequest) -> Result<BookingRecord, StoreError> {
        let _guard = self.lock.lock().map_err(|e| {
            StoreError::Unavailable(format!("store lock poisoned: {e}"))
        })?;

        let mut records = self.read_all()?;

        let id = Utc::now().timestamp_millis();
        let record = BookingRecord {
            request,
            id,
            confirmation_number: mint_confirmation_number(id),
            timestamp: Utc::now(),
        };
        records.push(record.clone());

        let encoded = serde_json::to_vec_pretty(&records)?;
        fs::write(&self.path, encoded)?;

        Ok(record)
    }

    /// Every booking saved so far, oldest first.
    pub fn all(&self) -> Result<Vec<BookingRecord>, StoreError> {
        let _guard = self.lock.lock().map_err(|e| {
            StoreError::Unavailable(format!("store lock poisoned: {e}"))
        })?;
        self.read_all()
    }

    fn read_all(&self) -> Result<Vec<BookingRecord>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// `ADA` + the id's trailing six digits, zero-padded.
///
/// Derived from creation time at millisecond granularity; collisions are not
/// mathematically excluded and no uniqueness check is performed.
pub fn mint_confirmation_number(id: i64) -> String {
    format!("ADA{:06}", id.rem_euclid(1_000_000))
}
