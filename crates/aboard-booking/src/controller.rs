use tracing::{info, warn};

use aboard_store::{BookingStore, StoreError};
use aboard_types::api::SendConfirmationRequest;
use aboard_types::models::{BookingRecord, BookingRequest};
use aboard_types::seats::{format_seats, SeatId};

use crate::mailer::ConfirmationMailer;

/// Operator phone number surfaced when the confirmation email could not be
/// sent. The booking itself still stands.
pub const FALLBACK_PHONE: &str = "+34 600 192 020";

/// Whether the confirmation email went out for a confirmed booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailOutcome {
    Sent,
    Failed,
}

/// The controller's terminal UI states. Exactly one holds at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Editing,
    Submitting,
    Confirmed {
        record: BookingRecord,
        email: EmailOutcome,
    },
}

/// Client-side state machine gating submission and sequencing the two side
/// effects: persist locally, then dispatch the confirmation email.
///
/// A persistence failure aborts the submission and returns to `Editing` with
/// a retry prompt. An email failure never does: the booking is already saved,
/// so the phase still moves to `Confirmed`, degraded to the phone fallback.
pub struct BookingController<M> {
    store: BookingStore,
    mailer: M,
    name: String,
    email: String,
    phone: String,
    dietary: String,
    guests: u32,
    selected_seats: Vec<SeatId>,
    phase: Phase,
    error: Option<String>,
}

impl<M: ConfirmationMailer> BookingController<M> {
    pub fn new(store: BookingStore, mailer: M) -> Self {
        Self {
            store,
            mailer,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            dietary: String::new(),
            guests: 1,
            selected_seats: Vec::new(),
            phase: Phase::Editing,
            error: None,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn guests(&self) -> u32 {
        self.guests
    }

    pub fn selected_seats(&self) -> &[SeatId] {
        &self.selected_seats
    }

    // -- Field edits (Editing phase only) --

    pub fn set_name(&mut self, name: impl Into<String>) {
        if self.editing() {
            self.name = name.into();
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        if self.editing() {
            self.email = email.into();
        }
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        if self.editing() {
            self.phone = phone.into();
        }
    }

    pub fn set_dietary(&mut self, dietary: impl Into<String>) {
        if self.editing() {
            self.dietary = dietary.into();
        }
    }

    /// Change the guest count. The seat selection is scoped to a guest count,
    /// so any change clears it entirely.
    pub fn set_guests(&mut self, guests: u32) {
        if !self.editing() || guests == 0 {
            return;
        }
        self.guests = guests;
        self.selected_seats.clear();
    }

    /// Toggle a seat in the selection. Adding past the guest-count capacity
    /// is silently ignored; removal is always allowed.
    pub fn select_seat(&mut self, seat: SeatId) {
        if !self.editing() {
            return;
        }
        if let Some(pos) = self.selected_seats.iter().position(|s| *s == seat) {
            self.selected_seats.remove(pos);
        } else if self.selected_seats.len() < self.guests as usize {
            self.selected_seats.push(seat);
        }
    }

    /// The submission gate: one seat per guest, name and email present.
    pub fn can_submit(&self) -> bool {
        self.selected_seats.len() == self.guests as usize
            && !self.name.is_empty()
            && !self.email.is_empty()
    }

    /// Run the submission pipeline. A no-op unless the gate holds and the
    /// phase is `Editing` (resubmission while in flight or after confirmation
    /// does nothing).
    pub async fn submit(&mut self) {
        if !self.editing() || !self.can_submit() {
            return;
        }
        self.error = None;
        self.phase = Phase::Submitting;

        let request = BookingRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: none_if_empty(&self.phone),
            dietary: none_if_empty(&self.dietary),
            guests: self.guests,
            selected_seats: self.selected_seats.clone(),
        };

        let record = match self.store.save(request) {
            Ok(record) => record,
            Err(StoreError::Unavailable(reason)) => {
                warn!("Could not persist booking: {reason}");
                self.error =
                    Some("No pudimos guardar tu reserva. Inténtalo de nuevo.".to_string());
                self.phase = Phase::Editing;
                return;
            }
        };
        info!(
            "Booking {} persisted for {}",
            record.confirmation_number, record.request.name
        );

        let payload = SendConfirmationRequest::from_record(&record);
        let email = match self.mailer.send_confirmation(payload).await {
            Ok(message_id) => {
                info!("Confirmation email dispatched: {message_id}");
                EmailOutcome::Sent
            }
            Err(e) => {
                warn!("Confirmation email failed, booking stands: {e}");
                EmailOutcome::Failed
            }
        };

        self.phase = Phase::Confirmed { record, email };
    }

    /// Message for the confirmation screen, once confirmed. The degraded
    /// variant carries the operator phone number prominently.
    pub fn confirmation_notice(&self) -> Option<String> {
        match &self.phase {
            Phase::Confirmed { record, email } => {
                let seats = format_seats(&record.request.selected_seats);
                Some(match email {
                    EmailOutcome::Sent => format!(
                        "¡Reserva confirmada! Número de confirmación {} · Asientos {}.",
                        record.confirmation_number, seats
                    ),
                    EmailOutcome::Failed => format!(
                        "¡Reserva confirmada! Número de confirmación {} · Asientos {}. \
                         No pudimos enviar el email de confirmación: llámanos al {}.",
                        record.confirmation_number, seats, FALLBACK_PHONE
                    ),
                })
            }
            _ => None,
        }
    }

    fn editing(&self) -> bool {
        matches!(self.phase, Phase::Editing)
    }
}

fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::DispatchError;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Records every dispatch; optionally fails like an unreachable relay.
    struct MockMailer {
        calls: Arc<Mutex<Vec<SendConfirmationRequest>>>,
        fail: bool,
    }

    impl MockMailer {
        fn new(fail: bool) -> (Self, Arc<Mutex<Vec<SendConfirmationRequest>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    fail,
                },
                calls,
            )
        }
    }

    impl ConfirmationMailer for MockMailer {
        async fn send_confirmation(
            &self,
            payload: SendConfirmationRequest,
        ) -> Result<String, DispatchError> {
            self.calls.lock().unwrap().push(payload);
            if self.fail {
                Err(DispatchError::Transport("connection refused".into()))
            } else {
                Ok("<test-message@smtp.gmail.com>".into())
            }
        }
    }

    fn seat(s: &str) -> SeatId {
        s.parse().unwrap()
    }

    fn controller(
        dir: &TempDir,
        fail_mail: bool,
    ) -> (
        BookingController<MockMailer>,
        Arc<Mutex<Vec<SendConfirmationRequest>>>,
    ) {
        let store = BookingStore::open(dir.path()).unwrap();
        let (mailer, calls) = MockMailer::new(fail_mail);
        (BookingController::new(store, mailer), calls)
    }

    fn fill_ana(c: &mut BookingController<MockMailer>) {
        c.set_name("Ana");
        c.set_email("a@x.com");
        c.set_guests(2);
        c.select_seat(seat("A1"));
        c.select_seat(seat("A2"));
    }

    #[test]
    fn seat_toggle_respects_capacity() {
        let dir = TempDir::new().unwrap();
        let (mut c, _) = controller(&dir, false);

        // guests defaults to 1
        c.select_seat(seat("A1"));
        c.select_seat(seat("A2")); // over capacity, silently ignored
        assert_eq!(c.selected_seats(), [seat("A1")]);

        // toggling an already-selected seat removes it even at capacity
        c.select_seat(seat("A1"));
        assert!(c.selected_seats().is_empty());
    }

    #[test]
    fn changing_guest_count_clears_selection() {
        let dir = TempDir::new().unwrap();
        let (mut c, _) = controller(&dir, false);

        c.set_guests(2);
        c.select_seat(seat("B3"));
        c.select_seat(seat("B4"));
        c.set_guests(3);
        assert!(c.selected_seats().is_empty());

        // zero guests is never accepted
        c.set_guests(0);
        assert_eq!(c.guests(), 3);
    }

    #[tokio::test]
    async fn submit_is_a_noop_on_seat_mismatch() {
        let dir = TempDir::new().unwrap();
        let (mut c, calls) = controller(&dir, false);

        c.set_name("Ana");
        c.set_email("a@x.com");
        c.set_guests(2);
        c.select_seat(seat("A1")); // one seat short

        c.submit().await;
        assert_eq!(*c.phase(), Phase::Editing);
        assert!(calls.lock().unwrap().is_empty());
        assert!(c.store.all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_requires_name_and_email() {
        let dir = TempDir::new().unwrap();
        let (mut c, calls) = controller(&dir, false);

        c.set_guests(1);
        c.select_seat(seat("A1"));
        c.submit().await;
        assert_eq!(*c.phase(), Phase::Editing);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn happy_path_confirms_and_dispatches_once() {
        let dir = TempDir::new().unwrap();
        let (mut c, calls) = controller(&dir, false);
        fill_ana(&mut c);

        c.submit().await;

        let Phase::Confirmed { record, email } = c.phase().clone() else {
            panic!("expected Confirmed, got {:?}", c.phase());
        };
        assert_eq!(email, EmailOutcome::Sent);
        assert_eq!(record.request.name, "Ana");
        assert!(record.confirmation_number.starts_with("ADA"));
        assert_eq!(record.confirmation_number.len(), 9);

        // exactly one record in the store
        let records = c.store.all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], record);

        // exactly one dispatch, payload matching the persisted record
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name.as_deref(), Some("Ana"));
        assert_eq!(
            calls[0].selected_seats,
            Some(vec!["A1".to_string(), "A2".to_string()])
        );
        assert_eq!(calls[0].guests, Some(2));
        assert_eq!(
            calls[0].confirmation_number.as_deref(),
            Some(record.confirmation_number.as_str())
        );

        let notice = c.confirmation_notice().unwrap();
        assert!(notice.contains(&record.confirmation_number));
        assert!(!notice.contains(FALLBACK_PHONE));
    }

    #[tokio::test]
    async fn mail_failure_degrades_but_still_confirms() {
        let dir = TempDir::new().unwrap();
        let (mut c, calls) = controller(&dir, true);
        fill_ana(&mut c);

        c.submit().await;

        let Phase::Confirmed { record, email } = c.phase().clone() else {
            panic!("expected Confirmed, got {:?}", c.phase());
        };
        assert_eq!(email, EmailOutcome::Failed);
        assert_eq!(calls.lock().unwrap().len(), 1); // no retry

        // booking persisted despite the failed email
        assert_eq!(c.store.all().unwrap().len(), 1);

        let notice = c.confirmation_notice().unwrap();
        assert!(notice.contains(&record.confirmation_number));
        assert!(notice.contains(FALLBACK_PHONE));
    }

    #[tokio::test]
    async fn store_failure_aborts_the_submission() {
        let dir = TempDir::new().unwrap();
        let (mut c, calls) = controller(&dir, false);
        fill_ana(&mut c);

        // Make the storage key unwritable before submitting.
        fs::create_dir(dir.path().join(format!("{}.json", aboard_store::STORAGE_KEY))).unwrap();

        c.submit().await;
        assert_eq!(*c.phase(), Phase::Editing);
        assert!(c.error().is_some());
        assert!(calls.lock().unwrap().is_empty()); // email never attempted
    }

    #[tokio::test]
    async fn confirmed_controller_ignores_further_input() {
        let dir = TempDir::new().unwrap();
        let (mut c, calls) = controller(&dir, false);
        fill_ana(&mut c);

        c.submit().await;
        c.select_seat(seat("C5"));
        c.set_name("Otro");
        c.submit().await;

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(c.store.all().unwrap().len(), 1);
    }
}
