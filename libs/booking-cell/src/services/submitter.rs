use std::sync::Arc;

use tracing::{debug, info, warn};

use scheduling_cell::TakenSlotReconciler;
use shared_api_client::ClinicApi;
use shared_models::{ApiError, Appointment, BookingChannel};

use crate::error::BookingError;
use crate::models::{BookingSelection, BookingState};

/// Runs one booking attempt: local validation, a fresh taken-slot
/// re-check, then the create call.
pub struct BookingSubmitter {
    api: Arc<dyn ClinicApi>,
    channel: BookingChannel,
    state: BookingState,
}

impl BookingSubmitter {
    pub fn new(api: Arc<dyn ClinicApi>, channel: BookingChannel) -> Self {
        Self {
            api,
            channel,
            state: BookingState::Idle,
        }
    }

    pub fn channel(&self) -> BookingChannel {
        self.channel
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn can_submit(&self, selection: &BookingSelection) -> bool {
        !self.state.is_in_flight() && selection.is_complete()
    }

    /// Clears a terminal outcome so the next attempt starts from Idle.
    pub fn acknowledge(&mut self) {
        if self.state.is_terminal() {
            self.state = BookingState::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.state = BookingState::Idle;
    }

    pub async fn submit(&mut self, selection: &BookingSelection) -> Result<Appointment, BookingError> {
        if self.state.is_in_flight() {
            return Err(BookingError::InProgress);
        }

        // Invalid forms never reach the network and leave the state untouched.
        let booking = selection.validate()?;

        let api = Arc::clone(&self.api);
        let channel = self.channel;
        let mut state = InFlight::new(&mut self.state);

        state.set(BookingState::Validating);
        match api.fetch_appointments_for_doctor(booking.doctor_id).await {
            Ok(appointments) => {
                if TakenSlotReconciler::is_key_taken(&booking.slot_key, &appointments) {
                    warn!("Slot {} for doctor {} was taken before submit", booking.slot_key, booking.doctor_id);
                    state.set(BookingState::Conflict { slot_key: booking.slot_key.clone() });
                    return Err(BookingError::StaleConflict { slot_key: booking.slot_key });
                }
            }
            Err(e) => {
                // The server still rejects double bookings, so go ahead.
                warn!("Taken-slot re-check failed for doctor {}: {}", booking.doctor_id, e);
            }
        }

        state.set(BookingState::Submitting);
        let request = booking.to_request();
        debug!("Submitting booking via {:?} channel at {}", channel, request.time);

        match api.create_appointment(channel, &request).await {
            Ok(appointment) => {
                info!(
                    "Appointment {} booked for patient {} with doctor {} at {}",
                    appointment.id, booking.patient_id, booking.doctor_id, request.time
                );
                state.set(BookingState::Succeeded { appointment: appointment.clone() });
                Ok(appointment)
            }
            Err(e) => {
                let error = classify_failure(e, &booking.slot_key);
                warn!("Booking failed for slot {}: {}", booking.slot_key, error);
                state.set(BookingState::Failed { error: error.clone() });
                Err(error)
            }
        }
    }
}

/// Holds the submitter state for one attempt. If the attempt is dropped
/// mid-flight the state falls back to `Idle`.
struct InFlight<'a> {
    state: &'a mut BookingState,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a mut BookingState) -> Self {
        Self { state }
    }

    fn set(&mut self, next: BookingState) {
        *self.state = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.state.is_in_flight() {
            warn!("Booking attempt abandoned while {:?}, back to idle", self.state);
            *self.state = BookingState::Idle;
        }
    }
}

pub(crate) fn classify_failure(error: ApiError, slot_key: &scheduling_cell::SlotKey) -> BookingError {
    if error.is_conflict() {
        BookingError::SubmissionConflict { slot_key: slot_key.clone() }
    } else {
        BookingError::Transient(error)
    }
}
