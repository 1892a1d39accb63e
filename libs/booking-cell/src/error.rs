use thiserror::Error;

use scheduling_cell::SlotKey;
use shared_models::ApiError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Booking form is incomplete: {0}")]
    InvalidForm(String),

    #[error("A booking is already in progress")]
    InProgress,

    #[error("Slot {slot_key} has just been taken")]
    StaleConflict { slot_key: SlotKey },

    #[error("Slot {slot_key} was booked by another client")]
    SubmissionConflict { slot_key: SlotKey },

    #[error("Failed to save appointment: {0}")]
    Transient(#[from] ApiError),
}

impl BookingError {
    /// Text shown to the person booking.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::InvalidForm(_) => {
                "Please fill in all required fields and choose a time slot.".to_string()
            }
            BookingError::InProgress => "Your booking is still being processed.".to_string(),
            BookingError::StaleConflict { .. } => {
                "This slot has just been taken. Please choose another.".to_string()
            }
            BookingError::SubmissionConflict { .. } => {
                "Sorry, this slot was booked by someone else a moment ago. Please choose another."
                    .to_string()
            }
            BookingError::Transient(_) => "Failed to save appointment. Please try again.".to_string(),
        }
    }

    pub fn is_slot_conflict(&self) -> bool {
        matches!(
            self,
            BookingError::StaleConflict { .. } | BookingError::SubmissionConflict { .. }
        )
    }

    pub fn conflicting_key(&self) -> Option<&SlotKey> {
        match self {
            BookingError::StaleConflict { slot_key } | BookingError::SubmissionConflict { slot_key } => {
                Some(slot_key)
            }
            _ => None,
        }
    }
}
