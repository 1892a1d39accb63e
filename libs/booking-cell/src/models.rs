use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use scheduling_cell::SlotKey;
use shared_models::{Appointment, CreateAppointmentRequest, WIRE_TIMESTAMP_FORMAT};

use crate::error::BookingError;

/// Committed state of a booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSelection {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub doctor_name: Option<String>,
    pub date: NaiveDate,
    pub slot_key: Option<SlotKey>,
}

/// A selection that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub slot_key: SlotKey,
    pub start: NaiveDateTime,
}

impl ValidatedBooking {
    pub fn to_request(&self) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            time: self.start.format(WIRE_TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl BookingSelection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            patient_id: None,
            doctor_id: None,
            doctor_name: None,
            date,
            slot_key: None,
        }
    }

    pub fn for_patient(patient_id: Option<i64>, date: NaiveDate) -> Self {
        Self { patient_id, ..Self::new(date) }
    }

    /// Back to the default form: `today`, no doctor, no time.
    pub fn reset(&mut self, today: NaiveDate, keep_patient: bool) {
        let patient_id = if keep_patient { self.patient_id } else { None };
        *self = Self::for_patient(patient_id, today);
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> Result<ValidatedBooking, BookingError> {
        let patient_id = self
            .patient_id
            .ok_or_else(|| BookingError::InvalidForm("patient is required".to_string()))?;
        let doctor_id = self
            .doctor_id
            .ok_or_else(|| BookingError::InvalidForm("doctor is required".to_string()))?;

        if self.doctor_name.as_deref().map(str::trim).unwrap_or("").is_empty() {
            return Err(BookingError::InvalidForm("doctor name is required".to_string()));
        }

        let slot_key = self
            .slot_key
            .clone()
            .ok_or_else(|| BookingError::InvalidForm("time slot is required".to_string()))?;

        let start = slot_key
            .to_start()
            .ok_or_else(|| BookingError::InvalidForm(format!("unreadable slot '{}'", slot_key)))?;

        if start.date() != self.date {
            return Err(BookingError::InvalidForm(format!(
                "slot {} is not on {}", slot_key, self.date
            )));
        }

        Ok(ValidatedBooking { patient_id, doctor_id, slot_key, start })
    }
}

/// Where a submission currently is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BookingState {
    #[default]
    Idle,
    Validating,
    Conflict { slot_key: SlotKey },
    Submitting,
    Succeeded { appointment: Appointment },
    Failed { error: BookingError },
}

impl BookingState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, BookingState::Validating | BookingState::Submitting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingState::Conflict { .. } | BookingState::Succeeded { .. } | BookingState::Failed { .. }
        )
    }

    pub fn message(&self) -> Option<String> {
        match self {
            BookingState::Succeeded { .. } => Some("Appointment saved successfully".to_string()),
            BookingState::Conflict { slot_key } => {
                Some(BookingError::StaleConflict { slot_key: slot_key.clone() }.user_message())
            }
            BookingState::Failed { error } => Some(error.user_message()),
            _ => None,
        }
    }
}

/// What the slot grid should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridState {
    NoDoctorSelected,
    NoAvailability,
    Ready { total: usize, selectable: usize },
}

/// Identifies the selection a taken-slot read was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub doctor_id: i64,
    pub date: NaiveDate,
}
