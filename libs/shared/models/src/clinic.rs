use serde::{Deserialize, Serialize};

/// Wire format for timestamps sent on create and reschedule.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: i64,
    #[serde(rename = "username", default)]
    pub display_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(rename = "availability", default)]
    pub availability_text: Option<String>,
}

impl Doctor {
    pub fn display_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            "Doctor"
        } else {
            &self.display_name
        }
    }

    pub fn availability(&self) -> &str {
        self.availability_text.as_deref().unwrap_or("")
    }

    pub fn has_specialty(&self, specialty: &str) -> bool {
        self.specialty
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case(specialty.trim()))
            .unwrap_or(false)
    }
}

/// Narrows a doctor list to one specialty, keeping server order.
pub fn filter_by_specialty(doctors: &[Doctor], specialty: &str) -> Vec<Doctor> {
    doctors
        .iter()
        .filter(|doctor| doctor.has_specialty(specialty))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    #[serde(rename = "appointmentTime", default)]
    pub appointment_timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Appointment {
    pub fn timestamp(&self) -> Option<&str> {
        self.appointment_timestamp
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
    }
}

/// Body of a booking-creation call. `time` is in [`WIRE_TIMESTAMP_FORMAT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleAppointmentRequest {
    pub time: String,
}

/// Which role's endpoint a booking goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    Patient,
    Receptionist,
}

impl BookingChannel {
    pub fn create_path(&self) -> &'static str {
        match self {
            BookingChannel::Patient => "/api/patient/appointment",
            BookingChannel::Receptionist => "/api/receptionist/appointment",
        }
    }

    /// Whether the patient id survives a form reset after a successful booking.
    pub fn keeps_patient_after_reset(&self) -> bool {
        matches!(self, BookingChannel::Patient)
    }
}
