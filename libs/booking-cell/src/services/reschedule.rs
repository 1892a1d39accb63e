use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use scheduling_cell::SlotKey;
use shared_api_client::ClinicApi;
use shared_models::{Appointment, RescheduleAppointmentRequest, WIRE_TIMESTAMP_FORMAT};

use crate::error::BookingError;
use crate::services::submitter::classify_failure;

/// Moves an existing appointment to a new start time (receptionist flow).
pub struct RescheduleService {
    api: Arc<dyn ClinicApi>,
}

impl RescheduleService {
    pub fn new(api: Arc<dyn ClinicApi>) -> Self {
        Self { api }
    }

    pub async fn reschedule(
        &self,
        appointment_id: i64,
        start: NaiveDateTime,
    ) -> Result<Appointment, BookingError> {
        let request = RescheduleAppointmentRequest {
            time: start.format(WIRE_TIMESTAMP_FORMAT).to_string(),
        };

        match self.api.reschedule_appointment(appointment_id, &request).await {
            Ok(appointment) => {
                info!("Appointment {} rescheduled to {}", appointment_id, request.time);
                Ok(appointment)
            }
            Err(e) => {
                warn!("Failed to reschedule appointment {}: {}", appointment_id, e);
                Err(classify_failure(e, &SlotKey::from_start(start)))
            }
        }
    }
}
