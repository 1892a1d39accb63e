use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use shared_models::{
    ApiError, Appointment, BookingChannel, CreateAppointmentRequest, Doctor,
    RescheduleAppointmentRequest,
};

use crate::client::ClinicApiClient;

/// Operations the booking views need from the clinic server.
#[async_trait]
pub trait ClinicApi: Send + Sync {
    async fn fetch_doctors(&self) -> Result<Vec<Doctor>, ApiError>;

    async fn fetch_appointments_for_doctor(&self, doctor_id: i64) -> Result<Vec<Appointment>, ApiError>;

    async fn fetch_appointments_for_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, ApiError>;

    /// Every appointment in the clinic (receptionist view).
    async fn fetch_all_appointments(&self) -> Result<Vec<Appointment>, ApiError>;

    async fn create_appointment(
        &self,
        channel: BookingChannel,
        request: &CreateAppointmentRequest,
    ) -> Result<Appointment, ApiError>;

    async fn reschedule_appointment(
        &self,
        appointment_id: i64,
        request: &RescheduleAppointmentRequest,
    ) -> Result<Appointment, ApiError>;

    async fn update_doctor_availability(&self, doctor_id: i64, availability: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ClinicApi for ClinicApiClient {
    async fn fetch_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        let doctors: Vec<Doctor> = self.request(
            Method::GET,
            "/api/patient/doctors",
            &[],
            None,
        ).await?;

        debug!("Fetched {} doctors", doctors.len());
        Ok(doctors)
    }

    async fn fetch_appointments_for_doctor(&self, doctor_id: i64) -> Result<Vec<Appointment>, ApiError> {
        self.request(
            Method::GET,
            "/api/doctor/appointments",
            &[("doctorId", doctor_id.to_string())],
            None,
        ).await
    }

    async fn fetch_appointments_for_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, ApiError> {
        self.request(
            Method::GET,
            "/api/patient/appointments",
            &[("patientId", patient_id.to_string())],
            None,
        ).await
    }

    async fn fetch_all_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        let appointments: Vec<Appointment> = self.request(
            Method::GET,
            "/api/receptionist/appointments",
            &[],
            None,
        ).await?;

        debug!("Fetched {} appointments", appointments.len());
        Ok(appointments)
    }

    async fn create_appointment(
        &self,
        channel: BookingChannel,
        request: &CreateAppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        debug!("Creating appointment for patient {} with doctor {} at {}",
               request.patient_id, request.doctor_id, request.time);

        self.request(
            Method::POST,
            channel.create_path(),
            &[
                ("patientId", request.patient_id.to_string()),
                ("doctorId", request.doctor_id.to_string()),
            ],
            Some(serde_json::to_value(request)?),
        ).await
    }

    async fn reschedule_appointment(
        &self,
        appointment_id: i64,
        request: &RescheduleAppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        let path = format!("/api/receptionist/appointment-reschedule/{}", appointment_id);

        self.request(
            Method::PUT,
            &path,
            &[],
            Some(serde_json::to_value(request)?),
        ).await
    }

    async fn update_doctor_availability(&self, doctor_id: i64, availability: &str) -> Result<(), ApiError> {
        self.request_unit(
            Method::POST,
            "/api/doctor/availability",
            &[
                ("doctorId", doctor_id.to_string()),
                ("availability", availability.to_string()),
            ],
            None,
        ).await
    }
}
