use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::{BookingError, BookingSelection, BookingState, BookingSubmitter, RescheduleService};
use scheduling_cell::SlotKey;
use shared_api_client::{ClinicApi, ClinicApiClient};
use shared_models::{ApiError, BookingChannel};
use shared_utils::test_utils::{date, datetime, MockClinicResponses, TestConfig};

fn api_for(server: &MockServer) -> Arc<dyn ClinicApi> {
    Arc::new(ClinicApiClient::new(&TestConfig::for_server(server.uri()).to_app_config()).unwrap())
}

fn selection(time: &str) -> BookingSelection {
    BookingSelection {
        patient_id: Some(3),
        doctor_id: Some(7),
        doctor_name: Some("dr.grey".to_string()),
        date: date("2026-01-24"),
        slot_key: SlotKey::from_timestamp(&format!("2026-01-24T{}", time)),
    }
}

async fn mount_taken(server: &MockServer, times: &[&str]) {
    let body: Vec<_> = times
        .iter()
        .enumerate()
        .map(|(i, time)| MockClinicResponses::appointment_response(i as i64 + 100, time))
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .and(query_param("doctorId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(body)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_precheck_conflict_skips_booking_call() {
    let mock_server = MockServer::start().await;
    mount_taken(&mock_server, &["2026-01-24 09:15:00"]).await;

    Mock::given(method("POST"))
        .and(path("/api/patient/appointment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut submitter = BookingSubmitter::new(api_for(&mock_server), BookingChannel::Patient);
    let result = submitter.submit(&selection("09:15")).await;

    let key = SlotKey::from_timestamp("2026-01-24T09:15").unwrap();
    assert_eq!(result, Err(BookingError::StaleConflict { slot_key: key.clone() }));
    assert_eq!(submitter.state(), &BookingState::Conflict { slot_key: key });
    assert_eq!(
        submitter.state().message().unwrap(),
        "This slot has just been taken. Please choose another."
    );
}

#[tokio::test]
async fn test_successful_booking_posts_wire_time() {
    let mock_server = MockServer::start().await;
    mount_taken(&mock_server, &["2026-01-24 09:00:00"]).await;

    Mock::given(method("POST"))
        .and(path("/api/patient/appointment"))
        .and(query_param("patientId", "3"))
        .and(query_param("doctorId", "7"))
        .and(body_json(json!({
            "patientId": 3,
            "doctorId": 7,
            "time": "2026-01-24 09:15:00"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockClinicResponses::appointment_response(42, "2026-01-24 09:15:00")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut submitter = BookingSubmitter::new(api_for(&mock_server), BookingChannel::Patient);
    let appointment = submitter.submit(&selection("09:15")).await.unwrap();

    assert_eq!(appointment.id, 42);
    assert_matches!(submitter.state(), BookingState::Succeeded { .. });
    assert_eq!(submitter.state().message().unwrap(), "Appointment saved successfully");
}

#[tokio::test]
async fn test_failed_precheck_still_submits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/patient/appointment"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockClinicResponses::appointment_response(43, "2026-01-24 09:30:00")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut submitter = BookingSubmitter::new(api_for(&mock_server), BookingChannel::Patient);

    assert_eq!(submitter.submit(&selection("09:30")).await.unwrap().id, 43);
}

#[tokio::test]
async fn test_server_conflict_is_reported_distinctly() {
    let mock_server = MockServer::start().await;
    mount_taken(&mock_server, &[]).await;

    Mock::given(method("POST"))
        .and(path("/api/patient/appointment"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Slot already booked"))
        .mount(&mock_server)
        .await;

    let mut submitter = BookingSubmitter::new(api_for(&mock_server), BookingChannel::Patient);
    let error = submitter.submit(&selection("09:00")).await.unwrap_err();

    assert_matches!(error, BookingError::SubmissionConflict { .. });
    assert_eq!(
        error.user_message(),
        "Sorry, this slot was booked by someone else a moment ago. Please choose another."
    );
    assert_matches!(submitter.state(), BookingState::Failed { error: BookingError::SubmissionConflict { .. } });
}

#[tokio::test]
async fn test_collision_text_in_server_error_counts_as_conflict() {
    let mock_server = MockServer::start().await;
    mount_taken(&mock_server, &[]).await;

    Mock::given(method("POST"))
        .and(path("/api/patient/appointment"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Slot already booked"))
        .mount(&mock_server)
        .await;

    let mut submitter = BookingSubmitter::new(api_for(&mock_server), BookingChannel::Patient);

    assert_matches!(
        submitter.submit(&selection("09:00")).await,
        Err(BookingError::SubmissionConflict { .. })
    );
}

#[tokio::test]
async fn test_other_server_failure_is_generic() {
    let mock_server = MockServer::start().await;
    mount_taken(&mock_server, &[]).await;

    Mock::given(method("POST"))
        .and(path("/api/patient/appointment"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&mock_server)
        .await;

    let mut submitter = BookingSubmitter::new(api_for(&mock_server), BookingChannel::Patient);
    let error = submitter.submit(&selection("09:00")).await.unwrap_err();

    assert_matches!(error, BookingError::Transient(ApiError::Server { status: 500, .. }));
    assert_eq!(error.user_message(), "Failed to save appointment. Please try again.");

    // A failed attempt does not block the next one.
    assert!(submitter.can_submit(&selection("09:00")));
    submitter.acknowledge();
    assert_eq!(submitter.state(), &BookingState::Idle);
}

#[tokio::test]
async fn test_incomplete_form_makes_no_calls() {
    let mock_server = MockServer::start().await;

    let mut incomplete = selection("09:00");
    incomplete.slot_key = None;

    let mut submitter = BookingSubmitter::new(api_for(&mock_server), BookingChannel::Patient);

    assert!(!submitter.can_submit(&incomplete));
    assert_matches!(submitter.submit(&incomplete).await, Err(BookingError::InvalidForm(_)));
    assert_eq!(submitter.state(), &BookingState::Idle);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_receptionist_channel_posts_to_receptionist_endpoint() {
    let mock_server = MockServer::start().await;
    mount_taken(&mock_server, &[]).await;

    Mock::given(method("POST"))
        .and(path("/api/receptionist/appointment"))
        .and(query_param("patientId", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockClinicResponses::appointment_response(44, "2026-01-24 09:45:00")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut submitter = BookingSubmitter::new(api_for(&mock_server), BookingChannel::Receptionist);

    assert_eq!(submitter.submit(&selection("09:45")).await.unwrap().id, 44);
}

#[tokio::test]
async fn test_reschedule_sends_new_time() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/receptionist/appointment-reschedule/42"))
        .and(body_json(json!({ "time": "2026-01-25 14:30:00" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockClinicResponses::appointment_response(42, "2026-01-25 14:30:00")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = RescheduleService::new(api_for(&mock_server));
    let appointment = service.reschedule(42, datetime("2026-01-25 14:30")).await.unwrap();

    assert_eq!(appointment.timestamp(), Some("2026-01-25 14:30:00"));
}

#[tokio::test]
async fn test_reschedule_into_taken_slot_is_a_conflict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/receptionist/appointment-reschedule/42"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Slot already booked"))
        .mount(&mock_server)
        .await;

    let service = RescheduleService::new(api_for(&mock_server));
    let error = service.reschedule(42, datetime("2026-01-25 14:30")).await.unwrap_err();

    assert_eq!(error.conflicting_key().unwrap().as_str(), "2026-01-25T14:30");
}
