use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_api_client::{ClinicApi, ClinicApiClient};
use shared_models::{
    ApiError, BookingChannel, CreateAppointmentRequest, RescheduleAppointmentRequest,
};
use shared_utils::test_utils::{MockClinicResponses, TestConfig};

fn client_for(server: &MockServer) -> ClinicApiClient {
    ClinicApiClient::new(&TestConfig::for_server(server.uri()).to_app_config()).unwrap()
}

#[tokio::test]
async fn test_fetch_doctors_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/patient/doctors"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::doctor_response(1, "dr.grey", "Surgery", "2026-01-24 09:00-09:30"),
            MockClinicResponses::doctor_response(2, "dr.house", "Diagnostics", ""),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let doctors = client_for(&mock_server).fetch_doctors().await.unwrap();

    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0].display_name(), "dr.grey");
    assert_eq!(doctors[0].availability(), "2026-01-24 09:00-09:30");
}

#[tokio::test]
async fn test_anonymous_client_omits_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/patient/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let mut config = TestConfig::for_server(mock_server.uri()).to_app_config();
    config.api_token = String::new();
    let client = ClinicApiClient::new(&config).unwrap();

    assert!(client.fetch_doctors().await.unwrap().is_empty());

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_fetch_appointments_for_doctor_uses_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .and(query_param("doctorId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::appointment_response(10, "2026-01-24 09:00:00"),
            { "id": 11, "appointmentTime": null },
        ])))
        .mount(&mock_server)
        .await;

    let appointments = client_for(&mock_server)
        .fetch_appointments_for_doctor(7)
        .await
        .unwrap();

    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[0].timestamp(), Some("2026-01-24 09:00:00"));
    assert_eq!(appointments[1].timestamp(), None);
}

#[tokio::test]
async fn test_create_appointment_patient_channel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/patient/appointment"))
        .and(query_param("patientId", "3"))
        .and(query_param("doctorId", "7"))
        .and(body_json(json!({
            "patientId": 3,
            "doctorId": 7,
            "time": "2026-01-24 09:15:00"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::appointment_response(99, "2026-01-24T09:15:00"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = CreateAppointmentRequest {
        patient_id: 3,
        doctor_id: 7,
        time: "2026-01-24 09:15:00".to_string(),
    };

    let appointment = client_for(&mock_server)
        .create_appointment(BookingChannel::Patient, &request)
        .await
        .unwrap();

    assert_eq!(appointment.id, 99);
}

#[tokio::test]
async fn test_create_appointment_conflict_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/receptionist/appointment"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            MockClinicResponses::error_response("duplicate key"),
        ))
        .mount(&mock_server)
        .await;

    let request = CreateAppointmentRequest {
        patient_id: 3,
        doctor_id: 7,
        time: "2026-01-24 09:15:00".to_string(),
    };

    let result = client_for(&mock_server)
        .create_appointment(BookingChannel::Receptionist, &request)
        .await;

    assert_matches!(result, Err(ApiError::Conflict(_)));
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/patient/appointments"))
        .and(query_param("patientId", "3"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .fetch_appointments_for_patient(3)
        .await
        .unwrap_err();

    assert_matches!(err, ApiError::Server { status: 502, .. });
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/patient/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).fetch_doctors().await;

    assert_matches!(result, Err(ApiError::Decode(_)));
}

#[tokio::test]
async fn test_reschedule_appointment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/receptionist/appointment-reschedule/42"))
        .and(body_json(json!({ "time": "2026-01-25 10:00:00" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::appointment_response(42, "2026-01-25 10:00:00"),
        ))
        .mount(&mock_server)
        .await;

    let appointment = client_for(&mock_server)
        .reschedule_appointment(42, &RescheduleAppointmentRequest {
            time: "2026-01-25 10:00:00".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(appointment.timestamp(), Some("2026-01-25 10:00:00"));
}

#[tokio::test]
async fn test_update_doctor_availability_encodes_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/doctor/availability"))
        .and(query_param("doctorId", "7"))
        .and(query_param("availability", "2026-01-24 09:00-12:00; 2026-01-25 14:00-16:00"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Availability updated"))
        .expect(1)
        .mount(&mock_server)
        .await;

    client_for(&mock_server)
        .update_doctor_availability(7, "2026-01-24 09:00-12:00; 2026-01-25 14:00-16:00")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_base_url_trailing_slash_is_trimmed() {
    let config = TestConfig::for_server("http://localhost:9999/").to_app_config();
    let client = ClinicApiClient::new(&config).unwrap();
    assert_eq!(client.get_base_url(), "http://localhost:9999");
}

#[tokio::test]
async fn test_fetch_all_appointments_for_receptionist() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/receptionist/appointments"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::appointment_response(11, "2026-01-24 09:00:00"),
            MockClinicResponses::appointment_response(12, "2026-01-25T10:30:00"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let appointments = client_for(&mock_server).fetch_all_appointments().await.unwrap();

    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[1].id, 12);
    assert_eq!(appointments[1].timestamp(), Some("2026-01-25T10:30:00"));
}
