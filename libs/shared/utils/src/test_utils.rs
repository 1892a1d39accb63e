use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::Doctor;

use crate::clock::FixedClock;

pub struct TestConfig {
    pub api_base_url: String,
    pub api_token: String,
    pub slot_duration_minutes: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            api_token: "test-token".to_string(),
            slot_duration_minutes: 15,
        }
    }
}

impl TestConfig {
    /// Config pointing at a mock server, e.g. `wiremock::MockServer::uri()`.
    pub fn for_server(uri: impl Into<String>) -> Self {
        Self {
            api_base_url: uri.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.api_base_url.clone(),
            api_token: self.api_token.clone(),
            slot_duration_minutes: self.slot_duration_minutes,
            http_timeout_secs: 5,
        }
    }
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("test date must be YYYY-MM-DD")
}

pub fn datetime(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").expect("test datetime must be YYYY-MM-DD HH:MM")
}

pub fn clock_at(raw: &str) -> FixedClock {
    FixedClock::new(datetime(raw))
}

pub fn doctor(id: i64, name: &str, specialty: &str, availability: &str) -> Doctor {
    Doctor {
        id,
        display_name: name.to_string(),
        specialty: Some(specialty.to_string()),
        availability_text: Some(availability.to_string()),
    }
}

pub struct MockClinicResponses;

impl MockClinicResponses {
    pub fn doctor_response(id: i64, username: &str, specialty: &str, availability: &str) -> Value {
        json!({
            "id": id,
            "username": username,
            "email": format!("{}@example.com", username),
            "specialty": specialty,
            "availability": availability
        })
    }

    pub fn appointment_response(id: i64, appointment_time: &str) -> Value {
        json!({
            "id": id,
            "appointmentTime": appointment_time,
            "status": "Scheduled"
        })
    }

    pub fn error_response(message: &str) -> Value {
        json!({ "error": message })
    }
}
