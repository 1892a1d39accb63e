use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_SLOT_MINUTES: u32 = 15;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: String,
    pub slot_duration_minutes: u32,
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_token: String::new(),
            slot_duration_minutes: DEFAULT_SLOT_MINUTES,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("CLINIC_API_URL")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_URL not set, using default");
                    DEFAULT_API_URL.to_string()
                }),
            api_token: env::var("CLINIC_API_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_TOKEN not set, requests will be anonymous");
                    String::new()
                }),
            slot_duration_minutes: parse_positive("CLINIC_SLOT_MINUTES", DEFAULT_SLOT_MINUTES),
            http_timeout_secs: parse_positive("CLINIC_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty()
    }

    pub fn has_token(&self) -> bool {
        !self.api_token.is_empty()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_positive<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) if value > T::default() => value,
            _ => {
                warn!("Invalid {} value '{}', using default {}", key, raw, default);
                default
            }
        },
        Err(_) => {
            warn!("{} not set, using default {}", key, default);
            default
        }
    }
}
