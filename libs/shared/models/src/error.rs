use thiserror::Error;

/// Failure of a call against the clinic HTTP API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

const CONFLICT_MARKERS: [&str; 2] = ["already booked", "already taken"];

impl ApiError {
    /// Maps a non-success status and its body to an error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 409 || mentions_slot_collision(&body) {
            return ApiError::Conflict(body);
        }

        match status {
            401 | 403 => ApiError::Auth(body),
            404 => ApiError::NotFound(body),
            400 | 422 => ApiError::BadRequest(body),
            _ => ApiError::Server { status, message: body },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }

    /// Errors worth retrying later without changing the request.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

fn mentions_slot_collision(body: &str) -> bool {
    let lowered = body.to_lowercase();
    CONFLICT_MARKERS.iter().any(|marker| lowered.contains(marker))
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
