pub mod error;
pub mod models;
pub mod services;

pub use error::{AvailabilityEditError, SegmentParseError};
pub use models::*;
pub use services::*;
