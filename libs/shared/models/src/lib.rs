pub mod clinic;
pub mod error;
pub mod session;

pub use clinic::*;
pub use error::ApiError;
pub use session::{Role, Session};
