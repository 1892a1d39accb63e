pub mod editor;
pub mod engine;
pub mod generator;
pub mod parser;
pub mod past_filter;
pub mod reconciler;

pub use editor::{AvailabilityEditor, AvailabilityRow};
pub use engine::SlotEngine;
pub use generator::SlotGenerator;
pub use parser::AvailabilityParser;
pub use past_filter::PastSlotFilter;
pub use reconciler::TakenSlotReconciler;
