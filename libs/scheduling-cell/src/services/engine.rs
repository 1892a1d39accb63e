use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::Appointment;

use crate::models::{Slot, TakenSlotSet, DEFAULT_SLOT_MINUTES};
use crate::services::generator::SlotGenerator;
use crate::services::parser::AvailabilityParser;
use crate::services::past_filter::PastSlotFilter;
use crate::services::reconciler::TakenSlotReconciler;

/// Availability text in, bookable slot grid out.
///
/// Stateless: every call rebuilds from its inputs, so the patient,
/// receptionist and symptom-based booking views can share one instance.
#[derive(Debug, Clone, Copy)]
pub struct SlotEngine {
    parser: AvailabilityParser,
    generator: SlotGenerator,
}

impl Default for SlotEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_MINUTES)
    }
}

impl SlotEngine {
    pub fn new(slot_minutes: u32) -> Self {
        Self {
            parser: AvailabilityParser::new(),
            generator: SlotGenerator::new(slot_minutes),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.slot_duration_minutes)
    }

    pub fn slot_duration(&self) -> Duration {
        self.generator.duration()
    }

    pub fn parser(&self) -> &AvailabilityParser {
        &self.parser
    }

    /// Parse, keep `date`'s segments, generate, then disable elapsed slots.
    pub fn build_slots(&self, availability: &str, date: NaiveDate, now: NaiveDateTime) -> Vec<Slot> {
        let segments = self.parser.parse_for_date(availability, date);
        let mut slots = self.generator.generate(&segments);
        PastSlotFilter::apply(&mut slots, date, now);

        debug!("Built {} slots from {} segments for {}", slots.len(), segments.len(), date);
        slots
    }

    /// Marks slots booked by `appointments` and returns the taken set used.
    pub fn reconcile(&self, slots: &mut [Slot], date: NaiveDate, appointments: &[Appointment]) -> TakenSlotSet {
        let taken = TakenSlotSet::from_appointments(date, appointments);
        TakenSlotReconciler::apply(slots, &taken);
        taken
    }

    /// The full pipeline in one call.
    pub fn build_grid(
        &self,
        availability: &str,
        date: NaiveDate,
        now: NaiveDateTime,
        appointments: &[Appointment],
    ) -> Vec<Slot> {
        let mut slots = self.build_slots(availability, date, now);
        self.reconcile(&mut slots, date, appointments);
        slots
    }
}
