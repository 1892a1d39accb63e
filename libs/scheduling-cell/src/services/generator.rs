use chrono::Duration;
use tracing::{debug, warn};

use crate::models::{AvailabilitySegment, Slot, DEFAULT_SLOT_MINUTES};

/// Splits availability segments into fixed-width slots.
#[derive(Debug, Clone, Copy)]
pub struct SlotGenerator {
    duration: Duration,
}

impl Default for SlotGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_MINUTES)
    }
}

impl SlotGenerator {
    pub fn new(slot_minutes: u32) -> Self {
        let minutes = if slot_minutes == 0 {
            warn!("Slot duration of 0 minutes requested, using {}", DEFAULT_SLOT_MINUTES);
            DEFAULT_SLOT_MINUTES
        } else {
            slot_minutes
        };

        Self { duration: Duration::minutes(i64::from(minutes)) }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Slots for one segment, contiguous over `[start, end)`.
    /// A trailing remainder shorter than one slot is discarded.
    pub fn generate_segment(&self, segment: &AvailabilitySegment) -> Vec<Slot> {
        let end = segment.end();
        let mut slots = Vec::new();
        let mut current_time = segment.start();

        while current_time + self.duration <= end {
            let slot_end = current_time + self.duration;
            slots.push(Slot::new(current_time, slot_end));
            current_time = slot_end;
        }

        if current_time < end {
            debug!("Discarding {} minute remainder of segment {}",
                   (end - current_time).num_minutes(), segment);
        }

        slots
    }

    /// Concatenation of every segment's slots. Overlapping segments are not merged.
    pub fn generate(&self, segments: &[AvailabilitySegment]) -> Vec<Slot> {
        segments
            .iter()
            .flat_map(|segment| self.generate_segment(segment))
            .collect()
    }
}
