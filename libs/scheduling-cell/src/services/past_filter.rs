use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::models::Slot;

pub struct PastSlotFilter;

impl PastSlotFilter {
    /// Disables slots that ended at or before `now`, but only when the
    /// selected date is today's local date. Returns how many were disabled.
    pub fn apply(slots: &mut [Slot], selected_date: NaiveDate, now: NaiveDateTime) -> usize {
        if selected_date != now.date() {
            return 0;
        }

        let mut disabled = 0;
        for slot in slots.iter_mut().filter(|slot| slot.end <= now) {
            slot.disabled = true;
            disabled += 1;
        }

        debug!("Disabled {} elapsed slots for {}", disabled, selected_date);
        disabled
    }
}
