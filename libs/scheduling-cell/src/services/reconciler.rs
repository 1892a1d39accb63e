use tracing::debug;

use shared_models::Appointment;

use crate::models::{Slot, SlotKey, TakenSlotSet};

/// Merges booked appointments into a generated slot grid.
///
/// The result is a snapshot; bookings made elsewhere after the read are
/// only caught by the pre-submit re-check and, finally, by the server.
pub struct TakenSlotReconciler;

impl TakenSlotReconciler {
    /// Marks slots whose key is in `taken` as taken and disabled.
    /// Never clears a flag set earlier. Returns the number of taken slots.
    pub fn apply(slots: &mut [Slot], taken: &TakenSlotSet) -> usize {
        let mut marked = 0;

        for slot in slots.iter_mut() {
            if taken.contains(&slot.key) {
                slot.taken = true;
                slot.disabled = true;
                marked += 1;
            }
        }

        debug!("Marked {} of {} slots as taken on {}", marked, slots.len(), taken.date());
        marked
    }

    /// Whether any appointment normalizes to `key`.
    pub fn is_key_taken(key: &SlotKey, appointments: &[Appointment]) -> bool {
        appointments
            .iter()
            .filter_map(|appointment| appointment.timestamp())
            .filter_map(SlotKey::from_timestamp)
            .any(|candidate| &candidate == key)
    }
}
