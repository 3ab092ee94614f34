use chrono::Duration;

use crate::models::{AbsoluteInterval, AvailabilitySlot, TaggedInterval};

/// Slices each open interval into consecutive fixed-length slots, dropping
/// any remainder shorter than one slot, then sorts ascending and keeps the
/// slots inside the caller's window (both bounds inclusive).
///
/// Two intervals with different modalities may legally start a slot at the
/// same instant; both slots are kept. Only exact duplicates (same instant,
/// same modality) are collapsed.
pub fn quantize_slots(
    intervals: &[TaggedInterval],
    slot_length: Duration,
    window: &AbsoluteInterval,
) -> Vec<AvailabilitySlot> {
    if slot_length <= Duration::zero() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    for tagged in intervals {
        let mut cursor = tagged.interval.start;
        while cursor + slot_length <= tagged.interval.end {
            slots.push(AvailabilitySlot {
                instant: cursor,
                appointment_type: tagged.appointment_type,
            });
            cursor += slot_length;
        }
    }

    slots.sort();
    slots.dedup();
    slots.retain(|slot| slot.instant >= window.start && slot.instant <= window.end);
    slots
}
