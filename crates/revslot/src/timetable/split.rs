//! Splitting free intervals into fixed-duration review slots.

use super::error::TimetableError;
use super::types::FreeSlot;

/// Splits one free interval into consecutive sub-slots of `duration_minutes`.
///
/// Sub-slots start at the interval's start and step by the duration; a
/// trailing remainder shorter than the duration is discarded, never returned
/// as a partial slot. `day` and `code` carry over to every sub-slot.
///
/// # Returns
/// * `Ok(slots)` - zero or more sub-slots; empty when the interval is
///   shorter than the duration
/// * `Err(TimetableError::InvalidDuration)` - `duration_minutes` is zero
pub fn split_slot_by_duration(
    slot: &FreeSlot,
    duration_minutes: u16,
) -> Result<Vec<FreeSlot>, TimetableError> {
    if duration_minutes == 0 {
        return Err(TimetableError::InvalidDuration { minutes: 0 });
    }

    let mut sub_slots = Vec::new();
    let mut current = slot.start;

    while let Some(end) = current.checked_add_minutes(duration_minutes) {
        if end > slot.end {
            break;
        }
        sub_slots.push(FreeSlot {
            day: slot.day,
            start: current,
            end,
            code: slot.code.clone(),
        });
        current = end;
    }

    Ok(sub_slots)
}

/// Splits every interval in `slots`, concatenating the results in input
/// order.
pub fn split_all_slots_by_duration(
    slots: &[FreeSlot],
    duration_minutes: u16,
) -> Result<Vec<FreeSlot>, TimetableError> {
    let mut all = Vec::new();
    for slot in slots {
        all.extend(split_slot_by_duration(slot, duration_minutes)?);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::types::{TimeOfDay, Weekday};

    fn slot(day: Weekday, start: &str, end: &str, code: Option<&str>) -> FreeSlot {
        FreeSlot {
            day,
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            code: code.map(str::to_string),
        }
    }

    #[test]
    fn test_exact_division() {
        let parent = slot(Weekday::Mon, "10:00", "11:30", None);
        let subs = split_slot_by_duration(&parent, 30).unwrap();

        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].start, "10:00".parse::<TimeOfDay>().unwrap());
        assert_eq!(subs[0].end, "10:30".parse::<TimeOfDay>().unwrap());
        assert_eq!(subs[2].start, "11:00".parse::<TimeOfDay>().unwrap());
        assert_eq!(subs[2].end, "11:30".parse::<TimeOfDay>().unwrap());
    }

    #[test]
    fn test_remainder_discarded() {
        // 40 minutes split by 30: one slot, the trailing 10 minutes dropped.
        let parent = slot(Weekday::Tue, "09:00", "09:40", None);
        let subs = split_slot_by_duration(&parent, 30).unwrap();

        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].end, "09:30".parse::<TimeOfDay>().unwrap());
    }

    #[test]
    fn test_interval_shorter_than_duration() {
        let parent = slot(Weekday::Wed, "10:00", "10:20", None);
        assert!(split_slot_by_duration(&parent, 30).unwrap().is_empty());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let parent = slot(Weekday::Mon, "10:00", "11:00", None);
        assert_eq!(
            split_slot_by_duration(&parent, 0),
            Err(TimetableError::InvalidDuration { minutes: 0 })
        );
    }

    #[test]
    fn test_day_and_code_propagate() {
        let parent = slot(Weekday::Thu, "14:00", "15:00", Some("CS2001"));
        let subs = split_slot_by_duration(&parent, 20).unwrap();

        assert_eq!(subs.len(), 3);
        for sub in &subs {
            assert_eq!(sub.day, Weekday::Thu);
            assert_eq!(sub.code.as_deref(), Some("CS2001"));
        }
    }

    #[test]
    fn test_split_all_preserves_input_order() {
        let slots = vec![
            slot(Weekday::Fri, "10:00", "11:00", None),
            slot(Weekday::Mon, "09:00", "10:00", None),
        ];
        let subs = split_all_slots_by_duration(&slots, 30).unwrap();

        assert_eq!(subs.len(), 4);
        assert_eq!(subs[0].day, Weekday::Fri);
        assert_eq!(subs[1].day, Weekday::Fri);
        assert_eq!(subs[2].day, Weekday::Mon);
        assert_eq!(subs[3].day, Weekday::Mon);
    }
}
