//! Merge independently edited date and time entries into one value.
//!
//! The date entry and time entry change on their own schedules. Edits go
//! through [`reconcile`]; a time-entry blur re-applies the time text to the
//! current value with [`update_time`]. Both build a fresh [`CombinedDateTime`]
//! from the candidate date, the raw time text and the previous value's UTC
//! offset.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::pattern::parse_time_text;
use crate::value::{resolve_local, CombinedDateTime};

/// Combine a candidate date with the current raw time text.
///
/// - `candidate_date` is `None` (not a real calendar date): absent.
/// - The time text is not a complete `HH:mm`: the date at a provisional
///   00:00, never the previous time-of-day.
/// - Otherwise: the date at the parsed time, keeping the previous value's UTC
///   offset when the wall-clock time is repeated in `tz`.
///
/// Skipped wall-clock times are shifted forward (see
/// [`resolve_local`](crate::value::resolve_local)).
pub fn reconcile(
    tz: Tz,
    previous: Option<&CombinedDateTime>,
    candidate_date: Option<NaiveDate>,
    raw_time_text: &str,
) -> Option<CombinedDateTime> {
    let date = candidate_date?;
    let time = parse_time_text(raw_time_text).or_else(|| NaiveTime::from_hms_opt(0, 0, 0))?;
    let preferred = previous.map(CombinedDateTime::offset_seconds);
    resolve_local(tz, date.and_time(time), preferred)
}

/// Apply raw time text to the date of `previous`.
///
/// Returns `None` when there is no previous value to take a date from.
pub fn update_time(
    previous: Option<&CombinedDateTime>,
    raw_time_text: &str,
) -> Option<CombinedDateTime> {
    let prev = previous?;
    reconcile(prev.timezone(), Some(prev), Some(prev.date()), raw_time_text)
}

/// Make a one-step decrement of the time entry visibly move the value.
///
/// Stepping the time down into a skipped hour resolves forward again, back to
/// the value it started from. When that happens the result is pulled back one
/// more hour on the UTC timeline so the entry actually changes.
pub fn step_down_adjustment(
    previous: Option<&CombinedDateTime>,
    updated: CombinedDateTime,
) -> CombinedDateTime {
    match previous {
        Some(prev) if prev.to_iso() == updated.to_iso() => updated.shifted_hours(-1),
        _ => updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{parse_iso, parse_timezone};

    fn ny() -> Tz {
        parse_timezone("America/New_York").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    // ── reconcile ───────────────────────────────────────────────────────

    #[test]
    fn test_reconcile_plain_day() {
        let v = reconcile(ny(), None, date(2024, 6, 12), "14:45").unwrap();
        assert_eq!(v.to_iso(), "2024-06-12T14:45:00-04:00");
        assert_eq!(v.time_text(), "14:45");
    }

    #[test]
    fn test_reconcile_invalid_date_is_absent() {
        let prev = parse_iso("2024-06-12T14:45", ny()).unwrap();
        assert!(reconcile(ny(), Some(&prev), date(2024, 2, 30), "14:45").is_none());
    }

    #[test]
    fn test_reconcile_invalid_time_is_midnight_not_stale() {
        let prev = parse_iso("2024-06-12T14:45", ny()).unwrap();
        let v = reconcile(ny(), Some(&prev), date(2024, 6, 13), "14:4").unwrap();
        assert_eq!(v.to_iso(), "2024-06-13T00:00:00-04:00");

        let v = reconcile(ny(), Some(&prev), date(2024, 6, 13), "").unwrap();
        assert_eq!(v.time_text(), "00:00");
    }

    #[test]
    fn test_reconcile_carries_previous_offset_into_repeated_hour() {
        let prev = parse_iso("2024-11-03T01:10:00-05:00", ny()).unwrap();
        let v = reconcile(ny(), Some(&prev), date(2024, 11, 3), "01:30").unwrap();
        assert_eq!(v.to_iso(), "2024-11-03T01:30:00-05:00");

        let prev = parse_iso("2024-11-03T01:10:00-04:00", ny()).unwrap();
        let v = reconcile(ny(), Some(&prev), date(2024, 11, 3), "01:30").unwrap();
        assert_eq!(v.to_iso(), "2024-11-03T01:30:00-04:00");
    }

    #[test]
    fn test_reconcile_new_date_takes_its_own_offset() {
        // A summer offset carried onto a winter date does not stick.
        let prev = parse_iso("2024-07-01T09:00", ny()).unwrap();
        let v = reconcile(ny(), Some(&prev), date(2024, 12, 1), "09:00").unwrap();
        assert_eq!(v.to_iso(), "2024-12-01T09:00:00-05:00");
    }

    #[test]
    fn test_reconcile_skipped_hour_is_deterministic() {
        let v = reconcile(ny(), None, date(2024, 3, 10), "02:30").unwrap();
        assert_eq!(v.to_iso(), "2024-03-10T03:30:00-04:00");
    }

    // ── update_time ─────────────────────────────────────────────────────

    #[test]
    fn test_update_time_keeps_date() {
        let prev = parse_iso("2024-06-12T14:45", ny()).unwrap();
        let v = update_time(Some(&prev), "08:05").unwrap();
        assert_eq!(v.to_iso(), "2024-06-12T08:05:00-04:00");
    }

    #[test]
    fn test_update_time_without_previous() {
        assert!(update_time(None, "08:05").is_none());
    }

    // ── step_down_adjustment ────────────────────────────────────────────

    #[test]
    fn test_step_down_into_gap_moves_back_an_hour() {
        let prev = parse_iso("2024-03-10T03:30:00-04:00", ny()).unwrap();
        // Hour stepped 03 → 02; 02:30 does not exist and resolves back to 03:30.
        let updated = update_time(Some(&prev), "02:30").unwrap();
        assert_eq!(updated, prev);

        let adjusted = step_down_adjustment(Some(&prev), updated);
        assert_eq!(adjusted.to_iso(), "2024-03-10T01:30:00-05:00");
    }

    #[test]
    fn test_step_down_leaves_real_changes_alone() {
        let prev = parse_iso("2024-06-12T14:45", ny()).unwrap();
        let updated = update_time(Some(&prev), "13:45").unwrap();
        assert_eq!(step_down_adjustment(Some(&prev), updated), updated);
        assert_eq!(step_down_adjustment(None, updated), updated);
    }
}
