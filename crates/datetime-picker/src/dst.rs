//! DST ambiguity detection for combined values.
//!
//! A wall-clock time is ambiguous when clocks are set back and the same local
//! fields occur twice, once under the daylight-saving offset and once under
//! standard time. Detection re-derives the value's local fields in its zone
//! rather than consulting transition tables directly.

use chrono::{Offset, TimeZone};

use crate::value::CombinedDateTime;

/// The two instants that share one ambiguous wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbiguousCandidates {
    /// The earlier occurrence, under the offset in force before clocks went
    /// back. Usually daylight saving.
    pub daylight_saving: CombinedDateTime,
    /// The later occurrence, under the offset in force afterwards.
    pub standard: CombinedDateTime,
}

/// Whether `value`'s wall-clock time maps to more than one instant in its zone.
pub fn check_ambiguous(value: &CombinedDateTime) -> bool {
    ambiguous_candidates(value).is_some()
}

/// Both instants for `value`'s wall-clock time, if it is repeated.
pub fn ambiguous_candidates(value: &CombinedDateTime) -> Option<AmbiguousCandidates> {
    let tz = value.timezone();
    let (earlier, later) = match tz.from_local_datetime(&value.naive_local()) {
        chrono::LocalResult::Ambiguous(a, b) => (a, b),
        _ => return None,
    };

    if earlier.offset().fix() == later.offset().fix() {
        return None;
    }

    Some(AmbiguousCandidates {
        daylight_saving: CombinedDateTime::new(earlier),
        standard: CombinedDateTime::new(later),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{parse_iso, parse_timezone};

    fn value(iso: &str, zone: &str) -> CombinedDateTime {
        parse_iso(iso, parse_timezone(zone).unwrap()).unwrap()
    }

    // ── check_ambiguous ─────────────────────────────────────────────────

    #[test]
    fn test_fall_back_hour_is_ambiguous() {
        let ny = "America/New_York";
        assert!(check_ambiguous(&value("2024-11-03T01:30:00-04:00", ny)));
        assert!(check_ambiguous(&value("2024-11-03T01:30:00-05:00", ny)));
        assert!(check_ambiguous(&value("2024-11-03T01:00:00-04:00", ny)));
    }

    #[test]
    fn test_outside_fall_back_hour_is_not_ambiguous() {
        let ny = "America/New_York";
        assert!(!check_ambiguous(&value("2024-11-03T00:59", ny)));
        assert!(!check_ambiguous(&value("2024-11-03T02:00", ny)));
        assert!(!check_ambiguous(&value("2024-11-04T01:30", ny)));
        assert!(!check_ambiguous(&value("2024-03-10T03:30", ny)));
    }

    #[test]
    fn test_zone_without_dst_is_never_ambiguous() {
        assert!(!check_ambiguous(&value("2024-11-03T01:30", "Asia/Tokyo")));
        assert!(!check_ambiguous(&value("2024-11-03T01:30", "UTC")));
    }

    #[test]
    fn test_southern_hemisphere_fall_back() {
        // Sydney sets clocks back 03:00 → 02:00 on 7 April 2024.
        assert!(check_ambiguous(&value("2024-04-07T02:30", "Australia/Sydney")));
    }

    #[test]
    fn test_candidates_follow_timeline_not_dst_flag() {
        let dublin = ambiguous_candidates(&value("2024-10-27T01:30", "Europe/Dublin")).unwrap();
        assert_eq!(dublin.daylight_saving.to_iso(), "2024-10-27T01:30:00+01:00");
        assert_eq!(dublin.standard.to_iso(), "2024-10-27T01:30:00+00:00");

        let moscow = ambiguous_candidates(&value("2014-10-26T01:30", "Europe/Moscow")).unwrap();
        assert_eq!(moscow.daylight_saving.to_iso(), "2014-10-26T01:30:00+04:00");
        assert_eq!(moscow.standard.to_iso(), "2014-10-26T01:30:00+03:00");
    }

    #[test]
    fn test_candidates_are_one_hour_apart() {
        let v = value("2024-11-03T01:30:00-04:00", "America/New_York");
        let c = ambiguous_candidates(&v).unwrap();
        assert_eq!(c.daylight_saving.to_iso(), "2024-11-03T01:30:00-04:00");
        assert_eq!(c.standard.to_iso(), "2024-11-03T01:30:00-05:00");
        assert!(c.daylight_saving.is_dst());
        assert!(!c.standard.is_dst());
        assert_eq!(
            (c.standard.instant() - c.daylight_saving.instant()).num_minutes(),
            60
        );
    }
}
