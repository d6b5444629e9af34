//! The combined date-time value and its ISO 8601 surface.
//!
//! [`CombinedDateTime`] is the single source of truth for computation: a
//! calendar date and wall-clock time already resolved to one instant in the
//! active time zone. Raw date and time text live on the picker itself.
//!
//! All wall-clock → instant conversion goes through [`resolve_local`], which
//! fixes the conventions for repeated and skipped local times.

use std::fmt;

use chrono::{
    DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike,
};
use chrono_tz::{OffsetComponents, Tz};

use crate::error::PickerError;

/// Output layout of [`CombinedDateTime::to_iso`], e.g. `2024-11-03T01:30:00-04:00`.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Local datetime layouts accepted without an offset.
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Offset forms RFC 3339 rejects because the seconds are missing.
const SHORT_OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

/// Furthest back [`resolve_local`] looks for the pre-transition offset when a
/// wall-clock time falls in a gap.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// A calendar date plus wall-clock time, resolved to one instant in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedDateTime(DateTime<Tz>);

impl CombinedDateTime {
    pub fn new(dt: DateTime<Tz>) -> Self {
        Self(dt)
    }

    /// The underlying zoned instant.
    pub fn instant(&self) -> DateTime<Tz> {
        self.0
    }

    pub fn timezone(&self) -> Tz {
        self.0.timezone()
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    pub fn naive_local(&self) -> NaiveDateTime {
        self.0.naive_local()
    }

    /// Seconds east of UTC at this instant.
    pub fn offset_seconds(&self) -> i32 {
        self.0.offset().fix().local_minus_utc()
    }

    /// Whether the zone's daylight-saving component is active at this instant.
    pub fn is_dst(&self) -> bool {
        self.0.offset().dst_offset() != Duration::zero()
    }

    /// ISO 8601 with numeric offset, seconds precision.
    pub fn to_iso(&self) -> String {
        self.0.format(ISO_FORMAT).to_string()
    }

    /// The time-entry text for this value (`HH:mm`).
    pub fn time_text(&self) -> String {
        format!("{:02}:{:02}", self.0.hour(), self.0.minute())
    }

    /// Shift by a signed number of hours on the UTC timeline.
    pub fn shifted_hours(&self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }
}

impl fmt::Display for CombinedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

/// Format an optional value the way the caller and hidden field see it:
/// ISO 8601 when present, empty string when absent.
pub fn iso_or_empty(value: Option<&CombinedDateTime>) -> String {
    value.map(CombinedDateTime::to_iso).unwrap_or_default()
}

// ── Zone and ISO parsing ────────────────────────────────────────────────────

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz, PickerError> {
    s.parse::<Tz>()
        .map_err(|_| PickerError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse an ISO 8601 string into a value in `tz`.
///
/// Accepts, in order:
/// - RFC 3339 with offset (`2024-11-03T01:30:00-04:00`, seconds optional):
///   the instant is kept and re-expressed in `tz`
/// - local datetime (`2024-11-03T01:30[:00]`): resolved in `tz`
/// - date only (`2024-11-03`): midnight in `tz`
///
/// Returns `None` for anything else, including impossible calendar dates.
pub fn parse_iso(s: &str, tz: Tz) -> Option<CombinedDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(dt) = DateTime::parse_from_rfc3339(s).ok().or_else(|| {
        SHORT_OFFSET_FORMATS
            .iter()
            .find_map(|layout| DateTime::parse_from_str(s, layout).ok())
    }) {
        return Some(CombinedDateTime(dt.with_timezone(&tz)));
    }

    if let Some(naive) = LOCAL_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
    {
        return resolve_local(tz, naive, None);
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    resolve_local(tz, date.and_hms_opt(0, 0, 0)?, None)
}

/// Parse only the calendar-date part of an ISO 8601 string.
///
/// Date pickers report selections as full ISO strings; only the date matters
/// to reconciliation. The date is taken as written, not converted through any
/// zone.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10)?;
    let rest = &s[10..];
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Whether an ISO 8601 string carries a time-of-day part.
pub fn has_time(s: &str) -> bool {
    let s = s.trim();
    parse_iso_date(s).is_some() && s.len() > 10 && s[10..].starts_with(['T', ' '])
}

// ── Wall-clock resolution ───────────────────────────────────────────────────

/// Resolve local wall-clock fields to a single instant in `tz`.
///
/// - Unique local time: that instant.
/// - Repeated local time (clocks set back): the candidate whose UTC offset is
///   `preferred_offset`, else the earlier instant.
/// - Skipped local time (clocks set forward): the fields are read with the
///   offset in force just before the transition, which lands past the gap by
///   the gap's length. 02:30 on a one-hour spring-forward day becomes 03:30.
///
/// Returns `None` only if no offset can be found within a day before `naive`.
pub fn resolve_local(
    tz: Tz,
    naive: NaiveDateTime,
    preferred_offset: Option<i32>,
) -> Option<CombinedDateTime> {
    use chrono::LocalResult;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(CombinedDateTime(dt)),
        LocalResult::Ambiguous(earlier, later) => {
            let pick = match preferred_offset {
                Some(secs) if later.offset().fix().local_minus_utc() == secs => later,
                _ => earlier,
            };
            Some(CombinedDateTime(pick))
        }
        LocalResult::None => {
            let before = offset_before_gap(tz, naive)?;
            let utc = naive - Duration::seconds(i64::from(before));
            Some(CombinedDateTime(tz.from_utc_datetime(&utc)))
        }
    }
}

/// The UTC offset (seconds) in force at the last valid wall-clock time
/// before `naive`.
fn offset_before_gap(tz: Tz, naive: NaiveDateTime) -> Option<i32> {
    (1..=MAX_GAP_MINUTES).step_by(15).find_map(|back| {
        tz.from_local_datetime(&(naive - Duration::minutes(back)))
            .latest()
            .map(|dt| dt.offset().fix().local_minus_utc())
    })
}
