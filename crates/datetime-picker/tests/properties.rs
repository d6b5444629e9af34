use chrono::{Datelike, NaiveDate};
use datetime_picker::{
    check_ambiguous, parse_iso, parse_timezone, reconcile, ClarificationPrompt, DatePattern,
    OffsetChoice,
};
use proptest::prelude::*;

fn valid_date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2100, 1u32..=12, 1u32..=31)
        .prop_filter_map("real calendar date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

fn time_text() -> impl Strategy<Value = String> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| format!("{h:02}:{m:02}"))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

proptest! {
    #![proptest_config(ProptestConfig { max_global_rejects: 65536, ..ProptestConfig::default() })]

    #[test]
    fn prop_reconcile_round_trips_without_transitions(date in valid_date(), time in time_text()) {
        let tz = parse_timezone("Asia/Tokyo").unwrap();
        let pattern = DatePattern::new("MM/DD/YYYY").unwrap();

        let v = reconcile(tz, None, Some(date), &time).unwrap();
        prop_assert_eq!(pattern.format(v.date()), pattern.format(date));
        prop_assert_eq!(v.time_text(), time);
    }

    #[test]
    fn prop_invalid_time_text_gives_midnight(
        date in valid_date(),
        prev_time in time_text(),
        junk in "[0-9:]{0,4}|[0-9]{2}:[6-9][0-9]|2[4-9]:[0-5][0-9]",
    ) {
        let tz = parse_timezone("UTC").unwrap();
        let prev = reconcile(tz, None, Some(date), &prev_time).unwrap();

        let v = reconcile(tz, Some(&prev), Some(date), &junk).unwrap();
        prop_assert_eq!(v.time_text(), "00:00");
        prop_assert_eq!(v.date(), date);
    }

    #[test]
    fn prop_nonexistent_dates_are_absent(
        year in 1970i32..2100,
        month in 1u32..=12,
        extra in 1u32..=3,
        time in time_text(),
    ) {
        let day = days_in_month(year, month) + extra;
        prop_assume!(day <= 31);
        let text = format!("{month:02}/{day:02}/{year:04}");
        let pattern = DatePattern::new("MM/DD/YYYY").unwrap();
        let tz = parse_timezone("America/New_York").unwrap();

        let parsed = pattern.parse(&text);
        prop_assert!(parsed.is_none());
        prop_assert!(reconcile(tz, None, parsed, &time).is_none());
    }

    #[test]
    fn prop_offset_choice_matching_current_is_noop(date in valid_date(), time in time_text()) {
        let tz = parse_timezone("America/New_York").unwrap();
        let v = reconcile(tz, None, Some(date), &time).unwrap();
        let mut prompt = ClarificationPrompt::new();
        prompt.check(Some(&v));

        let already = if v.is_dst() { OffsetChoice::DaylightSaving } else { OffsetChoice::Standard };
        prop_assert!(prompt.resolve(already, Some(&v)).is_none());
    }

    #[test]
    fn prop_resolution_keeps_wall_clock_inside_repeated_hour(minute in 0u32..60, year in 2008i32..2030) {
        // US clocks fall back at 02:00 on the first Sunday of November.
        let first = NaiveDate::from_ymd_opt(year, 11, 1).unwrap();
        let offset = (7 - first.weekday().num_days_from_sunday()) % 7;
        let sunday = first + chrono::Duration::days(i64::from(offset));
        let iso = format!("{}T01:{minute:02}", sunday.format("%Y-%m-%d"));

        let tz = parse_timezone("America/New_York").unwrap();
        let v = parse_iso(&iso, tz).unwrap();
        prop_assert!(check_ambiguous(&v));

        let mut prompt = ClarificationPrompt::new();
        prompt.check(Some(&v));
        let standard = prompt.resolve(OffsetChoice::Standard, Some(&v)).unwrap();
        prop_assert_eq!(standard.naive_local(), v.naive_local());
        prop_assert!(!standard.is_dst());
    }
}
