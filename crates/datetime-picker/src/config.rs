//! Picker configuration.
//!
//! [`PickerConfig`] is the plain-data half of the caller's configuration and
//! deserializes from JSON. The date filter predicate is code, not data, and is
//! attached separately with
//! [`DateTimePicker::with_date_filter`](crate::picker::DateTimePicker::with_date_filter).

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PickerError;
use crate::value::{parse_iso, parse_iso_date};

/// Caller-supplied configuration for one picker instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Form field name for the hidden ISO value.
    pub name: String,
    /// IANA zone the wall-clock entries are interpreted in.
    pub timezone: String,
    /// Locale handed to the locale formatter to pick the date pattern.
    pub locale: String,
    /// Initial value, ISO 8601.
    pub value: Option<String>,
    pub min_date_time: Option<String>,
    pub max_date_time: Option<String>,
    /// When present, only these dates can be picked.
    pub include_dates: Option<Vec<String>>,
    pub exclude_dates: Option<Vec<String>>,
    pub date_input_attributes: BTreeMap<String, String>,
    pub time_input_attributes: BTreeMap<String, String>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            timezone: "UTC".to_string(),
            locale: "en-US".to_string(),
            value: None,
            min_date_time: None,
            max_date_time: None,
            include_dates: None,
            exclude_dates: None,
            date_input_attributes: BTreeMap::new(),
            time_input_attributes: BTreeMap::new(),
        }
    }
}

impl PickerConfig {
    pub fn new(name: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timezone: timezone.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_bounds(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.min_date_time = min.map(str::to_string);
        self.max_date_time = max.map(str::to_string);
        self
    }

    pub fn with_include_dates<I, S>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_dates = Some(dates.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_exclude_dates<I, S>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_dates = Some(dates.into_iter().map(Into::into).collect());
        self
    }

    /// Resolve the date constraints against `tz`.
    ///
    /// Misuse that leaves the picker usable (empty field name, inverted
    /// bounds, a date both included and excluded, unreadable list entries) is
    /// logged and otherwise left alone.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::InvalidConfig`] if a min/max bound is not ISO 8601.
    pub fn constraints(&self, tz: Tz) -> Result<DateConstraints, PickerError> {
        if self.name.trim().is_empty() {
            warn!("picker has no field name; the hidden form value will not be submitted");
        }

        let min = parse_bound("min_date_time", self.min_date_time.as_deref(), tz)?;
        let max = parse_bound("max_date_time", self.max_date_time.as_deref(), tz)?;
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                warn!(%lo, %hi, "min_date_time is after max_date_time; every date is disabled");
            }
        }

        let include = self
            .include_dates
            .as_ref()
            .map(|dates| parse_date_list("include_dates", dates));
        let exclude = self
            .exclude_dates
            .as_ref()
            .map(|dates| parse_date_list("exclude_dates", dates))
            .unwrap_or_default();

        if let Some(include) = &include {
            for date in include.intersection(&exclude) {
                warn!(%date, "date is both included and excluded; exclusion wins");
            }
        }

        Ok(DateConstraints {
            min,
            max,
            include,
            exclude,
        })
    }
}

fn parse_bound(field: &str, raw: Option<&str>, tz: Tz) -> Result<Option<NaiveDate>, PickerError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    parse_iso(raw, tz)
        .map(|v| Some(v.date()))
        .ok_or_else(|| PickerError::InvalidConfig(format!("{field}: '{raw}' is not ISO 8601")))
}

fn parse_date_list(field: &str, dates: &[String]) -> BTreeSet<NaiveDate> {
    dates
        .iter()
        .filter_map(|raw| {
            let date = parse_iso_date(raw);
            if date.is_none() {
                warn!(field, entry = %raw, "ignoring unreadable date");
            }
            date
        })
        .collect()
}

/// Strip a `name` key from custom input attributes; the picker owns field names.
pub(crate) fn sanitize_attributes(
    which: &str,
    attrs: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut attrs = attrs.clone();
    if attrs.remove("name").is_some() {
        warn!(which, "ignoring 'name' in input attributes");
    }
    attrs
}

// ── DateConstraints ─────────────────────────────────────────────────────────

/// Which calendar dates the date entry may select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateConstraints {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
    pub include: Option<BTreeSet<NaiveDate>>,
    pub exclude: BTreeSet<NaiveDate>,
}

impl DateConstraints {
    pub fn allows(&self, date: NaiveDate) -> bool {
        if self.min.is_some_and(|min| date < min) || self.max.is_some_and(|max| date > max) {
            return false;
        }
        if self.include.as_ref().is_some_and(|set| !set.contains(&date)) {
            return false;
        }
        !self.exclude.contains(&date)
    }
}
