//! The date-time picker component state.
//!
//! [`DateTimePicker`] sits between a date-entry widget, a time-entry widget
//! and the caller. The widgets report events through the `on_*` handlers; each
//! handler updates the raw text first, then reconciles and re-checks
//! ambiguity, and only then returns the caller notifications for that event.
//! A caller that forwards the returned [`Notification`]s in order therefore
//! always sees a value whose ambiguity state is already settled.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{sanitize_attributes, DateConstraints, PickerConfig};
use crate::error::PickerError;
use crate::pattern::{is_valid_time, DatePattern, LocaleFormatter};
use crate::prompt::{AmbiguityState, ClarificationPrompt, OffsetChoice, PromptState};
use crate::reconcile::{reconcile, step_down_adjustment, update_time};
use crate::value::{
    has_time, iso_or_empty, parse_iso, parse_iso_date, parse_timezone, CombinedDateTime,
};

/// Caller-facing notification produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum Notification {
    /// The committed value: ISO 8601, or empty when absent.
    Change(String),
    /// The text currently in the entry that changed.
    ChangeRaw(String),
}

/// Where a date change came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateChangeSource {
    /// Typed into the date entry; carries the entry's full text.
    Typed(String),
    /// Picked from the calendar.
    Calendar,
}

/// Keys the time entry reports alongside a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeKey {
    ArrowUp,
    ArrowDown,
}

/// The hidden form field carrying the committed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiddenField {
    pub name: String,
    pub value: String,
}

type DateFilter = Box<dyn Fn(NaiveDate) -> bool>;

pub struct DateTimePicker {
    name: String,
    tz: Tz,
    pattern: DatePattern,
    constraints: DateConstraints,
    filter: Option<DateFilter>,
    date_input_attributes: BTreeMap<String, String>,
    time_input_attributes: BTreeMap<String, String>,

    date_time: Option<CombinedDateTime>,
    // What the two entries show. Kept beside `date_time` rather than derived
    // from it, since either may hold half-typed text.
    date_text: String,
    time_text: String,

    prompt: ClarificationPrompt,
}

impl fmt::Debug for DateTimePicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateTimePicker")
            .field("name", &self.name)
            .field("tz", &self.tz)
            .field("pattern", &self.pattern)
            .field("date_time", &self.date_time)
            .field("date_text", &self.date_text)
            .field("time_text", &self.time_text)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

impl DateTimePicker {
    /// Build a picker from configuration.
    ///
    /// An unreadable initial value starts the picker empty rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::InvalidTimezone`] for an unknown zone and
    /// [`PickerError::InvalidConfig`] for unreadable min/max bounds.
    pub fn new(
        config: &PickerConfig,
        formatter: &impl LocaleFormatter,
    ) -> Result<Self, PickerError> {
        let tz = parse_timezone(&config.timezone)?;
        let pattern = formatter.date_pattern(&config.locale);
        let constraints = config.constraints(tz)?;

        let date_time = config.value.as_deref().and_then(|raw| {
            let parsed = parse_iso(raw, tz);
            if parsed.is_none() {
                debug!(value = raw, "initial value is not ISO 8601, starting empty");
            }
            parsed
        });

        let date_text = date_time
            .map(|v| pattern.format(v.date()))
            .unwrap_or_default();
        let time_text = match (&date_time, config.value.as_deref()) {
            (Some(v), Some(raw)) if has_time(raw) => v.time_text(),
            _ => String::new(),
        };

        Ok(Self {
            name: config.name.clone(),
            tz,
            pattern,
            constraints,
            filter: None,
            date_input_attributes: sanitize_attributes("date", &config.date_input_attributes),
            time_input_attributes: sanitize_attributes("time", &config.time_input_attributes),
            date_time,
            date_text,
            time_text,
            prompt: ClarificationPrompt::new(),
        })
    }

    /// Attach a predicate deciding which dates are enabled (`true` = enabled).
    pub fn with_date_filter(mut self, filter: impl Fn(NaiveDate) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    // ── State accessors ─────────────────────────────────────────────────

    pub fn value(&self) -> Option<&CombinedDateTime> {
        self.date_time.as_ref()
    }

    /// The committed value as the caller sees it.
    pub fn value_iso(&self) -> String {
        iso_or_empty(self.date_time.as_ref())
    }

    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn date_pattern(&self) -> &DatePattern {
        &self.pattern
    }

    pub fn ambiguity(&self) -> AmbiguityState {
        self.prompt.ambiguity()
    }

    pub fn prompt_state(&self) -> PromptState {
        self.prompt.state()
    }

    pub fn is_offset_button_hidden(&self) -> bool {
        self.prompt.is_offset_button_hidden()
    }

    pub fn date_input_attributes(&self) -> &BTreeMap<String, String> {
        &self.date_input_attributes
    }

    pub fn time_input_attributes(&self) -> &BTreeMap<String, String> {
        &self.time_input_attributes
    }

    pub fn constraints(&self) -> &DateConstraints {
        &self.constraints
    }

    /// The hidden input used for native form submission.
    pub fn hidden_field(&self) -> HiddenField {
        HiddenField {
            name: self.name.clone(),
            value: self.value_iso(),
        }
    }

    /// Whether the date entry may select `date`.
    pub fn is_date_enabled(&self, date: NaiveDate) -> bool {
        self.constraints.allows(date) && self.filter.as_ref().map_or(true, |f| f(date))
    }

    // ── Date entry handlers ─────────────────────────────────────────────

    /// The date entry produced a date (or something that failed to be one).
    pub fn on_date_change(
        &mut self,
        source: DateChangeSource,
        date_iso: &str,
    ) -> Vec<Notification> {
        if let DateChangeSource::Typed(raw) = source {
            self.date_text = raw;
        }

        let updated = parse_iso_date(date_iso).and_then(|date| {
            let updated =
                reconcile(self.tz, self.date_time.as_ref(), Some(date), &self.time_text)?;
            if is_valid_time(&self.time_text) {
                self.time_text = updated.time_text();
            }
            Some(updated)
        });

        self.commit(updated)
    }

    /// The date entry's text changed without producing a date.
    pub fn on_date_change_raw(&mut self, raw: &str) -> Vec<Notification> {
        self.date_text = raw.to_string();
        vec![Notification::ChangeRaw(raw.to_string())]
    }

    /// A date was clicked in the calendar.
    ///
    /// Refreshes the date text and re-checks ambiguity when the selection
    /// would change the value. The commit itself arrives through
    /// [`on_date_change`](Self::on_date_change). Disabled dates are ignored.
    pub fn on_select(&mut self, date_iso: &str) {
        let Some(date) = parse_iso_date(date_iso) else {
            debug!(date = date_iso, "ignoring unreadable selection");
            return;
        };
        if !self.is_date_enabled(date) {
            debug!(%date, "ignoring selection of disabled date");
            return;
        }

        self.date_text = self.pattern.format(date);
        let previous = self.date_time;
        let updated = reconcile(self.tz, previous.as_ref(), Some(date), &self.time_text);

        let changed = match (&previous, &updated) {
            (Some(prev), Some(next)) => prev.to_iso() != next.to_iso(),
            _ => true,
        };
        if changed {
            self.prompt.check(updated.as_ref());
        }
    }

    pub fn on_date_blur(&mut self, raw: &str) {
        let entered = if self.is_valid_date_time(raw, &self.time_text) {
            self.date_time
        } else {
            None
        };
        self.prompt.check(entered.as_ref());
    }

    // ── Time entry handlers ─────────────────────────────────────────────

    /// The time entry's text changed, optionally via an arrow key step.
    pub fn on_time_change(&mut self, text: &str, key: Option<TimeKey>) -> Vec<Notification> {
        self.time_text = text.to_string();

        let Some(date) = self.base_date() else {
            return vec![Notification::ChangeRaw(text.to_string())];
        };
        let previous = self.date_time;

        if !is_valid_time(text) {
            // Drop the stale time-of-day; the caller hears about it once the
            // time is complete again.
            self.date_time = reconcile(self.tz, previous.as_ref(), Some(date), "00:00");
            self.prompt.check(self.date_time.as_ref());
            return vec![Notification::ChangeRaw(text.to_string())];
        }

        let Some(mut updated) = reconcile(self.tz, previous.as_ref(), Some(date), text) else {
            return vec![Notification::ChangeRaw(text.to_string())];
        };
        if key == Some(TimeKey::ArrowDown) {
            updated = step_down_adjustment(previous.as_ref(), updated);
        }

        self.time_text = updated.time_text();
        let mut notifications = vec![Notification::ChangeRaw(self.time_text.clone())];
        notifications.extend(self.commit(Some(updated)));
        notifications
    }

    pub fn on_time_blur(&mut self) {
        let entered = if self.is_valid_date_time(&self.date_text, &self.time_text) {
            update_time(self.date_time.as_ref(), &self.time_text)
        } else {
            None
        };
        self.prompt.check(entered.as_ref());
    }

    // ── Clarification prompt ────────────────────────────────────────────

    pub fn on_daylight_saving_click(&mut self) -> Vec<Notification> {
        self.resolve_offset(OffsetChoice::DaylightSaving)
    }

    pub fn on_standard_time_click(&mut self) -> Vec<Notification> {
        self.resolve_offset(OffsetChoice::Standard)
    }

    fn resolve_offset(&mut self, choice: OffsetChoice) -> Vec<Notification> {
        match self.prompt.resolve(choice, self.date_time.as_ref()) {
            Some(resolved) => {
                self.time_text = resolved.time_text();
                self.commit(Some(resolved))
            }
            None => Vec::new(),
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn commit(&mut self, value: Option<CombinedDateTime>) -> Vec<Notification> {
        self.date_time = value;
        self.prompt.check(self.date_time.as_ref());

        let iso = self.value_iso();
        debug!(name = %self.name, value = %iso, "committed");
        vec![Notification::Change(iso)]
    }

    /// The date new time entries apply to: the current value's date, else
    /// whatever the date entry holds if it parses.
    fn base_date(&self) -> Option<NaiveDate> {
        let typed = self.pattern.parse(&self.date_text)?;
        Some(self.date_time.map_or(typed, |v| v.date()))
    }

    fn is_valid_date_time(&self, date_text: &str, time_text: &str) -> bool {
        self.pattern.parse(date_text).is_some() && is_valid_time(time_text)
    }
}
