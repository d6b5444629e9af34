//! Event scripts: a picker configuration plus the widget events to replay.

use anyhow::{Context, Result};
use datetime_picker::{
    AmbiguityState, DateChangeSource, DatePattern, DateTimePicker, FixedFormatter, HiddenField,
    Notification, PickerConfig, PromptState, TimeKey,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub config: PickerConfig,
    /// Display pattern for the date entry, e.g. `DD.MM.YYYY`.
    #[serde(default)]
    pub date_format: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// One widget event, tagged by `type`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    DateChange {
        #[serde(default = "calendar")]
        source: DateChangeSource,
        date: String,
    },
    DateChangeRaw {
        text: String,
    },
    Select {
        date: String,
    },
    DateBlur {
        text: String,
    },
    TimeChange {
        text: String,
        #[serde(default)]
        key: Option<TimeKey>,
    },
    TimeBlur,
    DaylightSavingClick,
    StandardTimeClick,
}

fn calendar() -> DateChangeSource {
    DateChangeSource::Calendar
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::DateChange { .. } => "date_change",
            Event::DateChangeRaw { .. } => "date_change_raw",
            Event::Select { .. } => "select",
            Event::DateBlur { .. } => "date_blur",
            Event::TimeChange { .. } => "time_change",
            Event::TimeBlur => "time_blur",
            Event::DaylightSavingClick => "daylight_saving_click",
            Event::StandardTimeClick => "standard_time_click",
        }
    }
}

/// What the picker looked like after one event.
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub event: &'static str,
    pub notifications: Vec<Notification>,
    pub value: String,
    pub date_text: String,
    pub time_text: String,
    pub ambiguity: AmbiguityState,
    pub prompt: PromptState,
}

#[derive(Debug, Serialize)]
pub struct Replay {
    pub steps: Vec<StepReport>,
    pub hidden_field: HiddenField,
}

/// Build the picker described by `script` and feed it every event in order.
pub fn replay(script: &Script) -> Result<Replay> {
    let formatter = match script.date_format.as_deref() {
        Some(p) => FixedFormatter::new(
            DatePattern::new(p).with_context(|| format!("bad date_format '{p}'"))?,
        ),
        None => FixedFormatter::default(),
    };
    let mut picker =
        DateTimePicker::new(&script.config, &formatter).context("failed to build picker")?;

    let steps = script
        .events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let notifications = apply(&mut picker, event.clone());
            StepReport {
                step: i + 1,
                event: event.name(),
                notifications,
                value: picker.value_iso(),
                date_text: picker.date_text().to_string(),
                time_text: picker.time_text().to_string(),
                ambiguity: picker.ambiguity(),
                prompt: picker.prompt_state(),
            }
        })
        .collect();

    Ok(Replay {
        steps,
        hidden_field: picker.hidden_field(),
    })
}

fn apply(picker: &mut DateTimePicker, event: Event) -> Vec<Notification> {
    match event {
        Event::DateChange { source, date } => picker.on_date_change(source, &date),
        Event::DateChangeRaw { text } => picker.on_date_change_raw(&text),
        Event::Select { date } => {
            picker.on_select(&date);
            Vec::new()
        }
        Event::DateBlur { text } => {
            picker.on_date_blur(&text);
            Vec::new()
        }
        Event::TimeChange { text, key } => picker.on_time_change(&text, key),
        Event::TimeBlur => {
            picker.on_time_blur();
            Vec::new()
        }
        Event::DaylightSavingClick => picker.on_daylight_saving_click(),
        Event::StandardTimeClick => picker.on_standard_time_click(),
    }
}
