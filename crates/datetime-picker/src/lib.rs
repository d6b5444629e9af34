//! # datetime-picker
//!
//! State and reconciliation logic for a combined date-time picker.
//!
//! A date entry and a time entry are edited independently, often through
//! transiently invalid text. This crate merges them into one zone-resolved
//! value, detects wall-clock times that a DST transition repeats, and drives
//! the clarification prompt that lets the user choose between the two
//! offsets. Rendering, focus and locale tables are left to the caller.
//!
//! ## Modules
//!
//! - [`value`] — `CombinedDateTime`, ISO 8601 parsing, wall-clock resolution
//! - [`pattern`] — Locale date patterns and strict `HH:mm` parsing
//! - [`reconcile`] — Merge date + raw time text into a combined value
//! - [`dst`] — Ambiguous (repeated) wall-clock detection
//! - [`prompt`] — Clarification prompt state machine
//! - [`config`] — Picker configuration and date constraints
//! - [`picker`] — The `DateTimePicker` component and its event handlers
//! - [`error`] — Error types

pub mod config;
pub mod dst;
pub mod error;
pub mod pattern;
pub mod picker;
pub mod prompt;
pub mod reconcile;
pub mod value;

pub use config::{DateConstraints, PickerConfig};
pub use dst::{ambiguous_candidates, check_ambiguous, AmbiguousCandidates};
pub use error::PickerError;
pub use pattern::{is_valid_time, parse_time_text, DatePattern, FixedFormatter, LocaleFormatter};
pub use picker::{DateChangeSource, DateTimePicker, HiddenField, Notification, TimeKey};
pub use prompt::{AmbiguityState, CheckOutcome, ClarificationPrompt, OffsetChoice, PromptState};
pub use reconcile::{reconcile, step_down_adjustment, update_time};
pub use value::{has_time, parse_iso, parse_iso_date, parse_timezone, resolve_local, CombinedDateTime};
