//! The time clarification prompt.
//!
//! When an edit lands on a repeated wall-clock time, the user is asked which
//! occurrence they meant: the daylight-saving one or the standard one. The
//! prompt is transient UI state; each ambiguity episode opens it at most once
//! and always ends `Closed`.

use serde::Serialize;
use tracing::debug;

use crate::dst::{ambiguous_candidates, check_ambiguous};
use crate::value::CombinedDateTime;

/// Whether the clarification prompt is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptState {
    #[default]
    Closed,
    /// Two candidate offsets; the user must pick one.
    OpenAmbiguous,
}

/// The two buttons on the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetChoice {
    DaylightSaving,
    Standard,
}

/// Snapshot of the picker's ambiguity flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AmbiguityState {
    pub is_ambiguous: bool,
    pub is_prompt_open: bool,
}

/// Outcome of one [`ClarificationPrompt::check`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The prompt was already open; nothing was evaluated.
    Suppressed,
    /// Evaluated. `opened` is true when the value newly became ambiguous.
    Evaluated { ambiguous: bool, opened: bool },
}

#[derive(Debug, Clone, Default)]
pub struct ClarificationPrompt {
    state: AmbiguityState,
}

impl ClarificationPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ambiguity(&self) -> AmbiguityState {
        self.state
    }

    pub fn state(&self) -> PromptState {
        if self.state.is_prompt_open {
            PromptState::OpenAmbiguous
        } else {
            PromptState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_prompt_open
    }

    /// The offset buttons are hidden when the current value is not ambiguous.
    pub fn is_offset_button_hidden(&self) -> bool {
        !self.state.is_ambiguous
    }

    /// Re-evaluate ambiguity for the current value; absent is unambiguous.
    ///
    /// Skipped entirely while the prompt is open, so focus moving between the
    /// hour and minute fields cannot re-trigger it. Otherwise the prompt opens
    /// iff the value is ambiguous now and was not before.
    pub fn check(&mut self, value: Option<&CombinedDateTime>) -> CheckOutcome {
        if self.state.is_prompt_open {
            debug!("ambiguity check suppressed while prompt is open");
            return CheckOutcome::Suppressed;
        }

        let ambiguous = value.is_some_and(check_ambiguous);
        let opened = ambiguous && !self.state.is_ambiguous;

        self.state = AmbiguityState {
            is_ambiguous: ambiguous,
            is_prompt_open: opened,
        };

        if opened {
            debug!(
                value = %value.map(CombinedDateTime::to_iso).unwrap_or_default(),
                "ambiguous local time, opening clarification prompt"
            );
        }

        CheckOutcome::Evaluated { ambiguous, opened }
    }

    /// Handle a prompt button.
    ///
    /// Only an open prompt responds; a click while `Closed` changes nothing.
    /// The prompt then closes. The choice picks one of the two instants that
    /// share the current wall-clock time: daylight-saving is the earlier
    /// occurrence, standard the later one. A value is returned only when that
    /// instant differs from `current`, so the wall-clock digits never move.
    pub fn resolve(
        &mut self,
        choice: OffsetChoice,
        current: Option<&CombinedDateTime>,
    ) -> Option<CombinedDateTime> {
        if !self.state.is_prompt_open {
            debug!(?choice, "prompt is closed, ignoring offset choice");
            return None;
        }
        self.state.is_prompt_open = false;

        let current = current?;
        let Some(candidates) = ambiguous_candidates(current) else {
            debug!(value = %current, "value is no longer ambiguous, nothing to commit");
            return None;
        };
        let chosen = match choice {
            OffsetChoice::DaylightSaving => candidates.daylight_saving,
            OffsetChoice::Standard => candidates.standard,
        };
        if chosen.instant() == current.instant() {
            debug!(?choice, "offset already matches choice, nothing to commit");
            return None;
        }

        debug!(?choice, from = %current, to = %chosen, "resolved ambiguous time");
        Some(chosen)
    }
}
