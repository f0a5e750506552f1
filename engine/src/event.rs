//! Output events emitted by the calculator.

use crate::{AngleMode, CalcError};
use serde::{Deserialize, Serialize};

/// Something a collaborator (display, history store, timer) should act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// The main display text changed.
    Display { text: String },
    /// The running-expression line changed (empty when cleared).
    Expression { text: String },
    /// A calculation completed; the line belongs in the history log.
    CalculationRecorded { calculation: String },
    /// The memory register was mutated.
    MemoryIndicator { active: bool },
    AngleModeChanged { mode: AngleMode },
    /// A calculation failed and the display shows `"Error"`.
    Failed { kind: CalcError },
    /// The host should feed back `ErrorTimeout { token }` after `after_ms`.
    #[serde(rename_all = "camelCase")]
    ResetScheduled { token: u64, after_ms: u64 },
    /// A previously scheduled reset is no longer wanted.
    ResetCancelled { token: u64 },
}

impl Event {
    pub fn display(text: impl Into<String>) -> Self {
        Event::Display { text: text.into() }
    }

    pub fn expression(text: impl Into<String>) -> Self {
        Event::Expression { text: text.into() }
    }

    pub fn recorded(calculation: impl Into<String>) -> Self {
        Event::CalculationRecorded {
            calculation: calculation.into(),
        }
    }
}

/// The last display text in a batch of events, if any.
pub fn last_display(events: &[Event]) -> Option<&str> {
    events.iter().rev().find_map(|e| match e {
        Event::Display { text } => Some(text.as_str()),
        _ => None,
    })
}

/// All calculation lines recorded in a batch of events, oldest first.
pub fn recorded_calculations(events: &[Event]) -> impl Iterator<Item = &str> {
    events.iter().filter_map(|e| match e {
        Event::CalculationRecorded { calculation } => Some(calculation.as_str()),
        _ => None,
    })
}
