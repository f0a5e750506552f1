//! Input events for the calculator.
//!
//! Every keystroke or button press becomes one [`Input`]. Strings coming
//! from a keyboard or a keypad are parsed once, at the edge, into these
//! closed enums.

use crate::{AngleMode, BinaryOperator, Paren, UnaryFunction};
use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI};

/// A named constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => PI,
            Constant::E => E,
        }
    }
}

/// A memory register action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryAction {
    Clear,
    Recall,
    Add,
    Subtract,
}

/// An input that can be applied to the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Input {
    /// A single decimal digit, `0..=9`.
    Digit { digit: u8 },
    DecimalPoint,
    Operator { operator: BinaryOperator },
    Paren { paren: Paren },
    Calculate,
    Function { function: UnaryFunction },
    Constant { constant: Constant },
    Memory { action: MemoryAction },
    Clear,
    Backspace,
    SetAngleMode { mode: AngleMode },
    ToggleAngleMode,
    /// Load the result part of a recorded calculation line.
    ReuseResult { calculation: String },
    /// The error display timer with this token has elapsed.
    ErrorTimeout { token: u64 },
}

impl Input {
    pub fn digit(digit: u8) -> Self {
        Input::Digit { digit }
    }

    pub fn operator(operator: BinaryOperator) -> Self {
        Input::Operator { operator }
    }

    pub fn function(function: UnaryFunction) -> Self {
        Input::Function { function }
    }

    pub fn memory(action: MemoryAction) -> Self {
        Input::Memory { action }
    }

    /// Map a keyboard key name to an input.
    pub fn from_key(key: &str) -> Option<Self> {
        let input = match key {
            "Enter" | "=" => Input::Calculate,
            "Escape" | "c" | "C" => Input::Clear,
            "Backspace" => Input::Backspace,
            "." => Input::DecimalPoint,
            "(" => Input::Paren { paren: Paren::Open },
            ")" => Input::Paren {
                paren: Paren::Close,
            },
            "+" | "-" | "*" | "/" => Input::operator(key.parse().ok()?),
            _ => return single_digit(key),
        };
        Some(input)
    }

    /// Map a keypad action name (`sin`, `power`, `m+`, `pi`, ...) to an input.
    pub fn from_action(action: &str) -> Option<Self> {
        let input = match action {
            "clear" => Input::Clear,
            "backspace" => Input::Backspace,
            "=" => Input::Calculate,
            "." => Input::DecimalPoint,
            "(" => Input::Paren { paren: Paren::Open },
            ")" => Input::Paren {
                paren: Paren::Close,
            },
            "pi" | "π" => Input::Constant {
                constant: Constant::Pi,
            },
            "e" => Input::Constant {
                constant: Constant::E,
            },
            "mc" => Input::memory(MemoryAction::Clear),
            "mr" => Input::memory(MemoryAction::Recall),
            "m+" => Input::memory(MemoryAction::Add),
            "m-" => Input::memory(MemoryAction::Subtract),
            "rad" | "deg" => Input::SetAngleMode {
                mode: action.parse().ok()?,
            },
            "drg" => Input::ToggleAngleMode,
            _ => {
                if let Some(digit) = single_digit(action) {
                    return Some(digit);
                }
                if let Ok(operator) = action.parse() {
                    return Some(Input::operator(operator));
                }
                Input::function(action.parse().ok()?)
            }
        };
        Some(input)
    }

    /// Whether this input is a user action (as opposed to a timer firing).
    pub fn is_user_action(&self) -> bool {
        !matches!(self, Input::ErrorTimeout { .. })
    }
}

fn single_digit(key: &str) -> Option<Input> {
    match key.as_bytes() {
        [b] if b.is_ascii_digit() => Some(Input::digit(b - b'0')),
        _ => None,
    }
}
