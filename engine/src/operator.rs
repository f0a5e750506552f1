//! Binary operators.

use crate::CalcError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A binary operator awaiting its second operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
}

impl BinaryOperator {
    /// All operators, in keypad order.
    pub const ALL: [BinaryOperator; 6] = [
        BinaryOperator::Add,
        BinaryOperator::Sub,
        BinaryOperator::Mul,
        BinaryOperator::Div,
        BinaryOperator::Pow,
        BinaryOperator::Mod,
    ];

    /// Symbol shown in the running expression and in log lines.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "×",
            BinaryOperator::Div => "÷",
            BinaryOperator::Pow => "^",
            BinaryOperator::Mod => "mod",
        }
    }

    /// Apply the operator.
    ///
    /// Division and modulo by exactly zero fail with
    /// [`CalcError::DivisionByZero`]; any non-finite result fails with
    /// [`CalcError::InvalidResult`].
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, CalcError> {
        let result = match self {
            BinaryOperator::Add => lhs + rhs,
            BinaryOperator::Sub => lhs - rhs,
            BinaryOperator::Mul => lhs * rhs,
            BinaryOperator::Div => {
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                lhs / rhs
            }
            BinaryOperator::Pow => power(lhs, rhs),
            BinaryOperator::Mod => {
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                lhs % rhs
            }
        };

        if result.is_finite() {
            Ok(result)
        } else {
            Err(CalcError::InvalidResult)
        }
    }
}

/// Exponentiation with NaN propagation for unit bases.
///
/// `f64::powf` returns 1 for `1^NaN` and `1^inf`; those are undefined here.
pub(crate) fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for BinaryOperator {
    type Err = String;

    /// Parse a keypad action name (`+`, `-`, `*`, `/`, `power`, `mod`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(BinaryOperator::Add),
            "-" | "−" => Ok(BinaryOperator::Sub),
            "*" | "×" => Ok(BinaryOperator::Mul),
            "/" | "÷" => Ok(BinaryOperator::Div),
            "^" | "power" => Ok(BinaryOperator::Pow),
            "mod" | "%" => Ok(BinaryOperator::Mod),
            other => Err(format!("unknown operator: {}", other)),
        }
    }
}

/// A parenthesis keystroke. Appended to the operand text, never evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Paren {
    Open,
    Close,
}

impl Paren {
    pub fn as_char(self) -> char {
        match self {
            Paren::Open => '(',
            Paren::Close => ')',
        }
    }
}
