//! Unary scientific functions.

use crate::operator::power;
use crate::CalcError;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Largest argument whose factorial is finite.
pub const FACTORIAL_MAX: f64 = 170.0;

/// How trigonometric arguments and results are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    Radians,
    Degrees,
}

impl AngleMode {
    pub fn toggled(self) -> Self {
        match self {
            AngleMode::Radians => AngleMode::Degrees,
            AngleMode::Degrees => AngleMode::Radians,
        }
    }

    fn to_radians(self, x: f64) -> f64 {
        match self {
            AngleMode::Radians => x,
            AngleMode::Degrees => x * PI / 180.0,
        }
    }

    fn from_radians(self, x: f64) -> f64 {
        match self {
            AngleMode::Radians => x,
            AngleMode::Degrees => x * 180.0 / PI,
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleMode::Radians => write!(f, "RAD"),
            AngleMode::Degrees => write!(f, "DEG"),
        }
    }
}

impl FromStr for AngleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rad" | "radians" => Ok(AngleMode::Radians),
            "deg" | "degrees" => Ok(AngleMode::Degrees),
            other => Err(format!("unknown angle mode: {}", other)),
        }
    }
}

/// A unary function applied to the current operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryFunction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Log,
    Ln,
    Log2,
    Sqrt,
    Cbrt,
    Square,
    Cube,
    Factorial,
    Pow10,
    Exp,
    Negate,
    Percent,
    Random,
    Abs,
    Reciprocal,
    Floor,
    Ceil,
    Round,
}

impl UnaryFunction {
    pub const ALL: [UnaryFunction; 27] = [
        UnaryFunction::Sin,
        UnaryFunction::Cos,
        UnaryFunction::Tan,
        UnaryFunction::Asin,
        UnaryFunction::Acos,
        UnaryFunction::Atan,
        UnaryFunction::Sinh,
        UnaryFunction::Cosh,
        UnaryFunction::Tanh,
        UnaryFunction::Log,
        UnaryFunction::Ln,
        UnaryFunction::Log2,
        UnaryFunction::Sqrt,
        UnaryFunction::Cbrt,
        UnaryFunction::Square,
        UnaryFunction::Cube,
        UnaryFunction::Factorial,
        UnaryFunction::Pow10,
        UnaryFunction::Exp,
        UnaryFunction::Negate,
        UnaryFunction::Percent,
        UnaryFunction::Random,
        UnaryFunction::Abs,
        UnaryFunction::Reciprocal,
        UnaryFunction::Floor,
        UnaryFunction::Ceil,
        UnaryFunction::Round,
    ];

    /// Name used in log lines and keypad actions.
    pub fn name(self) -> &'static str {
        match self {
            UnaryFunction::Sin => "sin",
            UnaryFunction::Cos => "cos",
            UnaryFunction::Tan => "tan",
            UnaryFunction::Asin => "asin",
            UnaryFunction::Acos => "acos",
            UnaryFunction::Atan => "atan",
            UnaryFunction::Sinh => "sinh",
            UnaryFunction::Cosh => "cosh",
            UnaryFunction::Tanh => "tanh",
            UnaryFunction::Log => "log",
            UnaryFunction::Ln => "ln",
            UnaryFunction::Log2 => "log2",
            UnaryFunction::Sqrt => "sqrt",
            UnaryFunction::Cbrt => "cbrt",
            UnaryFunction::Square => "square",
            UnaryFunction::Cube => "cube",
            UnaryFunction::Factorial => "factorial",
            UnaryFunction::Pow10 => "pow10",
            UnaryFunction::Exp => "exp",
            UnaryFunction::Negate => "negate",
            UnaryFunction::Percent => "percent",
            UnaryFunction::Random => "random",
            UnaryFunction::Abs => "abs",
            UnaryFunction::Reciprocal => "reciprocal",
            UnaryFunction::Floor => "floor",
            UnaryFunction::Ceil => "ceil",
            UnaryFunction::Round => "round",
        }
    }

    /// Whether the function reads its argument at all.
    pub fn uses_operand(self) -> bool {
        !matches!(self, UnaryFunction::Random)
    }

    /// Apply the function to `x`.
    ///
    /// Forward trigonometric and hyperbolic functions take their argument
    /// in `mode`; inverse trigonometric functions return in `mode`.
    pub fn apply(self, x: f64, mode: AngleMode, rng: &mut dyn RngCore) -> Result<f64, CalcError> {
        let result = match self {
            UnaryFunction::Sin => mode.to_radians(x).sin(),
            UnaryFunction::Cos => mode.to_radians(x).cos(),
            UnaryFunction::Tan => mode.to_radians(x).tan(),
            UnaryFunction::Asin => mode.from_radians(x.asin()),
            UnaryFunction::Acos => mode.from_radians(x.acos()),
            UnaryFunction::Atan => mode.from_radians(x.atan()),
            UnaryFunction::Sinh => mode.to_radians(x).sinh(),
            UnaryFunction::Cosh => mode.to_radians(x).cosh(),
            UnaryFunction::Tanh => mode.to_radians(x).tanh(),
            UnaryFunction::Log => x.log10(),
            UnaryFunction::Ln => x.ln(),
            UnaryFunction::Log2 => x.log2(),
            UnaryFunction::Sqrt => x.sqrt(),
            UnaryFunction::Cbrt => x.cbrt(),
            UnaryFunction::Square => x * x,
            UnaryFunction::Cube => x * x * x,
            UnaryFunction::Factorial => factorial(x.floor())?,
            UnaryFunction::Pow10 => power(10.0, x),
            UnaryFunction::Exp => x.exp(),
            UnaryFunction::Negate => -x,
            UnaryFunction::Percent => x / 100.0,
            UnaryFunction::Random => rng.gen::<f64>(),
            UnaryFunction::Abs => x.abs(),
            UnaryFunction::Reciprocal => {
                if x == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                1.0 / x
            }
            UnaryFunction::Floor => x.floor(),
            UnaryFunction::Ceil => x.ceil(),
            UnaryFunction::Round => round_half_up(x),
        };

        if result.is_finite() {
            Ok(result)
        } else {
            Err(CalcError::InvalidResult)
        }
    }
}

impl fmt::Display for UnaryFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnaryFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        UnaryFunction::ALL
            .iter()
            .copied()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| format!("unknown function: {}", s))
    }
}

/// `n!` for a whole `n` in `[0, 170]`.
pub fn factorial(n: f64) -> Result<f64, CalcError> {
    if !(0.0..=FACTORIAL_MAX).contains(&n) {
        return Err(CalcError::InvalidInput);
    }
    Ok((2..=n as u32).fold(1.0, |acc, i| acc * f64::from(i)))
}

/// Round half-way cases towards positive infinity (`-2.5` -> `-2`).
fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}
