//! Operand parsing and canonical number formatting.
//!
//! Every value the calculator shows goes through [`format_result`]. The
//! output is stable: formatting the parsed value of an already formatted
//! string yields the same string.

/// Magnitudes below this collapse to `"0"`.
pub const ZERO_THRESHOLD: f64 = 1e-10;

/// Magnitudes above this are shown in scientific notation.
pub const SCIENTIFIC_ABOVE: f64 = 1e10;

/// Magnitudes below this (and above [`ZERO_THRESHOLD`]) are shown in
/// scientific notation.
pub const SCIENTIFIC_BELOW: f64 = 1e-6;

/// Significant digits kept in plain notation.
pub const SIGNIFICANT_DIGITS: usize = 12;

/// Mantissa decimals in scientific notation.
pub const MANTISSA_DECIMALS: usize = 6;

/// Parse operand text as a float.
///
/// The whole text must be a decimal number (optionally with an exponent).
/// Anything else, including text carrying parenthesis characters, parses
/// as NaN.
pub fn parse_operand(text: &str) -> f64 {
    let has_word = text
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E');
    if text.is_empty() || has_word {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

/// Format a computed value into its canonical display string.
pub fn format_result(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude < ZERO_THRESHOLD {
        return "0".to_string();
    }
    if magnitude > SCIENTIFIC_ABOVE || magnitude < SCIENTIFIC_BELOW {
        let text = to_exponential(value, MANTISSA_DECIMALS);
        // Mantissa rounding can land exactly on a plain-range boundary.
        match text.parse::<f64>() {
            Ok(shown) if is_plain_range(shown.abs()) => return number_to_string(shown),
            _ => return text,
        }
    }

    let rounded: f64 = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value)
        .parse()
        .unwrap_or(value);
    number_to_string(rounded)
}

/// Render a value with a fixed number of mantissa decimals and a signed
/// exponent, e.g. `1.500000e+11`.
pub fn to_exponential(value: f64, decimals: usize) -> String {
    with_signed_exponent(format!("{:.*e}", decimals, value))
}

/// Shortest round-trip text for a number: plain decimal for
/// `1e-6 <= |x| < 1e21`, `<mantissa>e±<exp>` otherwise.
pub fn number_to_string(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&value.abs()) {
        format!("{}", value)
    } else {
        with_signed_exponent(format!("{:e}", value))
    }
}

fn is_plain_range(magnitude: f64) -> bool {
    (SCIENTIFIC_BELOW..=SCIENTIFIC_ABOVE).contains(&magnitude)
}

fn with_signed_exponent(text: String) -> String {
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}
