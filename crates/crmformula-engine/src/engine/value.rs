//! Scalar values flowing through formula evaluation.
//!
//! Formulas are authored against JavaScript expression semantics, so the
//! coercions here (`to_number`, `Display`, truthiness, loose equality) follow
//! the JavaScript abstract operations for the primitive types we support.

use serde::Serialize;
use std::fmt;

/// A primitive value: the result of resolving a placeholder or of evaluating
/// an expression.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn number(n: f64) -> Scalar {
        Scalar::Number(n)
    }

    pub fn text(s: impl Into<String>) -> Scalar {
        Scalar::Text(s.into())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Scalar::Number(_))
    }

    /// JavaScript `ToNumber`.
    pub fn to_number(&self) -> f64 {
        match self {
            Scalar::Null => 0.0,
            Scalar::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Scalar::Number(n) => *n,
            Scalar::Text(s) => parse_js_number(s),
        }
    }

    /// JavaScript `ToBoolean`.
    pub fn truthy(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Bool(b) => *b,
            Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
            Scalar::Text(s) => !s.is_empty(),
        }
    }

    /// Name used in error messages (`typeof`-like).
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::Text(_) => "string",
        }
    }

    /// `===`
    pub fn strict_eq(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Number(a), Scalar::Number(b)) => a == b,
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            _ => false,
        }
    }

    /// `==`
    pub fn loose_eq(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Null, _) | (_, Scalar::Null) => false,
            (Scalar::Bool(_), _) => Scalar::Number(self.to_number()).loose_eq(other),
            (_, Scalar::Bool(_)) => self.loose_eq(&Scalar::Number(other.to_number())),
            (Scalar::Number(a), Scalar::Text(_)) => *a == other.to_number(),
            (Scalar::Text(_), Scalar::Number(b)) => self.to_number() == *b,
            _ => self.strict_eq(other),
        }
    }
}

impl fmt::Display for Scalar {
    /// JavaScript `ToString`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => f.write_str(&number_to_string(*n)),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Parse a string the way JavaScript's `Number(string)` does for decimal
/// input. Surrounding whitespace is ignored, an empty string is `0`, and
/// anything that is not a complete decimal literal is `NaN`.
pub fn parse_js_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust's float parser also accepts "inf"/"nan"; JavaScript does not.
    let decimal_only = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal_only {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Whether a string converts completely to a finite number.
pub fn is_numeric_string(s: &str) -> bool {
    !s.trim().is_empty() && parse_js_number(s).is_finite()
}

/// JavaScript `Number.prototype.toString()` for radix 10.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    format!("{}", n)
}
