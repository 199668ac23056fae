use std::fmt;

use super::value::Scalar;

/// Fixed error tags a formula cell can show instead of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormulaError {
    UnsafeExpression,
    Infinity,
    NaN,
    Syntax,
}

impl FormulaError {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaError::UnsafeExpression => "#ERR: Unsafe Expression",
            FormulaError::Infinity => "#ERR: Infinity",
            FormulaError::NaN => "#ERR: NaN",
            FormulaError::Syntax => "#ERR: Syntax",
        }
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating a non-empty formula.
#[derive(Clone, Debug, PartialEq)]
pub enum FormulaOutput {
    Value(Scalar),
    Error(FormulaError),
}

impl FormulaOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, FormulaOutput::Error(_))
    }

}

impl fmt::Display for FormulaOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaOutput::Value(v) => write!(f, "{}", v),
            FormulaOutput::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<FormulaError> for FormulaOutput {
    fn from(err: FormulaError) -> Self {
        FormulaOutput::Error(err)
    }
}

/// Format an output for a table cell.
pub fn format_output(output: &FormulaOutput, precision: usize) -> String {
    match output {
        FormulaOutput::Value(Scalar::Number(n)) => format_number(*n, precision),
        FormulaOutput::Value(Scalar::Null) => String::new(),
        other => other.to_string(),
    }
}

/// Format a number for display.
pub fn format_number(n: f64, precision: usize) -> String {
    if n.is_nan() {
        FormulaError::NaN.to_string()
    } else if n.is_infinite() {
        FormulaError::Infinity.to_string()
    } else if n == 0.0 {
        // -0 prints as "0", as in JavaScript.
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{:.*}", precision, n)
    }
}
