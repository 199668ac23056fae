//! Built-in functions, constants and value methods available to formulas.
//!
//! Conventions:
//! - Names follow their JavaScript spelling (`Math.round`, `toFixed`) since
//!   formulas are authored as JavaScript expressions.
//! - Missing arguments behave like `undefined` (`NaN` for math).
//! - Anything not listed here is a formula error; there is no fallback to a
//!   host environment.

use crate::engine::Scalar;
use crate::error::{EvalError, Result};

pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
}

pub const FUNCTION_BUILTINS: &[Builtin] = &[
    Builtin {
        name: "Math.abs",
        description: "Absolute value",
    },
    Builtin {
        name: "Math.ceil",
        description: "Round up to an integer",
    },
    Builtin {
        name: "Math.floor",
        description: "Round down to an integer",
    },
    Builtin {
        name: "Math.round",
        description: "Round to the nearest integer, halves toward +Infinity",
    },
    Builtin {
        name: "Math.trunc",
        description: "Drop the fractional part",
    },
    Builtin {
        name: "Math.sign",
        description: "-1, 0 or 1",
    },
    Builtin {
        name: "Math.sqrt",
        description: "Square root",
    },
    Builtin {
        name: "Math.pow",
        description: "Base raised to an exponent",
    },
    Builtin {
        name: "Math.min",
        description: "Smallest argument",
    },
    Builtin {
        name: "Math.max",
        description: "Largest argument",
    },
    Builtin {
        name: "Number",
        description: "Convert to a number",
    },
    Builtin {
        name: "String",
        description: "Convert to a string",
    },
];

const NAMESPACES: &[&str] = &["Math"];

/// Whether `name` is only valid as the prefix of a qualified builtin.
pub fn is_namespace(name: &str) -> bool {
    NAMESPACES.contains(&name)
}

/// Value of a qualified constant such as `Math.PI`.
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "Math.PI" => Some(std::f64::consts::PI),
        "Math.E" => Some(std::f64::consts::E),
        _ => None,
    }
}

fn arg_number(args: &[Scalar], idx: usize) -> f64 {
    args.get(idx).map(Scalar::to_number).unwrap_or(f64::NAN)
}

/// `Math.round`: halves round toward positive infinity.
fn js_round(n: f64) -> f64 {
    if (n - n.trunc()).abs() == 0.5 {
        n.ceil()
    } else {
        n.round()
    }
}

/// `Math.pow` / `**`.
pub fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

/// Call a free function by its (possibly qualified) name.
pub fn call_function(name: &str, args: &[Scalar]) -> Result<Scalar> {
    let unary = |f: fn(f64) -> f64| -> Result<Scalar> { Ok(Scalar::Number(f(arg_number(args, 0)))) };
    match name {
        "Math.abs" => unary(f64::abs),
        "Math.ceil" => unary(f64::ceil),
        "Math.floor" => unary(f64::floor),
        "Math.round" => unary(js_round),
        "Math.trunc" => unary(f64::trunc),
        "Math.sqrt" => unary(f64::sqrt),
        "Math.sign" => unary(|n| if n == 0.0 || n.is_nan() { n } else { n.signum() }),
        "Math.pow" => Ok(Scalar::Number(js_pow(
            arg_number(args, 0),
            arg_number(args, 1),
        ))),
        "Math.min" => Ok(Scalar::Number(fold_numbers(args, f64::INFINITY, f64::min))),
        "Math.max" => Ok(Scalar::Number(fold_numbers(
            args,
            f64::NEG_INFINITY,
            f64::max,
        ))),
        "Number" => Ok(Scalar::Number(
            args.first().map(Scalar::to_number).unwrap_or(0.0),
        )),
        "String" => Ok(Scalar::Text(
            args.first().map(|v| v.to_string()).unwrap_or_default(),
        )),
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

/// `Math.min`/`Math.max` propagate `NaN`; `f64::min`/`f64::max` do not.
fn fold_numbers(args: &[Scalar], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    let mut acc = init;
    for n in args.iter().map(Scalar::to_number) {
        if n.is_nan() {
            return f64::NAN;
        }
        acc = pick(acc, n);
    }
    acc
}

/// Call a method on a value (`x.toFixed(2)`).
pub fn call_method(target: &Scalar, name: &str, args: &[Scalar]) -> Result<Scalar> {
    match (target, name) {
        (Scalar::Number(n), "toFixed") => {
            let digits = args.first().map(Scalar::to_number).unwrap_or(0.0);
            let digits = if digits.is_nan() { 0.0 } else { digits.trunc() };
            if !(0.0..=100.0).contains(&digits) {
                return Err(EvalError::Range(
                    "toFixed() digits argument must be between 0 and 100".to_string(),
                ));
            }
            Ok(Scalar::Text(to_fixed(*n, digits as usize)))
        }
        (Scalar::Number(n), "toString") => Ok(Scalar::Text(Scalar::Number(*n).to_string())),
        (Scalar::Text(s), "toUpperCase") => Ok(Scalar::Text(s.to_uppercase())),
        (Scalar::Text(s), "toLowerCase") => Ok(Scalar::Text(s.to_lowercase())),
        (Scalar::Text(s), "trim") => Ok(Scalar::Text(s.trim().to_string())),
        (Scalar::Text(s), "toString") => Ok(Scalar::Text(s.clone())),
        (Scalar::Bool(b), "toString") => Ok(Scalar::Text(b.to_string())),
        _ => Err(EvalError::UnknownFunction(format!(
            "{}.{}",
            target.type_name(),
            name
        ))),
    }
}

/// Read a property of a value (`x.length`).
pub fn get_property(target: &Scalar, name: &str) -> Result<Scalar> {
    match (target, name) {
        (Scalar::Text(s), "length") => Ok(Scalar::Number(s.encode_utf16().count() as f64)),
        _ => Err(EvalError::UnknownProperty {
            property: name.to_string(),
            target: target.type_name().to_string(),
        }),
    }
}

/// `Number.prototype.toFixed`: exact ties round away from zero.
fn to_fixed(n: f64, digits: usize) -> String {
    if !n.is_finite() || n.abs() >= 1e21 {
        return Scalar::Number(n).to_string();
    }
    // -0 prints as "0.00", not "-0.00".
    let n = if n == 0.0 { 0.0 } else { n };
    let scale = 10f64.powi(digits as i32);
    let scaled = n.abs() * scale;
    if scaled.is_finite() && scaled - scaled.trunc() == 0.5 {
        let rounded = (scaled.trunc() + 1.0) / scale;
        let sign = if n < 0.0 { "-" } else { "" };
        return format!("{}{:.*}", sign, digits, rounded);
    }
    format!("{:.*}", digits, n)
}
