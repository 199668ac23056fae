//! Formula evaluation.
//!
//! [`evaluate`] is the only entry point a table needs: it runs the whole
//! pipeline (normalize, extract, resolve, substitute, screen, parse,
//! execute, classify) and folds every internal failure into an error tag.

use std::collections::HashMap;

use tracing::debug;

use super::format::{FormulaError, FormulaOutput};
use super::parser::{BinaryOp, Expr, LogicalOp, UnaryOp, parse};
use super::preprocess::{
    extract_tokens, find_unsafe_identifier, normalize_quotes, substitute_tokens, var_name,
};
use super::resolve::{Row, resolve_path};
use super::value::Scalar;
use crate::builtins::{call_function, call_method, get_property, js_pow};
use crate::error::{EvalError, Result};

/// Variable bindings for one evaluation.
pub type Scope = HashMap<String, Scalar>;

/// Evaluate `formula` against `row`.
///
/// Returns `None` for an empty formula. Otherwise the result is a value or
/// one of the [`FormulaError`] tags; this function never panics on user
/// input and never mutates `row`.
pub fn evaluate(formula: &str, row: &Row) -> Option<FormulaOutput> {
    if formula.is_empty() {
        return None;
    }
    match run(formula, row) {
        Ok(output) => Some(output),
        Err(err) => {
            debug!(formula, error = %err, "formula evaluation failed");
            Some(FormulaOutput::Error(FormulaError::Syntax))
        }
    }
}

/// [`evaluate`] for optional formulas (`None` behaves like `""`).
pub fn evaluate_opt(formula: Option<&str>, row: &Row) -> Option<FormulaOutput> {
    formula.and_then(|f| evaluate(f, row))
}

/// Check that a formula would pass screening and parse, without resolving
/// any data. Used to validate column configuration when it is saved.
pub fn check_formula(formula: &str) -> std::result::Result<(), FormulaError> {
    let normalized = normalize_quotes(formula);
    let tokens = extract_tokens(&normalized);
    let script = substitute_tokens(&normalized, &tokens);
    if find_unsafe_identifier(&script).is_some() {
        return Err(FormulaError::UnsafeExpression);
    }
    parse(&script).map(|_| ()).map_err(|err| {
        debug!(formula, error = %err, "formula failed to parse");
        FormulaError::Syntax
    })
}

fn run(formula: &str, row: &Row) -> Result<FormulaOutput> {
    let normalized = normalize_quotes(formula);
    let tokens = extract_tokens(&normalized);

    let mut scope = Scope::with_capacity(tokens.len());
    for (idx, token) in tokens.iter().enumerate() {
        scope.insert(var_name(idx), resolve_path(row, token));
    }
    let script = substitute_tokens(&normalized, &tokens);

    if let Some(word) = find_unsafe_identifier(&script) {
        debug!(formula, word, "formula rejected by denylist");
        return Ok(FormulaError::UnsafeExpression.into());
    }

    let expr = parse(&script)?;
    let value = eval_expr(&expr, &scope)?;
    Ok(classify(value))
}

fn classify(value: Scalar) -> FormulaOutput {
    match value {
        Scalar::Number(n) if n.is_infinite() => FormulaError::Infinity.into(),
        Scalar::Number(n) if n.is_nan() => FormulaError::NaN.into(),
        other => FormulaOutput::Value(other),
    }
}

/// Evaluate a parsed expression with the given bindings.
pub fn eval_expr(expr: &Expr, scope: &Scope) -> Result<Scalar> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Var(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownIdentifier(name.clone())),
        Expr::Unary(op, operand) => {
            let v = eval_expr(operand, scope)?;
            Ok(match op {
                UnaryOp::Neg => Scalar::Number(-v.to_number()),
                UnaryOp::Plus => Scalar::Number(v.to_number()),
                UnaryOp::Not => Scalar::Bool(!v.truthy()),
            })
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = eval_expr(lhs, scope)?;
            let r = eval_expr(rhs, scope)?;
            Ok(binary(*op, &l, &r))
        }
        Expr::Logical(op, lhs, rhs) => {
            let l = eval_expr(lhs, scope)?;
            let short_circuit = match op {
                LogicalOp::And => !l.truthy(),
                LogicalOp::Or => l.truthy(),
                LogicalOp::Nullish => !matches!(l, Scalar::Null),
            };
            if short_circuit {
                Ok(l)
            } else {
                eval_expr(rhs, scope)
            }
        }
        Expr::Conditional(cond, then, otherwise) => {
            if eval_expr(cond, scope)?.truthy() {
                eval_expr(then, scope)
            } else {
                eval_expr(otherwise, scope)
            }
        }
        Expr::Call { callee, args } => {
            let args = eval_args(args, scope)?;
            call_function(callee, &args)
        }
        Expr::Method { target, name, args } => {
            let target = eval_expr(target, scope)?;
            let args = eval_args(args, scope)?;
            call_method(&target, name, &args)
        }
        Expr::Property { target, name } => {
            let target = eval_expr(target, scope)?;
            get_property(&target, name)
        }
    }
}

fn eval_args(args: &[Expr], scope: &Scope) -> Result<Vec<Scalar>> {
    args.iter().map(|arg| eval_expr(arg, scope)).collect()
}

fn binary(op: BinaryOp, l: &Scalar, r: &Scalar) -> Scalar {
    match op {
        BinaryOp::Add => {
            if matches!(l, Scalar::Text(_)) || matches!(r, Scalar::Text(_)) {
                Scalar::Text(format!("{}{}", l, r))
            } else {
                Scalar::Number(l.to_number() + r.to_number())
            }
        }
        BinaryOp::Sub => Scalar::Number(l.to_number() - r.to_number()),
        BinaryOp::Mul => Scalar::Number(l.to_number() * r.to_number()),
        BinaryOp::Div => Scalar::Number(l.to_number() / r.to_number()),
        BinaryOp::Rem => Scalar::Number(l.to_number() % r.to_number()),
        BinaryOp::Pow => Scalar::Number(js_pow(l.to_number(), r.to_number())),
        BinaryOp::Lt => Scalar::Bool(compare(l, r, |o| o.is_lt())),
        BinaryOp::Le => Scalar::Bool(compare(l, r, |o| o.is_le())),
        BinaryOp::Gt => Scalar::Bool(compare(l, r, |o| o.is_gt())),
        BinaryOp::Ge => Scalar::Bool(compare(l, r, |o| o.is_ge())),
        BinaryOp::Eq => Scalar::Bool(l.loose_eq(r)),
        BinaryOp::Ne => Scalar::Bool(!l.loose_eq(r)),
        BinaryOp::StrictEq => Scalar::Bool(l.strict_eq(r)),
        BinaryOp::StrictNe => Scalar::Bool(!l.strict_eq(r)),
    }
}

/// Relational comparison: two strings compare lexicographically, anything
/// else numerically. Comparisons involving `NaN` are false.
fn compare(l: &Scalar, r: &Scalar, accept: fn(std::cmp::Ordering) -> bool) -> bool {
    if let (Scalar::Text(a), Scalar::Text(b)) = (l, r) {
        return accept(a.cmp(b));
    }
    l.to_number()
        .partial_cmp(&r.to_number())
        .is_some_and(accept)
}
