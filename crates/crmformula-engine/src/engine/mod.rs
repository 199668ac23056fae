//! Column formula engine API.
//!
//! This module provides everything needed to compute a formula column:
//!
//! - [`evaluate`] - Evaluate a formula against a row, folding failures into error tags
//! - [`Scalar`] - Values produced by resolution and evaluation
//! - [`FormulaOutput`], [`FormulaError`] - Evaluation results and the fixed error tags
//! - [`extract_tokens`] - Parse the `{field.path}` placeholders a formula depends on
//! - [`resolve_path`], [`aggregate_values`] - Walk row data, rolling up one-to-many relations
//! - [`parse`], [`eval_expr`] - The safe expression parser/evaluator behind `evaluate`
//! - [`format_output`] - Format results for display

mod eval;
mod format;
mod parser;
mod preprocess;
mod resolve;
mod value;

pub use eval::{Scope, check_formula, eval_expr, evaluate, evaluate_opt};
pub use format::{FormulaError, FormulaOutput, format_number, format_output};
pub use parser::{BinaryOp, Expr, LogicalOp, UnaryOp, parse};
pub use preprocess::{
    DENYLIST, extract_tokens, find_unsafe_identifier, normalize_quotes, substitute_tokens,
    var_name,
};
pub use resolve::{Row, aggregate_values, json_to_scalar, resolve_path};
pub use value::{Scalar, is_numeric_string, number_to_string, parse_js_number};
