//! Formula preprocessing: quote normalization, placeholder extraction and
//! rewriting placeholders to safe variable names.
//!
//! Before a formula can be parsed, placeholders like `{orders.total}` must be
//! replaced by plain identifiers. This module handles:
//!
//! - **Quote normalization**: `‘x’` → `'x'`, `“x”` → `"x"`
//! - **Token extraction**: `{price} * {qty} + {price}` → `["price", "qty"]`
//! - **Substitution**: `{price}` → `__var_0` (every occurrence)
//! - **Screening**: rejecting rewritten text that names a browser/host global

use regex::Regex;
use std::sync::OnceLock;

/// Identifiers that must never appear in a rewritten formula.
pub const DENYLIST: &[&str] = &[
    "window",
    "document",
    "eval",
    "alert",
    "console",
    "fetch",
    "XMLHttpRequest",
    "globalThis",
    "process",
];

const VAR_PREFIX: &str = "__var_";

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder regex must compile"))
}

/// Replace typographic quotes with their ASCII equivalents.
pub fn normalize_quotes(formula: &str) -> String {
    formula
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
}

/// Extract the unique placeholder paths of a formula, in order of first
/// appearance.
pub fn extract_tokens(formula: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for caps in placeholder_re().captures_iter(formula) {
        let token = &caps[1];
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Name of the variable bound to the `idx`-th token.
pub fn var_name(idx: usize) -> String {
    format!("{}{}", VAR_PREFIX, idx)
}

/// Replace every `{token}` with its variable name.
///
/// Replacement is literal: token text such as `a.b` or `(x)` is never
/// interpreted as a pattern.
pub fn substitute_tokens(formula: &str, tokens: &[String]) -> String {
    let mut script = formula.to_string();
    for (idx, token) in tokens.iter().enumerate() {
        let placeholder = format!("{{{}}}", token);
        script = script.replace(&placeholder, &var_name(idx));
    }
    script
}

/// Return the first denylisted identifier found in `script`, if any.
///
/// This is a plain case-sensitive substring search, so it also fires inside
/// string literals and longer identifiers (`processed`).
pub fn find_unsafe_identifier(script: &str) -> Option<&'static str> {
    DENYLIST.iter().copied().find(|word| script.contains(word))
}
