//! Placeholder path resolution against row data.
//!
//! A path such as `customer.address.city` is walked one segment at a time.
//! When the walk reaches an array with segments still left, the rest of the
//! path is resolved against every element and the results are rolled up with
//! [`aggregate_values`]. Missing data resolves to `0` so formulas mixing
//! present and absent fields still produce a number.

use serde_json::{Map, Value};

use super::value::{Scalar, is_numeric_string, parse_js_number};

/// A row of table data: field name to JSON value.
pub type Row = Map<String, Value>;

/// Key unwrapped from contact-field shaped objects (`{ value, type, isPrimary }`).
const VALUE_KEY: &str = "value";

/// Resolve a dotted path against a row.
pub fn resolve_path(row: &Row, path: &str) -> Scalar {
    let segments: Vec<&str> = path.split('.').collect();
    match segments.split_first() {
        Some((first, rest)) => walk(row.get(*first), rest),
        None => Scalar::Number(0.0),
    }
}

fn walk(current: Option<&Value>, rest: &[&str]) -> Scalar {
    let Some((segment, tail)) = rest.split_first() else {
        return finish(current);
    };
    match current {
        Some(Value::Array(items)) => {
            aggregate_values(items.iter().map(|item| walk(Some(item), rest)).collect())
        }
        Some(Value::Object(map)) => walk(map.get(*segment), tail),
        // Null, missing, or a scalar with no fields to descend into.
        _ => Scalar::Number(0.0),
    }
}

fn finish(current: Option<&Value>) -> Scalar {
    match current {
        None | Some(Value::Null) => Scalar::Number(0.0),
        Some(Value::Object(map)) => match map.get(VALUE_KEY) {
            Some(inner) => json_to_scalar(inner),
            None => Scalar::Number(f64::NAN),
        },
        Some(Value::Array(_)) => Scalar::Number(f64::NAN),
        Some(Value::String(s)) if is_numeric_string(s) => Scalar::Number(parse_js_number(s)),
        Some(other) => json_to_scalar(other),
    }
}

/// Convert a JSON value to a scalar without numeric-string coercion.
/// Objects and arrays have no scalar form and become `NaN`.
pub fn json_to_scalar(value: &Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Number(n) => Scalar::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Scalar::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => Scalar::Number(f64::NAN),
    }
}

/// Roll up the per-element values of a one-to-many path.
///
/// Nulls and empty strings are dropped. Nothing left is `0`; all numbers are
/// summed; anything else is joined with `", "`.
pub fn aggregate_values(values: Vec<Scalar>) -> Scalar {
    let kept: Vec<Scalar> = values
        .into_iter()
        .filter(|v| !matches!(v, Scalar::Null) && !matches!(v, Scalar::Text(s) if s.is_empty()))
        .collect();

    if kept.is_empty() {
        return Scalar::Number(0.0);
    }
    if kept.iter().all(Scalar::is_number) {
        return Scalar::Number(kept.iter().map(Scalar::to_number).sum());
    }
    Scalar::Text(
        kept.iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_resolve_top_level_and_nested() {
        let r = row(json!({
            "price": 12.5,
            "customer": { "address": { "city": "Lyon" } }
        }));
        assert_eq!(resolve_path(&r, "price"), Scalar::Number(12.5));
        assert_eq!(resolve_path(&r, "customer.address.city"), Scalar::text("Lyon"));
    }

    #[test]
    fn test_resolve_missing_is_zero() {
        let r = row(json!({ "customer": null, "name": "Acme" }));
        assert_eq!(resolve_path(&r, "missing"), Scalar::Number(0.0));
        assert_eq!(resolve_path(&r, "customer.address.city"), Scalar::Number(0.0));
        assert_eq!(resolve_path(&r, "name.first"), Scalar::Number(0.0));
    }

    #[test]
    fn test_resolve_numeric_string() {
        let r = row(json!({ "qty": "3", "code": "007a", "blank": "  " }));
        assert_eq!(resolve_path(&r, "qty"), Scalar::Number(3.0));
        assert_eq!(resolve_path(&r, "code"), Scalar::text("007a"));
        assert_eq!(resolve_path(&r, "blank"), Scalar::text("  "));
    }

    #[test]
    fn test_resolve_value_unwrap() {
        let r = row(json!({
            "email": { "value": "a@b.com", "type": "Work", "isPrimary": true },
            "score": { "value": "10" }
        }));
        assert_eq!(resolve_path(&r, "email"), Scalar::text("a@b.com"));
        // Unwrapped values are returned as-is.
        assert_eq!(resolve_path(&r, "score"), Scalar::text("10"));
    }

    #[test]
    fn test_resolve_plain_object_is_nan() {
        let r = row(json!({ "a": { "x": 1 }, "tags": ["x", "y"] }));
        assert!(resolve_path(&r, "a").to_number().is_nan());
        assert!(resolve_path(&r, "tags").to_number().is_nan());
    }

    #[test]
    fn test_resolve_one_to_many_sum() {
        let r = row(json!({ "orders": [{ "total": 10 }, { "total": 15 }, { "total": 5 }] }));
        assert_eq!(resolve_path(&r, "orders.total"), Scalar::Number(30.0));
    }

    #[test]
    fn test_resolve_one_to_many_nested_arrays() {
        let r = row(json!({
            "accounts": [
                { "orders": [{ "total": 1 }, { "total": 2 }] },
                { "orders": [{ "total": 3 }] }
            ]
        }));
        assert_eq!(resolve_path(&r, "accounts.orders.total"), Scalar::Number(6.0));
    }

    #[test]
    fn test_resolve_one_to_many_missing_fields_count_as_zero() {
        let r = row(json!({ "orders": [{ "total": 4 }, {}, null] }));
        assert_eq!(resolve_path(&r, "orders.total"), Scalar::Number(4.0));
    }

    #[test]
    fn test_aggregate_values() {
        assert_eq!(aggregate_values(vec![]), Scalar::Number(0.0));
        assert_eq!(
            aggregate_values(vec![Scalar::Null, Scalar::text("")]),
            Scalar::Number(0.0)
        );
        assert_eq!(
            aggregate_values(vec![Scalar::number(1.0), Scalar::number(2.5)]),
            Scalar::Number(3.5)
        );
        assert_eq!(
            aggregate_values(vec![Scalar::text("A"), Scalar::Null, Scalar::text("B")]),
            Scalar::text("A, B")
        );
        assert_eq!(
            aggregate_values(vec![Scalar::number(1.0), Scalar::text("x")]),
            Scalar::text("1, x")
        );
    }
}
