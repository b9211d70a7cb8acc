//! Loose value coercions shared by condition and formula evaluation.
//!
//! Workflow authors write rules against untyped JSON, so numbers arrive as
//! strings, booleans as numbers and so on. These helpers define the single
//! set of conversions every part of the engine agrees on.

use serde_json::{Map, Value};
use std::fmt::Write;

/// Formats a number the way workflow outputs and traces show it:
/// integral values without a fractional part, `NaN` and `Infinity` spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Parses numeric text loosely. Blank text is `0`; anything that is not a
/// plain decimal, hex, octal or binary literal is `NaN`.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// True if the text is a finite numeric literal (blank text is not).
pub fn is_numeric_text(text: &str) -> bool {
    !text.trim().is_empty() && parse_number(text).is_finite()
}

/// Numeric view of a JSON value. Objects and multi-element arrays are `NaN`.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] if !single.is_object() => to_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

/// Textual view of a JSON value used for equality and membership tests.
/// Scalars use their plain text form; arrays and objects use canonical JSON.
pub fn normalize(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => canonical_json(value),
    }
}

/// Compact JSON with object keys sorted at every level and numbers in their
/// shortest form, so structurally equal documents compare equal as text.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Number(n) => {
            let text = n.as_f64().map(format_number).unwrap_or_else(|| n.to_string());
            out.push_str(&text);
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Writing into a String cannot fail.
                let _ = write!(out, "{}:", Value::String(key.clone()));
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Converts a computed number back into JSON, keeping integral values integral.
/// Non-finite numbers have no JSON form and become `null`.
pub fn number_to_json(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// The constituent values of a JSON value: array elements, object field values,
/// or the value itself.
pub fn constituents(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        other => vec![other],
    }
}

/// Builds a JSON object from `(key, value)` pairs, preserving order.
pub fn object<I, K>(pairs: I) -> Value
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    Value::Object(
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<Map<String, Value>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_format_without_trailing_fraction() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn loose_number_parsing() {
        assert_eq!(parse_number(" 42 "), 42.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("0x10"), 16.0);
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("12px").is_nan());
    }

    #[test]
    fn json_values_coerce_to_numbers() {
        assert_eq!(to_number(&json!(true)), 1.0);
        assert_eq!(to_number(&json!(null)), 0.0);
        assert_eq!(to_number(&json!(["7"])), 7.0);
        assert!(to_number(&json!([1, 2])).is_nan());
        assert!(to_number(&json!({"a": 1})).is_nan());
    }

    #[test]
    fn canonical_json_sorts_keys() {
        let a = json!({"b": 1.0, "a": [true, null]});
        assert_eq!(canonical_json(&a), r#"{"a":[true,null],"b":1}"#);
    }

    #[test]
    fn integral_results_stay_integral() {
        assert_eq!(number_to_json(10.0), json!(10));
        assert_eq!(number_to_json(2.5), json!(2.5));
        assert_eq!(number_to_json(f64::INFINITY), Value::Null);
    }
}
