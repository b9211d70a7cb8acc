//! Path resolution over arbitrary nested JSON.
//!
//! A path is a dot-separated list of segments with optional bracketed indices,
//! for example `applicant.jobs[0].title`. Numeric segments index arrays; a field
//! name applied to an array fans out over every element.

use serde_json::Value;
use std::fmt;

/// A parsed path. Brackets are normalized away, so `a[0].b` and `a.0.b` are the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn parse(path: &str) -> Self {
        Self {
            segments: normalize_brackets(path)
                .split('.')
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolves this path against `doc`. `None` means the path does not exist;
    /// an existing `null` resolves to `Some(Value::Null)`.
    pub fn resolve(&self, doc: &Value) -> Option<Value> {
        traverse(doc, &self.segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Resolves `path` against `doc`. Never fails; a missing location yields `None`.
pub fn resolve(doc: &Value, path: &str) -> Option<Value> {
    Path::parse(path).resolve(doc)
}

/// Rewrites `[n]` into `.n`. Brackets holding anything but digits are left untouched.
fn normalize_brackets(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close) if close > 0 && after[..close].bytes().all(|b| b.is_ascii_digit()) => {
                out.push('.');
                out.push_str(&after[..close]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('[');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn array_index(segment: &str) -> Option<usize> {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}

fn traverse(current: &Value, segments: &[String]) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(current.clone());
    };

    match current {
        Value::Null => None,
        Value::Array(items) => match array_index(segment) {
            Some(index) => items.get(index).and_then(|item| traverse(item, rest)),
            None => {
                // Fan out: resolve the remaining path on each element, flattening one level.
                let mut collected = Vec::new();
                for found in items.iter().filter_map(|item| traverse(item, segments)) {
                    match found {
                        Value::Array(inner) => collected.extend(inner),
                        other => collected.push(other),
                    }
                }
                Some(Value::Array(collected))
            }
        },
        Value::Object(map) => map.get(segment).and_then(|child| traverse(child, rest)),
        _ => None,
    }
}

/// Lists every addressable path in `doc`: object fields as `a.b`, array
/// elements as `a[0]`, recursing into nested containers.
pub fn available_paths(doc: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths(doc, "", &mut paths);
    paths
}

fn collect_paths(value: &Value, prefix: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                out.push(path.clone());
                collect_paths(child, &path, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = format!("{}[{}]", prefix, index);
                out.push(path.clone());
                collect_paths(child, &path, out);
            }
        }
        _ => {}
    }
}
