use crate::error::WorkflowError;
use serde_json::{Map, Value};
use std::fs;

const BOM: char = '\u{feff}';

/// An input document as handed to the runner, before parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// Already-structured JSON. A JSON string is treated as encoded text.
    Json(Value),
    /// JSON or CSV text.
    Text(String),
}

impl RawInput {
    /// Load raw input text from a file.
    pub fn from_file(path: &str) -> Result<Self, std::io::Error> {
        Ok(RawInput::Text(fs::read_to_string(path)?))
    }

    /// Parses the input into the document a run evaluates against.
    ///
    /// Text is tried as JSON first and then as CSV. Blank text is an empty object.
    pub fn parse(self) -> Result<Value, WorkflowError> {
        match self {
            RawInput::Json(Value::String(text)) | RawInput::Text(text) => parse_text(&text),
            RawInput::Json(value) => Ok(value),
        }
    }
}

impl From<Value> for RawInput {
    fn from(value: Value) -> Self {
        RawInput::Json(value)
    }
}

impl From<&Value> for RawInput {
    fn from(value: &Value) -> Self {
        RawInput::Json(value.clone())
    }
}

impl From<&str> for RawInput {
    fn from(text: &str) -> Self {
        RawInput::Text(text.to_string())
    }
}

impl From<String> for RawInput {
    fn from(text: String) -> Self {
        RawInput::Text(text)
    }
}

fn parse_text(text: &str) -> Result<Value, WorkflowError> {
    let text = text.trim_start_matches(BOM).trim();
    if text.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(json_error) => parse_csv(text).ok_or_else(|| {
            log::warn!("Input is neither JSON nor CSV: {}", json_error);
            WorkflowError::InvalidInputFormat(json_error.to_string())
        }),
    }
}

/// Reads comma-separated text with a header row of dotted paths.
/// One data row becomes an object, several become an array of objects.
fn parse_csv(text: &str) -> Option<Value> {
    if !text.contains(',') {
        return None;
    }
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let (header, rows) = lines.split_first()?;
    if rows.is_empty() {
        return None;
    }
    let headers = split_record(header);

    let mut records: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut record = Map::new();
            for (name, field) in headers.iter().zip(split_record(row)) {
                if !name.is_empty() {
                    insert_dotted(&mut record, name, Value::String(field));
                }
            }
            Value::Object(record)
        })
        .collect();

    log::debug!("Parsed CSV input with {} row(s)", records.len());
    if records.len() == 1 {
        records.pop()
    } else {
        Some(Value::Array(records))
    }
}

/// Splits one CSV line into trimmed fields. Double-quoted fields may hold
/// commas, and `""` inside them is a literal quote.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' if quoted => quoted = false,
            '"' if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            c => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

fn insert_dotted(record: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').map(str::trim).peekable();
    let mut current = record;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(next) => current = next,
            _ => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: impl Into<RawInput>) -> Result<Value, WorkflowError> {
        raw.into().parse()
    }

    #[test]
    fn structured_json_passes_through() {
        assert_eq!(parse(json!({"a": 1})).unwrap(), json!({"a": 1}));
        assert_eq!(parse(json!([1, 2])).unwrap(), json!([1, 2]));
    }

    #[test]
    fn json_strings_are_decoded() {
        assert_eq!(parse(json!("{\"a\": 1}")).unwrap(), json!({"a": 1}));
        assert_eq!(parse("\u{feff}  {\"a\": [true]} ").unwrap(), json!({"a": [true]}));
        assert_eq!(parse("   ").unwrap(), json!({}));
    }

    #[test]
    fn csv_fallback_builds_nested_objects() {
        let text = "name, address.city\nAda, London\n";
        assert_eq!(
            parse(text).unwrap(),
            json!({"name": "Ada", "address": {"city": "London"}})
        );
    }

    #[test]
    fn csv_with_several_rows_is_an_array() {
        let text = "id,note\n1,\"a, b\"\n2,\"say \"\"hi\"\"\"";
        assert_eq!(
            parse(text).unwrap(),
            json!([{"id": "1", "note": "a, b"}, {"id": "2", "note": "say \"hi\""}])
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            parse("not json at all"),
            Err(WorkflowError::InvalidInputFormat(_))
        ));
        assert!(parse("a,b").is_err());
    }
}
