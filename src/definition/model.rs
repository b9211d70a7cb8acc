use crate::condition::{Connective, Operator};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A self-contained workflow: rules, formulas and the output visibility map.
///
/// This is the canonical model consumed by the runner. Storage, versioning
/// and authoring front-ends produce it; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    #[serde(default)]
    pub logic_blocks: Vec<LogicBlock>,
    #[serde(default)]
    pub calculations: Vec<Calculation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<OutputSchema>,
}

/// A boolean-gated assignment rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub input_name: String,
    #[serde(default)]
    pub operation: Operator,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub output_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl LogicBlock {
    /// The value written when the rule holds. Defaults to `1`.
    pub fn output_value(&self) -> Value {
        self.output_value.clone().unwrap_or_else(|| Value::from(1))
    }

    /// The value written when the rule fails or its input is missing. Defaults to `0`.
    pub fn default_value(&self) -> Value {
        self.default_value.clone().unwrap_or_else(|| Value::from(0))
    }
}

/// A secondary test chained onto a logic block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub operator: Connective,
    #[serde(default)]
    pub input_name: String,
    #[serde(default)]
    pub operation: Operator,
    #[serde(default)]
    pub values: Vec<Value>,
}

/// A named numeric formula over the evaluation context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub output_name: String,
    #[serde(default, deserialize_with = "formula_as_string")]
    pub formula: String,
}

/// Authoring tools sometimes store formulas as bare numbers.
fn formula_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Toggles inclusion of computed outputs in the final result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSchema(pub AHashMap<String, bool>);

impl OutputSchema {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The explicit toggle for `name`, if the schema mentions it.
    pub fn toggle(&self, name: &str) -> Option<bool> {
        self.0.get(name).copied()
    }

    pub fn with(mut self, name: &str, visible: bool) -> Self {
        self.0.insert(name.to_string(), visible);
        self
    }
}

impl FromIterator<(String, bool)> for OutputSchema {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
