use crate::path;
use itertools::Itertools;
use serde_json::{Map, Value};

/// Prefix some authoring tools put in front of input paths.
const INPUT_PREFIX: &str = "input_data.";

/// The name-to-value view a workflow run evaluates against.
///
/// A context holds the immutable input document and the ordered outputs
/// produced so far. It is threaded through a run by value: each step hands
/// back a new context with one more output, so no state survives between runs.
#[derive(Debug, Clone)]
pub struct Context {
    document: Value,
    outputs: Map<String, Value>,
}

impl Context {
    pub fn new(document: Value) -> Self {
        Self {
            document,
            outputs: Map::new(),
        }
    }

    pub fn into_outputs(self) -> Map<String, Value> {
        self.outputs
    }

    /// Returns this context extended with `name -> value`.
    pub fn with_output(mut self, name: impl Into<String>, value: Value) -> Self {
        self.outputs.insert(name.into(), value);
        self
    }

    /// Looks `path` up, preferring computed outputs over the input document.
    ///
    /// `name` and `input_data.name` are interchangeable: both reach the same
    /// output or document location.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        let alternate = match path.strip_prefix(INPUT_PREFIX) {
            Some(rest) => rest.to_string(),
            None => format!("{}{}", INPUT_PREFIX, path),
        };
        let candidates = [path, alternate.as_str()];

        if let Some(value) = candidates.iter().find_map(|c| self.outputs.get(*c)) {
            return Some(value.clone());
        }
        candidates
            .iter()
            .find_map(|c| path::resolve(&self.document, c))
    }

    /// Every input path plus every output name, for "not found" diagnostics.
    pub fn available_paths(&self) -> Vec<String> {
        path::available_paths(&self.document)
            .into_iter()
            .chain(self.outputs.keys().cloned())
            .unique()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outputs_take_precedence_over_input() {
        let ctx = Context::new(json!({"score": 1})).with_output("score", json!(9));
        assert_eq!(ctx.lookup("score"), Some(json!(9)));
    }

    #[test]
    fn input_prefix_is_interchangeable() {
        let ctx = Context::new(json!({"age": 20})).with_output("is_adult", json!(1));
        assert_eq!(ctx.lookup("input_data.age"), Some(json!(20)));
        assert_eq!(ctx.lookup("input_data.is_adult"), Some(json!(1)));

        let wrapped = Context::new(json!({"input_data": {"age": 30}}));
        assert_eq!(wrapped.lookup("age"), Some(json!(30)));
        assert_eq!(wrapped.lookup("input_data.age"), Some(json!(30)));
    }

    #[test]
    fn nested_and_array_paths_resolve() {
        let ctx = Context::new(json!({"a": {"b": 2}, "xs": [{"v": 1}, {"v": 2}]}));
        assert_eq!(ctx.lookup("a.b"), Some(json!(2)));
        assert_eq!(ctx.lookup("a"), Some(json!({"b": 2})));
        assert_eq!(ctx.lookup("xs.v"), Some(json!([1, 2])));
        assert_eq!(ctx.lookup("xs[1].v"), Some(json!(2)));
        assert_eq!(ctx.lookup("nope"), None);
        assert_eq!(ctx.lookup("  "), None);
    }

    #[test]
    fn available_paths_include_outputs() {
        let ctx = Context::new(json!({"a": 1})).with_output("b", json!(2));
        assert_eq!(ctx.available_paths(), vec!["a", "b"]);
    }
}
