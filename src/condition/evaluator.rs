use super::Operator;
use crate::coerce::{constituents, normalize, object, to_number};
use serde_json::Value;

/// Evaluates a single `(operation, value, operands)` test to a boolean.
///
/// Logic blocks and their chained conditions both go through here, so every
/// operator means exactly the same thing wherever it appears.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    pub fn evaluate(operation: &Operator, value: &Value, operands: &[Value]) -> bool {
        match operation {
            Operator::Equal => Self::equal(value, operands),
            Operator::Neq => !Self::equal(value, operands),
            Operator::Gt => Self::compare(value, operands, |a, b| a > b),
            Operator::Gte => Self::compare(value, operands, |a, b| a >= b),
            Operator::Lt => Self::compare(value, operands, |a, b| a < b),
            Operator::Lte => Self::compare(value, operands, |a, b| a <= b),
            Operator::In => Self::member_of(value, operands),
            Operator::Has => Self::contains(value, operands),
            Operator::Is => Self::is(value, operands),
            Operator::Between => Self::between(value, operands),
            Operator::Unknown(_) => false,
        }
    }

    /// The operand(s) an operation compares against, shaped for the debug trace.
    pub fn expected(operation: &Operator, operands: &[Value]) -> Value {
        match operation {
            Operator::In => Value::Array(
                Self::membership_list(operands)
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            ),
            Operator::Between => object([
                ("min", Value::from(numeric_operand(operands, 0))),
                ("max", Value::from(numeric_operand(operands, 1))),
            ]),
            _ => operands.first().cloned().unwrap_or(Value::Null),
        }
    }

    fn equal(value: &Value, operands: &[Value]) -> bool {
        let expected = operands.first().map(normalize).unwrap_or_default();
        normalize(value).to_lowercase() == expected.to_lowercase()
    }

    fn compare(value: &Value, operands: &[Value], op: impl Fn(f64, f64) -> bool) -> bool {
        // NaN on either side makes every comparison false.
        op(to_number(value), numeric_operand(operands, 0))
    }

    fn between(value: &Value, operands: &[Value]) -> bool {
        let n = to_number(value);
        n >= numeric_operand(operands, 0) && n <= numeric_operand(operands, 1)
    }

    fn is(value: &Value, operands: &[Value]) -> bool {
        let wants_null = matches!(operands.first(), Some(Value::String(s)) if s == "null");
        value.is_null() == wants_null
    }

    fn member_of(value: &Value, operands: &[Value]) -> bool {
        let list = Self::membership_list(operands);
        constituents(value)
            .into_iter()
            .map(normalize)
            .any(|candidate| list.contains(&candidate))
    }

    /// The allowed items for `in`: an array operand, or comma-separated text.
    /// Several scalar operands are all taken as items.
    fn membership_list(operands: &[Value]) -> Vec<String> {
        let sources: &[Value] = match operands.first() {
            Some(Value::Array(items)) => items,
            Some(_) => operands,
            None => &[],
        };
        sources
            .iter()
            .flat_map(|source| match source {
                Value::String(text) => text.split(',').map(|s| s.trim().to_string()).collect(),
                other => vec![normalize(other)],
            })
            .collect()
    }

    fn contains(value: &Value, operands: &[Value]) -> bool {
        let needles: Vec<String> = if operands.is_empty() {
            vec![String::new()]
        } else {
            operands.iter().map(|o| normalize(o).to_lowercase()).collect()
        };
        let haystack_has = |candidate: &Value| {
            let text = normalize(candidate).to_lowercase();
            needles.iter().any(|needle| text.contains(needle.as_str()))
        };

        match value {
            Value::Array(items) => items.iter().any(|item| match item {
                Value::Object(_) => constituents(item).into_iter().any(&haystack_has),
                other => haystack_has(other),
            }),
            Value::Object(_) => constituents(value).into_iter().any(&haystack_has),
            other => haystack_has(other),
        }
    }
}

/// Numeric operand at `index`; a missing operand counts as `0`.
fn numeric_operand(operands: &[Value], index: usize) -> f64 {
    operands.get(index).map(to_number).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(op: &str, value: Value, operands: Value) -> bool {
        let operands = operands.as_array().cloned().unwrap_or_default();
        ConditionEvaluator::evaluate(&Operator::from(op), &value, &operands)
    }

    #[test]
    fn equality_is_case_insensitive_and_type_loose() {
        assert!(eval("equal", json!("Yes"), json!(["yes"])));
        assert!(eval("equal", json!(5), json!(["5"])));
        assert!(eval("equal", json!(true), json!(["TRUE"])));
        assert!(eval("neq", json!("a"), json!(["b"])));
    }

    #[test]
    fn objects_compare_canonically() {
        assert!(eval("equal", json!({"b": 1, "a": 2}), json!([{"a": 2, "b": 1}])));
        assert!(!eval("equal", json!({"a": 1}), json!([{"a": 2}])));
    }

    #[test]
    fn numeric_comparisons_coerce() {
        assert!(eval("gte", json!(5), json!([5])));
        assert!(eval("gt", json!("10"), json!(["9"])));
        assert!(!eval("gte", json!("abc"), json!([5])));
        assert!(!eval("lt", json!("abc"), json!([5])));
        assert!(eval("lte", json!(-1), json!([])));
    }

    #[test]
    fn between_is_inclusive() {
        assert!(eval("between", json!(10), json!([10, 20])));
        assert!(eval("between", json!("20"), json!([10, 20])));
        assert!(!eval("between", json!(21), json!([10, 20])));
    }

    #[test]
    fn membership_against_lists() {
        assert!(eval("in", json!("b"), json!(["a, b, c"])));
        assert!(eval("in", json!(2), json!([[1, 2, 3]])));
        assert!(eval("in", json!(["x", "c"]), json!(["a,b,c"])));
        assert!(eval("in", json!({"k": "b"}), json!(["a,b"])));
        assert!(eval("in", json!("b"), json!(["a", "b"])));
        assert!(!eval("in", json!("B"), json!(["a,b"])));
        assert!(!eval("in", json!("z"), json!([])));
    }

    #[test]
    fn has_searches_text_and_arrays() {
        assert!(eval("has", json!("Hello World"), json!(["world"])));
        assert!(!eval("has", json!("Hello"), json!(["bye"])));
        assert!(eval(
            "has",
            json!([{"title": "Senior Designer"}, {"title": "Intern"}]),
            json!(["senior"])
        ));
        assert!(eval("has", json!(["rust", "go"]), json!(["java", "GO"])));
    }

    #[test]
    fn is_checks_null() {
        assert!(eval("is", Value::Null, json!(["null"])));
        assert!(!eval("is", json!(0), json!(["null"])));
        assert!(eval("is", json!(0), json!(["not null"])));
    }

    #[test]
    fn unknown_operators_never_match() {
        assert!(!eval("transform", json!(1), json!([1])));
        assert!(!eval("", json!(1), json!([1])));
    }

    #[test]
    fn expected_shapes_for_trace() {
        assert_eq!(
            ConditionEvaluator::expected(&Operator::Between, &[json!(1), json!("5")]),
            json!({"min": 1.0, "max": 5.0})
        );
        assert_eq!(
            ConditionEvaluator::expected(&Operator::In, &[json!("a, b")]),
            json!(["a", "b"])
        );
    }
}
