use crate::condition::ConditionEvaluator;
use crate::context::Context;
use crate::definition::LogicBlock;
use crate::error::EvaluationError;
use crate::trace::{ConditionTrace, LogicBlockTrace, TraceEntry};
use serde_json::Value;

/// The value a logic block produced and the trace entries explaining it.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOutcome {
    pub value: Value,
    pub entries: Vec<TraceEntry>,
}

/// Evaluates logic blocks against a context.
pub struct LogicBlockEngine;

impl LogicBlockEngine {
    /// Evaluates `block`, returning its output value.
    ///
    /// A missing input yields the block's default value. An array input with
    /// more than one element is evaluated once per element, producing an array
    /// output, unless the operation is a membership test that looks at the
    /// array as a whole.
    pub fn evaluate(block: &LogicBlock, context: &Context) -> BlockOutcome {
        let Some(input) = context.lookup(&block.input_name) else {
            let error = EvaluationError::PathNotFound {
                path: block.input_name.clone(),
                available: context.available_paths().join(", "),
            };
            log::warn!("Logic block '{}': {}", block.output_name, error);
            return Self::fallback(block, None, error);
        };

        if let Value::Array(items) = &input {
            if !block.operation.collapses_arrays() {
                match items.as_slice() {
                    [] => {
                        let error = EvaluationError::EmptyInput {
                            path: block.input_name.clone(),
                        };
                        log::debug!("Logic block '{}': {}", block.output_name, error);
                        return Self::fallback(block, Some(input.clone()), error);
                    }
                    [single] => return Self::evaluate_element(block, context, single, None),
                    _ => {
                        let mut outputs = Vec::with_capacity(items.len());
                        let mut entries = Vec::new();
                        for (index, item) in items.iter().enumerate() {
                            let outcome = Self::evaluate_element(block, context, item, Some(index));
                            outputs.push(outcome.value);
                            entries.extend(outcome.entries);
                        }
                        return BlockOutcome {
                            value: Value::Array(outputs),
                            entries,
                        };
                    }
                }
            }
        }

        Self::evaluate_element(block, context, &input, None)
    }

    fn evaluate_element(
        block: &LogicBlock,
        context: &Context,
        value: &Value,
        element: Option<usize>,
    ) -> BlockOutcome {
        let primary = ConditionEvaluator::evaluate(&block.operation, value, &block.values);
        let error = (!block.operation.is_known()).then(|| {
            let error = EvaluationError::UnsupportedOperator(block.operation.to_string());
            log::warn!("Logic block '{}': {}", block.output_name, error);
            error.to_string()
        });

        let mut conditions = Vec::new();
        let mut running = primary;
        for (index, condition) in block.conditions.iter().enumerate() {
            let expected = ConditionEvaluator::expected(&condition.operation, &condition.values);
            let mut trace = ConditionTrace {
                block: block.output_name.clone(),
                index,
                element,
                connective: condition.operator,
                operation: condition.operation.clone(),
                input_name: condition.input_name.clone(),
                input: None,
                expected,
                result: false,
                running,
                error: None,
            };

            match context.lookup(&condition.input_name) {
                Some(resolved) => {
                    let input = align(resolved, element, condition.operation.collapses_arrays());
                    let result =
                        ConditionEvaluator::evaluate(&condition.operation, &input, &condition.values);
                    running = condition.operator.apply(running, result);
                    trace.input = Some(input);
                    trace.result = result;
                    trace.running = running;
                }
                None => {
                    let error = EvaluationError::PathNotFound {
                        path: condition.input_name.clone(),
                        available: context.available_paths().join(", "),
                    };
                    log::debug!(
                        "Logic block '{}': skipping condition #{}: {}",
                        block.output_name,
                        index,
                        error
                    );
                    trace.error = Some(error.to_string());
                }
            }
            conditions.push(TraceEntry::Condition(trace));
        }

        let output = if running {
            block.output_value()
        } else {
            block.default_value()
        };

        let mut entries = Vec::with_capacity(conditions.len() + 1);
        entries.push(TraceEntry::LogicBlock(LogicBlockTrace {
            name: block.output_name.clone(),
            element,
            operation: block.operation.clone(),
            input: Some(value.clone()),
            expected: ConditionEvaluator::expected(&block.operation, &block.values),
            primary,
            result: running,
            output: output.clone(),
            error,
        }));
        entries.extend(conditions);

        BlockOutcome {
            value: output,
            entries,
        }
    }

    fn fallback(block: &LogicBlock, input: Option<Value>, error: EvaluationError) -> BlockOutcome {
        let value = block.default_value();
        BlockOutcome {
            entries: vec![TraceEntry::LogicBlock(LogicBlockTrace {
                name: block.output_name.clone(),
                element: None,
                operation: block.operation.clone(),
                input,
                expected: ConditionEvaluator::expected(&block.operation, &block.values),
                primary: false,
                result: false,
                output: value.clone(),
                error: Some(error.to_string()),
            })],
            value,
        }
    }
}

/// Picks the condition input matching the block element being evaluated.
/// Outside fan-out, or for membership tests, the value is used whole.
fn align(value: Value, element: Option<usize>, collapses: bool) -> Value {
    match (value, element) {
        (Value::Array(mut items), Some(index)) if !collapses && items.len() > 1 => {
            if index < items.len() {
                items.swap_remove(index)
            } else {
                items.swap_remove(0)
            }
        }
        (value, _) => value,
    }
}
