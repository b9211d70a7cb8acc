use super::expression::{Expression, Function};
use super::{EvaluationTrace, Value};

// This macro generates a match arm for a binary operation.
macro_rules! eval_op {
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, number) => {
        $self.eval_binary($l, $r, $op_str, |a, b| Value::Number($op_fn(a.to_number(), b.to_number())))
    };
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, compare) => {
        $self.eval_binary($l, $r, $op_str, |a, b| Value::Bool(compare(&a, &b, $op_fn, $op_fn)))
    };
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, value) => {
        $self.eval_binary($l, $r, $op_str, |a, b| $op_fn(&a, &b))
    };
}

/// The core recursive engine for evaluating a parsed formula.
///
/// Evaluation never fails: every operator is total over [`Value`], and a
/// meaningless result shows up as `NaN` for the caller to reject.
pub(super) struct AstEngine<'a> {
    expression: &'a Expression,
}

impl<'a> AstEngine<'a> {
    pub(super) fn new(expression: &'a Expression) -> Self {
        Self { expression }
    }

    /// Evaluates the AST and returns a trace of the execution.
    pub(super) fn evaluate(&self) -> EvaluationTrace {
        self.evaluate_recursive(self.expression)
    }

    fn evaluate_recursive(&self, expr: &Expression) -> EvaluationTrace {
        match expr {
            // --- Arithmetic Operations ---
            Expression::Sum(l, r) => eval_op!(self, l, r, "+", add, value),
            Expression::Subtract(l, r) => eval_op!(self, l, r, "-", |a, b| a - b, number),
            Expression::Multiply(l, r) => eval_op!(self, l, r, "*", |a, b| a * b, number),
            Expression::Divide(l, r) => eval_op!(self, l, r, "/", |a, b| a / b, number),
            Expression::Remainder(l, r) => eval_op!(self, l, r, "%", |a, b| a % b, number),
            Expression::Negate(v) => {
                let child_trace = self.evaluate_recursive(v);
                let outcome = Value::Number(-child_trace.get_outcome().to_number());
                EvaluationTrace::UnaryOp {
                    op_symbol: "-",
                    child: Box::new(child_trace),
                    outcome,
                }
            }

            // --- Comparison Operations ---
            Expression::GreaterThan(l, r) => eval_op!(self, l, r, ">", |a, b| a > b, compare),
            Expression::SmallerThan(l, r) => eval_op!(self, l, r, "<", |a, b| a < b, compare),
            Expression::GreaterThanOrEqual(l, r) => {
                eval_op!(self, l, r, ">=", |a, b| a >= b, compare)
            }
            Expression::SmallerThanOrEqual(l, r) => {
                eval_op!(self, l, r, "<=", |a, b| a <= b, compare)
            }

            // --- Equality ---
            Expression::StrictEqual(l, r) => {
                eval_op!(self, l, r, "===", |a: &Value, b| Value::Bool(a.strict_eq(b)), value)
            }
            Expression::StrictNotEqual(l, r) => {
                eval_op!(self, l, r, "!==", |a: &Value, b| Value::Bool(!a.strict_eq(b)), value)
            }
            Expression::Equal(l, r) => {
                eval_op!(self, l, r, "==", |a: &Value, b| Value::Bool(a.loose_eq(b)), value)
            }
            Expression::NotEqual(l, r) => {
                eval_op!(self, l, r, "!=", |a: &Value, b| Value::Bool(!a.loose_eq(b)), value)
            }

            // --- Logical Operations ---
            // `&&` and `||` yield one of their operands, not a boolean.
            Expression::And(l, r) => {
                let left_trace = self.evaluate_recursive(l);
                if !left_trace.get_outcome().is_truthy() {
                    let outcome = left_trace.get_outcome();
                    return EvaluationTrace::BinaryOp {
                        op_symbol: "&&",
                        left: Box::new(left_trace),
                        right: Box::new(EvaluationTrace::NotEvaluated),
                        outcome,
                    };
                }
                let right_trace = self.evaluate_recursive(r);
                let outcome = right_trace.get_outcome();
                EvaluationTrace::BinaryOp {
                    op_symbol: "&&",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                }
            }
            Expression::Or(l, r) => {
                let left_trace = self.evaluate_recursive(l);
                if left_trace.get_outcome().is_truthy() {
                    let outcome = left_trace.get_outcome();
                    return EvaluationTrace::BinaryOp {
                        op_symbol: "||",
                        left: Box::new(left_trace),
                        right: Box::new(EvaluationTrace::NotEvaluated),
                        outcome,
                    };
                }
                let right_trace = self.evaluate_recursive(r);
                let outcome = right_trace.get_outcome();
                EvaluationTrace::BinaryOp {
                    op_symbol: "||",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                }
            }
            Expression::Not(v) => {
                let child_trace = self.evaluate_recursive(v);
                let outcome = Value::Bool(!child_trace.get_outcome().is_truthy());
                EvaluationTrace::UnaryOp {
                    op_symbol: "!",
                    child: Box::new(child_trace),
                    outcome,
                }
            }
            Expression::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let condition_trace = self.evaluate_recursive(condition);
                let branch = if condition_trace.get_outcome().is_truthy() {
                    then
                } else {
                    otherwise
                };
                let branch_trace = self.evaluate_recursive(branch);
                let outcome = branch_trace.get_outcome();
                EvaluationTrace::Conditional {
                    condition: Box::new(condition_trace),
                    branch: Box::new(branch_trace),
                    outcome,
                }
            }

            // --- Other Operations ---
            Expression::Call { function, args } => {
                let arg_traces: Vec<EvaluationTrace> =
                    args.iter().map(|a| self.evaluate_recursive(a)).collect();
                let values: Vec<Value> = arg_traces.iter().map(|t| t.get_outcome()).collect();
                EvaluationTrace::Call {
                    name: function.name(),
                    args: arg_traces,
                    outcome: call(*function, &values),
                }
            }
            Expression::Literal(val) => EvaluationTrace::Leaf {
                source: val.to_string(),
                value: val.clone(),
            },
        }
    }

    fn eval_binary<F>(&self, l: &Expression, r: &Expression, op: &'static str, f: F) -> EvaluationTrace
    where
        F: Fn(Value, Value) -> Value,
    {
        let left_trace = self.evaluate_recursive(l);
        let right_trace = self.evaluate_recursive(r);
        let outcome = f(left_trace.get_outcome(), right_trace.get_outcome());
        EvaluationTrace::BinaryOp {
            op_symbol: op,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome,
        }
    }
}

/// `+` concatenates as soon as either side is text, otherwise it adds.
fn add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(a.to_text() + &b.to_text()),
        _ => Value::Number(a.to_number() + b.to_number()),
    }
}

/// Relational comparison: text against text compares lexically, anything
/// else numerically (so `NaN` on either side is always false).
fn compare(
    a: &Value,
    b: &Value,
    on_numbers: impl Fn(f64, f64) -> bool,
    on_text: impl Fn(&str, &str) -> bool,
) -> bool {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => on_text(x, y),
        _ => on_numbers(a.to_number(), b.to_number()),
    }
}

fn call(function: Function, args: &[Value]) -> Value {
    let numbers = || args.iter().map(Value::to_number);
    let first = args.first();
    match function {
        Function::Number => Value::Number(first.map(Value::to_number).unwrap_or(0.0)),
        Function::Boolean => Value::Bool(first.is_some_and(Value::is_truthy)),
        Function::String => Value::Str(first.map(Value::to_text).unwrap_or_default()),
        Function::Min => Value::Number(numbers().fold(f64::INFINITY, nan_min)),
        Function::Max => Value::Number(numbers().fold(f64::NEG_INFINITY, nan_max)),
        Function::Sum => Value::Number(numbers().sum()),
        Function::Avg => Value::Number(numbers().sum::<f64>() / args.len() as f64),
        Function::Round => Value::Number(unary(args, |n| (n + 0.5).floor())),
        Function::Floor => Value::Number(unary(args, f64::floor)),
        Function::Ceil => Value::Number(unary(args, f64::ceil)),
        Function::Abs => Value::Number(unary(args, f64::abs)),
    }
}

fn unary(args: &[Value], f: impl Fn(f64) -> f64) -> f64 {
    args.first().map(|v| f(v.to_number())).unwrap_or(f64::NAN)
}

// `f64::min` ignores NaN; formulas propagate it instead.
fn nan_min(acc: f64, n: f64) -> f64 {
    if acc.is_nan() || n.is_nan() { f64::NAN } else { acc.min(n) }
}

fn nan_max(acc: f64, n: f64) -> f64 {
    if acc.is_nan() || n.is_nan() { f64::NAN } else { acc.max(n) }
}
