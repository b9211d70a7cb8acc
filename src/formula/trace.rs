use super::Value;

/// A record of how an expression was evaluated, including intermediate values.
#[derive(Debug, Clone)]
pub enum EvaluationTrace {
    BinaryOp {
        op_symbol: &'static str,
        left: Box<EvaluationTrace>,
        right: Box<EvaluationTrace>,
        outcome: Value,
    },
    UnaryOp {
        op_symbol: &'static str,
        child: Box<EvaluationTrace>,
        outcome: Value,
    },
    Conditional {
        condition: Box<EvaluationTrace>,
        branch: Box<EvaluationTrace>,
        outcome: Value,
    },
    Call {
        name: &'static str,
        args: Vec<EvaluationTrace>,
        outcome: Value,
    },
    Leaf {
        source: String,
        value: Value,
    },
    NotEvaluated,
}

impl EvaluationTrace {
    pub fn get_outcome(&self) -> Value {
        match self {
            EvaluationTrace::BinaryOp { outcome, .. }
            | EvaluationTrace::UnaryOp { outcome, .. }
            | EvaluationTrace::Conditional { outcome, .. }
            | EvaluationTrace::Call { outcome, .. } => outcome.clone(),
            EvaluationTrace::Leaf { value, .. } => value.clone(),
            EvaluationTrace::NotEvaluated => Value::Null,
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            EvaluationTrace::Conditional { .. } => 1,
            EvaluationTrace::BinaryOp { op_symbol, .. } => match *op_symbol {
                "||" => 2,
                "&&" => 3,
                "===" | "!==" | "==" | "!=" => 4,
                ">" | ">=" | "<" | "<=" => 5,
                "+" | "-" => 6,
                "*" | "/" | "%" => 7,
                _ => 0,
            },
            EvaluationTrace::UnaryOp { .. } => 8,
            EvaluationTrace::Call { .. }
            | EvaluationTrace::Leaf { .. }
            | EvaluationTrace::NotEvaluated => 9,
        }
    }
}
