use crate::formula::EvaluationTrace;

/// Formats evaluation traces into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format an evaluation trace into a human-readable explanation.
    pub fn format_trace(trace: &EvaluationTrace) -> String {
        // Start the recursive formatting with the lowest possible parent precedence.
        Self::format_recursive(trace, 0)
    }

    /// Recursively formats the trace, adding parentheses only when necessary.
    fn format_recursive(trace: &EvaluationTrace, parent_precedence: u8) -> String {
        let current_precedence = trace.precedence();
        let needs_parens = current_precedence < parent_precedence;

        let mut result = String::new();
        if needs_parens {
            result.push('(');
        }

        match trace {
            EvaluationTrace::BinaryOp {
                op_symbol,
                left,
                right,
                ..
            } => {
                let left_str = Self::format_recursive(left, current_precedence);

                // For short-circuiting operators, only include the right side if it was evaluated.
                if !matches!(**right, EvaluationTrace::NotEvaluated) {
                    // Left-associative: an equal-precedence right child keeps its parentheses.
                    let right_str = Self::format_recursive(right, current_precedence + 1);
                    result.push_str(&format!("{} {} {}", left_str, op_symbol, right_str));
                } else {
                    result.push_str(&left_str);
                }
            }
            EvaluationTrace::UnaryOp {
                op_symbol, child, ..
            } => {
                let child_str = Self::format_recursive(child, current_precedence);
                // `- -1`, not `--1`.
                let gap = if matches!(**child, EvaluationTrace::UnaryOp { .. }) { " " } else { "" };
                result.push_str(&format!("{}{}{}", op_symbol, gap, child_str));
            }
            EvaluationTrace::Conditional {
                condition, branch, ..
            } => {
                // Only the branch that was taken is shown.
                let condition_str = Self::format_recursive(condition, current_precedence + 1);
                let branch_str = Self::format_recursive(branch, current_precedence);
                result.push_str(&format!("{} ? {}", condition_str, branch_str));
            }
            EvaluationTrace::Call { name, args, .. } => {
                let args_str: Vec<String> = args
                    .iter()
                    .map(|arg| Self::format_recursive(arg, 0))
                    .collect();
                result.push_str(&format!("{}({})", name, args_str.join(", ")));
            }
            EvaluationTrace::Leaf { source, .. } => result.push_str(source),
            EvaluationTrace::NotEvaluated => {}
        }

        if needs_parens {
            result.push(')');
        }
        result
    }
}
