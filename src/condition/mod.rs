mod evaluator;
mod operator;

pub use evaluator::ConditionEvaluator;
pub use operator::{Connective, Operator};
