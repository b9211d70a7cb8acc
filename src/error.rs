use thiserror::Error;

/// Errors that abort a whole workflow run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Input document is neither valid JSON nor CSV: {0}")]
    InvalidInputFormat(String),
}

/// Errors raised while evaluating a single logic block or calculation.
///
/// None of these abort a run. They are recovered at the block or calculation
/// boundary and recorded in the debug trace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Input '{path}' not found. Available paths: {available}")]
    PathNotFound { path: String, available: String },

    #[error("Input '{path}' resolved to an empty array")]
    EmptyInput { path: String },

    #[error("Unsupported operator '{0}'")]
    UnsupportedOperator(String),

    #[error("Formula '{formula}' did not evaluate to a valid number")]
    NotANumber { formula: String },

    #[error("Formula '{formula}' evaluated to a non-finite number")]
    NonFiniteResult { formula: String },

    #[error(transparent)]
    Formula(#[from] FormulaError),
}

/// Structural problems found while lexing or parsing a formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Empty formula")]
    Empty,

    #[error("Unmatched parenthesis at position {position}")]
    UnbalancedParentheses { position: usize },

    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("Unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Unexpected token '{found}' at position {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("Unknown function or identifier '{0}'")]
    UnknownFunction(String),

    #[error("Function '{name}' expects {expected} argument(s), but received {found}")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("Formula nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Errors reported when a workflow definition fails validation or conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("{kind} #{index} has no output name")]
    MissingOutputName { kind: &'static str, index: usize },

    #[error("Output name '{0}' is defined more than once")]
    DuplicateOutputName(String),

    #[error("Invalid formula for '{output_name}': {reason}")]
    InvalidFormula { output_name: String, reason: String },

    #[error("Invalid workflow definition: {0}")]
    Conversion(String),
}
