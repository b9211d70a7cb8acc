use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of comparison operations a rule can apply.
///
/// Names are matched case-insensitively. Anything unrecognized is kept as
/// `Unknown` so a workflow with a typo still loads; it simply never matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Equal,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Has,
    Is,
    Between,
    Unknown(String),
}

impl Operator {
    pub fn name(&self) -> &str {
        match self {
            Operator::Equal => "equal",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::Has => "has",
            Operator::Is => "is",
            Operator::Between => "between",
            Operator::Unknown(name) => name,
        }
    }

    /// Membership operators look at an array input as a whole instead of per element.
    pub fn collapses_arrays(&self) -> bool {
        matches!(self, Operator::In | Operator::Has)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Operator::Unknown(_))
    }
}

impl Default for Operator {
    fn default() -> Self {
        Operator::Unknown(String::new())
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "equal" => Operator::Equal,
            "neq" => Operator::Neq,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "in" => Operator::In,
            "has" => Operator::Has,
            "is" => Operator::Is,
            "between" => Operator::Between,
            _ => Operator::Unknown(name),
        }
    }
}

impl From<&str> for Operator {
    fn from(name: &str) -> Self {
        Operator::from(name.to_string())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.name().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a condition combines with the running result of its block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Connective {
    And,
    #[default]
    Or,
}

impl Connective {
    pub fn apply(self, running: bool, result: bool) -> bool {
        match self {
            Connective::And => running && result,
            Connective::Or => running || result,
        }
    }
}

impl From<String> for Connective {
    fn from(name: String) -> Self {
        if name.trim().eq_ignore_ascii_case("and") {
            Connective::And
        } else {
            Connective::Or
        }
    }
}

impl From<Connective> for String {
    fn from(connective: Connective) -> Self {
        match connective {
            Connective::And => "and",
            Connective::Or => "or",
        }
        .to_string()
    }
}
