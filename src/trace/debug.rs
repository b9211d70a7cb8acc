use crate::condition::{Connective, Operator};
use crate::formula::Substitution;
use serde::Serialize;
use serde_json::Value;

/// Ordered diagnostic record of one workflow run.
///
/// Entries appear in evaluation order. The trace is produced alongside the
/// output and is never read back by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebugTrace {
    /// The parsed input document, unless the runner was told not to echo it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    pub entries: Vec<TraceEntry>,
}

impl DebugTrace {
    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = TraceEntry>) {
        self.entries.extend(entries);
    }

    pub fn logic_blocks(&self) -> impl Iterator<Item = &LogicBlockTrace> {
        self.entries.iter().filter_map(|e| match e {
            TraceEntry::LogicBlock(t) => Some(t),
            _ => None,
        })
    }

    pub fn conditions(&self) -> impl Iterator<Item = &ConditionTrace> {
        self.entries.iter().filter_map(|e| match e {
            TraceEntry::Condition(t) => Some(t),
            _ => None,
        })
    }

    pub fn calculations(&self) -> impl Iterator<Item = &CalculationTrace> {
        self.entries.iter().filter_map(|e| match e {
            TraceEntry::Calculation(t) => Some(t),
            _ => None,
        })
    }

    /// Every recorded error message, in order.
    pub fn errors(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                TraceEntry::LogicBlock(t) => t.error.as_deref(),
                TraceEntry::Condition(t) => t.error.as_deref(),
                TraceEntry::Calculation(t) => t.error.as_deref(),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEntry {
    LogicBlock(LogicBlockTrace),
    Condition(ConditionTrace),
    Calculation(CalculationTrace),
    Skipped {
        section: Section,
        index: usize,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    LogicBlocks,
    Calculations,
}

/// The primary test of a logic block, plus its final result and output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicBlockTrace {
    pub name: String,
    /// Element index when the block fans out over an array input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<usize>,
    pub operation: Operator,
    /// The resolved input value; `None` when the path did not resolve.
    pub input: Option<Value>,
    pub expected: Value,
    /// Outcome of the primary test alone.
    pub primary: bool,
    /// Outcome after folding in every condition.
    pub result: bool,
    pub output: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One chained condition of a logic block.
///
/// A condition whose input does not resolve is recorded with `input: None`
/// and an error; it is not folded in, so `running` is left as it was.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionTrace {
    pub block: String,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<usize>,
    pub connective: Connective,
    pub operation: Operator,
    pub input_name: String,
    pub input: Option<Value>,
    pub expected: Value,
    pub result: bool,
    /// The running result after this condition was folded in.
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationTrace {
    pub name: String,
    pub formula: String,
    pub substituted: String,
    pub substitutions: Vec<Substitution>,
    pub result: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
