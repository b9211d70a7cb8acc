//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kettei crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kettei::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let definition = std::fs::read_to_string("path/to/workflow.json")?.as_str().into_workflow()?;
//! let input = RawInput::from_file("path/to/input.json")?;
//!
//! let output = WorkflowRunner::new(definition).run(input)?;
//! println!("{}", serde_json::to_string_pretty(&output)?);
//! # Ok(())
//! # }
//! ```

// Running workflows
pub use crate::runner::{
    RunnerBuilder, RunnerOptions, SchemaPolicy, WorkflowOutput, WorkflowRunner, evaluate_workflow,
};

// Workflow model
pub use crate::definition::{
    Calculation, Condition, IntoWorkflow, LogicBlock, OutputSchema, WorkflowDefinition,
};
pub use crate::input::RawInput;

// Evaluation building blocks
pub use crate::block::LogicBlockEngine;
pub use crate::condition::{ConditionEvaluator, Connective, Operator};
pub use crate::context::Context;
pub use crate::formula::{FormulaEngine, FormulaOutcome};

// Error types
pub use crate::error::{DefinitionError, EvaluationError, FormulaError, WorkflowError};

// Trace
pub use crate::trace::{DebugTrace, TraceEntry, TraceFormatter};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
