//! # Kettei - Rule and Formula Evaluation Engine for JSON Workflows
//!
//! **Kettei** evaluates small decision pipelines ("workflows") against arbitrary
//! JSON documents. A workflow combines boolean-gated assignment rules over
//! nested and array input paths with arithmetic formulas that reference
//! earlier results, and returns a derived JSON record together with a debug
//! trace explaining every decision.
//!
//! ## Core Workflow
//!
//! The engine operates on a canonical workflow model. The primary workflow is:
//!
//! 1.  **Load Your Definition**: Deserialize a `WorkflowDefinition` from JSON, or implement
//!     the `IntoWorkflow` trait for your own authoring format.
//! 2.  **Build a Runner**: Use `WorkflowRunner::builder` to choose options such as the
//!     output schema policy. A runner is immutable and can be shared across threads.
//! 3.  **Run**: Call `run` with each input document (structured JSON, JSON text or CSV text).
//!     Logic blocks run in order, then calculations, each seeing all earlier outputs.
//! 4.  **Inspect**: Read the filtered `data` and, when needed, the `debug` trace.
//!
//! ## Quick Start
//!
//! ```rust
//! use kettei::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let definition: WorkflowDefinition = serde_json::from_value(json!({
//!         "logic_blocks": [{
//!             "input_name": "age",
//!             "operation": "gte",
//!             "values": [18],
//!             "output_name": "is_adult",
//!             "output_value": 1,
//!             "default_value": 0
//!         }],
//!         "calculations": [{ "output_name": "score", "formula": "${is_adult} * 10" }]
//!     }))?;
//!
//!     let runner = WorkflowRunner::builder(definition)
//!         .schema_policy(SchemaPolicy::AbsentIncluded)
//!         .build();
//!
//!     let output = runner.run(json!({ "age": 20 }))?;
//!     assert_eq!(serde_json::Value::Object(output.data), json!({ "is_adult": 1, "score": 10 }));
//!
//!     for calculation in output.debug.calculations() {
//!         println!("{} = {} ({})", calculation.name, calculation.result, calculation.substituted);
//!     }
//!     Ok(())
//! }
//! ```

pub mod block;
pub mod coerce;
pub mod condition;
pub mod context;
pub mod definition;
pub mod error;
pub mod formula;
pub mod input;
pub mod path;
pub mod prelude;
pub mod runner;
pub mod trace;
