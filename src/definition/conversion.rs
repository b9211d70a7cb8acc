use super::model::WorkflowDefinition;
use crate::error::DefinitionError;

/// A trait for authoring formats that can be converted into a `WorkflowDefinition`.
///
/// This is the extension point for front-ends that keep their own shape of a
/// workflow (a block editor, an external drafting assistant, a stored record
/// with extra metadata). Implement it on your own structs to hand the runner
/// the canonical model.
///
/// # Example
///
/// ```rust,no_run
/// use kettei::prelude::*;
/// use kettei::error::DefinitionError;
///
/// struct DraftRule { field: String, minimum: f64, name: String }
/// struct Draft { rules: Vec<DraftRule> }
///
/// impl IntoWorkflow for Draft {
///     fn into_workflow(self) -> std::result::Result<WorkflowDefinition, DefinitionError> {
///         let logic_blocks = self
///             .rules
///             .into_iter()
///             .map(|rule| LogicBlock {
///                 input_name: rule.field,
///                 operation: Operator::Gte,
///                 values: vec![rule.minimum.into()],
///                 output_name: rule.name,
///                 ..Default::default()
///             })
///             .collect();
///         Ok(WorkflowDefinition { logic_blocks, ..Default::default() })
///     }
/// }
/// ```
pub trait IntoWorkflow {
    /// Consumes the object and converts it into a runnable workflow definition.
    fn into_workflow(self) -> Result<WorkflowDefinition, DefinitionError>;
}

impl IntoWorkflow for WorkflowDefinition {
    fn into_workflow(self) -> Result<WorkflowDefinition, DefinitionError> {
        Ok(self)
    }
}

impl IntoWorkflow for serde_json::Value {
    fn into_workflow(self) -> Result<WorkflowDefinition, DefinitionError> {
        serde_json::from_value(self).map_err(|e| DefinitionError::Conversion(e.to_string()))
    }
}

impl IntoWorkflow for &str {
    fn into_workflow(self) -> Result<WorkflowDefinition, DefinitionError> {
        serde_json::from_str(self).map_err(|e| DefinitionError::Conversion(e.to_string()))
    }
}
