use crate::block::LogicBlockEngine;
use crate::coerce::number_to_json;
use crate::context::Context;
use crate::definition::{OutputSchema, WorkflowDefinition};
use crate::error::WorkflowError;
use crate::formula::FormulaEngine;
use crate::input::RawInput;
use crate::trace::{CalculationTrace, DebugTrace, Section, TraceEntry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How an output schema treats outputs it does not mention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// Keep every output the schema does not map to `false`.
    #[default]
    AbsentIncluded,
    /// Keep only outputs the schema maps to `true`.
    ExplicitOnly,
}

impl SchemaPolicy {
    pub fn includes(self, toggle: Option<bool>) -> bool {
        match self {
            SchemaPolicy::AbsentIncluded => toggle != Some(false),
            SchemaPolicy::ExplicitOnly => toggle == Some(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerOptions {
    pub schema_policy: SchemaPolicy,
    /// Echo the parsed input document into the debug trace.
    pub include_input_in_debug: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            schema_policy: SchemaPolicy::default(),
            include_input_in_debug: true,
        }
    }
}

/// The result of one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowOutput {
    /// Block and calculation outputs that passed the output schema, in evaluation order.
    pub data: Map<String, Value>,
    pub debug: DebugTrace,
}

/// Runs a workflow definition against input documents.
///
/// A runner holds only the immutable definition and its options. Every call to
/// [`run`](Self::run) builds a fresh context, so one runner can be shared
/// across threads and used for any number of runs.
#[derive(Debug, Clone)]
pub struct WorkflowRunner {
    definition: WorkflowDefinition,
    options: RunnerOptions,
}

pub struct RunnerBuilder {
    definition: WorkflowDefinition,
    options: RunnerOptions,
}

impl RunnerBuilder {
    pub fn new(definition: WorkflowDefinition) -> Self {
        Self {
            definition,
            options: RunnerOptions::default(),
        }
    }
    pub fn schema_policy(mut self, policy: SchemaPolicy) -> Self {
        self.options.schema_policy = policy;
        self
    }
    pub fn include_input_in_debug(mut self, include: bool) -> Self {
        self.options.include_input_in_debug = include;
        self
    }
    pub fn options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }
    pub fn build(self) -> WorkflowRunner {
        WorkflowRunner {
            definition: self.definition,
            options: self.options,
        }
    }
}

impl WorkflowRunner {
    pub fn new(definition: WorkflowDefinition) -> Self {
        RunnerBuilder::new(definition).build()
    }

    pub fn builder(definition: WorkflowDefinition) -> RunnerBuilder {
        RunnerBuilder::new(definition)
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Evaluates the workflow against `input`.
    ///
    /// Logic blocks run first, in declared order, then calculations; each
    /// step sees every output produced before it. Only an unparseable input
    /// fails the run. Everything else is recovered locally and recorded in
    /// the returned debug trace.
    pub fn run(&self, input: impl Into<RawInput>) -> Result<WorkflowOutput, WorkflowError> {
        let document = input.into().parse()?;
        let mut debug = DebugTrace {
            input: self
                .options
                .include_input_in_debug
                .then(|| document.clone()),
            entries: Vec::new(),
        };

        log::debug!(
            "Running workflow with {} logic block(s) and {} calculation(s)",
            self.definition.logic_blocks.len(),
            self.definition.calculations.len()
        );

        let mut context = Context::new(document);

        for (index, block) in self.definition.logic_blocks.iter().enumerate() {
            if block.output_name.trim().is_empty() {
                debug.push(skipped(Section::LogicBlocks, index));
                continue;
            }
            let outcome = LogicBlockEngine::evaluate(block, &context);
            log::debug!("Logic block '{}' -> {}", block.output_name, outcome.value);
            debug.extend(outcome.entries);
            context = context.with_output(block.output_name.as_str(), outcome.value);
        }

        for (index, calculation) in self.definition.calculations.iter().enumerate() {
            if calculation.output_name.trim().is_empty() {
                debug.push(skipped(Section::Calculations, index));
                continue;
            }
            let outcome = FormulaEngine::evaluate(&calculation.formula, &context);
            match &outcome.error {
                Some(error) => log::warn!("Calculation '{}': {}", calculation.output_name, error),
                None => log::debug!("Calculation '{}' -> {}", calculation.output_name, outcome.value),
            }
            let value = number_to_json(outcome.value);
            debug.push(TraceEntry::Calculation(CalculationTrace {
                name: calculation.output_name.clone(),
                formula: calculation.formula.clone(),
                substituted: outcome.substituted,
                substitutions: outcome.substitutions,
                result: outcome.value,
                explanation: outcome.explanation,
                error: outcome.error.map(|e| e.to_string()),
            }));
            context = context.with_output(calculation.output_name.as_str(), value);
        }

        let data = filter_outputs(
            context.into_outputs(),
            self.definition.output_schema.as_ref(),
            self.options.schema_policy,
        );
        Ok(WorkflowOutput { data, debug })
    }
}

/// Evaluates `definition` against `input` with default options.
pub fn evaluate_workflow(
    definition: &WorkflowDefinition,
    input: impl Into<RawInput>,
) -> Result<WorkflowOutput, WorkflowError> {
    WorkflowRunner::new(definition.clone()).run(input)
}

fn skipped(section: Section, index: usize) -> TraceEntry {
    log::warn!("Skipping {:?} #{}: no output name", section, index);
    TraceEntry::Skipped {
        section,
        index,
        reason: "missing output name".to_string(),
    }
}

/// Applies the output schema. A missing or empty schema keeps everything.
fn filter_outputs(
    mut outputs: Map<String, Value>,
    schema: Option<&OutputSchema>,
    policy: SchemaPolicy,
) -> Map<String, Value> {
    if let Some(schema) = schema.filter(|s| !s.is_empty()) {
        outputs.retain(|name, _| policy.includes(schema.toggle(name)));
    }
    outputs
}
