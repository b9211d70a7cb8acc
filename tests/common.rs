//! Common test utilities for building workflow definitions and inputs.
use kettei::prelude::*;
use serde_json::{Value, json};

/// Creates a logic block with `output_value` 1 and `default_value` 0.
#[allow(dead_code)]
pub fn block(input_name: &str, operation: &str, values: Value, output_name: &str) -> LogicBlock {
    LogicBlock {
        input_name: input_name.to_string(),
        operation: Operator::from(operation),
        values: values.as_array().cloned().unwrap_or_default(),
        output_name: output_name.to_string(),
        output_value: Some(json!(1)),
        default_value: Some(json!(0)),
        ..Default::default()
    }
}

/// Creates a chained condition.
#[allow(dead_code)]
pub fn condition(connective: &str, input_name: &str, operation: &str, values: Value) -> Condition {
    Condition {
        operator: Connective::from(connective.to_string()),
        input_name: input_name.to_string(),
        operation: Operator::from(operation),
        values: values.as_array().cloned().unwrap_or_default(),
    }
}

#[allow(dead_code)]
pub fn calculation(output_name: &str, formula: &str) -> Calculation {
    Calculation {
        output_name: output_name.to_string(),
        formula: formula.to_string(),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn workflow(logic_blocks: Vec<LogicBlock>, calculations: Vec<Calculation>) -> WorkflowDefinition {
    WorkflowDefinition {
        logic_blocks,
        calculations,
        output_schema: None,
    }
}

/// Runs `definition` against `input` and returns the filtered data as a JSON object.
#[allow(dead_code)]
pub fn run_data(definition: &WorkflowDefinition, input: Value) -> Value {
    let output = evaluate_workflow(definition, input).expect("run should succeed");
    Value::Object(output.data)
}

/// The age-gate workflow: an adult flag and a score derived from it.
#[allow(dead_code)]
pub const AGE_WORKFLOW_JSON: &str = r#"{
    "logic_blocks": [
        {
            "id": "b1",
            "input_name": "age",
            "operation": "gte",
            "values": [18],
            "output_name": "is_adult",
            "output_value": 1,
            "default_value": 0,
            "conditions": []
        }
    ],
    "calculations": [
        { "id": "c1", "output_name": "score", "formula": "${is_adult} * 10" }
    ]
}"#;

/// A loan-screening workflow exercising nested paths, arrays, conditions and formulas.
#[allow(dead_code)]
pub const SCREENING_WORKFLOW_JSON: &str = r#"{
    "logic_blocks": [
        {
            "input_name": "applicant.income",
            "operation": "gte",
            "values": ["3000"],
            "output_name": "income_ok",
            "output_value": true,
            "default_value": false,
            "conditions": [
                { "operator": "and", "input_name": "applicant.country", "operation": "in", "values": ["DE, FR, NL"] },
                { "operator": "or", "input_name": "applicant.guarantor", "operation": "is", "values": ["not null"] }
            ]
        },
        {
            "input_name": "applicant.jobs",
            "operation": "has",
            "values": ["engineer"],
            "output_name": "is_engineer",
            "output_value": 1,
            "default_value": 0
        },
        {
            "input_name": "applicant.loans.amount",
            "operation": "between",
            "values": [0, 10000],
            "output_name": "small_loans",
            "output_value": "small",
            "default_value": "large"
        },
        {
            "input_name": "applicant.pets",
            "operation": "equal",
            "values": ["cat"],
            "output_name": "has_cat",
            "output_value": 1,
            "default_value": -1
        }
    ],
    "calculations": [
        { "output_name": "risk", "formula": "${income_ok} ? 10 - ${is_engineer} * 5 : 100" },
        { "output_name": "loan_count", "formula": "${applicant.loans}" },
        { "output_name": "adjusted", "formula": "round(${risk} / ${loan_count})" }
    ],
    "output_schema": { "has_cat": false }
}"#;
