//! Integration tests for Kettei
//!
//! End-to-end tests that run complete workflows through the public API.
//!
mod common;
use common::*;
use kettei::prelude::*;
use serde_json::{Value, json};

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn screening_input() -> Value {
        json!({
            "applicant": {
                "income": 4200,
                "country": "US",
                "guarantor": { "name": "Bo" },
                "jobs": [{ "title": "Senior Engineer" }, { "title": "Cook" }],
                "loans": [{ "amount": 5000 }, { "amount": 20000 }],
                "pets": null
            }
        })
    }

    #[test]
    fn test_age_scenario_adult() {
        let definition = AGE_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        let output = WorkflowRunner::new(definition)
            .run(json!({ "age": 20 }))
            .expect("run should succeed");
        assert_eq!(Value::Object(output.data), json!({ "is_adult": 1, "score": 10 }));
    }

    #[test]
    fn test_age_scenario_minor() {
        let definition = AGE_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        assert_eq!(
            run_data(&definition, json!({ "age": 10 })),
            json!({ "is_adult": 0, "score": 0 })
        );
    }

    #[test]
    fn test_age_scenario_from_json_text() {
        let definition = AGE_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        let output = evaluate_workflow(&definition, "{\"age\": \"21\"}").expect("run should succeed");
        assert_eq!(output.data["score"], json!(10));
    }

    #[test]
    fn test_screening_workflow() {
        let definition = SCREENING_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        assert_eq!(definition.validate(), Ok(()));

        let output = WorkflowRunner::new(definition)
            .run(screening_input())
            .expect("run should succeed");

        assert_eq!(
            Value::Object(output.data.clone()),
            json!({
                "income_ok": true,
                "is_engineer": 1,
                "small_loans": ["small", "large"],
                "risk": 5,
                "loan_count": 2,
                "adjusted": 3
            })
        );
        let keys: Vec<&str> = output.data.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["income_ok", "is_engineer", "small_loans", "risk", "loan_count", "adjusted"]
        );
    }

    #[test]
    fn test_screening_trace_explains_every_step() {
        let definition = SCREENING_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        let output = WorkflowRunner::new(definition)
            .run(screening_input())
            .expect("run should succeed");
        let debug = &output.debug;

        assert_eq!(debug.input, Some(screening_input()));
        // `small_loans` fans out over two loans.
        assert_eq!(debug.logic_blocks().count(), 5);
        assert_eq!(debug.conditions().count(), 2);
        let running: Vec<bool> = debug.conditions().map(|c| c.running).collect();
        assert_eq!(running, vec![false, true]);

        let risk = debug
            .calculations()
            .find(|c| c.name == "risk")
            .expect("risk is traced");
        assert_eq!(risk.substituted, "1 ? 10 - 1 * 5 : 100");
        assert_eq!(risk.explanation.as_deref(), Some("1 ? 10 - 1 * 5"));
        assert!(debug.errors().is_empty());
    }

    #[test]
    fn test_debug_trace_serializes() {
        let definition = AGE_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        let output = WorkflowRunner::builder(definition)
            .include_input_in_debug(false)
            .build()
            .run(json!({ "age": 30 }))
            .expect("run should succeed");

        let rendered = serde_json::to_value(&output).expect("output serializes");
        assert_eq!(rendered["data"], json!({ "is_adult": 1, "score": 10 }));
        assert!(rendered["debug"].get("input").is_none());
        let entries = rendered["debug"]["entries"].as_array().expect("entries");
        assert_eq!(entries[0]["kind"], json!("logic_block"));
        assert_eq!(entries[0]["operation"], json!("gte"));
        assert_eq!(entries[1]["kind"], json!("calculation"));
        assert_eq!(entries[1]["substituted"], json!("1 * 10"));
    }

    #[test]
    fn test_csv_input() {
        let definition = workflow(
            vec![block("person.age", "gte", json!([18]), "adult")],
            vec![calculation("double_age", "${person.age} * 2")],
        );
        let output = evaluate_workflow(&definition, "person.name,person.age\nAda,36\n")
            .expect("run should succeed");
        assert_eq!(
            Value::Object(output.data),
            json!({ "adult": 1, "double_age": 72 })
        );
    }

    #[test]
    fn test_invalid_input_aborts_the_run() {
        let definition = AGE_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        let result = evaluate_workflow(&definition, "{ not json");
        assert!(matches!(result, Err(WorkflowError::InvalidInputFormat(_))));
    }

    #[test]
    fn test_concurrent_runs_share_one_runner() {
        let definition = AGE_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        let runner = WorkflowRunner::new(definition);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let runner = &runner;
                    scope.spawn(move || {
                        let age = 14 + i;
                        let output = runner.run(json!({ "age": age })).expect("run should succeed");
                        (age, output.data["score"].clone())
                    })
                })
                .collect();
            for handle in handles {
                let (age, score) = handle.join().expect("thread should not panic");
                let expected = if age >= 18 { 10 } else { 0 };
                assert_eq!(score, json!(expected));
            }
        });
    }

    #[test]
    fn test_runs_are_idempotent() {
        let definition = SCREENING_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        let runner = WorkflowRunner::new(definition.clone());
        let first = serde_json::to_string(&runner.run(screening_input()).unwrap().data).unwrap();
        let second = serde_json::to_string(&runner.run(screening_input()).unwrap().data).unwrap();
        let third =
            serde_json::to_string(&evaluate_workflow(&definition, screening_input()).unwrap().data)
                .unwrap();
        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn test_runner_exposes_its_definition_and_options() {
        let definition = AGE_WORKFLOW_JSON.into_workflow().expect("valid workflow");
        let runner = WorkflowRunner::builder(definition.clone())
            .schema_policy(SchemaPolicy::ExplicitOnly)
            .include_input_in_debug(false)
            .build();
        assert_eq!(runner.definition(), &definition);
        assert_eq!(runner.options().schema_policy, SchemaPolicy::ExplicitOnly);
        assert!(!runner.options().include_input_in_debug);

        let score = &runner.definition().calculations[0];
        assert_eq!(FormulaEngine::placeholders(&score.formula), vec!["is_adult".to_string()]);
    }
}
