mod common;
use common::*;
use kettei::formula::{DisplayExpression, Expression, Function, Value as FormulaValue};
use kettei::prelude::*;
use serde_json::json;

fn evaluate(formula: &str, doc: serde_json::Value) -> FormulaOutcome {
    FormulaEngine::evaluate(formula, &Context::new(doc))
}

#[test]
fn test_supported_grammar() {
    let doc = json!({ "a": 6, "b": 4, "flag": true, "name": "Ada" });
    let cases = [
        ("${a} + ${b} * 2", 14.0),
        ("(${a} + ${b}) / 5", 2.0),
        ("${a} % ${b}", 2.0),
        ("${a} > ${b} ? 1 : 0", 1.0),
        ("${a} >= 6 && ${b} <= 3", 0.0),
        ("${a} < 0 || ${flag}", 1.0),
        ("${name} === 'Ada'", 1.0),
        ("${name} !== 'Ada'", 0.0),
        ("Number(${flag}) + Number()", 1.0),
        ("Boolean(${name})", 1.0),
        ("String(${a}) === '6'", 1.0),
        ("-${a} + +${b}", -2.0),
        ("!${flag}", 0.0),
    ];
    for (formula, expected) in cases {
        let outcome = evaluate(formula, doc.clone());
        assert_eq!(outcome.error, None, "{}", formula);
        assert_eq!(outcome.value, expected, "{}", formula);
    }
}

#[test]
fn test_no_code_execution_surface() {
    for formula in [
        "alert(1)",
        "constructor",
        "this.x",
        "x = 1",
        "[1, 2]",
        "1; 2",
        "`${a}`",
        "Math.max(1, 2)",
    ] {
        let outcome = evaluate(formula, json!({ "a": 1 }));
        assert_eq!(outcome.value, 0.0, "{}", formula);
        assert!(outcome.error.is_some(), "{}", formula);
    }
}

#[test]
fn test_substitution_records_each_placeholder() {
    let outcome = evaluate("${a.b} + ${missing} + ${list}", json!({ "a": { "b": -2 }, "list": [1, 1, 1] }));
    assert_eq!(outcome.substituted, "(-2) + 0 + 3");
    assert_eq!(outcome.value, 1.0);

    let paths: Vec<&str> = outcome.substitutions.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, vec!["a.b", "missing", "list"]);
    assert_eq!(outcome.substitutions[1].value, None);
    assert_eq!(outcome.substitutions[0].literal, "(-2)");
}

#[test]
fn test_array_placeholders_fan_out_then_count() {
    let outcome = evaluate("${people.name}", json!({ "people": [{ "name": "a" }, { "name": "b" }] }));
    assert_eq!(outcome.value, 2.0);
}

#[test]
fn test_compile_renders_a_tree() {
    let expr = FormulaEngine::compile("max(1, 2) * -3").expect("formula parses");
    assert_eq!(
        expr,
        Expression::Multiply(
            Box::new(Expression::Call {
                function: Function::Max,
                args: vec![
                    Expression::Literal(FormulaValue::Number(1.0)),
                    Expression::Literal(FormulaValue::Number(2.0)),
                ],
            }),
            Box::new(Expression::Negate(Box::new(Expression::Literal(
                FormulaValue::Number(3.0)
            )))),
        )
    );

    let tree = DisplayExpression { expr: &expr }.to_string();
    assert_eq!(
        tree,
        "└── Multiply (*)\n    ├── Call: max()\n    │   ├── Literal: 1\n    │   └── Literal: 2\n    └── Negate (-)\n        └── Literal: 3\n"
    );
}

#[test]
fn test_compile_errors_carry_positions() {
    assert_eq!(
        FormulaEngine::compile("1 + 2)"),
        Err(FormulaError::UnbalancedParentheses { position: 5 })
    );
    assert_eq!(
        FormulaEngine::compile("1 + # 2"),
        Err(FormulaError::UnexpectedCharacter { ch: '#', position: 4 })
    );
    assert_eq!(
        FormulaEngine::compile("abs(1, 2)"),
        Err(FormulaError::Arity {
            name: "abs".into(),
            expected: "1".into(),
            found: 2
        })
    );
}

#[test]
fn test_evaluate_text_rejects_non_numbers() {
    assert_eq!(FormulaEngine::evaluate_text("2 * 21"), Ok(42.0));
    assert!(matches!(
        FormulaEngine::evaluate_text("'a' + 1"),
        Err(EvaluationError::NotANumber { .. })
    ));
}

#[test]
fn test_validation_catches_bad_formulas() {
    let definition = workflow(
        vec![block("a", "equal", json!([1]), "flag")],
        vec![calculation("good", "${flag} * 2"), calculation("bad", "${flag} *")],
    );
    let errors = definition.validate().expect_err("bad formula is reported");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        DefinitionError::InvalidFormula { output_name, .. } if output_name == "bad"
    ));
}

#[test]
fn test_numeric_formula_fields_are_accepted() {
    let definition = json!({
        "calculations": [{ "output_name": "const", "formula": 42 }]
    })
    .into_workflow()
    .expect("valid workflow");
    assert_eq!(definition.calculations[0].formula, "42");
    assert_eq!(run_data(&definition, json!({})), json!({ "const": 42 }));
}

#[test]
fn test_long_operator_chains_are_rejected_not_evaluated() {
    let formula = format!("${{a}}{}", " + ${a}".repeat(9_999));
    let outcome = evaluate(&formula, json!({ "a": 1 }));
    assert_eq!(outcome.value, 0.0);
    assert!(matches!(
        outcome.error,
        Some(EvaluationError::Formula(FormulaError::NestingTooDeep { .. }))
    ));

    let definition = workflow(vec![], vec![calculation("total", &formula)]);
    let errors = definition.validate().expect_err("overly long formula is reported");
    assert!(matches!(
        &errors[0],
        DefinitionError::InvalidFormula { output_name, .. } if output_name == "total"
    ));
    assert_eq!(run_data(&definition, json!({ "a": 1 })), json!({ "total": 0 }));

    let short = evaluate(&format!("1{}", " + 1".repeat(99)), json!({}));
    assert_eq!(short.value, 100.0);
}
