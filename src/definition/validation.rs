use super::model::WorkflowDefinition;
use crate::error::DefinitionError;
use crate::formula::FormulaEngine;
use ahash::AHashSet;
use serde_json::Value;

impl WorkflowDefinition {
    /// Checks the definition the way an authoring front-end should before
    /// accepting it.
    ///
    /// Output names must be present and unique across logic blocks and
    /// calculations. Every formula must be a well-formed expression that,
    /// with each placeholder standing in for `1`, evaluates to a finite number.
    /// The runner itself never validates; it evaluates whatever it is given.
    pub fn validate(&self) -> Result<(), Vec<DefinitionError>> {
        let mut errors = Vec::new();
        let mut seen = AHashSet::new();

        let names = self
            .logic_blocks
            .iter()
            .map(|b| ("Logic block", b.output_name.as_str()))
            .enumerate()
            .chain(
                self.calculations
                    .iter()
                    .map(|c| ("Calculation", c.output_name.as_str()))
                    .enumerate(),
            );
        for (index, (kind, name)) in names {
            let name = name.trim();
            if name.is_empty() {
                errors.push(DefinitionError::MissingOutputName { kind, index });
            } else if !seen.insert(name) {
                errors.push(DefinitionError::DuplicateOutputName(name.to_string()));
            }
        }

        for calculation in &self.calculations {
            if let Err(reason) = check_formula(&calculation.formula) {
                errors.push(DefinitionError::InvalidFormula {
                    output_name: calculation.output_name.clone(),
                    reason,
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn check_formula(formula: &str) -> Result<(), String> {
    let trimmed = formula.trim();
    if trimmed.is_empty() || trimmed == "{}" || trimmed == "undefined" {
        return Err("formula is empty".to_string());
    }
    let (sample, _) = FormulaEngine::substitute(trimmed, |_| Some(Value::from(1)));
    if sample.contains('{') {
        return Err("braces are only allowed in ${...} placeholders".to_string());
    }
    FormulaEngine::evaluate_text(&sample)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Calculation, LogicBlock};

    fn calc(name: &str, formula: &str) -> Calculation {
        Calculation {
            output_name: name.to_string(),
            formula: formula.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_a_sound_definition() {
        let def = WorkflowDefinition {
            logic_blocks: vec![LogicBlock {
                output_name: "flag".into(),
                ..Default::default()
            }],
            calculations: vec![calc("score", "${flag} * 10 + max(${a}, 2)")],
            output_schema: None,
        };
        assert_eq!(def.validate(), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let def = WorkflowDefinition {
            logic_blocks: vec![
                LogicBlock {
                    output_name: "x".into(),
                    ..Default::default()
                },
                LogicBlock::default(),
            ],
            calculations: vec![calc("x", "{}"), calc("y", "{a} + 1"), calc("z", "${a} +")],
            output_schema: None,
        };
        let errors = def.validate().unwrap_err();
        assert!(errors.contains(&DefinitionError::MissingOutputName {
            kind: "Logic block",
            index: 1
        }));
        assert!(errors.contains(&DefinitionError::DuplicateOutputName("x".into())));
        let invalid: Vec<&str> = errors
            .iter()
            .filter_map(|e| match e {
                DefinitionError::InvalidFormula { output_name, .. } => Some(output_name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(invalid, vec!["x", "y", "z"]);
    }

    #[test]
    fn division_by_zero_sample_is_invalid() {
        let def = WorkflowDefinition {
            calculations: vec![calc("r", "${a} / (${b} - 1)")],
            ..Default::default()
        };
        assert!(def.validate().is_err());
    }
}
