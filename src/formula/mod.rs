//! Calculation formulas: `${path}` substitution followed by sandboxed evaluation.
//!
//! A formula is first rewritten into plain expression text by replacing every
//! placeholder with a literal drawn from the [`Context`]. The text is then
//! parsed by a small recursive-descent parser that only knows arithmetic,
//! comparison, logical and ternary operators plus a closed set of functions,
//! and evaluated over a four-variant [`Value`] type. Nothing in a formula can
//! reach outside the expression it describes.

mod engine;
pub mod expression;
pub mod lexer;
pub mod parser;
mod trace;
mod value;

pub use expression::{DisplayExpression, Expression, Function};
pub use trace::EvaluationTrace;
pub use value::Value;

use crate::coerce::{format_number, is_numeric_text, parse_number};
use crate::context::Context;
use crate::error::{EvaluationError, FormulaError};
use crate::trace::TraceFormatter;
use engine::AstEngine;
use serde::Serialize;

const PLACEHOLDER_OPEN: &str = "${";

/// One `${path}` placeholder and the literal it was replaced with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substitution {
    pub path: String,
    /// The resolved value; `None` when the path did not resolve.
    pub value: Option<serde_json::Value>,
    pub literal: String,
}

/// Everything known about one formula evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaOutcome {
    /// The numeric result, `0` whenever `error` is set.
    pub value: f64,
    pub substituted: String,
    pub substitutions: Vec<Substitution>,
    /// Human-readable account of the evaluated expression.
    pub explanation: Option<String>,
    pub error: Option<EvaluationError>,
}

impl FormulaOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Substitutes and evaluates calculation formulas.
pub struct FormulaEngine;

impl FormulaEngine {
    /// Evaluates `formula` against `context`.
    ///
    /// Never fails: unresolved placeholders count as `0`, and any syntax or
    /// evaluation problem yields `0` with the error recorded on the outcome.
    pub fn evaluate(formula: &str, context: &Context) -> FormulaOutcome {
        let (substituted, substitutions) = Self::substitute(formula, |path| context.lookup(path));

        match Self::try_evaluate(&substituted) {
            Ok((value, trace)) => FormulaOutcome {
                value,
                substituted,
                substitutions,
                explanation: Some(TraceFormatter::format_trace(&trace)),
                error: None,
            },
            Err(error) => FormulaOutcome {
                value: 0.0,
                substituted,
                substitutions,
                explanation: None,
                error: Some(error),
            },
        }
    }

    /// Replaces every `${path}` in `formula` with the literal for `resolve(path)`.
    ///
    /// A `${` without a closing `}` is left in place; the parser rejects it later.
    pub fn substitute<F>(formula: &str, resolve: F) -> (String, Vec<Substitution>)
    where
        F: Fn(&str) -> Option<serde_json::Value>,
    {
        let mut out = String::with_capacity(formula.len());
        let mut substitutions = Vec::new();
        let mut rest = formula;

        while let Some(open) = rest.find(PLACEHOLDER_OPEN) {
            let after = &rest[open + PLACEHOLDER_OPEN.len()..];
            let Some(close) = after.find('}') else {
                break;
            };
            out.push_str(&rest[..open]);

            let path = after[..close].trim().to_string();
            let value = resolve(&path);
            let literal = literal_for(value.as_ref());
            out.push_str(&literal);
            substitutions.push(Substitution {
                path,
                value,
                literal,
            });
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        (out, substitutions)
    }

    /// The distinct placeholder paths `formula` references, in order of appearance.
    pub fn placeholders(formula: &str) -> Vec<String> {
        let (_, substitutions) = Self::substitute(formula, |_| None);
        let mut paths: Vec<String> = Vec::new();
        for s in substitutions {
            if !paths.contains(&s.path) {
                paths.push(s.path);
            }
        }
        paths
    }

    /// Structurally checks and parses already-substituted formula text.
    pub fn compile(text: &str) -> Result<Expression, FormulaError> {
        check_parentheses(text)?;
        parser::parse(text)
    }

    /// Evaluates already-substituted formula text to a finite number.
    pub fn evaluate_text(text: &str) -> Result<f64, EvaluationError> {
        Self::try_evaluate(text).map(|(value, _)| value)
    }

    fn try_evaluate(text: &str) -> Result<(f64, EvaluationTrace), EvaluationError> {
        let expr = Self::compile(text)?;
        let trace = AstEngine::new(&expr).evaluate();
        let value = trace.get_outcome().to_number();
        if value.is_nan() {
            return Err(EvaluationError::NotANumber {
                formula: text.to_string(),
            });
        }
        if value.is_infinite() {
            return Err(EvaluationError::NonFiniteResult {
                formula: text.to_string(),
            });
        }
        Ok((value, trace))
    }
}

/// The expression literal a resolved placeholder value becomes.
///
/// Missing values, `null`, objects and empty arrays are `0`; booleans and
/// boolean-like text are `1`/`0`; numeric text is a number; a non-empty array
/// is its length; any other text becomes a quoted string.
fn literal_for(value: Option<&serde_json::Value>) -> String {
    use serde_json::Value as Json;

    match value {
        None | Some(Json::Null) | Some(Json::Object(_)) => "0".to_string(),
        Some(Json::Bool(true)) => "1".to_string(),
        Some(Json::Bool(false)) => "0".to_string(),
        Some(Json::Number(n)) => number_literal(n.as_f64().unwrap_or(0.0)),
        Some(Json::Array(items)) => items.len().to_string(),
        Some(Json::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("false") {
                "0".to_string()
            } else if trimmed.eq_ignore_ascii_case("true") {
                "1".to_string()
            } else if is_numeric_text(trimmed) {
                number_literal(parse_number(trimmed))
            } else {
                quote(s)
            }
        }
    }
}

// Negative numbers are parenthesised so `10-${x}` stays a subtraction.
fn number_literal(n: f64) -> String {
    if n < 0.0 {
        format!("({})", format_number(n))
    } else {
        format_number(n)
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Verifies parentheses balance, ignoring any inside string literals.
fn check_parentheses(text: &str) -> Result<(), FormulaError> {
    let mut open = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (position, c) in text.chars().enumerate() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => open.push(position),
            ')' => {
                if open.pop().is_none() {
                    return Err(FormulaError::UnbalancedParentheses { position });
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(position) => Err(FormulaError::UnbalancedParentheses { position }),
        None => Ok(()),
    }
}
