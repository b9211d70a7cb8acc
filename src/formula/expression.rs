use super::Value;
use std::fmt;

/// The closed set of functions a formula may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Number,
    Boolean,
    String,
    Min,
    Max,
    Sum,
    Avg,
    Round,
    Floor,
    Ceil,
    Abs,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Number" => Function::Number,
            "Boolean" => Function::Boolean,
            "String" => Function::String,
            "min" => Function::Min,
            "max" => Function::Max,
            "sum" => Function::Sum,
            "avg" => Function::Avg,
            "round" => Function::Round,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "abs" => Function::Abs,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Number => "Number",
            Function::Boolean => "Boolean",
            Function::String => "String",
            Function::Min => "min",
            Function::Max => "max",
            Function::Sum => "sum",
            Function::Avg => "avg",
            Function::Round => "round",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Abs => "abs",
        }
    }

    /// Accepted argument counts as `(min, max)`; `None` means variadic.
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Function::Number | Function::Boolean | Function::String => (0, Some(1)),
            Function::Round | Function::Floor | Function::Ceil | Function::Abs => (1, Some(1)),
            Function::Min | Function::Max | Function::Sum | Function::Avg => (0, None),
        }
    }
}

/// The Abstract Syntax Tree of a parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Arithmetic
    Sum(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Remainder(Box<Expression>, Box<Expression>),
    Negate(Box<Expression>),

    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Conditional {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },

    // Comparison
    StrictEqual(Box<Expression>, Box<Expression>),
    StrictNotEqual(Box<Expression>, Box<Expression>),
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),

    Call {
        function: Function,
        args: Vec<Expression>,
    },

    // Leaf nodes
    Literal(Value),
}

/// A wrapper that renders an expression as an indented tree.
pub struct DisplayExpression<'a> {
    pub expr: &'a Expression,
}

impl<'a> fmt::Display for DisplayExpression<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_as_tree(self.expr, f, "", true)
    }
}

impl<'a> DisplayExpression<'a> {
    fn fmt_as_tree(
        &self,
        expr: &Expression,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match expr {
            Expression::Literal(v) => writeln!(f, "Literal: {}", v)?,
            Expression::Negate(v) => {
                writeln!(f, "Negate (-)")?;
                self.fmt_as_tree(v, f, &child_prefix, true)?;
            }
            Expression::Not(v) => {
                writeln!(f, "Not (!)")?;
                self.fmt_as_tree(v, f, &child_prefix, true)?;
            }
            Expression::Conditional {
                condition,
                then,
                otherwise,
            } => {
                writeln!(f, "Conditional (?:)")?;
                self.fmt_as_tree(condition, f, &child_prefix, false)?;
                self.fmt_as_tree(then, f, &child_prefix, false)?;
                self.fmt_as_tree(otherwise, f, &child_prefix, true)?;
            }
            Expression::Call { function, args } => {
                writeln!(f, "Call: {}()", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    self.fmt_as_tree(arg, f, &child_prefix, i + 1 == args.len())?;
                }
            }
            Expression::Sum(l, r) => self.fmt_binary(f, "Sum (+)", l, r, &child_prefix)?,
            Expression::Subtract(l, r) => self.fmt_binary(f, "Subtract (-)", l, r, &child_prefix)?,
            Expression::Multiply(l, r) => self.fmt_binary(f, "Multiply (*)", l, r, &child_prefix)?,
            Expression::Divide(l, r) => self.fmt_binary(f, "Divide (/)", l, r, &child_prefix)?,
            Expression::Remainder(l, r) => {
                self.fmt_binary(f, "Remainder (%)", l, r, &child_prefix)?
            }
            Expression::And(l, r) => self.fmt_binary(f, "And (&&)", l, r, &child_prefix)?,
            Expression::Or(l, r) => self.fmt_binary(f, "Or (||)", l, r, &child_prefix)?,
            Expression::StrictEqual(l, r) => {
                self.fmt_binary(f, "StrictEqual (===)", l, r, &child_prefix)?
            }
            Expression::StrictNotEqual(l, r) => {
                self.fmt_binary(f, "StrictNotEqual (!==)", l, r, &child_prefix)?
            }
            Expression::Equal(l, r) => self.fmt_binary(f, "Equal (==)", l, r, &child_prefix)?,
            Expression::NotEqual(l, r) => self.fmt_binary(f, "NotEqual (!=)", l, r, &child_prefix)?,
            Expression::GreaterThan(l, r) => {
                self.fmt_binary(f, "GreaterThan (>)", l, r, &child_prefix)?
            }
            Expression::GreaterThanOrEqual(l, r) => {
                self.fmt_binary(f, "GreaterThanOrEqual (>=)", l, r, &child_prefix)?
            }
            Expression::SmallerThan(l, r) => {
                self.fmt_binary(f, "SmallerThan (<)", l, r, &child_prefix)?
            }
            Expression::SmallerThanOrEqual(l, r) => {
                self.fmt_binary(f, "SmallerThanOrEqual (<=)", l, r, &child_prefix)?
            }
        }
        Ok(())
    }

    fn fmt_binary(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        l: &Expression,
        r: &Expression,
        prefix: &str,
    ) -> fmt::Result {
        writeln!(f, "{}", name)?;
        self.fmt_as_tree(l, f, prefix, false)?;
        self.fmt_as_tree(r, f, prefix, true)?;
        Ok(())
    }
}
