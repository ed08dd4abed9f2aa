//! Arithmetic constraints over real-valued variables.
//!
//! Used by the incremental session and the equation solver. Products need
//! a constant factor and division is only allowed by a nonzero constant, so
//! every constraint stays linear. Constants must fit in a [`Rational64`]
//! whose negation also fits.

use std::fmt;

use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub};

use super::parser::{
    BinaryOp, CompareOp, Expr, ExprKind, RESERVED_WORDS, parse_expression, parse_expression_list,
};
use crate::error::ParseError;

/// A real-valued arithmetic expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArithExpr {
    /// A rational literal.
    Num(Rational64),
    /// A named real variable.
    Var(String),
    /// `a + b`
    Add(Box<ArithExpr>, Box<ArithExpr>),
    /// `a - b`
    Sub(Box<ArithExpr>, Box<ArithExpr>),
    /// `a * b`
    Mul(Box<ArithExpr>, Box<ArithExpr>),
    /// `a / k` with `k` a nonzero constant.
    Div(Box<ArithExpr>, Rational64),
    /// `-a`
    Neg(Box<ArithExpr>),
}

/// `None` for values whose numerator or denominator cannot be negated.
fn in_range(value: Rational64) -> Option<Rational64> {
    (*value.numer() != i64::MIN && *value.denom() != i64::MIN).then_some(value)
}

impl ArithExpr {
    fn from_expr(expr: &Expr) -> Result<Self, ParseError> {
        let parsed = Self::elaborate(expr)?;
        if parsed.is_ground() && parsed.evaluate().is_none() {
            return Err(ParseError::new(expr.position, "numeric value is out of range"));
        }
        Ok(parsed)
    }

    fn elaborate(expr: &Expr) -> Result<Self, ParseError> {
        match &expr.kind {
            ExprKind::Number(value) => Ok(Self::Num(*value)),
            ExprKind::Ident(name) if RESERVED_WORDS.contains(&name.as_str()) => Err(
                ParseError::new(expr.position, format!("'{name}' is not a numeric value")),
            ),
            ExprKind::Ident(name) => Ok(Self::Var(name.clone())),
            ExprKind::Neg(inner) => Ok(Self::Neg(Box::new(Self::from_expr(inner)?))),
            ExprKind::Binary { op, lhs, rhs } => {
                let left = Box::new(Self::from_expr(lhs)?);
                if *op == BinaryOp::Div {
                    let divisor = Self::from_expr(rhs)?.evaluate().ok_or_else(|| {
                        ParseError::new(rhs.position, "division is only supported by a constant")
                    })?;
                    if divisor == Rational64::from_integer(0) {
                        return Err(ParseError::new(rhs.position, "division by zero"));
                    }
                    return Ok(Self::Div(left, divisor));
                }
                let right = Box::new(Self::from_expr(rhs)?);
                Ok(match op {
                    BinaryOp::Add => Self::Add(left, right),
                    BinaryOp::Sub => Self::Sub(left, right),
                    _ if !left.is_ground() && !right.is_ground() => {
                        return Err(ParseError::new(
                            expr.position,
                            "multiplication is only supported by a constant",
                        ));
                    }
                    _ => Self::Mul(left, right),
                })
            }
            ExprKind::Call { name, .. } => Err(ParseError::new(
                expr.position,
                format!("'{name}' is not an arithmetic function"),
            )),
            ExprKind::List(_) => Err(ParseError::new(expr.position, "unexpected list")),
            ExprKind::Compare { .. } => Err(ParseError::new(
                expr.position,
                "comparison used where a number was expected",
            )),
        }
    }

    /// Parse a single arithmetic expression such as `2 + 3 * x`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a well-formed numeric expression.
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        Self::from_expr(&parse_expression(src)?)
    }

    /// Fold constant subexpressions and drop additive and multiplicative
    /// identities. Variables stay symbolic.
    #[must_use]
    pub fn simplify(&self) -> Self {
        if let Some(value) = self.evaluate() {
            return Self::Num(value);
        }
        let zero = Rational64::from_integer(0);
        let one = Rational64::from_integer(1);
        match self {
            Self::Num(_) | Self::Var(_) => self.clone(),
            Self::Add(a, b) => match (a.simplify(), b.simplify()) {
                (Self::Num(x), other) | (other, Self::Num(x)) if x == zero => other,
                (a, b) => Self::Add(Box::new(a), Box::new(b)),
            },
            Self::Sub(a, b) => match (a.simplify(), b.simplify()) {
                (other, Self::Num(y)) if y == zero => other,
                (a, b) => Self::Sub(Box::new(a), Box::new(b)),
            },
            Self::Mul(a, b) => match (a.simplify(), b.simplify()) {
                (Self::Num(x), _) | (_, Self::Num(x)) if x == zero => Self::Num(zero),
                (Self::Num(x), other) | (other, Self::Num(x)) if x == one => other,
                (a, b) => Self::Mul(Box::new(a), Box::new(b)),
            },
            Self::Div(a, k) => match a.simplify() {
                other if *k == one => other,
                other => Self::Div(Box::new(other), *k),
            },
            Self::Neg(a) => match a.simplify() {
                Self::Neg(inner) => *inner,
                other => Self::Neg(Box::new(other)),
            },
        }
    }

    /// Constant-fold the expression. `None` if it mentions a variable or
    /// leaves the representable range.
    #[must_use]
    pub fn evaluate(&self) -> Option<Rational64> {
        let value = match self {
            Self::Num(value) => *value,
            Self::Var(_) => return None,
            Self::Add(a, b) => a.evaluate()?.checked_add(&b.evaluate()?)?,
            Self::Sub(a, b) => a.evaluate()?.checked_sub(&b.evaluate()?)?,
            Self::Mul(a, b) => a.evaluate()?.checked_mul(&b.evaluate()?)?,
            Self::Div(a, k) => a.evaluate()?.checked_div(k)?,
            Self::Neg(a) => Rational64::from_integer(0).checked_sub(&a.evaluate()?)?,
        };
        in_range(value)
    }

    /// Whether the expression mentions no variable.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Num(_) => true,
            Self::Var(_) => false,
            Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) => a.is_ground() && b.is_ground(),
            Self::Div(a, _) | Self::Neg(a) => a.is_ground(),
        }
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Self::Num(_) => {}
            Self::Var(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
            Self::Div(a, _) | Self::Neg(a) => a.collect_variables(out),
        }
    }
}

/// Render a rational as `n` or `n/d`.
#[must_use]
pub fn format_rational(value: &Rational64) -> String {
    if value.is_integer() {
        value.numer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}

impl fmt::Display for ArithExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(value) => f.write_str(&format_rational(value)),
            Self::Var(name) => f.write_str(name),
            Self::Add(a, b) => write!(f, "({a} + {b})"),
            Self::Sub(a, b) => write!(f, "({a} - {b})"),
            Self::Mul(a, b) => write!(f, "({a} * {b})"),
            Self::Div(a, k) => write!(f, "({a} / {})", format_rational(k)),
            Self::Neg(a) => write!(f, "-{a}"),
        }
    }
}

/// A boolean constraint over arithmetic expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `True` or `False`.
    Bool(bool),
    /// `lhs op rhs`
    Compare {
        /// Operator.
        op: CompareOp,
        /// Left side.
        lhs: ArithExpr,
        /// Right side.
        rhs: ArithExpr,
    },
    /// `And(...)`
    And(Vec<Constraint>),
    /// `Or(...)`
    Or(Vec<Constraint>),
    /// `Not(c)`
    Not(Box<Constraint>),
    /// `Implies(a, b)`
    Implies(Box<Constraint>, Box<Constraint>),
}

impl Constraint {
    /// Elaborate a parsed expression into a constraint.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is not boolean-valued.
    pub fn from_expr(expr: &Expr) -> Result<Self, ParseError> {
        match &expr.kind {
            ExprKind::Compare { op, lhs, rhs } => Ok(Self::Compare {
                op: *op,
                lhs: ArithExpr::from_expr(lhs)?,
                rhs: ArithExpr::from_expr(rhs)?,
            }),
            ExprKind::Ident(name) if name == "True" => Ok(Self::Bool(true)),
            ExprKind::Ident(name) if name == "False" => Ok(Self::Bool(false)),
            ExprKind::Call { name, args } => {
                if !matches!(name.as_str(), "And" | "Or" | "Not" | "Implies") {
                    return Err(ParseError::new(
                        expr.position,
                        format!("unknown function '{name}'"),
                    ));
                }
                let mut parts = args
                    .iter()
                    .map(Self::from_expr)
                    .collect::<Result<Vec<_>, _>>()?;
                match (name.as_str(), parts.len()) {
                    ("And", _) => Ok(Self::And(parts)),
                    ("Or", _) => Ok(Self::Or(parts)),
                    ("Not", 1) => Ok(Self::Not(Box::new(parts.remove(0)))),
                    ("Implies", 2) => {
                        let consequent = parts.remove(1);
                        Ok(Self::Implies(
                            Box::new(parts.remove(0)),
                            Box::new(consequent),
                        ))
                    }
                    (_, n) => Err(ParseError::new(
                        expr.position,
                        format!("{name} does not take {n} argument(s)"),
                    )),
                }
            }
            _ => Err(ParseError::new(
                expr.position,
                "expected a comparison or boolean expression",
            )),
        }
    }

    /// Parse `text` as a comma-separated list of constraints.
    ///
    /// # Errors
    ///
    /// Returns the first syntax or elaboration error.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, ParseError> {
        parse_expression_list(text)?
            .iter()
            .map(Self::from_expr)
            .collect()
    }

    /// Variables in order of first appearance.
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Self::Bool(_) => {}
            Self::Compare { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Self::And(parts) | Self::Or(parts) => {
                for part in parts {
                    part.collect_variables(out);
                }
            }
            Self::Not(inner) => inner.collect_variables(out),
            Self::Implies(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, name: &str, parts: &[Constraint]) -> fmt::Result {
            write!(f, "{name}(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{part}")?;
            }
            f.write_str(")")
        }
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Compare { op, lhs, rhs } => write!(f, "{lhs} {} {rhs}", op.symbol()),
            Self::And(parts) => list(f, "And", parts),
            Self::Or(parts) => list(f, "Or", parts),
            Self::Not(inner) => write!(f, "Not({inner})"),
            Self::Implies(a, b) => write!(f, "Implies({a}, {b})"),
        }
    }
}
