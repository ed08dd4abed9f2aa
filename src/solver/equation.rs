//! One-shot equation solving and calculation.

use std::collections::HashMap;

use oxiz::{TermManager, solver::Solver};

use super::backend::{Verdict, encode_constraint, real_variable, render_value, solver_config};
use crate::logic::{ArithExpr, CompareOp, Constraint, ExprKind, parse_expression};

/// Solve a comma-separated system of constraints over real variables.
///
/// Always returns a message: `"Solution found: x = 3, y = 7"`,
/// `"No solution exists for the given constraints"`, an unknown-outcome
/// notice, or `"Invalid equation: <reason>"`.
#[must_use]
pub fn solve_equation(equation: &str, timeout_ms: u64) -> String {
    let constraints = match Constraint::parse_list(equation) {
        Ok(constraints) => constraints,
        Err(e) => return format!("Invalid equation: {e}"),
    };

    let mut tm = TermManager::new();
    let mut variables = HashMap::new();
    let mut order = Vec::new();
    for constraint in &constraints {
        for name in constraint.variables() {
            if !variables.contains_key(&name) {
                variables.insert(name.clone(), real_variable(&mut tm, &name));
                order.push(name);
            }
        }
    }

    let mut solver = Solver::with_config(solver_config(timeout_ms));
    for constraint in &constraints {
        let term = encode_constraint(&mut tm, &variables, constraint);
        solver.assert(term, &mut tm);
    }

    match Verdict::from(solver.check(&mut tm)) {
        Verdict::Sat => {
            let mut parts = Vec::with_capacity(order.len());
            if let Some(model) = solver.model() {
                for name in &order {
                    let id = variables[name];
                    let value = model.eval(id, &mut tm);
                    if let Some(rendered) = render_value(&tm, value) {
                        parts.push(format!("{name} = {rendered}"));
                    }
                }
            }
            format!("Solution found: {}", parts.join(", "))
        }
        Verdict::Unsat => "No solution exists for the given constraints".to_string(),
        Verdict::Unknown => {
            "Solution unknown: the solver could not decide the given constraints".to_string()
        }
    }
}

fn render_top(expr: &ArithExpr) -> String {
    match expr {
        ArithExpr::Add(a, b) => format!("{a} + {b}"),
        ArithExpr::Sub(a, b) => format!("{a} - {b}"),
        ArithExpr::Mul(a, b) => format!("{a} * {b}"),
        other => other.to_string(),
    }
}

fn simplify_comparison(constraint: &Constraint) -> Option<String> {
    let Constraint::Compare { op, lhs, rhs } = constraint else {
        return None;
    };
    let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
    if let (ArithExpr::Num(a), ArithExpr::Num(b)) = (&lhs, &rhs) {
        let holds = match op {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
        };
        return Some(if holds { "True" } else { "False" }.to_string());
    }
    Some(format!("{} {} {}", render_top(&lhs), op.symbol(), render_top(&rhs)))
}

/// Simplify an arithmetic expression or comparison, folding constants.
///
/// Returns `"<equation> = <simplified>"`, or `"Invalid equation"` if the
/// text does not parse.
#[must_use]
pub fn calculate(equation: &str) -> String {
    let Ok(expr) = parse_expression(equation) else {
        return "Invalid equation".to_string();
    };
    let simplified = if matches!(expr.kind, ExprKind::Compare { .. }) {
        Constraint::from_expr(&expr)
            .ok()
            .and_then(|c| simplify_comparison(&c))
    } else {
        ArithExpr::parse(equation).ok().map(|e| render_top(&e.simplify()))
    };
    match simplified {
        Some(result) => format!("{equation} = {result}"),
        None => "Invalid equation".to_string(),
    }
}
