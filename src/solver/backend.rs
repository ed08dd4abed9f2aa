//! Term construction against the `OxiZ` term manager.
//!
//! Every domain sort is carried by the solver's integer sort: the backend
//! has no uninterpreted sorts, and sort discipline is enforced before
//! encoding. Arithmetic constraints use real-valued variables.

use std::collections::{HashMap, HashSet};

use num_rational::Rational64;
use oxiz::{
    TermManager,
    solver::{SolverConfig, SolverResult},
};
use oxiz_core::{TermId, TermKind};

use crate::logic::{ArithExpr, CompareOp, Constraint, Formula, Term, format_rational};

/// Solver configuration with an optional per-check timeout.
#[must_use]
pub fn solver_config(timeout_ms: u64) -> SolverConfig {
    if timeout_ms > 0 {
        SolverConfig::default().with_timeout(timeout_ms)
    } else {
        SolverConfig::default()
    }
}

/// Three-valued solver verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A model exists.
    Sat,
    /// No model exists.
    Unsat,
    /// The solver gave up or timed out.
    Unknown,
}

impl From<SolverResult> for Verdict {
    fn from(result: SolverResult) -> Self {
        match result {
            SolverResult::Sat => Self::Sat,
            SolverResult::Unsat => Self::Unsat,
            SolverResult::Unknown => Self::Unknown,
        }
    }
}

/// Render a model value term: booleans, integers, and rationals.
/// Returns `None` for anything that is not a literal value.
#[must_use]
pub fn render_value(tm: &TermManager, value: TermId) -> Option<String> {
    let term = tm.get(value)?;
    match &term.kind {
        TermKind::True => Some("True".to_string()),
        TermKind::False => Some("False".to_string()),
        TermKind::IntConst(n) => Some(n.to_string()),
        TermKind::RealConst(r) => Some(format_rational(r)),
        _ => None,
    }
}

/// Encodes first-order formulas, remembering the constants it created and
/// the ground atoms it met.
pub struct FormulaEncoder {
    tm: TermManager,
    constants: HashMap<String, TermId>,
    atoms: Vec<(String, TermId)>,
    seen_atoms: HashSet<String>,
    binders: usize,
}

impl Default for FormulaEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaEncoder {
    /// Create an encoder with a fresh term manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tm: TermManager::new(),
            constants: HashMap::new(),
            atoms: Vec::new(),
            seen_atoms: HashSet::new(),
            binders: 0,
        }
    }

    /// The term manager, for solver calls.
    pub fn terms_mut(&mut self) -> &mut TermManager {
        &mut self.tm
    }

    /// The term manager.
    #[must_use]
    pub fn terms(&self) -> &TermManager {
        &self.tm
    }

    /// Term for the constant `name`, created on first use.
    pub fn constant(&mut self, name: &str) -> TermId {
        if let Some(&id) = self.constants.get(name) {
            return id;
        }
        let id = self.tm.mk_var(name, self.tm.sorts.int_sort);
        self.constants.insert(name.to_string(), id);
        id
    }

    /// Term for a constant that has already been encoded.
    #[must_use]
    pub fn existing_constant(&self, name: &str) -> Option<TermId> {
        self.constants.get(name).copied()
    }

    /// Ground atoms met so far, rendered, in encoding order.
    #[must_use]
    pub fn ground_atoms(&self) -> &[(String, TermId)] {
        &self.atoms
    }

    /// Encode `formula`. Quantifiers become native solver binders.
    pub fn encode(&mut self, formula: &Formula) -> TermId {
        self.encode_in(formula, &mut Vec::new())
    }

    fn term(&mut self, term: &Term, scope: &[(String, TermId)]) -> TermId {
        if let Term::Variable(name) = term
            && let Some((_, id)) = scope.iter().rev().find(|(n, _)| n == name)
        {
            return *id;
        }
        self.constant(term.name())
    }

    fn encode_in(&mut self, formula: &Formula, scope: &mut Vec<(String, TermId)>) -> TermId {
        match formula {
            Formula::True => self.tm.mk_true(),
            Formula::False => self.tm.mk_false(),
            Formula::Atom { predicate, args } => {
                let ids: Vec<TermId> = args.iter().map(|a| self.term(a, scope)).collect();
                let bool_sort = self.tm.sorts.bool_sort;
                let id = self.tm.mk_apply(predicate, ids, bool_sort);
                let ground = args.iter().all(|a| match a {
                    Term::Constant(_) => true,
                    Term::Variable(name) => !scope.iter().any(|(n, _)| n == name),
                });
                if ground {
                    let rendered = formula.to_string();
                    if self.seen_atoms.insert(rendered.clone()) {
                        self.atoms.push((rendered, id));
                    }
                }
                id
            }
            Formula::Equal(lhs, rhs) => {
                let lhs = self.term(lhs, scope);
                let rhs = self.term(rhs, scope);
                self.tm.mk_eq(lhs, rhs)
            }
            Formula::Not(inner) => {
                let inner = self.encode_in(inner, scope);
                self.tm.mk_not(inner)
            }
            Formula::And(parts) => {
                let parts: Vec<TermId> = parts.iter().map(|p| self.encode_in(p, scope)).collect();
                if parts.is_empty() {
                    self.tm.mk_true()
                } else {
                    self.tm.mk_and(parts)
                }
            }
            Formula::Or(parts) => {
                let parts: Vec<TermId> = parts.iter().map(|p| self.encode_in(p, scope)).collect();
                if parts.is_empty() {
                    self.tm.mk_false()
                } else {
                    self.tm.mk_or(parts)
                }
            }
            Formula::Implies(lhs, rhs) => {
                let lhs = self.encode_in(lhs, scope);
                let rhs = self.encode_in(rhs, scope);
                self.tm.mk_implies(lhs, rhs)
            }
            Formula::ForAll { vars, body } | Formula::Exists { vars, body } => {
                let int_sort = self.tm.sorts.int_sort;
                let depth = scope.len();
                // Binder names are made unique so they never capture a constant.
                let names: Vec<String> = vars
                    .iter()
                    .map(|v| {
                        self.binders += 1;
                        format!("{v}!{}", self.binders)
                    })
                    .collect();
                for (var, name) in vars.iter().zip(&names) {
                    let id = self.tm.mk_var(name, int_sort);
                    scope.push((var.clone(), id));
                }
                let body = self.encode_in(body, scope);
                scope.truncate(depth);
                let bound: Vec<(&str, _)> = names.iter().map(|n| (n.as_str(), int_sort)).collect();
                if matches!(formula, Formula::ForAll { .. }) {
                    self.tm.mk_forall(bound, body)
                } else {
                    self.tm.mk_exists(bound, body)
                }
            }
        }
    }
}

/// Create a real-valued variable term.
pub fn real_variable(tm: &mut TermManager, name: &str) -> TermId {
    let real_sort = tm.sorts.real_sort;
    tm.mk_var(name, real_sort)
}

/// Encode an arithmetic expression. Variables must already be in `vars`;
/// unknown names are created as reals.
pub fn encode_arith(
    tm: &mut TermManager,
    vars: &HashMap<String, TermId>,
    expr: &ArithExpr,
) -> TermId {
    match expr {
        ArithExpr::Num(value) => tm.mk_real(*value),
        ArithExpr::Var(name) => vars
            .get(name)
            .copied()
            .unwrap_or_else(|| real_variable(tm, name)),
        ArithExpr::Add(a, b) => {
            let a = encode_arith(tm, vars, a);
            let b = encode_arith(tm, vars, b);
            tm.mk_add(vec![a, b])
        }
        ArithExpr::Sub(a, b) => {
            let a = encode_arith(tm, vars, a);
            let b = encode_arith(tm, vars, b);
            tm.mk_sub(a, b)
        }
        ArithExpr::Mul(a, b) => {
            let a = encode_arith(tm, vars, a);
            let b = encode_arith(tm, vars, b);
            tm.mk_mul(vec![a, b])
        }
        ArithExpr::Div(a, divisor) => {
            let a = encode_arith(tm, vars, a);
            let reciprocal = tm.mk_real(divisor.recip());
            tm.mk_mul(vec![a, reciprocal])
        }
        ArithExpr::Neg(a) => {
            let a = encode_arith(tm, vars, a);
            let zero = tm.mk_real(Rational64::from_integer(0));
            tm.mk_sub(zero, a)
        }
    }
}

/// Encode a boolean constraint over real variables.
pub fn encode_constraint(
    tm: &mut TermManager,
    vars: &HashMap<String, TermId>,
    constraint: &Constraint,
) -> TermId {
    match constraint {
        Constraint::Bool(true) => tm.mk_true(),
        Constraint::Bool(false) => tm.mk_false(),
        Constraint::Compare { op, lhs, rhs } => {
            let lhs = encode_arith(tm, vars, lhs);
            let rhs = encode_arith(tm, vars, rhs);
            match op {
                CompareOp::Eq => tm.mk_eq(lhs, rhs),
                CompareOp::Ne => {
                    let eq = tm.mk_eq(lhs, rhs);
                    tm.mk_not(eq)
                }
                CompareOp::Lt => tm.mk_lt(lhs, rhs),
                CompareOp::Le => tm.mk_le(lhs, rhs),
                CompareOp::Gt => tm.mk_gt(lhs, rhs),
                CompareOp::Ge => tm.mk_ge(lhs, rhs),
            }
        }
        Constraint::And(parts) => {
            let parts: Vec<TermId> = parts
                .iter()
                .map(|p| encode_constraint(tm, vars, p))
                .collect();
            if parts.is_empty() {
                tm.mk_true()
            } else {
                tm.mk_and(parts)
            }
        }
        Constraint::Or(parts) => {
            let parts: Vec<TermId> = parts
                .iter()
                .map(|p| encode_constraint(tm, vars, p))
                .collect();
            if parts.is_empty() {
                tm.mk_false()
            } else {
                tm.mk_or(parts)
            }
        }
        Constraint::Not(inner) => {
            let inner = encode_constraint(tm, vars, inner);
            tm.mk_not(inner)
        }
        Constraint::Implies(a, b) => {
            let a = encode_constraint(tm, vars, a);
            let b = encode_constraint(tm, vars, b);
            tm.mk_implies(a, b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::parse_formula;
    use oxiz::solver::Solver;

    #[test]
    fn test_render_literal_values() {
        let mut tm = TermManager::new();
        let t = tm.mk_true();
        let seven = tm.mk_int(7);
        let half = tm.mk_real(Rational64::new(1, 2));
        assert_eq!(render_value(&tm, t).as_deref(), Some("True"));
        assert_eq!(render_value(&tm, seven).as_deref(), Some("7"));
        assert_eq!(render_value(&tm, half).as_deref(), Some("1/2"));

        let x = real_variable(&mut tm, "x");
        assert!(render_value(&tm, x).is_none());
    }

    #[test]
    fn test_encoder_tracks_ground_atoms_once() {
        let mut encoder = FormulaEncoder::new();
        let formula =
            parse_formula("And(Human(socrates), Human(socrates), ForAll([x], Mortal(x)))").unwrap();
        encoder.encode(&formula);

        let atoms: Vec<&str> = encoder
            .ground_atoms()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(atoms, vec!["Human(socrates)"]);
        assert!(encoder.existing_constant("socrates").is_some());
        assert!(encoder.existing_constant("x").is_none());
    }

    #[test]
    fn test_contradictory_ground_atoms_are_unsat() {
        let mut encoder = FormulaEncoder::new();
        let formula = parse_formula("And(Fly(tweety), Not(Fly(tweety)))").unwrap();
        let term = encoder.encode(&formula);

        let mut solver = Solver::with_config(solver_config(1000));
        solver.assert(term, encoder.terms_mut());
        assert_eq!(Verdict::from(solver.check(encoder.terms_mut())), Verdict::Unsat);
    }

    #[test]
    fn test_constraint_encoding_is_satisfiable() {
        let mut tm = TermManager::new();
        let mut vars = HashMap::new();
        vars.insert("x".to_string(), real_variable(&mut tm, "x"));
        let constraint = Constraint::parse_list("x / 2 > 1").unwrap().remove(0);
        let term = encode_constraint(&mut tm, &vars, &constraint);

        let mut solver = Solver::new();
        solver.assert(term, &mut tm);
        assert_eq!(Verdict::from(solver.check(&mut tm)), Verdict::Sat);
    }
}
