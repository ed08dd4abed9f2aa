//! Quantifier elimination for the fragment the prover grounds.
//!
//! A formula is first put in negation normal form. Existentials that are not
//! under a universal are then Skolemized into fresh constants, and the
//! remaining universals are expanded over the constants of their sort. This
//! is exact for the Bernays-Schönfinkel fragment (`∃*∀*` prenex shape, no
//! function symbols), which covers every program the compiler emits.

use std::collections::HashMap;

use crate::logic::{Formula, Term};

/// Rewrite `formula` into negation normal form.
///
/// Implications are eliminated and negations are pushed down onto atoms and
/// equalities, flipping quantifiers and connectives on the way.
#[must_use]
pub fn to_nnf(formula: &Formula) -> Formula {
    nnf(formula, false)
}

fn nnf(formula: &Formula, negated: bool) -> Formula {
    match formula {
        Formula::True if negated => Formula::False,
        Formula::False if negated => Formula::True,
        Formula::True | Formula::False => formula.clone(),
        Formula::Atom { .. } | Formula::Equal(..) => {
            if negated {
                formula.clone().negate()
            } else {
                formula.clone()
            }
        }
        Formula::Not(inner) => nnf(inner, !negated),
        Formula::And(parts) => {
            let parts = parts.iter().map(|p| nnf(p, negated)).collect();
            if negated {
                Formula::Or(parts)
            } else {
                Formula::And(parts)
            }
        }
        Formula::Or(parts) => {
            let parts = parts.iter().map(|p| nnf(p, negated)).collect();
            if negated {
                Formula::And(parts)
            } else {
                Formula::Or(parts)
            }
        }
        Formula::Implies(lhs, rhs) => {
            if negated {
                Formula::And(vec![nnf(lhs, false), nnf(rhs, true)])
            } else {
                Formula::Or(vec![nnf(lhs, true), nnf(rhs, false)])
            }
        }
        Formula::ForAll { vars, body } => {
            let body = Box::new(nnf(body, negated));
            if negated {
                Formula::Exists {
                    vars: vars.clone(),
                    body,
                }
            } else {
                Formula::ForAll {
                    vars: vars.clone(),
                    body,
                }
            }
        }
        Formula::Exists { vars, body } => {
            let body = Box::new(nnf(body, negated));
            if negated {
                Formula::ForAll {
                    vars: vars.clone(),
                    body,
                }
            } else {
                Formula::Exists {
                    vars: vars.clone(),
                    body,
                }
            }
        }
    }
}

/// Replace free occurrences of the bound variables in `bindings`.
#[must_use]
pub fn substitute(formula: &Formula, bindings: &HashMap<String, Term>) -> Formula {
    let term = |t: &Term| match t {
        Term::Variable(name) => bindings.get(name).cloned().unwrap_or_else(|| t.clone()),
        Term::Constant(_) => t.clone(),
    };
    match formula {
        Formula::True | Formula::False => formula.clone(),
        Formula::Atom { predicate, args } => {
            Formula::atom(predicate.clone(), args.iter().map(term).collect())
        }
        Formula::Equal(lhs, rhs) => Formula::Equal(term(lhs), term(rhs)),
        Formula::Not(inner) => substitute(inner, bindings).negate(),
        Formula::And(parts) => {
            Formula::And(parts.iter().map(|p| substitute(p, bindings)).collect())
        }
        Formula::Or(parts) => Formula::Or(parts.iter().map(|p| substitute(p, bindings)).collect()),
        Formula::Implies(lhs, rhs) => {
            Formula::implies(substitute(lhs, bindings), substitute(rhs, bindings))
        }
        Formula::ForAll { vars, body } | Formula::Exists { vars, body } => {
            let mut inner = bindings.clone();
            for var in vars {
                inner.remove(var);
            }
            let body = Box::new(substitute(body, &inner));
            if matches!(formula, Formula::ForAll { .. }) {
                Formula::ForAll {
                    vars: vars.clone(),
                    body,
                }
            } else {
                Formula::Exists {
                    vars: vars.clone(),
                    body,
                }
            }
        }
    }
}

/// A Skolem constant introduced for an existential variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkolemConstant {
    /// Name of the fresh constant.
    pub name: String,
    /// The existential variable it replaces.
    pub variable: String,
}

/// Skolemize the existentials of an NNF formula that are not in the scope
/// of a universal. `fresh` produces an unused constant name for a variable.
pub fn skolemize(
    formula: Formula,
    fresh: &mut dyn FnMut(&str) -> String,
    introduced: &mut Vec<SkolemConstant>,
) -> Formula {
    match formula {
        Formula::Exists { vars, body } => {
            let mut bindings = HashMap::new();
            for var in vars {
                let name = fresh(&var);
                bindings.insert(var.clone(), Term::constant(name.clone()));
                introduced.push(SkolemConstant {
                    name,
                    variable: var,
                });
            }
            skolemize(substitute(&body, &bindings), fresh, introduced)
        }
        Formula::And(parts) => Formula::And(
            parts
                .into_iter()
                .map(|p| skolemize(p, fresh, introduced))
                .collect(),
        ),
        Formula::Or(parts) => Formula::Or(
            parts
                .into_iter()
                .map(|p| skolemize(p, fresh, introduced))
                .collect(),
        ),
        other => other,
    }
}

/// Names of the universally bound variables of `formula`, in first-seen order.
#[must_use]
pub fn universal_variables(formula: &Formula) -> Vec<String> {
    fn walk(formula: &Formula, out: &mut Vec<String>) {
        match formula {
            Formula::ForAll { vars, body } => {
                for var in vars {
                    if !out.contains(var) {
                        out.push(var.clone());
                    }
                }
                walk(body, out);
            }
            Formula::Exists { body, .. } | Formula::Not(body) => walk(body, out),
            Formula::And(parts) | Formula::Or(parts) => {
                for part in parts {
                    walk(part, out);
                }
            }
            Formula::Implies(lhs, rhs) => {
                walk(lhs, out);
                walk(rhs, out);
            }
            Formula::True | Formula::False | Formula::Atom { .. } | Formula::Equal(..) => {}
        }
    }
    let mut out = Vec::new();
    walk(formula, &mut out);
    out
}

/// Ground names of `formula`: its constants plus any variable that no
/// enclosing quantifier binds, in first-seen order.
#[must_use]
pub fn ground_names(formula: &Formula) -> Vec<String> {
    fn visit(term: &Term, bound: &[String], out: &mut Vec<String>) {
        let free = match term {
            Term::Constant(_) => true,
            Term::Variable(name) => !bound.contains(name),
        };
        if free && !out.iter().any(|n| n == term.name()) {
            out.push(term.name().to_string());
        }
    }
    fn walk(formula: &Formula, bound: &mut Vec<String>, out: &mut Vec<String>) {
        match formula {
            Formula::True | Formula::False => {}
            Formula::Atom { args, .. } => {
                for arg in args {
                    visit(arg, bound, out);
                }
            }
            Formula::Equal(lhs, rhs) => {
                visit(lhs, bound, out);
                visit(rhs, bound, out);
            }
            Formula::Not(inner) => walk(inner, bound, out),
            Formula::And(parts) | Formula::Or(parts) => {
                for part in parts {
                    walk(part, bound, out);
                }
            }
            Formula::Implies(lhs, rhs) => {
                walk(lhs, bound, out);
                walk(rhs, bound, out);
            }
            Formula::ForAll { vars, body } | Formula::Exists { vars, body } => {
                let depth = bound.len();
                bound.extend(vars.iter().cloned());
                walk(body, bound, out);
                bound.truncate(depth);
            }
        }
    }
    let mut out = Vec::new();
    walk(formula, &mut Vec::new(), &mut out);
    out
}

/// The finite domains universals are expanded over.
#[derive(Debug, Clone, Default)]
pub struct HerbrandUniverse {
    domains: HashMap<String, Vec<String>>,
}

impl HerbrandUniverse {
    /// Create an empty universe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` to the domain of `sort`. Duplicates are ignored.
    pub fn add(&mut self, sort: &str, name: impl Into<String>) {
        let name = name.into();
        let domain = self.domains.entry(sort.to_string()).or_default();
        if !domain.contains(&name) {
            domain.push(name);
        }
    }

    /// Constants of `sort`.
    #[must_use]
    pub fn domain(&self, sort: &str) -> &[String] {
        self.domains.get(sort).map_or(&[], Vec::as_slice)
    }

    /// Whether `sort` has at least one constant.
    #[must_use]
    pub fn is_inhabited(&self, sort: &str) -> bool {
        !self.domain(sort).is_empty()
    }

    /// Expand every universal of an NNF, Skolemized formula over the
    /// domains. `sort_of` maps a bound variable to its sort.
    ///
    /// Returns `None` when an existential remains under a universal or the
    /// number of instances would exceed `limit`.
    pub fn expand(
        &self,
        formula: &Formula,
        sort_of: &dyn Fn(&str) -> String,
        limit: usize,
    ) -> Option<Formula> {
        let mut budget = limit;
        self.expand_within(formula, sort_of, &mut budget)
    }

    fn expand_within(
        &self,
        formula: &Formula,
        sort_of: &dyn Fn(&str) -> String,
        budget: &mut usize,
    ) -> Option<Formula> {
        match formula {
            Formula::True | Formula::False | Formula::Atom { .. } | Formula::Equal(..) => {
                Some(formula.clone())
            }
            Formula::Not(inner) => Some(self.expand_within(inner, sort_of, budget)?.negate()),
            Formula::And(parts) => Some(Formula::And(
                parts
                    .iter()
                    .map(|p| self.expand_within(p, sort_of, budget))
                    .collect::<Option<Vec<_>>>()?,
            )),
            Formula::Or(parts) => Some(Formula::Or(
                parts
                    .iter()
                    .map(|p| self.expand_within(p, sort_of, budget))
                    .collect::<Option<Vec<_>>>()?,
            )),
            Formula::Implies(lhs, rhs) => Some(Formula::implies(
                self.expand_within(lhs, sort_of, budget)?,
                self.expand_within(rhs, sort_of, budget)?,
            )),
            Formula::Exists { .. } => None,
            Formula::ForAll { vars, body } => {
                let domains: Vec<&[String]> =
                    vars.iter().map(|v| self.domain(&sort_of(v))).collect();
                let count = domains
                    .iter()
                    .try_fold(1usize, |acc, d| acc.checked_mul(d.len()))?;
                *budget = budget.checked_sub(count)?;

                let mut instances = Vec::with_capacity(count);
                let mut cursor = vec![0usize; vars.len()];
                for _ in 0..count {
                    let bindings: HashMap<String, Term> = vars
                        .iter()
                        .zip(&domains)
                        .zip(&cursor)
                        .map(|((var, domain), &i)| {
                            (var.clone(), Term::constant(domain[i].clone()))
                        })
                        .collect();
                    let instance = substitute(body, &bindings);
                    instances.push(self.expand_within(&instance, sort_of, budget)?);
                    advance(&mut cursor, &domains);
                }
                Some(Formula::And(instances))
            }
        }
    }
}

// Odometer step over the cartesian product of the domains.
fn advance(cursor: &mut [usize], domains: &[&[String]]) {
    for (slot, domain) in cursor.iter_mut().zip(domains).rev() {
        *slot += 1;
        if *slot < domain.len() {
            return;
        }
        *slot = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::parse_formula;

    fn object(_: &str) -> String {
        "Object".to_string()
    }

    #[test]
    fn test_nnf_pushes_negation_through_quantifier() {
        let formula = parse_formula("Not(ForAll([x], Implies(Human(x), Mortal(x))))").unwrap();
        assert_eq!(
            to_nnf(&formula).to_string(),
            "Exists([x], And(Human(x), Not(Mortal(x))))"
        );
    }

    #[test]
    fn test_nnf_double_negation_and_constants() {
        let formula = parse_formula("Not(Or(Not(P(a)), False))").unwrap();
        assert_eq!(to_nnf(&formula).to_string(), "And(P(a), True)");
    }

    #[test]
    fn test_skolemize_top_level_existential() {
        let formula = to_nnf(&parse_formula("Exists([x], And(Bird(x), Not(Fly(x))))").unwrap());
        let mut introduced = Vec::new();
        let result = skolemize(formula, &mut |v| format!("sk_{v}"), &mut introduced);
        assert_eq!(result.to_string(), "And(Bird(sk_x), Not(Fly(sk_x)))");
        assert_eq!(
            introduced,
            vec![SkolemConstant {
                name: "sk_x".into(),
                variable: "x".into()
            }]
        );
    }

    #[test]
    fn test_existential_under_universal_is_kept() {
        let formula = parse_formula("ForAll([x], Exists([y], Parent(y, x)))").unwrap();
        let mut introduced = Vec::new();
        let result = skolemize(formula.clone(), &mut |v| v.to_string(), &mut introduced);
        assert_eq!(result, formula);
        assert!(introduced.is_empty());

        let mut universe = HerbrandUniverse::new();
        universe.add("Object", "a");
        assert!(universe.expand(&result, &object, 100).is_none());
    }

    #[test]
    fn test_expand_over_constants() {
        let formula = parse_formula("ForAll([x], Implies(Human(x), Mortal(x)))").unwrap();
        let mut universe = HerbrandUniverse::new();
        universe.add("Object", "socrates");
        universe.add("Object", "plato");
        universe.add("Object", "socrates");

        let expanded = universe.expand(&formula, &object, 100).unwrap();
        assert_eq!(
            expanded.to_string(),
            "And(Implies(Human(socrates), Mortal(socrates)), Implies(Human(plato), Mortal(plato)))"
        );
    }

    #[test]
    fn test_expand_cartesian_product_and_limit() {
        let formula = parse_formula(
            "ForAll([x, y, z], Implies(And(R(x, y), R(y, z)), R(x, z)))",
        )
        .unwrap();
        let mut universe = HerbrandUniverse::new();
        for name in ["a", "b", "c"] {
            universe.add("Object", name);
        }

        let Some(Formula::And(instances)) = universe.expand(&formula, &object, 27) else {
            panic!("expected a conjunction of instances");
        };
        assert_eq!(instances.len(), 27);
        assert_eq!(
            instances[1].to_string(),
            "Implies(And(R(a, a), R(a, b)), R(a, b))"
        );
        assert!(universe.expand(&formula, &object, 26).is_none());
    }

    #[test]
    fn test_substitute_respects_shadowing() {
        let formula = parse_formula("And(P(x), ForAll([x], Q(x)))").unwrap();
        // The parser reads the free `x` as a constant.
        let formula = match formula {
            Formula::And(mut parts) => {
                parts[0] = Formula::atom("P", vec![Term::variable("x")]);
                Formula::And(parts)
            }
            other => other,
        };
        let bindings = HashMap::from([("x".to_string(), Term::constant("a"))]);
        assert_eq!(
            substitute(&formula, &bindings).to_string(),
            "And(P(a), ForAll([x], Q(x)))"
        );
    }

    #[test]
    fn test_ground_names_and_universal_variables() {
        let formula = parse_formula(
            "And(Human(socrates), ForAll([x], Implies(Human(x), Equal(x, plato))))",
        )
        .unwrap();
        assert_eq!(ground_names(&formula), vec!["socrates", "plato"]);
        assert_eq!(universal_variables(&formula), vec!["x"]);
    }
}
