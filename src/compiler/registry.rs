//! The definition registry: the symbol table of one compiled program.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::logic::{Declaration, Formula, OBJECT_SORT, Statement, SymbolKind, Term};

/// Tracks declared symbols and accumulates the program in encounter order.
///
/// Every `declare_*` call is idempotent: the first declaration of a name
/// wins and later requests are no-ops returning `false`. Re-asserting an
/// identical formula is likewise a no-op.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    symbols: HashMap<String, Declaration>,
    asserted: HashSet<Formula>,
    statements: Vec<Statement>,
}

impl DefinitionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn declare(&mut self, decl: Declaration) -> bool {
        if let Some(existing) = self.symbols.get(decl.name()) {
            if existing.kind() != decl.kind() {
                debug!(
                    name = decl.name(),
                    existing = ?existing.kind(),
                    requested = ?decl.kind(),
                    "name already declared with a different kind"
                );
            }
            return false;
        }
        self.symbols.insert(decl.name().to_string(), decl.clone());
        self.statements.push(Statement::Declare(decl));
        true
    }

    /// Declare a sort.
    pub fn declare_sort(&mut self, name: impl Into<String>) -> bool {
        self.declare(Declaration::Sort(name.into()))
    }

    /// Declare a constant of `sort`.
    pub fn declare_constant(&mut self, name: impl Into<String>, sort: impl Into<String>) -> bool {
        self.declare(Declaration::Constant {
            name: name.into(),
            sort: sort.into(),
        })
    }

    /// Declare a constant of the `Object` sort.
    pub fn declare_object(&mut self, name: impl Into<String>) -> bool {
        self.declare_constant(name, OBJECT_SORT)
    }

    /// Declare a quantifier variable of `sort`.
    pub fn declare_variable(&mut self, name: impl Into<String>, sort: impl Into<String>) -> bool {
        self.declare(Declaration::Variable {
            name: name.into(),
            sort: sort.into(),
        })
    }

    /// Declare a unary predicate over `Object`.
    pub fn declare_predicate(&mut self, name: impl Into<String>) -> bool {
        self.declare_predicate_over(name, vec![OBJECT_SORT.to_string()])
    }

    /// Declare a predicate with an explicit domain.
    pub fn declare_predicate_over(&mut self, name: impl Into<String>, domain: Vec<String>) -> bool {
        self.declare(Declaration::Predicate {
            name: name.into(),
            domain,
        })
    }

    /// Declare a binary relation over `Object`.
    pub fn declare_relation(&mut self, name: impl Into<String>) -> bool {
        self.declare_relation_over(
            name,
            vec![OBJECT_SORT.to_string(), OBJECT_SORT.to_string()],
        )
    }

    /// Declare a relation with an explicit domain.
    pub fn declare_relation_over(&mut self, name: impl Into<String>, domain: Vec<String>) -> bool {
        self.declare(Declaration::Relation {
            name: name.into(),
            domain,
        })
    }

    /// Append an assertion. Returns `false` if the identical formula was
    /// already asserted.
    pub fn assert_formula(&mut self, formula: Formula) -> bool {
        if !self.asserted.insert(formula.clone()) {
            return false;
        }
        self.statements.push(Statement::Assert(formula));
        true
    }

    /// Kind of the declared symbol `name`.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.symbols.get(name).map(Declaration::kind)
    }

    /// Whether `predicate(args...)` would be well-formed against the current
    /// declarations: the function exists with matching arity and every
    /// constant argument is declared as a constant or variable.
    #[must_use]
    pub fn accepts_atom(&self, predicate: &str, args: &[Term]) -> bool {
        let arity_ok = self.symbols.get(predicate).is_some_and(|decl| {
            matches!(
                decl.kind(),
                SymbolKind::PredicateFn | SymbolKind::RelationFn
            ) && decl.arity() == args.len()
        });
        arity_ok
            && args.iter().all(|arg| match arg {
                Term::Constant(name) => matches!(
                    self.kind_of(name),
                    Some(SymbolKind::Constant | SymbolKind::Variable)
                ),
                Term::Variable(_) => true,
            })
    }

    /// Whether every atom and equality in `formula` is well-formed against
    /// the current declarations.
    #[must_use]
    pub fn accepts_formula(&self, formula: &Formula) -> bool {
        match formula {
            Formula::True | Formula::False => true,
            Formula::Atom { predicate, args } => self.accepts_atom(predicate, args),
            Formula::Equal(lhs, rhs) => [lhs, rhs].into_iter().all(|t| match t {
                Term::Constant(name) => matches!(
                    self.kind_of(name),
                    Some(SymbolKind::Constant | SymbolKind::Variable)
                ),
                Term::Variable(_) => true,
            }),
            Formula::Not(inner) => self.accepts_formula(inner),
            Formula::And(parts) | Formula::Or(parts) => {
                parts.iter().all(|p| self.accepts_formula(p))
            }
            Formula::Implies(lhs, rhs) => self.accepts_formula(lhs) && self.accepts_formula(rhs),
            Formula::ForAll { body, .. } | Formula::Exists { body, .. } => {
                self.accepts_formula(body)
            }
        }
    }

    /// Assert `formula` if it is well-formed, otherwise log and skip it.
    /// Returns whether a new assertion was appended.
    pub fn assert_checked(&mut self, formula: Formula) -> bool {
        if self.accepts_formula(&formula) {
            self.assert_formula(formula)
        } else {
            debug!(%formula, "assertion skipped: symbols clash with earlier declarations");
            false
        }
    }

    /// Number of declarations for `name` in the program. Always 0 or 1.
    #[must_use]
    pub fn declaration_count(&self, name: &str) -> usize {
        self.statements
            .iter()
            .filter(|s| matches!(s, Statement::Declare(d) if d.name() == name))
            .count()
    }

    /// The program so far.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Consume the registry, yielding its statements.
    #[must_use]
    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_declaration_wins() {
        let mut registry = DefinitionRegistry::new();
        assert!(registry.declare_object("socrates"));
        assert!(!registry.declare_object("socrates"));
        assert!(!registry.declare_predicate("socrates"));
        assert_eq!(registry.declaration_count("socrates"), 1);
        assert_eq!(registry.kind_of("socrates"), Some(SymbolKind::Constant));
    }

    #[test]
    fn test_declarations_in_encounter_order() {
        let mut registry = DefinitionRegistry::new();
        registry.declare_sort(OBJECT_SORT);
        registry.declare_predicate("Human");
        registry.declare_object("socrates");
        registry.assert_formula(Formula::atom("Human", vec![Term::constant("socrates")]));

        let lines: Vec<String> = registry.statements().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "declare-sort Object",
                "declare-predicate Human Object",
                "declare-constant socrates Object",
                "assert Human(socrates)",
            ]
        );
    }

    #[test]
    fn test_duplicate_assertion_is_noop() {
        let mut registry = DefinitionRegistry::new();
        let formula = Formula::atom("P", vec![Term::constant("a")]);
        assert!(registry.assert_formula(formula.clone()));
        assert!(!registry.assert_formula(formula));
        assert_eq!(registry.statements().len(), 1);
    }

    #[test]
    fn test_accepts_atom() {
        let mut registry = DefinitionRegistry::new();
        registry.declare_relation("Equal");
        registry.declare_predicate("Fly");
        registry.declare_object("tweety");

        let tweety = Term::constant("tweety");
        assert!(registry.accepts_atom("Fly", std::slice::from_ref(&tweety)));
        assert!(!registry.accepts_atom("Equal", std::slice::from_ref(&tweety)));
        assert!(!registry.accepts_atom("Fly", &[Term::constant("bird")]));
        assert!(registry.accepts_atom("Fly", &[Term::variable("x")]));
        assert!(!registry.accepts_atom("Swim", &[tweety]));
    }

    #[test]
    fn test_assert_checked_skips_ill_formed() {
        let mut registry = DefinitionRegistry::new();
        registry.declare_predicate("Equal");
        registry.declare_relation("Equal");
        registry.declare_object("a");
        registry.declare_object("b");

        let binary = Formula::atom("Equal", vec![Term::constant("a"), Term::constant("b")]);
        assert!(!registry.assert_checked(binary));
        assert!(registry.assert_checked(Formula::Equal(
            Term::constant("a"),
            Term::constant("b")
        )));
        assert_eq!(registry.statements().len(), 4);
    }
}
