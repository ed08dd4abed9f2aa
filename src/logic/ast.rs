//! Typed first-order logic programs.
//!
//! A [`ProgramFragment`] is an ordered list of [`Statement`]s plus a
//! conclusion [`Formula`]. Its `Display` output is the textual program
//! vocabulary accepted back by [`parse_statement`](super::parse_statement)
//! and [`parse_formula`](super::parse_formula).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the default domain sort.
pub const OBJECT_SORT: &str = "Object";

/// A first-order term: a declared constant or a quantifier-bound variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A free constant symbol.
    Constant(String),
    /// A variable bound by an enclosing quantifier.
    Variable(String),
}

impl Term {
    /// Create a constant term.
    #[must_use]
    pub fn constant(name: impl Into<String>) -> Self {
        Self::Constant(name.into())
    }

    /// Create a variable term.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// The symbol name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Constant(name) | Self::Variable(name) => name,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A first-order formula over uninterpreted predicates and relations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    /// Truth.
    True,
    /// Falsity.
    False,
    /// Application of a predicate or relation to terms.
    Atom {
        /// Predicate or relation name.
        predicate: String,
        /// Arguments.
        args: Vec<Term>,
    },
    /// Term equality.
    Equal(Term, Term),
    /// Negation.
    Not(Box<Formula>),
    /// Conjunction.
    And(Vec<Formula>),
    /// Disjunction.
    Or(Vec<Formula>),
    /// Implication.
    Implies(Box<Formula>, Box<Formula>),
    /// Universal quantification.
    ForAll {
        /// Bound variable names.
        vars: Vec<String>,
        /// Quantified body.
        body: Box<Formula>,
    },
    /// Existential quantification.
    Exists {
        /// Bound variable names.
        vars: Vec<String>,
        /// Quantified body.
        body: Box<Formula>,
    },
}

impl Formula {
    /// `predicate(args...)`.
    #[must_use]
    pub fn atom(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self::Atom {
            predicate: predicate.into(),
            args,
        }
    }

    /// `Not(self)`.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// `Implies(premise, consequent)`.
    #[must_use]
    pub fn implies(premise: Self, consequent: Self) -> Self {
        Self::Implies(Box::new(premise), Box::new(consequent))
    }

    /// `ForAll([vars], body)`.
    #[must_use]
    pub fn forall<S: Into<String>>(vars: impl IntoIterator<Item = S>, body: Self) -> Self {
        Self::ForAll {
            vars: vars.into_iter().map(Into::into).collect(),
            body: Box::new(body),
        }
    }

    /// `Exists([vars], body)`.
    #[must_use]
    pub fn exists<S: Into<String>>(vars: impl IntoIterator<Item = S>, body: Self) -> Self {
        Self::Exists {
            vars: vars.into_iter().map(Into::into).collect(),
            body: Box::new(body),
        }
    }

    /// Collect every symbol the formula needs declared, in first-use order:
    /// predicate names, free constants and quantifier-bound variable names.
    pub fn collect_symbols(&self, out: &mut Vec<String>) {
        fn push(out: &mut Vec<String>, name: &str) {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
        match self {
            Self::True | Self::False => {}
            Self::Atom { predicate, args } => {
                push(out, predicate);
                for arg in args {
                    if let Term::Constant(name) = arg {
                        push(out, name);
                    }
                }
            }
            Self::Equal(lhs, rhs) => {
                for term in [lhs, rhs] {
                    if let Term::Constant(name) = term {
                        push(out, name);
                    }
                }
            }
            Self::Not(inner) => inner.collect_symbols(out),
            Self::And(parts) | Self::Or(parts) => {
                for part in parts {
                    part.collect_symbols(out);
                }
            }
            Self::Implies(lhs, rhs) => {
                lhs.collect_symbols(out);
                rhs.collect_symbols(out);
            }
            Self::ForAll { vars, body } | Self::Exists { vars, body } => {
                for var in vars {
                    push(out, var);
                }
                body.collect_symbols(out);
            }
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("True"),
            Self::False => f.write_str("False"),
            Self::Atom { predicate, args } => {
                write!(f, "{predicate}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Self::Equal(lhs, rhs) => write!(f, "{lhs} == {rhs}"),
            Self::Not(inner) => write!(f, "Not({inner})"),
            Self::And(parts) => {
                f.write_str("And(")?;
                write_list(f, parts)?;
                f.write_str(")")
            }
            Self::Or(parts) => {
                f.write_str("Or(")?;
                write_list(f, parts)?;
                f.write_str(")")
            }
            Self::Implies(lhs, rhs) => write!(f, "Implies({lhs}, {rhs})"),
            Self::ForAll { vars, body } => {
                f.write_str("ForAll([")?;
                write_list(f, vars)?;
                write!(f, "], {body})")
            }
            Self::Exists { vars, body } => {
                f.write_str("Exists([")?;
                write_list(f, vars)?;
                write!(f, "], {body})")
            }
        }
    }
}

/// Kinds of declared symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// A domain sort.
    Sort,
    /// A constant of some sort.
    Constant,
    /// A quantifier variable of some sort.
    Variable,
    /// A unary predicate.
    PredicateFn,
    /// A binary relation.
    RelationFn,
}

/// A declaration statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Declaration {
    /// `declare-sort S`
    Sort(String),
    /// `declare-constant c S`
    Constant {
        /// Constant name.
        name: String,
        /// Sort name.
        sort: String,
    },
    /// `declare-variable x S`
    Variable {
        /// Variable name.
        name: String,
        /// Sort name.
        sort: String,
    },
    /// `declare-predicate P S...`
    Predicate {
        /// Predicate name.
        name: String,
        /// Argument sorts.
        domain: Vec<String>,
    },
    /// `declare-relation R S1 S2`
    Relation {
        /// Relation name.
        name: String,
        /// Argument sorts.
        domain: Vec<String>,
    },
}

impl Declaration {
    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Sort(name)
            | Self::Constant { name, .. }
            | Self::Variable { name, .. }
            | Self::Predicate { name, .. }
            | Self::Relation { name, .. } => name,
        }
    }

    /// The kind of symbol this declares.
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            Self::Sort(_) => SymbolKind::Sort,
            Self::Constant { .. } => SymbolKind::Constant,
            Self::Variable { .. } => SymbolKind::Variable,
            Self::Predicate { .. } => SymbolKind::PredicateFn,
            Self::Relation { .. } => SymbolKind::RelationFn,
        }
    }

    /// Number of arguments for functions, zero otherwise.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Predicate { domain, .. } | Self::Relation { domain, .. } => domain.len(),
            _ => 0,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sort(name) => write!(f, "declare-sort {name}"),
            Self::Constant { name, sort } => write!(f, "declare-constant {name} {sort}"),
            Self::Variable { name, sort } => write!(f, "declare-variable {name} {sort}"),
            Self::Predicate { name, domain } => {
                write!(f, "declare-predicate {name} {}", domain.join(" "))
            }
            Self::Relation { name, domain } => {
                write!(f, "declare-relation {name} {}", domain.join(" "))
            }
        }
    }
}

/// One program statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    /// Introduce a symbol.
    Declare(Declaration),
    /// Assert a formula.
    Assert(Formula),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declare(decl) => write!(f, "{decl}"),
            Self::Assert(formula) => write!(f, "assert {formula}"),
        }
    }
}

/// An ordered program plus the conclusion to prove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramFragment {
    /// Declarations and assertions in execution order.
    pub statements: Vec<Statement>,
    /// The formula the premises should entail.
    pub conclusion: Formula,
}

impl ProgramFragment {
    /// Create a program.
    #[must_use]
    pub fn new(statements: Vec<Statement>, conclusion: Formula) -> Self {
        Self {
            statements,
            conclusion,
        }
    }

    /// Statements rendered one per line.
    #[must_use]
    pub fn premise_lines(&self) -> Vec<String> {
        self.statements.iter().map(ToString::to_string).collect()
    }

    /// Declaration statements only.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Declare(decl) => Some(decl),
            Statement::Assert(_) => None,
        })
    }

    /// Assertion statements only.
    pub fn assertions(&self) -> impl Iterator<Item = &Formula> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Assert(formula) => Some(formula),
            Statement::Declare(_) => None,
        })
    }

    /// Symbols used by an assertion (or the conclusion) before any
    /// declaration introduced them. Empty for a well-ordered program.
    #[must_use]
    pub fn forward_references(&self) -> Vec<String> {
        let mut declared: HashSet<&str> = HashSet::new();
        let mut missing = Vec::new();
        let mut check = |formula: &Formula, declared: &HashSet<&str>| {
            let mut used = Vec::new();
            formula.collect_symbols(&mut used);
            for name in used {
                if !declared.contains(name.as_str()) && !missing.contains(&name) {
                    missing.push(name);
                }
            }
        };

        for statement in &self.statements {
            match statement {
                Statement::Declare(decl) => {
                    declared.insert(decl.name());
                }
                Statement::Assert(formula) => check(formula, &declared),
            }
        }
        check(&self.conclusion, &declared);
        missing
    }
}

impl fmt::Display for ProgramFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        write!(f, "conclusion {}", self.conclusion)
    }
}
