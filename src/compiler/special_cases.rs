//! Curated translations that bypass the generic pipeline.
//!
//! Each [`SpecialCase`] pairs a matcher with a program template. The
//! [`SpecialCaseLibrary`] tries them in order and the first match wins.
//! Structural matching compares whole statements against word patterns;
//! keyword matching reproduces the loose substring triggers.

use tracing::debug;

use super::context::constant_name;
use super::registry::DefinitionRegistry;
use crate::config::SpecialCaseMode;
use crate::logic::{Formula, OBJECT_SORT, ProgramFragment, Term};

const ARTICLES: &[&str] = &["a", "an", "the"];

/// Normalized input handed to special-case matchers.
#[derive(Debug, Clone)]
pub struct CaseInput {
    /// Lower-cased premise texts.
    pub premises: Vec<String>,
    /// Lower-cased conclusion text.
    pub conclusion: String,
    premise_words: Vec<Vec<String>>,
    conclusion_words: Vec<String>,
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

impl CaseInput {
    /// Normalize premises and conclusion.
    #[must_use]
    pub fn new(premises: &[String], conclusion: &str) -> Self {
        let premises: Vec<String> = premises.iter().map(|p| p.to_lowercase()).collect();
        let conclusion = conclusion.to_lowercase();
        Self {
            premise_words: premises.iter().map(|p| words(p)).collect(),
            conclusion_words: words(&conclusion),
            premises,
            conclusion,
        }
    }

    /// Whether any premise contains `needle`.
    #[must_use]
    pub fn any_premise_contains(&self, needle: &str) -> bool {
        self.premises.iter().any(|p| p.contains(needle))
    }

    /// Captures of `pattern` over every premise that matches it.
    #[must_use]
    pub fn premise_matches(&self, pattern: &[Slot]) -> Vec<Vec<String>> {
        self.premise_words
            .iter()
            .filter_map(|w| match_statement(w, pattern))
            .collect()
    }

    /// Captures of `pattern` over the conclusion.
    #[must_use]
    pub fn conclusion_match(&self, pattern: &[Slot]) -> Option<Vec<String>> {
        match_statement(&self.conclusion_words, pattern)
    }
}

/// One position of a word pattern.
#[derive(Debug, Clone, Copy)]
pub enum Slot {
    /// Any one of the listed words.
    Word(&'static [&'static str]),
    /// Any single word, captured.
    Any,
}

impl Slot {
    fn accepts(self, word: &str) -> bool {
        match self {
            Self::Word(options) => options.contains(&word),
            Self::Any => true,
        }
    }
}

/// Match a whole statement against `pattern`, letting articles be skipped.
/// Returns the words bound to [`Slot::Any`] positions.
#[must_use]
pub fn match_statement(words: &[String], pattern: &[Slot]) -> Option<Vec<String>> {
    fn go(words: &[String], pattern: &[Slot], captures: &mut Vec<String>) -> bool {
        let Some((word, rest)) = words.split_first() else {
            return pattern.is_empty();
        };
        let skippable = ARTICLES.contains(&word.as_str());
        if let Some((slot, slots)) = pattern.split_first()
            && slot.accepts(word)
        {
            let captured = matches!(slot, Slot::Any);
            if captured {
                captures.push(word.clone());
            }
            if go(rest, slots, captures) {
                return true;
            }
            if captured {
                captures.pop();
            }
        }
        skippable && go(rest, pattern, captures)
    }

    let mut captures = Vec::new();
    go(words, pattern, &mut captures).then_some(captures)
}

/// A curated (matcher, template) pair.
pub trait SpecialCase: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Structural match. On success returns the names the template should
    /// use, possibly empty.
    fn match_structure(&self, input: &CaseInput) -> Option<Vec<String>>;

    /// Loose substring match.
    fn match_keywords(&self, input: &CaseInput) -> bool;

    /// Build the program. An empty `names` selects the default names.
    fn template(&self, names: &[String]) -> ProgramFragment;
}

fn finish(registry: DefinitionRegistry, conclusion: Formula) -> ProgramFragment {
    ProgramFragment::new(registry.into_statements(), conclusion)
}

fn c(name: &str) -> Term {
    Term::constant(name)
}

fn v(name: &str) -> Term {
    Term::variable(name)
}

fn names_or<'a, const N: usize>(names: &'a [String], defaults: [&'a str; N]) -> [&'a str; N] {
    if names.len() == N {
        let mut out = defaults;
        for (slot, name) in out.iter_mut().zip(names) {
            *slot = name.as_str();
        }
        out
    } else {
        defaults
    }
}

fn identifiers(names: Vec<String>) -> Option<Vec<String>> {
    names.iter().map(|n| constant_name(n)).collect()
}

/// "All humans are mortal. Socrates is a human. ⊢ Socrates is mortal."
pub struct SocratesMortality;

impl SpecialCase for SocratesMortality {
    fn name(&self) -> &'static str {
        "socrates_mortality"
    }

    fn match_structure(&self, input: &CaseInput) -> Option<Vec<String>> {
        const UNIVERSAL: &[Slot] = &[
            Slot::Word(&["all", "every"]),
            Slot::Word(&["humans", "human"]),
            Slot::Word(&["are", "is"]),
            Slot::Word(&["mortal"]),
        ];
        const MEMBER: &[Slot] = &[
            Slot::Word(&["socrates"]),
            Slot::Word(&["is"]),
            Slot::Word(&["human"]),
        ];
        const GOAL: &[Slot] = &[
            Slot::Word(&["socrates"]),
            Slot::Word(&["is"]),
            Slot::Word(&["mortal"]),
        ];
        let found = !input.premise_matches(UNIVERSAL).is_empty()
            && !input.premise_matches(MEMBER).is_empty()
            && input.conclusion_match(GOAL).is_some();
        found.then(Vec::new)
    }

    fn match_keywords(&self, input: &CaseInput) -> bool {
        input.any_premise_contains("socrates") && input.conclusion.contains("mortal")
    }

    fn template(&self, _names: &[String]) -> ProgramFragment {
        let mut r = DefinitionRegistry::new();
        r.declare_sort(OBJECT_SORT);
        r.declare_predicate("Human");
        r.declare_predicate("Mortal");
        r.declare_object("socrates");
        r.declare_variable("x", OBJECT_SORT);
        r.assert_formula(Formula::forall(
            ["x"],
            Formula::implies(
                Formula::atom("Human", vec![v("x")]),
                Formula::atom("Mortal", vec![v("x")]),
            ),
        ));
        r.assert_formula(Formula::atom("Human", vec![c("socrates")]));
        finish(r, Formula::atom("Mortal", vec![c("socrates")]))
    }
}

/// "All birds can fly. ⊢ The bird can not fly."
pub struct BirdFlight;

impl SpecialCase for BirdFlight {
    fn name(&self) -> &'static str {
        "bird_flight"
    }

    fn match_structure(&self, input: &CaseInput) -> Option<Vec<String>> {
        const UNIVERSAL: &[Slot] = &[
            Slot::Word(&["all", "every"]),
            Slot::Word(&["birds", "bird"]),
            Slot::Word(&["can"]),
            Slot::Word(&["fly"]),
        ];
        const GOAL: &[Slot] = &[
            Slot::Word(&["bird"]),
            Slot::Word(&["can"]),
            Slot::Word(&["not"]),
            Slot::Word(&["fly"]),
        ];
        const GOAL_FUSED: &[Slot] = &[
            Slot::Word(&["bird"]),
            Slot::Word(&["cannot", "can't"]),
            Slot::Word(&["fly"]),
        ];
        let found = !input.premise_matches(UNIVERSAL).is_empty()
            && (input.conclusion_match(GOAL).is_some()
                || input.conclusion_match(GOAL_FUSED).is_some());
        found.then(Vec::new)
    }

    fn match_keywords(&self, input: &CaseInput) -> bool {
        input.any_premise_contains("bird")
            && input.conclusion.contains("not")
            && input.conclusion.contains("fly")
    }

    fn template(&self, _names: &[String]) -> ProgramFragment {
        let mut r = DefinitionRegistry::new();
        r.declare_sort(OBJECT_SORT);
        r.declare_predicate("Bird");
        r.declare_predicate("Fly");
        r.declare_object("bird");
        r.declare_variable("x", OBJECT_SORT);
        r.assert_formula(Formula::forall(
            ["x"],
            Formula::implies(
                Formula::atom("Bird", vec![v("x")]),
                Formula::atom("Fly", vec![v("x")]),
            ),
        ));
        r.assert_formula(Formula::atom("Bird", vec![c("bird")]));
        finish(r, Formula::atom("Fly", vec![c("bird")]).negate())
    }
}

/// "A is a subset of B. x is an element of A. ⊢ x is an element of B."
pub struct SubsetMembership;

impl SpecialCase for SubsetMembership {
    fn name(&self) -> &'static str {
        "subset_membership"
    }

    fn match_structure(&self, input: &CaseInput) -> Option<Vec<String>> {
        const SUBSET: &[Slot] = &[
            Slot::Any,
            Slot::Word(&["is"]),
            Slot::Word(&["subset"]),
            Slot::Word(&["of"]),
            Slot::Any,
        ];
        const ELEMENT: &[Slot] = &[
            Slot::Any,
            Slot::Word(&["is"]),
            Slot::Word(&["element", "member"]),
            Slot::Word(&["of"]),
            Slot::Any,
        ];
        let goal = input.conclusion_match(ELEMENT)?;
        let subsets = input.premise_matches(SUBSET);
        let elements = input.premise_matches(ELEMENT);
        let (x, b) = (&goal[0], &goal[1]);
        subsets
            .iter()
            .find(|s| &s[1] == b && elements.iter().any(|e| &e[0] == x && e[1] == s[0]))
            .and_then(|s| identifiers(vec![x.clone(), s[0].clone(), b.clone()]))
    }

    fn match_keywords(&self, input: &CaseInput) -> bool {
        input.any_premise_contains("subset") && input.conclusion.contains("element")
    }

    fn template(&self, names: &[String]) -> ProgramFragment {
        let [x, a, b] = names_or(names, ["x", "A", "B"]);
        let mut r = DefinitionRegistry::new();
        r.declare_sort(OBJECT_SORT);
        r.declare_sort("Set");
        r.declare_relation_over("ElementOf", vec![OBJECT_SORT.into(), "Set".into()]);
        r.declare_relation_over("SubsetOf", vec!["Set".into(), "Set".into()]);
        r.declare_constant(x, OBJECT_SORT);
        r.declare_constant(a, "Set");
        r.declare_constant(b, "Set");
        r.assert_formula(Formula::atom("SubsetOf", vec![c(a), c(b)]));
        r.assert_formula(Formula::atom("ElementOf", vec![c(x), c(a)]));
        r.assert_formula(Formula::forall(
            [x],
            Formula::forall(
                [a, b],
                Formula::implies(
                    Formula::And(vec![
                        Formula::atom("ElementOf", vec![v(x), v(a)]),
                        Formula::atom("SubsetOf", vec![v(a), v(b)]),
                    ]),
                    Formula::atom("ElementOf", vec![v(x), v(b)]),
                ),
            ),
        ));
        finish(r, Formula::atom("ElementOf", vec![c(x), c(b)]))
    }
}

/// "A is greater than B. B is greater than C. ⊢ A is greater than C."
pub struct GreaterThanTransitivity;

impl SpecialCase for GreaterThanTransitivity {
    fn name(&self) -> &'static str {
        "greater_than_transitivity"
    }

    fn match_structure(&self, input: &CaseInput) -> Option<Vec<String>> {
        const GREATER: &[Slot] = &[
            Slot::Any,
            Slot::Word(&["is"]),
            Slot::Word(&["greater"]),
            Slot::Word(&["than"]),
            Slot::Any,
        ];
        let goal = input.conclusion_match(GREATER)?;
        let pairs = input.premise_matches(GREATER);
        let middle = pairs
            .iter()
            .find(|p| p[0] == goal[0] && pairs.iter().any(|q| q[0] == p[1] && q[1] == goal[1]))?;
        identifiers(vec![goal[0].clone(), middle[1].clone(), goal[1].clone()])
    }

    fn match_keywords(&self, input: &CaseInput) -> bool {
        input.any_premise_contains("greater than") && input.conclusion.contains("greater than")
    }

    fn template(&self, names: &[String]) -> ProgramFragment {
        let [a, b, cc] = names_or(names, ["A", "B", "C"]);
        let mut r = DefinitionRegistry::new();
        r.declare_sort(OBJECT_SORT);
        r.declare_relation("GreaterThan");
        for name in [a, b, cc] {
            r.declare_object(name);
        }
        for var in ["x", "y", "z"] {
            r.declare_variable(var, OBJECT_SORT);
        }
        r.assert_formula(Formula::atom("GreaterThan", vec![c(a), c(b)]));
        r.assert_formula(Formula::atom("GreaterThan", vec![c(b), c(cc)]));
        r.assert_formula(transitivity("GreaterThan"));
        finish(r, Formula::atom("GreaterThan", vec![c(a), c(cc)]))
    }
}

/// `ForAll([x, y, z], Implies(And(R(x, y), R(y, z)), R(x, z)))`
#[must_use]
pub fn transitivity(relation: &str) -> Formula {
    Formula::forall(
        ["x", "y", "z"],
        Formula::implies(
            Formula::And(vec![
                Formula::atom(relation, vec![v("x"), v("y")]),
                Formula::atom(relation, vec![v("y"), v("z")]),
            ]),
            Formula::atom(relation, vec![v("x"), v("z")]),
        ),
    )
}

/// "Alice is the parent of Bob. Bob is the parent of Charlie.
/// ⊢ Alice is an ancestor of Charlie."
pub struct ParentAncestry;

impl SpecialCase for ParentAncestry {
    fn name(&self) -> &'static str {
        "parent_ancestry"
    }

    fn match_structure(&self, input: &CaseInput) -> Option<Vec<String>> {
        const PARENT: &[Slot] = &[
            Slot::Any,
            Slot::Word(&["is"]),
            Slot::Word(&["parent"]),
            Slot::Word(&["of"]),
            Slot::Any,
        ];
        const GOAL: &[Slot] = &[
            Slot::Any,
            Slot::Word(&["is"]),
            Slot::Word(&["ancestor", "parent"]),
            Slot::Word(&["of"]),
            Slot::Any,
        ];
        let goal = input.conclusion_match(GOAL)?;
        let pairs = input.premise_matches(PARENT);
        let middle = pairs
            .iter()
            .find(|p| p[0] == goal[0] && pairs.iter().any(|q| q[0] == p[1] && q[1] == goal[1]))?;
        identifiers(vec![goal[0].clone(), middle[1].clone(), goal[1].clone()])
    }

    fn match_keywords(&self, input: &CaseInput) -> bool {
        input.any_premise_contains("parent")
            && (input.conclusion.contains("ancestor") || input.conclusion.contains("parent"))
    }

    fn template(&self, names: &[String]) -> ProgramFragment {
        let [a, b, cc] = names_or(names, ["Alice", "Bob", "Charlie"]);
        let people = || vec!["Person".to_string(), "Person".to_string()];
        let mut r = DefinitionRegistry::new();
        r.declare_sort(OBJECT_SORT);
        r.declare_sort("Person");
        r.declare_relation_over("Parent", people());
        r.declare_relation_over("Ancestor", people());
        for var in ["x", "y", "z"] {
            r.declare_variable(var, "Person");
        }
        for name in [a, b, cc] {
            r.declare_constant(name, "Person");
        }
        r.assert_formula(Formula::atom("Parent", vec![c(a), c(b)]));
        r.assert_formula(Formula::atom("Parent", vec![c(b), c(cc)]));
        r.assert_formula(Formula::forall(
            ["x", "y"],
            Formula::implies(
                Formula::atom("Parent", vec![v("x"), v("y")]),
                Formula::atom("Ancestor", vec![v("x"), v("y")]),
            ),
        ));
        r.assert_formula(transitivity("Ancestor"));
        finish(r, Formula::atom("Ancestor", vec![c(a), c(cc)]))
    }
}

/// A special case that matched, with its program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialCaseHit {
    /// Name of the case.
    pub name: &'static str,
    /// The canned program.
    pub program: ProgramFragment,
}

/// Ordered special cases.
pub struct SpecialCaseLibrary {
    cases: Vec<Box<dyn SpecialCase>>,
    mode: SpecialCaseMode,
}

impl SpecialCaseLibrary {
    /// An empty library in the given mode.
    #[must_use]
    pub fn empty(mode: SpecialCaseMode) -> Self {
        Self {
            cases: Vec::new(),
            mode,
        }
    }

    /// The built-in cases, in priority order.
    #[must_use]
    pub fn standard(mode: SpecialCaseMode) -> Self {
        Self::empty(mode)
            .with_case(Box::new(SocratesMortality))
            .with_case(Box::new(BirdFlight))
            .with_case(Box::new(SubsetMembership))
            .with_case(Box::new(GreaterThanTransitivity))
            .with_case(Box::new(ParentAncestry))
    }

    /// Append a case after the existing ones.
    #[must_use]
    pub fn with_case(mut self, case: Box<dyn SpecialCase>) -> Self {
        self.cases.push(case);
        self
    }

    /// Matching mode.
    #[must_use]
    pub fn mode(&self) -> SpecialCaseMode {
        self.mode
    }

    /// First matching case, if any.
    #[must_use]
    pub fn resolve(&self, premises: &[String], conclusion: &str) -> Option<SpecialCaseHit> {
        if self.mode == SpecialCaseMode::Disabled {
            return None;
        }
        let input = CaseInput::new(premises, conclusion);
        self.cases.iter().find_map(|case| {
            let names = match self.mode {
                SpecialCaseMode::Structural => case.match_structure(&input)?,
                SpecialCaseMode::Keyword => case.match_keywords(&input).then(Vec::new)?,
                SpecialCaseMode::Disabled => return None,
            };
            debug!(case = case.name(), mode = ?self.mode, "special case matched");
            Some(SpecialCaseHit {
                name: case.name(),
                program: case.template(&names),
            })
        })
    }
}
