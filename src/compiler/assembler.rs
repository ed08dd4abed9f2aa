//! The logic program assembler: natural-language premises and a
//! conclusion in, a declaration-ordered [`ProgramFragment`] out.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::classifier::StatementTranslator;
use super::context::{
    AnalyzedStatement, ExtractionContext, predicate_name, relation_name,
};
use super::extractor::VocabularyExtractor;
use super::patterns::{RelationKind, RelationMatcher, SemanticRelation};
use super::registry::DefinitionRegistry;
use super::special_cases::SpecialCaseLibrary;
use crate::config::{CompilerConfig, ConclusionPolicy};
use crate::error::CompileError;
use crate::logic::{Formula, OBJECT_SORT, ProgramFragment, Term};
use crate::nlp::{NlpToolkit, RuleBasedToolkit};

/// Relation used for identity triples ("X is Y", "X is not Y").
const EQUAL_RELATION: &str = "Equal";

/// Output of a compile request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProgram {
    /// Typed program and conclusion.
    pub program: ProgramFragment,
    /// Program statements rendered one per line.
    pub premises: Vec<String>,
    /// Conclusion formula rendered as text.
    pub conclusion: String,
    /// Semantic triples found in the input, in discovery order.
    pub relations: Vec<SemanticRelation>,
    /// Name of the special case that produced the program, if any.
    pub special_case: Option<String>,
}

impl CompiledProgram {
    fn from_program(
        program: ProgramFragment,
        relations: Vec<SemanticRelation>,
        special_case: Option<&str>,
    ) -> Self {
        Self {
            premises: program.premise_lines(),
            conclusion: program.conclusion.to_string(),
            program,
            relations,
            special_case: special_case.map(str::to_string),
        }
    }
}

/// Compiles natural-language arguments into first-order logic programs.
///
/// Every call builds its own registry and extraction context, so one
/// compiler can serve concurrent requests.
pub struct LogicCompiler {
    config: CompilerConfig,
    toolkit: Arc<dyn NlpToolkit>,
    library: SpecialCaseLibrary,
    matcher: RelationMatcher,
}

impl Default for LogicCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl LogicCompiler {
    /// Create a compiler with the rule-based toolkit and the standard
    /// special-case library.
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        let library = SpecialCaseLibrary::standard(config.special_cases);
        Self {
            config,
            toolkit: Arc::new(RuleBasedToolkit::new()),
            library,
            matcher: RelationMatcher::new(),
        }
    }

    /// Use a different NLP toolkit.
    #[must_use]
    pub fn with_toolkit(mut self, toolkit: Arc<dyn NlpToolkit>) -> Self {
        self.toolkit = toolkit;
        self
    }

    /// Replace the special-case library.
    #[must_use]
    pub fn with_library(mut self, library: SpecialCaseLibrary) -> Self {
        self.library = library;
        self
    }

    /// Get the compiler configuration.
    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `premises` and `conclusion` into a program.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::NoPremises`] or [`CompileError::NoConclusion`]
    /// for blank input, and [`CompileError::UnrecognizedConclusion`] when the
    /// conclusion matches no pattern under [`ConclusionPolicy::Reject`].
    pub fn compile(
        &self,
        premises: &[String],
        conclusion: &str,
    ) -> Result<CompiledProgram, CompileError> {
        let premises: Vec<String> = premises
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if premises.is_empty() {
            return Err(CompileError::NoPremises);
        }
        let conclusion = conclusion.trim();
        if conclusion.is_empty() {
            return Err(CompileError::NoConclusion);
        }

        if let Some(hit) = self.library.resolve(&premises, conclusion) {
            tracing::info!(case = hit.name, "compiled from special case");
            return Ok(CompiledProgram::from_program(
                hit.program,
                Vec::new(),
                Some(hit.name),
            ));
        }

        let toolkit = self.toolkit.as_ref();
        let analyzed: Vec<AnalyzedStatement> = premises
            .iter()
            .map(|p| AnalyzedStatement::analyze(p, toolkit))
            .collect();
        let goal = AnalyzedStatement::analyze(conclusion, toolkit);

        let mut ctx = ExtractionContext::new();
        let mut relations = Vec::new();
        let extractor = VocabularyExtractor::new(toolkit, &self.config.extra_relation_phrases);
        for stmt in analyzed.iter().chain(std::iter::once(&goal)) {
            extractor.extract(stmt, &mut ctx);
            relations.extend(self.matcher.find(stmt));
        }
        for relation in &relations {
            ctx.relations.insert(relation.kind.tag());
        }
        tracing::debug!(
            entities = ctx.entities.len(),
            predicates = ctx.predicates.len(),
            relations = ctx.relations.len(),
            triples = relations.len(),
            "vocabulary extracted"
        );

        let mut registry = DefinitionRegistry::new();
        registry.declare_sort(OBJECT_SORT);
        Self::declare_vocabulary(&ctx, &mut registry);

        let mut seen = HashSet::new();
        for relation in &relations {
            if seen.insert(relation)
                && ctx.entities.contains(&relation.subject)
                && ctx.entities.contains(&relation.object)
            {
                Self::assert_triple(relation, &mut registry);
            }
        }

        let translator = StatementTranslator::new(&ctx);
        let translated = analyzed
            .iter()
            .filter(|stmt| translator.translate(stmt, &mut registry))
            .count();
        tracing::debug!(
            premises = analyzed.len(),
            translated,
            "premises classified"
        );

        let formula = match translator.translate_conclusion(&goal) {
            Some(formula) if registry.accepts_formula(&formula) => formula,
            _ => match self.config.conclusion_policy {
                ConclusionPolicy::Reject => {
                    return Err(CompileError::UnrecognizedConclusion(
                        conclusion.to_string(),
                    ));
                }
                ConclusionPolicy::AssumeTrue => {
                    tracing::warn!(conclusion, "unrecognized conclusion, assuming True");
                    Formula::True
                }
            },
        };

        let program = ProgramFragment::new(registry.into_statements(), formula);
        Ok(CompiledProgram::from_program(program, relations, None))
    }

    /// Declare entities, predicates and relations in first-seen order.
    fn declare_vocabulary(ctx: &ExtractionContext, registry: &mut DefinitionRegistry) {
        for entity in ctx.entities.iter() {
            registry.declare_object(entity);
        }
        for name in ctx.predicates.iter().filter_map(predicate_name) {
            registry.declare_predicate(name);
        }
        for name in ctx.relations.iter().filter_map(relation_name) {
            registry.declare_relation(name);
        }
    }

    fn assert_triple(relation: &SemanticRelation, registry: &mut DefinitionRegistry) {
        let pair = || {
            vec![
                Term::constant(relation.subject.as_str()),
                Term::constant(relation.object.as_str()),
            ]
        };
        let formula = match &relation.kind {
            RelationKind::Equal => {
                registry.declare_relation(EQUAL_RELATION);
                Formula::atom(EQUAL_RELATION, pair())
            }
            RelationKind::NotEqual => {
                registry.declare_relation(EQUAL_RELATION);
                Formula::atom(EQUAL_RELATION, pair()).negate()
            }
            RelationKind::SubsetOf => {
                let (Some(subset), Some(superset)) = (
                    predicate_name(&relation.subject),
                    predicate_name(&relation.object),
                ) else {
                    return;
                };
                registry.declare_predicate(subset.as_str());
                registry.declare_predicate(superset.as_str());
                registry.declare_variable("x", OBJECT_SORT);
                Formula::forall(
                    ["x"],
                    Formula::implies(
                        Formula::atom(subset, vec![Term::variable("x")]),
                        Formula::atom(superset, vec![Term::variable("x")]),
                    ),
                )
            }
            kind => {
                let Some(name) = relation_name(kind.tag()) else {
                    return;
                };
                registry.declare_relation(name.as_str());
                Formula::atom(name, pair())
            }
        };
        registry.assert_checked(formula);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpecialCaseMode;
    use crate::nlp::UnavailableToolkit;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn generic(policy: ConclusionPolicy) -> LogicCompiler {
        LogicCompiler::new(
            CompilerConfig::default()
                .with_special_cases(SpecialCaseMode::Disabled)
                .with_conclusion_policy(policy),
        )
    }

    #[test]
    fn test_blank_input_rejected() {
        let compiler = LogicCompiler::default();
        assert_eq!(
            compiler.compile(&strings(&["", "   "]), "Socrates is mortal."),
            Err(CompileError::NoPremises)
        );
        assert_eq!(
            compiler.compile(&strings(&["Socrates is a human."]), "  "),
            Err(CompileError::NoConclusion)
        );
    }

    #[test]
    fn test_special_case_short_circuits() {
        let compiled = LogicCompiler::default()
            .compile(
                &strings(&["All humans are mortal.", "Socrates is a human."]),
                "Socrates is mortal.",
            )
            .unwrap();
        assert_eq!(compiled.special_case.as_deref(), Some("socrates_mortality"));
        assert_eq!(compiled.conclusion, "Mortal(socrates)");
        assert!(compiled.relations.is_empty());
    }

    #[test]
    fn test_generic_pipeline_program() {
        let compiled = generic(ConclusionPolicy::Reject)
            .compile(
                &strings(&["All birds can fly.", "Tweety is a bird."]),
                "Tweety cannot fly.",
            )
            .unwrap();

        assert_eq!(compiled.special_case, None);
        assert_eq!(compiled.premises[0], "declare-sort Object");
        assert!(compiled
            .premises
            .contains(&"assert ForAll([x], Implies(Bird(x), Fly(x)))".to_string()));
        assert!(compiled.premises.contains(&"assert Equal(tweety, bird)".to_string()));
        assert_eq!(compiled.conclusion, "Not(Fly(tweety))");
        assert!(compiled.program.forward_references().is_empty());
    }

    #[test]
    fn test_conclusion_policy() {
        let premises = strings(&["Socrates is mortal."]);
        assert_eq!(
            generic(ConclusionPolicy::Reject).compile(&premises, "Hello there."),
            Err(CompileError::UnrecognizedConclusion("Hello there.".into()))
        );
        let compiled = generic(ConclusionPolicy::AssumeTrue)
            .compile(&premises, "Hello there.")
            .unwrap();
        assert_eq!(compiled.program.conclusion, Formula::True);
        assert!(compiled.premises.contains(&"assert Mortal(socrates)".to_string()));
    }

    #[test]
    fn test_duplicate_triples_asserted_once() {
        let compiled = generic(ConclusionPolicy::AssumeTrue)
            .compile(&strings(&["Tom has a ball.", "Tom has a ball."]), "Tom has a ball.")
            .unwrap();
        assert_eq!(compiled.relations.len(), 3);
        let asserted: Vec<_> = compiled
            .premises
            .iter()
            .filter(|line| line.starts_with("assert Has("))
            .collect();
        assert_eq!(asserted, vec!["assert Has(tom, ball)"]);
    }

    #[test]
    fn test_subset_triple_becomes_universal() {
        let compiled = generic(ConclusionPolicy::AssumeTrue)
            .compile(&strings(&["All cats are animals."]), "Tom is an animal.")
            .unwrap();
        assert!(compiled
            .premises
            .contains(&"assert ForAll([x], Implies(Cat(x), Animal(x)))".to_string()));
    }

    #[test]
    fn test_unavailable_toolkit_degrades() {
        let compiler = generic(ConclusionPolicy::AssumeTrue)
            .with_toolkit(Arc::new(UnavailableToolkit::new("not installed")));
        let compiled = compiler
            .compile(&strings(&["Socrates is a human."]), "Socrates is mortal.")
            .unwrap();
        assert_eq!(compiled.premises, vec!["declare-sort Object"]);
        assert_eq!(compiled.program.conclusion, Formula::True);
    }

    #[test]
    fn test_unavailable_toolkit_still_serves_special_cases() {
        let compiler = LogicCompiler::default()
            .with_toolkit(Arc::new(UnavailableToolkit::new("not installed")));
        let compiled = compiler
            .compile(&strings(&["All birds can fly."]), "The bird cannot fly.")
            .unwrap();
        assert_eq!(compiled.special_case.as_deref(), Some("bird_flight"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        const SENTENCES: &[&str] = &[
            "All humans are mortal.",
            "Socrates is a human.",
            "Socrates is not happy.",
            "Some birds can swim.",
            "Tweety can not fly.",
            "Neither Tom nor Jerry can fly.",
            "Alice is the parent of Bob.",
            "A is greater than B.",
            "All cats are animals.",
            "Tom has a ball.",
            "If x contains y and y contains z then x contains z.",
            "Tweety isn't linked to Sylvester.",
            "There is no cat.",
        ];

        fn sentences() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec(prop::sample::select(SENTENCES), 1..6)
                .prop_map(|picked| picked.into_iter().map(str::to_string).collect())
        }

        proptest! {
            /// Every symbol is declared exactly once, before any use.
            #[test]
            fn programs_are_declaration_ordered(
                premises in sentences(),
                conclusion in prop::sample::select(SENTENCES),
            ) {
                let compiled = generic(ConclusionPolicy::AssumeTrue)
                    .compile(&premises, conclusion)
                    .unwrap();
                prop_assert!(compiled.program.forward_references().is_empty(),
                    "forward references in {}", compiled.program);

                let mut names = HashSet::new();
                for decl in compiled.program.declarations() {
                    prop_assert!(names.insert(decl.name().to_string()),
                        "{} declared twice", decl.name());
                }
            }

            /// Repeating the premises adds nothing to the program.
            #[test]
            fn repeated_premises_are_idempotent(premises in sentences()) {
                let compiler = generic(ConclusionPolicy::AssumeTrue);
                let once = compiler.compile(&premises, "Socrates is mortal.").unwrap();
                let doubled: Vec<String> =
                    premises.iter().chain(premises.iter()).cloned().collect();
                let twice = compiler.compile(&doubled, "Socrates is mortal.").unwrap();
                prop_assert_eq!(once.program, twice.program);
            }
        }
    }
}
