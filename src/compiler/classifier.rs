//! Statement classification and the five statement translators.

use tracing::debug;

use super::context::{
    AnalyzedStatement, COPULAS, ExtractionContext, predicate_name, relation_name,
};
use super::negation::{NegationKind, detect_negation};
use super::registry::DefinitionRegistry;
use super::special_cases::transitivity;
use crate::logic::{Formula, OBJECT_SORT, Term};

const UNIVERSAL_WORDS: &[&str] = &["all", "every", "any"];
const EXISTENTIAL_WORDS: &[&str] = &["some", "exists"];
const EXISTENTIAL_ANCHORS: &[&str] = &["some", "exists", "there"];
const BE_FORMS: &[&str] = &["is", "are", "be", "been", "was", "were"];

/// Category of a statement. Dispatch is mutually exclusive and follows the
/// declaration order of the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementCategory {
    /// Contains "all", "every" or "any".
    Universal,
    /// Contains "some", "exists", "there is" or "there are".
    Existential,
    /// Contains "is" or "are".
    IsStatement,
    /// Contains both "if" and "then".
    Implication,
    /// Contains a negation marker.
    Negation,
    /// Matches nothing.
    Unclassified,
}

/// Classify `stmt` by its trigger words.
#[must_use]
pub fn classify(stmt: &AnalyzedStatement) -> StatementCategory {
    if stmt.contains_any(UNIVERSAL_WORDS) {
        StatementCategory::Universal
    } else if stmt.contains_any(EXISTENTIAL_WORDS)
        || stmt.contains_bigram("there", "is")
        || stmt.contains_bigram("there", "are")
    {
        StatementCategory::Existential
    } else if stmt.contains_any(COPULAS) {
        StatementCategory::IsStatement
    } else if stmt.contains_any(&["if"]) && stmt.contains_any(&["then"]) {
        StatementCategory::Implication
    } else if stmt.first_negation().is_some() {
        StatementCategory::Negation
    } else {
        StatementCategory::Unclassified
    }
}

/// Translates classified statements into registry declarations and
/// assertions using the vocabulary in an [`ExtractionContext`].
pub struct StatementTranslator<'a> {
    ctx: &'a ExtractionContext,
}

impl<'a> StatementTranslator<'a> {
    /// Create a translator over `ctx`.
    #[must_use]
    pub fn new(ctx: &'a ExtractionContext) -> Self {
        Self { ctx }
    }

    /// Translate one statement. Returns `false` for a translation gap.
    pub fn translate(&self, stmt: &AnalyzedStatement, registry: &mut DefinitionRegistry) -> bool {
        let category = classify(stmt);
        let emitted = match category {
            StatementCategory::Universal => self.translate_universal(stmt, registry),
            StatementCategory::Existential => self.translate_existential(stmt, registry),
            StatementCategory::IsStatement => self.translate_is(stmt, registry),
            StatementCategory::Implication => self.translate_implication(stmt, registry),
            StatementCategory::Negation => self.translate_negation(stmt, registry),
            StatementCategory::Unclassified => false,
        };
        if !emitted {
            debug!(statement = %stmt.text, ?category, "no translation for statement");
        }
        emitted
    }

    fn entity_in(
        &self,
        stmt: &AnalyzedStatement,
        mut range: impl Iterator<Item = usize>,
    ) -> Option<(usize, String)> {
        range.find_map(|i| self.ctx.entity(&stmt.tokens[i]).map(|e| (i, e)))
    }

    fn predicate_in(
        &self,
        stmt: &AnalyzedStatement,
        mut range: impl Iterator<Item = usize>,
    ) -> Option<String> {
        range.find_map(|i| self.ctx.predicate(&stmt.tokens[i]))
    }

    /// `ForAll([x], Implies(Subject(x), Predicate(x)))`
    fn translate_universal(
        &self,
        stmt: &AnalyzedStatement,
        registry: &mut DefinitionRegistry,
    ) -> bool {
        let len = stmt.len();
        let Some(q) = stmt.find_any(UNIVERSAL_WORDS).filter(|&q| q + 1 < len) else {
            return false;
        };
        let Some((subject_idx, subject)) = self.entity_in(stmt, q + 1..len) else {
            return false;
        };
        let start = match stmt.copula_index() {
            Some(c) if c > 0 && c + 1 < len => c + 1,
            _ => subject_idx + 1,
        };
        let Some(predicate) = self.predicate_in(stmt, start..len) else {
            return false;
        };
        let (Some(subject_fn), Some(predicate_fn)) =
            (predicate_name(&subject), predicate_name(&predicate))
        else {
            return false;
        };

        registry.declare_predicate(subject_fn.as_str());
        registry.declare_predicate(predicate_fn.as_str());
        registry.declare_variable("x", OBJECT_SORT);
        registry.assert_checked(Formula::forall(
            ["x"],
            Formula::implies(
                Formula::atom(subject_fn, vec![Term::variable("x")]),
                Formula::atom(predicate_fn, vec![Term::variable("x")]),
            ),
        ))
    }

    /// `Exists([x], And(Subject(x), Predicate(x)))`
    fn translate_existential(
        &self,
        stmt: &AnalyzedStatement,
        registry: &mut DefinitionRegistry,
    ) -> bool {
        let len = stmt.len();
        let Some(q) = stmt.find_any(EXISTENTIAL_ANCHORS).filter(|&q| q + 1 < len) else {
            return false;
        };
        let Some((_, subject)) = self.entity_in(stmt, q + 1..len) else {
            return false;
        };
        let Some(predicate) = self.predicate_in(stmt, (0..len).filter(|&i| i != q)) else {
            return false;
        };
        let (Some(subject_fn), Some(predicate_fn)) =
            (predicate_name(&subject), predicate_name(&predicate))
        else {
            return false;
        };

        registry.declare_predicate(subject_fn.as_str());
        registry.declare_predicate(predicate_fn.as_str());
        registry.declare_variable("x", OBJECT_SORT);
        registry.assert_checked(Formula::exists(
            ["x"],
            Formula::And(vec![
                Formula::atom(subject_fn, vec![Term::variable("x")]),
                Formula::atom(predicate_fn, vec![Term::variable("x")]),
            ]),
        ))
    }

    /// `Predicate(subject)`, `Relation(subject, object)`, or a bare constant.
    /// A negation marker between the copula and the complement negates the
    /// assertion.
    fn translate_is(&self, stmt: &AnalyzedStatement, registry: &mut DefinitionRegistry) -> bool {
        let len = stmt.len();
        let Some(copula) = stmt.copula_index().filter(|&c| c > 0 && c + 1 < len) else {
            return false;
        };
        let Some((_, subject)) = self.entity_in(stmt, (0..copula).rev()) else {
            return false;
        };
        let Some((index, complement)) = self.complement(stmt, copula + 1) else {
            return false;
        };
        let negated = (copula + 1..index).any(|i| stmt.is_negation_marker(i));
        let polarity = |f: Formula| if negated { f.negate() } else { f };

        registry.declare_object(subject.as_str());
        match complement {
            Complement::Predicate(lemma) => {
                let Some(name) = predicate_name(&lemma) else {
                    return false;
                };
                registry.declare_predicate(name.as_str());
                registry.assert_checked(polarity(Formula::atom(
                    name,
                    vec![Term::constant(subject)],
                )))
            }
            Complement::Relation { phrase, object } => {
                let Some(name) = relation_name(&phrase) else {
                    return false;
                };
                registry.declare_object(object.as_str());
                registry.declare_relation(name.as_str());
                registry.assert_checked(polarity(Formula::atom(
                    name,
                    vec![Term::constant(subject), Term::constant(object)],
                )))
            }
            Complement::Entity(entity) => {
                // Mentioned, not related: declare only.
                registry.declare_object(entity);
                false
            }
        }
    }

    /// Longest known relation at `index` that is followed by an entity,
    /// with that entity.
    fn related_object(
        &self,
        stmt: &AnalyzedStatement,
        index: usize,
        multi_word: bool,
    ) -> Option<(String, String)> {
        self.ctx
            .relations_at(stmt, index)
            .into_iter()
            .filter(|(_, span)| !multi_word || *span > 1)
            .find_map(|(phrase, span)| {
                self.entity_in(stmt, index + span..stmt.len())
                    .map(|(_, object)| (phrase, object))
            })
    }

    /// First complement at or after `from`: a multi-word relation phrase,
    /// then a predicate, an entity, or a single-word relation.
    fn complement(&self, stmt: &AnalyzedStatement, from: usize) -> Option<(usize, Complement)> {
        (from..stmt.len()).find_map(|i| {
            let token = &stmt.tokens[i];
            let complement = if let Some((phrase, object)) = self.related_object(stmt, i, true) {
                Complement::Relation { phrase, object }
            } else if let Some(lemma) = self.ctx.predicate(token) {
                Complement::Predicate(lemma)
            } else if let Some(entity) = self.ctx.entity(token) {
                Complement::Entity(entity)
            } else if let Some((phrase, object)) = self.related_object(stmt, i, false) {
                Complement::Relation { phrase, object }
            } else {
                return None;
            };
            Some((i, complement))
        })
    }

    fn relations_in(&self, stmt: &AnalyzedStatement, range: std::ops::Range<usize>) -> Vec<String> {
        range
            .filter_map(|i| {
                self.ctx
                    .relations_at(stmt, i)
                    .into_iter()
                    .find(|(_, span)| *span == 1)
                    .map(|(phrase, _)| phrase)
            })
            .collect()
    }

    /// Transitivity axiom when single-word relations appear on both sides
    /// of "if ... then ...".
    fn translate_implication(
        &self,
        stmt: &AnalyzedStatement,
        registry: &mut DefinitionRegistry,
    ) -> bool {
        let Some(if_idx) = stmt.find_any(&["if"]) else {
            return false;
        };
        let Some(then_idx) = (if_idx + 1..stmt.len()).find(|&i| stmt.word(i) == "then") else {
            return false;
        };
        let antecedent = self.relations_in(stmt, if_idx + 1..then_idx);
        let consequent = self.relations_in(stmt, then_idx + 1..stmt.len());
        let (Some(relation), false) = (antecedent.first(), consequent.is_empty()) else {
            return false;
        };
        let Some(name) = relation_name(relation) else {
            return false;
        };

        registry.declare_relation(name.as_str());
        for var in ["x", "y", "z"] {
            registry.declare_variable(var, OBJECT_SORT);
        }
        registry.assert_checked(transitivity(&name))
    }

    fn translate_negation(
        &self,
        stmt: &AnalyzedStatement,
        registry: &mut DefinitionRegistry,
    ) -> bool {
        let desc = detect_negation(stmt);
        if !desc.has_negation {
            return false;
        }

        match (desc.kind, &desc.entity, &desc.predicate, &desc.object) {
            (NegationKind::Predicate, Some(entity), Some(lemma), _)
                if self.ctx.predicates.contains(lemma) =>
            {
                if let Some(name) = predicate_name(lemma) {
                    registry.declare_object(entity.as_str());
                    registry.declare_predicate(name.as_str());
                    return registry.assert_checked(
                        Formula::atom(name, vec![Term::constant(entity.as_str())]).negate(),
                    );
                }
            }
            (NegationKind::Relation, Some(entity), Some(tag), Some(object)) => {
                if let Some(name) = relation_name(tag) {
                    registry.declare_object(entity.as_str());
                    registry.declare_object(object.as_str());
                    registry.declare_relation(name.as_str());
                    return registry.assert_checked(
                        Formula::atom(
                            name,
                            vec![Term::constant(entity.as_str()), Term::constant(object.as_str())],
                        )
                        .negate(),
                    );
                }
            }
            (NegationKind::Conjunction, ..) if desc.conjunction.len() == 2 => {
                return self.translate_neither_nor(stmt, &desc.conjunction, registry);
            }
            _ => {}
        }

        self.translate_negation_fallback(stmt, registry)
    }

    /// `And(Not(P(a)), Not(P(b)))` for "neither a nor b ...".
    fn translate_neither_nor(
        &self,
        stmt: &AnalyzedStatement,
        targets: &[String],
        registry: &mut DefinitionRegistry,
    ) -> bool {
        let predicate = stmt.tokens.iter().find_map(|t| {
            (t.tag.is_predicative() && !BE_FORMS.contains(&t.word.as_str()))
                .then(|| self.ctx.predicate(t))
                .flatten()
        });
        let Some(name) = predicate.as_deref().and_then(predicate_name) else {
            return false;
        };

        registry.declare_predicate(name.as_str());
        for target in targets {
            registry.declare_object(target.as_str());
        }
        registry.assert_checked(Formula::And(
            targets
                .iter()
                .map(|t| Formula::atom(name.as_str(), vec![Term::constant(t.as_str())]).negate())
                .collect(),
        ))
    }

    /// `Not(P(subject))` with the first entity before the marker and the
    /// first predicate after it.
    fn translate_negation_fallback(
        &self,
        stmt: &AnalyzedStatement,
        registry: &mut DefinitionRegistry,
    ) -> bool {
        let Some((subject, predicate)) = self.negated_predication(stmt) else {
            return false;
        };
        let Some(name) = predicate_name(&predicate) else {
            return false;
        };
        registry.declare_object(subject.as_str());
        registry.declare_predicate(name.as_str());
        registry.assert_checked(Formula::atom(name, vec![Term::constant(subject)]).negate())
    }

    /// First entity before the first negation marker and first predicate
    /// after it.
    #[must_use]
    pub fn negated_predication(&self, stmt: &AnalyzedStatement) -> Option<(String, String)> {
        let marker = stmt.first_negation()?;
        let (_, subject) = self.entity_in(stmt, 0..marker)?;
        let predicate = self.predicate_in(stmt, marker + 1..stmt.len())?;
        Some((subject, predicate))
    }

    /// Translate a conclusion: the negated form first, then the is/are form
    /// with the nearest entity before the copula as subject.
    #[must_use]
    pub fn translate_conclusion(&self, stmt: &AnalyzedStatement) -> Option<Formula> {
        if let Some((subject, predicate)) = self.negated_predication(stmt) {
            let name = predicate_name(&predicate)?;
            return Some(Formula::atom(name, vec![Term::constant(subject)]).negate());
        }

        let len = stmt.len();
        let copula = stmt.copula_index().filter(|&c| c + 1 < len)?;
        let (_, subject) = self.entity_in(stmt, (0..copula).rev())?;
        (copula + 1..len).find_map(|i| {
            let relation = |multi_word| {
                let (phrase, object) = self.related_object(stmt, i, multi_word)?;
                Some(Formula::atom(
                    relation_name(&phrase)?,
                    vec![Term::constant(subject.as_str()), Term::constant(object)],
                ))
            };
            relation(true)
                .or_else(|| {
                    let lemma = self.ctx.predicate(&stmt.tokens[i])?;
                    Some(Formula::atom(
                        predicate_name(&lemma)?,
                        vec![Term::constant(subject.as_str())],
                    ))
                })
                .or_else(|| relation(false))
        })
    }
}

enum Complement {
    Predicate(String),
    Entity(String),
    Relation { phrase: String, object: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::extractor::VocabularyExtractor;
    use crate::nlp::RuleBasedToolkit;

    struct Fixture {
        toolkit: RuleBasedToolkit,
        ctx: ExtractionContext,
    }

    impl Fixture {
        fn new(statements: &[&str]) -> Self {
            let toolkit = RuleBasedToolkit::new();
            let mut ctx = ExtractionContext::new();
            let extractor = VocabularyExtractor::new(&toolkit, &[]);
            for text in statements {
                extractor.extract(&AnalyzedStatement::analyze(text, &toolkit), &mut ctx);
            }
            Self { toolkit, ctx }
        }

        fn analyze(&self, text: &str) -> AnalyzedStatement {
            AnalyzedStatement::analyze(text, &self.toolkit)
        }

        fn translate(&self, text: &str) -> Vec<String> {
            let mut registry = DefinitionRegistry::new();
            StatementTranslator::new(&self.ctx).translate(&self.analyze(text), &mut registry);
            registry.statements().iter().map(ToString::to_string).collect()
        }
    }

    #[test]
    fn test_classification_precedence() {
        let fx = Fixture::new(&[]);
        let cases = [
            ("All humans are mortal.", StatementCategory::Universal),
            ("Some birds are red.", StatementCategory::Existential),
            ("There is a cat.", StatementCategory::Existential),
            ("Socrates is a human.", StatementCategory::IsStatement),
            ("If it rains then grass grows.", StatementCategory::Implication),
            ("Tweety can not fly.", StatementCategory::Negation),
            ("Tweety sings.", StatementCategory::Unclassified),
        ];
        for (text, expected) in cases {
            assert_eq!(classify(&fx.analyze(text)), expected, "{text}");
        }
    }

    #[test]
    fn test_universal_with_copula() {
        let fx = Fixture::new(&["All humans are mortal."]);
        assert_eq!(
            fx.translate("All humans are mortal."),
            vec![
                "declare-predicate Human Object",
                "declare-predicate Mortal Object",
                "declare-variable x Object",
                "assert ForAll([x], Implies(Human(x), Mortal(x)))",
            ]
        );
    }

    #[test]
    fn test_universal_without_copula() {
        let fx = Fixture::new(&["All birds can fly."]);
        let lines = fx.translate("All birds can fly.");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("assert ForAll([x], Implies(Bird(x), Fly(x)))")
        );
    }

    #[test]
    fn test_existential() {
        let fx = Fixture::new(&["Some birds can swim."]);
        let lines = fx.translate("Some birds can swim.");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("assert Exists([x], And(Bird(x), Swim(x)))")
        );
    }

    #[test]
    fn test_is_statement_predicate() {
        let fx = Fixture::new(&["Socrates is mortal."]);
        assert_eq!(
            fx.translate("Socrates is mortal."),
            vec![
                "declare-constant socrates Object",
                "declare-predicate Mortal Object",
                "assert Mortal(socrates)",
            ]
        );
    }

    #[test]
    fn test_is_statement_negated_predicate() {
        let fx = Fixture::new(&["Socrates is not happy."]);
        let lines = fx.translate("Socrates is not happy.");
        assert_eq!(lines.last().map(String::as_str), Some("assert Not(Happy(socrates))"));
    }

    #[test]
    fn test_is_statement_relation_phrase() {
        let fx = Fixture::new(&["Alice is the parent of Bob."]);
        let lines = fx.translate("Alice is the parent of Bob.");
        assert!(lines.contains(&"declare-relation ParentOf Object Object".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("assert ParentOf(alice, bob)"));
    }

    #[test]
    fn test_is_statement_bare_entity_declares_only() {
        let fx = Fixture::new(&["Tweety is a bird."]);
        assert_eq!(
            fx.translate("Tweety is a bird."),
            vec!["declare-constant tweety Object", "declare-constant bird Object"]
        );
    }

    #[test]
    fn test_implication_transitivity() {
        let fx = Fixture::new(&["If x contains y and y contains z then x contains z."]);
        let lines = fx.translate("If x contains y and y contains z then x contains z.");
        assert_eq!(
            lines.last().map(String::as_str),
            Some(
                "assert ForAll([x, y, z], Implies(And(Contains(x, y), Contains(y, z)), Contains(x, z)))"
            )
        );
    }

    #[test]
    fn test_negation_predicate() {
        let fx = Fixture::new(&["Tweety can not fly."]);
        let lines = fx.translate("Tweety can not fly.");
        assert_eq!(lines.last().map(String::as_str), Some("assert Not(Fly(tweety))"));
    }

    #[test]
    fn test_negation_neither_nor() {
        let fx = Fixture::new(&["Neither Tom nor Jerry can fly."]);
        let lines = fx.translate("Neither Tom nor Jerry can fly.");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("assert And(Not(Fly(tom)), Not(Fly(jerry)))")
        );
    }

    #[test]
    fn test_negation_relation() {
        let fx = Fixture::new(&["Tweety isn't linked to Sylvester."]);
        let lines = fx.translate("Tweety isn't linked to Sylvester.");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("assert Not(LinkedTo(tweety, sylvester))")
        );
    }

    #[test]
    fn test_unclassified_is_gap() {
        let fx = Fixture::new(&["Tweety sings."]);
        assert!(fx.translate("Tweety sings.").is_empty());
    }

    #[test]
    fn test_conclusion_forms() {
        let fx = Fixture::new(&[
            "Tweety can not fly.",
            "Socrates is mortal.",
            "A is greater than B.",
        ]);
        let translator = StatementTranslator::new(&fx.ctx);
        assert_eq!(
            translator
                .translate_conclusion(&fx.analyze("Tweety can not fly."))
                .map(|f| f.to_string()),
            Some("Not(Fly(tweety))".to_string())
        );
        assert_eq!(
            translator
                .translate_conclusion(&fx.analyze("Socrates is mortal."))
                .map(|f| f.to_string()),
            Some("Mortal(socrates)".to_string())
        );
        assert_eq!(
            translator
                .translate_conclusion(&fx.analyze("A is greater than B."))
                .map(|f| f.to_string()),
            Some("GreaterThan(a, b)".to_string())
        );
        assert_eq!(translator.translate_conclusion(&fx.analyze("Hello there.")), None);
    }
}
