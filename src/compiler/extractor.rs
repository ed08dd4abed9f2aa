//! Entity, predicate and relation-phrase extraction.

use super::context::{AnalyzedStatement, ExtractionContext, constant_name, predicate_name};
use crate::nlp::{NlpToolkit, PosTag};

/// Quantifier words never treated as entities.
pub const QUANTIFIER_WORDS: &[&str] = &["all", "every", "some", "any"];

/// Relation phrases recognized anywhere in a statement.
pub const RELATION_PHRASES: &[&str] = &[
    "greater than",
    "less than",
    "equal to",
    "parent of",
    "child of",
    "subset of",
    "element of",
    "member of",
    "belongs to",
    "contains",
    "includes",
    "part of",
    "related to",
    "connected to",
    "linked to",
];

/// Relation tag recorded for class-membership phrasing ("is a", "are the").
pub const IS_A_TAG: &str = "is_a";

/// Adds one statement's vocabulary to an [`ExtractionContext`].
pub struct VocabularyExtractor<'a> {
    toolkit: &'a dyn NlpToolkit,
    extra_phrases: &'a [String],
}

impl<'a> VocabularyExtractor<'a> {
    /// Create an extractor using `toolkit` for stopword checks and
    /// `extra_phrases` alongside the built-in relation phrases.
    #[must_use]
    pub fn new(toolkit: &'a dyn NlpToolkit, extra_phrases: &'a [String]) -> Self {
        Self {
            toolkit,
            extra_phrases,
        }
    }

    /// Extract entities, predicates and relations from `stmt` into `ctx`.
    pub fn extract(&self, stmt: &AnalyzedStatement, ctx: &mut ExtractionContext) {
        self.extract_named_entities(stmt, ctx);
        self.extract_words(stmt, ctx);
        Self::extract_chunk_relations(stmt, ctx);
        Self::extract_binary_relations(stmt, ctx);
        self.extract_phrases(stmt, ctx);

        if COPULA_ARTICLE
            .iter()
            .any(|(verb, article)| stmt.contains_bigram(verb, article))
        {
            ctx.relations.insert(IS_A_TAG);
        }
    }

    fn extract_named_entities(&self, stmt: &AnalyzedStatement, ctx: &mut ExtractionContext) {
        for span in &stmt.named_entities {
            let text = span.text.to_lowercase();
            if self.toolkit.is_stopword(&text) {
                continue;
            }
            if let Some(name) = constant_name(&text) {
                ctx.entities.insert(name);
            }
        }
    }

    fn extract_words(&self, stmt: &AnalyzedStatement, ctx: &mut ExtractionContext) {
        for token in &stmt.tokens {
            // Names survive the stopword filter ("A is greater than B").
            let stopword =
                self.toolkit.is_stopword(&token.word) && token.tag != PosTag::ProperNoun;
            if stopword || QUANTIFIER_WORDS.contains(&token.word.as_str()) {
                continue;
            }
            if token.tag.is_noun() {
                if let Some(name) = constant_name(&token.lemma) {
                    ctx.entities.insert(name);
                }
            } else if (token.tag.is_verb() || token.tag.is_adjective())
                && predicate_name(&token.lemma).is_some()
            {
                ctx.predicates.insert(token.lemma.clone());
            }
        }
    }

    /// Noun-Verb-Noun, Noun-Preposition-Noun and Noun-Adjective-Noun chunks.
    fn extract_chunk_relations(stmt: &AnalyzedStatement, ctx: &mut ExtractionContext) {
        for window in stmt.tokens.windows(3) {
            let middle = window[1].tag;
            if window[0].tag.is_noun()
                && window[2].tag.is_noun()
                && (middle.is_verb() || middle.is_adjective() || middle == PosTag::Preposition)
            {
                let phrase = window
                    .iter()
                    .map(|t| t.word.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                ctx.relations.insert(phrase);
            }
        }
    }

    /// Verb between two known entities, and preposition-plus-article
    /// between two known entities ("in the").
    fn extract_binary_relations(stmt: &AnalyzedStatement, ctx: &mut ExtractionContext) {
        let tokens = &stmt.tokens;
        for i in 0..tokens.len().saturating_sub(2) {
            if tokens[i].tag.is_noun() && tokens[i + 1].tag.is_verb() && tokens[i + 2].tag.is_noun()
            {
                if ctx.entity(&tokens[i]).is_some() && ctx.entity(&tokens[i + 2]).is_some() {
                    ctx.relations.insert(tokens[i + 1].word.clone());
                }
            } else if i + 3 < tokens.len()
                && tokens[i].tag.is_noun()
                && tokens[i + 1].tag == PosTag::Preposition
                && tokens[i + 2].tag == PosTag::Determiner
                && tokens[i + 3].tag.is_noun()
                && ctx.entity(&tokens[i]).is_some()
                && ctx.entity(&tokens[i + 3]).is_some()
            {
                ctx.relations
                    .insert(format!("{} {}", tokens[i + 1].word, tokens[i + 2].word));
            }
        }
    }

    fn extract_phrases(&self, stmt: &AnalyzedStatement, ctx: &mut ExtractionContext) {
        let text = stmt.text.to_lowercase();
        let phrases = RELATION_PHRASES
            .iter()
            .copied()
            .chain(self.extra_phrases.iter().map(String::as_str));
        for phrase in phrases {
            if !phrase.is_empty() && text.contains(phrase) {
                ctx.relations.insert(phrase);
            }
        }
    }
}

const COPULA_ARTICLE: &[(&str, &str)] = &[
    ("is", "a"),
    ("is", "an"),
    ("is", "the"),
    ("are", "a"),
    ("are", "an"),
    ("are", "the"),
];
