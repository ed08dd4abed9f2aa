//! A heuristic NLP toolkit that needs no models or corpora.

use std::collections::{HashMap, HashSet};

use super::lexicon;
use super::traits::{EntitySpan, NlpToolkit, PosTag, TaggedToken};
use crate::error::NlpError;

/// Lexicon and suffix based tokenizer, tagger, lemmatizer and chunker.
///
/// Approximates a Penn Treebank tagger closely enough for short
/// declarative sentences such as "All birds can fly." or
/// "Tweety is not related to Sylvester."
#[derive(Debug, Clone)]
pub struct RuleBasedToolkit {
    verbs: HashMap<&'static str, &'static str>,
    irregular_plurals: HashMap<&'static str, &'static str>,
    auxiliaries: HashSet<&'static str>,
    determiners: HashSet<&'static str>,
    prepositions: HashSet<&'static str>,
    pronouns: HashSet<&'static str>,
    adjectives: HashSet<&'static str>,
    adverbs: HashSet<&'static str>,
    noun_overrides: HashSet<&'static str>,
    stopwords: HashSet<&'static str>,
}

impl Default for RuleBasedToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBasedToolkit {
    /// Create a toolkit with the built-in English lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self {
            verbs: lexicon::VERB_FORMS.iter().copied().collect(),
            irregular_plurals: lexicon::IRREGULAR_PLURALS.iter().copied().collect(),
            auxiliaries: lexicon::AUXILIARIES.iter().copied().collect(),
            determiners: lexicon::DETERMINERS.iter().copied().collect(),
            prepositions: lexicon::PREPOSITIONS.iter().copied().collect(),
            pronouns: lexicon::PRONOUNS.iter().copied().collect(),
            adjectives: lexicon::ADJECTIVES.iter().copied().collect(),
            adverbs: lexicon::ADVERBS.iter().copied().collect(),
            noun_overrides: lexicon::NOUN_OVERRIDES.iter().copied().collect(),
            stopwords: lexicon::STOPWORDS.iter().copied().collect(),
        }
    }

    /// Decide singular vs plural for a noun-looking word from its shape and
    /// the verb that follows it.
    fn noun_number(&self, lower: &str, next: Option<&str>) -> PosTag {
        if self.irregular_plurals.contains_key(lower) {
            return PosTag::PluralNoun;
        }
        let looks_plural = lower.len() > 3
            && lower.ends_with('s')
            && !lower.ends_with("ss")
            && !lower.ends_with("us")
            && !lower.ends_with("is");
        let singular_verb = next
            .map(str::to_lowercase)
            .is_some_and(|n| lexicon::SINGULAR_AGREEMENT.contains(&n.as_str()));
        if looks_plural && !singular_verb {
            PosTag::PluralNoun
        } else {
            PosTag::Noun
        }
    }

    /// Determine the POS tag for the token at `index`.
    fn pos_tag(&self, tokens: &[String], index: usize) -> PosTag {
        let token = &tokens[index];
        let lower = token.to_lowercase();
        let next = tokens.get(index + 1).map(String::as_str);

        if token.chars().count() == 1 && token.chars().all(|c| c.is_ascii_punctuation()) {
            return PosTag::Punctuation;
        }
        if token.chars().all(|c| c.is_ascii_digit() || c == '.')
            && token.chars().any(|c| c.is_ascii_digit())
        {
            return PosTag::Number;
        }
        // Single capital letters name things ("A is greater than B"), except
        // an article opening a sentence.
        if token.len() == 1
            && token != "I"
            && token.chars().all(|c| c.is_ascii_uppercase())
            && (index > 0
                || next.is_some_and(|n| {
                    lexicon::SINGULAR_AGREEMENT.contains(&n.to_lowercase().as_str())
                }))
        {
            return PosTag::ProperNoun;
        }
        if self.determiners.contains(lower.as_str()) {
            return PosTag::Determiner;
        }
        if self.auxiliaries.contains(lower.as_str()) {
            return PosTag::Auxiliary;
        }
        if self.verbs.contains_key(lower.as_str()) {
            return PosTag::Verb;
        }
        if self.prepositions.contains(lower.as_str()) {
            return PosTag::Preposition;
        }
        if matches!(lower.as_str(), "and" | "or" | "but" | "nor") {
            return PosTag::Conjunction;
        }
        if self.pronouns.contains(lower.as_str()) {
            return PosTag::Pronoun;
        }
        if self.adverbs.contains(lower.as_str()) || (lower.len() > 4 && lower.ends_with("ly")) {
            return PosTag::Adverb;
        }
        if self.noun_overrides.contains(lower.as_str()) {
            return self.noun_number(&lower, next);
        }
        if self.adjectives.contains(lower.as_str()) {
            return PosTag::Adjective;
        }

        // Capitalization only signals a name away from the sentence start.
        if index > 0 && token.chars().next().is_some_and(char::is_uppercase) {
            return PosTag::ProperNoun;
        }

        if lower.ends_with("ful")
            || lower.ends_with("less")
            || lower.ends_with("ous")
            || lower.ends_with("ive")
            || lower.ends_with("able")
            || lower.ends_with("ible")
        {
            return PosTag::Adjective;
        }

        self.noun_number(&lower, next)
    }

    fn strip_plural(word: &str) -> String {
        if let Some(stem) = word.strip_suffix("ies")
            && !stem.is_empty()
        {
            return format!("{stem}y");
        }
        for suffix in ["sses", "ches", "shes", "xes", "zes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        match word.strip_suffix('s') {
            Some(stem) if !stem.is_empty() && !word.ends_with("ss") => stem.to_string(),
            _ => word.to_string(),
        }
    }

    fn strip_verb_inflection(word: &str) -> String {
        if let Some(stem) = word.strip_suffix("ing")
            && stem.len() > 2
        {
            return stem.to_string();
        }
        if let Some(stem) = word.strip_suffix("ed")
            && stem.len() > 2
        {
            return stem.to_string();
        }
        Self::strip_plural(word)
    }
}

impl NlpToolkit for RuleBasedToolkit {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, NlpError> {
        let mut tokens = Vec::new();
        let mut word = String::new();

        for c in text.chars() {
            if c.is_alphanumeric() || ((c == '\'' || c == '-') && !word.is_empty()) {
                word.push(c);
                continue;
            }
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            if c.is_ascii_punctuation() {
                tokens.push(c.to_string());
            }
        }
        if !word.is_empty() {
            tokens.push(word);
        }

        // A trailing apostrophe or hyphen belongs to the surrounding punctuation.
        Ok(tokens
            .into_iter()
            .map(|t| {
                if t.len() > 1 && (t.ends_with('\'') || t.ends_with('-')) {
                    t[..t.len() - 1].to_string()
                } else {
                    t
                }
            })
            .collect())
    }

    fn tag(&self, tokens: &[String]) -> Result<Vec<TaggedToken>, NlpError> {
        Ok((0..tokens.len())
            .map(|i| TaggedToken::new(tokens[i].clone(), self.pos_tag(tokens, i)))
            .collect())
    }

    fn lemmatize(&self, word: &str, pos: PosTag) -> String {
        let lower = word.to_lowercase();
        match pos {
            PosTag::Verb => self
                .verbs
                .get(lower.as_str())
                .map_or_else(|| Self::strip_verb_inflection(&lower), |l| (*l).to_string()),
            PosTag::PluralNoun => self
                .irregular_plurals
                .get(lower.as_str())
                .map_or_else(|| Self::strip_plural(&lower), |l| (*l).to_string()),
            _ => lower,
        }
    }

    fn chunk_named_entities(&self, tagged: &[TaggedToken]) -> Result<Vec<EntitySpan>, NlpError> {
        let mut spans = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        let mut flush = |current: &mut Vec<&str>| {
            if !current.is_empty() {
                let label = if current.len() == 1 {
                    "PERSON"
                } else {
                    "ORGANIZATION"
                };
                spans.push(EntitySpan {
                    label: label.to_string(),
                    text: current.join(" "),
                });
                current.clear();
            }
        };

        for token in tagged {
            if token.tag == PosTag::ProperNoun {
                current.push(&token.text);
            } else {
                flush(&mut current);
            }
        }
        flush(&mut current);

        Ok(spans)
    }

    fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }
}
