//! Per-statement analysis and the extraction context shared across a
//! compile request.

use std::collections::HashSet;

use tracing::warn;

use crate::nlp::{EntitySpan, NlpToolkit, PosTag};

/// Copular verbs that introduce an is-statement.
pub const COPULAS: &[&str] = &["is", "are"];

/// Direct negation words.
pub const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "none", "neither", "nor", "nothing", "nowhere",
];

/// Contracted or fused negative verb forms.
pub const NEGATIVE_VERBS: &[&str] = &[
    "isn't", "aren't", "wasn't", "weren't", "don't", "doesn't", "didn't", "won't", "wouldn't",
    "can't", "cannot", "couldn't",
];

/// One token of an analyzed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    /// Lower-cased surface form.
    pub word: String,
    /// Part-of-speech tag.
    pub tag: PosTag,
    /// Lemma used for vocabulary lookups.
    pub lemma: String,
}

/// A statement after tokenization, tagging, lemmatization and entity chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedStatement {
    /// Original text.
    pub text: String,
    /// Tokens in order.
    pub tokens: Vec<AnalyzedToken>,
    /// Named-entity chunks.
    pub named_entities: Vec<EntitySpan>,
}

impl AnalyzedStatement {
    /// Run the NLP toolkit over `text`.
    ///
    /// Toolkit failures never fail the statement: a failed tokenizer yields
    /// no tokens, a failed tagger leaves every tag `Unknown`, and a failed
    /// chunker yields no named entities.
    pub fn analyze(text: &str, toolkit: &dyn NlpToolkit) -> Self {
        let raw = match toolkit.tokenize(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(statement = text, error = %e, "tokenizer unavailable, statement skipped");
                Vec::new()
            }
        };

        let tagged = match toolkit.tag(&raw) {
            Ok(tagged) => tagged,
            Err(e) => {
                if !raw.is_empty() {
                    warn!(statement = text, error = %e, "tagger unavailable, tokens left untagged");
                }
                raw.iter()
                    .map(|t| crate::nlp::TaggedToken::new(t.clone(), PosTag::Unknown))
                    .collect()
            }
        };

        let named_entities = toolkit.chunk_named_entities(&tagged).unwrap_or_else(|e| {
            if !tagged.is_empty() {
                warn!(statement = text, error = %e, "entity chunker unavailable");
            }
            Vec::new()
        });

        let tokens = tagged
            .into_iter()
            .map(|t| AnalyzedToken {
                lemma: toolkit.lemmatize(&t.text, t.tag),
                word: t.text.to_lowercase(),
                tag: t.tag,
            })
            .collect();

        Self {
            text: text.to_string(),
            tokens,
            named_entities,
        }
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the statement has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Lower-cased word at `index`.
    #[must_use]
    pub fn word(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", |t| t.word.as_str())
    }

    /// Index of the first token whose word is in `words`.
    #[must_use]
    pub fn find_any(&self, words: &[&str]) -> Option<usize> {
        self.tokens.iter().position(|t| words.contains(&t.word.as_str()))
    }

    /// Whether any token's word is in `words`.
    #[must_use]
    pub fn contains_any(&self, words: &[&str]) -> bool {
        self.find_any(words).is_some()
    }

    /// Whether the two-word sequence `first second` occurs.
    #[must_use]
    pub fn contains_bigram(&self, first: &str, second: &str) -> bool {
        self.tokens
            .windows(2)
            .any(|w| w[0].word == first && w[1].word == second)
    }

    /// Index of the copula: the first "is", or failing that the first "are".
    #[must_use]
    pub fn copula_index(&self) -> Option<usize> {
        self.find_any(&["is"]).or_else(|| self.find_any(&["are"]))
    }

    /// Whether the token at `index` is a negation marker.
    #[must_use]
    pub fn is_negation_marker(&self, index: usize) -> bool {
        let word = self.word(index);
        NEGATION_WORDS.contains(&word) || NEGATIVE_VERBS.contains(&word) || word == "n't"
    }

    /// Index of the first negation marker.
    #[must_use]
    pub fn first_negation(&self) -> Option<usize> {
        (0..self.len()).find(|&i| self.is_negation_marker(i))
    }

    /// Lemmas joined with single spaces.
    #[must_use]
    pub fn lemma_text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.lemma.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An insertion-ordered set of symbol names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    items: Vec<String>,
    index: HashSet<String>,
}

impl SymbolSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name`; `true` if it was not present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.index.contains(&name) {
            return false;
        }
        self.index.insert(name.clone());
        self.items.push(name);
        true
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Names in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Lower-case identifier for an entity, or `None` if nothing usable remains.
#[must_use]
pub fn constant_name(text: &str) -> Option<String> {
    let mut name = String::with_capacity(text.len());
    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            name.push(c);
        } else if !name.is_empty() && !name.ends_with('_') {
            name.push('_');
        }
    }
    while name.ends_with('_') {
        name.pop();
    }
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => Some(name),
        Some(_) => Some(format!("_{name}")),
        None => None,
    }
}

/// Capitalized function name for a predicate lemma: `mortal` → `Mortal`.
#[must_use]
pub fn predicate_name(lemma: &str) -> Option<String> {
    let base = constant_name(lemma)?;
    let mut chars = base.chars();
    let first = chars.next()?;
    Some(first.to_ascii_uppercase().to_string() + chars.as_str())
}

/// Camel-cased function name for a relation phrase or tag:
/// `greater than` and `greater_than` → `GreaterThan`, `is_a` → `IsA`.
#[must_use]
pub fn relation_name(phrase: &str) -> Option<String> {
    let name: String = phrase
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter_map(constant_name)
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect::<String>()
        .replace('_', "");
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => Some(name),
        _ => None,
    }
}

/// Vocabulary accumulated over every statement of one compile request.
///
/// Entities hold constant names, predicates hold lemmas, and relations hold
/// phrases or tags. Extraction only ever adds to these sets.
#[derive(Debug, Clone, Default)]
pub struct ExtractionContext {
    /// Entity constant names.
    pub entities: SymbolSet,
    /// Predicate lemmas.
    pub predicates: SymbolSet,
    /// Relation phrases and tags.
    pub relations: SymbolSet,
}

impl ExtractionContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity name for the token, if it names a known entity.
    #[must_use]
    pub fn entity(&self, token: &AnalyzedToken) -> Option<String> {
        constant_name(&token.lemma).filter(|name| self.entities.contains(name))
    }

    /// Predicate lemma for the token, if it is a known predicate.
    #[must_use]
    pub fn predicate(&self, token: &AnalyzedToken) -> Option<String> {
        self.predicates
            .contains(&token.lemma)
            .then(|| token.lemma.clone())
    }

    /// Every known relation starting at `index`, longest first, with the
    /// number of tokens each spans.
    #[must_use]
    pub fn relations_at(&self, stmt: &AnalyzedStatement, index: usize) -> Vec<(String, usize)> {
        let mut found: Vec<(String, usize)> = self
            .relations
            .iter()
            .filter_map(|phrase| {
                let words: Vec<&str> = phrase.split(' ').collect();
                if index + words.len() > stmt.len() {
                    return None;
                }
                let matches = words.iter().enumerate().all(|(offset, w)| {
                    let token = &stmt.tokens[index + offset];
                    token.word == *w || (words.len() == 1 && token.lemma == *w)
                });
                matches.then(|| (phrase.to_string(), words.len()))
            })
            .collect();
        found.sort_by(|a, b| b.1.cmp(&a.1));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::{RuleBasedToolkit, UnavailableToolkit};

    #[test]
    fn test_analyze_statement() {
        let toolkit = RuleBasedToolkit::new();
        let stmt = AnalyzedStatement::analyze("All humans are mortal.", &toolkit);
        assert_eq!(stmt.len(), 5);
        assert_eq!(stmt.tokens[1].lemma, "human");
        assert_eq!(stmt.tokens[2].lemma, "be");
        assert_eq!(stmt.copula_index(), Some(2));
        assert_eq!(stmt.lemma_text(), "all human be mortal .");
    }

    #[test]
    fn test_analyze_degrades_without_toolkit() {
        let toolkit = UnavailableToolkit::new("no models");
        let stmt = AnalyzedStatement::analyze("Socrates is a human.", &toolkit);
        assert!(stmt.is_empty());
        assert!(stmt.named_entities.is_empty());
    }

    #[test]
    fn test_negation_markers() {
        let toolkit = RuleBasedToolkit::new();
        let stmt = AnalyzedStatement::analyze("Tweety cannot fly.", &toolkit);
        assert_eq!(stmt.first_negation(), Some(1));
        let stmt = AnalyzedStatement::analyze("Tweety can fly.", &toolkit);
        assert_eq!(stmt.first_negation(), None);
    }

    #[test]
    fn test_symbol_names() {
        assert_eq!(constant_name("Jerry Mouse").as_deref(), Some("jerry_mouse"));
        assert_eq!(constant_name("well-known").as_deref(), Some("well_known"));
        assert_eq!(constant_name("42nd").as_deref(), Some("_42nd"));
        assert_eq!(constant_name("  ..."), None);
        assert_eq!(predicate_name("mortal").as_deref(), Some("Mortal"));
        assert_eq!(relation_name("greater than").as_deref(), Some("GreaterThan"));
        assert_eq!(relation_name("greater_than").as_deref(), Some("GreaterThan"));
        assert_eq!(relation_name("is_a").as_deref(), Some("IsA"));
        assert_eq!(relation_name("related_to").as_deref(), Some("RelatedTo"));
    }

    #[test]
    fn test_symbol_set_keeps_first_insertion_order() {
        let mut set = SymbolSet::new();
        assert!(set.insert("bird"));
        assert!(set.insert("tweety"));
        assert!(!set.insert("bird"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["bird", "tweety"]);
    }

    #[test]
    fn test_relation_prefers_longest_phrase() {
        let toolkit = RuleBasedToolkit::new();
        let stmt = AnalyzedStatement::analyze("A is greater than B", &toolkit);
        let mut ctx = ExtractionContext::new();
        ctx.relations.insert("greater");
        ctx.relations.insert("greater than");
        assert_eq!(
            ctx.relations_at(&stmt, 2),
            vec![("greater than".to_string(), 2), ("greater".to_string(), 1)]
        );
        assert!(ctx.relations_at(&stmt, 1).is_empty());
    }
}
