//! The NLP capability consumed by the compiler.

use serde::{Deserialize, Serialize};

use crate::error::NlpError;

/// Part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    /// Singular or mass noun.
    Noun,
    /// Plural noun.
    PluralNoun,
    /// Proper noun.
    ProperNoun,
    /// Verb.
    Verb,
    /// Adjective.
    Adjective,
    /// Adverb.
    Adverb,
    /// Pronoun.
    Pronoun,
    /// Determiner.
    Determiner,
    /// Preposition.
    Preposition,
    /// Conjunction.
    Conjunction,
    /// Modal or auxiliary verb.
    Auxiliary,
    /// Particle.
    Particle,
    /// Punctuation.
    Punctuation,
    /// Number.
    Number,
    /// Symbol.
    Symbol,
    /// Unknown.
    Unknown,
}

impl PosTag {
    /// Parse a POS tag from a Penn Treebank or universal tag string.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag_upper = tag.to_uppercase();
        match tag_upper.as_str() {
            "NN" | "NOUN" => Self::Noun,
            "NNS" => Self::PluralNoun,
            "NNP" | "NNPS" | "PROPN" => Self::ProperNoun,
            "VB" | "VBD" | "VBG" | "VBN" | "VBP" | "VBZ" | "VERB" => Self::Verb,
            "JJ" | "JJR" | "JJS" | "ADJ" => Self::Adjective,
            "RB" | "RBR" | "RBS" | "ADV" => Self::Adverb,
            "PRP" | "PRP$" | "WP" | "WP$" | "EX" | "PRON" => Self::Pronoun,
            "DT" | "WDT" | "PDT" | "DET" => Self::Determiner,
            "IN" | "TO" | "ADP" => Self::Preposition,
            "CC" | "CCONJ" | "SCONJ" => Self::Conjunction,
            "MD" | "AUX" => Self::Auxiliary,
            "RP" | "PART" => Self::Particle,
            "." | "," | ":" | "(" | ")" | "PUNCT" => Self::Punctuation,
            "CD" | "NUM" => Self::Number,
            "SYM" | "$" => Self::Symbol,
            _ => Self::Unknown,
        }
    }

    /// The Penn Treebank tag this variant is rendered as.
    #[must_use]
    pub fn as_penn(&self) -> &'static str {
        match self {
            Self::Noun => "NN",
            Self::PluralNoun => "NNS",
            Self::ProperNoun => "NNP",
            Self::Verb => "VB",
            Self::Adjective => "JJ",
            Self::Adverb => "RB",
            Self::Pronoun => "PRP",
            Self::Determiner => "DT",
            Self::Preposition => "IN",
            Self::Conjunction => "CC",
            Self::Auxiliary => "MD",
            Self::Particle => "RP",
            Self::Punctuation => ".",
            Self::Number => "CD",
            Self::Symbol => "SYM",
            Self::Unknown => "XX",
        }
    }

    /// Check if this tag is any kind of noun (the `NN*` family).
    #[must_use]
    pub fn is_noun(&self) -> bool {
        matches!(self, Self::Noun | Self::PluralNoun | Self::ProperNoun)
    }

    /// Check if this tag represents a main verb (the `VB*` family).
    #[must_use]
    pub fn is_verb(&self) -> bool {
        matches!(self, Self::Verb)
    }

    /// Check if this tag represents an adjective (the `JJ*` family).
    #[must_use]
    pub fn is_adjective(&self) -> bool {
        matches!(self, Self::Adjective)
    }

    /// Verbs and adjectives: the words that become predicates.
    #[must_use]
    pub fn is_predicative(&self) -> bool {
        self.is_verb() || self.is_adjective()
    }
}

/// A token with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Surface text as it appeared in the input.
    pub text: String,
    /// Part-of-speech tag.
    pub tag: PosTag,
}

impl TaggedToken {
    /// Create a tagged token.
    #[must_use]
    pub fn new(text: impl Into<String>, tag: PosTag) -> Self {
        Self {
            text: text.into(),
            tag,
        }
    }
}

/// A labeled named-entity span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Entity label, e.g. `PERSON`.
    pub label: String,
    /// Space-joined span text.
    pub text: String,
}

/// Tokenization, tagging, lemmatization and named-entity chunking.
///
/// Implementations may be backed by an external NLP stack. Any method may
/// report [`NlpError::Unavailable`]; callers treat that as "nothing found".
pub trait NlpToolkit: Send + Sync {
    /// Split text into word and punctuation tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability is unavailable.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, NlpError>;

    /// Assign a part-of-speech tag to every token.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability is unavailable.
    fn tag(&self, tokens: &[String]) -> Result<Vec<TaggedToken>, NlpError>;

    /// Reduce a lower-cased word to its dictionary form for the given tag.
    fn lemmatize(&self, word: &str, pos: PosTag) -> String;

    /// Group tagged tokens into named-entity spans.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability is unavailable.
    fn chunk_named_entities(&self, tagged: &[TaggedToken]) -> Result<Vec<EntitySpan>, NlpError>;

    /// Whether a lower-cased word is a stopword.
    fn is_stopword(&self, word: &str) -> bool;
}

/// A toolkit that is never available.
///
/// Useful when the NLP stack failed to load; the compiler then extracts
/// nothing from free text but still serves the special-case library.
#[derive(Debug, Clone, Default)]
pub struct UnavailableToolkit {
    reason: String,
}

impl UnavailableToolkit {
    /// Create an unavailable toolkit with a reason for logs.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl NlpToolkit for UnavailableToolkit {
    fn tokenize(&self, _text: &str) -> Result<Vec<String>, NlpError> {
        Err(NlpError::Unavailable(self.reason.clone()))
    }

    fn tag(&self, _tokens: &[String]) -> Result<Vec<TaggedToken>, NlpError> {
        Err(NlpError::Unavailable(self.reason.clone()))
    }

    fn lemmatize(&self, word: &str, _pos: PosTag) -> String {
        word.to_string()
    }

    fn chunk_named_entities(&self, _tagged: &[TaggedToken]) -> Result<Vec<EntitySpan>, NlpError> {
        Err(NlpError::Unavailable(self.reason.clone()))
    }

    fn is_stopword(&self, _word: &str) -> bool {
        false
    }
}
