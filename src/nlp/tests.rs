//! Tests for the NLP toolkit.

use super::*;

fn tags(text: &str) -> Vec<(String, PosTag)> {
    let toolkit = RuleBasedToolkit::new();
    let tokens = toolkit.tokenize(text).unwrap();
    toolkit
        .tag(&tokens)
        .unwrap()
        .into_iter()
        .map(|t| (t.text, t.tag))
        .collect()
}

// =========================================================================
// PosTag tests
// =========================================================================

#[test]
fn test_pos_tag_from_penn() {
    assert_eq!(PosTag::from_tag("NNS"), PosTag::PluralNoun);
    assert_eq!(PosTag::from_tag("vbz"), PosTag::Verb);
    assert_eq!(PosTag::from_tag("MD"), PosTag::Auxiliary);
    assert_eq!(PosTag::from_tag("EX"), PosTag::Pronoun);
    assert_eq!(PosTag::from_tag("???"), PosTag::Unknown);
}

#[test]
fn test_pos_tag_families() {
    assert!(PosTag::ProperNoun.is_noun());
    assert!(!PosTag::Pronoun.is_noun());
    assert!(PosTag::Adjective.is_predicative());
    assert!(!PosTag::Auxiliary.is_verb());
    assert_eq!(PosTag::PluralNoun.as_penn(), "NNS");
}

// =========================================================================
// Tokenizer tests
// =========================================================================

#[test]
fn test_tokenize_keeps_contractions() {
    let toolkit = RuleBasedToolkit::new();
    let tokens = toolkit.tokenize("Tweety isn't a cat.").unwrap();
    assert_eq!(tokens, vec!["Tweety", "isn't", "a", "cat", "."]);
}

#[test]
fn test_tokenize_splits_punctuation() {
    let toolkit = RuleBasedToolkit::new();
    let tokens = toolkit.tokenize("If A, then B!").unwrap();
    assert_eq!(tokens, vec!["If", "A", ",", "then", "B", "!"]);
}

// =========================================================================
// Tagger tests
// =========================================================================

#[test]
fn test_tag_universal_statement() {
    let tagged = tags("All humans are mortal.");
    assert_eq!(tagged[0].1, PosTag::Determiner);
    assert_eq!(tagged[1].1, PosTag::PluralNoun);
    assert_eq!(tagged[2].1, PosTag::Verb);
    assert_eq!(tagged[3].1, PosTag::Adjective);
    assert_eq!(tagged[4].1, PosTag::Punctuation);
}

#[test]
fn test_tag_singular_agreement() {
    let tagged = tags("Socrates is a human.");
    assert_eq!(tagged[0].1, PosTag::Noun);
    assert_eq!(tagged[3].1, PosTag::Noun);
}

#[test]
fn test_tag_modal_and_verb() {
    let tagged = tags("Tweety can not fly.");
    assert_eq!(tagged[1].1, PosTag::Auxiliary);
    assert_eq!(tagged[2].1, PosTag::Adverb);
    assert_eq!(tagged[3].1, PosTag::Verb);
}

#[test]
fn test_tag_proper_noun_mid_sentence() {
    let tagged = tags("The cat chases Jerry.");
    assert_eq!(tagged[3].1, PosTag::ProperNoun);
    assert_eq!(tagged[2].1, PosTag::Verb);
}

#[test]
fn test_tag_single_letter_names() {
    let tagged = tags("A is greater than B.");
    assert_eq!(tagged[0].1, PosTag::ProperNoun);
    assert_eq!(tagged[2].1, PosTag::Adjective);
    assert_eq!(tagged[3].1, PosTag::Preposition);
    assert_eq!(tagged[4].1, PosTag::ProperNoun);

    let tagged = tags("A bird can fly.");
    assert_eq!(tagged[0].1, PosTag::Determiner);
}

// =========================================================================
// Lemmatizer tests
// =========================================================================

#[test]
fn test_lemmatize_nouns() {
    let toolkit = RuleBasedToolkit::new();
    assert_eq!(toolkit.lemmatize("birds", PosTag::PluralNoun), "bird");
    assert_eq!(toolkit.lemmatize("berries", PosTag::PluralNoun), "berry");
    assert_eq!(toolkit.lemmatize("boxes", PosTag::PluralNoun), "box");
    assert_eq!(toolkit.lemmatize("children", PosTag::PluralNoun), "child");
    assert_eq!(toolkit.lemmatize("socrates", PosTag::Noun), "socrates");
}

#[test]
fn test_lemmatize_verbs() {
    let toolkit = RuleBasedToolkit::new();
    assert_eq!(toolkit.lemmatize("flies", PosTag::Verb), "fly");
    assert_eq!(toolkit.lemmatize("is", PosTag::Verb), "be");
    assert_eq!(toolkit.lemmatize("jumped", PosTag::Verb), "jump");
    assert_eq!(toolkit.lemmatize("Mortal", PosTag::Adjective), "mortal");
}

// =========================================================================
// Named entity tests
// =========================================================================

#[test]
fn test_chunk_named_entities() {
    let toolkit = RuleBasedToolkit::new();
    let tokens = toolkit.tokenize("The cat met Jerry Mouse and Tom.").unwrap();
    let tagged = toolkit.tag(&tokens).unwrap();
    let spans = toolkit.chunk_named_entities(&tagged).unwrap();

    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].text, "Jerry Mouse");
    assert_eq!(spans[0].label, "ORGANIZATION");
    assert_eq!(spans[1].text, "Tom");
}

#[test]
fn test_stopwords() {
    let toolkit = RuleBasedToolkit::new();
    assert!(toolkit.is_stopword("the"));
    assert!(toolkit.is_stopword("not"));
    assert!(!toolkit.is_stopword("socrates"));
}

#[test]
fn test_unavailable_toolkit() {
    let toolkit = UnavailableToolkit::new("models not installed");
    assert!(toolkit.tokenize("anything").is_err());
    assert!(toolkit.tag(&[]).is_err());
    assert_eq!(toolkit.lemmatize("Birds", PosTag::PluralNoun), "Birds");
}
