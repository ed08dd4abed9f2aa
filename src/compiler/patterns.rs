//! Semantic relation templates: identity, possession, universal subset and
//! comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::{AnalyzedStatement, COPULAS, constant_name};

/// Kind of a semantic relation triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// "X is Y"
    Equal,
    /// "X is not Y"
    NotEqual,
    /// "X has Y"
    Has,
    /// "All X are Y"
    SubsetOf,
    /// "X is greater/bigger than Y"
    GreaterThan,
    /// "X is less/smaller than Y"
    LessThan,
    /// Any other relation phrase.
    Generic(String),
}

impl RelationKind {
    /// The relation tag, e.g. `greater_than`.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::Has => "has",
            Self::SubsetOf => "subset_of",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Generic(phrase) => phrase,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A `(subject, kind, object)` triple found in one statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticRelation {
    /// Subject entity name.
    pub subject: String,
    /// Relation kind.
    pub kind: RelationKind,
    /// Object entity name.
    pub object: String,
}

impl SemanticRelation {
    /// Create a triple.
    #[must_use]
    pub fn new(subject: impl Into<String>, kind: RelationKind, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            kind,
            object: object.into(),
        }
    }
}

const POSSESSION_VERBS: &[&str] = &["has", "have", "owns", "possesses"];
const SUBSET_QUANTIFIERS: &[&str] = &["all", "every"];
const IDENTITY_NEGATIONS: &[&str] = &["not", "n't", "never"];

/// Scans tagged statements for the four relation templates.
///
/// Subjects are the closest noun before the trigger word and objects the
/// closest noun after it. Results are in template order and are not
/// deduplicated.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationMatcher;

impl RelationMatcher {
    /// Create a matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// All triples in `stmt`.
    #[must_use]
    pub fn find(&self, stmt: &AnalyzedStatement) -> Vec<SemanticRelation> {
        let mut out = Vec::new();
        self.match_identity(stmt, &mut out);
        self.match_possession(stmt, &mut out);
        self.match_subset(stmt, &mut out);
        self.match_comparison(stmt, &mut out);
        out
    }

    fn noun_name(stmt: &AnalyzedStatement, index: usize) -> Option<String> {
        let token = stmt.tokens.get(index)?;
        if token.tag.is_noun() {
            constant_name(&token.lemma)
        } else {
            None
        }
    }

    fn closest_before(stmt: &AnalyzedStatement, index: usize) -> Option<(usize, String)> {
        (0..index)
            .rev()
            .find_map(|i| Self::noun_name(stmt, i).map(|n| (i, n)))
    }

    fn closest_after(stmt: &AnalyzedStatement, index: usize) -> Option<(usize, String)> {
        (index + 1..stmt.len()).find_map(|i| Self::noun_name(stmt, i).map(|n| (i, n)))
    }

    #[allow(clippy::unused_self)]
    fn match_identity(&self, stmt: &AnalyzedStatement, out: &mut Vec<SemanticRelation>) {
        for idx in (1..stmt.len().saturating_sub(1)).filter(|&i| COPULAS.contains(&stmt.word(i))) {
            let (Some((subj_idx, subject)), Some((obj_idx, object))) = (
                Self::closest_before(stmt, idx),
                Self::closest_after(stmt, idx),
            ) else {
                continue;
            };
            let negated =
                (subj_idx..obj_idx).any(|i| IDENTITY_NEGATIONS.contains(&stmt.word(i)));
            let kind = if negated {
                RelationKind::NotEqual
            } else {
                RelationKind::Equal
            };
            out.push(SemanticRelation::new(subject, kind, object));
        }
    }

    #[allow(clippy::unused_self)]
    fn match_possession(&self, stmt: &AnalyzedStatement, out: &mut Vec<SemanticRelation>) {
        for idx in (1..stmt.len().saturating_sub(1))
            .filter(|&i| POSSESSION_VERBS.contains(&stmt.word(i)))
        {
            if let (Some((_, subject)), Some((_, object))) = (
                Self::closest_before(stmt, idx),
                Self::closest_after(stmt, idx),
            ) {
                out.push(SemanticRelation::new(subject, RelationKind::Has, object));
            }
        }
    }

    #[allow(clippy::unused_self)]
    fn match_subset(&self, stmt: &AnalyzedStatement, out: &mut Vec<SemanticRelation>) {
        for idx in 0..stmt.len().saturating_sub(3) {
            if !SUBSET_QUANTIFIERS.contains(&stmt.word(idx))
                || !COPULAS.contains(&stmt.word(idx + 2))
            {
                continue;
            }
            if let (Some(subject), Some(object)) = (
                Self::noun_name(stmt, idx + 1),
                Self::noun_name(stmt, idx + 3),
            ) {
                out.push(SemanticRelation::new(subject, RelationKind::SubsetOf, object));
            }
        }
    }

    #[allow(clippy::unused_self)]
    fn match_comparison(&self, stmt: &AnalyzedStatement, out: &mut Vec<SemanticRelation>) {
        for i in 0..stmt.len().saturating_sub(4) {
            let kind = match stmt.word(i + 2) {
                "greater" | "bigger" => RelationKind::GreaterThan,
                "less" | "smaller" => RelationKind::LessThan,
                _ => continue,
            };
            if !COPULAS.contains(&stmt.word(i + 1)) || stmt.word(i + 3) != "than" {
                continue;
            }
            if let (Some(subject), Some(object)) =
                (Self::noun_name(stmt, i), Self::noun_name(stmt, i + 4))
            {
                out.push(SemanticRelation::new(subject, kind, object));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::RuleBasedToolkit;

    fn find(text: &str) -> Vec<SemanticRelation> {
        let toolkit = RuleBasedToolkit::new();
        RelationMatcher::new().find(&AnalyzedStatement::analyze(text, &toolkit))
    }

    #[test]
    fn test_identity() {
        assert_eq!(
            find("Tweety is a bird."),
            vec![SemanticRelation::new("tweety", RelationKind::Equal, "bird")]
        );
    }

    #[test]
    fn test_negated_identity() {
        assert_eq!(
            find("Tom is not a dog."),
            vec![SemanticRelation::new("tom", RelationKind::NotEqual, "dog")]
        );
    }

    #[test]
    fn test_possession() {
        assert_eq!(
            find("The dog has a bone."),
            vec![SemanticRelation::new("dog", RelationKind::Has, "bone")]
        );
    }

    #[test]
    fn test_universal_subset() {
        let found = find("All cats are animals.");
        assert!(found.contains(&SemanticRelation::new("cat", RelationKind::SubsetOf, "animal")));
    }

    #[test]
    fn test_comparison_maps_synonyms() {
        let found = find("A is bigger than B.");
        assert!(found.contains(&SemanticRelation::new("a", RelationKind::GreaterThan, "b")));
        let found = find("X is smaller than Y.");
        assert!(found.contains(&SemanticRelation::new("x", RelationKind::LessThan, "y")));
    }

    #[test]
    fn test_closest_nouns_win() {
        let found = find("The big dog of Alice is a hunter.");
        assert_eq!(found[0].subject, "alice");
        assert_eq!(found[0].object, "hunter");
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(RelationKind::GreaterThan.tag(), "greater_than");
        assert_eq!(RelationKind::Generic("parent of".into()).to_string(), "parent of");
    }
}
