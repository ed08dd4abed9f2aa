//! Classification of a statement's negation shape.

use serde::{Deserialize, Serialize};

use super::context::{AnalyzedStatement, COPULAS, constant_name};

/// What a negation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NegationKind {
    /// "Tweety can not fly"
    Predicate,
    /// "There is no cat"
    Entity,
    /// "A is not related to B"
    Relation,
    /// "Neither A nor B ..."
    Conjunction,
    /// A marker was found but its shape was not recognized, or no marker.
    #[default]
    None,
}

/// Result of negation detection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NegationDescriptor {
    /// Whether any negation marker occurs.
    pub has_negation: bool,
    /// Recognized shape.
    pub kind: NegationKind,
    /// Negated entity (subject for predicate and relation negation).
    pub entity: Option<String>,
    /// Negated predicate lemma, or relation tag such as `related_to`.
    pub predicate: Option<String>,
    /// Relation object.
    pub object: Option<String>,
    /// Both targets of "neither A nor B".
    pub conjunction: Vec<String>,
}

const RELATION_WORDS: &[&str] = &["related", "connected", "linked"];
const NEGATED_COPULAS: &[&str] = &["isn't", "aren't"];

fn noun_at(stmt: &AnalyzedStatement, index: usize) -> Option<String> {
    stmt.tokens
        .get(index)
        .filter(|t| t.tag.is_noun())
        .and_then(|t| constant_name(&t.lemma))
}

/// Detect the negation shape of `stmt`.
///
/// The first marker with a token on both sides decides the shape: an
/// "is/are not (or isn't/aren't) related/connected/linked to" window is a
/// relation negation, a following verb or adjective a predicate negation,
/// and a following noun an entity negation. "neither A nor B" overrides all of these.
#[must_use]
pub fn detect_negation(stmt: &AnalyzedStatement) -> NegationDescriptor {
    let mut result = NegationDescriptor::default();
    let len = stmt.len();

    for i in (0..len).filter(|&i| stmt.is_negation_marker(i)) {
        result.has_negation = true;
        if i == 0 || i + 1 >= len {
            continue;
        }

        let next = &stmt.tokens[i + 1];
        let subject_idx = if i > 1 && COPULAS.contains(&stmt.word(i - 1)) {
            Some(i - 2)
        } else if NEGATED_COPULAS.contains(&stmt.word(i)) {
            Some(i - 1)
        } else {
            None
        };
        if i + 3 < len
            && RELATION_WORDS.contains(&next.word.as_str())
            && stmt.word(i + 2) == "to"
            && let Some(subject_idx) = subject_idx
            && let (Some(subject), Some(object)) =
                (noun_at(stmt, subject_idx), noun_at(stmt, i + 3))
        {
            result.kind = NegationKind::Relation;
            result.predicate = Some(format!("{}_to", next.word));
            result.entity = Some(subject);
            result.object = Some(object);
        } else if next.tag.is_predicative() {
            result.kind = NegationKind::Predicate;
            result.predicate = Some(next.lemma.clone());
            result.entity = (0..i).rev().find_map(|j| noun_at(stmt, j));
        } else if next.tag.is_noun() {
            result.kind = NegationKind::Entity;
            result.entity = noun_at(stmt, i + 1);
        }
        break;
    }

    if let (Some(neither), Some(nor)) = (stmt.find_any(&["neither"]), stmt.find_any(&["nor"]))
        && neither < nor
        && nor + 1 < len
    {
        result.has_negation = true;
        result.kind = NegationKind::Conjunction;
        let first = (neither + 1..nor).find_map(|i| noun_at(stmt, i));
        let second = (nor + 1..len).find_map(|i| noun_at(stmt, i));
        if let (Some(first), Some(second)) = (first, second) {
            result.conjunction = vec![first, second];
        }
    }

    result
}
