//! Relation sinks: where compiled semantic triples can be published.
//!
//! A sink stores `source -[RELATION_TYPE]-> target` records. The engine
//! publishes the triples of each compile when a sink is attached.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::compiler::SemanticRelation;
use crate::error::SinkError;

/// One stored relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// Unique identifier.
    pub id: String,
    /// Subject node name.
    pub source_node: String,
    /// Object node name.
    pub target_node: String,
    /// Upper-case relation type, e.g. `GREATER_THAN`.
    pub relation_type: String,
    /// Free-form properties.
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl RelationRecord {
    /// Create a record with a fresh id. The relation type is upper-cased.
    #[must_use]
    pub fn new(
        source_node: impl Into<String>,
        relation_type: impl AsRef<str>,
        target_node: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_node: source_node.into(),
            target_node: target_node.into(),
            relation_type: normalize_relation_type(relation_type.as_ref()),
            properties: HashMap::new(),
        }
    }

    /// Attach a property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Whether source, target and relation type are all present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.source_node.trim().is_empty()
            && !self.target_node.trim().is_empty()
            && !self.relation_type.trim().is_empty()
    }

    fn matches(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        self.source_node.to_lowercase().contains(&query_lower)
            || self.target_node.to_lowercase().contains(&query_lower)
            || self.relation_type == normalize_relation_type(query)
    }
}

impl From<&SemanticRelation> for RelationRecord {
    fn from(relation: &SemanticRelation) -> Self {
        Self::new(&relation.subject, relation.kind.tag(), &relation.object)
    }
}

fn normalize_relation_type(raw: &str) -> String {
    raw.trim().replace(' ', "_").to_uppercase()
}

/// Outcome of a batch save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
    /// Records stored.
    pub success_count: usize,
    /// Records rejected.
    pub failed_count: usize,
    /// The rejected records with their error text.
    pub failed_relations: Vec<(RelationRecord, String)>,
}

/// Storage for semantic relations.
#[async_trait]
pub trait RelationSink: Send + Sync {
    /// Store one record.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::MissingFields`] for an incomplete record, or a
    /// storage error from the backend.
    async fn save_relation(&self, record: RelationRecord) -> Result<String, SinkError>;

    /// Find records whose nodes contain `query` or whose type equals it.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::EmptyQuery`] for a blank query.
    async fn find_relations(&self, query: &str) -> Result<Vec<RelationRecord>, SinkError>;

    /// Store every record, collecting failures instead of stopping.
    async fn save_relations(&self, records: Vec<RelationRecord>) -> SaveReport {
        let mut report = SaveReport::default();
        for record in records {
            match self.save_relation(record.clone()).await {
                Ok(_) => report.success_count += 1,
                Err(e) => {
                    tracing::warn!(error = %e, source = %record.source_node, "relation not saved");
                    report.failed_count += 1;
                    report.failed_relations.push((record, e.to_string()));
                }
            }
        }
        report
    }
}

/// Process-local [`RelationSink`].
#[derive(Debug, Default)]
pub struct InMemoryRelationSink {
    records: RwLock<Vec<RelationRecord>>,
}

impl InMemoryRelationSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the sink is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RelationSink for InMemoryRelationSink {
    async fn save_relation(&self, record: RelationRecord) -> Result<String, SinkError> {
        if !record.is_complete() {
            return Err(SinkError::MissingFields);
        }
        let id = record.id.clone();
        self.records.write().await.push(record);
        Ok(id)
    }

    async fn find_relations(&self, query: &str) -> Result<Vec<RelationRecord>, SinkError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SinkError::EmptyQuery);
        }
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.matches(query))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::RelationKind;

    #[tokio::test]
    async fn test_save_and_find() {
        let sink = InMemoryRelationSink::new();
        sink.save_relation(RelationRecord::new("Elephant", "greater_than", "Mouse"))
            .await
            .unwrap();
        sink.save_relation(RelationRecord::new("John", "has", "car"))
            .await
            .unwrap();

        let by_node = sink.find_relations("elephant").await.unwrap();
        assert_eq!(by_node.len(), 1);
        assert_eq!(by_node[0].relation_type, "GREATER_THAN");

        let by_type = sink.find_relations("has").await.unwrap();
        assert_eq!(by_type.len(), 1);
        assert_eq!(by_type[0].target_node, "car");
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let sink = InMemoryRelationSink::new();
        let err = sink
            .save_relation(RelationRecord::new("", "has", "car"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields (source_node, target_node, or relation_type)"
        );
        assert!(sink.is_empty().await);
        assert_eq!(
            sink.find_relations("  ").await.unwrap_err(),
            SinkError::EmptyQuery
        );
    }

    #[tokio::test]
    async fn test_batch_save_reports_failures() {
        let sink = InMemoryRelationSink::new();
        let report = sink
            .save_relations(vec![
                RelationRecord::new("a", "parent of", "b"),
                RelationRecord::new("a", "", "b"),
                RelationRecord::new("b", "parent of", "c").with_property("origin", "test"),
            ])
            .await;
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.failed_relations.len(), 1);
        assert_eq!(sink.len().await, 2);
        assert_eq!(sink.find_relations("parent of").await.unwrap().len(), 2);
    }

    #[test]
    fn test_record_from_semantic_relation() {
        let relation =
            SemanticRelation::new("Alice", RelationKind::Generic("friend of".into()), "Bob");
        let record = RelationRecord::from(&relation);
        assert_eq!(record.source_node, "Alice");
        assert_eq!(record.relation_type, "FRIEND_OF");
        assert_eq!(record.target_node, "Bob");
        assert!(Uuid::parse_str(&record.id).is_ok());
    }
}
