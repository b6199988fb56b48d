//! Core data types for RoadViz-RS
//!
//! This module contains the fundamental data structures used throughout
//! the pipeline for representing decoded records.
//!
//! # Main Types
//!
//! - [`Record`] - One decoded flat JSON object extracted from the stream
//! - [`NodeLabel`] - Display payload derived from a record for graph nodes
//!
//! # Identity
//!
//! A record has no identity beyond its serialized content for dedup
//! purposes: [`Record::canonical_key`] produces a deterministic string form
//! with stable field ordering, so two literals that differ only in field
//! order compare equal. The consumer additionally uses the `id` field as a
//! graph-node key.

use serde_json::{Map, Value};
use std::fmt;

/// Field holding the stable node key on the consumer side
pub const ID_FIELD: &str = "id";

/// Field holding the short title shown on a graph node
pub const TOPIC_FIELD: &str = "topic";

/// Field holding the one-line body shown on a graph node
pub const DESCRIPTION_FIELD: &str = "description";

/// One decoded flat JSON object extracted from the stream.
///
/// The schema is open beyond "a single balanced-brace JSON object": fields
/// the consumer does not recognize are carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Parse a record from a candidate object string.
    ///
    /// Fails if the string is not valid JSON or not an object.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_str(s)?;
        Ok(Self { fields })
    }

    /// Build a record from an already-parsed JSON object.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The record's `id` field as a string, if present.
    ///
    /// Numeric ids are accepted and stringified, matching consumers that key
    /// nodes by `id.toString()`.
    pub fn id(&self) -> Option<String> {
        match self.fields.get(ID_FIELD)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A field value as a string slice, if present and textual.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize the record back to a JSON object string, fields in their
    /// original order.
    pub fn to_json_string(&self) -> String {
        // A Map of scalar values cannot fail to serialize.
        serde_json::to_string(&self.fields).unwrap_or_else(|_| "{}".to_string())
    }

    /// Deterministic string form for equality/dedup comparison.
    ///
    /// Fields are serialized in sorted key order so field-order variance in
    /// the incoming literal does not defeat deduplication.
    pub fn canonical_key(&self) -> String {
        let sorted: std::collections::BTreeMap<&String, &Value> = self.fields.iter().collect();
        serde_json::to_string(&sorted).unwrap_or_else(|_| "{}".to_string())
    }

    /// Derive the display payload for a graph node.
    pub fn label(&self) -> NodeLabel {
        NodeLabel {
            topic: self.get_str(TOPIC_FIELD).unwrap_or_default().to_string(),
            description: self
                .get_str(DESCRIPTION_FIELD)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

/// Display payload derived from a record, attached to a graph node.
///
/// Never mutated after node creation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeLabel {
    /// Short title
    pub topic: String,
    /// One-line body text
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_json_str() {
        let rec = Record::from_json_str(r#"{"id":"1","topic":"A","description":"d1"}"#).unwrap();
        assert_eq!(rec.id().as_deref(), Some("1"));
        assert_eq!(rec.get_str("topic"), Some("A"));
        assert_eq!(rec.len(), 3);
    }

    #[test]
    fn test_record_rejects_non_object() {
        assert!(Record::from_json_str(r#"[1,2,3]"#).is_err());
        assert!(Record::from_json_str(r#""just a string""#).is_err());
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let rec = Record::from_json_str(r#"{"id":7,"topic":"A"}"#).unwrap();
        assert_eq!(rec.id().as_deref(), Some("7"));
    }

    #[test]
    fn test_missing_id() {
        let rec = Record::from_json_str(r#"{"topic":"A"}"#).unwrap();
        assert_eq!(rec.id(), None);
    }

    #[test]
    fn test_canonical_key_ignores_field_order() {
        let a = Record::from_json_str(r#"{"id":"1","topic":"A"}"#).unwrap();
        let b = Record::from_json_str(r#"{"topic":"A","id":"1"}"#).unwrap();
        assert_eq!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn test_canonical_key_distinguishes_values() {
        let a = Record::from_json_str(r#"{"id":"1","topic":"A"}"#).unwrap();
        let b = Record::from_json_str(r#"{"id":"1","topic":"B"}"#).unwrap();
        assert_ne!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn test_label_defaults_for_missing_fields() {
        let rec = Record::from_json_str(r#"{"id":"1"}"#).unwrap();
        let label = rec.label();
        assert!(label.topic.is_empty());
        assert!(label.description.is_empty());
    }
}
