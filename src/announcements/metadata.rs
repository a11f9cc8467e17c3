//! Node and relation metadata supplied by an external TREE extractor.
//!
//! The extractor classifies tree nodes and the relations between pages. This
//! crate only reads its output: a map of node descriptors and a map of
//! relation descriptors, both keyed by identifier. The types deserialize from
//! the JSON such extractors emit.

use indexmap::IndexMap;
use oxrdf::Triple;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::Reference;
use super::error::Result;

/// Metadata describing one `tree:Node`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// The node's own context: absent, a vocabulary IRI, or a context object.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type", default)]
    pub types: Vec<String>,
    #[serde(rename = "conditionalImport", default)]
    pub conditional_import: Vec<Value>,
    #[serde(default)]
    pub import: Vec<Value>,
    #[serde(rename = "retentionPolicy", default)]
    pub retention_policy: Vec<Value>,
    #[serde(default)]
    pub search: Vec<Value>,
    /// Outgoing relations of the node.
    #[serde(default)]
    pub relation: Vec<Reference>,
}

/// Metadata describing one page-to-page relation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type", default)]
    pub types: Vec<String>,
    #[serde(rename = "remainingItems", default, skip_serializing_if = "Vec::is_empty")]
    pub remaining_items: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value: Vec<Value>,
    /// Target nodes of the relation.
    #[serde(default)]
    pub node: Vec<Reference>,
}

/// Output of a TREE metadata extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeMetadata {
    #[serde(default)]
    pub nodes: IndexMap<String, NodeDescriptor>,
    #[serde(default)]
    pub relations: IndexMap<String, RelationDescriptor>,
}

impl TreeMetadata {
    pub fn with_node(mut self, node: NodeDescriptor) -> Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    pub fn with_relation(mut self, relation: RelationDescriptor) -> Self {
        self.relations.insert(relation.id.clone(), relation);
        self
    }
}

/// Classifies tree nodes and relations over a flat statement sequence.
///
/// Called once per extraction or construction run.
pub trait MetadataExtractor {
    fn extract_metadata(&self, statements: &[Triple]) -> Result<TreeMetadata>;
}

/// Precomputed metadata, returned as-is whatever the statements.
impl MetadataExtractor for TreeMetadata {
    fn extract_metadata(&self, _statements: &[Triple]) -> Result<TreeMetadata> {
        Ok(self.clone())
    }
}

impl<F> MetadataExtractor for F
where
    F: Fn(&[Triple]) -> Result<TreeMetadata>,
{
    fn extract_metadata(&self, statements: &[Triple]) -> Result<TreeMetadata> {
        self(statements)
    }
}
