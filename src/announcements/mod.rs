//! LDES/TREE announcement documents.
//!
//! This module projects an RDF graph into typed JSON-LD documents and builds
//! new view announcements.
//!
//! # Reading
//!
//! ```ignore
//! use ldesannounce::announcements::{extract, Graph, RdfFormat, TreeMetadata};
//!
//! let graph = Graph::parse(turtle, RdfFormat::Turtle, None)?;
//! let extraction = extract(&graph, &metadata)?;
//! for (id, view) in &extraction.views {
//!     println!("{} has {} relations", id, view.relations.len());
//! }
//! ```
//!
//! # Writing
//!
//! ```ignore
//! use ldesannounce::announcements::{AnnouncementConfig, DocumentBuilder};
//!
//! let announcement = DocumentBuilder::new().build_view_announcement(&graph, &metadata, &config)?;
//! let json = serde_json::to_string_pretty(&announcement)?;
//! ```

pub mod context;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod extract;
pub mod graph;
pub mod jsonld;
pub mod metadata;
pub mod scan;
pub mod term;
pub mod vocab;
pub mod writer;

pub use context::{make_view_context, ResolvedContext};
pub use coordinator::{extract, extract_with_options, EntityCategory, EntityFailure, Extraction, FailurePolicy};
pub use document::{
    Add, Announcement, AnnouncementObject, BucketizerConfiguration, DataService, Dataset, DeepValue,
    ExpandedObject, ExtractedView, Link, Literal, Person, Reference, ReverseCollection, ShallowValue, View,
};
pub use error::{AnnounceError, Result};
pub use extract::{
    extract_announcement, extract_bucketizer_configuration, extract_data_service, extract_dataset, extract_view,
    read_table, Cardinality, FieldSpec, Record,
};
pub use graph::{Graph, RdfFormat, StatementSource, TriplePattern};
pub use jsonld::document_to_graph;
pub use metadata::{MetadataExtractor, NodeDescriptor, RelationDescriptor, TreeMetadata};
pub use scan::{find_subjects_by_type, find_subjects_by_types};
pub use term::{resolve_shallow, Diagnostic, TermResolver};
pub use writer::{normalize_property_path, AnnouncementConfig, DocumentBuilder, DEFAULT_BUCKETIZERS};
