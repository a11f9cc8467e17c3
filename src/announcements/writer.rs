//! Construction of view announcements.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use oxrdf::Triple;
use serde::{Deserialize, Serialize};

use super::context::{
    announcement_context, bucketizer_configuration_context, make_view_context, reverse_collection_context,
};
use super::document::{
    Announcement, AnnouncementObject, BucketizerConfiguration, Literal, Person, Reference, ReverseCollection,
    View,
};
use super::error::{AnnounceError, Result};
use super::graph::StatementSource;
use super::metadata::{MetadataExtractor, TreeMetadata};
use super::vocab::{activity_streams, ldes, xsd};

/// Bucketizers known to a [`DocumentBuilder::new`] builder.
pub const DEFAULT_BUCKETIZERS: [(&str, &str); 3] = [
    ("substring", ldes::SUBSTRING_BUCKETIZER),
    ("basic", ldes::BASIC_BUCKETIZER),
    ("subjectpage", ldes::SUBJECT_PAGE_BUCKETIZER),
];

pub const ANNOUNCEMENT_ID: &str = "#announce";
pub const VIEW_ID: &str = "#view";
pub const BUCKETIZER_CONFIGURATION_ID: &str = "#bucketizerConfig";

/// Operator-supplied settings of a view announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementConfig {
    /// Name of the person who initiated the action.
    pub creator_name: String,
    #[serde(rename = "creatorURL")]
    pub creator_url: String,
    /// Property path used by the bucketizer, bare or wrapped in `<...>`.
    pub property_path: String,
    /// Members per page, kept in its lexical form.
    pub page_size: String,
    /// Short name of the bucketizer, e.g. `basic`.
    pub bucketizer: String,
    /// Identifier of the root node of the view.
    pub view_id: String,
    /// Identifier of the original `ldes:EventStream` or `tree:Collection`.
    #[serde(rename = "originalLDESURL")]
    pub original_ldes_url: String,
}

/// Builds view announcements.
///
/// # Example
/// ```ignore
/// let builder = DocumentBuilder::new().issued_at(Utc::now());
/// let announcement = builder.build_view_announcement(&graph, &extractor, &config)?;
/// let json = serde_json::to_string(&announcement)?;
/// ```
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    bucketizers: IndexMap<String, String>,
    issued: Option<DateTime<Utc>>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    /// A builder knowing the standard bucketizers.
    pub fn new() -> Self {
        Self {
            bucketizers: DEFAULT_BUCKETIZERS
                .iter()
                .map(|(name, iri)| (name.to_string(), iri.to_string()))
                .collect(),
            issued: None,
        }
    }

    /// Registers an additional bucketizer, or replaces the IRI of a known one.
    pub fn with_bucketizer(mut self, name: impl Into<String>, iri: impl Into<String>) -> Self {
        self.bucketizers.insert(name.into(), iri.into());
        self
    }

    /// Pins the `dct:issued` timestamp instead of using the current time.
    pub fn issued_at(mut self, issued: DateTime<Utc>) -> Self {
        self.issued = Some(issued);
        self
    }

    /// Full IRI of a bucketizer short name.
    pub fn bucketizer_iri(&self, name: &str) -> Result<&str> {
        self.bucketizers
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AnnounceError::InvalidBucketizer {
                given: name.to_string(),
                valid: self.bucketizers.keys().cloned().collect(),
            })
    }

    /// Builds an announcement carrying a new view of `config.view_id`.
    ///
    /// The bucketizer is validated before the metadata extractor runs over
    /// the statements of `source`.
    ///
    /// # Errors
    ///
    /// - `AnnounceError::InvalidBucketizer` for an unknown bucketizer name
    /// - `AnnounceError::UnknownViewNode` when the metadata has no node `config.view_id`
    /// - any error of the metadata extractor
    pub fn build_view_announcement<S, M>(&self, source: &S, metadata: &M, config: &AnnouncementConfig) -> Result<Announcement>
    where
        S: StatementSource + ?Sized,
        M: MetadataExtractor + ?Sized,
    {
        self.bucketizer_iri(&config.bucketizer)?;
        let statements: Vec<Triple> = source.statements().into_iter().cloned().collect();
        let tree_metadata = metadata.extract_metadata(&statements)?;
        self.build_from_metadata(&tree_metadata, config)
    }

    /// Builds the announcement from metadata already at hand.
    pub fn build_from_metadata(&self, metadata: &TreeMetadata, config: &AnnouncementConfig) -> Result<Announcement> {
        let view = self.build_view(metadata, config)?;
        let mut announcement = build_announcement(config);
        announcement.attach_view(view);
        Ok(announcement)
    }

    fn build_view(&self, metadata: &TreeMetadata, config: &AnnouncementConfig) -> Result<View> {
        let bucketizer = self.bucketizer_iri(&config.bucketizer)?;
        let node = metadata
            .nodes
            .get(&config.view_id)
            .ok_or_else(|| AnnounceError::UnknownViewNode(config.view_id.clone()))?;
        log::debug!("Building view of '{}' with bucketizer {}", config.view_id, bucketizer);

        let configuration = BucketizerConfiguration {
            context: bucketizer_configuration_context(),
            id: BUCKETIZER_CONFIGURATION_ID.to_string(),
            types: vec![ldes::BUCKETIZER_CONFIGURATION.to_string()],
            bucketizer: Some(Reference::new(bucketizer).into()),
            page_size: Some(Literal::typed(&config.page_size, xsd::POSITIVE_INTEGER).into()),
            path: Some(Reference::new(normalize_property_path(&config.property_path)).into()),
        };

        let issued = self
            .issued
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        Ok(View {
            context: make_view_context(node.context.as_ref()),
            id: VIEW_ID.to_string(),
            types: node.types.clone(),
            configuration,
            subset: None,
            is_version_of: Some(Reference::new(&config.view_id).into()),
            issued: Some(Literal::typed(issued, xsd::DATE_TIME).into()),
            reverse: Some(ReverseCollection {
                context: reverse_collection_context(),
                view: Reference::new(&config.original_ldes_url),
            }),
            conditional_import: node.conditional_import.clone(),
            import: node.import.clone(),
            import_stream: node.import.clone(),
            relation: Vec::new(),
            retention_policy: node.retention_policy.clone(),
            search: node.search.clone(),
        })
    }
}

/// The announcement with a placeholder payload pointing at the view id.
fn build_announcement(config: &AnnouncementConfig) -> Announcement {
    Announcement {
        context: announcement_context(),
        id: ANNOUNCEMENT_ID.to_string(),
        types: vec![activity_streams::ANNOUNCE.to_string()],
        actor: Person {
            id: config.creator_url.clone(),
            types: vec![activity_streams::PERSON.to_string()],
            name: Some(Literal::plain(&config.creator_name).into()),
            url: Some(Reference::new(&config.creator_url).into()),
        },
        object: AnnouncementObject::Reference(Reference::new(VIEW_ID)),
    }
}

/// Strips the angle brackets of `<iri>`; anything else is returned unchanged.
pub fn normalize_property_path(path: &str) -> &str {
    path.strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(path)
}
