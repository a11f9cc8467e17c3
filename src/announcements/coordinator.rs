//! Extraction of every entity a graph carries.

use std::fmt;

use indexmap::IndexMap;
use oxrdf::Triple;

use super::document::{Announcement, DataService, Dataset, ExtractedView};
use super::error::{AnnounceError, Result};
use super::extract::{extract_announcement, extract_data_service, extract_dataset, extract_view};
use super::graph::StatementSource;
use super::metadata::MetadataExtractor;
use super::scan::{find_subjects_by_type, find_subjects_by_types};
use super::vocab::{activity_streams, dcat, ldes, tree};

/// What the coordinator does when one entity fails to extract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the first failure.
    #[default]
    FailFast,
    /// Skip the entity and record the failure in [`Extraction::failures`].
    CollectFailures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Announcement,
    Dataset,
    DataService,
    View,
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityCategory::Announcement => "announcement",
            EntityCategory::Dataset => "dataset",
            EntityCategory::DataService => "data service",
            EntityCategory::View => "view",
        };
        f.write_str(name)
    }
}

/// An entity skipped under [`FailurePolicy::CollectFailures`].
#[derive(Debug)]
pub struct EntityFailure {
    pub category: EntityCategory,
    pub id: String,
    pub error: AnnounceError,
}

/// All entities extracted from one graph, keyed by subject identifier in
/// discovery order.
#[derive(Debug, Default)]
pub struct Extraction {
    pub announcements: IndexMap<String, Announcement>,
    pub datasets: IndexMap<String, Dataset>,
    pub data_services: IndexMap<String, DataService>,
    pub views: IndexMap<String, ExtractedView>,
    pub failures: Vec<EntityFailure>,
}

/// Extracts every announcement, dataset, data service and view, failing on
/// the first malformed entity.
pub fn extract<S, M>(source: &S, metadata: &M) -> Result<Extraction>
where
    S: StatementSource + ?Sized,
    M: MetadataExtractor + ?Sized,
{
    extract_with_options(source, metadata, FailurePolicy::default())
}

/// Extracts every entity under the given failure policy.
///
/// The metadata extractor is invoked exactly once, over all statements of
/// `source`. Its own failure always propagates.
pub fn extract_with_options<S, M>(source: &S, metadata: &M, policy: FailurePolicy) -> Result<Extraction>
where
    S: StatementSource + ?Sized,
    M: MetadataExtractor + ?Sized,
{
    let announcement_ids = find_subjects_by_type(source, activity_streams::ANNOUNCE);
    let dataset_ids = find_subjects_by_types(source, &[dcat::DATASET, ldes::EVENT_STREAM]);
    let data_service_ids = find_subjects_by_type(source, dcat::DATA_SERVICE);
    let view_ids = find_subjects_by_type(source, tree::NODE);
    log::debug!(
        "Discovered {} announcements, {} datasets, {} data services, {} views",
        announcement_ids.len(),
        dataset_ids.len(),
        data_service_ids.len(),
        view_ids.len()
    );

    let statements: Vec<Triple> = source.statements().into_iter().cloned().collect();
    let tree_metadata = metadata.extract_metadata(&statements)?;
    log::debug!(
        "Metadata extractor returned {} nodes and {} relations",
        tree_metadata.nodes.len(),
        tree_metadata.relations.len()
    );

    let mut failures = Vec::new();
    let announcements = collect(EntityCategory::Announcement, announcement_ids, policy, &mut failures, |id| {
        extract_announcement(source, id)
    })?;
    let datasets = collect(EntityCategory::Dataset, dataset_ids, policy, &mut failures, |id| {
        extract_dataset(source, id)
    })?;
    let data_services = collect(EntityCategory::DataService, data_service_ids, policy, &mut failures, |id| {
        extract_data_service(source, id)
    })?;
    let views = collect(EntityCategory::View, view_ids, policy, &mut failures, |id| {
        extract_view(source, id, &tree_metadata)
    })?;

    Ok(Extraction {
        announcements,
        datasets,
        data_services,
        views,
        failures,
    })
}

fn collect<T>(
    category: EntityCategory,
    ids: Vec<String>,
    policy: FailurePolicy,
    failures: &mut Vec<EntityFailure>,
    extract_one: impl Fn(&str) -> Result<T>,
) -> Result<IndexMap<String, T>> {
    let mut entities = IndexMap::with_capacity(ids.len());

    for id in ids {
        match extract_one(&id) {
            Ok(entity) => {
                entities.insert(id, entity);
            }
            Err(error) if policy == FailurePolicy::CollectFailures => {
                log::warn!("Skipping {} '{}': {}", category, id, error);
                failures.push(EntityFailure { category, id, error });
            }
            Err(error) => return Err(error),
        }
    }

    Ok(entities)
}
