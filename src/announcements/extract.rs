//! Fixed-shape entity extraction.
//!
//! Every entity is described by a table of `(key, predicate, cardinality,
//! required)` rows. [`read_table`] interprets a table against one subject and
//! the extractors assemble the typed documents from the resulting [`Record`].

use indexmap::IndexMap;
use oxrdf::NamedNode;

use super::context::{
    announcement_context, bucketizer_configuration_context, data_service_context, dataset_context,
    make_view_context, reverse_collection_context,
};
use super::document::{
    Add, Announcement, AnnouncementObject, BucketizerConfiguration, DataService, Dataset, ExtractedView,
    Link, Person, Reference, ReverseCollection, ShallowValue, View,
};
use super::error::{AnnounceError, Result};
use super::graph::{node_from_id, node_term, subject_id, StatementSource, TriplePattern};
use super::metadata::TreeMetadata;
use super::term::resolve_shallow;
use super::vocab::{activity_streams as as_, dcat, dct, ldes, rdf, tree, void};

/// How many matching statements a field keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// The first matching value.
    First,
    /// Every matching value, in statement order.
    All,
}

/// One row of an extraction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub predicate: &'static str,
    pub cardinality: Cardinality,
    pub required: bool,
}

impl FieldSpec {
    pub const fn field(key: &'static str, predicate: &'static str) -> Self {
        Self {
            key,
            predicate,
            cardinality: Cardinality::First,
            required: false,
        }
    }

    pub const fn required(key: &'static str, predicate: &'static str) -> Self {
        Self {
            key,
            predicate,
            cardinality: Cardinality::First,
            required: true,
        }
    }

    pub const fn all(key: &'static str, predicate: &'static str) -> Self {
        Self {
            key,
            predicate,
            cardinality: Cardinality::All,
            required: false,
        }
    }
}

const TYPE: FieldSpec = FieldSpec::all("@type", rdf::TYPE);

pub const ANNOUNCEMENT_FIELDS: &[FieldSpec] = &[
    TYPE,
    FieldSpec::required("actor", as_::ACTOR),
    FieldSpec::required("object", as_::OBJECT),
];

pub const ADD_FIELDS: &[FieldSpec] = &[
    TYPE,
    FieldSpec::required("actor", as_::ACTOR),
    FieldSpec::field("object", as_::OBJECT),
    FieldSpec::required("url", as_::URL),
];

/// Actor of an `as:Add`.
pub const PERSON_FIELDS: &[FieldSpec] = &[
    TYPE,
    FieldSpec::field("name", as_::NAME),
    FieldSpec::field("url", as_::URL),
];

/// Actor of an announcement, whose url is published as `as:href`.
pub const ANNOUNCER_FIELDS: &[FieldSpec] = &[
    TYPE,
    FieldSpec::field("name", as_::NAME),
    FieldSpec::field("url", as_::HREF),
];

pub const LINK_FIELDS: &[FieldSpec] = &[
    TYPE,
    FieldSpec::field("name", as_::NAME),
    FieldSpec::field("href", as_::HREF),
];

pub const DATASET_FIELDS: &[FieldSpec] = &[
    TYPE,
    FieldSpec::field("dct:conformsTo", dct::CONFORMS_TO),
    FieldSpec::field("dct:creator", dct::CREATOR),
    FieldSpec::field("dct:description", dct::DESCRIPTION),
    FieldSpec::field("dct:identifier", dct::IDENTIFIER),
    FieldSpec::field("dct:issued", dct::ISSUED),
    FieldSpec::field("dct:license", dct::LICENSE),
    FieldSpec::field("dct:title", dct::TITLE),
    FieldSpec::field("tree:shape", tree::SHAPE),
    FieldSpec::field("tree:view", tree::VIEW),
];

pub const DATA_SERVICE_FIELDS: &[FieldSpec] = &[
    TYPE,
    FieldSpec::field("dcat:contactPoint", dcat::CONTACT_POINT),
    FieldSpec::field("dcat:endpointURL", dcat::ENDPOINT_URL),
    FieldSpec::field("dcat:servesDataset", dcat::SERVES_DATASET),
    FieldSpec::field("dct:conformsTo", dct::CONFORMS_TO),
    FieldSpec::field("dct:creator", dct::CREATOR),
    FieldSpec::field("dct:description", dct::DESCRIPTION),
    FieldSpec::field("dct:title", dct::TITLE),
];

pub const BUCKETIZER_CONFIGURATION_FIELDS: &[FieldSpec] = &[
    TYPE,
    FieldSpec::field("bucketizer", ldes::BUCKETIZER),
    FieldSpec::field("pageSize", ldes::PAGE_SIZE),
    FieldSpec::field("path", tree::PATH),
];

/// Graph-sourced fields of a view; the rest comes from the node metadata.
pub const VIEW_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("ldes:configuration", ldes::CONFIGURATION),
    FieldSpec::field("void:subset", void::SUBSET),
    FieldSpec::field("dct:isVersionOf", dct::IS_VERSION_OF),
    FieldSpec::field("dct:issued", dct::ISSUED),
];

/// Values read for one subject, keyed by table key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    subject: String,
    values: IndexMap<&'static str, (&'static str, Vec<ShallowValue>)>,
}

impl Record {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// First value of a field.
    pub fn take(&mut self, key: &str) -> Option<ShallowValue> {
        self.values
            .get_mut(key)
            .and_then(|(_, values)| (!values.is_empty()).then(|| values.remove(0)))
    }

    pub fn take_all(&mut self, key: &str) -> Vec<ShallowValue> {
        self.values
            .get_mut(key)
            .map(|(_, values)| std::mem::take(values))
            .unwrap_or_default()
    }

    /// Identifiers of every value of a field; literals contribute their lexical value.
    pub fn take_ids(&mut self, key: &str) -> Vec<String> {
        self.take_all(key)
            .into_iter()
            .map(|value| match value {
                ShallowValue::Reference(reference) => reference.id,
                ShallowValue::Literal(literal) => literal.value,
            })
            .collect()
    }

    /// Identifier of the node a field points at.
    ///
    /// Fails when the field has no value or its first value is a literal.
    pub fn node(&mut self, key: &str) -> Result<String> {
        let predicate = self.values.get(key).map(|(predicate, _)| *predicate).unwrap_or(key);
        match self.take(key) {
            Some(ShallowValue::Reference(reference)) => Ok(reference.id),
            _ => Err(AnnounceError::missing(&self.subject, predicate)),
        }
    }
}

/// Reads every row of `table` for `subject`.
///
/// # Errors
///
/// Returns `AnnounceError::MissingRequiredPredicate` for the first required
/// row without a matching statement.
pub fn read_table<S: StatementSource + ?Sized>(source: &S, subject: &str, table: &[FieldSpec]) -> Result<Record> {
    let node = node_from_id(subject);
    let mut record = Record {
        subject: subject.to_string(),
        values: IndexMap::with_capacity(table.len()),
    };

    for spec in table {
        let pattern = TriplePattern::any()
            .with_subject(node.clone())
            .with_predicate(spec.predicate);
        let matches = source.matching(&pattern);

        if spec.required && matches.is_empty() {
            return Err(AnnounceError::missing(subject, spec.predicate));
        }

        let values: Vec<ShallowValue> = match spec.cardinality {
            Cardinality::First => matches.first().map(|t| resolve_shallow(&t.object)).into_iter().collect(),
            Cardinality::All => matches.iter().map(|t| resolve_shallow(&t.object)).collect(),
        };
        record.values.insert(spec.key, (spec.predicate, values));
    }

    Ok(record)
}

pub fn extract_announcement<S: StatementSource + ?Sized>(source: &S, id: &str) -> Result<Announcement> {
    let mut record = read_table(source, id, ANNOUNCEMENT_FIELDS)?;
    let actor_id = record.node("actor")?;
    let object_id = record.node("object")?;

    let object = if has_type(source, &object_id, as_::ADD) {
        AnnouncementObject::Add(Box::new(extract_add(source, &object_id)?))
    } else {
        AnnouncementObject::Reference(Reference::new(object_id))
    };

    Ok(Announcement {
        context: announcement_context(),
        id: id.to_string(),
        types: record.take_ids("@type"),
        actor: extract_person(source, &actor_id, ANNOUNCER_FIELDS)?,
        object,
    })
}

/// Extracts an `as:Add` activity.
pub fn extract_add<S: StatementSource + ?Sized>(source: &S, id: &str) -> Result<Add> {
    let mut record = read_table(source, id, ADD_FIELDS)?;
    let actor_id = record.node("actor")?;
    let url_id = record.node("url")?;

    Ok(Add {
        id: id.to_string(),
        types: record.take_ids("@type"),
        actor: extract_person(source, &actor_id, PERSON_FIELDS)?,
        object: record.take("object"),
        url: extract_link(source, &url_id)?,
    })
}

fn extract_person<S: StatementSource + ?Sized>(source: &S, id: &str, table: &[FieldSpec]) -> Result<Person> {
    let mut record = read_table(source, id, table)?;
    Ok(Person {
        id: id.to_string(),
        types: record.take_ids("@type"),
        name: record.take("name"),
        url: record.take("url"),
    })
}

fn extract_link<S: StatementSource + ?Sized>(source: &S, id: &str) -> Result<Link> {
    let mut record = read_table(source, id, LINK_FIELDS)?;
    Ok(Link {
        id: id.to_string(),
        types: record.take_ids("@type"),
        name: record.take("name"),
        href: record.take("href"),
    })
}

pub fn extract_dataset<S: StatementSource + ?Sized>(source: &S, id: &str) -> Result<Dataset> {
    let mut record = read_table(source, id, DATASET_FIELDS)?;
    Ok(Dataset {
        context: dataset_context(),
        id: id.to_string(),
        types: record.take_ids("@type"),
        conforms_to: record.take("dct:conformsTo"),
        creator: record.take("dct:creator"),
        description: record.take("dct:description"),
        identifier: record.take("dct:identifier"),
        issued: record.take("dct:issued"),
        license: record.take("dct:license"),
        title: record.take("dct:title"),
        shape: record.take("tree:shape"),
        view: record.take("tree:view"),
    })
}

pub fn extract_data_service<S: StatementSource + ?Sized>(source: &S, id: &str) -> Result<DataService> {
    let mut record = read_table(source, id, DATA_SERVICE_FIELDS)?;
    Ok(DataService {
        context: data_service_context(),
        id: id.to_string(),
        types: record.take_ids("@type"),
        contact_point: record.take("dcat:contactPoint"),
        endpoint_url: record.take("dcat:endpointURL"),
        serves_dataset: record.take("dcat:servesDataset"),
        conforms_to: record.take("dct:conformsTo"),
        creator: record.take("dct:creator"),
        description: record.take("dct:description"),
        title: record.take("dct:title"),
    })
}

pub fn extract_bucketizer_configuration<S: StatementSource + ?Sized>(
    source: &S,
    id: &str,
) -> Result<BucketizerConfiguration> {
    let mut record = read_table(source, id, BUCKETIZER_CONFIGURATION_FIELDS)?;
    Ok(BucketizerConfiguration {
        context: bucketizer_configuration_context(),
        id: id.to_string(),
        types: record.take_ids("@type"),
        bucketizer: record.take("bucketizer"),
        page_size: record.take("pageSize"),
        path: record.take("path"),
    })
}

/// Extracts a view and pairs it with the relations its node lists.
///
/// # Errors
///
/// Returns `AnnounceError::MissingRequiredPredicate` when the view has no
/// `ldes:configuration`, and `AnnounceError::UnknownViewNode` when the
/// metadata has no node entry for `id`.
pub fn extract_view<S: StatementSource + ?Sized>(source: &S, id: &str, metadata: &TreeMetadata) -> Result<ExtractedView> {
    let mut record = read_table(source, id, VIEW_FIELDS)?;
    let configuration_id = record.node("ldes:configuration")?;
    let node = metadata
        .nodes
        .get(id)
        .ok_or_else(|| AnnounceError::UnknownViewNode(id.to_string()))?;

    let reverse = source
        .matching(
            &TriplePattern::any()
                .with_predicate(tree::VIEW)
                .with_object(node_term(node_from_id(id))),
        )
        .first()
        .map(|triple| ReverseCollection {
            context: reverse_collection_context(),
            view: Reference::new(subject_id(&triple.subject)),
        });

    let mut relations = IndexMap::new();
    for reference in &node.relation {
        match metadata.relations.get(&reference.id) {
            Some(relation) => {
                relations.insert(reference.id.clone(), relation.clone());
            }
            None => log::warn!("Relation '{}' of view '{}' has no descriptor", reference.id, id),
        }
    }

    let view = View {
        context: make_view_context(node.context.as_ref()),
        id: id.to_string(),
        types: node.types.clone(),
        configuration: extract_bucketizer_configuration(source, &configuration_id)?,
        subset: record.take("void:subset"),
        is_version_of: record.take("dct:isVersionOf"),
        issued: record.take("dct:issued"),
        reverse,
        conditional_import: node.conditional_import.clone(),
        import: node.import.clone(),
        import_stream: node.import.clone(),
        relation: node.relation.clone(),
        retention_policy: node.retention_policy.clone(),
        search: node.search.clone(),
    };

    Ok(ExtractedView { view, relations })
}

fn has_type<S: StatementSource + ?Sized>(source: &S, id: &str, type_iri: &str) -> bool {
    let pattern = TriplePattern::any()
        .with_subject(node_from_id(id))
        .with_predicate(rdf::TYPE)
        .with_object(NamedNode::new_unchecked(type_iri));
    !source.matching(&pattern).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcements::graph::{Graph, RdfFormat};
    use crate::announcements::metadata::{NodeDescriptor, RelationDescriptor};
    use crate::announcements::vocab::xsd;
    use serde_json::json;

    const ANNOUNCEMENT: &str = r#"
        @prefix as: <https://www.w3.org/ns/activitystreams#> .
        @prefix tree: <https://w3id.org/tree#> .

        <http://example.org/announce> a as:Announce ;
            as:actor <http://example.org/announcer> ;
            as:object <http://example.org/add> .

        <http://example.org/announcer> a as:Person ;
            as:name "Announcer" ;
            as:href <http://example.org/announcer/profile> .

        <http://example.org/add> a as:Add ;
            as:actor <http://example.org/creator> ;
            as:object <http://example.org/view> ;
            as:url <http://example.org/link> .

        <http://example.org/creator> a as:Person ;
            as:name "Creator" ;
            as:url <http://example.org/creator/profile> .

        <http://example.org/link> a as:Link ;
            as:href <http://example.org/stream> .
    "#;

    const VIEW: &str = r#"
        @prefix tree: <https://w3id.org/tree#> .
        @prefix ldes: <https://w3id.org/ldes#> .
        @prefix void: <http://rdfs.org/ns/void#> .
        @prefix dct: <http://purl.org/dc/terms/> .

        <urn:stream> a ldes:EventStream ;
            tree:view <urn:view1> .

        <urn:view1> a tree:Node ;
            ldes:configuration <urn:config> ;
            void:subset <urn:stream> ;
            dct:isVersionOf <urn:original> .

        <urn:config> a ldes:BucketizerConfiguration ;
            ldes:bucketizer ldes:SubstringBucketizer ;
            ldes:pageSize 50 ;
            tree:path <http://purl.org/dc/terms/title> .
    "#;

    fn parse(turtle: &str) -> Graph {
        Graph::parse(turtle, RdfFormat::Turtle, None).unwrap()
    }

    fn view_metadata() -> TreeMetadata {
        TreeMetadata::default()
            .with_node(NodeDescriptor {
                id: "urn:view1".to_string(),
                types: vec![tree::NODE.to_string()],
                relation: vec![Reference::new("_:r1"), Reference::new("_:gone")],
                import: vec![json!({"@id": "urn:import"})],
                ..Default::default()
            })
            .with_relation(RelationDescriptor {
                id: "_:r1".to_string(),
                node: vec![Reference::new("urn:view2")],
                ..Default::default()
            })
            .with_relation(RelationDescriptor {
                id: "_:other".to_string(),
                ..Default::default()
            })
    }

    #[test]
    fn test_read_table_first_and_all() {
        let graph = parse(r#"<urn:a> a <urn:T1> , <urn:T2> ; <urn:p> "x" , "y" ."#);
        let table = [TYPE, FieldSpec::field("p", "urn:p")];
        let mut record = read_table(&graph, "urn:a", &table).unwrap();

        assert_eq!(record.subject(), "urn:a");
        assert_eq!(record.take_ids("@type"), vec!["urn:T1", "urn:T2"]);
        let first = record.take("p").unwrap();
        assert_eq!(first.as_literal().map(|l| l.value.as_str()), Some("x"));
        assert!(record.take("p").is_none());
        assert!(record.take("absent").is_none());
    }

    #[test]
    fn test_read_table_missing_required() {
        let graph = parse(r#"<urn:a> <urn:p> "x" ."#);
        let table = [FieldSpec::required("q", "urn:q")];
        let result = read_table(&graph, "urn:a", &table);
        assert!(matches!(
            result,
            Err(AnnounceError::MissingRequiredPredicate { ref subject, ref predicate })
                if subject == "urn:a" && predicate == "urn:q"
        ));
    }

    #[test]
    fn test_node_rejects_literal() {
        let graph = parse(r#"<urn:a> <urn:p> "x" ."#);
        let mut record = read_table(&graph, "urn:a", &[FieldSpec::required("p", "urn:p")]).unwrap();
        assert!(matches!(
            record.node("p"),
            Err(AnnounceError::MissingRequiredPredicate { .. })
        ));
    }

    #[test]
    fn test_extract_announcement_with_add() {
        let graph = parse(ANNOUNCEMENT);
        let announcement = extract_announcement(&graph, "http://example.org/announce").unwrap();

        assert_eq!(announcement.context, json!({"@vocab": as_::NAMESPACE}));
        assert_eq!(announcement.types, vec![as_::ANNOUNCE]);
        assert_eq!(
            announcement.actor.url.as_ref().and_then(ShallowValue::as_id),
            Some("http://example.org/announcer/profile")
        );

        let AnnouncementObject::Add(add) = &announcement.object else {
            panic!("Expected an Add payload");
        };
        assert_eq!(add.actor.id, "http://example.org/creator");
        assert_eq!(
            add.actor.url.as_ref().and_then(ShallowValue::as_id),
            Some("http://example.org/creator/profile")
        );
        assert_eq!(add.object.as_ref().and_then(ShallowValue::as_id), Some("http://example.org/view"));
        assert_eq!(add.url.types, vec![as_::LINK]);
        assert_eq!(add.url.href.as_ref().and_then(ShallowValue::as_id), Some("http://example.org/stream"));
    }

    #[test]
    fn test_extract_announcement_without_actor_fails() {
        let graph = parse(
            r#"<urn:announce> a <https://www.w3.org/ns/activitystreams#Announce> ;
                <https://www.w3.org/ns/activitystreams#object> <urn:view> ."#,
        );
        let result = extract_announcement(&graph, "urn:announce");
        assert!(matches!(
            result,
            Err(AnnounceError::MissingRequiredPredicate { ref predicate, .. }) if predicate == as_::ACTOR
        ));
    }

    #[test]
    fn test_extract_announcement_keeps_other_payload_as_reference() {
        let graph = parse(
            r#"@prefix as: <https://www.w3.org/ns/activitystreams#> .
            <urn:announce> a as:Announce ; as:actor <urn:me> ; as:object <urn:view> .
            <urn:view> a <https://w3id.org/tree#Node> ."#,
        );
        let announcement = extract_announcement(&graph, "urn:announce").unwrap();
        assert_eq!(announcement.object, AnnouncementObject::Reference(Reference::new("urn:view")));
        assert!(announcement.actor.types.is_empty());
        assert!(announcement.actor.name.is_none());
    }

    #[test]
    fn test_extract_dataset() {
        let graph = parse(
            r#"@prefix dct: <http://purl.org/dc/terms/> .
            @prefix dcat: <http://www.w3.org/ns/dcat#> .
            <urn:ds> a dcat:Dataset ;
                dct:title "Stream"@en ;
                dct:license <urn:license> ."#,
        );
        let dataset = extract_dataset(&graph, "urn:ds").unwrap();
        assert_eq!(dataset.context, dataset_context());
        assert_eq!(dataset.types, vec![dcat::DATASET]);
        assert_eq!(dataset.title.as_ref().and_then(|t| t.as_literal()).and_then(|l| l.language.as_deref()), Some("en"));
        assert_eq!(dataset.license.as_ref().and_then(ShallowValue::as_id), Some("urn:license"));
        assert!(dataset.creator.is_none());
    }

    #[test]
    fn test_extract_data_service() {
        let graph = parse(
            r#"@prefix dcat: <http://www.w3.org/ns/dcat#> .
            <urn:svc> a dcat:DataService ;
                dcat:endpointURL <http://example.org/ldes> ;
                dcat:servesDataset <urn:ds> ."#,
        );
        let service = extract_data_service(&graph, "urn:svc").unwrap();
        assert_eq!(service.endpoint_url.as_ref().and_then(ShallowValue::as_id), Some("http://example.org/ldes"));
        assert_eq!(service.serves_dataset.as_ref().and_then(ShallowValue::as_id), Some("urn:ds"));
        assert!(service.title.is_none());
    }

    #[test]
    fn test_extract_view() {
        let graph = parse(VIEW);
        let extracted = extract_view(&graph, "urn:view1", &view_metadata()).unwrap();
        let view = &extracted.view;

        assert_eq!(view.context, json!({"@vocab": tree::NAMESPACE}));
        assert_eq!(view.types, vec![tree::NODE]);
        assert_eq!(view.configuration.id, "urn:config");
        assert_eq!(
            view.configuration.bucketizer.as_ref().and_then(ShallowValue::as_id),
            Some(ldes::SUBSTRING_BUCKETIZER)
        );
        let page_size = view.configuration.page_size.as_ref().and_then(|v| v.as_literal()).unwrap();
        assert_eq!(page_size.value, "50");
        assert_eq!(page_size.datatype.as_deref(), Some(xsd::INTEGER));

        assert_eq!(view.subset.as_ref().and_then(ShallowValue::as_id), Some("urn:stream"));
        assert_eq!(view.is_version_of.as_ref().and_then(ShallowValue::as_id), Some("urn:original"));
        assert_eq!(view.reverse.as_ref().map(|r| r.view.id.as_str()), Some("urn:stream"));
        assert_eq!(view.import, view.import_stream);

        // only relations listed by the node, and only those with a descriptor
        assert_eq!(extracted.relations.len(), 1);
        assert_eq!(extracted.relations["_:r1"].node[0].id, "urn:view2");
    }

    #[test]
    fn test_extract_view_blank_configuration() {
        let graph = parse(
            r#"@prefix ldes: <https://w3id.org/ldes#> .
            <urn:view1> ldes:configuration [ ldes:bucketizer ldes:BasicBucketizer ] ."#,
        );
        let extracted = extract_view(&graph, "urn:view1", &view_metadata()).unwrap();
        assert!(extracted.view.configuration.id.starts_with("_:"));
        assert!(extracted.view.configuration.types.is_empty());
        assert!(extracted.view.reverse.is_none());
    }

    #[test]
    fn test_extract_view_without_configuration_fails() {
        let graph = parse("<urn:view1> a <https://w3id.org/tree#Node> .");
        let result = extract_view(&graph, "urn:view1", &view_metadata());
        assert!(matches!(
            result,
            Err(AnnounceError::MissingRequiredPredicate { ref predicate, .. }) if predicate == ldes::CONFIGURATION
        ));
    }

    #[test]
    fn test_extract_view_without_metadata_fails() {
        let graph = parse(VIEW);
        let result = extract_view(&graph, "urn:view1", &TreeMetadata::default());
        assert!(matches!(result, Err(AnnounceError::UnknownViewNode(ref id)) if id == "urn:view1"));
    }
}
