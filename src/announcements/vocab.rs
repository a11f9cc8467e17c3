//! Fixed vocabulary identifiers.
//!
//! Every extractor and the document builder read their predicates from these
//! tables; consumers of the produced documents depend on the exact IRIs.

/// Activity Streams 2.0.
pub mod activity_streams {
    pub const NAMESPACE: &str = "https://www.w3.org/ns/activitystreams#";
    pub const ANNOUNCE: &str = "https://www.w3.org/ns/activitystreams#Announce";
    pub const ADD: &str = "https://www.w3.org/ns/activitystreams#Add";
    pub const PERSON: &str = "https://www.w3.org/ns/activitystreams#Person";
    pub const LINK: &str = "https://www.w3.org/ns/activitystreams#Link";
    pub const ACTOR: &str = "https://www.w3.org/ns/activitystreams#actor";
    pub const OBJECT: &str = "https://www.w3.org/ns/activitystreams#object";
    pub const URL: &str = "https://www.w3.org/ns/activitystreams#url";
    pub const NAME: &str = "https://www.w3.org/ns/activitystreams#name";
    pub const HREF: &str = "https://www.w3.org/ns/activitystreams#href";
}

/// Data Catalog Vocabulary.
pub mod dcat {
    pub const NAMESPACE: &str = "http://www.w3.org/ns/dcat#";
    pub const DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
    pub const DATA_SERVICE: &str = "http://www.w3.org/ns/dcat#DataService";
    pub const CONTACT_POINT: &str = "http://www.w3.org/ns/dcat#contactPoint";
    pub const ENDPOINT_URL: &str = "http://www.w3.org/ns/dcat#endpointURL";
    pub const SERVES_DATASET: &str = "http://www.w3.org/ns/dcat#servesDataset";
}

/// Dublin Core terms.
pub mod dct {
    pub const NAMESPACE: &str = "http://purl.org/dc/terms/";
    pub const CONFORMS_TO: &str = "http://purl.org/dc/terms/conformsTo";
    pub const CREATOR: &str = "http://purl.org/dc/terms/creator";
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
    pub const ISSUED: &str = "http://purl.org/dc/terms/issued";
    pub const LICENSE: &str = "http://purl.org/dc/terms/license";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const IS_VERSION_OF: &str = "http://purl.org/dc/terms/isVersionOf";
}

/// TREE hypermedia vocabulary.
pub mod tree {
    pub const NAMESPACE: &str = "https://w3id.org/tree#";
    pub const NODE: &str = "https://w3id.org/tree#Node";
    pub const COLLECTION: &str = "https://w3id.org/tree#Collection";
    pub const VIEW: &str = "https://w3id.org/tree#view";
    pub const PATH: &str = "https://w3id.org/tree#path";
    pub const SHAPE: &str = "https://w3id.org/tree#shape";
    pub const RELATION: &str = "https://w3id.org/tree#relation";
}

/// Linked Data Event Streams.
pub mod ldes {
    pub const NAMESPACE: &str = "https://w3id.org/ldes#";
    pub const EVENT_STREAM: &str = "https://w3id.org/ldes#EventStream";
    pub const CONFIGURATION: &str = "https://w3id.org/ldes#configuration";
    pub const BUCKETIZER_CONFIGURATION: &str = "https://w3id.org/ldes#BucketizerConfiguration";
    pub const BUCKETIZER: &str = "https://w3id.org/ldes#bucketizer";
    pub const PAGE_SIZE: &str = "https://w3id.org/ldes#pageSize";
    pub const SUBSTRING_BUCKETIZER: &str = "https://w3id.org/ldes#SubstringBucketizer";
    pub const BASIC_BUCKETIZER: &str = "https://w3id.org/ldes#BasicBucketizer";
    pub const SUBJECT_PAGE_BUCKETIZER: &str = "https://w3id.org/ldes#SubjectPageBucketizer";
}

/// Vocabulary of Interlinked Datasets.
pub mod void {
    pub const NAMESPACE: &str = "http://rdfs.org/ns/void#";
    pub const SUBSET: &str = "http://rdfs.org/ns/void#subset";
}

pub mod xsd {
    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#positiveInteger";
}

pub mod rdf {
    pub const NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// Linked Data Platform, used by hosts that store announcement streams.
pub mod ldp {
    pub const NAMESPACE: &str = "http://www.w3.org/ns/ldp#";
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    pub const INBOX: &str = "http://www.w3.org/ns/ldp#inbox";
}
