//! Typed JSON-LD documents produced by the extractors and the builder.
//!
//! Documents are plain values: they are created fresh by every call and carry
//! no identity beyond their `@id`. Serializing one with `serde_json` yields the
//! JSON-LD shape existing consumers expect.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::metadata::RelationDescriptor;

/// A literal value record.
///
/// `datatype` and `language` are never both set: a language tag wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    #[serde(rename = "@value")]
    pub value: String,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "@language", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    /// A literal without datatype or language.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn language_tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }
}

/// An opaque pointer to another node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "@id")]
    pub id: String,
}

impl Reference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A term dereferenced without following its outgoing statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ShallowValue {
    Literal(Literal),
    Reference(Reference),
}

impl ShallowValue {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            ShallowValue::Literal(literal) => Some(literal),
            ShallowValue::Reference(_) => None,
        }
    }

    /// The referenced identifier, `None` for literals.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            ShallowValue::Reference(reference) => Some(&reference.id),
            ShallowValue::Literal(_) => None,
        }
    }
}

impl From<Literal> for ShallowValue {
    fn from(literal: Literal) -> Self {
        ShallowValue::Literal(literal)
    }
}

impl From<Reference> for ShallowValue {
    fn from(reference: Reference) -> Self {
        ShallowValue::Reference(reference)
    }
}

/// A term dereferenced by following every outgoing statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DeepValue {
    Literal(Literal),
    /// Emitted instead of an expansion when the node is already on the path.
    Reference(Reference),
    Object(ExpandedObject),
}

impl DeepValue {
    pub fn as_object(&self) -> Option<&ExpandedObject> {
        match self {
            DeepValue::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// A node with its outgoing statements grouped by predicate IRI.
///
/// Values keep the order in which statements were met; nothing is
/// deduplicated. Blank nodes carry no `@id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpandedObject {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(flatten)]
    pub properties: IndexMap<String, Vec<DeepValue>>,
}

impl ExpandedObject {
    pub fn get(&self, predicate: &str) -> Option<&[DeepValue]> {
        self.properties.get(predicate).map(Vec::as_slice)
    }
}

// Nested objects are unlinked onto a heap stack so long expansion chains do
// not recurse through drop glue.
impl Drop for ExpandedObject {
    fn drop(&mut self) {
        let mut pending: Vec<ExpandedObject> = Vec::new();
        let mut properties = std::mem::take(&mut self.properties);
        loop {
            for (_, values) in properties.drain(..) {
                for value in values {
                    if let DeepValue::Object(object) = value {
                        pending.push(object);
                    }
                }
            }
            match pending.pop() {
                Some(mut object) => properties = std::mem::take(&mut object.properties),
                None => break,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<ShallowValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<ShallowValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<ShallowValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<ShallowValue>,
}

/// The `as:Add` activity carried by an announcement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Add {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    pub actor: Person,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<ShallowValue>,
    pub url: Link,
}

/// The payload of an announcement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnnouncementObject {
    Add(Box<Add>),
    View(Box<View>),
    Reference(Reference),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Announcement {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    /// Written with its url under `href`, the property announcers are read from.
    #[serde(serialize_with = "serialize_announcer")]
    pub actor: Person,
    pub object: AnnouncementObject,
}

fn serialize_announcer<S: Serializer>(person: &Person, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("@id", &person.id)?;
    map.serialize_entry("@type", &person.types)?;
    if let Some(name) = &person.name {
        map.serialize_entry("name", name)?;
    }
    if let Some(url) = &person.url {
        map.serialize_entry("href", url)?;
    }
    map.end()
}

impl Announcement {
    /// Replaces the payload with a full view document.
    pub fn attach_view(&mut self, view: View) {
        self.object = AnnouncementObject::View(Box::new(view));
    }

    pub fn view(&self) -> Option<&View> {
        match &self.object {
            AnnouncementObject::View(view) => Some(view),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    #[serde(rename = "dct:conformsTo", skip_serializing_if = "Option::is_none")]
    pub conforms_to: Option<ShallowValue>,
    #[serde(rename = "dct:creator", skip_serializing_if = "Option::is_none")]
    pub creator: Option<ShallowValue>,
    #[serde(rename = "dct:description", skip_serializing_if = "Option::is_none")]
    pub description: Option<ShallowValue>,
    #[serde(rename = "dct:identifier", skip_serializing_if = "Option::is_none")]
    pub identifier: Option<ShallowValue>,
    #[serde(rename = "dct:issued", skip_serializing_if = "Option::is_none")]
    pub issued: Option<ShallowValue>,
    #[serde(rename = "dct:license", skip_serializing_if = "Option::is_none")]
    pub license: Option<ShallowValue>,
    #[serde(rename = "dct:title", skip_serializing_if = "Option::is_none")]
    pub title: Option<ShallowValue>,
    #[serde(rename = "tree:shape", skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShallowValue>,
    #[serde(rename = "tree:view", skip_serializing_if = "Option::is_none")]
    pub view: Option<ShallowValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataService {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    #[serde(rename = "dcat:contactPoint", skip_serializing_if = "Option::is_none")]
    pub contact_point: Option<ShallowValue>,
    #[serde(rename = "dcat:endpointURL", skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<ShallowValue>,
    #[serde(rename = "dcat:servesDataset", skip_serializing_if = "Option::is_none")]
    pub serves_dataset: Option<ShallowValue>,
    #[serde(rename = "dct:conformsTo", skip_serializing_if = "Option::is_none")]
    pub conforms_to: Option<ShallowValue>,
    #[serde(rename = "dct:creator", skip_serializing_if = "Option::is_none")]
    pub creator: Option<ShallowValue>,
    #[serde(rename = "dct:description", skip_serializing_if = "Option::is_none")]
    pub description: Option<ShallowValue>,
    #[serde(rename = "dct:title", skip_serializing_if = "Option::is_none")]
    pub title: Option<ShallowValue>,
}

/// Fragmentation settings of a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketizerConfiguration {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucketizer: Option<ShallowValue>,
    #[serde(rename = "pageSize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<ShallowValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<ShallowValue>,
}

/// The collection that lists a view through `tree:view`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReverseCollection {
    #[serde(rename = "@context")]
    pub context: Value,
    pub view: Reference,
}

/// One page/fragment descriptor of a paginated collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    #[serde(rename = "ldes:configuration")]
    pub configuration: BucketizerConfiguration,
    #[serde(rename = "void:subset", skip_serializing_if = "Option::is_none")]
    pub subset: Option<ShallowValue>,
    #[serde(rename = "dct:isVersionOf", skip_serializing_if = "Option::is_none")]
    pub is_version_of: Option<ShallowValue>,
    #[serde(rename = "dct:issued", skip_serializing_if = "Option::is_none")]
    pub issued: Option<ShallowValue>,
    #[serde(rename = "@reverse", skip_serializing_if = "Option::is_none")]
    pub reverse: Option<ReverseCollection>,
    #[serde(rename = "conditionalImport", skip_serializing_if = "Vec::is_empty")]
    pub conditional_import: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub import: Vec<Value>,
    #[serde(rename = "importStream", skip_serializing_if = "Vec::is_empty")]
    pub import_stream: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relation: Vec<Reference>,
    #[serde(rename = "retentionPolicy", skip_serializing_if = "Vec::is_empty")]
    pub retention_policy: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search: Vec<Value>,
}

/// A view together with the relations leaving it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedView {
    pub view: View,
    pub relations: IndexMap<String, RelationDescriptor>,
}
