//! Materialization of JSON-LD shaped documents into triples.
//!
//! Covers the subset of JSON-LD the documents of this crate use: embedded and
//! scoped local contexts, `@id`, `@type`, value objects, `@reverse`, nested
//! nodes and arrays. Remote contexts are never fetched.

use std::collections::HashMap;

use oxrdf::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use serde_json::{Map, Value};

use super::context::{is_absolute_iri, ResolvedContext};
use super::error::{AnnounceError, Result};
use super::graph::{node_term, Graph};
use super::vocab::{rdf, xsd};

/// Converts a document (or an array of documents) into a graph.
///
/// # Arguments
/// * `document` - A document value, e.g. `serde_json::to_value(&announcement)?`
/// * `base` - Base IRI that relative identifiers such as `#view` resolve against
///
/// # Errors
///
/// Returns `AnnounceError::InvalidDocument` for remote contexts, malformed
/// keywords, and identifiers that stay relative.
///
/// # Example
/// ```ignore
/// let value = serde_json::to_value(&announcement)?;
/// let graph = document_to_graph(&value, Some("https://example.org/inbox/1"))?;
/// ```
pub fn document_to_graph(document: &Value, base: Option<&str>) -> Result<Graph> {
    let mut materializer = Materializer::default();
    let context = ResolvedContext::with_base(base);

    match document {
        Value::Object(map) => {
            materializer.node(map, &context)?;
        }
        Value::Array(items) => {
            for item in items {
                let Value::Object(map) = item else {
                    return Err(AnnounceError::InvalidDocument(
                        "Top-level array items must be objects".to_string(),
                    ));
                };
                materializer.node(map, &context)?;
            }
        }
        _ => {
            return Err(AnnounceError::InvalidDocument(
                "Document must be an object or an array".to_string(),
            ))
        }
    }

    Ok(materializer.graph)
}

#[derive(Default)]
struct Materializer {
    graph: Graph,
    /// Document blank node labels to their relabeled nodes.
    labels: HashMap<String, BlankNode>,
    next_blank: usize,
}

impl Materializer {
    fn fresh_blank(&mut self) -> BlankNode {
        let node = BlankNode::new_unchecked(format!("b{}", self.next_blank));
        self.next_blank += 1;
        node
    }

    fn labeled_blank(&mut self, label: &str) -> BlankNode {
        if let Some(node) = self.labels.get(label) {
            return node.clone();
        }
        let node = self.fresh_blank();
        self.labels.insert(label.to_string(), node.clone());
        node
    }

    /// Emits the triples of a node object and returns its subject.
    fn node(&mut self, map: &Map<String, Value>, active: &ResolvedContext) -> Result<NamedOrBlankNode> {
        let scoped;
        let ctx = match map.get("@context") {
            Some(local) => {
                let mut resolved = active.clone();
                resolved.apply(local)?;
                scoped = resolved;
                &scoped
            }
            None => active,
        };

        let subject = match map.get("@id") {
            Some(Value::String(id)) => self.id_to_node(id, ctx)?,
            Some(other) => {
                return Err(AnnounceError::InvalidDocument(format!("@id must be a string, got {}", other)))
            }
            None => NamedOrBlankNode::BlankNode(self.fresh_blank()),
        };

        for (key, value) in map {
            match key.as_str() {
                "@context" | "@id" => {}
                "@type" => self.add_type_triples(&subject, value, ctx)?,
                "@reverse" => self.add_reverse_triples(&subject, value, ctx)?,
                keyword if keyword.starts_with('@') => {
                    log::debug!("Ignoring unsupported keyword {}", keyword);
                }
                term => {
                    let Some(predicate) = term_to_predicate(term, ctx) else {
                        log::debug!("Dropping '{}': it does not expand to an IRI", term);
                        continue;
                    };
                    let mut objects = Vec::new();
                    self.collect_terms(value, term, ctx, &mut objects)?;
                    for object in objects {
                        self.graph.insert(Triple::new(subject.clone(), predicate.clone(), object));
                    }
                }
            }
        }

        Ok(subject)
    }

    /// Adds rdf:type triples for a node.
    fn add_type_triples(&mut self, subject: &NamedOrBlankNode, value: &Value, ctx: &ResolvedContext) -> Result<()> {
        let rdf_type = NamedNode::new_unchecked(rdf::TYPE);

        for item in one_or_many(value) {
            let Value::String(type_) = item else {
                return Err(AnnounceError::InvalidDocument(format!("@type must be a string, got {}", item)));
            };
            let object = self.iri_to_node(&ctx.expand_term(type_))?;
            self.graph.insert(Triple::new(subject.clone(), rdf_type.clone(), node_term(object)));
        }

        Ok(())
    }

    /// Adds triples pointing at `subject` from the nodes of a `@reverse` map.
    fn add_reverse_triples(&mut self, subject: &NamedOrBlankNode, value: &Value, active: &ResolvedContext) -> Result<()> {
        let Value::Object(map) = value else {
            return Err(AnnounceError::InvalidDocument("@reverse must be an object".to_string()));
        };

        let scoped;
        let ctx = match map.get("@context") {
            Some(local) => {
                let mut resolved = active.clone();
                resolved.apply(local)?;
                scoped = resolved;
                &scoped
            }
            None => active,
        };

        for (key, value) in map {
            if key.starts_with('@') {
                continue;
            }
            let Some(predicate) = term_to_predicate(key, ctx) else {
                log::debug!("Dropping reverse '{}': it does not expand to an IRI", key);
                continue;
            };
            let mut objects = Vec::new();
            self.collect_terms(value, key, ctx, &mut objects)?;
            for object in objects {
                let reverse_subject = match object {
                    Term::NamedNode(node) => NamedOrBlankNode::NamedNode(node),
                    Term::BlankNode(node) => NamedOrBlankNode::BlankNode(node),
                    Term::Literal(_) => {
                        return Err(AnnounceError::InvalidDocument(format!(
                            "@reverse value of '{}' must be a node",
                            key
                        )))
                    }
                };
                self.graph.insert(Triple::new(reverse_subject, predicate.clone(), node_term(subject.clone())));
            }
        }

        Ok(())
    }

    /// Converts a property value into object terms, flattening arrays.
    fn collect_terms(&mut self, value: &Value, term: &str, ctx: &ResolvedContext, out: &mut Vec<Term>) -> Result<()> {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    self.collect_terms(item, term, ctx, out)?;
                }
            }
            Value::Object(map) if map.contains_key("@value") => out.push(value_object_to_literal(map, ctx)?.into()),
            Value::Object(map) => {
                let node = self.node(map, ctx)?;
                out.push(node_term(node));
            }
            Value::String(s) => {
                let object: Term = match ctx.coercions.get(term).map(String::as_str) {
                    Some("@id") => node_term(self.id_to_node(s, ctx)?),
                    Some("@vocab") => node_term(self.iri_to_node(&ctx.expand_term(s))?),
                    Some(datatype) => Literal::new_typed_literal(s.as_str(), NamedNode::new_unchecked(datatype)).into(),
                    None => Literal::new_simple_literal(s.as_str()).into(),
                };
                out.push(object);
            }
            Value::Bool(_) | Value::Number(_) => out.push(native_to_literal(value).into()),
        }
        Ok(())
    }

    fn id_to_node(&mut self, id: &str, ctx: &ResolvedContext) -> Result<NamedOrBlankNode> {
        self.iri_to_node(&ctx.expand_id(id))
    }

    fn iri_to_node(&mut self, iri: &str) -> Result<NamedOrBlankNode> {
        if let Some(label) = iri.strip_prefix("_:") {
            return Ok(NamedOrBlankNode::BlankNode(self.labeled_blank(label)));
        }
        if !is_absolute_iri(iri) {
            return Err(AnnounceError::InvalidDocument(format!(
                "'{}' does not resolve to an absolute IRI",
                iri
            )));
        }
        Ok(NamedOrBlankNode::NamedNode(NamedNode::new_unchecked(iri)))
    }
}

fn term_to_predicate(term: &str, ctx: &ResolvedContext) -> Option<NamedNode> {
    let expanded = ctx.expand_term(term);
    is_absolute_iri(&expanded).then(|| NamedNode::new_unchecked(expanded))
}

/// Converts a `{"@value": ..}` object into a literal.
fn value_object_to_literal(map: &Map<String, Value>, ctx: &ResolvedContext) -> Result<Literal> {
    let value = map.get("@value").unwrap_or(&Value::Null);

    if let Some(language) = map.get("@language").and_then(Value::as_str) {
        let Value::String(s) = value else {
            return Err(AnnounceError::InvalidDocument(
                "Language-tagged @value must be a string".to_string(),
            ));
        };
        return Literal::new_language_tagged_literal(s.as_str(), language)
            .map_err(|e| AnnounceError::InvalidDocument(format!("Invalid language tag '{}': {}", language, e)));
    }

    let lexical = match value {
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) if !map.contains_key("@type") => return Ok(native_to_literal(value)),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(AnnounceError::InvalidDocument(format!("Unsupported @value {}", value)));
        }
    };

    match map.get("@type").and_then(Value::as_str) {
        Some(datatype) => Ok(Literal::new_typed_literal(
            lexical,
            NamedNode::new_unchecked(ctx.expand_term(datatype)),
        )),
        None => Ok(Literal::new_simple_literal(lexical)),
    }
}

/// Converts a JSON boolean or number into an XSD typed literal.
fn native_to_literal(value: &Value) -> Literal {
    match value {
        Value::Bool(b) => Literal::new_typed_literal(b.to_string(), NamedNode::new_unchecked(xsd::BOOLEAN)),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            Literal::new_typed_literal(n.to_string(), NamedNode::new_unchecked(xsd::INTEGER))
        }
        Value::Number(n) => Literal::new_typed_literal(n.to_string(), NamedNode::new_unchecked(xsd::DOUBLE)),
        other => Literal::new_simple_literal(other.to_string()),
    }
}

fn one_or_many(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        single => std::slice::from_ref(single),
    }
}
