//! Dereferencing graph terms into document values.

use std::collections::HashSet;

use indexmap::IndexMap;
use oxrdf::{NamedOrBlankNode, Term, Triple};

use super::document::{DeepValue, ExpandedObject, Literal, Reference, ShallowValue};
use super::graph::{term_id, StatementSource, TriplePattern};
use super::vocab::rdf;

/// A non-fatal event observed while resolving terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A node was met again on its own expansion path and was emitted as a
    /// reference instead of being expanded.
    CircularReference { id: String },
}

/// Converts an RDF literal into a literal record.
pub fn literal_value(literal: &oxrdf::Literal) -> Literal {
    match literal.language() {
        Some(language) => Literal::language_tagged(literal.value(), language),
        None => Literal::typed(literal.value(), literal.datatype().as_str()),
    }
}

/// Dereferences a term without following any statement.
///
/// Literals become literal records, named and blank nodes a `{@id}` reference.
pub fn resolve_shallow(term: &Term) -> ShallowValue {
    match term {
        Term::Literal(literal) => ShallowValue::Literal(literal_value(literal)),
        Term::NamedNode(node) => ShallowValue::Reference(Reference::new(node.as_str())),
        Term::BlankNode(node) => ShallowValue::Reference(Reference::new(format!("_:{}", node.as_str()))),
    }
}

/// Resolves terms against one statement source.
///
/// Deep resolution expands nodes transitively and guards against cycles with
/// the set of node ids currently being expanded. The set is private to each
/// [`resolve_deep`](Self::resolve_deep) call. Cycles are recorded as
/// [`Diagnostic`]s the caller can inspect afterwards.
pub struct TermResolver<'g, S: StatementSource + ?Sized> {
    source: &'g S,
    diagnostics: Vec<Diagnostic>,
}

impl<'g, S: StatementSource + ?Sized> TermResolver<'g, S> {
    pub fn new(source: &'g S) -> Self {
        Self {
            source,
            diagnostics: Vec::new(),
        }
    }

    pub fn resolve_shallow(&self, term: &Term) -> ShallowValue {
        resolve_shallow(term)
    }

    /// Dereferences a term, following every outgoing statement of nodes.
    ///
    /// Expansion runs on an explicit stack of frames, so the depth of the
    /// graph does not bound the depth of the call stack.
    pub fn resolve_deep(&mut self, term: &Term) -> DeepValue {
        let root = match term {
            Term::Literal(literal) => return DeepValue::Literal(literal_value(literal)),
            node => node,
        };

        let source = self.source;
        let mut path = HashSet::new();
        let mut stack: Vec<Frame<'g>> = Frame::enter(source, root, None, &mut path).into_iter().collect();
        let mut finished = None;

        while let Some(frame) = stack.last_mut() {
            match frame.pending.next() {
                Some(triple) if triple.predicate.as_str() == rdf::TYPE => {
                    frame.object.type_ = match &triple.object {
                        Term::Literal(literal) => Some(literal.value().to_string()),
                        other => term_id(other),
                    };
                }
                Some(triple) => {
                    let predicate = triple.predicate.as_str().to_string();
                    match &triple.object {
                        Term::Literal(literal) => {
                            frame.push(predicate, DeepValue::Literal(literal_value(literal)));
                        }
                        object => match term_id(object) {
                            Some(id) if path.contains(&id) => {
                                log::warn!("Circular reference to '{}', emitting a reference instead", id);
                                self.diagnostics.push(Diagnostic::CircularReference { id: id.clone() });
                                frame.push(predicate, DeepValue::Reference(Reference::new(id)));
                            }
                            _ => stack.extend(Frame::enter(source, object, Some(predicate), &mut path)),
                        },
                    }
                }
                None => {
                    if let Some(Frame {
                        path_id,
                        predicate,
                        object,
                        ..
                    }) = stack.pop()
                    {
                        if let Some(id) = &path_id {
                            path.remove(id);
                        }
                        match (stack.last_mut(), predicate) {
                            (Some(parent), Some(predicate)) => parent.push(predicate, DeepValue::Object(object)),
                            _ => finished = Some(object),
                        }
                    }
                }
            }
        }

        DeepValue::Object(finished.unwrap_or_default())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// One node under expansion: its statements not yet visited and the object
/// built from the ones already visited.
struct Frame<'g> {
    /// Id held in the path set while this frame is open.
    path_id: Option<String>,
    /// Predicate under which the finished object attaches to its parent.
    predicate: Option<String>,
    object: ExpandedObject,
    pending: std::vec::IntoIter<&'g Triple>,
}

impl<'g> Frame<'g> {
    fn enter<S: StatementSource + ?Sized>(
        source: &'g S,
        node: &Term,
        predicate: Option<String>,
        path: &mut HashSet<String>,
    ) -> Option<Self> {
        let subject = match node {
            Term::NamedNode(node) => NamedOrBlankNode::NamedNode(node.clone()),
            Term::BlankNode(node) => NamedOrBlankNode::BlankNode(node.clone()),
            Term::Literal(_) => return None,
        };

        let path_id = term_id(node);
        if let Some(id) = &path_id {
            path.insert(id.clone());
        }

        let object = ExpandedObject {
            id: match &subject {
                NamedOrBlankNode::NamedNode(node) => Some(node.as_str().to_string()),
                NamedOrBlankNode::BlankNode(_) => None,
            },
            type_: None,
            properties: IndexMap::new(),
        };
        let pending = source.matching(&TriplePattern::any().with_subject(subject)).into_iter();

        Some(Self {
            path_id,
            predicate,
            object,
            pending,
        })
    }

    fn push(&mut self, predicate: String, value: DeepValue) {
        self.object.properties.entry(predicate).or_default().push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcements::graph::{Graph, RdfFormat};
    use oxrdf::{BlankNode, NamedNode};

    fn parse(turtle: &str) -> Graph {
        Graph::parse(turtle, RdfFormat::Turtle, None).unwrap()
    }

    fn named(iri: &str) -> Term {
        Term::NamedNode(NamedNode::new_unchecked(iri))
    }

    #[test]
    fn test_shallow_literal_and_nodes() {
        let literal = Term::Literal(oxrdf::Literal::new_typed_literal(
            "10",
            NamedNode::new_unchecked(crate::announcements::vocab::xsd::INTEGER),
        ));
        match resolve_shallow(&literal) {
            ShallowValue::Literal(l) => {
                assert_eq!(l.value, "10");
                assert_eq!(l.datatype.as_deref(), Some(crate::announcements::vocab::xsd::INTEGER));
            }
            _ => panic!("Expected literal"),
        }

        assert_eq!(resolve_shallow(&named("urn:a")).as_id(), Some("urn:a"));
        let blank = Term::BlankNode(BlankNode::new_unchecked("b0"));
        assert_eq!(resolve_shallow(&blank).as_id(), Some("_:b0"));
    }

    #[test]
    fn test_language_wins_over_datatype() {
        let term = Term::Literal(oxrdf::Literal::new_language_tagged_literal_unchecked("titel", "nl"));
        let literal = resolve_shallow(&term);
        let literal = literal.as_literal().unwrap();
        assert_eq!(literal.language.as_deref(), Some("nl"));
        assert!(literal.datatype.is_none());
    }

    #[test]
    fn test_deep_literal_stays_literal() {
        let graph = Graph::new();
        let mut resolver = TermResolver::new(&graph);
        let value = resolver.resolve_deep(&Term::Literal(oxrdf::Literal::new_simple_literal("x")));
        assert!(matches!(value, DeepValue::Literal(_)));
    }

    #[test]
    fn test_deep_node_without_statements() {
        let graph = parse("<urn:other> <urn:p> \"x\" .");
        let mut resolver = TermResolver::new(&graph);
        let value = resolver.resolve_deep(&named("urn:lonely"));

        let object = value.as_object().unwrap();
        assert_eq!(object.id.as_deref(), Some("urn:lonely"));
        assert!(object.type_.is_none());
        assert!(object.properties.is_empty());
    }

    #[test]
    fn test_deep_expansion_follows_blank_nodes() {
        let graph = parse(
            r#"
            @prefix ex: <http://example.org/> .
            ex:view ex:configuration [
                a ex:Config ;
                ex:pageSize 10 ;
                ex:path ex:prop
            ] .
        "#,
        );
        let mut resolver = TermResolver::new(&graph);
        let value = resolver.resolve_deep(&named("http://example.org/view"));
        let object = value.as_object().unwrap();

        let config = object.get("http://example.org/configuration").unwrap();
        assert_eq!(config.len(), 1);
        let config = config[0].as_object().unwrap();
        assert!(config.id.is_none());
        assert_eq!(config.type_.as_deref(), Some("http://example.org/Config"));

        let page_size = &config.get("http://example.org/pageSize").unwrap()[0];
        assert!(matches!(page_size, DeepValue::Literal(l) if l.value == "10"));

        let path = config.get("http://example.org/path").unwrap()[0].as_object().unwrap();
        assert_eq!(path.id.as_deref(), Some("http://example.org/prop"));
        assert!(resolver.diagnostics().is_empty());
    }

    #[test]
    fn test_cycle_emits_reference_to_root() {
        let graph = parse(
            r#"
            @prefix ex: <http://example.org/> .
            ex:a ex:next ex:b .
            ex:b ex:next ex:a .
        "#,
        );
        let mut resolver = TermResolver::new(&graph);
        let value = resolver.resolve_deep(&named("http://example.org/a"));

        let a = value.as_object().unwrap();
        let b = a.get("http://example.org/next").unwrap()[0].as_object().unwrap();
        assert_eq!(b.id.as_deref(), Some("http://example.org/b"));

        let back = &b.get("http://example.org/next").unwrap()[0];
        assert_eq!(
            back,
            &DeepValue::Reference(Reference::new("http://example.org/a"))
        );
        assert_eq!(
            resolver.into_diagnostics(),
            vec![Diagnostic::CircularReference {
                id: "http://example.org/a".to_string()
            }]
        );
    }

    #[test]
    fn test_self_loop() {
        let graph = parse("<urn:a> <urn:p> <urn:a> .");
        let mut resolver = TermResolver::new(&graph);
        let value = resolver.resolve_deep(&named("urn:a"));
        let a = value.as_object().unwrap();
        assert_eq!(a.get("urn:p").unwrap()[0], DeepValue::Reference(Reference::new("urn:a")));
    }

    #[test]
    fn test_shared_node_is_expanded_on_each_path() {
        let graph = parse(
            r#"
            <urn:a> <urn:p> <urn:shared> , <urn:other> .
            <urn:other> <urn:p> <urn:shared> .
            <urn:shared> <urn:q> "leaf" .
        "#,
        );
        let mut resolver = TermResolver::new(&graph);
        let value = resolver.resolve_deep(&named("urn:a"));
        let a = value.as_object().unwrap();

        let values = a.get("urn:p").unwrap();
        assert_eq!(values.len(), 2);
        assert!(values.iter().all(|v| v.as_object().is_some()));
        assert!(resolver.diagnostics().is_empty());
    }

    #[test]
    fn test_long_chain_resolves_without_recursion() {
        const LENGTH: usize = 20_000;
        let next = NamedNode::new_unchecked("urn:next");
        let graph: Graph = (0..LENGTH)
            .map(|i| {
                oxrdf::Triple::new(
                    NamedNode::new_unchecked(format!("urn:n{}", i)),
                    next.clone(),
                    NamedNode::new_unchecked(format!("urn:n{}", i + 1)),
                )
            })
            .collect();

        let mut resolver = TermResolver::new(&graph);
        let value = resolver.resolve_deep(&named("urn:n0"));

        let mut depth = 0;
        let mut current = value.as_object().unwrap();
        while let Some(values) = current.get("urn:next") {
            assert_eq!(values.len(), 1);
            current = values[0].as_object().unwrap();
            depth += 1;
        }
        assert_eq!(depth, LENGTH);
        assert_eq!(current.id.as_deref(), Some(format!("urn:n{}", LENGTH).as_str()));
        assert!(resolver.diagnostics().is_empty());
    }

    #[test]
    fn test_long_cycle_reports_root_once() {
        const LENGTH: usize = 10_000;
        let next = NamedNode::new_unchecked("urn:next");
        let graph: Graph = (0..LENGTH)
            .map(|i| {
                oxrdf::Triple::new(
                    NamedNode::new_unchecked(format!("urn:n{}", i)),
                    next.clone(),
                    NamedNode::new_unchecked(format!("urn:n{}", (i + 1) % LENGTH)),
                )
            })
            .collect();

        let mut resolver = TermResolver::new(&graph);
        let value = resolver.resolve_deep(&named("urn:n0"));

        let mut current = value.as_object().unwrap();
        let mut last = None;
        while let Some(values) = current.get("urn:next") {
            match values[0].as_object() {
                Some(object) => current = object,
                None => {
                    last = Some(values[0].clone());
                    break;
                }
            }
        }
        assert_eq!(current.id.as_deref(), Some(format!("urn:n{}", LENGTH - 1).as_str()));
        assert_eq!(last, Some(DeepValue::Reference(Reference::new("urn:n0"))));
        assert_eq!(
            resolver.into_diagnostics(),
            vec![Diagnostic::CircularReference {
                id: "urn:n0".to_string()
            }]
        );
    }

    #[test]
    fn test_repeated_predicate_appends_in_order() {
        let graph = parse(r#"<urn:a> <urn:p> "one" , "two" , "one" ."#);
        let mut resolver = TermResolver::new(&graph);
        let value = resolver.resolve_deep(&named("urn:a"));
        let values = value.as_object().unwrap().get("urn:p").unwrap();
        // Turtle object lists are deduplicated by the graph itself
        assert_eq!(values.len(), 2);
        assert!(matches!(&values[0], DeepValue::Literal(l) if l.value == "one"));
        assert!(matches!(&values[1], DeepValue::Literal(l) if l.value == "two"));
    }
}
