//! In-memory triple store and the pattern query every extractor is built on.

use indexmap::{IndexMap, IndexSet};
use oxrdf::{BlankNode, NamedNode, NamedOrBlankNode, Term, Triple};
use oxrdfio::{RdfFormat as OxRdfFormat, RdfParser};

use super::error::{AnnounceError, Result};

/// Supported RDF input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// N-Quads format (.nq), graph names are dropped
    NQuads,
    /// RDF/XML format (.rdf, .xml)
    RdfXml,
}

impl RdfFormat {
    fn to_oxrdf_format(self) -> OxRdfFormat {
        match self {
            RdfFormat::Turtle => OxRdfFormat::Turtle,
            RdfFormat::NTriples => OxRdfFormat::NTriples,
            RdfFormat::NQuads => OxRdfFormat::NQuads,
            RdfFormat::RdfXml => OxRdfFormat::RdfXml,
        }
    }
}

/// A `(subject, predicate, object)` pattern where `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<NamedOrBlankNode>,
    pub predicate: Option<NamedNode>,
    pub object: Option<Term>,
}

impl TriplePattern {
    /// Matches every statement.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: impl Into<NamedOrBlankNode>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_predicate(mut self, predicate: &str) -> Self {
        self.predicate = Some(NamedNode::new_unchecked(predicate));
        self
    }

    pub fn with_object(mut self, object: impl Into<Term>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }
}

/// Anything that can answer "which statements match this pattern".
///
/// This is the only query primitive the extraction engine relies on. Results
/// come back in the source's iteration order; callers must not depend on that
/// order for anything but the visible order of document fields.
pub trait StatementSource {
    fn matching(&self, pattern: &TriplePattern) -> Vec<&Triple>;

    /// All statements of the source.
    fn statements(&self) -> Vec<&Triple> {
        self.matching(&TriplePattern::any())
    }
}

impl StatementSource for [Triple] {
    fn matching(&self, pattern: &TriplePattern) -> Vec<&Triple> {
        self.iter().filter(|t| pattern.matches(t)).collect()
    }
}

/// An ordered RDF graph.
///
/// Triples are deduplicated on insert and iterate in first-insertion order, so
/// extraction over a `Graph` is deterministic. Patterns with a subject are
/// answered from a subject index instead of a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: IndexSet<Triple>,
    /// Positions in `triples` of each subject's statements, in insertion order.
    by_subject: IndexMap<NamedOrBlankNode, Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triple to the graph. Returns false if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        let (index, inserted) = self.triples.insert_full(triple);
        if inserted {
            self.by_subject
                .entry(self.triples[index].subject.clone())
                .or_default()
                .push(index);
        }
        inserted
    }

    /// Returns the number of triples in the graph.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if the graph contains no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Returns an iterator over the triples.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Parses RDF text into a graph.
    ///
    /// # Arguments
    ///
    /// * `input` - The RDF data as a string
    /// * `format` - The RDF format of the input
    /// * `base` - Optional base IRI for resolving relative IRIs
    ///
    /// # Errors
    ///
    /// Returns `AnnounceError::Parse` if the base IRI or the input is invalid.
    pub fn parse(input: &str, format: RdfFormat, base: Option<&str>) -> Result<Self> {
        let mut parser = RdfParser::from_format(format.to_oxrdf_format());

        if let Some(base_iri) = base {
            parser = parser
                .with_base_iri(base_iri)
                .map_err(|e| AnnounceError::Parse(format!("Invalid base IRI: {}", e)))?;
        }

        let mut graph = Graph::new();
        for quad in parser.for_reader(input.as_bytes()) {
            let quad = quad.map_err(|e| AnnounceError::Parse(format!("Failed to parse RDF: {}", e)))?;
            graph.insert(Triple::new(quad.subject, quad.predicate, quad.object));
        }

        Ok(graph)
    }
}

impl StatementSource for Graph {
    fn matching(&self, pattern: &TriplePattern) -> Vec<&Triple> {
        match &pattern.subject {
            Some(subject) => self
                .by_subject
                .get(subject)
                .map(|indices| {
                    indices
                        .iter()
                        .filter_map(|&index| self.triples.get_index(index))
                        .filter(|t| pattern.matches(t))
                        .collect()
                })
                .unwrap_or_default(),
            None => self.triples.iter().filter(|t| pattern.matches(t)).collect(),
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = indexmap::set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

/// Converts a document identifier back into a graph node.
///
/// `_:label` becomes a blank node, anything else a named node.
pub fn node_from_id(id: &str) -> NamedOrBlankNode {
    match id.strip_prefix("_:") {
        Some(label) => NamedOrBlankNode::BlankNode(BlankNode::new_unchecked(label)),
        None => NamedOrBlankNode::NamedNode(NamedNode::new_unchecked(id)),
    }
}

/// Widens a subject node into an object term.
pub fn node_term(node: NamedOrBlankNode) -> Term {
    match node {
        NamedOrBlankNode::NamedNode(node) => Term::NamedNode(node),
        NamedOrBlankNode::BlankNode(node) => Term::BlankNode(node),
    }
}

/// The identifier of a node term, `None` for literals.
pub fn term_id(term: &Term) -> Option<String> {
    match term {
        Term::NamedNode(node) => Some(node.as_str().to_string()),
        Term::BlankNode(node) => Some(format!("_:{}", node.as_str())),
        Term::Literal(_) => None,
    }
}

pub(crate) fn subject_id(subject: &NamedOrBlankNode) -> String {
    match subject {
        NamedOrBlankNode::NamedNode(node) => node.as_str().to_string(),
        NamedOrBlankNode::BlankNode(node) => format!("_:{}", node.as_str()),
    }
}
