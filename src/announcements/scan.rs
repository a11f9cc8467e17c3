//! Discovery of candidate entities by `rdf:type`.

use indexmap::IndexSet;
use oxrdf::NamedNode;

use super::graph::{subject_id, StatementSource, TriplePattern};
use super::vocab::rdf;

/// Returns the distinct subjects typed `type_iri`, in first-seen order.
pub fn find_subjects_by_type<S: StatementSource + ?Sized>(source: &S, type_iri: &str) -> Vec<String> {
    find_subjects_by_types(source, &[type_iri])
}

/// Returns the distinct subjects typed with any of `type_iris`.
///
/// Types are scanned in the given order; a subject carrying several of them
/// is returned once, at its first position.
pub fn find_subjects_by_types<S: StatementSource + ?Sized>(source: &S, type_iris: &[&str]) -> Vec<String> {
    let mut ids = IndexSet::new();

    for type_iri in type_iris {
        let pattern = TriplePattern::any()
            .with_predicate(rdf::TYPE)
            .with_object(NamedNode::new_unchecked(*type_iri));
        for triple in source.matching(&pattern) {
            ids.insert(subject_id(&triple.subject));
        }
    }

    ids.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcements::graph::{Graph, RdfFormat};
    use crate::announcements::vocab::{dcat, ldes, tree};

    #[test]
    fn test_find_by_type_collapses_duplicates() {
        let graph = Graph::parse(
            r#"
            @prefix tree: <https://w3id.org/tree#> .
            @prefix ex: <http://example.org/> .

            ex:v2 a tree:Node .
            ex:v1 a tree:Node .
            ex:v2 a tree:Node , ex:Other .
            ex:x a ex:Other .
            _:b a tree:Node .
        "#,
            RdfFormat::Turtle,
            None,
        )
        .unwrap();

        let ids = find_subjects_by_type(&graph, tree::NODE);
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], "http://example.org/v2");
        assert_eq!(ids[1], "http://example.org/v1");
        assert!(ids[2].starts_with("_:"));
    }

    #[test]
    fn test_find_by_alternate_types_returns_each_once() {
        let graph = Graph::parse(
            r#"
            @prefix dcat: <http://www.w3.org/ns/dcat#> .
            @prefix ldes: <https://w3id.org/ldes#> .

            <urn:both> a ldes:EventStream , dcat:Dataset .
            <urn:stream> a ldes:EventStream .
            <urn:dataset> a dcat:Dataset .
        "#,
            RdfFormat::Turtle,
            None,
        )
        .unwrap();

        let ids = find_subjects_by_types(&graph, &[dcat::DATASET, ldes::EVENT_STREAM]);
        assert_eq!(ids, vec!["urn:both", "urn:dataset", "urn:stream"]);
    }

    #[test]
    fn test_find_by_type_none() {
        let graph = Graph::new();
        assert!(find_subjects_by_type(&graph, tree::NODE).is_empty());
    }
}
