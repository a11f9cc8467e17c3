//! JSON-LD contexts: the fixed headers of each document, view context
//! composition, and the term mappings used to expand documents back into IRIs.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use super::error::{AnnounceError, Result};
use super::vocab::{activity_streams, dcat, dct, ldes, tree, void};

/// Context of announcements.
pub fn announcement_context() -> Value {
    json!({ "@vocab": activity_streams::NAMESPACE })
}

/// Context of datasets.
pub fn dataset_context() -> Value {
    json!({
        "dct": dct::NAMESPACE,
        "dcat": dcat::NAMESPACE,
        "tree": tree::NAMESPACE,
        "ldes": ldes::NAMESPACE,
    })
}

/// Context of data services.
pub fn data_service_context() -> Value {
    json!({
        "dct": dct::NAMESPACE,
        "dcat": dcat::NAMESPACE,
    })
}

/// Context of bucketizer configurations.
pub fn bucketizer_configuration_context() -> Value {
    json!({
        "@vocab": ldes::NAMESPACE,
        "path": tree::PATH,
    })
}

/// Context of the reverse `tree:view` edge of a view.
pub fn reverse_collection_context() -> Value {
    json!({ "@vocab": tree::NAMESPACE })
}

/// Builds the context of a view from the context of its tree node.
///
/// - absent, null, empty string or empty object: `{"@vocab": TREE}`
/// - any other string: `{"@vocab": <string>}`
/// - non-empty object: the same object with the `ldes` and `void` prefixes added
/// - array: the prefixes are prepended as their own object, so definitions in
///   the node's contexts take precedence
///
/// A prefix the node context already binds is never overwritten; a conflicting
/// binding is kept and logged.
pub fn make_view_context(node_context: Option<&Value>) -> Value {
    match node_context {
        Some(Value::String(vocab)) if !vocab.is_empty() => json!({ "@vocab": vocab }),
        Some(Value::Object(map)) if !map.is_empty() => {
            let mut map = map.clone();
            add_prefix(&mut map, "ldes", ldes::NAMESPACE);
            add_prefix(&mut map, "void", void::NAMESPACE);
            Value::Object(map)
        }
        Some(Value::Array(items)) => {
            let mut prefixes = Map::new();
            prefixes.insert("ldes".to_string(), Value::String(ldes::NAMESPACE.to_string()));
            prefixes.insert("void".to_string(), Value::String(void::NAMESPACE.to_string()));
            for item in items {
                if let Value::Object(map) = item {
                    for key in ["ldes", "void"] {
                        if let Some(existing) = map.get(key) {
                            if existing != &prefixes[key] {
                                log::warn!("View context binds '{}' to {}, keeping it", key, existing);
                            }
                        }
                    }
                }
            }
            let mut contexts = vec![Value::Object(prefixes)];
            contexts.extend(items.iter().cloned());
            Value::Array(contexts)
        }
        _ => json!({ "@vocab": tree::NAMESPACE }),
    }
}

fn add_prefix(map: &mut Map<String, Value>, prefix: &str, namespace: &str) {
    match map.get(prefix) {
        None => {
            map.insert(prefix.to_string(), Value::String(namespace.to_string()));
        }
        Some(Value::String(existing)) if existing == namespace => {}
        Some(existing) => {
            log::warn!(
                "View context binds '{}' to {} instead of {}, keeping it",
                prefix,
                existing,
                namespace
            );
        }
    }
}

/// Holds resolved term and prefix mappings of the active JSON-LD context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedContext {
    /// Map from short term to full IRI (e.g., "path" -> "https://w3id.org/tree#path")
    pub terms: HashMap<String, String>,

    /// Map from prefix to namespace (e.g., "ldes" -> "https://w3id.org/ldes#")
    pub prefixes: HashMap<String, String>,

    /// Type coercion of terms (`"@id"`, `"@vocab"` or a datatype IRI)
    pub coercions: HashMap<String, String>,

    /// The @base IRI for resolving relative references
    pub base: Option<String>,

    /// The @vocab IRI used as default namespace for unknown terms
    pub vocab: Option<String>,
}

impl ResolvedContext {
    pub fn with_base(base: Option<&str>) -> Self {
        Self {
            base: base.map(str::to_string),
            ..Default::default()
        }
    }

    /// Processes a local context on top of this one.
    ///
    /// Remote (string) contexts are rejected: nothing is fetched.
    pub fn apply(&mut self, context: &Value) -> Result<()> {
        match context {
            Value::Null => {
                let base = self.base.take();
                *self = Self::with_base(base.as_deref());
                Ok(())
            }
            Value::String(url) => Err(AnnounceError::InvalidDocument(format!(
                "remote context {} cannot be loaded",
                url
            ))),
            Value::Array(items) => {
                for item in items {
                    self.apply(item)?;
                }
                Ok(())
            }
            Value::Object(map) => {
                self.apply_object(map);
                Ok(())
            }
            _ => Err(AnnounceError::InvalidDocument(
                "Context must be null, string, array, or object".to_string(),
            )),
        }
    }

    fn apply_object(&mut self, map: &Map<String, Value>) {
        if let Some(base) = map.get("@base") {
            self.base = match base {
                Value::String(iri) => Some(match &self.base {
                    Some(current) if !is_absolute_iri(iri) => resolve_relative_iri(current, iri),
                    _ => iri.clone(),
                }),
                _ => None,
            };
        }
        if let Some(vocab) = map.get("@vocab") {
            self.vocab = vocab.as_str().map(|v| self.expand_iri(v, true));
        }

        // Prefixes first, so term definitions may use them regardless of order.
        for (key, value) in map {
            if key.starts_with('@') {
                continue;
            }
            if let Some(iri) = definition_iri(value) {
                if is_absolute_iri(iri) && (iri.ends_with('/') || iri.ends_with('#')) {
                    self.prefixes.insert(key.clone(), iri.to_string());
                }
            }
        }

        for (key, value) in map {
            if key.starts_with('@') {
                continue;
            }
            match definition_iri(value) {
                Some(iri) => {
                    let expanded = self.expand_iri(iri, true);
                    self.terms.insert(key.clone(), expanded);
                }
                None => {
                    self.terms.remove(key);
                }
            }
            if let Some(coercion) = value.get("@type").and_then(Value::as_str) {
                let coercion = match coercion {
                    "@id" | "@vocab" => coercion.to_string(),
                    datatype => self.expand_iri(datatype, true),
                };
                self.coercions.insert(key.clone(), coercion);
            }
        }
    }

    /// Expands a property name or type to its full IRI.
    pub fn expand_term(&self, term: &str) -> String {
        self.expand_iri(term, true)
    }

    /// Expands a node identifier, resolving relative references against @base.
    pub fn expand_id(&self, id: &str) -> String {
        self.expand_iri(id, false)
    }

    /// Resolution order:
    /// 1. Direct term mapping (vocabulary position only)
    /// 2. Prefixed term (prefix:local) with known prefix
    /// 3. Absolute IRI with valid scheme -> return as-is
    /// 4. @vocab fallback (vocabulary position only)
    /// 5. Resolve against @base
    /// 6. Return unchanged
    fn expand_iri(&self, value: &str, vocab: bool) -> String {
        if vocab {
            if let Some(iri) = self.terms.get(value) {
                return iri.clone();
            }
        }

        if let Some((prefix, local)) = value.split_once(':') {
            if let Some(namespace) = self.prefixes.get(prefix) {
                return format!("{}{}", namespace, local);
            }
        }

        if is_absolute_iri(value) || value.starts_with("_:") {
            return value.to_string();
        }

        if vocab {
            if let Some(namespace) = &self.vocab {
                return format!("{}{}", namespace, value);
            }
        }

        if let Some(base) = &self.base {
            return resolve_relative_iri(base, value);
        }

        value.to_string()
    }
}

fn definition_iri(value: &Value) -> Option<&str> {
    match value {
        Value::String(iri) => Some(iri),
        Value::Object(map) => map.get("@id").and_then(Value::as_str),
        _ => None,
    }
}

/// Checks if a term is an absolute IRI with a valid URI scheme.
pub(crate) fn is_absolute_iri(term: &str) -> bool {
    let Some(colon_pos) = term.find(':') else {
        return false;
    };

    let mut chars = term[..colon_pos].chars();

    // First character must be a letter
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
}

/// Resolves a relative reference against a base IRI.
///
/// Handles fragments, root-relative paths, `./` and `../` segments; anything
/// else is appended to the base directory.
fn resolve_relative_iri(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }

    let base_without_fragment = base.split('#').next().unwrap_or(base);
    if relative.starts_with('#') {
        return format!("{}{}", base_without_fragment, relative);
    }

    if relative.starts_with('/') {
        let authority_end = base_without_fragment
            .find("://")
            .and_then(|start| {
                base_without_fragment[start + 3..]
                    .find('/')
                    .map(|slash| start + 3 + slash)
            })
            .unwrap_or(base_without_fragment.len());
        return format!("{}{}", &base_without_fragment[..authority_end], relative);
    }

    let mut directory = match base_without_fragment.rfind('/') {
        Some(last_slash) => base_without_fragment[..=last_slash].to_string(),
        None => base_without_fragment.to_string(),
    };

    let mut remaining = relative;
    loop {
        if let Some(rest) = remaining.strip_prefix("./") {
            remaining = rest;
        } else if let Some(rest) = remaining.strip_prefix("../") {
            remaining = rest;
            let trimmed = directory.trim_end_matches('/');
            if let Some(parent) = trimmed.rfind('/') {
                if !trimmed[..parent].ends_with('/') {
                    directory.truncate(parent + 1);
                }
            }
        } else {
            break;
        }
    }

    format!("{}{}", directory, remaining)
}
