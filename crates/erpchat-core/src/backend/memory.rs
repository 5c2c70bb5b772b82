//! In-memory record store
//!
//! Seedable implementation of [`DataBackend`] used by tests and the demo
//! CLI. Collections are plain document vectors; permissions default to
//! readable and can be revoked per doctype.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use serde_json::Value;

use super::{DataBackend, DocMeta, Document, Filter, Query};
use crate::error::BackendError;

#[derive(Default)]
struct Collections {
    docs: HashMap<String, Vec<Document>>,
    metas: HashMap<String, DocMeta>,
    denied: HashSet<String>,
}

/// In-memory backend with seedable collections
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<Collections>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record into a collection, creating the collection as needed
    pub fn insert(&self, doctype: &str, doc: Document) {
        let mut inner = self.inner.write();
        inner.docs.entry(doctype.to_string()).or_default().push(doc);
    }

    /// Insert a record from a JSON object literal; panics on non-objects,
    /// which only matters for seed code
    pub fn insert_json(&self, doctype: &str, doc: Value) {
        match doc {
            Value::Object(map) => self.insert(doctype, map),
            other => panic!("seed document must be a JSON object, got {}", other),
        }
    }

    /// Register the schema of a collection
    pub fn set_meta(&self, doctype: &str, meta: DocMeta) {
        self.inner.write().metas.insert(doctype.to_string(), meta);
    }

    /// Revoke read permission on a collection
    pub fn deny_read(&self, doctype: &str) {
        self.inner.write().denied.insert(doctype.to_string());
    }

    fn sort_docs(docs: &mut [Document], order_by: &str) {
        let (field, descending) = match order_by.strip_prefix('-') {
            Some(f) => (f, true),
            None => (order_by, false),
        };
        docs.sort_by(|a, b| {
            let av = super::field_text(a, field);
            let bv = super::field_text(b, field);
            if descending { bv.cmp(&av) } else { av.cmp(&bv) }
        });
    }

    fn project(doc: &Document, fields: &[String]) -> Document {
        if fields.is_empty() {
            return doc.clone();
        }
        let mut out = Document::new();
        for field in fields {
            if let Some(value) = doc.get(field) {
                out.insert(field.clone(), value.clone());
            }
        }
        out
    }
}

impl DataBackend for MemoryBackend {
    fn get_all(&self, doctype: &str, query: &Query) -> Result<Vec<Document>, BackendError> {
        let inner = self.inner.read();
        let docs = inner
            .docs
            .get(doctype)
            .ok_or_else(|| BackendError::UnknownDoctype(doctype.to_string()))?;

        let mut matched: Vec<Document> = docs
            .iter()
            .filter(|doc| query.filters.iter().all(|f| f.matches(doc.get(&f.field))))
            .cloned()
            .collect();

        if let Some(order_by) = &query.order_by {
            Self::sort_docs(&mut matched, order_by);
        }
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched
            .iter()
            .map(|doc| Self::project(doc, &query.fields))
            .collect())
    }

    fn get_doc(&self, doctype: &str, name: &str) -> Result<Document, BackendError> {
        let inner = self.inner.read();
        let docs = inner
            .docs
            .get(doctype)
            .ok_or_else(|| BackendError::UnknownDoctype(doctype.to_string()))?;

        docs.iter()
            .find(|doc| super::field_text(doc, "name") == name)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                doctype: doctype.to_string(),
                name: name.to_string(),
            })
    }

    fn count(&self, doctype: &str, filters: &[Filter]) -> Result<usize, BackendError> {
        let inner = self.inner.read();
        let docs = inner
            .docs
            .get(doctype)
            .ok_or_else(|| BackendError::UnknownDoctype(doctype.to_string()))?;

        Ok(docs
            .iter()
            .filter(|doc| filters.iter().all(|f| f.matches(doc.get(&f.field))))
            .count())
    }

    fn has_read_permission(&self, doctype: &str) -> bool {
        !self.inner.read().denied.contains(doctype)
    }

    fn meta(&self, doctype: &str) -> Result<DocMeta, BackendError> {
        let inner = self.inner.read();
        if let Some(meta) = inner.metas.get(doctype) {
            return Ok(meta.clone());
        }
        // Collections without a registered schema still introspect
        if inner.docs.contains_key(doctype) {
            return Ok(DocMeta::default());
        }
        Err(BackendError::UnknownDoctype(doctype.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.insert_json(
            "Customer",
            json!({"name": "CUST-001", "customer_name": "Acme Industries", "customer_type": "Company"}),
        );
        backend.insert_json(
            "Customer",
            json!({"name": "CUST-002", "customer_name": "Globex", "customer_type": "Company"}),
        );
        backend
    }

    #[test]
    fn test_get_all_with_like_filter() {
        let backend = seeded();
        let query = Query {
            filters: vec![Filter::like("customer_name", "acme")],
            ..Default::default()
        };
        let docs = backend.get_all("Customer", &query).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(super::super::field_text(&docs[0], "name"), "CUST-001");
    }

    #[test]
    fn test_get_all_projection() {
        let backend = seeded();
        let query = Query {
            fields: vec!["customer_name".to_string()],
            ..Default::default()
        };
        let docs = backend.get_all("Customer", &query).unwrap();
        assert!(docs[0].contains_key("customer_name"));
        assert!(!docs[0].contains_key("customer_type"));
    }

    #[test]
    fn test_get_all_limit_and_order() {
        let backend = seeded();
        let query = Query {
            order_by: Some("-name".to_string()),
            limit: Some(1),
            ..Default::default()
        };
        let docs = backend.get_all("Customer", &query).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(super::super::field_text(&docs[0], "name"), "CUST-002");
    }

    #[test]
    fn test_get_doc_not_found() {
        let backend = seeded();
        let err = backend.get_doc("Customer", "CUST-999").unwrap_err();
        assert!(matches!(err, BackendError::NotFound { .. }));
    }

    #[test]
    fn test_unknown_doctype() {
        let backend = seeded();
        assert!(matches!(
            backend.get_all("Invoice", &Query::default()),
            Err(BackendError::UnknownDoctype(_))
        ));
    }

    #[test]
    fn test_deny_read() {
        let backend = seeded();
        assert!(backend.has_read_permission("Customer"));
        backend.deny_read("Customer");
        assert!(!backend.has_read_permission("Customer"));
    }
}
