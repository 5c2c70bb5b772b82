//! Data query backend
//!
//! The registry tools consume the host application's record store through
//! this boundary: generic filtered queries with projection and limit,
//! counts, a read-permission check, and schema introspection per named
//! entity collection ("doctype"). The core never writes through it.

mod memory;

pub use memory::MemoryBackend;

use serde_json::Value;

use crate::error::BackendError;

/// A single record, as a JSON object
pub type Document = serde_json::Map<String, Value>;

/// Filter operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact match
    Eq,
    /// Case-insensitive substring match
    Like,
}

/// One field filter
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self { field: field.into(), op: FilterOp::Eq, value: value.into() }
    }

    pub fn like(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self { field: field.into(), op: FilterOp::Like, value: value.into() }
    }

    /// Whether a document field value satisfies this filter
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let text = match value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Null) | None => return false,
            Some(other) => other.to_string(),
        };
        match self.op {
            FilterOp::Eq => text == self.value,
            FilterOp::Like => text.to_lowercase().contains(&self.value.to_lowercase()),
        }
    }
}

/// Query shape for `get_all`
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    /// Field projection; empty means all fields
    pub fields: Vec<String>,
    /// Sort field, descending when prefixed with `-`
    pub order_by: Option<String>,
    pub limit: Option<usize>,
}

/// One field in a collection schema
#[derive(Debug, Clone)]
pub struct DocField {
    pub fieldname: String,
    pub fieldtype: String,
    pub required: bool,
}

/// Schema of a named collection
#[derive(Debug, Clone, Default)]
pub struct DocMeta {
    pub fields: Vec<DocField>,
    /// Preferred fields for text search, first one is primary
    pub search_fields: Vec<String>,
    pub title_field: Option<String>,
}

impl DocMeta {
    /// The field substring searches run against
    pub fn primary_search_field(&self) -> &str {
        self.search_fields
            .first()
            .map(|s| s.as_str())
            .unwrap_or("name")
    }
}

/// Read-only query operations against the record store
pub trait DataBackend: Send + Sync {
    /// Query a collection with filters, projection, ordering and a limit
    fn get_all(&self, doctype: &str, query: &Query) -> Result<Vec<Document>, BackendError>;

    /// Fetch a single record by its `name` field
    fn get_doc(&self, doctype: &str, name: &str) -> Result<Document, BackendError>;

    /// Count records matching the filters
    fn count(&self, doctype: &str, filters: &[Filter]) -> Result<usize, BackendError>;

    /// Whether the current caller may read the collection
    fn has_read_permission(&self, doctype: &str) -> bool;

    /// Schema of the collection
    fn meta(&self, doctype: &str) -> Result<DocMeta, BackendError>;
}

/// Render a document field for textual output
pub fn field_text(doc: &Document, field: &str) -> String {
    match doc.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Read a numeric document field, defaulting to zero
pub fn field_number(doc: &Document, field: &str) -> f64 {
    doc.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}
