//! Generic schema introspection and filtered querying
//!
//! `describe_doctype` renders a collection's field list so the model can
//! compose a follow-up `query_doctype` call against arbitrary collections.
//! Permission failures come back as denial text, never as errors.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{parse_args, ArgMap, Tool, ToolParam};
use crate::backend::{field_text, DataBackend, Filter, Query};
use crate::error::ToolError;

fn default_limit() -> usize {
    10
}

/// Schema introspection for a named collection
pub struct DescribeDoctype {
    backend: Arc<dyn DataBackend>,
}

#[derive(Deserialize)]
struct DescribeDoctypeArgs {
    doctype: String,
}

impl DescribeDoctype {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    fn run(&self, doctype: &str) -> String {
        if !self.backend.has_read_permission(doctype) {
            return format!("You don't have permission to access {}", doctype);
        }

        let meta = match self.backend.meta(doctype) {
            Ok(meta) => meta,
            Err(e) => return format!("Error describing {}: {}", doctype, e),
        };

        if meta.fields.is_empty() {
            return format!("No schema information available for {}", doctype);
        }

        let mut result = format!("Fields of {}:\n\n", doctype);
        for field in &meta.fields {
            result.push_str(&format!(
                "- {} ({}){}\n",
                field.fieldname,
                field.fieldtype,
                if field.required { " [required]" } else { "" },
            ));
        }
        if let Some(title_field) = &meta.title_field {
            result.push_str(&format!("\nTitle field: {}\n", title_field));
        }
        if !meta.search_fields.is_empty() {
            result.push_str(&format!(
                "Search fields: {}\n",
                meta.search_fields.join(", ")
            ));
        }
        result
    }
}

#[async_trait]
impl Tool for DescribeDoctype {
    fn name(&self) -> &str {
        "describe_doctype"
    }

    fn description(&self) -> &str {
        "List the fields of a doctype with their types and required flags."
    }

    fn parameters(&self) -> Vec<ToolParam> {
        vec![ToolParam::required("doctype", "string")]
    }

    async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError> {
        let args: DescribeDoctypeArgs = parse_args(args)?;
        Ok(self.run(&args.doctype))
    }

    async fn call_text(&self, input: &str) -> Result<String, ToolError> {
        Ok(self.run(input.trim()))
    }
}

/// Filtered query against any readable collection
pub struct QueryDoctype {
    backend: Arc<dyn DataBackend>,
}

#[derive(Deserialize)]
struct QueryDoctypeArgs {
    doctype: String,
    /// Comma-separated `field=value` pairs
    #[serde(default)]
    filters: Option<String>,
    #[serde(default)]
    fields: Option<Vec<String>>,
    #[serde(default = "default_limit")]
    limit: usize,
}

/// Parse `status=Draft, customer=Acme` into equality filters.
/// Malformed pairs (no `=`, empty field name) are skipped.
fn parse_filter_string(filters: &str) -> Vec<Filter> {
    filters
        .split(',')
        .filter_map(|pair| {
            let (field, value) = pair.split_once('=')?;
            let field = field.trim();
            if field.is_empty() {
                return None;
            }
            Some(Filter::eq(field, value.trim()))
        })
        .collect()
}

impl QueryDoctype {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    fn run(&self, args: &QueryDoctypeArgs) -> String {
        if !self.backend.has_read_permission(&args.doctype) {
            return format!("You don't have permission to access {}", args.doctype);
        }

        let filters = args
            .filters
            .as_deref()
            .map(parse_filter_string)
            .unwrap_or_default();

        let mut fields = args.fields.clone().unwrap_or_default();
        if !fields.is_empty() && !fields.iter().any(|f| f == "name") {
            fields.insert(0, "name".to_string());
        }

        let query = Query {
            filters,
            fields: fields.clone(),
            limit: Some(args.limit),
            ..Default::default()
        };

        let docs = match self.backend.get_all(&args.doctype, &query) {
            Ok(docs) => docs,
            Err(e) => return format!("Error querying {}: {}", args.doctype, e),
        };

        if docs.is_empty() {
            return format!("No {} documents found matching the criteria", args.doctype);
        }

        let mut result = format!("Found {} {} document(s):\n\n", docs.len(), args.doctype);
        for (idx, doc) in docs.iter().enumerate() {
            result.push_str(&format!("{}. {}\n", idx + 1, field_text(doc, "name")));
            let shown: Vec<&String> = if fields.is_empty() {
                doc.keys().collect()
            } else {
                fields.iter().collect()
            };
            for field in shown {
                if field != "name" && doc.get(field).is_some() {
                    result.push_str(&format!("   {}: {}\n", field, field_text(doc, field)));
                }
            }
        }
        result
    }
}

#[async_trait]
impl Tool for QueryDoctype {
    fn name(&self) -> &str {
        "query_doctype"
    }

    fn description(&self) -> &str {
        "Query any doctype with field=value filters and an optional field projection."
    }

    fn parameters(&self) -> Vec<ToolParam> {
        vec![
            ToolParam::required("doctype", "string"),
            ToolParam::optional("filters", "string"),
            ToolParam::optional("fields", "array"),
            ToolParam::with_default("limit", "integer", json!(10)),
        ]
    }

    async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError> {
        let args: QueryDoctypeArgs = parse_args(args)?;
        Ok(self.run(&args))
    }

    async fn call_text(&self, input: &str) -> Result<String, ToolError> {
        let args = QueryDoctypeArgs {
            doctype: input.trim().to_string(),
            filters: None,
            fields: None,
            limit: default_limit(),
        };
        Ok(self.run(&args))
    }
}
