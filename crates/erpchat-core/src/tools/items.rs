//! Item/product search tool

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{parse_args, ArgMap, Tool, ToolParam};
use crate::backend::{field_number, field_text, DataBackend, Document, Filter, Query};
use crate::error::ToolError;
use crate::formatting::fmt_money;

fn default_limit() -> usize {
    10
}

/// Substring search over items by name or code
pub struct SearchItems {
    backend: Arc<dyn DataBackend>,
}

#[derive(Deserialize)]
struct SearchItemsArgs {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

impl SearchItems {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    fn run(&self, query: &str, limit: usize) -> String {
        // The backend ANDs filters, so the name/code alternatives are two
        // queries merged and de-duplicated by record name
        let fields: Vec<String> = vec![
            "name".into(),
            "item_name".into(),
            "item_code".into(),
            "item_group".into(),
            "stock_uom".into(),
            "standard_rate".into(),
        ];

        let by_name = Query {
            filters: vec![Filter::like("item_name", query)],
            fields: fields.clone(),
            limit: Some(limit),
            ..Default::default()
        };
        let by_code = Query {
            filters: vec![Filter::like("item_code", query)],
            fields,
            limit: Some(limit),
            ..Default::default()
        };

        let mut items: Vec<Document> = Vec::new();
        for q in [by_name, by_code] {
            match self.backend.get_all("Item", &q) {
                Ok(batch) => {
                    for doc in batch {
                        let name = field_text(&doc, "name");
                        if !items.iter().any(|d| field_text(d, "name") == name) {
                            items.push(doc);
                        }
                    }
                }
                Err(e) => return format!("Error searching items: {}", e),
            }
        }
        items.truncate(limit);

        if items.is_empty() {
            return format!("No items found matching '{}'", query);
        }

        let mut result = format!("Found {} item(s):\n\n", items.len());
        for (idx, item) in items.iter().enumerate() {
            result.push_str(&format!(
                "{}. {} (Code: {})\n   Group: {}, UOM: {}\n",
                idx + 1,
                field_text(item, "item_name"),
                field_text(item, "item_code"),
                field_text(item, "item_group"),
                field_text(item, "stock_uom"),
            ));
            let rate = field_number(item, "standard_rate");
            if rate != 0.0 {
                result.push_str(&format!("   Rate: {}\n", fmt_money(rate)));
            }
        }
        result
    }
}

#[async_trait]
impl Tool for SearchItems {
    fn name(&self) -> &str {
        "search_items"
    }

    fn description(&self) -> &str {
        "Search for items/products by name or item code. Returns matching items with group, unit and rate."
    }

    fn parameters(&self) -> Vec<ToolParam> {
        vec![
            ToolParam::required("query", "string"),
            ToolParam::with_default("limit", "integer", json!(10)),
        ]
    }

    async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError> {
        let args: SearchItemsArgs = parse_args(args)?;
        Ok(self.run(&args.query, args.limit))
    }

    async fn call_text(&self, input: &str) -> Result<String, ToolError> {
        Ok(self.run(input.trim(), default_limit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn backend() -> Arc<MemoryBackend> {
        let backend = MemoryBackend::new();
        backend.insert_json(
            "Item",
            json!({
                "name": "ITEM-001", "item_name": "Steel Bolt", "item_code": "BOLT-10",
                "item_group": "Fasteners", "stock_uom": "Nos", "standard_rate": 2.5
            }),
        );
        backend.insert_json(
            "Item",
            json!({
                "name": "ITEM-002", "item_name": "Washer", "item_code": "BOLT-WASH",
                "item_group": "Fasteners", "stock_uom": "Nos", "standard_rate": 0.0
            }),
        );
        Arc::new(backend)
    }

    #[tokio::test]
    async fn test_search_matches_name_or_code() {
        let tool = SearchItems::new(backend());
        // "bolt" matches ITEM-001 by name and code, ITEM-002 by code only
        let result = tool.call_text("bolt").await.unwrap();
        assert!(result.contains("Found 2 item(s)"));
        assert!(result.contains("Steel Bolt (Code: BOLT-10)"));
        assert!(result.contains("Washer (Code: BOLT-WASH)"));
    }

    #[tokio::test]
    async fn test_zero_rate_is_omitted() {
        let tool = SearchItems::new(backend());
        let result = tool.call_text("washer").await.unwrap();
        assert!(!result.contains("Rate:"));
    }

    #[tokio::test]
    async fn test_rate_formats_as_currency() {
        let tool = SearchItems::new(backend());
        let result = tool.call_text("steel").await.unwrap();
        assert!(result.contains("Rate: $2.50"));
    }
}
