//! Sales and purchase order listing tools.
//!
//! `get_sales_orders` additionally supports `summary = "by_status"`, which
//! aggregates matching orders into a per-status table instead of listing them.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{parse_args, ArgMap, Tool, ToolParam};
use crate::backend::{field_number, field_text, DataBackend, Filter, Query};
use crate::error::ToolError;
use crate::formatting::{fmt_count, fmt_money};

fn default_limit() -> usize {
    10
}

/// Sales order listing with optional customer/status filters
pub struct SalesOrders {
    backend: Arc<dyn DataBackend>,
}

#[derive(Deserialize, Default)]
struct SalesOrdersArgs {
    #[serde(default)]
    customer: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    summary: Option<String>,
}

impl SalesOrders {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    fn run(&self, args: &SalesOrdersArgs) -> String {
        let mut filters = Vec::new();
        if let Some(customer) = args.customer.as_deref().filter(|c| !c.is_empty()) {
            filters.push(Filter::like("customer", customer));
        }
        if let Some(status) = args.status.as_deref().filter(|s| !s.is_empty()) {
            filters.push(Filter::eq("status", status));
        }

        let summarize = args
            .summary
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("by_status"));

        let query = Query {
            filters,
            fields: vec![
                "name".into(),
                "customer".into(),
                "transaction_date".into(),
                "grand_total".into(),
                "status".into(),
            ],
            order_by: Some("-transaction_date".into()),
            // summary mode aggregates over everything that matches
            limit: if summarize { None } else { Some(args.limit) },
        };

        let orders = match self.backend.get_all("Sales Order", &query) {
            Ok(orders) => orders,
            Err(e) => return format!("Error fetching sales orders: {}", e),
        };

        if orders.is_empty() {
            return "No sales orders found matching the criteria".to_string();
        }

        if summarize {
            let mut by_status: BTreeMap<String, (u64, f64)> = BTreeMap::new();
            for order in &orders {
                let entry = by_status
                    .entry(field_text(order, "status"))
                    .or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += field_number(order, "grand_total");
            }

            let mut result = String::from("Sales order summary by status:\n\n");
            result.push_str("| Status | Orders | Total Amount |\n");
            result.push_str("|--------|--------|---------------|\n");
            let mut total_count = 0u64;
            let mut total_amount = 0.0f64;
            for (status, (count, amount)) in &by_status {
                result.push_str(&format!(
                    "| {} | {} | {} |\n",
                    status,
                    fmt_count(*count),
                    fmt_money(*amount)
                ));
                total_count += count;
                total_amount += amount;
            }
            result.push_str(&format!(
                "| Total | {} | {} |\n",
                fmt_count(total_count),
                fmt_money(total_amount)
            ));
            return result;
        }

        let mut result = format!("Found {} sales order(s):\n\n", orders.len());
        for (idx, order) in orders.iter().enumerate() {
            result.push_str(&format!(
                "{}. SO: {}\n   Customer: {}\n   Date: {}\n   Amount: {}\n   Status: {}\n\n",
                idx + 1,
                field_text(order, "name"),
                field_text(order, "customer"),
                field_text(order, "transaction_date"),
                fmt_money(field_number(order, "grand_total")),
                field_text(order, "status"),
            ));
        }
        result
    }
}

#[async_trait]
impl Tool for SalesOrders {
    fn name(&self) -> &str {
        "get_sales_orders"
    }

    fn description(&self) -> &str {
        "Get sales orders with optional customer and status filters. Pass summary='by_status' for per-status counts and totals."
    }

    fn parameters(&self) -> Vec<ToolParam> {
        vec![
            ToolParam::optional("customer", "string"),
            ToolParam::optional("status", "string"),
            ToolParam::with_default("limit", "integer", json!(10)),
            ToolParam::optional("summary", "string"),
        ]
    }

    async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError> {
        let args: SalesOrdersArgs = parse_args(args)?;
        Ok(self.run(&args))
    }

    async fn call_text(&self, input: &str) -> Result<String, ToolError> {
        // Bare string input is treated as a customer filter; empty lists all
        let customer = input.trim();
        let args = SalesOrdersArgs {
            customer: (!customer.is_empty()).then(|| customer.to_string()),
            limit: default_limit(),
            ..Default::default()
        };
        Ok(self.run(&args))
    }
}

/// Purchase order listing with optional supplier/status filters
pub struct PurchaseOrders {
    backend: Arc<dyn DataBackend>,
}

#[derive(Deserialize, Default)]
struct PurchaseOrdersArgs {
    #[serde(default)]
    supplier: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

impl PurchaseOrders {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    fn run(&self, args: &PurchaseOrdersArgs) -> String {
        let mut filters = Vec::new();
        if let Some(supplier) = args.supplier.as_deref().filter(|s| !s.is_empty()) {
            filters.push(Filter::like("supplier", supplier));
        }
        if let Some(status) = args.status.as_deref().filter(|s| !s.is_empty()) {
            filters.push(Filter::eq("status", status));
        }

        let query = Query {
            filters,
            fields: vec![
                "name".into(),
                "supplier".into(),
                "transaction_date".into(),
                "grand_total".into(),
                "status".into(),
            ],
            order_by: Some("-transaction_date".into()),
            limit: Some(args.limit),
        };

        let orders = match self.backend.get_all("Purchase Order", &query) {
            Ok(orders) => orders,
            Err(e) => return format!("Error fetching purchase orders: {}", e),
        };

        if orders.is_empty() {
            return "No purchase orders found matching the criteria".to_string();
        }

        let mut result = format!("Found {} purchase order(s):\n\n", orders.len());
        for (idx, order) in orders.iter().enumerate() {
            result.push_str(&format!(
                "{}. PO: {}\n   Supplier: {}\n   Date: {}\n   Amount: {}\n   Status: {}\n\n",
                idx + 1,
                field_text(order, "name"),
                field_text(order, "supplier"),
                field_text(order, "transaction_date"),
                fmt_money(field_number(order, "grand_total")),
                field_text(order, "status"),
            ));
        }
        result
    }
}

#[async_trait]
impl Tool for PurchaseOrders {
    fn name(&self) -> &str {
        "get_purchase_orders"
    }

    fn description(&self) -> &str {
        "Get purchase orders with optional supplier and status filters."
    }

    fn parameters(&self) -> Vec<ToolParam> {
        vec![
            ToolParam::optional("supplier", "string"),
            ToolParam::optional("status", "string"),
            ToolParam::with_default("limit", "integer", json!(10)),
        ]
    }

    async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError> {
        let args: PurchaseOrdersArgs = parse_args(args)?;
        Ok(self.run(&args))
    }

    async fn call_text(&self, input: &str) -> Result<String, ToolError> {
        let supplier = input.trim();
        let args = PurchaseOrdersArgs {
            supplier: (!supplier.is_empty()).then(|| supplier.to_string()),
            limit: default_limit(),
            ..Default::default()
        };
        Ok(self.run(&args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn backend() -> Arc<MemoryBackend> {
        let backend = MemoryBackend::new();
        for (name, customer, date, total, status) in [
            ("SO-001", "Acme Corp", "2026-01-15", 2500.0, "Draft"),
            ("SO-002", "Acme Corp", "2026-02-01", 4000.0, "Completed"),
            ("SO-003", "Globex", "2026-02-10", 1500.0, "Completed"),
        ] {
            backend.insert_json(
                "Sales Order",
                json!({
                    "name": name, "customer": customer, "transaction_date": date,
                    "grand_total": total, "status": status
                }),
            );
        }
        backend.insert_json(
            "Purchase Order",
            json!({
                "name": "PO-001", "supplier": "Initech", "transaction_date": "2026-01-20",
                "grand_total": 800.0, "status": "To Receive"
            }),
        );
        Arc::new(backend)
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let tool = SalesOrders::new(backend());
        let result = tool.call_args(&ArgMap::new()).await.unwrap();
        assert!(result.starts_with("Found 3 sales order(s)"));
        let pos_003 = result.find("SO-003").unwrap();
        let pos_001 = result.find("SO-001").unwrap();
        assert!(pos_003 < pos_001);
    }

    #[tokio::test]
    async fn test_status_filter() {
        let tool = SalesOrders::new(backend());
        let mut args = ArgMap::new();
        args.insert("status".into(), json!("Completed"));
        let result = tool.call_args(&args).await.unwrap();
        assert!(result.contains("Found 2 sales order(s)"));
        assert!(!result.contains("SO-001"));
    }

    #[tokio::test]
    async fn test_summary_by_status_table() {
        let tool = SalesOrders::new(backend());
        let mut args = ArgMap::new();
        args.insert("summary".into(), json!("by_status"));
        let result = tool.call_args(&args).await.unwrap();
        assert!(result.contains("| Status | Orders | Total Amount |"));
        assert!(result.contains("| Completed | 2 | $5,500.00 |"));
        assert!(result.contains("| Draft | 1 | $2,500.00 |"));
        assert!(result.contains("| Total | 3 | $8,000.00 |"));
    }

    #[tokio::test]
    async fn test_no_match_message() {
        let tool = SalesOrders::new(backend());
        let mut args = ArgMap::new();
        args.insert("customer".into(), json!("Nonesuch"));
        let result = tool.call_args(&args).await.unwrap();
        assert_eq!(result, "No sales orders found matching the criteria");
    }

    #[tokio::test]
    async fn test_purchase_orders_by_supplier_text() {
        let tool = PurchaseOrders::new(backend());
        let result = tool.call_text("initech").await.unwrap();
        assert!(result.contains("PO: PO-001"));
        assert!(result.contains("Amount: $800.00"));
    }
}
