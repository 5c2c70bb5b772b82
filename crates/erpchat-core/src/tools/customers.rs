//! Customer query tools

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{parse_args, ArgMap, Tool, ToolParam};
use crate::backend::{field_number, field_text, DataBackend, Filter, Query};
use crate::error::ToolError;
use crate::formatting::fmt_money;

fn default_limit() -> usize {
    10
}

/// Substring search over the customer collection
pub struct SearchCustomers {
    backend: Arc<dyn DataBackend>,
}

#[derive(Deserialize)]
struct SearchCustomersArgs {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

impl SearchCustomers {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    fn run(&self, query: &str, limit: usize) -> String {
        let q = Query {
            filters: vec![Filter::like("customer_name", query)],
            fields: vec![
                "name".into(),
                "customer_name".into(),
                "customer_type".into(),
                "customer_group".into(),
                "territory".into(),
            ],
            limit: Some(limit),
            ..Default::default()
        };

        match self.backend.get_all("Customer", &q) {
            Ok(customers) if customers.is_empty() => {
                format!("No customers found matching '{}'", query)
            }
            Ok(customers) => {
                let mut result = format!("Found {} customer(s):\n\n", customers.len());
                for (idx, customer) in customers.iter().enumerate() {
                    result.push_str(&format!(
                        "{}. {} (ID: {})\n   Type: {}, Group: {}\n",
                        idx + 1,
                        field_text(customer, "customer_name"),
                        field_text(customer, "name"),
                        field_text(customer, "customer_type"),
                        field_text(customer, "customer_group"),
                    ));
                }
                result
            }
            Err(e) => format!("Error searching customers: {}", e),
        }
    }
}

#[async_trait]
impl Tool for SearchCustomers {
    fn name(&self) -> &str {
        "search_customers"
    }

    fn description(&self) -> &str {
        "Search for customers by name. Returns matching customers with their ID, type and group."
    }

    fn parameters(&self) -> Vec<ToolParam> {
        vec![
            ToolParam::required("query", "string"),
            ToolParam::with_default("limit", "integer", json!(10)),
        ]
    }

    async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError> {
        let args: SearchCustomersArgs = parse_args(args)?;
        Ok(self.run(&args.query, args.limit))
    }

    async fn call_text(&self, input: &str) -> Result<String, ToolError> {
        Ok(self.run(input.trim(), default_limit()))
    }
}

/// Single-customer detail lookup
pub struct CustomerDetails {
    backend: Arc<dyn DataBackend>,
}

#[derive(Deserialize)]
struct CustomerDetailsArgs {
    customer_id: String,
}

impl CustomerDetails {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    fn run(&self, customer_id: &str) -> String {
        match self.backend.get_doc("Customer", customer_id) {
            Ok(customer) => {
                let mut result = format!(
                    "Customer Details for: {}\n\n",
                    field_text(&customer, "customer_name")
                );
                result.push_str(&format!("ID: {}\n", field_text(&customer, "name")));
                result.push_str(&format!("Type: {}\n", field_text(&customer, "customer_type")));
                result.push_str(&format!("Group: {}\n", field_text(&customer, "customer_group")));
                result.push_str(&format!("Territory: {}\n", field_text(&customer, "territory")));

                let mobile = field_text(&customer, "mobile_no");
                if !mobile.is_empty() {
                    result.push_str(&format!("Mobile: {}\n", mobile));
                }
                let email = field_text(&customer, "email_id");
                if !email.is_empty() {
                    result.push_str(&format!("Email: {}\n", email));
                }

                let outstanding = field_number(&customer, "outstanding_amount");
                result.push_str(&format!("\nOutstanding Amount: {}\n", fmt_money(outstanding)));
                result
            }
            Err(e) => format!("Error fetching customer details: {}", e),
        }
    }
}

#[async_trait]
impl Tool for CustomerDetails {
    fn name(&self) -> &str {
        "get_customer_details"
    }

    fn description(&self) -> &str {
        "Get detailed information about a specific customer, including contact details and outstanding amount."
    }

    fn parameters(&self) -> Vec<ToolParam> {
        vec![ToolParam::required("customer_id", "string")]
    }

    async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError> {
        let args: CustomerDetailsArgs = parse_args(args)?;
        Ok(self.run(&args.customer_id))
    }

    async fn call_text(&self, input: &str) -> Result<String, ToolError> {
        Ok(self.run(input.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn backend() -> Arc<MemoryBackend> {
        let backend = MemoryBackend::new();
        backend.insert_json(
            "Customer",
            json!({
                "name": "CUST-001",
                "customer_name": "Acme Industries",
                "customer_type": "Company",
                "customer_group": "Commercial",
                "territory": "US",
                "email_id": "hello@acme.test",
                "outstanding_amount": 12500.5
            }),
        );
        Arc::new(backend)
    }

    #[tokio::test]
    async fn test_search_finds_by_substring() {
        let tool = SearchCustomers::new(backend());
        let result = tool.call_text("acme").await.unwrap();
        assert!(result.contains("Found 1 customer(s)"));
        assert!(result.contains("Acme Industries (ID: CUST-001)"));
    }

    #[tokio::test]
    async fn test_search_no_match() {
        let tool = SearchCustomers::new(backend());
        let result = tool.call_text("globex").await.unwrap();
        assert_eq!(result, "No customers found matching 'globex'");
    }

    #[tokio::test]
    async fn test_details_formats_currency() {
        let tool = CustomerDetails::new(backend());
        let mut args = ArgMap::new();
        args.insert("customer_id".into(), json!("CUST-001"));
        let result = tool.call_args(&args).await.unwrap();
        assert!(result.contains("Outstanding Amount: $12,500.50"));
        assert!(result.contains("Email: hello@acme.test"));
    }

    #[tokio::test]
    async fn test_details_missing_record_is_error_text() {
        let tool = CustomerDetails::new(backend());
        let result = tool.call_text("CUST-999").await.unwrap();
        assert!(result.starts_with("Error fetching customer details:"));
    }

    #[tokio::test]
    async fn test_bad_args_shape_is_invalid_params() {
        let tool = SearchCustomers::new(backend());
        let args = ArgMap::new(); // missing required "query"
        assert!(matches!(
            tool.call_args(&args).await,
            Err(ToolError::InvalidParams(_))
        ));
    }
}
