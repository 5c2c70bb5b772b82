//! Stock balance lookup over warehouse bins

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{parse_args, ArgMap, Tool, ToolParam};
use crate::backend::{field_number, field_text, DataBackend, Filter, Query};
use crate::error::ToolError;

/// Per-warehouse stock quantities for one item
pub struct StockBalance {
    backend: Arc<dyn DataBackend>,
}

#[derive(Deserialize)]
struct StockBalanceArgs {
    item_code: String,
    #[serde(default)]
    warehouse: Option<String>,
}

impl StockBalance {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    fn run(&self, item_code: &str, warehouse: Option<&str>) -> String {
        let mut filters = vec![Filter::eq("item_code", item_code)];
        if let Some(warehouse) = warehouse.filter(|w| !w.is_empty()) {
            filters.push(Filter::eq("warehouse", warehouse));
        }

        let query = Query {
            filters,
            fields: vec![
                "warehouse".into(),
                "actual_qty".into(),
                "reserved_qty".into(),
                "projected_qty".into(),
            ],
            ..Default::default()
        };

        let bins = match self.backend.get_all("Bin", &query) {
            Ok(bins) => bins,
            Err(e) => return format!("Error fetching stock balance: {}", e),
        };

        if bins.is_empty() {
            return match warehouse {
                Some(warehouse) => {
                    format!("No stock found for item {} in {}", item_code, warehouse)
                }
                None => format!("No stock found for item: {}", item_code),
            };
        }

        if let Some(warehouse) = warehouse {
            let qty = field_number(&bins[0], "actual_qty");
            return format!("Stock balance for {} in {}: {}", item_code, warehouse, qty);
        }

        let mut result = format!("Stock balance for {}:\n\n", item_code);
        for bin in &bins {
            result.push_str(&format!(
                "Warehouse: {}\n  Actual Qty: {}\n  Reserved Qty: {}\n  Available Qty: {}\n\n",
                field_text(bin, "warehouse"),
                field_number(bin, "actual_qty"),
                field_number(bin, "reserved_qty"),
                field_number(bin, "projected_qty"),
            ));
        }
        result
    }
}

#[async_trait]
impl Tool for StockBalance {
    fn name(&self) -> &str {
        "get_stock_balance"
    }

    fn description(&self) -> &str {
        "Get stock balance for an item, per warehouse or for a specific warehouse."
    }

    fn parameters(&self) -> Vec<ToolParam> {
        vec![
            ToolParam::required("item_code", "string"),
            ToolParam::optional("warehouse", "string"),
        ]
    }

    async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError> {
        let args: StockBalanceArgs = parse_args(args)?;
        Ok(self.run(&args.item_code, args.warehouse.as_deref()))
    }

    async fn call_text(&self, input: &str) -> Result<String, ToolError> {
        Ok(self.run(input.trim(), None))
    }
}
