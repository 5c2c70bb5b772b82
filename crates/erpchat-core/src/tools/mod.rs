//! Tool system for the ERP chat agent
//!
//! Tools are the read-only query operations the model can request. Each
//! tool has:
//! - A name and description for the catalogue shown to the LLM
//! - An ordered parameter schema
//! - Two call shapes: a keyword call over named arguments (preferred) and
//!   a single free-text call (fallback for unreliable model output)
//!
//! Every tool returns plain text. Query failures are rendered as
//! `Error <doing-X>: <cause>` text inside the tool; only call-shape
//! problems (bad arguments) surface as [`ToolError`], and the invoker
//! folds those back into text as well.

mod customers;
mod doctype;
mod invoke;
mod items;
mod orders;
mod stock;

pub use customers::{CustomerDetails, SearchCustomers};
pub use doctype::{DescribeDoctype, QueryDoctype};
pub use invoke::invoke;
pub use items::SearchItems;
pub use orders::{PurchaseOrders, SalesOrders};
pub use stock::StockBalance;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::DataBackend;
use crate::error::ToolError;

/// Named-argument payload for a keyword call
pub type ArgMap = serde_json::Map<String, Value>;

/// One declared tool parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParam {
    pub name: String,
    pub param_type: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ToolParam {
    pub fn required(name: &str, param_type: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type: param_type.to_string(),
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &str, param_type: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type: param_type.to_string(),
            required: false,
            default: None,
        }
    }

    pub fn with_default(name: &str, param_type: &str, default: Value) -> Self {
        Self {
            name: name.to_string(),
            param_type: param_type.to_string(),
            required: false,
            default: Some(default),
        }
    }
}

/// Tool definition for catalogue rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParam>,
}

/// Core trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used by the LLM to invoke)
    fn name(&self) -> &str;

    /// Description of what the tool does
    fn description(&self) -> &str;

    /// Ordered parameter schema
    fn parameters(&self) -> Vec<ToolParam>;

    /// Keyword call: named arguments matching the parameter schema
    async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError>;

    /// String call: one free-text argument, interpreted as the primary
    /// parameter
    async fn call_text(&self, input: &str) -> Result<String, ToolError>;

    /// Convert to a spec for catalogue listing
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Registry of available tools
///
/// Names are unique; `list()` preserves registration order so the
/// catalogue shown to the model is stable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a duplicate name replaces the earlier entry
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if let Some(&idx) = self.index.get(&name) {
            self.tools[idx] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Resolve a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&idx| self.tools[idx].clone())
    }

    /// All tool specs in registration order
    pub fn list(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Deserialize a keyword-argument map into a typed args struct
///
/// Shared by every tool's `call_args`; a shape mismatch is an
/// `InvalidParams` error, which the invoker treats as a cue to retry
/// with the string call.
pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(args: &ArgMap) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|e| ToolError::InvalidParams(e.to_string()))
}

/// Build the standard registry over a data backend
pub fn standard_registry(backend: Arc<dyn DataBackend>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SearchCustomers::new(backend.clone())));
    registry.register(Arc::new(CustomerDetails::new(backend.clone())));
    registry.register(Arc::new(SearchItems::new(backend.clone())));
    registry.register(Arc::new(SalesOrders::new(backend.clone())));
    registry.register(Arc::new(PurchaseOrders::new(backend.clone())));
    registry.register(Arc::new(StockBalance::new(backend.clone())));
    registry.register(Arc::new(DescribeDoctype::new(backend.clone())));
    registry.register(Arc::new(QueryDoctype::new(backend)));
    registry
}
