//! Tool implementations for the barista agent
//!
//! Tools are stateless singletons. Everything a call may read or mutate is
//! handed in through `ToolContext`.

mod add_to_order;
mod calculate_total;
mod clear_order;
mod confirm_order;
mod get_menu;
mod get_order;
mod place_order;

pub use add_to_order::AddToOrderTool;
pub use calculate_total::CalculateTotalTool;
pub use clear_order::ClearOrderTool;
pub use confirm_order::ConfirmOrderTool;
pub use get_menu::GetMenuTool;
pub use get_order::GetOrderTool;
pub use place_order::PlaceOrderTool;

use crate::llm::ToolDefinition;
use crate::menu::Menu;
use crate::order::{Order, OrderError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Result from tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_data: Option<Value>,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            display_data: None,
        }
    }

    pub fn with_display(mut self, data: Value) -> Self {
        self.display_data = Some(data);
        self
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid input for {tool}: {message}")]
    InvalidInput { tool: String, message: String },
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Everything a tool invocation may touch
pub struct ToolContext<'a> {
    pub menu: &'a Menu,
    pub order: &'a mut Order,
    /// Sales tax in basis points
    pub tax_rate_bps: u32,
}

/// Trait for tools that can be executed by the agent
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &'static str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool against the session's order
    fn run(&self, input: Value, ctx: &mut ToolContext<'_>) -> Result<ToolOutput, ToolError>;
}

/// The fixed tool catalog
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create the standard ordering tool set
    pub fn standard() -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(GetMenuTool),
            Arc::new(AddToOrderTool),
            Arc::new(GetOrderTool),
            Arc::new(CalculateTotalTool),
            Arc::new(ConfirmOrderTool),
            Arc::new(PlaceOrderTool),
            Arc::new(ClearOrderTool),
        ];
        Self { tools }
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Execute a tool by name.
    ///
    /// The tool runs against a copy of the order; the copy replaces
    /// `ctx.order` only if the tool succeeds.
    pub fn execute(
        &self,
        name: &str,
        input: Value,
        mut ctx: ToolContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let mut draft = ctx.order.clone();
        let output = tool.run(
            input,
            &mut ToolContext {
                menu: ctx.menu,
                order: &mut draft,
                tax_rate_bps: ctx.tax_rate_bps,
            },
        )?;
        *ctx.order = draft;
        Ok(output)
    }
}

/// Parse tool arguments; a missing argument object counts as `{}`
fn parse_input<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T, ToolError> {
    let input = if input.is_null() { json!({}) } else { input };
    serde_json::from_value(input).map_err(|e| ToolError::InvalidInput {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Input for tools that take no arguments
#[derive(Debug, Deserialize)]
struct NoInput {}

fn no_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {}
    })
}

/// Structured snapshot attached to order tool results
fn order_snapshot(order: &Order, tax_rate_bps: u32) -> Value {
    json!({
        "status": order.status(),
        "lines": order.lines(),
        "totals": order.totals(tax_rate_bps),
    })
}

/// `800` -> `8%`, `825` -> `8.25%`
pub fn format_rate(bps: u32) -> String {
    if bps % 100 == 0 {
        format!("{}%", bps / 100)
    } else {
        format!("{}.{:02}%", bps / 100, bps % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tools_registered() {
        let registry = ToolRegistry::standard();
        let names = registry.names();
        for expected in [
            "get_menu",
            "add_to_order",
            "get_order",
            "calculate_total",
            "confirm_order",
            "place_order",
            "clear_order",
        ] {
            assert!(names.contains(&expected), "Missing {expected}");
        }
        assert_eq!(registry.definitions().len(), names.len());
    }

    #[test]
    fn test_schemas_are_objects() {
        for def in ToolRegistry::standard().definitions() {
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
            assert!(!def.description.is_empty());
        }
    }

    #[test]
    fn test_unknown_tool() {
        let menu = Menu::standard();
        let mut order = Order::new();
        let err = ToolRegistry::standard()
            .execute(
                "make_espresso_martini",
                json!({}),
                ToolContext {
                    menu: &menu,
                    order: &mut order,
                    tax_rate_bps: 800,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "make_espresso_martini"));
    }

    #[test]
    fn test_failed_tool_leaves_order_untouched() {
        let menu = Menu::standard();
        let mut order = Order::new();
        let registry = ToolRegistry::standard();

        let err = registry
            .execute(
                "add_to_order",
                json!({"item": "latte", "modifiers": ["sprinkles"]}),
                ToolContext {
                    menu: &menu,
                    order: &mut order,
                    tax_rate_bps: 800,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::Order(OrderError::UnknownModifier { .. })));
        assert!(order.is_empty());
    }

    #[test]
    fn test_null_input_counts_as_empty_object() {
        let menu = Menu::standard();
        let mut order = Order::new();
        let output = ToolRegistry::standard()
            .execute(
                "get_order",
                Value::Null,
                ToolContext {
                    menu: &menu,
                    order: &mut order,
                    tax_rate_bps: 800,
                },
            )
            .unwrap();
        assert_eq!(output.output, "Your order is empty.");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(800), "8%");
        assert_eq!(format_rate(825), "8.25%");
        assert_eq!(format_rate(0), "0%");
        assert_eq!(format_rate(5), "0.05%");
    }
}
