//! Current order view

use super::{no_input_schema, order_snapshot, parse_input, NoInput, Tool, ToolContext, ToolError, ToolOutput};
use serde_json::Value;

pub struct GetOrderTool;

impl Tool for GetOrderTool {
    fn name(&self) -> &'static str {
        "get_order"
    }

    fn description(&self) -> String {
        "Get the current order with each line's price and the running subtotal.".to_string()
    }

    fn input_schema(&self) -> Value {
        no_input_schema()
    }

    fn run(&self, input: Value, ctx: &mut ToolContext<'_>) -> Result<ToolOutput, ToolError> {
        let _: NoInput = parse_input(self.name(), input)?;

        if ctx.order.is_empty() {
            return Ok(ToolOutput::success("Your order is empty."));
        }

        Ok(ToolOutput::success(format!(
            "Current order:\n{}\n\nSubtotal: {}",
            ctx.order.itemized(),
            ctx.order.subtotal()
        ))
        .with_display(order_snapshot(ctx.order, ctx.tax_rate_bps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Menu;
    use crate::order::Order;
    use serde_json::json;

    #[test]
    fn test_lists_lines_and_subtotal() {
        let menu = Menu::standard();
        let mut order = Order::new();
        order.add(&menu, "latte", 1, &["Oat milk".to_string()]).unwrap();
        order.add(&menu, "muffin", 2, &[]).unwrap();

        let mut ctx = ToolContext {
            menu: &menu,
            order: &mut order,
            tax_rate_bps: 800,
        };
        let result = GetOrderTool.run(json!({}), &mut ctx).unwrap();

        assert!(result.output.contains("1 x Latte (Oat milk): $5.25"));
        assert!(result.output.contains("2 x Muffin: $6.00"));
        assert!(result.output.contains("Subtotal: $11.25"));
        assert_eq!(result.display_data.unwrap()["lines"][1]["quantity"], 2);
    }

    #[test]
    fn test_empty_order() {
        let menu = Menu::standard();
        let mut order = Order::new();
        let mut ctx = ToolContext {
            menu: &menu,
            order: &mut order,
            tax_rate_bps: 800,
        };
        let result = GetOrderTool.run(json!({}), &mut ctx).unwrap();
        assert!(result.output.to_lowercase().contains("empty"));
        assert!(result.display_data.is_none());
    }
}
