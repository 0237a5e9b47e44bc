//! Start the order over

use super::{no_input_schema, order_snapshot, parse_input, NoInput, Tool, ToolContext, ToolError, ToolOutput};
use serde_json::Value;

pub struct ClearOrderTool;

impl Tool for ClearOrderTool {
    fn name(&self) -> &'static str {
        "clear_order"
    }

    fn description(&self) -> String {
        "Clear all items from the current order.".to_string()
    }

    fn input_schema(&self) -> Value {
        no_input_schema()
    }

    fn run(&self, input: Value, ctx: &mut ToolContext<'_>) -> Result<ToolOutput, ToolError> {
        let _: NoInput = parse_input(self.name(), input)?;

        ctx.order.clear()?;

        Ok(ToolOutput::success("Order cleared. Starting fresh!")
            .with_display(order_snapshot(ctx.order, ctx.tax_rate_bps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Menu;
    use crate::order::{Order, OrderStatus};
    use serde_json::json;

    #[test]
    fn test_clears_lines() {
        let menu = Menu::standard();
        let mut order = Order::new();
        order.add(&menu, "latte", 1, &[]).unwrap();
        order.add(&menu, "muffin", 1, &[]).unwrap();
        order.confirm().unwrap();

        let mut ctx = ToolContext {
            menu: &menu,
            order: &mut order,
            tax_rate_bps: 800,
        };
        let result = ClearOrderTool.run(json!({}), &mut ctx).unwrap();

        assert!(result.output.to_lowercase().contains("cleared"));
        assert!(order.is_empty());
        assert_eq!(order.status(), OrderStatus::Open);
    }
}
