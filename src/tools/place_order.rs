//! Finalize the order

use super::{no_input_schema, order_snapshot, parse_input, NoInput, Tool, ToolContext, ToolError, ToolOutput};
use serde_json::Value;

pub struct PlaceOrderTool;

impl Tool for PlaceOrderTool {
    fn name(&self) -> &'static str {
        "place_order"
    }

    fn description(&self) -> String {
        "Place the final order. Only call after confirm_order and after the customer has explicitly said the order is correct. This ends the conversation.".to_string()
    }

    fn input_schema(&self) -> Value {
        no_input_schema()
    }

    fn run(&self, input: Value, ctx: &mut ToolContext<'_>) -> Result<ToolOutput, ToolError> {
        let _: NoInput = parse_input(self.name(), input)?;

        ctx.order.place()?;

        let totals = ctx.order.totals(ctx.tax_rate_bps);
        Ok(ToolOutput::success(format!(
            "Order placed! Your total is {}. Thank you for your order!",
            totals.total
        ))
        .with_display(order_snapshot(ctx.order, ctx.tax_rate_bps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Menu;
    use crate::order::{Order, OrderError, OrderStatus};
    use serde_json::json;

    #[test]
    fn test_places_confirmed_order() {
        let menu = Menu::standard();
        let mut order = Order::new();
        order.add(&menu, "latte", 1, &[]).unwrap();
        order.confirm().unwrap();

        let mut ctx = ToolContext {
            menu: &menu,
            order: &mut order,
            tax_rate_bps: 0,
        };
        let result = PlaceOrderTool.run(json!({}), &mut ctx).unwrap();

        assert!(result.output.to_lowercase().contains("placed"));
        assert!(result.output.contains("$4.50"));
        assert_eq!(order.status(), OrderStatus::Placed);
    }

    #[test]
    fn test_unconfirmed_order_rejected() {
        let menu = Menu::standard();
        let mut order = Order::new();
        order.add(&menu, "latte", 1, &[]).unwrap();

        let mut ctx = ToolContext {
            menu: &menu,
            order: &mut order,
            tax_rate_bps: 800,
        };
        let err = PlaceOrderTool.run(json!({}), &mut ctx).unwrap_err();
        assert!(matches!(err, ToolError::Order(OrderError::NotConfirmed)));
        assert_eq!(order.status(), OrderStatus::Open);
    }
}
