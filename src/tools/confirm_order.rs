//! Read the order back for confirmation

use super::{no_input_schema, order_snapshot, parse_input, NoInput, Tool, ToolContext, ToolError, ToolOutput};
use serde_json::Value;

pub struct ConfirmOrderTool;

impl Tool for ConfirmOrderTool {
    fn name(&self) -> &'static str {
        "confirm_order"
    }

    fn description(&self) -> String {
        "Show the order to the customer and mark it ready to place. Use when the customer is done ordering, then wait for them to say yes before calling place_order.".to_string()
    }

    fn input_schema(&self) -> Value {
        no_input_schema()
    }

    fn run(&self, input: Value, ctx: &mut ToolContext<'_>) -> Result<ToolOutput, ToolError> {
        let _: NoInput = parse_input(self.name(), input)?;

        ctx.order.confirm()?;

        let totals = ctx.order.totals(ctx.tax_rate_bps);
        Ok(ToolOutput::success(format!(
            "Here's your order:\n{}\n\nTotal: {} (including {} tax)\n\nIs this correct?",
            ctx.order.itemized(),
            totals.total,
            totals.tax
        ))
        .with_display(order_snapshot(ctx.order, ctx.tax_rate_bps)))
    }
}
