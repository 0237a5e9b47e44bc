//! Price breakdown with tax

use super::{
    format_rate, no_input_schema, order_snapshot, parse_input, NoInput, Tool, ToolContext,
    ToolError, ToolOutput,
};
use serde_json::Value;

pub struct CalculateTotalTool;

impl Tool for CalculateTotalTool {
    fn name(&self) -> &'static str {
        "calculate_total"
    }

    fn description(&self) -> String {
        "Calculate the total price of the current order: per-item breakdown, subtotal, tax and total.".to_string()
    }

    fn input_schema(&self) -> Value {
        no_input_schema()
    }

    fn run(&self, input: Value, ctx: &mut ToolContext<'_>) -> Result<ToolOutput, ToolError> {
        let _: NoInput = parse_input(self.name(), input)?;

        if ctx.order.is_empty() {
            return Ok(ToolOutput::success("Order is empty. Total: $0.00"));
        }

        let totals = ctx.order.totals(ctx.tax_rate_bps);
        Ok(ToolOutput::success(format!(
            "Order breakdown:\n{}\n\nSubtotal: {}\nTax ({}): {}\nTotal: {}",
            ctx.order.itemized(),
            totals.subtotal,
            format_rate(ctx.tax_rate_bps),
            totals.tax,
            totals.total
        ))
        .with_display(order_snapshot(ctx.order, ctx.tax_rate_bps)))
    }
}
