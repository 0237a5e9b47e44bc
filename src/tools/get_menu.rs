//! Menu lookup

use super::{no_input_schema, parse_input, NoInput, Tool, ToolContext, ToolError, ToolOutput};
use serde_json::Value;

pub struct GetMenuTool;

impl Tool for GetMenuTool {
    fn name(&self) -> &'static str {
        "get_menu"
    }

    fn description(&self) -> String {
        "Get the coffee shop menu with drinks, food, and modifiers. Use this when the customer asks what's available or before adding an item you are unsure about.".to_string()
    }

    fn input_schema(&self) -> Value {
        no_input_schema()
    }

    fn run(&self, input: Value, ctx: &mut ToolContext<'_>) -> Result<ToolOutput, ToolError> {
        let _: NoInput = parse_input(self.name(), input)?;
        Ok(ToolOutput::success(ctx.menu.render()))
    }
}
