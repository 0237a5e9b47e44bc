//! Add a line to the order

use super::{order_snapshot, parse_input, Tool, ToolContext, ToolError, ToolOutput};
use crate::order::MAX_QUANTITY;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

pub struct AddToOrderTool;

#[derive(Debug, Deserialize)]
struct AddToOrderInput {
    item: String,
    #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
    quantity: u32,
    #[serde(default)]
    modifiers: Vec<String>,
}

fn default_quantity() -> u32 {
    1
}

/// Accept `2` as well as `2.0`; models often emit whole numbers as floats
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn deserialize_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_u64() {
        return u32::try_from(n).map_err(serde::de::Error::custom);
    }
    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => Ok(f as u32),
        _ => Err(serde::de::Error::custom(format!(
            "quantity must be a whole number, got {number}"
        ))),
    }
}

impl Tool for AddToOrderTool {
    fn name(&self) -> &'static str {
        "add_to_order"
    }

    fn description(&self) -> String {
        "Add an item to the customer's order. Call once per distinct item; use the exact menu item name and list any modifiers (e.g. \"Oat milk\", \"Large\") separately.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["item"],
            "properties": {
                "item": {
                    "type": "string",
                    "description": "Menu item name, e.g. \"Latte\""
                },
                "quantity": {
                    "type": "integer",
                    "description": format!("How many (1-{MAX_QUANTITY}), defaults to 1")
                },
                "modifiers": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Modifier names from the menu, e.g. [\"Oat milk\", \"Extra shot\"]"
                }
            }
        })
    }

    fn run(&self, input: Value, ctx: &mut ToolContext<'_>) -> Result<ToolOutput, ToolError> {
        let input: AddToOrderInput = parse_input(self.name(), input)?;

        let line = ctx
            .order
            .add(ctx.menu, &input.item, input.quantity, &input.modifiers)?
            .clone();

        Ok(ToolOutput::success(format!(
            "Added {} to the order ({}). Subtotal so far: {}.",
            line.describe(),
            line.line_price,
            ctx.order.subtotal()
        ))
        .with_display(json!({
            "added": line,
            "order": order_snapshot(ctx.order, ctx.tax_rate_bps),
        })))
    }
}
