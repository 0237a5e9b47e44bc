//! System prompt construction
//!
//! The prompt is fixed per process apart from the configured tax rate and
//! the menu's item names, which are listed so the model uses canonical names
//! in tool calls.

use crate::menu::{Category, Menu};
use crate::tools::format_rate;
use std::fmt::Write;

/// Base system prompt establishing the assistant's role
const BASE_PROMPT: &str = r#"You are a friendly barista at a coffee shop.

Your job:
1. Greet customers warmly
2. Help them with their order
3. Use get_menu when they ask what's available
4. Use add_to_order for each item they want, with its quantity and modifiers
5. When they're done ordering, use confirm_order to show them their order
6. Wait for the customer to say "yes" or otherwise confirm before using place_order
7. Use calculate_total to show a price breakdown
8. Use clear_order if they want to start over

If a tool reports a problem (an item we don't carry, a modifier that doesn't apply), tell the customer and suggest something from the menu.

Be conversational, helpful, and concise. Don't overwhelm the customer with too much text."#;

/// Build the system prompt for a session
pub fn build_system_prompt(menu: &Menu, tax_rate_bps: u32) -> String {
    let mut prompt = String::from(BASE_PROMPT);

    let names = |category: Category| {
        menu.items()
            .iter()
            .filter(|item| item.category == category)
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let _ = write!(
        prompt,
        "\n\nWe serve these drinks: {}.\nAnd this food: {}.\nPrices shown to the customer before tax; sales tax is {}.",
        names(Category::Drink),
        names(Category::Food),
        format_rate(tax_rate_bps)
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_role_and_tools() {
        let prompt = build_system_prompt(&Menu::standard(), 800);
        assert!(prompt.to_lowercase().contains("barista"));
        for tool in ["get_menu", "add_to_order", "confirm_order", "place_order"] {
            assert!(prompt.contains(tool), "Missing {tool}");
        }
    }

    #[test]
    fn test_prompt_lists_menu_and_tax() {
        let prompt = build_system_prompt(&Menu::standard(), 825);
        assert!(prompt.contains("Latte"));
        assert!(prompt.contains("Croissant"));
        assert!(prompt.contains("8.25%"));
    }
}
