//! Order ledger
//!
//! One `Order` per session. Lines are append-only until the order is
//! cleared; once placed the order is frozen.

use crate::menu::Menu;
use crate::money::Money;
use serde::Serialize;
use std::fmt::Write;
use thiserror::Error;

/// Largest quantity accepted on a single line
pub const MAX_QUANTITY: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Open,
    Confirmed,
    Placed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Sorry, we don't have \"{0}\" on the menu.")]
    UnknownItem(String),
    #[error("Sorry, \"{modifier}\" isn't available for {item}.")]
    UnknownModifier { item: String, modifier: String },
    #[error("Quantity must be between 1 and 20, got {0}.")]
    InvalidQuantity(u32),
    #[error("The order is empty, there is nothing to confirm yet.")]
    EmptyOrder,
    #[error("The order has to be confirmed before it can be placed.")]
    NotConfirmed,
    #[error("This order has already been placed.")]
    AlreadyPlaced,
}

/// One line of the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub item: String,
    pub quantity: u32,
    /// Canonical modifier names, sorted, no duplicates
    pub modifiers: Vec<String>,
    pub unit_price: Money,
    pub line_price: Money,
}

impl OrderLine {
    /// e.g. `2 x Latte (Large, Oat milk)`
    pub fn describe(&self) -> String {
        if self.modifiers.is_empty() {
            format!("{} x {}", self.quantity, self.item)
        } else {
            format!(
                "{} x {} ({})",
                self.quantity,
                self.item,
                self.modifiers.join(", ")
            )
        }
    }
}

/// Subtotal, tax and total for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Order {
    lines: Vec<OrderLine>,
    status: OrderStatus,
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|line| line.line_price).sum()
    }

    pub fn totals(&self, tax_rate_bps: u32) -> Totals {
        let subtotal = self.subtotal();
        let tax = subtotal.apply_rate_bps(tax_rate_bps);
        Totals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Validate against the menu and append a line.
    ///
    /// Nothing is changed unless the whole line validates. Adding to a
    /// confirmed order reopens it.
    pub fn add(
        &mut self,
        menu: &Menu,
        item: &str,
        quantity: u32,
        modifiers: &[String],
    ) -> Result<&OrderLine, OrderError> {
        self.ensure_mutable()?;

        if quantity == 0 || quantity > MAX_QUANTITY {
            return Err(OrderError::InvalidQuantity(quantity));
        }

        let menu_item = menu
            .item(item)
            .ok_or_else(|| OrderError::UnknownItem(item.trim().to_string()))?;

        let mut chosen: Vec<(&str, Money)> = Vec::with_capacity(modifiers.len());
        for requested in modifiers {
            let (name, delta) =
                menu_item
                    .modifier(requested)
                    .ok_or_else(|| OrderError::UnknownModifier {
                        item: menu_item.name.clone(),
                        modifier: requested.trim().to_string(),
                    })?;
            if !chosen.iter().any(|(existing, _)| *existing == name) {
                chosen.push((name, delta));
            }
        }
        chosen.sort_by_key(|(name, _)| name.to_lowercase());

        let unit_price =
            menu_item.base_price + chosen.iter().map(|(_, delta)| *delta).sum::<Money>();
        self.lines.push(OrderLine {
            item: menu_item.name.clone(),
            quantity,
            modifiers: chosen.iter().map(|(name, _)| (*name).to_string()).collect(),
            unit_price,
            line_price: unit_price.times(quantity),
        });
        self.status = OrderStatus::Open;

        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Remove every line and reopen the order
    pub fn clear(&mut self) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        self.lines.clear();
        self.status = OrderStatus::Open;
        Ok(())
    }

    /// Mark the order as confirmed by the customer
    pub fn confirm(&mut self) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        if self.lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        self.status = OrderStatus::Confirmed;
        Ok(())
    }

    /// Finalize a confirmed order
    pub fn place(&mut self) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Confirmed => {
                self.status = OrderStatus::Placed;
                Ok(())
            }
            OrderStatus::Open => Err(OrderError::NotConfirmed),
            OrderStatus::Placed => Err(OrderError::AlreadyPlaced),
        }
    }

    /// One bullet per line with its price
    pub fn itemized(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let _ = writeln!(out, "  - {}: {}", line.describe(), line.line_price);
        }
        out.trim_end().to_string()
    }

    fn ensure_mutable(&self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Placed {
            Err(OrderError::AlreadyPlaced)
        } else {
            Ok(())
        }
    }
}
