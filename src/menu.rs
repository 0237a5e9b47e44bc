//! Menu catalog
//!
//! Read-only reference data loaded once at startup. Item and modifier
//! lookups are case-insensitive; callers get the catalog's canonical names.

use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;
use thiserror::Error;

/// Section of the menu an item is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Drink,
    Food,
}

impl Category {
    fn heading(self) -> &'static str {
        match self {
            Category::Drink => "DRINKS",
            Category::Food => "FOOD",
        }
    }
}

/// A single orderable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub category: Category,
    pub base_price: Money,
    /// Modifier name -> price delta
    #[serde(default)]
    pub modifiers: BTreeMap<String, Money>,
}

impl MenuItem {
    /// Find a modifier by name, ignoring case.
    ///
    /// A bare leading word ("vanilla" for "Vanilla syrup") also matches when
    /// exactly one modifier starts with it. The canonical name is returned.
    pub fn modifier(&self, name: &str) -> Option<(&str, Money)> {
        let name = name.trim();
        let exact = self
            .modifiers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name));
        let found = exact.or_else(|| {
            let mut by_word = self.modifiers.iter().filter(|(candidate, _)| {
                candidate
                    .split_whitespace()
                    .next()
                    .is_some_and(|word| word.eq_ignore_ascii_case(name))
            });
            match (by_word.next(), by_word.next()) {
                (Some(only), None) => Some(only),
                _ => None,
            }
        });
        found.map(|(candidate, delta)| (candidate.as_str(), *delta))
    }
}

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("Failed to read menu file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse menu file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Menu has no items")]
    Empty,
    #[error("Duplicate menu item: {0}")]
    DuplicateItem(String),
}

/// The shop's catalog, in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Menu {
    items: Vec<MenuItem>,
}

const DRINK_MODIFIERS: &[(&str, u64)] = &[
    ("Oat milk", 75),
    ("Almond milk", 75),
    ("Extra shot", 50),
    ("Vanilla syrup", 50),
    ("Large", 50),
];

impl Menu {
    pub fn new(items: Vec<MenuItem>) -> Result<Self, MenuError> {
        if items.is_empty() {
            return Err(MenuError::Empty);
        }
        for (i, item) in items.iter().enumerate() {
            if items
                .iter()
                .skip(i + 1)
                .any(|other| other.name.eq_ignore_ascii_case(&item.name))
            {
                return Err(MenuError::DuplicateItem(item.name.clone()));
            }
        }
        Ok(Self { items })
    }

    /// The built-in coffee shop menu
    pub fn standard() -> Self {
        let drink = |name: &str, cents: u64| MenuItem {
            name: name.to_string(),
            category: Category::Drink,
            base_price: Money::from_cents(cents),
            modifiers: DRINK_MODIFIERS
                .iter()
                .map(|(m, delta)| ((*m).to_string(), Money::from_cents(*delta)))
                .collect(),
        };
        let food = |name: &str, cents: u64| MenuItem {
            name: name.to_string(),
            category: Category::Food,
            base_price: Money::from_cents(cents),
            modifiers: BTreeMap::new(),
        };

        Self {
            items: vec![
                drink("Espresso", 300),
                drink("Americano", 350),
                drink("Latte", 450),
                drink("Cappuccino", 450),
                drink("Mocha", 500),
                drink("Cold Brew", 400),
                food("Croissant", 350),
                food("Muffin", 300),
                food("Bagel", 350),
                food("Cookie", 250),
            ],
        }
    }

    /// Load a menu from a JSON file of the form `{"items": [...]}`
    pub fn from_json_file(path: &Path) -> Result<Self, MenuError> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: Menu = serde_json::from_str(&raw)?;
        Self::new(parsed.items)
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Look up an item by name, ignoring case and surrounding whitespace
    pub fn item(&self, name: &str) -> Option<&MenuItem> {
        let name = name.trim();
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    /// Human-readable menu text handed to the model by `get_menu`
    pub fn render(&self) -> String {
        let mut out = String::new();

        for category in [Category::Drink, Category::Food] {
            let mut listed = self
                .items
                .iter()
                .filter(|item| item.category == category)
                .peekable();
            if listed.peek().is_none() {
                continue;
            }
            let _ = writeln!(out, "{}:", category.heading());
            for item in listed {
                let _ = writeln!(out, "- {}: {}", item.name, item.base_price);
            }
            out.push('\n');
        }

        // Modifier name -> (delta, items accepting it)
        let mut modifiers: BTreeMap<&str, (Money, Vec<&str>)> = BTreeMap::new();
        for item in &self.items {
            for (name, delta) in &item.modifiers {
                modifiers
                    .entry(name.as_str())
                    .or_insert((*delta, Vec::new()))
                    .1
                    .push(item.name.as_str());
            }
        }

        if !modifiers.is_empty() {
            let drinks: Vec<&str> = self
                .items
                .iter()
                .filter(|item| item.category == Category::Drink)
                .map(|item| item.name.as_str())
                .collect();

            out.push_str("MODIFIERS:\n");
            for (name, (delta, accepted_by)) in modifiers {
                let scope = if accepted_by == drinks {
                    "any drink".to_string()
                } else {
                    accepted_by.join(", ")
                };
                let _ = writeln!(out, "- {name}: +{delta} ({scope})");
            }
        }

        out.trim_end().to_string()
    }
}
