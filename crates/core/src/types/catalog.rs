//! The static coffee catalog.
//!
//! Loaded once at compile time, read-only. The selection grid shows the
//! first [`QUICK_SELECT_COUNT`] entries as one-click cards; the full list
//! backs the "Other" drop-down.

use serde::Serialize;

/// A coffee the user can log, with its typical caffeine content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoffeeOption {
    /// Display name, also the value stored in journal entries.
    pub name: &'static str,
    /// Typical caffeine content in milligrams.
    pub caffeine_mg: u32,
}

/// How many catalog entries the selection grid shows as quick-select cards.
pub const QUICK_SELECT_COUNT: usize = 5;

/// Every coffee the tracker knows about, in display order.
pub const COFFEE_MENU: &[CoffeeOption] = &[
    CoffeeOption { name: "Espresso", caffeine_mg: 63 },
    CoffeeOption { name: "Double Espresso", caffeine_mg: 126 },
    CoffeeOption { name: "Americano", caffeine_mg: 77 },
    CoffeeOption { name: "Cappuccino", caffeine_mg: 80 },
    CoffeeOption { name: "Latte", caffeine_mg: 80 },
    CoffeeOption { name: "Flat White", caffeine_mg: 130 },
    CoffeeOption { name: "Macchiato", caffeine_mg: 85 },
    CoffeeOption { name: "Cortado", caffeine_mg: 85 },
    CoffeeOption { name: "Mocha", caffeine_mg: 90 },
    CoffeeOption { name: "Drip Coffee", caffeine_mg: 115 },
    CoffeeOption { name: "French Press", caffeine_mg: 107 },
    CoffeeOption { name: "Pour Over", caffeine_mg: 120 },
    CoffeeOption { name: "Cold Brew", caffeine_mg: 155 },
    CoffeeOption { name: "Nitro Cold Brew", caffeine_mg: 215 },
    CoffeeOption { name: "Iced Coffee", caffeine_mg: 120 },
    CoffeeOption { name: "Turkish Coffee", caffeine_mg: 160 },
    CoffeeOption { name: "Ristretto", caffeine_mg: 63 },
    CoffeeOption { name: "Affogato", caffeine_mg: 65 },
    CoffeeOption { name: "Irish Coffee", caffeine_mg: 70 },
    CoffeeOption { name: "Instant Coffee", caffeine_mg: 57 },
    CoffeeOption { name: "Decaf Coffee", caffeine_mg: 3 },
];

/// The catalog entries rendered as quick-select cards.
#[must_use]
pub fn quick_select() -> &'static [CoffeeOption] {
    COFFEE_MENU.get(..QUICK_SELECT_COUNT).unwrap_or(COFFEE_MENU)
}

/// Look up a catalog entry by its display name.
#[must_use]
pub fn find(name: &str) -> Option<&'static CoffeeOption> {
    COFFEE_MENU.iter().find(|option| option.name == name)
}
