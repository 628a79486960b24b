use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Food,
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            ItemCategory::Food => "食物",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub name: String,
    pub price: u64,
    pub category: ItemCategory,
    #[serde(default)]
    pub satiety: u32,
    #[serde(default)]
    pub mood: u32,
    pub description: String,
}

impl ShopItem {
    pub fn is_food(&self) -> bool {
        self.category == ItemCategory::Food
    }

    /// Total price for `quantity` units, or `None` on overflow.
    pub fn cost_of(&self, quantity: u32) -> Option<u64> {
        self.price.checked_mul(quantity as u64)
    }
}
