//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Category tag a product is sold under, e.g. `food` or `drink`.
///
/// Categories are open: bundle rules may target any tag a catalog declares.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Create a category from a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The `food` category.
    pub fn food() -> Self {
        Self::new("food")
    }

    /// The `drink` category.
    pub fn drink() -> Self {
        Self::new("drink")
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Stable product identifier, used as the order key
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Product category
    pub category: Category,
}

impl<'a> Product<'a> {
    /// Create a new product.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money<'a, Currency>,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category,
        }
    }

    /// Whether the product belongs to `category`.
    pub fn is_in(&self, category: &Category) -> bool {
        self.category == *category
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::JPY;

    use super::*;

    #[test]
    fn category_displays_its_tag() {
        assert_eq!(Category::drink().to_string(), "drink");
        assert_eq!(Category::new("dessert").as_str(), "dessert");
    }

    #[test]
    fn is_in_compares_categories() {
        let product = Product::new(
            "butaman",
            "豚まん",
            Money::from_minor(250, JPY),
            Category::food(),
        );

        assert!(product.is_in(&Category::food()));
        assert!(!product.is_in(&Category::drink()));
    }
}
