//! Item Pool
//!
//! Remaining, unconsumed quantities for a single discount computation.

use std::fmt;

use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::{
    catalog::{Catalog, UnknownItemError},
    orders::Order,
    products::{Category, Product, ProductKey},
};

/// A consumption step asked for more items than the pool holds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct InsufficientPoolError {
    /// Category the step was restricted to, `None` for any category
    pub category: Option<Category>,

    /// Number of items the step required
    pub requested: usize,

    /// Number of matching items left in the pool
    pub available: u64,
}

impl fmt::Display for InsufficientPoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = self.category.as_ref().map_or("any", Category::as_str);

        write!(
            f,
            "pool holds {} item(s) of {category} category, {} required",
            self.available, self.requested
        )
    }
}

/// Item Pool
///
/// Quantities are held per catalog entry, aligned with the catalog's declared order.
#[derive(Debug, Clone)]
pub struct ItemPool<'c, 'a> {
    catalog: &'c Catalog<'a>,
    remaining: SmallVec<[u32; 8]>,
}

impl<'c, 'a> ItemPool<'c, 'a> {
    /// Create a pool holding every unit of an order.
    ///
    /// # Errors
    ///
    /// Returns an [`UnknownItemError`] if the order references an id the catalog does not contain.
    pub fn from_order(catalog: &'c Catalog<'a>, order: &Order) -> Result<Self, UnknownItemError> {
        let mut remaining: SmallVec<[u32; 8]> = smallvec![0; catalog.len()];

        for (id, quantity) in order.iter() {
            let (position, _, _) = catalog.lookup(id)?;

            if let Some(slot) = remaining.get_mut(position) {
                *slot = slot.saturating_add(quantity);
            }
        }

        Ok(Self { catalog, remaining })
    }

    fn entries(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>, u32)> {
        self.catalog
            .iter()
            .zip(self.remaining.iter())
            .map(|((key, product), &quantity)| (key, product, quantity))
    }

    /// Total number of units left.
    pub fn total(&self) -> u64 {
        self.entries().map(|(_, _, qty)| u64::from(qty)).sum()
    }

    /// Number of units left in `category`.
    pub fn count(&self, category: &Category) -> u64 {
        self.count_matching(Some(category))
    }

    /// Number of units left in `category`, or of any category when `None`.
    pub fn count_matching(&self, category: Option<&Category>) -> u64 {
        self.entries()
            .filter(|(_, product, _)| category.is_none_or(|c| product.is_in(c)))
            .map(|(_, _, qty)| u64::from(qty))
            .sum()
    }

    /// Units left of the product with `id`.
    pub fn quantity(&self, id: &str) -> u32 {
        self.entries()
            .find(|(_, product, _)| product.id == id)
            .map_or(0, |(_, _, qty)| qty)
    }

    /// Whether every unit has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining.iter().all(|&qty| qty == 0)
    }

    /// Remove `count` units, optionally restricted to `category`.
    ///
    /// Units are taken one at a time from the first catalog entries, in declared
    /// order, that still have stock. Keys are returned in the order taken.
    ///
    /// # Errors
    ///
    /// Returns an [`InsufficientPoolError`], leaving the pool untouched, if fewer
    /// than `count` matching units remain.
    pub fn take(
        &mut self,
        count: usize,
        category: Option<&Category>,
    ) -> Result<SmallVec<[ProductKey; 3]>, InsufficientPoolError> {
        let available = self.count_matching(category);

        let insufficient = || InsufficientPoolError {
            category: category.cloned(),
            requested: count,
            available,
        };

        if available < u64::try_from(count).unwrap_or(u64::MAX) {
            return Err(insufficient());
        }

        let mut taken = SmallVec::with_capacity(count);

        while taken.len() < count {
            taken.push(self.take_first(category).ok_or_else(insufficient)?);
        }

        Ok(taken)
    }

    fn take_first(&mut self, category: Option<&Category>) -> Option<ProductKey> {
        let catalog = self.catalog;

        for ((key, product), remaining) in catalog.iter().zip(self.remaining.iter_mut()) {
            if *remaining > 0 && category.is_none_or(|c| product.is_in(c)) {
                *remaining -= 1;
                return Some(key);
            }
        }

        None
    }

    /// Keys of the units left, one per unit, in declared order.
    pub fn remaining_items(&self) -> SmallVec<[ProductKey; 4]> {
        self.entries()
            .flat_map(|(key, _, qty)| (0..qty).map(move |_| key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn ids(catalog: &Catalog<'_>, keys: &[ProductKey]) -> Vec<String> {
        keys.iter()
            .filter_map(|&key| catalog.get(key).map(|p| p.id.clone()))
            .collect()
    }

    #[test]
    fn from_order_counts_units_by_category() -> TestResult {
        let catalog = Catalog::festival()?;
        let order = Order::new()
            .with("butaman", 2)
            .with("shikaman", 1)
            .with("wonglok", 3);

        let pool = ItemPool::from_order(&catalog, &order)?;

        assert_eq!(pool.total(), 6);
        assert_eq!(pool.count(&Category::food()), 3);
        assert_eq!(pool.count(&Category::drink()), 3);
        assert_eq!(pool.count(&Category::new("dessert")), 0);

        Ok(())
    }

    #[test]
    fn from_order_rejects_unknown_items() -> TestResult {
        let catalog = Catalog::festival()?;
        let order = Order::new().with("nonexistent-id", 1);

        let result = ItemPool::from_order(&catalog, &order);

        assert_eq!(
            result.err(),
            Some(UnknownItemError {
                id: "nonexistent-id".to_string()
            })
        );

        Ok(())
    }

    #[test]
    fn take_any_follows_catalog_order() -> TestResult {
        let catalog = Catalog::festival()?;
        let order = Order::new()
            .with("wonglok", 2)
            .with("shoronpo", 1)
            .with("butaman", 1);
        let mut pool = ItemPool::from_order(&catalog, &order)?;

        let taken = pool.take(3, None)?;

        assert_eq!(ids(&catalog, &taken), ["butaman", "shoronpo", "wonglok"]);
        assert_eq!(pool.quantity("wonglok"), 1);
        assert_eq!(pool.total(), 1);

        Ok(())
    }

    #[test]
    fn take_by_category_skips_other_categories() -> TestResult {
        let catalog = Catalog::festival()?;
        let order = Order::new()
            .with("butaman", 2)
            .with("sugarcane", 1)
            .with("wonglok", 1);
        let mut pool = ItemPool::from_order(&catalog, &order)?;

        let taken = pool.take(2, Some(&Category::drink()))?;

        assert_eq!(ids(&catalog, &taken), ["sugarcane", "wonglok"]);
        assert_eq!(pool.quantity("butaman"), 2);
        assert_eq!(pool.count(&Category::drink()), 0);

        Ok(())
    }

    #[test]
    fn take_decrements_one_unit_at_a_time() -> TestResult {
        let catalog = Catalog::festival()?;
        let order = Order::new().with("shikaman", 2).with("butaman", 1);
        let mut pool = ItemPool::from_order(&catalog, &order)?;

        let taken = pool.take(2, None)?;

        assert_eq!(ids(&catalog, &taken), ["butaman", "shikaman"]);
        assert_eq!(pool.quantity("shikaman"), 1);

        Ok(())
    }

    #[test]
    fn insufficient_take_leaves_pool_untouched() -> TestResult {
        let catalog = Catalog::festival()?;
        let order = Order::new().with("butaman", 2).with("wonglok", 1);
        let mut pool = ItemPool::from_order(&catalog, &order)?;

        let result = pool.take(3, Some(&Category::food()));

        assert_eq!(
            result.err(),
            Some(InsufficientPoolError {
                category: Some(Category::food()),
                requested: 3,
                available: 2,
            })
        );
        assert_eq!(pool.total(), 3);

        Ok(())
    }

    #[test]
    fn remaining_items_lists_each_unit() -> TestResult {
        let catalog = Catalog::festival()?;
        let order = Order::new().with("wonglok", 1).with("butaman", 2);
        let pool = ItemPool::from_order(&catalog, &order)?;

        assert_eq!(
            ids(&catalog, &pool.remaining_items()),
            ["butaman", "butaman", "wonglok"]
        );

        Ok(())
    }

    #[test]
    fn empty_order_builds_empty_pool() -> TestResult {
        let catalog = Catalog::festival()?;

        let pool = ItemPool::from_order(&catalog, &Order::new())?;

        assert!(pool.is_empty());
        assert_eq!(pool.total(), 0);

        Ok(())
    }
}
