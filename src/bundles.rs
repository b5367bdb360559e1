//! Bundles
//!
//! A bundle rule takes a fixed set of items out of the pool in exchange for a
//! fixed discount. Rules are evaluated in priority order by the solver.

use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::{
    pool::{InsufficientPoolError, ItemPool},
    products::{Category, ProductKey},
};

/// Errors building a bundle rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BundleError {
    /// The rule would consume no items, so it could apply forever.
    #[error("bundle {0} consumes no items")]
    Empty(String),

    /// The rule's discount is below zero.
    #[error("bundle {0} has a negative discount")]
    NegativeDiscount(String),
}

/// A requirement for `count` items, optionally restricted to one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSlot {
    category: Option<Category>,
    count: usize,
}

impl BundleSlot {
    /// `count` items from `category`.
    pub fn of(category: Category, count: usize) -> Self {
        Self {
            category: Some(category),
            count,
        }
    }

    /// `count` items of any category.
    pub fn any(count: usize) -> Self {
        Self {
            category: None,
            count,
        }
    }

    /// Category the slot is restricted to, if any.
    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    /// Number of items the slot takes.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Bundle Rule
#[derive(Debug, Clone, PartialEq)]
pub struct BundleRule<'a> {
    key: String,
    label: String,
    discount: Money<'a, Currency>,
    slots: SmallVec<[BundleSlot; 3]>,
}

impl<'a> BundleRule<'a> {
    /// Create a bundle rule.
    ///
    /// Category-restricted slots are always filled before unrestricted ones,
    /// whatever order they are given in.
    ///
    /// # Errors
    ///
    /// - [`BundleError::Empty`]: the slots require no items.
    /// - [`BundleError::NegativeDiscount`]: the discount is below zero.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        discount: Money<'a, Currency>,
        slots: impl IntoIterator<Item = BundleSlot>,
    ) -> Result<Self, BundleError> {
        let rule = Self::from_parts(
            key.into(),
            label.into(),
            discount,
            slots.into_iter().collect(),
        );

        if rule.size() == 0 {
            return Err(BundleError::Empty(rule.key));
        }

        if rule.discount.is_negative() {
            return Err(BundleError::NegativeDiscount(rule.key));
        }

        Ok(rule)
    }

    fn from_parts(
        key: String,
        label: String,
        discount: Money<'a, Currency>,
        mut slots: SmallVec<[BundleSlot; 3]>,
    ) -> Self {
        // Stable: restricted slots keep their relative order.
        slots.sort_by_key(|slot| slot.category.is_none());

        Self {
            key,
            label,
            discount,
            slots,
        }
    }

    /// The stall's three bundles, in priority order, with discounts in minor units.
    ///
    /// 1. `drink-trio`: one drink and any two items, 200 off.
    /// 2. `food-trio`: three food items, 150 off.
    /// 3. `any-pair`: any two items, 100 off.
    pub fn standard(currency: &'a Currency) -> SmallVec<[BundleRule<'a>; 3]> {
        smallvec![
            Self::from_parts(
                "drink-trio".to_string(),
                "飲み物入り3品セット (-200)".to_string(),
                Money::from_minor(200, currency),
                smallvec![BundleSlot::of(Category::drink(), 1), BundleSlot::any(2)],
            ),
            Self::from_parts(
                "food-trio".to_string(),
                "食品3品セット (-150)".to_string(),
                Money::from_minor(150, currency),
                smallvec![BundleSlot::of(Category::food(), 3)],
            ),
            Self::from_parts(
                "any-pair".to_string(),
                "任意2品セット (-100)".to_string(),
                Money::from_minor(100, currency),
                smallvec![BundleSlot::any(2)],
            ),
        ]
    }

    /// Stable rule identifier, e.g. `drink-trio`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Discount granted per application.
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Slots, restricted ones first.
    pub fn slots(&self) -> &[BundleSlot] {
        &self.slots
    }

    /// Total number of items one application consumes.
    pub fn size(&self) -> usize {
        self.slots.iter().map(BundleSlot::count).sum()
    }

    /// Whether the pool holds enough items to apply this rule once.
    ///
    /// The pool must hold at least [`BundleRule::size`] items, and for each
    /// category at least the combined count of the slots restricted to it.
    pub fn is_applicable(&self, pool: &ItemPool<'_, '_>) -> bool {
        let enough_overall = u64::try_from(self.size()).is_ok_and(|size| pool.total() >= size);

        enough_overall
            && self
                .slots
                .iter()
                .filter_map(BundleSlot::category)
                .all(|category| self.has_enough(pool, category))
    }

    fn has_enough(&self, pool: &ItemPool<'_, '_>, category: &Category) -> bool {
        let required: usize = self
            .slots
            .iter()
            .filter(|slot| slot.category() == Some(category))
            .map(BundleSlot::count)
            .sum();

        u64::try_from(required).is_ok_and(|required| pool.count(category) >= required)
    }

    /// Apply the rule once, removing its items from the pool.
    ///
    /// Returns the consumed product keys in the order they were taken.
    ///
    /// # Errors
    ///
    /// Returns an [`InsufficientPoolError`] if a slot cannot be filled. Callers
    /// that check [`BundleRule::is_applicable`] first should never see this.
    pub fn consume(
        &self,
        pool: &mut ItemPool<'_, '_>,
    ) -> Result<SmallVec<[ProductKey; 3]>, InsufficientPoolError> {
        let mut consumed = SmallVec::with_capacity(self.size());

        for slot in &self.slots {
            consumed.extend(pool.take(slot.count, slot.category())?);
        }

        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::JPY;
    use testresult::TestResult;

    use crate::{catalog::Catalog, orders::Order};

    use super::*;

    fn rule<'a>(rules: &'a [BundleRule<'static>], key: &str) -> Option<&'a BundleRule<'static>> {
        rules.iter().find(|rule| rule.key() == key)
    }

    #[test]
    fn standard_rules_are_in_priority_order() {
        let rules = BundleRule::standard(JPY);

        let keys: Vec<&str> = rules.iter().map(BundleRule::key).collect();
        let discounts: Vec<i64> = rules
            .iter()
            .map(|r| r.discount().to_minor_units())
            .collect();

        assert_eq!(keys, ["drink-trio", "food-trio", "any-pair"]);
        assert_eq!(discounts, [200, 150, 100]);
        assert_eq!(
            rules.first().map(BundleRule::label),
            Some("飲み物入り3品セット (-200)")
        );
    }

    #[test]
    fn drink_trio_needs_three_items_including_a_drink() -> TestResult {
        let catalog = Catalog::festival()?;
        let rules = BundleRule::standard(JPY);
        let drink_trio = rule(&rules, "drink-trio").ok_or("missing drink-trio")?;

        let no_drink = Order::new().with("butaman", 5);
        let too_few = Order::new().with("wonglok", 2);
        let enough = Order::new().with("wonglok", 1).with("butaman", 2);

        assert!(!drink_trio.is_applicable(&ItemPool::from_order(&catalog, &no_drink)?));
        assert!(!drink_trio.is_applicable(&ItemPool::from_order(&catalog, &too_few)?));
        assert!(drink_trio.is_applicable(&ItemPool::from_order(&catalog, &enough)?));

        Ok(())
    }

    #[test]
    fn drink_trio_takes_its_drink_before_filling_any_slots() -> TestResult {
        let catalog = Catalog::festival()?;
        let rules = BundleRule::standard(JPY);
        let drink_trio = rule(&rules, "drink-trio").ok_or("missing drink-trio")?;

        // Food comes first in the catalog, so unrestricted slots would take it first.
        let order = Order::new().with("butaman", 2).with("wonglok", 1);
        let mut pool = ItemPool::from_order(&catalog, &order)?;

        let consumed = drink_trio.consume(&mut pool)?;
        let ids: Vec<&str> = consumed
            .iter()
            .filter_map(|&key| catalog.get(key).map(|p| p.id.as_str()))
            .collect();

        assert_eq!(ids, ["wonglok", "butaman", "butaman"]);
        assert!(pool.is_empty());

        Ok(())
    }

    #[test]
    fn restricted_slots_are_filled_first_regardless_of_declaration() -> TestResult {
        let rule = BundleRule::new(
            "pair-with-drink",
            "Pair with a drink",
            Money::from_minor(50, JPY),
            [BundleSlot::any(1), BundleSlot::of(Category::drink(), 1)],
        )?;

        assert_eq!(
            rule.slots(),
            [BundleSlot::of(Category::drink(), 1), BundleSlot::any(1)]
        );

        Ok(())
    }

    #[test]
    fn repeated_categories_are_summed_in_the_trigger() -> TestResult {
        let catalog = Catalog::festival()?;
        let rule = BundleRule::new(
            "double-drink",
            "Two drinks",
            Money::from_minor(50, JPY),
            [
                BundleSlot::of(Category::drink(), 1),
                BundleSlot::of(Category::drink(), 1),
            ],
        )?;

        let one_drink = Order::new().with("wonglok", 1).with("butaman", 3);

        assert!(!rule.is_applicable(&ItemPool::from_order(&catalog, &one_drink)?));

        Ok(())
    }

    #[test]
    fn empty_rules_are_rejected() {
        let result = BundleRule::new("nothing", "Nothing", Money::from_minor(50, JPY), []);

        assert_eq!(
            result.err(),
            Some(BundleError::Empty("nothing".to_string()))
        );
    }

    #[test]
    fn negative_discounts_are_rejected() {
        let result = BundleRule::new(
            "surcharge",
            "Surcharge",
            Money::from_minor(-50, JPY),
            [BundleSlot::any(2)],
        );

        assert_eq!(
            result.err(),
            Some(BundleError::NegativeDiscount("surcharge".to_string()))
        );
    }
}
