//! Orders

use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors parsing order input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// An order line was not of the form `ID=QUANTITY`.
    #[error("invalid order line {0:?}, expected ID=QUANTITY")]
    InvalidLine(String),
}

/// Requested quantities keyed by item id.
///
/// Quantities are always positive: setting an entry to zero removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct Order {
    quantities: BTreeMap<String, u32>,
}

impl Order {
    /// Create an empty order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an order from raw, possibly non-positive, quantities.
    ///
    /// Entries at or below zero are dropped and repeated ids are summed.
    pub fn from_input<S: Into<String>>(entries: impl IntoIterator<Item = (S, i64)>) -> Self {
        let mut order = Self::new();

        for (id, quantity) in entries {
            if let Ok(quantity) = u32::try_from(quantity.max(0)) {
                order.add(id, quantity);
            }
        }

        order
    }

    /// Set the quantity for an item, removing it when `quantity` is zero.
    pub fn set(&mut self, id: impl Into<String>, quantity: u32) -> &mut Self {
        let id = id.into();

        if quantity == 0 {
            self.quantities.remove(&id);
        } else {
            self.quantities.insert(id, quantity);
        }

        self
    }

    /// Add to the quantity for an item.
    pub fn add(&mut self, id: impl Into<String>, quantity: u32) -> &mut Self {
        if quantity > 0 {
            let entry = self.quantities.entry(id.into()).or_insert(0);
            *entry = entry.saturating_add(quantity);
        }

        self
    }

    /// Builder form of [`Order::add`].
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, quantity: u32) -> Self {
        self.add(id, quantity);
        self
    }

    /// Quantity requested for an item, zero if absent.
    pub fn quantity(&self, id: &str) -> u32 {
        self.quantities.get(id).copied().unwrap_or(0)
    }

    /// Iterate over `(id, quantity)` entries, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.quantities.iter().map(|(id, &qty)| (id.as_str(), qty))
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Whether nothing has been ordered.
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Total number of units across all items.
    pub fn total_quantity(&self) -> u64 {
        self.quantities.values().map(|&qty| u64::from(qty)).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Order {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut order = Self::new();

        for (id, quantity) in iter {
            order.add(id, quantity);
        }

        order
    }
}

impl From<BTreeMap<String, u32>> for Order {
    fn from(quantities: BTreeMap<String, u32>) -> Self {
        quantities.into_iter().collect()
    }
}

impl From<Order> for BTreeMap<String, u32> {
    fn from(order: Order) -> Self {
        order.quantities
    }
}

impl<'o> IntoIterator for &'o Order {
    type Item = (&'o String, &'o u32);
    type IntoIter = btree_map::Iter<'o, String, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.quantities.iter()
    }
}

/// Parse an `ID=QUANTITY` order line.
///
/// The quantity is returned as written; [`Order::from_input`] drops entries at
/// or below zero.
///
/// # Errors
///
/// Returns [`OrderError::InvalidLine`] if the line has no `=`, an empty id, or
/// a quantity that is not an integer.
pub fn parse_line(line: &str) -> Result<(String, i64), OrderError> {
    let invalid = || OrderError::InvalidLine(line.to_string());

    let (id, quantity) = line.split_once('=').ok_or_else(invalid)?;
    let id = id.trim();

    if id.is_empty() {
        return Err(invalid());
    }

    let quantity = quantity.trim().parse::<i64>().map_err(|_err| invalid())?;

    Ok((id.to_string(), quantity))
}
