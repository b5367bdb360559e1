//! Solvers for Bundles

use thiserror::Error;

use crate::{
    bundles::BundleRule,
    catalog::{Catalog, UnknownItemError},
    orders::Order,
    pool::InsufficientPoolError,
    receipt::Receipt,
};

pub mod greedy;

pub use greedy::GreedySolver;

/// Solver Errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    /// The order references an item the catalog does not contain.
    #[error(transparent)]
    UnknownItem(#[from] UnknownItemError),

    /// A bundle passed its trigger check but could not be filled (this is a bug).
    #[error("bundle {rule} could not be filled: {source}")]
    InsufficientPool {
        /// Key of the bundle rule being applied
        rule: String,

        /// What the pool was missing
        source: InsufficientPoolError,
    },

    /// A bundle's discount is in a different currency to the catalog.
    #[error("bundle {rule} has currency {actual}, but catalog has currency {expected}")]
    CurrencyMismatch {
        /// Key of the bundle rule
        rule: String,

        /// Catalog currency code
        expected: &'static str,

        /// Bundle currency code
        actual: &'static str,
    },
}

/// Trait for pricing an order under a set of bundle rules
pub trait Solver {
    /// Price `order` against `catalog`, applying `rules` in priority order.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the order is invalid or a rule cannot be applied.
    fn solve<'a>(
        rules: &[BundleRule<'a>],
        catalog: &Catalog<'a>,
        order: &Order,
    ) -> Result<Receipt<'a>, SolverError>;
}

/// Price an order with the stall's standard bundles.
///
/// # Errors
///
/// Returns [`SolverError::UnknownItem`] if the order references an id the catalog does not contain.
pub fn compute_totals<'a>(
    catalog: &Catalog<'a>,
    order: &Order,
) -> Result<Receipt<'a>, SolverError> {
    GreedySolver::solve(&BundleRule::standard(catalog.currency()), catalog, order)
}
