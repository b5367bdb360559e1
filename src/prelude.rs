//! Yatai prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    bundles::{BundleError, BundleRule, BundleSlot},
    catalog::{Catalog, CatalogError, UnknownItemError},
    fixtures::{FixtureError, festival_catalog, load_catalog},
    history::{HistoryEntry, HistoryError, HistoryStore, JsonFileStore, OrderHistory},
    orders::{Order, OrderError},
    pool::{InsufficientPoolError, ItemPool},
    pricing::subtotal,
    products::{Category, Product, ProductKey},
    receipt::{AppliedBundle, Receipt, ReceiptError},
    solvers::{GreedySolver, Solver, SolverError, compute_totals},
};
