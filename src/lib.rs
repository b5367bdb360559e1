//! Yatai
//!
//! Yatai prices food stall orders, applying fixed-discount item bundles in priority order.

pub mod bundles;
pub mod catalog;
pub mod fixtures;
pub mod history;
pub mod orders;
pub mod pool;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod solvers;
