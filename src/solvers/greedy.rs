//! Greedy Solver
//!
//! Applies each bundle rule as many times as it fits before moving on to the
//! next, in the order the rules are given. Rules only ever remove items, so a
//! rule that has stopped applying can never apply again and no rule is revisited.
//!
//! Reordering the rules changes the outcome: with the standard rules, one drink
//! and three food items give a single `drink-trio` (200 off), where `food-trio`
//! first would strand the drink and give 150 off.

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    bundles::BundleRule,
    catalog::Catalog,
    orders::Order,
    pool::ItemPool,
    pricing::subtotal,
    receipt::{AppliedBundle, Receipt},
    solvers::{Solver, SolverError},
};

/// Priority-ordered greedy bundle solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver;

impl Solver for GreedySolver {
    #[tracing::instrument(
        name = "greedy.solve",
        skip_all,
        fields(rules = rules.len(), lines = order.len(), units = order.total_quantity())
    )]
    fn solve<'a>(
        rules: &[BundleRule<'a>],
        catalog: &Catalog<'a>,
        order: &Order,
    ) -> Result<Receipt<'a>, SolverError> {
        let subtotal = subtotal(catalog, order)?;
        let mut pool = ItemPool::from_order(catalog, order)?;
        let mut applied = SmallVec::new();

        for rule in rules {
            ensure_currency(rule, catalog)?;

            let mut applications = 0_usize;

            while rule.is_applicable(&pool) {
                let items = rule
                    .consume(&mut pool)
                    .map_err(|source| SolverError::InsufficientPool {
                        rule: rule.key().to_string(),
                        source,
                    })?;

                applications += 1;
                applied.push(AppliedBundle::new(rule, items));
            }

            if applications > 0 {
                debug!(
                    rule = rule.key(),
                    applications,
                    remaining = pool.total(),
                    "bundle applied"
                );
            }
        }

        let receipt = Receipt::new(subtotal, applied, pool.remaining_items());

        debug!(
            subtotal = receipt.subtotal().to_minor_units(),
            discount = receipt.discount().to_minor_units(),
            total = receipt.total().to_minor_units(),
            "order priced"
        );

        Ok(receipt)
    }
}

fn ensure_currency(rule: &BundleRule<'_>, catalog: &Catalog<'_>) -> Result<(), SolverError> {
    let actual = rule.discount().currency();
    let expected = catalog.currency();

    if actual == expected {
        Ok(())
    } else {
        Err(SolverError::CurrencyMismatch {
            rule: rule.key().to_string(),
            expected: expected.iso_alpha_code,
            actual: actual.iso_alpha_code,
        })
    }
}
