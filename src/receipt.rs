//! Receipt

use std::io;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    bundles::BundleRule,
    catalog::Catalog,
    products::ProductKey,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A consumed item is not in the catalog the receipt is rendered with.
    #[error("Missing product")]
    MissingProduct(ProductKey),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One application of a bundle rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedBundle<'a> {
    key: String,
    label: String,
    discount: Money<'a, Currency>,
    items: SmallVec<[ProductKey; 3]>,
}

impl<'a> AppliedBundle<'a> {
    /// Record an application of `rule` that consumed `items`.
    pub fn new(rule: &BundleRule<'a>, items: SmallVec<[ProductKey; 3]>) -> Self {
        Self {
            key: rule.key().to_string(),
            label: rule.label().to_string(),
            discount: rule.discount(),
            items,
        }
    }

    /// Key of the applied rule.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display label of the applied rule.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Discount granted by this application.
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Items consumed, in the order they were taken.
    pub fn items(&self) -> &[ProductKey] {
        &self.items
    }
}

/// Priced order.
///
/// `total` is always `subtotal - discount`. It is not clamped, so a rule set
/// whose discounts exceed the bundled items' value yields a negative total.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<'a> {
    subtotal: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    total: Money<'a, Currency>,
    applied: SmallVec<[AppliedBundle<'a>; 8]>,
    full_price_items: SmallVec<[ProductKey; 4]>,
}

impl<'a> Receipt<'a> {
    /// Create a receipt, deriving the discount and total from the applications.
    pub fn new(
        subtotal: Money<'a, Currency>,
        applied: SmallVec<[AppliedBundle<'a>; 8]>,
        full_price_items: SmallVec<[ProductKey; 4]>,
    ) -> Self {
        let currency = subtotal.currency();

        let discount_minor = applied.iter().fold(0_i64, |acc, app| {
            acc.saturating_add(app.discount.to_minor_units())
        });

        let total_minor = subtotal.to_minor_units().saturating_sub(discount_minor);

        Self {
            subtotal,
            discount: Money::from_minor(discount_minor, currency),
            total: Money::from_minor(total_minor, currency),
            applied,
            full_price_items,
        }
    }

    /// Total cost before any bundle discounts
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Sum of all bundle discounts
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Amount to pay: subtotal minus discount
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Bundle applications, in the order they were applied.
    pub fn applied_bundles(&self) -> &[AppliedBundle<'a>] {
        &self.applied
    }

    /// Keys of the applied rules, once per application, in application order.
    pub fn applied_sets(&self) -> SmallVec<[&str; 8]> {
        self.applied.iter().map(AppliedBundle::key).collect()
    }

    /// Labels of the applied rules, once per application, in application order.
    pub fn applied_labels(&self) -> SmallVec<[&str; 8]> {
        self.applied.iter().map(AppliedBundle::label).collect()
    }

    /// Applied labels with repeats collapsed to `label ×N`.
    pub fn summarized_sets(&self) -> Vec<String> {
        summarize(self.applied.iter().map(AppliedBundle::label))
    }

    /// Items left out of every bundle, one entry per unit.
    pub fn full_price_items(&self) -> &[ProductKey] {
        &self.full_price_items
    }

    /// Currency used for all monetary values.
    pub fn currency(&self) -> &'a Currency {
        self.subtotal.currency()
    }

    /// Writes the receipt as a table followed by its totals.
    ///
    /// # Errors
    ///
    /// Returns an error if an item is missing from `catalog` or the output cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        catalog: &Catalog<'_>,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Set", "Items", "Discount"]);

        for (idx, app) in self.applied.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                app.label.clone(),
                item_names(catalog, &app.items)?,
                format!("-{}", app.discount),
            ]);
        }

        if !self.full_price_items.is_empty() {
            builder.push_record([
                String::new(),
                "Full price".to_string(),
                item_names(catalog, &self.full_price_items)?,
                String::new(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..4), Alignment::right());

        writeln!(out, "\n{table}")?;

        let rows = [
            (" Subtotal:", self.subtotal.to_string()),
            (" Discount:", format!("-{}", self.discount)),
            (" Total:", self.total.to_string()),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, "{label:<label_width$} {value:>value_width$}")?;
        }

        Ok(())
    }
}

fn item_names(catalog: &Catalog<'_>, items: &[ProductKey]) -> Result<String, ReceiptError> {
    let names = items
        .iter()
        .map(|&key| {
            catalog
                .get(key)
                .map(|product| product.name.as_str())
                .ok_or(ReceiptError::MissingProduct(key))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(names.join(", "))
}

/// Collapse repeated labels into `label ×N`, ordered by first occurrence.
pub fn summarize<'s>(labels: impl IntoIterator<Item = &'s str>) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for label in labels {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    counts
        .into_iter()
        .map(|(label, count)| {
            if count > 1 {
                format!("{label} ×{count}")
            } else {
                label.to_string()
            }
        })
        .collect()
}
