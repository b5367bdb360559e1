//! Prices

use rusty_money::{Money, iso::Currency};

use crate::{
    catalog::{Catalog, UnknownItemError},
    orders::Order,
};

/// Price of `quantity` units at `unit_price` minor units.
pub fn line_total(unit_price: i64, quantity: u32) -> i64 {
    unit_price.saturating_mul(i64::from(quantity))
}

/// Calculates the undiscounted total of an order.
///
/// # Errors
///
/// Returns an [`UnknownItemError`] if the order references an id the catalog does not contain.
pub fn subtotal<'a>(
    catalog: &Catalog<'a>,
    order: &Order,
) -> Result<Money<'a, Currency>, UnknownItemError> {
    let minor_units = order.iter().try_fold(0_i64, |acc, (id, quantity)| {
        let (_, _, product) = catalog.lookup(id)?;

        Ok::<_, UnknownItemError>(
            acc.saturating_add(line_total(product.price.to_minor_units(), quantity)),
        )
    })?;

    Ok(Money::from_minor(minor_units, catalog.currency()))
}
