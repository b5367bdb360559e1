//! Fixtures
//!
//! YAML catalog definitions. Products are listed in the order bundles should
//! take them, with prices written as `"AMOUNT CURRENCY"`:
//!
//! ```yaml
//! products:
//!   - id: butaman
//!     name: 豚まん
//!     price: 250 JPY
//!     category: food
//! ```

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, JPY, USD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    products::{Category, Product},
};

/// The built-in festival stall menu.
pub const FESTIVAL_CATALOG: &str = include_str!("../fixtures/catalogs/festival.yml");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// No products were declared, so the currency is unknown
    #[error("No products declared; currency unknown")]
    NoCurrency,

    /// The declared products do not form a valid catalog
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Wrapper for a catalog in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Products in declared order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: String,

    /// Product name
    pub name: String,

    /// Product price (e.g., "250 JPY")
    pub price: String,

    /// Product category
    pub category: String,
}

impl TryFrom<ProductFixture> for Product<'static> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product::new(
            fixture.id,
            fixture.name,
            Money::from_minor(minor_units, currency),
            Category::new(fixture.category),
        ))
    }
}

impl TryFrom<CatalogFixture> for Catalog<'static> {
    type Error = FixtureError;

    fn try_from(fixture: CatalogFixture) -> Result<Self, Self::Error> {
        let products = fixture
            .products
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let currency = products
            .first()
            .map(|product| product.price.currency())
            .ok_or(FixtureError::NoCurrency)?;

        Ok(Catalog::with_products(products, currency)?)
    }
}

/// Parse a catalog from YAML.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price is invalid, or the
/// products do not form a valid catalog.
pub fn catalog_from_str(yaml: &str) -> Result<Catalog<'static>, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

    Catalog::try_from(fixture)
}

/// Load a catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or [`catalog_from_str`] fails.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog<'static>, FixtureError> {
    let contents = fs::read_to_string(path)?;

    catalog_from_str(&contents)
}

/// Parse the embedded festival menu.
///
/// # Errors
///
/// Returns an error if the embedded fixture is invalid.
pub fn festival_catalog() -> Result<Catalog<'static>, FixtureError> {
    catalog_from_str(FESTIVAL_CATALOG)
}

/// Parse price string (e.g., "250 JPY" or "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the
/// amount is negative or finer than the currency's minor unit, or if the currency
/// code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let invalid = || FixtureError::InvalidPrice(s.to_string());

    let mut parts = s.split_whitespace();
    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = match currency_code {
        "JPY" => JPY,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let amount = amount.parse::<Decimal>().map_err(|_err| invalid())?;

    if amount.is_sign_negative() {
        return Err(invalid());
    }

    let scale = 10_i64.checked_pow(currency.exponent).ok_or_else(invalid)?;

    let minor = amount
        .checked_mul(Decimal::from(scale))
        .ok_or_else(invalid)?;

    if !minor.fract().is_zero() {
        return Err(invalid());
    }

    let minor_units = minor.to_i64().ok_or_else(invalid)?;

    Ok((minor_units, currency))
}
