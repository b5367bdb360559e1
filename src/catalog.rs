//! Catalog
//!
//! The fixed, ordered list of products a stall sells. Declaration order is
//! significant: whenever a bundle may take items of any kind, products are
//! taken in the order they were inserted here.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    fixtures::{self, FixtureError},
    products::{Product, ProductKey},
};

/// An order referenced an id the catalog does not contain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown item: {id}")]
pub struct UnknownItemError {
    /// The offending item id
    pub id: String,
}

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A product id was declared twice.
    #[error("duplicate product id: {0}")]
    DuplicateProduct(String),

    /// A product was priced below zero.
    #[error("product {id} has negative price {minor_units}")]
    NegativePrice {
        /// Product id
        id: String,

        /// Price in minor units
        minor_units: i64,
    },

    /// A product is priced in a different currency to the catalog.
    #[error("product {id} has currency {actual}, but catalog has currency {expected}")]
    CurrencyMismatch {
        /// Product id
        id: String,

        /// Catalog currency code
        expected: &'static str,

        /// Product currency code
        actual: &'static str,
    },
}

/// Catalog
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    declared: SmallVec<[ProductKey; 8]>,
    positions: FxHashMap<String, usize>,
    currency: &'a Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in `currency`.
    pub fn new(currency: &'a Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            declared: SmallVec::new(),
            positions: FxHashMap::default(),
            currency,
        }
    }

    /// Create a catalog from products, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if any product is rejected by [`Catalog::insert`].
    pub fn with_products(
        products: impl IntoIterator<Item = Product<'a>>,
        currency: &'a Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        for product in products {
            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    /// Append a product to the end of the catalog.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DuplicateProduct`]: the id is already declared.
    /// - [`CatalogError::NegativePrice`]: the price is below zero.
    /// - [`CatalogError::CurrencyMismatch`]: the price is not in the catalog currency.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        if self.positions.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        let currency = product.price.currency();
        if currency != self.currency {
            return Err(CatalogError::CurrencyMismatch {
                id: product.id,
                expected: self.currency.iso_alpha_code,
                actual: currency.iso_alpha_code,
            });
        }

        let minor_units = product.price.to_minor_units();
        if minor_units < 0 {
            return Err(CatalogError::NegativePrice {
                id: product.id,
                minor_units,
            });
        }

        self.positions.insert(product.id.clone(), self.declared.len());

        let key = self.products.insert(product);
        self.declared.push(key);

        Ok(key)
    }

    /// Load the built-in festival stall menu.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the embedded fixture fails to parse.
    pub fn festival() -> Result<Catalog<'static>, FixtureError> {
        fixtures::festival_catalog()
    }

    /// Get a product by key.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Get a product by id.
    pub fn product(&self, id: &str) -> Option<&Product<'a>> {
        self.lookup(id).ok().map(|(_, _, product)| product)
    }

    /// Resolve an id to its declared position, key and product.
    ///
    /// # Errors
    ///
    /// Returns an [`UnknownItemError`] if no product has this id.
    pub fn lookup(&self, id: &str) -> Result<(usize, ProductKey, &Product<'a>), UnknownItemError> {
        let unknown = || UnknownItemError { id: id.to_string() };

        let position = *self.positions.get(id).ok_or_else(unknown)?;
        let key = *self.declared.get(position).ok_or_else(unknown)?;
        let product = self.products.get(key).ok_or_else(unknown)?;

        Ok((position, key, product))
    }

    /// Iterate over products in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.declared
            .iter()
            .filter_map(|&key| self.products.get(key).map(|product| (key, product)))
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// Currency every product is priced in.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}
