//! Core data models for shopgrid
//!
//! This module contains the product types decoded from the catalog API
//! and the client that fetches them.

pub mod catalog;

pub use catalog::{CatalogClient, CatalogError, ProductSource, DEFAULT_ENDPOINT};

use serde::Deserialize;
use std::fmt;

/// Identifier of a product
///
/// Catalog APIs use either numeric or string ids, so both are accepted.
/// The id is used as the rendering key for a product card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Numeric identifier (Fake Store uses these)
    Number(i64),
    /// Textual identifier
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        ProductId::Number(value)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        ProductId::Text(value.to_string())
    }
}

/// A single product from the catalog
///
/// Every field is required when decoding. Unknown fields in the JSON
/// (such as `rating`) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    /// Unique identifier within one catalog snapshot
    pub id: ProductId,
    /// Product name, matched against the search term
    pub title: String,
    /// Image URI
    pub image: String,
    /// Long-form description
    pub description: String,
    /// Price, currency-agnostic
    pub price: f64,
    /// Category label
    pub category: String,
}

impl Product {
    /// Formats the price with a leading currency symbol
    ///
    /// Uses the shortest decimal form, so `10.0` becomes `$10` and
    /// `9.99` stays `$9.99`.
    pub fn display_price(&self) -> String {
        format!("${}", self.price)
    }
}
