//! Product catalog API client
//!
//! Fetches the product list from a Fake Store compatible endpoint and
//! validates it into [`Product`] records.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::{Product, ProductId};

/// Catalog endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "https://fakestoreapi.com/products/";

/// Errors that can occur when fetching the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The server answered with a non-success status
    #[error("Network response was not ok!")]
    Network {
        /// Status code returned by the server
        status: StatusCode,
    },

    /// The request never produced a response (DNS, refused connection, ...)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The body is not a JSON array of products
    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// Two products in the same snapshot share an id
    #[error("duplicate product id {0} in catalog")]
    DuplicateId(ProductId),
}

/// Anything that can produce a catalog snapshot
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetches the full product list
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;
}

/// Client for fetching products over HTTP
#[derive(Debug, Clone)]
pub struct CatalogClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Catalog URL
    endpoint: String,
}

impl CatalogClient {
    /// Creates a new CatalogClient pointing at the Fake Store API
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Creates a new CatalogClient with a custom endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Returns the endpoint this client fetches from
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches and validates the product list
    ///
    /// # Returns
    /// * `Ok(Vec<Product>)` - Products in the order the API returned them
    /// * `Err(CatalogError)` - On transport failure, non-2xx status,
    ///   malformed body or duplicate ids
    ///
    /// One request per call. No retries and no caching here; the query
    /// layer owns both.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        tracing::debug!(endpoint = %self.endpoint, "requesting catalog");

        let response = self.http_client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint = %self.endpoint, %status, "catalog request failed");
            return Err(CatalogError::Network { status });
        }

        let text = response.text().await?;
        let products = parse_products(&text)?;

        tracing::info!(count = products.len(), "catalog decoded");
        Ok(products)
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductSource for CatalogClient {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        CatalogClient::fetch_products(self).await
    }
}

/// Decodes a response body into products and checks id uniqueness
pub fn parse_products(body: &str) -> Result<Vec<Product>, CatalogError> {
    let products: Vec<Product> = serde_json::from_str(body)?;

    let mut seen = HashSet::with_capacity(products.len());
    for product in &products {
        if !seen.insert(&product.id) {
            return Err(CatalogError::DuplicateId(product.id.clone()));
        }
    }

    Ok(products)
}
