//! Remote catalog API client.
//!
//! The catalog exposes read-only JSON endpoints for product data and stock
//! levels. Product lookups are cached via `moka` (5-minute TTL). Stock is
//! never cached: quantity validation must see the current value.

mod types;

pub use types::{CatalogProduct, StockLevel};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shoebox_core::ProductId;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CatalogConfig;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Catalog returned an unexpected status code.
    #[error("Catalog returned HTTP {0}")]
    Status(u16),
}

/// Client for the catalog API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    products: Cache<ProductId, CatalogProduct>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let base_url = config.base_url.as_str().trim_end_matches('/').to_string();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url,
                products,
            }),
        }
    }

    /// Fetch and decode a JSON document from the catalog.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let response = self
            .inner
            .client
            .get(format!("{}/{path}", self.inner.base_url))
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Get the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status(status.as_u16()));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }

    /// Look up a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: CatalogProduct = self.get_json(&format!("products/{id}")).await?;

        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }

    /// Look up current stock availability for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the stock entry is not found or the request
    /// fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_stock(&self, id: ProductId) -> Result<StockLevel, CatalogError> {
        self.get_json(&format!("stock/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound("products/123".to_string());
        assert_eq!(err.to_string(), "Not found: products/123");

        let err = CatalogError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");

        let err = CatalogError::Status(503);
        assert_eq!(err.to_string(), "Catalog returned HTTP 503");
    }
}
