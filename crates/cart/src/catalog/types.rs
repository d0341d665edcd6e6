//! Wire types for the catalog API.
//!
//! These mirror the catalog's JSON shapes; conversions into the domain
//! types used by cart entries live here too.

use rust_decimal::Decimal;
use serde::Deserialize;
use shoebox_core::{CurrencyCode, Price, ProductDetails, ProductId};

/// A product as returned by `GET /products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price as a JSON number. The catalog quotes everything in USD.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Product image URL.
    pub image: Option<String>,
}

impl CatalogProduct {
    /// Convert into the domain form carried by cart entries.
    #[must_use]
    pub fn details(&self) -> ProductDetails {
        ProductDetails {
            id: self.id,
            title: self.title.clone(),
            price: Price::new(self.price, CurrencyCode::USD),
            image_url: self.image.clone(),
        }
    }
}

/// Stock availability as returned by `GET /stock/{id}`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockLevel {
    /// Catalog product ID.
    pub id: ProductId,
    /// Raw available quantity. Negative values clamp to zero availability.
    pub amount: i64,
}

impl StockLevel {
    /// Available quantity usable for cart validation.
    #[must_use]
    pub fn available(&self) -> u32 {
        u32::try_from(self.amount).unwrap_or(0)
    }
}
