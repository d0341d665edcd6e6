//! The cart container and its mutation operations.
//!
//! A [`Cart`] is an ordered list of product entries, unique by product ID,
//! with quantities bounded by stock availability at the time of each
//! mutation. All operations are pure: callers fetch the available stock
//! first and pass it in, which keeps the validation rules testable without
//! any I/O.
//!
//! The whole struct serializes with serde; the cart service stores it as a
//! snapshot in the session under a fixed key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CurrencyCode, Price, ProductId};

/// Errors from cart mutation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The requested quantity exceeds what the stock service reports.
    #[error("insufficient stock for product {id}: requested {requested}, available {available}")]
    OutOfStock {
        id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Quantities below one are never valid; remove the entry instead.
    #[error("quantity must be at least 1")]
    ZeroAmount,
}

/// Product data needed to create or refresh a cart entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetails {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Product image URL.
    pub image_url: Option<String>,
}

/// A product entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title, copied from the catalog at add time.
    pub title: String,
    /// Unit price, copied from the catalog at add time.
    pub price: Price,
    /// Product image URL.
    pub image_url: Option<String>,
    /// Quantity in the cart. At least 1, bounded by stock at mutation time.
    pub amount: u32,
}

impl CartItem {
    fn from_details(details: ProductDetails, amount: u32) -> Self {
        Self {
            id: details.id,
            title: details.title,
            price: details.price,
            image_url: details.image_url,
            amount,
        }
    }

    /// Overwrite the stored catalog fields with freshly fetched ones.
    fn refresh(&mut self, details: ProductDetails) {
        self.title = details.title;
        self.price = details.price;
        self.image_url = details.image_url;
    }

    /// Total for this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// The cart: an ordered list of product entries.
///
/// Entries keep insertion order. Uniqueness by product ID is maintained by
/// construction: adding an ID that is already present increments the
/// existing entry rather than appending a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    updated_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// The entries, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// When the cart was last mutated.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Quantity of the given product currently in the cart (0 if absent).
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map_or(0, |item| item.amount)
    }

    /// Sum of all line totals.
    ///
    /// The catalog prices everything in one currency, so the first entry's
    /// currency code is used (USD for an empty cart).
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let currency = self
            .items
            .first()
            .map_or_else(CurrencyCode::default, |item| item.price.currency_code);
        let amount = self
            .items
            .iter()
            .map(|item| item.line_total().amount)
            .sum();
        Price::new(amount, currency)
    }

    /// Add one unit of a product to the cart.
    ///
    /// Inserts a new entry at amount 1, or increments an existing entry and
    /// refreshes its stored catalog fields. Returns the entry's new amount.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] if the would-be amount exceeds
    /// `available`; the cart is left unchanged.
    pub fn add(&mut self, product: ProductDetails, available: u32) -> Result<u32, CartError> {
        let requested = self.amount_of(product.id) + 1;
        if available < requested {
            return Err(CartError::OutOfStock {
                id: product.id,
                requested,
                available,
            });
        }

        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => {
                item.amount = requested;
                item.refresh(product);
            }
            None => self.items.push(CartItem::from_details(product, 1)),
        }

        self.touch();
        Ok(requested)
    }

    /// Remove a product's entry from the cart, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product is absent; the cart
    /// is left unchanged.
    pub fn remove(&mut self, id: ProductId) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartError::NotInCart(id))?;

        let removed = self.items.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Overwrite a product entry's quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroAmount`] for `amount == 0`,
    /// [`CartError::NotInCart`] if the product is absent, or
    /// [`CartError::OutOfStock`] if `amount` exceeds `available`. The cart
    /// is left unchanged in every error case.
    pub fn set_amount(
        &mut self,
        id: ProductId,
        amount: u32,
        available: u32,
    ) -> Result<(), CartError> {
        if amount == 0 {
            return Err(CartError::ZeroAmount);
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CartError::NotInCart(id))?;

        if available < amount {
            return Err(CartError::OutOfStock {
                id,
                requested: amount,
                available,
            });
        }

        item.amount = amount;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn details(id: i32, cents: i64) -> ProductDetails {
        ProductDetails {
            id: ProductId::new(id),
            title: format!("Sneaker {id}"),
            price: Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
            image_url: Some(format!("https://cdn.shoebox.shop/{id}.jpg")),
        }
    }

    #[test]
    fn test_add_new_product_inserts_with_amount_one() {
        let mut cart = Cart::new();
        let new_amount = cart.add(details(1, 17_990), 5).unwrap();

        assert_eq!(new_amount, 1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.amount_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_add_existing_product_increments() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();
        let new_amount = cart.add(details(1, 17_990), 5).unwrap();

        assert_eq!(new_amount, 2);
        assert_eq!(cart.len(), 1, "no duplicate entries for the same ID");
        assert_eq!(cart.amount_of(ProductId::new(1)), 2);
    }

    #[test]
    fn test_add_allows_last_unit_in_stock() {
        let mut cart = Cart::new();
        assert!(cart.add(details(1, 17_990), 1).is_ok());
        assert_eq!(cart.amount_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_add_beyond_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 2).unwrap();
        cart.add(details(1, 17_990), 2).unwrap();

        let err = cart.add(details(1, 17_990), 2).unwrap_err();

        assert_eq!(
            err,
            CartError::OutOfStock {
                id: ProductId::new(1),
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(cart.amount_of(ProductId::new(1)), 2);
    }

    #[test]
    fn test_add_with_zero_stock_rejected() {
        let mut cart = Cart::new();
        assert!(cart.add(details(1, 17_990), 0).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_refreshes_stored_details() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();

        // Catalog price changed between the two adds.
        cart.add(details(1, 15_990), 5).unwrap();

        let item = cart.items().first().unwrap();
        assert_eq!(item.amount, 2);
        assert_eq!(item.price.amount, Decimal::new(15_990, 2));
    }

    #[test]
    fn test_remove_returns_entry() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();
        cart.add(details(2, 9_990), 5).unwrap();

        let removed = cart.remove(ProductId::new(1)).unwrap();

        assert_eq!(removed.id, ProductId::new(1));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.amount_of(ProductId::new(2)), 1);
    }

    #[test]
    fn test_remove_absent_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();

        let err = cart.remove(ProductId::new(99)).unwrap_err();

        assert_eq!(err, CartError::NotInCart(ProductId::new(99)));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_set_amount_overwrites() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();

        cart.set_amount(ProductId::new(1), 4, 5).unwrap();

        assert_eq!(cart.amount_of(ProductId::new(1)), 4);
    }

    #[test]
    fn test_set_amount_beyond_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();

        let err = cart.set_amount(ProductId::new(1), 6, 5).unwrap_err();

        assert_eq!(
            err,
            CartError::OutOfStock {
                id: ProductId::new(1),
                requested: 6,
                available: 5,
            }
        );
        assert_eq!(cart.amount_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_set_amount_zero_rejected() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();

        assert_eq!(
            cart.set_amount(ProductId::new(1), 0, 5).unwrap_err(),
            CartError::ZeroAmount
        );
        assert_eq!(cart.amount_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_set_amount_absent_product_rejected() {
        let mut cart = Cart::new();

        assert_eq!(
            cart.set_amount(ProductId::new(7), 2, 5).unwrap_err(),
            CartError::NotInCart(ProductId::new(7))
        );
    }

    #[test]
    fn test_subtotal_sums_line_totals() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();
        cart.add(details(1, 17_990), 5).unwrap();
        cart.add(details(2, 9_990), 5).unwrap();

        // 2 * 179.90 + 1 * 99.90
        assert_eq!(cart.subtotal().to_string(), "$459.70");
    }

    #[test]
    fn test_subtotal_of_empty_cart_is_zero() {
        assert_eq!(Cart::new().subtotal().to_string(), "$0.00");
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();
        cart.add(details(2, 9_990), 5).unwrap();
        cart.set_amount(ProductId::new(2), 3, 5).unwrap();

        let snapshot = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&snapshot).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.amount_of(ProductId::new(1)), 1);
        assert_eq!(restored.amount_of(ProductId::new(2)), 3);
        assert_eq!(restored.subtotal(), cart.subtotal());
        assert_eq!(restored.updated_at(), cart.updated_at());
    }

    #[test]
    fn test_error_display() {
        let err = CartError::OutOfStock {
            id: ProductId::new(3),
            requested: 4,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product 3: requested 4, available 2"
        );

        assert_eq!(
            CartError::NotInCart(ProductId::new(3)).to_string(),
            "product 3 is not in the cart"
        );
    }
}
