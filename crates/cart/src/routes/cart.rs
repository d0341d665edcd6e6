//! Cart route handlers.
//!
//! Each mutation loads the snapshot from the session, validates against
//! the remote catalog, applies the change, and stores the snapshot back.
//! There is no cross-request locking: two rapid mutations race and the
//! last write wins.
//!
//! Failures collapse to a single toast-style message per operation; the
//! underlying error is logged but never sent to the client.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use shoebox_core::{Cart, CartError, CartItem, ProductId};

use crate::models::session_keys;
use crate::state::AppState;

/// Shown when a quantity fails validation against stock.
const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is not available";
/// Shown for any other add failure.
const ADD_FAILED_MESSAGE: &str = "Could not add the product to the cart";
/// Shown for any other quantity-update failure.
const UPDATE_FAILED_MESSAGE: &str = "Could not change the product quantity";
/// Shown for any remove failure.
const REMOVE_FAILED_MESSAGE: &str = "Could not remove the product from the cart";

// =============================================================================
// View Types
// =============================================================================

/// Cart item display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: ProductId,
    pub title: String,
    pub amount: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: usize,
}

/// Cart count badge data.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCountView {
    pub count: usize,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal().to_string(),
            // The badge counts distinct products, not total quantity
            item_count: cart.len(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            amount: item.amount,
            price: item.price.to_string(),
            line_price: item.line_total().to_string(),
            image: item.image_url.clone(),
        }
    }
}

/// Toast-style error body: one user-facing message, nothing else.
#[derive(Debug, Serialize)]
struct Toast {
    message: &'static str,
}

fn toast(status: StatusCode, message: &'static str) -> Response {
    (status, Json(Toast { message })).into_response()
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart snapshot from the session (empty cart if absent).
async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Store the cart snapshot back into the session.
async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

// =============================================================================
// Request Types
// =============================================================================

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateAmountRequest {
    pub product_id: ProductId,
    pub amount: u32,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart view.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let cart = match load_cart(&session).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to load cart snapshot: {e}");
            Cart::new()
        }
    };

    Json(CartView::from(&cart))
}

/// Cart count badge data.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let count = match load_cart(&session).await {
        Ok(cart) => cart.len(),
        Err(e) => {
            tracing::warn!("Failed to load cart snapshot: {e}");
            0
        }
    };

    Json(CartCountView { count })
}

/// Add one unit of a product to the cart.
///
/// Stock is validated before the product lookup, so an out-of-stock add
/// never hits the product endpoint. Returns the updated cart view.
#[instrument(skip(state, session, request), fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Response {
    let id = request.product_id;

    let mut cart = match load_cart(&session).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!("Failed to load cart snapshot: {e}");
            return toast(StatusCode::INTERNAL_SERVER_ERROR, ADD_FAILED_MESSAGE);
        }
    };

    let stock = match state.catalog().get_stock(id).await {
        Ok(stock) => stock,
        Err(e) => {
            tracing::error!("Failed to fetch stock for product {id}: {e}");
            return toast(StatusCode::BAD_GATEWAY, ADD_FAILED_MESSAGE);
        }
    };

    let requested = cart.amount_of(id) + 1;
    if stock.available() < requested {
        tracing::warn!(
            requested,
            available = stock.available(),
            "Rejected add: insufficient stock"
        );
        return toast(StatusCode::UNPROCESSABLE_ENTITY, OUT_OF_STOCK_MESSAGE);
    }

    let product = match state.catalog().get_product(id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::error!("Failed to fetch product {id}: {e}");
            return toast(StatusCode::BAD_GATEWAY, ADD_FAILED_MESSAGE);
        }
    };

    match cart.add(product.details(), stock.available()) {
        Ok(amount) => {
            if let Err(e) = save_cart(&session, &cart).await {
                tracing::error!("Failed to store cart snapshot: {e}");
                return toast(StatusCode::INTERNAL_SERVER_ERROR, ADD_FAILED_MESSAGE);
            }

            tracing::debug!(amount, "Added product to cart");
            Json(CartView::from(&cart)).into_response()
        }
        Err(e @ CartError::OutOfStock { .. }) => {
            tracing::warn!("Rejected add: {e}");
            toast(StatusCode::UNPROCESSABLE_ENTITY, OUT_OF_STOCK_MESSAGE)
        }
        Err(e) => {
            tracing::error!("Failed to add product {id}: {e}");
            toast(StatusCode::UNPROCESSABLE_ENTITY, ADD_FAILED_MESSAGE)
        }
    }
}

/// Overwrite a product entry's quantity.
#[instrument(
    skip(state, session, request),
    fields(product_id = %request.product_id, amount = request.amount)
)]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateAmountRequest>,
) -> Response {
    let id = request.product_id;

    let mut cart = match load_cart(&session).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!("Failed to load cart snapshot: {e}");
            return toast(StatusCode::INTERNAL_SERVER_ERROR, UPDATE_FAILED_MESSAGE);
        }
    };

    let stock = match state.catalog().get_stock(id).await {
        Ok(stock) => stock,
        Err(e) => {
            tracing::error!("Failed to fetch stock for product {id}: {e}");
            return toast(StatusCode::BAD_GATEWAY, UPDATE_FAILED_MESSAGE);
        }
    };

    match cart.set_amount(id, request.amount, stock.available()) {
        Ok(()) => {
            if let Err(e) = save_cart(&session, &cart).await {
                tracing::error!("Failed to store cart snapshot: {e}");
                return toast(StatusCode::INTERNAL_SERVER_ERROR, UPDATE_FAILED_MESSAGE);
            }

            Json(CartView::from(&cart)).into_response()
        }
        Err(e @ CartError::OutOfStock { .. }) => {
            tracing::warn!("Rejected update: {e}");
            toast(StatusCode::UNPROCESSABLE_ENTITY, OUT_OF_STOCK_MESSAGE)
        }
        Err(e) => {
            tracing::warn!("Rejected update: {e}");
            toast(StatusCode::UNPROCESSABLE_ENTITY, UPDATE_FAILED_MESSAGE)
        }
    }
}

/// Remove a product from the cart.
#[instrument(skip(session, request), fields(product_id = %request.product_id))]
pub async fn remove(session: Session, Json(request): Json<RemoveFromCartRequest>) -> Response {
    let mut cart = match load_cart(&session).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!("Failed to load cart snapshot: {e}");
            return toast(StatusCode::INTERNAL_SERVER_ERROR, REMOVE_FAILED_MESSAGE);
        }
    };

    match cart.remove(request.product_id) {
        Ok(removed) => {
            if let Err(e) = save_cart(&session, &cart).await {
                tracing::error!("Failed to store cart snapshot: {e}");
                return toast(StatusCode::INTERNAL_SERVER_ERROR, REMOVE_FAILED_MESSAGE);
            }

            tracing::debug!(title = %removed.title, "Removed product from cart");
            Json(CartView::from(&cart)).into_response()
        }
        Err(e) => {
            tracing::warn!("Rejected remove: {e}");
            toast(StatusCode::UNPROCESSABLE_ENTITY, REMOVE_FAILED_MESSAGE)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shoebox_core::{CurrencyCode, Price, ProductDetails};

    fn details(id: i32, cents: i64) -> ProductDetails {
        ProductDetails {
            id: ProductId::new(id),
            title: format!("Sneaker {id}"),
            price: Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
            image_url: None,
        }
    }

    #[test]
    fn test_cart_view_formats_prices() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();
        cart.add(details(1, 17_990), 5).unwrap();

        let view = CartView::from(&cart);

        let item = view.items.first().unwrap();
        assert_eq!(item.amount, 2);
        assert_eq!(item.price, "$179.90");
        assert_eq!(item.line_price, "$359.80");
        assert_eq!(view.subtotal, "$359.80");
    }

    #[test]
    fn test_cart_view_counts_distinct_products() {
        let mut cart = Cart::new();
        cart.add(details(1, 17_990), 5).unwrap();
        cart.add(details(1, 17_990), 5).unwrap();
        cart.add(details(2, 9_990), 5).unwrap();

        let view = CartView::from(&cart);

        // Two entries, three units: the badge shows entries
        assert_eq!(view.item_count, 2);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&Cart::new());
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, "$0.00");
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_toast_body_shape() {
        let value = serde_json::to_value(Toast {
            message: OUT_OF_STOCK_MESSAGE,
        })
        .unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "message": "Requested quantity is not available" })
        );
    }
}
