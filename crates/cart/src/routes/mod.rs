//! HTTP route handlers for the cart service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Cart
//! GET  /cart                   - Current cart view
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Overwrite a product's quantity
//! POST /cart/remove            - Remove a product
//! GET  /cart/count             - Cart badge count (distinct entries)
//! ```

pub mod cart;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the cart service.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/cart", cart_routes())
}
