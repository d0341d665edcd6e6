//! Session-related types.
//!
//! The session is the service's persistence slot: everything the cart
//! needs to survive a browser restart lives under the keys below.

/// Session keys for cart data.
pub mod keys {
    /// Key for the serialized cart snapshot.
    pub const CART: &str = "cart";
}
