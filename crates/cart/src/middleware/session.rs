//! Session middleware configuration.
//!
//! The session is the cart's persistence slot: the serialized snapshot
//! lives under a fixed key in a `PostgreSQL`-backed tower-sessions store,
//! behind a signed cookie.

use secrecy::ExposeSecret;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::CartConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shoebox_session";

/// Session expiry time in seconds (30 days of inactivity).
///
/// Carts must survive browser restarts, so this is a much longer window
/// than a typical auth session.
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the session layer over a `PostgreSQL` store.
///
/// The cookie is signed with a key built from the configured session
/// secret (length-validated at startup).
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &CartConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // Config validation guarantees at least 64 bytes of key material
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())
        .expect("session secret provides insufficient key material");

    // Secure cookies only when actually served over HTTPS
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
