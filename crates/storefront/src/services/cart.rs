//! Server-authoritative shopping cart.
//!
//! Every mutation round-trips to the backend and the returned item list
//! replaces local state wholesale - no optimistic edits, no merge logic.
//! This keeps the client from drifting against backend-enforced business
//! rules (stock limits, pricing).
//!
//! Mutations require an active session. Without one, `add` fails with
//! [`CartError::Unauthenticated`] while `remove`/`update_quantity`/`clear`
//! are no-ops, matching the backend contract where the cart simply does not
//! exist outside a session.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::warn;

use jacaranda_core::ProductId;

use crate::api::types::{CartItem, Product};
use crate::api::{ApiClient, ApiError};
use crate::session::{CurrentUser, SessionStore};

/// Errors surfaced by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A mutation was attempted without an active session.
    #[error("user is not authenticated")]
    Unauthenticated,

    /// The backend refused an addition.
    #[error("failed to add product to cart: {0}")]
    AddFailed(#[source] ApiError),
}

/// Holder of the current session's cart lines.
pub struct CartStore {
    api: ApiClient,
    session: Arc<SessionStore>,
    items: RwLock<Vec<CartItem>>,
    session_changes: Mutex<watch::Receiver<Option<CurrentUser>>>,
}

impl CartStore {
    /// Create a cart store bound to `session`.
    ///
    /// The store subscribes to session changes at construction; call
    /// [`Self::sync`] (or spawn [`Self::watch_session`]) to act on them.
    #[must_use]
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        let session_changes = Mutex::new(session.subscribe());
        Self {
            api,
            session,
            items: RwLock::new(Vec::new()),
            session_changes,
        }
    }

    /// Align cart state with the current session: load when a session is
    /// active, reset to empty otherwise.
    pub async fn sync(&self) {
        if self.session.is_authenticated() {
            self.load().await;
        } else {
            self.write_items().clear();
        }
    }

    /// Follow session changes until the session store is dropped.
    ///
    /// Intended to be spawned on a task by embedders that mutate the
    /// session from several places; the [`crate::app::Storefront`] facade
    /// instead calls [`Self::sync`] after each session mutation.
    pub async fn watch_session(&self) {
        let mut rx = self.session_changes.lock().await;
        while rx.changed().await.is_ok() {
            self.sync().await;
        }
    }

    /// Fetch the cart from the backend, replacing local state on success.
    ///
    /// A failure is logged and leaves local state unchanged; nothing is
    /// surfaced to the caller.
    pub async fn load(&self) {
        let Some(token) = self.session.token() else {
            return;
        };

        match self.api.cart_list(&token).await {
            Ok(items) => *self.write_items() = items,
            Err(error) => warn!(%error, "Failed to load cart"),
        }
    }

    /// Add a product to the cart.
    ///
    /// The backend decides the resulting quantity (an existing line is
    /// incremented server-side); the returned list becomes local state.
    ///
    /// # Errors
    ///
    /// [`CartError::Unauthenticated`] without a session;
    /// [`CartError::AddFailed`] when the backend refuses.
    pub async fn add(&self, product: &Product) -> Result<(), CartError> {
        let token = self.session.token().ok_or(CartError::Unauthenticated)?;

        let items = self
            .api
            .cart_add(&token, product)
            .await
            .map_err(CartError::AddFailed)?;
        *self.write_items() = items;
        Ok(())
    }

    /// Remove a product line.
    ///
    /// No-op without a session; a backend failure is logged, not surfaced.
    pub async fn remove(&self, product_id: &ProductId) {
        let Some(token) = self.session.token() else {
            return;
        };

        match self.api.cart_remove(&token, product_id).await {
            Ok(items) => *self.write_items() = items,
            Err(error) => {
                warn!(%error, %product_id, "Failed to remove product from cart");
            }
        }
    }

    /// Set a line quantity. A quantity of zero or less removes the line.
    ///
    /// No-op without a session; a backend failure is logged, not surfaced.
    pub async fn update_quantity(&self, product_id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id).await;
            return;
        }

        let Some(token) = self.session.token() else {
            return;
        };

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self
            .api
            .cart_update_quantity(&token, product_id, quantity)
            .await
        {
            Ok(items) => *self.write_items() = items,
            Err(error) => {
                warn!(%error, %product_id, quantity, "Failed to update cart quantity");
            }
        }
    }

    /// Wipe the cart, locally and on the backend.
    ///
    /// No-op without a session; a backend failure is logged, not surfaced.
    pub async fn clear(&self) {
        let Some(token) = self.session.token() else {
            return;
        };

        match self.api.cart_clear(&token).await {
            Ok(()) => self.write_items().clear(),
            Err(error) => warn!(%error, "Failed to clear cart"),
        }
    }

    /// Cart total: `Σ price·(1−discount)·quantity` over the local items.
    ///
    /// Pure computation, order-independent; currency formatting is a
    /// presentation concern.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.read_items().iter().map(CartItem::line_total).sum()
    }

    /// Snapshot of the current item list.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.read_items().clone()
    }

    /// Number of cart lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_items().len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_items().is_empty()
    }

    fn read_items(&self) -> RwLockReadGuard<'_, Vec<CartItem>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_items(&self) -> RwLockWriteGuard<'_, Vec<CartItem>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn set_items(&self, items: Vec<CartItem>) {
        *self.write_items() = items;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::api::types::ProductDetails;
    use crate::config::StorefrontConfig;
    use crate::session::CookieFile;

    fn offline_store() -> (tempfile::TempDir, CartStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig::new(
            "http://127.0.0.1:9", // discard port - nothing should connect in these tests
            None,
            dir.path().join("cookie"),
        )
        .unwrap();
        let session = Arc::new(SessionStore::new(CookieFile::new(dir.path().join("cookie"))));
        session.initialize();
        let cart = CartStore::new(ApiClient::new(&config), session);
        (dir, cart)
    }

    fn item(id: &str, price: &str, discount: Option<&str>, quantity: u32) -> CartItem {
        CartItem {
            product: Product {
                id: ProductId::new(id),
                name: format!("Produto {id}"),
                gallery: vec![],
                description: String::new(),
                price: price.parse().unwrap(),
                has_discount: discount.is_some(),
                discount_value: discount.unwrap_or("0").parse().unwrap(),
                details: ProductDetails {
                    adjective: "simples".to_string(),
                    material: "madeira".to_string(),
                },
            },
            quantity,
        }
    }

    #[tokio::test]
    async fn test_add_without_session_is_unauthenticated() {
        let (_dir, cart) = offline_store();
        let product = item("p1", "10.00", None, 1).product;

        let result = cart.add(&product).await;
        assert!(matches!(result, Err(CartError::Unauthenticated)));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_mutations_without_session_are_noops() {
        let (_dir, cart) = offline_store();
        let id = ProductId::new("p1");

        // None of these may touch the network or panic
        cart.remove(&id).await;
        cart.update_quantity(&id, 3).await;
        cart.clear().await;
        cart.load().await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_total_is_order_independent() {
        let (_dir, cart) = offline_store();
        let a = item("a", "100.00", Some("0.10"), 2); // 180.00
        let b = item("b", "19.90", None, 3); // 59.70

        cart.set_items(vec![a.clone(), b.clone()]);
        let forward = cart.total();

        cart.set_items(vec![b, a]);
        assert_eq!(cart.total(), forward);
        assert_eq!(forward, "239.70".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_total_of_empty_cart_is_zero() {
        let (_dir, cart) = offline_store();
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
