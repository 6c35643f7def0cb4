//! Application facade wiring the stores together.
//!
//! [`Storefront`] is the context object handed to the presentation layer:
//! any view can reach the session, cart, checkout, and catalog through it
//! without threading state explicitly, and without ambient globals.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::services::cart::CartStore;
use crate::services::catalog::CatalogBrowser;
use crate::services::checkout::Checkout;
use crate::session::{CookieFile, CurrentUser, SessionStore};

/// Application state shared across the presentation layer.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    session: Arc<SessionStore>,
    cart: Arc<CartStore>,
    checkout: Checkout,
    catalog: CatalogBrowser,
}

impl Storefront {
    /// Wire the stores together and run the initial session check.
    ///
    /// The persisted token (if any) is restored and the cart is loaded for
    /// the resulting session. Nothing is fetched from the catalog yet.
    pub async fn start(config: StorefrontConfig) -> Self {
        let api = ApiClient::new(&config);
        let session = Arc::new(SessionStore::new(CookieFile::new(
            config.cookie_file.clone(),
        )));
        let cart = Arc::new(CartStore::new(api.clone(), Arc::clone(&session)));
        let checkout = Checkout::new(api.clone(), Arc::clone(&session), Arc::clone(&cart));
        let catalog = CatalogBrowser::new(api.clone());

        session.initialize();
        cart.sync().await;

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                session,
                cart,
                checkout,
                catalog,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }

    /// Get a reference to the catalog browser.
    #[must_use]
    pub fn catalog(&self) -> &CatalogBrowser {
        &self.inner.catalog
    }

    /// Authenticate and activate the session; the cart is (re)loaded as a
    /// consequence of the session change.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser> {
        let (user, token) = self.inner.api.login(email, password).await?;
        let user = CurrentUser::from(user);

        self.inner.session.login(user.clone(), token);
        self.inner.cart.sync().await;

        Ok(user)
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        self.inner.api.create_account(name, email, password).await?;
        Ok(())
    }

    /// End the session; the cart empties as a consequence.
    pub async fn logout(&self) {
        self.inner.session.logout();
        self.inner.cart.sync().await;
    }
}
