//! Shared test harness: a mock backend plus a real storefront wired to it.

use std::path::PathBuf;

use serde_json::Value;
use tempfile::TempDir;

use jacaranda_storefront::api::types::Product;
use jacaranda_storefront::app::Storefront;
use jacaranda_storefront::config::StorefrontConfig;

use crate::MockBackend;

/// A running mock backend and a storefront pointed at it.
pub struct TestContext {
    pub backend: MockBackend,
    pub app: Storefront,
    config: StorefrontConfig,
    _cookie_dir: TempDir,
}

impl TestContext {
    /// Start a fresh backend and storefront with an empty cookie file.
    pub async fn new() -> Self {
        let backend = MockBackend::start().await;
        let cookie_dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig::new(
            &backend.url(),
            None,
            cookie_dir.path().join("cookie"),
        )
        .unwrap();
        let app = Storefront::start(config.clone()).await;

        Self {
            backend,
            app,
            config,
            _cookie_dir: cookie_dir,
        }
    }

    /// Simulate an app restart: a fresh storefront over the same cookie
    /// file and the same backend.
    pub async fn restart(&mut self) {
        self.app = Storefront::start(self.config.clone()).await;
    }

    /// Seed the default shopper account and log in.
    pub async fn login_default(&self) {
        self.backend
            .seed_user("Ana Souza", "ana@example.com", "s3nha-forte");
        self.app
            .login("ana@example.com", "s3nha-forte")
            .await
            .unwrap();
    }

    /// Path of the persisted cookie file.
    #[must_use]
    pub fn cookie_path(&self) -> PathBuf {
        self.config.cookie_file.clone()
    }
}

/// Deserialize a wire-format product into the typed client model.
#[must_use]
pub fn typed_product(value: Value) -> Product {
    serde_json::from_value(value).unwrap()
}
