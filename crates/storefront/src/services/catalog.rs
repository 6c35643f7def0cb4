//! Catalog query layer: filters, pagination, debounced search.
//!
//! Pure request/response mapping - no caching, no client-side filtering.
//! Every filter or page change triggers a fresh fetch. Two guards bound the
//! chatter of an interactive caller:
//!
//! - search input is debounced behind a 500 ms quiet period, implemented as
//!   a cancellable delayed task that is aborted by superseding input and on
//!   drop;
//! - every fetch carries a monotonically increasing tag, and a response
//!   whose tag is no longer the latest issued is discarded, so a slow older
//!   response can never overwrite newer results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::types::ProductPage;
use crate::api::{ApiClient, ApiError};

/// Products per catalog page.
pub const PAGE_SIZE: u32 = 8;

/// Quiet period before a search keystroke triggers a fetch.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Filter state: a query descriptor with no identity of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub has_discount: Option<bool>,
    pub material: Option<String>,
}

impl CatalogQuery {
    /// Build the outgoing query string for `page`, omitting empty fields.
    #[must_use]
    pub fn to_params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", page.to_string()), ("limit", PAGE_SIZE.to_string())];

        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_owned()));
        }
        if let Some(min) = self.min_price {
            params.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("maxPrice", max.to_string()));
        }
        if let Some(flag) = self.has_discount {
            params.push(("hasDiscount", flag.to_string()));
        }
        if let Some(material) = self.material.as_deref().filter(|m| !m.is_empty()) {
            params.push(("material", material.to_owned()));
        }

        params
    }
}

#[derive(Debug)]
struct BrowserState {
    query: CatalogQuery,
    page: u32,
    data: Option<ProductPage>,
    loading: bool,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self {
            query: CatalogQuery::default(),
            page: 1,
            data: None,
            loading: false,
        }
    }
}

/// Catalog browser holding the current filter/page state and its results.
#[derive(Clone)]
pub struct CatalogBrowser {
    inner: Arc<BrowserInner>,
}

struct BrowserInner {
    api: ApiClient,
    state: RwLock<BrowserState>,
    /// Tag of the latest issued fetch; older responses are discarded.
    latest: AtomicU64,
    /// Pending debounced search task, aborted by superseding input.
    debounce: Mutex<Option<JoinHandle<()>>>,
}

impl CatalogBrowser {
    /// Create a browser with default filters on page 1. Nothing is fetched
    /// until the first refresh.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(BrowserInner {
                api,
                state: RwLock::new(BrowserState::default()),
                latest: AtomicU64::new(0),
                debounce: Mutex::new(None),
            }),
        }
    }

    /// Fetch the page for the current filter/page state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and was not superseded.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.inner.refresh().await
    }

    /// Replace the filters and refetch from page 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and was not superseded.
    pub async fn apply_filters(&self, query: CatalogQuery) -> Result<(), ApiError> {
        {
            let mut state = self.inner.write_state();
            state.query = query;
            state.page = 1;
        }
        self.refresh().await
    }

    /// Reset every filter and refetch from page 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and was not superseded.
    pub async fn clear_filters(&self) -> Result<(), ApiError> {
        self.apply_filters(CatalogQuery::default()).await
    }

    /// Jump to `page` and refetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and was not superseded.
    pub async fn set_page(&self, page: u32) -> Result<(), ApiError> {
        self.inner.write_state().page = page.max(1);
        self.refresh().await
    }

    /// Debounced search input.
    ///
    /// Each call supersedes the previous one; the fetch only fires after
    /// the quiet period elapses with no further input. Must be called
    /// within a tokio runtime.
    pub fn set_search(&self, term: impl Into<String>) {
        let term = term.into();
        let inner = Arc::clone(&self.inner);

        let task = tokio::spawn(async move {
            tokio::time::sleep(SEARCH_DEBOUNCE).await;
            {
                let mut state = inner.write_state();
                state.query.search = term;
                state.page = 1;
            }
            if let Err(error) = inner.refresh().await {
                warn!(%error, "Debounced search fetch failed");
            }
        });

        let mut slot = self
            .inner
            .debounce
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    /// Latest fetched page, if any.
    #[must_use]
    pub fn page_data(&self) -> Option<ProductPage> {
        self.inner.read_state().data.clone()
    }

    /// Current filter state.
    #[must_use]
    pub fn query(&self) -> CatalogQuery {
        self.inner.read_state().query.clone()
    }

    /// Current page number.
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.inner.read_state().page
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.read_state().loading
    }
}

impl BrowserInner {
    async fn refresh(&self) -> Result<(), ApiError> {
        let tag = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let params = {
            let mut state = self.write_state();
            state.loading = true;
            state.query.to_params(state.page)
        };

        let result = self.api.find_products(&params).await;

        let mut state = self.write_state();
        if self.latest.load(Ordering::SeqCst) != tag {
            debug!(tag, "Discarding superseded catalog response");
            return Ok(());
        }

        state.loading = false;
        match result {
            Ok(page) => {
                state.data = Some(page);
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, BrowserState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, BrowserState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for BrowserInner {
    fn drop(&mut self) {
        if let Some(task) = self
            .debounce
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}
