//! Typed REST client for the backend API.
//!
//! # Architecture
//!
//! - One method per backend endpoint, returning the deserialized payload
//! - The backend is source of truth - cart responses replace local state,
//!   never merge into it
//! - In-memory caching via `moka` for the states reference list (5 minute
//!   TTL); nothing else is cached
//!
//! Authenticated endpoints take the bearer token explicitly; the stores
//! decide whether a session is active before calling them.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use jacaranda_core::{OrderId, ProductId};

use crate::config::StorefrontConfig;
use types::{
    AddToCartRequest, CartItem, CartPayload, CreateOrderRequest, CreateOrderResponse,
    LoginRequest, LoginResponse, OrderDetails, OrderEnvelope, Product, ProductPage,
    RegisterRequest, RegisterResponse, RemoveFromCartRequest, SessionUser, StateInfo,
    StatesResponse, UpdateQuantityRequest,
};

/// How long the states reference list stays cached.
const STATES_CACHE_TTL: Duration = Duration::from_secs(300);

const STATES_CACHE_KEY: &str = "states";

/// Maximum response-body length echoed into errors and logs.
const BODY_SNIPPET_LEN: usize = 200;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, DNS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend responded with a non-success status.
    #[error("unexpected status {status}: {message}")]
    Status {
        status: StatusCode,
        message: String,
    },

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend refused the operation and said why in its `message` field.
    #[error("rejected by backend: {0}")]
    Rejected(String),
}

/// Client for the backend REST API.
///
/// Cheaply cloneable; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    api_url: String,
    states_url: String,
    states_cache: Cache<&'static str, Vec<StateInfo>>,
}

impl ApiClient {
    /// Create a new API client from configuration.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let states_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(STATES_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                api_url: config.api_url.clone(),
                states_url: config.states_url.clone(),
                states_cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.api_url)
    }

    fn bearer(builder: RequestBuilder, token: &SecretString) -> RequestBuilder {
        builder.header(
            header::AUTHORIZATION,
            format!("Bearer {}", token.expose_secret()),
        )
    }

    /// Send a request and deserialize the JSON response.
    async fn request<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let text = Self::request_text(builder).await?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %snippet(&text),
                    "Failed to parse backend response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Send a request, checking only the status and discarding the body.
    async fn request_unit(builder: RequestBuilder) -> Result<(), ApiError> {
        Self::request_text(builder).await.map(|_| ())
    }

    async fn request_text(builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %snippet(&text),
                "Backend returned non-success status"
            );
            if status == StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound(snippet(&text)));
            }
            return Err(ApiError::Status {
                status,
                message: snippet(&text),
            });
        }

        Ok(text)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for the user identity and a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the backend answers without a
    /// token, and the usual transport/status errors otherwise.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SessionUser, SecretString), ApiError> {
        // The login body is read even on a non-success status - the backend
        // carries its refusal reason in `message`
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<LoginResponse>(&text) {
            Ok(LoginResponse {
                success: true,
                user: Some(user),
                token: Some(token),
                ..
            }) => Ok((user, SecretString::from(token))),
            Ok(LoginResponse { message, .. }) => Err(ApiError::Rejected(
                message.unwrap_or_else(|| "Email ou senha incorretos".to_string()),
            )),
            Err(_) if !status.is_success() => Err(ApiError::Status {
                status,
                message: snippet(&text),
            }),
            Err(e) => Err(ApiError::Parse(e)),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/accounts/create"))
            .json(&RegisterRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(());
        }

        // A refusal carries its reason in `message`
        match serde_json::from_str::<RegisterResponse>(&text) {
            Ok(RegisterResponse {
                message: Some(message),
                ..
            }) => Err(ApiError::Rejected(message)),
            _ => Err(ApiError::Status {
                status,
                message: snippet(&text),
            }),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch a filtered, paginated catalog page.
    ///
    /// `params` is the already-built query string; empty filters must have
    /// been omitted by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, params))]
    pub async fn find_products(&self, params: &[(&str, String)]) -> Result<ProductPage, ApiError> {
        Self::request(
            self.inner
                .client
                .get(self.endpoint("/products/find-all"))
                .query(params),
        )
        .await
    }

    // =========================================================================
    // Cart (authenticated, never cached - mutable state)
    // =========================================================================

    /// Fetch the full cart for the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn cart_list(&self, token: &SecretString) -> Result<Vec<CartItem>, ApiError> {
        let payload: CartPayload =
            Self::request(Self::bearer(
                self.inner.client.get(self.endpoint("/cart/list")),
                token,
            ))
            .await?;
        Ok(payload.items)
    }

    /// Add a product; returns the authoritative item list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the addition.
    #[instrument(skip(self, token, product), fields(product_id = %product.id))]
    pub async fn cart_add(
        &self,
        token: &SecretString,
        product: &Product,
    ) -> Result<Vec<CartItem>, ApiError> {
        let payload: CartPayload = Self::request(Self::bearer(
            self.inner
                .client
                .post(self.endpoint("/cart/add"))
                .json(&AddToCartRequest {
                    product_id: &product.id,
                    product,
                }),
            token,
        ))
        .await?;
        Ok(payload.items)
    }

    /// Remove a product line; returns the authoritative item list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn cart_remove(
        &self,
        token: &SecretString,
        product_id: &ProductId,
    ) -> Result<Vec<CartItem>, ApiError> {
        let payload: CartPayload = Self::request(Self::bearer(
            self.inner
                .client
                .delete(self.endpoint("/cart/delete-product"))
                .json(&RemoveFromCartRequest { product_id }),
            token,
        ))
        .await?;
        Ok(payload.items)
    }

    /// Set a line quantity; returns the authoritative item list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id, quantity))]
    pub async fn cart_update_quantity(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartItem>, ApiError> {
        let payload: CartPayload = Self::request(Self::bearer(
            self.inner
                .client
                .put(self.endpoint("/cart/update-quantity"))
                .json(&UpdateQuantityRequest {
                    product_id,
                    quantity,
                }),
            token,
        ))
        .await?;
        Ok(payload.items)
    }

    /// Wipe the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn cart_clear(&self, token: &SecretString) -> Result<(), ApiError> {
        Self::request_unit(Self::bearer(
            self.inner.client.post(self.endpoint("/cart/clear")),
            token,
        ))
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order; returns the backend-assigned order ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the order.
    #[instrument(skip(self, token, request))]
    pub async fn create_order(
        &self,
        token: &SecretString,
        request: &CreateOrderRequest,
    ) -> Result<OrderId, ApiError> {
        let response: CreateOrderResponse = Self::request(Self::bearer(
            self.inner
                .client
                .post(self.endpoint("/orders/create"))
                .json(request),
            token,
        ))
        .await?;
        Ok(response.order_id)
    }

    /// Fetch order detail for the confirmation view. No auth required.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the order does not exist.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order(&self, order_id: &OrderId) -> Result<OrderDetails, ApiError> {
        let envelope: OrderEnvelope = Self::request(
            self.inner
                .client
                .get(self.endpoint(&format!("/orders/{order_id}"))),
        )
        .await?;
        Ok(envelope.order)
    }

    // =========================================================================
    // Reference data
    // =========================================================================

    /// Fetch the region reference list, cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; the checkout layer supplies the
    /// static fallback, not this client.
    #[instrument(skip(self))]
    pub async fn list_states(&self) -> Result<Vec<StateInfo>, ApiError> {
        if let Some(states) = self.inner.states_cache.get(STATES_CACHE_KEY).await {
            debug!("Cache hit for states");
            return Ok(states);
        }

        let response: StatesResponse =
            Self::request(self.inner.client.get(&self.inner.states_url)).await?;

        if !response.success {
            return Err(ApiError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "states endpoint reported failure".to_string()),
            ));
        }

        self.inner
            .states_cache
            .insert(STATES_CACHE_KEY, response.states.clone())
            .await;

        Ok(response.states)
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(BODY_SNIPPET_LEN).collect()
}
