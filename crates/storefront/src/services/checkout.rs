//! Checkout orchestration: validate the order form, submit, clear the cart.
//!
//! Validation happens entirely before any network call. Line items are sent
//! as id + quantity only - the backend reprices every line; the
//! client-computed total rides along for display/audit and is not
//! authoritative.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tracing::{instrument, warn};

use jacaranda_core::OrderId;

use crate::api::types::{CreateOrderRequest, OrderDetails, OrderLineRef, StateInfo};
use crate::api::{ApiClient, ApiError};
use crate::services::cart::CartStore;
use crate::session::SessionStore;

/// Shipping/contact form state, ephemeral to the current checkout attempt.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub zipcode: String,
    pub city: String,
    pub state: String,
    /// Free-text note; the only optional field.
    pub observation: String,
}

impl OrderDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("street", &self.street),
            ("number", &self.number),
            ("neighborhood", &self.neighborhood),
            ("zipcode", &self.zipcode),
            ("city", &self.city),
            ("state", &self.state),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Errors surfaced by checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout attempted without an active session.
    #[error("user is not authenticated")]
    Unauthenticated,

    /// Checkout attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// One or more required fields are empty.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Zipcode is not in the `00000-000` format.
    #[error("zipcode must match the format 00000-000")]
    InvalidZipFormat,

    /// The backend refused the order; the attempt is retryable.
    #[error("order submission failed: {0}")]
    SubmitFailed(#[source] ApiError),
}

/// Orchestrates order submission over the session, cart, and API client.
pub struct Checkout {
    api: ApiClient,
    session: Arc<SessionStore>,
    cart: Arc<CartStore>,
}

impl Checkout {
    /// Create a checkout orchestrator.
    #[must_use]
    pub fn new(api: ApiClient, session: Arc<SessionStore>, cart: Arc<CartStore>) -> Self {
        Self { api, session, cart }
    }

    /// Validate a draft without touching the network.
    ///
    /// Required fields are checked before the zipcode format. Raw values
    /// that bypassed the input formatter are not auto-corrected here.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::MissingFields`] or [`CheckoutError::InvalidZipFormat`].
    pub fn validate(draft: &OrderDraft) -> Result<(), CheckoutError> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingFields(missing));
        }

        if !is_valid_zipcode(&draft.zipcode) {
            return Err(CheckoutError::InvalidZipFormat);
        }

        Ok(())
    }

    /// Region list for the address form.
    ///
    /// Falls back to a static three-entry list when the reference endpoint
    /// is unreachable, so checkout is never blocked by a transient outage.
    pub async fn list_states(&self) -> Vec<StateInfo> {
        match self.api.list_states().await {
            Ok(states) => states,
            Err(error) => {
                warn!(%error, "Failed to load states, using fallback list");
                fallback_states()
            }
        }
    }

    /// Validate and submit the order. On success the cart is cleared and
    /// the backend-assigned order ID is returned for the confirmation view.
    ///
    /// # Errors
    ///
    /// Validation errors abort before any network call; a backend refusal
    /// surfaces as [`CheckoutError::SubmitFailed`] with no local state
    /// committed.
    #[instrument(skip(self, draft))]
    pub async fn submit(&self, draft: &OrderDraft) -> Result<OrderId, CheckoutError> {
        let token = self.session.token().ok_or(CheckoutError::Unauthenticated)?;

        let items = self.cart.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Self::validate(draft)?;

        // Resolve the human-readable state name, falling back to the code
        let states = self.list_states().await;
        let state_name = states
            .iter()
            .find(|s| s.code == draft.state)
            .map_or_else(|| draft.state.clone(), |s| s.name.clone());

        let request = CreateOrderRequest {
            products_ids: items
                .iter()
                .map(|item| OrderLineRef {
                    id: item.product.id.clone(),
                    quantity: item.quantity,
                })
                .collect(),
            phone: draft.phone.clone(),
            street: draft.street.clone(),
            number: draft.number.clone(),
            neighborhood: draft.neighborhood.clone(),
            zip_code: draft.zipcode.clone(),
            city: draft.city.clone(),
            state: draft.state.clone(),
            state_name,
            observation: draft.observation.clone(),
            total: self.cart.total().to_f64().unwrap_or_default(),
        };

        let order_id = self
            .api
            .create_order(&token, &request)
            .await
            .map_err(CheckoutError::SubmitFailed)?;

        self.cart.clear().await;

        Ok(order_id)
    }

    /// Fetch order detail for the confirmation view.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] if the order does not exist.
    pub async fn order_details(&self, order_id: &OrderId) -> Result<OrderDetails, ApiError> {
        self.api.order(order_id).await
    }
}

/// Incremental zipcode input formatter.
///
/// Strips non-digits, inserts the hyphen after the 5th digit once more than
/// five digits are present, and caps at 8 digits total.
#[must_use]
pub fn format_zipcode(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(8).collect();

    if digits.len() <= 5 {
        digits
    } else {
        let (prefix, suffix) = digits.split_at(5);
        format!("{prefix}-{suffix}")
    }
}

/// Literal `NNNNN-NNN` check, applied to the submitted value as-is.
fn is_valid_zipcode(zipcode: &str) -> bool {
    let bytes = zipcode.as_bytes();
    bytes.len() == 9
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 5 { *b == b'-' } else { b.is_ascii_digit() })
}

/// Static region list used when the reference endpoint is down.
fn fallback_states() -> Vec<StateInfo> {
    vec![
        StateInfo {
            code: "SP".to_string(),
            name: "São Paulo".to_string(),
        },
        StateInfo {
            code: "RJ".to_string(),
            name: "Rio de Janeiro".to_string(),
        },
        StateInfo {
            code: "MG".to_string(),
            name: "Minas Gerais".to_string(),
        },
    ]
}
