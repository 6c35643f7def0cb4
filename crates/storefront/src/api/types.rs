//! Wire types for the backend REST API.
//!
//! Field names are camelCase on the wire. Everything here is an immutable
//! snapshot of what the backend returned - the client never edits these
//! structures locally and sends them back; mutations go through dedicated
//! request types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use jacaranda_core::{Email, OrderId, OrderStatus, Price, ProductId, UserId};

// =============================================================================
// Catalog
// =============================================================================

/// A product as returned by the catalog and carried inside cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Ordered image URLs; the first one is the thumbnail.
    pub gallery: Vec<String>,
    pub description: String,
    pub price: Price,
    pub has_discount: bool,
    /// Discount fraction in `[0, 1]`, meaningful only when `has_discount`.
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_value: Decimal,
    pub details: ProductDetails,
}

impl Product {
    /// Unit price after any active discount.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        if self.has_discount {
            self.price.discounted(self.discount_value)
        } else {
            self.price
        }
    }
}

/// Descriptive product attributes used for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub adjective: String,
    pub material: String,
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
    pub filters: CatalogFacets,
}

/// Pagination metadata for a catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_products: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    #[serde(default)]
    pub limit: u32,
}

/// Facet metadata accompanying a catalog page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogFacets {
    /// Materials available across the filtered result set.
    pub materials: Vec<String>,
}

// =============================================================================
// Auth
// =============================================================================

/// Identity fields of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<SessionUser>,
    pub token: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /accounts/create`.
#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

/// A cart line: a product snapshot plus its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Line total: discounted unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.effective_price().line_total(self.quantity)
    }
}

/// Cart envelope returned by every cart endpoint.
///
/// The returned item list is authoritative; local state is replaced with it
/// wholesale after each successful call.
#[derive(Debug, Clone, Deserialize)]
pub struct CartPayload {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest<'a> {
    pub product_id: &'a ProductId,
    pub product: &'a Product,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest<'a> {
    pub product_id: &'a ProductId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest<'a> {
    pub product_id: &'a ProductId,
    pub quantity: u32,
}

// =============================================================================
// Orders
// =============================================================================

/// Line-item reference in an order submission.
///
/// Carries no price: the backend reprices every line itself.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineRef {
    pub id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /orders/create`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub products_ids: Vec<OrderLineRef>,
    pub phone: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub state_name: String,
    pub observation: String,
    /// Client-computed total, for display/audit only; the backend does not
    /// trust it.
    pub total: f64,
}

/// Response of `POST /orders/create`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
}

/// Envelope of `GET /orders/:id`.
#[derive(Debug, Deserialize)]
pub struct OrderEnvelope {
    pub order: OrderDetails,
}

/// Order detail for the confirmation view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub customer: OrderCustomer,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

/// A line of a placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub gallery: Vec<String>,
}

/// Customer snapshot attached to a placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

// =============================================================================
// Reference data
// =============================================================================

/// A region entry for the address form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    pub code: String,
    pub name: String,
}

/// Envelope of the states reference endpoint.
#[derive(Debug, Deserialize)]
pub struct StatesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub states: Vec<StateInfo>,
    pub message: Option<String>,
}
