//! Integration test support for Jacaranda.
//!
//! Everything runs in-process: [`MockBackend`] serves the backend REST
//! contract on an ephemeral loopback port with in-memory state, and a real
//! `Storefront` is pointed at it. Failure injection knobs let tests
//! exercise the degraded paths (cart failures, states outage, slow catalog
//! responses).

// Test-support crate: unwraps are as acceptable here as in #[cfg(test)] code.
#![allow(clippy::unwrap_used)]

pub mod context;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Mint a token in the backend's format: base64-encoded JSON claims with an
/// epoch-millisecond expiry.
#[must_use]
pub fn make_token(id: &str, name: &str, email: &str, exp_ms: i64) -> String {
    BASE64.encode(
        json!({
            "id": id,
            "name": name,
            "email": email,
            "exp": exp_ms,
        })
        .to_string(),
    )
}

/// Build a catalog product in the wire format.
#[must_use]
pub fn sample_product(
    id: &str,
    name: &str,
    price: &str,
    discount: Option<&str>,
    material: &str,
) -> Value {
    json!({
        "id": id,
        "name": name,
        "gallery": [format!("https://cdn.example/{id}.jpg")],
        "description": format!("{name} em {material}"),
        "price": price,
        "hasDiscount": discount.is_some(),
        "discountValue": discount.unwrap_or("0"),
        "details": {"adjective": "bonita", "material": material}
    })
}

#[derive(Debug, Clone)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
struct CartLine {
    product: Value,
    quantity: u32,
}

/// Shared in-memory state behind the mock routes.
#[derive(Default)]
pub struct BackendState {
    users: Mutex<Vec<UserRecord>>,
    products: Mutex<Vec<Value>>,
    /// Cart lines keyed by user id.
    carts: Mutex<HashMap<String, Vec<CartLine>>>,
    /// Order detail documents keyed by order id.
    orders: Mutex<HashMap<String, Value>>,
    /// Raw `POST /orders/create` bodies, in arrival order.
    order_requests: Mutex<Vec<Value>>,
    /// Query params of every `GET /products/find-all`, in arrival order.
    catalog_hits: Mutex<Vec<HashMap<String, String>>>,
    order_seq: AtomicU64,
    fail_cart_add: AtomicBool,
    fail_cart_remove: AtomicBool,
    fail_states: AtomicBool,
    /// Delay applied to catalog requests whose search matches the string.
    slow_search: Mutex<Option<(String, Duration)>>,
}

/// In-process mock of the backend API.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral loopback port and start serving.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());

        let router = Router::new()
            .route("/auth/login", post(login))
            .route("/accounts/create", post(create_account))
            .route("/products/find-all", get(find_products))
            .route("/cart/list", get(cart_list))
            .route("/cart/add", post(cart_add))
            .route("/cart/delete-product", delete(cart_remove))
            .route("/cart/update-quantity", put(cart_update_quantity))
            .route("/cart/clear", post(cart_clear))
            .route("/orders/create", post(create_order))
            .route("/orders/{id}", get(order_detail))
            .route("/api/states", get(list_states))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the running mock.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Register an account that `POST /auth/login` will accept.
    pub fn seed_user(&self, name: &str, email: &str, password: &str) {
        let mut users = self.state.users.lock().unwrap();
        let id = format!("u-{}", users.len() + 1);
        users.push(UserRecord {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
    }

    /// Add a product to the catalog.
    pub fn seed_product(&self, product: Value) {
        self.state.products.lock().unwrap().push(product);
    }

    /// Number of orders accepted so far.
    #[must_use]
    pub fn orders_count(&self) -> usize {
        self.state.orders.lock().unwrap().len()
    }

    /// The raw body of the most recent order submission.
    #[must_use]
    pub fn last_order_request(&self) -> Option<Value> {
        self.state.order_requests.lock().unwrap().last().cloned()
    }

    /// Query params of every catalog request received so far.
    #[must_use]
    pub fn catalog_hits(&self) -> Vec<HashMap<String, String>> {
        self.state.catalog_hits.lock().unwrap().clone()
    }

    /// Make `POST /cart/add` answer 500.
    pub fn set_fail_cart_add(&self, fail: bool) {
        self.state.fail_cart_add.store(fail, Ordering::SeqCst);
    }

    /// Make `DELETE /cart/delete-product` answer 500.
    pub fn set_fail_cart_remove(&self, fail: bool) {
        self.state.fail_cart_remove.store(fail, Ordering::SeqCst);
    }

    /// Make the states endpoint answer 500.
    pub fn set_fail_states(&self, fail: bool) {
        self.state.fail_states.store(fail, Ordering::SeqCst);
    }

    /// Delay catalog requests whose `search` param equals `term`.
    pub fn set_slow_search(&self, term: &str, delay: Duration) {
        *self.state.slow_search.lock().unwrap() = Some((term.to_string(), delay));
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// =============================================================================
// Route handlers
// =============================================================================

async fn login(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let users = state.users.lock().unwrap();
    match users
        .iter()
        .find(|u| u.email == email && u.password == password)
    {
        Some(user) => {
            let token = make_token(&user.id, &user.name, &user.email, now_ms() + 3_600_000);
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "user": {"id": user.id, "name": user.name, "email": user.email},
                    "token": token,
                })),
            )
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Email ou senha incorretos"})),
        ),
    }
}

async fn create_account(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    let mut users = state.users.lock().unwrap();
    if users.iter().any(|u| u.email == email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"success": false, "message": "Conta já existe para este email"})),
        );
    }

    let id = format!("u-{}", users.len() + 1);
    users.push(UserRecord {
        id,
        name,
        email,
        password,
    });
    (StatusCode::CREATED, Json(json!({"success": true})))
}

async fn find_products(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let delay = {
        let slow = state.slow_search.lock().unwrap();
        slow.as_ref()
            .filter(|(term, _)| params.get("search") == Some(term))
            .map(|(_, delay)| *delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    state.catalog_hits.lock().unwrap().push(params.clone());

    let all = state.products.lock().unwrap().clone();

    let matches = |p: &Value| -> bool {
        if let Some(search) = params.get("search") {
            let name = p["name"].as_str().unwrap_or_default().to_lowercase();
            if !name.contains(&search.to_lowercase()) {
                return false;
            }
        }
        let price: f64 = p["price"].as_str().unwrap_or("0").parse().unwrap_or(0.0);
        if let Some(min) = params.get("minPrice").and_then(|v| v.parse::<f64>().ok())
            && price < min
        {
            return false;
        }
        if let Some(max) = params.get("maxPrice").and_then(|v| v.parse::<f64>().ok())
            && price > max
        {
            return false;
        }
        if let Some(flag) = params.get("hasDiscount")
            && p["hasDiscount"].as_bool() != flag.parse().ok()
        {
            return false;
        }
        if let Some(material) = params.get("material")
            && p["details"]["material"].as_str() != Some(material)
        {
            return false;
        }
        true
    };

    let filtered: Vec<Value> = all.iter().filter(|p| matches(p)).cloned().collect();

    let page: usize = params
        .get("page")
        .and_then(|v| v.parse().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let limit: usize = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .filter(|l| *l >= 1)
        .unwrap_or(8);

    let total = filtered.len();
    let total_pages = total.div_ceil(limit).max(1);
    let page_items: Vec<Value> = filtered
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    let mut materials: Vec<String> = all
        .iter()
        .filter_map(|p| p["details"]["material"].as_str())
        .map(ToString::to_string)
        .collect();
    materials.sort();
    materials.dedup();

    Json(json!({
        "products": page_items,
        "pagination": {
            "currentPage": page,
            "totalPages": total_pages,
            "totalProducts": total,
            "hasNextPage": page < total_pages,
            "hasPrevPage": page > 1,
            "limit": limit,
        },
        "filters": {"materials": materials},
    }))
}

/// Resolve the bearer token to a user id, enforcing expiry.
fn bearer_identity(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth.strip_prefix("Bearer ")?;
    let claims: Value = serde_json::from_slice(&BASE64.decode(token).ok()?).ok()?;

    if claims["exp"].as_i64()? <= now_ms() {
        return None;
    }
    claims["id"].as_str().map(ToString::to_string)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "message": "Não autenticado"})),
    )
}

fn items_json(lines: &[CartLine]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|line| {
            let mut item = line.product.clone();
            if let Some(obj) = item.as_object_mut() {
                obj.insert("quantity".to_string(), json!(line.quantity));
            }
            item
        })
        .collect();
    json!({"items": items})
}

async fn cart_list(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(uid) = bearer_identity(&headers) else {
        return unauthorized();
    };

    let carts = state.carts.lock().unwrap();
    let lines = carts.get(&uid).cloned().unwrap_or_default();
    (StatusCode::OK, Json(items_json(&lines)))
}

async fn cart_add(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(uid) = bearer_identity(&headers) else {
        return unauthorized();
    };
    if state.fail_cart_add.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Erro interno"})),
        );
    }

    let product_id = body["productId"].as_str().unwrap_or_default().to_string();
    let product = body["product"].clone();

    let mut carts = state.carts.lock().unwrap();
    let lines = carts.entry(uid).or_default();
    // The backend owns the resulting quantity: an existing line increments
    match lines
        .iter_mut()
        .find(|line| line.product["id"].as_str() == Some(product_id.as_str()))
    {
        Some(line) => line.quantity += 1,
        None => lines.push(CartLine {
            product,
            quantity: 1,
        }),
    }

    (StatusCode::OK, Json(items_json(lines)))
}

async fn cart_remove(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(uid) = bearer_identity(&headers) else {
        return unauthorized();
    };
    if state.fail_cart_remove.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Erro interno"})),
        );
    }

    let product_id = body["productId"].as_str().unwrap_or_default();

    let mut carts = state.carts.lock().unwrap();
    let lines = carts.entry(uid).or_default();
    lines.retain(|line| line.product["id"].as_str() != Some(product_id));

    (StatusCode::OK, Json(items_json(lines)))
}

async fn cart_update_quantity(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(uid) = bearer_identity(&headers) else {
        return unauthorized();
    };

    let product_id = body["productId"].as_str().unwrap_or_default();
    let quantity = u32::try_from(body["quantity"].as_u64().unwrap_or(1)).unwrap_or(1);

    let mut carts = state.carts.lock().unwrap();
    let lines = carts.entry(uid).or_default();
    if let Some(line) = lines
        .iter_mut()
        .find(|line| line.product["id"].as_str() == Some(product_id))
    {
        line.quantity = quantity;
    }

    (StatusCode::OK, Json(items_json(lines)))
}

async fn cart_clear(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(uid) = bearer_identity(&headers) else {
        return unauthorized();
    };

    state.carts.lock().unwrap().remove(&uid);
    (StatusCode::OK, Json(json!({"success": true})))
}

async fn create_order(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(uid) = bearer_identity(&headers) else {
        return unauthorized();
    };

    state.order_requests.lock().unwrap().push(body.clone());

    let products = state.products.lock().unwrap().clone();
    let items: Vec<Value> = body["productsIds"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .filter_map(|line| {
            let id = line["id"].as_str()?;
            let product = products.iter().find(|p| p["id"].as_str() == Some(id))?;
            Some(json!({
                "id": id,
                "name": product["name"],
                "price": product["price"],
                "quantity": line["quantity"],
                "gallery": product["gallery"],
            }))
        })
        .collect();

    let customer = {
        let users = state.users.lock().unwrap();
        let user = users.iter().find(|u| u.id == uid);
        json!({
            "name": user.map_or("", |u| u.name.as_str()),
            "email": user.map_or("", |u| u.email.as_str()),
            "phone": body["phone"],
            "address": format!(
                "{}, {} - {}, {}/{}",
                body["street"].as_str().unwrap_or_default(),
                body["number"].as_str().unwrap_or_default(),
                body["neighborhood"].as_str().unwrap_or_default(),
                body["city"].as_str().unwrap_or_default(),
                body["state"].as_str().unwrap_or_default(),
            ),
        })
    };

    let order_id = format!("order-{}", state.order_seq.fetch_add(1, Ordering::SeqCst) + 1);
    let order = json!({
        "id": order_id,
        "items": items,
        "customer": customer,
        "total": body["total"],
        "createdAt": Utc::now().to_rfc3339(),
        "status": "pending",
    });

    state
        .orders
        .lock()
        .unwrap()
        .insert(order_id.clone(), order);

    (StatusCode::CREATED, Json(json!({"orderId": order_id})))
}

async fn order_detail(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.orders.lock().unwrap().get(&id) {
        Some(order) => (StatusCode::OK, Json(json!({"order": order}))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Pedido não encontrado"})),
        ),
    }
}

async fn list_states(State(state): State<Arc<BackendState>>) -> (StatusCode, Json<Value>) {
    if state.fail_states.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "message": "Erro interno"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "states": [
                {"code": "SP", "name": "São Paulo"},
                {"code": "RJ", "name": "Rio de Janeiro"},
                {"code": "MG", "name": "Minas Gerais"},
                {"code": "PR", "name": "Paraná"},
                {"code": "BA", "name": "Bahia"},
            ],
        })),
    )
}
