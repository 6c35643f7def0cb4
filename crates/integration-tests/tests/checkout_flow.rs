//! End-to-end checkout behavior against the mock backend.

use jacaranda_core::{OrderId, OrderStatus};
use jacaranda_integration_tests::context::{TestContext, typed_product};
use jacaranda_integration_tests::sample_product;
use jacaranda_storefront::api::ApiError;
use jacaranda_storefront::services::checkout::{CheckoutError, OrderDraft};

fn full_draft() -> OrderDraft {
    OrderDraft {
        name: "Ana Souza".to_string(),
        email: "ana@example.com".to_string(),
        phone: "(11) 99999-9999".to_string(),
        street: "Avenida Paulista".to_string(),
        number: "1000".to_string(),
        neighborhood: "Bela Vista".to_string(),
        zipcode: "01310-100".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
        observation: "Entregar à tarde".to_string(),
    }
}

async fn context_with_cart() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.backend.seed_product(sample_product(
        "p-mesa",
        "Mesa Rústica",
        "100.00",
        Some("0.10"),
        "madeira",
    ));
    ctx.login_default().await;
    ctx.app
        .cart()
        .add(&typed_product(sample_product(
            "p-mesa",
            "Mesa Rústica",
            "100.00",
            Some("0.10"),
            "madeira",
        )))
        .await
        .unwrap();
    ctx
}

#[tokio::test]
async fn test_successful_checkout_clears_cart_and_returns_order_id() {
    let ctx = context_with_cart().await;

    let order_id = ctx.app.checkout().submit(&full_draft()).await.unwrap();
    assert_eq!(order_id, OrderId::new("order-1"));

    assert!(ctx.app.cart().is_empty());
    assert_eq!(ctx.backend.orders_count(), 1);

    // The confirmation view fetches the order back by the returned id
    let order = ctx.app.checkout().order_details(&order_id).await.unwrap();
    assert_eq!(order.id, order_id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.status.label(), "Pendente");
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.customer.email, "ana@example.com");
}

#[tokio::test]
async fn test_order_request_carries_no_prices_and_resolves_state_name() {
    let ctx = context_with_cart().await;
    ctx.app.checkout().submit(&full_draft()).await.unwrap();

    let request = ctx.backend.last_order_request().unwrap();

    let line = &request["productsIds"][0];
    assert_eq!(line["id"], "p-mesa");
    assert_eq!(line["quantity"], 1);
    assert!(line.get("price").is_none());

    assert_eq!(request["zipCode"], "01310-100");
    assert_eq!(request["state"], "SP");
    assert_eq!(request["stateName"], "São Paulo");
    assert_eq!(request["observation"], "Entregar à tarde");

    // Client-computed total rides along for display/audit
    let total = request["total"].as_f64().unwrap();
    assert!((total - 90.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_unformatted_zipcode_fails_before_any_request() {
    let ctx = context_with_cart().await;

    let mut draft = full_draft();
    draft.zipcode = "01310100".to_string();

    let err = ctx.app.checkout().submit(&draft).await.unwrap_err();
    assert!(matches!(err, CheckoutError::InvalidZipFormat));
    assert_eq!(ctx.backend.orders_count(), 0);
    assert!(!ctx.app.cart().is_empty());
}

#[tokio::test]
async fn test_missing_fields_are_reported_before_any_request() {
    let ctx = context_with_cart().await;

    let mut draft = full_draft();
    draft.phone = String::new();
    draft.city = String::new();

    let err = ctx.app.checkout().submit(&draft).await.unwrap_err();
    match err {
        CheckoutError::MissingFields(fields) => assert_eq!(fields, vec!["phone", "city"]),
        other => panic!("expected MissingFields, got {other:?}"),
    }
    assert_eq!(ctx.backend.orders_count(), 0);
}

#[tokio::test]
async fn test_checkout_without_session_is_unauthenticated() {
    let ctx = TestContext::new().await;

    let err = ctx.app.checkout().submit(&full_draft()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Unauthenticated));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_blocked() {
    let ctx = TestContext::new().await;
    ctx.login_default().await;

    let err = ctx.app.checkout().submit(&full_draft()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(ctx.backend.orders_count(), 0);
}

#[tokio::test]
async fn test_states_outage_falls_back_and_keeps_checkout_working() {
    let ctx = context_with_cart().await;
    ctx.backend.set_fail_states(true);

    let states = ctx.app.checkout().list_states().await;
    assert_eq!(states.len(), 3);
    assert!(states.iter().any(|s| s.code == "SP"));

    // A state outside the fallback list resolves to its raw code
    let mut draft = full_draft();
    draft.state = "PR".to_string();
    ctx.app.checkout().submit(&draft).await.unwrap();

    let request = ctx.backend.last_order_request().unwrap();
    assert_eq!(request["stateName"], "PR");
}

#[tokio::test]
async fn test_unknown_state_code_falls_back_to_the_code_itself() {
    let ctx = context_with_cart().await;

    let mut draft = full_draft();
    draft.state = "XX".to_string();
    ctx.app.checkout().submit(&draft).await.unwrap();

    let request = ctx.backend.last_order_request().unwrap();
    assert_eq!(request["stateName"], "XX");
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let ctx = TestContext::new().await;

    let err = ctx
        .app
        .checkout()
        .order_details(&OrderId::new("order-999"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
