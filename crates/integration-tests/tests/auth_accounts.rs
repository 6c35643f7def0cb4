//! Account registration and login flows against the mock backend.

use jacaranda_integration_tests::context::TestContext;
use jacaranda_storefront::api::ApiError;
use jacaranda_storefront::error::AppError;

#[tokio::test]
async fn test_register_then_login() {
    let ctx = TestContext::new().await;

    ctx.app
        .register("Bia Lima", "bia@example.com", "outra-s3nha")
        .await
        .unwrap();

    // Registration does not log in by itself
    assert!(!ctx.app.session().is_authenticated());

    let user = ctx.app.login("bia@example.com", "outra-s3nha").await.unwrap();
    assert_eq!(user.name, "Bia Lima");
    assert!(ctx.app.session().is_authenticated());
    assert!(ctx.cookie_path().exists());
}

#[tokio::test]
async fn test_register_duplicate_email_reports_backend_message() {
    let ctx = TestContext::new().await;
    ctx.backend
        .seed_user("Ana Souza", "ana@example.com", "s3nha-forte");

    let err = ctx
        .app
        .register("Outra Ana", "ana@example.com", "qualquer")
        .await
        .unwrap_err();

    match &err {
        AppError::Api(ApiError::Rejected(message)) => {
            assert_eq!(message, "Conta já existe para este email");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(err.user_message(), "Conta já existe para este email");
}

#[tokio::test]
async fn test_login_with_wrong_password_reports_backend_message() {
    let ctx = TestContext::new().await;
    ctx.backend
        .seed_user("Ana Souza", "ana@example.com", "s3nha-forte");

    let err = ctx
        .app
        .login("ana@example.com", "senha-errada")
        .await
        .unwrap_err();

    assert!(matches!(&err, AppError::Api(ApiError::Rejected(_))));
    assert_eq!(err.user_message(), "Email ou senha incorretos");
    assert!(!ctx.app.session().is_authenticated());
    assert!(!ctx.cookie_path().exists());
}

#[tokio::test]
async fn test_login_success_loads_cart_for_session() {
    let ctx = TestContext::new().await;
    ctx.login_default().await;

    // Fresh session starts with the backend's (empty) cart
    assert!(ctx.app.cart().is_empty());
    assert!(ctx.app.session().token().is_some());
}
