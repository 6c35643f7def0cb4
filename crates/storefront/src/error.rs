//! Unified error handling for the storefront client.
//!
//! Layer-specific errors converge here so the presentation layer deals with
//! a single type. `user_message` maps every variant onto the notification
//! text shown to the shopper, without leaking internal detail.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::cart::CartError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// Notification text for the shopper.
    ///
    /// Internal detail (statuses, transport errors) is collapsed into
    /// generic retry messages; validation errors keep their specifics.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Cart(CartError::Unauthenticated)
            | Self::Checkout(CheckoutError::Unauthenticated) => {
                "Faça login para continuar".to_string()
            }
            Self::Cart(CartError::AddFailed(_)) => {
                "Erro ao adicionar produto ao carrinho".to_string()
            }
            Self::Checkout(CheckoutError::EmptyCart) => "Seu carrinho está vazio".to_string(),
            Self::Checkout(CheckoutError::MissingFields(_)) => {
                "Por favor, preencha todos os campos obrigatórios".to_string()
            }
            Self::Checkout(CheckoutError::InvalidZipFormat) => {
                "CEP inválido. Use o formato 00000-000".to_string()
            }
            Self::Checkout(CheckoutError::SubmitFailed(_)) => {
                "Erro ao realizar pedido. Tente novamente.".to_string()
            }
            Self::Api(ApiError::Rejected(message)) => message.clone(),
            Self::Api(ApiError::NotFound(_)) => "Não encontrado".to_string(),
            Self::Api(_) => "Erro de comunicação com o servidor. Tente novamente.".to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_maps_to_login_prompt() {
        let err = AppError::Cart(CartError::Unauthenticated);
        assert_eq!(err.user_message(), "Faça login para continuar");
    }

    #[test]
    fn test_validation_errors_keep_specific_messages() {
        let err = AppError::Checkout(CheckoutError::InvalidZipFormat);
        assert_eq!(err.user_message(), "CEP inválido. Use o formato 00000-000");

        let err = AppError::Checkout(CheckoutError::MissingFields(vec!["phone"]));
        assert_eq!(
            err.user_message(),
            "Por favor, preencha todos os campos obrigatórios"
        );
    }

    #[test]
    fn test_backend_rejection_passes_its_message_through() {
        let err = AppError::Api(ApiError::Rejected("Email ou senha incorretos".to_string()));
        assert_eq!(err.user_message(), "Email ou senha incorretos");
    }

    #[test]
    fn test_transport_errors_collapse_to_generic_retry() {
        let err = AppError::Api(ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "stack trace".to_string(),
        });
        assert_eq!(
            err.user_message(),
            "Erro de comunicação com o servidor. Tente novamente."
        );
        assert!(!err.user_message().contains("stack trace"));
    }
}
