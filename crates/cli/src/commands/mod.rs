//! CLI subcommand implementations.
//!
//! Each module is a pure consumer of the storefront stores: read state,
//! forward the user's intent as a store method call, print the outcome.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use rust_decimal::Decimal;

use jacaranda_storefront::error::AppError;

/// Render a decimal amount the way the store displays currency.
pub(crate) fn format_price(value: Decimal) -> String {
    format!("R$ {value:.2}").replace('.', ",")
}

/// Collapse an application error into its shopper-facing message.
pub(crate) fn user_err(error: AppError) -> Box<dyn std::error::Error> {
    error.user_message().into()
}
