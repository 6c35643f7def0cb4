//! Order confirmation view.

use rust_decimal::Decimal;

use jacaranda_core::OrderId;
use jacaranda_storefront::api::ApiError;
use jacaranda_storefront::app::Storefront;

use super::{format_price, user_err};

/// Fetch and print the confirmation view for a placed order.
pub async fn show(app: &Storefront, order_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let order = app
        .checkout()
        .order_details(&OrderId::new(order_id))
        .await
        .map_err(|e| match e {
            ApiError::NotFound(_) => "Pedido não encontrado".into(),
            other => user_err(other.into()),
        })?;

    println!("Pedido {}", order.id);
    println!("Status: {}", order.status.label());
    println!("Data: {}", order.created_at.format("%d/%m/%Y %H:%M"));
    println!();

    for item in &order.items {
        println!(
            "{:<32}  x{:<3}  {}",
            item.name,
            item.quantity,
            format_price(item.price.amount() * Decimal::from(item.quantity))
        );
    }

    println!();
    println!("Cliente: {} <{}>", order.customer.name, order.customer.email);
    println!("Telefone: {}", order.customer.phone);
    println!("Endereço: {}", order.customer.address);
    println!();
    println!(
        "Total: {}",
        format_price(Decimal::try_from(order.total).unwrap_or_default())
    );

    Ok(())
}
