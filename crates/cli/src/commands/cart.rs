//! Cart management commands.

use jacaranda_core::ProductId;
use jacaranda_storefront::api::ApiError;
use jacaranda_storefront::api::types::Product;
use jacaranda_storefront::app::Storefront;
use jacaranda_storefront::services::catalog::CatalogQuery;

use super::{format_price, user_err};

/// Print the cart lines and running total.
pub fn show(app: &Storefront) {
    let items = app.cart().items();
    if items.is_empty() {
        println!("Seu carrinho está vazio");
        return;
    }

    println!("Itens do carrinho ({})", items.len());
    for item in &items {
        println!(
            "{:<12}  {:<32}  x{:<3}  {}",
            item.product.id.as_str(),
            item.product.name,
            item.quantity,
            format_price(item.line_total())
        );
    }
    println!();
    println!("Total: {}", format_price(app.cart().total()));
}

/// Add products by ID, one awaited round-trip per product, in order.
pub async fn add(
    app: &Storefront,
    product_ids: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    for id in product_ids {
        let product = locate_product(app, id)
            .await
            .map_err(|e| user_err(e.into()))?
            .ok_or_else(|| format!("Produto não encontrado: {id}"))?;

        app.cart()
            .add(&product)
            .await
            .map_err(|e| user_err(e.into()))?;
        println!("Produto adicionado ao carrinho: {}", product.name);
    }
    Ok(())
}

/// Remove a line; best-effort, like the UI trash button.
pub async fn remove(app: &Storefront, product_id: &str) {
    app.cart().remove(&ProductId::new(product_id)).await;
    show(app);
}

/// Set a line quantity; zero or less removes the line.
pub async fn set_quantity(app: &Storefront, product_id: &str, quantity: i64) {
    app.cart()
        .update_quantity(&ProductId::new(product_id), quantity)
        .await;
    show(app);
}

/// Empty the cart.
pub async fn clear(app: &Storefront) {
    app.cart().clear().await;
    println!("Carrinho esvaziado.");
}

/// Find a product snapshot by ID.
///
/// The backend has no product-detail endpoint - the add payload carries the
/// snapshot the UI already had on screen - so walk the catalog pages until
/// the ID shows up.
async fn locate_product(app: &Storefront, id: &str) -> Result<Option<Product>, ApiError> {
    let target = ProductId::new(id);
    let query = CatalogQuery::default();

    let mut page = 1;
    loop {
        let data = app.api().find_products(&query.to_params(page)).await?;
        if let Some(found) = data.products.into_iter().find(|p| p.id == target) {
            return Ok(Some(found));
        }
        if !data.pagination.has_next_page {
            return Ok(None);
        }
        page += 1;
    }
}
