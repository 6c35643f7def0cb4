//! Catalog browsing command.

use rust_decimal::Decimal;

use jacaranda_storefront::api::types::Product;
use jacaranda_storefront::app::Storefront;
use jacaranda_storefront::services::catalog::CatalogQuery;

use super::{format_price, user_err};

/// Fetch and print one catalog page for the given filters.
#[allow(clippy::too_many_arguments)]
pub async fn browse(
    app: &Storefront,
    search: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    discounted: Option<bool>,
    material: Option<String>,
    page: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = app.catalog();

    let query = CatalogQuery {
        search: search.unwrap_or_default(),
        min_price,
        max_price,
        has_discount: discounted,
        material,
    };

    // Filter changes land on page 1; paging is a separate fetch, as in the UI
    catalog
        .apply_filters(query)
        .await
        .map_err(|e| user_err(e.into()))?;
    if page > 1 {
        catalog.set_page(page).await.map_err(|e| user_err(e.into()))?;
    }

    let Some(data) = catalog.page_data() else {
        println!("Nenhum resultado.");
        return Ok(());
    };

    println!(
        "Página {}/{} — {} produtos",
        data.pagination.current_page, data.pagination.total_pages, data.pagination.total_products
    );
    println!();

    if data.products.is_empty() {
        println!("Nenhum produto encontrado com esses filtros.");
    }
    for product in &data.products {
        println!("{}", product_line(product));
    }

    if !data.filters.materials.is_empty() {
        println!();
        println!("Materiais disponíveis: {}", data.filters.materials.join(", "));
    }
    if data.pagination.has_next_page {
        println!("Próxima página: --page {}", data.pagination.current_page + 1);
    }

    Ok(())
}

fn product_line(product: &Product) -> String {
    let price = if product.has_discount {
        format!(
            "{} (de {})",
            format_price(product.effective_price().amount()),
            format_price(product.price.amount())
        )
    } else {
        format_price(product.price.amount())
    };

    format!(
        "{:<12}  {:<32}  {:<12}  {price}",
        product.id.as_str(),
        product.name,
        product.details.material
    )
}
