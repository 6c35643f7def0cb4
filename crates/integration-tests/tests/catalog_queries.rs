//! Catalog query layer end-to-end: filters, pagination, debounce, and the
//! stale-response guard.

use std::time::Duration;

use jacaranda_integration_tests::context::TestContext;
use jacaranda_integration_tests::sample_product;
use jacaranda_storefront::services::catalog::CatalogQuery;

async fn seeded_context() -> TestContext {
    let ctx = TestContext::new().await;
    for i in 1..=9 {
        ctx.backend.seed_product(sample_product(
            &format!("p-mesa-{i}"),
            &format!("Mesa {i}"),
            &format!("{}0.00", i),
            None,
            "madeira",
        ));
    }
    ctx.backend.seed_product(sample_product(
        "p-cadeira",
        "Cadeira Moderna",
        "45.00",
        Some("0.20"),
        "aco",
    ));
    ctx
}

#[tokio::test]
async fn test_pagination_splits_on_page_size() {
    let ctx = seeded_context().await;
    let catalog = ctx.app.catalog();

    catalog.apply_filters(CatalogQuery::default()).await.unwrap();
    let page1 = catalog.page_data().unwrap();
    assert_eq!(page1.products.len(), 8);
    assert_eq!(page1.pagination.total_products, 10);
    assert_eq!(page1.pagination.total_pages, 2);
    assert!(page1.pagination.has_next_page);
    assert!(!page1.pagination.has_prev_page);

    catalog.set_page(2).await.unwrap();
    let page2 = catalog.page_data().unwrap();
    assert_eq!(page2.products.len(), 2);
    assert!(page2.pagination.has_prev_page);
    assert!(!page2.pagination.has_next_page);
}

#[tokio::test]
async fn test_default_query_omits_empty_filter_params() {
    let ctx = seeded_context().await;
    ctx.app
        .catalog()
        .apply_filters(CatalogQuery::default())
        .await
        .unwrap();

    let hits = ctx.backend.catalog_hits();
    let hit = hits.last().unwrap();
    assert_eq!(hit.get("page").map(String::as_str), Some("1"));
    assert_eq!(hit.get("limit").map(String::as_str), Some("8"));
    assert!(!hit.contains_key("search"));
    assert!(!hit.contains_key("minPrice"));
    assert!(!hit.contains_key("maxPrice"));
    assert!(!hit.contains_key("hasDiscount"));
    assert!(!hit.contains_key("material"));
}

#[tokio::test]
async fn test_filters_narrow_results_and_facets_survive() {
    let ctx = seeded_context().await;
    let catalog = ctx.app.catalog();

    catalog
        .apply_filters(CatalogQuery {
            material: Some("aco".to_string()),
            ..CatalogQuery::default()
        })
        .await
        .unwrap();
    let page = catalog.page_data().unwrap();
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].name, "Cadeira Moderna");
    // Facets list every material known to the catalog
    assert_eq!(page.filters.materials, vec!["aco", "madeira"]);

    catalog
        .apply_filters(CatalogQuery {
            has_discount: Some(true),
            ..CatalogQuery::default()
        })
        .await
        .unwrap();
    let page = catalog.page_data().unwrap();
    assert!(page.products.iter().all(|p| p.has_discount));

    catalog
        .apply_filters(CatalogQuery {
            min_price: Some("40".parse().unwrap()),
            max_price: Some("60".parse().unwrap()),
            ..CatalogQuery::default()
        })
        .await
        .unwrap();
    let page = catalog.page_data().unwrap();
    assert_eq!(page.products.len(), 4); // 40.00, 45.00, 50.00, 60.00
}

#[tokio::test]
async fn test_search_matches_names_case_insensitively() {
    let ctx = seeded_context().await;
    let catalog = ctx.app.catalog();

    catalog
        .apply_filters(CatalogQuery {
            search: "cadeira".to_string(),
            ..CatalogQuery::default()
        })
        .await
        .unwrap();
    let page = catalog.page_data().unwrap();
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].name, "Cadeira Moderna");
}

#[tokio::test]
async fn test_stale_response_never_overwrites_newer_results() {
    let ctx = seeded_context().await;
    ctx.backend
        .set_slow_search("mesa 1", Duration::from_millis(300));

    let catalog = ctx.app.catalog().clone();

    // Older query: slow on the backend
    let slow = {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            let _ = catalog
                .apply_filters(CatalogQuery {
                    search: "mesa 1".to_string(),
                    ..CatalogQuery::default()
                })
                .await;
        })
    };

    // Newer query issued while the old one is still in flight
    tokio::time::sleep(Duration::from_millis(50)).await;
    catalog
        .apply_filters(CatalogQuery {
            search: "cadeira".to_string(),
            ..CatalogQuery::default()
        })
        .await
        .unwrap();

    // Let the slow response land; it must be discarded
    slow.await.unwrap();

    let page = catalog.page_data().unwrap();
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].name, "Cadeira Moderna");
}

#[tokio::test]
async fn test_debounced_search_fires_once_after_quiet_period() {
    let ctx = seeded_context().await;
    let catalog = ctx.app.catalog();

    // Two keystrokes in quick succession; only the second survives
    catalog.set_search("me");
    tokio::time::sleep(Duration::from_millis(50)).await;
    catalog.set_search("cadeira");

    tokio::time::sleep(Duration::from_millis(700)).await;

    let hits = ctx.backend.catalog_hits();
    assert!(!hits.iter().any(|h| h.get("search").map(String::as_str) == Some("me")));
    assert_eq!(
        hits.iter()
            .filter(|h| h.get("search").map(String::as_str) == Some("cadeira"))
            .count(),
        1
    );

    let page = catalog.page_data().unwrap();
    assert_eq!(page.products.len(), 1);
    assert_eq!(catalog.query().search, "cadeira");
    assert_eq!(catalog.current_page(), 1);
}
