use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr};
use serde_json::{Value, json};
use tower::ServiceExt;
use ucp_catalog_hub::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::merchants::RegisterMerchantRequest,
    entity::merchants::{Column as MerchantCol, Entity as Merchants, Model as MerchantModel},
    error::AppError,
    middleware::base_url::BaseUrl,
    routes::{
        self,
        params::{FeedQuery, Pagination},
    },
    services::{
        discovery_service,
        ingest_service::{self, Upload},
        merchant_service,
    },
    state::AppState,
    store::MerchantStore,
};
use uuid::Uuid;

// Integration flow: register -> upload -> discover -> replace -> purge -> delete.
// Every test registers its own merchants, so they can share one database.

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run catalog flow tests.");
            return Ok(None);
        }
    };
    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        public_base_url: None,
        max_upload_bytes: 10 * 1024 * 1024,
        catalog_webhook_url: None,
        concurrency_limit: 10,
    };
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&orm_from_pool(&pool)).await?;
    Ok(Some(AppState::new(pool, &config)))
}

fn base() -> BaseUrl {
    BaseUrl("http://hub.test".into())
}

fn unique_tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn register(state: &AppState, store_name: &str) -> anyhow::Result<(MerchantModel, String)> {
    let response = merchant_service::register_merchant(
        state,
        &base(),
        RegisterMerchantRequest {
            email: format!("{}@shop.test", Uuid::new_v4()),
            store_name: store_name.to_string(),
            store_url: "https://shop.test".into(),
        },
    )
    .await?;
    let data = response.data.expect("registration data");
    assert!(data.api_key.starts_with("ucp_"));
    assert_eq!(data.api_key.len(), 4 + 64);

    let merchant = MerchantStore::new(&state.orm)
        .find_active_by_api_key(&data.api_key)
        .await?
        .expect("registered merchant is active");
    Ok((merchant, data.api_key))
}

async fn current_count(state: &AppState, slug: &str) -> anyhow::Result<i32> {
    let merchant = MerchantStore::new(&state.orm)
        .find_active_by_slug(slug)
        .await?
        .expect("merchant");
    Ok(merchant.product_count)
}

fn products(n: usize) -> serde_json::Value {
    let items: Vec<_> = (1..=n)
        .map(|i| {
            let category = if i % 2 == 0 { "even" } else { "odd" };
            json!({
                "name": format!("Product {i}"),
                "price": format!("{i}.50"),
                "url": format!("https://shop.test/p/{i}"),
                "category": category,
            })
        })
        .collect();
    json!({ "products": items })
}

#[tokio::test]
async fn upload_then_discover() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let tag = unique_tag();
    let (merchant, _) = register(&state, &format!("Acme Shop {tag}")).await?;
    assert_eq!(merchant.slug, format!("acme-shop-{tag}"));

    let report = ingest_service::ingest(
        &state,
        &merchant,
        Upload::Json(json!([
            { "name": "Mug", "price": 9.99, "url": "https://shop.test/mug", "currency": "usd" }
        ])),
        false,
    )
    .await?
    .data
    .expect("report");
    assert_eq!(report.inserted, 1);
    assert_eq!(report.product_count, 1);

    let feed = discovery_service::product_feed(
        &state,
        &base(),
        &HeaderMap::new(),
        &merchant.slug,
        FeedQuery::default(),
    )
    .await?;
    assert_eq!(feed.items.len(), 1);
    let offer = &feed.items[0].offers;
    assert_eq!(offer.price, Decimal::new(999, 2));
    assert_eq!(offer.currency, "USD");
    assert_eq!(offer.url, "https://shop.test/mug");
    assert_eq!(offer.seller.url, "https://shop.test");

    let profile = discovery_service::merchant_profile(&state, &base(), &merchant.slug).await?;
    assert_eq!(profile.catalog.product_count, 1);
    assert_eq!(profile.checkout.kind, "redirect");

    let directory = discovery_service::list_merchants(&state, &base()).await?;
    assert!(directory.merchants.iter().any(|m| m.slug == merchant.slug));

    Ok(())
}

#[tokio::test]
async fn replace_mode_swaps_the_catalog() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (merchant, _) = register(&state, &format!("Replace {}", unique_tag())).await?;

    ingest_service::ingest(&state, &merchant, Upload::Json(products(3)), false).await?;
    let appended = ingest_service::ingest(&state, &merchant, Upload::Json(products(2)), false)
        .await?
        .data
        .expect("report");
    assert_eq!(appended.deleted, 0);
    assert_eq!(appended.product_count, 5);

    let replaced = ingest_service::ingest(&state, &merchant, Upload::Json(products(2)), true)
        .await?
        .data
        .expect("report");
    assert_eq!(replaced.deleted, 5);
    assert_eq!(replaced.inserted, 2);
    assert_eq!(replaced.product_count, 2);
    assert_eq!(current_count(&state, &merchant.slug).await?, 2);

    Ok(())
}

#[tokio::test]
async fn rejected_uploads_write_nothing() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (merchant, _) = register(&state, &format!("Strict {}", unique_tag())).await?;
    ingest_service::ingest(&state, &merchant, Upload::Json(products(1)), false).await?;

    let missing_url = "name,price\nMug,9.99\n".to_string();
    let err = ingest_service::ingest(&state, &merchant, Upload::Csv(missing_url), true)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Structural(_)), "{err:?}");

    let negative = "name,price,url\n\
        A,1.00,https://shop.test/a\n\
        B,2.00,https://shop.test/b\n\
        C,-3,https://shop.test/c\n"
        .to_string();
    let err = ingest_service::ingest(&state, &merchant, Upload::Csv(negative), true)
        .await
        .unwrap_err();
    match err {
        AppError::Validation(failure) => {
            assert_eq!(failure.total, 1);
            assert_eq!(failure.errors[0].row, 4);
            assert_eq!(failure.errors[0].field, "price");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    // Replace was requested both times, yet the first product survived.
    assert_eq!(current_count(&state, &merchant.slug).await?, 1);
    Ok(())
}

#[tokio::test]
async fn feed_pagination_and_filters() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (merchant, _) = register(&state, &format!("Pages {}", unique_tag())).await?;
    ingest_service::ingest(&state, &merchant, Upload::Json(products(5)), false).await?;

    let feed = |page: i64| FeedQuery {
        page: Some(page),
        limit: Some(2),
        ..Default::default()
    };
    let first = discovery_service::product_feed(&state, &base(), &HeaderMap::new(), &merchant.slug, feed(1)).await?;
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.pagination.total, 5);
    assert_eq!(first.pagination.total_pages, 3);
    assert!(first.pagination.next.as_deref().is_some_and(|n| n.contains("page=2&limit=2")));

    let last = discovery_service::product_feed(&state, &base(), &HeaderMap::new(), &merchant.slug, feed(3)).await?;
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.pagination.next, None);

    let past_end = discovery_service::product_feed(&state, &base(), &HeaderMap::new(), &merchant.slug, feed(4)).await?;
    assert!(past_end.items.is_empty());

    let even = discovery_service::product_feed(
        &state,
        &base(),
        &HeaderMap::new(),
        &merchant.slug,
        FeedQuery {
            category: Some("even".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(even.pagination.total, 2);

    let search = discovery_service::product_feed(
        &state,
        &base(),
        &HeaderMap::new(),
        &merchant.slug,
        FeedQuery {
            q: Some("PRODUCT 3".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(search.items.len(), 1);
    assert_eq!(search.items[0].name, "Product 3");

    let wildcard = discovery_service::product_feed(
        &state,
        &base(),
        &HeaderMap::new(),
        &merchant.slug,
        FeedQuery {
            q: Some("%".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(wildcard.pagination.total, 0);

    Ok(())
}

#[tokio::test]
async fn tenants_are_isolated() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (alpha, _) = register(&state, &format!("Alpha {}", unique_tag())).await?;
    let (beta, _) = register(&state, &format!("Beta {}", unique_tag())).await?;
    ingest_service::ingest(&state, &alpha, Upload::Json(products(3)), false).await?;
    ingest_service::ingest(&state, &beta, Upload::Json(products(1)), false).await?;

    let purged = ingest_service::purge(&state, &alpha).await?.data.expect("purge");
    assert_eq!(purged.deleted, 3);
    assert_eq!(purged.product_count, 0);

    let mine = ingest_service::list_mine(&state, &beta, Pagination::default())
        .await?
        .data
        .expect("listing");
    assert_eq!(mine.items.len(), 1);
    assert_eq!(current_count(&state, &beta.slug).await?, 1);

    let directory = discovery_service::list_merchants(&state, &base()).await?;
    assert!(!directory.merchants.iter().any(|m| m.slug == alpha.slug));
    Ok(())
}

#[tokio::test]
async fn slug_collisions_and_duplicate_email() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let name = format!("Twin Store {}", unique_tag());
    let (first, _) = register(&state, &name).await?;
    let (second, _) = register(&state, &name).await?;
    assert_eq!(second.slug, format!("{}-2", first.slug));

    let err = merchant_service::register_merchant(
        &state,
        &base(),
        RegisterMerchantRequest {
            email: first.email.to_uppercase(),
            store_name: "Anything".into(),
            store_url: "https://shop.test".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn deleted_merchant_disappears() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (merchant, api_key) = register(&state, &format!("Gone {}", unique_tag())).await?;
    ingest_service::ingest(&state, &merchant, Upload::Json(products(2)), false).await?;

    let slug = merchant.slug.clone();
    merchant_service::delete_merchant(&state, merchant).await?;

    let err = discovery_service::merchant_profile(&state, &base(), &slug)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(
        MerchantStore::new(&state.orm)
            .find_active_by_api_key(&api_key)
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn large_upload_is_inserted_in_batches() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (merchant, _) = register(&state, &format!("Bulk {}", unique_tag())).await?;

    let report = ingest_service::ingest(&state, &merchant, Upload::Json(products(250)), false)
        .await?
        .data
        .expect("report");
    assert_eq!(report.inserted, 250);
    assert_eq!(report.product_count, 250);
    assert_eq!(current_count(&state, &merchant.slug).await?, 250);

    let third = ingest_service::list_mine(
        &state,
        &merchant,
        Pagination {
            page: Some(3),
            per_page: Some(100),
        },
    )
    .await?
    .data
    .expect("listing");
    assert_eq!(third.items.len(), 50);

    let feed = discovery_service::product_feed(
        &state,
        &base(),
        &HeaderMap::new(),
        &merchant.slug,
        FeedQuery::default(),
    )
    .await?;
    assert_eq!(feed.items.len(), 100);
    assert_eq!(feed.pagination.total, 250);
    assert_eq!(feed.pagination.total_pages, 3);
    Ok(())
}

async fn status_for_key(state: &AppState, api_key: &str) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder()
        .uri("/products/mine")
        .header("x-api-key", api_key)
        .body(Body::empty())?;
    let response = routes::app(state.clone(), 1024).oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes).unwrap_or(Value::Null)))
}

#[tokio::test]
async fn inactive_merchant_is_hidden_everywhere() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (merchant, api_key) = register(&state, &format!("Dormant {}", unique_tag())).await?;
    ingest_service::ingest(&state, &merchant, Upload::Json(products(2)), false).await?;
    assert_eq!(status_for_key(&state, &api_key).await?.0, StatusCode::OK);

    Merchants::update_many()
        .col_expr(MerchantCol::IsActive, Expr::value(false))
        .filter(MerchantCol::Id.eq(merchant.id))
        .exec(&state.orm)
        .await?;

    let err = discovery_service::merchant_profile(&state, &base(), &merchant.slug)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
    let err = discovery_service::product_feed(
        &state,
        &base(),
        &HeaderMap::new(),
        &merchant.slug,
        FeedQuery::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");

    let directory = discovery_service::list_merchants(&state, &base()).await?;
    assert!(!directory.merchants.iter().any(|m| m.slug == merchant.slug));

    let inactive = status_for_key(&state, &api_key).await?;
    let unknown = status_for_key(&state, &format!("ucp_{}", "0".repeat(64))).await?;
    assert_eq!(inactive.0, StatusCode::UNAUTHORIZED);
    assert_eq!(inactive, unknown);
    Ok(())
}

#[tokio::test]
async fn pages_far_past_the_end_are_empty() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (merchant, _) = register(&state, &format!("Far {}", unique_tag())).await?;
    ingest_service::ingest(&state, &merchant, Upload::Json(products(3)), false).await?;

    let feed = discovery_service::product_feed(
        &state,
        &base(),
        &HeaderMap::new(),
        &merchant.slug,
        FeedQuery {
            page: Some(i64::MAX),
            limit: Some(500),
            ..Default::default()
        },
    )
    .await?;
    assert!(feed.items.is_empty());
    assert_eq!(feed.pagination.total, 3);
    assert_eq!(feed.pagination.next, None);

    let mine = ingest_service::list_mine(
        &state,
        &merchant,
        Pagination {
            page: Some(i64::MAX),
            per_page: Some(1),
        },
    )
    .await?
    .data
    .expect("listing");
    assert!(mine.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn price_rounding_to_the_column_limit_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (merchant, _) = register(&state, &format!("Pricey {}", unique_tag())).await?;

    let too_big = "name,price,url\nYacht,9999999999.999,https://shop.test/y\n".to_string();
    let err = ingest_service::ingest(&state, &merchant, Upload::Csv(too_big), false)
        .await
        .unwrap_err();
    match err {
        AppError::Validation(failure) => assert_eq!(failure.errors[0].field, "price"),
        other => panic!("expected validation failure, got {other:?}"),
    }

    let largest = "name,price,url\nYacht,9999999999.99,https://shop.test/y\n".to_string();
    let report = ingest_service::ingest(&state, &merchant, Upload::Csv(largest), false)
        .await?
        .data
        .expect("report");
    assert_eq!(report.inserted, 1);
    Ok(())
}
