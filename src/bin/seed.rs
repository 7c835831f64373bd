use serde_json::json;
use ucp_catalog_hub::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::merchants::RegisterMerchantRequest,
    error::AppError,
    middleware::base_url::BaseUrl,
    services::{
        ingest_service::{self, Upload},
        merchant_service,
    },
    state::AppState,
    store::MerchantStore,
};

const DEMO_EMAIL: &str = "demo@acme.example";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm_from_pool(&pool)).await?;

    let state = AppState::new(pool, &config);
    let base = BaseUrl(
        config
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", config.host, config.port)),
    );

    let registered = merchant_service::register_merchant(
        &state,
        &base,
        RegisterMerchantRequest {
            email: DEMO_EMAIL.into(),
            store_name: "Acme Shop".into(),
            store_url: "https://acme.example".into(),
        },
    )
    .await;

    let data = match registered {
        Ok(response) => response.data,
        Err(AppError::Conflict(_)) => {
            println!("Demo merchant {DEMO_EMAIL} already exists, nothing to do");
            return Ok(());
        }
        Err(err) => return Err(anyhow::anyhow!(err)),
    };
    let Some(data) = data else {
        anyhow::bail!("registration returned no merchant");
    };

    let merchant = MerchantStore::new(&state.orm)
        .find_active_by_api_key(&data.api_key)
        .await?
        .ok_or_else(|| anyhow::anyhow!("demo merchant vanished after registration"))?;

    let catalog = json!({
        "products": [
            {
                "name": "Enamel Camp Mug",
                "description": "12 oz enamel steel mug",
                "price": 14.5,
                "currency": "EUR",
                "url": "https://acme.example/p/camp-mug",
                "sku": "MUG-001",
                "category": "Kitchen",
                "brand": "Acme"
            },
            {
                "name": "Cast Iron Skillet",
                "price": "39.00",
                "url": "https://acme.example/p/skillet",
                "sku": "SKL-010",
                "category": "Kitchen",
                "brand": "Acme"
            },
            {
                "name": "Wool Blanket",
                "description": "Merino wool, 150 x 200 cm",
                "price": 89,
                "url": "https://acme.example/p/blanket",
                "category": "Home"
            }
        ]
    });

    let report = ingest_service::ingest(&state, &merchant, Upload::Json(catalog), true)
        .await
        .map_err(|err| anyhow::anyhow!(err))?;
    let inserted = report.data.map(|r| r.inserted).unwrap_or_default();

    println!(
        "Seed completed. Merchant '{}' ({} products), API key: {}",
        merchant.slug, inserted, data.api_key
    );
    Ok(())
}
