use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{merchants::Model as MerchantModel, products::Model as ProductModel};

/// Merchant as shown to its owner. The API key is never echoed after registration.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Merchant {
    pub id: Uuid,
    pub email: String,
    pub slug: String,
    pub store_name: String,
    pub store_url: String,
    pub product_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub currency: String,
    pub url: String,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

pub fn merchant_from_entity(model: MerchantModel) -> Merchant {
    Merchant {
        id: model.id,
        email: model.email,
        slug: model.slug,
        store_name: model.store_name,
        store_url: model.store_url,
        product_count: model.product_count,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        currency: model.currency,
        url: model.url,
        image_url: model.image_url,
        sku: model.sku,
        category: model.category,
        brand: model.brand,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
