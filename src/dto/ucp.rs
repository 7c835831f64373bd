use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

pub const UCP_VERSION: &str = "2026-01-11";
pub const CAPABILITY_CATALOG: &str = "dev.ucp.shopping.catalog";
pub const CAPABILITY_CHECKOUT: &str = "dev.ucp.shopping.checkout";
pub const IN_STOCK: &str = "https://schema.org/InStock";

pub const CHECKOUT_DISCLAIMER: &str = "Checkout is a redirect. Purchases are completed on the \
merchant's own store at each product's url; this service never collects or processes payment.";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Capability {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UcpHeader {
    pub version: String,
    pub capabilities: Vec<Capability>,
}

impl UcpHeader {
    pub fn current() -> Self {
        Self {
            version: UCP_VERSION.to_string(),
            capabilities: [CAPABILITY_CATALOG, CAPABILITY_CHECKOUT]
                .into_iter()
                .map(|name| Capability {
                    name: name.to_string(),
                    version: UCP_VERSION.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformInfo {
    pub name: String,
    pub rest_endpoint: String,
    pub merchants_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformProfile {
    pub ucp: UcpHeader,
    pub platform: PlatformInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MerchantIdentity {
    pub name: String,
    pub slug: String,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogInfo {
    pub products_url: String,
    pub product_count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutInfo {
    /// Always `redirect`.
    #[serde(rename = "type")]
    pub kind: String,
    pub sessions_url: String,
    pub disclaimer: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MerchantProfile {
    pub ucp: UcpHeader,
    pub merchant: MerchantIdentity,
    pub catalog: CatalogInfo,
    pub checkout: CheckoutInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MerchantListing {
    pub name: String,
    pub slug: String,
    pub url: String,
    pub product_count: i32,
    pub profile_url: String,
    pub products_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MerchantDirectory {
    pub merchants: Vec<MerchantListing>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Seller {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Offer {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub currency: String,
    pub availability: String,
    pub seller: Seller,
    /// Where the buyer completes the purchase.
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedItem {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub url: String,
    pub offers: Offer,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedPagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductFeed {
    pub merchant: MerchantIdentity,
    pub items: Vec<FeedItem>,
    pub pagination: FeedPagination,
}
