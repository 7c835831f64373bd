use axum::http::HeaderMap;

use crate::{
    analytics::{self, AgentQuery},
    dto::ucp::{
        CHECKOUT_DISCLAIMER, CatalogInfo, CheckoutInfo, FeedItem, FeedPagination, IN_STOCK,
        MerchantDirectory, MerchantIdentity, MerchantListing, MerchantProfile, Offer,
        PlatformInfo, PlatformProfile, ProductFeed, Seller, UcpHeader,
    },
    entity::{merchants::Model as MerchantModel, products::Model as ProductModel},
    error::{AppError, AppResult},
    middleware::base_url::BaseUrl,
    response::total_pages,
    routes::params::FeedQuery,
    state::AppState,
    store::{MerchantStore, ProductFilter, TenantCatalog},
};

pub const PLATFORM_NAME: &str = "UCP Catalog Hub";

pub fn platform_profile(base: &BaseUrl) -> PlatformProfile {
    PlatformProfile {
        ucp: UcpHeader::current(),
        platform: PlatformInfo {
            name: PLATFORM_NAME.to_string(),
            rest_endpoint: base.0.clone(),
            merchants_url: base.join("/merchants"),
        },
    }
}

async fn active_merchant(state: &AppState, slug: &str) -> AppResult<MerchantModel> {
    MerchantStore::new(&state.orm)
        .find_active_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Merchant '{slug}' not found")))
}

fn identity(merchant: &MerchantModel) -> MerchantIdentity {
    MerchantIdentity {
        name: merchant.store_name.clone(),
        slug: merchant.slug.clone(),
        url: merchant.store_url.clone(),
    }
}

pub async fn merchant_profile(
    state: &AppState,
    base: &BaseUrl,
    slug: &str,
) -> AppResult<MerchantProfile> {
    let merchant = active_merchant(state, slug).await?;
    Ok(MerchantProfile {
        ucp: UcpHeader::current(),
        merchant: identity(&merchant),
        catalog: CatalogInfo {
            products_url: base.join(&format!("/{}/products", merchant.slug)),
            product_count: merchant.product_count,
        },
        checkout: CheckoutInfo {
            kind: "redirect".to_string(),
            sessions_url: base.join("/checkout-sessions"),
            disclaimer: CHECKOUT_DISCLAIMER.to_string(),
        },
    })
}

pub async fn list_merchants(state: &AppState, base: &BaseUrl) -> AppResult<MerchantDirectory> {
    let merchants: Vec<MerchantListing> = MerchantStore::new(&state.orm)
        .list_listed()
        .await?
        .into_iter()
        .map(|m| MerchantListing {
            profile_url: base.join(&format!("/.well-known/ucp/{}", m.slug)),
            products_url: base.join(&format!("/{}/products", m.slug)),
            name: m.store_name,
            slug: m.slug,
            url: m.store_url,
            product_count: m.product_count,
        })
        .collect();
    let total = merchants.len();
    Ok(MerchantDirectory { merchants, total })
}

fn feed_item(product: ProductModel, seller: &Seller) -> FeedItem {
    FeedItem {
        id: product.id,
        name: product.name,
        description: product.description,
        image: product.image_url,
        sku: product.sku,
        category: product.category,
        brand: product.brand,
        offers: Offer {
            price: product.price,
            currency: product.currency,
            availability: IN_STOCK.to_string(),
            seller: seller.clone(),
            url: product.url.clone(),
        },
        url: product.url,
    }
}

/// Link to the following page, keeping every filter of the current one.
pub fn next_page_url(base: &BaseUrl, slug: &str, query: &FeedQuery) -> String {
    let (page, limit, _) = query.normalize();
    let mut params = url::form_urlencoded::Serializer::new(String::new());
    params.append_pair("page", &(page + 1).to_string());
    params.append_pair("limit", &limit.to_string());
    if let Some(category) = query.category() {
        params.append_pair("category", &category);
    }
    if let Some(q) = query.search() {
        params.append_pair("q", &q);
    }
    base.join(&format!("/{slug}/products?{}", params.finish()))
}

pub async fn product_feed(
    state: &AppState,
    base: &BaseUrl,
    headers: &HeaderMap,
    slug: &str,
    query: FeedQuery,
) -> AppResult<ProductFeed> {
    let merchant = active_merchant(state, slug).await?;
    let (page, limit, offset) = query.normalize();
    let filter = ProductFilter {
        category: query.category(),
        q: query.search(),
    };

    let (products, total) = TenantCatalog::new(&state.orm, merchant.id)
        .search(&filter, limit, offset)
        .await?;

    let seller = Seller {
        name: merchant.store_name.clone(),
        url: merchant.store_url.clone(),
    };
    let items = products
        .into_iter()
        .map(|p| feed_item(p, &seller))
        .collect();

    let pages = total_pages(total, limit);
    let next = (page < pages).then(|| next_page_url(base, &merchant.slug, &query));

    analytics::dispatch(
        &state.pool,
        AgentQuery {
            merchant_slug: merchant.slug.clone(),
            query: filter.q,
            category: filter.category,
            page,
            agent: analytics::agent_identity(headers),
        },
    );

    Ok(ProductFeed {
        merchant: identity(&merchant),
        items,
        pagination: FeedPagination {
            page,
            limit,
            total,
            total_pages: pages,
            next,
        },
    })
}
