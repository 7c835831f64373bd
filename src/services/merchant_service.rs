use sea_orm::SqlErr;

use crate::{
    dto::merchants::{
        MerchantAccount, MerchantDeleted, MerchantEndpoints, RegisterMerchantRequest,
        RegisterMerchantResponse,
    },
    entity::merchants::Model as MerchantModel,
    error::{AppError, AppResult},
    middleware::base_url::BaseUrl,
    models::merchant_from_entity,
    response::{ApiResponse, Meta},
    state::AppState,
    store::{MerchantStore, NewMerchant},
    token::{generate_api_key, random_token},
};

/// First path segments the router owns; a merchant slug must not reuse them.
const RESERVED_SLUGS: [&str; 7] = [
    "api",
    "checkout-sessions",
    "docs",
    "health",
    "merchants",
    "products",
    "well-known",
];

const MAX_SLUG_LEN: usize = 60;

/// URL-safe slug: lower-case ASCII alphanumerics separated by single dashes.
pub fn slugify(store_name: &str) -> String {
    let mut slug = String::with_capacity(store_name.len());
    let mut pending_dash = false;
    for ch in store_name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "store".to_string()
    } else {
        slug
    }
}

fn is_reserved(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

async fn unique_slug(state: &AppState, base: &str) -> AppResult<String> {
    let store = MerchantStore::new(&state.orm);
    for n in 1..=50 {
        let candidate = if n == 1 {
            base.to_string()
        } else {
            format!("{base}-{n}")
        };
        if is_reserved(&candidate) {
            continue;
        }
        if !store.slug_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Ok(random_token(&format!("{base}-"), 3))
}

fn validate_registration(payload: RegisterMerchantRequest) -> AppResult<RegisterMerchantRequest> {
    let email = payload.email.trim().to_lowercase();
    let store_name = payload.store_name.trim().to_string();
    let store_url = payload.store_url.trim().to_string();

    let well_formed_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed_email {
        return Err(AppError::BadRequest("A valid email is required".into()));
    }
    if store_name.is_empty() {
        return Err(AppError::BadRequest("store_name is required".into()));
    }
    let parsed = url::Url::parse(&store_url)
        .map_err(|_| AppError::BadRequest("store_url must be an absolute URL".into()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::BadRequest(
            "store_url must use http or https".into(),
        ));
    }

    Ok(RegisterMerchantRequest {
        email,
        store_name,
        store_url,
    })
}

pub fn endpoints_for(base: &BaseUrl, slug: &str) -> MerchantEndpoints {
    MerchantEndpoints {
        profile: base.join(&format!("/.well-known/ucp/{slug}")),
        products: base.join(&format!("/{slug}/products")),
        upload_csv: base.join("/products/upload"),
        upload_json: base.join("/products/json"),
        mine: base.join("/products/mine"),
    }
}

pub async fn register_merchant(
    state: &AppState,
    base: &BaseUrl,
    payload: RegisterMerchantRequest,
) -> AppResult<ApiResponse<RegisterMerchantResponse>> {
    let RegisterMerchantRequest {
        email,
        store_name,
        store_url,
    } = validate_registration(payload)?;

    let store = MerchantStore::new(&state.orm);
    if store.email_exists(&email).await? {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let base_slug = slugify(&store_name);
    let api_key = generate_api_key();
    let mut slug = unique_slug(state, &base_slug).await?;

    // The existence checks above can lose a race; the unique indexes decide.
    let mut merchant = None;
    for _ in 0..2 {
        let attempt = store
            .insert(NewMerchant {
                email: email.clone(),
                slug: slug.clone(),
                api_key: api_key.clone(),
                store_name: store_name.clone(),
                store_url: store_url.clone(),
            })
            .await;
        match attempt {
            Ok(model) => {
                merchant = Some(model);
                break;
            }
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("slug") => {
                    slug = random_token(&format!("{base_slug}-"), 3);
                }
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    return Err(AppError::Conflict("Email is already registered".into()));
                }
                _ => return Err(err.into()),
            },
        }
    }
    let merchant = merchant
        .ok_or_else(|| AppError::Conflict("Could not allocate a unique slug".into()))?;

    tracing::info!(merchant_id = %merchant.id, slug = %merchant.slug, "merchant registered");

    let endpoints = endpoints_for(base, &merchant.slug);
    Ok(ApiResponse::success(
        "Merchant registered",
        RegisterMerchantResponse {
            merchant: merchant_from_entity(merchant),
            api_key,
            endpoints,
        },
        None,
    ))
}

pub fn account(merchant: MerchantModel, base: &BaseUrl) -> ApiResponse<MerchantAccount> {
    let endpoints = endpoints_for(base, &merchant.slug);
    ApiResponse::success(
        "Merchant",
        MerchantAccount {
            merchant: merchant_from_entity(merchant),
            endpoints,
        },
        None,
    )
}

/// Erase the merchant and, through the cascade, all of its products.
pub async fn delete_merchant(
    state: &AppState,
    merchant: MerchantModel,
) -> AppResult<ApiResponse<MerchantDeleted>> {
    let rows = MerchantStore::new(&state.orm).delete(merchant.id).await?;
    if rows == 0 {
        return Err(AppError::NotFound("Merchant not found".into()));
    }
    tracing::info!(merchant_id = %merchant.id, slug = %merchant.slug, "merchant deleted");
    Ok(ApiResponse::success(
        "Merchant deleted",
        MerchantDeleted {
            slug: merchant.slug,
            deleted: true,
        },
        Some(Meta::empty()),
    ))
}
