use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::{
    entity::merchants::Model as MerchantModel, error::AppError, state::AppState,
    store::MerchantStore,
};

pub const API_KEY_HEADER: &str = "x-api-key";

/// The active merchant owning the presented API key.
#[derive(Debug, Clone)]
pub struct AuthMerchant(pub MerchantModel);

/// `X-API-Key: <key>` or `Authorization: Bearer <key>`.
pub fn api_key_from_headers(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(API_KEY_HEADER) {
        return value.to_str().ok().map(str::trim).filter(|k| !k.is_empty());
    }
    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

impl FromRequestParts<AppState> for AuthMerchant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Unknown, inactive and malformed keys are indistinguishable to the caller.
        let api_key = api_key_from_headers(&parts.headers).ok_or(AppError::Unauthorized)?;
        let merchant = MerchantStore::new(&state.orm)
            .find_active_by_api_key(api_key)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthMerchant(merchant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_either_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(api_key_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer ucp_abc"));
        assert_eq!(api_key_from_headers(&headers), Some("ucp_abc"));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static(" ucp_def "));
        assert_eq!(api_key_from_headers(&headers), Some("ucp_def"));
    }

    #[test]
    fn rejects_other_schemes_and_blank_keys() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(api_key_from_headers(&headers), None);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("   "));
        assert_eq!(api_key_from_headers(&headers), None);
    }
}
