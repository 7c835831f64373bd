use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Merchant;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterMerchantRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub store_url: String,
}

/// Links a merchant needs to manage and verify its catalog.
#[derive(Debug, Serialize, ToSchema)]
pub struct MerchantEndpoints {
    pub profile: String,
    pub products: String,
    pub upload_csv: String,
    pub upload_json: String,
    pub mine: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterMerchantResponse {
    pub merchant: Merchant,
    pub api_key: String,
    pub endpoints: MerchantEndpoints,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MerchantAccount {
    pub merchant: Merchant,
    pub endpoints: MerchantEndpoints,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MerchantDeleted {
    pub slug: String,
    pub deleted: bool,
}
