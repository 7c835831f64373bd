use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    checkout::{BuyerInfo, CheckoutStatus, Item, ItemInput, LineItemInput, Message, SessionPatch, Severity},
    dto::{
        checkout::{CheckoutSessionView, CreateSessionRequest, LineItemView, Totals},
        merchants::{
            MerchantAccount, MerchantDeleted, MerchantEndpoints, RegisterMerchantRequest,
            RegisterMerchantResponse,
        },
        products::{IngestReport, ProductList, PurgeReport},
        ucp::{
            CatalogInfo, Capability, CheckoutInfo, FeedItem, FeedPagination, MerchantDirectory,
            MerchantIdentity, MerchantListing, MerchantProfile, Offer, PlatformInfo,
            PlatformProfile, ProductFeed, Seller, UcpHeader,
        },
    },
    ingest::{RowError, UploadFormat},
    models::{Merchant, Product},
    response::{ApiResponse, Meta},
    routes::{checkout, health, merchants, params, products, ucp},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        ucp::platform_profile,
        ucp::merchant_profile,
        ucp::list_merchants,
        ucp::product_feed,
        merchants::register,
        merchants::me,
        merchants::delete_me,
        products::upload_csv,
        products::upload_json,
        products::list_mine,
        products::purge_mine,
        checkout::create_session,
        checkout::get_session,
        checkout::update_session,
        checkout::complete_session
    ),
    components(
        schemas(
            Merchant,
            Product,
            Meta,
            RowError,
            UploadFormat,
            RegisterMerchantRequest,
            RegisterMerchantResponse,
            MerchantEndpoints,
            MerchantAccount,
            MerchantDeleted,
            IngestReport,
            PurgeReport,
            ProductList,
            Capability,
            UcpHeader,
            PlatformInfo,
            PlatformProfile,
            MerchantIdentity,
            CatalogInfo,
            CheckoutInfo,
            MerchantProfile,
            MerchantListing,
            MerchantDirectory,
            Seller,
            Offer,
            FeedItem,
            FeedPagination,
            ProductFeed,
            CheckoutStatus,
            Severity,
            Message,
            Item,
            ItemInput,
            LineItemInput,
            BuyerInfo,
            SessionPatch,
            CreateSessionRequest,
            LineItemView,
            Totals,
            CheckoutSessionView,
            params::Pagination,
            params::FeedQuery,
            health::HealthData,
            ApiResponse<RegisterMerchantResponse>,
            ApiResponse<MerchantAccount>,
            ApiResponse<IngestReport>,
            ApiResponse<ProductList>,
            ApiResponse<PurgeReport>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Discovery", description = "UCP profiles and product feeds for agents"),
        (name = "Merchants", description = "Merchant registration and account"),
        (name = "Products", description = "Catalog ingestion, API key required"),
        (name = "Checkout", description = "Checkout session negotiation"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
