pub mod checkout_service;
pub mod discovery_service;
pub mod ingest_service;
pub mod merchant_service;
