use std::time::Duration;

use serde::Serialize;

use crate::background::spawn_detached;

/// Body posted to `CATALOG_WEBHOOK_URL` after a successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogUpdated {
    pub event: &'static str,
    pub merchant_slug: String,
    pub product_count: i32,
    pub inserted: u64,
    pub deleted: u64,
    pub replace: bool,
}

impl CatalogUpdated {
    pub fn new(merchant_slug: String, product_count: i32, inserted: u64, deleted: u64, replace: bool) -> Self {
        Self {
            event: "catalog.updated",
            merchant_slug,
            product_count,
            inserted,
            deleted,
            replace,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CatalogNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl CatalogNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            client,
            webhook_url,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Fire the webhook without waiting for it.
    pub fn notify(&self, event: CatalogUpdated) {
        let Some(url) = self.webhook_url.clone() else {
            return;
        };
        let client = self.client.clone();
        spawn_detached("catalog_webhook", async move {
            client
                .post(url)
                .json(&event)
                .send()
                .await?
                .error_for_status()?;
            Ok::<(), reqwest::Error>(())
        });
    }
}
