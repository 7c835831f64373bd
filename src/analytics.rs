use axum::http::HeaderMap;
use uuid::Uuid;

use crate::{background::spawn_detached, db::DbPool, error::AppResult};

const MAX_AGENT_LEN: usize = 256;

/// One product-feed read by an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentQuery {
    pub merchant_slug: String,
    pub query: Option<String>,
    pub category: Option<String>,
    pub page: u64,
    pub agent: Option<String>,
}

pub async fn record_agent_query(pool: &DbPool, entry: &AgentQuery) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO agent_queries (id, merchant_slug, query, category, page, agent)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(&entry.merchant_slug)
    .bind(&entry.query)
    .bind(&entry.category)
    .bind(i64::try_from(entry.page).unwrap_or(i64::MAX))
    .bind(&entry.agent)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record in the background; the read path never waits on this.
pub fn dispatch(pool: &DbPool, entry: AgentQuery) {
    let pool = pool.clone();
    spawn_detached("analytics", async move {
        record_agent_query(&pool, &entry).await
    });
}

/// Caller's declared identity: `UCP-Agent`, falling back to `User-Agent`.
pub fn agent_identity(headers: &HeaderMap) -> Option<String> {
    ["ucp-agent", "user-agent"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(|value| value.chars().take(MAX_AGENT_LEN).collect())
}
