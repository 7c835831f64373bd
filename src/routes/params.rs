use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_FEED_LIMIT: u64 = 100;
pub const MAX_FEED_LIMIT: u64 = 500;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    /// `(page, per_page, offset)`, page at least 1 and per_page within 1..=100.
    pub fn normalize(&self) -> (u64, u64, u64) {
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100) as u64;
        paginate(self.page, per_page)
    }
}

/// Query string of the public product feed.
#[derive(Debug, Default, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring on name or description.
    pub q: Option<String>,
}

impl FeedQuery {
    /// `(page, limit, offset)`, page at least 1 and limit within 1..=500.
    pub fn normalize(&self) -> (u64, u64, u64) {
        let limit = self
            .limit
            .map(|l| l.clamp(1, MAX_FEED_LIMIT as i64) as u64)
            .unwrap_or(DEFAULT_FEED_LIMIT);
        paginate(self.page, limit)
    }

    pub fn category(&self) -> Option<String> {
        non_blank(self.category.as_deref())
    }

    pub fn search(&self) -> Option<String> {
        non_blank(self.q.as_deref())
    }
}

/// Offsets are bound as `BIGINT`, so the page is capped where the offset
/// would pass `i64::MAX`. Such a page is empty either way.
fn paginate(page: Option<i64>, size: u64) -> (u64, u64, u64) {
    let last_page = i64::MAX as u64 / size + 1;
    let page = (page.unwrap_or(1).max(1) as u64).min(last_page);
    (page, size, (page - 1) * size)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
