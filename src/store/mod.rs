//! Data access for the three catalog tables.
//!
//! Product rows are only reachable through [`TenantCatalog`], which is bound to
//! one merchant id at construction; there is no unscoped product accessor.

pub mod catalog;
pub mod merchants;
pub mod sessions;

pub use catalog::{ProductFilter, TenantCatalog};
pub use merchants::{MerchantStore, NewMerchant};
pub use sessions::SessionStore;

/// Escape `%`, `_` and `\` so user text matches literally inside `ILIKE`.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
