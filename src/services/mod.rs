pub mod admin_service;
pub mod advertisement_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod invoice_service;
pub mod order_service;
pub mod wishlist_service;

use crate::error::AppResult;

/// List reads degrade to an empty list; the failure is only logged.
pub(crate) fn or_empty<T>(result: AppResult<Vec<T>>, what: &'static str) -> Vec<T> {
    result.unwrap_or_else(|err| {
        tracing::error!(error = ?err, what, "read failed, returning empty list");
        Vec::new()
    })
}

/// Badge counts degrade to zero; they never drive a business decision.
pub(crate) fn or_zero(result: AppResult<i64>, what: &'static str) -> i64 {
    result.unwrap_or_else(|err| {
        tracing::error!(error = ?err, what, "count failed, returning 0");
        0
    })
}
