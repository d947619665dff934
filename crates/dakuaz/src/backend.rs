//! Deadline handling for store calls.

use std::future::Future;
use std::time::Duration;

use dakuaz_store::StoreError;

use crate::error::{AuthorityError, Result};

/// Default per-call deadline for store operations.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run one store call under `limit`.
///
/// Both an elapsed deadline and a backend error surface as
/// [`AuthorityError::StoreUnavailable`], never as an absent record.
pub(crate) async fn bounded<T, F>(limit: Duration, op: &'static str, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, StoreError>>,
{
    let err = match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(e)) => AuthorityError::from(e),
        Err(_) => AuthorityError::StoreUnavailable(format!(
            "{} timed out after {:?}",
            op, limit
        )),
    };

    tracing::warn!(category = err.category(), op, error = %err, "store call failed");
    Err(err)
}
