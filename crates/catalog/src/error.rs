use std::future::Future;
use std::time::Duration;

use showcase_core::error::CoreError;

use crate::collaborators::DuplicationError;

/// Error type for catalog operations.
///
/// Wraps [`CoreError`] for domain failures and adds the infrastructure
/// failures a caller may want to retry.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A domain-level error from `showcase_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The base duplicator failed; the surrounding transaction was rolled back.
    #[error("Base duplication failed: {0}")]
    Duplication(#[from] DuplicationError),

    /// The transaction did not finish in time and was rolled back.
    #[error("Transaction exceeded its {secs}s timeout")]
    Timeout { secs: u64 },
}

/// Convenience alias for catalog return values.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(entity: &'static str, id: showcase_core::types::DbId) -> Self {
        CatalogError::Core(CoreError::NotFound { entity, id })
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::Core(core) => core.code(),
            CatalogError::Database(sqlx::Error::RowNotFound) => "NOT_FOUND",
            CatalogError::Database(_) => "DATABASE_ERROR",
            CatalogError::Duplication(_) => "DUPLICATION_FAILED",
            CatalogError::Timeout { .. } => "TIMEOUT",
        }
    }

    /// Whether the caller can fix the failure by changing its request.
    pub fn is_precondition(&self) -> bool {
        match self {
            CatalogError::Core(core) => core.is_precondition(),
            CatalogError::Database(err) => is_check_violation(err),
            _ => false,
        }
    }

    /// Whether repeating the same call later may succeed.
    ///
    /// Nothing in the catalog retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Core(_) => false,
            CatalogError::Duplication(_) | CatalogError::Timeout { .. } => true,
            CatalogError::Database(err) => is_transient(err),
        }
    }
}

/// PostgreSQL serialization failure (40001), deadlock (40P01), or a
/// connection-level problem.
fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed => true,
        _ => false,
    }
}

/// PostgreSQL check constraint violation (23514).
fn is_check_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23514"),
        _ => false,
    }
}

/// Run `fut` with an upper bound of `limit`.
///
/// On expiry the future is dropped. Any `sqlx::Transaction` it owned is
/// dropped uncommitted, which rolls it back.
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> CatalogResult<T>
where
    F: Future<Output = CatalogResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(CatalogError::Timeout {
            secs: limit.as_secs(),
        }),
    }
}
