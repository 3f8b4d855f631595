//! Transaction helper shared by the repositories.

use giralibros_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;

type TxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
///
/// A rollback failure is logged and swallowed; the caller gets the original
/// error, not the rollback's.
pub async fn with_transaction<T, F>(pool: &PgPool, f: F) -> Result<T, AppError>
where
    F: for<'a> FnOnce(&'a mut Transaction<'_, Postgres>) -> TxFuture<'a, T>,
{
    let mut tx = pool.begin().await?;

    match f(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::error!(error = %rollback, original_error = %err, "Rollback failed");
            }
            Err(err)
        }
    }
}
