//! Transaction support
//!
//! A [`Tx`] is bound to one alias and owns its connection until it is committed or
//! rolled back. Every [`TableStore`](crate::TableStore) operation accepts
//! `Option<&mut Tx>` so several operations can share one unit of work.
//!
//! # Example
//! ```ignore
//! let mut tx = transaction::begin(&registry, "default").await?;
//!
//! let result = async {
//!     wallets.update(&debit, &from, None, Some(&mut tx)).await?;
//!     wallets.update(&credit, &to, None, Some(&mut tx)).await?;
//!     Ok(())
//! }
//! .await;
//!
//! transaction::finish(tx, result).await?;
//! ```

use crate::errors::StoreResult;
use crate::registry::ConnectionRegistry;
use sqlx::MySql;
use tracing::warn;

/// Active transaction. Dropping it without commit rolls it back.
pub type Tx<'c> = sqlx::Transaction<'c, MySql>;

/// Start a transaction on `alias`
pub async fn begin(registry: &ConnectionRegistry, alias: &str) -> StoreResult<Tx<'static>> {
    let handle = registry.resolve(alias)?;
    let tx = handle.pool().begin().await?;
    crate::debug_log!(alias = %alias, "Transaction started");
    Ok(tx)
}

/// Commit `tx`; `None` is a no-op
pub async fn commit(tx: Option<Tx<'_>>) -> StoreResult<()> {
    if let Some(tx) = tx {
        tx.commit().await?;
        crate::debug_log!("Transaction committed");
    }
    Ok(())
}

/// Roll back `tx`; `None` is a no-op
pub async fn rollback(tx: Option<Tx<'_>>) -> StoreResult<()> {
    if let Some(tx) = tx {
        tx.rollback().await?;
        crate::debug_log!("Transaction rolled back");
    }
    Ok(())
}

/// Commit on `Ok`, roll back on `Err`, and hand back the result.
///
/// A failed rollback is logged; the original error is returned.
pub async fn finish<T>(tx: Tx<'_>, result: StoreResult<T>) -> StoreResult<T> {
    match result {
        Ok(value) => {
            commit(Some(tx)).await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = rollback(Some(tx)).await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
