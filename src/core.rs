//! Core relstore functionality
//!
//! This module contains the `RelStore` bootstrap facade: it owns the connection
//! registry built from configuration and hands out table stores bound to it.

use std::sync::Arc;

use config::AppConfig;
use table_store::{transaction, ConnectionRegistry, TableStore, Tx};
use tracing::info;

use crate::errors::RelStoreError;

/// Main relstore coordinator that owns the connection registry
#[derive(Debug, Clone)]
pub struct RelStore {
    registry: Arc<ConnectionRegistry>,
}

impl RelStore {
    /// Validate `config` and register every configured alias.
    ///
    /// A disabled database block yields a facade whose stores fail with
    /// `NotInitialized`.
    pub async fn new(config: &AppConfig) -> Result<Self, RelStoreError> {
        config.validate()?;

        let registry = ConnectionRegistry::new();
        registry.initialize(&config.db).await?;

        info!(aliases = ?registry.aliases(), "relstore ready");
        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    /// Wrap a registry that was built elsewhere
    pub fn from_registry(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Table store for `table` on `alias`
    pub fn store<T>(&self, alias: &str, table: &str) -> Result<TableStore<T>, RelStoreError> {
        crate::debug_log!(alias = %alias, table = %table, "Creating table store");
        Ok(TableStore::new(Arc::clone(&self.registry), alias, table)?)
    }

    /// Start a transaction on `alias`
    pub async fn begin(&self, alias: &str) -> Result<Tx<'static>, RelStoreError> {
        Ok(transaction::begin(&self.registry, alias).await?)
    }

    pub async fn commit(&self, tx: Tx<'static>) -> Result<(), RelStoreError> {
        Ok(transaction::commit(Some(tx)).await?)
    }

    pub async fn rollback(&self, tx: Tx<'static>) -> Result<(), RelStoreError> {
        Ok(transaction::rollback(Some(tx)).await?)
    }

    /// Ping every registered alias
    pub async fn health_check(&self) -> Result<(), RelStoreError> {
        for alias in self.registry.aliases() {
            self.registry.resolve(&alias)?.ping().await?;
        }
        Ok(())
    }

    /// Close every pool
    pub async fn close(&self) {
        self.registry.close().await;
    }
}
