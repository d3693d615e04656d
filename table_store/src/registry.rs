//! Connection registry
//!
//! Maps each configured alias to one live connection pool. The registry is
//! populated once at startup and is read-only afterwards; replacing the pools
//! requires `&mut` access, so no operation can be running against them.

use crate::dsn::Dsn;
use crate::errors::{StoreError, StoreResult};
use config::{ConnectionSettings, DatabaseSettings};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::Connection;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

const DEFAULT_MAX_OPEN: u32 = 10;

/// Pool limits, fixed when a handle is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Connections kept open while idle
    pub max_idle: u32,
    pub max_open: u32,
    /// `None` keeps connections regardless of age
    pub max_lifetime: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub acquire_timeout: Option<Duration>,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_idle: 0,
            max_open: DEFAULT_MAX_OPEN,
            max_lifetime: None,
            idle_timeout: None,
            acquire_timeout: None,
        }
    }
}

impl PoolLimits {
    pub fn from_settings(settings: &ConnectionSettings) -> Self {
        let seconds = |s: u64| (s > 0).then(|| Duration::from_secs(s));

        Self {
            max_idle: settings.max_idle,
            max_open: if settings.max_connections == 0 {
                DEFAULT_MAX_OPEN
            } else {
                settings.max_connections
            },
            max_lifetime: seconds(settings.max_life_time),
            idle_timeout: seconds(settings.idle_timeout),
            acquire_timeout: seconds(settings.acquire_timeout),
        }
    }

    /// Idle connections map onto the pool minimum, clamped to the maximum
    pub fn pool_options(&self) -> MySqlPoolOptions {
        let mut options = MySqlPoolOptions::new()
            .max_connections(self.max_open)
            .min_connections(self.max_idle.min(self.max_open))
            .max_lifetime(self.max_lifetime)
            .idle_timeout(self.idle_timeout);

        if let Some(timeout) = self.acquire_timeout {
            options = options.acquire_timeout(timeout);
        }

        options
    }
}

/// One registered alias and its pool
#[derive(Clone)]
pub struct ConnectionHandle {
    alias: String,
    pool: MySqlPool,
    limits: PoolLimits,
    debug: bool,
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("alias", &self.alias)
            .field("limits", &self.limits)
            .field("debug", &self.debug)
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl ConnectionHandle {
    /// Parse the DSN, open the pool and ping it
    pub async fn connect(
        alias: &str,
        dsn: &str,
        limits: PoolLimits,
        debug: bool,
    ) -> StoreResult<Self> {
        let options = Dsn::parse(dsn)?.to_connect_options(debug);

        let pool = limits
            .pool_options()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::connectivity(alias, e))?;

        let handle = Self::from_pool(alias, pool, limits, debug);
        handle
            .ping()
            .await
            .map_err(|e| match e {
                StoreError::Engine(source) | StoreError::ConstraintViolation(source) => {
                    StoreError::connectivity(alias, source)
                }
                other => other,
            })?;

        info!(
            alias = %alias,
            max_open = limits.max_open,
            max_idle = limits.max_idle,
            "Registered database connection"
        );
        Ok(handle)
    }

    /// Build the pool without connecting; the first query opens a connection
    pub fn connect_lazy(
        alias: &str,
        dsn: &str,
        limits: PoolLimits,
        debug: bool,
    ) -> StoreResult<Self> {
        let options = Dsn::parse(dsn)?.to_connect_options(debug);
        let pool = limits.pool_options().connect_lazy_with(options);

        info!(alias = %alias, "Registered lazy database connection");
        Ok(Self::from_pool(alias, pool, limits, debug))
    }

    /// Wrap an existing pool
    pub fn from_pool(alias: &str, pool: MySqlPool, limits: PoolLimits, debug: bool) -> Self {
        Self {
            alias: alias.to_string(),
            pool,
            limits,
            debug,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn limits(&self) -> PoolLimits {
        self.limits
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }
}

/// Alias to handle mapping
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    handles: OnceCell<HashMap<String, ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Empty, uninitialized registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry over handles that were built elsewhere
    pub fn from_handles(handles: impl IntoIterator<Item = ConnectionHandle>) -> Self {
        let handles = handles
            .into_iter()
            .map(|handle| (handle.alias.clone(), handle))
            .collect();

        Self {
            handles: OnceCell::new_with(Some(handles)),
        }
    }

    /// Register every configured alias.
    ///
    /// A disabled block registers nothing and leaves the registry uninitialized.
    /// Concurrent callers share one initialization; once it has succeeded further
    /// calls return immediately. On failure nothing is registered.
    pub async fn initialize(&self, settings: &DatabaseSettings) -> StoreResult<()> {
        if !settings.enable {
            info!("Database layer disabled, no connections registered");
            return Ok(());
        }

        self.handles
            .get_or_try_init(|| Self::connect_all(settings))
            .await?;
        Ok(())
    }

    /// Close every pool and register again from `settings`
    pub async fn reinitialize(&mut self, settings: &DatabaseSettings) -> StoreResult<()> {
        self.close().await;
        self.handles = OnceCell::new();
        self.initialize(settings).await
    }

    async fn connect_all(
        settings: &DatabaseSettings,
    ) -> StoreResult<HashMap<String, ConnectionHandle>> {
        settings
            .validate()
            .map_err(|e| StoreError::configuration(e.to_string()))?;

        let mut handles = HashMap::new();
        for alias in settings.aliases() {
            if handles.contains_key(&alias) {
                continue;
            }

            let connection = settings.connection(&alias).ok_or_else(|| {
                StoreError::configuration(format!("no connection block for alias '{}'", alias))
            })?;
            let limits = PoolLimits::from_settings(connection);
            let dsn = connection.dsn();

            let handle = if settings.lazy {
                ConnectionHandle::connect_lazy(&alias, &dsn, limits, connection.debug)?
            } else {
                match ConnectionHandle::connect(&alias, &dsn, limits, connection.debug).await {
                    Ok(handle) => handle,
                    Err(e) => {
                        close_all(&handles).await;
                        return Err(e);
                    }
                }
            };

            handles.insert(alias, handle);
        }

        Ok(handles)
    }

    pub fn is_initialized(&self) -> bool {
        self.handles.initialized()
    }

    /// Handle for `alias`
    pub fn resolve(&self, alias: &str) -> StoreResult<&ConnectionHandle> {
        let handles = self.handles.get().ok_or(StoreError::NotInitialized)?;
        handles
            .get(alias)
            .ok_or_else(|| StoreError::UnknownAlias(alias.to_string()))
    }

    /// Registered aliases, sorted
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .handles
            .get()
            .map(|handles| handles.keys().cloned().collect())
            .unwrap_or_default();
        aliases.sort();
        aliases
    }

    /// Close every pool. Outstanding connections are closed as they are returned.
    pub async fn close(&self) {
        if let Some(handles) = self.handles.get() {
            close_all(handles).await;
        }
    }
}

async fn close_all(handles: &HashMap<String, ConnectionHandle>) {
    for handle in handles.values() {
        if handle.pool.is_closed() {
            warn!(alias = %handle.alias, "Pool already closed");
            continue;
        }
        handle.pool.close().await;
        info!(alias = %handle.alias, "Closed database connection");
    }
}
