use crate::errors::StoreResult;
use crate::query_builder::Statement;
use crate::registry::ConnectionRegistry;
use crate::transaction::Tx;
use crate::validation::ValidatedTableName;
use sqlx::mysql::{MySqlArguments, MySqlConnection};
use sqlx::pool::PoolConnection;
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::MySql;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use type_mapping::SqlValue;

/// Generic data-access store bound to one alias and one table.
///
/// `T` is the record type: reads decode rows with `sqlx::FromRow`, writes read
/// the record through `serde::Serialize`.
pub struct TableStore<T> {
    pub(crate) registry: Arc<ConnectionRegistry>,
    pub(crate) alias: String,
    pub(crate) table: ValidatedTableName,
    pub(crate) _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for TableStore<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            alias: self.alias.clone(),
            table: self.table.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for TableStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("alias", &self.alias)
            .field("table", &self.table.as_str())
            .field("record", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> TableStore<T> {
    /// Bind a store to `alias` and `table`. The alias is resolved per operation,
    /// so the store can be built before the registry is initialized.
    pub fn new(registry: Arc<ConnectionRegistry>, alias: &str, table: &str) -> StoreResult<Self> {
        Ok(Self {
            registry,
            alias: alias.to_string(),
            table: ValidatedTableName::new(table)?,
            _phantom: PhantomData,
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn table_name(&self) -> &str {
        self.table.as_str()
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Use the caller's transaction, or check a connection out of the alias pool
    pub(crate) async fn acquire<'a>(&self, tx: Option<&'a mut Tx<'_>>) -> StoreResult<Conn<'a>> {
        match tx {
            Some(tx) => Ok(Conn::Tx(&mut **tx)),
            None => {
                let handle = self.registry.resolve(&self.alias)?;
                Ok(Conn::Pooled(handle.pool().acquire().await?))
            }
        }
    }

    pub(crate) fn log_statement(&self, operation: &'static str, stmt: &Statement) {
        tracing::debug!(
            alias = %self.alias,
            table = %self.table,
            operation,
            params = stmt.params.len(),
            "Executing statement"
        );
        crate::trace_log!(sql = %stmt.sql, "Statement text");
    }
}

/// Connection an operation runs on: pooled, or borrowed from a transaction
pub(crate) enum Conn<'a> {
    Pooled(PoolConnection<MySql>),
    Tx(&'a mut MySqlConnection),
}

impl Deref for Conn<'_> {
    type Target = MySqlConnection;

    fn deref(&self) -> &Self::Target {
        match self {
            Conn::Pooled(conn) => &**conn,
            Conn::Tx(conn) => &**conn,
        }
    }
}

impl DerefMut for Conn<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Conn::Pooled(conn) => &mut **conn,
            Conn::Tx(conn) => &mut **conn,
        }
    }
}

// Shared parameter binding logic
macro_rules! bind_sql_value {
    ($query:expr, $value:expr) => {
        match $value {
            SqlValue::Null => $query.bind(Option::<String>::None),
            SqlValue::Bool(b) => $query.bind(b),
            SqlValue::Int(i) => $query.bind(i),
            SqlValue::UInt(u) => $query.bind(u),
            SqlValue::Float(f) => $query.bind(f),
            SqlValue::Text(s) => $query.bind(s),
            SqlValue::Bytes(b) => $query.bind(b),
            SqlValue::Timestamp(ts) => $query.bind(ts),
            SqlValue::Date(d) => $query.bind(d),
            SqlValue::Json(v) => $query.bind(sqlx::types::Json(v)),
            list @ SqlValue::List(_) => $query.bind(sqlx::types::Json(list.to_json())),
        }
    };
}

pub(crate) fn bind_query<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: Vec<SqlValue>,
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = bind_sql_value!(query, param);
    }
    query
}

pub(crate) fn bind_query_as<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    params: Vec<SqlValue>,
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for param in params {
        query = bind_sql_value!(query, param);
    }
    query
}

pub(crate) fn bind_query_scalar<'q, O>(
    mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    params: Vec<SqlValue>,
) -> QueryScalar<'q, MySql, O, MySqlArguments> {
    for param in params {
        query = bind_sql_value!(query, param);
    }
    query
}
