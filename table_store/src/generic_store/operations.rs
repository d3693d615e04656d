//! Table operations
//!
//! Every operation composes one statement (two for the `*_and_total` variants),
//! runs it on the caller's transaction or a pooled connection, and returns typed
//! results. Record-not-found is treated as an empty result.

use super::core::{bind_query, bind_query_as, bind_query_scalar, Conn, TableStore};
use crate::classify::normalize;
use crate::errors::{StoreError, StoreResult};
use crate::query_builder::{Filters, GroupBy, Join, Page, QuerySpec, SqlGenerator, Statement};
use crate::transaction::Tx;
use serde::Serialize;
use sqlx::mysql::MySqlRow;
use sqlx::FromRow;
use type_mapping::{serialize_to_columns, Values};

fn spec_for(filters: &Filters, order: &[&str]) -> QuerySpec {
    QuerySpec::new().filters(filters.clone()).order_by_all(order)
}

impl<T> TableStore<T> {
    /// Insert `record` and return the generated id (0 when the table has none)
    pub async fn create(&self, record: &T, tx: Option<&mut Tx<'_>>) -> StoreResult<u64>
    where
        T: Serialize,
    {
        let row = serialize_to_columns(record)?;
        let stmt = SqlGenerator::insert(&self.table, &row)?;
        let mut conn = self.acquire(tx).await?;

        self.log_statement("create", &stmt);
        let result = bind_query(sqlx::query(&stmt.sql), stmt.params)
            .execute(&mut *conn)
            .await?;

        Ok(result.last_insert_id())
    }

    /// Delete every row matching `filters` and return the number removed.
    ///
    /// Empty filters delete the whole table.
    pub async fn delete(&self, filters: &Filters, tx: Option<&mut Tx<'_>>) -> StoreResult<u64> {
        let spec = QuerySpec::new().filters(filters.clone());
        let stmt = SqlGenerator::delete(&self.table, &spec)?;
        self.execute("delete", stmt, tx).await
    }

    /// Set `data` on rows matching `filters`, at most `limit` rows when given.
    ///
    /// Both `data` and `filters` must be non-empty; nothing is written otherwise.
    pub async fn update(
        &self,
        data: &Values,
        filters: &Filters,
        limit: Option<u64>,
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<u64> {
        if filters.is_empty() {
            return Err(StoreError::invalid_argument("update requires filters"));
        }
        if data.is_empty() {
            return Err(StoreError::invalid_argument("update requires data"));
        }

        let spec = QuerySpec::new().filters(filters.clone());
        let stmt = SqlGenerator::update(&self.table, data, &spec, limit)?;
        self.execute("update", stmt, tx).await
    }

    /// `IFNULL(SUM(field), 0)` over matching rows
    pub async fn sum(
        &self,
        field: &str,
        filters: &Filters,
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<f64> {
        let spec = QuerySpec::new().filters(filters.clone());
        let stmt = SqlGenerator::sum(&self.table, field, &spec)?;
        let mut conn = self.acquire(tx).await?;
        self.fetch_scalar(&mut conn, "sum", stmt).await
    }

    /// Number of matching rows
    pub async fn count(&self, filters: &Filters, tx: Option<&mut Tx<'_>>) -> StoreResult<i64> {
        self.count_where(&QuerySpec::new().filters(filters.clone()), tx)
            .await
    }

    /// Number of distinct value tuples over `columns` among matching rows
    pub async fn distinct_count(
        &self,
        filters: &Filters,
        columns: &[&str],
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<i64> {
        let spec = QuerySpec::new().filters(filters.clone());
        let stmt = SqlGenerator::distinct_count(&self.table, columns, &spec)?;
        let mut conn = self.acquire(tx).await?;
        self.fetch_scalar(&mut conn, "distinct_count", stmt).await
    }

    /// Number of rows produced by joining `join` under `filters`
    pub async fn total_by_join(
        &self,
        filters: &Filters,
        join: impl Into<Join>,
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<i64> {
        let spec = QuerySpec::new().filters(filters.clone()).join(join);
        self.count_where(&spec, tx).await
    }

    /// Count rows for a full query specification. Ordering and paging are ignored.
    pub async fn count_where(&self, spec: &QuerySpec, tx: Option<&mut Tx<'_>>) -> StoreResult<i64> {
        let stmt = SqlGenerator::count(&self.table, spec)?;
        let mut conn = self.acquire(tx).await?;
        self.fetch_scalar(&mut conn, "count", stmt).await
    }

    /// Start a transaction on this store's alias
    pub async fn begin_transaction(&self) -> StoreResult<Tx<'static>> {
        crate::transaction::begin(&self.registry, &self.alias).await
    }

    async fn execute(
        &self,
        operation: &'static str,
        stmt: Statement,
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<u64> {
        let mut conn = self.acquire(tx).await?;

        self.log_statement(operation, &stmt);
        let result = bind_query(sqlx::query(&stmt.sql), stmt.params)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn fetch_scalar<O>(
        &self,
        conn: &mut Conn<'_>,
        operation: &'static str,
        stmt: Statement,
    ) -> StoreResult<O>
    where
        O: Send + Unpin + for<'r> sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
    {
        self.log_statement(operation, &stmt);
        let value = bind_query_scalar(sqlx::query_scalar::<_, O>(&stmt.sql), stmt.params)
            .fetch_one(&mut **conn)
            .await?;
        Ok(value)
    }
}

impl<T> TableStore<T>
where
    T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    /// Run a full query specification
    pub async fn find(&self, spec: &QuerySpec, tx: Option<&mut Tx<'_>>) -> StoreResult<Vec<T>> {
        let mut conn = self.acquire(tx).await?;
        self.fetch_all(&mut conn, "find", spec).await
    }

    /// First row of a query specification, `None` when nothing matches
    pub async fn find_one(&self, spec: &QuerySpec, tx: Option<&mut Tx<'_>>) -> StoreResult<Option<T>> {
        let spec = QuerySpec {
            page: None,
            limit: Some(1),
            ..spec.clone()
        };
        let stmt = SqlGenerator::select(&self.table, &spec)?;
        let mut conn = self.acquire(tx).await?;

        self.log_statement("find_one", &stmt);
        let result = bind_query_as(sqlx::query_as::<_, T>(&stmt.sql), stmt.params)
            .fetch_one(&mut *conn)
            .await
            .map_err(StoreError::from);

        normalize(result)
    }

    /// Load the first matching row (by `order`) into `record`.
    ///
    /// When nothing matches, `record` is left untouched and `Ok(())` is returned.
    pub async fn query_one(
        &self,
        filters: &Filters,
        record: &mut T,
        order: &[&str],
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<()> {
        if let Some(found) = self.find_one(&spec_for(filters, order), tx).await? {
            *record = found;
        }
        Ok(())
    }

    /// One page of matching rows
    pub async fn list(
        &self,
        filters: &Filters,
        page: Page,
        records: &mut Vec<T>,
        order: &[&str],
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<()> {
        let spec = spec_for(filters, order).page(page);
        *records = self.find(&spec, tx).await?;
        Ok(())
    }

    /// Every matching row
    pub async fn list_no_page(
        &self,
        filters: &Filters,
        records: &mut Vec<T>,
        order: &[&str],
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<()> {
        *records = self.find(&spec_for(filters, order), tx).await?;
        Ok(())
    }

    /// One page of matching rows plus the total number of matching rows
    pub async fn list_and_total(
        &self,
        filters: &Filters,
        page: Page,
        records: &mut Vec<T>,
        order: &[&str],
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<i64> {
        let spec = spec_for(filters, order).page(page);
        self.page_and_total(&spec, records, tx).await
    }

    /// One page of joined rows projected onto `fields`
    #[allow(clippy::too_many_arguments)]
    pub async fn list_with_join(
        &self,
        filters: &Filters,
        fields: &[&str],
        join: impl Into<Join>,
        page: Page,
        records: &mut Vec<T>,
        order: &[&str],
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<()> {
        let spec = spec_for(filters, order)
            .fields(fields)
            .join(join)
            .page(page);
        *records = self.find(&spec, tx).await?;
        Ok(())
    }

    /// [`list_with_join`](Self::list_with_join) plus the total over the same join and filters
    #[allow(clippy::too_many_arguments)]
    pub async fn list_and_total_by_join(
        &self,
        filters: &Filters,
        fields: &[&str],
        join: impl Into<Join>,
        page: Page,
        records: &mut Vec<T>,
        order: &[&str],
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<i64> {
        let spec = spec_for(filters, order)
            .fields(fields)
            .join(join)
            .page(page);
        self.page_and_total(&spec, records, tx).await
    }

    /// One page of distinct projections
    pub async fn distinct(
        &self,
        filters: &Filters,
        fields: &[&str],
        records: &mut Vec<T>,
        page: Page,
        order: &[&str],
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<()> {
        let spec = spec_for(filters, order)
            .fields(fields)
            .distinct()
            .page(page);
        *records = self.find(&spec, tx).await?;
        Ok(())
    }

    /// Aggregated rows: `fields` grouped by `group_by`
    pub async fn list_and_group_by(
        &self,
        filters: &Filters,
        records: &mut Vec<T>,
        fields: &[&str],
        group_by: impl Into<GroupBy>,
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<()> {
        let spec = QuerySpec::new()
            .filters(filters.clone())
            .fields(fields)
            .group_by(group_by);
        *records = self.find(&spec, tx).await?;
        Ok(())
    }

    /// Count first, then fetch the page, both on one connection
    async fn page_and_total(
        &self,
        spec: &QuerySpec,
        records: &mut Vec<T>,
        tx: Option<&mut Tx<'_>>,
    ) -> StoreResult<i64> {
        let count_stmt = SqlGenerator::count(&self.table, &spec.for_count())?;
        let mut conn = self.acquire(tx).await?;

        let total: i64 = self.fetch_scalar(&mut conn, "count", count_stmt).await?;
        *records = self.fetch_all(&mut conn, "list", spec).await?;
        Ok(total)
    }

    async fn fetch_all(
        &self,
        conn: &mut Conn<'_>,
        operation: &'static str,
        spec: &QuerySpec,
    ) -> StoreResult<Vec<T>> {
        let stmt = SqlGenerator::select(&self.table, spec)?;

        self.log_statement(operation, &stmt);
        let rows = bind_query_as(sqlx::query_as::<_, T>(&stmt.sql), stmt.params)
            .fetch_all(&mut **conn)
            .await?;
        Ok(rows)
    }
}
