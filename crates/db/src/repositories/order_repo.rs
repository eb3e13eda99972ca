//! Order key aggregates shared by the templates and template categories
//! tables.

use sqlx::{PgConnection, PgExecutor};
use showcase_core::ordering::{self, OrderedCollection};
use showcase_core::types::DbId;

/// Min/max/count of `sort_order` over a collection.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct OrderBounds {
    pub min_order: Option<f64>,
    pub max_order: Option<f64>,
    pub row_count: i64,
}

/// Reads and rewrites `sort_order` keys.
///
/// Table names come from [`OrderedCollection::table`], never from input.
pub struct OrderRepo;

impl OrderRepo {
    /// Current key range of `collection`.
    pub async fn bounds<'e, E: PgExecutor<'e>>(
        executor: E,
        collection: OrderedCollection,
    ) -> Result<OrderBounds, sqlx::Error> {
        let table = collection.table();
        let sql = format!(
            "SELECT MIN(sort_order) AS min_order, MAX(sort_order) AS max_order, \
             COUNT(*) AS row_count FROM {table}"
        );
        sqlx::query_as::<_, OrderBounds>(&sql).fetch_one(executor).await
    }

    /// Key for a row appended to `collection`: `max + 1`, or `1` when empty.
    pub async fn next_append_order<'e, E: PgExecutor<'e>>(
        executor: E,
        collection: OrderedCollection,
    ) -> Result<f64, sqlx::Error> {
        let table = collection.table();
        let sql = format!("SELECT MAX(sort_order) FROM {table}");
        let (max,): (Option<f64>,) = sqlx::query_as(&sql).fetch_one(executor).await?;
        Ok(ordering::append_order(max))
    }

    /// Smallest key in `collection`, or `None` when it is empty.
    pub async fn min_order<'e, E: PgExecutor<'e>>(
        executor: E,
        collection: OrderedCollection,
    ) -> Result<Option<f64>, sqlx::Error> {
        let table = collection.table();
        let sql = format!("SELECT MIN(sort_order) FROM {table}");
        let (min,): (Option<f64>,) = sqlx::query_as(&sql).fetch_one(executor).await?;
        Ok(min)
    }

    /// Write a new key for one row. Returns `true` if the row exists.
    pub async fn set_sort_order<'e, E: PgExecutor<'e>>(
        executor: E,
        collection: OrderedCollection,
        id: DbId,
        sort_order: f64,
    ) -> Result<bool, sqlx::Error> {
        let table = collection.table();
        let sql = format!("UPDATE {table} SET sort_order = $2 WHERE id = $1");
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(sort_order)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rewrite every key in `collection` to `1, 2, 3, ...` in listing order.
    ///
    /// Locks the rows first so concurrent pins wait for the rewrite. Must be
    /// called inside a transaction. Returns the number of rows renumbered.
    pub async fn renumber(
        conn: &mut PgConnection,
        collection: OrderedCollection,
    ) -> Result<u64, sqlx::Error> {
        let table = collection.table();

        let select = format!("SELECT id FROM {table} ORDER BY sort_order ASC, id ASC FOR UPDATE");
        let ids: Vec<DbId> = sqlx::query_scalar(&select).fetch_all(&mut *conn).await?;
        if ids.is_empty() {
            return Ok(0);
        }

        let keys: Vec<f64> = ordering::renumbered_keys(ids.len()).collect();
        let update = format!(
            "UPDATE {table} AS t SET sort_order = v.sort_order \
             FROM UNNEST($1::BIGINT[], $2::DOUBLE PRECISION[]) AS v(id, sort_order) \
             WHERE t.id = v.id"
        );
        let result = sqlx::query(&update)
            .bind(&ids)
            .bind(&keys)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
