//! Order key assignment for templates and template categories.
//!
//! Appends read `MAX(sort_order)` on the same connection as the insert that
//! uses the result. Two concurrent appends can still read the same maximum
//! and insert equal keys; listings break the tie on `id`.

use std::time::Duration;

use sqlx::{PgConnection, PgPool};
use showcase_core::ordering::{self, OrderedCollection};
use showcase_core::types::DbId;
use showcase_db::repositories::OrderRepo;

use crate::error::{bounded, CatalogError, CatalogResult};

/// Computes and writes order keys.
#[derive(Clone)]
pub struct OrderingManager {
    pool: PgPool,
    transaction_timeout: Duration,
}

impl OrderingManager {
    pub fn new(pool: PgPool, transaction_timeout: Duration) -> Self {
        Self {
            pool,
            transaction_timeout,
        }
    }

    /// Key for a row about to be inserted through `conn`.
    pub async fn next_append_order(
        conn: &mut PgConnection,
        collection: OrderedCollection,
    ) -> CatalogResult<f64> {
        let order = OrderRepo::next_append_order(&mut *conn, collection).await?;
        tracing::debug!(collection = collection.table(), order, "Computed append order");
        Ok(order)
    }

    /// Key that sorts before every existing row of `collection`.
    pub async fn top_order(&self, collection: OrderedCollection) -> CatalogResult<f64> {
        let min = OrderRepo::min_order(&self.pool, collection).await?;
        Ok(ordering::top_order(collection, min)?)
    }

    /// Move row `id` before every other row of `collection`, returning its
    /// new key.
    pub async fn pin_to_top(&self, collection: OrderedCollection, id: DbId) -> CatalogResult<f64> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;

            let min = OrderRepo::min_order(&mut *tx, collection).await?;
            let top = ordering::top_order(collection, min)?;
            let found = OrderRepo::set_sort_order(&mut *tx, collection, id, top).await?;
            if !found {
                return Err(CatalogError::not_found(collection.entity(), id));
            }

            tx.commit().await?;
            tracing::info!(collection = collection.table(), id, order = top, "Pinned to top");
            Ok(top)
        })
        .await
    }

    /// Rewrite `collection` to keys `1..=n` in current listing order.
    pub async fn renumber(&self, collection: OrderedCollection) -> CatalogResult<u64> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;
            let renumbered = OrderRepo::renumber(&mut *tx, collection).await?;
            tx.commit().await?;
            tracing::info!(collection = collection.table(), renumbered, "Renumbered order keys");
            Ok(renumbered)
        })
        .await
    }

    /// Renumber only when the key range has drifted past the safe window.
    ///
    /// Returns the number of rows rewritten, or `None` when no renumber was
    /// needed.
    pub async fn renumber_if_drifted(
        &self,
        collection: OrderedCollection,
    ) -> CatalogResult<Option<u64>> {
        let bounds = OrderRepo::bounds(&self.pool, collection).await?;
        if !ordering::needs_renumber(bounds.min_order, bounds.max_order) {
            tracing::debug!(
                collection = collection.table(),
                min = ?bounds.min_order,
                max = ?bounds.max_order,
                "Order keys within range"
            );
            return Ok(None);
        }
        tracing::warn!(
            collection = collection.table(),
            min = ?bounds.min_order,
            max = ?bounds.max_order,
            rows = bounds.row_count,
            "Order keys drifted, renumbering"
        );
        self.renumber(collection).await.map(Some)
    }
}
