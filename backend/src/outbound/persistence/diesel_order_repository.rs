//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OrderPersistenceError, OrderRepository};
use crate::domain::{Order, OrderId};

use super::diesel_error_mapping::{
    is_foreign_key_violation, map_diesel_error as map_basic_diesel_error,
    map_pool_error as map_basic_pool_error,
};
use super::models::{NewOrderRow, OrderRow, OrderUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::orders;

/// Diesel-backed implementation of the `OrderRepository` port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderPersistenceError {
    map_basic_pool_error(error, OrderPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderPersistenceError {
    map_basic_diesel_error(
        error,
        OrderPersistenceError::query,
        OrderPersistenceError::connection,
    )
}

/// Map write failures, reporting a dangling owner reference explicitly.
fn map_write_error(error: diesel::result::Error, user_id: i64) -> OrderPersistenceError {
    if is_foreign_key_violation(&error) {
        OrderPersistenceError::owner_missing(user_id)
    } else {
        map_diesel_error(error)
    }
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn find_all(&self) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderRow> = orders::table
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrderRow> = orders::table
            .find(id.get())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Order::from))
    }

    async fn exists_by_id(&self, id: OrderId) -> Result<bool, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(orders::table.find(id.get())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn save(&self, order: &Order) -> Result<Order, OrderPersistenceError> {
        let user_id = order
            .user_id()
            .map(|id| id.get())
            .ok_or_else(|| OrderPersistenceError::owner_missing(0_i64))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OrderRow> = match order.id() {
            None => diesel::insert_into(orders::table)
                .values(NewOrderRow::for_owner(order, user_id))
                .returning(OrderRow::as_returning())
                .get_result::<OrderRow>(&mut conn)
                .await
                .map(Some),
            Some(id) => diesel::update(orders::table.find(id.get()))
                .set(OrderUpdate::for_owner(order, user_id))
                .returning(OrderRow::as_returning())
                .get_result::<OrderRow>(&mut conn)
                .await
                .optional(),
        }
        .map_err(|error| map_write_error(error, user_id))?;

        match (row, order.id()) {
            (Some(row), _) => Ok(Order::from(row)),
            (None, Some(id)) => Err(OrderPersistenceError::missing(id.get())),
            (None, None) => Err(OrderPersistenceError::query("insert returned no row")),
        }
    }

    async fn delete_by_id(&self, id: OrderId) -> Result<(), OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(orders::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
