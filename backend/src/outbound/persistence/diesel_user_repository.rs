//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! The user is written as an aggregate. `save` and `delete_by_id` each run in
//! a single transaction so the profile row and its orders never diverge.

use async_trait::async_trait;
use diesel::dsl::{exists, not};
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserId};

use super::diesel_error_mapping::{
    map_diesel_error as map_basic_diesel_error, map_pool_error as map_basic_pool_error,
};
use super::models::{NewOrderRow, NewUserRow, OrderRow, OrderUpdate, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{orders, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Failure inside the save transaction: a Diesel error, or an update that
/// matched no user or owned order row.
#[derive(Debug)]
enum SaveFailure {
    Diesel(diesel::result::Error),
    Missing(i64),
    OrderMissing(i64),
}

impl From<diesel::result::Error> for SaveFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<SaveFailure> for UserPersistenceError {
    fn from(failure: SaveFailure) -> Self {
        match failure {
            SaveFailure::Diesel(error) => map_diesel_error(error),
            SaveFailure::Missing(id) => UserPersistenceError::missing(id),
            SaveFailure::OrderMissing(id) => UserPersistenceError::order_missing(id),
        }
    }
}

/// Load users and their orders, preserving the order of `user_rows`.
async fn attach_orders(
    conn: &mut AsyncPgConnection,
    user_rows: Vec<UserRow>,
) -> Result<Vec<User>, diesel::result::Error> {
    let order_rows: Vec<OrderRow> = OrderRow::belonging_to(&user_rows)
        .select(OrderRow::as_select())
        .order_by(orders::id)
        .load(conn)
        .await?;
    let grouped = order_rows.grouped_by(&user_rows);
    Ok(user_rows
        .into_iter()
        .zip(grouped)
        .map(|(user, orders)| user.into_user(orders))
        .collect())
}

/// Write the profile row, returning its key.
async fn write_user_row(conn: &mut AsyncPgConnection, user: &User) -> Result<i64, SaveFailure> {
    match user.id() {
        None => {
            let id = diesel::insert_into(users::table)
                .values(NewUserRow::from(user))
                .returning(users::id)
                .get_result::<i64>(conn)
                .await?;
            Ok(id)
        }
        Some(id) => {
            let raw = id.get();
            let updated = diesel::update(users::table.find(raw))
                .set(UserUpdate::from(user))
                .execute(conn)
                .await?;
            if updated == 0 {
                return Err(SaveFailure::Missing(raw));
            }
            Ok(raw)
        }
    }
}

/// Upsert every order in the collection and delete the ones left behind.
///
/// Updates only touch rows already owned by `user_id`.
async fn sync_orders(
    conn: &mut AsyncPgConnection,
    user: &User,
    user_id: i64,
) -> Result<(), SaveFailure> {
    let mut kept = Vec::with_capacity(user.orders().len());
    for order in user.orders() {
        match order.id() {
            None => {
                let id = diesel::insert_into(orders::table)
                    .values(NewOrderRow::for_owner(order, user_id))
                    .returning(orders::id)
                    .get_result::<i64>(conn)
                    .await?;
                kept.push(id);
            }
            Some(order_id) => {
                let raw = order_id.get();
                let updated = diesel::update(
                    orders::table
                        .find(raw)
                        .filter(orders::user_id.eq(user_id)),
                )
                .set(OrderUpdate::for_owner(order, user_id))
                .execute(conn)
                .await?;
                if updated == 0 {
                    return Err(SaveFailure::OrderMissing(raw));
                }
                kept.push(raw);
            }
        }
    }

    let removed = diesel::delete(
        orders::table
            .filter(orders::user_id.eq(user_id))
            .filter(not(orders::id.eq_any(&kept))),
    )
    .execute(conn)
    .await?;
    if removed > 0 {
        debug!(user_id, removed, "deleted orphaned orders");
    }
    Ok(())
}

async fn load_user(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> Result<Option<User>, diesel::result::Error> {
    let row: Option<UserRow> = users::table
        .find(id)
        .select(UserRow::as_select())
        .first(conn)
        .await
        .optional()?;
    match row {
        Some(row) => Ok(attach_orders(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Persist the aggregate in one transaction and reload it.
async fn save_aggregate(conn: &mut AsyncPgConnection, user: &User) -> Result<User, SaveFailure> {
    conn.transaction(|conn| {
        async move {
            let user_id = write_user_row(conn, user).await?;
            sync_orders(conn, user, user_id).await?;
            load_user(conn, user_id)
                .await?
                .ok_or(SaveFailure::Missing(user_id))
        }
        .scope_boxed()
    })
    .await
}

/// Delete the orders owned by `user_id`, then the user row itself.
async fn delete_aggregate(
    conn: &mut AsyncPgConnection,
    user_id: i64,
) -> Result<(), diesel::result::Error> {
    conn.transaction(|conn| {
        async move {
            let orders_removed = diesel::delete(orders::table.filter(orders::user_id.eq(user_id)))
                .execute(conn)
                .await?;
            diesel::delete(users::table.find(user_id))
                .execute(conn)
                .await?;
            debug!(user_id, orders_removed, "deleted user");
            Ok::<_, diesel::result::Error>(())
        }
        .scope_boxed()
    })
    .await
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        attach_orders(&mut conn, user_rows)
            .await
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_user(&mut conn, id.get())
            .await
            .map_err(map_diesel_error)
    }

    async fn exists_by_id(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(users::table.find(id.get())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn save(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        save_aggregate(&mut conn, user).await.map_err(Into::into)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        delete_aggregate(&mut conn, id.get())
            .await
            .map_err(map_diesel_error)
    }
}
