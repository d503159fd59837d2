//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use diesel::prelude::*;

use crate::domain::{Order, OrderId, User, UserId};

use super::schema::{orders, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl UserRow {
    /// Assemble the aggregate from this row and its already-loaded orders.
    pub(crate) fn into_user(self, orders: Vec<OrderRow>) -> User {
        User::from_parts(
            UserId::new(self.id),
            self.name,
            self.email,
            orders.into_iter().map(Order::from).collect(),
        )
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// Changeset struct for updating existing user records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            name: user.name(),
            email: user.email(),
        }
    }
}

impl<'a> From<&'a User> for UserUpdate<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            name: user.name(),
            email: user.email(),
        }
    }
}

// ---------------------------------------------------------------------------
// Order models
// ---------------------------------------------------------------------------

/// Row struct for reading from the orders table.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = orders)]
#[diesel(belongs_to(UserRow, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: i64,
    pub product: String,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub user_id: i64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order::from_parts(
            OrderId::new(row.id),
            row.product,
            row.amount,
            row.status,
            UserId::new(row.user_id),
        )
    }
}

/// Insertable struct for creating new order records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub product: &'a str,
    pub amount: Option<f64>,
    pub status: Option<&'a str>,
    pub user_id: i64,
}

/// Changeset struct for updating existing order records.
///
/// `None` clears the column rather than skipping it, so a saved order always
/// mirrors the in-memory entity.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrderUpdate<'a> {
    pub product: &'a str,
    pub amount: Option<f64>,
    pub status: Option<&'a str>,
    pub user_id: i64,
}

impl<'a> NewOrderRow<'a> {
    pub(crate) fn for_owner(order: &'a Order, user_id: i64) -> Self {
        Self {
            product: order.product(),
            amount: order.amount(),
            status: order.status(),
            user_id,
        }
    }
}

impl<'a> OrderUpdate<'a> {
    pub(crate) fn for_owner(order: &'a Order, user_id: i64) -> Self {
        Self {
            product: order.product(),
            amount: order.amount(),
            status: order.status(),
            user_id,
        }
    }
}
