//! Driving port for user-facing queries.
//!
//! Inbound adapters (HTTP handlers) use this port to read users without
//! importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{Error, Order, OrderId, User, UserId};

/// Domain use-case port for reading users and their orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return every user in storage order.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Return one user with its orders.
    ///
    /// Fails with a not-found error reading `User not found` when absent.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;

    /// Look up a single order by identifier.
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, Error>;
}
