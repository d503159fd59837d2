//! Port abstraction for order persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Order, OrderId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order repository adapters.
    pub enum OrderPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// The order references a user that does not exist.
        OwnerMissing { user_id: i64 } => "order owner {user_id} does not exist",
        /// An update targeted an order row that no longer exists.
        Missing { id: i64 } => "order {id} does not exist",
    }
}

/// Driven port for individual `orders` rows.
///
/// Orders are normally written through their owning user; this port serves
/// direct lookups and maintenance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fetch every order in storage order.
    async fn find_all(&self) -> Result<Vec<Order>, OrderPersistenceError>;

    /// Fetch an order by identifier.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderPersistenceError>;

    /// Report whether an order row exists.
    async fn exists_by_id(&self, id: OrderId) -> Result<bool, OrderPersistenceError>;

    /// Insert the order when it has no id, otherwise update it in place.
    ///
    /// The order must reference an existing user; an unattached order is
    /// rejected with [`OrderPersistenceError::OwnerMissing`] carrying `0`.
    async fn save(&self, order: &Order) -> Result<Order, OrderPersistenceError>;

    /// Delete an order. Deleting an absent id is a no-op.
    async fn delete_by_id(&self, id: OrderId) -> Result<(), OrderPersistenceError>;
}
