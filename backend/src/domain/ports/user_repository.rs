//! Port abstraction for user persistence adapters and their errors.
//!
//! A user is persisted as an aggregate: saving it writes the profile row and
//! reconciles the owned orders, and deleting it removes those orders too.
use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// An update targeted a user row that no longer exists.
        Missing { id: i64 } => "user {id} does not exist",
        /// An order in the collection does not exist or belongs to another user.
        OrderMissing { id: i64 } => "order {id} is not owned by the saved user",
    }
}

/// Driven port for the `users` aggregate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch every user with its orders, in storage order.
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user and its orders by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Report whether a user row exists.
    async fn exists_by_id(&self, id: UserId) -> Result<bool, UserPersistenceError>;

    /// Insert the user when it has no id, otherwise update it in place.
    ///
    /// Orders without an id are inserted, orders with an id are updated, and
    /// stored orders no longer present in the collection are deleted. The
    /// returned user carries every generated identifier.
    ///
    /// An order id that is unknown or owned by another user fails the whole
    /// save with `OrderMissing` and leaves storage untouched.
    async fn save(&self, user: &User) -> Result<User, UserPersistenceError>;

    /// Delete a user together with every order it owns.
    ///
    /// Deleting an absent id is a no-op.
    async fn delete_by_id(&self, id: UserId) -> Result<(), UserPersistenceError>;
}
