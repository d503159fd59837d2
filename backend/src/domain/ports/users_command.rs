//! Driving port for user mutations.
//!
//! Every operation validates its input before touching persistence, so an
//! invalid draft never reaches a repository.

use async_trait::async_trait;

use crate::domain::{Error, OrderDraft, OrderId, User, UserDraft, UserId};

/// Domain use-case port for creating, updating and deleting users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Validate and persist a new user, returning it with its generated id.
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error>;

    /// Copy `name` and `email` from the draft onto the stored user.
    ///
    /// Orders are left untouched. Validation runs before the lookup, so an
    /// invalid draft fails with invalid-request even for an unknown id.
    async fn update_user(&self, id: UserId, draft: UserDraft) -> Result<User, Error>;

    /// Delete a user and every order it owns.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;

    /// Attach a new order to an existing user and persist the aggregate.
    async fn add_order(&self, user_id: UserId, draft: OrderDraft) -> Result<User, Error>;

    /// Detach an order from its user; the order is deleted on save.
    async fn remove_order(&self, user_id: UserId, order_id: OrderId) -> Result<User, Error>;
}
