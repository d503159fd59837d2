//! User domain service.
//!
//! Implements the driving ports on top of the user and order repositories.
//! Drafts are validated before any repository call; repository failures are
//! translated into domain [`Error`] values here so adapters never see
//! persistence types.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    OrderPersistenceError, OrderRepository, UserPersistenceError, UserRepository, UsersCommand,
    UsersQuery,
};
use crate::domain::{
    Error, Order, OrderDraft, OrderId, User, UserDraft, UserId, Validate, ValidationErrors,
};

/// Message returned whenever a referenced user does not exist.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// Message returned when an order is not attached to the referenced user.
pub const ORDER_NOT_FOUND_MESSAGE: &str = "Order not found";

/// User service implementing [`UsersQuery`] and [`UsersCommand`].
#[derive(Clone)]
pub struct UserService<U, O> {
    users: Arc<U>,
    orders: Arc<O>,
}

impl<U, O> UserService<U, O> {
    /// Create a new service over the given repositories.
    pub fn new(users: Arc<U>, orders: Arc<O>) -> Self {
        Self { users, orders }
    }
}

impl<U, O> UserService<U, O>
where
    U: UserRepository,
    O: OrderRepository,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::internal(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::Missing { .. } => Error::not_found(USER_NOT_FOUND_MESSAGE),
            UserPersistenceError::OrderMissing { .. } => Error::not_found(ORDER_NOT_FOUND_MESSAGE),
        }
    }

    fn map_order_error(error: OrderPersistenceError) -> Error {
        match error {
            OrderPersistenceError::Connection { message } => {
                Error::internal(format!("order repository unavailable: {message}"))
            }
            OrderPersistenceError::Query { message } => {
                Error::internal(format!("order repository error: {message}"))
            }
            OrderPersistenceError::OwnerMissing { .. } => Error::not_found(USER_NOT_FOUND_MESSAGE),
            OrderPersistenceError::Missing { .. } => Error::not_found(ORDER_NOT_FOUND_MESSAGE),
        }
    }

    fn map_validation_error(errors: ValidationErrors) -> Error {
        Error::invalid_request(errors.first_message())
    }

    async fn load_user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))
    }

    async fn save_user(&self, user: &User) -> Result<User, Error> {
        self.users.save(user).await.map_err(Self::map_user_error)
    }
}

#[async_trait]
impl<U, O> UsersQuery for UserService<U, O>
where
    U: UserRepository,
    O: OrderRepository,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.find_all().await.map_err(Self::map_user_error)
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        self.load_user(id).await
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, Error> {
        self.orders
            .find_by_id(id)
            .await
            .map_err(Self::map_order_error)
    }
}

#[async_trait]
impl<U, O> UsersCommand for UserService<U, O>
where
    U: UserRepository,
    O: OrderRepository,
{
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error> {
        let user = draft.into_user().map_err(Self::map_validation_error)?;
        let saved = self.save_user(&user).await?;
        info!(user_id = ?saved.id(), "user created");
        Ok(saved)
    }

    async fn update_user(&self, id: UserId, draft: UserDraft) -> Result<User, Error> {
        let changes = draft
            .into_profile()
            .into_user()
            .map_err(Self::map_validation_error)?;
        let mut stored = self.load_user(id).await?;
        stored.merge_profile(&changes);
        self.save_user(&stored).await
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        let exists = self
            .users
            .exists_by_id(id)
            .await
            .map_err(Self::map_user_error)?;
        if !exists {
            return Err(Error::not_found(USER_NOT_FOUND_MESSAGE));
        }
        self.users
            .delete_by_id(id)
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn add_order(&self, user_id: UserId, draft: OrderDraft) -> Result<User, Error> {
        let order = draft.into_order().map_err(Self::map_validation_error)?;
        let mut user = self.load_user(user_id).await?;
        user.add_order(order);
        user.validate().map_err(Self::map_validation_error)?;
        self.save_user(&user).await
    }

    async fn remove_order(&self, user_id: UserId, order_id: OrderId) -> Result<User, Error> {
        let mut user = self.load_user(user_id).await?;
        if user.remove_order(order_id).is_none() {
            debug!(user_id = %user_id, order_id = %order_id, "order not owned by user");
            return Err(Error::not_found(ORDER_NOT_FOUND_MESSAGE));
        }
        self.save_user(&user).await
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
