//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `OrderRepository`) are implemented by the
//! outbound adapters. Driving ports (`UsersQuery`, `UsersCommand`) are what
//! inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod order_repository;
mod user_repository;
mod users_command;
mod users_query;

#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderPersistenceError, OrderRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::UsersCommand;
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
