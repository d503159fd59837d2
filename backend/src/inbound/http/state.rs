//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::UserService;
use crate::domain::ports::{OrderRepository, UserRepository, UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Read-side use cases.
    pub users: Arc<dyn UsersQuery>,
    /// Write-side use cases.
    pub users_command: Arc<dyn UsersCommand>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    pub fn new(users: Arc<dyn UsersQuery>, users_command: Arc<dyn UsersCommand>) -> Self {
        Self {
            users,
            users_command,
        }
    }

    /// Wire both ports to one [`UserService`] over the given repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use orders_api::inbound::http::state::HttpState;
    /// use orders_api::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let state = HttpState::from_repositories(store.clone(), store);
    /// # let _ = state;
    /// ```
    pub fn from_repositories<U, O>(users: Arc<U>, orders: Arc<O>) -> Self
    where
        U: UserRepository + 'static,
        O: OrderRepository + 'static,
    {
        let service = Arc::new(UserService::new(users, orders));
        Self::new(service.clone(), service)
    }
}
