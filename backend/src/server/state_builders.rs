//! Builders for the HTTP state from the configured persistence backend.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use orders_api::inbound::http::state::HttpState;
use orders_api::outbound::memory::InMemoryStore;
use orders_api::outbound::persistence::{DieselOrderRepository, DieselUserRepository};

use super::ServerConfig;

/// Build handler state backed by PostgreSQL when a pool is configured,
/// otherwise by a process-local [`InMemoryStore`].
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL persistence");
            HttpState::from_repositories(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselOrderRepository::new(pool.clone())),
            )
        }
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            let store = Arc::new(InMemoryStore::new());
            HttpState::from_repositories(store.clone(), store)
        }
    };
    web::Data::new(state)
}
