use std::sync::Arc;

use axum::Router;
use modkit_auth::TokenVerifier;
use sea_orm::DatabaseConnection;

use crate::api::rest::routes;
use crate::config::AccountsConfig;
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::service::Service;
use crate::infra::storage::SeaOrmAccountsRepository;

/// Wires storage, clock and REST routes of the accounts module.
pub struct AccountsModule {
    service: Arc<Service>,
    config: AccountsConfig,
}

impl AccountsModule {
    pub fn new(conn: DatabaseConnection, config: AccountsConfig) -> Self {
        Self::with_clock(conn, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        conn: DatabaseConnection,
        config: AccountsConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let repo = Arc::new(SeaOrmAccountsRepository::new(conn));
        tracing::debug!(request_timeout = ?config.request_timeout, "accounts module configured");
        Self {
            service: Arc::new(Service::new(repo, clock)),
            config,
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn router(&self, verifier: Arc<dyn TokenVerifier>) -> Router {
        routes::register_routes(self.service(), verifier, self.config.request_timeout)
    }
}
