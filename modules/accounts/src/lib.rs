//! Account registration and lookup.
//!
//! `contract` holds the transport-free model, `domain` the service and its
//! ports, `api::rest` the HTTP surface and `infra::storage` the SeaORM
//! repository with its migrations.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::AccountsConfig;
pub use infra::storage::migrations::Migrator;
pub use module::AccountsModule;
