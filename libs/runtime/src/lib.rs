//! Process-level plumbing shared by service binaries: layered configuration,
//! home directory resolution and logging setup.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{
    default_logging_config, AppConfig, CliArgs, ConsoleFormat, DatabaseConfig, LoggingConfig,
    Section, ServerConfig,
};
pub use home_dir::resolve_home_dir;
pub use logging::init_logging_from_config;
