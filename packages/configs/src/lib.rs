//! Environment/file-backed application config and the CLI's argument
//! surface, plus the on-disk layout constants both (and `rvector_core`)
//! share.

pub mod app_config;
pub mod cli_config;
pub mod types;

pub use app_config::AppConfig;
pub use cli_config::{CliConfig, Command};
