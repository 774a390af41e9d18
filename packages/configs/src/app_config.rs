use config::{Config, File};
use serde::Deserialize;
use std::convert::TryFrom;
use std::error::Error;

use crate::types;

/// Process-wide settings, loadable from the environment (`.env` + `RVECTOR_*`
/// vars) or from a `config.toml`/`config.json` file, falling back to
/// defaults when neither is present. Mirrors `oxdb_lite/config.py::settings`,
/// generalized into something callers can override at runtime rather than a
/// hardcoded class.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Root directory under which databases are created. Defaults to
    /// `~/.rvector`.
    pub storage_path: String,
    /// Verbosity passed to `rvector_logger::init` (`error`, `warn`, `info`,
    /// `debug`, `trace`).
    pub log_level: String,
    /// Embedding model identifier passed to the configured
    /// `EmbeddingProvider`.
    pub embedding_model: String,
    /// Default document name used by `Database::get_doc` when none is given.
    pub db_collection: String,
    /// Default similarity metric short form (`dp`, `cs`, `ed`).
    pub sim_format: String,
    /// On-disk codec a freshly created `KVStore` is configured with
    /// (`oxdbin` or `json`).
    pub data_encoding: String,
}

impl TryFrom<Config> for AppConfig {
    type Error = Box<dyn Error>;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        Ok(Self {
            storage_path: config.get::<String>("storage_path")?,
            log_level: config.get::<String>("log_level")?,
            embedding_model: config.get::<String>("embedding_model")?,
            db_collection: config.get::<String>("db_collection")?,
            sim_format: config.get::<String>("sim_format")?,
            data_encoding: config.get::<String>("data_encoding")?,
        })
    }
}

impl AppConfig {
    /// Load from `.env`/process environment, falling back to [`Self::default`]
    /// for any variable that is unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let default = Self::default();
        Self {
            storage_path: std::env::var("RVECTOR_STORAGE_PATH").unwrap_or(default.storage_path),
            log_level: std::env::var("RVECTOR_LOG_LEVEL").unwrap_or(default.log_level),
            embedding_model: std::env::var("RVECTOR_EMBEDDING_MODEL")
                .unwrap_or(default.embedding_model),
            db_collection: std::env::var("RVECTOR_DB_COLLECTION").unwrap_or(default.db_collection),
            sim_format: std::env::var("RVECTOR_SIM_FORMAT").unwrap_or(default.sim_format),
            data_encoding: std::env::var("RVECTOR_DATA_ENCODING")
                .unwrap_or(default.data_encoding),
        }
    }

    /// Load from a `config.{toml,json,yaml,...}` file in the current
    /// directory, if present, falling back to [`Self::default`] for any key
    /// the file doesn't set.
    pub fn from_file(name: &str) -> Result<Self, Box<dyn Error>> {
        let default = Self::default();
        let config = Config::builder()
            .set_default("storage_path", default.storage_path)?
            .set_default("log_level", default.log_level)?
            .set_default("embedding_model", default.embedding_model)?
            .set_default("db_collection", default.db_collection)?
            .set_default("sim_format", default.sim_format)?
            .set_default("data_encoding", default.data_encoding)?
            .add_source(File::with_name(name).required(false))
            .build()?;
        Self::try_from(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self {
            storage_path: format!("{home}/{}", types::PRODUCT_ROOT_DIR),
            log_level: "info".to_string(),
            embedding_model: types::DEFAULT_EMBEDDING_MODEL.to_string(),
            db_collection: types::DEFAULT_DOC_NAME.to_string(),
            sim_format: types::DEFAULT_SIM_FORMAT.to_string(),
            data_encoding: types::DEFAULT_DATA_ENCODING.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_product_root_under_home() {
        std::env::set_var("HOME", "/home/tester");
        let cfg = AppConfig::default();
        assert_eq!(cfg.storage_path, "/home/tester/.rvector");
        assert_eq!(cfg.data_encoding, "oxdbin");
        assert_eq!(cfg.sim_format, "dp");
    }
}
