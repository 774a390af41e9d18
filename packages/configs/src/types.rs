//! On-disk layout and default-value constants shared by the CLI, the config
//! loaders, and `rvector_core`. These are the concrete names spec.md §6
//! leaves abstract ("a conventional extension", "a fixed constant").

/// Directory rvector creates under the user's home directory when no
/// explicit root path is given, mirroring `oxdb`'s hardcoded `~/ox-db`.
pub const PRODUCT_ROOT_DIR: &str = ".rvector";

/// Extension appended to a database directory name when the caller supplies
/// only a bare name to `Database::get_db`.
pub const DB_EXT: &str = ".rvdb";

/// Default document name used when none is given, matching
/// `oxdb_lite/config.py::settings.BASE_DB_COLLECTION`.
pub const DEFAULT_DOC_NAME: &str = "rvector-lite";

/// Name of the binary tagged codec, matching the Python's `DBIN_METHOD`
/// (`"oxdbin"`) so an on-disk `config.data_encoding` value round-trips
/// between the two without translation.
pub const DEFAULT_DATA_ENCODING: &str = "oxdbin";

/// Default similarity metric short form, matching `settings.SIM_FORMAT`.
pub const DEFAULT_SIM_FORMAT: &str = "dp";

/// All similarity metrics the CLI/config accept, matching
/// `settings.SIM_FORMATS`.
pub const SIM_FORMATS: [&str; 3] = ["dp", "cs", "ed"];

/// Default embedding model name, matching `settings.EMBEDDING_MODEL`.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Output vector length of [`DEFAULT_EMBEDDING_MODEL`].
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
