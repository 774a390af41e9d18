use structopt::StructOpt;

/// Top-level CLI arguments, grounded on `oxdb/shell/cli.py::main`'s argument
/// parser. Global flags select the database/document the subcommand (or the
/// interactive loop, when none is given) operates against; everything else
/// is a typed subcommand rather than the Python shell's `eval`'d command
/// string.
#[derive(Debug, StructOpt)]
#[structopt(name = "rvector", about = "Embedded document-oriented vector database")]
pub struct CliConfig {
    /// Root directory holding all databases. Defaults to `~/.rvector`.
    #[structopt(long)]
    pub storage_path: Option<String>,

    /// Database name to open (created if absent).
    #[structopt(long, default_value = "default")]
    pub db: String,

    /// Document name within the database to open (created if absent).
    #[structopt(long)]
    pub doc: Option<String>,

    #[structopt(long, default_value = "info")]
    pub log_level: String,

    #[structopt(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Insert one or more text entries.
    Push {
        /// Text to embed and store. Repeat the flag to push several entries
        /// in one batch.
        #[structopt(long = "text")]
        text: Vec<String>,
        /// Caller-supplied identifier to attach to the pushed entry/entries.
        #[structopt(long)]
        uid: Option<String>,
        /// Skip embedding generation (store an empty vector).
        #[structopt(long)]
        no_embed: bool,
    },
    /// Retrieve entries by id or metadata filter.
    Pull {
        /// Specific ids to pull; pulls the whole store when empty.
        #[structopt(long = "id")]
        ids: Vec<u64>,
        /// Which sub-store to read from.
        #[structopt(long, default_value = "data")]
        docfile: String,
    },
    /// Semantic similarity search.
    Search {
        query: String,
        #[structopt(long, default_value = "10")]
        topn: usize,
        #[structopt(long, default_value = "dp")]
        by: String,
    },
    /// Delete entries by id.
    Delete {
        #[structopt(long = "id")]
        ids: Vec<u64>,
    },
    /// Print database/document summary info.
    Info,
}

impl CliConfig {
    pub fn from_args() -> Self {
        StructOpt::from_args()
    }
}
