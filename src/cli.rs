use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "esmigrate",
    about = "Zero-downtime schema migration for versioned Elasticsearch indices",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Arguments naming the migration target, shared by both subcommands.
#[derive(Debug, Clone, clap::Args)]
pub struct TargetArgs {
    /// Prefix to be used in index names
    #[arg(long)]
    pub prefix: String,

    /// Name of the logical index
    #[arg(long)]
    pub index: String,

    /// Version to migrate to (the concrete index is {prefix}-{index}_v{version})
    #[arg(long)]
    pub version: u32,

    /// Elasticsearch URL
    #[arg(long, default_value = "http://localhost:9200")]
    pub host: String,

    /// Bearer token for authenticated clusters
    #[arg(long)]
    pub token: Option<String>,

    /// Alias to use; defaults to {prefix}-{index}
    #[arg(long)]
    pub alias: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a versioned index from its mapping file, optionally backfill
    /// it, and optionally cut the alias over to it
    Schema {
        #[command(flatten)]
        target: TargetArgs,

        /// Base path containing the mappings/ directory
        #[arg(long, default_value = ".")]
        base_path: PathBuf,

        /// Delete the existing versioned index, if it exists
        #[arg(long)]
        delete_existing: bool,

        /// Reindex data from the specified index
        #[arg(long, conflicts_with = "from_previous")]
        from: Option<String>,

        /// Reindex data from the previous version
        #[arg(long)]
        from_previous: bool,

        /// Atomically move the alias to the new index after migrating
        #[arg(long)]
        add_alias: bool,
    },

    /// Atomically repoint the alias at an already-existing versioned index
    Alias {
        #[command(flatten)]
        target: TargetArgs,
    },
}
