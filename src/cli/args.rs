//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// crate-index-cache - offline cargo registry index cache builder
///
/// Materializes the `.cache` tree cargo keeps for a git crate index from a
/// local mirror or a shallow tarball, without network access.
#[derive(Parser, Debug)]
#[command(name = "crate-index-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CRATE_INDEX_CACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an index cache from a crateindex:// source
    Unpack(UnpackArgs),

    /// Show the contents of a cache file or the state of a destination
    Inspect(InspectArgs),

    /// Check that the required tools are installed
    Status,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the unpack command
#[derive(Parser, Debug)]
pub struct UnpackArgs {
    /// Source URL, e.g. crateindex://github.com/rust-lang/crates.io-index;branch=master
    pub url: String,

    /// Directory the destination suffix is resolved against
    #[arg(short, long)]
    pub dest: PathBuf,

    /// Revision to snapshot (overrides the URL's rev option)
    #[arg(short, long)]
    pub rev: Option<String>,

    /// Downloads directory holding mirrors and shallow tarballs
    #[arg(long)]
    pub downloads: Option<PathBuf>,

    /// Parent directory for the temporary raw tree
    #[arg(long)]
    pub scratch: Option<PathBuf>,
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Cache file or destination directory
    pub path: PathBuf,

    /// Output format for cache files
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for inspect
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Version strings only, one per line
    Plain,
}
