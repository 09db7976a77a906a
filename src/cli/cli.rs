use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Rebuilds the target folder as a zip archive, replacing every file that has a
/// same-named counterpart in the source folder.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Folder holding the replacement files
    pub source: PathBuf,
    /// Folder whose structure the archive reproduces
    pub target: PathBuf,

    /// Name of the archive to write
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// MIME prefix of files to take into account, repeatable
    #[clap(long = "accept", value_name = "PREFIX")]
    pub accept: Vec<String>,

    /// Match and report without writing the archive
    #[clap(long)]
    pub dry_run: bool,

    /// Print the target folder structure with matched files highlighted
    #[clap(long)]
    pub show_tree: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Directory holding the optional swaptree.yaml
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,
}
