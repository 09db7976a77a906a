use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Config;

/// Per-invocation settings. Anything set here wins over `swaptree.yaml`.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub source: PathBuf,
    pub target: PathBuf,
    pub output: Option<PathBuf>,
    pub accept: Vec<String>,
    pub dry_run: bool,
    pub show_tree: bool,
    pub root: PathBuf,
}

impl RuntimeConfig {
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if !self.accept.is_empty() {
            config.accept = self.accept.clone();
        }
        config
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            source: cli.source,
            target: cli.target,
            output: cli.output,
            accept: cli.accept,
            dry_run: cli.dry_run,
            show_tree: cli.show_tree,
            root: cli.root,
        }
    }
}
