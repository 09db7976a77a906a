use std::path::PathBuf;

use colored::Colorize;
use snafu::Snafu;
use snafu::prelude::*;
use supports_color::Stream;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::archive::{
    ArchiveAssembler, ArchiveWriteError, WriterNotReady, WriterSlot, ZipArchiveWriter,
};
use crate::config::{Config, ConfigError};
use crate::ext::PathExt;
use crate::filesystem::{MediaFilter, TreeView};
use crate::ingest::{ReadDirectoryError, read_directory};
use crate::session::{Session, Side};

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub target_files: usize,
    pub replaced: usize,
    /// `None` on a dry run.
    pub archive: Option<PathBuf>,
}

pub struct Application;

impl Application {
    pub async fn run(runtime: impl Into<RuntimeConfig>) -> Result<RunSummary, ApplicationError> {
        let runtime: RuntimeConfig = runtime.into();
        let config = Config::read(&runtime.root).await.context(ConfigSnafu)?;
        let config = runtime.apply_overrides(config);
        debug!("Loaded config: {:?}", config);

        let mut session = Session::new(MediaFilter::new(config.accept.iter().cloned()));
        for (side, directory) in [(Side::Source, &runtime.source), (Side::Target, &runtime.target)] {
            let files = read_directory(directory).context(IngestSnafu { side })?;
            let forest = session.submit(side, files);
            ensure!(
                !forest.is_empty(),
                NoAcceptedFilesSnafu {
                    side,
                    directory: directory.best_effort_path_display(),
                }
            );
        }

        session.run_matching();
        let matches = session.matches();
        let target = session.forest(Side::Target);
        let source = session.forest(Side::Source);
        for pair in matches.iter() {
            let target_path = target.node(pair.target).full_path();
            let source_path = source.node(pair.source).full_path();
            println!("{} {} {}", target_path, "<-".green(), source_path);
        }
        println!(
            "{} of {} target files will be replaced",
            matches.len(),
            target.len()
        );

        if runtime.show_tree {
            let color = supports_color::on(Stream::Stdout).is_some();
            print!("{}", TreeView::new(target).with_color(color));
        }

        let mut summary = RunSummary {
            target_files: target.len(),
            replaced: matches.len(),
            archive: None,
        };
        if runtime.dry_run {
            info!("Dry run, not writing {}", config.output.display());
            return Ok(summary);
        }

        let mut slot = WriterSlot::new();
        slot.initialize(|| ZipArchiveWriter::new(config.zip));
        let writer = slot.ready().context(WriterNotReadySnafu)?;

        let payload = session
            .write_archive(&ArchiveAssembler::new(writer))
            .await
            .context(ArchiveSnafu)?;
        info!("Assembled archive of {} bytes", payload.len());

        compio::fs::write(&config.output, payload)
            .await
            .0
            .context(OutputSnafu {
                path: config.output.clone(),
            })?;
        println!("Wrote {}", config.output.best_effort_path_display());

        summary.archive = Some(config.output);
        Ok(summary)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Failed to read the {} folder", side))]
    IngestError {
        side: Side,
        source: ReadDirectoryError,
    },
    #[snafu(display("The {} folder {} holds no accepted files", side, directory))]
    NoAcceptedFilesError { side: Side, directory: String },
    #[snafu(display("No archive writer available"))]
    WriterNotReadyError { source: WriterNotReady },
    #[snafu(display("Failed to assemble the output archive"))]
    ArchiveError { source: ArchiveWriteError },
    #[snafu(display("Failed to write the archive to {}", path.display()))]
    OutputError {
        path: PathBuf,
        source: std::io::Error,
    },
}
