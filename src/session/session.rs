use derive_more::Display;
use tracing::{debug, info};

use crate::archive::{ArchiveAssembler, ArchiveWriteError, ArchiveWriter};
use crate::filesystem::{Forest, MediaFilter, SubmittedFile};
use crate::matching::{MatchSet, match_forests};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Files that replace their same-named counterparts.
    #[display("source")]
    Source,
    /// Files whose layout the output archive reproduces.
    #[display("target")]
    Target,
}

/// Current state of one replacement run: both forests and the latest matches.
///
/// Submitting a new batch for either side rebuilds that side from scratch and
/// throws away every match result, including the annotations on the target.
#[derive(Debug, Default)]
pub struct Session {
    filter: MediaFilter,
    source: Forest,
    target: Forest,
    matches: MatchSet,
}

impl Session {
    pub fn new(filter: MediaFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn submit(&mut self, side: Side, files: impl IntoIterator<Item = SubmittedFile>) -> &Forest {
        let forest = Forest::build(files, &self.filter);
        info!(
            "Loaded {} {} files from '{}'",
            forest.len(),
            side,
            forest.submission_root().unwrap_or_default()
        );

        self.matches = MatchSet::default();
        self.target.clear_matches();

        match side {
            Side::Source => {
                self.source = forest;
                &self.source
            }
            Side::Target => {
                self.target = forest;
                &self.target
            }
        }
    }

    pub fn run_matching(&mut self) -> &MatchSet {
        self.matches = match_forests(&self.source, &mut self.target);
        debug!(
            "{} of {} target files will be replaced",
            self.matches.len(),
            self.target.len()
        );
        &self.matches
    }

    pub fn forest(&self, side: Side) -> &Forest {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    pub async fn write_archive<W: ArchiveWriter>(
        &self,
        assembler: &ArchiveAssembler<'_, W>,
    ) -> Result<Vec<u8>, ArchiveWriteError> {
        assembler.write_archive(&self.target, &self.matches).await
    }
}
