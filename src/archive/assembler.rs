use tracing::{debug, info};

use crate::archive::{ArchiveWriteError, ArchiveWriter};
use crate::filesystem::{ContentHandle, Forest, SEPARATOR};
use crate::matching::MatchSet;

/// One file of the output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    pub path: String,
    pub content: ContentHandle,
}

/// Turns an annotated target forest into archive members and serializes them
/// through the writer it was constructed with.
pub struct ArchiveAssembler<'w, W: ArchiveWriter> {
    writer: &'w W,
}

impl<'w, W: ArchiveWriter> ArchiveAssembler<'w, W> {
    pub fn new(writer: &'w W) -> Self {
        Self { writer }
    }

    /// Lists one member per target file, in submission order.
    ///
    /// Member paths drop the submission root. Matched files carry the content of
    /// their source counterpart, all others keep their own.
    pub fn assemble(&self, target: &Forest, matches: &MatchSet) -> Vec<ArchiveMember> {
        target
            .entries()
            .map(|(id, entry)| {
                let content = match matches.pair_for_target(id) {
                    Some(pair) => pair.replacement.clone(),
                    None => entry.content().clone(),
                };
                ArchiveMember {
                    path: output_path(entry.full_path()).to_string(),
                    content,
                }
            })
            .collect()
    }

    /// Assembles and serializes the archive. Either the complete payload is
    /// returned or nothing is.
    pub async fn write_archive(
        &self,
        target: &Forest,
        matches: &MatchSet,
    ) -> Result<Vec<u8>, ArchiveWriteError> {
        let members = self.assemble(target, matches);
        info!(
            "Writing archive with {} members, {} replaced",
            members.len(),
            matches.len()
        );

        let payload = self.writer.write(members).await?;
        debug!("Archive payload is {} bytes", payload.len());
        Ok(payload)
    }
}

/// Archive path of a submitted file: its full path without the submission root.
pub fn output_path(full_path: &str) -> &str {
    let trimmed = full_path.trim_start_matches(SEPARATOR);
    match trimmed.split_once(SEPARATOR) {
        Some((_root, rest)) => rest.trim_start_matches(SEPARATOR),
        None => trimmed,
    }
}
