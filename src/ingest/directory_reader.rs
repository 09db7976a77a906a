use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::ext::PathExt;
use crate::filesystem::{ContentHandle, SubmittedFile, mime_type_for_path};

/// Submission root name used when the picked directory has no final component (e.g. `/`).
const FALLBACK_ROOT_NAME: &str = "root";

/// Reads a picked directory into the flat batch the tree builder expects.
///
/// Every relative path starts with the directory's own name, followed by the
/// file's location inside it. Files are visited in file-name order, symlinks are
/// not followed and unreadable entries are skipped with a warning.
pub fn read_directory(directory: &Path) -> Result<Vec<SubmittedFile>, ReadDirectoryError> {
    let root = directory.canonicalize().context(RootSnafu {
        path: directory.to_path_buf(),
    })?;
    ensure!(root.is_dir(), NotADirectorySnafu { path: root.clone() });

    let root_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_ROOT_NAME.to_string());
    debug!(
        "Reading '{}' as submission root '{}'",
        root.display(),
        root_name
    );

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry below '{}': {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(&root) else {
            warn!("Skipping '{}' outside of the submission root", entry.path().display());
            continue;
        };

        files.push(SubmittedFile::new(
            format!("{root_name}/{}", relative.to_slash_string()),
            mime_type_for_path(entry.path()),
            ContentHandle::from_file(entry.path()),
        ));
    }

    info!("Found {} files in '{}'", files.len(), root.display());
    Ok(files)
}

#[derive(Debug, Snafu)]
pub enum ReadDirectoryError {
    #[snafu(display("Cannot open directory {}", path.best_effort_path_display()))]
    RootError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{} is not a directory", path.display()))]
    NotADirectory { path: PathBuf },
}
