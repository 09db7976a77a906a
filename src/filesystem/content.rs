use std::path::PathBuf;
use std::sync::Arc;

use compio::fs;
use derive_more::Display;
use snafu::{ResultExt, Snafu};

/// Where the bytes behind a [`ContentHandle`] live.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum ContentSource {
    #[display("file {}", _0.display())]
    File(PathBuf),
    /// Test fixtures only.
    #[cfg(test)]
    #[display("{} in-memory bytes", _0.len())]
    Memory(Vec<u8>),
}

/// Shared, read-only handle to a file's bytes.
///
/// Cloning is cheap and every clone refers to the same source. Reading never
/// consumes the handle, so it can be read any number of times.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub struct ContentHandle(Arc<ContentSource>);

impl ContentHandle {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self(Arc::new(ContentSource::File(path.into())))
    }

    #[cfg(test)]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::new(ContentSource::Memory(bytes.into())))
    }

    pub fn source(&self) -> &ContentSource {
        &self.0
    }

    pub async fn read(&self) -> Result<Vec<u8>, ContentReadError> {
        match self.source() {
            ContentSource::File(path) => fs::read(path).await.context(ReadSnafu { path: path.clone() }),
            #[cfg(test)]
            ContentSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ContentReadError {
    #[snafu(display("Failed to read content from {}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[compio::test]
    async fn reads_in_memory_content_repeatedly() {
        let handle = ContentHandle::from_bytes(b"pixels".to_vec());

        assert_eq!(handle.read().await.unwrap(), b"pixels");
        assert_eq!(handle.clone().read().await.unwrap(), b"pixels");
    }

    #[compio::test]
    async fn reads_file_content() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        write!(temp_file, "colored").expect("Failed to write to temp file");
        temp_file.flush().expect("Failed to flush temp file");

        let handle = ContentHandle::from_file(temp_file.path());

        assert_eq!(handle.read().await.unwrap(), b"colored");
        assert_eq!(handle.read().await.unwrap(), b"colored");
    }

    #[compio::test]
    async fn missing_file_reports_its_path() {
        let handle = ContentHandle::from_file("/this/path/does/not/exist.png");

        let error = handle.read().await.unwrap_err();

        assert!(matches!(error, ContentReadError::ReadError { .. }));
        assert!(error.to_string().contains("/this/path/does/not/exist.png"));
    }

    #[test]
    fn clones_share_the_same_source() {
        let handle = ContentHandle::from_bytes(vec![1, 2, 3]);
        let clone = handle.clone();

        assert!(std::ptr::eq(handle.source(), clone.source()));
        assert_eq!(handle, clone);
        assert_ne!(handle, ContentHandle::from_bytes(vec![4]));
    }
}
