use std::io::{Cursor, Write};
use std::num::NonZeroUsize;

use compio::dispatcher::{Dispatcher, DispatcherBuilder};
use derive_more::Display;
use futures::{StreamExt, TryStreamExt, stream};
use snafu::{ResultExt, Snafu};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::archive::ArchiveMember;
use crate::filesystem::ContentReadError;

/// Member contents read concurrently; keeps open file descriptors bounded.
const CONCURRENT_READS: usize = 16;

/// Serializes an ordered list of archive members into a single payload.
pub trait ArchiveWriter {
    /// Resolves once the whole payload is built; on error nothing is produced.
    async fn write(&self, members: Vec<ArchiveMember>) -> Result<Vec<u8>, ArchiveWriteError>;
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[display("stored")]
    Stored,
    #[default]
    #[display("deflated")]
    Deflated,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflated => CompressionMethod::Deflated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZipSettings {
    pub compression: Compression,
    /// Deflate level, `None` for the library default. Ignored when storing.
    pub level: Option<i64>,
}

/// Writes ZIP containers. Compression runs on a dedicated dispatcher thread so
/// the calling runtime stays free while large payloads are packed.
pub struct ZipArchiveWriter {
    dispatcher: Dispatcher,
    settings: ZipSettings,
}

impl ZipArchiveWriter {
    pub fn new(settings: ZipSettings) -> Result<Self, ArchiveWriterInitError> {
        let dispatcher = DispatcherBuilder::new()
            .worker_threads(NonZeroUsize::MIN)
            .build()
            .context(DispatcherSnafu)?;
        debug!(
            "Zip writer ready ({} compression, level {:?})",
            settings.compression, settings.level
        );

        Ok(Self {
            dispatcher,
            settings,
        })
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    async fn write(&self, members: Vec<ArchiveMember>) -> Result<Vec<u8>, ArchiveWriteError> {
        let payloads: Vec<(String, Vec<u8>)> = stream::iter(members)
            .map(|member| async move {
                let bytes = member.content.read().await?;
                Ok::<_, ContentReadError>((member.path, bytes))
            })
            .buffered(CONCURRENT_READS)
            .try_collect()
            .await
            .context(ContentSnafu)?;
        debug!("Read {} archive members, dispatching compression", payloads.len());

        let settings = self.settings;
        let receiver = self
            .dispatcher
            .dispatch(move || async move { encode_zip(payloads, settings) })
            .map_err(|e| ArchiveWriteError::DispatchError {
                error: e.to_string(),
            })?;

        receiver.await.context(CanceledSnafu)?.context(EncodeSnafu)
    }
}

fn encode_zip(
    payloads: Vec<(String, Vec<u8>)>,
    settings: ZipSettings,
) -> zip::result::ZipResult<Vec<u8>> {
    let level = match settings.compression {
        Compression::Stored => None,
        Compression::Deflated => settings.level,
    };
    let options = SimpleFileOptions::default()
        .compression_method(settings.compression.method())
        .compression_level(level)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, bytes) in payloads {
        zip.start_file(path, options)?;
        zip.write_all(&bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

#[derive(Debug, Snafu)]
pub enum ArchiveWriterInitError {
    #[snafu(display("Failed to start the compression dispatcher"))]
    DispatcherError { source: std::io::Error },
}

#[derive(Debug, Snafu)]
pub enum ArchiveWriteError {
    #[snafu(display("Failed to read archive member content"))]
    ContentError { source: ContentReadError },
    #[snafu(display("Failed to dispatch archive compression: {}", error))]
    DispatchError { error: String },
    #[snafu(display("Archive compression got cancelled"))]
    CanceledError {
        source: futures_channel::oneshot::Canceled,
    },
    #[snafu(display("Failed to encode the zip archive"))]
    EncodeError { source: zip::result::ZipError },
}
