//! Output archive assembly.
//!
//! The assembler mirrors the target forest's layout, swapping in source content
//! for matched files, and hands the resulting member list to an [`ArchiveWriter`].

mod assembler;
mod writer;
mod writer_slot;

pub use assembler::{ArchiveAssembler, ArchiveMember};
pub use writer::{ArchiveWriteError, ArchiveWriter, Compression, ZipArchiveWriter, ZipSettings};
pub use writer_slot::{WriterNotReady, WriterSlot};
