//! Reading a picked directory from disk into a flat submission batch.

mod directory_reader;

pub use directory_reader::{ReadDirectoryError, read_directory};
