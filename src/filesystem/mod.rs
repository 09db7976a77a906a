//! In-memory representation of a submitted folder.
//!
//! A submission arrives as a flat list of relative paths with content handles.
//! This module rebuilds the directory hierarchy from those paths into a
//! [`Forest`], where nodes are either directories or files and both carry a
//! `matched` annotation used by the matcher.

mod content;
mod media;
mod relative_path;
pub(crate) mod tree;
mod tree_view;

pub use content::{ContentHandle, ContentReadError};
pub use media::{DEFAULT_ACCEPTED_PREFIX, MediaFilter, mime_type_for_path};
pub use relative_path::SEPARATOR;
pub use tree::{Forest, NodeId, SubmittedFile};
pub use tree_view::TreeView;
