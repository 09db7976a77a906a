use std::collections::HashMap;
use std::iter;

use derive_more::Display;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use super::content::ContentHandle;
use super::media::MediaFilter;
use super::relative_path::{MalformedPathError, RelativePath};

/// Index of a node inside the [`Forest`] arena that created it.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("#{_0}")]
pub struct NodeId(usize);

/// A submitted file.
///
/// `full_path` is the normalized form of the submitted path: segments joined
/// with `/`, with empty and `.` segments dropped. It still starts with the
/// submission root.
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    full_path: String,
    content: ContentHandle,
    matched: bool,
    parent: Option<NodeId>,
}

impl Entry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn content(&self) -> &ContentHandle {
        &self.content
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// A path segment that is not a file.
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    name: String,
    full_path: String,
    children: Vec<NodeId>,
    expanded: bool,
    matched: bool,
    parent: Option<NodeId>,
}

impl DirectoryNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Children in discovery order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Directory(DirectoryNode),
    Entry(Entry),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Directory(directory) => directory.name(),
            Node::Entry(entry) => entry.name(),
        }
    }

    pub fn full_path(&self) -> &str {
        match self {
            Node::Directory(directory) => directory.full_path(),
            Node::Entry(entry) => entry.full_path(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Directory(directory) => directory.parent,
            Node::Entry(entry) => entry.parent,
        }
    }

    pub fn is_matched(&self) -> bool {
        match self {
            Node::Directory(directory) => directory.matched,
            Node::Entry(entry) => entry.matched,
        }
    }

    fn set_matched(&mut self, matched: bool) {
        match self {
            Node::Directory(directory) => directory.matched = matched,
            Node::Entry(entry) => entry.matched = matched,
        }
    }
}

/// One file as handed over by the input collaborator.
#[derive(Debug, Clone)]
pub struct SubmittedFile {
    pub relative_path: String,
    pub mime_type: String,
    pub content: ContentHandle,
}

impl SubmittedFile {
    pub fn new(
        relative_path: impl Into<String>,
        mime_type: impl Into<String>,
        content: ContentHandle,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            mime_type: mime_type.into(),
            content,
        }
    }
}

/// Directory trees rebuilt from one side's flat submission.
///
/// Nodes live in an arena owned by the forest. `children` lists own the tree
/// shape; `parent` links are plain indices used for upward walks only.
///
/// Roots start at the second path segment: the first one is the submission root
/// (the folder the user picked), which is recorded but not part of the tree.
/// Files sitting directly in the submission root have no parent directory and
/// are only reachable through the flat entry list.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    entries: Vec<NodeId>,
    submission_root: Option<String>,
}

impl Forest {
    /// Builds a forest from `files`, skipping what `filter` rejects and any
    /// path that cannot be placed in the tree.
    pub fn build(files: impl IntoIterator<Item = SubmittedFile>, filter: &MediaFilter) -> Self {
        let mut builder = ForestBuilder::default();
        let mut filtered = 0usize;
        let mut skipped = 0usize;

        for file in files {
            if !filter.accepts(&file.mime_type) {
                debug!(
                    "Ignoring '{}' with unaccepted type '{}'",
                    file.relative_path, file.mime_type
                );
                filtered += 1;
                continue;
            }

            if let Err(error) = builder.insert(&file.relative_path, file.content) {
                warn!("Skipping submitted file: {}", error);
                skipped += 1;
            }
        }

        let forest = builder.forest;
        info!(
            "Built forest with {} files in {} root directories ({} filtered, {} skipped)",
            forest.entries.len(),
            forest.roots.len(),
            filtered,
            skipped
        );
        forest
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn entry(&self, id: NodeId) -> Option<&Entry> {
        match self.node(id) {
            Node::Entry(entry) => Some(entry),
            Node::Directory(_) => None,
        }
    }

    #[cfg(test)]
    pub fn directory(&self, id: NodeId) -> Option<&DirectoryNode> {
        match self.node(id) {
            Node::Directory(directory) => Some(directory),
            Node::Entry(_) => None,
        }
    }

    /// Top-level directories in discovery order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Every file in submission order, regardless of depth.
    pub fn entries(&self) -> impl Iterator<Item = (NodeId, &Entry)> {
        self.entries
            .iter()
            .filter_map(|&id| self.entry(id).map(|entry| (id, entry)))
    }

    /// Files without a parent directory, i.e. submitted directly inside the submission root.
    pub fn orphans(&self) -> impl Iterator<Item = (NodeId, &Entry)> {
        self.entries().filter(|(_, entry)| entry.parent.is_none())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn submission_root(&self) -> Option<&str> {
        self.submission_root.as_deref()
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(self.node(id).parent(), |&parent| self.node(parent).parent())
    }

    /// Marks `id` and every directory above it as matched.
    pub fn mark_matched(&mut self, id: NodeId) {
        let chain: Vec<NodeId> = iter::once(id).chain(self.ancestors(id)).collect();
        for id in chain {
            self.nodes[id.0].set_matched(true);
        }
    }

    /// Resets all match annotations and collapses every directory.
    pub fn clear_matches(&mut self) {
        for node in &mut self.nodes {
            node.set_matched(false);
            if let Node::Directory(directory) = node {
                directory.expanded = false;
            }
        }
    }

    /// Expands exactly the directories that contain a match.
    pub fn expand_matched(&mut self) {
        for node in &mut self.nodes {
            if let Node::Directory(directory) = node {
                directory.expanded = directory.matched;
            }
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = node.parent();
        let is_directory = matches!(node, Node::Directory(_));
        self.nodes.push(node);

        match parent {
            Some(parent) => {
                if let Node::Directory(directory) = &mut self.nodes[parent.0] {
                    directory.children.push(id);
                }
            }
            None if is_directory => self.roots.push(id),
            None => {}
        }

        id
    }
}

/// Incremental flat-list-to-tree reduction backing [`Forest::build`].
#[derive(Default)]
struct ForestBuilder {
    forest: Forest,
    directories: HashMap<String, NodeId>,
    files: HashMap<String, NodeId>,
}

impl ForestBuilder {
    fn insert(&mut self, raw_path: &str, content: ContentHandle) -> Result<(), SkippedPathError> {
        let path = RelativePath::parse(raw_path).context(MalformedSnafu)?;

        let expected_root = self
            .forest
            .submission_root
            .get_or_insert_with(|| path.root().to_string());
        if expected_root.as_str() != path.root() {
            return ForeignRootSnafu {
                path: path.joined(),
                expected: expected_root.clone(),
            }
            .fail();
        }

        self.check_kinds(&path)?;

        let mut parent = None;
        for depth in 2..path.len() {
            let directory_path = path.prefix(depth);
            let id = match self.directories.get(&directory_path) {
                Some(&id) => id,
                None => {
                    let id = self.forest.push(Node::Directory(DirectoryNode {
                        name: path.segment(depth - 1).to_string(),
                        full_path: directory_path.clone(),
                        children: Vec::new(),
                        expanded: false,
                        matched: false,
                        parent,
                    }));
                    self.directories.insert(directory_path, id);
                    id
                }
            };
            parent = Some(id);
        }

        let full_path = path.joined();
        if let Some(&existing) = self.files.get(&full_path) {
            debug!("'{}' submitted again, keeping the later content", full_path);
            if let Node::Entry(entry) = &mut self.forest.nodes[existing.0] {
                entry.content = content;
            }
            return Ok(());
        }

        let id = self.forest.push(Node::Entry(Entry {
            name: path.file_name().to_string(),
            full_path: full_path.clone(),
            content,
            matched: false,
            parent,
        }));
        self.forest.entries.push(id);
        self.files.insert(full_path, id);

        Ok(())
    }

    /// A file cannot hold children and a directory cannot be overwritten by a file.
    fn check_kinds(&self, path: &RelativePath) -> Result<(), SkippedPathError> {
        for depth in 2..path.len() {
            let directory_path = path.prefix(depth);
            if self.files.contains_key(&directory_path) {
                return InsideFileSnafu {
                    path: path.joined(),
                    file: directory_path,
                }
                .fail();
            }
        }

        let full_path = path.joined();
        if self.directories.contains_key(&full_path) {
            return ShadowsDirectorySnafu { path: full_path }.fail();
        }

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum SkippedPathError {
    #[snafu(display("Malformed path"))]
    Malformed { source: MalformedPathError },
    #[snafu(display(
        "Path '{}' is outside the submission root '{}'",
        path,
        expected
    ))]
    ForeignRoot { path: String, expected: String },
    #[snafu(display("Cannot place '{}' inside file '{}'", path, file))]
    InsideFile { path: String, file: String },
    #[snafu(display("Cannot replace directory '{}' with a file", path))]
    ShadowsDirectory { path: String },
}
