use std::fmt;

use colored::Colorize;

use super::tree::{Forest, Node, NodeId};

const INDENT: &str = "  ";

/// Text rendering of a forest: directories that contain a match are expanded,
/// everything else stays collapsed. Files directly in the submission root are
/// listed after the directories.
pub struct TreeView<'f> {
    forest: &'f Forest,
    color: bool,
}

impl<'f> TreeView<'f> {
    pub fn new(forest: &'f Forest) -> Self {
        Self {
            forest,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let indent = INDENT.repeat(depth);
        match self.forest.node(id) {
            Node::Directory(directory) => {
                let marker = if directory.is_expanded() { "▼" } else { "►" };
                let label = format!("{marker} {}/", directory.name());
                writeln!(f, "{indent}{}", self.paint(label, directory.is_matched()))?;
                if directory.is_expanded() {
                    for &child in directory.children() {
                        self.write_node(f, child, depth + 1)?;
                    }
                }
            }
            Node::Entry(entry) => {
                if entry.is_matched() {
                    let label = format!("{} (matched)", entry.name());
                    writeln!(f, "{indent}{}", self.paint(label, true))?;
                } else {
                    writeln!(f, "{indent}{}", entry.name())?;
                }
            }
        }
        Ok(())
    }

    fn paint(&self, label: String, matched: bool) -> String {
        if self.color && matched {
            label.green().to_string()
        } else {
            label
        }
    }
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &root in self.forest.roots() {
            self.write_node(f, root, 0)?;
        }
        for (id, _) in self.forest.orphans() {
            self.write_node(f, id, 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::tree::tests::{forest_of, id_of};

    #[test]
    fn collapsed_forest_shows_only_top_level() {
        let forest = forest_of(&["pick/dir1/a.png", "pick/dir2/b.png", "pick/top.png"]);

        let rendered = TreeView::new(&forest).to_string();

        assert_eq!(rendered, "► dir1/\n► dir2/\ntop.png\n");
    }

    #[test]
    fn matched_directories_are_expanded_and_marked() {
        let mut forest = forest_of(&[
            "pick/dir1/sub/a.png",
            "pick/dir1/b.png",
            "pick/dir2/c.png",
        ]);
        forest.mark_matched(id_of(&forest, "pick/dir1/sub/a.png"));
        forest.expand_matched();

        let rendered = TreeView::new(&forest).to_string();

        assert_eq!(
            rendered,
            "▼ dir1/\n  ▼ sub/\n    a.png (matched)\n  b.png\n► dir2/\n"
        );
    }

    #[test]
    fn colored_output_keeps_the_labels() {
        let mut forest = forest_of(&["pick/dir/a.png"]);
        forest.mark_matched(id_of(&forest, "pick/dir/a.png"));
        forest.expand_matched();

        let rendered = TreeView::new(&forest).with_color(true).to_string();

        assert!(rendered.contains("a.png (matched)"));
        assert!(rendered.contains("dir/"));
    }
}
