use snafu::{Snafu, ensure};

/// Separator used in submitted paths and in archive member names.
pub const SEPARATOR: char = '/';

/// A submitted relative path, split into normalized segments.
///
/// The first segment is always the submission root (the folder the user picked),
/// the last one is the file name. Construction guarantees at least two segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    /// Splits `raw` on `/`, dropping empty and `.` segments. A `\` is an ordinary
    /// file name character.
    pub fn parse(raw: &str) -> Result<Self, MalformedPathError> {
        let mut segments = Vec::new();
        for segment in raw.split(SEPARATOR) {
            match segment {
                "" | "." => continue,
                ".." => return ParentTraversalSnafu { path: raw }.fail(),
                segment => segments.push(segment.to_string()),
            }
        }

        ensure!(segments.len() >= 2, TooShortSnafu { path: raw });

        Ok(Self { segments })
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn file_name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Name of the segment at `index`.
    pub fn segment(&self, index: usize) -> &str {
        &self.segments[index]
    }

    /// The first `count` segments joined with the separator.
    pub fn prefix(&self, count: usize) -> String {
        self.segments[..count].join("/")
    }

    pub fn joined(&self) -> String {
        self.prefix(self.segments.len())
    }
}

#[derive(Debug, Snafu)]
pub enum MalformedPathError {
    #[snafu(display("Path '{}' does not name a file below its submission root", path))]
    TooShort { path: String },
    #[snafu(display("Path '{}' escapes its submission root", path))]
    ParentTraversal { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn splits_root_directories_and_file_name() {
        let path = RelativePath::parse("photos/2020/summer/beach.png").unwrap();

        assert_eq!(path.root(), "photos");
        assert_eq!(path.file_name(), "beach.png");
        assert_eq!(path.len(), 4);
        assert_eq!(path.segment(1), "2020");
        assert_eq!(path.prefix(2), "photos/2020");
        assert_eq!(path.joined(), "photos/2020/summer/beach.png");
    }

    #[rstest]
    #[case("photos//2020/./a.png", "photos/2020/a.png")]
    #[case("/photos/a.png", "photos/a.png")]
    #[case("photos/a.png/", "photos/a.png")]
    fn normalizes_separators_and_empty_segments(#[case] raw: &str, #[case] expected: &str) {
        let path = RelativePath::parse(raw).unwrap();
        assert_eq!(path.joined(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("a.png")]
    #[case("/a.png")]
    #[case("./a.png")]
    fn rejects_paths_without_a_submission_root(#[case] raw: &str) {
        assert!(matches!(
            RelativePath::parse(raw),
            Err(MalformedPathError::TooShort { .. })
        ));
    }

    #[test]
    fn backslash_stays_inside_the_segment() {
        let path = RelativePath::parse("photos/d/x\\y.png").unwrap();

        assert_eq!(path.len(), 3);
        assert_eq!(path.file_name(), "x\\y.png");
        assert_eq!(path.joined(), "photos/d/x\\y.png");
    }

    #[test]
    fn rejects_parent_traversal() {
        let result = RelativePath::parse("photos/../../etc/passwd");
        assert!(matches!(
            result,
            Err(MalformedPathError::ParentTraversal { .. })
        ));
    }

    #[test]
    fn error_mentions_offending_path() {
        let error = RelativePath::parse("lonely.png").unwrap_err();
        assert!(error.to_string().contains("lonely.png"));
    }
}
