use std::path::{Component, Path, PathBuf};

pub trait PathExt {
    /// Canonical form when the path exists, the path as given otherwise.
    fn best_effort_path_display(&self) -> String;

    /// Joins the normal components with `/`, independent of the host separator.
    /// Root, prefix, `.` and `..` components are dropped.
    fn to_slash_string(&self) -> String;
}

impl PathExt for Path {
    fn best_effort_path_display(&self) -> String {
        match self.canonicalize() {
            Ok(canonical) => canonical.display().to_string(),
            Err(_) => self.display().to_string(),
        }
    }

    fn to_slash_string(&self) -> String {
        self.components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl PathExt for PathBuf {
    fn best_effort_path_display(&self) -> String {
        self.as_path().best_effort_path_display()
    }

    fn to_slash_string(&self) -> String {
        self.as_path().to_slash_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("a/b/c.png", "a/b/c.png")]
    #[case("./a/./b.png", "a/b.png")]
    #[case("/abs/path.png", "abs/path.png")]
    #[case("single.png", "single.png")]
    #[case("", "")]
    fn converts_to_slash_separated_string(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(Path::new(path).to_slash_string(), expected);
    }

    #[test]
    fn nonexistent_path_is_displayed_as_given() {
        let path = PathBuf::from("/this/path/does/not/exist");
        assert_eq!(path.best_effort_path_display(), "/this/path/does/not/exist");
    }

    #[test]
    fn existing_path_is_canonicalized() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let dotted = dir.path().join(".");

        assert_eq!(
            dotted.best_effort_path_display(),
            dir.path().canonicalize().unwrap().display().to_string()
        );
    }
}
