//! Resolved project directories.

use crate::config::PathsConfig;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Absolute source and output roots for one build.
///
/// Resolved once from the project root before discovery touches the
/// filesystem; every other path is derived from these two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryPaths {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl DirectoryPaths {
    /// Resolve against `project_root`, which may itself be relative to the
    /// current directory. Does not require either directory to exist.
    pub fn resolve(project_root: &Path, paths: &PathsConfig) -> io::Result<Self> {
        let root = std::path::absolute(project_root)?;
        Ok(Self {
            source: root.join(&paths.source),
            output: root.join(&paths.output),
        })
    }

    /// A directory under the source root.
    pub fn source_dir(&self, relative: &str) -> PathBuf {
        self.source.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolves_under_project_root() {
        let tmp = TempDir::new().unwrap();
        let paths = DirectoryPaths::resolve(tmp.path(), &PathsConfig::default()).unwrap();
        assert_eq!(paths.source, tmp.path().join("src"));
        assert_eq!(paths.output, tmp.path().join("dist"));
    }

    #[test]
    fn relative_root_becomes_absolute() {
        let paths = DirectoryPaths::resolve(Path::new("site"), &PathsConfig::default()).unwrap();
        assert!(paths.source.is_absolute());
        assert!(paths.output.is_absolute());
        assert!(paths.source.ends_with("site/src"));
    }

    #[test]
    fn missing_directories_are_not_an_error() {
        let paths = DirectoryPaths::resolve(
            Path::new("/definitely/not/here"),
            &PathsConfig::default(),
        )
        .unwrap();
        assert_eq!(paths.output, Path::new("/definitely/not/here/dist"));
    }
}
