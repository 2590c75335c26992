//! Page template discovery.
//!
//! Lists the views directory under the source root and turns every file with
//! the template extension into a [`TemplateFile`]. Each one later becomes one
//! HTML page.
//!
//! ```text
//! src/
//! └── views/
//!     ├── about.pug        → about.html
//!     ├── index.pug        → index.html
//!     ├── notes.txt        (ignored, wrong extension)
//!     ├── .draft.pug       (ignored, hidden)
//!     └── blog/
//!         └── post.pug     → post.html (only with views.recursive = true)
//! ```
//!
//! ## Ordering
//!
//! Results are sorted by path relative to the views directory, so a flat
//! views directory yields pages in lexicographic name order. Directory
//! listing order is platform-dependent; sorting makes repeated builds of the
//! same tree produce the same configuration.
//!
//! ## Hidden Entries
//!
//! Files and directories whose name starts with a dot are skipped, so
//! `.draft.pug` never becomes a page even though it has the template
//! extension. Rename it to publish it.
//!
//! ## Failure
//!
//! A views directory that does not exist is a malformed project and fails
//! with [`DiscoveryError::DirectoryNotFound`]. An existing but empty one is
//! fine and yields no pages.

use crate::config::ViewsConfig;
use crate::naming;
use crate::paths::DirectoryPaths;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Views directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("Error walking views directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A discovered page template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateFile {
    /// Path relative to the source root, e.g. `views/about.pug`.
    pub relative_path: PathBuf,
    /// Filename with the template extension removed, e.g. `about`.
    pub name: String,
}

/// Discover page templates under `<source>/<views.dir>`.
pub fn discover_templates(
    paths: &DirectoryPaths,
    views: &ViewsConfig,
) -> Result<Vec<TemplateFile>, DiscoveryError> {
    let views_dir = paths.source_dir(&views.dir);
    if !views_dir.is_dir() {
        return Err(DiscoveryError::DirectoryNotFound(views_dir));
    }

    let max_depth = if views.recursive { None } else { Some(1) };
    let files = collect_files(&views_dir, max_depth)?;

    let mut templates: Vec<(PathBuf, TemplateFile)> = files
        .into_iter()
        .filter_map(|path| {
            let file_name = path.file_name()?.to_str()?;
            let name = naming::logical_name(file_name, &views.extension)?;
            let within_views = path.strip_prefix(&views_dir).ok()?.to_path_buf();
            Some((
                within_views.clone(),
                TemplateFile {
                    relative_path: Path::new(&views.dir).join(within_views),
                    name,
                },
            ))
        })
        .collect();

    templates.sort_by(|a, b| a.0.cmp(&b.0));

    for (_, template) in &templates {
        tracing::debug!(
            template = %template.relative_path.display(),
            name = %template.name,
            "discovered page template"
        );
    }

    Ok(templates.into_iter().map(|(_, t)| t).collect())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Non-hidden regular files below `dir`, skipping hidden directories.
///
/// `max_depth` of `None` descends without limit; `Some(1)` lists only `dir`
/// itself.
fn collect_files(dir: &Path, max_depth: Option<usize>) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut walker = WalkDir::new(dir).min_depth(1);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();
    for entry in walker.into_iter().filter_entry(|e| !is_hidden(e.path())) {
        let entry = entry?;
        // `Path::is_file` follows symlinks to template files
        if entry.path().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
