//! Page targets: one HTML page per discovered template.
//!
//! The title and filename both come from the template's logical name:
//! `views/about.pug` becomes a page titled `about` written to `about.html`.
//! Development writes the filename relative to the output root; production
//! writes the absolute path under it. The logical name is the same in both.
//!
//! ## Collisions
//!
//! With recursive discovery, `views/index.pug` and `views/blog/index.pug`
//! both map to `index.html`. Under [`CollisionPolicy::Overwrite`] both
//! targets are kept and the later one in discovery order overwrites the
//! earlier when pages are emitted. [`CollisionPolicy::Error`] refuses instead.

use crate::config::CollisionPolicy;
use crate::discover::TemplateFile;
use crate::mode::PathAnchor;
use crate::naming;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("{first} and {second} both produce {filename}")]
    NameCollision {
        filename: String,
        first: String,
        second: String,
    },
}

/// A page to be generated from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageTarget {
    /// Template path relative to the source root.
    pub template: PathBuf,
    /// `<logical name>.html`
    pub filename: String,
    /// Where the page is written: `filename` itself, or the absolute path.
    pub output_path: PathBuf,
    pub title: String,
}

/// Map every template to exactly one page target, in the same order.
pub fn build_page_targets(
    templates: &[TemplateFile],
    anchor: PathAnchor,
    output_root: &Path,
    policy: CollisionPolicy,
) -> Result<Vec<PageTarget>, PageError> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    let mut targets = Vec::with_capacity(templates.len());

    for template in templates {
        let filename = naming::page_filename(&template.name);

        if let Some(first) = seen.insert(filename.clone(), &template.relative_path) {
            match policy {
                CollisionPolicy::Overwrite => tracing::debug!(
                    %filename,
                    overwritten = %first.display(),
                    by = %template.relative_path.display(),
                    "page filename collision, later template wins"
                ),
                CollisionPolicy::Error => {
                    return Err(PageError::NameCollision {
                        filename,
                        first: first.display().to_string(),
                        second: template.relative_path.display().to_string(),
                    });
                }
            }
        }

        let output_path = match anchor {
            PathAnchor::Relative => PathBuf::from(&filename),
            PathAnchor::Absolute => output_root.join(&filename),
        };

        targets.push(PageTarget {
            template: template.relative_path.clone(),
            filename,
            output_path,
            title: template.name.clone(),
        });
    }

    Ok(targets)
}
