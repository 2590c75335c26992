//! Shared test utilities for the sitepipe test suite.
//!
//! The fixture project under `fixtures/site/` has three page templates
//! (`about`, `contact`, `index`), a script entry, styles in both dialects,
//! and one file in each static directory.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let build =
//!     assemble(&EnvOptions::production(), tmp.path(), &PipelineConfig::default()).unwrap();
//! assert_eq!(plugin_names(&build).first(), Some(&"clean"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::pipeline::BuildConfiguration;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can add files to without affecting other
/// tests or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Plugin names in list order.
pub fn plugin_names(build: &BuildConfiguration) -> Vec<&'static str> {
    build.plugins().iter().map(|p| p.name()).collect()
}

/// Page output filenames in list order.
pub fn page_filenames(build: &BuildConfiguration) -> Vec<&str> {
    build.pages().iter().map(|p| p.filename.as_str()).collect()
}
