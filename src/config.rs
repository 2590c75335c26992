//! Project configuration module.
//!
//! Handles loading, validating, and merging `pipeline.toml`. The file is
//! optional and sparse: stock defaults are serialized to a TOML table, the
//! user file is merged on top key-by-key, and the result is deserialized with
//! unknown keys rejected. `[entries]` is the exception: a user table replaces
//! the stock one, so a project can drop the default `app` entry.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── pipeline.toml      # optional, overrides stock defaults
//! ├── src/
//! │   ├── views/         # page templates, one page per file
//! │   ├── js/index.js    # script entry
//! │   ├── img/ fonts/ assets/
//! └── dist/              # output root
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! source = "src"
//! output = "dist"
//!
//! [views]
//! dir = "views"             # relative to paths.source
//! extension = "pug"         # template extension, without the dot
//! recursive = false         # descend into nested view directories
//! on_collision = "overwrite" # or "error"
//!
//! [entries]                 # replaces the stock table when present
//! app = "./js/index.js"
//!
//! [scripts]
//! exclude = "/node_modules"
//! filename = "js/[name].[contenthash].js"   # production only
//!
//! [styles]
//! source_maps = true
//! postcss_config = "postcss.config.js"
//! extract_filename = "css/style.[contenthash].css"  # production only
//!
//! [images]
//! output_path = "img"
//! filename = "[name]-[hash:7].[ext]"
//!
//! [fonts]
//! output_path = "fonts"
//! filename = "[name].[ext]"
//!
//! [copy]
//! dirs = ["img", "fonts", "assets"]
//!
//! [output]
//! dev_public_path = "/"
//! ```
//!
//! The build mode is not configured here; it comes from the invoking command.

use crate::naming::{FilenameTemplate, NamingError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the project configuration file.
pub const CONFIG_FILENAME: &str = "pipeline.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid filename template in {field}: {source}")]
    Template {
        field: &'static str,
        #[source]
        source: NamingError,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `pipeline.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub views: ViewsConfig,
    /// Entry name → script path relative to the source root.
    pub entries: BTreeMap<String, String>,
    pub scripts: ScriptsConfig,
    pub styles: StylesConfig,
    pub images: FileRuleConfig,
    pub fonts: FileRuleConfig,
    pub copy: CopyConfig,
    pub output: OutputConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            views: ViewsConfig::default(),
            entries: BTreeMap::from([("app".to_string(), "./js/index.js".to_string())]),
            scripts: ScriptsConfig::default(),
            styles: StylesConfig::default(),
            images: FileRuleConfig::images(),
            fonts: FileRuleConfig::fonts(),
            copy: CopyConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate values that serde alone cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.views.extension;
        if ext.is_empty() {
            return Err(ConfigError::Validation(
                "views.extension must not be empty".into(),
            ));
        }
        if ext.contains(['.', '/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "views.extension must be a bare extension like \"pug\", got {ext:?}"
            )));
        }
        if self.entries.is_empty() {
            return Err(ConfigError::Validation(
                "entries must name at least one script entry".into(),
            ));
        }

        let script = parse_template("scripts.filename", &self.scripts.filename)?;
        if !script.has_name() {
            return Err(ConfigError::Validation(
                "scripts.filename must contain [name] so entries do not overwrite each other"
                    .into(),
            ));
        }
        parse_template("styles.extract_filename", &self.styles.extract_filename)?;
        parse_template("images.filename", &self.images.filename)?;
        parse_template("fonts.filename", &self.fonts.filename)?;
        Ok(())
    }
}

fn parse_template(field: &'static str, raw: &str) -> Result<FilenameTemplate, ConfigError> {
    FilenameTemplate::parse(raw).map_err(|source| ConfigError::Template { field, source })
}

/// Source and output roots, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub source: String,
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".to_string(),
            output: "dist".to_string(),
        }
    }
}

/// What to do when two templates map to the same output filename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep both targets; the later one overwrites the earlier on emit.
    #[default]
    Overwrite,
    /// Fail assembly.
    Error,
}

/// Page template discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewsConfig {
    /// Views directory, relative to the source root.
    pub dir: String,
    /// Template extension without the leading dot.
    pub extension: String,
    pub recursive: bool,
    pub on_collision: CollisionPolicy,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            dir: "views".to_string(),
            extension: "pug".to_string(),
            recursive: false,
            on_collision: CollisionPolicy::Overwrite,
        }
    }
}

/// Script rule settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Path pattern excluded from transpilation.
    pub exclude: String,
    /// Entry output filename used in production.
    pub filename: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            exclude: "/node_modules".to_string(),
            filename: "js/[name].[contenthash].js".to_string(),
        }
    }
}

/// Style rule settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesConfig {
    /// `sourceMap` option passed to the css, postcss and sass steps.
    pub source_maps: bool,
    pub postcss_config: String,
    /// Stylesheet filename written by the extraction plugin (production).
    pub extract_filename: String,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            source_maps: true,
            postcss_config: "postcss.config.js".to_string(),
            extract_filename: "css/style.[contenthash].css".to_string(),
        }
    }
}

/// Copy-with-rename rule settings (images, fonts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileRuleConfig {
    pub output_path: String,
    pub filename: String,
}

impl FileRuleConfig {
    pub fn images() -> Self {
        Self {
            output_path: "img".to_string(),
            filename: "[name]-[hash:7].[ext]".to_string(),
        }
    }

    pub fn fonts() -> Self {
        Self {
            output_path: "fonts".to_string(),
            filename: "[name].[ext]".to_string(),
        }
    }
}

/// Static directories copied verbatim into the output root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyConfig {
    pub dirs: Vec<String>,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            dirs: vec!["img".into(), "fonts".into(), "assets".into()],
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Public path used in development. Production leaves it unset.
    pub dev_public_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dev_public_path: "/".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// The stock configuration: defaults for every section, one `app` entry.
pub fn stock_config() -> PipelineConfig {
    PipelineConfig::default()
}

/// Returns the stock config as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(stock_config())
        .map_err(|e| ConfigError::Validation(format!("stock config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `pipeline.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PipelineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(without_replaced_tables(base, &ov), ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Top-level tables that a user file replaces wholesale instead of merging.
const REPLACED_TABLES: &[&str] = &["entries"];

/// Drop replaced tables from `base` when `overlay` defines them.
fn without_replaced_tables(mut base: toml::Value, overlay: &toml::Value) -> toml::Value {
    if let (Some(base_table), Some(overlay_table)) = (base.as_table_mut(), overlay.as_table()) {
        for key in REPLACED_TABLES {
            if overlay_table.contains_key(*key) {
                base_table.remove(*key);
            }
        }
    }
    base
}

/// Load the project config from `pipeline.toml` under `project_root`.
///
/// A missing file yields the stock config.
pub fn load_config(project_root: &Path) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(project_root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `pipeline.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sitepipe configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys are an error.
#
# The build mode is not set here: pass --mode development|production.

# ---------------------------------------------------------------------------
# Project layout, relative to the directory holding this file
# ---------------------------------------------------------------------------
[paths]
source = "src"
output = "dist"

# ---------------------------------------------------------------------------
# Page templates: every file with this extension becomes <name>.html
# ---------------------------------------------------------------------------
[views]
dir = "views"
extension = "pug"
# Descend into nested directories. Pages are still named after the file
# stem, so views/blog/index.pug and views/index.pug both become index.html.
recursive = false
# "overwrite": the later template (by path) silently wins.
# "error": refuse to build.
on_collision = "overwrite"

# ---------------------------------------------------------------------------
# Script entries: name = path relative to paths.source
# A user [entries] table replaces this one instead of adding to it.
# ---------------------------------------------------------------------------
[entries]
app = "./js/index.js"

[scripts]
exclude = "/node_modules"
# Production only. Development uses the bundler's default name.
filename = "js/[name].[contenthash].js"

# ---------------------------------------------------------------------------
# Styles (.css, .scss, .sass)
# ---------------------------------------------------------------------------
[styles]
source_maps = true
postcss_config = "postcss.config.js"
# Production only. Development injects styles into the page instead.
extract_filename = "css/style.[contenthash].css"

# ---------------------------------------------------------------------------
# Referenced files. Placeholders: [name] [ext] [contenthash] [hash:N]
# ---------------------------------------------------------------------------
[images]
output_path = "img"
filename = "[name]-[hash:7].[ext]"

[fonts]
output_path = "fonts"
filename = "[name].[ext]"

# ---------------------------------------------------------------------------
# Directories under paths.source copied as-is. Missing ones are skipped.
# ---------------------------------------------------------------------------
[copy]
dirs = ["img", "fonts", "assets"]

[output]
dev_public_path = "/"
"##
}
