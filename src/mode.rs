//! Build mode resolution.
//!
//! A build is either `development` or `production`, chosen once from the
//! environment descriptor handed over by the invoking command. Everything that
//! differs between the two modes is listed in [`ModeParams`] as a
//! [`ModeValue`] pair, and resolved exactly once into a [`ModeProfile`].
//! Downstream composers read the profile; they never look at the mode again.
//!
//! ## Knob table
//!
//! | Knob | development | production |
//! |------|-------------|------------|
//! | source maps | inline | off |
//! | style delivery | injected `<style>` | extracted file |
//! | script filename | bundler default | `js/[name].[contenthash].js` |
//! | public path | `/` | unset |
//! | page output path | relative to output root | absolute |
//!
//! Output plugins that only run in production (cleanup, style extraction)
//! declare that through [`crate::plugins::Activation`].
//!
//! Unknown mode values fall back to development with a warning. This tool is
//! meant for local iteration first, so availability wins over strictness.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Development or production build variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by `BuildMode::from_str` for anything but the two exact names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown build mode {0:?}")]
pub struct UnknownMode(pub String);

impl FromStr for BuildMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(BuildMode::Development),
            "production" => Ok(BuildMode::Production),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// Environment descriptor supplied by the invoking build command.
#[derive(Debug, Clone, Default)]
pub struct EnvOptions {
    /// `"development"` or `"production"`. Absent means development.
    pub mode: Option<String>,
}

impl EnvOptions {
    pub fn development() -> Self {
        Self {
            mode: Some("development".to_string()),
        }
    }

    pub fn production() -> Self {
        Self {
            mode: Some("production".to_string()),
        }
    }
}

/// Outcome of mode resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeResolution {
    pub mode: BuildMode,
    /// True when a mode value was given but not recognized.
    pub ambiguous: bool,
}

/// Resolve the build mode from an environment descriptor.
///
/// Pure: no I/O, never fails. An unrecognized value resolves to development
/// and is reported through `ambiguous` (and a warning).
pub fn resolve_mode(env: &EnvOptions) -> ModeResolution {
    match env.mode.as_deref() {
        None => ModeResolution {
            mode: BuildMode::Development,
            ambiguous: false,
        },
        Some(raw) => match raw.parse::<BuildMode>() {
            Ok(mode) => ModeResolution {
                mode,
                ambiguous: false,
            },
            Err(UnknownMode(value)) => {
                tracing::warn!(%value, "unrecognized build mode, using development");
                ModeResolution {
                    mode: BuildMode::Development,
                    ambiguous: true,
                }
            }
        },
    }
}

/// A knob with one value per build mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeValue<T> {
    pub dev: T,
    pub prod: T,
}

impl<T: Clone> ModeValue<T> {
    pub fn new(dev: T, prod: T) -> Self {
        Self { dev, prod }
    }

    pub fn pick(&self, mode: BuildMode) -> T {
        match mode {
            BuildMode::Development => self.dev.clone(),
            BuildMode::Production => self.prod.clone(),
        }
    }
}

/// Source map emission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMapPolicy {
    /// Source maps embedded in the emitted bundle.
    Inline,
    Disabled,
}

impl SourceMapPolicy {
    pub fn is_enabled(self) -> bool {
        matches!(self, SourceMapPolicy::Inline)
    }
}

/// How style output reaches the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleDelivery {
    /// Injected as an in-memory `<style>` tag.
    Inject,
    /// Collected for extraction into a standalone stylesheet.
    Extract,
}

/// Whether a path is written relative to the output root or as an absolute path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathAnchor {
    Relative,
    Absolute,
}

/// Every mode-dependent knob, as dev/prod pairs.
///
/// Filename templates and the public path come from project config, so the
/// table is built from a [`crate::config::PipelineConfig`].
#[derive(Debug, Clone)]
pub struct ModeParams {
    pub source_map: ModeValue<SourceMapPolicy>,
    pub style_delivery: ModeValue<StyleDelivery>,
    pub script_filename: ModeValue<Option<String>>,
    pub public_path: ModeValue<Option<String>>,
    pub page_paths: ModeValue<PathAnchor>,
}

impl ModeParams {
    pub fn from_config(config: &crate::config::PipelineConfig) -> Self {
        Self {
            source_map: ModeValue::new(SourceMapPolicy::Inline, SourceMapPolicy::Disabled),
            style_delivery: ModeValue::new(StyleDelivery::Inject, StyleDelivery::Extract),
            script_filename: ModeValue::new(None, Some(config.scripts.filename.clone())),
            public_path: ModeValue::new(Some(config.output.dev_public_path.clone()), None),
            page_paths: ModeValue::new(PathAnchor::Relative, PathAnchor::Absolute),
        }
    }

    /// Collapse the table for one mode.
    pub fn resolve(&self, mode: BuildMode) -> ModeProfile {
        ModeProfile {
            mode,
            source_map: self.source_map.pick(mode),
            style_delivery: self.style_delivery.pick(mode),
            script_filename: self.script_filename.pick(mode),
            public_path: self.public_path.pick(mode),
            page_paths: self.page_paths.pick(mode),
        }
    }
}

/// The knob table resolved for a single build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeProfile {
    pub mode: BuildMode,
    pub source_map: SourceMapPolicy,
    pub style_delivery: StyleDelivery,
    pub script_filename: Option<String>,
    pub public_path: Option<String>,
    pub page_paths: PathAnchor,
}
