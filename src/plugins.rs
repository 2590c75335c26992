//! Output plugins: units with filesystem or aggregation side effects.
//!
//! | Plugin | Active | Phase |
//! |--------|--------|-------|
//! | clean output dir | production | pre-build |
//! | page (one per template) | always | emit |
//! | copy static dirs | always | emit |
//! | extract styles | production | post-process |
//!
//! Plugins are registered into a [`PluginSet`], which drops the ones inactive
//! for the build mode and orders the rest by [`PluginPhase`]. Within a phase,
//! registration order is kept. Cleanup has to run before anything is written
//! and extraction consumes what the style steps produced, so the phase order
//! is part of the contract, not a presentation detail.

use crate::mode::BuildMode;
use crate::naming::FilenameTemplate;
use crate::pages::PageTarget;
use serde::Serialize;
use std::path::PathBuf;

/// When a plugin runs relative to asset processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginPhase {
    PreBuild,
    Emit,
    PostProcess,
}

/// Build modes a plugin is active in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    Always,
    ProductionOnly,
}

impl Activation {
    pub fn is_active(self, mode: BuildMode) -> bool {
        match self {
            Activation::Always => true,
            Activation::ProductionOnly => mode == BuildMode::Production,
        }
    }
}

/// A directory copied into the output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyPattern {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PluginKind {
    /// Empty the output directory before the build writes anything.
    Clean { target: PathBuf },
    /// Render one template to one HTML page.
    Page(PageTarget),
    /// Copy static directories. Missing source directories copy nothing.
    Copy { patterns: Vec<CopyPattern> },
    /// Collect style output handed off by the extract step into one file.
    ExtractStyles { filename: FilenameTemplate },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputPlugin {
    #[serde(flatten)]
    pub kind: PluginKind,
    pub activation: Activation,
}

impl OutputPlugin {
    pub fn clean(target: PathBuf) -> Self {
        Self {
            kind: PluginKind::Clean { target },
            activation: Activation::ProductionOnly,
        }
    }

    pub fn page(target: PageTarget) -> Self {
        Self {
            kind: PluginKind::Page(target),
            activation: Activation::Always,
        }
    }

    /// Copy each directory to the same-named directory under the output root.
    pub fn copy_dirs(dirs: &[String]) -> Self {
        let patterns = dirs
            .iter()
            .map(|d| CopyPattern {
                from: d.clone(),
                to: d.clone(),
            })
            .collect();
        Self {
            kind: PluginKind::Copy { patterns },
            activation: Activation::Always,
        }
    }

    pub fn extract_styles(filename: FilenameTemplate) -> Self {
        Self {
            kind: PluginKind::ExtractStyles { filename },
            activation: Activation::ProductionOnly,
        }
    }

    pub fn phase(&self) -> PluginPhase {
        match self.kind {
            PluginKind::Clean { .. } => PluginPhase::PreBuild,
            PluginKind::Page(_) | PluginKind::Copy { .. } => PluginPhase::Emit,
            PluginKind::ExtractStyles { .. } => PluginPhase::PostProcess,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            PluginKind::Clean { .. } => "clean",
            PluginKind::Page(_) => "page",
            PluginKind::Copy { .. } => "copy",
            PluginKind::ExtractStyles { .. } => "extract-styles",
        }
    }

    pub fn is_active(&self, mode: BuildMode) -> bool {
        self.activation.is_active(mode)
    }
}

/// Plugins registered for one build mode.
#[derive(Debug)]
pub struct PluginSet {
    mode: BuildMode,
    plugins: Vec<OutputPlugin>,
}

impl PluginSet {
    pub fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            plugins: Vec::new(),
        }
    }

    /// Register a plugin. Returns false (and keeps nothing) if it is inactive.
    pub fn register(&mut self, plugin: OutputPlugin) -> bool {
        if !plugin.is_active(self.mode) {
            tracing::debug!(plugin = plugin.name(), mode = %self.mode, "plugin inactive, skipped");
            return false;
        }
        tracing::debug!(plugin = plugin.name(), phase = ?plugin.phase(), "plugin registered");
        self.plugins.push(plugin);
        true
    }

    /// Active plugins, ordered by phase then registration order.
    pub fn into_ordered(mut self) -> Vec<OutputPlugin> {
        self.plugins.sort_by_key(OutputPlugin::phase);
        self.plugins
    }
}

/// True if phases never decrease along the list.
pub fn is_phase_ordered(plugins: &[OutputPlugin]) -> bool {
    plugins.windows(2).all(|w| w[0].phase() <= w[1].phase())
}
