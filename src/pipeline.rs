//! Pipeline assembly.
//!
//! Combines mode, paths, discovered pages, asset rules and output plugins into
//! one immutable [`BuildConfiguration`]. Assembly reads the views directory and
//! nothing else; it writes nothing. Any failure returns an error and no
//! configuration at all.
//!
//! ## Steps
//!
//! ```text
//! 1. resolve mode + directory paths
//! 2. discover templates            (missing views dir → AssemblyError::Discovery)
//! 3. one page target + page plugin per template
//! 4. copy plugin for static dirs   (always)
//! 5. clean plugin, extract plugin  (production only; clean runs first, extract last)
//! 6. entry output filename         (hashed in production, bundler default in development)
//! 7. freeze into BuildConfiguration
//! ```

use crate::config::{self, ConfigError, PipelineConfig};
use crate::discover::{self, DiscoveryError, TemplateFile};
use crate::mode::{BuildMode, EnvOptions, ModeParams, SourceMapPolicy, resolve_mode};
use crate::naming::{FilenameTemplate, NamingError};
use crate::pages::{self, PageError, PageTarget};
use crate::paths::DirectoryPaths;
use crate::plugins::{self, OutputPlugin, PluginKind, PluginSet};
use crate::rules::{self, AssetClass, AssetRule};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("Page error: {0}")]
    Page(#[from] PageError),
    #[error("Filename template error: {0}")]
    Naming(#[from] NamingError),
    #[error("Cannot resolve project root: {0}")]
    Paths(#[from] std::io::Error),
}

/// Where and under which names entry bundles are written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSettings {
    /// Absolute output root.
    pub path: PathBuf,
    /// Entry bundle filename; `None` leaves the bundler default.
    pub filename: Option<FilenameTemplate>,
    pub public_path: Option<String>,
}

/// Everything the build executor needs for one invocation.
///
/// Produced only by [`assemble`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildConfiguration {
    mode: BuildMode,
    /// Absolute source root; entries and templates are relative to it.
    context: PathBuf,
    entries: BTreeMap<String, String>,
    output: OutputSettings,
    rules: Vec<AssetRule>,
    plugins: Vec<OutputPlugin>,
    pages: Vec<PageTarget>,
    source_map: SourceMapPolicy,
}

impl BuildConfiguration {
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn context(&self) -> &Path {
        &self.context
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn output(&self) -> &OutputSettings {
        &self.output
    }

    pub fn rules(&self) -> &[AssetRule] {
        &self.rules
    }

    pub fn rule(&self, class: AssetClass) -> Option<&AssetRule> {
        self.rules.iter().find(|r| r.class == class)
    }

    pub fn plugins(&self) -> &[OutputPlugin] {
        &self.plugins
    }

    pub fn pages(&self) -> &[PageTarget] {
        &self.pages
    }

    pub fn source_map(&self) -> SourceMapPolicy {
        self.source_map
    }

    /// Cleanup before any emit, extraction after.
    pub fn plugin_order_is_valid(&self) -> bool {
        plugins::is_phase_ordered(&self.plugins)
    }

    /// Serialize for an external executor.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Load `pipeline.toml` from `project_root` and assemble.
pub fn assemble_project(
    env: &EnvOptions,
    project_root: &Path,
) -> Result<BuildConfiguration, AssemblyError> {
    let config = config::load_config(project_root)?;
    assemble(env, project_root, &config)
}

/// Assemble the build configuration for one invocation.
pub fn assemble(
    env: &EnvOptions,
    project_root: &Path,
    config: &PipelineConfig,
) -> Result<BuildConfiguration, AssemblyError> {
    let mode = resolve_mode(env).mode;
    let profile = ModeParams::from_config(config).resolve(mode);
    let paths = DirectoryPaths::resolve(project_root, &config.paths)?;

    let templates = discover::discover_templates(&paths, &config.views)?;
    let pages = pages::build_page_targets(
        &templates,
        profile.page_paths,
        &paths.output,
        config.views.on_collision,
    )?;

    let rules = rules::compose_rules(&profile, config)?;
    let plugins = register_plugins(mode, &paths, config, &pages)?;

    let filename = profile
        .script_filename
        .as_deref()
        .map(FilenameTemplate::parse)
        .transpose()?;

    let build = BuildConfiguration {
        mode,
        context: paths.source.clone(),
        entries: config.entries.clone(),
        output: OutputSettings {
            path: paths.output.clone(),
            filename,
            public_path: profile.public_path.clone(),
        },
        rules,
        plugins,
        pages,
        source_map: profile.source_map,
    };

    tracing::info!(
        mode = %build.mode,
        pages = build.pages.len(),
        rules = build.rules.len(),
        plugins = build.plugins.len(),
        "build configuration assembled"
    );
    Ok(build)
}

fn register_plugins(
    mode: BuildMode,
    paths: &DirectoryPaths,
    config: &PipelineConfig,
    pages: &[PageTarget],
) -> Result<Vec<OutputPlugin>, NamingError> {
    let mut set = PluginSet::new(mode);
    for page in pages {
        set.register(OutputPlugin::page(page.clone()));
    }
    set.register(OutputPlugin::copy_dirs(&config.copy.dirs));
    set.register(OutputPlugin::clean(paths.output.clone()));
    set.register(OutputPlugin::extract_styles(FilenameTemplate::parse(
        &config.styles.extract_filename,
    )?));
    Ok(set.into_ordered())
}

/// Page templates only, without assembling the rest. Used by `check`.
pub fn discover_pages(
    env: &EnvOptions,
    project_root: &Path,
    config: &PipelineConfig,
) -> Result<(Vec<TemplateFile>, Vec<PageTarget>), AssemblyError> {
    let mode = resolve_mode(env).mode;
    let profile = ModeParams::from_config(config).resolve(mode);
    let paths = DirectoryPaths::resolve(project_root, &config.paths)?;
    let templates = discover::discover_templates(&paths, &config.views)?;
    let pages = pages::build_page_targets(
        &templates,
        profile.page_paths,
        &paths.output,
        config.views.on_collision,
    )?;
    Ok((templates, pages))
}

/// Page plugins in a configuration, in order.
pub fn page_plugins(build: &BuildConfiguration) -> impl Iterator<Item = &PageTarget> {
    build.plugins.iter().filter_map(|p| match &p.kind {
        PluginKind::Page(target) => Some(target),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollisionPolicy;
    use crate::rules::{STYLE_EXTRACT, STYLE_INJECT};
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn development_configuration() {
        let tmp = setup_fixtures();
        let build =
            assemble(&EnvOptions::default(), tmp.path(), &PipelineConfig::default()).unwrap();

        assert_eq!(build.mode(), BuildMode::Development);
        assert_eq!(build.source_map(), SourceMapPolicy::Inline);
        assert_eq!(build.output().filename, None);
        assert_eq!(build.output().public_path.as_deref(), Some("/"));
        assert_eq!(plugin_names(&build), vec!["page", "page", "page", "copy"]);
    }

    #[test]
    fn production_configuration() {
        let tmp = setup_fixtures();
        let build =
            assemble(&EnvOptions::production(), tmp.path(), &PipelineConfig::default()).unwrap();

        assert_eq!(build.mode(), BuildMode::Production);
        assert_eq!(build.source_map(), SourceMapPolicy::Disabled);
        assert_eq!(
            build.output().filename.as_ref().map(|f| f.to_string()).as_deref(),
            Some("js/[name].[contenthash].js")
        );
        assert_eq!(build.output().public_path, None);
        assert_eq!(
            plugin_names(&build),
            vec!["clean", "page", "page", "page", "copy", "extract-styles"]
        );
        assert!(build.plugin_order_is_valid());
    }

    #[test]
    fn fixture_pages_in_name_order() {
        let tmp = setup_fixtures();
        let build =
            assemble(&EnvOptions::default(), tmp.path(), &PipelineConfig::default()).unwrap();
        assert_eq!(page_filenames(&build), vec!["about.html", "contact.html", "index.html"]);
        let from_plugins: Vec<&str> = page_plugins(&build).map(|p| p.filename.as_str()).collect();
        assert_eq!(from_plugins, page_filenames(&build));
    }

    #[test]
    fn production_pages_are_absolute() {
        let tmp = setup_fixtures();
        let build =
            assemble(&EnvOptions::production(), tmp.path(), &PipelineConfig::default()).unwrap();
        for page in build.pages() {
            assert!(page.output_path.is_absolute());
            assert!(page.output_path.starts_with(&build.output().path));
        }
    }

    #[test]
    fn style_delivery_follows_mode() {
        let tmp = setup_fixtures();
        let dev = assemble(&EnvOptions::default(), tmp.path(), &PipelineConfig::default()).unwrap();
        let prod =
            assemble(&EnvOptions::production(), tmp.path(), &PipelineConfig::default()).unwrap();
        let first =
            |b: &BuildConfiguration| b.rule(AssetClass::Style).unwrap().steps[0].unit.clone();
        assert_eq!(first(&dev), STYLE_INJECT);
        assert_eq!(first(&prod), STYLE_EXTRACT);
    }

    #[test]
    fn unknown_mode_builds_development() {
        let tmp = setup_fixtures();
        let env = EnvOptions {
            mode: Some("prod".to_string()),
        };
        let build = assemble(&env, tmp.path(), &PipelineConfig::default()).unwrap();
        assert_eq!(build.mode(), BuildMode::Development);
    }

    #[test]
    fn missing_views_dir_aborts() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src/js")).unwrap();
        let result = assemble(&EnvOptions::production(), tmp.path(), &PipelineConfig::default());
        assert!(matches!(
            result,
            Err(AssemblyError::Discovery(DiscoveryError::DirectoryNotFound(_)))
        ));
    }

    #[test]
    fn collision_error_policy_aborts() {
        let tmp = setup_fixtures();
        fs::create_dir_all(tmp.path().join("src/views/blog")).unwrap();
        fs::write(tmp.path().join("src/views/blog/index.pug"), "h1 Blog").unwrap();

        let mut config = PipelineConfig::default();
        config.views.recursive = true;
        config.views.on_collision = CollisionPolicy::Error;

        let result = assemble(&EnvOptions::default(), tmp.path(), &config);
        assert!(matches!(
            result,
            Err(AssemblyError::Page(PageError::NameCollision { .. }))
        ));
    }

    #[test]
    fn assemble_project_reads_pipeline_toml() {
        let tmp = setup_fixtures();
        fs::write(
            tmp.path().join(config::CONFIG_FILENAME),
            "[copy]\ndirs = [\"static\"]\n",
        )
        .unwrap();
        let build = assemble_project(&EnvOptions::default(), tmp.path()).unwrap();
        let copy = build
            .plugins()
            .iter()
            .find_map(|p| match &p.kind {
                PluginKind::Copy { patterns } => Some(patterns),
                _ => None,
            })
            .unwrap();
        assert_eq!(copy.len(), 1);
        assert_eq!(copy[0].from, "static");
    }

    #[test]
    fn json_contains_executor_fields() {
        let tmp = setup_fixtures();
        let build =
            assemble(&EnvOptions::production(), tmp.path(), &PipelineConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&build.to_json().unwrap()).unwrap();
        assert_eq!(value["mode"], "production");
        assert_eq!(value["source_map"], "disabled");
        assert_eq!(value["entries"]["app"], "./js/index.js");
        assert_eq!(value["output"]["filename"], "js/[name].[contenthash].js");
        assert_eq!(value["plugins"][0]["kind"], "clean");
    }

    #[test]
    fn discover_pages_matches_assembly() {
        let tmp = setup_fixtures();
        let config = PipelineConfig::default();
        let (templates, pages) =
            discover_pages(&EnvOptions::default(), tmp.path(), &config).unwrap();
        let build = assemble(&EnvOptions::default(), tmp.path(), &config).unwrap();
        assert_eq!(templates.len(), 3);
        assert_eq!(pages, build.pages());
    }
}
