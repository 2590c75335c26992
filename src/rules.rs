//! Per-asset-class transformation rules.
//!
//! Each [`AssetRule`] pairs an extension matcher with an ordered chain of
//! [`TransformStep`]s. Steps are opaque: a step is a unit name plus an option
//! bag, and what the unit does is up to whatever the executor registers under
//! that name (see [`crate::units`]).
//!
//! ## Rule table
//!
//! | Class | Matches | Steps |
//! |-------|---------|-------|
//! | script | `.js` | transpile (excludes `/node_modules`) |
//! | markup | `.pug` | template compile |
//! | style | `.css` | *delivery*, css, resolve-url, postcss |
//! | precompiled style | `.scss` `.sass` | *delivery*, css, resolve-url, postcss, sass |
//! | image | `.jpg` `.jpeg` `.png` `.gif` `.ico` | file copy as `img/[name]-[hash:7].[ext]` |
//! | font | `.ttf` `.otf` `.eot` `.woff` `.woff2` | file copy as `fonts/[name].[ext]` |
//!
//! Steps are listed outermost first: the chain runs from the last step to the
//! first, so for `.scss` the sass step compiles and the *delivery* step
//! receives the final CSS.
//!
//! ## Mode
//!
//! The *delivery* step is the only place the mode shows up in any rule:
//! development injects a `<style>` tag, production hands the output to the
//! extraction plugin. It is chosen in [`style_delivery_step`]; everything
//! else here is mode-agnostic.

use crate::config::{FileRuleConfig, PipelineConfig, StylesConfig};
use crate::mode::{ModeProfile, StyleDelivery};
use crate::naming::{FilenameTemplate, NamingError};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub const SCRIPT_TRANSPILE: &str = "script-transpile";
pub const TEMPLATE_COMPILE: &str = "template-compile";
pub const STYLE_INJECT: &str = "style-inject";
pub const STYLE_EXTRACT: &str = "style-extract";
pub const CSS: &str = "css";
pub const RESOLVE_URL: &str = "resolve-url";
pub const POSTCSS: &str = "postcss";
pub const SASS_COMPILE: &str = "sass-compile";
pub const FILE_COPY: &str = "file-copy";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "ico"];
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "eot", "woff", "woff2"];

/// Asset classes with their own rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetClass {
    Script,
    Markup,
    Style,
    PrecompiledStyle,
    Image,
    Font,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetClass::Script => "scripts",
            AssetClass::Markup => "markup",
            AssetClass::Style => "styles",
            AssetClass::PrecompiledStyle => "precompiled styles",
            AssetClass::Image => "images",
            AssetClass::Font => "fonts",
        };
        f.write_str(s)
    }
}

/// Case-sensitive file extension matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Matcher {
    extensions: Vec<String>,
}

impl Matcher {
    pub fn extensions<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: exts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|x| x == ext))
    }

    /// Regex-style rendering for display, e.g. `\.(scss|sass)$`.
    pub fn pattern(&self) -> String {
        match self.extensions.as_slice() {
            [single] => format!(r"\.{single}$"),
            many => format!(r"\.({})$", many.join("|")),
        }
    }
}

/// One opaque processing unit in a rule's chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformStep {
    pub unit: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
}

impl TransformStep {
    pub fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }
}

/// How files matching one asset class are processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRule {
    pub class: AssetClass,
    pub matcher: Matcher,
    /// Paths containing this substring are left alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    pub steps: Vec<TransformStep>,
    /// Directory under the output root for emitted files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<FilenameTemplate>,
}

impl AssetRule {
    fn new(class: AssetClass, matcher: Matcher, steps: Vec<TransformStep>) -> Self {
        Self {
            class,
            matcher,
            exclude: None,
            steps,
            output_path: None,
            filename: None,
        }
    }

    /// True if this rule processes `path`.
    pub fn applies_to(&self, path: &Path) -> bool {
        if let Some(exclude) = &self.exclude
            && path.to_string_lossy().contains(exclude.as_str())
        {
            return false;
        }
        self.matcher.matches(path)
    }

    pub fn step_units(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.unit.as_str()).collect()
    }
}

/// Build every rule for one build, in a fixed order.
pub fn compose_rules(
    profile: &ModeProfile,
    config: &PipelineConfig,
) -> Result<Vec<AssetRule>, NamingError> {
    Ok(vec![
        script_rule(config),
        markup_rule(&config.views.extension),
        style_rule(profile, &config.styles),
        precompiled_style_rule(profile, &config.styles),
        file_rule(AssetClass::Image, IMAGE_EXTENSIONS, &config.images)?,
        file_rule(AssetClass::Font, FONT_EXTENSIONS, &config.fonts)?,
    ])
}

fn script_rule(config: &PipelineConfig) -> AssetRule {
    let mut rule = AssetRule::new(
        AssetClass::Script,
        Matcher::extensions(["js"]),
        vec![TransformStep::new(SCRIPT_TRANSPILE)],
    );
    rule.exclude = Some(config.scripts.exclude.clone());
    rule
}

fn markup_rule(extension: &str) -> AssetRule {
    AssetRule::new(
        AssetClass::Markup,
        Matcher::extensions([extension]),
        vec![TransformStep::new(TEMPLATE_COMPILE)],
    )
}

/// First step of every style chain: inject in place or hand off for extraction.
pub fn style_delivery_step(profile: &ModeProfile) -> TransformStep {
    match profile.style_delivery {
        StyleDelivery::Inject => TransformStep::new(STYLE_INJECT),
        StyleDelivery::Extract => TransformStep::new(STYLE_EXTRACT),
    }
}

fn style_chain(profile: &ModeProfile, styles: &StylesConfig) -> Vec<TransformStep> {
    vec![
        style_delivery_step(profile),
        TransformStep::new(CSS).with_option("sourceMap", json!(styles.source_maps)),
        TransformStep::new(RESOLVE_URL),
        TransformStep::new(POSTCSS)
            .with_option("sourceMap", json!(styles.source_maps))
            .with_option("config", json!({ "path": styles.postcss_config })),
    ]
}

fn style_rule(profile: &ModeProfile, styles: &StylesConfig) -> AssetRule {
    AssetRule::new(
        AssetClass::Style,
        Matcher::extensions(["css"]),
        style_chain(profile, styles),
    )
}

fn precompiled_style_rule(profile: &ModeProfile, styles: &StylesConfig) -> AssetRule {
    let mut steps = style_chain(profile, styles);
    steps.push(
        TransformStep::new(SASS_COMPILE).with_option("sourceMap", json!(styles.source_maps)),
    );
    AssetRule::new(
        AssetClass::PrecompiledStyle,
        Matcher::extensions(["scss", "sass"]),
        steps,
    )
}

fn file_rule(
    class: AssetClass,
    extensions: &[&str],
    settings: &FileRuleConfig,
) -> Result<AssetRule, NamingError> {
    let filename = FilenameTemplate::parse(&settings.filename)?;
    let mut rule = AssetRule::new(
        class,
        Matcher::extensions(extensions.iter().copied()),
        vec![TransformStep::new(FILE_COPY)
            .with_option("outputPath", json!(settings.output_path))
            .with_option("name", json!(filename.to_string()))],
    );
    rule.output_path = Some(settings.output_path.clone());
    rule.filename = Some(filename);
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{BuildMode, ModeParams};

    fn rules_for(mode: BuildMode) -> Vec<AssetRule> {
        let config = PipelineConfig::default();
        let profile = ModeParams::from_config(&config).resolve(mode);
        compose_rules(&profile, &config).unwrap()
    }

    fn rule(rules: &[AssetRule], class: AssetClass) -> &AssetRule {
        rules.iter().find(|r| r.class == class).unwrap()
    }

    #[test]
    fn rule_order_is_fixed() {
        let classes: Vec<AssetClass> = rules_for(BuildMode::Production)
            .iter()
            .map(|r| r.class)
            .collect();
        assert_eq!(
            classes,
            vec![
                AssetClass::Script,
                AssetClass::Markup,
                AssetClass::Style,
                AssetClass::PrecompiledStyle,
                AssetClass::Image,
                AssetClass::Font,
            ]
        );
    }

    #[test]
    fn style_chains_differ_only_in_first_step() {
        let dev = rules_for(BuildMode::Development);
        let prod = rules_for(BuildMode::Production);

        for class in [AssetClass::Style, AssetClass::PrecompiledStyle] {
            let d = &rule(&dev, class).steps;
            let p = &rule(&prod, class).steps;
            assert_eq!(d.len(), p.len());
            assert_eq!(d[0].unit, STYLE_INJECT);
            assert_eq!(p[0].unit, STYLE_EXTRACT);
            assert_eq!(d[1..], p[1..]);
        }
    }

    #[test]
    fn non_style_rules_are_mode_agnostic() {
        let dev = rules_for(BuildMode::Development);
        let prod = rules_for(BuildMode::Production);
        for class in [
            AssetClass::Script,
            AssetClass::Markup,
            AssetClass::Image,
            AssetClass::Font,
        ] {
            assert_eq!(rule(&dev, class), rule(&prod, class));
        }
    }

    #[test]
    fn sass_step_only_on_precompiled_dialect() {
        let rules = rules_for(BuildMode::Development);
        assert_eq!(
            rule(&rules, AssetClass::Style).step_units(),
            vec![STYLE_INJECT, CSS, RESOLVE_URL, POSTCSS]
        );
        assert_eq!(
            rule(&rules, AssetClass::PrecompiledStyle).step_units(),
            vec![STYLE_INJECT, CSS, RESOLVE_URL, POSTCSS, SASS_COMPILE]
        );
    }

    #[test]
    fn style_options_carry_source_maps_and_postcss_config() {
        let rules = rules_for(BuildMode::Production);
        let steps = &rule(&rules, AssetClass::Style).steps;
        assert_eq!(steps[1].options["sourceMap"], json!(true));
        assert_eq!(
            steps[3].options["config"],
            json!({ "path": "postcss.config.js" })
        );
    }

    #[test]
    fn script_rule_excludes_dependencies() {
        let rules = rules_for(BuildMode::Development);
        let script = rule(&rules, AssetClass::Script);
        assert!(script.applies_to(Path::new("src/js/index.js")));
        assert!(!script.applies_to(Path::new("/proj/node_modules/lodash/index.js")));
        assert!(!script.applies_to(Path::new("src/js/index.ts")));
    }

    #[test]
    fn image_filename_always_hashed() {
        for mode in [BuildMode::Development, BuildMode::Production] {
            let rules = rules_for(mode);
            let image = rule(&rules, AssetClass::Image);
            let filename = image.filename.as_ref().unwrap();
            assert_eq!(filename.hash_lengths(), vec![7]);
            assert_eq!(image.output_path.as_deref(), Some("img"));
        }
    }

    #[test]
    fn font_filename_not_hashed() {
        let rules = rules_for(BuildMode::Production);
        let font = rule(&rules, AssetClass::Font);
        assert!(!font.filename.as_ref().unwrap().is_hashed());
        assert_eq!(font.output_path.as_deref(), Some("fonts"));
        assert!(font.applies_to(Path::new("fonts/inter.woff2")));
    }

    #[test]
    fn matcher_is_case_sensitive() {
        let m = Matcher::extensions(["png"]);
        assert!(m.matches(Path::new("a.png")));
        assert!(!m.matches(Path::new("a.PNG")));
    }

    #[test]
    fn matcher_pattern_rendering() {
        assert_eq!(Matcher::extensions(["css"]).pattern(), r"\.css$");
        assert_eq!(
            Matcher::extensions(["scss", "sass"]).pattern(),
            r"\.(scss|sass)$"
        );
    }

    #[test]
    fn markup_rule_follows_configured_extension() {
        let mut config = PipelineConfig::default();
        config.views.extension = "njk".to_string();
        let profile = ModeParams::from_config(&config).resolve(BuildMode::Development);
        let rules = compose_rules(&profile, &config).unwrap();
        assert!(rule(&rules, AssetClass::Markup).applies_to(Path::new("views/home.njk")));
    }
}
