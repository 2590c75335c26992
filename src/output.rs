//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, testable)
//! and a `print_*` wrapper that writes them to stdout. Every entity gets a
//! header line with a 3-digit positional index and indented context lines
//! underneath.
//!
//! ## `config`
//!
//! ```text
//! Mode: production
//!     Source maps: disabled
//!     Context: /site/src
//!     Output: /site/dist
//!
//! Entries
//! 001 app → ./js/index.js
//!     Filename: js/[name].[contenthash].js
//!
//! Pages
//! 001 about → /site/dist/about.html
//!     Source: views/about.pug
//!
//! Rules
//! 001 styles \.css$
//!     style-extract → css → resolve-url → postcss
//! 005 images \.(jpg|jpeg|png|gif|ico)$
//!     file-copy
//!     Filename: img/[name]-[hash:7].[ext]
//!
//! Plugins
//! 001 clean /site/dist
//! 002 page about.html
//! 003 copy img, fonts, assets
//! 004 extract-styles css/style.[contenthash].css
//! ```
//!
//! ## `check`
//!
//! ```text
//! Pages
//! 001 about → about.html
//!     Source: views/about.pug
//!
//! Found 1 page
//! ```

use crate::pages::PageTarget;
use crate::pipeline::BuildConfiguration;
use crate::plugins::{OutputPlugin, PluginKind};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn page_lines(pages: &[PageTarget]) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    if pages.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, page) in pages.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            page.title,
            page.output_path.display()
        ));
        lines.push(format!("{}Source: {}", indent(1), page.template.display()));
    }
    lines
}

fn plugin_detail(plugin: &OutputPlugin) -> String {
    match &plugin.kind {
        PluginKind::Clean { target } => target.display().to_string(),
        PluginKind::Page(page) => page.filename.clone(),
        PluginKind::Copy { patterns } => patterns
            .iter()
            .map(|p| p.from.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        PluginKind::ExtractStyles { filename } => filename.to_string(),
    }
}

/// Format the full build configuration.
pub fn format_configuration(build: &BuildConfiguration) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Mode: {}", build.mode()));
    let source_maps = if build.source_map().is_enabled() {
        "inline"
    } else {
        "disabled"
    };
    lines.push(format!("{}Source maps: {}", indent(1), source_maps));
    lines.push(format!("{}Context: {}", indent(1), build.context().display()));
    lines.push(format!("{}Output: {}", indent(1), build.output().path.display()));
    if let Some(public_path) = &build.output().public_path {
        lines.push(format!("{}Public path: {}", indent(1), public_path));
    }

    lines.push(String::new());
    lines.push("Entries".to_string());
    for (i, (name, path)) in build.entries().iter().enumerate() {
        lines.push(format!("{} {} → {}", format_index(i + 1), name, path));
        let filename = build
            .output()
            .filename
            .as_ref()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "(bundler default)".to_string());
        lines.push(format!("{}Filename: {}", indent(1), filename));
    }

    lines.push(String::new());
    lines.extend(page_lines(build.pages()));

    lines.push(String::new());
    lines.push("Rules".to_string());
    for (i, rule) in build.rules().iter().enumerate() {
        lines.push(format!(
            "{} {} {}",
            format_index(i + 1),
            rule.class,
            rule.matcher.pattern()
        ));
        lines.push(format!("{}{}", indent(1), rule.step_units().join(" → ")));
        if let Some(exclude) = &rule.exclude {
            lines.push(format!("{}Exclude: {}", indent(1), exclude));
        }
        if let Some(filename) = &rule.filename {
            let full = match &rule.output_path {
                Some(dir) => format!("{dir}/{filename}"),
                None => filename.to_string(),
            };
            lines.push(format!("{}Filename: {}", indent(1), full));
        }
    }

    lines.push(String::new());
    lines.push("Plugins".to_string());
    for (i, plugin) in build.plugins().iter().enumerate() {
        lines.push(format!(
            "{} {} {}",
            format_index(i + 1),
            plugin.name(),
            plugin_detail(plugin)
        ));
    }

    lines
}

/// Print the build configuration to stdout.
pub fn print_configuration(build: &BuildConfiguration) {
    for line in format_configuration(build) {
        println!("{}", line);
    }
}

/// Format the `check` command output.
pub fn format_check_output(pages: &[PageTarget]) -> Vec<String> {
    let mut lines = page_lines(pages);
    lines.push(String::new());
    lines.push(format!("Found {}", plural(pages.len(), "page")));
    lines
}

/// Print `check` output to stdout.
pub fn print_check_output(pages: &[PageTarget]) {
    for line in format_check_output(pages) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::mode::EnvOptions;
    use crate::pipeline::assemble;
    use crate::test_helpers::*;
    use std::path::PathBuf;

    fn page(name: &str) -> PageTarget {
        PageTarget {
            template: PathBuf::from(format!("views/{name}.pug")),
            filename: format!("{name}.html"),
            output_path: PathBuf::from(format!("{name}.html")),
            title: name.to_string(),
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn check_output_lists_pages_with_sources() {
        let lines = format_check_output(&[page("about"), page("home")]);
        assert_eq!(lines[0], "Pages");
        assert_eq!(lines[1], "001 about → about.html");
        assert_eq!(lines[2], "    Source: views/about.pug");
        assert_eq!(lines[3], "002 home → home.html");
        assert_eq!(lines.last().unwrap(), "Found 2 pages");
    }

    #[test]
    fn check_output_empty() {
        let lines = format_check_output(&[]);
        assert!(lines.contains(&"    (none)".to_string()));
        assert_eq!(lines.last().unwrap(), "Found 0 pages");
    }

    #[test]
    fn development_summary() {
        let tmp = setup_fixtures();
        let build =
            assemble(&EnvOptions::default(), tmp.path(), &PipelineConfig::default()).unwrap();
        let lines = format_configuration(&build);

        assert_eq!(lines[0], "Mode: development");
        assert!(lines.contains(&"    Source maps: inline".to_string()));
        assert!(lines.contains(&"    Public path: /".to_string()));
        assert!(lines.contains(&"    Filename: (bundler default)".to_string()));
        assert!(lines.contains(&"    style-inject → css → resolve-url → postcss".to_string()));
        assert!(lines.contains(&"    Filename: img/[name]-[hash:7].[ext]".to_string()));
        assert!(lines.contains(&"    Exclude: /node_modules".to_string()));
        assert!(!lines.iter().any(|l| l.contains("clean")));
    }

    #[test]
    fn production_summary_lists_plugins_in_order() {
        let tmp = setup_fixtures();
        let build =
            assemble(&EnvOptions::production(), tmp.path(), &PipelineConfig::default()).unwrap();
        let lines = format_configuration(&build);

        let start = lines.iter().position(|l| l == "Plugins").unwrap();
        let plugins = &lines[start + 1..];
        assert!(plugins[0].starts_with("001 clean "));
        assert_eq!(plugins[4], "005 copy img, fonts, assets");
        assert_eq!(plugins[5], "006 extract-styles css/style.[contenthash].css");
    }
}
