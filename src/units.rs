//! Transformation unit registry.
//!
//! The pipeline never implements a transformation itself. A rule's steps
//! name units (`"css"`, `"sass-compile"`, ...) and the executor registers an
//! implementation of [`TransformUnit`] under each name. This module resolves
//! names to implementations and runs a rule's chain.
//!
//! ## Chain order
//!
//! Steps are listed outermost first and executed last to first. For the
//! precompiled-style rule `[style-extract, css, resolve-url, postcss, sass-compile]`
//! the source goes through `sass-compile` first and `style-extract` last.

use crate::rules::{AssetRule, TransformStep};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnitError {
    #[error("No transformation unit registered as {0:?}")]
    UnknownUnit(String),
    #[error("{rule} rule does not apply to {path}")]
    NotMatched { rule: String, path: PathBuf },
    #[error("Unit {unit:?} failed: {message}")]
    Failed { unit: String, message: String },
}

/// A file moving through a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Asset {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// An opaque processing unit supplied by the executor.
pub trait TransformUnit: Send + Sync {
    fn apply(&self, input: Asset, options: &BTreeMap<String, Value>) -> Result<Asset, UnitError>;
}

/// Named unit implementations.
#[derive(Default)]
pub struct UnitRegistry {
    units: HashMap<String, Box<dyn TransformUnit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `unit` under `name`, replacing any earlier registration.
    pub fn register(&mut self, name: &str, unit: Box<dyn TransformUnit>) {
        self.units.insert(name.to_string(), unit);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Look up every step of a rule, in listed order.
    pub fn resolve_rule<'a>(
        &'a self,
        rule: &'a AssetRule,
    ) -> Result<Vec<(&'a TransformStep, &'a dyn TransformUnit)>, UnitError> {
        rule.steps
            .iter()
            .map(|step| {
                self.units
                    .get(&step.unit)
                    .map(|unit| (step, unit.as_ref()))
                    .ok_or_else(|| UnitError::UnknownUnit(step.unit.clone()))
            })
            .collect()
    }

    /// Step names across `rules` with no registered unit, deduplicated.
    pub fn missing_units<'a>(&self, rules: &'a [AssetRule]) -> Vec<&'a str> {
        let mut missing: Vec<&str> = rules
            .iter()
            .flat_map(|r| r.steps.iter())
            .map(|s| s.unit.as_str())
            .filter(|name| !self.contains(name))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    /// Run `asset` through the rule's chain, last step first.
    pub fn apply_rule(&self, rule: &AssetRule, asset: Asset) -> Result<Asset, UnitError> {
        if !rule.applies_to(&asset.path) {
            return Err(UnitError::NotMatched {
                rule: rule.class.to_string(),
                path: asset.path,
            });
        }
        let chain = self.resolve_rule(rule)?;
        chain
            .into_iter()
            .rev()
            .try_fold(asset, |current, (step, unit)| unit.apply(current, &step.options))
    }
}
