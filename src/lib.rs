//! # sitepipe
//!
//! Composes the asset build pipeline for a multi-page static site. Point it
//! at a project and a build mode and it produces one [`pipeline::BuildConfiguration`]:
//! which pages exist, which transformation steps run for each asset class and
//! in what order, which output plugins are active, and how emitted files are
//! named.
//!
//! sitepipe does not compile templates, styles or scripts. Those are opaque
//! units that an external executor registers by name ([`units`]); this crate
//! only decides which units run, in what order, with what options, under
//! which mode.
//!
//! # Architecture
//!
//! ```text
//! EnvOptions ──► mode ──► ModeProfile ─┬─► rules   ──► AssetRule[]
//!                                      │
//! project root ──► paths ──► discover ─┴─► pages   ──► PageTarget[]
//!                                                         │
//!                                  plugins ◄──────────────┘
//!                                     │
//!                              pipeline::assemble ──► BuildConfiguration
//! ```
//!
//! Assembly performs exactly one filesystem read (the views directory) and
//! no writes. Two assemblies of the same tree in the same mode produce equal
//! configurations.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`mode`] | Resolves the build mode and every mode-dependent knob, once |
//! | [`paths`] | Absolute source and output roots |
//! | [`discover`] | Finds page templates in the views directory |
//! | [`pages`] | One page target per template; collision policy |
//! | [`naming`] | Logical page names, filename templates, content hashes |
//! | [`rules`] | Ordered transformation chains per asset class |
//! | [`plugins`] | Mode-gated output plugins and their phase ordering |
//! | [`units`] | Registry of executor-supplied transformation units |
//! | [`pipeline`] | Assembles everything into a `BuildConfiguration` |
//! | [`config`] | `pipeline.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Mode Switch
//!
//! Every development/production difference is a row in [`mode::ModeParams`].
//! The table is collapsed into a [`mode::ModeProfile`] at the top of
//! assembly, and composers only ever read the profile. The style rules are
//! the clearest case: development and production chains are identical except
//! for their first step.
//!
//! ## Sorted Discovery
//!
//! Templates are sorted by path instead of following directory listing
//! order, so page order and plugin order are stable across platforms and runs.
//!
//! ## Phased Plugins
//!
//! Output plugins carry a phase (pre-build, emit, post-process). Cleanup is
//! pre-build and style extraction is post-process, so the assembled list
//! always starts with cleanup and ends with extraction when they are active.

pub mod config;
pub mod discover;
pub mod mode;
pub mod naming;
pub mod output;
pub mod pages;
pub mod paths;
pub mod pipeline;
pub mod plugins;
pub mod rules;
pub mod units;

#[cfg(test)]
pub(crate) mod test_helpers;
