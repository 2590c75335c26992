//! Centralized output naming.
//!
//! Two jobs live here:
//!
//! - Deriving a page's logical name from its template filename
//!   (`about.pug` → `about`), used for both the page title and `about.html`.
//! - Filename templates for emitted assets, e.g. `[name]-[hash:7].[ext]`.
//!
//! ## Placeholders
//!
//! | Placeholder | Expands to |
//! |-------------|------------|
//! | `[name]` | file stem of the source (or entry name) |
//! | `[ext]` | source extension without the dot |
//! | `[contenthash]` | first 20 hex chars of the SHA-256 of the contents |
//! | `[contenthash:N]`, `[hash:N]` | first N hex chars (1..=64) |
//! | `[hash]` | same as `[contenthash]` |
//!
//! The core only stores templates in the build configuration. [`FilenameTemplate::render`]
//! is for the executor that actually has the bytes.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Hex chars used by `[contenthash]` and `[hash]` without an explicit length.
pub const DEFAULT_HASH_LEN: usize = 20;

/// Hex length of a SHA-256 digest.
const MAX_HASH_LEN: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("unclosed placeholder in {0:?}")]
    Unclosed(String),
    #[error("unknown placeholder [{0}]")]
    UnknownPlaceholder(String),
    #[error("hash length must be 1-{max}, got {0:?}", max = MAX_HASH_LEN)]
    InvalidHashLength(String),
    #[error("filename template is empty")]
    Empty,
}

/// Derive the logical page name from a template filename.
///
/// Strips `.{extension}` from the end. Returns `None` when the filename does
/// not carry that extension or nothing is left once it is removed.
///
/// - `("about.pug", "pug")` → `Some("about")`
/// - `("blog.post.pug", "pug")` → `Some("blog.post")`
/// - `("about.html", "pug")` → `None`
/// - `(".pug", "pug")` → `None`
pub fn logical_name(file_name: &str, extension: &str) -> Option<String> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Output filename of a page: logical name plus `.html`.
pub fn page_filename(logical_name: &str) -> String {
    format!("{logical_name}.html")
}

/// SHA-256 of a byte slice, as lowercase hex.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Name,
    Ext,
    /// Hash placeholder as written (`contenthash` or `hash`) and its length.
    Hash {
        label: &'static str,
        len: usize,
        explicit: bool,
    },
}

/// A parsed output filename template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    segments: Vec<Segment>,
}

impl FilenameTemplate {
    pub fn parse(raw: &str) -> Result<Self, NamingError> {
        if raw.is_empty() {
            return Err(NamingError::Empty);
        }

        let mut segments = Vec::new();
        let mut rest = raw;
        while let Some(open) = rest.find('[') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after
                .find(']')
                .ok_or_else(|| NamingError::Unclosed(raw.to_string()))?;
            segments.push(parse_placeholder(&after[..close])?);
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// True if the template contains `[name]`.
    pub fn has_name(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Name))
    }

    /// True if the rendered name depends on the file contents.
    pub fn is_hashed(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Hash { .. }))
    }

    /// Lengths of every hash placeholder, in order.
    pub fn hash_lengths(&self) -> Vec<usize> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Hash { len, .. } => Some(*len),
                _ => None,
            })
            .collect()
    }

    /// Expand the template for one emitted file.
    pub fn render(&self, name: &str, ext: &str, contents: &[u8]) -> String {
        let digest = if self.is_hashed() {
            content_hash(contents)
        } else {
            String::new()
        };

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Name => out.push_str(name),
                Segment::Ext => out.push_str(ext),
                Segment::Hash { len, .. } => out.push_str(&digest[..*len]),
            }
        }
        out
    }

    /// Expand the template for a file on disk, taking `[name]` and `[ext]`
    /// from its path.
    ///
    /// Only reads the file when the template is hashed.
    pub fn render_file(&self, path: &Path) -> io::Result<String> {
        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
        let contents = if self.is_hashed() {
            std::fs::read(path)?
        } else {
            Vec::new()
        };
        Ok(self.render(name, ext, &contents))
    }
}

fn parse_placeholder(token: &str) -> Result<Segment, NamingError> {
    let (label, len) = match token.split_once(':') {
        Some((label, len)) => (label, Some(len)),
        None => (token, None),
    };

    let label: &'static str = match label {
        "name" if len.is_none() => return Ok(Segment::Name),
        "ext" if len.is_none() => return Ok(Segment::Ext),
        "contenthash" => "contenthash",
        "hash" => "hash",
        _ => return Err(NamingError::UnknownPlaceholder(token.to_string())),
    };

    match len {
        None => Ok(Segment::Hash {
            label,
            len: DEFAULT_HASH_LEN,
            explicit: false,
        }),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if (1..=MAX_HASH_LEN).contains(&n) => Ok(Segment::Hash {
                label,
                len: n,
                explicit: true,
            }),
            _ => Err(NamingError::InvalidHashLength(raw.to_string())),
        },
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Name => f.write_str("[name]")?,
                Segment::Ext => f.write_str("[ext]")?,
                Segment::Hash {
                    label,
                    len,
                    explicit: true,
                } => write!(f, "[{label}:{len}]")?,
                Segment::Hash { label, .. } => write!(f, "[{label}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FilenameTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
