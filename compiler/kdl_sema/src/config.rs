//! Session configuration and metadata.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use kdl_diagnostic::CompileResult;
use kdl_lexer::CommentStyle;
use kdl_rsrc::Format;
use kdl_types::Conversion;
use rustc_hash::FxHashSet;

/// Transcodes asset data between the formats of a [`Conversion`].
///
/// Implementations must be shareable across threads so that independent
/// sessions can run in parallel with one converter.
pub trait AssetConverter: Send + Sync {
    fn convert(&self, conversion: Conversion, data: Vec<u8>) -> CompileResult<Vec<u8>>;
}

/// Embeds the source bytes unchanged.
#[derive(Copy, Clone, Default, Debug)]
pub struct PassthroughConverter;

impl AssetConverter for PassthroughConverter {
    fn convert(&self, conversion: Conversion, data: Vec<u8>) -> CompileResult<Vec<u8>> {
        tracing::trace!(%conversion, bytes = data.len(), "passing asset through unconverted");
        Ok(data)
    }
}

/// Everything a caller decides before compiling.
#[derive(Clone)]
pub struct SessionConfig {
    /// Container format written at the end of the session. `@format set`
    /// can change it.
    pub format: Format,
    /// Names tested by `@condition`, `@notCondition` and `defined()`.
    pub definitions: FxHashSet<String>,
    /// Directories searched for `@import Name;` modules.
    pub module_paths: Vec<PathBuf>,
    pub comment_style: CommentStyle,
    pub converter: Arc<dyn AssetConverter>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            format: Format::default(),
            definitions: FxHashSet::default(),
            module_paths: Vec::new(),
            comment_style: CommentStyle::default(),
            converter: Arc::new(PassthroughConverter),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn define(mut self, name: impl Into<String>) -> Self {
        self.definitions.insert(name.into());
        self
    }

    #[must_use]
    pub fn with_module_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.module_paths.push(path.into());
        self
    }

    #[must_use]
    pub fn with_comment_style(mut self, style: CommentStyle) -> Self {
        self.comment_style = style;
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("format", &self.format)
            .field("definitions", &self.definitions)
            .field("module_paths", &self.module_paths)
            .field("comment_style", &self.comment_style)
            .finish_non_exhaustive()
    }
}

/// Project metadata collected from `@project`, `@author` and friends.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Metadata {
    pub project: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub copyright: Option<String>,
    pub email: Option<String>,
    pub game: Option<String>,
    pub license: Option<String>,
}

impl Metadata {
    /// Directive names that set a metadata entry.
    pub const KEYS: &'static [&'static str] = &[
        "project",
        "author",
        "version",
        "copyright",
        "email",
        "game",
        "license",
    ];

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        Some(match key {
            "project" => &mut self.project,
            "author" => &mut self.author,
            "version" => &mut self.version,
            "copyright" => &mut self.copyright,
            "email" => &mut self.email,
            "game" => &mut self.game,
            "license" => &mut self.license,
            _ => return None,
        })
    }

    /// Record `value` under `key`. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: String) -> bool {
        match self.slot(key) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }
}
