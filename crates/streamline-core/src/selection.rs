/*!
# File Selection

Decides whether a file takes part in the transform at all. The predicate is
consulted once per file, before any rule runs; an unselected file comes back
untouched.
*/

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Files named `*._js` / `*._coffee`, plus sources with no file name.
pub const DEFAULT_FILE_PATTERN: &str = r"^(unknown|.*\._(js|coffee))$";

/// Explicit override of the file-name based selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Source written with markers; always transformed.
    Streamline,
    /// Ordinary source; never transformed.
    Plain,
}

/// What the host knows about the file being transformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub filename: Option<String>,
    #[serde(default)]
    pub source_kind: Option<SourceKind>,
}

impl FileDescriptor {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            source_kind: None,
        }
    }

    /// Source handed over without a file name (e.g. from stdin).
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn with_source_kind(mut self, kind: SourceKind) -> Self {
        self.source_kind = Some(kind);
        self
    }

    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("unknown")
    }
}

/// The file-selection predicate.
pub trait FileSelector: Send + Sync {
    fn should_transform(&self, file: &FileDescriptor) -> bool;
}

impl<F> FileSelector for F
where
    F: Fn(&FileDescriptor) -> bool + Send + Sync,
{
    fn should_transform(&self, file: &FileDescriptor) -> bool {
        self(file)
    }
}

/// Selects on the source-kind flag when present, else on the file name.
#[derive(Debug, Clone)]
pub struct PatternSelector {
    pattern: Regex,
}

impl PatternSelector {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl FileSelector for PatternSelector {
    fn should_transform(&self, file: &FileDescriptor) -> bool {
        match file.source_kind {
            Some(SourceKind::Streamline) => true,
            Some(SourceKind::Plain) => false,
            None => self.pattern.is_match(file.display_name()),
        }
    }
}

/// Transforms every file, whatever its name.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysSelect;

impl FileSelector for AlwaysSelect {
    fn should_transform(&self, _file: &FileDescriptor) -> bool {
        true
    }
}
