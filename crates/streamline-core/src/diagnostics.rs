/*!
# Diagnostics

Failure values for marker shapes the transform refuses to rewrite, and the
sink trait through which they are handed to the host.

Every diagnostic is fatal to the file being transformed. There is no warning
level.
*/

use std::fmt;

use serde::Serialize;

use crate::ast::Span;
use crate::selection::FileDescriptor;

/// File name plus line/column of the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            line: span.start.line,
            column: span.start.column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// Marker-bearing constructs that are recognized but not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnsupportedConstruct {
    /// `f(void _)`
    PromiseMarker,
    /// `f([_])`
    ArrayMarker,
    /// `new C(_)`
    AsyncConstructor,
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            UnsupportedConstruct::PromiseMarker => "promise marker arguments are not implemented",
            UnsupportedConstruct::ArrayMarker => "array marker arguments are not implemented",
            UnsupportedConstruct::AsyncConstructor => "marker arguments in constructor calls are not implemented",
        };
        f.write_str(message)
    }
}

/// Error raised at a rejected node. Aborts the whole file.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("{location}: unsupported syntax: {construct}")]
    UnsupportedSyntax {
        construct: UnsupportedConstruct,
        location: SourceLocation,
    },

    #[error("{location}: async call cannot have more than 2 `{marker}` arguments (found {count})")]
    TooManyMarkers {
        marker: String,
        count: usize,
        location: SourceLocation,
    },

    #[error("{location}: call still carries `{marker}` arguments after {limit} rewrites")]
    ReplacementLimit {
        marker: String,
        limit: usize,
        location: SourceLocation,
    },
}

impl TransformError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            TransformError::UnsupportedSyntax { location, .. } => location,
            TransformError::TooManyMarkers { location, .. } => location,
            TransformError::ReplacementLimit { location, .. } => location,
        }
    }

    /// Short category name, used in logs and summaries.
    pub fn category(&self) -> &'static str {
        match self {
            TransformError::UnsupportedSyntax { .. } => "UnsupportedSyntax",
            TransformError::TooManyMarkers { .. } => "TooManyMarkers",
            TransformError::ReplacementLimit { .. } => "ReplacementLimit",
        }
    }
}

/// Builds position-anchored diagnostics for one file.
#[derive(Debug, Clone)]
pub struct DiagnosticsReporter {
    file: String,
    marker: String,
}

impl DiagnosticsReporter {
    pub fn new(file: &FileDescriptor, marker: impl Into<String>) -> Self {
        Self {
            file: file.display_name().to_string(),
            marker: marker.into(),
        }
    }

    pub fn location(&self, span: Span) -> SourceLocation {
        SourceLocation::new(self.file.clone(), span)
    }

    pub fn unsupported(&self, construct: UnsupportedConstruct, span: Span) -> TransformError {
        TransformError::UnsupportedSyntax {
            construct,
            location: self.location(span),
        }
    }

    pub fn too_many_markers(&self, count: usize, span: Span) -> TransformError {
        TransformError::TooManyMarkers {
            marker: self.marker.clone(),
            count,
            location: self.location(span),
        }
    }

    pub fn replacement_limit(&self, limit: usize, span: Span) -> TransformError {
        TransformError::ReplacementLimit {
            marker: self.marker.clone(),
            limit,
            location: self.location(span),
        }
    }
}

/// Receives every diagnostic before it aborts the file.
pub trait DiagnosticSink {
    fn report(&mut self, error: &TransformError);
}

/// Logs diagnostics through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, error: &TransformError) {
        tracing::error!(category = error.category(), "{}", error);
    }
}

/// Keeps every diagnostic it receives.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<TransformError>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, error: &TransformError) {
        self.diagnostics.push(error.clone());
    }
}
