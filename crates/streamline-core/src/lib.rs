//! # Streamline Core
//!
//! Marker-driven rewriting of syntax trees, including:
//! - Owned syntax tree definitions with a fallible mutable visitor
//! - Marker detection and call rewrite planning
//! - The rule engine that applies the marker transform to one file
//! - Directory-level tracing of serialized trees
//! - Position-anchored diagnostics for rejected constructs
//!
//! Calls that pass the marker identifier (`_` by default) as an argument are
//! turned into future/await calls against a runtime binding, and functions
//! that declare the marker as a parameter complete through it.

#![warn(clippy::all)]

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod selection;
pub mod tracer;

// Re-export commonly used types
pub use ast::{Expression, Program, Statement};
pub use config::TransformConfig;
pub use diagnostics::{CollectingSink, DiagnosticSink, TransformError, UnsupportedConstruct};
pub use selection::{FileDescriptor, FileSelector, PatternSelector, SourceKind};
pub use tracer::{FileTracer, ProgramTracer, TransformOutput, TransformationSummary};

/// Streamline transform version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for streamline core components
pub fn init_tracing() {
    init_tracing_with("streamline_core=info");
}

/// Initialize tracing with an explicit default directive, e.g.
/// `streamline_core=debug`. `RUST_LOG` is still honored.
pub fn init_tracing_with(directive: &str) {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    match directive.parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("ignoring log directive `{directive}`: {e}"),
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Transform one file with the default configuration.
pub fn transform(program: Program, file: &FileDescriptor) -> Result<TransformOutput> {
    let mut tracer = ProgramTracer::with_streamline_rules(TransformConfig::default())?;
    Ok(tracer.transform_program(program, file)?)
}

/// Error types for streamline core operations
#[derive(thiserror::Error, Debug)]
pub enum StreamlineError {
    /// A rule rejected a node
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tree or configuration could not be (de)serialized
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for streamline core operations
pub type Result<T> = std::result::Result<T, StreamlineError>;
