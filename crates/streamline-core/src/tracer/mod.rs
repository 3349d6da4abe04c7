/*!
# Tracer - Marker Rewriting Engine

Rule-driven rewriting of marker notation into calls against the streamline
runtime.

## Overview

A file goes through the tracer in one pre-order walk:

1. The file-selection predicate decides whether the file is touched at all
2. Program rules run once on the root (runtime declaration)
3. Function rules run on every function declaration, expression and arrow
4. Call and constructor rules run on every `f(...)` / `new C(...)`

## Architecture

- `TransformationRule`: trait for rules, with per-node-kind hooks
- `ProgramTracer`: applies the registered rules to one file's tree
- `FileTracer`: reads serialized trees from disk, traces them, writes them back
- `patterns`: the marker detector and call rewrite planning
- `streamline_rules`: the four rules that make up the marker transform

## Example Usage

```rust
use streamline_core::ast::{Expression, Program, Statement};
use streamline_core::selection::FileDescriptor;
use streamline_core::tracer::ProgramTracer;
use streamline_core::TransformConfig;

let mut tracer = ProgramTracer::with_streamline_rules(TransformConfig::default())?;
let program = Program::new(vec![Statement::expression(Expression::call(
    Expression::ident("f"),
    vec![Expression::number(1.0), Expression::ident("_")],
))]);

let output = tracer.transform_program(program, &FileDescriptor::new("main._js"))?;
assert_eq!(output.summary.calls_rewritten, 1);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

pub mod file_tracer;
pub mod patterns;
pub mod program_tracer;
pub mod rules;
pub mod runtime;
pub mod streamline_rules;

// Re-export main types
pub use file_tracer::{FileTracer, FileTransformationSummary};
pub use patterns::{MarkerDetector, MarkerKind, RewritePlan};
pub use program_tracer::{ProgramTracer, TransformOutput};
pub use rules::{NodeMut, NodeRef, Rewrite, RuleStats, TransformationRule};
pub use runtime::RuntimeBinding;

use crate::config::TransformConfig;
use crate::diagnostics::{DiagnosticsReporter, TransformError};
use crate::selection::FileDescriptor;

/// Result type for rule hooks
pub type TransformResult<T> = std::result::Result<T, TransformError>;

/// Per-file state threaded through every rule invocation.
#[derive(Debug, Clone)]
pub struct TransformationContext<'a> {
    pub file: &'a FileDescriptor,
    pub config: &'a TransformConfig,
    pub runtime: RuntimeBinding,
    pub reporter: DiagnosticsReporter,
    pub detector: MarkerDetector<'a>,
    pub summary: TransformationSummary,
}

impl<'a> TransformationContext<'a> {
    pub fn new(file: &'a FileDescriptor, config: &'a TransformConfig) -> Self {
        Self {
            file,
            config,
            runtime: RuntimeBinding::new(&config.runtime_binding),
            reporter: DiagnosticsReporter::new(file, config.marker.as_str()),
            detector: MarkerDetector::new(&config.marker),
            summary: TransformationSummary::default(),
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformationSummary {
    /// File was rejected by the selection predicate
    pub skipped: bool,
    pub declarations_inserted: u64,
    pub functions_rewritten: u64,
    pub receivers_adapted: u64,
    pub calls_rewritten: u64,
}

impl TransformationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &TransformationSummary) {
        self.declarations_inserted += other.declarations_inserted;
        self.functions_rewritten += other.functions_rewritten;
        self.receivers_adapted += other.receivers_adapted;
        self.calls_rewritten += other.calls_rewritten;
    }

    /// Total number of rewrites, not counting the runtime declaration.
    pub fn rewrites(&self) -> u64 {
        self.functions_rewritten + self.receivers_adapted + self.calls_rewritten
    }
}
