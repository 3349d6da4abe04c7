/*!
# FileTracer - File-based Transformation System

Applies a `ProgramTracer` to syntax trees stored on disk as JSON, one tree per
file, writing the rewritten trees to an output location.

A file named `lib/db._js.json` is traced as `lib/db._js`, so the selection
pattern and diagnostic locations see the name of the source it was parsed
from.
*/

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::ast::Program;
use crate::selection::FileDescriptor;

use super::program_tracer::ProgramTracer;
use super::rules::RuleStats;
use super::TransformationSummary;

/// File-based transformation system
///
/// Reads serialized trees, traces them and writes the result. Files the
/// selection predicate rejects are written through unchanged, so the output
/// directory mirrors the input.
pub struct FileTracer {
    tracer: ProgramTracer,
    source_extensions: Vec<String>,
    output_extension: String,
    preserve_structure: bool,
    backup_originals: bool,
}

impl FileTracer {
    pub fn new(tracer: ProgramTracer) -> Self {
        Self {
            tracer,
            source_extensions: vec!["json".to_string()],
            output_extension: "json".to_string(),
            preserve_structure: true,
            backup_originals: false,
        }
    }

    /// Set the file extensions to process
    pub fn source_extensions(mut self, extensions: Vec<String>) -> Self {
        self.source_extensions = extensions;
        self
    }

    /// Set the output file extension
    pub fn output_extension(mut self, extension: String) -> Self {
        self.output_extension = extension;
        self
    }

    /// Whether to preserve directory structure in output
    pub fn preserve_structure(mut self, preserve: bool) -> Self {
        self.preserve_structure = preserve;
        self
    }

    /// Whether to back up output files that would be overwritten
    pub fn backup_originals(mut self, backup: bool) -> Self {
        self.backup_originals = backup;
        self
    }

    pub fn tracer(&self) -> &ProgramTracer {
        &self.tracer
    }

    /// Transform all files in a directory
    pub fn transform_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        source_dir: P,
        output_dir: Q,
    ) -> Result<FileTransformationSummary> {
        let source_path = source_dir.as_ref();
        let output_path = output_dir.as_ref();

        if !source_path.is_dir() {
            return Err(anyhow!("Source directory does not exist: {}", source_path.display()));
        }

        if !output_path.exists() {
            fs::create_dir_all(output_path)?;
        }

        let mut summary = FileTransformationSummary::new();
        self.transform_directory_recursive(source_path, output_path, source_path, &mut summary)?;

        info!(
            processed = summary.files_processed,
            transformed = summary.files_transformed,
            skipped = summary.files_skipped,
            errors = summary.errors.len(),
            "directory transformed"
        );
        Ok(summary)
    }

    /// Transform a single file
    pub fn transform_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        source_file: P,
        output_file: Q,
    ) -> Result<FileTransformationSummary> {
        let source_path = source_file.as_ref();
        let output_path = output_file.as_ref();

        let content = fs::read_to_string(source_path)
            .with_context(|| format!("reading {}", source_path.display()))?;
        let program: Program = serde_json::from_str(&content)
            .with_context(|| format!("parsing syntax tree in {}", source_path.display()))?;

        let descriptor = Self::descriptor_for(source_path);
        let output = self.tracer.transform_program(program, &descriptor)?;

        // Backup original if requested
        if self.backup_originals && output_path.exists() {
            let backup_path = output_path.with_extension(format!(
                "{}.backup",
                output_path.extension().unwrap_or_default().to_string_lossy()
            ));
            fs::copy(output_path, backup_path)?;
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, serde_json::to_string_pretty(&output.program)?)?;

        let mut summary = FileTransformationSummary::new();
        summary.files_processed += 1;
        if output.summary.skipped {
            summary.files_skipped += 1;
        } else {
            summary.files_transformed += 1;
        }
        summary.rewrites.merge(&output.summary);

        Ok(summary)
    }

    /// Descriptor for a serialized tree: its path without the last extension.
    fn descriptor_for(path: &Path) -> FileDescriptor {
        FileDescriptor::new(path.with_extension("").to_string_lossy())
    }

    /// Recursively transform directories
    fn transform_directory_recursive(
        &mut self,
        current_dir: &Path,
        output_dir: &Path,
        source_root: &Path,
        summary: &mut FileTransformationSummary,
    ) -> Result<()> {
        let mut entries = fs::read_dir(current_dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<PathBuf>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                if self.preserve_structure {
                    let output_subdir = output_dir.join(path.strip_prefix(source_root)?);
                    if !output_subdir.exists() {
                        fs::create_dir_all(&output_subdir)?;
                        summary.directories_created += 1;
                    }
                }
                self.transform_directory_recursive(&path, output_dir, source_root, summary)?;
            } else if self.should_process_file(&path) {
                let relative = if self.preserve_structure {
                    path.strip_prefix(source_root)?
                } else {
                    let Some(name) = path.file_name() else {
                        continue;
                    };
                    Path::new(name)
                };
                let output_file = output_dir.join(relative).with_extension(&self.output_extension);

                match self.transform_file(&path, &output_file) {
                    Ok(file_summary) => summary.merge(file_summary),
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "file not transformed");
                        summary.files_processed += 1;
                        summary.errors.push(format!("Error processing {}: {}", path.display(), e));
                    }
                }
            }
        }

        Ok(())
    }

    /// Check if a file should be processed based on its extension
    fn should_process_file(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension() {
            let ext_str = extension.to_string_lossy().to_lowercase();
            self.source_extensions.iter().any(|ext| ext.to_lowercase() == ext_str)
        } else {
            false
        }
    }

    /// Get transformation statistics
    pub fn stats(&self) -> &HashMap<String, RuleStats> {
        self.tracer.stats()
    }
}

/// Summary of file transformation results
#[derive(Debug, Default)]
pub struct FileTransformationSummary {
    pub files_processed: u64,
    pub files_transformed: u64,
    /// Files the selection predicate left unchanged
    pub files_skipped: u64,
    pub directories_created: u64,
    /// Rewrites across every transformed file
    pub rewrites: TransformationSummary,
    pub errors: Vec<String>,
}

impl FileTransformationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: FileTransformationSummary) {
        self.files_processed += other.files_processed;
        self.files_transformed += other.files_transformed;
        self.files_skipped += other.files_skipped;
        self.directories_created += other.directories_created;
        self.rewrites.merge(&other.rewrites);
        self.errors.extend(other.errors);
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            (self.files_transformed as f64) / (self.files_processed as f64)
        }
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}
