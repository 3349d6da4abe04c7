use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use streamline_core::selection::AlwaysSelect;
use streamline_core::tracer::{FileTracer, FileTransformationSummary, ProgramTracer};
use streamline_core::{init_tracing, init_tracing_with, TransformConfig};

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("streamline")
        .version(streamline_core::VERSION)
        .about("Rewrites `_` marker calls in serialized syntax trees into future/await calls")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("Serialized tree (.json) or a directory of them")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT")
                .help("Output file or directory")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("JSON transform configuration"),
        )
        .arg(
            Arg::new("runtime-binding")
                .long("runtime-binding")
                .value_name("NAME")
                .help("Identifier bound to the runtime in each file"),
        )
        .arg(
            Arg::new("marker")
                .long("marker")
                .value_name("NAME")
                .help("Name of the marker identifier"),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .value_name("REGEX")
                .help("Regex selecting which files are transformed"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .help("Transform every file regardless of its name")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-preserve-structure")
                .long("no-preserve-structure")
                .help("Write every output file directly into OUTPUT")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("backup")
                .long("backup")
                .help("Keep a .backup copy of output files that get overwritten")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug mode")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let debug = matches.get_flag("debug");

    // Initialize logging
    if debug {
        init_tracing_with("streamline_core=debug");
    } else {
        init_tracing();
    }

    let input = required_path(&matches, "input")?;
    let output = required_path(&matches, "output")?;
    let config = load_config(&matches)?;

    let mut tracer = ProgramTracer::with_streamline_rules(config)?;
    if matches.get_flag("force") {
        tracer = tracer.with_selector(AlwaysSelect);
    }

    let mut file_tracer = FileTracer::new(tracer)
        .preserve_structure(!matches.get_flag("no-preserve-structure"))
        .backup_originals(matches.get_flag("backup"));

    let summary = if input.is_dir() {
        file_tracer.transform_directory(&input, &output)?
    } else {
        file_tracer.transform_file(&input, &output)?
    };

    print_summary(&summary);

    if debug {
        let mut stats: Vec<_> = file_tracer.stats().values().collect();
        stats.sort_by(|a, b| a.rule_name.cmp(&b.rule_name));
        for rule in stats {
            println!(
                "  {}: {} applied, {} rewrites, {} errors",
                rule.rule_name, rule.applications, rule.transformations, rule.errors
            );
        }
    }

    if summary.success() {
        Ok(())
    } else {
        Err(anyhow!("{} file(s) could not be transformed", summary.errors.len()))
    }
}

fn required_path(matches: &ArgMatches, id: &str) -> Result<PathBuf> {
    matches
        .get_one::<String>(id)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("missing argument: {id}"))
}

/// Config file first, then individual flags on top.
fn load_config(matches: &ArgMatches) -> Result<TransformConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => TransformConfig::from_json_file(path).with_context(|| format!("loading config {path}"))?,
        None => TransformConfig::default(),
    };

    if let Some(binding) = matches.get_one::<String>("runtime-binding") {
        config.runtime_binding = binding.clone();
    }
    if let Some(marker) = matches.get_one::<String>("marker") {
        config.marker = marker.clone();
    }
    if let Some(pattern) = matches.get_one::<String>("pattern") {
        config.file_pattern = pattern.clone();
    }

    Ok(config)
}

fn print_summary(summary: &FileTransformationSummary) {
    println!("Streamline v{}", streamline_core::VERSION);
    println!(
        "Files: {} processed, {} transformed, {} skipped",
        summary.files_processed, summary.files_transformed, summary.files_skipped
    );
    println!(
        "Rewrites: {} functions, {} calls, {} array receivers",
        summary.rewrites.functions_rewritten, summary.rewrites.calls_rewritten, summary.rewrites.receivers_adapted
    );
    for error in &summary.errors {
        eprintln!("error: {error}");
    }
}
