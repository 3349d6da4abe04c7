/*!
# ProgramTracer - Per-File Transformation Engine

Applies the registered rules to one file's tree in a single pre-order walk.
*/

use std::collections::HashMap;

use tracing::{debug, info};

use crate::ast::walk::{walk_expression, walk_function, walk_program};
use crate::ast::{Expression, Function, Program, VisitMut};
use crate::config::TransformConfig;
use crate::diagnostics::{DiagnosticSink, TracingSink, TransformError};
use crate::selection::{FileDescriptor, FileSelector, PatternSelector};
use crate::StreamlineError;

use super::rules::{NodeMut, Rewrite, RuleStats, TransformationRule};
use super::streamline_rules;
use super::{TransformResult, TransformationContext, TransformationSummary};

/// Rewritten tree plus what was done to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub program: Program,
    pub summary: TransformationSummary,
}

/// Per-file transformation engine
///
/// Consults the file selector once, then walks the tree. Program rules run on
/// the root before its statements are visited; function, call and constructor
/// rules run on each node before its children. When a call rule replaces the
/// node, the rules run again on the replacement before descending, so markers
/// left in the new outer call are picked up too.
pub struct ProgramTracer {
    rules: Vec<Box<dyn TransformationRule>>,
    stats: HashMap<String, RuleStats>,
    selector: Box<dyn FileSelector>,
    config: TransformConfig,
    max_iterations: usize,
}

impl ProgramTracer {
    /// Tracer with no rules, selecting files with `config.file_pattern`.
    pub fn new(config: TransformConfig) -> crate::Result<Self> {
        config.validate()?;
        let selector = PatternSelector::new(&config.file_pattern).map_err(|e| {
            StreamlineError::Config(format!("invalid file pattern `{}`: {}", config.file_pattern, e))
        })?;

        Ok(Self {
            rules: Vec::new(),
            stats: HashMap::new(),
            selector: Box::new(selector),
            config,
            max_iterations: 64,
        })
    }

    /// Tracer carrying the full marker transform.
    pub fn with_streamline_rules(config: TransformConfig) -> crate::Result<Self> {
        let mut tracer = Self::new(config)?;
        for rule in streamline_rules::all() {
            tracer.add_rule(rule);
        }
        tracer.sort_rules_by_priority();
        Ok(tracer)
    }

    /// Replace the file-selection predicate
    pub fn with_selector(mut self, selector: impl FileSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Set how many times one call may be replaced. A call that still carries
    /// markers once the limit is reached aborts the file.
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Add a transformation rule
    pub fn add_rule(&mut self, rule: Box<dyn TransformationRule>) {
        let rule_name = rule.name().to_string();
        self.stats.insert(rule_name, RuleStats::new(rule.name().to_string()));
        self.rules.push(rule);
    }

    /// Sort rules by priority (higher priority first)
    pub fn sort_rules_by_priority(&mut self) {
        self.rules.sort_by_key(|rule| std::cmp::Reverse(rule.priority()));
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn should_transform(&self, file: &FileDescriptor) -> bool {
        self.selector.should_transform(file)
    }

    /// Transform one file, logging diagnostics through `tracing`.
    pub fn transform_program(&mut self, program: Program, file: &FileDescriptor) -> TransformResult<TransformOutput> {
        self.transform_program_with_sink(program, file, &mut TracingSink)
    }

    /// Transform one file, reporting diagnostics to `sink`.
    ///
    /// The program is consumed: a file that fails produces no tree.
    pub fn transform_program_with_sink(
        &mut self,
        mut program: Program,
        file: &FileDescriptor,
        sink: &mut dyn DiagnosticSink,
    ) -> TransformResult<TransformOutput> {
        if !self.selector.should_transform(file) {
            info!(file = file.display_name(), "file not selected, left unchanged");
            return Ok(TransformOutput {
                program,
                summary: TransformationSummary {
                    skipped: true,
                    ..Default::default()
                },
            });
        }

        let mut walker = RuleWalker {
            rules: &self.rules,
            stats: &mut self.stats,
            context: TransformationContext::new(file, &self.config),
            sink,
            max_iterations: self.max_iterations,
        };
        walker.visit_program(&mut program)?;
        let summary = walker.context.summary;

        info!(
            file = file.display_name(),
            functions = summary.functions_rewritten,
            calls = summary.calls_rewritten,
            receivers = summary.receivers_adapted,
            "file transformed"
        );

        Ok(TransformOutput { program, summary })
    }

    /// Get transformation statistics
    pub fn stats(&self) -> &HashMap<String, RuleStats> {
        &self.stats
    }

    /// Clear statistics
    pub fn clear_stats(&mut self) {
        for stats in self.stats.values_mut() {
            *stats = RuleStats::new(stats.rule_name.clone());
        }
    }
}

/// Walk state for one file.
struct RuleWalker<'t, 'c, 's> {
    rules: &'t [Box<dyn TransformationRule>],
    stats: &'t mut HashMap<String, RuleStats>,
    context: TransformationContext<'c>,
    sink: &'s mut dyn DiagnosticSink,
    max_iterations: usize,
}

impl RuleWalker<'_, '_, '_> {
    /// Run every matching rule on `node`, in priority order. Stops early once
    /// a rule has replaced the node.
    fn apply(&mut self, mut node: NodeMut<'_>) -> TransformResult<Rewrite> {
        let mut outcome = Rewrite::Unchanged;

        for rule in self.rules {
            if !rule.matches(node.as_ref(), &self.context) {
                continue;
            }

            let stats = self
                .stats
                .entry(rule.name().to_string())
                .or_insert_with(|| RuleStats::new(rule.name().to_string()));
            stats.applications += 1;

            let kind = node.as_ref().kind_name();
            match rule.transform(node.reborrow(), &mut self.context) {
                Ok(Rewrite::Unchanged) => {}
                Ok(rewrite) => {
                    stats.transformations += 1;
                    debug!(rule = rule.name(), node = kind, ?rewrite, "rule applied");
                    outcome = outcome.max(rewrite);
                    if rewrite == Rewrite::Replaced {
                        break;
                    }
                }
                Err(error) => {
                    stats.errors += 1;
                    self.sink.report(&error);
                    return Err(error);
                }
            }
        }

        Ok(outcome)
    }

    /// A call whose arguments would still be planned for a rewrite.
    fn has_pending_markers(&self, expression: &Expression) -> bool {
        expression
            .as_call()
            .is_some_and(|call| self.context.detector.plan_call(&call.arguments).is_some())
    }
}

impl VisitMut for RuleWalker<'_, '_, '_> {
    type Error = TransformError;

    fn visit_program(&mut self, program: &mut Program) -> TransformResult<()> {
        self.apply(NodeMut::Program(&mut *program))?;
        walk_program(self, program)
    }

    fn visit_function(&mut self, function: &mut Function) -> TransformResult<()> {
        self.apply(NodeMut::Function(&mut *function))?;
        walk_function(self, function)
    }

    fn visit_expression(&mut self, expression: &mut Expression) -> TransformResult<()> {
        let mut replacements = 0;
        while let Some(node) = NodeMut::from_expression(expression) {
            if self.apply(node)? != Rewrite::Replaced {
                break;
            }
            replacements += 1;
            if replacements >= self.max_iterations {
                if self.has_pending_markers(expression) {
                    let error = self
                        .context
                        .reporter
                        .replacement_limit(self.max_iterations, expression.span);
                    self.sink.report(&error);
                    return Err(error);
                }
                break;
            }
        }
        walk_expression(self, expression)
    }
}
