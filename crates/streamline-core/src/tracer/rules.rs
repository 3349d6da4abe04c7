/*!
# Transformation Rules

Core trait for rules and the node handles passed to them.
*/

use crate::ast::{Expression, ExpressionKind, Function, Program};
use super::{TransformResult, TransformationContext};

/// Read-only view of a node a rule may act on.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Function(&'a Function),
    /// An expression whose kind is `Call`
    Call(&'a Expression),
    /// An expression whose kind is `New`
    New(&'a Expression),
}

impl NodeRef<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeRef::Program(_) => "Program",
            NodeRef::Function(_) => "Function",
            NodeRef::Call(_) => "CallExpression",
            NodeRef::New(_) => "NewExpression",
        }
    }
}

/// Mutable handle on a node. For calls and constructor calls the handle is
/// the expression slot itself, so a rule may replace the whole node.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Program(&'a mut Program),
    Function(&'a mut Function),
    Call(&'a mut Expression),
    New(&'a mut Expression),
}

impl<'a> NodeMut<'a> {
    /// Handle for an expression slot, if it holds a call or constructor call.
    pub fn from_expression(expression: &'a mut Expression) -> Option<Self> {
        if matches!(expression.kind, ExpressionKind::Call(_)) {
            Some(NodeMut::Call(expression))
        } else if matches!(expression.kind, ExpressionKind::New(_)) {
            Some(NodeMut::New(expression))
        } else {
            None
        }
    }

    pub fn as_ref(&self) -> NodeRef<'_> {
        match self {
            NodeMut::Program(program) => NodeRef::Program(program),
            NodeMut::Function(function) => NodeRef::Function(function),
            NodeMut::Call(expression) => NodeRef::Call(expression),
            NodeMut::New(expression) => NodeRef::New(expression),
        }
    }

    pub fn reborrow(&mut self) -> NodeMut<'_> {
        match self {
            NodeMut::Program(program) => NodeMut::Program(&mut **program),
            NodeMut::Function(function) => NodeMut::Function(&mut **function),
            NodeMut::Call(expression) => NodeMut::Call(&mut **expression),
            NodeMut::New(expression) => NodeMut::New(&mut **expression),
        }
    }
}

/// Outcome of a single rule application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rewrite {
    Unchanged,
    /// Children of the node were edited in place
    Mutated,
    /// The node itself was swapped for a new one
    Replaced,
}

/// Core trait for transformation rules
///
/// A rule declares which nodes it applies to with `matches` and performs the
/// rewrite in `transform`. The tracer only calls `transform` when `matches`
/// returned true for the same node.
pub trait TransformationRule: Send + Sync {
    /// Human-readable name for this rule
    fn name(&self) -> &'static str;

    /// Detailed description of what this rule does
    fn description(&self) -> &'static str;

    /// Priority for rule ordering (higher priority runs first)
    fn priority(&self) -> u32 {
        100
    }

    /// Check if this rule applies to the given node
    fn matches(&self, node: NodeRef<'_>, context: &TransformationContext<'_>) -> bool;

    /// Rewrite the node. A diagnostic returned here aborts the file.
    fn transform(&self, node: NodeMut<'_>, context: &mut TransformationContext<'_>) -> TransformResult<Rewrite>;
}

/// Rule execution statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleStats {
    pub rule_name: String,
    pub applications: u64,
    pub transformations: u64,
    pub errors: u64,
}

impl RuleStats {
    pub fn new(rule_name: String) -> Self {
        Self {
            rule_name,
            applications: 0,
            transformations: 0,
            errors: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.applications == 0 {
            0.0
        } else {
            (self.transformations as f64) / (self.applications as f64)
        }
    }
}
