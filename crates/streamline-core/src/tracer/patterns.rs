/*!
# Marker Patterns

Marker detection and call rewrite planning.

A marker is an identifier named `_` (by default) that no rewrite has consumed
yet. Three wrapped shapes are recognized around it:

| shape     | kind    |
|-----------|---------|
| `_`       | plain   |
| `!_`      | future  |
| `void _`  | promise |
| `[_]`     | array   |

Detection is purely structural and has no side effects.
*/

use crate::ast::{Expression, ExpressionKind, Identifier, UnaryOperator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Plain,
    Future,
    Promise,
    Array,
}

/// Largest number of plain markers a single call may carry.
pub const MAX_PLAIN_MARKERS: usize = 2;

/// How a call's argument list will be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewritePlan {
    /// Remove the plain marker(s), wrap in future then await.
    Await { index1: usize, index2: Option<usize> },
    /// Remove the `!_` argument, wrap in future only.
    Future { index: usize },
    /// `void _`, rejected
    Promise { index: usize },
    /// `[_]`, rejected
    Array { index: usize },
    /// More than two plain markers, rejected
    TooManyMarkers { count: usize },
}

type PlanBuilder = fn(&[usize]) -> RewritePlan;

fn plain_plan(positions: &[usize]) -> RewritePlan {
    if positions.len() > MAX_PLAIN_MARKERS {
        return RewritePlan::TooManyMarkers { count: positions.len() };
    }
    RewritePlan::Await {
        index1: positions[0],
        index2: positions.get(1).copied(),
    }
}

fn future_plan(positions: &[usize]) -> RewritePlan {
    RewritePlan::Future { index: positions[0] }
}

fn promise_plan(positions: &[usize]) -> RewritePlan {
    RewritePlan::Promise { index: positions[0] }
}

fn array_plan(positions: &[usize]) -> RewritePlan {
    RewritePlan::Array { index: positions[0] }
}

/// Kinds in the order a call's arguments are searched, each with its plan.
/// The first kind with at least one occurrence decides.
const CALL_PLAN_TABLE: [(MarkerKind, PlanBuilder); 4] = [
    (MarkerKind::Plain, plain_plan),
    (MarkerKind::Future, future_plan),
    (MarkerKind::Promise, promise_plan),
    (MarkerKind::Array, array_plan),
];

/// Classifies nodes against a marker name.
#[derive(Debug, Clone, Copy)]
pub struct MarkerDetector<'a> {
    name: &'a str,
}

impl<'a> MarkerDetector<'a> {
    pub fn new(name: &'a str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn is_marker_ident(&self, ident: &Identifier) -> bool {
        ident.name == self.name && !ident.done
    }

    pub fn is_plain(&self, expression: &Expression) -> bool {
        matches!(&expression.kind, ExpressionKind::Identifier(ident) if self.is_marker_ident(ident))
    }

    /// Marker kind of `expression`, if it is one.
    pub fn classify(&self, expression: &Expression) -> Option<MarkerKind> {
        match &expression.kind {
            ExpressionKind::Identifier(ident) if self.is_marker_ident(ident) => Some(MarkerKind::Plain),
            ExpressionKind::Unary { operator: UnaryOperator::Not, argument } if self.is_plain(argument) => {
                Some(MarkerKind::Future)
            }
            ExpressionKind::Unary { operator: UnaryOperator::Void, argument } if self.is_plain(argument) => {
                Some(MarkerKind::Promise)
            }
            ExpressionKind::Array(elements) => match elements.as_slice() {
                [Some(element)] if self.is_plain(element) => Some(MarkerKind::Array),
                _ => None,
            },
            _ => None,
        }
    }

    /// Positions of every argument of the given kind, left to right.
    pub fn positions(&self, arguments: &[Expression], kind: MarkerKind) -> Vec<usize> {
        arguments
            .iter()
            .enumerate()
            .filter(|(_, argument)| self.classify(argument) == Some(kind))
            .map(|(index, _)| index)
            .collect()
    }

    /// First parameter that is a plain marker.
    pub fn marker_param(&self, params: &[Identifier]) -> Option<usize> {
        params.iter().position(|param| self.is_marker_ident(param))
    }

    pub fn has_plain_argument(&self, arguments: &[Expression]) -> bool {
        arguments.iter().any(|argument| self.is_plain(argument))
    }

    /// Choose the rewrite for a call's argument list, or `None` when it
    /// carries no marker.
    pub fn plan_call(&self, arguments: &[Expression]) -> Option<RewritePlan> {
        CALL_PLAN_TABLE.iter().find_map(|(kind, build)| {
            let positions = self.positions(arguments, *kind);
            (!positions.is_empty()).then(|| build(&positions))
        })
    }
}
