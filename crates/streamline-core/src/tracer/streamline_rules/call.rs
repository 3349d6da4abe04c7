/*!
# Call Rewriter

Two rewrites on every call expression, in this order:

1. Receiver adaptation: `arr.map_(...)` becomes
   `$$streamline.array(arr).map_(...)` for the configured array method names.
   This runs whether or not the call carries a marker.
2. Marker substitution: a call with plain markers becomes
   `await(future_<i>_<n>(f)(args))`, a call with a `!_` argument becomes
   `future_<i>_<n>(f)(args)`.

Marker shapes that are recognized but not implemented are rejected before
anything is edited, so a failing call is left exactly as it was.
*/

use tracing::debug;

use crate::ast::{CallExpression, Expression, ExpressionKind, MemberExpression};
use crate::diagnostics::UnsupportedConstruct;
use crate::tracer::patterns::RewritePlan;
use crate::tracer::rules::{NodeMut, NodeRef, Rewrite, TransformationRule};
use crate::tracer::{TransformResult, TransformationContext};

/// Arguments removed from a call and whether the result is awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Substitution {
    index1: usize,
    index2: Option<usize>,
    wait: bool,
}

pub struct CallRewriter {
    priority: u32,
}

impl CallRewriter {
    pub fn new() -> Self {
        Self { priority: 200 }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Turn a rejected plan into its diagnostic, or the plan into a substitution.
    fn accept(
        plan: RewritePlan,
        expression: &Expression,
        context: &TransformationContext<'_>,
    ) -> TransformResult<Substitution> {
        match plan {
            RewritePlan::Await { index1, index2 } => Ok(Substitution { index1, index2, wait: true }),
            RewritePlan::Future { index } => Ok(Substitution {
                index1: index,
                index2: None,
                wait: false,
            }),
            RewritePlan::Promise { .. } => Err(context
                .reporter
                .unsupported(UnsupportedConstruct::PromiseMarker, expression.span)),
            RewritePlan::Array { .. } => Err(context
                .reporter
                .unsupported(UnsupportedConstruct::ArrayMarker, expression.span)),
            RewritePlan::TooManyMarkers { count } => Err(context.reporter.too_many_markers(count, expression.span)),
        }
    }

    /// Wrap the receiver of `obj.<method>(...)` in the runtime's array adapter.
    fn adapt_receiver(call: &mut CallExpression, context: &TransformationContext<'_>) -> bool {
        let ExpressionKind::Member(member) = &mut call.callee.kind else {
            return false;
        };
        let is_array_method = member
            .property_name()
            .is_some_and(|name| context.config.is_array_method(name));
        if !is_array_method || Self::is_adapted(member, context) {
            return false;
        }

        let receiver = std::mem::replace(&mut *member.object, Expression::null());
        let span = receiver.span;
        *member.object = Expression::call(context.runtime.array_adapter(), vec![receiver]).with_span(span);
        true
    }

    /// Receiver is already `$$streamline.array(...)`.
    fn is_adapted(member: &MemberExpression, context: &TransformationContext<'_>) -> bool {
        let Some(call) = member.object.as_call() else {
            return false;
        };
        match &call.callee.kind {
            ExpressionKind::Member(adapter) => {
                adapter.property_name() == Some("array")
                    && adapter
                        .object
                        .as_identifier()
                        .is_some_and(|binding| binding.name == context.runtime.name())
            }
            _ => false,
        }
    }
}

impl Default for CallRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for CallRewriter {
    fn name(&self) -> &'static str {
        "CallRewriter"
    }

    fn description(&self) -> &'static str {
        "Adapts array receivers and rewrites marker calls into future/await calls"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn matches(&self, node: NodeRef<'_>, _context: &TransformationContext<'_>) -> bool {
        matches!(node, NodeRef::Call(_))
    }

    fn transform(&self, node: NodeMut<'_>, context: &mut TransformationContext<'_>) -> TransformResult<Rewrite> {
        let NodeMut::Call(expression) = node else {
            return Ok(Rewrite::Unchanged);
        };
        let span = expression.span;
        let substitution = match expression.as_call().and_then(|call| context.detector.plan_call(&call.arguments)) {
            Some(plan) => Some(Self::accept(plan, expression, context)?),
            None => None,
        };

        let ExpressionKind::Call(call) = &mut expression.kind else {
            return Ok(Rewrite::Unchanged);
        };

        let adapted = Self::adapt_receiver(call, context);
        if adapted {
            context.summary.receivers_adapted += 1;
            debug!(
                file = context.file.display_name(),
                line = span.start.line,
                "array receiver adapted"
            );
        }

        let Some(Substitution { index1, index2, wait }) = substitution else {
            return Ok(if adapted { Rewrite::Mutated } else { Rewrite::Unchanged });
        };

        // Higher index first so the lower one stays valid
        if let Some(index2) = index2 {
            call.arguments.remove(index2);
        }
        call.arguments.remove(index1);

        let remaining = call.arguments.len();
        let callee = std::mem::replace(&mut *call.callee, Expression::null());
        let arguments = std::mem::take(&mut call.arguments);

        let adapter = Expression::call(context.runtime.future_adapter(index1, remaining), vec![callee]);
        let future = Expression::call(adapter, arguments).with_span(span);
        *expression = if wait {
            Expression::call(context.runtime.await_fn(), vec![future]).with_span(span)
        } else {
            future
        };

        context.summary.calls_rewritten += 1;
        debug!(
            file = context.file.display_name(),
            line = span.start.line,
            index = index1,
            remaining,
            awaited = wait,
            "marker call rewritten"
        );

        Ok(Rewrite::Replaced)
    }
}
