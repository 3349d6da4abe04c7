/*!
# Constructor Rewriter

`new C(a, _)` would need an asynchronous constructor, which the runtime does
not provide. Such expressions are reported and the file is aborted.
*/

use crate::ast::ExpressionKind;
use crate::diagnostics::UnsupportedConstruct;
use crate::tracer::rules::{NodeMut, NodeRef, Rewrite, TransformationRule};
use crate::tracer::{TransformResult, TransformationContext};

pub struct ConstructorRewriter {
    priority: u32,
}

impl ConstructorRewriter {
    pub fn new() -> Self {
        Self { priority: 200 }
    }
}

impl Default for ConstructorRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for ConstructorRewriter {
    fn name(&self) -> &'static str {
        "ConstructorRewriter"
    }

    fn description(&self) -> &'static str {
        "Rejects marker arguments in constructor calls"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn matches(&self, node: NodeRef<'_>, context: &TransformationContext<'_>) -> bool {
        match node {
            NodeRef::New(expression) => matches!(
                &expression.kind,
                ExpressionKind::New(new) if context.detector.has_plain_argument(&new.arguments)
            ),
            _ => false,
        }
    }

    fn transform(&self, node: NodeMut<'_>, context: &mut TransformationContext<'_>) -> TransformResult<Rewrite> {
        match node {
            NodeMut::New(expression) => Err(context
                .reporter
                .unsupported(UnsupportedConstruct::AsyncConstructor, expression.span)),
            _ => Ok(Rewrite::Unchanged),
        }
    }
}
