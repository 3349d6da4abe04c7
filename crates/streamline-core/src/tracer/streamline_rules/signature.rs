/*!
# Signature Rewriter

A function with a marker parameter completes through that parameter. Its body
is moved into an immediately invoked arrow whose value is handed to the
marker:

```text
function f(a, _) { body }   =>   function f(a, _) { _(null, (() => { body })()); }
(x, _) => x + 1             =>   (x, _) => { _(null, (() => { return x + 1; })()); }
```
*/

use tracing::debug;

use crate::ast::{Expression, FunctionBody, Statement};
use crate::tracer::rules::{NodeMut, NodeRef, Rewrite, TransformationRule};
use crate::tracer::{TransformResult, TransformationContext};

pub struct SignatureRewriter {
    priority: u32,
}

impl SignatureRewriter {
    pub fn new() -> Self {
        Self { priority: 200 }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for SignatureRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for SignatureRewriter {
    fn name(&self) -> &'static str {
        "SignatureRewriter"
    }

    fn description(&self) -> &'static str {
        "Routes the result of a marker-parameter function through its marker"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn matches(&self, node: NodeRef<'_>, context: &TransformationContext<'_>) -> bool {
        match node {
            NodeRef::Function(function) => context.detector.marker_param(&function.params).is_some(),
            _ => false,
        }
    }

    fn transform(&self, node: NodeMut<'_>, context: &mut TransformationContext<'_>) -> TransformResult<Rewrite> {
        let NodeMut::Function(function) = node else {
            return Ok(Rewrite::Unchanged);
        };
        let Some(index) = context.detector.marker_param(&function.params) else {
            return Ok(Rewrite::Unchanged);
        };

        // Only the first marker parameter is consumed
        let param = &mut function.params[index];
        param.done = true;
        let completion = param.clone();

        let body = std::mem::replace(&mut function.body, FunctionBody::Block(Vec::new()));
        let statements = match body {
            FunctionBody::Block(statements) => statements,
            FunctionBody::Expression(expression) => {
                let span = expression.span;
                vec![Statement::return_value(*expression).with_span(span)]
            }
        };

        let computed = Expression::call(Expression::arrow(Vec::new(), FunctionBody::Block(statements)), Vec::new());
        let callback = Expression::call(Expression::identifier(completion), vec![Expression::null(), computed]);
        function.body = FunctionBody::Block(vec![Statement::expression(callback)]);

        context.summary.functions_rewritten += 1;
        debug!(
            file = context.file.display_name(),
            function = function.id.as_ref().map(|id| id.name.as_str()).unwrap_or("<anonymous>"),
            param = index,
            "signature rewritten"
        );

        Ok(Rewrite::Mutated)
    }
}
