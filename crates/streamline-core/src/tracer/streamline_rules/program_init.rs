/*!
# Program Initializer

Prepends the runtime binding declaration to every transformed file:

```text
/* <comments that led the first statement> */
/*::declare type _<T> = (err : ?Error, result : T) => void;*/
var $$streamline = require("streamline-runtime").runtime;
```
*/

use tracing::debug;

use crate::ast::Comment;
use crate::tracer::rules::{NodeMut, NodeRef, Rewrite, TransformationRule};
use crate::tracer::{TransformResult, TransformationContext};

pub struct ProgramInitializer {
    priority: u32,
}

impl ProgramInitializer {
    pub fn new() -> Self {
        Self { priority: 300 }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for ProgramInitializer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for ProgramInitializer {
    fn name(&self) -> &'static str {
        "ProgramInitializer"
    }

    fn description(&self) -> &'static str {
        "Prepends the runtime binding declaration, keeping the file's leading comments first"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn matches(&self, node: NodeRef<'_>, context: &TransformationContext<'_>) -> bool {
        match node {
            // A tree that already starts with the binding was transformed before
            NodeRef::Program(program) => !program.body.first().is_some_and(|first| {
                context
                    .runtime
                    .is_declared_by(first, &context.config.runtime_module, &context.config.runtime_export)
            }),
            _ => false,
        }
    }

    fn transform(&self, node: NodeMut<'_>, context: &mut TransformationContext<'_>) -> TransformResult<Rewrite> {
        let NodeMut::Program(program) = node else {
            return Ok(Rewrite::Unchanged);
        };

        let mut declaration = context
            .runtime
            .declaration(&context.config.runtime_module, &context.config.runtime_export);

        if let Some(first) = program.body.first_mut() {
            declaration.leading_comments = std::mem::take(&mut first.leading_comments);
        }
        declaration
            .leading_comments
            .push(Comment::block(context.config.declaration_comment.as_str()));

        program.body.insert(0, declaration);
        context.summary.declarations_inserted += 1;
        debug!(
            file = context.file.display_name(),
            binding = context.runtime.name(),
            "runtime declaration inserted"
        );

        Ok(Rewrite::Mutated)
    }
}
