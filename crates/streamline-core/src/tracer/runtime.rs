/*!
# Runtime Binding

The per-file identifier bound to the runtime library, and the shapes of the
references rewrites emit against it.
*/

use crate::ast::{Expression, Identifier, Statement, VariableKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeBinding {
    name: String,
}

impl RuntimeBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> Identifier {
        Identifier::new(self.name.as_str()).into_done()
    }

    /// `$$streamline.<property>`
    pub fn member(&self, property: impl Into<String>) -> Expression {
        Expression::member(Expression::identifier(self.identifier()), property)
    }

    /// `$$streamline.future_<index>_<remaining>`
    pub fn future_adapter(&self, index: usize, remaining: usize) -> Expression {
        self.member(format!("future_{index}_{remaining}"))
    }

    /// `$$streamline.await`
    pub fn await_fn(&self) -> Expression {
        self.member("await")
    }

    /// `$$streamline.array`
    pub fn array_adapter(&self) -> Expression {
        self.member("array")
    }

    /// `var $$streamline = require("<module>").<export>;`
    pub fn declaration(&self, module: &str, export: &str) -> Statement {
        let require = Expression::call(
            Expression::ident("require"),
            vec![Expression::string(module)],
        );
        Statement::declare(
            VariableKind::Var,
            self.name.as_str(),
            Some(Expression::member(require, export)),
        )
    }

    /// Whether `statement` is the declaration this binding would emit for
    /// `module` and `export`. A user variable of the same name does not count.
    pub fn is_declared_by(&self, statement: &Statement, module: &str, export: &str) -> bool {
        statement.kind == self.declaration(module, export).kind
    }
}
