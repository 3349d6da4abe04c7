// Constructors for tree nodes. Rewrites use these to build replacement nodes,
// tests use them to build input trees.

use super::*;

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Node with no source position, as produced by a rewrite.
    pub fn synthetic(kind: ExpressionKind) -> Self {
        Self::new(kind, Span::SYNTHETIC)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::synthetic(ExpressionKind::Identifier(Identifier::new(name)))
    }

    pub fn identifier(ident: Identifier) -> Self {
        Self::synthetic(ExpressionKind::Identifier(ident))
    }

    pub fn null() -> Self {
        Self::synthetic(ExpressionKind::Literal(Literal::Null))
    }

    pub fn number(value: f64) -> Self {
        Self::synthetic(ExpressionKind::Literal(Literal::Number(value)))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::synthetic(ExpressionKind::Literal(Literal::String(value.into())))
    }

    pub fn boolean(value: bool) -> Self {
        Self::synthetic(ExpressionKind::Literal(Literal::Boolean(value)))
    }

    pub fn unary(operator: UnaryOperator, argument: Expression) -> Self {
        Self::synthetic(ExpressionKind::Unary {
            operator,
            argument: Box::new(argument),
        })
    }

    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Self::synthetic(ExpressionKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn array(elements: Vec<Expression>) -> Self {
        Self::synthetic(ExpressionKind::Array(
            elements.into_iter().map(Some).collect(),
        ))
    }

    /// `object.property`
    pub fn member(object: Expression, property: impl Into<String>) -> Self {
        Self::synthetic(ExpressionKind::Member(MemberExpression {
            object: Box::new(object),
            property: MemberProperty::Identifier(Identifier::new(property)),
        }))
    }

    /// `object[property]`
    pub fn computed_member(object: Expression, property: Expression) -> Self {
        Self::synthetic(ExpressionKind::Member(MemberExpression {
            object: Box::new(object),
            property: MemberProperty::Computed(Box::new(property)),
        }))
    }

    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Self {
        Self::synthetic(ExpressionKind::Call(CallExpression {
            callee: Box::new(callee),
            arguments,
        }))
    }

    pub fn new_expr(callee: Expression, arguments: Vec<Expression>) -> Self {
        Self::synthetic(ExpressionKind::New(NewExpression {
            callee: Box::new(callee),
            arguments,
        }))
    }

    pub fn arrow(params: Vec<Identifier>, body: FunctionBody) -> Self {
        Self::synthetic(ExpressionKind::Arrow(Function::new(None, params, body)))
    }

    pub fn function(id: Option<Identifier>, params: Vec<Identifier>, body: Vec<Statement>) -> Self {
        Self::synthetic(ExpressionKind::Function(Function::new(
            id,
            params,
            FunctionBody::Block(body),
        )))
    }

    pub fn as_call(&self) -> Option<&CallExpression> {
        match &self.kind {
            ExpressionKind::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match &self.kind {
            ExpressionKind::Identifier(ident) => Some(ident),
            _ => None,
        }
    }
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self {
            kind,
            span,
            leading_comments: Vec::new(),
        }
    }

    pub fn synthetic(kind: StatementKind) -> Self {
        Self::new(kind, Span::SYNTHETIC)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.leading_comments = comments;
        self
    }

    pub fn expression(expression: Expression) -> Self {
        Self::synthetic(StatementKind::Expression(expression))
    }

    pub fn return_value(value: Expression) -> Self {
        Self::synthetic(StatementKind::Return(Some(value)))
    }

    /// `kind name = init;`
    pub fn declare(kind: VariableKind, name: impl Into<String>, init: Option<Expression>) -> Self {
        Self::synthetic(StatementKind::VariableDeclaration {
            kind,
            declarations: vec![VariableDeclarator {
                id: Identifier::new(name),
                init,
            }],
        })
    }

    pub fn function(function: Function) -> Self {
        Self::synthetic(StatementKind::FunctionDeclaration(function))
    }

    pub fn block(body: Vec<Statement>) -> Self {
        Self::synthetic(StatementKind::Block(body))
    }
}

impl Function {
    pub fn new(id: Option<Identifier>, params: Vec<Identifier>, body: FunctionBody) -> Self {
        Self {
            id,
            params,
            body,
            span: Span::SYNTHETIC,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}
