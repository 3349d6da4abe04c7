//! Mutable pre-order traversal.
//!
//! `VisitMut` hands out `&mut` slots, so a visitor replaces a node by
//! assigning into the slot it was given and edits child lists in place. The
//! default methods forward to the `walk_*` functions, which visit children
//! left to right. Visitors that override a method and still want the
//! children visited call the matching `walk_*` function themselves.
//!
//! Traversal is fallible: the first `Err` returned by a visit method stops
//! the walk and is propagated to the caller.

use super::*;

pub trait VisitMut {
    type Error;

    fn visit_program(&mut self, program: &mut Program) -> Result<(), Self::Error> {
        walk_program(self, program)
    }

    fn visit_statement(&mut self, statement: &mut Statement) -> Result<(), Self::Error> {
        walk_statement(self, statement)
    }

    fn visit_expression(&mut self, expression: &mut Expression) -> Result<(), Self::Error> {
        walk_expression(self, expression)
    }

    fn visit_function(&mut self, function: &mut Function) -> Result<(), Self::Error> {
        walk_function(self, function)
    }
}

pub fn walk_program<V: VisitMut + ?Sized>(visitor: &mut V, program: &mut Program) -> Result<(), V::Error> {
    for statement in &mut program.body {
        visitor.visit_statement(statement)?;
    }
    Ok(())
}

pub fn walk_statement<V: VisitMut + ?Sized>(visitor: &mut V, statement: &mut Statement) -> Result<(), V::Error> {
    match &mut statement.kind {
        StatementKind::Expression(expression) | StatementKind::Throw(expression) => {
            visitor.visit_expression(expression)
        }
        StatementKind::VariableDeclaration { declarations, .. } => {
            for declarator in declarations {
                if let Some(init) = &mut declarator.init {
                    visitor.visit_expression(init)?;
                }
            }
            Ok(())
        }
        StatementKind::FunctionDeclaration(function) => visitor.visit_function(function),
        StatementKind::Return(value) => match value {
            Some(value) => visitor.visit_expression(value),
            None => Ok(()),
        },
        StatementKind::If { test, consequent, alternate } => {
            visitor.visit_expression(test)?;
            visitor.visit_statement(consequent)?;
            if let Some(alternate) = alternate {
                visitor.visit_statement(alternate)?;
            }
            Ok(())
        }
        StatementKind::While { test, body } => {
            visitor.visit_expression(test)?;
            visitor.visit_statement(body)
        }
        StatementKind::Block(body) => {
            for statement in body {
                visitor.visit_statement(statement)?;
            }
            Ok(())
        }
        StatementKind::Empty => Ok(()),
    }
}

pub fn walk_expression<V: VisitMut + ?Sized>(visitor: &mut V, expression: &mut Expression) -> Result<(), V::Error> {
    match &mut expression.kind {
        ExpressionKind::Identifier(_) | ExpressionKind::Literal(_) | ExpressionKind::This => Ok(()),
        ExpressionKind::Array(elements) => {
            for element in elements.iter_mut().flatten() {
                visitor.visit_expression(element)?;
            }
            Ok(())
        }
        ExpressionKind::Object(properties) => {
            for property in properties {
                if let PropertyKey::Computed(key) = &mut property.key {
                    visitor.visit_expression(key)?;
                }
                visitor.visit_expression(&mut property.value)?;
            }
            Ok(())
        }
        ExpressionKind::Function(function) | ExpressionKind::Arrow(function) => {
            visitor.visit_function(function)
        }
        ExpressionKind::Unary { argument, .. } => visitor.visit_expression(argument),
        ExpressionKind::Spread(argument) => visitor.visit_expression(argument),
        ExpressionKind::Binary { left, right, .. } | ExpressionKind::Logical { left, right, .. } => {
            visitor.visit_expression(left)?;
            visitor.visit_expression(right)
        }
        ExpressionKind::Assignment { target, value, .. } => {
            visitor.visit_expression(target)?;
            visitor.visit_expression(value)
        }
        ExpressionKind::Conditional { test, consequent, alternate } => {
            visitor.visit_expression(test)?;
            visitor.visit_expression(consequent)?;
            visitor.visit_expression(alternate)
        }
        ExpressionKind::Member(member) => {
            visitor.visit_expression(&mut member.object)?;
            if let MemberProperty::Computed(property) = &mut member.property {
                visitor.visit_expression(property)?;
            }
            Ok(())
        }
        ExpressionKind::Call(CallExpression { callee, arguments })
        | ExpressionKind::New(NewExpression { callee, arguments }) => {
            visitor.visit_expression(callee)?;
            for argument in arguments {
                visitor.visit_expression(argument)?;
            }
            Ok(())
        }
        ExpressionKind::Sequence(expressions) => {
            for expression in expressions {
                visitor.visit_expression(expression)?;
            }
            Ok(())
        }
    }
}

pub fn walk_function<V: VisitMut + ?Sized>(visitor: &mut V, function: &mut Function) -> Result<(), V::Error> {
    match &mut function.body {
        FunctionBody::Block(body) => {
            for statement in body {
                visitor.visit_statement(statement)?;
            }
            Ok(())
        }
        FunctionBody::Expression(expression) => visitor.visit_expression(expression),
    }
}
