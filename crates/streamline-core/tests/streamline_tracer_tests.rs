/*!
# Streamline Tracer Integration Tests

End-to-end tests of the marker transform through `ProgramTracer`.
*/

use streamline_core::ast::{
    Comment, Expression, ExpressionKind, Function, FunctionBody, Identifier, Program, Span, Statement,
    StatementKind, UnaryOperator, VariableKind,
};
use streamline_core::diagnostics::{CollectingSink, TransformError, UnsupportedConstruct};
use streamline_core::selection::{AlwaysSelect, FileDescriptor, SourceKind};
use streamline_core::tracer::{ProgramTracer, TransformOutput};
use streamline_core::{transform, TransformConfig};

use pretty_assertions::assert_eq;

fn tracer() -> anyhow::Result<ProgramTracer> {
    Ok(ProgramTracer::with_streamline_rules(TransformConfig::default())?)
}

fn single(expression: Expression) -> Program {
    Program::new(vec![Statement::expression(expression)])
}

fn main_js() -> FileDescriptor {
    FileDescriptor::new("main._js")
}

fn ident(name: &str) -> Expression {
    Expression::ident(name)
}

fn marker() -> Expression {
    ident("_")
}

fn runtime(property: &str) -> Expression {
    Expression::member(Expression::identifier(Identifier::new("$$streamline").into_done()), property)
}

fn future(index: usize, remaining: usize, callee: Expression, arguments: Vec<Expression>) -> Expression {
    Expression::call(
        Expression::call(runtime(&format!("future_{index}_{remaining}")), vec![callee]),
        arguments,
    )
}

fn awaited(inner: Expression) -> Expression {
    Expression::call(runtime("await"), vec![inner])
}

/// The statement after the runtime declaration, as an expression.
fn first_expression(output: &TransformOutput) -> &Expression {
    match &output.program.body[1].kind {
        StatementKind::Expression(expression) => expression,
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

/// Transform a single-call program and collect the diagnostics it raised.
fn reject(expression: Expression) -> anyhow::Result<(TransformError, CollectingSink)> {
    let mut tracer = tracer()?;
    let mut sink = CollectingSink::new();
    let result = tracer.transform_program_with_sink(single(expression), &FileDescriptor::new("lib/job._js"), &mut sink);
    match result {
        Err(error) => Ok((error, sink)),
        Ok(output) => panic!("Expected a diagnostic, got {:?}", output.program),
    }
}

#[test]
fn test_single_marker_call() -> anyhow::Result<()> {
    let mut tracer = tracer()?;

    // f(1, _)
    let program = single(Expression::call(ident("f"), vec![Expression::number(1.0), marker()]));
    let output = tracer.transform_program(program, &main_js())?;

    assert_eq!(
        first_expression(&output),
        &awaited(future(1, 1, ident("f"), vec![Expression::number(1.0)]))
    );
    assert_eq!(output.summary.calls_rewritten, 1);

    Ok(())
}

#[test]
fn test_two_marker_call() -> anyhow::Result<()> {
    let mut tracer = tracer()?;

    // f(1, a, _, b, _)
    let program = single(Expression::call(
        ident("f"),
        vec![Expression::number(1.0), ident("a"), marker(), ident("b"), marker()],
    ));
    let output = tracer.transform_program(program, &main_js())?;

    assert_eq!(
        first_expression(&output),
        &awaited(future(2, 3, ident("f"), vec![Expression::number(1.0), ident("a"), ident("b")]))
    );

    Ok(())
}

#[test]
fn test_three_markers_rejected() -> anyhow::Result<()> {
    // f(1, a, _, b, _, c, _)
    let call = Expression::call(
        ident("f"),
        vec![
            Expression::number(1.0),
            ident("a"),
            marker(),
            ident("b"),
            marker(),
            ident("c"),
            marker(),
        ],
    )
    .with_span(Span::at(3, 4, 30));

    let (error, sink) = reject(call)?;

    match &error {
        TransformError::TooManyMarkers { count, location, .. } => {
            assert_eq!(*count, 3);
            assert_eq!(location.file, "lib/job._js");
            assert_eq!((location.line, location.column), (3, 4));
        }
        other => panic!("Expected TooManyMarkers, got {:?}", other),
    }
    assert_eq!(sink.diagnostics, vec![error]);

    Ok(())
}

#[test]
fn test_future_marker_call() -> anyhow::Result<()> {
    let mut tracer = tracer()?;

    // f(1, !_)
    let program = single(Expression::call(
        ident("f"),
        vec![Expression::number(1.0), Expression::unary(UnaryOperator::Not, marker())],
    ));
    let output = tracer.transform_program(program, &main_js())?;

    assert_eq!(first_expression(&output), &future(1, 1, ident("f"), vec![Expression::number(1.0)]));

    Ok(())
}

#[test]
fn test_promise_and_array_markers_rejected() -> anyhow::Result<()> {
    let cases = [
        (Expression::unary(UnaryOperator::Void, marker()), UnsupportedConstruct::PromiseMarker),
        (Expression::array(vec![marker()]), UnsupportedConstruct::ArrayMarker),
    ];

    for (argument, expected) in cases {
        let call = Expression::call(ident("f"), vec![Expression::number(1.0), argument]);
        let (error, sink) = reject(call)?;

        assert_eq!(
            error,
            TransformError::UnsupportedSyntax {
                construct: expected,
                location: error.location().clone(),
            }
        );
        assert_eq!(sink.diagnostics.len(), 1);
    }

    Ok(())
}

#[test]
fn test_constructor_marker_rejected() -> anyhow::Result<()> {
    // new C(1, _)
    let construct = Expression::new_expr(ident("C"), vec![Expression::number(1.0), marker()]).with_span(Span::at(9, 2, 14));

    let (error, _) = reject(construct)?;

    assert_eq!(error.to_string(), "lib/job._js:9:2: unsupported syntax: marker arguments in constructor calls are not implemented");

    Ok(())
}

#[test]
fn test_array_method_with_marker() -> anyhow::Result<()> {
    let mut tracer = tracer()?;

    // arr.map_(fn, _)
    let program = single(Expression::call(
        Expression::member(ident("arr"), "map_"),
        vec![ident("fn"), marker()],
    ));
    let output = tracer.transform_program(program, &main_js())?;

    let adapted = Expression::call(runtime("array"), vec![ident("arr")]);
    assert_eq!(
        first_expression(&output),
        &awaited(future(1, 1, Expression::member(adapted, "map_"), vec![ident("fn")]))
    );
    assert_eq!(output.summary.receivers_adapted, 1);
    assert_eq!(output.summary.calls_rewritten, 1);

    Ok(())
}

#[test]
fn test_signature_and_body_calls() -> anyhow::Result<()> {
    let mut tracer = tracer()?;

    // function load(path, _) { var data = read(path, _); return data; }
    let function = Function::new(
        Some(Identifier::new("load")),
        vec![Identifier::new("path"), Identifier::new("_")],
        FunctionBody::Block(vec![
            Statement::declare(
                VariableKind::Var,
                "data",
                Some(Expression::call(ident("read"), vec![ident("path"), marker()])),
            ),
            Statement::return_value(ident("data")),
        ]),
    );
    let output = tracer.transform_program(Program::new(vec![Statement::function(function)]), &main_js())?;

    let body = vec![
        Statement::declare(
            VariableKind::Var,
            "data",
            Some(awaited(future(1, 1, ident("read"), vec![ident("path")]))),
        ),
        Statement::return_value(ident("data")),
    ];
    let completion = Expression::call(
        Expression::identifier(Identifier::new("_").into_done()),
        vec![
            Expression::null(),
            Expression::call(Expression::arrow(Vec::new(), FunctionBody::Block(body)), Vec::new()),
        ],
    );
    let expected = Function::new(
        Some(Identifier::new("load")),
        vec![Identifier::new("path"), Identifier::new("_").into_done()],
        FunctionBody::Block(vec![Statement::expression(completion)]),
    );

    assert_eq!(output.program.body[1], Statement::function(expected));
    assert_eq!(output.summary.functions_rewritten, 1);
    assert_eq!(output.summary.calls_rewritten, 1);

    Ok(())
}

#[test]
fn test_nested_marker_calls() -> anyhow::Result<()> {
    let mut tracer = tracer()?;

    // f(g(_), _)
    let program = single(Expression::call(
        ident("f"),
        vec![Expression::call(ident("g"), vec![marker()]), marker()],
    ));
    let output = tracer.transform_program(program, &main_js())?;

    let inner = awaited(future(0, 0, ident("g"), vec![]));
    assert_eq!(first_expression(&output), &awaited(future(1, 1, ident("f"), vec![inner])));
    assert_eq!(output.summary.calls_rewritten, 2);

    Ok(())
}

#[test]
fn test_unselected_file_is_untouched() -> anyhow::Result<()> {
    let mut tracer = tracer()?;
    let program = single(Expression::call(ident("f"), vec![Expression::number(1.0), marker()]));

    let output = tracer.transform_program(program.clone(), &FileDescriptor::new("main.js"))?;

    assert_eq!(output.program, program);
    assert!(output.summary.skipped);
    assert_eq!(output.summary.rewrites(), 0);

    Ok(())
}

#[test]
fn test_selection_rules() -> anyhow::Result<()> {
    let tracer = tracer()?;

    assert!(tracer.should_transform(&FileDescriptor::new("lib/db._js")));
    assert!(tracer.should_transform(&FileDescriptor::new("src/view._coffee")));
    assert!(tracer.should_transform(&FileDescriptor::unknown()));
    assert!(!tracer.should_transform(&FileDescriptor::new("lib/db.js")));
    assert!(tracer.should_transform(&FileDescriptor::new("lib/db.js").with_source_kind(SourceKind::Streamline)));
    assert!(!tracer.should_transform(&FileDescriptor::new("lib/db._js").with_source_kind(SourceKind::Plain)));

    let forced = tracer.with_selector(AlwaysSelect);
    assert!(forced.should_transform(&FileDescriptor::new("lib/db.js")));

    Ok(())
}

#[test]
fn test_declaration_carries_leading_comments() -> anyhow::Result<()> {
    let mut tracer = tracer()?;
    let program = Program::new(vec![
        Statement::expression(ident("start")).with_comments(vec![Comment::line(" entry point")]),
        Statement::expression(ident("stop")),
    ]);

    let output = tracer.transform_program(program, &main_js())?;

    let declarations: Vec<_> = output
        .program
        .body
        .iter()
        .filter(|statement| matches!(statement.kind, StatementKind::VariableDeclaration { .. }))
        .collect();
    assert_eq!(declarations.len(), 1);
    assert_eq!(
        output.program.body[0].leading_comments,
        vec![
            Comment::line(" entry point"),
            Comment::block("::declare type _<T> = (err : ?Error, result : T) => void;"),
        ]
    );
    assert!(output.program.body[1].leading_comments.is_empty());
    assert_eq!(output.summary.declarations_inserted, 1);

    Ok(())
}

#[test]
fn test_custom_runtime_binding_and_marker() -> anyhow::Result<()> {
    let config = TransformConfig {
        runtime_binding: "rt".to_string(),
        marker: "cb".to_string(),
        ..Default::default()
    };
    let mut tracer = ProgramTracer::with_streamline_rules(config)?;

    let program = single(Expression::call(ident("f"), vec![ident("cb"), ident("_")]));
    let output = tracer.transform_program(program, &main_js())?;

    let rt = |property: &str| Expression::member(Expression::identifier(Identifier::new("rt").into_done()), property);
    let expected = Expression::call(
        rt("await"),
        vec![Expression::call(
            Expression::call(rt("future_0_1"), vec![ident("f")]),
            vec![ident("_")],
        )],
    );
    assert_eq!(first_expression(&output), &expected);

    Ok(())
}

#[test]
fn test_second_pass_changes_nothing() -> anyhow::Result<()> {
    let mut tracer = tracer()?;
    let program = Program::new(vec![
        Statement::function(Function::new(
            Some(Identifier::new("each")),
            vec![Identifier::new("items"), Identifier::new("_")],
            FunctionBody::Block(vec![Statement::expression(Expression::call(
                Expression::member(ident("items"), "forEach_"),
                vec![marker(), ident("visit")],
            ))]),
        )),
        Statement::expression(Expression::call(
            ident("each"),
            vec![ident("list"), Expression::unary(UnaryOperator::Not, marker())],
        )),
    ]);

    let first = tracer.transform_program(program, &main_js())?;
    let second = tracer.transform_program(first.program.clone(), &main_js())?;

    assert_eq!(second.program, first.program);
    assert_eq!(second.summary.declarations_inserted, 0);
    assert_eq!(second.summary.rewrites(), 0);

    Ok(())
}

#[test]
fn test_identical_input_identical_output() -> anyhow::Result<()> {
    let program = single(Expression::call(
        Expression::member(ident("rows"), "filter_"),
        vec![marker(), Expression::function(None, vec![Identifier::new("row"), Identifier::new("_")], vec![])],
    ));

    let a = tracer()?.transform_program(program.clone(), &main_js())?;
    let b = tracer()?.transform_program(program, &main_js())?;

    assert_eq!(a, b);

    Ok(())
}

#[test]
fn test_rule_statistics() -> anyhow::Result<()> {
    let mut tracer = tracer()?;
    let program = Program::new(vec![
        Statement::expression(Expression::call(ident("f"), vec![marker()])),
        Statement::expression(Expression::call(ident("g"), vec![ident("x")])),
    ]);

    tracer.transform_program(program, &main_js())?;

    let stats = tracer.stats();
    assert_eq!(stats["ProgramInitializer"].transformations, 1);
    assert_eq!(stats["CallRewriter"].transformations, 1);
    assert_eq!(stats["SignatureRewriter"].applications, 0);
    assert_eq!(stats["ConstructorRewriter"].errors, 0);
    assert!(stats["CallRewriter"].applications >= 4);

    tracer.clear_stats();
    assert_eq!(tracer.stats()["CallRewriter"].applications, 0);

    Ok(())
}

#[test]
fn test_computed_member_keeps_receiver() -> anyhow::Result<()> {
    let mut tracer = tracer()?;

    // arr["map_"](fn)
    let call = Expression::call(
        Expression::computed_member(ident("arr"), Expression::string("map_")),
        vec![ident("fn")],
    );
    let output = tracer.transform_program(single(call.clone()), &main_js())?;

    assert_eq!(first_expression(&output), &call);
    assert!(matches!(first_expression(&output).kind, ExpressionKind::Call(_)));

    Ok(())
}

fn not_marker() -> Expression {
    Expression::unary(UnaryOperator::Not, marker())
}

#[test]
fn test_replaced_call_is_examined_again() -> anyhow::Result<()> {
    let mut tracer = tracer()?;

    // f(!_, !_): the second marker sits in the replacement's outer call
    let output = tracer.transform_program(
        single(Expression::call(ident("f"), vec![not_marker(), not_marker()])),
        &main_js(),
    )?;

    let first = Expression::call(runtime("future_0_1"), vec![ident("f")]);
    assert_eq!(first_expression(&output), &future(0, 0, first, vec![]));
    assert_eq!(output.summary.calls_rewritten, 2);

    Ok(())
}

#[test]
fn test_plain_then_future_marker() -> anyhow::Result<()> {
    let mut tracer = tracer()?;

    // f(!_, _): the plain marker wins, the future marker is consumed inside the await
    let output = tracer.transform_program(
        single(Expression::call(ident("f"), vec![not_marker(), marker()])),
        &main_js(),
    )?;

    let inner = Expression::call(runtime("future_1_1"), vec![ident("f")]);
    assert_eq!(first_expression(&output), &awaited(future(0, 0, inner, vec![])));
    assert_eq!(output.summary.calls_rewritten, 2);

    Ok(())
}

#[test]
fn test_replacement_limit_aborts_file() -> anyhow::Result<()> {
    let mut tracer = tracer()?.max_iterations(2);
    let mut sink = CollectingSink::new();

    // f(!_, !_, !_, !_) needs four replacements of the same call
    let call = Expression::call(ident("f"), vec![not_marker(), not_marker(), not_marker(), not_marker()])
        .with_span(Span::at(5, 0, 20));
    let result = tracer.transform_program_with_sink(single(call), &main_js(), &mut sink);

    let error = match result {
        Err(error) => error,
        Ok(output) => panic!("Expected ReplacementLimit, got {:?}", output.program),
    };
    assert_eq!(
        error,
        TransformError::ReplacementLimit {
            marker: "_".to_string(),
            limit: 2,
            location: error.location().clone(),
        }
    );
    assert_eq!(error.location().to_string(), "main._js:5:0");
    assert_eq!(sink.diagnostics, vec![error]);

    Ok(())
}

#[test]
fn test_replacement_limit_allows_finished_call() -> anyhow::Result<()> {
    let mut tracer = tracer()?.max_iterations(2);

    let output = tracer.transform_program(
        single(Expression::call(ident("f"), vec![not_marker(), not_marker()])),
        &main_js(),
    )?;

    let first = Expression::call(runtime("future_0_1"), vec![ident("f")]);
    assert_eq!(first_expression(&output), &future(0, 0, first, vec![]));

    Ok(())
}

#[test]
fn test_user_binding_does_not_replace_declaration() -> anyhow::Result<()> {
    let mut tracer = tracer()?;
    let user = Statement::declare(VariableKind::Let, "$$streamline", Some(Expression::number(1.0)));
    let program = Program::new(vec![
        user.clone(),
        Statement::expression(Expression::call(ident("f"), vec![marker()])),
    ]);

    let output = tracer.transform_program(program, &FileDescriptor::new("a._js"))?;

    assert_eq!(output.summary.declarations_inserted, 1);
    assert_eq!(output.program.body.len(), 3);
    match &output.program.body[0].kind {
        StatementKind::VariableDeclaration { kind, .. } => assert_eq!(*kind, VariableKind::Var),
        other => panic!("Expected runtime declaration, got {:?}", other),
    }
    assert_eq!(output.program.body[1], user);

    Ok(())
}

#[test]
fn test_rules_run_in_priority_order() -> anyhow::Result<()> {
    let tracer = tracer()?;

    assert_eq!(
        tracer.rule_names(),
        vec!["ProgramInitializer", "SignatureRewriter", "CallRewriter", "ConstructorRewriter"]
    );

    Ok(())
}

#[test]
fn test_transform_with_default_config() -> anyhow::Result<()> {
    let output = transform(single(Expression::call(ident("f"), vec![marker()])), &main_js())?;

    assert_eq!(first_expression(&output), &awaited(future(0, 0, ident("f"), vec![])));

    let skipped = transform(single(ident("x")), &FileDescriptor::new("main.js"))?;
    assert!(skipped.summary.skipped);

    Ok(())
}
