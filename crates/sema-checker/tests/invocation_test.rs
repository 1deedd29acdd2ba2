//! Invocations: argument labels and counts, generic inference

use pretty_assertions::assert_eq;
use sema_checker::ast::builders::*;
use sema_checker::ast::{Declaration, Program};
use sema_checker::{CheckError, Checker, CheckerConfig, Elaboration};
use sema_types::{BaseTypeRegistry, CompositeKind};

fn check(program: &Program) -> Result<Elaboration, Vec<CheckError>> {
    let registry = BaseTypeRegistry::new();
    Checker::new(&registry, CheckerConfig::default()).check_program(program)
}

/// fun add(x: Int, _ y: Int): Int
fn add() -> Declaration {
    function("add")
        .parameter(None, "x", annotation(named("Int")))
        .parameter(Some("_"), "y", annotation(named("Int")))
        .returns(annotation(named("Int")))
        .with_implementation()
        .into()
}

/// fun identity<T>(_ value: T): T
fn identity() -> Declaration {
    function("identity")
        .type_parameter("T", None)
        .parameter(Some("_"), "value", annotation(named("T")))
        .returns(annotation(named("T")))
        .with_implementation()
        .into()
}

#[test]
fn test_labelled_call() {
    let program = program(vec![
        add(),
        constant("sum", None, call(value("add"), vec![labeled("x", int(1)), arg(int(2))])).into(),
    ]);
    let elaboration = check(&program).unwrap();
    assert_eq!(elaboration.value_type_string("sum").as_deref(), Some("Int"));
    assert_eq!(elaboration.value_type_string("add").as_deref(), Some("fun(x: Int, _ y: Int): Int"));
}

#[test]
fn test_missing_label() {
    let program = program(vec![
        add(),
        constant("sum", None, call(value("add"), vec![arg(int(1)), arg(int(2))])).into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CheckError::MissingArgumentLabel { expected, .. } if expected == "x"));
}

#[test]
fn test_incorrect_labels() {
    let program = program(vec![
        add(),
        constant("sum", None, call(value("add"), vec![labeled("z", int(1)), labeled("y", int(2))])).into(),
    ]);
    let errors = check(&program).unwrap_err();
    let labels: Vec<_> = errors
        .iter()
        .map(|e| match e {
            CheckError::IncorrectArgumentLabel { expected, actual, .. } => (expected.as_str(), actual.as_str()),
            other => panic!("unexpected error: {other:?}"),
        })
        .collect();
    assert_eq!(labels, vec![("x", "z"), ("_", "y")]);
}

#[test]
fn test_argument_count() {
    let program = program(vec![
        add(),
        constant("few", None, call(value("add"), vec![labeled("x", int(1))])).into(),
        constant(
            "many",
            None,
            call(value("add"), vec![labeled("x", int(1)), arg(int(2)), arg(int(3))]),
        )
        .into(),
    ]);
    let errors = check(&program).unwrap_err();
    let counts: Vec<_> = errors
        .iter()
        .filter_map(|e| match e {
            CheckError::ArgumentCountMismatch { expected, actual, .. } => Some((*expected, *actual)),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![(2, 1), (2, 3)]);
}

#[test]
fn test_argument_type_mismatch() {
    let program = program(vec![
        add(),
        constant("sum", None, call(value("add"), vec![labeled("x", boolean(true)), arg(int(2))])).into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_type_mismatch());
}

#[test]
fn test_optional_trailing_argument() {
    // assert(condition, message: "...") takes an optional message
    let program = program(vec![
        constant("a", None, call(value("assert"), vec![arg(boolean(true))])).into(),
        constant(
            "b",
            None,
            call(value("assert"), vec![arg(boolean(true)), labeled("message", string("no"))]),
        )
        .into(),
    ]);
    let elaboration = check(&program).unwrap();
    assert_eq!(elaboration.value_type_string("a").as_deref(), Some("Void"));
}

#[test]
fn test_generic_inference() {
    let program = program(vec![
        identity(),
        constant("a", None, call(value("identity"), vec![arg(string("x"))])).into(),
        constant("b", None, call(value("identity"), vec![arg(int(1))])).into(),
    ]);
    let elaboration = check(&program).unwrap();
    assert_eq!(elaboration.value_type_string("a").as_deref(), Some("String"));
    assert_eq!(elaboration.value_type_string("b").as_deref(), Some("Int"));
    assert_eq!(
        elaboration.value_type_string("identity").as_deref(),
        Some("fun<T>(_ value: T): T")
    );
}

#[test]
fn test_explicit_type_arguments() {
    let program = program(vec![
        identity(),
        constant(
            "a",
            None,
            call_generic(value("identity"), vec![annotation(named("UInt8"))], vec![arg(int(1))]),
        )
        .into(),
        constant(
            "b",
            None,
            call_generic(
                value("identity"),
                vec![annotation(named("Int")), annotation(named("Int"))],
                vec![arg(int(1))],
            ),
        )
        .into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert!(matches!(
        errors[0],
        CheckError::InvalidTypeArgumentCount { expected: 1, actual: 2, .. }
    ));
}

#[test]
fn test_explicit_type_argument_drives_literal() {
    let program = program(vec![
        identity(),
        constant(
            "a",
            None,
            call_generic(value("identity"), vec![annotation(named("UInt8"))], vec![arg(int(1))]),
        )
        .into(),
    ]);
    let elaboration = check(&program).unwrap();
    assert_eq!(elaboration.value_type_string("a").as_deref(), Some("UInt8"));
}

#[test]
fn test_uninferable_type_parameter() {
    // fun make<T>(): T
    let program = program(vec![
        function("make")
            .type_parameter("T", None)
            .returns(annotation(named("T")))
            .with_implementation()
            .into(),
        constant("x", None, call(value("make"), vec![])).into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CheckError::TypeParameterTypeInference { name, .. } if name == "T"));
}

#[test]
fn test_type_bound() {
    // fun count<T: Integer>(_ value: T): T
    let program = program(vec![
        function("count")
            .type_parameter("T", Some(annotation(named("Integer"))))
            .parameter(Some("_"), "value", annotation(named("T")))
            .returns(annotation(named("T")))
            .with_implementation()
            .into(),
        constant("ok", None, call(value("count"), vec![arg(int(1))])).into(),
        constant("bad", None, call(value("count"), vec![arg(string("one"))])).into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert!(errors[0].is_type_mismatch(), "{:?}", errors[0]);
}

#[test]
fn test_constructor_invocation() {
    // struct Point { init(x: Int, _ y: Int) }
    let program = program(vec![
        composite(CompositeKind::Structure, "Point")
            .member(as_initializer(
                initializer()
                    .parameter(None, "x", annotation(named("Int")))
                    .parameter(Some("_"), "y", annotation(named("Int")))
                    .with_implementation(),
            ))
            .into(),
        constant("p", None, call(value("Point"), vec![labeled("x", int(1)), arg(int(2))])).into(),
        constant("q", None, call(value("Point"), vec![])).into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], CheckError::ArgumentCountMismatch { expected: 2, actual: 0, .. }));
}
