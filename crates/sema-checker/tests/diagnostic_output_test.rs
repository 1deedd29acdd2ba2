//! Rendering checker errors as diagnostics

use sema_checker::ast::builders::*;
use sema_checker::ast::Program;
use sema_checker::diagnostic::{create_files, JsonDiagnostic};
use sema_checker::{CheckError, Checker, CheckerConfig, Diagnostic, ErrorCode};
use sema_types::{BaseTypeRegistry, Span};

fn errors(program: &Program) -> Vec<CheckError> {
    let registry = BaseTypeRegistry::new();
    Checker::new(&registry, CheckerConfig::default())
        .check_program(program)
        .err()
        .unwrap_or_default()
}

#[test]
fn test_mismatch_diagnostic_points_at_value() {
    // let x: Int = true
    let source = "let x: Int = true";
    let program = program(vec![constant(
        "x",
        Some(annotation(named("Int"))),
        boolean(true).at(Span::new(13, 17, 1, 14)),
    )
    .into()]);

    let errors = errors(&program);
    assert_eq!(errors.len(), 1);

    let files = create_files("main.cdc", source);
    let diag = Diagnostic::from_check_error(&errors[0], 0);
    assert_eq!(diag.code(), Some(ErrorCode("E2001")));

    let json: JsonDiagnostic = serde_json::from_str(&diag.to_json(&files).unwrap()).unwrap();
    assert_eq!(json.message, "mismatched types: expected `Int`, got `Bool`");
    assert_eq!(json.labels.len(), 1);
    assert_eq!(json.labels[0].start_line, 1);
    assert_eq!(json.labels[0].start_column, 14);
    assert_eq!(json.labels[0].end_column, 18);
}

#[test]
fn test_every_error_has_a_code_and_span() {
    let program = program(vec![
        constant("a", None, value("missing")).into(),
        constant("b", Some(annotation(named("Missing"))), int(1)).into(),
        constant("c", Some(annotation(named("UInt8"))), int(1000)).into(),
        constant("d", None, coalesce(int(1), int(2))).into(),
    ]);

    let errors = errors(&program);
    assert_eq!(errors.len(), 4);

    let codes: Vec<_> = errors.iter().map(|e| e.code().as_str()).collect();
    assert_eq!(codes, vec!["E1002", "E1002", "E2012", "E2004"]);
    for error in &errors {
        let diag = Diagnostic::from_check_error(error, 0);
        assert!(!diag.inner().labels.is_empty());
        assert_eq!(diag.inner().labels[0].range, error.span().start..error.span().end);
    }
}

#[test]
fn test_emit_to_terminal() {
    let source = "let a = missing";
    let error = CheckError::NotDeclared {
        name: "missing".to_string(),
        kind: "value".to_string(),
        span: Span::new(8, 15, 1, 9),
    };
    let files = create_files("main.cdc", source);
    assert!(Diagnostic::from_check_error(&error, 0).emit(&files).is_ok());
}
