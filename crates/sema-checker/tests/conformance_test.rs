//! Interface conformance and member conflicts

use pretty_assertions::assert_eq;
use sema_checker::ast::builders::*;
use sema_checker::ast::{FunctionDeclaration, Program};
use sema_checker::{CheckError, Checker, CheckerConfig, Elaboration};
use sema_types::{BaseTypeRegistry, CompositeKind, VariableKind};

fn check(program: &Program) -> Result<Elaboration, Vec<CheckError>> {
    let registry = BaseTypeRegistry::new();
    Checker::new(&registry, CheckerConfig::default()).check_program(program)
}

fn conflicts(program: &Program) -> Vec<String> {
    match check(program) {
        Ok(_) => Vec::new(),
        Err(errors) => errors
            .into_iter()
            .map(|error| match error {
                CheckError::InterfaceMemberConflict {
                    interface,
                    conflicting_interface,
                    ..
                } => format!("{interface}/{conflicting_interface}"),
                other => panic!("unexpected error: {other:?}"),
            })
            .collect(),
    }
}

/// The three ways an interface can declare a function
#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    /// `fun foo()`
    Declaration,
    /// `fun foo() { pre {} }`
    Conditions,
    /// `fun foo() { ... }`
    Default,
}

const SHAPES: [Shape; 3] = [Shape::Declaration, Shape::Conditions, Shape::Default];

fn foo(shape: Shape) -> FunctionDeclaration {
    match shape {
        Shape::Declaration => function("foo"),
        Shape::Conditions => function("foo").with_condition(),
        Shape::Default => function("foo").with_implementation(),
    }
}

#[test]
fn test_inherited_member_combinations() {
    // struct interface A { <inherited> }
    // struct interface B: A { <declared> }
    for inherited in SHAPES {
        for declared in SHAPES {
            let program = program(vec![
                interface(CompositeKind::Structure, "A").member(foo(inherited)).into(),
                interface(CompositeKind::Structure, "B")
                    .conforms_to("A")
                    .member(foo(declared))
                    .into(),
            ]);

            // An inherited default may only be redeclared with conditions
            let expected = match (inherited, declared) {
                (Shape::Default, Shape::Declaration) | (Shape::Default, Shape::Default) => vec!["B/A".to_string()],
                _ => Vec::new(),
            };
            assert_eq!(
                conflicts(&program),
                expected,
                "inherited {inherited:?}, declared {declared:?}"
            );
        }
    }
}

#[test]
fn test_sibling_member_combinations() {
    // struct interface C: A, B {}
    for first in SHAPES {
        for second in SHAPES {
            let program = program(vec![
                interface(CompositeKind::Structure, "A").member(foo(first)).into(),
                interface(CompositeKind::Structure, "B").member(foo(second)).into(),
                interface(CompositeKind::Structure, "C")
                    .conforms_to("A")
                    .conforms_to("B")
                    .into(),
            ]);

            let expected = if first == Shape::Default && second == Shape::Default {
                vec!["B/A".to_string()]
            } else {
                Vec::new()
            };
            assert_eq!(conflicts(&program), expected, "first {first:?}, second {second:?}");
        }
    }
}

#[test]
fn test_mismatched_signatures_conflict() {
    let program = program(vec![
        interface(CompositeKind::Structure, "A")
            .member(function("foo").returns(annotation(named("Int"))))
            .into(),
        interface(CompositeKind::Structure, "B")
            .member(function("foo").returns(annotation(named("String"))))
            .into(),
        interface(CompositeKind::Structure, "C")
            .conforms_to("A")
            .conforms_to("B")
            .into(),
    ]);
    assert_eq!(conflicts(&program), vec!["B/A".to_string()]);
}

#[test]
fn test_composite_conforms_through_inheritance() {
    // resource interface Provider { fun withdraw(amount: UFix64): @Vault }
    // resource interface Receiver: Provider {}
    // resource Vault: Receiver { ... }
    let withdraw = || {
        function("withdraw")
            .parameter(None, "amount", annotation(named("UFix64")))
            .returns(resource(named("Vault")))
    };
    let program = program(vec![
        interface(CompositeKind::Resource, "Provider").member(withdraw()).into(),
        interface(CompositeKind::Resource, "Receiver").conforms_to("Provider").into(),
        composite(CompositeKind::Resource, "Vault")
            .conforms_to("Receiver")
            .member(field(VariableKind::Variable, "balance", annotation(named("UFix64"))))
            .member(withdraw().with_implementation())
            .into(),
    ]);
    assert!(check(&program).is_ok());
}

#[test]
fn test_missing_inherited_requirement() {
    let program = program(vec![
        interface(CompositeKind::Structure, "A").member(function("foo")).into(),
        interface(CompositeKind::Structure, "B").conforms_to("A").into(),
        composite(CompositeKind::Structure, "S").conforms_to("B").into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        CheckError::Conformance {
            composite,
            interface,
            missing_members,
            ..
        } => {
            assert_eq!(composite, "S");
            assert_eq!(interface, "A");
            assert_eq!(missing_members, &vec!["foo".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_conflicting_defaults_in_composite() {
    let program = program(vec![
        interface(CompositeKind::Structure, "A")
            .member(function("foo").with_implementation())
            .into(),
        interface(CompositeKind::Structure, "B")
            .member(function("foo").with_implementation())
            .into(),
        composite(CompositeKind::Structure, "S")
            .conforms_to("A")
            .conforms_to("B")
            .into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, CheckError::DefaultFunctionConflict { name, .. } if name == "foo")));
}

#[test]
fn test_struct_conforming_to_resource_interface() {
    let program = program(vec![
        interface(CompositeKind::Resource, "R").into(),
        composite(CompositeKind::Structure, "S").conforms_to("R").into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        CheckError::CompositeKindMismatch { expected, actual, .. } if expected == "structure" && actual == "resource"
    ));
}

#[test]
fn test_transitive_cycle() {
    let program = program(vec![
        interface(CompositeKind::Structure, "A").conforms_to("B").into(),
        interface(CompositeKind::Structure, "B").conforms_to("A").into(),
    ]);
    let errors = check(&program).unwrap_err();
    let cyclic: Vec<_> = errors
        .iter()
        .filter_map(|e| match e {
            CheckError::CyclicConformance { interface, .. } => Some(interface.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(cyclic, vec!["A", "B"]);
}
