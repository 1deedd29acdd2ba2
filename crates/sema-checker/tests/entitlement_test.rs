//! Entitlements, entitlement mappings and authorized references

use pretty_assertions::assert_eq;
use sema_checker::ast::builders::*;
use sema_checker::ast::{Declaration, Program};
use sema_checker::{CheckError, Checker, CheckerConfig, Elaboration};
use sema_types::{BaseTypeRegistry, CompositeKind, VariableKind};

fn check(program: &Program) -> Result<Elaboration, Vec<CheckError>> {
    let registry = BaseTypeRegistry::new();
    Checker::new(&registry, CheckerConfig::default()).check_program(program)
}

/// entitlement E, F, G
/// entitlement mapping M { E -> F }
/// struct Inner {}
/// struct Outer { access(mapping M) let inner: auth(mapping M) &Inner }
fn mapped_declarations() -> Vec<Declaration> {
    vec![
        entitlement("E").into(),
        entitlement("F").into(),
        entitlement("G").into(),
        entitlement_mapping("M").relation("E", "F").into(),
        composite(CompositeKind::Structure, "Inner").into(),
        composite(CompositeKind::Structure, "Outer")
            .member(
                field(
                    VariableKind::Constant,
                    "inner",
                    annotation(mapped_reference("M", named("Inner"))),
                )
                .with_access(mapping_access("M")),
            )
            .into(),
        constant("outer", None, call(value("Outer"), vec![])).into(),
    ]
}

fn with(mut declarations: Vec<Declaration>, more: Vec<Declaration>) -> Program {
    declarations.extend(more);
    program(declarations)
}

#[test]
fn test_mapped_field_through_authorized_reference() {
    let program = with(
        mapped_declarations(),
        vec![
            constant(
                "ref",
                None,
                reference_to(value("outer"), auth_reference(&["E"], named("Outer"))),
            )
            .into(),
            constant("inner", None, member(value("ref"), "inner")).into(),
        ],
    );
    let elaboration = check(&program).unwrap();
    assert_eq!(elaboration.value_type_string("inner").as_deref(), Some("auth(F) &Inner"));
}

#[test]
fn test_mapped_field_through_unauthorized_reference() {
    let program = with(
        mapped_declarations(),
        vec![
            constant("ref", None, reference_to(value("outer"), reference(named("Outer")))).into(),
            constant("inner", None, member(value("ref"), "inner")).into(),
        ],
    );
    let elaboration = check(&program).unwrap();
    assert_eq!(elaboration.value_type_string("inner").as_deref(), Some("&Inner"));
}

#[test]
fn test_mapped_field_on_owned_value_is_fully_entitled() {
    let program = with(
        mapped_declarations(),
        vec![constant("inner", None, member(value("outer"), "inner")).into()],
    );
    let elaboration = check(&program).unwrap();
    assert_eq!(elaboration.value_type_string("inner").as_deref(), Some("auth(F) &Inner"));
}

#[test]
fn test_mapped_authorization_outside_mapped_member() {
    let program = with(
        mapped_declarations(),
        vec![composite(CompositeKind::Structure, "Other")
            .member(field(
                VariableKind::Constant,
                "inner",
                annotation(mapped_reference("M", named("Inner"))),
            ))
            .into()],
    );
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CheckError::InvalidMappedAuthorization { map, .. } if map == "M"));
}

#[test]
fn test_entitlement_set_access() {
    // struct Vault {
    //     access(E) fun withdraw() {}
    //     access(E | F) fun either() {}
    // }
    let program = program(vec![
        entitlement("E").into(),
        entitlement("F").into(),
        composite(CompositeKind::Structure, "Vault")
            .member(
                function("withdraw")
                    .with_access(entitlement_access(&["E"]))
                    .with_implementation(),
            )
            .member(
                function("either")
                    .with_access(sema_checker::ast::AccessModifier::Authorized(disjunction(&["E", "F"])))
                    .with_implementation(),
            )
            .into(),
        constant("vault", None, call(value("Vault"), vec![])).into(),
        constant("e", None, reference_to(value("vault"), auth_reference(&["E"], named("Vault")))).into(),
        constant("f", None, reference_to(value("vault"), auth_reference(&["F"], named("Vault")))).into(),
        constant("a", None, member(value("e"), "withdraw")).into(),
        constant("b", None, member(value("e"), "either")).into(),
        constant("c", None, member(value("f"), "either")).into(),
        constant("d", None, member(value("f"), "withdraw")).into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(matches!(&errors[0], CheckError::InvalidAccess { member, .. } if member == "withdraw"));
}

#[test]
fn test_authorized_reference_upcast() {
    // An `auth(E, F)` reference can be used where `auth(E)` is expected, not the reverse
    let program = program(vec![
        entitlement("E").into(),
        entitlement("F").into(),
        composite(CompositeKind::Structure, "S").into(),
        constant("s", None, call(value("S"), vec![])).into(),
        constant("both", None, reference_to(value("s"), auth_reference(&["E", "F"], named("S")))).into(),
        constant("one", Some(annotation(auth_reference(&["E"], named("S")))), value("both")).into(),
        constant("plain", Some(annotation(reference(named("S")))), value("both")).into(),
        constant("back", Some(annotation(auth_reference(&["E", "F"], named("S")))), value("one")).into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_type_mismatch());
}

#[test]
fn test_non_entitlement_in_access() {
    let program = program(vec![
        composite(CompositeKind::Structure, "NotAnEntitlement").into(),
        composite(CompositeKind::Structure, "S")
            .member(
                function("f")
                    .with_access(entitlement_access(&["NotAnEntitlement"]))
                    .with_implementation(),
            )
            .into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert!(matches!(
        &errors[0],
        CheckError::InvalidNonEntitlementAccess { ty, .. } if ty == "NotAnEntitlement"
    ));
}

#[test]
fn test_mapping_with_non_entitlement() {
    let program = program(vec![
        entitlement("E").into(),
        composite(CompositeKind::Structure, "S").into(),
        entitlement_mapping("M").relation("E", "S").into(),
    ]);
    let errors = check(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CheckError::InvalidNonEntitlementTypeInMap { ty, .. } if ty == "S"));
}

#[test]
fn test_included_mapping_relations_apply() {
    // entitlement mapping N { E -> G }
    // entitlement mapping M2 { include N }
    let program = with(
        mapped_declarations(),
        vec![
            entitlement_mapping("N").relation("E", "G").into(),
            entitlement_mapping("M2").include("N").include("Identity").into(),
            composite(CompositeKind::Structure, "Holder")
                .member(
                    field(
                        VariableKind::Constant,
                        "inner",
                        annotation(mapped_reference("M2", named("Inner"))),
                    )
                    .with_access(mapping_access("M2")),
                )
                .into(),
            constant("holder", None, call(value("Holder"), vec![])).into(),
            constant(
                "ref",
                None,
                reference_to(value("holder"), auth_reference(&["E"], named("Holder"))),
            )
            .into(),
            constant("inner", None, member(value("ref"), "inner")).into(),
        ],
    );
    let elaboration = check(&program).unwrap();
    assert_eq!(elaboration.value_type_string("inner").as_deref(), Some("auth(G, E) &Inner"));
}
