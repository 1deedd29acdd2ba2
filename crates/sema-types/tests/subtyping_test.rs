use sema_types::{
    Access, CompositeKind, CompositeType, EntitlementType, FunctionPurity, FunctionType,
    InterfaceType, Location, NumericType, Parameter, SimpleType, SubtypingContext, TypeContext,
    TypeId,
};

fn location() -> Location {
    Location::StringLocation("test".to_string())
}

/// A spread of structural and nominal types used by the property checks
fn sample_types(ctx: &mut TypeContext) -> Vec<TypeId> {
    let int = ctx.int_type();
    let uint8 = ctx.numeric(NumericType::UInt8);
    let string = ctx.string_type();

    let interface = ctx.declare_interface(InterfaceType::new(
        Some(location()),
        CompositeKind::Resource,
        "Receiver",
    ));
    let mut vault = CompositeType::new(Some(location()), CompositeKind::Resource, "Vault");
    vault.explicit_conformances = vec![interface];
    let vault = ctx.declare_composite(vault);
    let point = ctx.declare_composite(CompositeType::new(
        Some(location()),
        CompositeKind::Structure,
        "Point",
    ));

    let optional_int = ctx.optional_type(int);
    let ints = ctx.variable_sized_type(int);
    let bytes = ctx.constant_sized_type(uint8, 4);
    let dictionary = ctx.dictionary_type(string, int);
    let any_resource = ctx.any_resource_type();
    let restricted = ctx.restricted_type(Some(any_resource), vec![interface]);
    let vault_restricted = ctx.restricted_type(Some(vault), vec![interface]);
    let reference = ctx.reference_type(vault, Access::UNAUTHORIZED);
    let capability = ctx.capability_type(Some(reference));

    let int_annotation = ctx.type_annotation(int);
    let string_annotation = ctx.type_annotation(string);
    let function = ctx.function_type(FunctionType::new(
        FunctionPurity::View,
        vec![Parameter::unlabeled("value", int_annotation)],
        string_annotation,
    ));

    let mut types: Vec<TypeId> = SimpleType::ALL
        .iter()
        .filter(|simple| **simple != SimpleType::Invalid)
        .map(|simple| ctx.simple(*simple))
        .collect();
    types.extend(NumericType::ALL.iter().map(|numeric| ctx.numeric(*numeric)));
    types.extend([
        ctx.nil_type(),
        optional_int,
        ints,
        bytes,
        dictionary,
        vault,
        point,
        interface,
        restricted,
        vault_restricted,
        reference,
        capability,
        ctx.unparameterized_capability_type(),
        function,
    ]);
    types
}

#[test]
fn test_subtyping_is_reflexive() {
    let mut ctx = TypeContext::new();
    let types = sample_types(&mut ctx);
    let sub = SubtypingContext::new(&ctx);

    for ty in types {
        assert!(sub.is_subtype(ty, ty), "{} <: itself", ctx.type_string(ty));
    }
}

#[test]
fn test_never_is_bottom() {
    let mut ctx = TypeContext::new();
    let types = sample_types(&mut ctx);
    let never = ctx.never_type();
    let sub = SubtypingContext::new(&ctx);

    for ty in types {
        assert!(sub.is_subtype(never, ty), "Never <: {}", ctx.type_string(ty));
    }
}

#[test]
fn test_subtyping_is_transitive() {
    let mut ctx = TypeContext::new();
    let types = sample_types(&mut ctx);
    let sub = SubtypingContext::new(&ctx);

    for &a in &types {
        for &b in &types {
            if !sub.is_subtype(a, b) {
                continue;
            }
            for &c in &types {
                if sub.is_subtype(b, c) {
                    assert!(
                        sub.is_subtype(a, c),
                        "{} <: {} <: {}",
                        ctx.type_string(a),
                        ctx.type_string(b),
                        ctx.type_string(c)
                    );
                }
            }
        }
    }
}

#[test]
fn test_resource_kinds_stay_apart() {
    let mut ctx = TypeContext::new();
    let types = sample_types(&mut ctx);
    let any_struct = ctx.any_struct_type();
    let any_resource = ctx.any_resource_type();
    let sub = SubtypingContext::new(&ctx);

    for ty in types {
        if ty == ctx.never_type() {
            continue;
        }
        let is_resource = ctx.is_resource_type(ty);
        if is_resource {
            assert!(!sub.is_subtype(ty, any_struct), "{}", ctx.type_string(ty));
        } else if sub.is_subtype(ty, any_resource) {
            panic!("struct type {} is a resource", ctx.type_string(ty));
        }
    }
}

#[test]
fn test_reference_authorization_weakens() {
    let mut ctx = TypeContext::new();
    let withdraw = ctx.declare_entitlement(EntitlementType::new(Some(location()), "Withdraw"));
    let deposit = ctx.declare_entitlement(EntitlementType::new(Some(location()), "Deposit"));
    let vault = ctx.declare_composite(CompositeType::new(
        Some(location()),
        CompositeKind::Resource,
        "Vault",
    ));

    let both = ctx.reference_type(vault, Access::conjunction(vec![withdraw, deposit]));
    let only_withdraw = ctx.reference_type(vault, Access::conjunction(vec![withdraw]));
    let either = ctx.reference_type(vault, Access::disjunction(vec![withdraw, deposit]));
    let plain = ctx.reference_type(vault, Access::UNAUTHORIZED);
    let sub = SubtypingContext::new(&ctx);

    assert!(sub.is_subtype(both, only_withdraw));
    assert!(sub.is_subtype(both, either));
    assert!(sub.is_subtype(only_withdraw, either));
    assert!(sub.is_subtype(either, plain));
    assert!(!sub.is_subtype(either, only_withdraw));
    assert!(!sub.is_subtype(only_withdraw, both));
    assert!(!sub.is_subtype(plain, only_withdraw));
}

#[test]
fn test_least_common_supertype() {
    let mut ctx = TypeContext::new();
    let int = ctx.int_type();
    let int8 = ctx.numeric(NumericType::Int8);
    let string = ctx.string_type();
    let optional_int = ctx.optional_type(int);
    let sub = SubtypingContext::new(&ctx);

    assert_eq!(sub.least_common_supertype(int, optional_int), Some(optional_int));
    assert_eq!(sub.least_common_supertype(int, string), Some(ctx.any_struct_type()));
    assert_eq!(
        sub.least_common_supertype(int, int8),
        Some(ctx.any_struct_type())
    );
}
