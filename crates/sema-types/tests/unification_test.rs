use sema_types::{
    Access, FunctionPurity, FunctionType, NumericType, Parameter, Span, TypeContext, TypeError,
    TypeId, TypeParameter, TypeParameterBindings,
};

struct Shapes {
    generic: TypeId,
    concrete: TypeId,
}

/// The same shape built once over `T` and once over `Int`
fn shapes(ctx: &mut TypeContext, t: &TypeParameter) -> Vec<Shapes> {
    let g = ctx.generic_type(t.clone());
    let c = ctx.int_type();
    let string = ctx.string_type();

    let optional = (ctx.optional_type(g), ctx.optional_type(c));
    let array = (ctx.variable_sized_type(g), ctx.variable_sized_type(c));
    let fixed = (ctx.constant_sized_type(g, 2), ctx.constant_sized_type(c, 2));
    let dictionary = (ctx.dictionary_type(string, g), ctx.dictionary_type(string, c));
    let reference = (
        ctx.reference_type(g, Access::UNAUTHORIZED),
        ctx.reference_type(c, Access::UNAUTHORIZED),
    );
    let capability = (
        ctx.capability_type(Some(reference.0)),
        ctx.capability_type(Some(reference.1)),
    );

    let g_annotation = ctx.type_annotation(g);
    let c_annotation = ctx.type_annotation(c);
    let function = (
        ctx.function_type(FunctionType::new(
            FunctionPurity::Impure,
            vec![Parameter::unlabeled("value", g_annotation)],
            g_annotation,
        )),
        ctx.function_type(FunctionType::new(
            FunctionPurity::Impure,
            vec![Parameter::unlabeled("value", c_annotation)],
            c_annotation,
        )),
    );

    [optional, array, fixed, dictionary, reference, capability, function]
        .into_iter()
        .map(|(generic, concrete)| Shapes { generic, concrete })
        .collect()
}

#[test]
fn test_resolve_after_unify_restores_argument() {
    let mut ctx = TypeContext::new();
    let t = TypeParameter::new("T", None);

    for shape in shapes(&mut ctx, &t) {
        let mut bindings = TypeParameterBindings::new();
        let unification = ctx.unify(shape.generic, shape.concrete, &mut bindings, Span::default());

        assert!(unification.found_generic, "{}", ctx.type_string(shape.generic));
        assert!(unification.errors.is_empty());
        assert_eq!(bindings.get(&t), Some(&ctx.int_type()));

        let resolved = ctx.resolve(shape.generic, &bindings);
        assert_eq!(resolved, Some(shape.concrete), "{}", ctx.type_string(shape.generic));
    }
}

#[test]
fn test_mismatched_shapes_do_not_bind() {
    let mut ctx = TypeContext::new();
    let t = TypeParameter::new("T", None);
    let generic = ctx.generic_type(t);
    let optional = ctx.optional_type(generic);
    let int = ctx.int_type();
    let array = ctx.variable_sized_type(int);
    let short = ctx.constant_sized_type(generic, 2);
    let long = ctx.constant_sized_type(int, 3);

    let mut bindings = TypeParameterBindings::new();
    assert!(!ctx.unify(optional, array, &mut bindings, Span::default()).found_generic);
    assert!(!ctx.unify(short, long, &mut bindings, Span::default()).found_generic);
    assert!(bindings.is_empty());
}

#[test]
fn test_bound_type_parameter() {
    let mut ctx = TypeContext::new();
    let number = ctx.numeric(NumericType::Number);
    let t = TypeParameter::new("T", Some(number));
    let generic = ctx.generic_type(t.clone());
    let pair = ctx.dictionary_type(generic, generic);

    let uint8 = ctx.numeric(NumericType::UInt8);
    let accepted = ctx.dictionary_type(uint8, uint8);
    let mut bindings = TypeParameterBindings::new();
    assert!(ctx.unify(pair, accepted, &mut bindings, Span::default()).is_ok());

    let string = ctx.string_type();
    let rejected = ctx.dictionary_type(string, uint8);
    let mut bindings = TypeParameterBindings::new();
    let unification = ctx.unify(pair, rejected, &mut bindings, Span::new(4, 10, 1, 5));
    match unification.errors.as_slice() {
        [TypeError::TypeMismatch { expected, actual, span }, TypeError::TypeParameterTypeMismatch { name, .. }] =>
        {
            assert_eq!(expected, "Number");
            assert_eq!(actual, "String");
            assert_eq!(span.start, 4);
            assert_eq!(name, "T");
        }
        other => panic!("unexpected errors: {:?}", other),
    }
}
