//! Members and member resolution
//!
//! [`TypeContext::get_members`] returns, per type, a map from member name to a
//! [`MemberResolver`]. Resolvers are deferred: the member's type is only
//! built when the member is actually accessed, and resolving may report
//! errors about the access (for example `contains` on an array of resources).
//! The map itself is computed once per type and shared.

use crate::access::Access;
use crate::context::TypeContext;
use crate::error::TypeError;
use crate::kind::{DeclarationKind, VariableKind};
use crate::numeric::NumericType;
use crate::span::Span;
use crate::subtyping::SubtypingContext;
use crate::ty::{
    FunctionPurity, FunctionType, Parameter, SimpleType, Type, TypeAnnotation, TypeId,
    TypeParameter,
};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A field or function of a type
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Type that declares the member
    pub container: TypeId,
    /// Access modifier
    pub access: Access,
    /// Member name
    pub identifier: String,
    /// Location of the declaration; empty for built-in members
    pub span: Span,
    /// Member type
    pub type_annotation: TypeAnnotation,
    /// Field or function
    pub declaration_kind: DeclarationKind,
    /// `let` or `var` for fields
    pub variable_kind: VariableKind,
    /// Argument labels of a function member
    pub argument_labels: Vec<String>,
    /// Built into the language rather than declared
    pub predeclared: bool,
    /// Function has a body
    pub has_implementation: bool,
    /// Function has pre- or post-conditions
    pub has_conditions: bool,
}

impl Member {
    /// Create a field member
    pub fn field(
        container: TypeId,
        access: Access,
        variable_kind: VariableKind,
        identifier: &str,
        type_annotation: TypeAnnotation,
    ) -> Self {
        Self {
            container,
            access,
            identifier: identifier.to_string(),
            span: Span::default(),
            type_annotation,
            declaration_kind: DeclarationKind::Field,
            variable_kind,
            argument_labels: Vec::new(),
            predeclared: false,
            has_implementation: false,
            has_conditions: false,
        }
    }

    /// Create a function member of the given function type
    pub fn function(
        container: TypeId,
        access: Access,
        identifier: &str,
        function_type: TypeId,
        argument_labels: Vec<String>,
    ) -> Self {
        Self {
            container,
            access,
            identifier: identifier.to_string(),
            span: Span::default(),
            type_annotation: TypeAnnotation::new(function_type, false),
            declaration_kind: DeclarationKind::Function,
            variable_kind: VariableKind::Constant,
            argument_labels,
            predeclared: false,
            has_implementation: false,
            has_conditions: false,
        }
    }

    /// Mark the member as built in
    pub fn predeclared(mut self) -> Self {
        self.predeclared = true;
        self
    }

    /// Set the declaration location
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Record whether the function has a body and conditions
    pub fn with_body(mut self, has_implementation: bool, has_conditions: bool) -> Self {
        self.has_implementation = has_implementation;
        self.has_conditions = has_conditions;
        self
    }

    /// The member's type
    pub fn ty(&self) -> TypeId {
        self.type_annotation.ty
    }
}

/// Reporter handed to member resolution
pub type Report<'a> = &'a mut dyn FnMut(TypeError);

type ResolveFn = dyn Fn(&mut TypeContext, &str, Span, Report<'_>) -> Member + Send + Sync;

/// Deferred lookup of a single member
#[derive(Clone)]
pub struct MemberResolver {
    /// Field or function
    pub kind: DeclarationKind,
    resolve: Arc<ResolveFn>,
}

impl MemberResolver {
    /// Create a resolver from a closure
    pub fn new<F>(kind: DeclarationKind, resolve: F) -> Self
    where
        F: Fn(&mut TypeContext, &str, Span, Report<'_>) -> Member + Send + Sync + 'static,
    {
        Self {
            kind,
            resolve: Arc::new(resolve),
        }
    }

    /// A resolver that always yields `member`
    pub fn of(member: Member) -> Self {
        let kind = member.declaration_kind;
        Self::new(kind, move |_, _, _, _| member.clone())
    }

    /// Resolve the member accessed at `span`
    pub fn resolve(
        &self,
        ctx: &mut TypeContext,
        identifier: &str,
        span: Span,
        report: Report<'_>,
    ) -> Member {
        (self.resolve)(ctx, identifier, span, report)
    }
}

impl fmt::Debug for MemberResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberResolver")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Member resolvers of a type, by name, in declaration order
pub type MemberResolverMap = IndexMap<String, MemberResolver>;

/// Build a function type once the context is available
fn function_member<F>(container: TypeId, build: F) -> MemberResolver
where
    F: Fn(&mut TypeContext) -> FunctionType + Send + Sync + 'static,
{
    MemberResolver::new(DeclarationKind::Function, move |ctx, identifier, _, _| {
        let function = build(ctx);
        function_to_member(ctx, container, identifier, function)
    })
}

fn function_to_member(
    ctx: &mut TypeContext,
    container: TypeId,
    identifier: &str,
    function: FunctionType,
) -> Member {
    let labels = function.argument_labels();
    let ty = ctx.function_type(function);
    Member::function(container, Access::UNAUTHORIZED, identifier, ty, labels).predeclared()
}

fn constant_field<F>(container: TypeId, build: F) -> MemberResolver
where
    F: Fn(&mut TypeContext) -> TypeId + Send + Sync + 'static,
{
    MemberResolver::new(DeclarationKind::Field, move |ctx, identifier, _, _| {
        let ty = build(ctx);
        let annotation = ctx.type_annotation(ty);
        Member::field(
            container,
            Access::UNAUTHORIZED,
            VariableKind::Constant,
            identifier,
            annotation,
        )
        .predeclared()
    })
}

fn view(parameters: Vec<Parameter>, return_type: TypeAnnotation) -> FunctionType {
    FunctionType::new(FunctionPurity::View, parameters, return_type)
}

fn impure(parameters: Vec<Parameter>, return_type: TypeAnnotation) -> FunctionType {
    FunctionType::new(FunctionPurity::Impure, parameters, return_type)
}

fn byte_array(ctx: &mut TypeContext) -> TypeId {
    let byte = ctx.numeric(NumericType::UInt8);
    ctx.variable_sized_type(byte)
}

impl TypeContext {
    /// Members of the type `id`
    ///
    /// Computed on first use and shared afterwards; concurrent first calls
    /// compute the map at most once.
    pub fn get_members(&self, id: TypeId) -> Arc<MemberResolverMap> {
        match self.cache(id) {
            Some(cache) => cache
                .members
                .get_or_init(|| {
                    tracing::trace!(ty = %self.type_string(id), "building member resolvers");
                    Arc::new(self.build_members(id))
                })
                .clone(),
            None => Arc::default(),
        }
    }

    /// Resolve the member `identifier` of `id`, reporting problems with the access
    pub fn resolve_member(
        &mut self,
        id: TypeId,
        identifier: &str,
        span: Span,
        report: Report<'_>,
    ) -> Option<Member> {
        let members = self.get_members(id);
        let resolver = members.get(identifier)?;
        Some(resolver.resolve(self, identifier, span, report))
    }

    fn build_members(&self, id: TypeId) -> MemberResolverMap {
        let mut members = MemberResolverMap::new();
        let Some(ty) = self.get(id) else {
            return members;
        };

        match ty {
            Type::Simple(SimpleType::String) => self.string_members(id, &mut members),
            Type::Simple(SimpleType::Address) => {
                members.insert(
                    "toBytes".to_string(),
                    function_member(id, |ctx| {
                        let bytes = byte_array(ctx);
                        view(vec![], ctx.type_annotation(bytes))
                    }),
                );
            }
            Type::Simple(_) => {}
            Type::Numeric(numeric) => {
                for name in numeric.saturating().function_names() {
                    members.insert(
                        name.to_string(),
                        function_member(id, move |ctx| {
                            let annotation = ctx.type_annotation(id);
                            view(vec![Parameter::unlabeled("other", annotation)], annotation)
                        }),
                    );
                }
            }
            Type::Optional(inner) => self.optional_members(id, *inner, &mut members),
            Type::VariableSized(element) => self.array_members(id, *element, true, &mut members),
            Type::ConstantSized { ty: element, .. } => {
                self.array_members(id, *element, false, &mut members)
            }
            Type::Dictionary { key, value } => {
                self.dictionary_members(id, *key, *value, &mut members)
            }
            Type::Function(_) | Type::Generic(_) => {}
            Type::Composite(_) => {
                if let Some(composite) = self.as_composite(id) {
                    for (name, member) in &composite.members {
                        members.insert(name.clone(), MemberResolver::of(member.clone()));
                    }
                    self.add_conformance_members(id, &mut members);
                }
            }
            Type::Interface(_) => {
                if let Some(interface) = self.as_interface(id) {
                    for (name, member) in &interface.members {
                        members.insert(name.clone(), MemberResolver::of(member.clone()));
                    }
                    self.add_conformance_members(id, &mut members);
                }
            }
            Type::Reference { ty, .. } => return (*self.get_members(*ty)).clone(),
            Type::Restricted { ty, restrictions } => {
                return self.restricted_members(*ty, restrictions);
            }
            Type::Capability(borrow) => self.capability_members(id, *borrow, &mut members),
            Type::Entitlement(_) | Type::EntitlementMap(_) => return members,
        }

        self.with_builtin_members(id, &mut members);
        members
    }

    /// Add the members every value has, plus conversions for numbers, addresses and paths
    fn with_builtin_members(&self, id: TypeId, members: &mut MemberResolverMap) {
        members
            .entry("isInstance".to_string())
            .or_insert_with(|| {
                function_member(id, |ctx| {
                    let meta = ctx.type_annotation(ctx.meta_type());
                    let bool_type = ctx.type_annotation(ctx.bool_type());
                    view(vec![Parameter::unlabeled("type", meta)], bool_type)
                })
            });
        members.entry("getType".to_string()).or_insert_with(|| {
            function_member(id, |ctx| view(vec![], ctx.type_annotation(ctx.meta_type())))
        });

        let subtyping = SubtypingContext::new(self);
        let number = self.numeric(NumericType::Number);
        let is_number = subtyping.is_subtype(id, number);
        let is_address = subtyping.is_subtype(id, self.address_type());
        let is_path = subtyping.is_subtype(id, self.simple(SimpleType::Path));

        if is_number || is_address || is_path {
            members.entry("toString".to_string()).or_insert_with(|| {
                function_member(id, |ctx| view(vec![], ctx.type_annotation(ctx.string_type())))
            });
        }
        if is_number {
            members
                .entry("toBigEndianBytes".to_string())
                .or_insert_with(|| {
                    function_member(id, |ctx| {
                        let bytes = byte_array(ctx);
                        view(vec![], ctx.type_annotation(bytes))
                    })
                });
        }
    }

    fn string_members(&self, id: TypeId, members: &mut MemberResolverMap) {
        members.insert(
            "length".to_string(),
            constant_field(id, |ctx| ctx.int_type()),
        );
        members.insert("utf8".to_string(), constant_field(id, byte_array));
        members.insert(
            "concat".to_string(),
            function_member(id, |ctx| {
                let string = ctx.type_annotation(ctx.string_type());
                view(vec![Parameter::unlabeled("other", string)], string)
            }),
        );
        members.insert(
            "toLower".to_string(),
            function_member(id, |ctx| view(vec![], ctx.type_annotation(ctx.string_type()))),
        );
    }

    fn optional_members(&self, id: TypeId, inner: TypeId, members: &mut MemberResolverMap) {
        members.insert(
            "map".to_string(),
            MemberResolver::new(DeclarationKind::Function, move |ctx, identifier, span, report| {
                if ctx.is_resource_type(inner) {
                    report(TypeError::InvalidResourceOptionalMember {
                        name: identifier.to_string(),
                        span,
                    });
                }

                let parameter = TypeParameter::new("T", None);
                let result = ctx.generic_type(parameter.clone());
                let result_annotation = ctx.type_annotation(result);
                let transform = ctx.function_type(impure(
                    vec![Parameter::unlabeled("value", ctx.type_annotation(inner))],
                    result_annotation,
                ));
                let optional_result = ctx.optional_type(result);

                let mut function = impure(
                    vec![Parameter::unlabeled("transform", ctx.type_annotation(transform))],
                    ctx.type_annotation(optional_result),
                );
                function.type_parameters = vec![parameter];
                function_to_member(ctx, id, identifier, function)
            }),
        );
    }

    fn array_members(
        &self,
        id: TypeId,
        element: TypeId,
        variable_sized: bool,
        members: &mut MemberResolverMap,
    ) {
        members.insert(
            "length".to_string(),
            constant_field(id, |ctx| ctx.int_type()),
        );

        members.insert(
            "contains".to_string(),
            MemberResolver::new(DeclarationKind::Function, move |ctx, identifier, span, report| {
                check_equatable_element(ctx, element, identifier, span, report);
                let element_annotation = ctx.type_annotation(element);
                let function = view(
                    vec![Parameter::unlabeled("element", element_annotation)],
                    ctx.type_annotation(ctx.bool_type()),
                );
                function_to_member(ctx, id, identifier, function)
            }),
        );

        members.insert(
            "firstIndex".to_string(),
            MemberResolver::new(DeclarationKind::Function, move |ctx, identifier, span, report| {
                check_equatable_element(ctx, element, identifier, span, report);
                let element_annotation = ctx.type_annotation(element);
                let optional_int = ctx.optional_type(ctx.int_type());
                let function = view(
                    vec![Parameter::new(None, "of", element_annotation)],
                    ctx.type_annotation(optional_int),
                );
                function_to_member(ctx, id, identifier, function)
            }),
        );

        if !variable_sized {
            return;
        }

        members.insert(
            "append".to_string(),
            function_member(id, move |ctx| {
                impure(
                    vec![Parameter::unlabeled("element", ctx.type_annotation(element))],
                    ctx.type_annotation(ctx.void_type()),
                )
            }),
        );

        members.insert(
            "appendAll".to_string(),
            resource_checked_array_function(id, element, move |ctx, _| {
                impure(
                    vec![Parameter::unlabeled("other", ctx.type_annotation(id))],
                    ctx.type_annotation(ctx.void_type()),
                )
            }),
        );

        members.insert(
            "insert".to_string(),
            function_member(id, move |ctx| {
                let integer = ctx.type_annotation(ctx.numeric(NumericType::Integer));
                impure(
                    vec![
                        Parameter::new(None, "at", integer),
                        Parameter::unlabeled("element", ctx.type_annotation(element)),
                    ],
                    ctx.type_annotation(ctx.void_type()),
                )
            }),
        );

        members.insert(
            "concat".to_string(),
            resource_checked_array_function(id, element, move |ctx, _| {
                let array = ctx.type_annotation(id);
                view(vec![Parameter::unlabeled("other", array)], array)
            }),
        );

        members.insert(
            "slice".to_string(),
            resource_checked_array_function(id, element, move |ctx, _| {
                let int = ctx.type_annotation(ctx.int_type());
                view(
                    vec![
                        Parameter::new(None, "from", int),
                        Parameter::new(None, "upTo", int),
                    ],
                    ctx.type_annotation(id),
                )
            }),
        );

        members.insert(
            "remove".to_string(),
            function_member(id, move |ctx| {
                let integer = ctx.type_annotation(ctx.numeric(NumericType::Integer));
                impure(
                    vec![Parameter::new(None, "at", integer)],
                    ctx.type_annotation(element),
                )
            }),
        );

        for name in ["removeFirst", "removeLast"] {
            members.insert(
                name.to_string(),
                function_member(id, move |ctx| impure(vec![], ctx.type_annotation(element))),
            );
        }
    }

    fn dictionary_members(
        &self,
        id: TypeId,
        key: TypeId,
        value: TypeId,
        members: &mut MemberResolverMap,
    ) {
        members.insert(
            "length".to_string(),
            constant_field(id, |ctx| ctx.int_type()),
        );
        members.insert(
            "keys".to_string(),
            constant_field(id, move |ctx| ctx.variable_sized_type(key)),
        );
        members.insert(
            "values".to_string(),
            constant_field(id, move |ctx| ctx.variable_sized_type(value)),
        );
        members.insert(
            "containsKey".to_string(),
            function_member(id, move |ctx| {
                view(
                    vec![Parameter::unlabeled("key", ctx.type_annotation(key))],
                    ctx.type_annotation(ctx.bool_type()),
                )
            }),
        );
        members.insert(
            "insert".to_string(),
            function_member(id, move |ctx| {
                let optional_value = ctx.optional_type(value);
                impure(
                    vec![
                        Parameter::new(None, "key", ctx.type_annotation(key)),
                        Parameter::unlabeled("value", ctx.type_annotation(value)),
                    ],
                    ctx.type_annotation(optional_value),
                )
            }),
        );
        members.insert(
            "remove".to_string(),
            function_member(id, move |ctx| {
                let optional_value = ctx.optional_type(value);
                impure(
                    vec![Parameter::new(None, "key", ctx.type_annotation(key))],
                    ctx.type_annotation(optional_value),
                )
            }),
        );
    }

    fn capability_members(
        &self,
        id: TypeId,
        borrow: Option<TypeId>,
        members: &mut MemberResolverMap,
    ) {
        // Unparameterised capabilities take the borrow type as a type argument
        let borrow_function = move |ctx: &mut TypeContext, returns_bool: bool| {
            let any = ctx.any_type();
            let any_reference = ctx.reference_type(any, Access::UNAUTHORIZED);
            let (type_parameters, borrowed) = match borrow {
                Some(borrowed) => (Vec::new(), borrowed),
                None => {
                    let parameter = TypeParameter::new("T", Some(any_reference));
                    let generic = ctx.generic_type(parameter.clone());
                    (vec![parameter], generic)
                }
            };
            let return_type = if returns_bool {
                ctx.bool_type()
            } else {
                ctx.optional_type(borrowed)
            };
            let mut function = view(vec![], ctx.type_annotation(return_type));
            function.type_parameters = type_parameters;
            function
        };

        members.insert(
            "borrow".to_string(),
            function_member(id, move |ctx| borrow_function(ctx, false)),
        );
        members.insert(
            "check".to_string(),
            function_member(id, move |ctx| borrow_function(ctx, true)),
        );
        members.insert(
            "address".to_string(),
            constant_field(id, |ctx| ctx.address_type()),
        );
    }

    fn restricted_members(
        &self,
        underlying: Option<TypeId>,
        restrictions: &[TypeId],
    ) -> MemberResolverMap {
        let mut members = MemberResolverMap::new();

        for restriction in restrictions {
            for (name, resolver) in self.get_members(*restriction).iter() {
                members
                    .entry(name.clone())
                    .or_insert_with(|| resolver.clone());
            }
        }

        if let Some(underlying) = underlying {
            for (name, resolver) in self.get_members(underlying).iter() {
                if members.contains_key(name) {
                    continue;
                }
                let inner = resolver.clone();
                members.insert(
                    name.clone(),
                    MemberResolver::new(resolver.kind, move |ctx, identifier, span, report| {
                        report(TypeError::InvalidRestrictedTypeMemberAccess {
                            name: identifier.to_string(),
                            span,
                        });
                        inner.resolve(ctx, identifier, span, report)
                    }),
                );
            }
        }

        members
    }

    /// Members inherited from conformances that `id` does not declare itself
    fn add_conformance_members(&self, id: TypeId, members: &mut MemberResolverMap) {
        for conformance in self.effective_conformances(id) {
            let Some(interface) = self.as_interface(conformance) else {
                continue;
            };
            for (name, member) in &interface.members {
                members
                    .entry(name.clone())
                    .or_insert_with(|| MemberResolver::of(member.clone()));
            }
        }
    }
}

fn check_equatable_element(
    ctx: &TypeContext,
    element: TypeId,
    identifier: &str,
    span: Span,
    report: Report<'_>,
) {
    if ctx.is_resource_type(element) {
        report(TypeError::InvalidResourceArrayMember {
            name: identifier.to_string(),
            span,
        });
    }
    if !ctx.is_invalid_type(element) && !ctx.is_equatable(element) {
        report(TypeError::NotEquatableType {
            ty: ctx.qualified_string(element),
            span,
        });
    }
}

fn resource_checked_array_function<F>(id: TypeId, element: TypeId, build: F) -> MemberResolver
where
    F: Fn(&mut TypeContext, TypeId) -> FunctionType + Send + Sync + 'static,
{
    MemberResolver::new(DeclarationKind::Function, move |ctx, identifier, span, report| {
        if ctx.is_resource_type(element) {
            report(TypeError::InvalidResourceArrayMember {
                name: identifier.to_string(),
                span,
            });
        }
        let function = build(ctx, element);
        function_to_member(ctx, id, identifier, function)
    })
}
