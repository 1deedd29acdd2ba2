//! Structural rewriting of types

use crate::context::TypeContext;
use crate::kind::CompositeKind;
use crate::ty::{FunctionType, Parameter, Type, TypeAnnotation, TypeId, TypeParameter};

type Rewrite<'f> = &'f mut dyn FnMut(&mut TypeContext, TypeId) -> TypeId;

impl TypeContext {
    /// Apply `f` bottom-up to every type syntactically contained in `id`
    ///
    /// `[T]` becomes `f([f(T)])`. Nominal types are leaves. Restrictions
    /// that no longer map to an interface are dropped.
    pub fn map_type(&mut self, id: TypeId, f: Rewrite<'_>) -> TypeId {
        let rebuilt = self.rebuild(id, &mut |ctx, child| ctx.map_type(child, &mut *f));
        f(self, rebuilt)
    }

    /// Replace interfaces used as types with restricted types
    ///
    /// A resource interface `I` becomes `AnyResource{I}` and a structure
    /// interface becomes `AnyStruct{I}`, at any depth except inside a
    /// restricted type. Returns whether anything was rewritten.
    pub fn rewrite_with_restricted_types(&mut self, id: TypeId) -> (TypeId, bool) {
        let rewritten = self.rewrite_interfaces(id);
        (rewritten, rewritten != id)
    }

    fn rewrite_interfaces(&mut self, id: TypeId) -> TypeId {
        if let Some(interface) = self.as_interface(id) {
            let top = match interface.kind {
                CompositeKind::Resource => self.any_resource_type(),
                CompositeKind::Structure => self.any_struct_type(),
                _ => return id,
            };
            return self.restricted_type(Some(top), vec![id]);
        }
        if matches!(self.get(id), Some(Type::Restricted { .. })) {
            return id;
        }
        self.rebuild(id, &mut |ctx, child| ctx.rewrite_interfaces(child))
    }

    /// Re-intern `id` with `f` applied to its immediate children
    fn rebuild(&mut self, id: TypeId, f: Rewrite<'_>) -> TypeId {
        let Some(ty) = self.get(id).cloned() else {
            return id;
        };

        match ty {
            Type::Optional(inner) => {
                let inner = f(self, inner);
                self.optional_type(inner)
            }
            Type::VariableSized(element) => {
                let element = f(self, element);
                self.variable_sized_type(element)
            }
            Type::ConstantSized { ty, size } => {
                let element = f(self, ty);
                self.constant_sized_type(element, size)
            }
            Type::Dictionary { key, value } => {
                let key = f(self, key);
                let value = f(self, value);
                self.dictionary_type(key, value)
            }
            Type::Function(function) => {
                let function = self.rebuild_function(&function, f);
                self.function_type(function)
            }
            Type::Reference { ty, authorization } => {
                let referenced = f(self, ty);
                self.reference_type(referenced, authorization)
            }
            Type::Restricted { ty, restrictions } => {
                let underlying = ty.map(|t| f(self, t));
                let mut mapped = Vec::with_capacity(restrictions.len());
                for restriction in restrictions {
                    let restriction = f(self, restriction);
                    if self.as_interface(restriction).is_some() {
                        mapped.push(restriction);
                    }
                }
                self.restricted_type(underlying, mapped)
            }
            Type::Capability(Some(borrow)) => {
                let borrow = f(self, borrow);
                self.capability_type(Some(borrow))
            }
            Type::Simple(_)
            | Type::Numeric(_)
            | Type::Composite(_)
            | Type::Interface(_)
            | Type::Capability(None)
            | Type::Generic(_)
            | Type::Entitlement(_)
            | Type::EntitlementMap(_) => id,
        }
    }

    fn rebuild_function(&mut self, function: &FunctionType, f: Rewrite<'_>) -> FunctionType {
        let type_parameters = function
            .type_parameters
            .iter()
            .map(|parameter| TypeParameter {
                name: parameter.name.clone(),
                type_bound: parameter.type_bound.map(|bound| f(self, bound)),
                optional: parameter.optional,
            })
            .collect();

        let parameters = function
            .parameters
            .iter()
            .map(|parameter| {
                let ty = f(self, parameter.type_annotation.ty);
                Parameter {
                    label: parameter.label.clone(),
                    identifier: parameter.identifier.clone(),
                    type_annotation: TypeAnnotation::new(ty, parameter.type_annotation.is_resource),
                }
            })
            .collect();

        let return_type = f(self, function.return_type.ty);

        FunctionType {
            purity: function.purity,
            type_parameters,
            parameters,
            return_type: TypeAnnotation::new(return_type, function.return_type.is_resource),
            required_argument_count: function.required_argument_count,
            is_constructor: function.is_constructor,
        }
    }
}
