//! Unification and resolution of type parameters
//!
//! [`TypeContext::unify`] walks a parameter type and an argument type in
//! lock-step and binds every type parameter it meets. Its result has two
//! separate channels: whether a type parameter occurred at all, and the
//! errors found while binding. A pair without generics is not a failure.
//! [`TypeContext::resolve`] substitutes the bindings back in.

use crate::context::TypeContext;
use crate::error::TypeError;
use crate::span::Span;
use crate::subtyping::SubtypingContext;
use crate::ty::{FunctionType, Parameter, Type, TypeAnnotation, TypeId, TypeParameter};
use indexmap::IndexMap;

/// Bound type arguments, in binding order
pub type TypeParameterBindings = IndexMap<TypeParameter, TypeId>;

/// Outcome of unifying two types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unification {
    /// Whether a type parameter occurred in the walked types
    pub found_generic: bool,
    /// Binding conflicts and bound violations
    pub errors: Vec<TypeError>,
}

impl Unification {
    /// Whether unification bound everything it met without errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl TypeContext {
    /// Unify the parameter type `ty` with the argument type `other`
    pub fn unify(
        &self,
        ty: TypeId,
        other: TypeId,
        bindings: &mut TypeParameterBindings,
        span: Span,
    ) -> Unification {
        let mut unification = Unification::default();
        unification.found_generic = self.unify_into(ty, other, bindings, span, &mut unification.errors);
        unification
    }

    fn unify_into(
        &self,
        ty: TypeId,
        other: TypeId,
        bindings: &mut TypeParameterBindings,
        span: Span,
        errors: &mut Vec<TypeError>,
    ) -> bool {
        let (Some(ty_value), Some(other_value)) = (self.get(ty), self.get(other)) else {
            return false;
        };

        match (ty_value, other_value) {
            (Type::Generic(parameter), _) => {
                match bindings.get(parameter) {
                    Some(&bound) => {
                        if !self.equal(other, bound) {
                            errors.push(TypeError::TypeParameterTypeMismatch {
                                name: parameter.name.clone(),
                                bound: self.qualified_string(bound),
                                actual: self.qualified_string(other),
                                span,
                            });
                        }
                    }
                    None => {
                        tracing::trace!(
                            parameter = %parameter.name,
                            ty = %self.type_string(other),
                            "binding type parameter"
                        );
                        bindings.insert(parameter.clone(), other);
                        self.check_type_bound(other, parameter.type_bound, span, errors);
                    }
                }
                true
            }

            (Type::Optional(inner), Type::Optional(other_inner))
            | (Type::VariableSized(inner), Type::VariableSized(other_inner)) => {
                self.unify_into(*inner, *other_inner, bindings, span, errors)
            }

            (
                Type::ConstantSized { ty: inner, size },
                Type::ConstantSized {
                    ty: other_inner,
                    size: other_size,
                },
            ) => size == other_size && self.unify_into(*inner, *other_inner, bindings, span, errors),

            (
                Type::Dictionary { key, value },
                Type::Dictionary {
                    key: other_key,
                    value: other_value,
                },
            ) => {
                let key = self.unify_into(*key, *other_key, bindings, span, errors);
                let value = self.unify_into(*value, *other_value, bindings, span, errors);
                key || value
            }

            (Type::Function(function), Type::Function(other_function)) => {
                if !function.type_parameters.is_empty()
                    || !other_function.type_parameters.is_empty()
                    || function.parameters.len() != other_function.parameters.len()
                {
                    return false;
                }

                let mut found = false;
                for (parameter, other_parameter) in
                    function.parameters.iter().zip(&other_function.parameters)
                {
                    found |= self.unify_into(
                        parameter.type_annotation.ty,
                        other_parameter.type_annotation.ty,
                        bindings,
                        span,
                        errors,
                    );
                }
                found |= self.unify_into(
                    function.return_type.ty,
                    other_function.return_type.ty,
                    bindings,
                    span,
                    errors,
                );
                found
            }

            (Type::Reference { ty: inner, .. }, Type::Reference { ty: other_inner, .. }) => {
                self.unify_into(*inner, *other_inner, bindings, span, errors)
            }

            (Type::Capability(Some(borrow)), Type::Capability(Some(other_borrow))) => {
                self.unify_into(*borrow, *other_borrow, bindings, span, errors)
            }

            _ => false,
        }
    }

    /// Report a type mismatch if `ty` is not within `bound`
    ///
    /// Invalid types are not checked, so an earlier error is not repeated.
    pub fn check_type_bound(
        &self,
        ty: TypeId,
        bound: Option<TypeId>,
        span: Span,
        errors: &mut Vec<TypeError>,
    ) {
        let Some(bound) = bound else {
            return;
        };
        if self.is_invalid_type(ty) || self.is_invalid_type(bound) {
            return;
        }
        if !SubtypingContext::new(self).is_subtype(ty, bound) {
            errors.push(TypeError::TypeMismatch {
                expected: self.qualified_string(bound),
                actual: self.qualified_string(ty),
                span,
            });
        }
    }

    /// Substitute bound type arguments into `ty`
    ///
    /// Returns `None` when a type parameter in `ty` has no binding yet.
    pub fn resolve(&mut self, ty: TypeId, bindings: &TypeParameterBindings) -> Option<TypeId> {
        let value = self.get(ty)?.clone();

        let resolved = match value {
            Type::Generic(parameter) => return bindings.get(&parameter).copied(),
            Type::Optional(inner) => {
                let inner = self.resolve(inner, bindings)?;
                self.optional_type(inner)
            }
            Type::VariableSized(element) => {
                let element = self.resolve(element, bindings)?;
                self.variable_sized_type(element)
            }
            Type::ConstantSized { ty: element, size } => {
                let element = self.resolve(element, bindings)?;
                self.constant_sized_type(element, size)
            }
            Type::Dictionary { key, value } => {
                let key = self.resolve(key, bindings)?;
                let value = self.resolve(value, bindings)?;
                self.dictionary_type(key, value)
            }
            Type::Function(function) => {
                let resolved = self.resolve_function(&function, bindings)?;
                self.function_type(resolved)
            }
            Type::Reference {
                ty: inner,
                authorization,
            } => {
                let inner = self.resolve(inner, bindings)?;
                self.reference_type(inner, authorization)
            }
            Type::Capability(Some(borrow)) => {
                let borrow = self.resolve(borrow, bindings);
                self.capability_type(borrow)
            }
            Type::Simple(_)
            | Type::Numeric(_)
            | Type::Composite(_)
            | Type::Interface(_)
            | Type::Restricted { .. }
            | Type::Capability(None)
            | Type::Entitlement(_)
            | Type::EntitlementMap(_) => ty,
        };
        Some(resolved)
    }

    fn resolve_function(
        &mut self,
        function: &FunctionType,
        bindings: &TypeParameterBindings,
    ) -> Option<FunctionType> {
        let mut parameters = Vec::with_capacity(function.parameters.len());
        for parameter in &function.parameters {
            let ty = self.resolve(parameter.type_annotation.ty, bindings)?;
            parameters.push(Parameter {
                label: parameter.label.clone(),
                identifier: parameter.identifier.clone(),
                type_annotation: TypeAnnotation::new(ty, parameter.type_annotation.is_resource),
            });
        }

        let return_type = self.resolve(function.return_type.ty, bindings)?;

        Some(FunctionType {
            purity: function.purity,
            type_parameters: Vec::new(),
            parameters,
            return_type: TypeAnnotation::new(return_type, function.return_type.is_resource),
            required_argument_count: function.required_argument_count,
            is_constructor: function.is_constructor,
        })
    }
}
