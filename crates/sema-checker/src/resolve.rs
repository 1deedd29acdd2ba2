//! Resolution of type expressions to types

use crate::ast::*;
use crate::checker::Checker;
use crate::error::CheckError;
use crate::symbols::{ScopeKind, Symbol, SymbolKind};
use rustc_hash::FxHashMap;
use sema_types::{
    Access, CompositeKind, DeclarationKind, FunctionType, Parameter, Span, Type, TypeAnnotation,
    TypeAnnotationState, TypeId, TypeParameter,
};

/// A restricted type with an underlying type, checked once conformances are declared
#[derive(Debug)]
pub(crate) struct RestrictedTypeCheck {
    underlying: TypeId,
    restrictions: Vec<(TypeId, Span)>,
    span: Span,
}

impl<'r> Checker<'r> {
    /// Resolve a possibly qualified type name
    ///
    /// The first identifier is looked up in the type scopes; each further
    /// identifier names a nested type of the previous one.
    pub(crate) fn resolve_nominal(&mut self, nominal: &NominalType) -> TypeId {
        let Some(symbol) = self.types.resolve(&nominal.identifier.name) else {
            self.report(CheckError::NotDeclared {
                name: nominal.identifier.name.clone(),
                kind: "type".to_string(),
                span: nominal.identifier.span,
            });
            return self.ctx().invalid_type();
        };

        let mut ty = symbol.ty;
        for nested in &nominal.nested_identifiers {
            let found = self
                .ctx()
                .nested_types(ty)
                .and_then(|types| types.get(&nested.name))
                .copied();
            match found {
                Some(nested_type) => ty = nested_type,
                None => {
                    self.report(CheckError::NotDeclared {
                        name: nominal.qualified_name(),
                        kind: "type".to_string(),
                        span: nested.span,
                    });
                    return self.ctx().invalid_type();
                }
            }
        }
        ty
    }

    pub(crate) fn resolve_type(&mut self, expr: &TypeExpr) -> TypeId {
        match &expr.kind {
            TypeExprKind::Nominal(nominal) => self.resolve_nominal(nominal),
            TypeExprKind::Optional(inner) => {
                let inner = self.resolve_type(inner);
                self.ctx_mut().optional_type(inner)
            }
            TypeExprKind::VariableSized(element) => {
                let element = self.resolve_type(element);
                self.ctx_mut().variable_sized_type(element)
            }
            TypeExprKind::ConstantSized { ty, size } => {
                let element = self.resolve_type(ty);
                self.ctx_mut().constant_sized_type(element, *size)
            }
            TypeExprKind::Dictionary { key, value } => {
                let key = self.resolve_type(key);
                let value = self.resolve_type(value);
                self.ctx_mut().dictionary_type(key, value)
            }
            TypeExprKind::Function {
                purity,
                parameters,
                return_type,
            } => {
                let parameters = parameters
                    .iter()
                    .map(|p| Parameter::new(None, "", self.resolve_annotation(p)))
                    .collect();
                let return_type = self.resolve_annotation(return_type);
                self.ctx_mut()
                    .function_type(FunctionType::new(*purity, parameters, return_type))
            }
            TypeExprKind::Reference { authorization, ty } => {
                let referenced = self.resolve_type(ty);
                let authorization = match authorization {
                    Some(authorization) => self.resolve_authorization(authorization, true),
                    None => Access::UNAUTHORIZED,
                };
                self.ctx_mut().reference_type(referenced, authorization)
            }
            TypeExprKind::Restricted { ty, restrictions } => {
                let underlying = ty.as_ref().map(|ty| self.resolve_type(ty));
                let mut resolved: Vec<TypeId> = Vec::new();
                let mut spans: Vec<Span> = Vec::new();
                for nominal in restrictions {
                    let restriction = self.resolve_nominal(nominal);
                    if self.is_invalid(restriction) {
                        continue;
                    }
                    if self.ctx().as_interface(restriction).is_none() {
                        self.report(CheckError::InvalidRestrictionType {
                            ty: self.qualified(restriction),
                            span: nominal.span(),
                        });
                    } else if resolved.contains(&restriction) {
                        self.report(CheckError::InvalidRestrictionTypeDuplicate {
                            ty: self.qualified(restriction),
                            span: nominal.span(),
                        });
                    } else {
                        resolved.push(restriction);
                        spans.push(nominal.span());
                    }
                }

                if let (Some(ty), Some(underlying)) = (ty, underlying) {
                    if !self.is_invalid(underlying) {
                        let check = RestrictedTypeCheck {
                            underlying,
                            restrictions: resolved.iter().copied().zip(spans).collect(),
                            span: ty.span,
                        };
                        if self.conformances_declared {
                            self.check_restricted_type(&check);
                        } else {
                            self.pending_restrictions.push(check);
                        }
                    }
                }
                self.ctx_mut().restricted_type(underlying, resolved)
            }
            TypeExprKind::Instantiation { ty, type_arguments } => {
                self.resolve_instantiation(ty, type_arguments, expr.span)
            }
        }
    }

    /// Check the underlying type of `T{Us}`
    ///
    /// `AnyStruct` and `AnyResource` may be restricted by interfaces of the
    /// matching kind; a composite only by interfaces it conforms to.
    pub(crate) fn check_restricted_type(&mut self, check: &RestrictedTypeCheck) {
        let underlying = check.underlying;
        let top_kind = if underlying == self.ctx().any_struct_type() {
            Some(CompositeKind::Structure)
        } else if underlying == self.ctx().any_resource_type() {
            Some(CompositeKind::Resource)
        } else {
            None
        };

        if let Some(expected) = top_kind {
            for (restriction, span) in &check.restrictions {
                let Some(kind) = self.ctx().as_interface(*restriction).map(|i| i.kind) else {
                    continue;
                };
                if kind != expected {
                    self.report(CheckError::CompositeKindMismatch {
                        expected: expected.name().to_string(),
                        actual: kind.name().to_string(),
                        span: *span,
                    });
                }
            }
            return;
        }

        if self.ctx().as_composite(underlying).is_none() {
            self.report(CheckError::InvalidRestrictedType {
                ty: self.qualified(underlying),
                span: check.span,
            });
            return;
        }

        let conformances = self.ctx().effective_conformances(underlying);
        for (restriction, span) in &check.restrictions {
            if !conformances.contains(restriction) {
                self.report(CheckError::InvalidNonConformingRestriction {
                    ty: self.qualified(underlying),
                    restriction: self.qualified(*restriction),
                    span: *span,
                });
            }
        }
    }

    /// `Capability<&T>` is the only instantiable type
    fn resolve_instantiation(
        &mut self,
        ty: &TypeExpr,
        type_arguments: &[TypeAnnotationExpr],
        span: Span,
    ) -> TypeId {
        let base = self.resolve_type(ty);
        if self.is_invalid(base) {
            return base;
        }

        if base != self.ctx().unparameterized_capability_type() {
            self.report(CheckError::InvalidTypeArgumentCount {
                expected: 0,
                actual: type_arguments.len(),
                span,
            });
            return base;
        }

        let [argument] = type_arguments else {
            self.report(CheckError::InvalidTypeArgumentCount {
                expected: 1,
                actual: type_arguments.len(),
                span,
            });
            return self.ctx().invalid_type();
        };

        let borrow = self.resolve_type(&argument.ty);
        if self.is_invalid(borrow) {
            return self.ctx().invalid_type();
        }
        if !matches!(self.ctx().get(borrow), Some(Type::Reference { .. })) {
            self.report(CheckError::TypeMismatch {
                expected: "&Any".to_string(),
                actual: self.qualified(borrow),
                span: argument.span,
            });
            return self.ctx().invalid_type();
        }
        self.ctx_mut().capability_type(Some(borrow))
    }

    /// Resolve a type annotation and check that it agrees with its type
    pub(crate) fn resolve_annotation(&mut self, expr: &TypeAnnotationExpr) -> TypeAnnotation {
        let ty = self.resolve_type(&expr.ty);
        let annotation = TypeAnnotation::new(ty, expr.is_resource);

        let ty_string = || self.qualified(ty);
        let error = match self.ctx().type_annotation_state(&annotation) {
            TypeAnnotationState::Valid => None,
            TypeAnnotationState::MissingResourceAnnotation => Some(CheckError::MissingResourceAnnotation {
                ty: ty_string(),
                span: expr.span,
            }),
            TypeAnnotationState::InvalidResourceAnnotation => Some(CheckError::InvalidResourceAnnotation {
                ty: ty_string(),
                span: expr.span,
            }),
            TypeAnnotationState::DirectEntitlementTypeAnnotation => {
                Some(CheckError::DirectEntitlementAnnotation {
                    ty: ty_string(),
                    span: expr.span,
                })
            }
            TypeAnnotationState::DirectAttachmentTypeAnnotation => {
                Some(CheckError::DirectAttachmentTypeAnnotation {
                    ty: ty_string(),
                    span: expr.span,
                })
            }
        };
        if let Some(error) = error {
            self.report(error);
        }
        annotation
    }

    /// Resolve the type of a function or initializer declaration
    ///
    /// Type parameters are bound in a scope of their own, so the parameter
    /// and return types can refer to them.
    pub(crate) fn resolve_function(&mut self, function: &FunctionDeclaration) -> TypeId {
        self.types.push_scope(ScopeKind::Function);

        let mut type_parameters = Vec::new();
        for parameter in &function.type_parameters {
            let bound = parameter
                .type_bound
                .as_ref()
                .map(|bound| self.resolve_type(&bound.ty));
            let type_parameter = TypeParameter::new(&parameter.identifier.name, bound);
            let ty = self.ctx_mut().generic_type(type_parameter.clone());

            let symbol = Symbol::new(
                &parameter.identifier.name,
                SymbolKind::TypeParameter,
                ty,
                DeclarationKind::TypeParameter,
                parameter.identifier.span,
            );
            match self.types.define(symbol) {
                Ok(()) => type_parameters.push(type_parameter),
                Err(error) => self.redeclaration(error),
            }
        }

        let mut seen: FxHashMap<&str, Span> = FxHashMap::default();
        let mut parameters = Vec::new();
        for parameter in &function.parameters {
            let name = parameter.identifier.name.as_str();
            if let Some(original) = seen.insert(name, parameter.identifier.span) {
                self.report(CheckError::Redeclaration {
                    name: name.to_string(),
                    kind: DeclarationKind::Parameter.name().to_string(),
                    original,
                    span: parameter.identifier.span,
                });
            }
            let annotation = self.resolve_annotation(&parameter.type_annotation);
            parameters.push(Parameter::new(parameter.label.as_deref(), name, annotation));
        }

        let return_type = match &function.return_type {
            Some(annotation) => self.resolve_annotation(annotation),
            None => self.ctx().type_annotation(self.ctx().void_type()),
        };

        self.types.pop_scope();

        let mut function_type = FunctionType::new(function.purity, parameters, return_type);
        function_type.type_parameters = type_parameters;
        self.ctx_mut().function_type(function_type)
    }
}
