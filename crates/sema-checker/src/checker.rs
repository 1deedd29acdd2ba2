//! Checker - drives the passes over a program
//!
//! Checking runs in four phases over the same program:
//!
//! 1. declare nominal types, so every later phase can refer to any of them
//!    regardless of declaration order ([`crate::binder`])
//! 2. declare members, conformances, initializers and constructors
//! 3. check interface and composite conformance, entitlement mapping
//!    inclusions and field kinds ([`crate::conformance`])
//! 4. check top-level variables in source order ([`crate::expression`])
//!
//! Errors are collected across all phases.

use crate::ast::*;
use crate::config::{AccessCheckMode, CheckerConfig};
use crate::elaboration::Elaboration;
use crate::error::CheckError;
use crate::resolve::RestrictedTypeCheck;
use crate::symbols::{DuplicateSymbolError, ScopeId, ScopeKind, Symbol, SymbolKind, SymbolTable};
use sema_types::{
    Access, BaseTypeRegistry, DeclarationKind, EntitlementSetKind, PrimitiveAccess, Span,
    Type, TypeContext, TypeId,
};
use rustc_hash::FxHashMap;

/// Where a declaration appears, for access modifier rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccessPosition {
    /// Top-level declaration of a program
    Global,
    /// Field or function of a composite or interface
    Member,
    /// Nested type declaration
    Nested,
    /// Initializer
    Initializer,
}

/// Static checker for one program
///
/// Every program starts from a clone of the base registry's type context,
/// so built-in types keep their ids.
pub struct Checker<'r> {
    pub(crate) registry: &'r BaseTypeRegistry,
    pub(crate) config: CheckerConfig,
    pub(crate) elaboration: Elaboration,

    /// Type names
    pub(crate) types: SymbolTable,
    /// Value names
    pub(crate) values: SymbolTable,

    /// Type scope holding the nested declarations of each composite and interface
    pub(crate) member_scopes: FxHashMap<TypeId, ScopeId>,

    /// Scope each entitlement mapping was declared in, with its inclusions
    pub(crate) map_inclusions: FxHashMap<TypeId, (ScopeId, Vec<NominalType>)>,

    /// Mapping of the member whose type is being resolved
    pub(crate) mapped_access: Option<TypeId>,

    /// Restricted types resolved before conformances were declared
    pub(crate) pending_restrictions: Vec<RestrictedTypeCheck>,
    pub(crate) conformances_declared: bool,

    pub(crate) errors: Vec<CheckError>,
}

impl<'r> Checker<'r> {
    /// Create a checker whose global scope holds the base types and values
    pub fn new(registry: &'r BaseTypeRegistry, config: CheckerConfig) -> Self {
        let mut types = SymbolTable::new();
        let mut values = SymbolTable::new();

        for (name, ty) in registry.types() {
            let symbol = Symbol::new(name, SymbolKind::Base, ty, DeclarationKind::Type, Span::default());
            // Registry names are unique
            let _ = types.define(symbol);
        }
        for (name, ty) in registry.values() {
            let symbol = Symbol::new(name, SymbolKind::Base, ty, DeclarationKind::Function, Span::default());
            let _ = values.define(symbol);
        }

        Checker {
            registry,
            config,
            elaboration: Elaboration::new(registry.context().clone()),
            types,
            values,
            member_scopes: FxHashMap::default(),
            map_inclusions: FxHashMap::default(),
            mapped_access: None,
            pending_restrictions: Vec::new(),
            conformances_declared: false,
            errors: Vec::new(),
        }
    }

    /// Check a program
    ///
    /// Returns the elaboration when no errors were found, and all errors otherwise.
    pub fn check_program(mut self, program: &Program) -> Result<Elaboration, Vec<CheckError>> {
        self.types.push_scope(ScopeKind::Program);
        self.values.push_scope(ScopeKind::Program);

        tracing::debug!(declarations = program.declarations.len(), "declaring types");
        self.declare_types(&program.declarations, None);

        tracing::debug!("declaring members");
        self.declare_members(&program.declarations, None);
        self.conformances_declared = true;
        for check in std::mem::take(&mut self.pending_restrictions) {
            self.check_restricted_type(&check);
        }

        tracing::debug!("checking conformances");
        self.check_declarations(&program.declarations);

        tracing::debug!("checking global variables");
        for declaration in &program.declarations {
            if let Declaration::Variable(variable) = declaration {
                self.check_variable_declaration(variable);
            }
        }

        if self.errors.is_empty() {
            tracing::debug!(types = self.ctx().len(), "program checked");
            Ok(self.elaboration)
        } else {
            tracing::debug!(errors = self.errors.len(), "program rejected");
            Err(self.errors)
        }
    }

    /// Errors collected so far
    pub fn errors(&self) -> &[CheckError] {
        &self.errors
    }

    /// Base types and values the checker was created with
    pub fn registry(&self) -> &BaseTypeRegistry {
        self.registry
    }

    pub(crate) fn report(&mut self, error: impl Into<CheckError>) {
        let error = error.into();
        tracing::trace!(code = error.code().as_str(), "{}", error);
        self.errors.push(error);
    }

    pub(crate) fn ctx(&self) -> &TypeContext {
        self.elaboration.context()
    }

    pub(crate) fn ctx_mut(&mut self) -> &mut TypeContext {
        self.elaboration.context_mut()
    }

    /// Type recorded in phase 1 for the declaration at `span`
    pub(crate) fn declared(&self, span: Span) -> TypeId {
        match self.elaboration.declaration_type(span) {
            Some(ty) => ty,
            None => unreachable!("declaration at {:?} was not declared", span),
        }
    }

    pub(crate) fn qualified(&self, ty: TypeId) -> String {
        self.ctx().qualified_string(ty)
    }

    pub(crate) fn is_invalid(&self, ty: TypeId) -> bool {
        self.ctx().is_invalid_type(ty)
    }

    /// Re-enter the type scope of a composite or interface declared in phase 1
    pub(crate) fn enter_members(&mut self, ty: TypeId) -> Option<ScopeId> {
        let scope = *self.member_scopes.get(&ty)?;
        Some(self.types.enter_scope(scope))
    }

    pub(crate) fn redeclaration(&mut self, error: DuplicateSymbolError) {
        self.report(CheckError::Redeclaration {
            name: error.name,
            kind: error.kind.name().to_string(),
            original: error.original,
            span: error.duplicate,
        });
    }

    /// Resolve an access modifier
    ///
    /// Entitlement and mapping access is only meaningful on members. A
    /// missing modifier is resolved by the configured [`AccessCheckMode`];
    /// top-level variables and functions and initializers may omit it.
    pub(crate) fn resolve_access(
        &mut self,
        modifier: &AccessModifier,
        kind: DeclarationKind,
        identifier: &Identifier,
        position: AccessPosition,
    ) -> Access {
        let primitive = match modifier {
            AccessModifier::NotSpecified => {
                let exempt = matches!(position, AccessPosition::Global | AccessPosition::Initializer)
                    && matches!(
                        kind,
                        DeclarationKind::Constant
                            | DeclarationKind::Variable
                            | DeclarationKind::Function
                            | DeclarationKind::Initializer
                    );
                match self.config.access_check_mode {
                    _ if exempt => PrimitiveAccess::All,
                    AccessCheckMode::Strict => {
                        self.report(CheckError::MissingAccessModifier {
                            kind: kind.name().to_string(),
                            name: identifier.name.clone(),
                            span: identifier.span,
                        });
                        PrimitiveAccess::Private
                    }
                    AccessCheckMode::NotSpecifiedRestricted => PrimitiveAccess::Private,
                    AccessCheckMode::NotSpecifiedUnrestricted | AccessCheckMode::None => {
                        PrimitiveAccess::All
                    }
                }
            }
            AccessModifier::Private => PrimitiveAccess::Private,
            AccessModifier::Contract => PrimitiveAccess::Contract,
            AccessModifier::Account => PrimitiveAccess::Account,
            AccessModifier::All => PrimitiveAccess::All,
            AccessModifier::Authorized(authorization) => {
                if position != AccessPosition::Member {
                    self.report(CheckError::InvalidAccessModifier {
                        access: authorization_string(authorization),
                        kind: kind.name().to_string(),
                        span: identifier.span,
                    });
                    return Access::UNAUTHORIZED;
                }
                return self.resolve_authorization(authorization, false);
            }
        };
        Access::Primitive(primitive)
    }

    /// Resolve the entitlements of `access(...)` or `auth(...)`
    ///
    /// `auth(mapping M)` in a type is only allowed while resolving the type
    /// of a member declared with `access(mapping M)`.
    pub(crate) fn resolve_authorization(&mut self, authorization: &Authorization, in_type: bool) -> Access {
        match authorization {
            Authorization::Entitlements { kind, entitlements } => {
                let mut resolved = Vec::new();
                for nominal in entitlements {
                    let ty = self.resolve_nominal(nominal);
                    if self.is_invalid(ty) {
                        continue;
                    }
                    if !matches!(self.ctx().get(ty), Some(Type::Entitlement(_))) {
                        self.report(CheckError::InvalidNonEntitlementAccess {
                            ty: self.qualified(ty),
                            span: nominal.span(),
                        });
                        continue;
                    }
                    if !resolved.contains(&ty) {
                        resolved.push(ty);
                    }
                }
                if resolved.is_empty() {
                    return Access::UNAUTHORIZED;
                }
                Access::entitlement_set(*kind, resolved)
            }
            Authorization::Mapping(nominal) => {
                let ty = self.resolve_nominal(nominal);
                if self.is_invalid(ty) {
                    return Access::UNAUTHORIZED;
                }
                if !matches!(self.ctx().get(ty), Some(Type::EntitlementMap(_))) {
                    self.report(CheckError::InvalidNonEntitlementAccess {
                        ty: self.qualified(ty),
                        span: nominal.span(),
                    });
                    return Access::UNAUTHORIZED;
                }
                if in_type && self.mapped_access != Some(ty) {
                    self.report(CheckError::InvalidMappedAuthorization {
                        map: self.qualified(ty),
                        span: nominal.span(),
                    });
                    return Access::UNAUTHORIZED;
                }
                Access::EntitlementMap(ty)
            }
        }
    }
}

fn authorization_string(authorization: &Authorization) -> String {
    match authorization {
        Authorization::Entitlements { kind, entitlements } => {
            let separator = match kind {
                EntitlementSetKind::Conjunction => ", ",
                EntitlementSetKind::Disjunction => " | ",
            };
            let names: Vec<String> = entitlements.iter().map(NominalType::qualified_name).collect();
            format!("access({})", names.join(separator))
        }
        Authorization::Mapping(map) => format!("access(mapping {})", map.qualified_name()),
    }
}
