//! Name binding - declares types and members
//!
//! Binding runs in two phases. The first allocates a nominal type for every
//! composite, interface, entitlement and entitlement mapping and binds its
//! name in the type scope of its container. The second fills in what those
//! types consist of: conformances, fields, functions, initializers, mapping
//! relations and the constructor values of composites. Because all names are
//! bound before any member is resolved, declarations may refer to each other
//! in any order.

use crate::ast::*;
use crate::checker::{AccessPosition, Checker};
use crate::error::CheckError;
use crate::symbols::{ScopeKind, Symbol, SymbolKind};
use sema_types::{
    Access, CompositeKind, CompositeType, DeclarationKind, EntitlementMapType,
    EntitlementRelation, EntitlementType, FunctionPurity, FunctionType, InterfaceType, Member,
    NumericType, Parameter, SubtypingContext, Type, TypeId,
};

/// Name of the event a resource emits when it is destroyed
pub const RESOURCE_DESTROYED_EVENT: &str = "ResourceDestroyed";

/// The composite or interface whose members are being declared
#[derive(Debug, Clone, Copy)]
pub(crate) struct Container {
    pub ty: TypeId,
    pub kind: CompositeKind,
    pub is_interface: bool,
}

impl Container {
    fn declaration_kind(&self) -> DeclarationKind {
        self.kind.declaration_kind(self.is_interface)
    }
}

impl<'r> Checker<'r> {
    // ----- phase 1: types -----

    pub(crate) fn declare_types(&mut self, declarations: &[Declaration], container: Option<Container>) {
        // Entitlements first, so that mappings and members can use them
        for declaration in declarations {
            if let Declaration::Entitlement(d) = declaration {
                if self.check_nesting(container, DeclarationKind::Entitlement, d.span) {
                    let location = self.config.location.clone();
                    let ty = self
                        .ctx_mut()
                        .declare_entitlement(EntitlementType::new(location, &d.identifier.name));
                    self.bind_type(&d.identifier, d.span, ty, DeclarationKind::Entitlement, container);
                }
            }
        }
        for declaration in declarations {
            if let Declaration::EntitlementMapping(d) = declaration {
                if self.check_nesting(container, DeclarationKind::EntitlementMapping, d.span) {
                    let location = self.config.location.clone();
                    let ty = self
                        .ctx_mut()
                        .declare_entitlement_map(EntitlementMapType::new(location, &d.identifier.name));
                    self.bind_type(
                        &d.identifier,
                        d.span,
                        ty,
                        DeclarationKind::EntitlementMapping,
                        container,
                    );
                }
            }
        }
        for declaration in declarations {
            if let Declaration::Interface(d) = declaration {
                self.declare_interface_type(d, container);
            }
        }
        for declaration in declarations {
            match declaration {
                Declaration::Composite(d) => self.declare_composite_type(d, container),
                Declaration::Variable(d) if container.is_some() => {
                    self.report(CheckError::InvalidDeclaration {
                        kind: if d.is_constant { "constant" } else { "variable" }.to_string(),
                        span: d.span,
                    });
                }
                Declaration::Field(d) if container.is_none() => {
                    self.report(CheckError::InvalidDeclaration {
                        kind: DeclarationKind::Field.name().to_string(),
                        span: d.span,
                    });
                }
                Declaration::Initializer(d) if container.is_none() => {
                    self.report(CheckError::InvalidDeclaration {
                        kind: DeclarationKind::Initializer.name().to_string(),
                        span: d.span,
                    });
                }
                _ => {}
            }
        }
    }

    fn declare_composite_type(&mut self, declaration: &CompositeDeclaration, container: Option<Container>) {
        let kind = declaration.kind.declaration_kind(false);
        if !self.check_nesting(container, kind, declaration.span) {
            return;
        }
        if declaration.kind == CompositeKind::Attachment && !self.config.attachments_enabled {
            self.report(CheckError::AttachmentsNotEnabled {
                span: declaration.identifier.span,
            });
        }

        let location = self.config.location.clone();
        let ty = self.ctx_mut().declare_composite(CompositeType::new(
            location,
            declaration.kind,
            &declaration.identifier.name,
        ));
        self.bind_type(&declaration.identifier, declaration.span, ty, kind, container);

        let scope = self.types.push_scope(ScopeKind::Composite);
        self.member_scopes.insert(ty, scope);
        let this = Container {
            ty,
            kind: declaration.kind,
            is_interface: false,
        };
        self.declare_types(&declaration.members, Some(this));
        self.types.pop_scope();
    }

    fn declare_interface_type(&mut self, declaration: &InterfaceDeclaration, container: Option<Container>) {
        let kind = declaration.kind.declaration_kind(true);
        if !self.check_nesting(container, kind, declaration.span) {
            return;
        }
        if !declaration.kind.supports_interfaces() {
            self.report(CheckError::InvalidInterfaceDeclaration {
                kind: declaration.kind.name().to_string(),
                span: declaration.identifier.span,
            });
        }

        let location = self.config.location.clone();
        let ty = self.ctx_mut().declare_interface(InterfaceType::new(
            location,
            declaration.kind,
            &declaration.identifier.name,
        ));
        self.bind_type(&declaration.identifier, declaration.span, ty, kind, container);

        let scope = self.types.push_scope(ScopeKind::Composite);
        self.member_scopes.insert(ty, scope);
        let this = Container {
            ty,
            kind: declaration.kind,
            is_interface: true,
        };
        self.declare_types(&declaration.members, Some(this));
        self.types.pop_scope();
    }

    /// Whether a declaration of `kind` may appear inside `container`
    ///
    /// Events may be nested anywhere. Other composites may only be nested in
    /// contracts, and interfaces, entitlements and mappings in contracts and
    /// contract interfaces.
    fn check_nesting(&mut self, container: Option<Container>, kind: DeclarationKind, span: sema_types::Span) -> bool {
        let Some(container) = container else {
            return true;
        };

        let allowed = match kind {
            DeclarationKind::Event => true,
            DeclarationKind::StructureInterface
            | DeclarationKind::ResourceInterface
            | DeclarationKind::ContractInterface
            | DeclarationKind::Entitlement
            | DeclarationKind::EntitlementMapping => container.kind == CompositeKind::Contract,
            _ => container.kind == CompositeKind::Contract && !container.is_interface,
        };
        if !allowed {
            self.report(CheckError::InvalidNestedDeclaration {
                nested: kind.name().to_string(),
                container: container.declaration_kind().name().to_string(),
                span,
            });
        }
        allowed
    }

    fn bind_type(
        &mut self,
        identifier: &Identifier,
        span: sema_types::Span,
        ty: TypeId,
        kind: DeclarationKind,
        container: Option<Container>,
    ) {
        self.elaboration.record_declaration(span, ty);

        let symbol = Symbol::new(&identifier.name, SymbolKind::Type, ty, kind, identifier.span);
        if let Err(error) = self.types.define(symbol) {
            self.redeclaration(error);
            return;
        }

        match container {
            Some(container) => {
                self.ctx_mut().set_container(ty, container.ty);
            }
            None => self.elaboration.record_global_type(&identifier.name, ty),
        }
    }

    // ----- phase 2: members -----

    pub(crate) fn declare_members(&mut self, declarations: &[Declaration], container: Option<Container>) {
        let position = match container {
            Some(_) => AccessPosition::Nested,
            None => AccessPosition::Global,
        };

        for declaration in declarations {
            match declaration {
                Declaration::Entitlement(d) => {
                    if self.elaboration.declaration_type(d.span).is_some() {
                        self.resolve_access(&d.access, DeclarationKind::Entitlement, &d.identifier, position);
                    }
                }
                Declaration::EntitlementMapping(d) => self.declare_entitlement_mapping(d, position),
                Declaration::Interface(d) => self.declare_interface_members(d, container),
                Declaration::Composite(d) => self.declare_composite_members(d, container),
                Declaration::Function(d) if container.is_none() => self.declare_global_function(d),
                _ => {}
            }
        }
    }

    fn declare_composite_members(&mut self, declaration: &CompositeDeclaration, outer: Option<Container>) {
        let Some(ty) = self.elaboration.declaration_type(declaration.span) else {
            return;
        };
        let position = match outer {
            Some(_) => AccessPosition::Nested,
            None => AccessPosition::Global,
        };
        let kind = declaration.kind.declaration_kind(false);
        self.resolve_access(&declaration.access, kind, &declaration.identifier, position);

        let previous = self.enter_members(ty);
        let this = Container {
            ty,
            kind: declaration.kind,
            is_interface: false,
        };

        let (conformances, raw_type) =
            self.resolve_conformances(&declaration.conformances, declaration.kind == CompositeKind::Enum);

        self.declare_members(&declaration.members, Some(this));
        self.declare_fields_and_functions(this, &declaration.members);
        let initializer = self.declare_initializer(&declaration.members);

        if let Some(previous) = previous {
            self.types.leave_scope(previous);
        }

        let (parameters, purity) = initializer.unwrap_or_default();
        if let Some(composite) = self.ctx_mut().as_composite_mut(ty) {
            composite.explicit_conformances = conformances;
            composite.enum_raw_type = raw_type;
            composite.constructor_parameters = parameters.clone();
            composite.constructor_purity = purity;
        }

        let value = match declaration.kind {
            CompositeKind::Contract => ty,
            CompositeKind::Enum => {
                let raw = raw_type.unwrap_or_else(|| self.ctx().invalid_type());
                let raw = self.ctx().type_annotation(raw);
                let optional = self.ctx_mut().optional_type(ty);
                let optional = self.ctx().type_annotation(optional);
                let mut function = FunctionType::new(
                    FunctionPurity::View,
                    vec![Parameter::new(None, "rawValue", raw)],
                    optional,
                );
                function.is_constructor = true;
                self.ctx_mut().function_type(function)
            }
            _ => {
                let annotation = self.ctx().type_annotation(ty);
                let mut function = FunctionType::new(purity, parameters, annotation);
                function.is_constructor = true;
                self.ctx_mut().function_type(function)
            }
        };

        match outer {
            Some(outer) => self.declare_nested_value(outer, declaration, ty, value),
            None => {
                let symbol = Symbol::new(
                    &declaration.identifier.name,
                    SymbolKind::Constructor,
                    value,
                    kind,
                    declaration.identifier.span,
                );
                match self.values.define(symbol) {
                    Ok(()) => self.elaboration.record_global_value(&declaration.identifier.name, value),
                    Err(error) => self.redeclaration(error),
                }
            }
        }
    }

    /// Make a nested composite available as a member of its container
    ///
    /// The default destroy event of an interface is recorded on the
    /// interface instead.
    fn declare_nested_value(
        &mut self,
        outer: Container,
        declaration: &CompositeDeclaration,
        ty: TypeId,
        value: TypeId,
    ) {
        let name = &declaration.identifier.name;
        if outer.is_interface
            && declaration.kind == CompositeKind::Event
            && name == RESOURCE_DESTROYED_EVENT
        {
            if let Some(interface) = self.ctx_mut().as_interface_mut(outer.ty) {
                interface.default_destroy_event = Some(ty);
            }
            return;
        }

        let labels = self
            .ctx()
            .get(value)
            .and_then(Type::as_function)
            .map(FunctionType::argument_labels)
            .unwrap_or_default();
        let mut member = Member::function(outer.ty, Access::UNAUTHORIZED, name, value, labels)
            .with_span(declaration.identifier.span);
        member.declaration_kind = declaration.kind.declaration_kind(false);
        self.add_member(outer, member);
    }

    fn declare_interface_members(&mut self, declaration: &InterfaceDeclaration, outer: Option<Container>) {
        let Some(ty) = self.elaboration.declaration_type(declaration.span) else {
            return;
        };
        let position = match outer {
            Some(_) => AccessPosition::Nested,
            None => AccessPosition::Global,
        };
        let kind = declaration.kind.declaration_kind(true);
        self.resolve_access(&declaration.access, kind, &declaration.identifier, position);

        let previous = self.enter_members(ty);
        let this = Container {
            ty,
            kind: declaration.kind,
            is_interface: true,
        };

        let (conformances, _) = self.resolve_conformances(&declaration.conformances, false);
        if let Some(interface) = self.ctx_mut().as_interface_mut(ty) {
            interface.explicit_conformances = conformances;
        }

        self.declare_members(&declaration.members, Some(this));
        self.declare_fields_and_functions(this, &declaration.members);
        let initializer = self.declare_initializer(&declaration.members);

        if let Some(previous) = previous {
            self.types.leave_scope(previous);
        }

        let (parameters, purity) = initializer.unwrap_or_default();
        if let Some(interface) = self.ctx_mut().as_interface_mut(ty) {
            interface.initializer_parameters = parameters;
            interface.initializer_purity = purity;
        }
    }

    /// Resolve the conformance list of a composite or interface
    ///
    /// The first entry of an enum's list is its raw type when it is an integer type.
    fn resolve_conformances(&mut self, nominals: &[NominalType], is_enum: bool) -> (Vec<TypeId>, Option<TypeId>) {
        let mut conformances: Vec<TypeId> = Vec::new();
        let mut raw_type = None;

        for (index, nominal) in nominals.iter().enumerate() {
            let ty = self.resolve_nominal(nominal);
            if self.is_invalid(ty) {
                continue;
            }

            if is_enum && index == 0 && self.is_integer_type(ty) {
                raw_type = Some(ty);
                continue;
            }

            if self.ctx().as_interface(ty).is_none() {
                self.report(CheckError::InvalidConformance {
                    ty: self.qualified(ty),
                    span: nominal.span(),
                });
                continue;
            }

            if conformances.contains(&ty) {
                self.report(CheckError::DuplicateConformance {
                    interface: self.qualified(ty),
                    span: nominal.span(),
                });
                continue;
            }
            conformances.push(ty);
        }

        (conformances, raw_type)
    }

    fn is_integer_type(&self, ty: TypeId) -> bool {
        let integer = self.ctx().numeric(NumericType::Integer);
        matches!(self.ctx().get(ty), Some(Type::Numeric(_)))
            && SubtypingContext::new(self.ctx()).is_subtype(ty, integer)
    }

    fn declare_fields_and_functions(&mut self, this: Container, members: &[Declaration]) {
        for declaration in members {
            match declaration {
                Declaration::Field(field) => {
                    let access = self.resolve_access(
                        &field.access,
                        DeclarationKind::Field,
                        &field.identifier,
                        AccessPosition::Member,
                    );
                    let annotation = self.with_mapped_access(&access, |checker| {
                        checker.resolve_annotation(&field.type_annotation)
                    });
                    let member = Member::field(
                        this.ty,
                        access,
                        field.variable_kind,
                        &field.identifier.name,
                        annotation,
                    )
                    .with_span(field.identifier.span);
                    self.add_member(this, member);
                }
                Declaration::Function(function) => {
                    let access = self.resolve_access(
                        &function.access,
                        DeclarationKind::Function,
                        &function.identifier,
                        AccessPosition::Member,
                    );
                    let ty = self.with_mapped_access(&access, |checker| checker.resolve_function(function));
                    let labels = self
                        .ctx()
                        .get(ty)
                        .and_then(Type::as_function)
                        .map(FunctionType::argument_labels)
                        .unwrap_or_default();

                    // An interface function only provides a default when it has statements
                    let has_implementation = if this.is_interface {
                        function.has_statements()
                    } else {
                        function.body.is_some()
                    };

                    let member = Member::function(this.ty, access, &function.identifier.name, ty, labels)
                        .with_span(function.identifier.span)
                        .with_body(has_implementation, function.has_conditions());
                    self.elaboration.record_declaration(function.span, ty);
                    self.add_member(this, member);
                }
                _ => {}
            }
        }
    }

    fn with_mapped_access<T>(&mut self, access: &Access, f: impl FnOnce(&mut Self) -> T) -> T {
        let mapped = match access {
            Access::EntitlementMap(map) => Some(*map),
            _ => None,
        };
        let saved = std::mem::replace(&mut self.mapped_access, mapped);
        let result = f(self);
        self.mapped_access = saved;
        result
    }

    fn add_member(&mut self, this: Container, member: Member) {
        let existing = if this.is_interface {
            self.ctx().as_interface(this.ty).and_then(|i| i.members.get(&member.identifier))
        } else {
            self.ctx().as_composite(this.ty).and_then(|c| c.members.get(&member.identifier))
        };
        if let Some(existing) = existing {
            let error = CheckError::Redeclaration {
                name: member.identifier.clone(),
                kind: member.declaration_kind.name().to_string(),
                original: existing.span,
                span: member.span,
            };
            self.report(error);
            return;
        }

        if this.is_interface {
            if let Some(interface) = self.ctx_mut().as_interface_mut(this.ty) {
                interface.add_member(member);
            }
        } else if let Some(composite) = self.ctx_mut().as_composite_mut(this.ty) {
            composite.add_member(member);
        }
    }

    /// Parameters and purity of the initializer, if one is declared
    fn declare_initializer(&mut self, members: &[Declaration]) -> Option<(Vec<Parameter>, FunctionPurity)> {
        let mut first: Option<&FunctionDeclaration> = None;
        let mut result = None;

        for declaration in members {
            let Declaration::Initializer(initializer) = declaration else {
                continue;
            };
            if let Some(first) = first {
                self.report(CheckError::Redeclaration {
                    name: initializer.identifier.name.clone(),
                    kind: DeclarationKind::Initializer.name().to_string(),
                    original: first.identifier.span,
                    span: initializer.identifier.span,
                });
                continue;
            }
            first = Some(initializer);

            self.resolve_access(
                &initializer.access,
                DeclarationKind::Initializer,
                &initializer.identifier,
                AccessPosition::Initializer,
            );
            let ty = self.resolve_function(initializer);
            self.elaboration.record_declaration(initializer.span, ty);
            result = self
                .ctx()
                .get(ty)
                .and_then(Type::as_function)
                .map(|function| (function.parameters.clone(), function.purity));
        }

        result
    }

    fn declare_global_function(&mut self, function: &FunctionDeclaration) {
        let access = self.resolve_access(
            &function.access,
            DeclarationKind::Function,
            &function.identifier,
            AccessPosition::Global,
        );
        let ty = self.resolve_function(function);
        self.elaboration.record_declaration(function.span, ty);

        let symbol = Symbol::new(
            &function.identifier.name,
            SymbolKind::Function,
            ty,
            DeclarationKind::Function,
            function.identifier.span,
        )
        .with_access(access);
        match self.values.define(symbol) {
            Ok(()) => self.elaboration.record_global_value(&function.identifier.name, ty),
            Err(error) => self.redeclaration(error),
        }
    }

    fn declare_entitlement_mapping(&mut self, declaration: &EntitlementMappingDeclaration, position: AccessPosition) {
        let Some(ty) = self.elaboration.declaration_type(declaration.span) else {
            return;
        };
        self.resolve_access(
            &declaration.access,
            DeclarationKind::EntitlementMapping,
            &declaration.identifier,
            position,
        );

        let mut relations: Vec<EntitlementRelation> = Vec::new();
        let mut inclusions = Vec::new();

        for element in &declaration.elements {
            match element {
                EntitlementMapElement::Relation { input, output } => {
                    let Some(input) = self.resolve_map_entitlement(input) else {
                        continue;
                    };
                    let Some(output) = self.resolve_map_entitlement(output) else {
                        continue;
                    };
                    let relation = EntitlementRelation { input, output };
                    if !relations.contains(&relation) {
                        relations.push(relation);
                    }
                }
                EntitlementMapElement::Include(nominal) => inclusions.push(nominal.clone()),
            }
        }

        tracing::trace!(
            map = %declaration.identifier.name,
            relations = relations.len(),
            inclusions = inclusions.len(),
            "declared entitlement mapping"
        );

        if let Some(map) = self.ctx_mut().as_entitlement_map_mut(ty) {
            map.relations = relations;
        }
        let scope = self.types.current_scope_id();
        self.map_inclusions.insert(ty, (scope, inclusions));
    }

    fn resolve_map_entitlement(&mut self, nominal: &NominalType) -> Option<TypeId> {
        let ty = self.resolve_nominal(nominal);
        if self.is_invalid(ty) {
            return None;
        }
        if !matches!(self.ctx().get(ty), Some(Type::Entitlement(_))) {
            self.report(CheckError::InvalidNonEntitlementTypeInMap {
                ty: self.qualified(ty),
                span: nominal.span(),
            });
            return None;
        }
        Some(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::config::CheckerConfig;
    use crate::test_utils::init_test_logging;
    use sema_types::{BaseTypeRegistry, VariableKind};

    fn check(program: &Program) -> Result<crate::Elaboration, Vec<CheckError>> {
        init_test_logging();
        let registry = BaseTypeRegistry::new();
        Checker::new(&registry, CheckerConfig::default()).check_program(program)
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        let program = program(vec![
            composite(CompositeKind::Structure, "A")
                .member(field(VariableKind::Constant, "b", annotation(named("B"))))
                .into(),
            composite(CompositeKind::Structure, "B").into(),
        ]);
        let elaboration = check(&program).unwrap();
        let a = elaboration.global_type("A").unwrap();
        let b = elaboration.global_type("B").unwrap();
        assert_eq!(elaboration.context().as_composite(a).unwrap().members["b"].ty(), b);
    }

    #[test]
    fn test_nested_type_is_qualified() {
        let program = program(vec![
            composite(CompositeKind::Contract, "C")
                .member(composite(CompositeKind::Resource, "Vault"))
                .into(),
            constant("v", None, call(member(value("C"), "Vault"), vec![])).into(),
        ]);
        let elaboration = check(&program).unwrap();
        assert_eq!(elaboration.value_type_string("v").as_deref(), Some("Vault"));

        let c = elaboration.global_type("C").unwrap();
        let vault = elaboration.context().nested_types(c).unwrap()["Vault"];
        assert_eq!(elaboration.context().qualified_string(vault), "C.Vault");
    }

    #[test]
    fn test_redeclared_type() {
        let program = program(vec![
            composite(CompositeKind::Structure, "S").into(),
            interface(CompositeKind::Structure, "S").into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, CheckError::Redeclaration { name, .. } if name == "S")));
    }

    #[test]
    fn test_redeclared_member() {
        let program = program(vec![composite(CompositeKind::Structure, "S")
            .member(field(VariableKind::Constant, "x", annotation(named("Int"))))
            .member(function("x"))
            .into()]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], CheckError::Redeclaration { kind, .. } if kind == "function"));
    }

    #[test]
    fn test_resource_nested_in_struct() {
        let program = program(vec![composite(CompositeKind::Structure, "S")
            .member(composite(CompositeKind::Resource, "R"))
            .into()]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            CheckError::InvalidNestedDeclaration { nested, container, .. }
                if nested == "resource" && container == "structure"
        ));
    }

    #[test]
    fn test_events_nest_anywhere() {
        let program = program(vec![composite(CompositeKind::Resource, "R")
            .member(composite(CompositeKind::Event, "Moved"))
            .into()]);
        check(&program).unwrap();
    }

    #[test]
    fn test_enum_interface_is_invalid() {
        let program = program(vec![interface(CompositeKind::Enum, "E").into()]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(errors[0], CheckError::InvalidInterfaceDeclaration { .. }));
    }

    #[test]
    fn test_attachments_disabled() {
        let registry = BaseTypeRegistry::new();
        let config = CheckerConfig {
            attachments_enabled: false,
            ..CheckerConfig::default()
        };
        let program = program(vec![composite(CompositeKind::Attachment, "A").into()]);
        let errors = Checker::new(&registry, config).check_program(&program).unwrap_err();
        assert!(matches!(errors[0], CheckError::AttachmentsNotEnabled { .. }));
    }

    #[test]
    fn test_initializer_sets_constructor() {
        let program = program(vec![
            composite(CompositeKind::Structure, "Point")
                .member(as_initializer(
                    initializer()
                        .parameter(None, "x", annotation(named("Int")))
                        .parameter(Some("_"), "y", annotation(named("Int")))
                        .with_implementation(),
                ))
                .into(),
            constant("p", None, call(value("Point"), vec![labeled("x", int(1)), arg(int(2))])).into(),
        ]);
        let elaboration = check(&program).unwrap();
        assert_eq!(elaboration.value_type_string("p").as_deref(), Some("Point"));
        assert_eq!(
            elaboration.value_type_string("Point").as_deref(),
            Some("fun(x: Int, _ y: Int): Point")
        );
    }

    #[test]
    fn test_duplicate_initializer() {
        let program = program(vec![composite(CompositeKind::Structure, "S")
            .member(as_initializer(initializer()))
            .member(as_initializer(initializer()))
            .into()]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(&errors[0], CheckError::Redeclaration { kind, .. } if kind == "initializer"));
    }

    #[test]
    fn test_enum_raw_type() {
        let program = program(vec![
            composite(CompositeKind::Enum, "Color").conforms_to("UInt8").into(),
            constant("c", None, call(value("Color"), vec![labeled("rawValue", int(1))])).into(),
        ]);
        let elaboration = check(&program).unwrap();
        assert_eq!(elaboration.value_type_string("c").as_deref(), Some("Color?"));
    }

    #[test]
    fn test_conformance_must_be_interface() {
        let program = program(vec![
            composite(CompositeKind::Structure, "A").into(),
            composite(CompositeKind::Structure, "B").conforms_to("A").into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], CheckError::InvalidConformance { ty, .. } if ty == "A"));
    }
}
