//! Conformance checking
//!
//! Runs once every type and member is declared. Interfaces are checked
//! against the interfaces they inherit from, composites against all of
//! their effective conformances, and entitlement mappings have their
//! inclusions resolved.

use crate::ast::*;
use crate::checker::Checker;
use crate::error::CheckError;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use sema_types::{
    CompositeKind, DeclarationKind, FunctionPurity, Member, Parameter, Span, Type, TypeId,
    VariableKind,
};

impl<'r> Checker<'r> {
    pub(crate) fn check_declarations(&mut self, declarations: &[Declaration]) {
        for declaration in declarations {
            match declaration {
                Declaration::EntitlementMapping(d) => {
                    if let Some(map) = self.elaboration.declaration_type(d.span) {
                        self.resolve_inclusions(map, &mut FxHashSet::default());
                    }
                }
                Declaration::Interface(d) => self.check_interface_declaration(d),
                Declaration::Composite(d) => self.check_composite_declaration(d),
                _ => {}
            }
        }
    }

    // ----- interfaces -----

    fn check_interface_declaration(&mut self, declaration: &InterfaceDeclaration) {
        let Some(ty) = self.elaboration.declaration_type(declaration.span) else {
            return;
        };

        let mut inherited: IndexMap<String, Vec<Member>> = IndexMap::new();
        for conformance in self.ctx().effective_conformances(ty) {
            if conformance == ty {
                self.report(CheckError::CyclicConformance {
                    interface: self.qualified(ty),
                    span: declaration.identifier.span,
                });
                continue;
            }
            self.check_interface_conformance(ty, declaration, conformance, &mut inherited);
        }

        self.check_interface_functions(declaration);
        self.check_resource_fields(ty, declaration.kind);

        let has_default_destroy_event = self
            .ctx()
            .as_interface(ty)
            .is_some_and(|interface| interface.default_destroy_event.is_some());
        if declaration.kind != CompositeKind::Resource && has_default_destroy_event {
            self.report(CheckError::DefaultDestroyEventInNonResource {
                kind: declaration.kind.name().to_string(),
                span: declaration.span,
            });
        }

        let previous = self.enter_members(ty);
        self.check_declarations(&declaration.members);
        if let Some(previous) = previous {
            self.types.leave_scope(previous);
        }
    }

    /// Check the members an interface inherits from `conformance`
    ///
    /// `inherited` collects the members inherited so far by name. A member
    /// conflicts with a sibling inherited from another interface, or with
    /// the declaring interface's own member of the same name.
    fn check_interface_conformance(
        &mut self,
        ty: TypeId,
        declaration: &InterfaceDeclaration,
        conformance: TypeId,
        inherited: &mut IndexMap<String, Vec<Member>>,
    ) {
        self.check_kind_match(declaration.kind, conformance, &declaration.conformances, declaration.identifier.span);

        let (Some(interface), Some(inherited_from)) =
            (self.ctx().as_interface(ty), self.ctx().as_interface(conformance))
        else {
            return;
        };
        let declared = interface.members.clone();
        let conformance_members = inherited_from.members.clone();

        for (name, conformance_member) in conformance_members {
            let mut is_duplicate = false;

            if let Some(siblings) = inherited.get(&name).cloned() {
                for sibling in siblings {
                    is_duplicate = self.check_duplicate_interface_member(
                        conformance,
                        &conformance_member,
                        sibling.container,
                        &sibling,
                        declaration.identifier.span,
                        false,
                    );
                }
            }

            if let Some(declared_member) = declared.get(&name) {
                is_duplicate = is_duplicate
                    || self.check_duplicate_interface_member(
                        ty,
                        declared_member,
                        conformance,
                        &conformance_member,
                        declared_member.span,
                        true,
                    );
            }

            if !is_duplicate {
                inherited.entry(name).or_default().push(conformance_member);
            }
        }
    }

    /// Report a conflict between two members of the same name
    ///
    /// The members conflict when they do not have the same signature, when
    /// both provide an implementation, or when an inherited implementation
    /// is redeclared without conditions.
    fn check_duplicate_interface_member(
        &mut self,
        interface: TypeId,
        member: &Member,
        conflicting_interface: TypeId,
        conflicting_member: &Member,
        span: Span,
        is_conflicting_inherited: bool,
    ) -> bool {
        let conflict = !self.member_satisfied(member, conflicting_member)
            || (member.has_implementation && conflicting_member.has_implementation)
            || (is_conflicting_inherited
                && conflicting_member.has_implementation
                && !member.has_conditions);

        if conflict {
            self.report(CheckError::InterfaceMemberConflict {
                interface: self.qualified(interface),
                conflicting_interface: self.qualified(conflicting_interface),
                name: member.identifier.clone(),
                member_kind: member.declaration_kind.name().to_string(),
                span,
            });
        }
        conflict
    }

    /// An interface function may not have a body without statements or conditions
    fn check_interface_functions(&mut self, declaration: &InterfaceDeclaration) {
        for member in &declaration.members {
            let Declaration::Function(function) = member else {
                continue;
            };
            let Some(body) = &function.body else {
                continue;
            };
            if !function.has_statements() && !function.has_conditions() {
                let span = if body.span.is_empty() {
                    function.identifier.span
                } else {
                    body.span
                };
                self.report(CheckError::InvalidImplementation {
                    name: function.identifier.name.clone(),
                    span,
                });
            }
        }
    }

    // ----- composites -----

    fn check_composite_declaration(&mut self, declaration: &CompositeDeclaration) {
        let Some(ty) = self.elaboration.declaration_type(declaration.span) else {
            return;
        };
        let Some(composite) = self.ctx().as_composite(ty) else {
            return;
        };
        let members = composite.members.clone();
        let constructor_parameters = composite.constructor_parameters.clone();
        let conformances = self.ctx().effective_conformances(ty);

        for &conformance in &conformances {
            self.check_kind_match(
                declaration.kind,
                conformance,
                &declaration.conformances,
                declaration.identifier.span,
            );
        }

        // Default implementations the composite inherits, by member name
        let mut defaults: IndexMap<String, TypeId> = IndexMap::new();
        let mut conflicting: Vec<String> = Vec::new();
        for &conformance in &conformances {
            let Some(interface) = self.ctx().as_interface(conformance) else {
                continue;
            };
            for (name, member) in &interface.members {
                if member.declaration_kind != DeclarationKind::Function
                    || !member.has_implementation
                    || members.contains_key(name)
                {
                    continue;
                }
                match defaults.get(name) {
                    Some(provider) if *provider != conformance => {
                        if !conflicting.contains(name) {
                            conflicting.push(name.clone());
                        }
                    }
                    Some(_) => {}
                    None => {
                        defaults.insert(name.clone(), conformance);
                    }
                }
            }
        }
        for name in conflicting {
            self.report(CheckError::DefaultFunctionConflict {
                composite: self.qualified(ty),
                name,
                span: declaration.identifier.span,
            });
        }

        for &conformance in &conformances {
            let Some(interface) = self.ctx().as_interface(conformance) else {
                continue;
            };
            let requirements: Vec<Member> = interface
                .members
                .values()
                .filter(|m| {
                    matches!(m.declaration_kind, DeclarationKind::Field | DeclarationKind::Function)
                })
                .cloned()
                .collect();
            let initializer_parameters = interface.initializer_parameters.clone();

            let mut missing_members = Vec::new();
            let mut mismatched_members = Vec::new();
            for requirement in &requirements {
                match members.get(&requirement.identifier) {
                    Some(member) => {
                        if !self.member_satisfied(member, requirement) {
                            mismatched_members.push(requirement.identifier.clone());
                        }
                    }
                    None => {
                        if !defaults.contains_key(&requirement.identifier) {
                            missing_members.push(requirement.identifier.clone());
                        }
                    }
                }
            }

            let initializer_mismatch = !initializer_parameters.is_empty()
                && !self.parameters_equal(&constructor_parameters, &initializer_parameters);

            if !missing_members.is_empty() || !mismatched_members.is_empty() || initializer_mismatch {
                tracing::debug!(
                    composite = %declaration.identifier.name,
                    missing = missing_members.len(),
                    mismatched = mismatched_members.len(),
                    "composite does not conform"
                );
                self.report(CheckError::Conformance {
                    composite: self.qualified(ty),
                    interface: self.qualified(conformance),
                    missing_members,
                    mismatched_members,
                    initializer_mismatch,
                    span: declaration.identifier.span,
                });
            }
        }

        self.check_resource_fields(ty, declaration.kind);

        let previous = self.enter_members(ty);
        self.check_declarations(&declaration.members);
        if let Some(previous) = previous {
            self.types.leave_scope(previous);
        }
    }

    // ----- shared -----

    fn check_kind_match(&mut self, kind: CompositeKind, conformance: TypeId, written: &[NominalType], fallback: Span) {
        let Some(interface) = self.ctx().as_interface(conformance) else {
            return;
        };
        if interface.kind == kind {
            return;
        }

        // Point at the conformance when it is written on the declaration
        let span = written
            .iter()
            .find(|nominal| {
                nominal.nested_identifiers.last().unwrap_or(&nominal.identifier).name == interface.identifier
            })
            .map(NominalType::span)
            .unwrap_or(fallback);
        let actual = interface.kind.name().to_string();
        self.report(CheckError::CompositeKindMismatch {
            expected: kind.name().to_string(),
            actual,
            span,
        });
    }

    /// Whether `member` fulfils the requirement `requirement`
    ///
    /// Both must be of the same declaration kind and type. A field must
    /// match the variable kind the requirement states, a function must take
    /// the same argument labels and may only be `view` if required to be,
    /// and the member may not be less accessible than the requirement.
    pub(crate) fn member_satisfied(&self, member: &Member, requirement: &Member) -> bool {
        if member.declaration_kind != requirement.declaration_kind {
            return false;
        }

        let ctx = self.ctx();
        match requirement.declaration_kind {
            DeclarationKind::Field => {
                if requirement.variable_kind != VariableKind::NotSpecified
                    && member.variable_kind != requirement.variable_kind
                {
                    return false;
                }
                if !ctx.equal(member.ty(), requirement.ty()) {
                    return false;
                }
            }
            DeclarationKind::Function => {
                let (Some(Type::Function(function)), Some(Type::Function(required))) =
                    (ctx.get(member.ty()), ctx.get(requirement.ty()))
                else {
                    return false;
                };
                if !function.has_same_argument_labels(required) {
                    return false;
                }
                if required.purity == FunctionPurity::View && function.purity != FunctionPurity::View {
                    return false;
                }
                if function.type_parameters.len() != required.type_parameters.len()
                    || !self.parameters_equal(&function.parameters, &required.parameters)
                    || !ctx.equal(function.return_type.ty, required.return_type.ty)
                {
                    return false;
                }
            }
            _ => {
                if !ctx.equal(member.ty(), requirement.ty()) {
                    return false;
                }
            }
        }

        !member.access.is_less_permissive_than(&requirement.access)
    }

    fn parameters_equal(&self, parameters: &[Parameter], other: &[Parameter]) -> bool {
        parameters.len() == other.len()
            && parameters.iter().zip(other).all(|(a, b)| {
                a.effective_argument_label() == b.effective_argument_label()
                    && self.ctx().equal(a.type_annotation.ty, b.type_annotation.ty)
            })
    }

    /// Only resources and contracts may have resource-typed fields
    fn check_resource_fields(&mut self, ty: TypeId, kind: CompositeKind) {
        if matches!(kind, CompositeKind::Resource | CompositeKind::Contract) {
            return;
        }

        let fields: Vec<(String, Span, TypeId)> = if let Some(composite) = self.ctx().as_composite(ty) {
            composite
                .fields
                .iter()
                .filter_map(|name| composite.members.get(name))
                .map(|m| (m.identifier.clone(), m.span, m.ty()))
                .collect()
        } else if let Some(interface) = self.ctx().as_interface(ty) {
            interface
                .fields
                .iter()
                .filter_map(|name| interface.members.get(name))
                .map(|m| (m.identifier.clone(), m.span, m.ty()))
                .collect()
        } else {
            return;
        };

        for (name, span, field_type) in fields {
            if self.ctx().is_resource_type(field_type) {
                self.report(CheckError::InvalidResourceField {
                    name,
                    kind: kind.name().to_string(),
                    span,
                });
            }
        }
    }

    // ----- entitlement mappings -----

    /// Resolve `include` lines, adding the relations of included mappings
    ///
    /// `visiting` holds the mappings whose inclusions are being resolved
    /// further up, so that a mapping reached again is reported as a cycle.
    fn resolve_inclusions(&mut self, map: TypeId, visiting: &mut FxHashSet<TypeId>) {
        match self.ctx().as_entitlement_map(map) {
            Some(resolved) if !resolved.inclusions_resolved => {}
            _ => return,
        }
        let Some((scope, inclusions)) = self.map_inclusions.get(&map).cloned() else {
            if let Some(resolved) = self.ctx_mut().as_entitlement_map_mut(map) {
                resolved.inclusions_resolved = true;
            }
            return;
        };

        visiting.insert(map);
        let previous = self.types.enter_scope(scope);

        let identity = self.ctx().identity_map();
        let mut seen = FxHashSet::default();
        let mut relations = Vec::new();
        let mut includes_identity = false;

        for nominal in &inclusions {
            let included = self.resolve_nominal(nominal);
            if self.is_invalid(included) {
                continue;
            }
            if !matches!(self.ctx().get(included), Some(Type::EntitlementMap(_))) {
                self.report(CheckError::InvalidEntitlementMappingInclusion {
                    ty: self.qualified(included),
                    span: nominal.span(),
                });
                continue;
            }
            if !seen.insert(included) {
                self.report(CheckError::DuplicateEntitlementMappingInclusion {
                    map: self.qualified(map),
                    included: self.qualified(included),
                    span: nominal.span(),
                });
                continue;
            }
            if visiting.contains(&included) {
                self.report(CheckError::CyclicEntitlementMappingInclusion {
                    map: self.qualified(included),
                    span: nominal.span(),
                });
                continue;
            }
            if included == identity {
                includes_identity = true;
                continue;
            }

            self.resolve_inclusions(included, visiting);
            if let Some(included) = self.ctx().as_entitlement_map(included) {
                relations.extend(included.relations.iter().copied());
                includes_identity |= included.includes_identity;
            }
        }

        self.types.leave_scope(previous);
        visiting.remove(&map);

        if let Some(resolved) = self.ctx_mut().as_entitlement_map_mut(map) {
            for relation in relations {
                if !resolved.relations.contains(&relation) {
                    resolved.relations.push(relation);
                }
            }
            resolved.includes_identity |= includes_identity;
            resolved.inclusions_resolved = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::binder::RESOURCE_DESTROYED_EVENT;
    use crate::config::CheckerConfig;
    use crate::test_utils::init_test_logging;
    use sema_types::BaseTypeRegistry;

    fn check(program: &Program) -> Result<crate::Elaboration, Vec<CheckError>> {
        init_test_logging();
        let registry = BaseTypeRegistry::new();
        Checker::new(&registry, CheckerConfig::default()).check_program(program)
    }

    #[test]
    fn test_missing_member() {
        let program = program(vec![
            interface(CompositeKind::Structure, "I")
                .member(function("f"))
                .member(field(VariableKind::Constant, "x", annotation(named("Int"))))
                .into(),
            composite(CompositeKind::Structure, "S")
                .conforms_to("I")
                .member(function("f").with_implementation())
                .into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            CheckError::Conformance {
                missing_members,
                mismatched_members,
                initializer_mismatch,
                ..
            } => {
                assert_eq!(missing_members, &vec!["x".to_string()]);
                assert!(mismatched_members.is_empty());
                assert!(!initializer_mismatch);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_function_satisfies_requirement() {
        let program = program(vec![
            interface(CompositeKind::Resource, "I")
                .member(function("f").with_implementation())
                .into(),
            composite(CompositeKind::Resource, "R").conforms_to("I").into(),
        ]);
        check(&program).unwrap();
    }

    #[test]
    fn test_less_accessible_member_is_mismatched() {
        let program = program(vec![
            interface(CompositeKind::Structure, "I").member(function("f")).into(),
            composite(CompositeKind::Structure, "S")
                .conforms_to("I")
                .member(function("f").with_access(AccessModifier::Private).with_implementation())
                .into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(
            &errors[0],
            CheckError::Conformance { mismatched_members, .. } if mismatched_members == &vec!["f".to_string()]
        ));
    }

    #[test]
    fn test_kind_mismatch_points_at_conformance() {
        let conformance_span = Span::new(500, 501, 3, 7);
        let mut s = composite(CompositeKind::Structure, "S").conforms_to("I");
        s.conformances[0].identifier.span = conformance_span;

        let program = program(vec![interface(CompositeKind::Resource, "I").into(), s.into()]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span(), conformance_span);
        assert!(matches!(
            &errors[0],
            CheckError::CompositeKindMismatch { expected, actual, .. } if expected == "structure" && actual == "resource"
        ));
    }

    #[test]
    fn test_self_conformance_is_cyclic() {
        let program = program(vec![interface(CompositeKind::Structure, "I").conforms_to("I").into()]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CheckError::CyclicConformance { .. }));
    }

    #[test]
    fn test_empty_interface_body() {
        let program = program(vec![interface(CompositeKind::Structure, "I")
            .member(function("f").with_empty_body())
            .into()]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(&errors[0], CheckError::InvalidImplementation { name, .. } if name == "f"));
    }

    #[test]
    fn test_default_destroy_event_requires_resource() {
        let program = program(vec![interface(CompositeKind::Structure, "I")
            .member(composite(CompositeKind::Event, RESOURCE_DESTROYED_EVENT))
            .into()]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CheckError::DefaultDestroyEventInNonResource { .. }));
    }

    #[test]
    fn test_resource_field_in_struct() {
        let program = program(vec![
            composite(CompositeKind::Resource, "R").into(),
            composite(CompositeKind::Structure, "S")
                .member(field(VariableKind::Constant, "r", resource(named("R"))))
                .into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], CheckError::InvalidResourceField { name, .. } if name == "r"));
    }

    #[test]
    fn test_initializer_requirement() {
        let program = program(vec![
            interface(CompositeKind::Structure, "I")
                .member(as_initializer(initializer().parameter(None, "x", annotation(named("Int")))))
                .into(),
            composite(CompositeKind::Structure, "S")
                .conforms_to("I")
                .member(as_initializer(
                    initializer()
                        .parameter(None, "x", annotation(named("String")))
                        .with_implementation(),
                ))
                .into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(
            &errors[0],
            CheckError::Conformance { initializer_mismatch: true, .. }
        ));
    }

    #[test]
    fn test_mapping_inclusions_are_flattened() {
        let program = program(vec![
            entitlement("A").into(),
            entitlement("B").into(),
            entitlement("C").into(),
            entitlement_mapping("M").include("N").relation("A", "B").into(),
            entitlement_mapping("N").include("Identity").relation("B", "C").into(),
        ]);
        let elaboration = check(&program).unwrap();
        let ctx = elaboration.context();
        let m = ctx.as_entitlement_map(elaboration.global_type("M").unwrap()).unwrap();
        assert_eq!(m.relations.len(), 2);
        assert!(m.includes_identity);
        assert!(m.inclusions_resolved);
    }

    #[test]
    fn test_mapping_inclusion_errors() {
        let program = program(vec![
            entitlement("E").into(),
            entitlement_mapping("M").include("N").include("N").include("E").into(),
            entitlement_mapping("N").include("M").into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(&errors[0], CheckError::CyclicEntitlementMappingInclusion { map, .. } if map == "M"));
        assert!(matches!(errors[1], CheckError::DuplicateEntitlementMappingInclusion { .. }));
        assert!(matches!(errors[2], CheckError::InvalidEntitlementMappingInclusion { .. }));
    }
}
