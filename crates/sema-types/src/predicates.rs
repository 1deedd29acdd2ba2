//! Type equality and classification predicates

use crate::context::TypeContext;
use crate::kind::{CompositeKind, DeclarationKind};
use crate::member::Member;
use crate::ty::{
    FunctionType, SimpleType, Type, TypeAnnotation, TypeAnnotationState, TypeId, TypeParameter,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Memo of member checks, keyed by declaring type and member name.
///
/// A member is entered as `true` while it is being checked so that
/// recursive composites terminate.
pub type MemberResults = FxHashMap<(TypeId, String), bool>;

#[derive(Debug, Clone, Copy)]
enum Capability {
    Storable,
    Exportable,
    Importable,
}

impl TypeContext {
    /// Structural equality
    ///
    /// Interned types are equal when their handles are. Beyond that, entitlement
    /// sets and restriction sets compare as sets, and nominal types compare by
    /// kind and type key.
    pub fn equal(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        let (Some(ta), Some(tb)) = (self.get(a), self.get(b)) else {
            return false;
        };

        match (ta, tb) {
            (Type::Optional(x), Type::Optional(y))
            | (Type::VariableSized(x), Type::VariableSized(y)) => self.equal(*x, *y),
            (
                Type::ConstantSized { ty: x, size: n },
                Type::ConstantSized { ty: y, size: m },
            ) => n == m && self.equal(*x, *y),
            (
                Type::Dictionary { key: k1, value: v1 },
                Type::Dictionary { key: k2, value: v2 },
            ) => self.equal(*k1, *k2) && self.equal(*v1, *v2),
            (Type::Function(f), Type::Function(g)) => self.functions_equal(f, g),
            (Type::Composite(_), Type::Composite(_)) => {
                let kinds = self.as_composite(a).map(|c| c.kind) == self.as_composite(b).map(|c| c.kind);
                kinds && self.type_key(a) == self.type_key(b)
            }
            (Type::Interface(_), Type::Interface(_)) => {
                let kinds = self.as_interface(a).map(|i| i.kind) == self.as_interface(b).map(|i| i.kind);
                kinds && self.type_key(a) == self.type_key(b)
            }
            (Type::Entitlement(_), Type::Entitlement(_))
            | (Type::EntitlementMap(_), Type::EntitlementMap(_)) => {
                self.type_key(a) == self.type_key(b)
            }
            (
                Type::Reference {
                    ty: x,
                    authorization: auth_x,
                },
                Type::Reference {
                    ty: y,
                    authorization: auth_y,
                },
            ) => auth_x.equal(auth_y) && self.equal(*x, *y),
            (
                Type::Restricted {
                    ty: x,
                    restrictions: rx,
                },
                Type::Restricted {
                    ty: y,
                    restrictions: ry,
                },
            ) => {
                let underlying = match (x, y) {
                    (Some(x), Some(y)) => self.equal(*x, *y),
                    (None, None) => true,
                    _ => false,
                };
                underlying && self.same_set(rx, ry)
            }
            (Type::Capability(x), Type::Capability(y)) => match (x, y) {
                (Some(x), Some(y)) => self.equal(*x, *y),
                (None, None) => true,
                _ => false,
            },
            (Type::Generic(p), Type::Generic(q)) => self.type_parameters_equal(p, q),
            _ => false,
        }
    }

    fn same_set(&self, a: &[TypeId], b: &[TypeId]) -> bool {
        a.len() == b.len()
            && a.iter().all(|x| b.iter().any(|y| self.equal(*x, *y)))
            && b.iter().all(|y| a.iter().any(|x| self.equal(*x, *y)))
    }

    /// Equality of type parameters: name, bound and optionality
    pub fn type_parameters_equal(&self, a: &TypeParameter, b: &TypeParameter) -> bool {
        let bounds = match (a.type_bound, b.type_bound) {
            (Some(x), Some(y)) => self.equal(x, y),
            (None, None) => true,
            _ => false,
        };
        a.name == b.name && a.optional == b.optional && bounds
    }

    fn annotations_equal(&self, a: &TypeAnnotation, b: &TypeAnnotation) -> bool {
        a.is_resource == b.is_resource && self.equal(a.ty, b.ty)
    }

    fn functions_equal(&self, f: &FunctionType, g: &FunctionType) -> bool {
        f.purity == g.purity
            && f.is_constructor == g.is_constructor
            && f.type_parameters.len() == g.type_parameters.len()
            && f
                .type_parameters
                .iter()
                .zip(&g.type_parameters)
                .all(|(p, q)| self.type_parameters_equal(p, q))
            && f.parameters.len() == g.parameters.len()
            && f
                .parameters
                .iter()
                .zip(&g.parameters)
                .all(|(p, q)| self.annotations_equal(&p.type_annotation, &q.type_annotation))
            && self.annotations_equal(&f.return_type, &g.return_type)
    }

    /// Whether values of the type are resources
    pub fn is_resource_type(&self, id: TypeId) -> bool {
        self.is_resource_type_guarded(id, &mut FxHashSet::default())
    }

    fn is_resource_type_guarded(&self, id: TypeId, visiting: &mut FxHashSet<TypeId>) -> bool {
        let Some(ty) = self.get(id) else {
            return false;
        };
        match ty {
            Type::Simple(simple) => simple.is_resource(),
            Type::Optional(inner)
            | Type::VariableSized(inner)
            | Type::ConstantSized { ty: inner, .. } => self.is_resource_type_guarded(*inner, visiting),
            Type::Dictionary { key, value } => {
                self.is_resource_type_guarded(*key, visiting)
                    || self.is_resource_type_guarded(*value, visiting)
            }
            Type::Composite(_) => {
                let Some(composite) = self.as_composite(id) else {
                    return false;
                };
                match composite.kind {
                    CompositeKind::Resource => true,
                    CompositeKind::Attachment => match composite.base_type {
                        // An attachment cannot be its own base
                        Some(base) if base != id && visiting.insert(id) => {
                            self.is_resource_type_guarded(base, visiting)
                        }
                        _ => false,
                    },
                    _ => false,
                }
            }
            Type::Interface(_) => self
                .as_interface(id)
                .is_some_and(|interface| interface.kind == CompositeKind::Resource),
            Type::Restricted { ty, .. } => {
                ty.is_some_and(|underlying| self.is_resource_type_guarded(underlying, visiting))
            }
            Type::Numeric(_)
            | Type::Function(_)
            | Type::Reference { .. }
            | Type::Capability(_)
            | Type::Generic(_)
            | Type::Entitlement(_)
            | Type::EntitlementMap(_) => false,
        }
    }

    /// Whether the type is, or contains, the invalid type
    pub fn is_invalid_type(&self, id: TypeId) -> bool {
        let Some(ty) = self.get(id) else {
            return true;
        };
        match ty {
            Type::Simple(simple) => *simple == SimpleType::Invalid,
            Type::Optional(inner)
            | Type::VariableSized(inner)
            | Type::ConstantSized { ty: inner, .. }
            | Type::Reference { ty: inner, .. } => self.is_invalid_type(*inner),
            Type::Dictionary { key, value } => {
                self.is_invalid_type(*key) || self.is_invalid_type(*value)
            }
            Type::Function(function) => {
                function
                    .type_parameters
                    .iter()
                    .filter_map(|p| p.type_bound)
                    .any(|bound| self.is_invalid_type(bound))
                    || function
                        .parameters
                        .iter()
                        .any(|p| self.is_invalid_type(p.type_annotation.ty))
                    || self.is_invalid_type(function.return_type.ty)
            }
            Type::Restricted { ty, restrictions } => {
                ty.is_some_and(|t| self.is_invalid_type(t))
                    || restrictions.iter().any(|r| self.is_invalid_type(*r))
            }
            Type::Capability(borrow) => borrow.is_some_and(|b| self.is_invalid_type(b)),
            Type::Generic(parameter) => parameter
                .type_bound
                .is_some_and(|bound| self.is_invalid_type(bound)),
            Type::Numeric(_)
            | Type::Composite(_)
            | Type::Interface(_)
            | Type::Entitlement(_)
            | Type::EntitlementMap(_) => false,
        }
    }

    /// Whether values of the type can be stored
    pub fn is_storable(&self, id: TypeId) -> bool {
        self.is_storable_with(id, &mut MemberResults::default())
    }

    /// Whether values of the type can be stored, sharing a memo across calls
    pub fn is_storable_with(&self, id: TypeId, results: &mut MemberResults) -> bool {
        self.has_capability(id, Capability::Storable, results)
    }

    /// Whether values of the type can be returned from a program
    pub fn is_exportable(&self, id: TypeId) -> bool {
        self.has_capability(id, Capability::Exportable, &mut MemberResults::default())
    }

    /// Whether values of the type can be passed into a program
    pub fn is_importable(&self, id: TypeId) -> bool {
        self.has_capability(id, Capability::Importable, &mut MemberResults::default())
    }

    fn has_capability(&self, id: TypeId, capability: Capability, results: &mut MemberResults) -> bool {
        let Some(ty) = self.get(id) else {
            return false;
        };
        match ty {
            Type::Simple(simple) => match capability {
                Capability::Storable => simple.is_storable(),
                Capability::Exportable => simple.is_exportable(),
                Capability::Importable => simple.is_importable(),
            },
            Type::Numeric(_) => true,
            Type::Optional(inner)
            | Type::VariableSized(inner)
            | Type::ConstantSized { ty: inner, .. } => self.has_capability(*inner, capability, results),
            Type::Dictionary { key, value } => {
                self.has_capability(*key, capability, results)
                    && self.has_capability(*value, capability, results)
            }
            Type::Function(_) | Type::Reference { .. } => {
                matches!(capability, Capability::Exportable)
            }
            Type::Capability(_) => true,
            Type::Generic(_) | Type::Entitlement(_) | Type::EntitlementMap(_) => false,
            Type::Restricted { ty, restrictions } => {
                ty.map_or(true, |t| self.has_capability(t, capability, results))
                    && restrictions
                        .iter()
                        .all(|r| self.has_capability(*r, capability, results))
            }
            Type::Composite(_) => {
                let Some(composite) = self.as_composite(id) else {
                    return false;
                };
                let storable_kind = matches!(
                    composite.kind,
                    CompositeKind::Structure
                        | CompositeKind::Resource
                        | CompositeKind::Enum
                        | CompositeKind::Attachment
                );
                match capability {
                    Capability::Storable => {
                        !composite.has_computed_members
                            && storable_kind
                            && composite.location.is_some()
                            && self.members_have(id, &composite.members, capability, results)
                    }
                    Capability::Exportable => {
                        storable_kind
                            && self.members_have(id, &composite.members, capability, results)
                    }
                    Capability::Importable => {
                        if composite.location.is_none() {
                            return composite.importable;
                        }
                        match composite.kind {
                            CompositeKind::Structure | CompositeKind::Enum => {
                                self.members_have(id, &composite.members, capability, results)
                            }
                            CompositeKind::Attachment => composite
                                .base_type
                                .filter(|base| *base != id)
                                .is_some_and(|base| self.has_capability(base, capability, results)),
                            _ => false,
                        }
                    }
                }
            }
            Type::Interface(_) => {
                let Some(interface) = self.as_interface(id) else {
                    return false;
                };
                let kind_allows = match capability {
                    Capability::Storable => true,
                    _ => interface.kind == CompositeKind::Structure,
                };
                kind_allows && self.members_have(id, &interface.members, capability, results)
            }
        }
    }

    fn members_have<'m>(
        &self,
        container: TypeId,
        members: impl IntoIterator<Item = (&'m String, &'m Member)>,
        capability: Capability,
        results: &mut MemberResults,
    ) -> bool {
        members
            .into_iter()
            .all(|(name, member)| self.member_has(container, name, member, capability, results))
    }

    fn member_has(
        &self,
        container: TypeId,
        name: &str,
        member: &Member,
        capability: Capability,
        results: &mut MemberResults,
    ) -> bool {
        let key = (container, name.to_string());
        if let Some(result) = results.get(&key) {
            return *result;
        }
        results.insert(key.clone(), true);

        let result = if member.predeclared || member.declaration_kind != DeclarationKind::Field {
            true
        } else if self.is_invalid_type(member.ty()) {
            true
        } else {
            self.has_capability(member.ty(), capability, results)
        };

        results.insert(key, result);
        result
    }

    /// Whether the type supports `==`
    pub fn is_equatable(&self, id: TypeId) -> bool {
        let Some(ty) = self.get(id) else {
            return false;
        };
        match ty {
            Type::Simple(simple) => simple.is_equatable(),
            Type::Numeric(_) | Type::Reference { .. } => true,
            Type::Optional(inner)
            | Type::VariableSized(inner)
            | Type::ConstantSized { ty: inner, .. } => self.is_equatable(*inner),
            Type::Dictionary { key, value } => self.is_equatable(*key) && self.is_equatable(*value),
            Type::Composite(_) => self
                .as_composite(id)
                .is_some_and(|c| c.kind == CompositeKind::Enum),
            Type::Function(_)
            | Type::Interface(_)
            | Type::Restricted { .. }
            | Type::Capability(_)
            | Type::Generic(_)
            | Type::Entitlement(_)
            | Type::EntitlementMap(_) => false,
        }
    }

    /// Whether the type supports ordering comparisons
    pub fn is_comparable(&self, id: TypeId) -> bool {
        match self.get(id) {
            Some(Type::Simple(simple)) => simple.is_comparable(),
            Some(Type::Numeric(numeric)) => !numeric.is_abstract(),
            _ => false,
        }
    }

    /// Whether an annotation agrees with its type
    pub fn type_annotation_state(&self, annotation: &TypeAnnotation) -> TypeAnnotationState {
        if self.is_invalid_type(annotation.ty) {
            return TypeAnnotationState::Valid;
        }

        let inner = self.annotation_state(annotation.ty);
        if inner != TypeAnnotationState::Valid {
            return inner;
        }

        match (self.is_resource_type(annotation.ty), annotation.is_resource) {
            (true, false) => TypeAnnotationState::MissingResourceAnnotation,
            (false, true) => TypeAnnotationState::InvalidResourceAnnotation,
            _ => TypeAnnotationState::Valid,
        }
    }

    /// Whether the type may appear in an annotation, ignoring the resource flag
    pub fn annotation_state(&self, id: TypeId) -> TypeAnnotationState {
        let Some(ty) = self.get(id) else {
            return TypeAnnotationState::Valid;
        };
        match ty {
            Type::Simple(_)
            | Type::Numeric(_)
            | Type::Interface(_)
            | Type::Restricted { .. }
            | Type::Generic(_) => TypeAnnotationState::Valid,
            Type::Optional(inner)
            | Type::VariableSized(inner)
            | Type::ConstantSized { ty: inner, .. } => self.annotation_state(*inner),
            Type::Dictionary { key, value } => first_invalid([
                self.annotation_state(*key),
                self.annotation_state(*value),
            ]),
            Type::Function(function) => {
                let bounds = function
                    .type_parameters
                    .iter()
                    .filter_map(|p| p.type_bound)
                    .map(|bound| self.annotation_state(bound));
                let parameters = function
                    .parameters
                    .iter()
                    .map(|p| self.type_annotation_state(&p.type_annotation));
                let return_type =
                    std::iter::once(self.type_annotation_state(&function.return_type));
                first_invalid(bounds.chain(parameters).chain(return_type))
            }
            Type::Composite(_) => match self.as_composite(id) {
                Some(c) if c.kind == CompositeKind::Attachment => {
                    TypeAnnotationState::DirectAttachmentTypeAnnotation
                }
                _ => TypeAnnotationState::Valid,
            },
            Type::Reference { ty, .. } => match self.annotation_state(*ty) {
                TypeAnnotationState::DirectEntitlementTypeAnnotation => {
                    TypeAnnotationState::DirectEntitlementTypeAnnotation
                }
                _ => TypeAnnotationState::Valid,
            },
            Type::Capability(borrow) => borrow
                .map(|b| self.annotation_state(b))
                .unwrap_or(TypeAnnotationState::Valid),
            Type::Entitlement(_) | Type::EntitlementMap(_) => {
                TypeAnnotationState::DirectEntitlementTypeAnnotation
            }
        }
    }

    /// Remove all optional layers
    pub fn unwrap_optional_type(&self, mut id: TypeId) -> TypeId {
        while let Some(Type::Optional(inner)) = self.get(id) {
            id = *inner;
        }
        id
    }

    /// Whether the type is `Never?`, the type of `nil`
    pub fn is_nil_type(&self, id: TypeId) -> bool {
        matches!(self.get(id), Some(Type::Optional(inner)) if *inner == self.never_type())
    }

    /// Whether `==` may compare values of the two types
    pub fn are_compatible_equatable_types(&self, left: TypeId, right: TypeId) -> bool {
        let left_inner = self.unwrap_optional_type(left);
        let right_inner = self.unwrap_optional_type(right);

        if self.equal(left_inner, right_inner)
            && self.is_equatable(left_inner)
            && self.is_equatable(right_inner)
        {
            return true;
        }

        self.is_nil_type(left) || self.is_nil_type(right)
    }

    /// Whether the type is an attachment or one of the attachment top types
    pub fn is_attachment_type(&self, id: TypeId) -> bool {
        match self.get(id) {
            Some(Type::Simple(simple)) => simple.is_attachment(),
            Some(Type::Composite(_)) => self
                .as_composite(id)
                .is_some_and(|c| c.kind == CompositeKind::Attachment),
            _ => false,
        }
    }

    /// Explicit conformances of a composite or interface, followed depth-first
    /// by the interfaces those inherit from, without duplicates
    pub fn effective_conformances(&self, id: TypeId) -> Vec<TypeId> {
        let explicit = if let Some(composite) = self.as_composite(id) {
            &composite.explicit_conformances
        } else if let Some(interface) = self.as_interface(id) {
            &interface.explicit_conformances
        } else {
            return Vec::new();
        };

        let mut seen = FxHashSet::default();
        let mut result = Vec::new();
        self.collect_conformances(explicit, &mut seen, &mut result);
        result
    }

    fn collect_conformances(
        &self,
        conformances: &[TypeId],
        seen: &mut FxHashSet<TypeId>,
        result: &mut Vec<TypeId>,
    ) {
        for conformance in conformances {
            if !seen.insert(*conformance) {
                continue;
            }
            result.push(*conformance);
            if let Some(interface) = self.as_interface(*conformance) {
                self.collect_conformances(&interface.explicit_conformances, seen, result);
            }
        }
    }

    /// Entitlements mentioned by the type's members and conformances
    pub fn supported_entitlements(&self, id: TypeId) -> Arc<Vec<TypeId>> {
        match self.cache(id) {
            Some(cache) => cache
                .supported_entitlements
                .get_or_init(|| Arc::new(self.compute_supported_entitlements(id)))
                .clone(),
            None => Arc::default(),
        }
    }

    /// Computed without touching other types' caches, so conformance
    /// cycles terminate
    fn compute_supported_entitlements(&self, id: TypeId) -> Vec<TypeId> {
        let roots: Vec<TypeId> = match self.get(id) {
            Some(Type::Restricted { ty, restrictions }) => {
                restrictions.iter().copied().chain(*ty).collect()
            }
            _ => vec![id],
        };

        let mut set: indexmap::IndexSet<TypeId> = indexmap::IndexSet::new();
        let mut visited = FxHashSet::default();
        for root in roots {
            if !visited.insert(root) {
                continue;
            }
            self.extend_member_entitlements(root, &mut set);
            for conformance in self.effective_conformances(root) {
                if visited.insert(conformance) {
                    self.extend_member_entitlements(conformance, &mut set);
                }
            }
        }

        set.into_iter().collect()
    }

    fn extend_member_entitlements(&self, id: TypeId, set: &mut indexmap::IndexSet<TypeId>) {
        let members = if let Some(composite) = self.as_composite(id) {
            &composite.members
        } else if let Some(interface) = self.as_interface(id) {
            &interface.members
        } else {
            return;
        };

        for member in members.values() {
            match &member.access {
                crate::access::Access::EntitlementMap(map) => {
                    if let Some(map) = self.as_entitlement_map(*map) {
                        set.extend(map.domain().entitlements().iter().copied());
                    }
                }
                access => set.extend(access.entitlements().iter().copied()),
            }
        }
    }
}

fn first_invalid(states: impl IntoIterator<Item = TypeAnnotationState>) -> TypeAnnotationState {
    states
        .into_iter()
        .find(|state| *state != TypeAnnotationState::Valid)
        .unwrap_or(TypeAnnotationState::Valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Access;
    use crate::kind::VariableKind;
    use crate::location::Location;
    use crate::nominal::{CompositeType, EntitlementType, InterfaceType};

    fn location() -> Option<Location> {
        Some(Location::StringLocation("test".to_string()))
    }

    #[test]
    fn test_resource_propagates_through_containers() {
        let mut ctx = TypeContext::new();
        let resource = ctx.declare_composite(CompositeType::new(location(), CompositeKind::Resource, "R"));
        let string = ctx.string_type();
        let array = ctx.variable_sized_type(resource);
        let dictionary = ctx.dictionary_type(string, array);
        let optional = ctx.optional_type(dictionary);
        let reference = ctx.reference_type(resource, Access::UNAUTHORIZED);

        assert!(ctx.is_resource_type(optional));
        assert!(!ctx.is_resource_type(reference));
    }

    #[test]
    fn test_attachment_resource_follows_base() {
        let mut ctx = TypeContext::new();
        let resource = ctx.declare_composite(CompositeType::new(location(), CompositeKind::Resource, "R"));
        let mut attachment = CompositeType::new(location(), CompositeKind::Attachment, "A");
        attachment.base_type = Some(resource);
        let attachment = ctx.declare_composite(attachment);
        assert!(ctx.is_resource_type(attachment));

        let own = ctx.declare_composite(CompositeType::new(location(), CompositeKind::Attachment, "B"));
        if let Some(record) = ctx.as_composite_mut(own) {
            record.base_type = Some(own);
        }
        assert!(!ctx.is_resource_type(own));
    }

    #[test]
    fn test_annotation_states() {
        let mut ctx = TypeContext::new();
        let resource = ctx.declare_composite(CompositeType::new(location(), CompositeKind::Resource, "R"));
        let entitlement = ctx.declare_entitlement(EntitlementType::new(location(), "E"));
        let attachment = ctx.declare_composite(CompositeType::new(location(), CompositeKind::Attachment, "A"));
        let int = ctx.int_type();

        assert_eq!(
            ctx.type_annotation_state(&TypeAnnotation::new(resource, false)),
            TypeAnnotationState::MissingResourceAnnotation
        );
        assert_eq!(
            ctx.type_annotation_state(&TypeAnnotation::new(int, true)),
            TypeAnnotationState::InvalidResourceAnnotation
        );
        assert_eq!(
            ctx.type_annotation_state(&TypeAnnotation::new(entitlement, false)),
            TypeAnnotationState::DirectEntitlementTypeAnnotation
        );
        let optional_attachment = ctx.optional_type(attachment);
        assert_eq!(
            ctx.type_annotation_state(&TypeAnnotation::new(optional_attachment, false)),
            TypeAnnotationState::DirectAttachmentTypeAnnotation
        );
        let attachment_reference = ctx.reference_type(attachment, Access::UNAUTHORIZED);
        assert_eq!(
            ctx.type_annotation_state(&TypeAnnotation::new(attachment_reference, false)),
            TypeAnnotationState::Valid
        );
        let invalid = ctx.invalid_type();
        assert_eq!(
            ctx.type_annotation_state(&TypeAnnotation::new(invalid, true)),
            TypeAnnotationState::Valid
        );
    }

    #[test]
    fn test_storability_of_recursive_composite() {
        let mut ctx = TypeContext::new();
        let node = ctx.declare_composite(CompositeType::new(location(), CompositeKind::Structure, "Node"));
        let optional_node = ctx.optional_type(node);
        let annotation = ctx.type_annotation(optional_node);
        if let Some(record) = ctx.as_composite_mut(node) {
            record.add_member(Member::field(
                node,
                Access::UNAUTHORIZED,
                VariableKind::Constant,
                "next",
                annotation,
            ));
        }
        assert!(ctx.is_storable(node));
        assert!(ctx.is_importable(node));

        let builtin = ctx.declare_composite(CompositeType::new(None, CompositeKind::Structure, "B"));
        assert!(!ctx.is_storable(builtin));
    }

    #[test]
    fn test_equal_ignores_set_order() {
        let mut ctx = TypeContext::new();
        let i = ctx.declare_interface(InterfaceType::new(location(), CompositeKind::Structure, "I"));
        let j = ctx.declare_interface(InterfaceType::new(location(), CompositeKind::Structure, "J"));
        let any_struct = ctx.any_struct_type();
        let ij = ctx.restricted_type(Some(any_struct), vec![i, j]);
        let ji = ctx.restricted_type(Some(any_struct), vec![j, i]);
        assert_ne!(ij, ji);
        assert!(ctx.equal(ij, ji));
    }

    #[test]
    fn test_equatable_compatibility() {
        let mut ctx = TypeContext::new();
        let int = ctx.int_type();
        let optional_int = ctx.optional_type(int);
        let string = ctx.string_type();

        assert!(ctx.are_compatible_equatable_types(int, optional_int));
        assert!(ctx.are_compatible_equatable_types(ctx.nil_type(), string));
        assert!(!ctx.are_compatible_equatable_types(int, string));
        assert!(ctx.is_comparable(int));
        assert!(!ctx.is_comparable(ctx.numeric(crate::numeric::NumericType::Integer)));
    }

    #[test]
    fn test_effective_conformances_are_transitive() {
        let mut ctx = TypeContext::new();
        let base = ctx.declare_interface(InterfaceType::new(location(), CompositeKind::Resource, "Base"));
        let mut middle = InterfaceType::new(location(), CompositeKind::Resource, "Middle");
        middle.explicit_conformances = vec![base];
        let middle = ctx.declare_interface(middle);
        let mut resource = CompositeType::new(location(), CompositeKind::Resource, "R");
        resource.explicit_conformances = vec![middle];
        let resource = ctx.declare_composite(resource);

        assert_eq!(ctx.effective_conformances(resource), vec![middle, base]);
    }

    #[test]
    fn test_supported_entitlements_include_conformances() {
        let mut ctx = TypeContext::new();
        let e = ctx.declare_entitlement(EntitlementType::new(location(), "E"));
        let f = ctx.declare_entitlement(EntitlementType::new(location(), "F"));
        let int = ctx.type_annotation(ctx.int_type());

        let interface = ctx.declare_interface(InterfaceType::new(location(), CompositeKind::Resource, "I"));
        if let Some(record) = ctx.as_interface_mut(interface) {
            record.add_member(Member::field(
                interface,
                Access::conjunction(vec![f]),
                VariableKind::Constant,
                "x",
                int,
            ));
        }

        let mut resource = CompositeType::new(location(), CompositeKind::Resource, "R");
        resource.explicit_conformances = vec![interface];
        let resource = ctx.declare_composite(resource);
        if let Some(record) = ctx.as_composite_mut(resource) {
            record.add_member(Member::field(
                resource,
                Access::conjunction(vec![e]),
                VariableKind::Constant,
                "y",
                int,
            ));
        }

        assert_eq!(*ctx.supported_entitlements(resource), vec![e, f]);
    }

    #[test]
    fn test_supported_entitlements_with_cyclic_conformances() {
        // struct interface I: J { access(E) let x: Int }
        // struct interface J: I { access(F) let y: Int }
        let mut ctx = TypeContext::new();
        let e = ctx.declare_entitlement(EntitlementType::new(location(), "E"));
        let f = ctx.declare_entitlement(EntitlementType::new(location(), "F"));
        let int = ctx.type_annotation(ctx.int_type());

        let i = ctx.declare_interface(InterfaceType::new(location(), CompositeKind::Structure, "I"));
        let mut j = InterfaceType::new(location(), CompositeKind::Structure, "J");
        j.explicit_conformances = vec![i];
        let j = ctx.declare_interface(j);
        if let Some(record) = ctx.as_interface_mut(i) {
            record.explicit_conformances = vec![j];
            record.add_member(Member::field(i, Access::conjunction(vec![e]), VariableKind::Constant, "x", int));
        }
        if let Some(record) = ctx.as_interface_mut(j) {
            record.add_member(Member::field(j, Access::conjunction(vec![f]), VariableKind::Constant, "y", int));
        }

        assert_eq!(*ctx.supported_entitlements(i), vec![e, f]);
        assert_eq!(*ctx.supported_entitlements(j), vec![f, e]);
        // Cached
        assert_eq!(*ctx.supported_entitlements(i), vec![e, f]);
    }
}
