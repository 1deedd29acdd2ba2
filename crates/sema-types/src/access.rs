//! Access control
//!
//! An [`Access`] is either a primitive access level, a set of entitlements
//! that must be held, or an entitlement map whose output depends on the
//! authorization a member is accessed through.

use crate::ty::TypeId;
use serde::{Deserialize, Serialize};

/// Primitive access levels, ordered from most to least restrictive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveAccess {
    /// No modifier written
    NotSpecified,
    /// `access(self)`
    Private,
    /// `access(contract)`
    Contract,
    /// `access(account)`
    Account,
    /// `access(all)`
    All,
}

impl PrimitiveAccess {
    /// Source keyword
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveAccess::NotSpecified => "",
            PrimitiveAccess::Private => "access(self)",
            PrimitiveAccess::Contract => "access(contract)",
            PrimitiveAccess::Account => "access(account)",
            PrimitiveAccess::All => "access(all)",
        }
    }
}

/// How the entitlements of a set are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementSetKind {
    /// All entitlements are required (`E1, E2`)
    Conjunction,
    /// Any one entitlement suffices (`E1 | E2`)
    Disjunction,
}

impl EntitlementSetKind {
    /// Separator used when printing a set of this kind
    pub fn separator(self) -> &'static str {
        match self {
            EntitlementSetKind::Conjunction => ",",
            EntitlementSetKind::Disjunction => " |",
        }
    }
}

/// Access of a member, or authorization of a reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Access {
    /// A primitive access level
    Primitive(PrimitiveAccess),
    /// A set of entitlements
    EntitlementSet {
        /// Conjunction or disjunction
        kind: EntitlementSetKind,
        /// Entitlement types, in source order, without duplicates
        entitlements: Vec<TypeId>,
    },
    /// An entitlement map
    EntitlementMap(TypeId),
}

impl Access {
    /// The authorization of a reference without entitlements
    pub const UNAUTHORIZED: Access = Access::Primitive(PrimitiveAccess::All);

    /// Create an entitlement set access, dropping duplicate entitlements
    pub fn entitlement_set(kind: EntitlementSetKind, entitlements: Vec<TypeId>) -> Self {
        let mut unique: Vec<TypeId> = Vec::with_capacity(entitlements.len());
        for entitlement in entitlements {
            if !unique.contains(&entitlement) {
                unique.push(entitlement);
            }
        }
        Access::EntitlementSet {
            kind,
            entitlements: unique,
        }
    }

    /// Conjunction of the given entitlements
    pub fn conjunction(entitlements: Vec<TypeId>) -> Self {
        Self::entitlement_set(EntitlementSetKind::Conjunction, entitlements)
    }

    /// Disjunction of the given entitlements
    pub fn disjunction(entitlements: Vec<TypeId>) -> Self {
        Self::entitlement_set(EntitlementSetKind::Disjunction, entitlements)
    }

    /// Whether this is the unauthorized access
    pub fn is_unauthorized(&self) -> bool {
        *self == Self::UNAUTHORIZED
    }

    /// Whether this is a primitive access level
    pub fn is_primitive(&self) -> bool {
        matches!(self, Access::Primitive(_))
    }

    /// Entitlements mentioned by this access
    pub fn entitlements(&self) -> &[TypeId] {
        match self {
            Access::EntitlementSet { entitlements, .. } => entitlements,
            _ => &[],
        }
    }

    /// Set equality: two entitlement sets are equal regardless of order
    pub fn equal(&self, other: &Access) -> bool {
        match (self, other) {
            (
                Access::EntitlementSet {
                    kind: kind_a,
                    entitlements: a,
                },
                Access::EntitlementSet {
                    kind: kind_b,
                    entitlements: b,
                },
            ) => {
                // Singleton sets are the same whichever way they combine
                let kinds_match = kind_a == kind_b || a.len() == 1;
                kinds_match && a.len() == b.len() && a.iter().all(|e| b.contains(e))
            }
            _ => self == other,
        }
    }

    /// Whether a holder of `other` may access something requiring `self`.
    ///
    /// Used both for member access, where `self` is the member's access and
    /// `other` the authorization of the reference, and for reference
    /// subtyping, where `self` is the supertype's authorization.
    pub fn permits_access(&self, other: &Access) -> bool {
        match self {
            Access::Primitive(required) => match other {
                Access::Primitive(held) => required >= held,
                _ => *required == PrimitiveAccess::All,
            },

            Access::EntitlementSet {
                kind: required_kind,
                entitlements: required,
            } => match other {
                Access::Primitive(held) => *held == PrimitiveAccess::Private,
                Access::EntitlementSet {
                    kind: held_kind,
                    entitlements: held,
                } => match (held_kind, required_kind) {
                    (EntitlementSetKind::Disjunction, EntitlementSetKind::Disjunction) => {
                        held.iter().all(|e| required.contains(e))
                    }
                    (EntitlementSetKind::Disjunction, EntitlementSetKind::Conjunction) => held
                        .iter()
                        .all(|h| required.iter().all(|r| r == h)),
                    (EntitlementSetKind::Conjunction, EntitlementSetKind::Conjunction) => {
                        required.iter().all(|e| held.contains(e))
                    }
                    (EntitlementSetKind::Conjunction, EntitlementSetKind::Disjunction) => {
                        required.iter().any(|e| held.contains(e))
                    }
                },
                Access::EntitlementMap(_) => false,
            },

            Access::EntitlementMap(map) => match other {
                Access::Primitive(held) => *held == PrimitiveAccess::Private,
                Access::EntitlementMap(held) => held == map,
                Access::EntitlementSet { .. } => false,
            },
        }
    }

    /// Whether `self` grants access to fewer holders than `other`
    pub fn is_less_permissive_than(&self, other: &Access) -> bool {
        match (self, other) {
            (Access::Primitive(a), Access::Primitive(b)) => a < b,
            // Only access(self) is certainly more restrictive than an entitlement
            (Access::Primitive(a), _) => *a == PrimitiveAccess::Private,
            (_, Access::Primitive(b)) => *b == PrimitiveAccess::All,
            (Access::EntitlementSet { .. }, Access::EntitlementSet { .. }) => {
                !self.permits_access(other)
            }
            (Access::EntitlementMap(a), Access::EntitlementMap(b)) => a != b,
            _ => true,
        }
    }
}

impl Default for Access {
    fn default() -> Self {
        Access::Primitive(PrimitiveAccess::NotSpecified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: TypeId = TypeId(100);
    const B: TypeId = TypeId(101);
    const C: TypeId = TypeId(102);

    #[test]
    fn test_primitive_ordering() {
        let all = Access::UNAUTHORIZED;
        let private = Access::Primitive(PrimitiveAccess::Private);
        let account = Access::Primitive(PrimitiveAccess::Account);

        assert!(all.permits_access(&private));
        assert!(all.permits_access(&account));
        assert!(!private.permits_access(&account));
        assert!(private.is_less_permissive_than(&account));
        assert!(!all.is_less_permissive_than(&account));
    }

    #[test]
    fn test_conjunction_requires_superset() {
        let required = Access::conjunction(vec![A]);
        let held = Access::conjunction(vec![A, B]);

        assert!(required.permits_access(&held));
        assert!(!held.permits_access(&required));
    }

    #[test]
    fn test_disjunction_requirements() {
        let either = Access::disjunction(vec![A, B]);

        assert!(either.permits_access(&Access::conjunction(vec![B, C])));
        assert!(!either.permits_access(&Access::conjunction(vec![C])));
        assert!(either.permits_access(&Access::disjunction(vec![A])));
        assert!(!either.permits_access(&Access::disjunction(vec![A, C])));
    }

    #[test]
    fn test_conjunction_against_disjunction_holder() {
        let both = Access::conjunction(vec![A, B]);
        assert!(!both.permits_access(&Access::disjunction(vec![A, B])));
        let single = Access::conjunction(vec![A]);
        assert!(single.permits_access(&Access::disjunction(vec![A])));
    }

    #[test]
    fn test_entitlements_permit_owned_access() {
        let private = Access::Primitive(PrimitiveAccess::Private);
        assert!(Access::conjunction(vec![A]).permits_access(&private));
        assert!(Access::EntitlementMap(C).permits_access(&private));
        assert!(!Access::conjunction(vec![A]).permits_access(&Access::UNAUTHORIZED));
        assert!(Access::UNAUTHORIZED.permits_access(&Access::conjunction(vec![A])));
    }

    #[test]
    fn test_maps_permit_only_themselves() {
        let map = Access::EntitlementMap(A);
        assert!(map.permits_access(&Access::EntitlementMap(A)));
        assert!(!map.permits_access(&Access::EntitlementMap(B)));
        assert!(!map.permits_access(&Access::conjunction(vec![A])));
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let ab = Access::conjunction(vec![A, B]);
        let ba = Access::conjunction(vec![B, A, B]);
        assert!(ab.equal(&ba));
        assert!(!ab.equal(&Access::disjunction(vec![A, B])));
        assert!(Access::conjunction(vec![A]).equal(&Access::disjunction(vec![A])));
    }
}
