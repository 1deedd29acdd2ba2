//! Nominal type records
//!
//! Composites, interfaces, entitlements and entitlement maps are declared in
//! two steps: an empty shell is allocated in the [`crate::TypeContext`] arena,
//! then members, nested types and conformances are filled in. Containers and
//! nested types refer to each other by [`TypeId`].

use crate::access::Access;
use crate::kind::CompositeKind;
use crate::location::Location;
use crate::member::Member;
use crate::ty::{FunctionPurity, Parameter, TypeId};
use indexmap::IndexMap;

/// Placeholder until the context assigns the record's handle
const UNASSIGNED: TypeId = TypeId(u32::MAX);

/// A struct, resource, contract, enum, event or attachment
#[derive(Debug, Clone)]
pub struct CompositeType {
    /// Program that declares the type, `None` for built-ins
    pub location: Option<Location>,
    /// Composite kind
    pub kind: CompositeKind,
    /// Unqualified name
    pub identifier: String,
    /// Enclosing composite or interface
    pub container: Option<TypeId>,
    /// Declared members, in declaration order
    pub members: IndexMap<String, Member>,
    /// Names of the field members, in declaration order
    pub fields: Vec<String>,
    /// Nested type declarations
    pub nested_types: IndexMap<String, TypeId>,
    /// Interfaces listed after the colon
    pub explicit_conformances: Vec<TypeId>,
    /// Type requirements this composite fulfils by name
    pub implicit_type_requirement_conformances: Vec<TypeId>,
    /// Parameters of the initializer
    pub constructor_parameters: Vec<Parameter>,
    /// Purity of the initializer
    pub constructor_purity: FunctionPurity,
    /// Base type of an attachment
    pub base_type: Option<TypeId>,
    /// Entitlements an attachment requires of its base
    pub required_entitlements: Vec<TypeId>,
    /// Whether any member is computed rather than stored
    pub has_computed_members: bool,
    /// Importability of built-in composites without a location
    pub importable: bool,
    /// Raw type of an enum
    pub enum_raw_type: Option<TypeId>,
    pub(crate) type_id: TypeId,
}

impl CompositeType {
    /// Create an empty composite shell
    pub fn new(location: Option<Location>, kind: CompositeKind, identifier: &str) -> Self {
        Self {
            location,
            kind,
            identifier: identifier.to_string(),
            container: None,
            members: IndexMap::new(),
            fields: Vec::new(),
            nested_types: IndexMap::new(),
            explicit_conformances: Vec::new(),
            implicit_type_requirement_conformances: Vec::new(),
            constructor_parameters: Vec::new(),
            constructor_purity: FunctionPurity::Impure,
            base_type: None,
            required_entitlements: Vec::new(),
            has_computed_members: false,
            importable: false,
            enum_raw_type: None,
            type_id: UNASSIGNED,
        }
    }

    /// Handle of this composite in its context
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Add a member, recording it as a field when it is one
    pub fn add_member(&mut self, member: Member) {
        if member.declaration_kind == crate::kind::DeclarationKind::Field {
            self.fields.push(member.identifier.clone());
        }
        self.members.insert(member.identifier.clone(), member);
    }
}

/// A struct, resource or contract interface
#[derive(Debug, Clone)]
pub struct InterfaceType {
    /// Program that declares the type, `None` for built-ins
    pub location: Option<Location>,
    /// Composite kind of conforming types
    pub kind: CompositeKind,
    /// Unqualified name
    pub identifier: String,
    /// Enclosing composite or interface
    pub container: Option<TypeId>,
    /// Declared members, in declaration order
    pub members: IndexMap<String, Member>,
    /// Names of the field members, in declaration order
    pub fields: Vec<String>,
    /// Nested type declarations
    pub nested_types: IndexMap<String, TypeId>,
    /// Parameters of the required initializer
    pub initializer_parameters: Vec<Parameter>,
    /// Purity of the required initializer
    pub initializer_purity: FunctionPurity,
    /// Event emitted when a conforming resource is destroyed
    pub default_destroy_event: Option<TypeId>,
    /// Interfaces this interface inherits from
    pub explicit_conformances: Vec<TypeId>,
    pub(crate) type_id: TypeId,
}

impl InterfaceType {
    /// Create an empty interface shell
    pub fn new(location: Option<Location>, kind: CompositeKind, identifier: &str) -> Self {
        Self {
            location,
            kind,
            identifier: identifier.to_string(),
            container: None,
            members: IndexMap::new(),
            fields: Vec::new(),
            nested_types: IndexMap::new(),
            initializer_parameters: Vec::new(),
            initializer_purity: FunctionPurity::Impure,
            default_destroy_event: None,
            explicit_conformances: Vec::new(),
            type_id: UNASSIGNED,
        }
    }

    /// Handle of this interface in its context
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Add a member, recording it as a field when it is one
    pub fn add_member(&mut self, member: Member) {
        if member.declaration_kind == crate::kind::DeclarationKind::Field {
            self.fields.push(member.identifier.clone());
        }
        self.members.insert(member.identifier.clone(), member);
    }
}

/// An entitlement
#[derive(Debug, Clone)]
pub struct EntitlementType {
    /// Program that declares the entitlement
    pub location: Option<Location>,
    /// Unqualified name
    pub identifier: String,
    /// Enclosing composite or interface
    pub container: Option<TypeId>,
    pub(crate) type_id: TypeId,
}

impl EntitlementType {
    /// Create an entitlement
    pub fn new(location: Option<Location>, identifier: &str) -> Self {
        Self {
            location,
            identifier: identifier.to_string(),
            container: None,
            type_id: UNASSIGNED,
        }
    }

    /// Handle of this entitlement in its context
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// One `input -> output` line of an entitlement map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntitlementRelation {
    /// Entitlement held through the reference
    pub input: TypeId,
    /// Entitlement granted on the member
    pub output: TypeId,
}

/// An entitlement mapping
#[derive(Debug, Clone)]
pub struct EntitlementMapType {
    /// Program that declares the mapping
    pub location: Option<Location>,
    /// Unqualified name
    pub identifier: String,
    /// Enclosing composite or interface
    pub container: Option<TypeId>,
    /// Relations, declared ones first, then those of included maps
    pub relations: Vec<EntitlementRelation>,
    /// Whether the image also contains the input authorization
    pub includes_identity: bool,
    /// Whether `include` declarations have been folded into `relations`
    pub inclusions_resolved: bool,
    pub(crate) type_id: TypeId,
}

impl EntitlementMapType {
    /// Create an empty mapping
    pub fn new(location: Option<Location>, identifier: &str) -> Self {
        Self {
            location,
            identifier: identifier.to_string(),
            container: None,
            relations: Vec::new(),
            includes_identity: false,
            inclusions_resolved: false,
            type_id: UNASSIGNED,
        }
    }

    /// Handle of this mapping in its context
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Outputs of the relations whose input is `entitlement`
    pub fn outputs_of(&self, entitlement: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.relations
            .iter()
            .filter(move |relation| relation.input == entitlement)
            .map(|relation| relation.output)
    }

    /// Disjunction of all inputs
    pub fn domain(&self) -> Access {
        Access::disjunction(self.relations.iter().map(|r| r.input).collect())
    }

    /// Conjunction of all outputs
    pub fn codomain(&self) -> Access {
        Access::conjunction(self.relations.iter().map(|r| r.output).collect())
    }
}

/// Borrowed view of the naming information every nominal record carries
#[derive(Debug, Clone, Copy)]
pub struct NominalInfo<'a> {
    /// Program that declares the type
    pub location: Option<&'a Location>,
    /// Unqualified name
    pub identifier: &'a str,
    /// Enclosing type
    pub container: Option<TypeId>,
}
