//! Type context for managing types and type interning

use crate::access::Access;
use crate::member::MemberResolverMap;
use crate::nominal::{
    CompositeType, EntitlementMapType, EntitlementType, InterfaceType, NominalInfo,
};
use crate::numeric::NumericType;
use crate::ty::{
    CompositeId, EntitlementId, EntitlementMapId, FunctionType, InterfaceId, SimpleType, Type,
    TypeAnnotation, TypeId, TypeParameter,
};
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Values computed once per type and reused until a nominal type changes
#[derive(Debug, Clone, Default)]
pub(crate) struct TypeCache {
    pub(crate) members: OnceCell<Arc<MemberResolverMap>>,
    pub(crate) supported_entitlements: OnceCell<Arc<Vec<TypeId>>>,
}

/// Type context that manages all types of a compilation unit
///
/// Structural types are interned so identical types share a [`TypeId`].
/// Nominal types live in arenas owned by the context and are referred to by
/// handle; their records are filled in during declaration and frozen after.
#[derive(Debug, Clone)]
pub struct TypeContext {
    /// Storage for all types, indexed by TypeId
    types: Vec<Arc<Type>>,

    /// Reverse mapping from Type to TypeId for interning
    type_to_id: FxHashMap<Type, TypeId>,

    /// Lazily computed per-type caches, indexed by TypeId
    caches: Vec<TypeCache>,

    composites: Vec<CompositeType>,
    interfaces: Vec<InterfaceType>,
    entitlements: Vec<EntitlementType>,
    entitlement_maps: Vec<EntitlementMapType>,
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

/// First TypeId after the simple types
const NUMERIC_BASE: u32 = SimpleType::ALL.len() as u32;
/// TypeId of `Never?`
const NIL_TYPE_ID: u32 = NUMERIC_BASE + NumericType::ALL.len() as u32;
/// TypeId of the unparameterised `Capability`
const CAPABILITY_TYPE_ID: u32 = NIL_TYPE_ID + 1;
/// TypeId of the built-in `Identity` mapping
const IDENTITY_MAP_TYPE_ID: u32 = CAPABILITY_TYPE_ID + 1;

impl TypeContext {
    /// Create a new type context with all built-in types pre-interned
    pub fn new() -> Self {
        let mut ctx = TypeContext {
            types: Vec::new(),
            type_to_id: FxHashMap::default(),
            caches: Vec::new(),
            composites: Vec::new(),
            interfaces: Vec::new(),
            entitlements: Vec::new(),
            entitlement_maps: Vec::new(),
        };

        // Built-ins sit at fixed ids so the accessors below need no lookup
        for simple in SimpleType::ALL {
            ctx.intern(Type::Simple(simple));
        }
        for numeric in NumericType::ALL {
            ctx.intern(Type::Numeric(numeric));
        }
        let never = ctx.never_type();
        ctx.intern(Type::Optional(never));
        ctx.intern(Type::Capability(None));

        let mut identity = EntitlementMapType::new(None, "Identity");
        identity.includes_identity = true;
        identity.inclusions_resolved = true;
        let identity_id = ctx.declare_entitlement_map(identity);
        debug_assert_eq!(identity_id, TypeId(IDENTITY_MAP_TYPE_ID));

        ctx
    }

    /// Intern a type, returning its TypeId
    ///
    /// If the type already exists, returns the existing TypeId.
    /// Otherwise, allocates a new TypeId and stores the type.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.type_to_id.get(&ty) {
            return id;
        }

        let id = TypeId(self.types.len() as u32);
        self.types.push(Arc::new(ty.clone()));
        self.caches.push(TypeCache::default());
        self.type_to_id.insert(ty, id);
        id
    }

    /// Get a type by its TypeId
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.index()).map(|arc| arc.as_ref())
    }

    /// Look up a type's ID without interning (returns None if type doesn't exist)
    pub fn lookup(&self, ty: &Type) -> Option<TypeId> {
        self.type_to_id.get(ty).copied()
    }

    /// Get a type by its TypeId, panicking if it doesn't exist
    ///
    /// # Panics
    ///
    /// Panics if the TypeId is invalid
    pub fn get_unchecked(&self, id: TypeId) -> &Type {
        self.get(id).expect("Invalid TypeId")
    }

    /// Number of interned types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are interned
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub(crate) fn cache(&self, id: TypeId) -> Option<&TypeCache> {
        self.caches.get(id.index())
    }

    fn invalidate_caches(&mut self) {
        for cache in &mut self.caches {
            cache.members.take();
            cache.supported_entitlements.take();
        }
    }

    // Built-in types

    /// TypeId of a simple type
    pub fn simple(&self, simple: SimpleType) -> TypeId {
        TypeId(simple as u32)
    }

    /// TypeId of a numeric type
    pub fn numeric(&self, numeric: NumericType) -> TypeId {
        TypeId(NUMERIC_BASE + numeric as u32)
    }

    /// `Never`
    pub fn never_type(&self) -> TypeId {
        self.simple(SimpleType::Never)
    }

    /// `Void`
    pub fn void_type(&self) -> TypeId {
        self.simple(SimpleType::Void)
    }

    /// `Bool`
    pub fn bool_type(&self) -> TypeId {
        self.simple(SimpleType::Bool)
    }

    /// `String`
    pub fn string_type(&self) -> TypeId {
        self.simple(SimpleType::String)
    }

    /// `Character`
    pub fn character_type(&self) -> TypeId {
        self.simple(SimpleType::Character)
    }

    /// `Address`
    pub fn address_type(&self) -> TypeId {
        self.simple(SimpleType::Address)
    }

    /// `Type`
    pub fn meta_type(&self) -> TypeId {
        self.simple(SimpleType::MetaType)
    }

    /// `Any`
    pub fn any_type(&self) -> TypeId {
        self.simple(SimpleType::Any)
    }

    /// `AnyStruct`
    pub fn any_struct_type(&self) -> TypeId {
        self.simple(SimpleType::AnyStruct)
    }

    /// `AnyResource`
    pub fn any_resource_type(&self) -> TypeId {
        self.simple(SimpleType::AnyResource)
    }

    /// The invalid type
    pub fn invalid_type(&self) -> TypeId {
        self.simple(SimpleType::Invalid)
    }

    /// `Int`
    pub fn int_type(&self) -> TypeId {
        self.numeric(NumericType::Int)
    }

    /// `Never?`, the type of `nil`
    pub fn nil_type(&self) -> TypeId {
        TypeId(NIL_TYPE_ID)
    }

    /// The unparameterised `Capability`
    pub fn unparameterized_capability_type(&self) -> TypeId {
        TypeId(CAPABILITY_TYPE_ID)
    }

    /// The built-in `Identity` entitlement mapping
    pub fn identity_map(&self) -> TypeId {
        TypeId(IDENTITY_MAP_TYPE_ID)
    }

    // Structural types

    /// `T?`
    pub fn optional_type(&mut self, inner: TypeId) -> TypeId {
        self.intern(Type::Optional(inner))
    }

    /// `[T]`
    pub fn variable_sized_type(&mut self, element: TypeId) -> TypeId {
        self.intern(Type::VariableSized(element))
    }

    /// `[T; N]`
    pub fn constant_sized_type(&mut self, element: TypeId, size: u64) -> TypeId {
        self.intern(Type::ConstantSized { ty: element, size })
    }

    /// `{K: V}`
    pub fn dictionary_type(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(Type::Dictionary { key, value })
    }

    /// A function type
    pub fn function_type(&mut self, function: FunctionType) -> TypeId {
        self.intern(Type::Function(function))
    }

    /// `auth(..) &T`
    pub fn reference_type(&mut self, ty: TypeId, authorization: Access) -> TypeId {
        self.intern(Type::Reference { ty, authorization })
    }

    /// `T{I1, I2}`
    pub fn restricted_type(&mut self, ty: Option<TypeId>, restrictions: Vec<TypeId>) -> TypeId {
        let mut unique: Vec<TypeId> = Vec::with_capacity(restrictions.len());
        for restriction in restrictions {
            if !unique.contains(&restriction) {
                unique.push(restriction);
            }
        }
        self.intern(Type::Restricted {
            ty,
            restrictions: unique,
        })
    }

    /// `Capability<T>`
    pub fn capability_type(&mut self, borrow: Option<TypeId>) -> TypeId {
        self.intern(Type::Capability(borrow))
    }

    /// An occurrence of a type parameter
    pub fn generic_type(&mut self, parameter: TypeParameter) -> TypeId {
        self.intern(Type::Generic(parameter))
    }

    /// Annotation of `ty` with the resource flag its type implies
    pub fn type_annotation(&self, ty: TypeId) -> TypeAnnotation {
        TypeAnnotation::new(ty, self.is_resource_type(ty))
    }

    // Nominal types

    /// Allocate a composite and return its TypeId
    pub fn declare_composite(&mut self, mut composite: CompositeType) -> TypeId {
        let handle = CompositeId(self.composites.len() as u32);
        let id = TypeId(self.types.len() as u32);
        composite.type_id = id;
        self.composites.push(composite);
        self.intern(Type::Composite(handle))
    }

    /// Allocate an interface and return its TypeId
    pub fn declare_interface(&mut self, mut interface: InterfaceType) -> TypeId {
        let handle = InterfaceId(self.interfaces.len() as u32);
        interface.type_id = TypeId(self.types.len() as u32);
        self.interfaces.push(interface);
        self.intern(Type::Interface(handle))
    }

    /// Allocate an entitlement and return its TypeId
    pub fn declare_entitlement(&mut self, mut entitlement: EntitlementType) -> TypeId {
        let handle = EntitlementId(self.entitlements.len() as u32);
        entitlement.type_id = TypeId(self.types.len() as u32);
        self.entitlements.push(entitlement);
        self.intern(Type::Entitlement(handle))
    }

    /// Allocate an entitlement mapping and return its TypeId
    pub fn declare_entitlement_map(&mut self, mut map: EntitlementMapType) -> TypeId {
        let handle = EntitlementMapId(self.entitlement_maps.len() as u32);
        map.type_id = TypeId(self.types.len() as u32);
        self.entitlement_maps.push(map);
        self.intern(Type::EntitlementMap(handle))
    }

    /// The composite record of `id`, if it is a composite
    pub fn as_composite(&self, id: TypeId) -> Option<&CompositeType> {
        match self.get(id)? {
            Type::Composite(handle) => self.composites.get(handle.0 as usize),
            _ => None,
        }
    }

    /// The interface record of `id`, if it is an interface
    pub fn as_interface(&self, id: TypeId) -> Option<&InterfaceType> {
        match self.get(id)? {
            Type::Interface(handle) => self.interfaces.get(handle.0 as usize),
            _ => None,
        }
    }

    /// The entitlement record of `id`, if it is an entitlement
    pub fn as_entitlement(&self, id: TypeId) -> Option<&EntitlementType> {
        match self.get(id)? {
            Type::Entitlement(handle) => self.entitlements.get(handle.0 as usize),
            _ => None,
        }
    }

    /// The mapping record of `id`, if it is an entitlement mapping
    pub fn as_entitlement_map(&self, id: TypeId) -> Option<&EntitlementMapType> {
        match self.get(id)? {
            Type::EntitlementMap(handle) => self.entitlement_maps.get(handle.0 as usize),
            _ => None,
        }
    }

    /// Mutable composite record; clears computed member caches
    pub fn as_composite_mut(&mut self, id: TypeId) -> Option<&mut CompositeType> {
        let Some(Type::Composite(handle)) = self.get(id).cloned() else {
            return None;
        };
        self.invalidate_caches();
        self.composites.get_mut(handle.0 as usize)
    }

    /// Mutable interface record; clears computed member caches
    pub fn as_interface_mut(&mut self, id: TypeId) -> Option<&mut InterfaceType> {
        let Some(Type::Interface(handle)) = self.get(id).cloned() else {
            return None;
        };
        self.invalidate_caches();
        self.interfaces.get_mut(handle.0 as usize)
    }

    /// Mutable entitlement record
    pub fn as_entitlement_mut(&mut self, id: TypeId) -> Option<&mut EntitlementType> {
        let Some(Type::Entitlement(handle)) = self.get(id).cloned() else {
            return None;
        };
        self.entitlements.get_mut(handle.0 as usize)
    }

    /// Mutable mapping record
    pub fn as_entitlement_map_mut(&mut self, id: TypeId) -> Option<&mut EntitlementMapType> {
        let Some(Type::EntitlementMap(handle)) = self.get(id).cloned() else {
            return None;
        };
        self.entitlement_maps.get_mut(handle.0 as usize)
    }

    /// Naming information of a nominal type
    pub fn nominal_info(&self, id: TypeId) -> Option<NominalInfo<'_>> {
        if let Some(c) = self.as_composite(id) {
            return Some(NominalInfo {
                location: c.location.as_ref(),
                identifier: &c.identifier,
                container: c.container,
            });
        }
        if let Some(i) = self.as_interface(id) {
            return Some(NominalInfo {
                location: i.location.as_ref(),
                identifier: &i.identifier,
                container: i.container,
            });
        }
        if let Some(e) = self.as_entitlement(id) {
            return Some(NominalInfo {
                location: e.location.as_ref(),
                identifier: &e.identifier,
                container: e.container,
            });
        }
        self.as_entitlement_map(id).map(|m| NominalInfo {
            location: m.location.as_ref(),
            identifier: &m.identifier,
            container: m.container,
        })
    }

    /// Nested types of a composite or interface
    pub fn nested_types(&self, id: TypeId) -> Option<&indexmap::IndexMap<String, TypeId>> {
        if let Some(c) = self.as_composite(id) {
            return Some(&c.nested_types);
        }
        self.as_interface(id).map(|i| &i.nested_types)
    }

    /// Record `container` as the enclosing type of `nested`
    ///
    /// The nested type is also registered in the container's nested types
    /// under its identifier. Returns false if either handle is not nominal.
    pub fn set_container(&mut self, nested: TypeId, container: TypeId) -> bool {
        let Some(identifier) = self.nominal_info(nested).map(|info| info.identifier.to_string())
        else {
            return false;
        };

        let registered = if let Some(c) = self.as_composite_mut(container) {
            c.nested_types.insert(identifier, nested);
            true
        } else if let Some(i) = self.as_interface_mut(container) {
            i.nested_types.insert(identifier, nested);
            true
        } else {
            false
        };
        if !registered {
            return false;
        }

        if let Some(c) = self.as_composite_mut(nested) {
            c.container = Some(container);
        } else if let Some(i) = self.as_interface_mut(nested) {
            i.container = Some(container);
        } else if let Some(e) = self.as_entitlement_mut(nested) {
            e.container = Some(container);
        } else if let Some(m) = self.as_entitlement_map_mut(nested) {
            m.container = Some(container);
        }
        true
    }

    /// All composite records, in declaration order
    pub fn composites(&self) -> impl Iterator<Item = &CompositeType> {
        self.composites.iter()
    }

    /// All interface records, in declaration order
    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceType> {
        self.interfaces.iter()
    }
}
