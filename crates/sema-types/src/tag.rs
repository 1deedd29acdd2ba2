//! Type tags
//!
//! A [`TypeTag`] is a bitset classification of a type. Concrete types map to
//! single bits and abstract supertypes to the union of their members, so
//! membership tests such as "is this an integer" are a single mask check.

use crate::context::TypeContext;
use crate::numeric::NumericType;
use crate::ty::{SimpleType, Type, TypeId};
use bitflags::bitflags;

bitflags! {
    /// Bitset classification of a type
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeTag: u64 {
        /// `Never`
        const NEVER = 1 << 0;
        /// The optional part of an optional type
        const NIL = 1 << 1;
        /// `Void`
        const VOID = 1 << 2;
        /// `Bool`
        const BOOL = 1 << 3;
        /// `Character`
        const CHARACTER = 1 << 4;
        /// `String`
        const STRING = 1 << 5;
        /// `Type`
        const META_TYPE = 1 << 6;
        /// `Address`
        const ADDRESS = 1 << 7;
        /// `StoragePath`
        const STORAGE_PATH = 1 << 8;
        /// `PrivatePath`
        const PRIVATE_PATH = 1 << 9;
        /// `PublicPath`
        const PUBLIC_PATH = 1 << 10;
        /// `Block`
        const BLOCK = 1 << 11;
        /// `DeployedContract`
        const DEPLOYED_CONTRACT = 1 << 12;
        /// `AnyStruct`
        const ANY_STRUCT = 1 << 13;
        /// `AnyResource`
        const ANY_RESOURCE = 1 << 14;
        /// `AnyStructAttachment`
        const ANY_STRUCT_ATTACHMENT = 1 << 15;
        /// `AnyResourceAttachment`
        const ANY_RESOURCE_ATTACHMENT = 1 << 16;
        /// Variable- and constant-sized arrays
        const ARRAY = 1 << 17;
        /// Dictionaries
        const DICTIONARY = 1 << 18;
        /// Functions
        const FUNCTION = 1 << 19;
        /// Composites
        const COMPOSITE = 1 << 20;
        /// Interfaces
        const INTERFACE = 1 << 21;
        /// References
        const REFERENCE = 1 << 22;
        /// Restricted types
        const RESTRICTED = 1 << 23;
        /// Capabilities
        const CAPABILITY = 1 << 24;
        /// Unresolved type parameters
        const GENERIC = 1 << 25;
        /// Transactions
        const TRANSACTION = 1 << 26;
        /// Invalid types, entitlements and entitlement maps
        const INVALID = 1 << 27;

        /// `Int`
        const INT = 1 << 28;
        /// `Int8`
        const INT8 = 1 << 29;
        /// `Int16`
        const INT16 = 1 << 30;
        /// `Int32`
        const INT32 = 1 << 31;
        /// `Int64`
        const INT64 = 1 << 32;
        /// `Int128`
        const INT128 = 1 << 33;
        /// `Int256`
        const INT256 = 1 << 34;
        /// `UInt`
        const UINT = 1 << 35;
        /// `UInt8`
        const UINT8 = 1 << 36;
        /// `UInt16`
        const UINT16 = 1 << 37;
        /// `UInt32`
        const UINT32 = 1 << 38;
        /// `UInt64`
        const UINT64 = 1 << 39;
        /// `UInt128`
        const UINT128 = 1 << 40;
        /// `UInt256`
        const UINT256 = 1 << 41;
        /// `Word8`
        const WORD8 = 1 << 42;
        /// `Word16`
        const WORD16 = 1 << 43;
        /// `Word32`
        const WORD32 = 1 << 44;
        /// `Word64`
        const WORD64 = 1 << 45;
        /// `Word128`
        const WORD128 = 1 << 46;
        /// `Word256`
        const WORD256 = 1 << 47;
        /// `Fix64`
        const FIX64 = 1 << 48;
        /// `UFix64`
        const UFIX64 = 1 << 49;

        /// `SignedInteger`
        const SIGNED_INTEGER = Self::INT.bits()
            | Self::INT8.bits()
            | Self::INT16.bits()
            | Self::INT32.bits()
            | Self::INT64.bits()
            | Self::INT128.bits()
            | Self::INT256.bits();
        /// `Integer`
        const INTEGER = Self::SIGNED_INTEGER.bits()
            | Self::UINT.bits()
            | Self::UINT8.bits()
            | Self::UINT16.bits()
            | Self::UINT32.bits()
            | Self::UINT64.bits()
            | Self::UINT128.bits()
            | Self::UINT256.bits()
            | Self::WORD8.bits()
            | Self::WORD16.bits()
            | Self::WORD32.bits()
            | Self::WORD64.bits()
            | Self::WORD128.bits()
            | Self::WORD256.bits();
        /// `SignedFixedPoint`
        const SIGNED_FIXED_POINT = Self::FIX64.bits();
        /// `FixedPoint`
        const FIXED_POINT = Self::SIGNED_FIXED_POINT.bits() | Self::UFIX64.bits();
        /// `SignedNumber`
        const SIGNED_NUMBER = Self::SIGNED_INTEGER.bits() | Self::SIGNED_FIXED_POINT.bits();
        /// `Number`
        const NUMBER = Self::INTEGER.bits() | Self::FIXED_POINT.bits();

        /// `CapabilityPath`
        const CAPABILITY_PATH = Self::PRIVATE_PATH.bits() | Self::PUBLIC_PATH.bits();
        /// `Path`
        const PATH = Self::CAPABILITY_PATH.bits() | Self::STORAGE_PATH.bits();

        /// `Any`
        const ANY = u64::MAX;
    }
}

impl TypeTag {
    /// Whether every type classified by `self` is also classified by `other`
    pub fn belongs_to(self, other: TypeTag) -> bool {
        !self.is_empty() && other.contains(self)
    }
}

impl NumericType {
    /// Tag of this numeric type
    pub fn tag(self) -> TypeTag {
        match self {
            NumericType::Number => TypeTag::NUMBER,
            NumericType::SignedNumber => TypeTag::SIGNED_NUMBER,
            NumericType::Integer => TypeTag::INTEGER,
            NumericType::SignedInteger => TypeTag::SIGNED_INTEGER,
            NumericType::FixedPoint => TypeTag::FIXED_POINT,
            NumericType::SignedFixedPoint => TypeTag::SIGNED_FIXED_POINT,
            NumericType::Int => TypeTag::INT,
            NumericType::Int8 => TypeTag::INT8,
            NumericType::Int16 => TypeTag::INT16,
            NumericType::Int32 => TypeTag::INT32,
            NumericType::Int64 => TypeTag::INT64,
            NumericType::Int128 => TypeTag::INT128,
            NumericType::Int256 => TypeTag::INT256,
            NumericType::UInt => TypeTag::UINT,
            NumericType::UInt8 => TypeTag::UINT8,
            NumericType::UInt16 => TypeTag::UINT16,
            NumericType::UInt32 => TypeTag::UINT32,
            NumericType::UInt64 => TypeTag::UINT64,
            NumericType::UInt128 => TypeTag::UINT128,
            NumericType::UInt256 => TypeTag::UINT256,
            NumericType::Word8 => TypeTag::WORD8,
            NumericType::Word16 => TypeTag::WORD16,
            NumericType::Word32 => TypeTag::WORD32,
            NumericType::Word64 => TypeTag::WORD64,
            NumericType::Word128 => TypeTag::WORD128,
            NumericType::Word256 => TypeTag::WORD256,
            NumericType::Fix64 => TypeTag::FIX64,
            NumericType::UFix64 => TypeTag::UFIX64,
        }
    }
}

impl SimpleType {
    /// Tag of this simple type
    pub fn tag(self) -> TypeTag {
        match self {
            SimpleType::Any => TypeTag::ANY,
            SimpleType::AnyStruct => TypeTag::ANY_STRUCT,
            SimpleType::AnyResource => TypeTag::ANY_RESOURCE,
            SimpleType::AnyStructAttachment => TypeTag::ANY_STRUCT_ATTACHMENT,
            SimpleType::AnyResourceAttachment => TypeTag::ANY_RESOURCE_ATTACHMENT,
            SimpleType::Never => TypeTag::NEVER,
            SimpleType::Void => TypeTag::VOID,
            SimpleType::Bool => TypeTag::BOOL,
            SimpleType::Character => TypeTag::CHARACTER,
            SimpleType::String => TypeTag::STRING,
            SimpleType::MetaType => TypeTag::META_TYPE,
            SimpleType::Address => TypeTag::ADDRESS,
            SimpleType::Path => TypeTag::PATH,
            SimpleType::StoragePath => TypeTag::STORAGE_PATH,
            SimpleType::CapabilityPath => TypeTag::CAPABILITY_PATH,
            SimpleType::PrivatePath => TypeTag::PRIVATE_PATH,
            SimpleType::PublicPath => TypeTag::PUBLIC_PATH,
            SimpleType::Block => TypeTag::BLOCK,
            SimpleType::DeployedContract => TypeTag::DEPLOYED_CONTRACT,
            SimpleType::Transaction => TypeTag::TRANSACTION,
            SimpleType::Invalid => TypeTag::INVALID,
        }
    }
}

impl TypeContext {
    /// Tag of the type `id`
    pub fn tag(&self, id: TypeId) -> TypeTag {
        let Some(ty) = self.get(id) else {
            return TypeTag::INVALID;
        };

        match ty {
            Type::Simple(simple) => simple.tag(),
            Type::Numeric(numeric) => numeric.tag(),
            Type::Optional(inner) => {
                if *inner == self.never_type() {
                    TypeTag::NIL
                } else {
                    self.tag(*inner) | TypeTag::NIL
                }
            }
            Type::VariableSized(_) | Type::ConstantSized { .. } => TypeTag::ARRAY,
            Type::Dictionary { .. } => TypeTag::DICTIONARY,
            Type::Function(_) => TypeTag::FUNCTION,
            Type::Composite(_) => TypeTag::COMPOSITE,
            Type::Interface(_) => TypeTag::INTERFACE,
            Type::Reference { .. } => TypeTag::REFERENCE,
            Type::Restricted { .. } => TypeTag::RESTRICTED,
            Type::Capability(_) => TypeTag::CAPABILITY,
            Type::Generic(_) => TypeTag::GENERIC,
            Type::Entitlement(_) | Type::EntitlementMap(_) => TypeTag::INVALID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_hierarchy() {
        assert!(TypeTag::INT8.belongs_to(TypeTag::SIGNED_INTEGER));
        assert!(TypeTag::WORD64.belongs_to(TypeTag::INTEGER));
        assert!(!TypeTag::WORD64.belongs_to(TypeTag::SIGNED_NUMBER));
        assert!(TypeTag::SIGNED_INTEGER.belongs_to(TypeTag::NUMBER));
        assert!(TypeTag::UFIX64.belongs_to(TypeTag::FIXED_POINT));
        assert!(!TypeTag::NUMBER.belongs_to(TypeTag::INTEGER));
    }

    #[test]
    fn test_optional_tags() {
        let mut ctx = TypeContext::new();
        let int = ctx.int_type();
        let optional_int = ctx.optional_type(int);

        assert_eq!(ctx.tag(ctx.nil_type()), TypeTag::NIL);
        assert_eq!(ctx.tag(optional_int), TypeTag::INT | TypeTag::NIL);
        assert!(TypeTag::PUBLIC_PATH.belongs_to(ctx.tag(ctx.simple(SimpleType::Path))));
    }
}
