//! Core type definitions
//!
//! Types are values of the closed [`Type`] enum, interned in a
//! [`crate::TypeContext`] and referred to by [`TypeId`] handles. Nominal types
//! (composites, interfaces, entitlements and entitlement maps) are stored in
//! arenas of the context and the enum only carries their handle.

use crate::access::Access;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a type in the type context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Index of the type in its context
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Handle of a composite type in the context's composite arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeId(pub(crate) u32);

/// Handle of an interface type in the context's interface arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId(pub(crate) u32);

/// Handle of an entitlement in the context's entitlement arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntitlementId(pub(crate) u32);

/// Handle of an entitlement map in the context's entitlement map arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntitlementMapId(pub(crate) u32);

/// Built-in types without parameters, other than numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SimpleType {
    /// Top type of all values
    Any,
    /// Top type of all non-resource values
    AnyStruct,
    /// Top type of all resources
    AnyResource,
    /// Top type of all struct attachments
    AnyStructAttachment,
    /// Top type of all resource attachments
    AnyResourceAttachment,
    /// Bottom type
    Never,
    /// `Void`
    Void,
    /// `Bool`
    Bool,
    /// `Character`
    Character,
    /// `String`
    String,
    /// `Type`, the type of run-time types
    MetaType,
    /// `Address`
    Address,
    /// Supertype of all paths
    Path,
    /// `StoragePath`
    StoragePath,
    /// Supertype of private and public paths
    CapabilityPath,
    /// `PrivatePath`
    PrivatePath,
    /// `PublicPath`
    PublicPath,
    /// `Block`
    Block,
    /// `DeployedContract`
    DeployedContract,
    /// The type of a transaction declaration
    Transaction,
    /// Result of an erroneous type expression
    Invalid,
}

struct SimpleTypeInfo {
    name: &'static str,
    is_resource: bool,
    storable: bool,
    exportable: bool,
    importable: bool,
    equatable: bool,
    comparable: bool,
}

const fn info(
    name: &'static str,
    flags: [bool; 6],
) -> SimpleTypeInfo {
    SimpleTypeInfo {
        name,
        is_resource: flags[0],
        storable: flags[1],
        exportable: flags[2],
        importable: flags[3],
        equatable: flags[4],
        comparable: flags[5],
    }
}

const T: bool = true;
const F: bool = false;

impl SimpleType {
    /// All simple types, in interning order
    pub const ALL: [SimpleType; 21] = [
        SimpleType::Any,
        SimpleType::AnyStruct,
        SimpleType::AnyResource,
        SimpleType::AnyStructAttachment,
        SimpleType::AnyResourceAttachment,
        SimpleType::Never,
        SimpleType::Void,
        SimpleType::Bool,
        SimpleType::Character,
        SimpleType::String,
        SimpleType::MetaType,
        SimpleType::Address,
        SimpleType::Path,
        SimpleType::StoragePath,
        SimpleType::CapabilityPath,
        SimpleType::PrivatePath,
        SimpleType::PublicPath,
        SimpleType::Block,
        SimpleType::DeployedContract,
        SimpleType::Transaction,
        SimpleType::Invalid,
    ];

    //                                    resource storable exportable importable equatable comparable
    fn info(self) -> SimpleTypeInfo {
        match self {
            SimpleType::Any => info("Any", [F, T, T, T, F, F]),
            SimpleType::AnyStruct => info("AnyStruct", [F, T, T, T, F, F]),
            SimpleType::AnyResource => info("AnyResource", [T, T, T, F, F, F]),
            SimpleType::AnyStructAttachment => info("AnyStructAttachment", [F, T, T, T, F, F]),
            SimpleType::AnyResourceAttachment => {
                info("AnyResourceAttachment", [T, T, T, F, F, F])
            }
            SimpleType::Never => info("Never", [F, F, F, F, F, F]),
            SimpleType::Void => info("Void", [F, F, T, T, F, F]),
            SimpleType::Bool => info("Bool", [F, T, T, T, T, T]),
            SimpleType::Character => info("Character", [F, T, T, T, T, T]),
            SimpleType::String => info("String", [F, T, T, T, T, T]),
            SimpleType::MetaType => info("Type", [F, T, T, T, T, F]),
            SimpleType::Address => info("Address", [F, T, T, T, T, F]),
            SimpleType::Path => info("Path", [F, T, T, T, T, F]),
            SimpleType::StoragePath => info("StoragePath", [F, T, T, T, T, F]),
            SimpleType::CapabilityPath => info("CapabilityPath", [F, T, T, T, T, F]),
            SimpleType::PrivatePath => info("PrivatePath", [F, T, T, T, T, F]),
            SimpleType::PublicPath => info("PublicPath", [F, T, T, T, T, F]),
            SimpleType::Block => info("Block", [F, F, T, F, F, F]),
            SimpleType::DeployedContract => info("DeployedContract", [F, F, T, F, F, F]),
            SimpleType::Transaction => info("Transaction", [F, F, F, F, F, F]),
            SimpleType::Invalid => info("<<invalid>>", [F, F, F, F, F, F]),
        }
    }

    /// Name of the type as written in programs
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Whether values of this type are resources
    pub fn is_resource(self) -> bool {
        self.info().is_resource
    }

    /// Whether values of this type can be stored
    pub fn is_storable(self) -> bool {
        self.info().storable
    }

    /// Whether values of this type can be returned from scripts
    pub fn is_exportable(self) -> bool {
        self.info().exportable
    }

    /// Whether values of this type can be passed into programs
    pub fn is_importable(self) -> bool {
        self.info().importable
    }

    /// Whether values of this type support `==`
    pub fn is_equatable(self) -> bool {
        self.info().equatable
    }

    /// Whether values of this type support `<`
    pub fn is_comparable(self) -> bool {
        self.info().comparable
    }

    /// Whether this is one of the attachment top types
    pub fn is_attachment(self) -> bool {
        matches!(
            self,
            SimpleType::AnyStructAttachment | SimpleType::AnyResourceAttachment
        )
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a function may have side effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionPurity {
    /// May have side effects
    #[default]
    Impure,
    /// `view`: guaranteed not to mutate state
    View,
}

impl FunctionPurity {
    /// Keyword prefix, empty for impure functions
    pub fn keyword(self) -> &'static str {
        match self {
            FunctionPurity::Impure => "",
            FunctionPurity::View => "view",
        }
    }
}

/// A type together with the resource annotation written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeAnnotation {
    /// Whether the annotation is prefixed with `@`
    pub is_resource: bool,
    /// The annotated type
    pub ty: TypeId,
}

impl TypeAnnotation {
    /// Create an annotation
    pub fn new(ty: TypeId, is_resource: bool) -> Self {
        Self { is_resource, ty }
    }
}

/// Validity of a type used in an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeAnnotationState {
    /// The annotation is valid
    Valid,
    /// A resource type is missing its `@`
    MissingResourceAnnotation,
    /// A non-resource type has an `@`
    InvalidResourceAnnotation,
    /// An entitlement or entitlement map is used as a type
    DirectEntitlementTypeAnnotation,
    /// An attachment is used as a type
    DirectAttachmentTypeAnnotation,
}

/// Argument label that marks a parameter as unlabelled at call sites
pub const ARGUMENT_LABEL_NOT_REQUIRED: &str = "_";

/// A function parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Argument label; `Some("_")` when no label is required
    pub label: Option<String>,
    /// Parameter name
    pub identifier: String,
    /// Parameter type
    pub type_annotation: TypeAnnotation,
}

impl Parameter {
    /// Create a parameter
    pub fn new(label: Option<&str>, identifier: &str, type_annotation: TypeAnnotation) -> Self {
        Self {
            label: label.map(str::to_string),
            identifier: identifier.to_string(),
            type_annotation,
        }
    }

    /// Create a parameter that takes no argument label
    pub fn unlabeled(identifier: &str, type_annotation: TypeAnnotation) -> Self {
        Self::new(Some(ARGUMENT_LABEL_NOT_REQUIRED), identifier, type_annotation)
    }

    /// The label an argument must use: the declared label, or else the parameter name
    pub fn effective_argument_label(&self) -> &str {
        match &self.label {
            Some(label) => label,
            None => &self.identifier,
        }
    }
}

/// A type parameter of a generic function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    /// Name
    pub name: String,
    /// Upper bound
    pub type_bound: Option<TypeId>,
    /// Whether inference may leave the parameter unbound
    pub optional: bool,
}

impl TypeParameter {
    /// Create a required type parameter
    pub fn new(name: &str, type_bound: Option<TypeId>) -> Self {
        Self {
            name: name.to_string(),
            type_bound,
            optional: false,
        }
    }
}

/// Function type: `view fun<T>(label name: A): R`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    /// Purity
    pub purity: FunctionPurity,
    /// Type parameters
    pub type_parameters: Vec<TypeParameter>,
    /// Parameters
    pub parameters: Vec<Parameter>,
    /// Return type
    pub return_type: TypeAnnotation,
    /// Minimum number of arguments, if fewer than the parameters
    pub required_argument_count: Option<usize>,
    /// Whether this is the constructor of a composite
    pub is_constructor: bool,
}

impl FunctionType {
    /// Create a non-generic function type
    pub fn new(
        purity: FunctionPurity,
        parameters: Vec<Parameter>,
        return_type: TypeAnnotation,
    ) -> Self {
        Self {
            purity,
            type_parameters: Vec::new(),
            parameters,
            return_type,
            required_argument_count: None,
            is_constructor: false,
        }
    }

    /// Labels arguments must use, one per parameter
    pub fn argument_labels(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|parameter| parameter.effective_argument_label().to_string())
            .collect()
    }

    /// Whether both functions take the same argument labels
    pub fn has_same_argument_labels(&self, other: &FunctionType) -> bool {
        self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.effective_argument_label() == b.effective_argument_label())
    }
}

/// The closed set of types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Built-in type without parameters
    Simple(SimpleType),

    /// Integer, word or fixed-point type
    Numeric(crate::numeric::NumericType),

    /// `T?`
    Optional(TypeId),

    /// `[T]`
    VariableSized(TypeId),

    /// `[T; N]`
    ConstantSized {
        /// Element type
        ty: TypeId,
        /// Number of elements
        size: u64,
    },

    /// `{K: V}`
    Dictionary {
        /// Key type
        key: TypeId,
        /// Value type
        value: TypeId,
    },

    /// Function type
    Function(FunctionType),

    /// Nominal struct, resource, contract, enum, event or attachment
    Composite(CompositeId),

    /// Nominal interface
    Interface(InterfaceId),

    /// `auth(E) &T`
    Reference {
        /// Referenced type
        ty: TypeId,
        /// Entitlements the reference carries
        authorization: Access,
    },

    /// `T{I1, I2}`, also written as an intersection `{I1, I2}`
    Restricted {
        /// Underlying type
        ty: Option<TypeId>,
        /// Interfaces the value is restricted to, in source order
        restrictions: Vec<TypeId>,
    },

    /// `Capability<T>`, or the unparameterised `Capability`
    Capability(Option<TypeId>),

    /// Occurrence of a type parameter, resolved away by unification
    Generic(TypeParameter),

    /// Entitlement, only valid in access positions
    Entitlement(EntitlementId),

    /// Entitlement map, only valid in access positions
    EntitlementMap(EntitlementMapId),
}

impl Type {
    /// Check if this type is a function type
    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function(_))
    }

    /// Check if this type is an optional type
    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_))
    }

    /// Get the function type if this is a function
    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Get the numeric type if this is a number
    pub fn as_numeric(&self) -> Option<crate::numeric::NumericType> {
        match self {
            Type::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the simple type if this is one
    pub fn as_simple(&self) -> Option<SimpleType> {
        match self {
            Type::Simple(s) => Some(*s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_names() {
        assert_eq!(SimpleType::MetaType.name(), "Type");
        assert_eq!(SimpleType::Invalid.to_string(), "<<invalid>>");
        assert_eq!(SimpleType::ALL.len(), SimpleType::Invalid as usize + 1);
    }

    #[test]
    fn test_simple_predicates() {
        assert!(SimpleType::AnyResource.is_resource());
        assert!(!SimpleType::Any.is_resource());
        assert!(SimpleType::String.is_comparable());
        assert!(!SimpleType::Address.is_comparable());
        assert!(!SimpleType::Block.is_storable());
        assert!(SimpleType::AnyResourceAttachment.is_attachment());
    }

    #[test]
    fn test_effective_argument_label() {
        let annotation = TypeAnnotation::new(TypeId(0), false);
        let labeled = Parameter::new(Some("to"), "recipient", annotation);
        let plain = Parameter::new(None, "amount", annotation);
        let unlabeled = Parameter::unlabeled("value", annotation);

        assert_eq!(labeled.effective_argument_label(), "to");
        assert_eq!(plain.effective_argument_label(), "amount");
        assert_eq!(unlabeled.effective_argument_label(), "_");
    }
}
