//! Declaration and composite kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a composite or interface declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    /// `struct`
    Structure,
    /// `resource`
    Resource,
    /// `contract`
    Contract,
    /// `enum`
    Enum,
    /// `event`
    Event,
    /// `attachment`
    Attachment,
}

impl CompositeKind {
    /// Keyword introducing a declaration of this kind
    pub fn keyword(self) -> &'static str {
        match self {
            CompositeKind::Structure => "struct",
            CompositeKind::Resource => "resource",
            CompositeKind::Contract => "contract",
            CompositeKind::Enum => "enum",
            CompositeKind::Event => "event",
            CompositeKind::Attachment => "attachment",
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            CompositeKind::Structure => "structure",
            CompositeKind::Resource => "resource",
            CompositeKind::Contract => "contract",
            CompositeKind::Enum => "enum",
            CompositeKind::Event => "event",
            CompositeKind::Attachment => "attachment",
        }
    }

    /// Prefix required on type annotations of values of this kind
    pub fn annotation(self) -> &'static str {
        match self {
            CompositeKind::Resource => "@",
            _ => "",
        }
    }

    /// Whether interfaces may be declared with this kind
    pub fn supports_interfaces(self) -> bool {
        matches!(
            self,
            CompositeKind::Structure | CompositeKind::Resource | CompositeKind::Contract
        )
    }

    /// Whether attachments may be declared for values of this kind
    pub fn supports_attachments(self) -> bool {
        matches!(self, CompositeKind::Structure | CompositeKind::Resource)
    }

    /// Declaration kind of a composite declaration of this kind
    pub fn declaration_kind(self, is_interface: bool) -> DeclarationKind {
        match (self, is_interface) {
            (CompositeKind::Structure, false) => DeclarationKind::Structure,
            (CompositeKind::Structure, true) => DeclarationKind::StructureInterface,
            (CompositeKind::Resource, false) => DeclarationKind::Resource,
            (CompositeKind::Resource, true) => DeclarationKind::ResourceInterface,
            (CompositeKind::Contract, false) => DeclarationKind::Contract,
            (CompositeKind::Contract, true) => DeclarationKind::ContractInterface,
            (CompositeKind::Enum, _) => DeclarationKind::Enum,
            (CompositeKind::Event, _) => DeclarationKind::Event,
            (CompositeKind::Attachment, _) => DeclarationKind::Attachment,
        }
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of a declaration, used for members, symbols and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// A field of a composite or interface
    Field,
    /// A function or method
    Function,
    /// An initializer
    Initializer,
    /// A `let` declaration
    Constant,
    /// A `var` declaration
    Variable,
    /// A parameter
    Parameter,
    /// A type parameter
    TypeParameter,
    /// `struct`
    Structure,
    /// `struct interface`
    StructureInterface,
    /// `resource`
    Resource,
    /// `resource interface`
    ResourceInterface,
    /// `contract`
    Contract,
    /// `contract interface`
    ContractInterface,
    /// `enum`
    Enum,
    /// `event`
    Event,
    /// `attachment`
    Attachment,
    /// `entitlement`
    Entitlement,
    /// `entitlement mapping`
    EntitlementMapping,
    /// A built-in type
    Type,
}

impl DeclarationKind {
    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            DeclarationKind::Field => "field",
            DeclarationKind::Function => "function",
            DeclarationKind::Initializer => "initializer",
            DeclarationKind::Constant => "constant",
            DeclarationKind::Variable => "variable",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::TypeParameter => "type parameter",
            DeclarationKind::Structure => "structure",
            DeclarationKind::StructureInterface => "structure interface",
            DeclarationKind::Resource => "resource",
            DeclarationKind::ResourceInterface => "resource interface",
            DeclarationKind::Contract => "contract",
            DeclarationKind::ContractInterface => "contract interface",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Event => "event",
            DeclarationKind::Attachment => "attachment",
            DeclarationKind::Entitlement => "entitlement",
            DeclarationKind::EntitlementMapping => "entitlement mapping",
            DeclarationKind::Type => "type",
        }
    }

    /// Whether declarations of this kind are interfaces
    pub fn is_interface(self) -> bool {
        matches!(
            self,
            DeclarationKind::StructureInterface
                | DeclarationKind::ResourceInterface
                | DeclarationKind::ContractInterface
        )
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutability of a field or variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// No `let`/`var` given; only valid for interface fields
    NotSpecified,
    /// `let`
    Constant,
    /// `var`
    Variable,
}

impl VariableKind {
    /// Keyword introducing a declaration of this kind
    pub fn keyword(self) -> &'static str {
        match self {
            VariableKind::NotSpecified => "",
            VariableKind::Constant => "let",
            VariableKind::Variable => "var",
        }
    }
}
