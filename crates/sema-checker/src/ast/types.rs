//! Type expression nodes
//!
//! Type expressions are what programs write in annotations:
//! - Nominal types, possibly nested (`C.Vault`)
//! - Optionals, arrays and dictionaries
//! - Function types
//! - References with an authorization (`auth(Withdraw) &Vault`)
//! - Restricted types (`@Vault{Receiver}`, `{Receiver}`)
//! - `Capability<&Vault>`

use super::Identifier;
use sema_types::{EntitlementSetKind, FunctionPurity, Span};

/// A possibly nested reference to a declared type: `C.Vault`
#[derive(Debug, Clone, PartialEq)]
pub struct NominalType {
    pub identifier: Identifier,
    pub nested_identifiers: Vec<Identifier>,
}

impl NominalType {
    /// Source location covering all parts of the name
    pub fn span(&self) -> Span {
        match self.nested_identifiers.last() {
            Some(last) => self.identifier.span.merge(&last.span),
            None => self.identifier.span,
        }
    }

    /// The name as written, parts joined with `.`
    pub fn qualified_name(&self) -> String {
        std::iter::once(self.identifier.name.as_str())
            .chain(self.nested_identifiers.iter().map(|i| i.name.as_str()))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Type annotation: a type, optionally prefixed with the resource marker `@`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotationExpr {
    pub is_resource: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Type expression
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

/// The different forms of type expressions
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// `Int`, `C.Vault`
    Nominal(NominalType),

    /// `T?`
    Optional(Box<TypeExpr>),

    /// `[T]`
    VariableSized(Box<TypeExpr>),

    /// `[T; 4]`
    ConstantSized { ty: Box<TypeExpr>, size: u64 },

    /// `{K: V}`
    Dictionary {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },

    /// `view fun(Int): String`
    Function {
        purity: FunctionPurity,
        parameters: Vec<TypeAnnotationExpr>,
        return_type: Box<TypeAnnotationExpr>,
    },

    /// `&T`, `auth(E) &T`
    Reference {
        authorization: Option<Authorization>,
        ty: Box<TypeExpr>,
    },

    /// `T{I1, I2}`, or `{I1, I2}` without an underlying type
    Restricted {
        ty: Option<Box<TypeExpr>>,
        restrictions: Vec<NominalType>,
    },

    /// `T<A>`, only valid for `Capability`
    Instantiation {
        ty: Box<TypeExpr>,
        type_arguments: Vec<TypeAnnotationExpr>,
    },
}

/// The entitlements written in `auth(...)` or `access(...)`
#[derive(Debug, Clone, PartialEq)]
pub enum Authorization {
    /// `E1, E2` or `E1 | E2`
    Entitlements {
        kind: EntitlementSetKind,
        entitlements: Vec<NominalType>,
    },
    /// `mapping M`
    Mapping(NominalType),
}

impl Authorization {
    /// Location of the first entitlement or of the mapping
    pub fn span(&self) -> Span {
        match self {
            Authorization::Entitlements { entitlements, .. } => entitlements
                .first()
                .map(NominalType::span)
                .unwrap_or_default(),
            Authorization::Mapping(map) => map.span(),
        }
    }
}

/// Access modifier written on a declaration
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AccessModifier {
    /// No modifier
    #[default]
    NotSpecified,
    /// `access(self)`
    Private,
    /// `access(contract)`
    Contract,
    /// `access(account)`
    Account,
    /// `access(all)`
    All,
    /// `access(E)`, `access(E1, E2)`, `access(E1 | E2)` or `access(mapping M)`
    Authorized(Authorization),
}

impl AccessModifier {
    /// Whether no modifier was written
    pub fn is_not_specified(&self) -> bool {
        matches!(self, AccessModifier::NotSpecified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, start: usize) -> Identifier {
        Identifier::new(name, Span::new(start, start + name.len(), 1, start as u32 + 1))
    }

    #[test]
    fn test_nested_nominal_span() {
        let nominal = NominalType {
            identifier: ident("C", 0),
            nested_identifiers: vec![ident("Vault", 2)],
        };

        assert_eq!(nominal.qualified_name(), "C.Vault");
        assert_eq!(nominal.span().start, 0);
        assert_eq!(nominal.span().end, 7);
    }
}
