//! Declaration nodes
//!
//! A [`Program`] is a list of top-level declarations. Composites and
//! interfaces contain further declarations as their members: fields,
//! functions, the initializer and nested types.

use super::{AccessModifier, Expression, Identifier, NominalType, TypeAnnotationExpr};
use sema_types::{CompositeKind, FunctionPurity, Span, VariableKind};

/// A compilation unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

/// Declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// `struct S {}`, `resource R {}`, `event E()`, ...
    Composite(CompositeDeclaration),

    /// `resource interface I {}`
    Interface(InterfaceDeclaration),

    /// `entitlement E`
    Entitlement(EntitlementDeclaration),

    /// `entitlement mapping M { A -> B }`
    EntitlementMapping(EntitlementMappingDeclaration),

    /// `let x: Int` inside a composite or interface
    Field(FieldDeclaration),

    /// `fun f() {}`
    Function(FunctionDeclaration),

    /// `init() {}`
    Initializer(FunctionDeclaration),

    /// `let x = 1` at the top level or in a function body
    Variable(VariableDeclaration),
}

impl Declaration {
    /// Source location of the whole declaration
    pub fn span(&self) -> Span {
        match self {
            Declaration::Composite(d) => d.span,
            Declaration::Interface(d) => d.span,
            Declaration::Entitlement(d) => d.span,
            Declaration::EntitlementMapping(d) => d.span,
            Declaration::Field(d) => d.span,
            Declaration::Function(d) | Declaration::Initializer(d) => d.span,
            Declaration::Variable(d) => d.span,
        }
    }

    /// Declared name
    pub fn identifier(&self) -> &Identifier {
        match self {
            Declaration::Composite(d) => &d.identifier,
            Declaration::Interface(d) => &d.identifier,
            Declaration::Entitlement(d) => &d.identifier,
            Declaration::EntitlementMapping(d) => &d.identifier,
            Declaration::Field(d) => &d.identifier,
            Declaration::Function(d) | Declaration::Initializer(d) => &d.identifier,
            Declaration::Variable(d) => &d.identifier,
        }
    }
}

/// Typed views over a list of declarations
pub trait DeclarationList {
    /// All declarations, in source order
    fn declarations(&self) -> &[Declaration];

    /// Composite declarations
    fn composites(&self) -> Vec<&CompositeDeclaration> {
        self.declarations()
            .iter()
            .filter_map(|d| match d {
                Declaration::Composite(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Interface declarations
    fn interfaces(&self) -> Vec<&InterfaceDeclaration> {
        self.declarations()
            .iter()
            .filter_map(|d| match d {
                Declaration::Interface(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Entitlement declarations
    fn entitlements(&self) -> Vec<&EntitlementDeclaration> {
        self.declarations()
            .iter()
            .filter_map(|d| match d {
                Declaration::Entitlement(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Entitlement mapping declarations
    fn entitlement_maps(&self) -> Vec<&EntitlementMappingDeclaration> {
        self.declarations()
            .iter()
            .filter_map(|d| match d {
                Declaration::EntitlementMapping(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Field declarations
    fn fields(&self) -> Vec<&FieldDeclaration> {
        self.declarations()
            .iter()
            .filter_map(|d| match d {
                Declaration::Field(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    /// Function declarations, excluding initializers
    fn functions(&self) -> Vec<&FunctionDeclaration> {
        self.declarations()
            .iter()
            .filter_map(|d| match d {
                Declaration::Function(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    /// Initializer declarations
    fn initializers(&self) -> Vec<&FunctionDeclaration> {
        self.declarations()
            .iter()
            .filter_map(|d| match d {
                Declaration::Initializer(f) => Some(f),
                _ => None,
            })
            .collect()
    }
}

impl DeclarationList for Program {
    fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}

impl DeclarationList for Vec<Declaration> {
    fn declarations(&self) -> &[Declaration] {
        self
    }
}

/// `resource Vault: Provider, Receiver { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDeclaration {
    pub access: AccessModifier,
    pub kind: CompositeKind,
    pub identifier: Identifier,
    pub conformances: Vec<NominalType>,
    pub members: Vec<Declaration>,
    pub span: Span,
}

/// `resource interface Receiver: Provider { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDeclaration {
    pub access: AccessModifier,
    pub kind: CompositeKind,
    pub identifier: Identifier,
    pub conformances: Vec<NominalType>,
    pub members: Vec<Declaration>,
    pub span: Span,
}

/// `entitlement Withdraw`
#[derive(Debug, Clone, PartialEq)]
pub struct EntitlementDeclaration {
    pub access: AccessModifier,
    pub identifier: Identifier,
    pub span: Span,
}

/// `entitlement mapping M { include N  A -> B }`
#[derive(Debug, Clone, PartialEq)]
pub struct EntitlementMappingDeclaration {
    pub access: AccessModifier,
    pub identifier: Identifier,
    pub elements: Vec<EntitlementMapElement>,
    pub span: Span,
}

/// Line of an entitlement mapping
#[derive(Debug, Clone, PartialEq)]
pub enum EntitlementMapElement {
    /// `A -> B`
    Relation {
        input: NominalType,
        output: NominalType,
    },
    /// `include M`
    Include(NominalType),
}

/// `access(all) let balance: UFix64`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub access: AccessModifier,
    pub variable_kind: VariableKind,
    pub identifier: Identifier,
    pub type_annotation: TypeAnnotationExpr,
    pub span: Span,
}

/// Function or initializer declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub access: AccessModifier,
    pub purity: FunctionPurity,
    pub identifier: Identifier,
    pub type_parameters: Vec<TypeParameterExpr>,
    pub parameters: Vec<ParameterExpr>,
    /// `None` means `Void`
    pub return_type: Option<TypeAnnotationExpr>,
    /// `None` for a bare signature
    pub body: Option<FunctionBlock>,
    pub span: Span,
}

impl FunctionDeclaration {
    /// Whether the body contains statements
    pub fn has_statements(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.statements.is_empty())
    }

    /// Whether the body has pre- or post-conditions
    pub fn has_conditions(&self) -> bool {
        self.body
            .as_ref()
            .is_some_and(|b| !b.pre_conditions.is_empty() || !b.post_conditions.is_empty())
    }
}

/// `label name: @T`
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterExpr {
    /// `Some("_")` for an unlabelled parameter
    pub label: Option<String>,
    pub identifier: Identifier,
    pub type_annotation: TypeAnnotationExpr,
    pub span: Span,
}

/// `T: Bound`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterExpr {
    pub identifier: Identifier,
    pub type_bound: Option<TypeAnnotationExpr>,
}

/// Function body
///
/// The checker only inspects its shape; statements are checked by a later stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionBlock {
    pub pre_conditions: Vec<Expression>,
    pub post_conditions: Vec<Expression>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// Statement of a function body
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Expression evaluated for its effect
    Expression(Expression),
    /// `let x = e`
    Variable(VariableDeclaration),
    /// `return e`
    Return(Option<Expression>, Span),
}

/// `let x: Int? = e`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub access: AccessModifier,
    pub is_constant: bool,
    pub identifier: Identifier,
    pub type_annotation: Option<TypeAnnotationExpr>,
    pub value: Expression,
    pub span: Span,
}
