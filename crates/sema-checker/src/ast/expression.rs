//! Expression nodes

use super::{Identifier, TypeAnnotationExpr, TypeExpr};
use sema_types::Span;

/// Expression (produces a value)
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Integer literal: 42
    IntegerLiteral(IntegerLiteral),

    /// Boolean literal: true, false
    BoolLiteral(BoolLiteral),

    /// String literal: "hello"
    StringLiteral(StringLiteral),

    /// `nil`
    Nil(Span),

    /// Identifier
    Identifier(Identifier),

    /// `a ?? b`, `a == b`
    Binary(BinaryExpression),

    /// `a.b`
    Member(MemberExpression),

    /// `f<T>(x: 1)`
    Invocation(InvocationExpression),

    /// `&v as &T`
    Reference(ReferenceExpression),
}

impl Expression {
    /// Source location
    pub fn span(&self) -> Span {
        match self {
            Expression::IntegerLiteral(e) => e.span,
            Expression::BoolLiteral(e) => e.span,
            Expression::StringLiteral(e) => e.span,
            Expression::Nil(span) => *span,
            Expression::Identifier(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Member(e) => e.span,
            Expression::Invocation(e) => e.span,
            Expression::Reference(e) => e.span,
        }
    }

    /// Check if this expression is a literal
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::IntegerLiteral(_)
                | Expression::BoolLiteral(_)
                | Expression::StringLiteral(_)
                | Expression::Nil(_)
        )
    }
}

/// Integer literal
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub value: i128,
    pub span: Span,
}

/// Boolean literal
#[derive(Debug, Clone, PartialEq)]
pub struct BoolLiteral {
    pub value: bool,
    pub span: Span,
}

/// String literal
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `??`
    NilCoalescing,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

impl BinaryOperator {
    /// Operator as written
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::NilCoalescing => "??",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
        }
    }
}

/// Binary expression
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

/// Member access
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub expression: Box<Expression>,
    pub identifier: Identifier,
    pub span: Span,
}

/// Invocation
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationExpression {
    pub invoked: Box<Expression>,
    pub type_arguments: Vec<TypeAnnotationExpr>,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

/// Argument of an invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub label: Option<Identifier>,
    pub expression: Expression,
}

/// Reference creation: `&v as &T`
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceExpression {
    pub expression: Box<Expression>,
    /// Must be a reference type, possibly optional
    pub ty: TypeExpr,
    pub span: Span,
}
