//! Convenience constructors for syntax trees
//!
//! Used by tooling and tests that build programs without going through the
//! parser. Every node gets a distinct synthetic span so that elaboration
//! entries of different nodes never collide; use the `at` methods where a
//! test needs a particular location.

use super::*;
use sema_types::{CompositeKind, EntitlementSetKind, FunctionPurity, VariableKind};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_OFFSET: AtomicUsize = AtomicUsize::new(1);

/// A fresh synthetic span, distinct from all others handed out
pub fn span() -> Span {
    let start = NEXT_OFFSET.fetch_add(2, Ordering::Relaxed);
    Span::new(start, start + 1, 1, 1)
}

/// Identifier with a fresh span
pub fn ident(name: &str) -> Identifier {
    Identifier::new(name, span())
}

/// A possibly nested type name: `"C.Vault"`
pub fn nominal(path: &str) -> NominalType {
    let mut parts = path.split('.').map(ident);
    let identifier = parts.next().unwrap_or_else(|| ident(""));
    NominalType {
        identifier,
        nested_identifiers: parts.collect(),
    }
}

fn type_expr(kind: TypeExprKind) -> TypeExpr {
    TypeExpr { kind, span: span() }
}

/// Nominal type expression
pub fn named(path: &str) -> TypeExpr {
    type_expr(TypeExprKind::Nominal(nominal(path)))
}

/// `T?`
pub fn optional(ty: TypeExpr) -> TypeExpr {
    type_expr(TypeExprKind::Optional(Box::new(ty)))
}

/// `[T]`
pub fn array(ty: TypeExpr) -> TypeExpr {
    type_expr(TypeExprKind::VariableSized(Box::new(ty)))
}

/// `[T; size]`
pub fn fixed_array(ty: TypeExpr, size: u64) -> TypeExpr {
    type_expr(TypeExprKind::ConstantSized {
        ty: Box::new(ty),
        size,
    })
}

/// `{K: V}`
pub fn dictionary(key: TypeExpr, value: TypeExpr) -> TypeExpr {
    type_expr(TypeExprKind::Dictionary {
        key: Box::new(key),
        value: Box::new(value),
    })
}

/// `fun(P...): R`
pub fn function_type(parameters: Vec<TypeAnnotationExpr>, return_type: TypeAnnotationExpr) -> TypeExpr {
    type_expr(TypeExprKind::Function {
        purity: FunctionPurity::Impure,
        parameters,
        return_type: Box::new(return_type),
    })
}

/// `&T`
pub fn reference(ty: TypeExpr) -> TypeExpr {
    type_expr(TypeExprKind::Reference {
        authorization: None,
        ty: Box::new(ty),
    })
}

/// `auth(E1, E2) &T`
pub fn auth_reference(entitlements: &[&str], ty: TypeExpr) -> TypeExpr {
    authorized_reference(conjunction(entitlements), ty)
}

/// `auth(mapping M) &T`
pub fn mapped_reference(map: &str, ty: TypeExpr) -> TypeExpr {
    authorized_reference(Authorization::Mapping(nominal(map)), ty)
}

/// Reference with the given authorization
pub fn authorized_reference(authorization: Authorization, ty: TypeExpr) -> TypeExpr {
    type_expr(TypeExprKind::Reference {
        authorization: Some(authorization),
        ty: Box::new(ty),
    })
}

/// `E1, E2`
pub fn conjunction(entitlements: &[&str]) -> Authorization {
    Authorization::Entitlements {
        kind: EntitlementSetKind::Conjunction,
        entitlements: entitlements.iter().map(|e| nominal(e)).collect(),
    }
}

/// `E1 | E2`
pub fn disjunction(entitlements: &[&str]) -> Authorization {
    Authorization::Entitlements {
        kind: EntitlementSetKind::Disjunction,
        entitlements: entitlements.iter().map(|e| nominal(e)).collect(),
    }
}

/// `T{I...}`, or `{I...}` when `ty` is `None`
pub fn restricted(ty: Option<TypeExpr>, restrictions: &[&str]) -> TypeExpr {
    type_expr(TypeExprKind::Restricted {
        ty: ty.map(Box::new),
        restrictions: restrictions.iter().map(|r| nominal(r)).collect(),
    })
}

/// `Capability<T>`
pub fn capability(borrow: TypeExpr) -> TypeExpr {
    type_expr(TypeExprKind::Instantiation {
        ty: Box::new(named("Capability")),
        type_arguments: vec![annotation(borrow)],
    })
}

/// Annotation without the resource marker
pub fn annotation(ty: TypeExpr) -> TypeAnnotationExpr {
    TypeAnnotationExpr {
        is_resource: false,
        span: ty.span,
        ty,
    }
}

/// Annotation with the resource marker `@`
pub fn resource(ty: TypeExpr) -> TypeAnnotationExpr {
    TypeAnnotationExpr {
        is_resource: true,
        span: ty.span,
        ty,
    }
}

/// `access(E1, E2)`
pub fn entitlement_access(entitlements: &[&str]) -> AccessModifier {
    AccessModifier::Authorized(conjunction(entitlements))
}

/// `access(mapping M)`
pub fn mapping_access(map: &str) -> AccessModifier {
    AccessModifier::Authorized(Authorization::Mapping(nominal(map)))
}

/// Program of the given declarations
pub fn program(declarations: Vec<Declaration>) -> Program {
    Program { declarations }
}

/// `access(all) <kind> name {}`
pub fn composite(kind: CompositeKind, name: &str) -> CompositeDeclaration {
    CompositeDeclaration {
        access: AccessModifier::All,
        kind,
        identifier: ident(name),
        conformances: Vec::new(),
        members: Vec::new(),
        span: span(),
    }
}

impl CompositeDeclaration {
    /// Add a conformance
    pub fn conforms_to(mut self, interface: &str) -> Self {
        self.conformances.push(nominal(interface));
        self
    }

    /// Add a member declaration
    pub fn member(mut self, member: impl Into<Declaration>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Replace the access modifier
    pub fn with_access(mut self, access: AccessModifier) -> Self {
        self.access = access;
        self
    }

    /// Move the declaration to `span`
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.identifier.span = span;
        self
    }
}

/// `access(all) <kind> interface name {}`
pub fn interface(kind: CompositeKind, name: &str) -> InterfaceDeclaration {
    InterfaceDeclaration {
        access: AccessModifier::All,
        kind,
        identifier: ident(name),
        conformances: Vec::new(),
        members: Vec::new(),
        span: span(),
    }
}

impl InterfaceDeclaration {
    /// Add an inherited interface
    pub fn conforms_to(mut self, interface: &str) -> Self {
        self.conformances.push(nominal(interface));
        self
    }

    /// Add a member declaration
    pub fn member(mut self, member: impl Into<Declaration>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Replace the access modifier
    pub fn with_access(mut self, access: AccessModifier) -> Self {
        self.access = access;
        self
    }

    /// Move the declaration to `span`
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.identifier.span = span;
        self
    }
}

/// `access(all) entitlement name`
pub fn entitlement(name: &str) -> EntitlementDeclaration {
    EntitlementDeclaration {
        access: AccessModifier::All,
        identifier: ident(name),
        span: span(),
    }
}

/// `access(all) entitlement mapping name {}`
pub fn entitlement_mapping(name: &str) -> EntitlementMappingDeclaration {
    EntitlementMappingDeclaration {
        access: AccessModifier::All,
        identifier: ident(name),
        elements: Vec::new(),
        span: span(),
    }
}

impl EntitlementMappingDeclaration {
    /// Add `input -> output`
    pub fn relation(mut self, input: &str, output: &str) -> Self {
        self.elements.push(EntitlementMapElement::Relation {
            input: nominal(input),
            output: nominal(output),
        });
        self
    }

    /// Add `include map`
    pub fn include(mut self, map: &str) -> Self {
        self.elements.push(EntitlementMapElement::Include(nominal(map)));
        self
    }
}

/// `access(all) let name: T` (or `var`)
pub fn field(variable_kind: VariableKind, name: &str, type_annotation: TypeAnnotationExpr) -> FieldDeclaration {
    FieldDeclaration {
        access: AccessModifier::All,
        variable_kind,
        identifier: ident(name),
        type_annotation,
        span: span(),
    }
}

impl FieldDeclaration {
    /// Replace the access modifier
    pub fn with_access(mut self, access: AccessModifier) -> Self {
        self.access = access;
        self
    }
}

/// `access(all) fun name()` without a body
pub fn function(name: &str) -> FunctionDeclaration {
    FunctionDeclaration {
        access: AccessModifier::All,
        purity: FunctionPurity::Impure,
        identifier: ident(name),
        type_parameters: Vec::new(),
        parameters: Vec::new(),
        return_type: None,
        body: None,
        span: span(),
    }
}

/// `init()` without a body
pub fn initializer() -> FunctionDeclaration {
    FunctionDeclaration {
        access: AccessModifier::NotSpecified,
        ..function("init")
    }
}

impl FunctionDeclaration {
    /// Add a parameter; `label` of `Some("_")` makes it unlabelled
    pub fn parameter(mut self, label: Option<&str>, name: &str, type_annotation: TypeAnnotationExpr) -> Self {
        self.parameters.push(ParameterExpr {
            label: label.map(str::to_string),
            identifier: ident(name),
            type_annotation,
            span: span(),
        });
        self
    }

    /// Add a type parameter
    pub fn type_parameter(mut self, name: &str, type_bound: Option<TypeAnnotationExpr>) -> Self {
        self.type_parameters.push(TypeParameterExpr {
            identifier: ident(name),
            type_bound,
        });
        self
    }

    /// Set the return type
    pub fn returns(mut self, return_type: TypeAnnotationExpr) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Mark the function `view`
    pub fn view(mut self) -> Self {
        self.purity = FunctionPurity::View;
        self
    }

    /// Replace the access modifier
    pub fn with_access(mut self, access: AccessModifier) -> Self {
        self.access = access;
        self
    }

    /// Give the function a body with one statement
    pub fn with_implementation(mut self) -> Self {
        let body = self.body.get_or_insert_with(FunctionBlock::default);
        body.statements.push(Statement::Return(None, span()));
        self
    }

    /// Give the function a body with one pre-condition
    pub fn with_condition(mut self) -> Self {
        let body = self.body.get_or_insert_with(FunctionBlock::default);
        body.pre_conditions.push(boolean(true));
        self
    }

    /// Give the function a body without statements or conditions
    pub fn with_empty_body(mut self) -> Self {
        self.body.get_or_insert_with(FunctionBlock::default);
        self
    }
}

/// `let name: T = value`
pub fn constant(name: &str, type_annotation: Option<TypeAnnotationExpr>, value: Expression) -> VariableDeclaration {
    VariableDeclaration {
        access: AccessModifier::All,
        is_constant: true,
        identifier: ident(name),
        type_annotation,
        value,
        span: span(),
    }
}

/// `var name: T = value`
pub fn variable(name: &str, type_annotation: Option<TypeAnnotationExpr>, value: Expression) -> VariableDeclaration {
    VariableDeclaration {
        is_constant: false,
        ..constant(name, type_annotation, value)
    }
}

macro_rules! into_declaration {
    ($($node:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$node> for Declaration {
                fn from(node: $node) -> Self {
                    Declaration::$variant(node)
                }
            }
        )*
    };
}

into_declaration! {
    CompositeDeclaration => Composite,
    InterfaceDeclaration => Interface,
    EntitlementDeclaration => Entitlement,
    EntitlementMappingDeclaration => EntitlementMapping,
    FieldDeclaration => Field,
    FunctionDeclaration => Function,
    VariableDeclaration => Variable,
}

/// Wrap a declaration as the initializer of a composite or interface
pub fn as_initializer(function: FunctionDeclaration) -> Declaration {
    Declaration::Initializer(function)
}

/// Integer literal
pub fn int(value: i128) -> Expression {
    Expression::IntegerLiteral(IntegerLiteral {
        value,
        span: span(),
    })
}

/// Boolean literal
pub fn boolean(value: bool) -> Expression {
    Expression::BoolLiteral(BoolLiteral {
        value,
        span: span(),
    })
}

/// String literal
pub fn string(value: &str) -> Expression {
    Expression::StringLiteral(StringLiteral {
        value: value.to_string(),
        span: span(),
    })
}

/// `nil`
pub fn nil() -> Expression {
    Expression::Nil(span())
}

/// Identifier expression
pub fn value(name: &str) -> Expression {
    Expression::Identifier(ident(name))
}

fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary(BinaryExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        span: span(),
    })
}

/// `left ?? right`
pub fn coalesce(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::NilCoalescing, left, right)
}

/// `left == right`
pub fn equal(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::Equal, left, right)
}

/// `left != right`
pub fn not_equal(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::NotEqual, left, right)
}

/// `expression.name`
pub fn member(expression: Expression, name: &str) -> Expression {
    Expression::Member(MemberExpression {
        expression: Box::new(expression),
        identifier: ident(name),
        span: span(),
    })
}

/// `invoked(arguments)`
pub fn call(invoked: Expression, arguments: Vec<Argument>) -> Expression {
    call_generic(invoked, Vec::new(), arguments)
}

/// `invoked<type_arguments>(arguments)`
pub fn call_generic(invoked: Expression, type_arguments: Vec<TypeAnnotationExpr>, arguments: Vec<Argument>) -> Expression {
    Expression::Invocation(InvocationExpression {
        invoked: Box::new(invoked),
        type_arguments,
        arguments,
        span: span(),
    })
}

/// Unlabelled argument
pub fn arg(expression: Expression) -> Argument {
    Argument {
        label: None,
        expression,
    }
}

/// `label: expression`
pub fn labeled(label: &str, expression: Expression) -> Argument {
    Argument {
        label: Some(ident(label)),
        expression,
    }
}

/// `&expression as ty`
pub fn reference_to(expression: Expression, ty: TypeExpr) -> Expression {
    Expression::Reference(ReferenceExpression {
        expression: Box::new(expression),
        ty,
        span: span(),
    })
}

impl Expression {
    /// Move the expression to `span`
    pub fn at(mut self, at: Span) -> Self {
        match &mut self {
            Expression::IntegerLiteral(e) => e.span = at,
            Expression::BoolLiteral(e) => e.span = at,
            Expression::StringLiteral(e) => e.span = at,
            Expression::Nil(s) => *s = at,
            Expression::Identifier(e) => e.span = at,
            Expression::Binary(e) => e.span = at,
            Expression::Member(e) => e.span = at,
            Expression::Invocation(e) => e.span = at,
            Expression::Reference(e) => e.span = at,
        }
        self
    }
}
