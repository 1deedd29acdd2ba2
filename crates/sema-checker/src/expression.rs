//! Expression checking
//!
//! Expressions are checked against an optional expected type. The expected
//! type flows into literals, so `let x: UInt8 = 1` types the literal as
//! `UInt8`, and into the operands of `??`. An expression whose type is not
//! a subtype of the expected type is reported once and typed as invalid,
//! which keeps the error from cascading.

use crate::ast::*;
use crate::checker::{AccessPosition, Checker};
use crate::error::CheckError;
use crate::symbols::{Symbol, SymbolKind};
use sema_types::{
    Access, DeclarationKind, EntitlementMapType, FunctionType, NumericType, PrimitiveAccess, Span, SubtypingContext,
    Type, TypeContext, TypeError, TypeId, TypeParameterBindings,
};

impl<'r> Checker<'r> {
    /// Check a top-level `let` or `var` and bind its name
    pub(crate) fn check_variable_declaration(&mut self, declaration: &VariableDeclaration) {
        let kind = if declaration.is_constant {
            DeclarationKind::Constant
        } else {
            DeclarationKind::Variable
        };
        let access = self.resolve_access(&declaration.access, kind, &declaration.identifier, AccessPosition::Global);

        let declared = declaration
            .type_annotation
            .as_ref()
            .map(|annotation| self.resolve_annotation(annotation).ty);
        let value = self.check_expression(&declaration.value, declared);
        let ty = declared.unwrap_or(value);

        let symbol = Symbol::new(
            &declaration.identifier.name,
            SymbolKind::Variable,
            ty,
            kind,
            declaration.identifier.span,
        )
        .with_access(access)
        .with_constant(declaration.is_constant);
        match self.values.define(symbol) {
            Ok(()) => {
                self.elaboration.record_declaration(declaration.span, ty);
                self.elaboration.record_global_value(&declaration.identifier.name, ty);
            }
            Err(error) => self.redeclaration(error),
        }
    }

    /// Check an expression, returning its type
    pub(crate) fn check_expression(&mut self, expression: &Expression, expected: Option<TypeId>) -> TypeId {
        let actual = self.infer_expression(expression, expected);
        self.elaboration.record_expression(expression.span(), actual);

        match expected {
            Some(expected) if !self.is_subtype_or_invalid(actual, expected) => {
                self.report(CheckError::TypeMismatch {
                    expected: self.qualified(expected),
                    actual: self.qualified(actual),
                    span: expression.span(),
                });
                self.ctx().invalid_type()
            }
            _ => actual,
        }
    }

    fn is_subtype_or_invalid(&self, sub: TypeId, sup: TypeId) -> bool {
        self.is_invalid(sub)
            || self.is_invalid(sup)
            || SubtypingContext::new(self.ctx()).is_subtype(sub, sup)
    }

    fn infer_expression(&mut self, expression: &Expression, expected: Option<TypeId>) -> TypeId {
        match expression {
            Expression::IntegerLiteral(literal) => self.check_integer_literal(literal, expected),
            Expression::BoolLiteral(_) => self.ctx().bool_type(),
            Expression::StringLiteral(_) => self.ctx().string_type(),
            Expression::Nil(_) => self.ctx().nil_type(),
            Expression::Identifier(identifier) => match self.values.resolve(&identifier.name) {
                Some(symbol) => symbol.ty,
                None => {
                    self.report(CheckError::NotDeclared {
                        name: identifier.name.clone(),
                        kind: "value".to_string(),
                        span: identifier.span,
                    });
                    self.ctx().invalid_type()
                }
            },
            Expression::Binary(binary) => match binary.operator {
                BinaryOperator::NilCoalescing => self.check_nil_coalescing(binary, expected),
                BinaryOperator::Equal | BinaryOperator::NotEqual => self.check_equality(binary),
            },
            Expression::Member(member) => self.check_member_expression(member),
            Expression::Invocation(invocation) => self.check_invocation(invocation),
            Expression::Reference(reference) => self.check_reference_expression(reference),
        }
    }

    /// The literal takes the expected integer type, or `Int`
    fn check_integer_literal(&mut self, literal: &IntegerLiteral, expected: Option<TypeId>) -> TypeId {
        let integer = self.ctx().numeric(NumericType::Integer);
        let ty = expected
            .map(|expected| self.ctx().unwrap_optional_type(expected))
            .filter(|inner| {
                matches!(self.ctx().get(*inner), Some(Type::Numeric(_)))
                    && SubtypingContext::new(self.ctx()).is_subtype(*inner, integer)
            })
            .unwrap_or_else(|| self.ctx().int_type());

        if let Some(numeric) = self.ctx().get(ty).and_then(Type::as_numeric) {
            if !numeric.contains(literal.value) {
                self.report(CheckError::InvalidIntegerLiteralRange {
                    value: literal.value,
                    ty: self.qualified(ty),
                    span: literal.span,
                });
                return self.ctx().invalid_type();
            }
        }
        ty
    }

    /// `left ?? right`
    ///
    /// The left operand must be optional. With an expected type `T` the left
    /// operand is checked against `T?` and the right against `T`. The result
    /// is the least common supertype of the left's inner type and the right,
    /// so `x ?? false` with `x: Int?` is `AnyStruct`.
    fn check_nil_coalescing(&mut self, binary: &BinaryExpression, expected: Option<TypeId>) -> TypeId {
        let expected_left = expected.map(|expected| self.ctx_mut().optional_type(expected));
        let left = self.check_expression(&binary.left, expected_left);
        let left_is_invalid = self.is_invalid(left);

        let left_inner = match self.ctx().get(left) {
            Some(Type::Optional(inner)) => Some(*inner),
            _ => None,
        };
        if !left_is_invalid && left_inner.is_none() {
            self.report(CheckError::InvalidNilCoalescingLeftType {
                ty: self.qualified(left),
                span: binary.left.span(),
            });
        }

        let right = self.check_expression(&binary.right, expected);
        let right_is_invalid = self.is_invalid(right);

        if !right_is_invalid && self.ctx().is_resource_type(right) {
            self.report(CheckError::InvalidNilCoalescingRightResource {
                ty: self.qualified(right),
                span: binary.right.span(),
            });
        }

        let Some(left_inner) = left_inner else {
            return self.ctx().invalid_type();
        };
        if left_is_invalid || right_is_invalid {
            return self.ctx().invalid_type();
        }

        match SubtypingContext::new(self.ctx()).least_common_supertype(left_inner, right) {
            Some(result) => result,
            None => {
                self.report(CheckError::TypeMismatch {
                    expected: self.qualified(left_inner),
                    actual: self.qualified(right),
                    span: binary.right.span(),
                });
                self.ctx().invalid_type()
            }
        }
    }

    /// `left == right` and `left != right`
    ///
    /// An integer literal operand takes the type of the other operand.
    fn check_equality(&mut self, binary: &BinaryExpression) -> TypeId {
        let is_integer_literal = |e: &Expression| matches!(e, Expression::IntegerLiteral(_));

        let (left, right) = if is_integer_literal(&binary.left) && !is_integer_literal(&binary.right) {
            let right = self.check_expression(&binary.right, None);
            let left = self.check_expression(&binary.left, Some(right));
            (left, right)
        } else {
            let left = self.check_expression(&binary.left, None);
            let expected = is_integer_literal(&binary.right).then_some(left);
            let right = self.check_expression(&binary.right, expected);
            (left, right)
        };

        if !self.is_invalid(left)
            && !self.is_invalid(right)
            && !self.ctx().are_compatible_equatable_types(left, right)
        {
            self.report(CheckError::InvalidBinaryOperands {
                operator: binary.operator.symbol().to_string(),
                left: self.qualified(left),
                right: self.qualified(right),
                span: binary.span,
            });
        }
        self.ctx().bool_type()
    }

    /// `expression.name`
    ///
    /// Through a reference, members with entitlement access require the
    /// reference to be authorized for them. A member with mapped access has
    /// its mapped references authorized by the image of the reference's
    /// authorization, or by everything the mapping produces on owned values.
    fn check_member_expression(&mut self, expression: &MemberExpression) -> TypeId {
        let accessed = self.check_expression(&expression.expression, None);
        if self.is_invalid(accessed) {
            return accessed;
        }

        let (target, authorization) = match self.ctx().get(accessed) {
            Some(Type::Reference { ty, authorization }) => (*ty, Some(authorization.clone())),
            _ => (accessed, None),
        };

        let name = &expression.identifier.name;
        let span = expression.identifier.span;
        let mut type_errors: Vec<TypeError> = Vec::new();
        let member = self
            .ctx_mut()
            .resolve_member(target, name, span, &mut |error| type_errors.push(error));
        for error in type_errors {
            self.report(error);
        }

        let Some(member) = member else {
            self.report(CheckError::NotDeclaredMember {
                name: name.clone(),
                ty: self.qualified(accessed),
                span,
            });
            return self.ctx().invalid_type();
        };

        let held = authorization.clone().unwrap_or(Access::UNAUTHORIZED);
        let permitted = match &member.access {
            Access::Primitive(PrimitiveAccess::Private) | Access::Primitive(PrimitiveAccess::Contract) => {
                member.predeclared
            }
            Access::Primitive(_) => true,
            Access::EntitlementSet { .. } => match &authorization {
                Some(authorization) => member.access.permits_access(authorization),
                None => true,
            },
            Access::EntitlementMap(_) => true,
        };
        if !permitted {
            self.report(CheckError::InvalidAccess {
                member: name.clone(),
                required: self.ctx().access_string(&member.access),
                held: self.ctx().access_string(&held),
                span,
            });
            return self.ctx().invalid_type();
        }

        match member.access {
            Access::EntitlementMap(map) => self.map_member_type(member.ty(), map, authorization.as_ref(), span),
            _ => member.ty(),
        }
    }

    fn map_member_type(&mut self, ty: TypeId, map: TypeId, authorization: Option<&Access>, span: Span) -> TypeId {
        let mut type_errors: Vec<TypeError> = Vec::new();
        let image = match authorization {
            Some(authorization) => {
                self.ctx()
                    .entitlement_map_image(map, authorization, span, &mut |error| type_errors.push(error))
            }
            None => match self.ctx().as_entitlement_map(map).map(EntitlementMapType::codomain) {
                Some(codomain) if !codomain.entitlements().is_empty() => codomain,
                _ => Access::UNAUTHORIZED,
            },
        };
        for error in type_errors {
            self.report(error);
        }

        self.ctx_mut().map_type(ty, &mut |ctx: &mut TypeContext, t: TypeId| {
            let mapped = match ctx.get(t) {
                Some(Type::Reference {
                    ty: referenced,
                    authorization: Access::EntitlementMap(m),
                }) if *m == map => Some(*referenced),
                _ => None,
            };
            match mapped {
                Some(referenced) => ctx.reference_type(referenced, image.clone()),
                None => t,
            }
        })
    }

    /// `f<T>(label: argument)`
    fn check_invocation(&mut self, invocation: &InvocationExpression) -> TypeId {
        let invoked = self.check_expression(&invocation.invoked, None);
        if self.is_invalid(invoked) {
            self.check_arguments_unexpected(&invocation.arguments);
            return self.ctx().invalid_type();
        }

        let Some(function) = self.ctx().get(invoked).and_then(Type::as_function).cloned() else {
            self.report(CheckError::NotCallable {
                ty: self.qualified(invoked),
                span: invocation.span,
            });
            self.check_arguments_unexpected(&invocation.arguments);
            return self.ctx().invalid_type();
        };

        self.check_argument_count(&function, invocation);
        self.check_argument_labels(&function, &invocation.arguments);

        let mut bindings = TypeParameterBindings::new();
        self.bind_type_arguments(&function, invocation, &mut bindings);

        for (index, argument) in invocation.arguments.iter().enumerate() {
            let Some(parameter) = function.parameters.get(index) else {
                self.check_expression(&argument.expression, None);
                continue;
            };
            let parameter_type = parameter.type_annotation.ty;

            if let Some(resolved) = self.ctx_mut().resolve(parameter_type, &bindings) {
                self.check_expression(&argument.expression, Some(resolved));
                continue;
            }

            // The parameter mentions an unbound type parameter: infer it from the argument
            let argument_type = self.check_expression(&argument.expression, None);
            if self.is_invalid(argument_type) {
                continue;
            }
            let unification = self
                .ctx()
                .unify(parameter_type, argument_type, &mut bindings, argument.expression.span());
            let failed = !unification.is_ok();
            for error in unification.errors {
                self.report(error);
            }
            if failed {
                continue;
            }
            if let Some(resolved) = self.ctx_mut().resolve(parameter_type, &bindings) {
                if !self.is_subtype_or_invalid(argument_type, resolved) {
                    self.report(CheckError::TypeMismatch {
                        expected: self.qualified(resolved),
                        actual: self.qualified(argument_type),
                        span: argument.expression.span(),
                    });
                }
            }
        }

        for type_parameter in &function.type_parameters {
            if !type_parameter.optional && !bindings.contains_key(type_parameter) {
                self.report(CheckError::TypeParameterTypeInference {
                    name: type_parameter.name.clone(),
                    span: invocation.span,
                });
            }
        }

        match self.ctx_mut().resolve(function.return_type.ty, &bindings) {
            Some(ty) => ty,
            None => self.ctx().invalid_type(),
        }
    }

    fn check_arguments_unexpected(&mut self, arguments: &[Argument]) {
        for argument in arguments {
            self.check_expression(&argument.expression, None);
        }
    }

    fn check_argument_count(&mut self, function: &FunctionType, invocation: &InvocationExpression) {
        let parameters = function.parameters.len();
        let required = function.required_argument_count.unwrap_or(parameters);
        let actual = invocation.arguments.len();

        let expected = if actual < required {
            required
        } else if actual > parameters {
            parameters
        } else {
            return;
        };
        self.report(CheckError::ArgumentCountMismatch {
            expected,
            actual,
            span: invocation.span,
        });
    }

    fn check_argument_labels(&mut self, function: &FunctionType, arguments: &[Argument]) {
        for (argument, parameter) in arguments.iter().zip(&function.parameters) {
            let expected = parameter.effective_argument_label();
            let requires_label = !expected.is_empty() && expected != sema_types::ty::ARGUMENT_LABEL_NOT_REQUIRED;

            match (&argument.label, requires_label) {
                (None, true) => self.report(CheckError::MissingArgumentLabel {
                    expected: expected.to_string(),
                    span: argument.expression.span(),
                }),
                (Some(label), true) if label.name != expected => {
                    self.report(CheckError::IncorrectArgumentLabel {
                        expected: expected.to_string(),
                        actual: label.name.clone(),
                        span: label.span,
                    })
                }
                (Some(label), false) => self.report(CheckError::IncorrectArgumentLabel {
                    expected: sema_types::ty::ARGUMENT_LABEL_NOT_REQUIRED.to_string(),
                    actual: label.name.clone(),
                    span: label.span,
                }),
                _ => {}
            }
        }
    }

    /// Bind explicit type arguments, checking them against their bounds
    fn bind_type_arguments(
        &mut self,
        function: &FunctionType,
        invocation: &InvocationExpression,
        bindings: &mut TypeParameterBindings,
    ) {
        if invocation.type_arguments.is_empty() {
            return;
        }

        let expected = function.type_parameters.len();
        let actual = invocation.type_arguments.len();
        if expected != actual {
            let span = invocation
                .type_arguments
                .first()
                .map(|argument| argument.span)
                .unwrap_or(invocation.span);
            self.report(CheckError::InvalidTypeArgumentCount { expected, actual, span });
            return;
        }

        for (type_parameter, argument) in function.type_parameters.iter().zip(&invocation.type_arguments) {
            let ty = self.resolve_annotation(argument).ty;
            if self.is_invalid(ty) {
                continue;
            }

            let mut bound_errors = Vec::new();
            self.ctx()
                .check_type_bound(ty, type_parameter.type_bound, argument.span, &mut bound_errors);
            if !bound_errors.is_empty() {
                for error in bound_errors {
                    self.report(error);
                }
                continue;
            }
            bindings.insert(type_parameter.clone(), ty);
        }
    }

    /// `&expression as &T`
    fn check_reference_expression(&mut self, reference: &ReferenceExpression) -> TypeId {
        let target = self.resolve_type(&reference.ty);
        if self.is_invalid(target) {
            self.check_expression(&reference.expression, None);
            return target;
        }

        let Some(Type::Reference { ty: referenced, .. }) = self.ctx().get(target) else {
            self.report(CheckError::NonReferenceTypeReference {
                ty: self.qualified(target),
                span: reference.ty.span,
            });
            self.check_expression(&reference.expression, None);
            return self.ctx().invalid_type();
        };
        let referenced = *referenced;

        let value = self.check_expression(&reference.expression, Some(referenced));
        if self.is_invalid(value) {
            return self.ctx().invalid_type();
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::config::CheckerConfig;
    use crate::test_utils::init_test_logging;
    use sema_types::{BaseTypeRegistry, CompositeKind, VariableKind};

    fn check(program: &Program) -> Result<crate::Elaboration, Vec<CheckError>> {
        init_test_logging();
        let registry = BaseTypeRegistry::new();
        Checker::new(&registry, CheckerConfig::default()).check_program(program)
    }

    #[test]
    fn test_literal_takes_expected_type() {
        let literal = int(-3);
        let literal_span = literal.span();
        let program = program(vec![
            constant("a", Some(annotation(named("UInt8"))), int(255)).into(),
            constant("b", Some(annotation(optional(named("Int16")))), literal).into(),
            constant("c", None, int(7)).into(),
        ]);
        let elaboration = check(&program).unwrap();
        assert_eq!(elaboration.value_type_string("a").as_deref(), Some("UInt8"));
        assert_eq!(elaboration.value_type_string("b").as_deref(), Some("Int16?"));
        assert_eq!(elaboration.value_type_string("c").as_deref(), Some("Int"));

        // The literal itself is unwrapped from the optional
        let literal_type = elaboration.expression_type(literal_span).unwrap();
        assert_eq!(elaboration.context().qualified_string(literal_type), "Int16");
    }

    #[test]
    fn test_literal_out_of_range() {
        let program = program(vec![constant("a", Some(annotation(named("UInt8"))), int(256)).into()]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CheckError::InvalidIntegerLiteralRange { value: 256, .. }));
    }

    #[test]
    fn test_mismatch_is_reported_once() {
        let program = program(vec![constant("a", Some(annotation(named("Bool"))), string("no")).into()]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_type_mismatch());
    }

    #[test]
    fn test_undeclared_value() {
        let program = program(vec![constant("a", None, value("b")).into()]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(&errors[0], CheckError::NotDeclared { kind, .. } if kind == "value"));
    }

    #[test]
    fn test_equality_operands() {
        let undeclared_first = program(vec![
            constant("a", None, equal(int(1), value("x"))).into(),
            constant("x", None, int(1)).into(),
        ]);
        // `x` is declared after `a`
        let errors = check(&undeclared_first).unwrap_err();
        assert_eq!(errors.len(), 1);

        let program = program(vec![
            constant("x", Some(annotation(named("UInt8"))), int(1)).into(),
            constant("a", None, equal(int(1), value("x"))).into(),
            constant("b", None, not_equal(value("x"), nil())).into(),
            constant("c", None, equal(value("x"), string("1"))).into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], CheckError::InvalidBinaryOperands { operator, .. } if operator == "=="));
    }

    #[test]
    fn test_entitled_member_access() {
        let s = composite(CompositeKind::Structure, "S")
            .member(
                function("withdraw")
                    .with_access(entitlement_access(&["Withdraw"]))
                    .with_implementation(),
            )
            .member(function("balance").view().with_implementation());
        let program = program(vec![
            entitlement("Withdraw").into(),
            s.into(),
            constant("s", None, call(value("S"), vec![])).into(),
            constant("plain", None, reference_to(value("s"), reference(named("S")))).into(),
            constant(
                "authorized",
                None,
                reference_to(value("s"), auth_reference(&["Withdraw"], named("S"))),
            )
            .into(),
            constant("ok", None, call(member(value("authorized"), "withdraw"), vec![])).into(),
            constant("view", None, call(member(value("plain"), "balance"), vec![])).into(),
            constant("denied", None, member(value("plain"), "withdraw")).into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            CheckError::InvalidAccess { member, required, held, .. } => {
                assert_eq!(member, "withdraw");
                assert!(required.contains("Withdraw"));
                assert_eq!(held, "access(all)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_private_member_is_inaccessible() {
        let program = program(vec![
            composite(CompositeKind::Structure, "S")
                .member(
                    field(VariableKind::Constant, "secret", annotation(named("Int")))
                        .with_access(AccessModifier::Private),
                )
                .into(),
            constant("s", None, call(value("S"), vec![])).into(),
            constant("x", None, member(value("s"), "secret")).into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(&errors[0], CheckError::InvalidAccess { member, .. } if member == "secret"));
    }

    #[test]
    fn test_undeclared_member() {
        let program = program(vec![
            composite(CompositeKind::Structure, "S").into(),
            constant("s", None, call(value("S"), vec![])).into(),
            constant("x", None, member(value("s"), "nope")).into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(&errors[0], CheckError::NotDeclaredMember { name, ty, .. } if name == "nope" && ty == "S"));
    }

    #[test]
    fn test_reference_to_non_reference_type() {
        let program = program(vec![
            constant("x", None, int(1)).into(),
            constant("r", None, reference_to(value("x"), named("Int"))).into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(errors[0], CheckError::NonReferenceTypeReference { .. }));
    }

    #[test]
    fn test_not_callable() {
        let program = program(vec![
            constant("x", None, int(1)).into(),
            constant("y", None, call(value("x"), vec![])).into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(errors[0], CheckError::NotCallable { .. }));
    }

    #[test]
    fn test_redeclared_variable() {
        let program = program(vec![
            constant("x", None, int(1)).into(),
            variable("x", None, int(2)).into(),
        ]);
        let errors = check(&program).unwrap_err();
        assert!(matches!(&errors[0], CheckError::Redeclaration { kind, .. } if kind == "variable"));
    }
}
