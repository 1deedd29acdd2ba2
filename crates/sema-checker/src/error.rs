//! Checker errors
//!
//! Errors are accumulated: every pass pushes what it finds and carries on,
//! and [`crate::Checker::check_program`] returns them all at once.

use crate::diagnostic::ErrorCode;
use sema_types::{Span, TypeError};
use thiserror::Error;

/// Errors found while checking a program
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckError {
    // ----- declarations -----
    /// A name declared twice in the same scope
    #[error("cannot redeclare {kind} `{name}`: it is already declared")]
    Redeclaration {
        /// Declared name
        name: String,
        /// Kind of the second declaration
        kind: String,
        /// Location of the first declaration
        original: Span,
        /// Location of the second declaration
        span: Span,
    },

    /// Use of an undeclared type or value
    #[error("cannot find {kind} in this scope: `{name}`")]
    NotDeclared {
        /// Name as written
        name: String,
        /// `type` or `value`
        kind: String,
        /// Location of the use
        span: Span,
    },

    /// A declaration without an access modifier in strict mode
    #[error("missing access modifier for {kind} `{name}`")]
    MissingAccessModifier {
        /// Declaration kind
        kind: String,
        /// Declared name
        name: String,
        /// Location of the declaration
        span: Span,
    },

    /// An access modifier that is not allowed on this declaration
    #[error("invalid access modifier for {kind}: `{access}`")]
    InvalidAccessModifier {
        /// The modifier as written
        access: String,
        /// Declaration kind
        kind: String,
        /// Location of the declaration
        span: Span,
    },

    /// A declaration nested where it is not allowed
    #[error("{nested} declarations cannot be nested inside {container} declarations")]
    InvalidNestedDeclaration {
        /// Kind of the nested declaration
        nested: String,
        /// Kind of the enclosing declaration
        container: String,
        /// Location of the nested declaration
        span: Span,
    },

    /// A declaration that is not allowed at this position
    #[error("{kind} declarations are not allowed here")]
    InvalidDeclaration {
        /// Declaration kind
        kind: String,
        /// Location of the declaration
        span: Span,
    },

    /// An interface of a kind that has no interfaces
    #[error("{kind} interfaces are not supported")]
    InvalidInterfaceDeclaration {
        /// Composite kind of the interface
        kind: String,
        /// Location of the declaration
        span: Span,
    },

    /// An interface function with an empty body
    #[error("function `{name}` in an interface has an empty implementation")]
    InvalidImplementation {
        /// Function name
        name: String,
        /// Location of the function
        span: Span,
    },

    /// A default destroy event declared in a non-resource interface
    #[error("default destroy events may only be declared in resource interfaces, not in {kind} interfaces")]
    DefaultDestroyEventInNonResource {
        /// Composite kind of the interface
        kind: String,
        /// Location of the event
        span: Span,
    },

    /// An attachment declared while attachments are disabled
    #[error("attachments are not enabled")]
    AttachmentsNotEnabled {
        /// Location of the attachment
        span: Span,
    },

    /// A resource-typed field in a non-resource type
    #[error("field `{name}` of {kind} type cannot have a resource type")]
    InvalidResourceField {
        /// Field name
        name: String,
        /// Composite kind of the container
        kind: String,
        /// Location of the field
        span: Span,
    },

    // ----- types and expressions -----
    /// Type mismatch between expected and actual types
    #[error("mismatched types: expected `{expected}`, got `{actual}`")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
        /// Location of the offending expression
        span: Span,
    },

    /// A resource type annotated without `@`
    #[error("missing resource annotation: `@` before `{ty}`")]
    MissingResourceAnnotation {
        /// The annotated type
        ty: String,
        /// Location of the annotation
        span: Span,
    },

    /// A non-resource type annotated with `@`
    #[error("invalid resource annotation: `{ty}` is not a resource type")]
    InvalidResourceAnnotation {
        /// The annotated type
        ty: String,
        /// Location of the annotation
        span: Span,
    },

    /// An attachment used as a type
    #[error("cannot use attachment type `{ty}` as a type annotation")]
    DirectAttachmentTypeAnnotation {
        /// The annotated type
        ty: String,
        /// Location of the annotation
        span: Span,
    },

    /// A non-optional left-hand side of `??`
    #[error("left-hand side of nil-coalescing must be optional, got `{ty}`")]
    InvalidNilCoalescingLeftType {
        /// Type of the left operand
        ty: String,
        /// Location of the left operand
        span: Span,
    },

    /// A resource-typed right-hand side of `??`
    #[error("right-hand side of nil-coalescing cannot be a resource, got `{ty}`")]
    InvalidNilCoalescingRightResource {
        /// Type of the right operand
        ty: String,
        /// Location of the right operand
        span: Span,
    },

    /// Operand types a binary operator does not accept
    #[error("cannot apply `{operator}` to `{left}` and `{right}`")]
    InvalidBinaryOperands {
        /// Operator as written
        operator: String,
        /// Left operand type
        left: String,
        /// Right operand type
        right: String,
        /// Location of the expression
        span: Span,
    },

    /// Invocation of a value that is not a function
    #[error("cannot call type `{ty}`")]
    NotCallable {
        /// Type of the invoked value
        ty: String,
        /// Location of the invocation
        span: Span,
    },

    /// Wrong number of arguments
    #[error("incorrect number of arguments: expected {expected}, got {actual}")]
    ArgumentCountMismatch {
        /// Number of parameters, or the minimum when some are optional
        expected: usize,
        /// Number of arguments
        actual: usize,
        /// Location of the invocation
        span: Span,
    },

    /// An argument without the label its parameter requires
    #[error("missing argument label: `{expected}`")]
    MissingArgumentLabel {
        /// The required label
        expected: String,
        /// Location of the argument
        span: Span,
    },

    /// An argument with the wrong label
    #[error("incorrect argument label: expected `{expected}`, got `{actual}`")]
    IncorrectArgumentLabel {
        /// The required label, `_` when none is allowed
        expected: String,
        /// The label written
        actual: String,
        /// Location of the label
        span: Span,
    },

    /// Access to a member the type does not have
    #[error("value of type `{ty}` has no member `{name}`")]
    NotDeclaredMember {
        /// Member name
        name: String,
        /// Type of the accessed value
        ty: String,
        /// Location of the member name
        span: Span,
    },

    /// An integer literal outside the range of its type
    #[error("integer literal `{value}` is out of range for `{ty}`")]
    InvalidIntegerLiteralRange {
        /// The literal
        value: i128,
        /// Inferred type
        ty: String,
        /// Location of the literal
        span: Span,
    },

    /// A restriction that is not an interface
    #[error("cannot restrict using non-interface type `{ty}`")]
    InvalidRestrictionType {
        /// The restriction
        ty: String,
        /// Location of the restriction
        span: Span,
    },

    /// The same restriction listed twice
    #[error("duplicate restriction `{ty}`")]
    InvalidRestrictionTypeDuplicate {
        /// The restriction
        ty: String,
        /// Location of the second occurrence
        span: Span,
    },

    /// A restricted type over something other than a composite, `AnyStruct` or `AnyResource`
    #[error("cannot restrict type `{ty}`")]
    InvalidRestrictedType {
        /// The underlying type
        ty: String,
        /// Location of the restricted type
        span: Span,
    },

    /// A restriction the underlying composite does not conform to
    #[error("restricted type does not conform to restricting type: `{ty}` does not conform to `{restriction}`")]
    InvalidNonConformingRestriction {
        /// The underlying composite
        ty: String,
        /// The restriction
        restriction: String,
        /// Location of the restriction
        span: Span,
    },

    /// A reference expression whose target is not a reference type
    #[error("cannot create reference: `{ty}` is not a reference type")]
    NonReferenceTypeReference {
        /// The target type
        ty: String,
        /// Location of the target type
        span: Span,
    },

    // ----- conformance -----
    /// A conformance of a different composite kind
    #[error("mismatched composite kinds: expected `{expected}`, got `{actual}`")]
    CompositeKindMismatch {
        /// Kind of the conforming declaration
        expected: String,
        /// Kind of the interface
        actual: String,
        /// Location of the conformance
        span: Span,
    },

    /// An interface conforming to itself
    #[error("`{interface}` has a cyclic conformance to itself")]
    CyclicConformance {
        /// The interface
        interface: String,
        /// Location of the conformance
        span: Span,
    },

    /// Two members of the same name that cannot be combined
    #[error("`{interface}` {member_kind} `{name}` conflicts with a {member_kind} with the same name in `{conflicting_interface}`")]
    InterfaceMemberConflict {
        /// Interface providing the member
        interface: String,
        /// Interface providing the conflicting member
        conflicting_interface: String,
        /// Member name
        name: String,
        /// Member declaration kind
        member_kind: String,
        /// Location of the conformance or member
        span: Span,
    },

    /// A composite that does not implement an interface
    #[error("`{composite}` does not conform to `{interface}`")]
    Conformance {
        /// The composite
        composite: String,
        /// The interface
        interface: String,
        /// Required members the composite lacks
        missing_members: Vec<String>,
        /// Members declared with an incompatible signature
        mismatched_members: Vec<String>,
        /// Whether the initializer parameters differ
        initializer_mismatch: bool,
        /// Location of the composite
        span: Span,
    },

    /// A conformance that is not an interface
    #[error("cannot conform to non-interface type `{ty}`")]
    InvalidConformance {
        /// The conformance
        ty: String,
        /// Location of the conformance
        span: Span,
    },

    /// Two conformances providing a default for the same member
    #[error("`{composite}` inherits conflicting default implementations of `{name}`")]
    DefaultFunctionConflict {
        /// The composite
        composite: String,
        /// Member name
        name: String,
        /// Location of the composite
        span: Span,
    },

    /// An interface listed twice as a conformance
    #[error("duplicate conformance to `{interface}`")]
    DuplicateConformance {
        /// The interface
        interface: String,
        /// Location of the second occurrence
        span: Span,
    },

    // ----- entitlements -----
    /// An entitlement or entitlement map used as a type
    #[error("cannot use entitlement `{ty}` as a type")]
    DirectEntitlementAnnotation {
        /// The annotated type
        ty: String,
        /// Location of the annotation
        span: Span,
    },

    /// A map relation between non-entitlements
    #[error("cannot use non-entitlement type `{ty}` in an entitlement mapping")]
    InvalidNonEntitlementTypeInMap {
        /// The offending type
        ty: String,
        /// Location of the type
        span: Span,
    },

    /// An entitlement mapping that includes itself
    #[error("entitlement mapping `{map}` includes itself")]
    CyclicEntitlementMappingInclusion {
        /// The mapping
        map: String,
        /// Location of the inclusion
        span: Span,
    },

    /// The same mapping included twice
    #[error("entitlement mapping `{map}` includes `{included}` more than once")]
    DuplicateEntitlementMappingInclusion {
        /// The including mapping
        map: String,
        /// The included mapping
        included: String,
        /// Location of the second inclusion
        span: Span,
    },

    /// An inclusion of something other than a mapping
    #[error("cannot include non-mapping type `{ty}`")]
    InvalidEntitlementMappingInclusion {
        /// The included type
        ty: String,
        /// Location of the inclusion
        span: Span,
    },

    /// Member access without the required entitlements
    #[error("cannot access `{member}`: requires `{required}`, reference has `{held}`")]
    InvalidAccess {
        /// Member name
        member: String,
        /// Access of the member
        required: String,
        /// Authorization held
        held: String,
        /// Location of the access
        span: Span,
    },

    /// A non-entitlement used in an access modifier or authorization
    #[error("`{ty}` is not an entitlement")]
    InvalidNonEntitlementAccess {
        /// The offending type
        ty: String,
        /// Location of the type
        span: Span,
    },

    /// A mapped authorization outside a member with the same mapped access
    #[error("`auth(mapping {map})` is only allowed in members with `access(mapping {map})`")]
    InvalidMappedAuthorization {
        /// The mapping
        map: String,
        /// Location of the authorization
        span: Span,
    },

    // ----- generics -----
    /// A type parameter that could not be inferred
    #[error("cannot infer type parameter `{name}`")]
    TypeParameterTypeInference {
        /// Type parameter name
        name: String,
        /// Location of the invocation
        span: Span,
    },

    /// Wrong number of type arguments
    #[error("incorrect number of type arguments: expected {expected}, got {actual}")]
    InvalidTypeArgumentCount {
        /// Number of type parameters
        expected: usize,
        /// Number of type arguments
        actual: usize,
        /// Location of the type arguments
        span: Span,
    },

    /// Error raised by the type engine
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl CheckError {
    /// Source location of the error
    pub fn span(&self) -> Span {
        use CheckError::*;

        match self {
            Redeclaration { span, .. }
            | NotDeclared { span, .. }
            | MissingAccessModifier { span, .. }
            | InvalidAccessModifier { span, .. }
            | InvalidNestedDeclaration { span, .. }
            | InvalidDeclaration { span, .. }
            | InvalidInterfaceDeclaration { span, .. }
            | InvalidImplementation { span, .. }
            | DefaultDestroyEventInNonResource { span, .. }
            | AttachmentsNotEnabled { span }
            | InvalidResourceField { span, .. }
            | TypeMismatch { span, .. }
            | MissingResourceAnnotation { span, .. }
            | InvalidResourceAnnotation { span, .. }
            | DirectAttachmentTypeAnnotation { span, .. }
            | InvalidNilCoalescingLeftType { span, .. }
            | InvalidNilCoalescingRightResource { span, .. }
            | InvalidBinaryOperands { span, .. }
            | NotCallable { span, .. }
            | ArgumentCountMismatch { span, .. }
            | MissingArgumentLabel { span, .. }
            | IncorrectArgumentLabel { span, .. }
            | NotDeclaredMember { span, .. }
            | InvalidIntegerLiteralRange { span, .. }
            | InvalidRestrictionType { span, .. }
            | InvalidRestrictionTypeDuplicate { span, .. }
            | InvalidRestrictedType { span, .. }
            | InvalidNonConformingRestriction { span, .. }
            | NonReferenceTypeReference { span, .. }
            | CompositeKindMismatch { span, .. }
            | CyclicConformance { span, .. }
            | InterfaceMemberConflict { span, .. }
            | Conformance { span, .. }
            | InvalidConformance { span, .. }
            | DefaultFunctionConflict { span, .. }
            | DuplicateConformance { span, .. }
            | DirectEntitlementAnnotation { span, .. }
            | InvalidNonEntitlementTypeInMap { span, .. }
            | CyclicEntitlementMappingInclusion { span, .. }
            | DuplicateEntitlementMappingInclusion { span, .. }
            | InvalidEntitlementMappingInclusion { span, .. }
            | InvalidAccess { span, .. }
            | InvalidNonEntitlementAccess { span, .. }
            | InvalidMappedAuthorization { span, .. }
            | TypeParameterTypeInference { span, .. }
            | InvalidTypeArgumentCount { span, .. } => *span,
            Type(error) => error.span(),
        }
    }

    /// Stable error code
    ///
    /// `E1xxx` declarations, `E2xxx` types and expressions, `E3xxx`
    /// conformance, `E4xxx` entitlements and access, `E5xxx` generics.
    pub fn code(&self) -> ErrorCode {
        use CheckError::*;

        match self {
            Redeclaration { .. } => ErrorCode("E1001"),
            NotDeclared { .. } => ErrorCode("E1002"),
            MissingAccessModifier { .. } => ErrorCode("E1003"),
            InvalidAccessModifier { .. } => ErrorCode("E1004"),
            InvalidNestedDeclaration { .. } => ErrorCode("E1005"),
            InvalidInterfaceDeclaration { .. } => ErrorCode("E1006"),
            InvalidImplementation { .. } => ErrorCode("E1007"),
            DefaultDestroyEventInNonResource { .. } => ErrorCode("E1008"),
            AttachmentsNotEnabled { .. } => ErrorCode("E1009"),
            InvalidResourceField { .. } => ErrorCode("E1010"),
            InvalidDeclaration { .. } => ErrorCode("E1011"),

            TypeMismatch { .. } => ErrorCode("E2001"),
            MissingResourceAnnotation { .. } => ErrorCode("E2002"),
            InvalidResourceAnnotation { .. } => ErrorCode("E2003"),
            InvalidNilCoalescingLeftType { .. } => ErrorCode("E2004"),
            InvalidNilCoalescingRightResource { .. } => ErrorCode("E2005"),
            InvalidBinaryOperands { .. } => ErrorCode("E2006"),
            NotCallable { .. } => ErrorCode("E2007"),
            ArgumentCountMismatch { .. } => ErrorCode("E2008"),
            MissingArgumentLabel { .. } => ErrorCode("E2009"),
            IncorrectArgumentLabel { .. } => ErrorCode("E2010"),
            NotDeclaredMember { .. } => ErrorCode("E2011"),
            InvalidIntegerLiteralRange { .. } => ErrorCode("E2012"),
            InvalidRestrictionType { .. } => ErrorCode("E2013"),
            InvalidRestrictionTypeDuplicate { .. } => ErrorCode("E2014"),
            NonReferenceTypeReference { .. } => ErrorCode("E2015"),
            DirectAttachmentTypeAnnotation { .. } => ErrorCode("E2016"),
            InvalidRestrictedType { .. } => ErrorCode("E2017"),
            InvalidNonConformingRestriction { .. } => ErrorCode("E2018"),

            CompositeKindMismatch { .. } => ErrorCode("E3001"),
            CyclicConformance { .. } => ErrorCode("E3002"),
            InterfaceMemberConflict { .. } => ErrorCode("E3003"),
            Conformance { .. } => ErrorCode("E3004"),
            InvalidConformance { .. } => ErrorCode("E3005"),
            DefaultFunctionConflict { .. } => ErrorCode("E3006"),
            DuplicateConformance { .. } => ErrorCode("E3007"),

            DirectEntitlementAnnotation { .. } => ErrorCode("E4001"),
            InvalidNonEntitlementTypeInMap { .. } => ErrorCode("E4002"),
            CyclicEntitlementMappingInclusion { .. } => ErrorCode("E4003"),
            DuplicateEntitlementMappingInclusion { .. } => ErrorCode("E4004"),
            InvalidEntitlementMappingInclusion { .. } => ErrorCode("E4006"),
            InvalidAccess { .. } => ErrorCode("E4007"),
            InvalidNonEntitlementAccess { .. } => ErrorCode("E4008"),
            InvalidMappedAuthorization { .. } => ErrorCode("E4009"),

            TypeParameterTypeInference { .. } => ErrorCode("E5002"),
            InvalidTypeArgumentCount { .. } => ErrorCode("E5003"),

            Type(error) => match error {
                TypeError::TypeMismatch { .. } => ErrorCode("E2001"),
                TypeError::InvalidResourceOptionalMember { .. } => ErrorCode("E2020"),
                TypeError::InvalidRestrictedTypeMemberAccess { .. } => ErrorCode("E2021"),
                TypeError::InvalidResourceArrayMember { .. } => ErrorCode("E2022"),
                TypeError::NotEquatableType { .. } => ErrorCode("E2023"),
                TypeError::UnrepresentableEntitlementMapOutput { .. } => ErrorCode("E4005"),
                TypeError::TypeParameterTypeMismatch { .. } => ErrorCode("E5001"),
            },
        }
    }

    /// Whether this is a type mismatch, raised by the checker or the type engine
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            CheckError::TypeMismatch { .. } | CheckError::Type(TypeError::TypeMismatch { .. })
        )
    }
}
