//! Type system errors

use crate::span::Span;
use thiserror::Error;

/// Errors reported by the type engine while resolving members and unifying types
///
/// These are never returned directly: operations that can fail hand them to a
/// caller-supplied reporter and carry on, so all problems of a program are seen.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// A type parameter was bound to two different types
    #[error("type parameter `{name}` is bound to `{bound}`, got `{actual}`")]
    TypeParameterTypeMismatch {
        /// Type parameter name
        name: String,
        /// Previously bound type
        bound: String,
        /// Newly observed type
        actual: String,
        /// Location of the offending argument
        span: Span,
    },

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

    /// An optional member that cannot be used with resources
    #[error("cannot use `{name}` on an optional resource")]
    InvalidResourceOptionalMember {
        /// Member name
        name: String,
        /// Location of the member access
        span: Span,
    },

    /// Access to a member of a restricted type's underlying type
    #[error("member of restricted type is not accessible: `{name}`")]
    InvalidRestrictedTypeMemberAccess {
        /// Member name
        name: String,
        /// Location of the member access
        span: Span,
    },

    /// A disjunctive authorization whose image under a map is not a disjunction
    #[error("cannot map `{input}` through `{map}`: output is not representable")]
    UnrepresentableEntitlementMapOutput {
        /// The input authorization
        input: String,
        /// The entitlement mapping
        map: String,
        /// Location of the access
        span: Span,
    },

    /// An array member that cannot be used with resources
    #[error("cannot use `{name}` on an array of resources")]
    InvalidResourceArrayMember {
        /// Member name
        name: String,
        /// Location of the member access
        span: Span,
    },

    /// A type that does not support `==` used where equality is needed
    #[error("`{ty}` is not equatable")]
    NotEquatableType {
        /// The type
        ty: String,
        /// Location of the use
        span: Span,
    },
}

impl TypeError {
    /// Source location of the error
    pub fn span(&self) -> Span {
        match self {
            TypeError::TypeParameterTypeMismatch { span, .. }
            | TypeError::TypeMismatch { span, .. }
            | TypeError::InvalidResourceOptionalMember { span, .. }
            | TypeError::InvalidRestrictedTypeMemberAccess { span, .. }
            | TypeError::UnrepresentableEntitlementMapOutput { span, .. }
            | TypeError::InvalidResourceArrayMember { span, .. }
            | TypeError::NotEquatableType { span, .. } => *span,
        }
    }
}
