//! Sema Type System
//!
//! Type representation, subtyping, member resolution and unification for
//! the sema checker of a resource-oriented contract language.

#![warn(missing_docs)]

pub mod access;
pub mod context;
pub mod display;
pub mod entitlement;
pub mod error;
pub mod kind;
pub mod location;
pub mod map;
pub mod member;
pub mod nominal;
pub mod numeric;
pub mod predicates;
pub mod registry;
pub mod span;
pub mod subtyping;
pub mod tag;
pub mod ty;
pub mod unify;

pub use access::{Access, EntitlementSetKind, PrimitiveAccess};
pub use context::TypeContext;
pub use error::TypeError;
pub use kind::{CompositeKind, DeclarationKind, VariableKind};
pub use location::{Location, TypeKey};
pub use member::{Member, MemberResolver, MemberResolverMap};
pub use nominal::{
    CompositeType, EntitlementMapType, EntitlementRelation, EntitlementType, InterfaceType,
};
pub use numeric::NumericType;
pub use registry::BaseTypeRegistry;
pub use span::Span;
pub use subtyping::SubtypingContext;
pub use tag::TypeTag;
pub use ty::{
    FunctionPurity, FunctionType, Parameter, SimpleType, Type, TypeAnnotation,
    TypeAnnotationState, TypeId, TypeParameter,
};
pub use unify::{TypeParameterBindings, Unification};

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize a tracing subscriber writing to the test output
    ///
    /// The level defaults to `debug` and can be overridden with `RUST_LOG`.
    pub fn init_test_logging() {
        use tracing_subscriber::{fmt, EnvFilter};

        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
