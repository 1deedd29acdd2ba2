//! Declaration and expression syntax consumed by the checker
//!
//! The parser is a separate stage; it produces these nodes and the checker
//! only reads them. Every node carries the [`Span`] it was parsed from, which
//! is used for diagnostics and as the key of the elaboration tables.

pub mod builders;
pub mod declaration;
pub mod expression;
pub mod types;

pub use declaration::*;
pub use expression::*;
pub use types::*;

pub use sema_types::Span;

/// A name together with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    /// Create an identifier
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}
