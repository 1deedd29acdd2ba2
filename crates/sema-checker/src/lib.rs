//! Sema Checker
//!
//! Static checking of programs in a resource-oriented contract language.
//!
//! This crate provides:
//! - Symbol tables with scope management
//! - Declaration of composites, interfaces, entitlements and mappings
//! - Interface conformance checking
//! - Type checking for global variable initializers
//! - Diagnostics rendered through codespan
//!
//! # Usage
//!
//! ```ignore
//! use sema_checker::{Checker, CheckerConfig};
//! use sema_types::BaseTypeRegistry;
//!
//! let registry = BaseTypeRegistry::new();
//! let config = CheckerConfig::from_str(source)?;
//!
//! match Checker::new(&registry, config).check_program(&program) {
//!     Ok(elaboration) => println!("{:?}", elaboration.value_type_string("x")),
//!     Err(errors) => {
//!         for error in &errors {
//!             Diagnostic::from_check_error(error, file_id).emit(&files)?;
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]

pub mod ast;
pub mod checker;
pub mod config;
pub mod diagnostic;
pub mod elaboration;
pub mod error;
pub mod symbols;

mod binder;
mod conformance;
mod expression;
mod resolve;

// Re-export main types
pub use binder::RESOURCE_DESTROYED_EVENT;
pub use checker::Checker;
pub use config::{AccessCheckMode, CheckerConfig, ConfigError};
pub use diagnostic::{Diagnostic, ErrorCode};
pub use elaboration::Elaboration;
pub use error::CheckError;
pub use symbols::{Symbol, SymbolKind, SymbolTable, Scope, ScopeId, ScopeKind};

#[cfg(test)]
pub mod test_utils {
    /// Initialize a tracing subscriber writing to the test output
    pub fn init_test_logging() {
        use tracing_subscriber::{fmt, EnvFilter};

        let _ = fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .with_test_writer()
            .try_init();
    }
}
