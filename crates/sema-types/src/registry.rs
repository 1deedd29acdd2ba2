//! Base activations: the types and values every program can refer to

use crate::context::TypeContext;
use crate::numeric::NumericType;
use crate::ty::{FunctionPurity, FunctionType, Parameter, SimpleType, TypeId};
use indexmap::IndexMap;

/// Names of the base types and values, resolved in a shared type context
///
/// Checkers start every program from a clone of [`BaseTypeRegistry::context`]
/// so base types keep the same ids across programs.
#[derive(Debug, Clone)]
pub struct BaseTypeRegistry {
    context: TypeContext,
    types: IndexMap<String, TypeId>,
    values: IndexMap<String, TypeId>,
}

impl Default for BaseTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseTypeRegistry {
    /// Build the registry with all built-in types and functions
    pub fn new() -> Self {
        let mut context = TypeContext::new();
        let mut types = IndexMap::new();

        for simple in SimpleType::ALL {
            // Invalid is produced by the checker, never written
            if simple == SimpleType::Invalid {
                continue;
            }
            types.insert(simple.name().to_string(), context.simple(simple));
        }
        for numeric in NumericType::ALL {
            types.insert(numeric.name().to_string(), context.numeric(numeric));
        }
        types.insert(
            "Capability".to_string(),
            context.unparameterized_capability_type(),
        );
        types.insert("Identity".to_string(), context.identity_map());

        let mut values = IndexMap::new();

        let string = context.type_annotation(context.string_type());
        let never = context.type_annotation(context.never_type());
        let panic = FunctionType::new(
            FunctionPurity::View,
            vec![Parameter::unlabeled("message", string)],
            never,
        );
        values.insert("panic".to_string(), context.function_type(panic));

        let bool_type = context.type_annotation(context.bool_type());
        let void = context.type_annotation(context.void_type());
        let mut assert = FunctionType::new(
            FunctionPurity::View,
            vec![
                Parameter::unlabeled("condition", bool_type),
                Parameter::new(None, "message", string),
            ],
            void,
        );
        assert.required_argument_count = Some(1);
        values.insert("assert".to_string(), context.function_type(assert));

        tracing::debug!(
            types = types.len(),
            values = values.len(),
            "base activations ready"
        );

        Self {
            context,
            types,
            values,
        }
    }

    /// Type context holding the base types
    pub fn context(&self) -> &TypeContext {
        &self.context
    }

    /// Base type with the given name
    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        self.types.get(name).copied()
    }

    /// Type of the base value with the given name
    pub fn lookup_value(&self, name: &str) -> Option<TypeId> {
        self.values.get(name).copied()
    }

    /// All base types, in registration order
    pub fn types(&self) -> impl Iterator<Item = (&str, TypeId)> {
        self.types.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// All base values, in registration order
    pub fn values(&self) -> impl Iterator<Item = (&str, TypeId)> {
        self.values.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_types_resolve_by_name() {
        let registry = BaseTypeRegistry::new();
        let ctx = registry.context();

        assert_eq!(registry.lookup_type("Int"), Some(ctx.int_type()));
        assert_eq!(registry.lookup_type("AnyResource"), Some(ctx.any_resource_type()));
        assert_eq!(registry.lookup_type("UFix64"), Some(ctx.numeric(NumericType::UFix64)));
        assert_eq!(registry.lookup_type("<<invalid>>"), None);
        assert_eq!(registry.lookup_type("Invalid"), None);
    }

    #[test]
    fn test_base_values() {
        let registry = BaseTypeRegistry::new();
        let ctx = registry.context();

        let panic = registry.lookup_value("panic").unwrap();
        assert_eq!(ctx.type_string(panic), "view fun(_ message: String): Never");

        let assert = registry.lookup_value("assert").unwrap();
        let function = ctx.get(assert).and_then(|ty| ty.as_function()).unwrap();
        assert_eq!(function.required_argument_count, Some(1));
        assert_eq!(function.argument_labels(), vec!["_", "message"]);
    }
}
