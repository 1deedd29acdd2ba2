//! Elaboration: what the checker learned about a program
//!
//! Later stages look up the type of a declaration or expression by the span
//! of its syntax node, and global names by identifier.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use sema_types::{Span, TypeContext, TypeId};

/// Side tables produced by a successful check
#[derive(Debug, Clone)]
pub struct Elaboration {
    context: TypeContext,
    declarations: FxHashMap<Span, TypeId>,
    expression_types: FxHashMap<Span, TypeId>,
    global_types: IndexMap<String, TypeId>,
    global_values: IndexMap<String, TypeId>,
}

impl Elaboration {
    pub(crate) fn new(context: TypeContext) -> Self {
        Self {
            context,
            declarations: FxHashMap::default(),
            expression_types: FxHashMap::default(),
            global_types: IndexMap::new(),
            global_values: IndexMap::new(),
        }
    }

    /// Types of the program, after checking
    pub fn context(&self) -> &TypeContext {
        &self.context
    }

    pub(crate) fn context_mut(&mut self) -> &mut TypeContext {
        &mut self.context
    }

    /// Nominal type declared by the declaration at `span`
    pub fn declaration_type(&self, span: Span) -> Option<TypeId> {
        self.declarations.get(&span).copied()
    }

    /// Type of the expression at `span`
    pub fn expression_type(&self, span: Span) -> Option<TypeId> {
        self.expression_types.get(&span).copied()
    }

    /// Top-level type named `name`
    pub fn global_type(&self, name: &str) -> Option<TypeId> {
        self.global_types.get(name).copied()
    }

    /// Type of the top-level value named `name`
    pub fn global_value(&self, name: &str) -> Option<TypeId> {
        self.global_values.get(name).copied()
    }

    /// Top-level values, in declaration order
    pub fn global_values(&self) -> impl Iterator<Item = (&str, TypeId)> {
        self.global_values.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Display form of the type of the value `name`
    pub fn value_type_string(&self, name: &str) -> Option<String> {
        self.global_value(name).map(|ty| self.context.type_string(ty))
    }

    pub(crate) fn record_declaration(&mut self, span: Span, ty: TypeId) {
        self.declarations.insert(span, ty);
    }

    pub(crate) fn record_expression(&mut self, span: Span, ty: TypeId) {
        self.expression_types.insert(span, ty);
    }

    pub(crate) fn record_global_type(&mut self, name: &str, ty: TypeId) {
        self.global_types.insert(name.to_string(), ty);
    }

    pub(crate) fn record_global_value(&mut self, name: &str, ty: TypeId) {
        self.global_values.insert(name.to_string(), ty);
    }
}
