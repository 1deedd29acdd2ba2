//! Symbol table implementation for name resolution
//!
//! The checker keeps two tables with the same shape: the type activation,
//! mapping type names to nominal and built-in types, and the value
//! activation, mapping value names to the types of variables, functions and
//! constructors. Base types and values live in the global scope; programs
//! and nested declarations push scopes on top of it.

use rustc_hash::FxHashMap;
use sema_types::{Access, DeclarationKind, Span, TypeId};

/// Symbol kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Built-in type or value from the base registry
    Base,
    /// Nominal type declared by the program
    Type,
    /// Type parameter of a generic function
    TypeParameter,
    /// `let` or `var`
    Variable,
    /// Function declaration
    Function,
    /// Constructor of a composite
    Constructor,
}

/// Symbol information
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Symbol name
    pub name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Type of this symbol, or the type it names
    pub ty: TypeId,
    /// Declared access
    pub access: Access,
    /// Declaration kind, used in redeclaration errors
    pub declaration_kind: DeclarationKind,
    /// Whether the binding can be reassigned
    pub is_constant: bool,
    /// Scope where this symbol was defined
    pub scope_id: ScopeId,
    /// Source location
    pub span: Span,
}

impl Symbol {
    /// Create a symbol; the scope is assigned when it is defined
    pub fn new(name: &str, kind: SymbolKind, ty: TypeId, declaration_kind: DeclarationKind, span: Span) -> Self {
        Symbol {
            name: name.to_string(),
            kind,
            ty,
            access: Access::UNAUTHORIZED,
            declaration_kind,
            is_constant: true,
            scope_id: ScopeId(0),
            span,
        }
    }

    /// Set the declared access
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Set whether the binding is constant
    pub fn with_constant(mut self, is_constant: bool) -> Self {
        self.is_constant = is_constant;
        self
    }
}

/// Scope identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// Scope kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Base types and values
    Global,
    /// Top-level declarations of a program
    Program,
    /// Nested declarations of a composite or interface
    Composite,
    /// Type parameters of a function
    Function,
}

/// Scope in the scope tree
#[derive(Debug, Clone)]
pub struct Scope {
    /// Scope ID
    pub id: ScopeId,
    /// Scope kind
    pub kind: ScopeKind,
    /// Parent scope (None for global scope)
    pub parent: Option<ScopeId>,
    /// Symbols defined in this scope
    pub symbols: FxHashMap<String, Symbol>,
}

impl Scope {
    /// Create a new scope
    pub fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            id,
            kind,
            parent,
            symbols: FxHashMap::default(),
        }
    }
}

/// Symbol table with scope tree
#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// All scopes (indexed by ScopeId)
    scopes: Vec<Scope>,
    /// Current scope ID
    current_scope: ScopeId,
}

impl SymbolTable {
    /// Create a new symbol table with a global scope
    pub fn new() -> Self {
        let global_scope = Scope::new(ScopeId(0), ScopeKind::Global, None);

        SymbolTable {
            scopes: vec![global_scope],
            current_scope: ScopeId(0),
        }
    }

    /// Push a new scope as a child of the current scope
    ///
    /// Returns the ID of the new scope and makes it current.
    pub fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let scope = Scope::new(id, kind, Some(self.current_scope));
        self.scopes.push(scope);
        self.current_scope = id;
        id
    }

    /// Re-enter a scope pushed earlier, as a child of the current scope
    ///
    /// The later phases revisit the scopes the declare phase created for
    /// nested declarations, so lookups see the same nested types.
    pub fn enter_scope(&mut self, id: ScopeId) -> ScopeId {
        let previous = self.current_scope;
        self.current_scope = id;
        previous
    }

    /// Restore the scope returned by [`enter_scope`](Self::enter_scope)
    pub fn leave_scope(&mut self, previous: ScopeId) {
        self.current_scope = previous;
    }

    /// Pop the current scope, returning to its parent
    ///
    /// Does nothing if already at global scope.
    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current_scope.0 as usize].parent {
            self.current_scope = parent;
        }
    }

    /// Define a symbol in the current scope
    ///
    /// Returns an error if a symbol with the same name already exists in this scope.
    pub fn define(&mut self, mut symbol: Symbol) -> Result<(), DuplicateSymbolError> {
        let scope = &mut self.scopes[self.current_scope.0 as usize];

        if let Some(existing) = scope.symbols.get(&symbol.name) {
            return Err(DuplicateSymbolError {
                name: symbol.name.clone(),
                kind: symbol.declaration_kind,
                original: existing.span,
                duplicate: symbol.span,
            });
        }

        symbol.scope_id = self.current_scope;
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Resolve a symbol by name, walking up the scope chain
    ///
    /// Searches from current scope to global scope, returning the first match.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.resolve_from_scope(name, self.current_scope)
    }

    /// Resolve a symbol by name from a specific scope, walking up the scope chain
    pub fn resolve_from_scope(&self, name: &str, mut scope_id: ScopeId) -> Option<&Symbol> {
        loop {
            let scope = &self.scopes[scope_id.0 as usize];

            if let Some(symbol) = scope.symbols.get(name) {
                return Some(symbol);
            }

            match scope.parent {
                Some(parent) => scope_id = parent,
                None => return None,
            }
        }
    }

    /// Get the current scope
    pub fn current(&self) -> &Scope {
        &self.scopes[self.current_scope.0 as usize]
    }

    /// Get the current scope ID
    pub fn current_scope_id(&self) -> ScopeId {
        self.current_scope
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Error indicating a duplicate symbol definition
#[derive(Debug, Clone)]
pub struct DuplicateSymbolError {
    /// Symbol name
    pub name: String,
    /// Kind of the duplicate declaration
    pub kind: DeclarationKind,
    /// Location of original definition
    pub original: Span,
    /// Location of duplicate definition
    pub duplicate: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_types::TypeContext;

    fn variable(name: &str, ty: TypeId, start: usize) -> Symbol {
        Symbol::new(
            name,
            SymbolKind::Variable,
            ty,
            DeclarationKind::Constant,
            Span::new(start, start + 1, 1, start as u32 + 1),
        )
    }

    #[test]
    fn test_push_pop_scope() {
        let mut table = SymbolTable::new();
        assert_eq!(table.current().kind, ScopeKind::Global);

        let program = table.push_scope(ScopeKind::Program);
        assert_eq!(program, ScopeId(1));
        let nested = table.push_scope(ScopeKind::Composite);
        assert_eq!(nested, ScopeId(2));

        table.pop_scope();
        assert_eq!(table.current_scope_id(), ScopeId(1));
        table.pop_scope();
        table.pop_scope();
        assert_eq!(table.current_scope_id(), ScopeId(0));
    }

    #[test]
    fn test_shadow_in_nested_scope() {
        let ctx = TypeContext::new();
        let mut table = SymbolTable::new();
        table.define(variable("x", ctx.int_type(), 0)).unwrap();

        let inner = table.push_scope(ScopeKind::Composite);
        table.define(variable("x", ctx.string_type(), 10)).unwrap();
        assert_eq!(table.resolve("x").unwrap().ty, ctx.string_type());
        assert_eq!(table.resolve("x").unwrap().scope_id, inner);

        table.pop_scope();
        assert_eq!(table.resolve("x").unwrap().ty, ctx.int_type());
    }

    #[test]
    fn test_reenter_scope() {
        let ctx = TypeContext::new();
        let mut table = SymbolTable::new();
        let nested = table.push_scope(ScopeKind::Composite);
        table.define(variable("inner", ctx.bool_type(), 0)).unwrap();
        table.pop_scope();
        assert!(table.resolve("inner").is_none());

        let previous = table.enter_scope(nested);
        assert!(table.resolve("inner").is_some());
        table.leave_scope(previous);
        assert!(table.resolve("inner").is_none());
    }

    #[test]
    fn test_duplicate_symbol_error() {
        let ctx = TypeContext::new();
        let mut table = SymbolTable::new();
        table.define(variable("x", ctx.int_type(), 0)).unwrap();

        let err = table.define(variable("x", ctx.int_type(), 5)).unwrap_err();
        assert_eq!(err.name, "x");
        assert_eq!(err.original.start, 0);
        assert_eq!(err.duplicate.start, 5);
        assert_eq!(err.kind, DeclarationKind::Constant);
    }
}
