/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Lexical scopes (spec.md §3, §4.1). A `ScopeTree` is an arena of
//! `Scope`s addressed by `Idx<Scope>`; the binder walks the AST holding
//! the index of whichever scope is "current" rather than a borrowed
//! reference, so the arena can be mutated freely as new scopes and
//! symbols are discovered.

use ruff_python_ast::name::Name;
use starlark_map::small_map::SmallMap;
use starlark_map::small_set::SmallSet;

use crate::binding::symbol::Symbol;
use crate::binding::symbol::SymbolFlags;
use crate::binding::symbol::SymbolId;
use crate::graph::index::Arena;
use crate::graph::index::Idx;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Builtin,
    Module,
    Class,
    Function,
    Comprehension,
    TypeParameter,
}

impl ScopeKind {
    /// Execution scopes introduce their own control-flow graph (glossary,
    /// spec.md GLOSSARY "Execution scope"); Class and Comprehension scopes
    /// reuse the enclosing flow thread.
    pub fn is_execution_scope(self) -> bool {
        matches!(self, ScopeKind::Builtin | ScopeKind::Module | ScopeKind::Function)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingType {
    Global,
    Nonlocal,
}

#[derive(Debug)]
pub struct Scope {
    kind: ScopeKind,
    parent: Option<Idx<Scope>>,
    /// Transparent stand-in parent used when a type-parameter scope sits
    /// between a class/function and its real parent (spec.md §3, §4.1):
    /// certain queries (global-scope lookup, binding-type overrides) must
    /// see through it to the real parent.
    proxy: Option<Idx<Scope>>,
    symbols: SmallMap<Name, Symbol>,
    binding_overrides: SmallMap<Name, BindingType>,
    slots_names: Option<Vec<Name>>,
    /// Reference keys participating in flow narrowing, widened across
    /// loop iterations and invalidated by wildcard imports (spec.md §4.3,
    /// §4.8, GLOSSARY "Code-flow expression").
    code_flow_expressions: SmallSet<String>,
    flow_node_count: u32,
    join_count: u32,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<Idx<Scope>>) -> Self {
        Self {
            kind,
            parent,
            proxy: None,
            symbols: SmallMap::new(),
            binding_overrides: SmallMap::new(),
            slots_names: None,
            code_flow_expressions: SmallSet::new(),
            flow_node_count: 0,
            join_count: 0,
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<Idx<Scope>> {
        self.parent
    }

    pub fn set_proxy(&mut self, proxy: Idx<Scope>) {
        self.proxy = Some(proxy);
    }

    pub fn proxy(&self) -> Option<Idx<Scope>> {
        self.proxy
    }

    pub fn slots_names(&self) -> Option<&[Name]> {
        self.slots_names.as_deref()
    }

    pub fn set_slots_names(&mut self, names: Vec<Name>) {
        self.slots_names = Some(names);
    }

    pub fn add_code_flow_expression(&mut self, key: String) {
        self.code_flow_expressions.insert(key);
    }

    pub fn code_flow_expressions(&self) -> impl Iterator<Item = &String> {
        self.code_flow_expressions.iter()
    }

    pub fn record_flow_node(&mut self) {
        self.flow_node_count += 1;
    }

    pub fn record_join(&mut self, antecedents: u32) {
        self.join_count += antecedents.saturating_sub(1);
    }

    /// `complexity ≥ 0.05 × flowNodesAllocated` (spec.md §8, invariant 9).
    pub fn complexity(&self) -> f64 {
        f64::from(self.join_count) + 0.05 * f64::from(self.flow_node_count)
    }
}

/// Owns every `Scope` created while binding one module (spec.md §5: the
/// Binder owns the tree during construction, then transfers it to the
/// module's parse result).
#[derive(Debug)]
pub struct ScopeTree {
    arena: Arena<Scope>,
    builtin: Idx<Scope>,
    module: Idx<Scope>,
}

impl ScopeTree {
    /// Creates the Builtin scope (no parent) and the Module scope as its
    /// child, per spec.md §3's invariant "every non-Builtin scope has a
    /// parent; ... only Builtin has no parent".
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let builtin = arena.push(Scope::new(ScopeKind::Builtin, None));
        let module = arena.push(Scope::new(ScopeKind::Module, Some(builtin)));
        Self {
            arena,
            builtin,
            module,
        }
    }

    pub fn builtin_scope(&self) -> Idx<Scope> {
        self.builtin
    }

    pub fn module_scope(&self) -> Idx<Scope> {
        self.module
    }

    pub fn get(&self, idx: Idx<Scope>) -> &Scope {
        self.arena.get(idx)
    }

    pub fn get_mut(&mut self, idx: Idx<Scope>) -> &mut Scope {
        self.arena.get_mut(idx)
    }

    pub fn push_child(&mut self, kind: ScopeKind, parent: Idx<Scope>) -> Idx<Scope> {
        self.arena.push(Scope::new(kind, Some(parent)))
    }

    /// A `TypeParameter` scope sitting between `parent` and whatever
    /// declares the type parameters (a `def`/`class`/`type` statement)
    /// (spec.md §3, §4.1): its own `parent` and `proxy` both point at
    /// `parent`, so `real_parent` sees straight through it for queries
    /// that don't care about the type-parameter names themselves
    /// (`global_scope`, `nearest_enclosing_function_scope`, ...), while a
    /// `lookup_recursive` walk starting below it still visits its symbols
    /// on the way past.
    pub fn push_type_param_scope(&mut self, parent: Idx<Scope>) -> Idx<Scope> {
        let scope = self.push_child(ScopeKind::TypeParameter, parent);
        self.get_mut(scope).set_proxy(parent);
        scope
    }

    /// The real parent of `scope`, transparent to any type-parameter proxy
    /// scope (spec.md §4.1).
    fn real_parent(&self, scope: Idx<Scope>) -> Option<Idx<Scope>> {
        let s = self.get(scope);
        match s.kind {
            ScopeKind::TypeParameter => s.proxy.or(s.parent),
            _ => s.parent,
        }
    }

    /// The nearest enclosing Module or Builtin scope (spec.md §3: "the
    /// global scope for any scope is the nearest enclosing Module or
    /// Builtin scope").
    pub fn global_scope(&self, mut scope: Idx<Scope>) -> Idx<Scope> {
        loop {
            let kind = self.get(scope).kind();
            if matches!(kind, ScopeKind::Module | ScopeKind::Builtin) {
                return scope;
            }
            match self.real_parent(scope) {
                Some(p) => scope = p,
                None => return scope,
            }
        }
    }

    pub fn add_symbol(&mut self, scope: Idx<Scope>, name: Name, flags: SymbolFlags) -> SymbolId {
        let s = self.get_mut(scope);
        if let Some(existing) = s.symbols.get(&name) {
            return existing.id();
        }
        let symbol = Symbol::new(name.clone(), flags);
        let id = symbol.id();
        s.symbols.insert(name, symbol);
        id
    }

    pub fn lookup<'a>(&'a self, scope: Idx<Scope>, name: &Name) -> Option<&'a Symbol> {
        self.get(scope).symbols.get(name)
    }

    pub fn lookup_mut<'a>(&'a mut self, scope: Idx<Scope>, name: &Name) -> Option<&'a mut Symbol> {
        self.get_mut(scope).symbols.get_mut(name)
    }

    pub fn symbol_mut(&mut self, scope: Idx<Scope>, id: SymbolId) -> Option<&mut Symbol> {
        self.get_mut(scope)
            .symbols
            .values_mut()
            .find(|s| s.id() == id)
    }

    /// Recursive name lookup (spec.md §4.1): walk the parent chain,
    /// skipping Class scopes whenever the walk did not start in a Class
    /// scope itself (spec.md §8, invariant 6, the "class-scope skip").
    pub fn lookup_recursive(&self, start: Idx<Scope>, name: &Name) -> Option<(SymbolId, Idx<Scope>)> {
        let started_in_class = self.get(start).kind() == ScopeKind::Class;
        let mut current = Some(start);
        let mut first = true;
        while let Some(scope) = current {
            let kind = self.get(scope).kind();
            let skip = kind == ScopeKind::Class && !(first && started_in_class);
            if !skip {
                if let Some(sym) = self.lookup(scope, name) {
                    return Some((sym.id(), scope));
                }
            }
            current = self.real_parent(scope);
            first = false;
        }
        None
    }

    pub fn get_binding_type(&self, scope: Idx<Scope>, name: &Name) -> Option<BindingType> {
        self.get(scope).binding_overrides.get(name).copied()
    }

    pub fn set_binding_type(&mut self, scope: Idx<Scope>, name: Name, kind: BindingType) {
        self.get_mut(scope).binding_overrides.insert(name, kind);
    }

    /// The nearest enclosing scope that is not itself a Class scope
    /// (spec.md §4.3's comprehension-scope placement: "parent is the
    /// nearest non-class scope").
    pub fn nearest_non_class_scope(&self, scope: Idx<Scope>) -> Idx<Scope> {
        let mut current = scope;
        while self.get(current).kind() == ScopeKind::Class {
            match self.real_parent(current) {
                Some(p) => current = p,
                None => break,
            }
        }
        current
    }

    /// The enclosing scope a walrus target binds into (spec.md §4.3: "Bind
    /// the name to the enclosing non-comprehension scope"), walking past
    /// any number of nested Comprehension scopes.
    pub fn nearest_non_comprehension_scope(&self, scope: Idx<Scope>) -> Idx<Scope> {
        let mut current = scope;
        while self.get(current).kind() == ScopeKind::Comprehension {
            match self.real_parent(current) {
                Some(p) => current = p,
                None => break,
            }
        }
        current
    }

    /// The nearest enclosing scope that is neither Function-local-only
    /// proxying nor Module/Class, used to resolve `nonlocal x` (spec.md
    /// §4.8: "no binding in any enclosing non-global, non-module scope").
    pub fn nearest_enclosing_function_scope(&self, scope: Idx<Scope>) -> Option<Idx<Scope>> {
        let mut current = self.real_parent(scope);
        while let Some(s) = current {
            let kind = self.get(s).kind();
            if kind == ScopeKind::Function {
                return Some(s);
            }
            if matches!(kind, ScopeKind::Module | ScopeKind::Builtin) {
                return None;
            }
            current = self.real_parent(s);
        }
        None
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_scope_is_skipped_from_nested_function() {
        let mut tree = ScopeTree::new();
        let module = tree.module_scope();
        tree.add_symbol(module, Name::new("x"), SymbolFlags::empty());
        let class = tree.push_child(ScopeKind::Class, module);
        tree.add_symbol(class, Name::new("x"), SymbolFlags::empty());
        let method = tree.push_child(ScopeKind::Function, class);
        let nested = tree.push_child(ScopeKind::Function, method);

        let (_, found_scope) = tree.lookup_recursive(nested, &Name::new("x")).unwrap();
        assert_eq!(found_scope, module);
    }

    #[test]
    fn test_lookup_recursive_from_class_scope_itself_sees_own_symbol() {
        let mut tree = ScopeTree::new();
        let module = tree.module_scope();
        let class = tree.push_child(ScopeKind::Class, module);
        tree.add_symbol(class, Name::new("x"), SymbolFlags::empty());

        let (_, found_scope) = tree.lookup_recursive(class, &Name::new("x")).unwrap();
        assert_eq!(found_scope, class);
    }

    #[test]
    fn test_global_scope_is_nearest_module_or_builtin() {
        let mut tree = ScopeTree::new();
        let module = tree.module_scope();
        let func = tree.push_child(ScopeKind::Function, module);
        let nested = tree.push_child(ScopeKind::Function, func);
        assert_eq!(tree.global_scope(nested), module);
    }
}
