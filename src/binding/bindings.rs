/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The binder driver (spec.md §2, §5): walks one module's AST once,
//! building its `ScopeTree`, `FlowGraph`, and `SideTable` together. The
//! driver itself holds no AST ownership beyond the borrow of the current
//! walk; everything it produces is addressed through the side table by
//! `TextRange` or through the scope/flow arenas by `Idx`.

use std::collections::HashSet;

use ruff_python_ast::name::Name;
use ruff_python_ast::Expr;
use ruff_python_ast::Stmt;
use ruff_python_ast::TypeParam;
use ruff_python_ast::TypeParams;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;
use starlark_map::small_map::SmallMap;

use crate::binding::declaration::Declaration;
use crate::binding::declaration::DeclarationHeader;
use crate::binding::declaration::IntrinsicDeclaration;
use crate::binding::declaration::TypeParamDeclaration;
use crate::binding::declaration::TypeParamKind;
use crate::binding::deferred::DeferredQueue;
use crate::binding::deferred::DeferredTask;
use crate::binding::deferred::DeferredWork;
use crate::binding::deferred::FunctionContext;
use crate::binding::dunder_all::DunderAll;
use crate::binding::file_info::AnalyzerFileInfo;
use crate::binding::flow::ConditionFlags;
use crate::binding::flow::FlowGraph;
use crate::binding::flow::FlowNode;
use crate::binding::global_nonlocal::GlobalNonlocalState;
use crate::binding::narrow::collect_narrowing_references;
use crate::binding::narrow::is_eligible_for_never_narrowing;
use crate::binding::scope::BindingType;
use crate::binding::scope::Scope;
use crate::binding::scope::ScopeKind;
use crate::binding::scope::ScopeTree;
use crate::binding::side_table::SideTable;
use crate::binding::static_eval::evaluate_static_bool_like_expression;
use crate::binding::static_eval::NameResolver;
use crate::binding::static_eval::StaticEvalConfig;
use crate::binding::symbol::is_name_mangled;
use crate::binding::symbol::is_private_name;
use crate::binding::symbol::SymbolFlags;
use crate::binding::symbol::SymbolId;
use crate::error::collector::ErrorCollector;
use crate::error::kind::ErrorKind;
use crate::export::exports::ImportLookup;
use crate::export::exports::ImportResolver;
use crate::export::special::SpecialExport;
use crate::graph::index::Idx;
use crate::module::module_info::ModuleInfo;

/// `break`/`continue` targets for the loop currently being bound (spec.md
/// §4.3's For/While): `continue` joins into the loop's own `LoopLabel`,
/// `break` joins into a `BranchLabel` allocated once the loop is entered
/// and resolved after the body is walked.
struct LoopContext {
    break_label: Idx<FlowNode>,
    continue_label: Idx<FlowNode>,
}

/// The scope + symbol of the function currently being bound, so that a
/// `return`/`yield`/`raise` reached while walking its body can be
/// back-patched onto the right `FunctionDeclaration` (spec.md §3).
/// `return_label` is the function-body-wide `BranchLabel` every `return`
/// (and the implicit fall-off-the-end return) joins into; its resolution
/// becomes the flow-after recorded for the `def` once the body finishes.
#[derive(Clone, Copy)]
struct ActiveFunction {
    scope: Idx<Scope>,
    symbol: SymbolId,
    is_async: bool,
    return_label: Idx<FlowNode>,
}

/// A `PreFinallyGate` threaded through a `try` block's body so `finally`
/// can observe flow state from both the normal and the exceptional paths
/// (spec.md §4.3's "Try/except/else/finally").
struct FinallyContext {
    pre_finally_gate: Idx<FlowNode>,
}

/// What the member-access disambiguator (spec.md §4.7) needs about the
/// method body currently being walked; pushed when a deferred function
/// body turns out to be a method (its immediate enclosing scope is a
/// Class scope) and popped when that body finishes.
#[derive(Clone, Debug)]
pub(crate) struct MethodContext {
    pub class_name: Name,
    pub method_name: Name,
    pub first_param: Option<Name>,
    pub decorators: Vec<String>,
    pub class_scope: Idx<Scope>,
}

pub struct Binder<'a> {
    module_info: ModuleInfo,
    scopes: ScopeTree,
    flow: FlowGraph,
    side_table: SideTable,
    deferred: DeferredQueue,
    dunder_all: DunderAll,
    errors: &'a ErrorCollector,
    import_resolver: &'a dyn ImportResolver,
    import_lookup: &'a dyn ImportLookup,
    file_info: AnalyzerFileInfo,
    global_nonlocal: SmallMap<Idx<Scope>, GlobalNonlocalState>,
    /// Module/Builtin-scope names introduced under the single-underscore
    /// private-name pattern in a stub or typed-package file (spec.md §4.2):
    /// resolved against `__all__` once binding finishes (spec.md §4.5).
    potential_private: Vec<Name>,
    /// Module/Builtin-scope names introduced under the double-underscore
    /// name-mangling pattern (spec.md §4.2), resolved the same way.
    potential_hidden: Vec<Name>,
    loop_stack: Vec<LoopContext>,
    function_stack: Vec<ActiveFunction>,
    /// How many enclosing generator expressions (`(... for ... in ...)`)
    /// the walk is currently inside, counting only the part of each one
    /// whose evaluation is actually deferred (spec.md §7's `await`
    /// exception; the outermost iterable of a generator expression is
    /// evaluated eagerly and is not counted here).
    generator_expr_depth: u32,
    finally_stack: Vec<FinallyContext>,
    method_context_stack: Vec<Option<MethodContext>>,
    /// One entry per currently-open `try` with at least one handler; each
    /// entry is the set of that `try`'s handler entry labels. A `Call` flow
    /// node created anywhere in the try body is chained as an antecedent
    /// into every label in every active layer (spec.md §4.3's "any
    /// statement that might raise chains into the active except targets"),
    /// an approximation of real exception propagation that over-connects
    /// rather than under-connects nested handlers.
    except_targets_stack: Vec<Vec<Idx<FlowNode>>>,
    /// One entry per currently-open `try`/`finally`; each entry collects the
    /// flow state at every `return`/`raise`/`break`/`continue` reached
    /// while walking that try's body or handlers, so the `finally` body's
    /// entry antecedent set includes them (spec.md §4.3: "finally always
    /// runs, even when the try block exits early").
    finally_escape_stack: Vec<Vec<Idx<FlowNode>>>,
    /// Enclosing class names, innermost last, consulted by the
    /// member-access disambiguator (spec.md §4.7) when classifying a
    /// method's own `self.x = ...` / `cls.x = ...` assignments.
    class_name_stack: Vec<Name>,
    current_scope: Idx<Scope>,
    current_flow: Idx<FlowNode>,
    /// Nesting depth of decorator / `Annotated[...]` argument contexts,
    /// where a `Call` is still walked for name resolution but does not get
    /// its own flow node (spec.md §4.3's `createCallFlowNode`: "skipped
    /// when the call sits inside a decorator or inside an `Annotated[…]`
    /// argument").
    suppress_call_flow: u32,
    /// Nesting depth of `except` suite bodies, threaded into every
    /// `DeclarationHeader` created while it is nonzero (spec.md §3's
    /// shared `isInExceptSuite` field).
    in_except_suite: u32,
}

/// Everything the binder produced for one module, handed off to whatever
/// consumes it next (spec.md §5: "the Binder owns the tree during
/// construction, then transfers it").
pub struct BoundModule {
    pub scopes: ScopeTree,
    pub flow: FlowGraph,
    pub side_table: SideTable,
    pub dunder_all: DunderAll,
}

impl<'a> Binder<'a> {
    pub fn new(
        module_info: ModuleInfo,
        file_info: AnalyzerFileInfo,
        import_resolver: &'a dyn ImportResolver,
        import_lookup: &'a dyn ImportLookup,
        errors: &'a ErrorCollector,
    ) -> Self {
        let scopes = ScopeTree::new();
        let module_scope = scopes.module_scope();
        let mut flow = FlowGraph::new();
        let start = flow.create_start();
        Self {
            module_info,
            scopes,
            flow,
            side_table: SideTable::default(),
            deferred: DeferredQueue::default(),
            dunder_all: DunderAll::default(),
            errors,
            import_resolver,
            import_lookup,
            file_info,
            global_nonlocal: SmallMap::new(),
            potential_private: Vec::new(),
            potential_hidden: Vec::new(),
            loop_stack: Vec::new(),
            function_stack: Vec::new(),
            generator_expr_depth: 0,
            finally_stack: Vec::new(),
            method_context_stack: Vec::new(),
            except_targets_stack: Vec::new(),
            finally_escape_stack: Vec::new(),
            class_name_stack: Vec::new(),
            current_scope: module_scope,
            current_flow: start,
            suppress_call_flow: 0,
            in_except_suite: 0,
        }
    }

    /// Binds `body` as the module's top-level statements, then drains the
    /// deferred queue until dry (spec.md §5: function/lambda bodies are
    /// walked only after the enclosing scope finishes).
    pub fn bind_module(mut self, body: &[Stmt]) -> BoundModule {
        let module_scope = self.current_scope;
        self.side_table.set_scope(TextRange::default(), module_scope);
        self.side_table.set_flow_before(TextRange::default(), self.current_flow);
        self.bind_stmts(body);
        self.drain_deferred();
        self.finalize_dunder_all_closure();
        BoundModule {
            scopes: self.scopes,
            flow: self.flow,
            side_table: self.side_table,
            dunder_all: self.dunder_all,
        }
    }

    fn drain_deferred(&mut self) {
        while let Some(task) = self.deferred.dequeue() {
            let saved_scope = self.current_scope;
            let saved_flow = self.current_flow;
            self.current_scope = task.scope;
            self.current_flow = self.flow.create_start();
            for key in task.code_flow_expressions.iter() {
                self.scopes.get_mut(task.scope).add_code_flow_expression(key.clone());
            }
            self.push_method_context(task.method_context);
            for (symbol, range) in &task.param_symbols {
                self.create_assignment_flow(*symbol, *range, false);
            }

            let return_label = task
                .function
                .as_ref()
                .map(|_| self.flow.create_branch_label(None));
            if let (Some(func), Some(label)) = (&task.function, return_label) {
                self.push_active_function(task.scope, func.symbol, func.is_async, label);
            }

            match task.work {
                DeferredWork::FunctionBody(stmts) => self.bind_stmts(&stmts),
                DeferredWork::LambdaBody(expr) => {
                    self.bind_expr(&expr);
                }
            }

            if let (Some(func), Some(label)) = (&task.function, return_label) {
                self.pop_active_function();
                // Falling off the end of the body is an implicit `return None`.
                if !self.is_unreachable() {
                    self.flow.add_antecedent(label, self.current_flow);
                }
                let resolved = self.flow.finish_flow_label(label);
                self.side_table.set_flow_after(func.def_range, resolved);
            }

            self.pop_method_context();
            self.current_scope = saved_scope;
            self.current_flow = saved_flow;
        }
    }

    // --- accessors used by stmt.rs / expr.rs / pattern.rs ---

    pub(crate) fn module_info(&self) -> &ModuleInfo {
        &self.module_info
    }

    pub(crate) fn errors(&self) -> &'a ErrorCollector {
        self.errors
    }

    pub(crate) fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub(crate) fn scopes_mut(&mut self) -> &mut ScopeTree {
        &mut self.scopes
    }

    pub(crate) fn flow_mut(&mut self) -> &mut FlowGraph {
        &mut self.flow
    }

    pub(crate) fn side_table_mut(&mut self) -> &mut SideTable {
        &mut self.side_table
    }

    pub(crate) fn side_table(&self) -> &SideTable {
        &self.side_table
    }

    pub(crate) fn dunder_all_mut(&mut self) -> &mut DunderAll {
        &mut self.dunder_all
    }

    pub(crate) fn dunder_all(&self) -> &DunderAll {
        &self.dunder_all
    }

    pub(crate) fn static_eval(&self) -> &StaticEvalConfig {
        &self.file_info.static_eval
    }

    pub(crate) fn file_info(&self) -> &AnalyzerFileInfo {
        &self.file_info
    }

    pub(crate) fn import_resolver(&self) -> &'a dyn ImportResolver {
        self.import_resolver
    }

    pub(crate) fn import_lookup(&self) -> &'a dyn ImportLookup {
        self.import_lookup
    }

    pub(crate) fn current_scope(&self) -> Idx<Scope> {
        self.current_scope
    }

    pub(crate) fn current_flow(&self) -> Idx<FlowNode> {
        self.current_flow
    }

    pub(crate) fn set_current_flow(&mut self, flow: Idx<FlowNode>) {
        self.current_flow = flow;
    }

    pub(crate) fn is_unreachable(&self) -> bool {
        self.flow.get(self.current_flow).is_unreachable()
    }

    pub(crate) fn set_unreachable(&mut self) {
        self.current_flow = self.flow.unreachable();
    }

    pub(crate) fn is_module_scope(&self) -> bool {
        self.scopes.get(self.current_scope).kind() == ScopeKind::Module
    }

    pub(crate) fn is_class_scope(&self) -> bool {
        self.scopes.get(self.current_scope).kind() == ScopeKind::Class
    }

    /// Declares `name` in the current scope if it is not already present,
    /// appends `decl`, and returns the symbol's id (spec.md §3, §4.1).
    pub(crate) fn declare(&mut self, name: &Name, flags: SymbolFlags, decl: Declaration) -> SymbolId {
        self.declare_in(self.current_scope, name, flags, decl)
    }

    /// Declares `name` into `scope` rather than the current scope. Used
    /// for `global`/`nonlocal`-retargeted assignments (spec.md §4.8).
    pub(crate) fn declare_in(
        &mut self,
        scope: Idx<Scope>,
        name: &Name,
        flags: SymbolFlags,
        decl: Declaration,
    ) -> SymbolId {
        let is_new = self.scopes.lookup(scope, name).is_none();
        let id = self.scopes.add_symbol(scope, name.clone(), flags);
        if is_new {
            self.classify_first_introduction(scope, name);
        }
        if let Some(sym) = self.scopes.lookup_mut(scope, name) {
            sym.add_flags(flags);
            sym.push_declaration(decl);
        }
        id
    }

    /// On first introduction of a name (spec.md §4.2): at Module/Builtin
    /// scope, a single-leading-underscore name in a stub or typed-package
    /// file is deferred to the `__all__` closure as "potential private"; a
    /// double-leading-underscore (name-mangled) name is deferred the same
    /// way as "potential hidden". A private-style name outside a stub/
    /// typed-package file is marked `privateMember` immediately, since
    /// `__all__` export-whitelisting conventions are a typed-package/stub
    /// concern. Inside a Class scope, a mangled name is `externallyHidden`
    /// immediately, since it is never a module export candidate.
    fn classify_first_introduction(&mut self, scope: Idx<Scope>, name: &Name) {
        let kind = self.scopes.get(scope).kind();
        match kind {
            ScopeKind::Module | ScopeKind::Builtin => {
                if is_private_name(name.as_str()) {
                    if self.file_info.is_stub || self.file_info.is_typed_package {
                        self.potential_private.push(name.clone());
                    } else if let Some(sym) = self.scopes.lookup_mut(scope, name) {
                        sym.add_flags(SymbolFlags::PRIVATE_MEMBER);
                    }
                } else if is_name_mangled(name.as_str()) {
                    self.potential_hidden.push(name.clone());
                }
            }
            ScopeKind::Class if is_name_mangled(name.as_str()) => {
                if let Some(sym) = self.scopes.lookup_mut(scope, name) {
                    sym.add_flags(SymbolFlags::EXTERNALLY_HIDDEN);
                }
            }
            _ => {}
        }
    }

    /// Applies spec.md §4.5's closing rules once the whole module is
    /// bound and `self.dunder_all` has observed every module-scope
    /// `__all__` manipulation: a "potential private"/"potential hidden"
    /// name not re-exported through `__all__` becomes permanently private/
    /// hidden, and every name `__all__` does list gets `inDunderAll` set
    /// (spec.md §8, invariant 8). "Well-formed" here means `__all__` was
    /// both assigned at least once and never manipulated in an
    /// unrecognized way (spec.md §4.5).
    fn finalize_dunder_all_closure(&mut self) {
        let module = self.scopes.module_scope();
        let well_formed = self.dunder_all.is_declared() && !self.dunder_all.uses_unsupported_form();
        let all_names: HashSet<Name> = self.dunder_all.names().iter().cloned().collect();

        for name in std::mem::take(&mut self.potential_private) {
            if well_formed && all_names.contains(&name) {
                continue;
            }
            if let Some(sym) = self.scopes.lookup_mut(module, &name) {
                sym.add_flags(SymbolFlags::PRIVATE_MEMBER);
            }
        }
        for name in std::mem::take(&mut self.potential_hidden) {
            if well_formed && all_names.contains(&name) {
                continue;
            }
            let flag = if self.file_info.is_stub {
                SymbolFlags::EXTERNALLY_HIDDEN
            } else {
                SymbolFlags::PRIVATE_PYTYPED_IMPORT
            };
            if let Some(sym) = self.scopes.lookup_mut(module, &name) {
                sym.add_flags(flag);
            }
        }
        if well_formed {
            for name in self.dunder_all.names().to_vec() {
                if let Some(sym) = self.scopes.lookup_mut(module, &name) {
                    sym.add_flags(SymbolFlags::IN_DUNDER_ALL);
                }
            }
        }
    }

    /// Which scope a write to `name` actually lands in: the global scope
    /// if `global name` was declared in the current scope, the nearest
    /// enclosing function scope if `nonlocal name` was, otherwise the
    /// current scope (spec.md §4.8).
    pub(crate) fn target_scope_for(&self, name: &Name) -> Idx<Scope> {
        match self.scopes.get_binding_type(self.current_scope, name) {
            Some(BindingType::Global) => self.scopes.global_scope(self.current_scope),
            Some(BindingType::Nonlocal) => self
                .scopes
                .nearest_enclosing_function_scope(self.current_scope)
                .unwrap_or(self.current_scope),
            None => self.current_scope,
        }
    }

    pub(crate) fn declaration_header(&self, range: TextRange) -> DeclarationHeader {
        DeclarationHeader {
            range,
            module: self.module_info.name(),
            is_in_except_suite: self.in_except_suite > 0,
        }
    }

    /// Threads a plain variable write through the flow graph: creates an
    /// `Assignment` node, advances `current_flow`, and counts it against
    /// the owning scope's complexity (spec.md §4.3, §8 invariant 9).
    pub(crate) fn create_assignment_flow(&mut self, symbol: SymbolId, node: TextRange, unbind: bool) {
        if self.is_unreachable() {
            return;
        }
        let antecedent = self.current_flow;
        let assign = self.flow.create_assignment(symbol, node, antecedent, unbind);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        self.current_flow = assign;
    }

    pub(crate) fn create_call_flow(&mut self, node: TextRange) {
        if self.suppress_call_flow > 0 || self.is_unreachable() {
            return;
        }
        let antecedent = self.current_flow;
        let call = self.flow.create_call(node, antecedent);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        for layer in &self.except_targets_stack {
            for &label in layer {
                self.flow.add_antecedent(label, call);
            }
        }
        self.current_flow = call;
    }

    pub(crate) fn push_suppress_call_flow(&mut self) {
        self.suppress_call_flow += 1;
    }

    pub(crate) fn pop_suppress_call_flow(&mut self) {
        self.suppress_call_flow -= 1;
    }

    pub(crate) fn push_except_suite(&mut self) {
        self.in_except_suite += 1;
    }

    pub(crate) fn pop_except_suite(&mut self) {
        self.in_except_suite -= 1;
    }

    /// Threads a plain variable write with an explicit antecedent/unbind
    /// pair, used by `try`/`except` to implicitly unbind the exception
    /// name once its handler body finishes (spec.md §8 scenario 5).
    pub(crate) fn create_unbind_flow(&mut self, symbol: SymbolId, node: TextRange) {
        self.create_assignment_flow(symbol, node, true);
    }

    pub(crate) fn create_variable_annotation_flow(&mut self) {
        if self.is_unreachable() {
            return;
        }
        let antecedent = self.current_flow;
        let node = self.flow.create_variable_annotation(antecedent);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        self.current_flow = node;
    }

    pub(crate) fn create_wildcard_import_flow(&mut self, node: TextRange, names: Vec<Name>) {
        if self.is_unreachable() {
            return;
        }
        let antecedent = self.current_flow;
        let flow = self.flow.create_wildcard_import(node, names, antecedent);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        self.current_flow = flow;
    }

    pub(crate) fn create_narrow_for_pattern_flow(&mut self, subject: TextRange, statement: TextRange) {
        if self.is_unreachable() {
            return;
        }
        let antecedent = self.current_flow;
        let node = self.flow.create_narrow_for_pattern(subject, statement, antecedent);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        self.current_flow = node;
    }

    pub(crate) fn create_exhausted_match_flow(&mut self, node: TextRange, subject: TextRange) {
        if self.is_unreachable() {
            return;
        }
        let antecedent = self.current_flow;
        let n = self.flow.create_exhausted_match(node, subject, antecedent);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        self.current_flow = n;
    }

    /// Allocates a loop head (spec.md §4.3's For/While): stable across the
    /// whole loop so back-edges from `continue` and the bottom of the body
    /// always point at the same node.
    pub(crate) fn create_loop_label_flow(&mut self) -> Idx<FlowNode> {
        let node = self.flow.create_loop_label();
        self.scopes.get_mut(self.current_scope).record_flow_node();
        node
    }

    /// Allocates the `break` target for the loop currently being entered.
    pub(crate) fn create_break_label_flow(&mut self) -> Idx<FlowNode> {
        let node = self.flow.create_branch_label(None);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        node
    }

    pub(crate) fn create_context_manager_label_flow(
        &mut self,
        expressions: Vec<TextRange>,
        is_async: bool,
        block_if_swallows_exceptions: bool,
    ) -> Idx<FlowNode> {
        let node = self
            .flow
            .create_context_manager_label(expressions, is_async, block_if_swallows_exceptions);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        node
    }

    pub(crate) fn create_pre_finally_gate_flow(&mut self) -> Idx<FlowNode> {
        let antecedent = self.current_flow;
        let node = self.flow.create_pre_finally_gate(antecedent);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        node
    }

    pub(crate) fn create_post_finally_flow(&mut self, pre_finally_gate: Idx<FlowNode>, finally_node: TextRange) {
        if self.is_unreachable() {
            return;
        }
        let antecedent = self.current_flow;
        let node = self.flow.create_post_finally(antecedent, pre_finally_gate, finally_node);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        self.current_flow = node;
    }

    /// Allocates a condition node for `test` evaluated as `is_true_branch`,
    /// short-circuiting on a statically-known result and skipping the
    /// allocation when `test` carries no narrowable reference (spec.md
    /// §4.3's `createFlowConditional`, §4.4).
    pub(crate) fn create_flow_conditional(&mut self, test: &Expr, is_true_branch: bool) -> Idx<FlowNode> {
        let antecedent = self.current_flow;
        if let Some(value) = evaluate_static_bool_like_expression(test, &self.file_info.static_eval, self) {
            return if value == is_true_branch {
                antecedent
            } else {
                self.flow.unreachable()
            };
        }
        let mut refs = Vec::new();
        let eligible = collect_narrowing_references(test, &mut refs);
        if !eligible {
            return antecedent;
        }
        for r in &refs {
            self.scopes.get_mut(self.current_scope).add_code_flow_expression(r.clone());
        }
        let mut flags = ConditionFlags::empty();
        if is_true_branch {
            flags |= ConditionFlags::TRUE;
        }
        let node = self
            .flow
            .create_condition(flags, refs.into_iter().next(), test.range(), antecedent);
        self.scopes.get_mut(self.current_scope).record_flow_node();
        node
    }

    /// The implicit `else` of an `if`/`elif` chain with no explicit
    /// trailing `else`: skipped entirely unless `test` qualifies for the
    /// stricter "never narrowing" eligibility (spec.md §4.4). A bare
    /// `if x:` gains nothing from an implicit `not x` condition node, but
    /// `if x is None:` does.
    pub(crate) fn create_implicit_else_conditional(&mut self, test: &Expr) -> Idx<FlowNode> {
        if !is_eligible_for_never_narrowing(test) {
            return self.current_flow;
        }
        self.create_flow_conditional(test, false)
    }

    /// Creates a branch label, adds every antecedent, and resolves it
    /// (spec.md §4.3, §8 invariant 5), recording the join on the owning
    /// scope's complexity counter (invariant 9).
    pub(crate) fn join_flows(&mut self, antecedents: &[Idx<FlowNode>]) -> Idx<FlowNode> {
        let label = self.flow.create_branch_label(Some(self.current_flow));
        for &a in antecedents {
            self.flow.add_antecedent(label, a);
        }
        let count = self.flow.antecedent_count(label);
        let resolved = self.flow.finish_flow_label(label);
        if resolved == label {
            self.scopes.get_mut(self.current_scope).record_join(count);
        }
        resolved
    }

    /// Resolves a branch label built up incrementally across multiple
    /// call sites via `flow_mut().add_antecedent` (as opposed to
    /// `join_flows`, which builds and resolves a label from a fully
    /// collected antecedent list in one shot).
    pub(crate) fn resolve_label(&mut self, label: Idx<FlowNode>) -> Idx<FlowNode> {
        let count = self.flow.antecedent_count(label);
        let resolved = self.flow.finish_flow_label(label);
        if resolved == label {
            self.scopes.get_mut(self.current_scope).record_join(count);
        }
        resolved
    }

    pub(crate) fn push_child_scope(&mut self, kind: ScopeKind) -> Idx<Scope> {
        self.scopes.push_child(kind, self.current_scope)
    }

    /// Pushes a `kind` scope as a child of `parent` rather than of
    /// whatever scope is current, without disturbing `current_scope`
    /// (spec.md §4.1's proxy-scope case: a function/class scope's real
    /// parent becomes its type-parameter scope rather than the scope it
    /// was lexically found in).
    pub(crate) fn push_child_scope_of(&mut self, kind: ScopeKind, parent: Idx<Scope>) -> Idx<Scope> {
        self.scopes.push_child(kind, parent)
    }

    /// `[P]`, `[P: B]`, `[P = D]` on a `def`/`class`/`type` statement
    /// (spec.md §4.2's table, §4.1): builds a `TypeParameter` scope as a
    /// child of the scope that lexically contains the declaring
    /// statement, declares a `TypeParam` for each entry (reporting a
    /// duplicate name per spec.md §7), and binds each bound/default
    /// expression inside that scope so later entries can reference
    /// earlier ones. Returns `None` when the statement has no type
    /// parameter list at all, so callers can fall back to parenting
    /// directly off the enclosing scope.
    pub(crate) fn bind_type_params(&mut self, type_params: &Option<Box<TypeParams>>) -> Option<Idx<Scope>> {
        let type_params = type_params.as_deref()?;
        let scope = self.scopes.push_type_param_scope(self.current_scope);
        let saved = self.enter_scope(scope);
        self.record_node_scope(type_params.range());
        let mut seen = HashSet::new();
        for param in &type_params.type_params {
            let (name, kind, bound, default) = match param {
                TypeParam::TypeVar(t) => (&t.name, TypeParamKind::TypeVar, t.bound.as_deref(), t.default.as_deref()),
                TypeParam::TypeVarTuple(t) => (&t.name, TypeParamKind::TypeVarTuple, None, t.default.as_deref()),
                TypeParam::ParamSpec(t) => (&t.name, TypeParamKind::ParamSpec, None, t.default.as_deref()),
            };
            if !seen.insert(name.id.clone()) {
                self.report(
                    name.range(),
                    format!("duplicate type parameter `{}`", name.id),
                    ErrorKind::DuplicateTypeParam,
                );
            }
            if let Some(bound) = bound {
                self.bind_expr(bound);
            }
            if let Some(default) = default {
                self.bind_expr(default);
            }
            let decl = Declaration::TypeParam(TypeParamDeclaration {
                header: self.declaration_header(name.range()),
                kind,
                has_bound: bound.is_some(),
                has_default: default.is_some(),
            });
            self.declare(&name.id, SymbolFlags::empty(), decl);
        }
        let flow_after = self.current_flow();
        self.restore_scope(saved);
        self.set_current_flow(flow_after);
        Some(scope)
    }

    pub(crate) fn enter_scope(&mut self, scope: Idx<Scope>) -> (Idx<Scope>, Idx<FlowNode>) {
        let saved = (self.current_scope, self.current_flow);
        self.current_scope = scope;
        saved
    }

    pub(crate) fn restore_scope(&mut self, saved: (Idx<Scope>, Idx<FlowNode>)) {
        self.current_scope = saved.0;
        self.current_flow = saved.1;
    }

    pub(crate) fn record_node_scope(&mut self, range: TextRange) {
        self.side_table.set_scope(range, self.current_scope);
    }

    pub(crate) fn push_loop(&mut self, break_label: Idx<FlowNode>, continue_label: Idx<FlowNode>) {
        self.loop_stack.push(LoopContext {
            break_label,
            continue_label,
        });
    }

    pub(crate) fn pop_loop(&mut self) {
        self.loop_stack.pop();
    }

    pub(crate) fn record_break(&mut self) {
        self.note_finally_escape();
        if let Some(ctx) = self.loop_stack.last() {
            self.flow.add_antecedent(ctx.break_label, self.current_flow);
        }
        self.set_unreachable();
    }

    pub(crate) fn record_continue(&mut self) {
        self.note_finally_escape();
        if let Some(ctx) = self.loop_stack.last() {
            self.flow.add_antecedent(ctx.continue_label, self.current_flow);
        }
        self.set_unreachable();
    }

    pub(crate) fn in_loop(&self) -> bool {
        !self.loop_stack.is_empty()
    }

    pub(crate) fn push_finally(&mut self, pre_finally_gate: Idx<FlowNode>) {
        self.finally_stack.push(FinallyContext { pre_finally_gate });
    }

    pub(crate) fn pop_finally(&mut self) -> Option<Idx<FlowNode>> {
        self.finally_stack.pop().map(|f| f.pre_finally_gate)
    }

    /// Opens a new escape-collection frame for a `try` that has a
    /// `finally` clause (spec.md §4.3). Paired with `pop_finally_frame`.
    pub(crate) fn push_finally_frame(&mut self) {
        self.finally_escape_stack.push(Vec::new());
    }

    /// Closes the current escape-collection frame, returning every flow
    /// state recorded into it by `note_finally_escape` while it was open.
    pub(crate) fn pop_finally_frame(&mut self) -> Vec<Idx<FlowNode>> {
        self.finally_escape_stack.pop().unwrap_or_default()
    }

    /// Records the current flow state as an early-exit point that a
    /// surrounding `finally` must still observe. A no-op outside any
    /// `try`/`finally`.
    pub(crate) fn note_finally_escape(&mut self) {
        if let Some(layer) = self.finally_escape_stack.last_mut() {
            layer.push(self.current_flow);
        }
    }

    /// Opens a new except-target frame: `labels` are the entry points of
    /// every handler attached to the `try` whose body is about to be
    /// walked (spec.md §4.3). Paired with `pop_except_targets`.
    pub(crate) fn push_except_targets(&mut self, labels: Vec<Idx<FlowNode>>) {
        self.except_targets_stack.push(labels);
    }

    pub(crate) fn pop_except_targets(&mut self) {
        self.except_targets_stack.pop();
    }

    pub(crate) fn push_class_name(&mut self, name: Name) {
        self.class_name_stack.push(name);
    }

    pub(crate) fn pop_class_name(&mut self) {
        self.class_name_stack.pop();
    }

    pub(crate) fn current_class_name(&self) -> Option<&Name> {
        self.class_name_stack.last()
    }

    pub(crate) fn push_active_function(
        &mut self,
        scope: Idx<Scope>,
        symbol: SymbolId,
        is_async: bool,
        return_label: Idx<FlowNode>,
    ) {
        self.function_stack.push(ActiveFunction {
            scope,
            symbol,
            is_async,
            return_label,
        });
    }

    pub(crate) fn pop_active_function(&mut self) {
        self.function_stack.pop();
    }

    pub(crate) fn in_async_function(&self) -> bool {
        self.function_stack.last().is_some_and(|f| f.is_async)
    }

    pub(crate) fn in_function(&self) -> bool {
        !self.function_stack.is_empty()
    }

    /// Whether the walk is currently inside the deferred part of a
    /// generator expression, where `await` is allowed even without an
    /// enclosing async function because the generator's execution is
    /// deferred until iterated (spec.md §7).
    pub(crate) fn in_deferred_generator_expr(&self) -> bool {
        self.generator_expr_depth > 0
    }

    pub(crate) fn enter_generator_expr(&mut self) {
        self.generator_expr_depth += 1;
    }

    pub(crate) fn exit_generator_expr(&mut self) {
        self.generator_expr_depth -= 1;
    }

    /// Whether `async for`/`async with`/`await` are allowed here purely on
    /// account of notebook mode: top-level code in a notebook cell is
    /// allowed to use these constructs outside an async function (spec.md
    /// §7's "allowed in notebook mode at module level").
    pub(crate) fn notebook_top_level_exception(&self) -> bool {
        self.file_info.ipython_mode && self.is_module_scope()
    }

    fn active_function_declaration_mut(&mut self) -> Option<&mut Declaration> {
        let top = *self.function_stack.last()?;
        self.scopes
            .symbol_mut(top.scope, top.symbol)
            .and_then(|sym| sym.last_declaration_mut())
    }

    pub(crate) fn record_return(&mut self, range: TextRange) {
        self.note_finally_escape();
        if let Some(top) = self.function_stack.last() {
            let label = top.return_label;
            if !self.is_unreachable() {
                self.flow.add_antecedent(label, self.current_flow);
            }
        }
        if let Some(Declaration::Function(f)) = self.active_function_declaration_mut() {
            f.record_return(range);
        }
    }

    pub(crate) fn record_yield(&mut self, range: TextRange) {
        if let Some(Declaration::Function(f)) = self.active_function_declaration_mut() {
            f.record_yield(range);
        }
    }

    pub(crate) fn record_raise(&mut self, range: TextRange) {
        self.note_finally_escape();
        if let Some(Declaration::Function(f)) = self.active_function_declaration_mut() {
            f.record_raise(range);
        }
    }

    pub(crate) fn push_method_context(&mut self, ctx: Option<MethodContext>) {
        self.method_context_stack.push(ctx);
    }

    pub(crate) fn pop_method_context(&mut self) {
        self.method_context_stack.pop();
    }

    pub(crate) fn current_method_context(&self) -> Option<&MethodContext> {
        self.method_context_stack.last().and_then(|c| c.as_ref())
    }

    pub(crate) fn global_nonlocal_state(&mut self, scope: Idx<Scope>) -> &mut GlobalNonlocalState {
        self.global_nonlocal.entry(scope).or_default()
    }

    pub(crate) fn set_binding_type(&mut self, scope: Idx<Scope>, name: Name, kind: BindingType) {
        self.scopes.set_binding_type(scope, name, kind);
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn enqueue_function_body(
        &mut self,
        scope: Idx<Scope>,
        body: Vec<Stmt>,
        method_context: Option<MethodContext>,
        param_symbols: Vec<(SymbolId, TextRange)>,
        symbol: SymbolId,
        is_async: bool,
        def_range: TextRange,
    ) {
        let snapshot = self
            .scopes
            .get(self.current_scope)
            .code_flow_expressions()
            .cloned()
            .collect();
        self.deferred.enqueue(DeferredTask {
            scope,
            code_flow_expressions: snapshot,
            method_context,
            param_symbols,
            function: Some(FunctionContext {
                symbol,
                is_async,
                def_range,
            }),
            work: DeferredWork::FunctionBody(body),
        });
    }

    pub(crate) fn enqueue_lambda_body(
        &mut self,
        scope: Idx<Scope>,
        body: Expr,
        param_symbols: Vec<(SymbolId, TextRange)>,
    ) {
        let snapshot = self
            .scopes
            .get(self.current_scope)
            .code_flow_expressions()
            .cloned()
            .collect();
        self.deferred.enqueue(DeferredTask {
            scope,
            code_flow_expressions: snapshot,
            method_context: None,
            param_symbols,
            function: None,
            work: DeferredWork::LambdaBody(Box::new(body)),
        });
    }

    /// Binder-synthesized names present in every class body without a
    /// source-level declaration (spec.md §4.2).
    pub(crate) fn declare_class_intrinsics(&mut self, class_range: TextRange) {
        for (name, desc) in [
            ("__doc__", "the class docstring"),
            ("__module__", "the defining module's name"),
            ("__qualname__", "the class's qualified name"),
        ] {
            let decl = Declaration::Intrinsic(IntrinsicDeclaration {
                header: self.declaration_header(class_range),
                description: desc,
            });
            self.declare(&Name::new(name), SymbolFlags::CLASS_MEMBER, decl);
        }
    }

    /// Records that `bound_name` names a recognized `typing`/
    /// `typing_extensions`/`dataclasses` member or module alias, consulted
    /// later by `evaluate_static_bool_like_expression` via the
    /// `NameResolver` implementation below (spec.md §4.3's `TYPE_CHECKING`
    /// handling).
    pub(crate) fn record_typing_alias(&mut self, bound_name: &Name, canonical: String) {
        if let Some(sym) = self.scopes.lookup_mut(self.current_scope, bound_name) {
            sym.set_typing_alias(canonical);
        }
    }

    pub(crate) fn report(&self, range: TextRange, msg: String, kind: ErrorKind) {
        self.errors.add(range, msg, kind);
    }
}

impl NameResolver for Binder<'_> {
    fn resolve_special(&self, name: &str) -> Option<SpecialExport> {
        let key = Name::new(name);
        let (_, scope) = self.scopes.lookup_recursive(self.current_scope, &key)?;
        let sym = self.scopes.lookup(scope, &key)?;
        sym.typing_alias().and_then(SpecialExport::from_canonical_name)
    }

    fn resolve_dotted(&self, value: &Expr, attr: &str) -> Option<String> {
        let Expr::Name(n) = value else {
            return None;
        };
        if let Some((_, scope)) = self.scopes.lookup_recursive(self.current_scope, &n.id) {
            if let Some(sym) = self.scopes.lookup(scope, &n.id) {
                if let Some(alias) = sym.typing_alias() {
                    return Some(format!("{alias}.{attr}"));
                }
            }
        }
        Some(format!("{}.{}", n.id.as_str(), attr))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use ruff_python_parser::parse_suite;

    use super::*;
    use crate::error::style::ErrorStyle;
    use crate::export::exports::FixedModuleEnv;
    use crate::module::module_info::ModulePath;
    use crate::module::module_name::ModuleName;

    fn bind(src: &str) -> BoundModule {
        let body = parse_suite(src, "<test>").unwrap();
        let module_info = ModuleInfo::new(
            ModuleName::from_dotted("main").unwrap(),
            ModulePath::filesystem(Path::new("main.py").to_owned()),
            Arc::new(src.to_owned()),
        );
        let errors = ErrorCollector::new(module_info.clone(), ErrorStyle::Never, Default::default());
        let env = FixedModuleEnv::new();
        let binder = Binder::new(module_info, AnalyzerFileInfo::default(), &env, &env, &errors);
        binder.bind_module(&body)
    }

    #[test]
    fn test_simple_assignment_binds_module_symbol() {
        let bound = bind("x = 1\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("x")).is_some());
    }

    #[test]
    fn test_function_def_binds_name_and_defers_body() {
        let bound = bind("def f():\n    return 1\n");
        let module = bound.scopes.module_scope();
        let sym = bound.scopes.lookup(module, &Name::new("f")).unwrap();
        assert_eq!(sym.declarations().len(), 1);
        assert!(matches!(sym.declarations()[0], Declaration::Function(_)));
    }

    #[test]
    fn test_if_else_both_assign_leaves_y_bound() {
        let bound = bind("if cond:\n    x = 1\nelse:\n    x = 2\ny = 3\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("y")).is_some());
    }

    #[test]
    fn test_class_def_binds_intrinsics_and_members() {
        let bound = bind("class C:\n    x = 1\n");
        let module = bound.scopes.module_scope();
        let sym = bound.scopes.lookup(module, &Name::new("C")).unwrap();
        assert!(matches!(sym.declarations()[0], Declaration::Class(_)));
    }

    #[test]
    fn test_import_binds_first_component() {
        let bound = bind("import a.b.c\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("a")).is_some());
    }

    #[test]
    fn test_global_in_function_sets_override() {
        let bound = bind("x = 1\ndef f():\n    global x\n    x = 2\n");
        let module = bound.scopes.module_scope();
        let f_sym = bound.scopes.lookup(module, &Name::new("f")).unwrap();
        assert!(matches!(f_sym.declarations()[0], Declaration::Function(_)));
    }

    /// spec.md §8 scenario 4 / §4.5: `a`, `b`, `c` end up in `__all__` and
    /// get `inDunderAll`; `d` doesn't and is marked `privateMember` outside
    /// a stub/typed-package file (the default `AnalyzerFileInfo` used by
    /// `bind()` here).
    #[test]
    fn test_dunder_all_closure_marks_in_all_and_excluded_names() {
        let bound = bind(
            "__all__ = [\"a\", \"b\"]\n__all__.append(\"c\")\ndef a(): ...\ndef b(): ...\ndef c(): ...\ndef d(): ...\n",
        );
        let module = bound.scopes.module_scope();
        for name in ["a", "b", "c"] {
            let sym = bound.scopes.lookup(module, &Name::new(name)).unwrap();
            assert!(sym.has_flags(SymbolFlags::IN_DUNDER_ALL), "{name} should be in __all__");
        }
        let d = bound.scopes.lookup(module, &Name::new("d")).unwrap();
        assert!(!d.has_flags(SymbolFlags::IN_DUNDER_ALL));
    }

    #[test]
    fn test_private_name_outside_stub_marked_private_member() {
        let bound = bind("_helper = 1\n");
        let module = bound.scopes.module_scope();
        let sym = bound.scopes.lookup(module, &Name::new("_helper")).unwrap();
        assert!(sym.has_flags(SymbolFlags::PRIVATE_MEMBER));
    }

    #[test]
    fn test_mangled_class_member_is_externally_hidden() {
        let bound = bind("class C:\n    __secret = 1\n");
        let module = bound.scopes.module_scope();
        let c_sym = bound.scopes.lookup(module, &Name::new("C")).unwrap();
        let Declaration::Class(class_decl) = &c_sym.declarations()[0] else {
            panic!("expected class declaration");
        };
        let class_scope = bound.side_table.scope_at(class_decl.header.range).unwrap();
        let secret = bound.scopes.lookup(class_scope, &Name::new("__secret")).unwrap();
        assert!(secret.has_flags(SymbolFlags::EXTERNALLY_HIDDEN));
    }

    #[test]
    fn test_potential_private_in_stub_deferred_to_dunder_all() {
        let body = parse_suite("__all__ = [\"_x\"]\n_x = 1\n_y = 2\n", "<test>").unwrap();
        let module_info = ModuleInfo::new(
            ModuleName::from_dotted("main").unwrap(),
            ModulePath::filesystem(Path::new("main.pyi").to_owned()),
            Arc::new("".to_owned()),
        );
        let errors = ErrorCollector::new(module_info.clone(), ErrorStyle::Never, Default::default());
        let env = FixedModuleEnv::new();
        let file_info = AnalyzerFileInfo {
            is_stub: true,
            ..AnalyzerFileInfo::default()
        };
        let binder = Binder::new(module_info, file_info, &env, &env, &errors);
        let bound = binder.bind_module(&body);
        let module = bound.scopes.module_scope();
        let x = bound.scopes.lookup(module, &Name::new("_x")).unwrap();
        assert!(x.has_flags(SymbolFlags::IN_DUNDER_ALL));
        assert!(!x.has_flags(SymbolFlags::PRIVATE_MEMBER));
        let y = bound.scopes.lookup(module, &Name::new("_y")).unwrap();
        assert!(y.has_flags(SymbolFlags::PRIVATE_MEMBER));
    }
}
