/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Statement binding (spec.md §4.2, §4.3): the module-level driver for
//! everything that isn't an expression. `bind_stmts` walks a statement
//! sequence in order, threading `current_flow` through each one;
//! `bind_stmt` dispatches on the AST node and is where every
//! construct-to-declaration mapping in spec.md §4.2's table and every
//! control-flow recipe in §4.3 actually gets built.

use ruff_python_ast::name::Name;
use ruff_python_ast::Alias;
use ruff_python_ast::ExceptHandler;
use ruff_python_ast::Expr;
use ruff_python_ast::ExprAttribute;
use ruff_python_ast::Stmt;
use ruff_python_ast::StmtAnnAssign;
use ruff_python_ast::StmtAssign;
use ruff_python_ast::StmtAugAssign;
use ruff_python_ast::StmtClassDef;
use ruff_python_ast::StmtFor;
use ruff_python_ast::StmtFunctionDef;
use ruff_python_ast::StmtIf;
use ruff_python_ast::StmtImportFrom;
use ruff_python_ast::StmtMatch;
use ruff_python_ast::StmtTry;
use ruff_python_ast::StmtWhile;
use ruff_python_ast::StmtWith;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;

use crate::ast::Ast;
use crate::binding::auxiliary::contains_yield;
use crate::binding::auxiliary::walk_dummy_scopes;
use crate::binding::bindings::Binder;
use crate::binding::bindings::MethodContext;
use crate::binding::declaration::ClassDeclaration;
use crate::binding::declaration::Declaration;
use crate::binding::declaration::FunctionDeclaration;
use crate::binding::declaration::TypeAliasDeclaration;
use crate::binding::declaration::VariableDeclaration;
use crate::binding::declaration::VariableSource;
use crate::binding::global_nonlocal::GlobalNonlocalError;
use crate::binding::import_alias::build_dotted_import_alias;
use crate::binding::import_alias::build_from_import_alias;
use crate::binding::import_alias::build_wildcard_import_aliases;
use crate::binding::member_access::classify as classify_member_access;
use crate::binding::member_access::MemberAccessKind;
use crate::binding::pattern::is_irrefutable_pattern;
use crate::binding::scope::BindingType;
use crate::binding::scope::ScopeKind;
use crate::binding::slots::disables_attribute_restriction;
use crate::binding::slots::recognize_slots;
use crate::binding::slots::slot_is_private;
use crate::binding::slots::DUNDER_SLOTS;
use crate::binding::static_eval::NameResolver;
use crate::binding::symbol::SymbolFlags;
use crate::error::kind::ErrorKind;
use crate::export::exports::ImportRequest;
use crate::export::special::SpecialExport;
use crate::module::module_name::ModuleName;

impl<'a> Binder<'a> {
    /// Binds a statement sequence in order (spec.md §4.3). Once a
    /// statement makes the flow unreachable, every statement after it is
    /// still walked far enough to allocate scopes for any nested `def`/
    /// `class` (so later lookups of those names don't fail), but none of
    /// it is bound as live flow.
    pub(crate) fn bind_stmts(&mut self, body: &[Stmt]) {
        for (idx, stmt) in body.iter().enumerate() {
            if self.is_unreachable() {
                self.side_table_mut().set_flow_before(stmt.range(), self.current_flow());
                self.bind_dummy_scopes(&body[idx..]);
                return;
            }
            self.side_table_mut().set_flow_before(stmt.range(), self.current_flow());
            self.bind_stmt(stmt);
        }
    }

    fn bind_dummy_scopes(&mut self, body: &[Stmt]) {
        walk_dummy_scopes(body, &mut |stmt| match stmt {
            Stmt::FunctionDef(f) => {
                let decl = Declaration::Function(FunctionDeclaration {
                    header: self.declaration_header(f.range()),
                    is_async: f.is_async,
                    is_generator: contains_yield(&f.body),
                    returns: Vec::new(),
                    yields: Vec::new(),
                    raises: Vec::new(),
                });
                self.declare(&f.name.id, SymbolFlags::empty(), decl);
            }
            Stmt::ClassDef(c) => {
                let decl = Declaration::Class(ClassDeclaration {
                    header: self.declaration_header(c.range()),
                });
                self.declare(&c.name.id, SymbolFlags::empty(), decl);
            }
            _ => {}
        });
    }

    fn bind_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Pass(_) | Stmt::IpyEscapeCommand(_) => {}
            Stmt::Expr(e) => self.bind_expr_stmt(&e.value, stmt.range()),
            Stmt::Assign(a) => self.bind_assign(a),
            Stmt::AugAssign(a) => self.bind_aug_assign(a),
            Stmt::AnnAssign(a) => self.bind_ann_assign(a),
            Stmt::TypeAlias(t) => {
                if let Expr::Name(n) = t.name.as_ref() {
                    let decl = Declaration::TypeAlias(TypeAliasDeclaration {
                        header: self.declaration_header(t.range()),
                    });
                    let sym = self.declare(&n.id, SymbolFlags::empty(), decl);
                    self.global_nonlocal_state(self.current_scope()).record_assignment(&n.id);
                    self.create_assignment_flow(sym, n.range(), false);
                }
                // `type X[P] = expr` (spec.md §4.2): `P` is only visible
                // inside `expr`, via the dedicated type-parameter scope.
                match self.bind_type_params(&t.type_params) {
                    Some(scope) => {
                        let saved = self.enter_scope(scope);
                        self.bind_expr(&t.value);
                        let flow_after = self.current_flow();
                        self.restore_scope(saved);
                        self.set_current_flow(flow_after);
                    }
                    None => self.bind_expr(&t.value),
                }
            }
            Stmt::Delete(d) => {
                for target in &d.targets {
                    self.bind_expr(target);
                }
            }
            Stmt::Return(r) => {
                if let Some(value) = &r.value {
                    self.bind_expr(value);
                }
                self.record_return(r.range());
                self.set_unreachable();
            }
            Stmt::Raise(r) => {
                if let Some(exc) = &r.exc {
                    self.bind_expr(exc);
                }
                if let Some(cause) = &r.cause {
                    self.bind_expr(cause);
                }
                self.record_raise(r.range());
                self.set_unreachable();
            }
            Stmt::Assert(a) => {
                self.bind_expr(&a.test);
                if let Some(msg) = &a.msg {
                    self.bind_expr(msg);
                }
                let narrowed = self.create_flow_conditional(&a.test, true);
                self.set_current_flow(narrowed);
            }
            Stmt::Break(_) => self.record_break(),
            Stmt::Continue(_) => self.record_continue(),
            Stmt::Global(g) => {
                for name in &g.names {
                    let scope = self.current_scope();
                    match self.global_nonlocal_state(scope).declare_global(&name.id) {
                        Ok(()) => self.set_binding_type(scope, name.id.clone(), BindingType::Global),
                        Err(err) => self.report_global_nonlocal_error(name.range(), &name.id, err),
                    }
                }
            }
            Stmt::Nonlocal(n) => {
                for name in &n.names {
                    let scope = self.current_scope();
                    let is_module = self.is_module_scope();
                    let has_binding = self.has_enclosing_function_binding(&name.id);
                    match self.global_nonlocal_state(scope).declare_nonlocal(&name.id, is_module, has_binding) {
                        Ok(()) => self.set_binding_type(scope, name.id.clone(), BindingType::Nonlocal),
                        Err(err) => self.report_global_nonlocal_error(name.range(), &name.id, err),
                    }
                }
            }
            Stmt::Import(imp) => {
                for alias in &imp.names {
                    self.bind_import_alias(alias);
                }
            }
            Stmt::ImportFrom(imp) => self.bind_import_from(imp),
            Stmt::If(s) => self.bind_if(s),
            Stmt::While(s) => self.bind_while(s),
            Stmt::For(s) => self.bind_for(s),
            Stmt::Try(s) => self.bind_try(s),
            Stmt::With(s) => self.bind_with(s),
            Stmt::Match(s) => self.bind_match(s),
            Stmt::FunctionDef(s) => self.bind_function_def(s),
            Stmt::ClassDef(s) => self.bind_class_def(s),
        }
    }

    // --- assignment targets -------------------------------------------

    /// Builds the `VariableDeclaration` shared by every plain-assignment
    /// construct in spec.md §4.2's table; callers fill in the
    /// construct-specific fields (annotation, `Final`/`ClassVar`, slots).
    pub(crate) fn new_variable_declaration(
        &mut self,
        range: TextRange,
        source: VariableSource,
        inferred_type_source: Option<TextRange>,
    ) -> VariableDeclaration {
        VariableDeclaration {
            header: self.declaration_header(range),
            source,
            is_constant: false,
            is_final: false,
            is_class_var: false,
            is_init_var: false,
            is_defined_by_slots: false,
            is_defined_by_member_access: false,
            is_explicit_binding: true,
            type_annotation: None,
            doc_string: None,
            inferred_type_source,
            type_alias_name: None,
        }
    }

    /// Binds one assignment target (spec.md §4.2): a plain name declares
    /// into the scope `global`/`nonlocal` retargets it to, a tuple/list/
    /// starred target recurses into its elements, an attribute target
    /// goes through the member-access disambiguator, and a subscript
    /// target is walked for name resolution only (it declares nothing).
    pub(crate) fn bind_assignment_target(&mut self, target: &Expr, source: VariableSource, inferred_type_source: Option<TextRange>) {
        match target {
            Expr::Name(n) => {
                let target_scope = self.target_scope_for(&n.id);
                let decl = self.new_variable_declaration(n.range(), source, inferred_type_source);
                let sym = self.declare_in(target_scope, &n.id, SymbolFlags::empty(), Declaration::Variable(decl));
                self.global_nonlocal_state(target_scope).record_assignment(&n.id);
                self.create_assignment_flow(sym, n.range(), false);
            }
            Expr::Tuple(t) => {
                for elt in &t.elts {
                    self.bind_assignment_target(elt, source, None);
                }
            }
            Expr::List(l) => {
                for elt in &l.elts {
                    self.bind_assignment_target(elt, source, None);
                }
            }
            Expr::Starred(s) => self.bind_assignment_target(&s.value, source, None),
            Expr::Attribute(attr) => self.bind_member_access_target(attr, inferred_type_source),
            Expr::Subscript(s) => {
                self.bind_expr(&s.value);
                self.bind_expr(&s.slice);
            }
            _ => self.bind_expr(target),
        }
    }

    /// `self.x = ...` / `cls.x = ...` inside a method body (spec.md
    /// §4.7): classifies the access and, if it names a real class- or
    /// instance-member write, declares it straight into the class's own
    /// scope rather than the method's local scope.
    fn bind_member_access_target(&mut self, attr: &ExprAttribute, inferred_type_source: Option<TextRange>) {
        self.bind_expr(&attr.value);
        let Some(lhs_name) = Ast::as_simple_name(&attr.value) else {
            return;
        };
        let Some(ctx) = self.current_method_context().cloned() else {
            return;
        };
        let decorators: Vec<&str> = ctx.decorators.iter().map(String::as_str).collect();
        let Some(kind) = classify_member_access(
            lhs_name,
            ctx.class_name.as_str(),
            ctx.method_name.as_str(),
            ctx.first_param.as_ref().map(Name::as_str),
            &decorators,
        ) else {
            return;
        };
        let is_slot = self
            .scopes()
            .get(ctx.class_scope)
            .slots_names()
            .is_some_and(|names| names.iter().any(|n| n.as_str() == attr.attr.as_str()));
        let mut flags = match kind {
            MemberAccessKind::ClassMember => SymbolFlags::CLASS_MEMBER,
            MemberAccessKind::InstanceMember => SymbolFlags::INSTANCE_MEMBER,
        };
        if is_slot {
            flags |= SymbolFlags::DEFINED_BY_SLOTS;
        }
        let mut decl = self.new_variable_declaration(attr.attr.range(), VariableSource::MemberAccess, inferred_type_source);
        decl.is_defined_by_member_access = true;
        decl.is_defined_by_slots = is_slot;
        self.declare_in(ctx.class_scope, &attr.attr.id, flags, Declaration::Variable(decl));
    }

    // --- simple assignment forms ---------------------------------------

    fn bind_expr_stmt(&mut self, value: &Expr, range: TextRange) {
        if self.is_module_scope() {
            if let Expr::Call(call) = value {
                if let Expr::Attribute(attr) = call.func.as_ref() {
                    if let Expr::Name(n) = attr.value.as_ref() {
                        if n.id.as_str() == "__all__" {
                            let other_all = call.arguments.args.first().and_then(|a| self.resolve_other_dunder_all(a));
                            let args: Vec<Expr> = call.arguments.args.to_vec();
                            let was_unsupported = self.dunder_all().uses_unsupported_form();
                            self.dunder_all_mut()
                                .observe_method_call("__all__", attr.attr.as_str(), &args, other_all.as_deref());
                            self.report_if_newly_unsupported(range, was_unsupported);
                        }
                    }
                }
            }
        }
        self.bind_expr(value);
    }

    fn bind_assign(&mut self, a: &StmtAssign) {
        self.bind_expr(&a.value);
        if self.is_module_scope() {
            for target in &a.targets {
                if let Expr::Name(n) = target {
                    let was_unsupported = self.dunder_all().uses_unsupported_form();
                    self.dunder_all_mut().observe_assign(n.id.as_str(), &a.value);
                    self.report_if_newly_unsupported(a.range(), was_unsupported);
                }
            }
        }
        for target in &a.targets {
            self.bind_assignment_target(target, VariableSource::Assignment, Some(a.value.range()));
        }
    }

    fn bind_aug_assign(&mut self, a: &StmtAugAssign) {
        self.bind_expr(&a.target);
        self.bind_expr(&a.value);
        if self.is_module_scope() {
            if let Expr::Name(n) = a.target.as_ref() {
                if n.id.as_str() == "__all__" {
                    let other_all = self.resolve_other_dunder_all(&a.value);
                    let was_unsupported = self.dunder_all().uses_unsupported_form();
                    self.dunder_all_mut().observe_aug_assign("__all__", &a.value, other_all.as_deref());
                    self.report_if_newly_unsupported(a.range(), was_unsupported);
                }
            }
        }
        self.bind_assignment_target(&a.target, VariableSource::Assignment, Some(a.value.range()));
    }

    fn bind_ann_assign(&mut self, a: &StmtAnnAssign) {
        self.bind_expr(&a.annotation);
        if let Some(value) = &a.value {
            self.bind_expr(value);
        }
        let special = self.classify_annotation_expr(&a.annotation);
        let is_final = matches!(special, Some(SpecialExport::Final));
        let is_class_var = matches!(special, Some(SpecialExport::ClassVar));
        let is_init_var = matches!(special, Some(SpecialExport::InitVar));

        let Expr::Name(n) = a.target.as_ref() else {
            self.bind_assignment_target(&a.target, VariableSource::Annotation, a.value.as_ref().map(Ranged::range));
            return;
        };
        if self.is_module_scope() && n.id.as_str() == "__all__" {
            if let Some(value) = &a.value {
                let was_unsupported = self.dunder_all().uses_unsupported_form();
                self.dunder_all_mut().observe_assign("__all__", value);
                self.report_if_newly_unsupported(a.range(), was_unsupported);
            }
        }

        let target_scope = self.target_scope_for(&n.id);
        let in_class_body = self.is_class_scope();
        let mut decl = self.new_variable_declaration(n.range(), VariableSource::Annotation, a.value.as_ref().map(Ranged::range));
        decl.type_annotation = Some(a.annotation.range());
        decl.is_final = is_final;
        decl.is_class_var = is_class_var && in_class_body;
        decl.is_init_var = is_init_var;
        let mut flags = SymbolFlags::empty();
        if in_class_body {
            flags |= SymbolFlags::CLASS_MEMBER;
            if decl.is_final {
                flags |= SymbolFlags::FINAL_VAR_IN_CLASS_BODY;
            }
            if decl.is_class_var {
                flags |= SymbolFlags::CLASS_VAR;
            }
            if is_init_var {
                flags |= SymbolFlags::INIT_VAR;
            }
        }
        let sym = self.declare_in(target_scope, &n.id, flags, Declaration::Variable(decl));
        self.global_nonlocal_state(target_scope).record_assignment(&n.id);
        self.create_variable_annotation_flow();
        if a.value.is_some() {
            self.create_assignment_flow(sym, n.range(), false);
        }
    }

    /// Recognizes `Final`, `ClassVar`, and `InitVar` written bare or
    /// subscripted (`Final[int]`) in an annotation position (spec.md
    /// §4.2's table).
    fn classify_annotation_expr(&self, annotation: &Expr) -> Option<SpecialExport> {
        let target = match annotation {
            Expr::Subscript(s) => s.value.as_ref(),
            other => other,
        };
        match target {
            Expr::Name(n) => self.resolve_special(n.id.as_str()),
            Expr::Attribute(attr) => self
                .resolve_dotted(&attr.value, attr.attr.as_str())
                .and_then(|dotted| SpecialExport::from_canonical_name(&dotted)),
            _ => None,
        }
    }

    fn report_if_newly_unsupported(&mut self, range: TextRange, was_unsupported: bool) {
        if !was_unsupported && self.dunder_all().uses_unsupported_form() {
            self.report(range, "`__all__` assigned a form other than a literal list/tuple of strings".to_owned(), ErrorKind::UnsupportedDunderAll);
        }
    }

    /// Resolves `<name>.__all__` back to the referenced module's own
    /// declared `__all__`, used by `__all__ += other.__all__` and
    /// `__all__.extend(other.__all__)` (spec.md §4.5, §9 Open Question 2).
    fn resolve_other_dunder_all(&self, value: &Expr) -> Option<Vec<Name>> {
        let Expr::Attribute(attr) = value else {
            return None;
        };
        if attr.attr.as_str() != "__all__" {
            return None;
        }
        let Expr::Name(n) = attr.value.as_ref() else {
            return None;
        };
        let (_, scope) = self.scopes().lookup_recursive(self.current_scope(), &n.id)?;
        let sym = self.scopes().lookup(scope, &n.id)?;
        for decl in sym.declarations().iter().rev() {
            if let Declaration::Alias(alias) = decl {
                if let Some(module) = &alias.resolved_module {
                    if let Some(exports) = self.import_lookup().lookup(module.clone()) {
                        return exports.dunder_all_names;
                    }
                }
            }
        }
        None
    }

    // --- global/nonlocal -------------------------------------------------

    /// Whether `name` is already bound in some enclosing function scope
    /// (spec.md §4.8's `nonlocal` error condition). Relies on the
    /// deferred-queue ordering guarantee that an enclosing function's own
    /// body finishes binding before any nested function's body is drained,
    /// so every name it ever binds is already present by the time this
    /// runs (spec.md §5, §9).
    fn has_enclosing_function_binding(&self, name: &Name) -> bool {
        let mut current = self.scopes().get(self.current_scope()).parent();
        while let Some(scope) = current {
            match self.scopes().get(scope).kind() {
                ScopeKind::Module | ScopeKind::Builtin => return false,
                ScopeKind::Function if self.scopes().lookup(scope, name).is_some() => return true,
                _ => {}
            }
            current = self.scopes().get(scope).parent();
        }
        false
    }

    fn report_global_nonlocal_error(&mut self, range: TextRange, name: &Name, err: GlobalNonlocalError) {
        let msg = match err {
            GlobalNonlocalError::NonlocalAtModuleScope => {
                format!("nonlocal declaration of `{name}` not allowed at module level")
            }
            GlobalNonlocalError::NonlocalWithNoEnclosingBinding => {
                format!("no binding for nonlocal `{name}` found in any enclosing function scope")
            }
            GlobalNonlocalError::ConflictingOverride => {
                format!("`{name}` cannot be declared both global and nonlocal")
            }
            GlobalNonlocalError::AlreadyAssigned => {
                format!("`{name}` is assigned before this global/nonlocal declaration")
            }
        };
        self.report(range, msg, ErrorKind::BadGlobalOrNonlocal);
    }

    // --- imports ----------------------------------------------------------

    fn bind_import_alias(&mut self, alias: &Alias) {
        let Some(module) = ModuleName::from_dotted(alias.name.id.as_str()) else {
            return;
        };
        let decl = build_dotted_import_alias(self.module_info().path(), &module, alias.range(), self.import_resolver());
        let bind_name = match &alias.asname {
            Some(asname) => asname.id.clone(),
            None => module.first_component(),
        };
        let target_scope = self.target_scope_for(&bind_name);
        let sym = self.declare_in(target_scope, &bind_name, SymbolFlags::empty(), Declaration::Alias(decl));
        self.global_nonlocal_state(target_scope).record_assignment(&bind_name);
        self.create_assignment_flow(sym, alias.range(), false);
        let canonical = if alias.asname.is_some() {
            module.to_string()
        } else {
            bind_name.to_string()
        };
        self.record_typing_alias(&bind_name, canonical);
    }

    fn bind_import_from(&mut self, imp: &StmtImportFrom) {
        let tail = imp.module.as_ref().map(|m| &m.id);
        let Some(module) = self.module_info().name().new_maybe_relative(self.module_info().path().is_init(), imp.level, tail) else {
            self.report(imp.range(), "attempted relative import beyond top-level package".to_owned(), ErrorKind::ImportError);
            return;
        };
        for alias in &imp.names {
            if alias.name.id.as_str() == "*" {
                self.bind_wildcard_import(&module, alias.range());
            } else {
                self.bind_from_import_alias(&module, alias);
            }
        }
    }

    fn bind_from_import_alias(&mut self, module: &ModuleName, alias: &Alias) {
        let imported_name = alias.name.id.clone();
        let exports = self.import_lookup().lookup(module.clone());
        let module_exports_contains = exports.as_ref().is_some_and(|e| e.contains(&imported_name));
        let request = ImportRequest {
            leading_dots: 0,
            name_parts: module.append(&imported_name).components(),
            imported_symbols: None,
        };
        let submodule_result = self.import_resolver().resolve(self.module_info().path(), &request);
        let decl = build_from_import_alias(module, &imported_name, alias.range(), module_exports_contains, submodule_result.is_import_found);
        let bind_name = alias.asname.as_ref().map(|a| a.id.clone()).unwrap_or_else(|| imported_name.clone());
        let target_scope = self.target_scope_for(&bind_name);
        let sym = self.declare_in(target_scope, &bind_name, SymbolFlags::empty(), Declaration::Alias(decl));
        self.global_nonlocal_state(target_scope).record_assignment(&bind_name);
        self.create_assignment_flow(sym, alias.range(), false);
        self.record_typing_alias(&bind_name, format!("{module}.{imported_name}"));
    }

    fn bind_wildcard_import(&mut self, module: &ModuleName, range: TextRange) {
        if !self.is_module_scope() {
            self.report(range, "wildcard import only allowed at module scope".to_owned(), ErrorKind::WildcardImportScope);
        }
        let aliases = build_wildcard_import_aliases(module, range, self.import_lookup());
        let mut names = Vec::with_capacity(aliases.len());
        for (name, decl) in aliases {
            let target_scope = self.target_scope_for(&name);
            let sym = self.declare_in(target_scope, &name, SymbolFlags::empty(), Declaration::Alias(decl));
            self.global_nonlocal_state(target_scope).record_assignment(&name);
            self.create_assignment_flow(sym, range, false);
            names.push(name);
        }
        self.create_wildcard_import_flow(range, names);
    }

    // --- control flow -------------------------------------------------

    /// `if`/`elif`/`else` (spec.md §4.3): each test is evaluated under the
    /// flow reached when every earlier test was false; the branch exits
    /// (plus an implicit-else gate when there's no explicit `else`) join
    /// into the flow after the whole chain.
    fn bind_if(&mut self, stmt: &StmtIf) {
        let branches = Ast::if_branches(stmt);
        let mut ends = Vec::new();
        let mut current_false = self.current_flow();
        let mut has_else = false;
        let mut last_test = None;
        for &(test, body) in &branches {
            match test {
                Some(test) => {
                    last_test = Some(test);
                    self.set_current_flow(current_false);
                    self.bind_expr(test);
                    let then_flow = self.create_flow_conditional(test, true);
                    self.set_current_flow(then_flow);
                    self.bind_stmts(body);
                    ends.push(self.current_flow());
                    self.set_current_flow(current_false);
                    current_false = self.create_flow_conditional(test, false);
                }
                None => {
                    has_else = true;
                    self.set_current_flow(current_false);
                    self.bind_stmts(body);
                    ends.push(self.current_flow());
                }
            }
        }
        if !has_else {
            let implicit_else = match last_test {
                Some(test) => {
                    self.set_current_flow(current_false);
                    self.create_implicit_else_conditional(test)
                }
                None => current_false,
            };
            ends.push(implicit_else);
        }
        let joined = self.join_flows(&ends);
        self.set_current_flow(joined);
    }

    /// `while` (spec.md §4.3): the loop label sits before the test so
    /// both the first entry and every end-of-body back-edge re-evaluate
    /// it; `break` joins into a separate label resolved alongside the
    /// `else` tail after the loop.
    fn bind_while(&mut self, stmt: &StmtWhile) {
        let loop_label = self.create_loop_label_flow();
        self.flow_mut().add_antecedent(loop_label, self.current_flow());
        self.set_current_flow(loop_label);
        self.bind_expr(&stmt.test);
        let break_label = self.create_break_label_flow();
        self.push_loop(break_label, loop_label);
        let body_flow = self.create_flow_conditional(&stmt.test, true);
        self.set_current_flow(body_flow);
        self.bind_stmts(&stmt.body);
        if !self.is_unreachable() {
            self.flow_mut().add_antecedent(loop_label, self.current_flow());
        }
        self.pop_loop();
        self.set_current_flow(loop_label);
        let else_flow = self.create_flow_conditional(&stmt.test, false);
        self.set_current_flow(else_flow);
        self.bind_stmts(&stmt.orelse);
        let after_else = self.current_flow();
        let resolved_break = self.resolve_label(break_label);
        let joined = self.join_flows(&[after_else, resolved_break]);
        self.set_current_flow(joined);
    }

    /// `for` (spec.md §4.3): the iterable is walked once, the target is
    /// bound as a single assignment before the loop label (matching the
    /// spec's literal recipe rather than modeling per-iteration
    /// reassignment), and the loop label receives both that entry and the
    /// end-of-body back-edge.
    fn bind_for(&mut self, stmt: &StmtFor) {
        if stmt.is_async && !self.in_async_function() && !self.notebook_top_level_exception() {
            self.report(stmt.range(), "'async for' outside async function".to_owned(), ErrorKind::AsyncError);
        }
        self.bind_expr(&stmt.iter);
        self.bind_assignment_target(&stmt.target, VariableSource::ForTarget, Some(stmt.iter.range()));
        if let Some(key) = crate::binding::narrow::reference_key(&stmt.target) {
            self.scopes_mut().get_mut(self.current_scope()).add_code_flow_expression(key);
        }
        let loop_label = self.create_loop_label_flow();
        self.flow_mut().add_antecedent(loop_label, self.current_flow());
        self.set_current_flow(loop_label);
        let break_label = self.create_break_label_flow();
        self.push_loop(break_label, loop_label);
        self.bind_stmts(&stmt.body);
        if !self.is_unreachable() {
            self.flow_mut().add_antecedent(loop_label, self.current_flow());
        }
        self.pop_loop();
        self.set_current_flow(loop_label);
        self.bind_stmts(&stmt.orelse);
        let after_else = self.current_flow();
        let resolved_break = self.resolve_label(break_label);
        let joined = self.join_flows(&[after_else, resolved_break]);
        self.set_current_flow(joined);
    }

    /// `try`/`except`/`else`/`finally` (spec.md §4.3): every except
    /// handler gets its own entry label installed as an exception target
    /// for the duration of the try body; a `finally` clause additionally
    /// collects every return/raise/break/continue reached anywhere in
    /// try/except/else behind a `PreFinallyGate`, so the finally body
    /// always runs regardless of how control left the protected region.
    fn bind_try(&mut self, stmt: &StmtTry) {
        let has_finally = !stmt.finalbody.is_empty();
        let entry = self.current_flow();
        let handler_labels: Vec<_> = stmt.handlers.iter().map(|_| self.flow_mut().create_branch_label(None)).collect();

        if has_finally {
            self.push_finally_frame();
        }
        self.push_except_targets(handler_labels.clone());
        self.set_current_flow(entry);
        self.bind_stmts(&stmt.body);
        self.pop_except_targets();

        self.bind_stmts(&stmt.orelse);
        let mut normal_tails = vec![self.current_flow()];

        for (handler, &label) in stmt.handlers.iter().zip(&handler_labels) {
            let ExceptHandler::ExceptHandler(h) = handler;
            self.set_current_flow(label);
            self.push_except_suite();
            if let Some(ty) = &h.type_ {
                self.bind_expr(ty);
            }
            let exc_sym = h.name.as_ref().map(|name| {
                let decl = self.new_variable_declaration(name.range(), VariableSource::ExceptTarget, None);
                let sym = self.declare(&name.id, SymbolFlags::empty(), Declaration::Variable(decl));
                self.global_nonlocal_state(self.current_scope()).record_assignment(&name.id);
                self.create_assignment_flow(sym, name.range(), false);
                sym
            });
            self.bind_stmts(&h.body);
            if let (Some(name), Some(sym)) = (&h.name, exc_sym) {
                if !self.is_unreachable() {
                    self.create_unbind_flow(sym, name.range());
                }
            }
            self.pop_except_suite();
            normal_tails.push(self.current_flow());
        }

        if has_finally {
            let escapes = self.pop_finally_frame();
            let escape_join = self.flow_mut().create_branch_label(None);
            for e in escapes {
                self.flow_mut().add_antecedent(escape_join, e);
            }
            let resolved_escape_join = self.resolve_label(escape_join);
            self.set_current_flow(resolved_escape_join);
            let pre_finally_gate = self.create_pre_finally_gate_flow();

            let pre_finally_label = self.flow_mut().create_branch_label(None);
            for &tail in &normal_tails {
                self.flow_mut().add_antecedent(pre_finally_label, tail);
            }
            self.flow_mut().add_antecedent(pre_finally_label, pre_finally_gate);
            let resolved_pre_finally = self.resolve_label(pre_finally_label);

            self.set_current_flow(resolved_pre_finally);
            self.push_finally(pre_finally_gate);
            self.bind_stmts(&stmt.finalbody);
            self.pop_finally();
            self.create_post_finally_flow(pre_finally_gate, stmt.range());
        } else {
            let pre_finally_label = self.flow_mut().create_branch_label(None);
            for &tail in &normal_tails {
                self.flow_mut().add_antecedent(pre_finally_label, tail);
            }
            let resolved = self.resolve_label(pre_finally_label);
            self.set_current_flow(resolved);
        }
    }

    /// `with` (spec.md §4.3): models `__exit__` swallowing an exception
    /// raised anywhere in the body by chaining the body's exception
    /// targets into the same `PostContextManagerLabel` that the normal
    /// post-body flow joins into.
    fn bind_with(&mut self, stmt: &StmtWith) {
        if stmt.is_async && !self.in_async_function() && !self.notebook_top_level_exception() {
            self.report(stmt.range(), "'async with' outside async function".to_owned(), ErrorKind::AsyncError);
        }
        let mut expr_ranges = Vec::new();
        for item in &stmt.items {
            self.bind_expr(&item.context_expr);
            expr_ranges.push(item.context_expr.range());
            self.create_call_flow(item.context_expr.range());
            if let Some(target) = &item.optional_vars {
                self.bind_assignment_target(target, VariableSource::WithTarget, Some(item.context_expr.range()));
            }
        }
        let swallow_label = self.create_context_manager_label_flow(expr_ranges, stmt.is_async, true);
        self.flow_mut().add_antecedent(swallow_label, self.current_flow());
        self.push_except_targets(vec![swallow_label]);
        self.bind_stmts(&stmt.body);
        self.pop_except_targets();
        if !self.is_unreachable() {
            self.flow_mut().add_antecedent(swallow_label, self.current_flow());
        }
        let resolved = self.resolve_label(swallow_label);
        self.set_current_flow(resolved);
    }

    /// `match`/`case` (spec.md §4.3): each case narrows the subject under
    /// a `NarrowForPattern` node, applies its guard as a conditional, and
    /// its body joins into the post-match flow; if no case pattern is
    /// irrefutable, the fall-through path is gated as unreachable.
    fn bind_match(&mut self, stmt: &StmtMatch) {
        self.bind_expr(&stmt.subject);
        let subject_range = stmt.subject.range();
        let mut ends = Vec::new();
        let mut any_irrefutable = false;
        let mut prev_no_match = self.current_flow();
        for case in &stmt.cases {
            self.set_current_flow(prev_no_match);
            self.create_narrow_for_pattern_flow(subject_range, case.range());
            self.bind_pattern(&case.pattern);
            if is_irrefutable_pattern(&case.pattern) {
                any_irrefutable = true;
            }
            let body_flow = match &case.guard {
                Some(guard) => {
                    self.bind_expr(guard);
                    self.create_flow_conditional(guard, true)
                }
                None => self.current_flow(),
            };
            self.set_current_flow(body_flow);
            self.bind_stmts(&case.body);
            ends.push(self.current_flow());
            self.set_current_flow(prev_no_match);
            prev_no_match = match &case.guard {
                Some(guard) => self.create_flow_conditional(guard, false),
                None => self.current_flow(),
            };
        }
        self.set_current_flow(prev_no_match);
        self.create_narrow_for_pattern_flow(subject_range, stmt.range());
        if !any_irrefutable {
            self.create_exhausted_match_flow(stmt.range(), subject_range);
        }
        ends.push(self.current_flow());
        let joined = self.join_flows(&ends);
        self.set_current_flow(joined);
    }

    // --- def / class -------------------------------------------------

    /// `def` (spec.md §4.2, §4.3, §4.7): decorators, parameter defaults/
    /// annotations, and the return annotation are all evaluated in the
    /// *enclosing* scope before the function's own scope is entered; the
    /// body itself is enqueued rather than walked inline (spec.md §5).
    fn bind_function_def(&mut self, f: &StmtFunctionDef) {
        for dec in &f.decorator_list {
            self.bind_expr(&dec.expression);
        }
        self.bind_parameter_defaults(&f.parameters);

        // `def f[T](...)` (spec.md §4.2): `T` is visible to parameter
        // annotations and the return annotation, but not to defaults,
        // which evaluate in the enclosing scope.
        let type_param_scope = self.bind_type_params(&f.type_params);
        match type_param_scope {
            Some(tp_scope) => {
                let saved = self.enter_scope(tp_scope);
                self.bind_parameter_annotations(&f.parameters);
                if let Some(returns) = &f.returns {
                    self.bind_expr(returns);
                }
                let flow_after = self.current_flow();
                self.restore_scope(saved);
                self.set_current_flow(flow_after);
            }
            None => {
                self.bind_parameter_annotations(&f.parameters);
                if let Some(returns) = &f.returns {
                    self.bind_expr(returns);
                }
            }
        }

        let decl = Declaration::Function(FunctionDeclaration {
            header: self.declaration_header(f.range()),
            is_async: f.is_async,
            is_generator: contains_yield(&f.body),
            returns: Vec::new(),
            yields: Vec::new(),
            raises: Vec::new(),
        });
        let sym = self.declare(&f.name.id, SymbolFlags::empty(), decl);
        self.global_nonlocal_state(self.current_scope()).record_assignment(&f.name.id);
        self.create_assignment_flow(sym, f.name.range(), false);

        let is_method = self.is_class_scope();
        let class_name = self.current_class_name().cloned();
        let class_scope = self.current_scope();
        let decorators: Vec<String> = Ast::plain_decorator_names(&f.decorator_list).iter().map(|s| (*s).to_owned()).collect();

        let scope = match type_param_scope {
            Some(tp_scope) => self.push_child_scope_of(ScopeKind::Function, tp_scope),
            None => self.push_child_scope(ScopeKind::Function),
        };
        let saved = self.enter_scope(scope);
        self.record_node_scope(f.range());
        let param_symbols = self.declare_parameters(&f.parameters);
        let first_param = f
            .parameters
            .posonlyargs
            .first()
            .or_else(|| f.parameters.args.first())
            .map(|p| p.parameter.name.id.clone());
        self.restore_scope(saved);

        let method_context = if is_method {
            class_name.map(|class_name| MethodContext {
                class_name,
                method_name: f.name.id.clone(),
                first_param,
                decorators,
                class_scope,
            })
        } else {
            None
        };

        self.enqueue_function_body(scope, f.body.clone(), method_context, param_symbols, sym, f.is_async, f.range());
    }

    /// `class` (spec.md §4.2, §4.6, §4.7): unlike a function body, a
    /// class body executes immediately in the surrounding control flow,
    /// so it's walked inline rather than deferred.
    fn bind_class_def(&mut self, c: &StmtClassDef) {
        for dec in &c.decorator_list {
            self.bind_expr(&dec.expression);
        }

        // `class C[T](Base[T])` (spec.md §4.2): `T` must be visible to the
        // base-class argument list itself, so bases bind inside the
        // type-parameter scope when one exists.
        let type_param_scope = self.bind_type_params(&c.type_params);
        let bind_bases = |this: &mut Self| {
            if let Some(arguments) = &c.arguments {
                for arg in &arguments.args {
                    this.bind_expr(arg);
                }
                for kw in &arguments.keywords {
                    this.bind_expr(&kw.value);
                }
            }
        };
        match type_param_scope {
            Some(tp_scope) => {
                let saved = self.enter_scope(tp_scope);
                bind_bases(self);
                let flow_after = self.current_flow();
                self.restore_scope(saved);
                self.set_current_flow(flow_after);
            }
            None => bind_bases(self),
        }

        let decl = Declaration::Class(ClassDeclaration {
            header: self.declaration_header(c.range()),
        });
        let sym = self.declare(&c.name.id, SymbolFlags::empty(), decl);
        self.global_nonlocal_state(self.current_scope()).record_assignment(&c.name.id);
        self.create_assignment_flow(sym, c.name.range(), false);

        let scope = match type_param_scope {
            Some(tp_scope) => self.push_child_scope_of(ScopeKind::Class, tp_scope),
            None => self.push_child_scope(ScopeKind::Class),
        };
        let saved = self.enter_scope(scope);
        self.record_node_scope(c.range());
        self.push_class_name(c.name.id.clone());
        self.declare_class_intrinsics(c.range());
        self.bind_stmts(&c.body);
        self.pop_class_name();
        if let Some(names) = recognize_class_slots(&c.body) {
            for name in &names {
                if name.as_str() == "__dict__" {
                    continue;
                }
                let mut decl = self.new_variable_declaration(c.range(), VariableSource::Slot, None);
                decl.is_defined_by_slots = true;
                let mut flags = SymbolFlags::DEFINED_BY_SLOTS;
                if slot_is_private(name.as_str()) {
                    flags |= SymbolFlags::PRIVATE_MEMBER;
                }
                self.declare_in(scope, name, flags, Declaration::Variable(decl));
            }
            if !disables_attribute_restriction(&names) {
                self.scopes_mut().get_mut(scope).set_slots_names(names);
            }
        }
        let flow_after_class_body = self.current_flow();
        self.restore_scope(saved);
        self.set_current_flow(flow_after_class_body);
    }
}

fn recognize_class_slots(body: &[Stmt]) -> Option<Vec<Name>> {
    for stmt in body {
        let (target, value) = match stmt {
            Stmt::Assign(a) if a.targets.len() == 1 => (&a.targets[0], Some(a.value.as_ref())),
            Stmt::AnnAssign(a) => (a.target.as_ref(), a.value.as_deref()),
            _ => continue,
        };
        let Expr::Name(n) = target else { continue };
        if n.id.as_str() != DUNDER_SLOTS {
            continue;
        }
        if let Some(value) = value {
            if let Some(names) = recognize_slots(value) {
                return Some(names);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use ruff_python_parser::parse_suite;
    use ruff_text_size::TextSize;

    use super::*;
    use crate::binding::bindings::BoundModule;
    use crate::binding::file_info::AnalyzerFileInfo;
    use crate::error::collector::ErrorCollector;
    use crate::error::style::ErrorStyle;
    use crate::export::exports::FixedModuleEnv;
    use crate::module::module_info::ModuleInfo;
    use crate::module::module_info::ModulePath;

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
    fn test_while_break_joins_after_loop() {
        let bound = bind("while True:\n    if cond:\n        break\n    x = 1\ny = 2\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("y")).is_some());
    }

    #[test]
    fn test_for_binds_target_and_else() {
        let bound = bind("for x in items:\n    y = x\nelse:\n    z = 1\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("x")).is_some());
        assert!(bound.scopes.lookup(module, &Name::new("z")).is_some());
    }

    #[test]
    fn test_try_finally_runs_on_return() {
        let bound = bind("def f():\n    try:\n        return 1\n    finally:\n        cleanup()\n");
        let module = bound.scopes.module_scope();
        let sym = bound.scopes.lookup(module, &Name::new("f")).unwrap();
        assert!(matches!(sym.declarations()[0], Declaration::Function(_)));
    }

    #[test]
    fn test_except_name_declared_and_unbound() {
        let bound = bind("try:\n    pass\nexcept ValueError as e:\n    x = e\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("e")).is_some());
    }

    #[test]
    fn test_with_binds_target() {
        let bound = bind("with open('f') as fh:\n    data = fh.read()\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("fh")).is_some());
    }

    #[test]
    fn test_match_binds_capture_and_exhausted_gate() {
        let bound = bind("match command:\n    case 'go':\n        x = 1\n    case other:\n        y = other\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("other")).is_some());
    }

    #[test]
    fn test_global_then_assign_reaches_module_scope() {
        let bound = bind("x = 1\ndef f():\n    global x\n    x = 2\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("x")).is_some());
    }

    #[test]
    fn test_nonlocal_without_enclosing_binding_errors() {
        let body = parse_suite("def f():\n    def g():\n        nonlocal missing\n", "<test>").unwrap();
        let module_info = ModuleInfo::new(
            ModuleName::from_dotted("main").unwrap(),
            ModulePath::filesystem(Path::new("main.py").to_owned()),
            Arc::new("".to_owned()),
        );
        let errors = ErrorCollector::new(module_info.clone(), ErrorStyle::Delayed, Default::default());
        let env = FixedModuleEnv::new();
        let binder = Binder::new(module_info, AnalyzerFileInfo::default(), &env, &env, &errors);
        let _ = binder.bind_module(&body);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_wildcard_import_reports_outside_module_scope() {
        let body = parse_suite("def f():\n    from os import *\n", "<test>").unwrap();
        let module_info = ModuleInfo::new(
            ModuleName::from_dotted("main").unwrap(),
            ModulePath::filesystem(Path::new("main.py").to_owned()),
            Arc::new("".to_owned()),
        );
        let errors = ErrorCollector::new(module_info.clone(), ErrorStyle::Delayed, Default::default());
        let env = FixedModuleEnv::new();
        let binder = Binder::new(module_info, AnalyzerFileInfo::default(), &env, &env, &errors);
        let _ = binder.bind_module(&body);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_unreachable_after_return_still_declares_nested_def() {
        let bound = bind("def f():\n    return 1\n    def g():\n        pass\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("f")).is_some());
    }

    #[test]
    fn test_slots_flag_member_symbol() {
        let bound = bind("class C:\n    __slots__ = ('x',)\n\n    def __init__(self):\n        self.x = 1\n");
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("C")).is_some());
    }

    fn range_of(src: &str, needle: &str) -> TextRange {
        let start = src.find(needle).unwrap();
        TextRange::new(TextSize::new(start as u32), TextSize::new((start + needle.len()) as u32))
    }

    #[test]
    fn test_function_type_param_scope_holds_param_and_is_proxy() {
        let src = "def f[T](x: T) -> T:\n    return x\n";
        let bound = bind(src);
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("f")).is_some());

        let tp_scope = bound.side_table.scope_at(range_of(src, "[T]")).unwrap();
        assert!(bound.scopes.lookup(tp_scope, &Name::new("T")).is_some());
        // A type-parameter scope is transparent to scope-kind queries: its
        // nearest enclosing function scope is whatever encloses the `def`
        // itself, not the `def` it's attached to.
        assert_eq!(bound.scopes.global_scope(tp_scope), module);
    }

    #[test]
    fn test_class_type_param_scope_sees_base_class_argument() {
        let src = "class C[T](Base[T]):\n    pass\n";
        let bound = bind(src);
        let module = bound.scopes.module_scope();
        assert!(bound.scopes.lookup(module, &Name::new("C")).is_some());

        let tp_scope = bound.side_table.scope_at(range_of(src, "[T]")).unwrap();
        assert!(bound.scopes.lookup(tp_scope, &Name::new("T")).is_some());
    }

    #[test]
    fn test_type_alias_type_param_scope_holds_param() {
        let src = "type Alias[T] = list[T]\n";
        let bound = bind(src);
        let module = bound.scopes.module_scope();
        let sym = bound.scopes.lookup(module, &Name::new("Alias")).unwrap();
        assert!(matches!(sym.declarations()[0], Declaration::TypeAlias(_)));

        let tp_scope = bound.side_table.scope_at(range_of(src, "[T]")).unwrap();
        assert!(bound.scopes.lookup(tp_scope, &Name::new("T")).is_some());
    }

    #[test]
    fn test_duplicate_type_param_name_errors() {
        let body = parse_suite("def f[T, T](x: T):\n    pass\n", "<test>").unwrap();
        let module_info = ModuleInfo::new(
            ModuleName::from_dotted("main").unwrap(),
            ModulePath::filesystem(Path::new("main.py").to_owned()),
            Arc::new("".to_owned()),
        );
        let errors = ErrorCollector::new(module_info.clone(), ErrorStyle::Delayed, Default::default());
        let env = FixedModuleEnv::new();
        let binder = Binder::new(module_info, AnalyzerFileInfo::default(), &env, &env, &errors);
        let _ = binder.bind_module(&body);
        assert!(!errors.is_empty());
    }

    /// spec.md §4.6: each slot name gets its own Variable declaration in
    /// the class scope, marked `isDefinedBySlots`, with a private-style
    /// name additionally marked `privateMember`.
    #[test]
    fn test_slots_declare_variables_in_class_scope() {
        let bound = bind("class C:\n    __slots__ = (\"x\", \"_y\")\n");
        let module = bound.scopes.module_scope();
        let c_sym = bound.scopes.lookup(module, &Name::new("C")).unwrap();
        let Declaration::Class(class_decl) = &c_sym.declarations()[0] else {
            panic!("expected class declaration");
        };
        let class_scope = bound.side_table.scope_at(class_decl.header.range).unwrap();

        let x = bound.scopes.lookup(class_scope, &Name::new("x")).unwrap();
        assert!(x.has_flags(SymbolFlags::DEFINED_BY_SLOTS));
        assert!(!x.has_flags(SymbolFlags::PRIVATE_MEMBER));

        let y = bound.scopes.lookup(class_scope, &Name::new("_y")).unwrap();
        assert!(y.has_flags(SymbolFlags::DEFINED_BY_SLOTS));
        assert!(y.has_flags(SymbolFlags::PRIVATE_MEMBER));

        assert_eq!(
            bound.scopes.get(class_scope).slots_names().unwrap(),
            &[Name::new("x"), Name::new("_y")]
        );
    }

    #[test]
    fn test_slots_with_dunder_dict_disables_restriction_list() {
        let bound = bind("class C:\n    __slots__ = (\"x\", \"__dict__\")\n");
        let module = bound.scopes.module_scope();
        let c_sym = bound.scopes.lookup(module, &Name::new("C")).unwrap();
        let Declaration::Class(class_decl) = &c_sym.declarations()[0] else {
            panic!("expected class declaration");
        };
        let class_scope = bound.side_table.scope_at(class_decl.header.range).unwrap();
        assert!(bound.scopes.get(class_scope).slots_names().is_none());
        assert!(bound.scopes.lookup(class_scope, &Name::new("x")).is_some());
    }

    fn bind_with_info(src: &str, file_info: AnalyzerFileInfo) -> (BoundModule, ErrorCollector) {
        let body = parse_suite(src, "<test>").unwrap();
        let module_info = ModuleInfo::new(
            ModuleName::from_dotted("main").unwrap(),
            ModulePath::filesystem(Path::new("main.py").to_owned()),
            Arc::new(src.to_owned()),
        );
        let errors = ErrorCollector::new(module_info.clone(), ErrorStyle::Delayed, Default::default());
        let env = FixedModuleEnv::new();
        let binder = Binder::new(module_info, file_info, &env, &env, &errors);
        let bound = binder.bind_module(&body);
        (bound, errors)
    }

    /// spec.md §7: `async for` at module scope, outside any async function,
    /// is an error.
    #[test]
    fn test_async_for_outside_async_function_errors() {
        let (_, errors) = bind_with_info("async for x in items:\n    pass\n", AnalyzerFileInfo::default());
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_async_for_inside_async_function_ok() {
        let (_, errors) =
            bind_with_info("async def f():\n    async for x in items:\n        pass\n", AnalyzerFileInfo::default());
        assert!(errors.is_empty());
    }

    /// spec.md §7: the module-level `async for`/`async with` restriction is
    /// lifted in notebook mode, matching the same exception as bare `await`.
    #[test]
    fn test_async_for_in_notebook_mode_ok() {
        let mut file_info = AnalyzerFileInfo::default();
        file_info.ipython_mode = true;
        let (_, errors) = bind_with_info("async for x in items:\n    pass\n", file_info);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_async_with_outside_async_function_errors() {
        let (_, errors) = bind_with_info("async with ctx() as c:\n    pass\n", AnalyzerFileInfo::default());
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_async_with_inside_async_function_ok() {
        let (_, errors) = bind_with_info(
            "async def f():\n    async with ctx() as c:\n        pass\n",
            AnalyzerFileInfo::default(),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_async_with_in_notebook_mode_ok() {
        let mut file_info = AnalyzerFileInfo::default();
        file_info.ipython_mode = true;
        let (_, errors) = bind_with_info("async with ctx() as c:\n    pass\n", file_info);
        assert!(errors.is_empty());
    }
}
