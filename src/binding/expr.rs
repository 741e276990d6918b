/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Expression binding (spec.md §4.3): most expressions are walked purely
//! for their side effects on the flow graph. A `Call` advances the flow
//! thread, `and`/`or` synthesize short-circuit branches, a walrus target
//! declares into its enclosing scope, a comprehension gets its own scope.
//! Reading a plain `Name` does nothing here; name *resolution* is a later
//! phase's job.

use ruff_python_ast::BoolOp as AstBoolOp;
use ruff_python_ast::Comprehension;
use ruff_python_ast::Expr;
use ruff_python_ast::ExprBoolOp;
use ruff_python_ast::ExprCall;
use ruff_python_ast::ExprIf;
use ruff_python_ast::ExprLambda;
use ruff_python_ast::ExprNamed;
use ruff_python_ast::ExprSubscript;
use ruff_python_ast::Parameter;
use ruff_python_ast::Parameters;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;

use crate::binding::bindings::Binder;
use crate::binding::declaration::Declaration;
use crate::binding::declaration::ParamDeclaration;
use crate::binding::declaration::VariableSource;
use crate::binding::scope::ScopeKind;
use crate::binding::static_eval::NameResolver;
use crate::binding::symbol::SymbolFlags;
use crate::binding::symbol::SymbolId;
use crate::error::kind::ErrorKind;
use crate::export::special::SpecialExport;

impl<'a> Binder<'a> {
    pub(crate) fn bind_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(_) => {}
            Expr::BoolOp(b) => self.bind_bool_op(b),
            Expr::Named(n) => self.bind_named(n),
            Expr::BinOp(b) => {
                self.bind_expr(&b.left);
                self.bind_expr(&b.right);
            }
            Expr::UnaryOp(u) => self.bind_expr(&u.operand),
            Expr::Lambda(l) => self.bind_lambda(l),
            Expr::If(e) => self.bind_if_exp(e),
            Expr::Dict(d) => {
                for item in &d.items {
                    if let Some(key) = &item.key {
                        self.bind_expr(key);
                    }
                    self.bind_expr(&item.value);
                }
            }
            Expr::Set(s) => {
                for e in &s.elts {
                    self.bind_expr(e);
                }
            }
            Expr::List(l) => {
                for e in &l.elts {
                    self.bind_expr(e);
                }
            }
            Expr::Tuple(t) => {
                for e in &t.elts {
                    self.bind_expr(e);
                }
            }
            Expr::ListComp(c) => self.bind_comprehension(vec![&c.elt], &c.generators, c.range(), false),
            Expr::SetComp(c) => self.bind_comprehension(vec![&c.elt], &c.generators, c.range(), false),
            Expr::DictComp(c) => self.bind_comprehension(vec![&c.key, &c.value], &c.generators, c.range(), false),
            Expr::Generator(c) => self.bind_comprehension(vec![&c.elt], &c.generators, c.range(), true),
            Expr::Await(a) => {
                self.bind_expr(&a.value);
                if !self.in_async_function()
                    && !self.in_deferred_generator_expr()
                    && !self.notebook_top_level_exception()
                {
                    self.report(a.range(), "'await' outside async function".to_owned(), ErrorKind::AsyncError);
                }
            }
            Expr::Yield(y) => {
                if let Some(v) = &y.value {
                    self.bind_expr(v);
                }
                if !self.in_function() {
                    self.report(y.range(), "'yield' outside function".to_owned(), ErrorKind::InvalidYield);
                }
                self.record_yield(y.range());
            }
            Expr::YieldFrom(y) => {
                self.bind_expr(&y.value);
                if !self.in_function() {
                    self.report(y.range(), "'yield from' outside function".to_owned(), ErrorKind::InvalidYield);
                } else if self.in_async_function() {
                    self.report(
                        y.range(),
                        "'yield from' not allowed in an async function".to_owned(),
                        ErrorKind::InvalidYield,
                    );
                }
                self.record_yield(y.range());
            }
            Expr::Compare(c) => {
                self.bind_expr(&c.left);
                for cmp in &c.comparators {
                    self.bind_expr(cmp);
                }
            }
            Expr::Call(c) => self.bind_call(c),
            Expr::Subscript(s) => self.bind_subscript(s),
            Expr::Starred(s) => self.bind_expr(&s.value),
            Expr::Attribute(a) => self.bind_expr(&a.value),
            Expr::Slice(s) => {
                if let Some(e) = &s.lower {
                    self.bind_expr(e);
                }
                if let Some(e) = &s.upper {
                    self.bind_expr(e);
                }
                if let Some(e) = &s.step {
                    self.bind_expr(e);
                }
            }
            // Literal leaves (numbers, strings, booleans, `None`, `...`) and
            // f-string interpolations: nothing to thread through the flow
            // graph or declare. F-string sub-expressions are intentionally
            // left unwalked here; narrowing and call-flow tracking inside
            // an interpolation is a rare enough pattern that the added
            // complexity of chasing `ruff`'s f-string part representation
            // isn't worth it for this binder.
            _ => {}
        }
    }

    fn bind_bool_op(&mut self, b: &ExprBoolOp) {
        let is_and = matches!(b.op, AstBoolOp::And);
        let mut exits = Vec::new();
        let n = b.values.len();
        for (i, value) in b.values.iter().enumerate() {
            self.bind_expr(value);
            if i + 1 < n {
                let short_circuit_exit = self.create_flow_conditional(value, !is_and);
                exits.push(short_circuit_exit);
                let continue_branch = self.create_flow_conditional(value, is_and);
                self.set_current_flow(continue_branch);
            }
        }
        exits.push(self.current_flow());
        let joined = self.join_flows(&exits);
        self.set_current_flow(joined);
    }

    /// `target := value` (spec.md §4.3): binds into the nearest enclosing
    /// non-comprehension scope, reporting a collision when an intervening
    /// comprehension scope already declares the same name.
    fn bind_named(&mut self, n: &ExprNamed) {
        self.bind_expr(&n.value);
        let Expr::Name(name) = n.target.as_ref() else {
            return;
        };
        let target_scope = self.scopes().nearest_non_comprehension_scope(self.current_scope());
        let mut scope = self.current_scope();
        while scope != target_scope {
            if self.scopes().lookup(scope, &name.id).is_some() {
                self.report(
                    name.range(),
                    format!("assignment expression cannot rebind comprehension variable `{}`", name.id),
                    ErrorKind::BadAssignment,
                );
                break;
            }
            scope = match self.scopes().get(scope).parent() {
                Some(p) => p,
                None => break,
            };
        }
        let decl = self.new_variable_declaration(name.range(), VariableSource::Assignment, Some(n.value.range()));
        let sym = self.declare_in(target_scope, &name.id, SymbolFlags::empty(), Declaration::Variable(decl));
        self.global_nonlocal_state(target_scope).record_assignment(&name.id);
        self.create_assignment_flow(sym, name.range(), false);
    }

    fn bind_if_exp(&mut self, e: &ExprIf) {
        self.bind_expr(&e.test);
        let antecedent = self.current_flow();
        let true_branch = self.create_flow_conditional(&e.test, true);
        self.set_current_flow(true_branch);
        self.bind_expr(&e.body);
        let after_true = self.current_flow();
        self.set_current_flow(antecedent);
        let false_branch = self.create_flow_conditional(&e.test, false);
        self.set_current_flow(false_branch);
        self.bind_expr(&e.orelse);
        let after_false = self.current_flow();
        let joined = self.join_flows(&[after_true, after_false]);
        self.set_current_flow(joined);
    }

    fn bind_call(&mut self, call: &ExprCall) {
        self.bind_expr(&call.func);
        for arg in &call.arguments.args {
            self.bind_expr(arg);
        }
        for kw in &call.arguments.keywords {
            self.bind_expr(&kw.value);
        }
        self.create_call_flow(call.range());
    }

    fn bind_subscript(&mut self, s: &ExprSubscript) {
        self.bind_expr(&s.value);
        if self.is_annotated_subscript(&s.value) {
            if let Expr::Tuple(t) = s.slice.as_ref() {
                if let Some((first, rest)) = t.elts.split_first() {
                    self.bind_expr(first);
                    // `Annotated[T, meta, ...]`: the metadata arguments are
                    // evaluated for name resolution but never get their own
                    // call-flow nodes (spec.md §4.3).
                    self.push_suppress_call_flow();
                    for e in rest {
                        self.bind_expr(e);
                    }
                    self.pop_suppress_call_flow();
                    return;
                }
            }
        }
        self.bind_expr(&s.slice);
    }

    fn is_annotated_subscript(&self, value: &Expr) -> bool {
        match value {
            Expr::Name(n) => self.resolve_special(n.id.as_str()) == Some(SpecialExport::Annotated),
            Expr::Attribute(a) => {
                self.resolve_dotted(&a.value, a.attr.as_str()).as_deref() == Some("typing.Annotated")
            }
            _ => false,
        }
    }

    fn bind_lambda(&mut self, lambda: &ExprLambda) {
        if let Some(parameters) = &lambda.parameters {
            self.bind_parameter_defaults_and_annotations(parameters);
        }
        let scope = self.push_child_scope(ScopeKind::Function);
        let saved = self.enter_scope(scope);
        self.record_node_scope(lambda.range());
        let param_symbols = match &lambda.parameters {
            Some(parameters) => self.declare_parameters(parameters),
            None => Vec::new(),
        };
        self.restore_scope(saved);
        self.enqueue_lambda_body(scope, (*lambda.body).clone(), param_symbols);
    }

    /// Evaluated in the *outer* scope, before the function/lambda scope is
    /// entered (spec.md §4.3): a default value or annotation can reference
    /// names shadowed by the parameter list itself. Used directly by
    /// lambdas, which can't declare type parameters; `def`s call the two
    /// halves (`bind_parameter_defaults`/`bind_parameter_annotations`)
    /// separately so annotations can see a PEP 695 type-parameter scope
    /// that default values deliberately cannot.
    pub(crate) fn bind_parameter_defaults_and_annotations(&mut self, parameters: &Parameters) {
        self.bind_parameter_defaults(parameters);
        self.bind_parameter_annotations(parameters);
    }

    pub(crate) fn bind_parameter_defaults(&mut self, parameters: &Parameters) {
        for p in parameters.posonlyargs.iter().chain(&parameters.args).chain(&parameters.kwonlyargs) {
            if let Some(default) = &p.default {
                self.bind_expr(default);
            }
        }
    }

    pub(crate) fn bind_parameter_annotations(&mut self, parameters: &Parameters) {
        for p in parameters.posonlyargs.iter().chain(&parameters.args).chain(&parameters.kwonlyargs) {
            if let Some(annotation) = &p.parameter.annotation {
                self.bind_expr(annotation);
            }
        }
        if let Some(vararg) = &parameters.vararg {
            if let Some(annotation) = &vararg.annotation {
                self.bind_expr(annotation);
            }
        }
        if let Some(kwarg) = &parameters.kwarg {
            if let Some(annotation) = &kwarg.annotation {
                self.bind_expr(annotation);
            }
        }
    }

    /// Declares every parameter into the already-entered function/lambda
    /// scope, returning the symbol/range pairs the deferred-task driver
    /// binds as assignment flow nodes at body entry (spec.md §4.3, §5).
    pub(crate) fn declare_parameters(&mut self, parameters: &Parameters) -> Vec<(SymbolId, TextRange)> {
        let mut out = Vec::new();
        for p in &parameters.posonlyargs {
            out.push(self.declare_one_param(&p.parameter, p.default.is_some()));
        }
        for p in &parameters.args {
            out.push(self.declare_one_param(&p.parameter, p.default.is_some()));
        }
        if let Some(vararg) = &parameters.vararg {
            out.push(self.declare_one_param(vararg, false));
        }
        for p in &parameters.kwonlyargs {
            out.push(self.declare_one_param(&p.parameter, p.default.is_some()));
        }
        if let Some(kwarg) = &parameters.kwarg {
            out.push(self.declare_one_param(kwarg, false));
        }
        out
    }

    fn declare_one_param(&mut self, p: &Parameter, has_default: bool) -> (SymbolId, TextRange) {
        let header = self.declaration_header(p.name.range());
        let decl = Declaration::Param(ParamDeclaration {
            header,
            type_annotation: p.annotation.as_ref().map(|a| a.range()),
            has_default,
        });
        let sym = self.declare(&p.name.id, SymbolFlags::empty(), decl);
        (sym, p.name.range())
    }

    /// Shared by `ListComp`/`SetComp`/`DictComp`/`Generator` (spec.md
    /// §4.3): the first generator's iterable is evaluated in the *outer*
    /// scope, the comprehension scope parents off the nearest non-class
    /// enclosing scope, and every subsequent generator's iterable/`if`s are
    /// evaluated inside that new scope.
    fn bind_comprehension(&mut self, elts: Vec<&Expr>, generators: &[Comprehension], range: TextRange, is_generator: bool) {
        let Some((first, rest)) = generators.split_first() else {
            return;
        };
        self.bind_expr(&first.iter);

        let target_parent = self.scopes().nearest_non_class_scope(self.current_scope());
        let to_parent = self.enter_scope(target_parent);
        let comp_scope = self.push_child_scope(ScopeKind::Comprehension);
        self.restore_scope(to_parent);

        // Comprehension scopes are not execution scopes: they reuse the
        // enclosing flow thread rather than starting a fresh one, so the
        // flow reached while walking the comprehension body must survive
        // past `restore_scope` (which would otherwise snap `current_flow`
        // back to its pre-entry value).
        let saved = self.enter_scope(comp_scope);
        self.record_node_scope(range);
        // Only the first iterable is evaluated eagerly; the rest of a
        // generator expression's body runs lazily when iterated, which is
        // why `await` is allowed inside it outside an async function
        // (spec.md §7).
        if is_generator {
            self.enter_generator_expr();
        }
        self.bind_comprehension_target(&first.target);
        for if_expr in &first.ifs {
            self.bind_expr(if_expr);
        }
        for gen in rest {
            self.bind_expr(&gen.iter);
            self.bind_comprehension_target(&gen.target);
            for if_expr in &gen.ifs {
                self.bind_expr(if_expr);
            }
        }
        for elt in elts {
            self.bind_expr(elt);
        }
        if is_generator {
            self.exit_generator_expr();
        }
        let flow_after = self.current_flow();
        self.restore_scope(saved);
        self.set_current_flow(flow_after);
    }

    fn bind_comprehension_target(&mut self, target: &Expr) {
        self.bind_assignment_target(target, VariableSource::ForTarget, None);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use ruff_python_parser::parse_suite;

    use super::*;
    use crate::binding::file_info::AnalyzerFileInfo;
    use crate::error::collector::ErrorCollector;
    use crate::error::style::ErrorStyle;
    use crate::export::exports::FixedModuleEnv;
    use crate::module::module_info::ModuleInfo;
    use crate::module::module_info::ModulePath;
    use crate::module::module_name::ModuleName;

    fn bind(src: &str) -> ErrorCollector {
        let body = parse_suite(src, "<test>").unwrap();
        let module_info = ModuleInfo::new(
            ModuleName::from_dotted("main").unwrap(),
            ModulePath::filesystem(Path::new("main.py").to_owned()),
            Arc::new(src.to_owned()),
        );
        let errors = ErrorCollector::new(module_info.clone(), ErrorStyle::Delayed, Default::default());
        let env = FixedModuleEnv::new();
        let binder = Binder::new(module_info, AnalyzerFileInfo::default(), &env, &env, &errors);
        let _ = binder.bind_module(&body);
        errors
    }

    /// spec.md §7: `await` outside an async function is an error, even
    /// inside a list comprehension, because a list comprehension's body
    /// runs eagerly rather than being deferred like a generator expression.
    #[test]
    fn test_await_in_list_comp_outside_async_function_errors() {
        let errors = bind("x = [await y for y in items]\n");
        assert!(!errors.is_empty());
    }

    /// spec.md §7: a bare generator expression defers its body's evaluation,
    /// so `await` inside one is allowed outside an async function.
    #[test]
    fn test_await_in_generator_expr_outside_async_function_ok() {
        let errors = bind("x = (await y for y in items)\n");
        assert!(errors.is_empty());
    }

    /// The generator expression's first (outermost) iterable is still
    /// evaluated eagerly, so `await` there is not covered by the deferred
    /// exception.
    #[test]
    fn test_await_in_generator_expr_eager_iterable_errors() {
        let errors = bind("x = (y for y in await items())\n");
        assert!(!errors.is_empty());
    }
}
