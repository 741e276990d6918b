/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Auxiliary walkers (spec.md §4.3, component table): a yield detector
//! used to mark a function as a generator without fully binding its body,
//! and a dummy-scope generator that still allocates `Scope`s for classes
//! and functions found in unreachable code, so the type evaluator always
//! has a `Scope` to consult even when the binder skipped flow analysis
//! there.

use ruff_python_ast::Expr;
use ruff_python_ast::Stmt;

/// Whether `body` contains a `yield` or `yield from` reachable without
/// crossing into a nested function/lambda (those get their own
/// generator status independently).
pub fn contains_yield(body: &[Stmt]) -> bool {
    body.iter().any(stmt_contains_yield)
}

fn stmt_contains_yield(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::FunctionDef(_) | Stmt::ClassDef(_) => false,
        Stmt::Expr(x) => expr_contains_yield(&x.value),
        Stmt::Assign(x) => expr_contains_yield(&x.value),
        Stmt::AugAssign(x) => expr_contains_yield(&x.value),
        Stmt::AnnAssign(x) => x.value.as_deref().is_some_and(expr_contains_yield),
        Stmt::Return(x) => x.value.as_deref().is_some_and(expr_contains_yield),
        Stmt::If(x) => {
            expr_contains_yield(&x.test)
                || x.body.iter().any(stmt_contains_yield)
                || x.elif_else_clauses.iter().any(|c| {
                    c.test.as_ref().is_some_and(expr_contains_yield)
                        || c.body.iter().any(stmt_contains_yield)
                })
        }
        Stmt::While(x) => {
            expr_contains_yield(&x.test)
                || x.body.iter().any(stmt_contains_yield)
                || x.orelse.iter().any(stmt_contains_yield)
        }
        Stmt::For(x) => {
            expr_contains_yield(&x.iter)
                || x.body.iter().any(stmt_contains_yield)
                || x.orelse.iter().any(stmt_contains_yield)
        }
        Stmt::With(x) => x
            .items
            .iter()
            .any(|item| expr_contains_yield(&item.context_expr))
            || x.body.iter().any(stmt_contains_yield),
        Stmt::Try(x) => {
            x.body.iter().any(stmt_contains_yield)
                || x.orelse.iter().any(stmt_contains_yield)
                || x.finalbody.iter().any(stmt_contains_yield)
                || x.handlers.iter().any(|h| {
                    let ruff_python_ast::ExceptHandler::ExceptHandler(h) = h;
                    h.body.iter().any(stmt_contains_yield)
                })
        }
        _ => false,
    }
}

fn expr_contains_yield(expr: &Expr) -> bool {
    match expr {
        Expr::Yield(_) | Expr::YieldFrom(_) => true,
        Expr::BoolOp(x) => x.values.iter().any(expr_contains_yield),
        Expr::BinOp(x) => expr_contains_yield(&x.left) || expr_contains_yield(&x.right),
        Expr::UnaryOp(x) => expr_contains_yield(&x.operand),
        Expr::If(x) => {
            expr_contains_yield(&x.test)
                || expr_contains_yield(&x.body)
                || expr_contains_yield(&x.orelse)
        }
        Expr::Named(x) => expr_contains_yield(&x.value),
        Expr::Await(x) => expr_contains_yield(&x.value),
        Expr::Compare(x) => {
            expr_contains_yield(&x.left) || x.comparators.iter().any(expr_contains_yield)
        }
        Expr::Call(x) => {
            expr_contains_yield(&x.func)
                || x.arguments.args.iter().any(expr_contains_yield)
                || x.arguments.keywords.iter().any(|k| expr_contains_yield(&k.value))
        }
        Expr::Tuple(x) => x.elts.iter().any(expr_contains_yield),
        Expr::List(x) => x.elts.iter().any(expr_contains_yield),
        _ => false,
    }
}

/// Walks statements that will never execute (the tail after a return,
/// raise, break, continue, or an always-false `if`), still recursing
/// into nested `def`/`class` enough to invoke `on_scope_introducing` for
/// each so the caller can allocate empty `Scope`s without walking their
/// bodies for flow (spec.md §4.3: "Sequence of statements").
pub fn walk_dummy_scopes(body: &[Stmt], on_scope_introducing: &mut dyn FnMut(&Stmt)) {
    for stmt in body {
        match stmt {
            Stmt::FunctionDef(x) => {
                on_scope_introducing(stmt);
                walk_dummy_scopes(&x.body, on_scope_introducing);
            }
            Stmt::ClassDef(x) => {
                on_scope_introducing(stmt);
                walk_dummy_scopes(&x.body, on_scope_introducing);
            }
            Stmt::If(x) => {
                walk_dummy_scopes(&x.body, on_scope_introducing);
                for clause in &x.elif_else_clauses {
                    walk_dummy_scopes(&clause.body, on_scope_introducing);
                }
            }
            Stmt::While(x) => {
                walk_dummy_scopes(&x.body, on_scope_introducing);
                walk_dummy_scopes(&x.orelse, on_scope_introducing);
            }
            Stmt::For(x) => {
                walk_dummy_scopes(&x.body, on_scope_introducing);
                walk_dummy_scopes(&x.orelse, on_scope_introducing);
            }
            Stmt::With(x) => walk_dummy_scopes(&x.body, on_scope_introducing),
            Stmt::Try(x) => {
                walk_dummy_scopes(&x.body, on_scope_introducing);
                walk_dummy_scopes(&x.orelse, on_scope_introducing);
                walk_dummy_scopes(&x.finalbody, on_scope_introducing);
                for h in &x.handlers {
                    let ruff_python_ast::ExceptHandler::ExceptHandler(h) = h;
                    walk_dummy_scopes(&h.body, on_scope_introducing);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use ruff_python_parser::parse_suite;

    use super::*;

    #[test]
    fn test_detects_top_level_yield() {
        let body = parse_suite("yield 1", "<test>").unwrap();
        assert!(contains_yield(&body));
    }

    #[test]
    fn test_nested_function_yield_is_not_counted() {
        let body = parse_suite("def g():\n    yield 1\n", "<test>").unwrap();
        assert!(!contains_yield(&body));
    }

    #[test]
    fn test_yield_inside_if_is_detected() {
        let body = parse_suite("if x:\n    yield 1\n", "<test>").unwrap();
        assert!(contains_yield(&body));
    }

    #[test]
    fn test_dummy_scope_walker_finds_nested_def_in_dead_code() {
        let body = parse_suite("return\ndef f(): ...\n", "<test>").unwrap();
        let mut seen = Vec::new();
        walk_dummy_scopes(&body, &mut |stmt| {
            if let Stmt::FunctionDef(f) = stmt {
                seen.push(f.name.id.to_string());
            }
        });
        assert_eq!(seen, vec!["f".to_owned()]);
    }
}
