/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The `__all__` recognizer (spec.md §4.5): a small state machine fed one
//! module-scope statement at a time, tracking a literal list of exported
//! names. Any shape other than the recognized ones flips an
//! "unsupported form" flag and the binder reports a diagnostic.

use ruff_python_ast::name::Name;
use ruff_python_ast::Expr;
use ruff_python_ast::Stmt;

const DUNDER_ALL: &str = "__all__";

#[derive(Debug, Default)]
pub struct DunderAll {
    names: Vec<Name>,
    unsupported_form: bool,
    seen: bool,
}

impl DunderAll {
    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn uses_unsupported_form(&self) -> bool {
        self.unsupported_form
    }

    pub fn is_declared(&self) -> bool {
        self.seen
    }

    fn mark_unsupported(&mut self) {
        self.unsupported_form = true;
    }

    fn literal_strings(expr: &Expr) -> Option<Vec<Name>> {
        let elts = match expr {
            Expr::List(l) => &l.elts,
            Expr::Tuple(t) => &t.elts,
            _ => return None,
        };
        elts.iter()
            .map(|e| match e {
                Expr::StringLiteral(s) => Some(Name::new(s.value.to_str())),
                _ => None,
            })
            .collect()
    }

    /// `__all__ = [...]` or `__all__: T = (...)`. Returns whether this
    /// statement was actually a recognized `__all__` assignment.
    pub fn observe_assign(&mut self, target_name: &str, value: &Expr) -> bool {
        if target_name != DUNDER_ALL {
            return false;
        }
        self.seen = true;
        match Self::literal_strings(value) {
            Some(names) => self.names = names,
            None => self.mark_unsupported(),
        }
        true
    }

    /// `__all__ += [...]` or `__all__ += other.__all__`. `other_all` is
    /// `Some` when the RHS is a dotted `<module>.__all__` reference whose
    /// own (statically-known) `__all__` the caller already resolved.
    pub fn observe_aug_assign(
        &mut self,
        target_name: &str,
        value: &Expr,
        other_all: Option<&[Name]>,
    ) -> bool {
        if target_name != DUNDER_ALL {
            return false;
        }
        self.seen = true;
        if let Some(extra) = other_all {
            self.names.extend_from_slice(extra);
            return true;
        }
        match Self::literal_strings(value) {
            Some(mut names) => self.names.append(&mut names),
            None => self.mark_unsupported(),
        }
        true
    }

    /// `__all__.extend([...])`, `.extend(other.__all__)`, `.append("x")`,
    /// `.remove("x")`.
    pub fn observe_method_call(
        &mut self,
        receiver_name: &str,
        method: &str,
        args: &[Expr],
        other_all: Option<&[Name]>,
    ) -> bool {
        if receiver_name != DUNDER_ALL {
            return false;
        }
        self.seen = true;
        match method {
            "extend" => {
                if let Some(extra) = other_all {
                    self.names.extend_from_slice(extra);
                } else if let Some([arg]) = args.get(..1) {
                    match Self::literal_strings(arg) {
                        Some(mut names) => self.names.append(&mut names),
                        None => self.mark_unsupported(),
                    }
                } else {
                    self.mark_unsupported();
                }
            }
            "append" => match args {
                [Expr::StringLiteral(s)] => self.names.push(Name::new(s.value.to_str())),
                _ => self.mark_unsupported(),
            },
            // Python executes `remove` at runtime; recognizing it statically
            // is a pragmatic convenience that may over-approximate exports
            // in obscure cases (spec.md §9 open question).
            "remove" => match args {
                [Expr::StringLiteral(s)] => {
                    let target = s.value.to_str();
                    self.names.retain(|n| n.as_str() != target);
                }
                _ => self.mark_unsupported(),
            },
            _ => self.mark_unsupported(),
        }
        true
    }

    /// True when `stmt` references `__all__` in any way this recognizer
    /// is meant to observe, used by the binder to decide whether to call
    /// into this module at all.
    pub fn mentions_dunder_all(stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Assign(a) => a.targets.iter().any(is_dunder_all_name),
            Stmt::AnnAssign(a) => is_dunder_all_name(&a.target),
            Stmt::AugAssign(a) => is_dunder_all_name(&a.target),
            Stmt::Expr(e) => matches!(
                e.value.as_ref(),
                Expr::Call(c) if matches!(&*c.func, Expr::Attribute(attr) if is_dunder_all_name(&attr.value))
            ),
            _ => false,
        }
    }
}

fn is_dunder_all_name(expr: &Expr) -> bool {
    matches!(expr, Expr::Name(n) if n.id.as_str() == DUNDER_ALL)
}

#[cfg(test)]
mod tests {
    use ruff_python_parser::parse_suite;

    use super::*;

    /// Parses `contents` (expected to be a single expression statement)
    /// and returns its expression.
    fn parse_expr(contents: &str) -> Expr {
        match parse_suite(contents, "<test>").unwrap().into_iter().next().unwrap() {
            Stmt::Expr(x) => *x.value,
            Stmt::Assign(x) => *x.value,
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    fn call_args(expr: &Expr) -> Vec<Expr> {
        match expr {
            Expr::Call(c) => c.arguments.args.to_vec(),
            other => panic!("expected a call, got {other:?}"),
        }
    }

    #[test]
    fn test_assign_then_append() {
        let mut all = DunderAll::default();
        let list = parse_expr("[\"a\", \"b\"]");
        all.observe_assign(DUNDER_ALL, &list);
        let append_call = parse_expr("__all__.append(\"c\")");
        all.observe_method_call(DUNDER_ALL, "append", &call_args(&append_call), None);
        assert_eq!(
            all.names().iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert!(!all.uses_unsupported_form());
    }

    #[test]
    fn test_non_literal_assign_is_unsupported() {
        let mut all = DunderAll::default();
        let call = parse_expr("compute()");
        all.observe_assign(DUNDER_ALL, &call);
        assert!(all.uses_unsupported_form());
    }

    #[test]
    fn test_remove_drops_name() {
        let mut all = DunderAll::default();
        let list = parse_expr("[\"a\", \"b\"]");
        all.observe_assign(DUNDER_ALL, &list);
        let remove_call = parse_expr("__all__.remove(\"a\")");
        all.observe_method_call(DUNDER_ALL, "remove", &call_args(&remove_call), None);
        assert_eq!(
            all.names().iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            vec!["b"]
        );
    }
}
