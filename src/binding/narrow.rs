/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The narrowing-expression analyzer (spec.md §4.4): decides whether an
//! expression is eligible for flow-based type narrowing and, if so,
//! collects the reference keys the flow evaluator should later track.
//! Precision matters here; this module intentionally mirrors the rule
//! list in the specification clause by clause rather than generalizing.

use ruff_python_ast::CmpOp;
use ruff_python_ast::Expr;
use ruff_python_ast::UnaryOp;

/// A stable textual key identifying a narrowable reference (a name, or a
/// chain of attribute/subscript accesses rooted at one). Two expressions
/// that denote the same runtime reference must produce equal keys.
pub fn reference_key(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(n) => Some(n.id.to_string()),
        Expr::Attribute(a) => {
            let base = reference_key(&a.value)?;
            Some(format!("{base}.{}", a.attr.as_str()))
        }
        Expr::Subscript(s) if is_simple_subscript(s) => {
            let base = reference_key(&s.value)?;
            Some(format!("{base}[{}]", simple_subscript_key(&s.slice)?))
        }
        _ => None,
    }
}

fn is_simple_subscript(s: &ruff_python_ast::ExprSubscript) -> bool {
    simple_subscript_key(&s.slice).is_some()
}

fn simple_subscript_key(slice: &Expr) -> Option<String> {
    match slice {
        Expr::NumberLiteral(n) => match &n.value {
            ruff_python_ast::Number::Int(i) => i.as_i64().map(|v| v.to_string()),
            _ => None,
        },
        Expr::StringLiteral(s) => Some(format!("{:?}", s.value.to_str())),
        Expr::UnaryOp(u) if matches!(u.op, UnaryOp::USub) => {
            simple_subscript_key(&u.operand).map(|k| format!("-{k}"))
        }
        _ => None,
    }
}

/// Whether `expr` is eligible for the implicit-else "never narrowing" gate
/// (spec.md §4.4): the root must be a simple `Name` and at least one
/// intermediate operator must have made the expression complex (so a bare
/// `if x:` alone does not qualify, but `if x is None:` does).
pub fn is_eligible_for_never_narrowing(expr: &Expr) -> bool {
    is_never_narrowing_eligible(expr, false)
}

fn is_never_narrowing_eligible(expr: &Expr, is_complex: bool) -> bool {
    match expr {
        Expr::Name(_) => is_complex,
        Expr::Compare(cmp) if cmp.ops.len() == 1 => {
            if is_none_comparison(cmp) || is_type_is_comparison(cmp) {
                return is_never_narrowing_eligible(&cmp.left, true);
            }
            if matches!(cmp.ops[0], CmpOp::Is | CmpOp::IsNot | CmpOp::Eq | CmpOp::NotEq) {
                return is_never_narrowing_eligible(&cmp.left, true);
            }
            false
        }
        Expr::UnaryOp(u) if matches!(u.op, UnaryOp::Not) => {
            is_never_narrowing_eligible(&u.operand, false)
        }
        _ => false,
    }
}

fn is_none_comparison(cmp: &ruff_python_ast::ExprCompare) -> bool {
    matches!(cmp.ops[0], CmpOp::Is | CmpOp::IsNot | CmpOp::Eq | CmpOp::NotEq)
        && matches!(&cmp.comparators[0], Expr::NoneLiteral(_))
}

fn is_type_is_comparison(cmp: &ruff_python_ast::ExprCompare) -> bool {
    matches!(cmp.ops[0], CmpOp::Is | CmpOp::IsNot) && is_type_call(&cmp.left)
}

fn is_type_call(expr: &Expr) -> bool {
    matches!(expr, Expr::Call(c) if matches!(&*c.func, Expr::Name(n) if n.id.as_str() == "type"))
}

fn is_len_call(expr: &Expr) -> bool {
    matches!(expr, Expr::Call(c) if matches!(&*c.func, Expr::Name(n) if n.id.as_str() == "len"))
}

/// Walk `expr`, pushing the reference key of every narrowable sub-term
/// found into `out` (spec.md §4.4). Returns whether `expr` itself is
/// eligible, used by callers (e.g. `createFlowConditional`) to decide
/// whether to allocate a `Condition` node at all.
pub fn collect_narrowing_references(expr: &Expr, out: &mut Vec<String>) -> bool {
    collect(expr, out, false)
}

fn push_discriminated(expr: &Expr, out: &mut Vec<String>) {
    if let Some(key) = reference_key(expr) {
        out.push(key);
    }
}

fn collect(expr: &Expr, out: &mut Vec<String>, is_complex: bool) -> bool {
    match expr {
        Expr::Name(_) | Expr::Attribute(_) | Expr::Subscript(_) => {
            if let Some(key) = reference_key(expr) {
                out.push(key.clone());
                if let Expr::Attribute(a) = expr {
                    // Discriminated-union narrowing via attribute access also
                    // narrows the base object.
                    push_discriminated(&a.value, out);
                }
                return true;
            }
            false
        }
        Expr::Named(named) => {
            if let Some(key) = reference_key(&named.target) {
                out.push(key);
            }
            collect(&named.value, out, true);
            true
        }
        Expr::Compare(cmp) if cmp.ops.len() == 1 => collect_compare(cmp, out),
        Expr::UnaryOp(u) if matches!(u.op, UnaryOp::Not) => collect(&u.operand, out, false),
        Expr::Call(call) => collect_call(call, out),
        _ => {
            let _ = is_complex;
            false
        }
    }
}

fn collect_compare(cmp: &ruff_python_ast::ExprCompare, out: &mut Vec<String>) -> bool {
    let op = cmp.ops[0];
    let rhs = &cmp.comparators[0];
    if matches!(&cmp.left.as_ref(), Expr::StringLiteral(_)) && matches!(op, CmpOp::In | CmpOp::NotIn)
    {
        return collect(rhs, out, true);
    }
    match op {
        CmpOp::In | CmpOp::NotIn => {
            let left = collect(&cmp.left, out, true);
            let right = collect(rhs, out, true);
            left || right
        }
        CmpOp::Is | CmpOp::IsNot | CmpOp::Eq | CmpOp::NotEq => {
            if is_none_literal(rhs) {
                push_discriminated(&cmp.left, out);
                return true;
            }
            if is_type_call(&cmp.left) {
                if let Expr::Call(c) = cmp.left.as_ref() {
                    if let Some(arg) = c.arguments.args.first() {
                        return collect(arg, out, true);
                    }
                }
                return false;
            }
            push_discriminated(&cmp.left, out);
            true
        }
        CmpOp::Lt | CmpOp::LtE | CmpOp::Gt | CmpOp::GtE => {
            if is_len_call(&cmp.left) && matches!(rhs, Expr::NumberLiteral(_)) {
                if let Expr::Call(c) = cmp.left.as_ref() {
                    if let Some(arg) = c.arguments.args.first() {
                        return collect(arg, out, true);
                    }
                }
            }
            false
        }
    }
}

fn is_none_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::NoneLiteral(_))
}

fn collect_call(call: &ruff_python_ast::ExprCall, out: &mut Vec<String>) -> bool {
    let func_name = match &*call.func {
        Expr::Name(n) => Some(n.id.as_str()),
        _ => None,
    };
    match func_name {
        Some("isinstance") | Some("issubclass") | Some("callable") => {
            if let Some(arg) = call.arguments.args.first() {
                collect(arg, out, true);
            }
            true
        }
        _ => {
            // Any one-or-more-arg call is treated as a possible user-defined
            // type guard (spec.md §4.4); never-narrowing rejects these.
            if let Some(arg) = call.arguments.args.first() {
                collect(arg, out, true);
                true
            } else {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ruff_python_ast::Stmt;
    use ruff_python_parser::parse_suite;

    use super::*;

    fn first_expr(contents: &str) -> Expr {
        let stmts = parse_suite(contents, "<test>").unwrap();
        match stmts.into_iter().next().unwrap() {
            Stmt::Expr(x) => *x.value,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_name_is_eligible() {
        let expr = first_expr("x");
        let mut out = Vec::new();
        assert!(collect_narrowing_references(&expr, &mut out));
        assert_eq!(out, vec!["x".to_owned()]);
    }

    #[test]
    fn test_is_none_pushes_discriminated_base() {
        let expr = first_expr("x is None");
        let mut out = Vec::new();
        assert!(collect_narrowing_references(&expr, &mut out));
        assert_eq!(out, vec!["x".to_owned()]);
    }

    #[test]
    fn test_isinstance_is_eligible() {
        let expr = first_expr("isinstance(x, int)");
        let mut out = Vec::new();
        assert!(collect_narrowing_references(&expr, &mut out));
        assert_eq!(out, vec!["x".to_owned()]);
    }

    #[test]
    fn test_bare_name_is_not_never_narrowing_eligible() {
        let expr = first_expr("x");
        assert!(!is_eligible_for_never_narrowing(&expr));
    }

    #[test]
    fn test_is_none_is_never_narrowing_eligible() {
        let expr = first_expr("x is None");
        assert!(is_eligible_for_never_narrowing(&expr));
    }
}
