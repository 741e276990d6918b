/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The `__slots__` recognizer (spec.md §4.6): a literal string, or a
//! literal list/tuple of string literals, assigned in a class body.

use ruff_python_ast::name::Name;
use ruff_python_ast::Expr;

use crate::binding::symbol::is_private_name;

pub const DUNDER_SLOTS: &str = "__slots__";

/// Recognizes `__slots__ = "x"` / `__slots__ = ["x", "y"]` /
/// `__slots__ = ("x", "y")`. Returns `None` when `value` is not one of
/// these literal shapes.
pub fn recognize_slots(value: &Expr) -> Option<Vec<Name>> {
    match value {
        Expr::StringLiteral(s) => Some(vec![Name::new(s.value.to_str())]),
        Expr::List(l) => collect_names(&l.elts),
        Expr::Tuple(t) => collect_names(&t.elts),
        _ => None,
    }
}

fn collect_names(elts: &[Expr]) -> Option<Vec<Name>> {
    elts.iter()
        .map(|e| match e {
            Expr::StringLiteral(s) => Some(Name::new(s.value.to_str())),
            _ => None,
        })
        .collect()
}

/// Whether a private-style slot name (`_x`, not `__x__`) additionally
/// gets `privateMember` (spec.md §4.6).
pub fn slot_is_private(name: &str) -> bool {
    is_private_name(name)
}

/// `__dict__` in the slot list means the class still allows arbitrary
/// instance attributes, so the slot-names list should not be stored for
/// membership tests (spec.md §4.6).
pub fn disables_attribute_restriction(names: &[Name]) -> bool {
    names.iter().any(|n| n.as_str() == "__dict__")
}

#[cfg(test)]
mod tests {
    use ruff_python_ast::Stmt;
    use ruff_python_parser::parse_suite;

    use super::*;

    fn parse_expr(contents: &str) -> Expr {
        match parse_suite(contents, "<test>").unwrap().into_iter().next().unwrap() {
            Stmt::Expr(x) => *x.value,
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn test_single_string_slot() {
        let names = recognize_slots(&parse_expr("\"x\"")).unwrap();
        assert_eq!(names, vec![Name::new("x")]);
    }

    #[test]
    fn test_list_of_slots() {
        let names = recognize_slots(&parse_expr("[\"x\", \"y\"]")).unwrap();
        assert_eq!(names, vec![Name::new("x"), Name::new("y")]);
    }

    #[test]
    fn test_non_literal_is_not_recognized() {
        assert!(recognize_slots(&parse_expr("compute()")).is_none());
    }

    #[test]
    fn test_dict_disables_restriction() {
        let names = vec![Name::new("x"), Name::new("__dict__")];
        assert!(disables_attribute_restriction(&names));
    }
}
