/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Small helpers over `ruff_python_ast` shapes that the binder needs in
//! more than one place, analogous to the teacher's own `crate::ast::Ast`
//! namespace.

use ruff_python_ast::Expr;
use ruff_python_ast::Identifier;
use ruff_python_ast::Stmt;
use ruff_python_ast::StmtIf;

pub struct Ast;

impl Ast {
    /// Flattens an `if`/`elif`/.../`else` chain into `(test, body)` pairs,
    /// with `test = None` for the trailing `else` if present (spec.md
    /// §4.3's "If/else").
    pub fn if_branches(stmt: &StmtIf) -> Vec<(Option<&Expr>, &[Stmt])> {
        let mut branches = vec![(Some(&stmt.test), stmt.body.as_slice())];
        for clause in &stmt.elif_else_clauses {
            branches.push((clause.test.as_ref(), clause.body.as_slice()));
        }
        branches
    }

    pub fn expr_name_identifier(name: ruff_python_ast::ExprName) -> Identifier {
        Identifier::new(name.id, name.range)
    }

    /// The innermost function/class's simple name, if `expr` is a bare
    /// `Name` reference. Used by the member-access disambiguator, which
    /// only ever compares plain identifiers (spec.md §4.7).
    pub fn as_simple_name(expr: &Expr) -> Option<&str> {
        match expr {
            Expr::Name(n) => Some(n.id.as_str()),
            _ => None,
        }
    }

    /// Plain (undotted) decorator names, ignoring any that are
    /// attribute-chains or calls (spec.md §4.7 only cares about bare
    /// `@staticmethod`/`@classmethod`).
    pub fn plain_decorator_names(decorators: &[ruff_python_ast::Decorator]) -> Vec<&str> {
        decorators
            .iter()
            .filter_map(|d| Self::as_simple_name(&d.expression))
            .collect()
    }
}
