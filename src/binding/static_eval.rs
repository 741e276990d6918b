/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! `evaluateStaticBoolLikeExpression` (spec.md §4.3, §9): a small pure
//! interpreter over a handful of expression shapes whose truth value is
//! known without running the program: `sys.version_info` comparisons,
//! `typing.TYPE_CHECKING`, user-configured constants, and literal
//! booleans. Used by if/while/ternary/and/or handling to prune branches
//! that can never execute.

use ruff_python_ast::CmpOp;
use ruff_python_ast::Expr;
use ruff_python_ast::UnaryOp;
use starlark_map::small_map::SmallMap;

use crate::export::special::SpecialExport;

/// The target environment the binder evaluates `sys.version_info` and
/// `sys.platform` comparisons against (spec.md §6's "Analyzer file info":
/// "execution environment (target Python version and platform)").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

#[derive(Clone, Debug)]
pub struct StaticEvalConfig {
    pub python_version: PythonVersion,
    pub platform: String,
    /// User-configured boolean constants (spec.md §6), e.g. a project flag
    /// treated as always-true/false for static evaluation.
    pub defined_constants: SmallMap<String, bool>,
}

impl Default for StaticEvalConfig {
    fn default() -> Self {
        Self {
            python_version: PythonVersion { major: 3, minor: 12 },
            platform: "linux".to_owned(),
            defined_constants: SmallMap::new(),
        }
    }
}

/// Context the evaluator needs to resolve a bare `Name` to a recognized
/// special form (`TYPE_CHECKING`) via the current import-alias bindings;
/// supplied by the binder rather than re-derived here.
pub trait NameResolver {
    fn resolve_special(&self, name: &str) -> Option<SpecialExport>;
    fn resolve_dotted(&self, value: &Expr, attr: &str) -> Option<String>;
}

/// `None` means "not statically known"; the binder should walk both
/// branches.
pub fn evaluate_static_bool_like_expression(
    expr: &Expr,
    config: &StaticEvalConfig,
    names: &dyn NameResolver,
) -> Option<bool> {
    match expr {
        Expr::BooleanLiteral(lit) => Some(lit.value),
        Expr::UnaryOp(u) if u.op == UnaryOp::Not => {
            evaluate_static_bool_like_expression(&u.operand, config, names).map(|b| !b)
        }
        Expr::Name(n) => {
            if names.resolve_special(n.id.as_str()) == Some(SpecialExport::TypeChecking) {
                return Some(true);
            }
            config.defined_constants.get(n.id.as_str()).copied()
        }
        Expr::Attribute(attr) => {
            let dotted = names.resolve_dotted(&attr.value, attr.attr.as_str())?;
            if dotted == "typing.TYPE_CHECKING" {
                return Some(true);
            }
            config.defined_constants.get(&dotted).copied()
        }
        Expr::Compare(cmp) if cmp.ops.len() == 1 => {
            evaluate_version_info_compare(cmp, config, names)
                .or_else(|| evaluate_platform_compare(cmp, config, names))
        }
        Expr::BoolOp(b) => {
            let mut values = b.values.iter();
            let is_and = matches!(b.op, ruff_python_ast::BoolOp::And);
            let mut acc = evaluate_static_bool_like_expression(values.next()?, config, names)?;
            for v in values {
                let val = evaluate_static_bool_like_expression(v, config, names)?;
                acc = if is_and { acc && val } else { acc || val };
            }
            Some(acc)
        }
        _ => None,
    }
}

fn is_version_info(expr: &Expr, names: &dyn NameResolver) -> bool {
    match expr {
        Expr::Attribute(a) => matches!(&*a.value, Expr::Name(n) if n.id.as_str() == "sys")
            && a.attr.as_str() == "version_info",
        Expr::Subscript(s) => is_version_info(&s.value, names),
        _ => false,
    }
}

fn version_info_index(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Subscript(s) => match &*s.slice {
            Expr::NumberLiteral(n) => match &n.value {
                ruff_python_ast::Number::Int(i) => i.as_i64(),
                _ => None,
            },
            _ => None,
        },
        Expr::Attribute(_) => Some(0),
        _ => None,
    }
}

fn literal_int(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::NumberLiteral(n) => match &n.value {
            ruff_python_ast::Number::Int(i) => i.as_i64(),
            _ => None,
        },
        _ => None,
    }
}

fn literal_tuple_ints(expr: &Expr) -> Option<Vec<i64>> {
    match expr {
        Expr::Tuple(t) => t.elts.iter().map(literal_int).collect(),
        _ => None,
    }
}

fn evaluate_version_info_compare(
    cmp: &ruff_python_ast::ExprCompare,
    config: &StaticEvalConfig,
    names: &dyn NameResolver,
) -> Option<bool> {
    let op = cmp.ops[0];
    let rhs = &cmp.comparators[0];
    if is_version_info(&cmp.left, names) {
        let idx = version_info_index(&cmp.left).unwrap_or(0);
        if idx == 0 {
            if let Some(tuple) = literal_tuple_ints(rhs) {
                let actual = vec![config.python_version.major as i64, config.python_version.minor as i64];
                return compare_sequences(&actual, &tuple, op);
            }
        }
        if let Some(value) = literal_int(rhs) {
            let actual = match idx {
                0 => config.python_version.major as i64,
                1 => config.python_version.minor as i64,
                _ => return None,
            };
            return compare_ints(actual, value, op);
        }
    }
    None
}

fn evaluate_platform_compare(
    cmp: &ruff_python_ast::ExprCompare,
    config: &StaticEvalConfig,
    _names: &dyn NameResolver,
) -> Option<bool> {
    let op = cmp.ops[0];
    let is_platform = matches!(
        &*cmp.left,
        Expr::Attribute(a) if matches!(&*a.value, Expr::Name(n) if n.id.as_str() == "sys")
            && a.attr.as_str() == "platform"
    );
    if !is_platform {
        return None;
    }
    let Expr::StringLiteral(lit) = &cmp.comparators[0] else {
        return None;
    };
    let equal = lit.value.to_str() == config.platform;
    match op {
        CmpOp::Eq => Some(equal),
        CmpOp::NotEq => Some(!equal),
        _ => None,
    }
}

fn compare_ints(actual: i64, expected: i64, op: CmpOp) -> Option<bool> {
    Some(match op {
        CmpOp::Eq => actual == expected,
        CmpOp::NotEq => actual != expected,
        CmpOp::Lt => actual < expected,
        CmpOp::LtE => actual <= expected,
        CmpOp::Gt => actual > expected,
        CmpOp::GtE => actual >= expected,
        _ => return None,
    })
}

fn compare_sequences(actual: &[i64], expected: &[i64], op: CmpOp) -> Option<bool> {
    let ordering = actual.cmp(expected);
    Some(match op {
        CmpOp::Eq => ordering.is_eq(),
        CmpOp::NotEq => !ordering.is_eq(),
        CmpOp::Lt => ordering.is_lt(),
        CmpOp::LtE => ordering.is_le(),
        CmpOp::Gt => ordering.is_gt(),
        CmpOp::GtE => ordering.is_ge(),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use ruff_python_ast::Stmt;
    use ruff_python_parser::parse_suite;

    use super::*;

    struct NoSpecials;
    impl NameResolver for NoSpecials {
        fn resolve_special(&self, _name: &str) -> Option<SpecialExport> {
            None
        }
        fn resolve_dotted(&self, _value: &Expr, _attr: &str) -> Option<String> {
            None
        }
    }

    fn first_expr(contents: &str) -> Expr {
        let stmts = parse_suite(contents, "<test>").unwrap();
        match stmts.into_iter().next().unwrap() {
            Stmt::Expr(x) => *x.value,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_not_literal() {
        let config = StaticEvalConfig::default();
        let expr = first_expr("not False");
        assert_eq!(
            evaluate_static_bool_like_expression(&expr, &config, &NoSpecials),
            Some(true)
        );
    }

    #[test]
    fn test_version_info_major_compare() {
        let config = StaticEvalConfig::default();
        let expr = first_expr("sys.version_info[0] >= 3");
        assert_eq!(
            evaluate_static_bool_like_expression(&expr, &config, &NoSpecials),
            Some(true)
        );
    }

    #[test]
    fn test_unconfigured_name_is_unknown() {
        let config = StaticEvalConfig::default();
        let expr = first_expr("some_flag");
        assert_eq!(
            evaluate_static_bool_like_expression(&expr, &config, &NoSpecials),
            None
        );
    }
}
