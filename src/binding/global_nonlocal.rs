/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The `global`/`nonlocal` state machine (spec.md §4.8): each name in the
//! current scope can be overridden to bind to the global scope or to an
//! enclosing function scope exactly once; conflicting redeclarations and
//! out-of-place declarations are reported as errors.

use ruff_python_ast::name::Name;
use starlark_map::small_set::SmallSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlobalNonlocalError {
    /// `nonlocal x` written directly in module scope.
    NonlocalAtModuleScope,
    /// `nonlocal x` with no binding in any enclosing non-global,
    /// non-module scope.
    NonlocalWithNoEnclosingBinding,
    /// `global x` after `x` was already declared `nonlocal` in this scope,
    /// or vice versa.
    ConflictingOverride,
    /// `global x` / `nonlocal x` after `x` was already assigned in this
    /// scope.
    AlreadyAssigned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Declared {
    Global,
    Nonlocal,
}

/// Per-scope bookkeeping the binder consults before installing a
/// `global`/`nonlocal` binding-type override on the `Scope` itself.
#[derive(Debug, Default)]
pub struct GlobalNonlocalState {
    declared: starlark_map::small_map::SmallMap<Name, Declared>,
    assigned: SmallSet<Name>,
}

impl GlobalNonlocalState {
    pub fn record_assignment(&mut self, name: &Name) {
        self.assigned.insert(name.clone());
    }

    /// Returns `Ok(())` when `global x` may proceed (the binder should
    /// then bind `x` into the global scope and set the override).
    pub fn declare_global(&mut self, name: &Name) -> Result<(), GlobalNonlocalError> {
        if self.assigned.contains(name) {
            return Err(GlobalNonlocalError::AlreadyAssigned);
        }
        if self.declared.get(name) == Some(&Declared::Nonlocal) {
            return Err(GlobalNonlocalError::ConflictingOverride);
        }
        self.declared.insert(name.clone(), Declared::Global);
        Ok(())
    }

    /// `is_module_scope` / `has_enclosing_function_binding` are supplied
    /// by the caller, which has access to the scope tree (spec.md §4.1).
    pub fn declare_nonlocal(
        &mut self,
        name: &Name,
        is_module_scope: bool,
        has_enclosing_function_binding: bool,
    ) -> Result<(), GlobalNonlocalError> {
        if is_module_scope {
            return Err(GlobalNonlocalError::NonlocalAtModuleScope);
        }
        if self.assigned.contains(name) {
            return Err(GlobalNonlocalError::AlreadyAssigned);
        }
        if self.declared.get(name) == Some(&Declared::Global) {
            return Err(GlobalNonlocalError::ConflictingOverride);
        }
        if !has_enclosing_function_binding {
            return Err(GlobalNonlocalError::NonlocalWithNoEnclosingBinding);
        }
        self.declared.insert(name.clone(), Declared::Nonlocal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_after_assignment_is_rejected() {
        let mut state = GlobalNonlocalState::default();
        let x = Name::new("x");
        state.record_assignment(&x);
        assert_eq!(
            state.declare_global(&x),
            Err(GlobalNonlocalError::AlreadyAssigned)
        );
    }

    #[test]
    fn test_nonlocal_at_module_scope_is_rejected() {
        let mut state = GlobalNonlocalState::default();
        assert_eq!(
            state.declare_nonlocal(&Name::new("x"), true, false),
            Err(GlobalNonlocalError::NonlocalAtModuleScope)
        );
    }

    #[test]
    fn test_nonlocal_with_no_enclosing_binding_is_rejected() {
        let mut state = GlobalNonlocalState::default();
        assert_eq!(
            state.declare_nonlocal(&Name::new("x"), false, false),
            Err(GlobalNonlocalError::NonlocalWithNoEnclosingBinding)
        );
    }

    #[test]
    fn test_conflicting_global_then_nonlocal() {
        let mut state = GlobalNonlocalState::default();
        let x = Name::new("x");
        state.declare_global(&x).unwrap();
        assert_eq!(
            state.declare_nonlocal(&x, false, true),
            Err(GlobalNonlocalError::ConflictingOverride)
        );
    }
}
