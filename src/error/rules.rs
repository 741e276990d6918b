/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Rule-governed diagnostics (spec.md §7): missing imports, missing type
//! stubs, and unsupported `__all__` manipulation are each keyed by a rule
//! id that maps to a configured severity. Everything else (the always-on
//! syntax/semantic errors) ignores this table entirely.

use starlark_map::small_map::SmallMap;

use crate::error::kind::ErrorKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Information,
    None,
}

/// Per-project severity configuration for the rule-governed subset of
/// `ErrorKind`. Anything not present here defaults to `Error` (the
/// always-on syntax/semantic errors are not rule-governed at all and
/// bypass this table).
#[derive(Clone, Debug)]
pub struct RuleConfig {
    overrides: SmallMap<ErrorKind, Severity>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        let mut overrides = SmallMap::new();
        overrides.insert(ErrorKind::ImportError, Severity::Error);
        overrides.insert(ErrorKind::MissingTypeStub, Severity::Warning);
        overrides.insert(ErrorKind::UnsupportedDunderAll, Severity::Warning);
        Self { overrides }
    }
}

impl RuleConfig {
    pub fn severity(&self, kind: ErrorKind) -> Severity {
        self.overrides.get(&kind).copied().unwrap_or(Severity::Error)
    }

    pub fn set_severity(&mut self, kind: ErrorKind, severity: Severity) {
        self.overrides.insert(kind, severity);
    }
}
