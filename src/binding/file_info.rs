/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! `AnalyzerFileInfo`: the configuration surface the binder needs beyond
//! the source text itself (spec.md §6's "Analyzer file info" collaborator:
//! "is-stub flag, is-in-py-typed flag, is-typing-stub flag, execution
//! environment ..., configured boolean constants, ipython-mode flag"). A
//! plain data struct passed by reference into `Binder::new`; the binder
//! never mutates it and never reaches for any global configuration state.

use crate::binding::static_eval::StaticEvalConfig;

#[derive(Clone, Debug)]
pub struct AnalyzerFileInfo {
    /// The target Python version/platform and user-configured constants
    /// consulted by `evaluate_static_bool_like_expression`.
    pub static_eval: StaticEvalConfig,
    /// This module is a `.pyi` stub rather than a runtime module.
    pub is_stub: bool,
    /// This module's package carries a `py.typed` marker (spec.md §6).
    pub is_typed_package: bool,
    /// This module is one of the stubs that ship with `typing`/
    /// `typing_extensions` themselves, which get a handful of relaxed
    /// rules elsewhere in the pipeline (out of scope here, carried through
    /// for downstream consumers).
    pub is_typing_stub: bool,
    /// Source came from a notebook cell: relaxes `await`/top-level-`async`
    /// placement checks (spec.md §7's "allowed in notebook mode at module
    /// level").
    pub ipython_mode: bool,
}

impl Default for AnalyzerFileInfo {
    fn default() -> Self {
        Self {
            static_eval: StaticEvalConfig::default(),
            is_stub: false,
            is_typed_package: false,
            is_typing_stub: false,
            ipython_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_notebook_mode() {
        let info = AnalyzerFileInfo::default();
        assert!(!info.ipython_mode);
        assert!(!info.is_stub);
    }
}
