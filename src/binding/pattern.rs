/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! `match` pattern binding (spec.md §4.3's "Match"): walks one `case`
//! pattern, declaring every capture name it introduces and binding the
//! value sub-expressions a pattern may carry (`MatchValue`'s literal,
//! `MatchClass`'s class reference, keyword-pattern values).

use ruff_python_ast::Pattern;
use ruff_text_size::Ranged;

use crate::binding::bindings::Binder;
use crate::binding::declaration::Declaration;
use crate::binding::declaration::VariableSource;
use crate::binding::symbol::SymbolFlags;

/// Whether `pattern` always matches, regardless of the subject's runtime
/// value: a bare capture (`case x:`) or wildcard (`case _:`), or an
/// alternation with at least one irrefutable arm. Used by `Match` binding
/// to decide whether an implicit "no case matched" exhaustion gate is
/// reachable at all.
pub fn is_irrefutable_pattern(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::MatchAs(p) => p.pattern.as_deref().is_none_or(is_irrefutable_pattern),
        Pattern::MatchOr(p) => p.patterns.iter().any(is_irrefutable_pattern),
        _ => false,
    }
}

impl<'a> Binder<'a> {
    pub(crate) fn bind_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::MatchValue(p) => self.bind_expr(&p.value),
            Pattern::MatchSingleton(_) => {}
            Pattern::MatchSequence(p) => {
                for sub in &p.patterns {
                    self.bind_pattern(sub);
                }
            }
            Pattern::MatchMapping(p) => {
                for key in &p.keys {
                    self.bind_expr(key);
                }
                for sub in &p.patterns {
                    self.bind_pattern(sub);
                }
                if let Some(rest) = &p.rest {
                    self.declare_pattern_capture(&rest.id, rest.range());
                }
            }
            Pattern::MatchClass(p) => {
                self.bind_expr(&p.cls);
                for sub in &p.arguments.patterns {
                    self.bind_pattern(sub);
                }
                for kw in &p.arguments.keywords {
                    self.bind_pattern(&kw.pattern);
                }
            }
            Pattern::MatchStar(p) => {
                if let Some(name) = &p.name {
                    self.declare_pattern_capture(&name.id, name.range());
                }
            }
            Pattern::MatchAs(p) => {
                if let Some(sub) = &p.pattern {
                    self.bind_pattern(sub);
                }
                if let Some(name) = &p.name {
                    self.declare_pattern_capture(&name.id, name.range());
                }
            }
            Pattern::MatchOr(p) => {
                for sub in &p.patterns {
                    self.bind_pattern(sub);
                }
            }
        }
    }

    /// Declares one capture name introduced by a pattern (spec.md §4.3): a
    /// plain local binding, retargeted by any `global`/`nonlocal` override
    /// in effect the same way an assignment target would be.
    fn declare_pattern_capture(&mut self, name: &ruff_python_ast::name::Name, range: ruff_text_size::TextRange) {
        let target_scope = self.target_scope_for(name);
        let decl = self.new_variable_declaration(range, VariableSource::PatternCapture, None);
        let sym = self.declare_in(target_scope, name, SymbolFlags::empty(), Declaration::Variable(decl));
        self.global_nonlocal_state(target_scope).record_assignment(name);
        self.create_assignment_flow(sym, range, false);
    }
}
