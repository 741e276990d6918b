/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::cell::RefCell;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Display;

use ruff_text_size::Ranged;
use ruff_text_size::TextRange;
use starlark_map::small_map::SmallMap;
use tracing::warn;

use crate::error::error::Error;
use crate::error::kind::ErrorKind;
use crate::error::rules::RuleConfig;
use crate::error::rules::Severity;
use crate::error::style::ErrorStyle;
use crate::module::module_info::ModuleInfo;

#[derive(Debug, Default)]
struct ModuleErrors {
    clean: bool,
    items: Vec<Error>,
}

impl ModuleErrors {
    fn push(&mut self, err: Error) {
        self.clean = false;
        self.items.push(err);
    }

    fn cleanup(&mut self) {
        if self.clean {
            return;
        }
        self.clean = true;
        self.items.sort();
        self.items.dedup();
    }

    fn iter(&mut self) -> impl Iterator<Item = &Error> {
        self.cleanup();
        self.items.iter().filter(|x| !x.is_ignored())
    }
}

/// Collects diagnostics for one module. The binder never throws for domain
/// errors (spec.md §7); every report funnels through `add`, which is a
/// no-op when the rule's configured severity is `None`.
#[derive(Debug)]
pub struct ErrorCollector {
    module_info: ModuleInfo,
    style: ErrorStyle,
    rules: RuleConfig,
    errors: RefCell<ModuleErrors>,
}

impl Display for ErrorCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for err in self.errors.borrow_mut().iter() {
            writeln!(f, "ERROR: {err}")?;
        }
        Ok(())
    }
}

impl ErrorCollector {
    pub fn new(module_info: ModuleInfo, style: ErrorStyle, rules: RuleConfig) -> Self {
        Self {
            module_info,
            style,
            rules,
            errors: RefCell::new(ModuleErrors::default()),
        }
    }

    pub fn add(&self, range: TextRange, msg: String, kind: ErrorKind) {
        if self.rules.severity(kind) == Severity::None {
            return;
        }
        if self.style == ErrorStyle::Never {
            return;
        }
        let source_range = self.module_info.source_range(range);
        let is_ignored = self.module_info.is_ignored(&source_range, &msg);
        if self.style == ErrorStyle::Immediate && !is_ignored {
            warn!(
                "{}:{}: {}",
                self.module_info.path(),
                source_range.start.line,
                msg
            );
        }
        let err = Error::new(
            self.module_info.path().clone(),
            source_range,
            msg,
            is_ignored,
            kind,
        );
        self.errors.borrow_mut().push(err);
    }

    /// Fail-fast path for internal invariant violations (spec.md §7): a
    /// missing parent scope, an unexpected node kind reaching the binder.
    /// These never go through rule-governed severity.
    pub fn internal_error(&self, range: TextRange, msg: String) -> ! {
        panic!(
            "internal binder error at {}:{:?}: {msg}",
            self.module_info.path(),
            range
        );
    }

    pub fn style(&self) -> ErrorStyle {
        self.style
    }

    pub fn is_empty(&self) -> bool {
        self.errors.borrow().items.is_empty()
    }

    pub fn collect(&self) -> Vec<Error> {
        self.errors.borrow_mut().iter().cloned().collect()
    }

    pub fn summarise<'a>(xs: impl Iterator<Item = &'a ErrorCollector>) -> Vec<(String, usize)> {
        let mut map = SmallMap::new();
        for x in xs {
            for err in x.errors.borrow_mut().iter() {
                let clean_msg = err
                    .msg()
                    .split('`')
                    .enumerate()
                    .map(|(i, x)| if i % 2 == 0 { x } else { "..." })
                    .collect::<Vec<_>>()
                    .join("`");
                *map.entry(clean_msg).or_default() += 1;
            }
        }
        let mut res = map.into_iter().collect::<Vec<_>>();
        res.sort_by_key(|x| x.1);
        res
    }

    pub fn todo(&self, msg: &str, v: impl Ranged + Debug) {
        let s = format!("{v:?}");
        if s == format!("{:?}", v.range()) {
            self.add(v.range(), format!("TODO: {msg}"), ErrorKind::Unknown);
        } else {
            let prefix = s.split_once(' ').map_or(s.as_str(), |x| x.0);
            self.add(v.range(), format!("TODO: {prefix} - {msg}"), ErrorKind::Unknown);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use ruff_text_size::TextSize;

    use super::*;
    use crate::module::module_info::ModulePath;
    use crate::module::module_name::ModuleName;

    #[test]
    fn test_error_collector_dedup_and_sort() {
        let mi = ModuleInfo::new(
            ModuleName::from_dotted("main").unwrap(),
            ModulePath::filesystem(Path::new("main.py").to_owned()),
            Arc::new("contents\nmore".to_owned()),
        );
        let errors = ErrorCollector::new(mi, ErrorStyle::Delayed, RuleConfig::default());
        errors.add(
            TextRange::new(TextSize::new(1), TextSize::new(3)),
            "b".to_owned(),
            ErrorKind::Unknown,
        );
        errors.add(
            TextRange::new(TextSize::new(1), TextSize::new(3)),
            "a".to_owned(),
            ErrorKind::Unknown,
        );
        errors.add(
            TextRange::new(TextSize::new(1), TextSize::new(3)),
            "a".to_owned(),
            ErrorKind::Unknown,
        );
        assert_eq!(errors.collect().len(), 2);
    }

    #[test]
    fn test_none_severity_suppressed() {
        let mi = ModuleInfo::new(
            ModuleName::from_dotted("main").unwrap(),
            ModulePath::filesystem(Path::new("main.py").to_owned()),
            Arc::new("x".to_owned()),
        );
        let mut rules = RuleConfig::default();
        rules.set_severity(ErrorKind::MissingTypeStub, Severity::None);
        let errors = ErrorCollector::new(mi, ErrorStyle::Delayed, rules);
        errors.add(
            TextRange::default(),
            "missing stub".to_owned(),
            ErrorKind::MissingTypeStub,
        );
        assert!(errors.is_empty());
    }
}
