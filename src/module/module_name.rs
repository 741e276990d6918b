/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;

use dupe::Dupe;
use ruff_python_ast::name::Name;

/// A dotted Python module name (`a.b.c`), interned as a small vector of
/// its dot-separated components. Mirrors `pyrefly::module::module_name`
/// closely enough to support the import-alias builder in §4.8, but the
/// import *resolution* itself (mapping a name to a file URI) belongs to
/// the out-of-scope import-resolver collaborator.
#[derive(Clone, Dupe, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName(vec1::Vec1<Name>);

impl Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl ModuleName {
    pub fn from_parts(parts: vec1::Vec1<Name>) -> Self {
        Self(parts)
    }

    pub fn from_dotted(s: &str) -> Option<Self> {
        let parts = s
            .split('.')
            .map(Name::new)
            .collect::<vec1::Vec1<Name>>()
            .ok()?;
        Some(Self(parts))
    }

    pub fn builtins() -> Self {
        Self::from_dotted("builtins").unwrap()
    }

    pub fn typing() -> Self {
        Self::from_dotted("typing").unwrap()
    }

    pub fn first_component(&self) -> Name {
        self.0.first().clone()
    }

    pub fn components(&self) -> Vec<Name> {
        self.0.to_vec()
    }

    /// `self.append("x")` turns `a.b` into `a.b.x`.
    pub fn append(&self, part: &Name) -> Self {
        let mut parts = self.0.clone();
        parts.push(part.clone());
        Self(parts)
    }

    /// Resolve a (possibly relative) `from`-import module reference against
    /// the importing module, following the same leading-dot-counting rule
    /// as `spec.md` §4.8's `import ... [as ...]` handling.
    pub fn new_maybe_relative(
        &self,
        is_init: bool,
        leading_dots: u32,
        tail: Option<&Name>,
    ) -> Option<Self> {
        if leading_dots == 0 {
            return match tail {
                Some(tail) => Self::from_dotted(tail.as_str()),
                None => None,
            };
        }
        let mut base = self.0.clone().into_vec();
        // `is_init` (an `__init__.py` module) is itself the package, so one
        // dot refers to the package rather than its parent.
        let mut ups = leading_dots as usize - if is_init { 1 } else { 0 };
        while ups > 0 && base.len() > 1 {
            base.pop();
            ups -= 1;
        }
        if ups > 0 {
            return None;
        }
        if let Some(tail) = tail {
            for part in tail.as_str().split('.') {
                base.push(Name::new(part));
            }
        }
        vec1::Vec1::try_from_vec(base).ok().map(Self)
    }
}
