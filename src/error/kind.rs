/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use convert_case::Case;
use convert_case::Casing;
use dupe::Dupe;
use parse_display::Display;

// Keep ErrorKind sorted lexicographically, except for Unsupported and Unknown.
/// Which rule produced a diagnostic, trimmed to the binder's actual
/// vocabulary (spec.md §7): syntax/semantic errors that are always
/// emitted, plus the rule-governed diagnostic families (missing imports,
/// missing stubs, unsupported `__all__` forms).
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Copy, Dupe, Display)]
pub enum ErrorKind {
    /// `async for`/`async with`/`await` used outside an async function.
    AsyncError,
    /// A malformed assignment target, or a type-incompatible declared
    /// assignment (spec.md §4.2's `Final`/`ClassVar`/`Annotated` handling).
    BadAssignment,
    /// `global`/`nonlocal` used in a way that is semantically invalid
    /// (spec.md §4.8): module-level `nonlocal`, no enclosing binding,
    /// collision with a prior assignment or a prior override.
    BadGlobalOrNonlocal,
    /// Duplicate type-parameter name on the same `def`/`class`/`type` stmt.
    DuplicateTypeParam,
    /// The import machinery failed to resolve a module or name.
    ImportError,
    /// Internal invariant violated; a fail-fast, not a domain error.
    InternalError,
    /// An annotation form the binder recognizes but rejects as invalid.
    InvalidAnnotation,
    /// `yield`/`yield from` used outside a function, or `yield from` inside
    /// an `async def`.
    InvalidYield,
    /// Accessing an attribute/module member the import machinery says
    /// does not exist.
    MissingModuleAttribute,
    /// A referenced type stub file could not be found (rule-governed).
    MissingTypeStub,
    /// A syntactic construct the parser should have rejected but didn't.
    ParseError,
    /// `from m import *` used inside a function or class body.
    WildcardImportScope,
    /// An `__all__` mutation form the recognizer in spec.md §4.5 does not
    /// understand (rule-governed: `reportUnsupportedDunderAll`).
    UnsupportedDunderAll,
    /// A name that does not resolve anywhere in scope.
    UnknownName,
    /// Attempting to use a feature that is not yet supported.
    #[allow(dead_code)]
    Unsupported,
    /// Unknown or not-yet-defined error.
    #[allow(dead_code)]
    Unknown,
}

impl ErrorKind {
    pub fn to_name(self) -> String {
        self.to_string().to_case(Case::Kebab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_name() {
        assert_eq!(&ErrorKind::Unknown.to_name(), "unknown");
        assert_eq!(&ErrorKind::ParseError.to_name(), "parse-error");
        assert_eq!(
            &ErrorKind::WildcardImportScope.to_name(),
            "wildcard-import-scope"
        );
    }
}
