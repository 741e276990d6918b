/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;

use crate::error::kind::ErrorKind;
use crate::module::module_info::ModulePath;
use crate::module::module_info::SourceRange;

/// One recorded diagnostic. Cheap to clone, ordered so `ErrorCollector` can
/// sort-then-dedup (mirrors `pyrefly::error::error::Error`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Error {
    path: ModulePath,
    range: SourceRange,
    msg: String,
    is_ignored: bool,
    kind: ErrorKind,
}

impl PartialOrd for ModulePath {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ModulePath {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_path().cmp(other.as_path())
    }
}
impl PartialOrd for SourceRange {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for SourceRange {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.start.line, self.start.column, self.end.line, self.end.column).cmp(&(
            other.start.line,
            other.start.column,
            other.end.line,
            other.end.column,
        ))
    }
}

impl Error {
    pub fn new(
        path: ModulePath,
        range: SourceRange,
        msg: String,
        is_ignored: bool,
        kind: ErrorKind,
    ) -> Self {
        Self {
            path,
            range,
            msg,
            is_ignored,
            kind,
        }
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn range(&self) -> SourceRange {
        self.range
    }

    pub fn is_ignored(&self) -> bool {
        self.is_ignored
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}]",
            self.path,
            self.range.start.line,
            self.range.start.column,
            self.msg,
            self.kind.to_name()
        )
    }
}
