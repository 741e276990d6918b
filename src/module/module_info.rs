/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use dupe::Dupe;
use regex::Regex;
use ruff_text_size::TextRange;
use ruff_text_size::TextSize;
use starlark_map::small_set::SmallSet;
use std::sync::LazyLock;

use crate::module::module_name::ModuleName;

/// A 1-based (line, column) source position, for presenting ranges to the
/// diagnostic sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

/// A byte-offset line index, built once per file. Deliberately small and
/// local to this crate rather than reused from a shared "source file"
/// library: the binder only ever needs start/end line+column for a
/// `TextRange`, and nothing here is shared across modules.
#[derive(Clone, Debug)]
struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    fn location(&self, offset: TextSize) -> SourceLocation {
        let offset: u32 = offset.into();
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = offset - self.line_starts[line] + 1;
        SourceLocation {
            line: line as u32 + 1,
            column,
        }
    }
}

static TYPE_IGNORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*type:\s*ignore(?:\[[^\]]*\])?").unwrap());
static PYRIGHT_STRICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*pyright:\s*strict\b").unwrap());
static PYRIGHT_BASIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*pyright:\s*basic\b").unwrap());
static PYRIGHT_IGNORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*pyright:\s*ignore(?:\[[^\]]*\])?").unwrap());

/// Per-file directive comments recognized from the token stream before the
/// binder runs (spec.md §6: "the token stream ... used only to recognize
/// file-level directive comments ... consumed before the binder runs").
#[derive(Clone, Debug, Default)]
struct Directives {
    /// 1-based line numbers carrying a whole-line `# type: ignore` or
    /// `# pyright: ignore`.
    ignored_lines: SmallSet<u32>,
    strict_mode: bool,
    basic_mode: bool,
}

impl Directives {
    fn scan(text: &str) -> Self {
        let mut ignored_lines = SmallSet::new();
        let mut strict_mode = false;
        let mut basic_mode = false;
        for (i, line) in text.lines().enumerate() {
            let Some(hash) = line.find('#') else {
                continue;
            };
            let comment = &line[hash..];
            if TYPE_IGNORE_RE.is_match(comment) || PYRIGHT_IGNORE_RE.is_match(comment) {
                ignored_lines.insert(i as u32 + 1);
            }
            if PYRIGHT_STRICT_RE.is_match(comment) {
                strict_mode = true;
            }
            if PYRIGHT_BASIC_RE.is_match(comment) {
                basic_mode = true;
            }
        }
        Self {
            ignored_lines,
            strict_mode,
            basic_mode,
        }
    }
}

/// Where a module's source came from. The binder never reads the
/// filesystem itself; `contents` is supplied by the caller (the file
/// orchestrator, out of scope per spec.md §1).
#[derive(Clone, Dupe, Debug, PartialEq, Eq)]
pub struct ModulePath(Arc<PathBuf>);

impl ModulePath {
    pub fn filesystem(path: PathBuf) -> Self {
        Self(Arc::new(path))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn is_init(&self) -> bool {
        self.0.file_stem().and_then(|s| s.to_str()) == Some("__init__")
    }

    pub fn is_stub(&self) -> bool {
        self.0.extension().and_then(|s| s.to_str()) == Some("pyi")
    }
}

impl std::fmt::Display for ModulePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Clone, Dupe, Debug)]
pub struct ModuleInfo(Arc<ModuleInfoInner>);

#[derive(Debug)]
struct ModuleInfoInner {
    name: ModuleName,
    path: ModulePath,
    contents: Arc<String>,
    line_index: LineIndex,
    directives: Directives,
}

impl ModuleInfo {
    pub fn new(name: ModuleName, path: ModulePath, contents: Arc<String>) -> Self {
        let line_index = LineIndex::new(&contents);
        let directives = Directives::scan(&contents);
        Self(Arc::new(ModuleInfoInner {
            name,
            path,
            contents,
            line_index,
            directives,
        }))
    }

    pub fn name(&self) -> ModuleName {
        self.0.name.dupe()
    }

    pub fn path(&self) -> &ModulePath {
        &self.0.path
    }

    pub fn contents(&self) -> &str {
        &self.0.contents
    }

    pub fn is_stub(&self) -> bool {
        self.0.path.is_stub()
    }

    pub fn source_range(&self, range: TextRange) -> SourceRange {
        SourceRange {
            start: self.0.line_index.location(range.start()),
            end: self.0.line_index.location(range.end()),
        }
    }

    /// Whether a diagnostic at `range` with message `msg` is suppressed by
    /// a `# type: ignore` / `# pyright: ignore` directive comment on its
    /// start line. `msg` is accepted for parity with a rule-code-aware
    /// sink (`# pyright: ignore[reportFoo]`); this implementation
    /// suppresses at line granularity only, matching the common case.
    pub fn is_ignored(&self, range: &SourceRange, _msg: &str) -> bool {
        self.0.directives.ignored_lines.contains(&range.start.line)
    }

    pub fn is_strict_mode(&self) -> bool {
        self.0.directives.strict_mode
    }

    pub fn is_basic_mode(&self) -> bool {
        self.0.directives.basic_mode
    }
}

impl PartialEq for ModuleInfo {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || (self.0.name == other.0.name && self.0.path == other.0.path)
    }
}
impl Eq for ModuleInfo {}
