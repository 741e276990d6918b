/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! `BinderError`: the small set of failures that abort binding a module
//! outright rather than being recorded through `ErrorCollector` (spec.md
//! §2.2). Everything a Python program can do wrong is a diagnostic; only
//! failures that leave the binder with no AST to walk -- the source
//! doesn't parse -- are modeled as a `Result`.

use ruff_python_parser::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BinderError {
    #[error("failed to parse module: {0}")]
    Parse(#[from] ParseError),
}
