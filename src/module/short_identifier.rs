/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use ruff_python_ast::Identifier;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;

/// The range of an `Identifier`, used as a compact, `Copy` key for
/// declaration sites instead of cloning or pointer-chasing the AST node
/// itself (mirrors `pyrefly::module::short_identifier::ShortIdentifier`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortIdentifier(TextRange);

impl ShortIdentifier {
    pub fn new(identifier: &Identifier) -> Self {
        Self(identifier.range())
    }

    pub fn range(self) -> TextRange {
        self.0
    }
}
