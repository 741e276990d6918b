/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use dupe::Dupe;

/// How an `ErrorCollector` should behave when `add` is called.
#[derive(Clone, Copy, Dupe, Debug, PartialEq, Eq)]
pub enum ErrorStyle {
    /// Print errors as they are discovered.
    Immediate,
    /// Buffer errors and hand them back to the caller once binding finishes.
    Delayed,
    /// Drop errors on the floor (used for speculative/best-effort binding
    /// of unreachable subtrees, see the dummy-scope generator in
    /// `binding::auxiliary`).
    Never,
}
