/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Interfaces to the out-of-scope import resolver (spec.md §6): `exports`
//! models "what does importing this module, or `from this import *`,
//! bind", and `special` recognizes the handful of `typing`/`dataclasses`
//! names whose presence changes binder behavior (spec.md §1's "typing/
//! dataclasses aliases").

pub mod exports;
pub mod special;
