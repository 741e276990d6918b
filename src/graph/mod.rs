/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Small arena utilities used to give the flow graph and the scope tree
//! stable, non-owning cross-references without reference counting.

pub mod index;
