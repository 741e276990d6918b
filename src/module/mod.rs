/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Module identity: names, file URIs, and the small per-file metadata the
//! binder needs (source text, stub-ness, `# type: ignore` directives).

pub mod module_info;
pub mod module_name;
pub mod short_identifier;
