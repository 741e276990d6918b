/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Diagnostics: the `DiagnosticSink` collaborator's concrete shape (spec.md
//! §6/§7). The binder never returns `Result` for domain errors; everything
//! goes through `ErrorCollector::add`, and binding continues past the
//! problem (spec.md §7, "Recovery within a file is best-effort").

pub mod binder_error;
pub mod collector;
pub mod error;
pub mod kind;
pub mod rules;
pub mod style;
