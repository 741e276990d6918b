/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A name binder and control-flow graph builder for a Python static type
//! checker (spec.md §1 OVERVIEW): given one module's parsed AST, builds
//! its scope tree, symbol table, declaration graph, and control-flow
//! graph in a single forward walk, deferring function and lambda bodies
//! until their enclosing scope finishes (spec.md §2, §4, §5).

pub mod ast;
pub mod binding;
pub mod error;
pub mod export;
pub mod graph;
pub mod module;
pub mod util;

use ruff_python_parser::parse_suite;
use rayon::prelude::*;

use crate::binding::bindings::Binder;
use crate::binding::bindings::BoundModule;
use crate::binding::file_info::AnalyzerFileInfo;
use crate::error::binder_error::BinderError;
use crate::error::collector::ErrorCollector;
use crate::error::style::ErrorStyle;
use crate::export::exports::ImportLookup;
use crate::export::exports::ImportResolver;
use crate::module::module_info::ModuleInfo;

pub use crate::util::trace::init_tracing;

/// Parses and binds one module, returning the bound result together with
/// the collector the caller reads diagnostics back out of. Parse failures
/// abort outright (spec.md §2.2); everything else is recorded on
/// `errors` and binding still completes (spec.md §7).
pub fn bind_module(
    module_info: ModuleInfo,
    file_info: AnalyzerFileInfo,
    import_resolver: &dyn ImportResolver,
    import_lookup: &dyn ImportLookup,
    errors: &ErrorCollector,
) -> Result<BoundModule, BinderError> {
    let body = parse_suite(module_info.contents(), &module_info.name().to_string())?;
    let binder = Binder::new(module_info, file_info, import_resolver, import_lookup, errors);
    Ok(binder.bind_module(&body))
}

/// One module queued for parallel binding (spec.md §2.5: "binding many
/// modules concurrently, one `Binder` per module, sharing nothing but the
/// read-only import graph").
pub struct ModuleBindingInput {
    pub module_info: ModuleInfo,
    pub file_info: AnalyzerFileInfo,
}

/// Binds every module in `inputs` concurrently on the shared worker pool
/// (spec.md §2.5). Each module gets its own `ErrorCollector` and `Binder`;
/// the only state shared across threads is the read-only resolver/lookup
/// pair, which is why both must be `Sync`.
pub fn bind_modules_parallel(
    inputs: Vec<ModuleBindingInput>,
    import_resolver: &(dyn ImportResolver + Sync),
    import_lookup: &(dyn ImportLookup + Sync),
    style: ErrorStyle,
) -> Vec<(Result<BoundModule, BinderError>, ErrorCollector)> {
    crate::util::rayon::thread_pool().install(|| {
        inputs
            .into_par_iter()
            .map(|input| {
                let errors =
                    ErrorCollector::new(input.module_info.clone(), style, Default::default());
                let result = bind_module(
                    input.module_info,
                    input.file_info,
                    import_resolver,
                    import_lookup,
                    &errors,
                );
                (result, errors)
            })
            .collect()
    })
}
