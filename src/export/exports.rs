/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use ruff_python_ast::name::Name;
use starlark_map::small_map::SmallMap;
use starlark_map::small_set::SmallSet;

use crate::module::module_info::ModulePath;
use crate::module::module_name::ModuleName;

/// One arm of a multi-part `import a.b.c`: the implicit submodule loaded
/// at each level of the dotted path (spec.md §4.8's "loader-actions
/// tree").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplicitImport {
    pub module: ModuleName,
    pub path: Option<ModulePath>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportType {
    Local,
    ThirdParty,
    BuiltIn,
}

#[derive(Clone, Debug)]
pub struct PyTypedInfo {
    pub is_partial: bool,
}

/// What the out-of-scope import resolver reports about one `import`/
/// `from ... import ...` request (spec.md §6).
#[derive(Clone, Debug, Default)]
pub struct ImportResult {
    pub is_import_found: bool,
    pub is_native_lib: bool,
    pub is_stub_file: bool,
    pub import_type: Option<ImportType>,
    pub resolved_uris: Vec<ModulePath>,
    pub filtered_implicit_imports: SmallMap<Name, ImplicitImport>,
    pub py_typed_info: Option<PyTypedInfo>,
}

#[derive(Clone, Debug)]
pub struct ImportRequest {
    pub leading_dots: u32,
    pub name_parts: Vec<Name>,
    pub imported_symbols: Option<Vec<Name>>,
}

/// The import-resolver collaborator named in spec.md §6. The binder calls
/// `resolve` for every `import`/`from` statement; resolution itself
/// (mapping a module name to a file URI) is out of scope for this crate.
pub trait ImportResolver {
    fn resolve(&self, source: &ModulePath, request: &ImportRequest) -> ImportResult;
}

/// What a resolved module exports, as reported by the import-lookup
/// collaborator (spec.md §6), used by wildcard-import handling
/// (spec.md §4.8) and the `__all__` recognizer (spec.md §4.5).
#[derive(Clone, Debug, Default)]
pub struct ModuleExports {
    pub symbol_names: SmallSet<Name>,
    pub dunder_all_names: Option<Vec<Name>>,
    pub uses_unsupported_dunder_all_form: bool,
}

impl ModuleExports {
    pub fn contains(&self, name: &Name) -> bool {
        self.symbol_names.contains(name)
    }

    /// The names bound by `from this import *`: `__all__` if well-formed,
    /// otherwise every non-underscore-prefixed top-level name.
    pub fn wildcard(&self) -> Vec<Name> {
        if let Some(all) = &self.dunder_all_names {
            if !self.uses_unsupported_dunder_all_form {
                return all.clone();
            }
        }
        self.symbol_names
            .iter()
            .filter(|n| !n.as_str().starts_with('_'))
            .cloned()
            .collect()
    }
}

/// The import-lookup collaborator named in spec.md §6:
/// `lookup(moduleUri) -> {symbolTable, dunderAllNames?,
/// usesUnsupportedDunderAllForm}?`.
pub trait ImportLookup {
    fn lookup(&self, module: ModuleName) -> Option<ModuleExports>;
}

/// A fixed in-memory implementation of both collaborators, used by this
/// crate's own tests so the binder can be exercised end to end without a
/// real project/file orchestrator.
#[derive(Clone, Debug, Default)]
pub struct FixedModuleEnv {
    modules: SmallMap<ModuleName, ModuleExports>,
}

impl FixedModuleEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, name: ModuleName, exports: ModuleExports) -> Self {
        self.modules.insert(name, exports);
        self
    }
}

impl ImportResolver for FixedModuleEnv {
    fn resolve(&self, _source: &ModulePath, request: &ImportRequest) -> ImportResult {
        let Ok(parts) = vec1::Vec1::try_from_vec(request.name_parts.clone()) else {
            return ImportResult::default();
        };
        let module = ModuleName::from_parts(parts);
        match self.modules.get(&module) {
            Some(_) => ImportResult {
                is_import_found: true,
                import_type: Some(ImportType::Local),
                ..Default::default()
            },
            None => ImportResult::default(),
        }
    }
}

impl ImportLookup for FixedModuleEnv {
    fn lookup(&self, module: ModuleName) -> Option<ModuleExports> {
        self.modules.get(&module).cloned()
    }
}
