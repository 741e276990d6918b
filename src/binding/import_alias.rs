/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The import-alias builder (spec.md §4.2, §4.8): turns `import a.b.c
//! [as d]`, `from m import x [as y]`, and `from m import *` into
//! `Alias` declarations, consulting the out-of-scope import-resolver and
//! import-lookup collaborators (`crate::export::exports`).

use ruff_python_ast::name::Name;
use ruff_text_size::TextRange;

use crate::binding::declaration::AliasDeclaration;
use crate::binding::declaration::DeclarationHeader;
use crate::export::exports::ImplicitImport;
use crate::export::exports::ImportLookup;
use crate::export::exports::ImportRequest;
use crate::export::exports::ImportResolver;
use crate::module::module_info::ModulePath;
use crate::module::module_name::ModuleName;

/// `import a.b.c`: build a loader-actions tree walking the dotted name,
/// attaching an implicit submodule import at each component (spec.md
/// §4.2's "multi-part import names build a nested loader-actions tree").
/// Returns the declaration keyed on the *first* name part, matching
/// `bindNameToScope`'s binding site.
pub fn build_dotted_import_alias(
    source: &ModulePath,
    module: &ModuleName,
    range: TextRange,
    resolver: &dyn ImportResolver,
) -> AliasDeclaration {
    let components = module.components();
    let mut implicit_imports = Vec::new();
    let mut prefix: Option<ModuleName> = None;
    for part in &components {
        prefix = Some(match &prefix {
            Some(p) => p.append(part),
            None => ModuleName::from_parts(vec1::vec1![part.clone()]),
        });
        let current = prefix.clone().unwrap();
        let request = ImportRequest {
            leading_dots: 0,
            name_parts: current.components(),
            imported_symbols: None,
        };
        let result = resolver.resolve(source, &request);
        implicit_imports.push((
            part.clone(),
            ImplicitImport {
                module: current,
                path: result.resolved_uris.first().cloned(),
            },
        ));
    }
    AliasDeclaration {
        header: DeclarationHeader {
            range,
            module: module.clone(),
            is_in_except_suite: false,
        },
        resolved_module: Some(module.clone()),
        loads_symbols_from_module: false,
        symbol_name_in_module: None,
        submodule_fallback: None,
        implicit_imports,
    }
}

/// `from m import x [as y]`: declares `y` (or `x`) naming `x` inside
/// module `m`; when `x` itself matches an implicit submodule of `m`,
/// attach a submodule-fallback alias (spec.md §4.8) so the type evaluator
/// can fall back to it when `m` does not directly export `x`.
pub fn build_from_import_alias(
    module: &ModuleName,
    imported_name: &Name,
    range: TextRange,
    module_exports_contains: bool,
    submodule_exists: bool,
) -> AliasDeclaration {
    AliasDeclaration {
        header: DeclarationHeader {
            range,
            module: module.clone(),
            is_in_except_suite: false,
        },
        resolved_module: Some(module.clone()),
        loads_symbols_from_module: module_exports_contains,
        symbol_name_in_module: Some(imported_name.clone()),
        submodule_fallback: if !module_exports_contains && submodule_exists {
            Some(imported_name.clone())
        } else {
            None
        },
        implicit_imports: Vec::new(),
    }
}

/// `from m import *`: consult the import-lookup collaborator for the
/// wildcard names (respecting `__all__` when present and well-formed).
/// Returns one `(name, AliasDeclaration)` pair per introduced symbol.
pub fn build_wildcard_import_aliases(
    module: &ModuleName,
    range: TextRange,
    lookup: &dyn ImportLookup,
) -> Vec<(Name, AliasDeclaration)> {
    let Some(exports) = lookup.lookup(module.clone()) else {
        return Vec::new();
    };
    exports
        .wildcard()
        .into_iter()
        .map(|name| {
            let decl = AliasDeclaration {
                header: DeclarationHeader {
                    range,
                    module: module.clone(),
                    is_in_except_suite: false,
                },
                resolved_module: Some(module.clone()),
                loads_symbols_from_module: true,
                symbol_name_in_module: Some(name.clone()),
                submodule_fallback: None,
                implicit_imports: Vec::new(),
            };
            (name, decl)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::export::exports::ImportResult;
    use crate::export::exports::ImportType;

    struct AlwaysFound;
    impl ImportResolver for AlwaysFound {
        fn resolve(&self, _source: &ModulePath, _request: &ImportRequest) -> ImportResult {
            ImportResult {
                is_import_found: true,
                import_type: Some(ImportType::Local),
                resolved_uris: vec![ModulePath::filesystem(Path::new("found.py").to_owned())],
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_dotted_import_builds_one_implicit_import_per_component() {
        let module = ModuleName::from_dotted("a.b.c").unwrap();
        let source = ModulePath::filesystem(Path::new("main.py").to_owned());
        let decl = build_dotted_import_alias(&source, &module, TextRange::default(), &AlwaysFound);
        assert_eq!(decl.implicit_imports.len(), 3);
        assert_eq!(decl.implicit_imports[0].0.as_str(), "a");
        assert_eq!(decl.implicit_imports[2].0.as_str(), "c");
    }
}
