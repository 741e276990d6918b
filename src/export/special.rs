/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The small, closed set of `typing`/`dataclasses` names whose presence
//! changes binder behavior (spec.md §1, §4.2, §4.3): `Final`, `ClassVar`,
//! `Annotated`, `InitVar`, `TYPE_CHECKING`, and the functional-definition
//! builtins recognized elsewhere in the import-alias builder.
///
/// Resolution to one of these variants is purely a function of a fully
/// qualified dotted name (e.g. `typing.Final`), which the binder computes
/// itself from its own import-alias bookkeeping (`binding::import_alias`).
/// This module has no knowledge of scopes or imports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialExport {
    TypeChecking,
    Final,
    ClassVar,
    Annotated,
    InitVar,
    Protocol,
    NamedTuple,
    TypedDict,
    Dataclass,
    DataclassField,
}

impl SpecialExport {
    /// `path` is a fully dotted canonical name, e.g. `"typing.Final"` or
    /// `"dataclasses.InitVar"`.
    pub fn from_canonical_name(path: &str) -> Option<Self> {
        Some(match path {
            "typing.TYPE_CHECKING" => Self::TypeChecking,
            "typing.Final" | "typing_extensions.Final" => Self::Final,
            "typing.ClassVar" => Self::ClassVar,
            "typing.Annotated" | "typing_extensions.Annotated" => Self::Annotated,
            "dataclasses.InitVar" => Self::InitVar,
            "typing.Protocol" | "typing_extensions.Protocol" => Self::Protocol,
            "typing.NamedTuple" => Self::NamedTuple,
            "typing.TypedDict" | "typing_extensions.TypedDict" => Self::TypedDict,
            "dataclasses.dataclass" => Self::Dataclass,
            "dataclasses.field" => Self::DataclassField,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_canonical_name() {
        assert_eq!(
            SpecialExport::from_canonical_name("typing.Final"),
            Some(SpecialExport::Final)
        );
        assert_eq!(SpecialExport::from_canonical_name("os.path.join"), None);
    }
}
