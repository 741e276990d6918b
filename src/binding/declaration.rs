/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! `Declaration`: a tagged union of the nine ways a name can be introduced
//! (spec.md §3). Declarations are owned by the `Symbol` they belong to,
//! appended in source order, and never mutated after creation except for
//! the narrow back-patch described on `FunctionDeclaration` (return/yield/
//! raise statement collection, spec.md §3).

use ruff_python_ast::name::Name;
use ruff_text_size::TextRange;

use crate::export::exports::ImplicitImport;
use crate::module::module_name::ModuleName;
use crate::module::short_identifier::ShortIdentifier;

/// Fields shared by every declaration variant (spec.md §3: "Shared
/// fields: source AST node reference, file URI, text range, module name,
/// `isInExceptSuite` flag").
#[derive(Clone, Debug)]
pub struct DeclarationHeader {
    pub range: TextRange,
    pub module: ModuleName,
    pub is_in_except_suite: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableSource {
    Assignment,
    Annotation,
    ForTarget,
    WithTarget,
    ExceptTarget,
    PatternCapture,
    MemberAccess,
    Slot,
}

#[derive(Clone, Debug)]
pub struct VariableDeclaration {
    pub header: DeclarationHeader,
    pub source: VariableSource,
    pub is_constant: bool,
    pub is_final: bool,
    pub is_class_var: bool,
    pub is_init_var: bool,
    pub is_defined_by_slots: bool,
    pub is_defined_by_member_access: bool,
    pub is_explicit_binding: bool,
    pub type_annotation: Option<TextRange>,
    pub doc_string: Option<String>,
    /// The node whose static type is used to infer this variable's type
    /// when no annotation is present, e.g. the RHS of `x = expr`.
    pub inferred_type_source: Option<TextRange>,
    pub type_alias_name: Option<ShortIdentifier>,
}

#[derive(Clone, Debug)]
pub struct ParamDeclaration {
    pub header: DeclarationHeader,
    pub type_annotation: Option<TextRange>,
    pub has_default: bool,
}

#[derive(Clone, Debug)]
pub struct FunctionDeclaration {
    pub header: DeclarationHeader,
    pub is_async: bool,
    pub is_generator: bool,
    /// Back-patched after the body is bound (spec.md §3): every `return`,
    /// `yield`/`yield from`, and `raise` statement reached while walking
    /// the body.
    pub returns: Vec<TextRange>,
    pub yields: Vec<TextRange>,
    pub raises: Vec<TextRange>,
}

impl FunctionDeclaration {
    pub fn record_return(&mut self, range: TextRange) {
        self.returns.push(range);
    }
    pub fn record_yield(&mut self, range: TextRange) {
        self.is_generator = true;
        self.yields.push(range);
    }
    pub fn record_raise(&mut self, range: TextRange) {
        self.raises.push(range);
    }
}

#[derive(Clone, Debug)]
pub struct ClassDeclaration {
    pub header: DeclarationHeader,
}

/// How an alias's target symbols load: from a resolved module, or by
/// falling back to an implicit submodule when the directly named symbol
/// isn't one the module exports (spec.md §3, §4.8).
#[derive(Clone, Debug)]
pub struct AliasDeclaration {
    pub header: DeclarationHeader,
    pub resolved_module: Option<ModuleName>,
    pub loads_symbols_from_module: bool,
    pub symbol_name_in_module: Option<Name>,
    pub submodule_fallback: Option<Name>,
    /// Multi-part `import a.b.c` builds one of these per path component,
    /// keyed by the component name (spec.md §3: "a tree of implicit-import
    /// loader actions keyed by name part").
    pub implicit_imports: Vec<(Name, ImplicitImport)>,
}

#[derive(Clone, Debug)]
pub struct TypeAliasDeclaration {
    pub header: DeclarationHeader,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeParamKind {
    TypeVar,
    TypeVarTuple,
    ParamSpec,
}

#[derive(Clone, Debug)]
pub struct TypeParamDeclaration {
    pub header: DeclarationHeader,
    pub kind: TypeParamKind,
    pub has_bound: bool,
    pub has_default: bool,
}

/// A binder-synthesized name with no source-level declaration site, e.g.
/// `__doc__`/`__module__`/`__qualname__` implicitly present in a class
/// scope (spec.md §4.2).
#[derive(Clone, Debug)]
pub struct IntrinsicDeclaration {
    pub header: DeclarationHeader,
    pub description: &'static str,
}

#[derive(Clone, Debug)]
pub struct SpecialBuiltInClassDeclaration {
    pub header: DeclarationHeader,
}

#[derive(Clone, Debug)]
pub enum Declaration {
    Variable(VariableDeclaration),
    Param(ParamDeclaration),
    Function(FunctionDeclaration),
    Class(ClassDeclaration),
    Alias(AliasDeclaration),
    TypeAlias(TypeAliasDeclaration),
    TypeParam(TypeParamDeclaration),
    Intrinsic(IntrinsicDeclaration),
    SpecialBuiltInClass(SpecialBuiltInClassDeclaration),
}

impl Declaration {
    pub fn header(&self) -> &DeclarationHeader {
        match self {
            Declaration::Variable(d) => &d.header,
            Declaration::Param(d) => &d.header,
            Declaration::Function(d) => &d.header,
            Declaration::Class(d) => &d.header,
            Declaration::Alias(d) => &d.header,
            Declaration::TypeAlias(d) => &d.header,
            Declaration::TypeParam(d) => &d.header,
            Declaration::Intrinsic(d) => &d.header,
            Declaration::SpecialBuiltInClass(d) => &d.header,
        }
    }

    pub fn range(&self) -> TextRange {
        self.header().range
    }

    pub fn as_function_mut(&mut self) -> Option<&mut FunctionDeclaration> {
        match self {
            Declaration::Function(d) => Some(d),
            _ => None,
        }
    }
}
