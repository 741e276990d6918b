/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The AST side table (spec.md §3, §6, §9): binder metadata is recorded
//! in one mapping from node-id to a small struct, never by mutating the
//! AST. Node identity is the node's `TextRange`, which is stable, unique
//! within one module, and cheap to compute from a borrowed reference
//! without a pre-assigned integer id.

use ruff_text_size::TextRange;
use starlark_map::small_map::SmallMap;

use crate::binding::declaration::Declaration;
use crate::binding::flow::FlowNode;
use crate::binding::scope::Scope;
use crate::export::exports::ImplicitImport;
use crate::graph::index::Idx;

#[derive(Clone, Copy, Debug, Default)]
pub struct FlowAround {
    pub before: Option<Idx<FlowNode>>,
    pub after: Option<Idx<FlowNode>>,
}

/// Import info attached to an import-name node (spec.md §6).
#[derive(Clone, Debug)]
pub struct ImportInfo {
    pub resolved: Option<ImplicitImport>,
    pub is_import_found: bool,
}

/// One mapping from node identity to whichever piece of binder metadata
/// that node kind carries (spec.md §9: "Side table, not monkey-patching").
#[derive(Debug, Default)]
pub struct SideTable {
    scopes: SmallMap<TextRange, Idx<Scope>>,
    flow: SmallMap<TextRange, FlowAround>,
    declarations: SmallMap<TextRange, Declaration>,
    import_info: SmallMap<TextRange, ImportInfo>,
}

impl SideTable {
    pub fn set_scope(&mut self, node: TextRange, scope: Idx<Scope>) {
        self.scopes.insert(node, scope);
    }

    pub fn scope_at(&self, node: TextRange) -> Option<Idx<Scope>> {
        self.scopes.get(&node).copied()
    }

    pub fn set_flow_before(&mut self, node: TextRange, flow: Idx<FlowNode>) {
        self.flow.entry(node).or_default().before = Some(flow);
    }

    pub fn set_flow_after(&mut self, node: TextRange, flow: Idx<FlowNode>) {
        self.flow.entry(node).or_default().after = Some(flow);
    }

    pub fn flow_at(&self, node: TextRange) -> Option<FlowAround> {
        self.flow.get(&node).copied()
    }

    pub fn set_declaration(&mut self, node: TextRange, decl: Declaration) {
        self.declarations.insert(node, decl);
    }

    pub fn declaration_at(&self, node: TextRange) -> Option<&Declaration> {
        self.declarations.get(&node)
    }

    pub fn set_import_info(&mut self, node: TextRange, info: ImportInfo) {
        self.import_info.insert(node, info);
    }

    pub fn import_info_at(&self, node: TextRange) -> Option<&ImportInfo> {
        self.import_info.get(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::flow::FlowGraph;
    use crate::binding::scope::ScopeTree;

    #[test]
    fn test_scope_and_flow_round_trip() {
        let mut table = SideTable::default();
        let tree = ScopeTree::new();
        let mut graph = FlowGraph::new();
        let node = TextRange::default();
        table.set_scope(node, tree.module_scope());
        let start = graph.create_start();
        table.set_flow_before(node, start);

        assert_eq!(table.scope_at(node), Some(tree.module_scope()));
        assert_eq!(table.flow_at(node).unwrap().before, Some(start));
        assert_eq!(table.flow_at(node).unwrap().after, None);
    }
}
