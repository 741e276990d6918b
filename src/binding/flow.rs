/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The control-flow graph (spec.md §3, §4.3): a DAG of `FlowNode`s built
//! by threading a "current flow node" cursor through the AST walk and by
//! creating labels that merge branches. Nodes are tagged unions, not a
//! class hierarchy (spec.md §9), arena-owned and addressed by `Idx`.

use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use bitflags::bitflags;
use dupe::Dupe;
use ruff_text_size::TextRange;

use crate::binding::symbol::SymbolId;
use crate::graph::index::Arena;
use crate::graph::index::Idx;

static NEXT_FLOW_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-wide monotonic id (spec.md §5, §9): the simplest correct
/// implementation when multiple binders run concurrently across modules;
/// only intra-graph uniqueness is ever actually required.
#[derive(Clone, Copy, Dupe, Debug, PartialEq, Eq, Hash)]
pub struct FlowNodeId(u32);

impl FlowNodeId {
    fn next() -> Self {
        Self(NEXT_FLOW_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

bitflags! {
    /// `Condition`'s flag set (spec.md §3): `TrueCondition`/`FalseCondition`
    /// cross with whether the condition can never hold (`Never`), which is
    /// used by the implicit-else and exhausted-match gates.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ConditionFlags: u8 {
        const TRUE  = 1 << 0;
        const NEVER = 1 << 1;
    }
}

#[derive(Clone, Debug)]
pub struct AssignmentNode {
    pub node: TextRange,
    pub target_symbol: SymbolId,
    pub antecedent: Idx<FlowNode>,
    pub unbind: bool,
}

#[derive(Clone, Debug)]
pub struct CallNode {
    pub node: TextRange,
    pub antecedent: Idx<FlowNode>,
}

#[derive(Clone, Debug)]
pub struct VariableAnnotationNode {
    pub antecedent: Idx<FlowNode>,
}

#[derive(Clone, Debug)]
pub struct WildcardImportNode {
    pub node: TextRange,
    pub names: Vec<ruff_python_ast::name::Name>,
    pub antecedent: Idx<FlowNode>,
}

#[derive(Clone, Debug)]
pub struct NarrowForPatternNode {
    pub subject_expression: TextRange,
    pub statement: TextRange,
    pub antecedent: Idx<FlowNode>,
}

#[derive(Clone, Debug)]
pub struct ExhaustedMatchNode {
    pub node: TextRange,
    pub subject_expression: TextRange,
    pub antecedent: Idx<FlowNode>,
}

#[derive(Clone, Debug)]
pub struct ConditionNode {
    pub flags: ConditionFlags,
    pub reference: Option<String>,
    pub expression: TextRange,
    pub antecedent: Idx<FlowNode>,
}

#[derive(Clone, Debug, Default)]
pub struct BranchLabelNode {
    pub antecedents: Vec<Idx<FlowNode>>,
    pub pre_branch_antecedent: Option<Idx<FlowNode>>,
    pub affected_expressions: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoopLabelNode {
    pub antecedents: Vec<Idx<FlowNode>>,
    pub affected_expressions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct PostContextManagerLabelNode {
    pub antecedents: Vec<Idx<FlowNode>>,
    pub expressions: Vec<TextRange>,
    pub is_async: bool,
    pub block_if_swallows_exceptions: bool,
}

#[derive(Clone, Debug)]
pub struct PreFinallyGateNode {
    pub antecedent: Idx<FlowNode>,
}

#[derive(Clone, Debug)]
pub struct PostFinallyNode {
    pub antecedent: Idx<FlowNode>,
    pub pre_finally_gate: Idx<FlowNode>,
    pub finally_node: TextRange,
}

#[derive(Clone, Debug)]
pub enum FlowNodeKind {
    Start,
    Assignment(AssignmentNode),
    Call(CallNode),
    VariableAnnotation(VariableAnnotationNode),
    WildcardImport(WildcardImportNode),
    NarrowForPattern(NarrowForPatternNode),
    ExhaustedMatch(ExhaustedMatchNode),
    Condition(ConditionNode),
    BranchLabel(BranchLabelNode),
    LoopLabel(LoopLabelNode),
    PostContextManagerLabel(PostContextManagerLabelNode),
    PreFinallyGate(PreFinallyGateNode),
    PostFinally(PostFinallyNode),
    Unreachable,
}

#[derive(Clone, Debug)]
pub struct FlowNode {
    id: FlowNodeId,
    kind: FlowNodeKind,
}

impl FlowNode {
    pub fn id(&self) -> FlowNodeId {
        self.id
    }

    pub fn kind(&self) -> &FlowNodeKind {
        &self.kind
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self.kind, FlowNodeKind::Unreachable)
    }
}

/// Owns every `FlowNode` allocated while binding one module. The
/// `Unreachable` node is a shared singleton (spec.md §3): absorbing, so
/// any join that would add it is skipped.
#[derive(Debug)]
pub struct FlowGraph {
    arena: Arena<FlowNode>,
    unreachable: Idx<FlowNode>,
}

impl FlowGraph {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let unreachable = arena.push(FlowNode {
            id: FlowNodeId::next(),
            kind: FlowNodeKind::Unreachable,
        });
        Self { arena, unreachable }
    }

    pub fn unreachable(&self) -> Idx<FlowNode> {
        self.unreachable
    }

    pub fn get(&self, idx: Idx<FlowNode>) -> &FlowNode {
        self.arena.get(idx)
    }

    fn push(&mut self, kind: FlowNodeKind) -> Idx<FlowNode> {
        self.arena.push(FlowNode {
            id: FlowNodeId::next(),
            kind,
        })
    }

    /// Placed at entry of Module, Function, Lambda, Comprehension scopes
    /// (spec.md §4.3).
    pub fn create_start(&mut self) -> Idx<FlowNode> {
        self.push(FlowNodeKind::Start)
    }

    pub fn create_branch_label(&mut self, pre_branch: Option<Idx<FlowNode>>) -> Idx<FlowNode> {
        self.push(FlowNodeKind::BranchLabel(BranchLabelNode {
            antecedents: Vec::new(),
            pre_branch_antecedent: pre_branch,
            affected_expressions: Vec::new(),
        }))
    }

    pub fn create_loop_label(&mut self) -> Idx<FlowNode> {
        self.push(FlowNodeKind::LoopLabel(LoopLabelNode::default()))
    }

    pub fn create_context_manager_label(
        &mut self,
        expressions: Vec<TextRange>,
        is_async: bool,
        block_if_swallows_exceptions: bool,
    ) -> Idx<FlowNode> {
        self.push(FlowNodeKind::PostContextManagerLabel(
            PostContextManagerLabelNode {
                antecedents: Vec::new(),
                expressions,
                is_async,
                block_if_swallows_exceptions,
            },
        ))
    }

    /// Append `node` to `label`'s antecedents unless it is `Unreachable`
    /// (absorbing) or already present (spec.md §4.3, §8 invariant 4).
    pub fn add_antecedent(&mut self, label: Idx<FlowNode>, node: Idx<FlowNode>) {
        if node == self.unreachable {
            return;
        }
        let antecedents = match &mut self.arena.get_mut(label).kind {
            FlowNodeKind::BranchLabel(b) => &mut b.antecedents,
            FlowNodeKind::LoopLabel(l) => &mut l.antecedents,
            FlowNodeKind::PostContextManagerLabel(p) => &mut p.antecedents,
            _ => return,
        };
        if !antecedents.contains(&node) {
            antecedents.push(node);
        }
    }

    fn antecedents_of(&self, label: Idx<FlowNode>) -> &[Idx<FlowNode>] {
        match &self.get(label).kind {
            FlowNodeKind::BranchLabel(b) => &b.antecedents,
            FlowNodeKind::LoopLabel(l) => &l.antecedents,
            FlowNodeKind::PostContextManagerLabel(p) => &p.antecedents,
            _ => &[],
        }
    }

    /// Resolve a label after all its antecedents have been added (spec.md
    /// §4.3, §8 invariant 5): empty → `Unreachable`; exactly one
    /// antecedent on a `BranchLabel` → elide to that antecedent directly;
    /// otherwise the label stands, and the caller should record
    /// `antecedents - 1` joins on the owning scope's complexity counter.
    pub fn finish_flow_label(&mut self, label: Idx<FlowNode>) -> Idx<FlowNode> {
        let antecedents = self.antecedents_of(label);
        match antecedents.len() {
            0 => self.unreachable,
            1 if matches!(self.get(label).kind, FlowNodeKind::BranchLabel(_)) => antecedents[0],
            _ => label,
        }
    }

    pub fn antecedent_count(&self, label: Idx<FlowNode>) -> u32 {
        self.antecedents_of(label).len() as u32
    }

    pub fn create_assignment(
        &mut self,
        target_symbol: SymbolId,
        node: TextRange,
        antecedent: Idx<FlowNode>,
        unbind: bool,
    ) -> Idx<FlowNode> {
        self.push(FlowNodeKind::Assignment(AssignmentNode {
            node,
            target_symbol,
            antecedent,
            unbind,
        }))
    }

    pub fn create_call(&mut self, node: TextRange, antecedent: Idx<FlowNode>) -> Idx<FlowNode> {
        self.push(FlowNodeKind::Call(CallNode { node, antecedent }))
    }

    pub fn create_variable_annotation(&mut self, antecedent: Idx<FlowNode>) -> Idx<FlowNode> {
        self.push(FlowNodeKind::VariableAnnotation(VariableAnnotationNode {
            antecedent,
        }))
    }

    pub fn create_wildcard_import(
        &mut self,
        node: TextRange,
        names: Vec<ruff_python_ast::name::Name>,
        antecedent: Idx<FlowNode>,
    ) -> Idx<FlowNode> {
        self.push(FlowNodeKind::WildcardImport(WildcardImportNode {
            node,
            names,
            antecedent,
        }))
    }

    pub fn create_narrow_for_pattern(
        &mut self,
        subject_expression: TextRange,
        statement: TextRange,
        antecedent: Idx<FlowNode>,
    ) -> Idx<FlowNode> {
        self.push(FlowNodeKind::NarrowForPattern(NarrowForPatternNode {
            subject_expression,
            statement,
            antecedent,
        }))
    }

    pub fn create_exhausted_match(
        &mut self,
        node: TextRange,
        subject_expression: TextRange,
        antecedent: Idx<FlowNode>,
    ) -> Idx<FlowNode> {
        self.push(FlowNodeKind::ExhaustedMatch(ExhaustedMatchNode {
            node,
            subject_expression,
            antecedent,
        }))
    }

    /// Raw conditional-node constructor. Deciding *whether* to call this
    /// (unreachable antecedent, statically-contradicted, non-narrowing
    /// expression) is the caller's job (spec.md §4.3's `createFlowConditional`);
    /// this just allocates the node.
    pub fn create_condition(
        &mut self,
        flags: ConditionFlags,
        reference: Option<String>,
        expression: TextRange,
        antecedent: Idx<FlowNode>,
    ) -> Idx<FlowNode> {
        self.push(FlowNodeKind::Condition(ConditionNode {
            flags,
            reference,
            expression,
            antecedent,
        }))
    }

    pub fn create_pre_finally_gate(&mut self, antecedent: Idx<FlowNode>) -> Idx<FlowNode> {
        self.push(FlowNodeKind::PreFinallyGate(PreFinallyGateNode { antecedent }))
    }

    pub fn create_post_finally(
        &mut self,
        antecedent: Idx<FlowNode>,
        pre_finally_gate: Idx<FlowNode>,
        finally_node: TextRange,
    ) -> Idx<FlowNode> {
        self.push(FlowNodeKind::PostFinally(PostFinallyNode {
            antecedent,
            pre_finally_gate,
            finally_node,
        }))
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_label_resolves_to_unreachable() {
        let mut graph = FlowGraph::new();
        let label = graph.create_branch_label(None);
        assert_eq!(graph.finish_flow_label(label), graph.unreachable());
    }

    #[test]
    fn test_single_antecedent_branch_label_is_elided() {
        let mut graph = FlowGraph::new();
        let start = graph.create_start();
        let label = graph.create_branch_label(None);
        graph.add_antecedent(label, start);
        assert_eq!(graph.finish_flow_label(label), start);
    }

    #[test]
    fn test_unreachable_antecedent_is_not_added() {
        let mut graph = FlowGraph::new();
        let label = graph.create_branch_label(None);
        let unreachable = graph.unreachable();
        graph.add_antecedent(label, unreachable);
        assert_eq!(graph.antecedent_count(label), 0);
    }

    #[test]
    fn test_duplicate_antecedents_are_deduplicated() {
        let mut graph = FlowGraph::new();
        let start = graph.create_start();
        let label = graph.create_branch_label(None);
        graph.add_antecedent(label, start);
        graph.add_antecedent(label, start);
        assert_eq!(graph.antecedent_count(label), 1);
    }

    #[test]
    fn test_multi_antecedent_branch_label_survives() {
        let mut graph = FlowGraph::new();
        let a = graph.create_start();
        let b = graph.create_call(TextRange::default(), a);
        let label = graph.create_branch_label(None);
        graph.add_antecedent(label, a);
        graph.add_antecedent(label, b);
        assert_eq!(graph.finish_flow_label(label), label);
        assert_eq!(graph.antecedent_count(label), 2);
    }
}
