/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The deferred-task queue (spec.md §4.3, §5, §9): function and lambda
//! bodies are not bound inline, they are enqueued as a plain record
//! capturing the scope and the code-flow-expression set in effect at
//! enqueue time, then drained in FIFO order after the enclosing walk
//! finishes. Enqueuing during a drain is allowed and extends the drain.

use ruff_python_ast::Expr;
use ruff_python_ast::Stmt;
use ruff_text_size::TextRange;
use starlark_map::small_set::SmallSet;

use crate::graph::index::Idx;
use crate::binding::bindings::MethodContext;
use crate::binding::scope::Scope;
use crate::binding::symbol::SymbolId;

/// What kind of body a deferred task will bind, carrying the owned AST
/// fragment so the task can be dequeued and walked independently of the
/// statement it came from.
#[derive(Debug)]
pub enum DeferredWork {
    FunctionBody(Vec<Stmt>),
    LambdaBody(Box<Expr>),
}

/// Identifies the `def` a deferred function body belongs to, so the
/// driver can push an `ActiveFunction` and back-patch `returns`/`yields`/
/// `raises` onto the right `FunctionDeclaration` while walking the body
/// (spec.md §3). Lambdas carry no `FunctionContext`: a lambda body can't
/// contain `return`, and its single implicit return is whatever its
/// expression evaluates to.
#[derive(Debug, Clone, Copy)]
pub struct FunctionContext {
    pub symbol: SymbolId,
    pub is_async: bool,
    pub def_range: TextRange,
}

#[derive(Debug)]
pub struct DeferredTask {
    pub scope: Idx<Scope>,
    /// The code-flow-expressions set captured at enqueue time (spec.md
    /// §5: "each task captures the Scope and the current
    /// 'code-flow-expressions' set that were in effect at enqueue time").
    pub code_flow_expressions: SmallSet<String>,
    /// Present when the body belongs to a method, so the member-access
    /// disambiguator (spec.md §4.7) has what it needs once the body is
    /// actually walked.
    pub method_context: Option<MethodContext>,
    /// Parameter symbols declared in `scope`, bound to an `Assignment` flow
    /// node at the start of the deferred walk (spec.md §4.3: parameters are
    /// "bound" the same way an assignment target is, at function entry).
    pub param_symbols: Vec<(SymbolId, TextRange)>,
    /// `None` for a lambda body; `Some` for a function body.
    pub function: Option<FunctionContext>,
    pub work: DeferredWork,
}

#[derive(Debug, Default)]
pub struct DeferredQueue {
    tasks: std::collections::VecDeque<DeferredTask>,
}

impl DeferredQueue {
    pub fn enqueue(&mut self, task: DeferredTask) {
        self.tasks.push_back(task);
    }

    /// Pops the next task in FIFO order, or `None` once the queue is dry.
    /// Callers should loop on this rather than snapshot the length first,
    /// since draining one task commonly enqueues more.
    pub fn dequeue(&mut self) -> Option<DeferredTask> {
        self.tasks.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::scope::ScopeTree;

    #[test]
    fn test_fifo_order_and_drain_extension() {
        let tree = ScopeTree::new();
        let mut queue = DeferredQueue::default();
        queue.enqueue(DeferredTask {
            scope: tree.module_scope(),
            code_flow_expressions: SmallSet::new(),
            method_context: None,
            param_symbols: Vec::new(),
            function: None,
            work: DeferredWork::FunctionBody(Vec::new()),
        });
        queue.enqueue(DeferredTask {
            scope: tree.module_scope(),
            code_flow_expressions: SmallSet::new(),
            method_context: None,
            param_symbols: Vec::new(),
            function: None,
            work: DeferredWork::FunctionBody(Vec::new()),
        });

        let mut drained = 0;
        while let Some(task) = queue.dequeue() {
            drained += 1;
            if drained == 1 {
                // A task being drained can enqueue another (a nested
                // function/lambda body deferring its own body).
                queue.enqueue(DeferredTask {
                    scope: task.scope,
                    code_flow_expressions: SmallSet::new(),
                    method_context: None,
                    param_symbols: Vec::new(),
                    function: None,
                    work: DeferredWork::FunctionBody(Vec::new()),
                });
            }
        }
        assert_eq!(drained, 3);
    }
}
