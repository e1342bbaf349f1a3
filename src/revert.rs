//! The revert predicate (spec.md §4.C): does calling a function guarantee execution reverts on
//! every path, modulated by a memoized search over the (possibly cyclic) inter-procedural call
//! graph.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::diagnostics::InvariantViolation;
use crate::model::{Cfg, ContractId, FunctionId};
use crate::resolver::resolve_callee;

/// The memo's tri-state value. `Pending` marks a function currently on the search stack: a call
/// graph cycle reaching back to it is conservatively treated as reverting, the same way the
/// source compiler's recursive `checkForReverts` does (spec.md §4.C, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevertState {
    Pending,
    Reverting,
    NoRevert,
}

/// Answers [`Self::may_revert`] for a single [`crate::driver::Driver::analyze_function`] call.
///
/// The memo is scoped to one `RevertAnalyzer`, constructed fresh per function analyzed, matching
/// the source compiler's `m_functionReverts.clear()` at the top of each top-level `analyze` call
/// (spec.md §9).
pub struct RevertAnalyzer<'a> {
    cfg: &'a dyn Cfg,
    memo: FxHashMap<(Option<ContractId>, FunctionId), RevertState>,
}

impl<'a> RevertAnalyzer<'a> {
    pub fn new(cfg: &'a dyn Cfg) -> Self {
        Self { cfg, memo: FxHashMap::default() }
    }

    /// Whether every execution path through `function` reverts, when virtual dispatch inside its
    /// transitive call graph is resolved against `context` (the most-derived contract under
    /// analysis for the *entire* enclosing pass invocation — not recomputed per callee; see
    /// spec.md §4.C/§9 and `original_source`'s `checkForReverts`, which threads the same
    /// `_contract` argument through every recursive call).
    pub fn may_revert(
        &mut self,
        context: Option<ContractId>,
        function: FunctionId,
    ) -> Result<bool, InvariantViolation> {
        let func = self.cfg.function(function);
        let key = (func.owning_contract(), function);

        match self.memo.get(&key) {
            Some(RevertState::NoRevert) => return Ok(false),
            Some(RevertState::Reverting) | Some(RevertState::Pending) => return Ok(true),
            None => {}
        }

        log::trace!(target: "flowcheck::revert", "entering may_revert({:?})", key);
        self.memo.insert(key, RevertState::Pending);

        if !func.is_implemented() {
            self.memo.insert(key, RevertState::NoRevert);
            return Ok(false);
        }

        let flow = self.cfg.function_flow(function, func.owning_contract());
        let mut queue = VecDeque::from([flow.entry]);
        let mut visited = FxHashSet::default();
        visited.insert(flow.entry);

        let mut result = RevertState::Reverting;
        while let Some(node_id) = queue.pop_front() {
            if node_id == flow.exit {
                result = RevertState::NoRevert;
                break;
            }
            let node = self.cfg.node(node_id);

            let mut node_reverts = false;
            for call in node.calls() {
                if let Some(callee) = resolve_callee(self.cfg, call, context)? {
                    if self.may_revert(context, callee)? {
                        node_reverts = true;
                        break;
                    }
                }
            }
            if node_reverts {
                continue;
            }

            for &succ in node.exits() {
                if visited.insert(succ) {
                    queue.push_back(succ);
                }
            }
        }

        log::trace!(target: "flowcheck::revert", "may_revert({:?}) = {:?}", key, result);
        self.memo.insert(key, result);
        Ok(result != RevertState::NoRevert)
    }
}
