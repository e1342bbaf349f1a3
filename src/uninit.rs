//! The uninitialized-variable-access analyzer (spec.md §4.D): a monotone forward dataflow over
//! "variables declared but not yet assigned", modulated by [`RevertAnalyzer::may_revert`] so that
//! a path that always reverts before reaching the exit node never contributes a diagnostic.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::diagnostics::{AccessVerb, Diagnostic, InvariantViolation};
use crate::model::{Cfg, ContractId, Function, FunctionFlow, NodeId, OccurrenceId, OccurrenceKind, VarId, VariableOccurrence};
use crate::resolver::resolve_callee;
use crate::revert::RevertAnalyzer;

/// A growable set of [`VariableOccurrence`]s, deduplicated by identity, that also reports
/// whether an insertion actually grew the set — used to detect dataflow fixpoint convergence.
#[derive(Debug, Clone, Default)]
struct AccessSet {
    seen: FxHashSet<OccurrenceId>,
    items: Vec<VariableOccurrence>,
}

impl AccessSet {
    fn insert(&mut self, occ: &VariableOccurrence) -> bool {
        if self.seen.insert(occ.id) {
            self.items.push(occ.clone());
            true
        } else {
            false
        }
    }

    fn extend_from(&mut self, other: &AccessSet) -> bool {
        let mut grew = false;
        for occ in &other.items {
            grew |= self.insert(occ);
        }
        grew
    }
}

#[derive(Debug, Clone, Default)]
struct NodeInfo {
    entry_unassigned: FxHashSet<VarId>,
    exit_unassigned: FxHashSet<VarId>,
    uninit_accesses: AccessSet,
}

impl NodeInfo {
    /// Merge `other`'s exit state into this node's entry state, as the original's
    /// `NodeInfo::propagateFrom` does. Returns whether anything actually grew, so the caller
    /// knows whether the destination node needs re-traversal.
    fn propagate_from(&mut self, other: &NodeInfo) -> bool {
        let before = self.entry_unassigned.len();
        self.entry_unassigned.extend(other.exit_unassigned.iter().copied());
        let grew_entry = self.entry_unassigned.len() > before;
        let grew_accesses = self.uninit_accesses.extend_from(&other.uninit_accesses);
        grew_entry || grew_accesses
    }
}

/// Run the analysis for one function and append any resulting diagnostics to `out`.
///
/// `previous_variable_warnings` is the pass-wide de-duplication set for the 6321 warning
/// (spec.md §9); it is *not* reset per function, matching `m_previousVariableWarnings`'s
/// whole-pass lifetime in the original.
#[allow(clippy::too_many_arguments)]
pub fn check_uninitialized_access(
    cfg: &dyn Cfg,
    flow: FunctionFlow,
    empty_body: bool,
    function: &dyn Function,
    context: Option<ContractId>,
    revert_analyzer: &mut RevertAnalyzer<'_>,
    previous_variable_warnings: &mut FxHashSet<VarId>,
    out: &mut Vec<Diagnostic>,
) -> Result<(), InvariantViolation> {
    let mut node_infos: FxHashMap<NodeId, NodeInfo> = FxHashMap::default();
    let mut worklist: VecDeque<NodeId> = VecDeque::from([flow.entry]);

    while let Some(node_id) = worklist.pop_front() {
        let node = cfg.node(node_id);

        let mut reverts = false;
        for call in node.calls() {
            if let Some(callee) = resolve_callee(cfg, call, context)? {
                if revert_analyzer.may_revert(context, callee)? {
                    reverts = true;
                    break;
                }
            }
        }

        let entry_unassigned = node_infos.entry(node_id).or_default().entry_unassigned.clone();
        let mut unassigned = entry_unassigned;
        let mut newly_accessed = Vec::new();
        for occ in node.occurrences() {
            match occ.kind {
                OccurrenceKind::Assignment => {
                    unassigned.remove(&occ.declaration.id);
                }
                OccurrenceKind::Access | OccurrenceKind::Return | OccurrenceKind::InlineAssembly => {
                    if unassigned.contains(&occ.declaration.id) {
                        newly_accessed.push(occ.clone());
                    }
                }
                OccurrenceKind::Declaration => {
                    unassigned.insert(occ.declaration.id);
                }
            }
        }

        let current = node_infos.get_mut(&node_id).unwrap();
        current.exit_unassigned = unassigned;
        for occ in &newly_accessed {
            current.uninit_accesses.insert(occ);
        }
        let finalized = current.clone();

        log::trace!(
            target: "flowcheck::uninit",
            "node {:?}: reverts={} entry_unassigned={} exit_unassigned={}",
            node_id,
            reverts,
            finalized.entry_unassigned.len(),
            finalized.exit_unassigned.len(),
        );

        if !reverts {
            for &succ in node.exits() {
                let existed = node_infos.contains_key(&succ);
                let succ_info = node_infos.entry(succ).or_default();
                let grew = succ_info.propagate_from(&finalized);
                if grew || !existed {
                    worklist.push_back(succ);
                }
            }
        }
    }

    let exit_info = node_infos.remove(&flow.exit).unwrap_or_default();
    let mut occurrences = exit_info.uninit_accesses.items;
    occurrences.sort();

    for occ in &occurrences {
        let declared_span = occ.declaration.location.into();
        let access_span = occ.effective_span().into();

        if occ.declaration.data_location.is_pointer() {
            out.push(Diagnostic::UninitializedPointerAccess {
                location: occ.declaration.data_location,
                verb: if occ.kind == OccurrenceKind::Return {
                    AccessVerb::Returned
                } else {
                    AccessVerb::Accessed
                },
                access: access_span,
                declared: declared_span,
            });
        } else if !empty_body && occ.declaration.name.is_empty() {
            if !previous_variable_warnings.insert(occ.declaration.id) {
                continue;
            }
            let prefix = match context {
                Some(ctx) if Some(ctx) != function.owning_contract() => {
                    format!("When called using contract \"{}\" the u", cfg.contract(ctx).name())
                }
                _ => "U".to_string(),
            };
            out.push(Diagnostic::UnassignedReturnVariable { prefix, declared: declared_span });
        }
    }

    Ok(())
}
