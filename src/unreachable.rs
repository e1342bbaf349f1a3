//! The unreachable-code analyzer (spec.md §4.E): bidirectional reachability over the CFG, with no
//! dependency on the revert predicate or variable occurrences at all.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashSet;

use crate::diagnostics::Diagnostic;
use crate::model::{Cfg, FunctionFlow, NodeId, SourceSpan};

fn bfs(starts: &[NodeId], neighbors: impl Fn(NodeId) -> Vec<NodeId>) -> FxHashSet<NodeId> {
    let mut visited: FxHashSet<NodeId> = starts.iter().copied().collect();
    let mut queue: VecDeque<NodeId> = starts.iter().copied().collect();
    while let Some(node) = queue.pop_front() {
        for next in neighbors(node) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited
}

/// Append any unreachable-code diagnostics for `flow` to `out`.
///
/// `previous_unreachable` is the pass-wide de-duplication set of already-reported spans
/// (spec.md §9); it is not reset per function.
pub fn check_unreachable(
    cfg: &dyn Cfg,
    flow: FunctionFlow,
    previous_unreachable: &mut BTreeSet<SourceSpan>,
    out: &mut Vec<Diagnostic>,
) {
    let reachable = bfs(&[flow.entry], |id| cfg.node(id).exits().to_vec());

    let backward_roots = [flow.exit, flow.revert, flow.transaction_return];
    let mut unreachable_spans: BTreeSet<SourceSpan> = BTreeSet::new();
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    for &root in &backward_roots {
        if visited.insert(root) {
            queue.push_back(root);
        }
    }
    while let Some(node_id) = queue.pop_front() {
        if !reachable.contains(&node_id) {
            if let Some(location) = cfg.node(node_id).location() {
                unreachable_spans.insert(location);
            }
        }
        for &entry in cfg.node(node_id).entries() {
            if visited.insert(entry) {
                queue.push_back(entry);
            }
        }
    }

    let mut spans = unreachable_spans.into_iter();
    let Some(mut current) = spans.next() else { return };
    for span in spans {
        if current.touches(&span) {
            current.extend(&span);
        } else {
            emit_unreachable(current, previous_unreachable, out);
            current = span;
        }
    }
    emit_unreachable(current, previous_unreachable, out);
}

fn emit_unreachable(span: SourceSpan, previous: &mut BTreeSet<SourceSpan>, out: &mut Vec<Diagnostic>) {
    if previous.insert(span) {
        out.push(Diagnostic::UnreachableCode { span: span.into() });
    }
}
