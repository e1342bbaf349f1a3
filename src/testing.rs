//! A hand-built [`Cfg`] fixture for exercising the analyses without a real front-end attached.
//!
//! CFG/AST construction is an external collaborator (spec.md §1); this module plays that role
//! for tests only, the way `hir-analysis/src/analyses/spills/tests.rs` hand-assembles small HIR
//! snippets to drive its dataflow passes.

#![cfg(test)]

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::model::{
    CallSite, Cfg, CfgNode, Contract, ContractId, DataLocation, Function, FunctionFlow, FunctionId,
    NodeId, OccurrenceId, OccurrenceKind, SourceSpan, VarId, VariableDeclaration, VariableOccurrence,
};

/// Most basic-block-like nodes have one or two successors/predecessors (fallthrough plus at
/// most one branch); `SmallVec` keeps that common case off the heap, the same tradeoff
/// `hir`'s dominance builder makes for block child lists.
type NodeList = SmallVec<[NodeId; 2]>;

#[derive(Default)]
struct FixtureNode {
    location: Option<SourceSpan>,
    exits: NodeList,
    entries: NodeList,
    occurrences: Vec<VariableOccurrence>,
    calls: Vec<CallSite>,
}

impl CfgNode for FixtureNode {
    fn location(&self) -> Option<SourceSpan> {
        self.location
    }
    fn exits(&self) -> &[NodeId] {
        &self.exits
    }
    fn entries(&self) -> &[NodeId] {
        &self.entries
    }
    fn occurrences(&self) -> &[VariableOccurrence] {
        &self.occurrences
    }
    fn calls(&self) -> &[CallSite] {
        &self.calls
    }
}

struct FixtureFunction {
    id: FunctionId,
    name: String,
    implemented: bool,
    free: bool,
    empty_body: bool,
    owning_contract: Option<ContractId>,
    base_functions: Vec<FunctionId>,
    /// Maps a dispatch start point (the most-derived contract, or the super contract the search
    /// started from) to the function it resolves to. Absent entries resolve to `self`.
    overrides: FxHashMap<ContractId, FunctionId>,
}

impl Function for FixtureFunction {
    fn id(&self) -> FunctionId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_implemented(&self) -> bool {
        self.implemented
    }
    fn is_free(&self) -> bool {
        self.free
    }
    fn has_empty_body(&self) -> bool {
        self.empty_body
    }
    fn owning_contract(&self) -> Option<ContractId> {
        self.owning_contract
    }
    fn base_functions(&self) -> &[FunctionId] {
        &self.base_functions
    }
    fn resolve_virtual(&self, most_derived: ContractId, via_super: Option<ContractId>) -> FunctionId {
        let start = via_super.unwrap_or(most_derived);
        self.overrides.get(&start).copied().unwrap_or(self.id)
    }
}

struct FixtureContract {
    id: ContractId,
    name: String,
    linearized_base_contracts: Vec<ContractId>,
    defined_functions: Vec<FunctionId>,
    super_contract: Option<ContractId>,
}

impl Contract for FixtureContract {
    fn id(&self) -> ContractId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn linearized_base_contracts(&self) -> &[ContractId] {
        &self.linearized_base_contracts
    }
    fn defined_functions(&self) -> &[FunctionId] {
        &self.defined_functions
    }
    fn super_contract(&self, _most_derived: ContractId) -> ContractId {
        self.super_contract.expect("fixture contract has no super contract configured")
    }
}

/// An in-memory [`Cfg`] implementation assembled node by node, function by function.
#[derive(Default)]
pub struct FixtureCfg {
    nodes: Vec<FixtureNode>,
    functions: Vec<FixtureFunction>,
    contracts: Vec<FixtureContract>,
    variables: Vec<VariableDeclaration>,
    flows: FxHashMap<FunctionId, FunctionFlow>,
    next_occurrence: u32,
}

impl FixtureCfg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self) -> NodeId {
        self.nodes.push(FixtureNode::default());
        NodeId((self.nodes.len() - 1) as u32)
    }

    pub fn set_node_location(&mut self, node: NodeId, span: SourceSpan) {
        self.nodes[node.0 as usize].location = Some(span);
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from.0 as usize].exits.push(to);
        self.nodes[to.0 as usize].entries.push(from);
    }

    pub fn add_call(&mut self, node: NodeId, call: CallSite) {
        self.nodes[node.0 as usize].calls.push(call);
    }

    pub fn declare_variable(&mut self, name: &str, data_location: DataLocation, location: SourceSpan) -> VarId {
        let id = VarId(self.variables.len() as u32);
        self.variables.push(VariableDeclaration { id, name: name.to_string(), location, data_location });
        id
    }

    pub fn push_occurrence(&mut self, node: NodeId, var: VarId, kind: OccurrenceKind, site: Option<SourceSpan>) {
        let id = OccurrenceId(self.next_occurrence);
        self.next_occurrence += 1;
        let declaration = self.variables[var.0 as usize].clone();
        self.nodes[node.0 as usize]
            .occurrences
            .push(VariableOccurrence { id, declaration, kind, site });
    }

    pub fn declare_free_function(&mut self, name: &str) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(FixtureFunction {
            id,
            name: name.to_string(),
            implemented: true,
            free: true,
            empty_body: false,
            owning_contract: None,
            base_functions: Vec::new(),
            overrides: FxHashMap::default(),
        });
        id
    }

    pub fn declare_member_function(&mut self, name: &str, owning_contract: ContractId) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(FixtureFunction {
            id,
            name: name.to_string(),
            implemented: true,
            free: false,
            empty_body: false,
            owning_contract: Some(owning_contract),
            base_functions: Vec::new(),
            overrides: FxHashMap::default(),
        });
        id
    }

    pub fn declare_contract(&mut self, name: &str) -> ContractId {
        let id = ContractId(self.contracts.len() as u32);
        self.contracts.push(FixtureContract {
            id,
            name: name.to_string(),
            linearized_base_contracts: vec![id],
            defined_functions: Vec::new(),
            super_contract: None,
        });
        id
    }

    pub fn set_linearization(&mut self, contract: ContractId, bases: Vec<ContractId>) {
        self.contracts[contract.0 as usize].linearized_base_contracts = bases;
    }

    pub fn set_defined_functions(&mut self, contract: ContractId, functions: Vec<FunctionId>) {
        self.contracts[contract.0 as usize].defined_functions = functions;
    }

    pub fn set_super_contract(&mut self, contract: ContractId, super_contract: ContractId) {
        self.contracts[contract.0 as usize].super_contract = Some(super_contract);
    }

    pub fn set_empty_body(&mut self, function: FunctionId, empty: bool) {
        self.functions[function.0 as usize].empty_body = empty;
    }

    pub fn set_implemented(&mut self, function: FunctionId, implemented: bool) {
        self.functions[function.0 as usize].implemented = implemented;
    }

    pub fn set_base_functions(&mut self, function: FunctionId, bases: Vec<FunctionId>) {
        self.functions[function.0 as usize].base_functions = bases;
    }

    pub fn set_override(&mut self, function: FunctionId, dispatch_start: ContractId, resolves_to: FunctionId) {
        self.functions[function.0 as usize].overrides.insert(dispatch_start, resolves_to);
    }

    pub fn set_flow(&mut self, function: FunctionId, entry: NodeId, exit: NodeId, revert: NodeId, transaction_return: NodeId) {
        self.flows.insert(function, FunctionFlow { entry, exit, revert, transaction_return });
    }
}

impl Cfg for FixtureCfg {
    fn function_flow(&self, function: FunctionId, _context: Option<ContractId>) -> FunctionFlow {
        *self.flows.get(&function).expect("fixture function has no flow set")
    }
    fn node(&self, id: NodeId) -> &dyn CfgNode {
        &self.nodes[id.0 as usize]
    }
    fn function(&self, id: FunctionId) -> &dyn Function {
        &self.functions[id.0 as usize]
    }
    fn contract(&self, id: ContractId) -> &dyn Contract {
        &self.contracts[id.0 as usize]
    }
}
