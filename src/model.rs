//! The external collaborator contracts this pass consumes.
//!
//! AST construction, name resolution, type checking, and CFG construction are all out of
//! scope for this crate (see the crate-level docs); the types here are the surface those
//! collaborators expose to the analyses in [`crate::uninit`], [`crate::unreachable`], and
//! [`crate::revert`]. Graph nodes, functions, and contracts are referred to by stable handles
//! ([`NodeId`], [`FunctionId`], [`ContractId`]), never owned or cloned by this crate, mirroring
//! how `hir-analysis` never owns the IR it walks but addresses it through handles furnished by
//! the surrounding compiler.

use std::fmt;

/// A stable handle to a [`CfgNode`], addressed by identity, never cloned or reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// A stable handle to a function declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

/// A stable handle to a contract declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractId(pub u32);

/// A stable handle to a variable declaration, standing in for the `VariableDeclaration const*`
/// identity comparisons the source implementation relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

/// A stable handle to a [`VariableOccurrence`], used to detect whether a propagated access set
/// actually grew without re-comparing the occurrence's full contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceId(pub u32);

/// A half-open byte range in some source file, `[start, end)`.
///
/// This is deliberately a plain, cheap-to-copy value distinct from `miette::SourceSpan` (used
/// only at the diagnostic-emission boundary, see [`crate::diagnostics`]): the analyses here sort
/// and merge spans as part of their algorithms (§4.E), which is easiest to reason about with a
/// plain pair of offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceSpan {
    pub start: u32,
    pub end: u32,
}

impl SourceSpan {
    pub const fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "a span's start must not be after its end");
        Self { start, end }
    }

    /// Whether `other` overlaps or immediately abuts `self`, i.e. whether they should be
    /// coalesced into a single diagnostic range by the unreachable-code merge step.
    #[inline]
    pub fn touches(&self, other: &Self) -> bool {
        other.start <= self.end
    }

    pub fn extend(&mut self, other: &Self) {
        self.end = self.end.max(other.end);
    }
}

/// Where a variable's data physically lives, per spec.md §3's `VariableDeclaration` type
/// descriptor. Only `Storage`/`CallData` are distinguished for diagnostic purposes; everything
/// else (memory, stack, value types) collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLocation {
    Storage,
    CallData,
    Other,
}

impl DataLocation {
    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Storage | Self::CallData)
    }
}

impl fmt::Display for DataLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage => f.write_str("storage"),
            Self::CallData => f.write_str("calldata"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// A declared local, return variable, or parameter.
#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub id: VarId,
    /// Empty for unnamed return variables.
    pub name: String,
    pub location: SourceSpan,
    pub data_location: DataLocation,
}

/// The kind of reference a [`VariableOccurrence`] makes to its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceKind {
    Declaration,
    Assignment,
    Access,
    Return,
    /// Every variable referenced inside an inline-assembly block is conservatively treated as
    /// accessed; no assembly-internal control flow is modeled (spec.md §4.D).
    InlineAssembly,
}

/// One reference to a [`VariableDeclaration`] at a specific point in a [`CfgNode`]'s occurrence
/// list.
///
/// Occurrences are totally ordered (see [`Ord`] below) so that diagnostic emission order is
/// deterministic regardless of the iteration order of the hash-based sets used internally by the
/// dataflow engine (spec.md §5, §9 "Occurrence ordering").
#[derive(Debug, Clone)]
pub struct VariableOccurrence {
    pub id: OccurrenceId,
    pub declaration: VariableDeclaration,
    pub kind: OccurrenceKind,
    /// The source span of this specific reference, if one exists independent of the
    /// declaration's own span (e.g. a read site, as opposed to the declaration itself).
    pub site: Option<SourceSpan>,
}

impl VariableOccurrence {
    /// The span used both for sorting and, absent a more specific [`Self::site`], for primary
    /// diagnostic placement.
    pub fn effective_span(&self) -> SourceSpan {
        self.site.unwrap_or(self.declaration.location)
    }
}

impl PartialEq for VariableOccurrence {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for VariableOccurrence {}

impl PartialOrd for VariableOccurrence {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VariableOccurrence {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.effective_span()
            .cmp(&other.effective_span())
            .then_with(|| self.declaration.id.cmp(&other.declaration.id))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// How a call site's callee expression must be resolved, per spec.md §4.B.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredLookup {
    /// Resolve virtually against the most-derived contract under analysis.
    Virtual,
    /// Resolve virtually against the super contract of the unresolved callee's declaring
    /// contract, with respect to the most-derived contract under analysis.
    Super,
    /// Use the directly-annotated callee; no virtual resolution.
    Static,
}

/// A single outgoing call from a [`CfgNode`].
#[derive(Debug, Clone, Copy)]
pub struct CallSite {
    pub lookup: RequiredLookup,
    /// The unresolved (for `Virtual`/`Super`) or concrete (for `Static`) callee.
    ///
    /// `None` only ever occurs with `Static` lookup, standing in for a bare function-type value
    /// with no underlying declaration (spec.md §7); such call sites are treated as non-reverting.
    pub callee: Option<FunctionId>,
}

/// A node in a function's control-flow graph.
///
/// Nodes are referentially identified: two [`NodeId`]s are equal iff they name the same node.
pub trait CfgNode {
    fn location(&self) -> Option<SourceSpan>;
    fn exits(&self) -> &[NodeId];
    fn entries(&self) -> &[NodeId];
    fn occurrences(&self) -> &[VariableOccurrence];
    fn calls(&self) -> &[CallSite];
}

/// The four distinguished terminal/entry nodes of a function's CFG (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionFlow {
    pub entry: NodeId,
    pub exit: NodeId,
    pub revert: NodeId,
    pub transaction_return: NodeId,
}

/// A function declaration, as exposed to this pass.
pub trait Function {
    fn id(&self) -> FunctionId;
    fn name(&self) -> &str;
    fn is_implemented(&self) -> bool;
    fn is_free(&self) -> bool;
    /// `true` iff the function's body contains no statements; gates the 6321 warning only
    /// (spec.md §4.D, §9).
    fn has_empty_body(&self) -> bool;
    /// The contract this function is a member of, or `None` if it is a free function.
    fn owning_contract(&self) -> Option<ContractId>;
    /// The set of functions this one overrides, used by the driver to avoid analyzing an
    /// overridden base function a second time (spec.md §4.F).
    fn base_functions(&self) -> &[FunctionId];
    /// Resolve a virtual call against `most_derived`, optionally starting the search at
    /// `via_super` instead of at `most_derived` itself. The oracle guarantees a unique target
    /// exists for any virtual call that type-checked (spec.md §6).
    fn resolve_virtual(&self, most_derived: ContractId, via_super: Option<ContractId>) -> FunctionId;
}

/// A contract declaration, as exposed to this pass.
pub trait Contract {
    fn id(&self) -> ContractId;
    fn name(&self) -> &str;
    /// Most-derived first, per spec.md §3.
    fn linearized_base_contracts(&self) -> &[ContractId];
    fn defined_functions(&self) -> &[FunctionId];
    /// The super contract of `self`, with respect to `most_derived`.
    fn super_contract(&self, most_derived: ContractId) -> ContractId;
}

/// The CFG oracle: the single source of truth for graph structure, call sites, and the
/// function/contract universe (spec.md §6).
///
/// `function_flow` is idempotent; implementations are free to cache internally.
pub trait Cfg {
    fn function_flow(&self, function: FunctionId, context: Option<ContractId>) -> FunctionFlow;
    fn node(&self, id: NodeId) -> &dyn CfgNode;
    fn function(&self, id: FunctionId) -> &dyn Function;
    fn contract(&self, id: ContractId) -> &dyn Contract;
}
