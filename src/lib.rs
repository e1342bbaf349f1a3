//! Control-flow analysis for a smart-contract compiler front-end.
//!
//! This crate detects two classes of defect in an already-typechecked function body, given an
//! externally-constructed control-flow graph:
//!
//! - **Uninitialized variable access** ([`uninit`]): reading or returning a storage/calldata
//!   reference variable, or an unnamed return variable, before it has been assigned on every
//!   reaching path.
//! - **Unreachable code** ([`unreachable`]): statements no execution path can reach.
//!
//! AST construction, name resolution, type checking, and the CFG itself are all external
//! collaborators; this crate only consumes the traits in [`model`] and produces the
//! [`diagnostics::Diagnostic`] values in return. [`driver::Driver`] ties the pieces together for
//! a whole compilation unit.

#![deny(warnings)]

pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod model;
pub mod resolver;
pub mod revert;
pub mod uninit;
pub mod unreachable;

#[cfg(test)]
mod testing;

pub use config::AnalysisConfig;
pub use diagnostics::{AccessVerb, Diagnostic, InvariantViolation};
pub use driver::{AnalysisRoot, Driver};
pub use model::{
    CallSite, Cfg, CfgNode, Contract, ContractId, DataLocation, Function, FunctionFlow, FunctionId,
    NodeId, OccurrenceId, OccurrenceKind, RequiredLookup, SourceSpan, VarId, VariableDeclaration,
    VariableOccurrence,
};
pub use resolver::resolve_callee;
pub use revert::RevertAnalyzer;
