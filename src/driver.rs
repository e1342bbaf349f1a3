//! The pass driver (spec.md §4.F): walks free functions and contracts, in linearization order,
//! and runs the uninitialized-access and unreachable-code analyzers over each implemented
//! function exactly once.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use crate::config::AnalysisConfig;
use crate::diagnostics::{Diagnostic, InvariantViolation};
use crate::model::{Cfg, ContractId, FunctionId, SourceSpan, VarId};
use crate::revert::RevertAnalyzer;
use crate::uninit::check_uninitialized_access;
use crate::unreachable::check_unreachable;

/// A top-level declaration this pass should analyze, standing in for the AST-visitor entry
/// points (`visit(FunctionDefinition const&)` / `visit(ContractDefinition const&)`) of
/// `original_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisRoot {
    FreeFunction(FunctionId),
    Contract(ContractId),
}

/// Owns the pass-wide de-duplication state and collects the resulting diagnostics.
///
/// Dropping a `Driver` releases its two de-duplication sets (spec.md §5); nothing here needs
/// manual lifetime management.
pub struct Driver<'a> {
    cfg: &'a dyn Cfg,
    config: AnalysisConfig,
    previous_unreachable: BTreeSet<SourceSpan>,
    previous_variable_warnings: FxHashSet<VarId>,
    diagnostics: Vec<Diagnostic>,
    invariant_violations: Vec<InvariantViolation>,
}

impl<'a> Driver<'a> {
    pub fn new(cfg: &'a dyn Cfg, config: AnalysisConfig) -> Self {
        Self {
            cfg,
            config,
            previous_unreachable: BTreeSet::new(),
            previous_variable_warnings: FxHashSet::default(),
            diagnostics: Vec::new(),
            invariant_violations: Vec::new(),
        }
    }

    /// Run the pass over every root, in order. Returns `Ok(true)` iff the pass produced no
    /// 3464 errors (only warnings, or nothing at all), matching
    /// `Error::containsOnlyWarnings(m_errorReporter.errors())` in `original_source`.
    pub fn run(&mut self, roots: &[AnalysisRoot]) -> Result<bool, InvariantViolation> {
        for root in roots {
            match *root {
                AnalysisRoot::FreeFunction(function) => self.analyze_free_function(function)?,
                AnalysisRoot::Contract(contract) => self.analyze_contract(contract)?,
            }
        }
        Ok(self.succeeded())
    }

    pub fn analyze_free_function(&mut self, function: FunctionId) -> Result<(), InvariantViolation> {
        self.analyze_function(function, None)
    }

    /// Analyze every function reachable through `contract`'s linearization, skipping functions
    /// already visited via an override further down the chain (spec.md §4.F).
    pub fn analyze_contract(&mut self, contract: ContractId) -> Result<(), InvariantViolation> {
        let mut overridden: FxHashSet<FunctionId> = FxHashSet::default();
        let bases = self.cfg.contract(contract).linearized_base_contracts().to_vec();
        for base in bases {
            let function_ids = self.cfg.contract(base).defined_functions().to_vec();
            for function_id in function_ids {
                if overridden.contains(&function_id) {
                    continue;
                }
                let function = self.cfg.function(function_id);
                overridden.extend(function.base_functions().iter().copied());
                // Every function, regardless of which base in the linearization defines it, is
                // analyzed with `contract` (the single most-derived contract) as the dispatch
                // context (spec.md §4.F).
                self.analyze_function(function_id, Some(contract))?;
            }
        }
        Ok(())
    }

    fn analyze_function(&mut self, function: FunctionId, context: Option<ContractId>) -> Result<(), InvariantViolation> {
        let result = self.analyze_function_inner(function, context);
        match result {
            Ok(()) => Ok(()),
            Err(violation) if self.config.continue_after_invariant_violation => {
                log::debug!(target: "flowcheck::driver", "continuing past invariant violation: {violation}");
                self.invariant_violations.push(violation);
                Ok(())
            }
            Err(violation) => Err(violation),
        }
    }

    fn analyze_function_inner(&mut self, function: FunctionId, context: Option<ContractId>) -> Result<(), InvariantViolation> {
        let func = self.cfg.function(function);
        if !func.is_implemented() {
            return Ok(());
        }

        log::trace!(target: "flowcheck::driver", "analyzing {} (context = {:?})", func.name(), context);

        let flow = self.cfg.function_flow(function, context);
        let empty_body = func.has_empty_body();

        let mut revert_analyzer = RevertAnalyzer::new(self.cfg);
        check_uninitialized_access(
            self.cfg,
            flow,
            empty_body,
            func,
            context,
            &mut revert_analyzer,
            &mut self.previous_variable_warnings,
            &mut self.diagnostics,
        )?;
        check_unreachable(self.cfg, flow, &mut self.previous_unreachable, &mut self.diagnostics);

        Ok(())
    }

    /// `true` iff no 3464 errors were produced (warnings don't affect success, matching
    /// `Error::containsOnlyWarnings`).
    pub fn succeeded(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Invariant violations recorded instead of aborting, when
    /// [`AnalysisConfig::continue_after_invariant_violation`] is set.
    pub fn invariant_violations(&self) -> &[InvariantViolation] {
        &self.invariant_violations
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
