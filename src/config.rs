//! Pass configuration, mirroring the small `DataFlowConfig` structs the teacher threads through
//! its own analyses rather than hard-coding behavior.

/// Options threaded through [`crate::driver::Driver`].
#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
    /// When `false` (the default), the driver stops at the first [`crate::diagnostics::InvariantViolation`]
    /// and returns it to the caller. When `true`, it records the violation and continues
    /// analyzing the remaining functions/contracts, so a single malformed call site doesn't
    /// suppress diagnostics for everything else in the same run.
    pub continue_after_invariant_violation: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { continue_after_invariant_violation: false }
    }
}
