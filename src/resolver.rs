//! The callee resolver (spec.md §4.B): turns a [`CallSite`] into a concrete [`FunctionId`],
//! applying virtual/super/static dispatch rules driven by the most-derived contract under
//! analysis.

use crate::diagnostics::InvariantViolation;
use crate::model::{Cfg, CallSite, ContractId, FunctionId, RequiredLookup};

/// Resolve `call`'s callee with respect to `context`, the most-derived contract currently being
/// analyzed (`None` for a free function).
///
/// Returns `Ok(None)` only for a `Static` call site with no underlying declaration (a bare
/// function-type value); every other callee resolves to a concrete [`FunctionId`] or this
/// function returns `Err`.
pub fn resolve_callee(
    cfg: &dyn Cfg,
    call: &CallSite,
    context: Option<ContractId>,
) -> Result<Option<FunctionId>, InvariantViolation> {
    match call.lookup {
        RequiredLookup::Static => Ok(call.callee),
        RequiredLookup::Virtual => {
            let context = context.ok_or(InvariantViolation::MissingContextContract)?;
            let unresolved = call.callee.ok_or(InvariantViolation::MissingCallee)?;
            let unresolved = cfg.function(unresolved);
            Ok(Some(unresolved.resolve_virtual(context, None)))
        }
        RequiredLookup::Super => {
            let context = context.ok_or(InvariantViolation::MissingContextContract)?;
            let unresolved = call.callee.ok_or(InvariantViolation::MissingCallee)?;
            let unresolved = cfg.function(unresolved);
            let declaring = unresolved
                .owning_contract()
                .ok_or(InvariantViolation::SuperCallOutsideContract)?;
            let super_contract = cfg.contract(declaring).super_contract(context);
            Ok(Some(unresolved.resolve_virtual(context, Some(super_contract))))
        }
    }
}
