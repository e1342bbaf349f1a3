//! The diagnostics this pass produces, and the one internal error it can raise.
//!
//! User-facing diagnostics carry their own `miette::SourceSpan`s, converted at construction time
//! from the plain [`SourceSpan`](crate::model::SourceSpan) the analyses traffic in internally —
//! keeping the dataflow code free of a diagnostics-library dependency until the point where a
//! value actually leaves the pass.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::model::{DataLocation, SourceSpan};

impl From<SourceSpan> for miette::SourceSpan {
    fn from(span: SourceSpan) -> Self {
        (span.start as usize, (span.end - span.start) as usize).into()
    }
}

/// Whether an occurrence against an uninitialized pointer variable reads or returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessVerb {
    Accessed,
    Returned,
}

impl std::fmt::Display for AccessVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accessed => f.write_str("accessed"),
            Self::Returned => f.write_str("returned"),
        }
    }
}

/// A diagnostic produced by this pass, code-compatible with the source compiler's numbering.
#[derive(Debug, Clone, Error, MietteDiagnostic)]
pub enum Diagnostic {
    /// Code 3464: a storage or calldata reference variable was accessed or returned before it
    /// was ever assigned.
    #[error(
        "This variable is of {location} pointer type and can be {verb} without prior assignment, \
         which would lead to undefined behaviour."
    )]
    #[diagnostic(code(flowcheck::uninitialized_pointer_access), severity(Error))]
    UninitializedPointerAccess {
        location: DataLocation,
        verb: AccessVerb,
        #[label("access occurs here")]
        access: miette::SourceSpan,
        #[label("the variable was declared here")]
        declared: miette::SourceSpan,
    },

    /// Code 6321: an unnamed return variable can reach the end of a non-empty function body
    /// without having been assigned on every path.
    ///
    /// `prefix` is either `"U"`, or `"When called using contract \"X\" the u"` when the function
    /// is analyzed under a dispatch context other than its own declaring contract (spec.md §4.D).
    #[error(
        "{prefix}nnamed return variable can remain unassigned. Add an explicit return with value \
         to all non-reverting code paths or name the variable."
    )]
    #[diagnostic(code(flowcheck::unassigned_return_variable), severity(Warning))]
    UnassignedReturnVariable {
        prefix: String,
        #[label("this variable is never assigned on all non-reverting paths")]
        declared: miette::SourceSpan,
    },

    /// Code 5740: a contiguous run of statements that no execution path can reach.
    #[error("Unreachable code.")]
    #[diagnostic(code(flowcheck::unreachable_code), severity(Warning))]
    UnreachableCode {
        #[label("this code is unreachable")]
        span: miette::SourceSpan,
    },
}

impl Diagnostic {
    /// The source compiler's diagnostic code, for consumers that key off it directly.
    pub fn code(&self) -> u32 {
        match self {
            Self::UninitializedPointerAccess { .. } => 3464,
            Self::UnassignedReturnVariable { .. } => 6321,
            Self::UnreachableCode { .. } => 5740,
        }
    }

    /// Only 3464 is a hard error; 6321 and 5740 are warnings (spec.md §4.D, §4.E, §7).
    pub fn is_error(&self) -> bool {
        matches!(self, Self::UninitializedPointerAccess { .. })
    }
}

/// An internal invariant violation: something the CFG oracle guaranteed could not happen did.
/// Surfacing this as a typed error (rather than panicking) lets `Driver::run` abort the pass
/// cleanly and report which guarantee was broken.
#[derive(Debug, Clone, Error, MietteDiagnostic)]
pub enum InvariantViolation {
    /// A `Virtual` or `Super` call site was encountered while analyzing a free function, which
    /// has no most-derived contract to resolve against.
    #[error("virtual dispatch requires a most-derived contract, but none was provided")]
    #[diagnostic(code(flowcheck::internal::missing_context_contract))]
    MissingContextContract,

    /// A `Virtual` or `Super` call site carries no unresolved callee to resolve virtually
    /// against the dispatch context.
    #[error("virtual dispatch requires an unresolved callee, but the call site has none")]
    #[diagnostic(code(flowcheck::internal::missing_callee))]
    MissingCallee,

    /// A `Super` call site's unresolved callee has no owning contract to compute a super contract
    /// from.
    #[error("super dispatch requires the callee's declaring contract, but it has none")]
    #[diagnostic(code(flowcheck::internal::super_call_outside_contract))]
    SuperCallOutsideContract,
}
