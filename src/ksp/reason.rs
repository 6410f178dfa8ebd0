use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reason an iterative solve stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConvergedReason {
    /// solve still in progress (or not yet started)
    #[default]
    Iterating,
    /// residual norm fell below `rtol` times the reference norm
    ConvergedRtol,
    /// residual norm fell below `atol`
    ConvergedAtol,
    /// iteration limit reached
    DivergedIts,
    /// residual norm grew past `divtol` times the reference norm
    DivergedDtol,
    /// the method broke down (e.g. a zero curvature direction)
    DivergedBreakdown,
    /// a negative curvature direction was detected
    DivergedIndefiniteMat,
    /// a NaN or infinite value was computed
    DivergedNanOrInf,
}

impl ConvergedReason {
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            ConvergedReason::ConvergedRtol | ConvergedReason::ConvergedAtol
        )
    }

    pub fn is_diverged(&self) -> bool {
        !self.is_converged() && *self != ConvergedReason::Iterating
    }

    /// `true` for failures caused by the numerics of the method or
    /// the operator, as opposed to tolerance based divergence.
    pub fn is_numerical_failure(&self) -> bool {
        matches!(
            self,
            ConvergedReason::DivergedBreakdown
                | ConvergedReason::DivergedIndefiniteMat
                | ConvergedReason::DivergedNanOrInf
        )
    }
}

impl fmt::Display for ConvergedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConvergedReason::Iterating => "CONVERGED_ITERATING",
            ConvergedReason::ConvergedRtol => "CONVERGED_RTOL",
            ConvergedReason::ConvergedAtol => "CONVERGED_ATOL",
            ConvergedReason::DivergedIts => "DIVERGED_ITS",
            ConvergedReason::DivergedDtol => "DIVERGED_DTOL",
            ConvergedReason::DivergedBreakdown => "DIVERGED_BREAKDOWN",
            ConvergedReason::DivergedIndefiniteMat => "DIVERGED_INDEFINITE_MAT",
            ConvergedReason::DivergedNanOrInf => "DIVERGED_NANORINF",
        };
        write!(f, "{}", s)
    }
}

#[test]
fn test_converged_reason_classes() {
    use ConvergedReason::*;
    assert!(ConvergedRtol.is_converged());
    assert!(!Iterating.is_converged());
    assert!(!Iterating.is_diverged());
    assert!(DivergedIts.is_diverged());
    assert!(!DivergedIts.is_numerical_failure());
    assert!(DivergedBreakdown.is_numerical_failure());
    assert_eq!(DivergedNanOrInf.to_string(), "DIVERGED_NANORINF");
}
