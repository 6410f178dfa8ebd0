use crate::algebra::*;
use crate::ksp::{ConvergedReason, Tolerances};
use std::sync::Arc;

/// Convergence bookkeeping of a QP solver.
///
/// Updated once per iteration by the solver backend and read by the
/// convergence test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceMonitor<T> {
    pub iteration: usize,
    pub rnorm: T,
    /// norm of the right hand side, used as the reference norm
    pub bnorm: T,
    pub reason: ConvergedReason,
}

impl<T> Default for ConvergenceMonitor<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self {
            iteration: 0,
            rnorm: T::zero(),
            bnorm: T::zero(),
            reason: ConvergedReason::Iterating,
        }
    }
}

impl<T> ConvergenceMonitor<T>
where
    T: FloatT,
{
    pub(crate) fn reset(&mut self, bnorm: T) {
        *self = Self {
            bnorm,
            ..Self::default()
        };
    }
}

/// Convergence test of a QP solver
pub type QpConvergenceTest<T> =
    Arc<dyn Fn(&ConvergenceMonitor<T>, &Tolerances<T>) -> ConvergedReason + Send + Sync>;

/// Default convergence test.
///
/// Converged when `rnorm ≤ max(rtol*‖b‖, atol)`, diverged when
/// `rnorm ≥ divtol*‖b‖` or the iteration limit is reached.  A zero
/// right hand side is measured against a reference norm of one.
pub fn default_convergence_test<T: FloatT>(
    monitor: &ConvergenceMonitor<T>,
    tolerances: &Tolerances<T>,
) -> ConvergedReason {
    let reference = if monitor.bnorm > T::zero() {
        monitor.bnorm
    } else {
        T::one()
    };
    tolerances.check(monitor.iteration, monitor.rnorm, reference)
}

#[test]
fn test_default_convergence_test() {
    let tol = Tolerances::<f64>::default();
    let mut m = ConvergenceMonitor::default();
    m.reset(100.);
    m.rnorm = 1e-4;
    assert_eq!(default_convergence_test(&m, &tol), ConvergedReason::ConvergedRtol);

    m.rnorm = 1e7;
    assert_eq!(default_convergence_test(&m, &tol), ConvergedReason::DivergedDtol);

    // zero rhs
    m.reset(0.);
    m.rnorm = 1e-6;
    assert_eq!(default_convergence_test(&m, &tol), ConvergedReason::ConvergedRtol);

    m.rnorm = 1.;
    m.iteration = tol.max_it;
    assert_eq!(default_convergence_test(&m, &tol), ConvergedReason::DivergedIts);
}
