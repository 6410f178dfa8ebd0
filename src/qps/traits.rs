use super::*;
use crate::algebra::FloatT;
use crate::error::QpResult;
use crate::ksp::Tolerances;
use crate::qp::QP;
use std::any::Any;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// State shared with a backend for the duration of one set up or solve.
pub struct QpSolverContext<'a, T: FloatT> {
    /// the problem being solved
    pub qp: &'a mut QP<T>,
    pub tolerances: Tolerances<T>,
    /// the owning solver's convergence bookkeeping
    pub monitor: Arc<Mutex<ConvergenceMonitor<T>>>,
    /// the owning solver's convergence test
    pub convergence_test: QpConvergenceTest<T>,
}

/// An algorithm driving the solution of a [`QP`].
///
/// A [`QpSolver`] owns exactly one backend, chosen when the solver is
/// created.  Backend specific functionality is reached by downcasting
/// through [`as_any`](QpSolverBackend::as_any).
pub trait QpSolverBackend<T: FloatT>: Any {
    /// short type name, e.g. `"ksp"`
    fn name(&self) -> &'static str;

    /// `true` if this backend is able to solve `qp`
    fn is_qp_compatible(&self, qp: &QP<T>) -> bool;

    fn set_up(&mut self, ctx: QpSolverContext<'_, T>) -> QpResult<()>;

    /// Solve the problem, storing the result in the problem's iterate and
    /// the final iteration count, residual norm and reason in the monitor.
    fn solve(&mut self, ctx: QpSolverContext<'_, T>) -> QpResult<()>;

    /// Record caller supplied options.  They are applied during set up.
    fn set_from_options(&mut self, options: &QpSolverOptions) -> QpResult<()>;

    /// The owning solver's options prefix changed
    fn options_prefix_changed(&mut self, prefix: &str);

    fn view(&self, out: &mut dyn Write) -> QpResult<()>;
    fn view_convergence(&self, out: &mut dyn Write) -> QpResult<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
