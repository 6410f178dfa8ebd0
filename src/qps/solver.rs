use super::*;
use crate::algebra::*;
use crate::error::{QpError, QpResult};
use crate::ksp::{ConvergedReason, Ksp, KspType, Tolerances};
use crate::qp::QP;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Lifecycle state of a [`QpSolver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QpSolverState {
    #[default]
    Created,
    SetUp,
    Solved,
}

/// Solver for a [`QP`] driven by a [`QpSolverBackend`].
///
/// __Example usage__ :
///
/// ```no_run
/// use qpframe::algebra::*;
/// use qpframe::qp::QP;
/// use qpframe::qps::*;
///
/// let A = CscMatrix::from(&[
///     [4., 1.], //
///     [1., 3.], //
/// ]);
/// let qp = QP::new(A, vec![1., 2.]).unwrap();
///
/// let mut solver = QpSolver::new_ksp(QpSolverSettings::default());
/// assert!(solver.is_qp_compatible(&qp));
/// solver.set_qp(qp);
/// let reason = solver.solve().unwrap();
/// assert!(reason.is_converged());
/// ```
pub struct QpSolver<T: FloatT> {
    qp: Option<QP<T>>,
    backend: Box<dyn QpSolverBackend<T>>,
    settings: QpSolverSettings<T>,
    monitor: Arc<Mutex<ConvergenceMonitor<T>>>,
    convergence_test: QpConvergenceTest<T>,
    state: QpSolverState,
}

impl<T> std::fmt::Debug for QpSolver<T>
where
    T: FloatT,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QpSolver")
            .field("backend", &self.backend.name())
            .field("settings", &self.settings)
            .field("monitor", &self.monitor())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<T> QpSolver<T>
where
    T: FloatT,
{
    /// Solver backed by a [`KspAdapter`]
    pub fn new_ksp(settings: QpSolverSettings<T>) -> Self {
        let backend = KspAdapter::new(&settings.options_prefix);
        Self::with_backend(Box::new(backend), settings)
    }

    pub fn with_backend(backend: Box<dyn QpSolverBackend<T>>, settings: QpSolverSettings<T>) -> Self {
        Self {
            qp: None,
            backend,
            settings,
            monitor: Arc::new(Mutex::new(ConvergenceMonitor::default())),
            convergence_test: Arc::new(default_convergence_test::<T>),
            state: QpSolverState::Created,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn state(&self) -> QpSolverState {
        self.state
    }

    // ---------------------------------------------------------
    // problem
    // ---------------------------------------------------------

    /// Attach a problem, replacing any previous one
    pub fn set_qp(&mut self, qp: QP<T>) {
        self.qp = Some(qp);
        self.state = QpSolverState::Created;
    }

    pub fn qp(&self) -> Option<&QP<T>> {
        self.qp.as_ref()
    }

    /// Mutable access to the attached problem.  Changes take effect on
    /// the next [`solve`](QpSolver::solve).
    pub fn qp_mut(&mut self) -> Option<&mut QP<T>> {
        self.qp.as_mut()
    }

    pub fn take_qp(&mut self) -> Option<QP<T>> {
        self.state = QpSolverState::Created;
        self.qp.take()
    }

    /// `true` if this solver's backend is able to solve `qp`
    pub fn is_qp_compatible(&self, qp: &QP<T>) -> bool {
        self.backend.is_qp_compatible(qp)
    }

    // ---------------------------------------------------------
    // configuration
    // ---------------------------------------------------------

    pub fn settings(&self) -> &QpSolverSettings<T> {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: QpSolverSettings<T>) -> QpResult<()> {
        settings.validate()?;
        if settings.options_prefix != self.settings.options_prefix {
            self.backend.options_prefix_changed(&settings.options_prefix);
        }
        self.settings = settings;
        Ok(())
    }

    pub fn tolerances(&self) -> Tolerances<T> {
        self.settings.tolerances()
    }

    pub fn set_tolerances(&mut self, tolerances: Tolerances<T>) -> QpResult<()> {
        let settings = QpSolverSettings {
            rtol: tolerances.rtol,
            atol: tolerances.atol,
            divtol: tolerances.divtol,
            max_it: tolerances.max_it,
            ..self.settings.clone()
        };
        self.set_settings(settings)
    }

    pub fn options_prefix(&self) -> &str {
        &self.settings.options_prefix
    }

    pub fn set_options_prefix(&mut self, prefix: &str) {
        self.settings.options_prefix = prefix.to_string();
        self.backend.options_prefix_changed(prefix);
    }

    /// Replace the convergence test.  The test is called once per
    /// iteration of the backend with the current monitor state.
    pub fn set_convergence_test(&mut self, test: QpConvergenceTest<T>) {
        self.convergence_test = test;
    }

    pub fn reset_convergence_test(&mut self) {
        self.convergence_test = Arc::new(default_convergence_test::<T>);
    }

    /// Apply tolerance overrides and hand the remaining options to the
    /// backend.  Backend options are applied during the next set up.
    pub fn set_from_options(&mut self, options: &QpSolverOptions) -> QpResult<()> {
        let settings = options.apply(&self.settings)?;
        self.backend.set_from_options(options)?;
        self.settings = settings;
        self.require_set_up();
        Ok(())
    }

    // ---------------------------------------------------------
    // set up and solve
    // ---------------------------------------------------------

    pub fn set_up(&mut self) -> QpResult<()> {
        let (backend, ctx) = self.split()?;
        backend.set_up(ctx)?;
        self.state = QpSolverState::SetUp;
        tracing::debug!(
            backend = self.backend.name(),
            prefix = %self.settings.options_prefix,
            "QP solver set up"
        );
        Ok(())
    }

    /// Solve the attached problem, leaving the solution in the problem's
    /// iterate.
    ///
    /// Stopping because of divergence or the iteration limit is reported
    /// through the returned reason.  Numerical failures of the linear
    /// solver are returned as [`QpError::LinearSolveFailure`].
    pub fn solve(&mut self) -> QpResult<ConvergedReason> {
        if self.state == QpSolverState::Created {
            self.set_up()?;
        }

        let bnorm = match &self.qp {
            Some(qp) => qp.rhs().norm(),
            None => return Err(QpError::invalid("QP must be set before solve")),
        };
        self.lock_monitor().reset(bnorm);

        let (backend, ctx) = self.split()?;
        backend.solve(ctx)?;
        self.state = QpSolverState::Solved;

        let m = self.monitor();
        if m.reason.is_converged() {
            tracing::info!(
                iterations = m.iteration,
                rnorm = %m.rnorm,
                reason = %m.reason,
                "QP solve converged"
            );
        } else {
            tracing::warn!(
                iterations = m.iteration,
                rnorm = %m.rnorm,
                reason = %m.reason,
                "QP solve did not converge"
            );
        }

        if m.reason.is_numerical_failure() {
            Err(QpError::LinearSolveFailure { reason: m.reason })
        } else {
            Ok(m.reason)
        }
    }

    // the backend and the context it runs in, borrowed together
    // the next solve runs set up again
    fn require_set_up(&mut self) {
        self.state = QpSolverState::Created;
    }

    fn split(&mut self) -> QpResult<(&mut Box<dyn QpSolverBackend<T>>, QpSolverContext<'_, T>)> {
        let qp = self
            .qp
            .as_mut()
            .ok_or_else(|| QpError::invalid("QP must be set before set up"))?;
        let ctx = QpSolverContext {
            qp,
            tolerances: self.settings.tolerances(),
            monitor: Arc::clone(&self.monitor),
            convergence_test: Arc::clone(&self.convergence_test),
        };
        Ok((&mut self.backend, ctx))
    }

    fn lock_monitor(&self) -> std::sync::MutexGuard<'_, ConvergenceMonitor<T>> {
        self.monitor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---------------------------------------------------------
    // results
    // ---------------------------------------------------------

    /// Snapshot of the convergence bookkeeping
    pub fn monitor(&self) -> ConvergenceMonitor<T> {
        *self.lock_monitor()
    }

    pub fn iteration_number(&self) -> usize {
        self.lock_monitor().iteration
    }

    pub fn residual_norm(&self) -> T {
        self.lock_monitor().rnorm
    }

    pub fn converged_reason(&self) -> ConvergedReason {
        self.lock_monitor().reason
    }

    pub fn view(&self, out: &mut dyn Write) -> QpResult<()> {
        let prefix = if self.settings.options_prefix.is_empty() {
            String::new()
        } else {
            format!("({}) ", self.settings.options_prefix)
        };
        writeln!(out, "QPS Object: {}", prefix)?;
        writeln!(out, "  type: {}", self.backend.name())?;
        writeln!(
            out,
            "  tolerances: relative={:e}, absolute={:e}, divergence={:e}",
            self.settings.rtol, self.settings.atol, self.settings.divtol
        )?;
        writeln!(out, "  maximum iterations={}", self.settings.max_it)?;
        self.backend.view(out)
    }

    pub fn view_convergence(&self, out: &mut dyn Write) -> QpResult<()> {
        self.backend.view_convergence(out)
    }

    // ---------------------------------------------------------
    // KSP specific
    // ---------------------------------------------------------

    fn ksp_adapter(&self, routine: &'static str) -> QpResult<&KspAdapter<T>> {
        self.backend
            .as_any()
            .downcast_ref::<KspAdapter<T>>()
            .ok_or(QpError::UnsupportedOperation {
                routine,
                expected: "ksp",
            })
    }

    fn ksp_adapter_mut(&mut self, routine: &'static str) -> QpResult<&mut KspAdapter<T>> {
        self.backend
            .as_any_mut()
            .downcast_mut::<KspAdapter<T>>()
            .ok_or(QpError::UnsupportedOperation {
                routine,
                expected: "ksp",
            })
    }

    /// Replace the linear solver of a KSP backed solver
    pub fn ksp_set_linear_solver(&mut self, ksp: Ksp<T>) -> QpResult<()> {
        let prefix = self.settings.options_prefix.clone();
        self.ksp_adapter_mut("ksp_set_linear_solver")?
            .set_ksp(ksp, &prefix);
        self.require_set_up();
        Ok(())
    }

    pub fn ksp_linear_solver(&self) -> QpResult<&Ksp<T>> {
        Ok(self.ksp_adapter("ksp_linear_solver")?.ksp())
    }

    pub fn ksp_linear_solver_mut(&mut self) -> QpResult<&mut Ksp<T>> {
        Ok(self.ksp_adapter_mut("ksp_linear_solver_mut")?.ksp_mut())
    }

    pub fn ksp_set_type(&mut self, ksp_type: KspType) -> QpResult<()> {
        self.ksp_adapter_mut("ksp_set_type")?
            .ksp_mut()
            .set_type(ksp_type);
        Ok(())
    }

    pub fn ksp_type(&self) -> QpResult<KspType> {
        Ok(self.ksp_adapter("ksp_type")?.ksp().ksp_type())
    }
}
