use super::*;
use crate::algebra::FloatT;
use crate::error::QpResult;
use crate::ksp::{Ksp, KspOptions, KspType, NormType, PcType};
use crate::qp::QP;
use std::any::Any;
use std::io::Write;
use std::sync::{Arc, PoisonError};

/// suffix appended to the owning solver's prefix
pub const KSP_OPTIONS_SUFFIX: &str = "qps_";

/// QP solver backend for unconstrained problems.
///
/// Solves `A*x = b` for the problem's operator and right hand side with a
/// [`Ksp`].  The linear solver is configured from the problem and the
/// owning [`QpSolver`] before every set up and solve, so changes to the
/// operator, preconditioner or tolerances take effect on the next call.
#[derive(Debug)]
pub struct KspAdapter<T: FloatT> {
    ksp: Ksp<T>,
    // caller supplied options, applied during set up
    options: Option<KspOptions>,
}

impl<T> KspAdapter<T>
where
    T: FloatT,
{
    pub fn new(owner_prefix: &str) -> Self {
        let mut ksp = Ksp::new();
        ksp.set_type(KspType::CG);
        ksp.set_norm_type(NormType::Unpreconditioned);
        ksp.set_initial_guess_nonzero(true);
        ksp.set_pc_type(PcType::None);
        ksp.set_options_prefix(owner_prefix);
        ksp.append_options_prefix(KSP_OPTIONS_SUFFIX);
        Self { ksp, options: None }
    }

    pub fn ksp(&self) -> &Ksp<T> {
        &self.ksp
    }

    pub fn ksp_mut(&mut self) -> &mut Ksp<T> {
        &mut self.ksp
    }

    /// Replace the linear solver.  The new solver's options prefix is
    /// derived from `owner_prefix`.
    pub fn set_ksp(&mut self, mut ksp: Ksp<T>, owner_prefix: &str) {
        ksp.set_options_prefix(owner_prefix);
        ksp.append_options_prefix(KSP_OPTIONS_SUFFIX);
        self.ksp = ksp;
    }

    pub fn has_options(&self) -> bool {
        self.options.is_some()
    }

    fn synchronize(&mut self, ctx: &QpSolverContext<'_, T>) {
        let qp = &*ctx.qp;
        if self.ksp.pc_type() != qp.pc() {
            self.ksp.set_pc_type(qp.pc());
        }
        self.ksp.set_operators(Arc::clone(qp.operator()));

        let monitor = Arc::clone(&ctx.monitor);
        let test = Arc::clone(&ctx.convergence_test);
        let tolerances = ctx.tolerances;
        self.ksp.set_convergence_test(Box::new(move |iteration: usize, rnorm: T| {
            let mut m = monitor.lock().unwrap_or_else(PoisonError::into_inner);
            m.iteration = iteration;
            m.rnorm = rnorm;
            m.reason = test(&*m, &tolerances);
            m.reason
        }));
        self.ksp.set_tolerances(ctx.tolerances);

        tracing::debug!(
            prefix = %self.ksp.options_prefix(),
            pc_type = %qp.pc(),
            n = qp.dim(),
            "linear solver synchronized"
        );
    }
}

impl<T> QpSolverBackend<T> for KspAdapter<T>
where
    T: FloatT,
{
    fn name(&self) -> &'static str {
        "ksp"
    }

    fn is_qp_compatible(&self, qp: &QP<T>) -> bool {
        qp.is_unconstrained()
    }

    fn set_up(&mut self, mut ctx: QpSolverContext<'_, T>) -> QpResult<()> {
        self.synchronize(&ctx);
        if let Some(options) = &self.options {
            self.ksp.set_from_options(options)?;
            // the problem owns the preconditioner choice
            ctx.qp.set_pc(self.ksp.pc_type());
        }
        self.ksp.set_up()
    }

    fn solve(&mut self, mut ctx: QpSolverContext<'_, T>) -> QpResult<()> {
        self.synchronize(&ctx);
        let (b, x) = ctx.qp.rhs_and_solution_mut();
        let reason = self.ksp.solve(b, x)?;

        let mut m = ctx.monitor.lock().unwrap_or_else(PoisonError::into_inner);
        m.iteration = self.ksp.iteration_number();
        m.rnorm = self.ksp.residual_norm();
        m.reason = reason;
        Ok(())
    }

    fn set_from_options(&mut self, options: &QpSolverOptions) -> QpResult<()> {
        options.ksp.validate()?;
        if !options.ksp.is_empty() {
            self.options = Some(options.ksp.clone());
        }
        Ok(())
    }

    fn options_prefix_changed(&mut self, prefix: &str) {
        self.ksp.set_options_prefix(prefix);
        self.ksp.append_options_prefix(KSP_OPTIONS_SUFFIX);
    }

    fn view(&self, out: &mut dyn Write) -> QpResult<()> {
        self.ksp.view(out)
    }

    fn view_convergence(&self, out: &mut dyn Write) -> QpResult<()> {
        writeln!(out, "KSPType: {}", self.ksp.ksp_type())?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
