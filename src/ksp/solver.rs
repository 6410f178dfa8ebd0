#![allow(non_snake_case)]

use super::*;
use crate::error::{QpError, QpResult};
use std::io::Write;
use std::sync::Arc;

/// Convergence test called once per iteration with the iteration
/// index and the current residual norm.
pub type ConvergenceTest<T> = Box<dyn FnMut(usize, T) -> ConvergedReason + Send>;

/// Preconditioned Krylov linear solver for `A*x = b`.
///
/// __Example usage__ :
///
/// ```no_run
/// use qpframe::algebra::*;
/// use qpframe::ksp::*;
/// use std::sync::Arc;
///
/// let A = CscMatrix::from(&[
///     [4., -1.], //
///     [-1., 3.], //
/// ]);
/// let b = [1., 2.];
/// let mut x = [0.; 2];
///
/// let mut ksp = Ksp::new();
/// ksp.set_operators(Arc::new(A));
/// let reason = ksp.solve(&b, &mut x).unwrap();
/// assert!(reason.is_converged());
/// ```
pub struct Ksp<T: FloatT> {
    ksp_type: KspType,
    norm_type: NormType,
    initial_guess_nonzero: bool,
    richardson_scale: T,
    pc: Preconditioner<T>,
    operator: Option<Arc<CscMatrix<T>>>,
    tolerances: Tolerances<T>,
    convergence_test: Option<ConvergenceTest<T>>,
    options_prefix: String,
    is_set_up: bool,

    // results of the most recent solve
    iteration: usize,
    rnorm: T,
    reason: ConvergedReason,
}

impl<T> Default for Ksp<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Ksp<T>
where
    T: FloatT,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ksp")
            .field("ksp_type", &self.ksp_type)
            .field("norm_type", &self.norm_type)
            .field("pc_type", &self.pc.kind())
            .field("tolerances", &self.tolerances)
            .field("options_prefix", &self.options_prefix)
            .field("iteration", &self.iteration)
            .field("rnorm", &self.rnorm)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl<T> Ksp<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            ksp_type: KspType::default(),
            norm_type: NormType::default(),
            initial_guess_nonzero: false,
            richardson_scale: T::one(),
            pc: Preconditioner::new(PcType::default()),
            operator: None,
            tolerances: Tolerances::default(),
            convergence_test: None,
            options_prefix: String::new(),
            is_set_up: false,
            iteration: 0,
            rnorm: T::zero(),
            reason: ConvergedReason::Iterating,
        }
    }

    // ---------------------------------------------------------
    // configuration
    // ---------------------------------------------------------

    pub fn ksp_type(&self) -> KspType {
        self.ksp_type
    }

    pub fn set_type(&mut self, ksp_type: KspType) {
        self.ksp_type = ksp_type;
    }

    pub fn norm_type(&self) -> NormType {
        self.norm_type
    }

    pub fn set_norm_type(&mut self, norm_type: NormType) {
        self.norm_type = norm_type;
    }

    pub fn initial_guess_nonzero(&self) -> bool {
        self.initial_guess_nonzero
    }

    pub fn set_initial_guess_nonzero(&mut self, flag: bool) {
        self.initial_guess_nonzero = flag;
    }

    pub fn richardson_scale(&self) -> T {
        self.richardson_scale
    }

    pub fn set_richardson_scale(&mut self, scale: T) -> QpResult<()> {
        if !(scale > T::zero() && scale.is_finite()) {
            return Err(QpError::invalid(format!(
                "Richardson damping factor must be positive, got {}",
                scale
            )));
        }
        self.richardson_scale = scale;
        Ok(())
    }

    pub fn pc_type(&self) -> PcType {
        self.pc.kind()
    }

    /// Replace the preconditioner.  Takes effect at the next set up.
    pub fn set_pc_type(&mut self, kind: PcType) {
        if kind != self.pc.kind() {
            self.pc = Preconditioner::new(kind);
            self.is_set_up = false;
        }
    }

    pub fn operator(&self) -> Option<&Arc<CscMatrix<T>>> {
        self.operator.as_ref()
    }

    /// Attach the operator `A`.  Attaching a different matrix than the
    /// current one forces the preconditioner to be rebuilt.
    pub fn set_operators(&mut self, A: Arc<CscMatrix<T>>) {
        let same = self.operator.as_ref().is_some_and(|op| Arc::ptr_eq(op, &A));
        if !same {
            self.operator = Some(A);
            self.is_set_up = false;
        }
    }

    pub fn tolerances(&self) -> &Tolerances<T> {
        &self.tolerances
    }

    pub fn set_tolerances(&mut self, tolerances: Tolerances<T>) {
        self.tolerances = tolerances;
    }

    /// Install a custom convergence test in place of the default
    /// [`Tolerances::check`]
    pub fn set_convergence_test(&mut self, test: ConvergenceTest<T>) {
        self.convergence_test = Some(test);
    }

    pub fn clear_convergence_test(&mut self) {
        self.convergence_test = None;
    }

    pub fn has_convergence_test(&self) -> bool {
        self.convergence_test.is_some()
    }

    pub fn options_prefix(&self) -> &str {
        &self.options_prefix
    }

    pub fn set_options_prefix(&mut self, prefix: &str) {
        self.options_prefix = prefix.to_string();
    }

    pub fn append_options_prefix(&mut self, suffix: &str) {
        self.options_prefix.push_str(suffix);
    }

    /// Apply every override present in `options`
    pub fn set_from_options(&mut self, options: &KspOptions) -> QpResult<()> {
        options.validate()?;
        if let Some(ksp_type) = options.ksp_type {
            self.set_type(ksp_type);
        }
        if let Some(norm_type) = options.norm_type {
            self.set_norm_type(norm_type);
        }
        if let Some(pc_type) = options.pc_type {
            self.set_pc_type(pc_type);
        }
        if let Some(flag) = options.initial_guess_nonzero {
            self.set_initial_guess_nonzero(flag);
        }
        if let Some(scale) = options.richardson_scale {
            self.set_richardson_scale(scale.as_T())?;
        }
        tracing::debug!(prefix = %self.options_prefix, ?options, "linear solver options applied");
        Ok(())
    }

    // ---------------------------------------------------------
    // results
    // ---------------------------------------------------------

    pub fn iteration_number(&self) -> usize {
        self.iteration
    }

    pub fn residual_norm(&self) -> T {
        self.rnorm
    }

    pub fn converged_reason(&self) -> ConvergedReason {
        self.reason
    }

    pub fn is_set_up(&self) -> bool {
        self.is_set_up
    }

    // ---------------------------------------------------------
    // set up and solve
    // ---------------------------------------------------------

    /// Build the preconditioner for the current operator.  Does nothing
    /// if nothing changed since the last call.
    pub fn set_up(&mut self) -> QpResult<()> {
        if self.is_set_up {
            return Ok(());
        }
        let A = self
            .operator
            .as_ref()
            .ok_or_else(|| QpError::invalid("operator must be set before set up"))?;
        if !A.is_square() {
            return Err(QpError::incompatible(format!(
                "operator must be square, got {}x{}",
                A.nrows(),
                A.ncols()
            )));
        }
        self.pc.set_up(A);
        self.is_set_up = true;
        tracing::debug!(
            ksp_type = %self.ksp_type,
            pc_type = %self.pc.kind(),
            n = A.ncols(),
            "linear solver set up"
        );
        Ok(())
    }

    /// Solve `A*x = b`.  With a zero initial guess the incoming
    /// contents of `x` are ignored.
    ///
    /// Stopping because of divergence is not an error; inspect the
    /// returned reason.
    pub fn solve(&mut self, b: &[T], x: &mut [T]) -> QpResult<ConvergedReason> {
        self.set_up()?;
        let A = match &self.operator {
            Some(A) => Arc::clone(A),
            None => return Err(QpError::invalid("operator must be set before solve")),
        };
        if b.len() != A.nrows() || x.len() != A.ncols() {
            return Err(QpError::incompatible(format!(
                "operator is {}x{} but b has length {} and x has length {}",
                A.nrows(),
                A.ncols(),
                b.len(),
                x.len()
            )));
        }
        if !self.initial_guess_nonzero {
            x.set(T::zero());
        }

        self.reason = ConvergedReason::Iterating;
        let (iteration, rnorm, reason) = match self.ksp_type {
            KspType::CG => cg::solve(self, &A, b, x),
            KspType::Richardson => richardson::solve(self, &A, b, x),
        };
        self.iteration = iteration;
        self.rnorm = rnorm;
        self.reason = reason;

        tracing::debug!(
            ksp_type = %self.ksp_type,
            iterations = iteration,
            rnorm = %rnorm,
            reason = %reason,
            "linear solve finished"
        );
        Ok(reason)
    }

    // called by the iterative methods once per iteration
    pub(super) fn test_convergence(&mut self, iteration: usize, rnorm: T, rnorm0: T) -> ConvergedReason {
        let reason = match &mut self.convergence_test {
            Some(test) => {
                if rnorm.is_finite() {
                    test(iteration, rnorm)
                } else {
                    ConvergedReason::DivergedNanOrInf
                }
            }
            None => self.tolerances.check(iteration, rnorm, rnorm0),
        };
        if reason == ConvergedReason::Iterating && iteration >= self.tolerances.max_it {
            ConvergedReason::DivergedIts
        } else {
            reason
        }
    }

    pub(super) fn precondition(&self, r: &[T], z: &mut [T]) {
        self.pc.apply(r, z);
    }

    pub fn view(&self, out: &mut dyn Write) -> QpResult<()> {
        let prefix = if self.options_prefix.is_empty() {
            String::new()
        } else {
            format!("({}) ", self.options_prefix)
        };
        writeln!(out, "KSP Object: {}", prefix)?;
        writeln!(out, "  type: {}", self.ksp_type)?;
        if self.ksp_type == KspType::Richardson {
            writeln!(out, "    damping factor={}", self.richardson_scale)?;
        }
        writeln!(
            out,
            "  maximum iterations={}, {} initial guess",
            self.tolerances.max_it,
            if self.initial_guess_nonzero { "nonzero" } else { "zero" }
        )?;
        writeln!(
            out,
            "  tolerances: relative={:e}, absolute={:e}, divergence={:e}",
            self.tolerances.rtol, self.tolerances.atol, self.tolerances.divtol
        )?;
        writeln!(
            out,
            "  using {} norm type for convergence test",
            self.norm_type.name()
        )?;
        writeln!(out, "PC Object: {}", prefix)?;
        writeln!(out, "  type: {}", self.pc.kind())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spd_operator() -> Arc<CscMatrix<f64>> {
        Arc::new(CscMatrix::from(&[
            [4., -1., 0.],  //
            [-1., 4., -1.], //
            [0., -1., 2.],  //
        ]))
    }

    #[test]
    fn test_ksp_requires_operator() {
        let mut ksp = Ksp::<f64>::new();
        assert!(matches!(ksp.set_up(), Err(QpError::InvalidArgument(_))));
        let mut x = [0.; 2];
        assert!(ksp.solve(&[1., 1.], &mut x).is_err());
    }

    #[test]
    fn test_ksp_dimension_mismatch() {
        let mut ksp = Ksp::<f64>::new();
        ksp.set_operators(spd_operator());
        let mut x = [0.; 2];
        assert!(matches!(
            ksp.solve(&[1., 1., 1.], &mut x),
            Err(QpError::IncompatibleArgument(_))
        ));
    }

    #[test]
    fn test_ksp_operator_change_resets_set_up() {
        let mut ksp = Ksp::<f64>::new();
        let A = spd_operator();
        ksp.set_operators(Arc::clone(&A));
        ksp.set_up().unwrap();
        assert!(ksp.is_set_up());

        ksp.set_operators(Arc::clone(&A));
        assert!(ksp.is_set_up());

        ksp.set_operators(spd_operator());
        assert!(!ksp.is_set_up());

        ksp.set_up().unwrap();
        ksp.set_pc_type(PcType::Jacobi);
        assert!(!ksp.is_set_up());
    }

    #[test]
    fn test_ksp_custom_convergence_test() {
        let mut ksp = Ksp::<f64>::new();
        ksp.set_operators(spd_operator());
        // stop immediately after the first iteration
        ksp.set_convergence_test(Box::new(|i: usize, _rnorm: f64| {
            if i >= 1 {
                ConvergedReason::ConvergedAtol
            } else {
                ConvergedReason::Iterating
            }
        }));
        let mut x = [0.; 3];
        let reason = ksp.solve(&[1., 2., 3.], &mut x).unwrap();
        assert_eq!(reason, ConvergedReason::ConvergedAtol);
        assert_eq!(ksp.iteration_number(), 1);
    }

    #[test]
    fn test_ksp_options() {
        let mut ksp = Ksp::<f64>::new();
        let opts = KspOptionsBuilder::default()
            .ksp_type(KspType::Richardson)
            .pc_type(PcType::Jacobi)
            .richardson_scale(0.8)
            .build()
            .unwrap();
        ksp.set_from_options(&opts).unwrap();
        assert_eq!(ksp.ksp_type(), KspType::Richardson);
        assert_eq!(ksp.pc_type(), PcType::Jacobi);
        assert_eq!(ksp.richardson_scale(), 0.8);
        assert_eq!(ksp.norm_type(), NormType::Preconditioned);

        ksp.set_options_prefix("outer_");
        ksp.append_options_prefix("qps_");
        let mut out = Vec::new();
        ksp.view(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("KSP Object: (outer_qps_)"));
        assert!(text.contains("type: richardson"));
        assert!(text.contains("type: jacobi"));
    }
}
