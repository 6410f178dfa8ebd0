#![allow(non_snake_case)]

use crate::algebra::*;
use crate::error::{QpError, QpResult};
use crate::ksp::PcType;
use crate::qpc::{ConstraintHandler, ConstraintSettings};
use std::io::Write;
use std::sync::Arc;

/// Quadratic program
///
/// $$
/// \begin{array}{rl}
/// \text{minimize} & \frac{1}{2}x^T A x - b^T x\\\\\[2ex\]
///  \text{subject to} & B_{eq} x = c_{eq} \\\\\[1ex\]
///         & B_{ineq} x \le c_{ineq} \\\\\[1ex\]
///         & x \in \mathcal{C}
///  \end{array}
/// $$
///
/// where $\mathcal{C}$ is the set described by an optional attached
/// [`ConstraintHandler`].  The operator `A` is square and symmetric
/// positive semidefinite.  The problem also carries the current iterate
/// `x` and the preconditioner to be used by linear solvers acting on `A`.
#[derive(Debug, Clone)]
pub struct QP<T: FloatT> {
    A: Arc<CscMatrix<T>>,
    b: Vec<T>,
    x: Vec<T>,
    Beq: Option<Arc<CscMatrix<T>>>,
    ceq: Option<Vec<T>>,
    Bineq: Option<Arc<CscMatrix<T>>>,
    cineq: Option<Vec<T>>,
    qpc: Option<ConstraintHandler<T>>,
    pc: PcType,
}

impl<T> QP<T>
where
    T: FloatT,
{
    /// Create an unconstrained problem with operator `A` and right hand
    /// side `b`.  The iterate is initialized to zero.
    pub fn new(A: CscMatrix<T>, b: Vec<T>) -> QpResult<Self> {
        check_operator(&A)?;
        check_length("b", b.len(), A.nrows())?;
        let n = A.ncols();
        Ok(Self {
            A: Arc::new(A),
            b,
            x: vec![T::zero(); n],
            Beq: None,
            ceq: None,
            Bineq: None,
            cineq: None,
            qpc: None,
            pc: PcType::default(),
        })
    }

    /// number of variables
    pub fn dim(&self) -> usize {
        self.A.ncols()
    }

    // ---------------------------------------------------------
    // objective
    // ---------------------------------------------------------

    pub fn operator(&self) -> &Arc<CscMatrix<T>> {
        &self.A
    }

    /// Replace the operator.  The new operator must have the same size.
    pub fn set_operator(&mut self, A: CscMatrix<T>) -> QpResult<()> {
        self.set_operator_shared(Arc::new(A))
    }

    pub fn set_operator_shared(&mut self, A: Arc<CscMatrix<T>>) -> QpResult<()> {
        check_operator(&A)?;
        if A.size() != self.A.size() {
            return Err(QpError::incompatible(format!(
                "operator must be {}x{}, got {}x{}",
                self.A.nrows(),
                self.A.ncols(),
                A.nrows(),
                A.ncols()
            )));
        }
        self.A = A;
        Ok(())
    }

    pub fn rhs(&self) -> &[T] {
        &self.b
    }

    pub fn set_rhs(&mut self, b: Vec<T>) -> QpResult<()> {
        check_length("b", b.len(), self.A.nrows())?;
        self.b = b;
        Ok(())
    }

    pub fn solution(&self) -> &[T] {
        &self.x
    }

    pub fn solution_mut(&mut self) -> &mut [T] {
        &mut self.x
    }

    /// Overwrite the iterate with the initial guess `x0`
    pub fn set_initial_vector(&mut self, x0: &[T]) -> QpResult<()> {
        check_length("x0", x0.len(), self.dim())?;
        self.x.copy_from(x0);
        Ok(())
    }

    /// Right hand side and iterate, borrowed together
    pub(crate) fn rhs_and_solution_mut(&mut self) -> (&[T], &mut [T]) {
        (&self.b, &mut self.x)
    }

    // ---------------------------------------------------------
    // constraints
    // ---------------------------------------------------------

    /// Set or clear the equality constraints `Beq*x = ceq`
    pub fn set_eq(&mut self, Beq: Option<CscMatrix<T>>, ceq: Option<Vec<T>>) -> QpResult<()> {
        self.check_constraint_data("Beq", Beq.as_ref(), ceq.as_deref())?;
        self.Beq = Beq.map(Arc::new);
        self.ceq = ceq;
        Ok(())
    }

    pub fn eq(&self) -> (Option<&CscMatrix<T>>, Option<&[T]>) {
        (self.Beq.as_deref(), self.ceq.as_deref())
    }

    /// Set or clear the inequality constraints `Bineq*x ≤ cineq`
    pub fn set_ineq(
        &mut self,
        Bineq: Option<CscMatrix<T>>,
        cineq: Option<Vec<T>>,
    ) -> QpResult<()> {
        self.check_constraint_data("Bineq", Bineq.as_ref(), cineq.as_deref())?;
        self.Bineq = Bineq.map(Arc::new);
        self.cineq = cineq;
        Ok(())
    }

    pub fn ineq(&self) -> (Option<&CscMatrix<T>>, Option<&[T]>) {
        (self.Bineq.as_deref(), self.cineq.as_deref())
    }

    /// Attach box constraints `lb ≤ x ≤ ub` to the components in `is`
    /// (all components if `is` is `None`)
    pub fn set_box(
        &mut self,
        is: Option<IndexSet>,
        lb: Option<SharedVector<T>>,
        ub: Option<SharedVector<T>>,
    ) -> QpResult<()> {
        let handler = ConstraintHandler::new_box(is, lb, ub, ConstraintSettings::default())?;
        self.set_qpc(Some(handler))
    }

    /// Attach or detach a constraint handler
    pub fn set_qpc(&mut self, qpc: Option<ConstraintHandler<T>>) -> QpResult<()> {
        if let Some(handler) = &qpc {
            if !handler.fits(self.dim()) {
                return Err(QpError::incompatible(format!(
                    "constraint handler does not fit a problem with {} variables",
                    self.dim()
                )));
            }
        }
        self.qpc = qpc;
        Ok(())
    }

    pub fn qpc(&self) -> Option<&ConstraintHandler<T>> {
        self.qpc.as_ref()
    }

    pub fn qpc_mut(&mut self) -> Option<&mut ConstraintHandler<T>> {
        self.qpc.as_mut()
    }

    /// `true` if no equality, inequality or constraint handler data is attached
    pub fn is_unconstrained(&self) -> bool {
        self.Beq.is_none()
            && self.ceq.is_none()
            && self.Bineq.is_none()
            && self.cineq.is_none()
            && self.qpc.is_none()
    }

    pub fn pc(&self) -> PcType {
        self.pc
    }

    pub fn set_pc(&mut self, pc: PcType) {
        self.pc = pc;
    }

    // ---------------------------------------------------------
    // evaluation
    // ---------------------------------------------------------

    /// Objective value `½x'Ax - b'x` at the current iterate
    pub fn compute_objective(&self) -> T {
        let half: T = (0.5).as_T();
        half * self.A.quad_form(&self.x, &self.x) - self.b.dot(&self.x)
    }

    /// Objective gradient `g = Ax - b` at the current iterate
    pub fn compute_gradient(&self, g: &mut [T]) -> QpResult<()> {
        check_length("g", g.len(), self.dim())?;
        g.copy_from(&self.b);
        self.A.gemv(g, &self.x, T::one(), -T::one());
        Ok(())
    }

    pub fn view(&self, out: &mut dyn Write) -> QpResult<()> {
        writeln!(out, "QP Object:")?;
        writeln!(
            out,
            "  A: {}x{}, {} nonzeros",
            self.A.nrows(),
            self.A.ncols(),
            self.A.nnz()
        )?;
        writeln!(out, "  ||b|| = {:.2e}", self.b.norm())?;
        writeln!(out, "  ||x|| = {:.2e}", self.x.norm())?;
        match &self.Beq {
            Some(B) => writeln!(out, "  Beq: {}x{}", B.nrows(), B.ncols())?,
            None => writeln!(out, "  no equality constraints")?,
        }
        match &self.Bineq {
            Some(B) => writeln!(out, "  Bineq: {}x{}", B.nrows(), B.ncols())?,
            None => writeln!(out, "  no inequality constraints")?,
        }
        writeln!(out, "  preconditioner: {}", self.pc)?;
        match &self.qpc {
            Some(qpc) => qpc.view(out)?,
            None => writeln!(out, "  no constraint handler")?,
        }
        Ok(())
    }

    fn check_constraint_data(
        &self,
        name: &str,
        B: Option<&CscMatrix<T>>,
        c: Option<&[T]>,
    ) -> QpResult<()> {
        if let Some(B) = B {
            B.check_format()?;
            if B.ncols() != self.dim() {
                return Err(QpError::incompatible(format!(
                    "{} has {} columns, expected {}",
                    name,
                    B.ncols(),
                    self.dim()
                )));
            }
            if let Some(c) = c {
                check_length("constraint vector", c.len(), B.nrows())?;
            }
        }
        Ok(())
    }
}

fn check_operator<T: FloatT>(A: &CscMatrix<T>) -> QpResult<()> {
    A.check_format()?;
    if !A.is_square() {
        return Err(QpError::incompatible(format!(
            "operator must be square, got {}x{}",
            A.nrows(),
            A.ncols()
        )));
    }
    Ok(())
}

fn check_length(name: &str, len: usize, expected: usize) -> QpResult<()> {
    if len != expected {
        return Err(QpError::incompatible(format!(
            "{} has length {}, expected {}",
            name, len, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_qp() -> QP<f64> {
        let A = CscMatrix::from(&[
            [2., -1.], //
            [-1., 2.], //
        ]);
        QP::new(A, vec![1., 0.]).unwrap()
    }

    #[test]
    fn test_qp_new_checks() {
        let A = CscMatrix::<f64>::zeros((2, 3));
        assert!(matches!(
            QP::new(A, vec![0.; 2]),
            Err(QpError::IncompatibleArgument(_))
        ));
        let A = CscMatrix::<f64>::identity(2);
        assert!(QP::new(A, vec![0.; 3]).is_err());
    }

    #[test]
    fn test_qp_objective_and_gradient() {
        let mut qp = test_qp();
        qp.set_initial_vector(&[1., 1.]).unwrap();
        // ½*[1 1]*A*[1 1]' - 1 = ½*2 - 1
        assert_eq!(qp.compute_objective(), 0.);

        let mut g = [0.; 2];
        qp.compute_gradient(&mut g).unwrap();
        assert_eq!(g, [0., 1.]);
        assert!(qp.compute_gradient(&mut [0.; 3]).is_err());
    }

    #[test]
    fn test_qp_constraint_attachment() {
        let mut qp = test_qp();
        assert!(qp.is_unconstrained());

        qp.set_eq(Some(CscMatrix::from(&[[1., 1.]])), Some(vec![1.]))
            .unwrap();
        assert!(!qp.is_unconstrained());
        assert!(qp.set_eq(Some(CscMatrix::from(&[[1., 1., 1.]])), None).is_err());
        qp.set_eq(None, None).unwrap();
        assert!(qp.is_unconstrained());

        qp.set_ineq(None, Some(vec![0.])).unwrap();
        assert!(!qp.is_unconstrained());
        qp.set_ineq(None, None).unwrap();

        qp.set_box(None, Some(SharedVector::constant(2, 0.)), None)
            .unwrap();
        assert!(!qp.is_unconstrained());
        assert!(qp
            .set_box(None, Some(SharedVector::constant(3, 0.)), None)
            .is_err());
    }

    #[test]
    fn test_qp_box_bounds_keep_layout() {
        let mut qp = test_qp();
        qp.set_box(None, Some(SharedVector::constant(2, 0.)), None)
            .unwrap();

        let qpc = qp.qpc_mut().unwrap();
        assert!(qpc
            .box_set(None, Some(SharedVector::constant(5, 1.)))
            .is_err());
        qpc.box_set(None, Some(SharedVector::constant(2, 1.)))
            .unwrap();

        let qpc = qp.qpc().unwrap();
        assert!(qpc.fits(qp.dim()));
        let mut px = [0.; 2];
        qpc.project(&[-1., 3.], &mut px).unwrap();
        assert_eq!(px, [-1., 1.]);
    }

    #[test]
    fn test_qp_set_operator() {
        let mut qp = test_qp();
        assert!(qp.set_operator(CscMatrix::identity(3)).is_err());
        qp.set_operator(CscMatrix::identity(2)).unwrap();
        assert_eq!(qp.operator().get_entry((0, 1)), None);
    }
}
