use super::*;
use crate::algebra::*;
use crate::error::{QpError, QpResult};
use std::io::Write;

/// A constraint geometry together with the index set it applies to.
///
/// Without an index set every component of the variable vector is
/// constrained and all vectors passed to the handler must have length
/// [`dim`](ConstraintHandler::dim).  With an index set only the listed
/// components are constrained.  Vectors passed to the handler then span
/// the full variable space and the remaining components are treated as
/// unconstrained:
///
/// * `project` copies them unchanged,
/// * `grads` puts them in the free part,
/// * `feas` ignores them,
/// * `grad_reduced` leaves them as they are.
///
/// __Example usage__ :
///
/// ```no_run
/// use qpframe::algebra::*;
/// use qpframe::qpc::*;
///
/// let lb = SharedVector::from_slice(&[0., 0., 0.]);
/// let ub = SharedVector::from_slice(&[1., 1., 1.]);
/// let handler = ConstraintHandler::new_box(
///     None, Some(lb), Some(ub), ConstraintSettings::default()
/// ).unwrap();
///
/// let mut px = [0.; 3];
/// handler.project(&[-0.5, 0.5, 1.5], &mut px).unwrap();
/// assert_eq!(px, [0., 0.5, 1.]);
/// ```
#[derive(Debug, Clone)]
pub struct ConstraintHandler<T: FloatT> {
    constraint: SupportedConstraint<T>,
    is: Option<IndexSet>,
    lambdawork: Option<Vec<T>>,
    settings: ConstraintSettings<T>,
}

impl<T> ConstraintHandler<T>
where
    T: FloatT,
{
    pub fn new(
        is: Option<IndexSet>,
        constraint: SupportedConstraint<T>,
        settings: ConstraintSettings<T>,
    ) -> QpResult<Self> {
        settings.validate()?;
        check_index_set(is.as_ref(), constraint.dim())?;
        Ok(Self {
            constraint,
            is,
            lambdawork: None,
            settings,
        })
    }

    /// Create a handler for the bounds `lb ≤ x ≤ ub`.  At least one of
    /// the bounds must be given.
    pub fn new_box(
        is: Option<IndexSet>,
        lb: Option<SharedVector<T>>,
        ub: Option<SharedVector<T>>,
        settings: ConstraintSettings<T>,
    ) -> QpResult<Self> {
        let bx = BoxConstraint::new(lb, ub, settings.bounds_check)?;
        Self::new(is, bx.into(), settings)
    }

    /// Allocate the work vector.  Repeated calls have no effect.
    pub fn set_up(&mut self) {
        if self.lambdawork.is_none() {
            let dim = self.constraint.dim();
            self.lambdawork = Some(vec![T::zero(); dim]);
            tracing::debug!(
                kind = self.constraint.type_name(),
                dim,
                restricted = self.is.is_some(),
                "constraint handler set up"
            );
        }
    }

    pub fn is_set_up(&self) -> bool {
        self.lambdawork.is_some()
    }

    pub fn constraint(&self) -> &SupportedConstraint<T> {
        &self.constraint
    }

    pub fn index_set(&self) -> Option<&IndexSet> {
        self.is.as_ref()
    }

    pub fn settings(&self) -> &ConstraintSettings<T> {
        &self.settings
    }

    /// number of constrained components
    pub fn dim(&self) -> usize {
        self.constraint.dim()
    }

    pub fn num_constraints(&self) -> usize {
        match &self.is {
            Some(is) => is.len() / self.constraint.block_size(),
            None => self.constraint.dim(),
        }
    }

    pub fn is_linear(&self) -> bool {
        self.constraint.is_linear()
    }

    pub fn is_subsymmetric(&self) -> bool {
        self.constraint.is_subsymmetric()
    }

    pub fn block_size(&self) -> usize {
        self.constraint.block_size()
    }

    pub fn type_name(&self) -> &'static str {
        self.constraint.type_name()
    }

    pub fn astol(&self) -> T {
        self.settings.astol
    }

    pub fn set_astol(&mut self, astol: T) -> QpResult<()> {
        validate_astol(astol)?;
        self.settings.astol = astol;
        Ok(())
    }

    /// `true` if the handler can act on variable vectors of length `n`
    pub fn fits(&self, n: usize) -> bool {
        match &self.is {
            Some(is) => is.fits(n),
            None => n == self.constraint.dim(),
        }
    }

    // ---------------------------------------------------------
    // box specific routines
    // ---------------------------------------------------------

    /// Replace both bounds of a box constraint.  The new bounds must
    /// keep the layout of the old ones, so a handler attached to a
    /// problem keeps fitting it.
    pub fn box_set(
        &mut self,
        lb: Option<SharedVector<T>>,
        ub: Option<SharedVector<T>>,
    ) -> QpResult<()> {
        let check = self.settings.bounds_check;
        let is = self.is.as_ref();
        let bx = self
            .constraint
            .as_box_mut()
            .ok_or_else(|| not_a_box("box_set"))?;

        // validate the layout before replacing anything
        if let Some(dim) = lb.as_ref().or(ub.as_ref()).map(|v| v.len()) {
            if dim != bx.dim() {
                return Err(QpError::incompatible(format!(
                    "new bounds have length {} but the constraint has dimension {}",
                    dim,
                    bx.dim()
                )));
            }
            check_index_set(is, dim)?;
        }
        bx.set(lb, ub, check)
    }

    /// Bounds of a box constraint as `(lb, ub)`
    pub fn box_get(&self) -> QpResult<(Option<&SharedVector<T>>, Option<&SharedVector<T>>)> {
        let bx = self.constraint.as_box().ok_or_else(|| not_a_box("box_get"))?;
        Ok((bx.lower(), bx.upper()))
    }

    /// Lagrange multipliers of a box constraint as `(λ_lb, λ_ub)`
    pub fn box_multipliers(
        &self,
    ) -> QpResult<(Option<&SharedVector<T>>, Option<&SharedVector<T>>)> {
        let bx = self
            .constraint
            .as_box()
            .ok_or_else(|| not_a_box("box_multipliers"))?;
        Ok((bx.lower_multiplier(), bx.upper_multiplier()))
    }

    // ---------------------------------------------------------
    // operations on the variable space
    // ---------------------------------------------------------

    pub fn project(&self, x: &[T], px: &mut [T]) -> QpResult<()> {
        self.check_len("px", px.len(), x.len())?;
        self.check_fits(x.len())?;
        match &self.is {
            None => self.constraint.project(x, px),
            Some(is) => {
                let xs = is.subvector(x);
                let mut pxs = vec![T::zero(); is.len()];
                self.constraint.project(&xs, &mut pxs);
                px.copy_from(x);
                is.scatter(&pxs, px);
            }
        }
        Ok(())
    }

    /// Largest α ≥ 0 such that `x - α*d` stays feasible, `+∞` if no
    /// constraint limits the step.
    pub fn feas(&self, x: &[T], d: &[T]) -> QpResult<T> {
        self.check_len("d", d.len(), x.len())?;
        self.check_fits(x.len())?;
        let α = match &self.is {
            None => self.constraint.feas(x, d),
            Some(is) => self.constraint.feas(&is.subvector(x), &is.subvector(d)),
        };
        Ok(α)
    }

    /// Split the gradient `g` into its free part `gf` and chopped part `gc`.
    ///
    /// Every component of both outputs is written, so `gf + gc == g`
    /// wherever the chopped part keeps the full gradient value.
    pub fn grads(&self, x: &[T], g: &[T], gf: &mut [T], gc: &mut [T]) -> QpResult<()> {
        self.check_len("g", g.len(), x.len())?;
        self.check_len("gf", gf.len(), x.len())?;
        self.check_len("gc", gc.len(), x.len())?;
        self.check_fits(x.len())?;
        let astol = self.settings.astol;

        match &self.is {
            None => self.constraint.grads(x, g, gf, gc, astol),
            Some(is) => {
                let n = is.len();
                let (mut gfs, mut gcs) = (vec![T::zero(); n], vec![T::zero(); n]);
                self.constraint
                    .grads(&is.subvector(x), &is.subvector(g), &mut gfs, &mut gcs, astol);
                gf.copy_from(g);
                gc.set(T::zero());
                is.scatter(&gfs, gf);
                is.scatter(&gcs, gc);
            }
        }
        Ok(())
    }

    /// Shorten the free gradient step so that `x - α*gr` stays feasible.
    /// Components of `gr` that need no correction are left unmodified.
    pub fn grad_reduced(&self, x: &[T], gf: &[T], α: T, gr: &mut [T]) -> QpResult<()> {
        if !(α > T::zero()) {
            return Err(QpError::invalid(format!("step length must be positive, got {}", α)));
        }
        self.check_len("gf", gf.len(), x.len())?;
        self.check_len("gr", gr.len(), x.len())?;
        self.check_fits(x.len())?;

        match &self.is {
            None => self.constraint.grad_reduced(x, gf, α, gr),
            Some(is) => {
                let mut grs = is.subvector(gr);
                self.constraint
                    .grad_reduced(&is.subvector(x), &is.subvector(gf), α, &mut grs);
                is.scatter(&grs, gr);
            }
        }
        Ok(())
    }

    /// Constraint function evaluated at the constrained components `x_sub`.
    ///
    /// The result is stored in the handler's work vector, which is
    /// allocated on first use.
    pub fn constraint_function(&mut self, x_sub: &[T]) -> QpResult<&[T]> {
        self.check_len("x_sub", x_sub.len(), self.dim())?;
        self.set_up();
        let hx = self.lambdawork.get_or_insert_with(Vec::new);
        self.constraint.constraint_function(x_sub, hx);
        Ok(hx.as_slice())
    }

    // ---------------------------------------------------------
    // diagnostics
    // ---------------------------------------------------------

    pub fn view(&self, out: &mut dyn Write) -> QpResult<()> {
        writeln!(out, "QPC Object: type {}", self.type_name())?;
        writeln!(out, "  number of constraints: {}", self.num_constraints())?;
        writeln!(out, "  astol: {:.2e}", self.settings.astol)?;
        if let Some(is) = &self.is {
            writeln!(out, "  index set of length {}", is.len())?;
        }
        self.constraint.view(out)?;
        Ok(())
    }

    /// Print the KKT residuals of the constraint at `x`, relative to `normb`
    pub fn view_kkt(&self, x: &[T], normb: T, out: &mut dyn Write) -> QpResult<()> {
        self.check_fits(x.len())?;
        match &self.is {
            None => self.constraint.view_kkt(x, normb, out)?,
            Some(is) => self.constraint.view_kkt(&is.subvector(x), normb, out)?,
        }
        Ok(())
    }

    fn check_fits(&self, n: usize) -> QpResult<()> {
        if self.fits(n) {
            Ok(())
        } else {
            Err(QpError::incompatible(format!(
                "vector of length {} does not match the constraint layout",
                n
            )))
        }
    }

    fn check_len(&self, name: &str, len: usize, expected: usize) -> QpResult<()> {
        if len == expected {
            Ok(())
        } else {
            Err(QpError::incompatible(format!(
                "{} has length {}, expected {}",
                name, len, expected
            )))
        }
    }
}

fn check_index_set(is: Option<&IndexSet>, dim: usize) -> QpResult<()> {
    match is {
        Some(is) if is.len() != dim => Err(QpError::incompatible(format!(
            "index set has length {} but the constraint has dimension {}",
            is.len(),
            dim
        ))),
        _ => Ok(()),
    }
}

fn not_a_box(routine: &'static str) -> QpError {
    QpError::UnsupportedOperation {
        routine,
        expected: "box",
    }
}
