use super::*;
use crate::algebra::*;
use crate::error::{QpError, QpResult};
use itertools::izip;
use std::io::Write;
use std::iter::zip;

// -------------------------------------
// Box constraint  lb ≤ x ≤ ub
// -------------------------------------

/// Elementwise bounds `lb ≤ x ≤ ub`.
///
/// Either bound may be absent, meaning the constraint is one-sided.  The
/// bound vectors are shared with the caller, who may keep its own handle
/// and modify the values between iterations.  Each bound carries a
/// Lagrange multiplier vector of the same length, which stays invalidated
/// until an outer algorithm writes to it.
#[derive(Debug, Clone)]
pub struct BoxConstraint<T> {
    lb: Option<SharedVector<T>>,
    ub: Option<SharedVector<T>>,
    llb: Option<SharedVector<T>>,
    lub: Option<SharedVector<T>>,
}

/// KKT residuals for one side of a [`BoxConstraint`].
///
/// Multiplier dependent quantities are `None` while the multiplier
/// vector is invalidated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundKktResiduals<T> {
    /// `‖min(x-lb,0)‖` or `‖max(x-ub,0)‖`
    pub infeasibility: T,
    /// `‖min(λ,0)‖`
    pub multiplier_sign: Option<T>,
    /// `|λ'(lb-x)|` or `|λ'(x-ub)|`, skipping components with an infinite bound
    pub complementarity: Option<T>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxKktResiduals<T> {
    pub lower: Option<BoundKktResiduals<T>>,
    pub upper: Option<BoundKktResiduals<T>>,
}

impl<T> BoxConstraint<T>
where
    T: FloatT,
{
    pub fn new(
        lb: Option<SharedVector<T>>,
        ub: Option<SharedVector<T>>,
        check: BoundsCheck,
    ) -> QpResult<Self> {
        Self::validate_bounds(lb.as_ref(), ub.as_ref(), check)?;
        let llb = lb.as_ref().map(new_multiplier);
        let lub = ub.as_ref().map(new_multiplier);
        Ok(Self { lb, ub, llb, lub })
    }

    /// Replace both bounds.  Fresh multiplier vectors are allocated and
    /// invalidated.  On error nothing is modified.
    pub fn set(
        &mut self,
        lb: Option<SharedVector<T>>,
        ub: Option<SharedVector<T>>,
        check: BoundsCheck,
    ) -> QpResult<()> {
        *self = Self::new(lb, ub, check)?;
        tracing::debug!(dim = self.dim(), "box bounds replaced");
        Ok(())
    }

    pub fn lower(&self) -> Option<&SharedVector<T>> {
        self.lb.as_ref()
    }

    pub fn upper(&self) -> Option<&SharedVector<T>> {
        self.ub.as_ref()
    }

    pub fn lower_multiplier(&self) -> Option<&SharedVector<T>> {
        self.llb.as_ref()
    }

    pub fn upper_multiplier(&self) -> Option<&SharedVector<T>> {
        self.lub.as_ref()
    }

    fn validate_bounds(
        lb: Option<&SharedVector<T>>,
        ub: Option<&SharedVector<T>>,
        check: BoundsCheck,
    ) -> QpResult<()> {
        match (lb, ub) {
            (None, None) => Err(QpError::invalid("lb and ub cannot both be None")),
            (Some(lb), Some(ub)) => {
                if lb.len() != ub.len() {
                    return Err(QpError::incompatible(format!(
                        "lb has length {} but ub has length {}",
                        lb.len(),
                        ub.len()
                    )));
                }
                if check.is_enabled() {
                    let (lb, ub) = (lb.read(), ub.read());
                    // NaN bounds compare false and are rejected too
                    if !zip(lb.iter(), ub.iter()).all(|(&l, &u)| l <= u) {
                        return Err(QpError::incompatible(
                            "lb components must be smaller than ub components",
                        ));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Residuals of the KKT conditions at `x`, as printed by `view_kkt`.
    pub fn kkt_residuals(&self, x: &[T]) -> BoxKktResiduals<T> {
        let lower = self.lb.as_ref().map(|lb| {
            let lb = lb.read();
            let infeasibility = zip(x, lb.iter())
                .map(|(&x, &l)| T::min(x - l, T::zero()))
                .fold(T::zero(), |acc, r| acc + r * r)
                .sqrt();
            let llb = self.llb.as_ref().filter(|v| v.is_valid()).map(|v| v.read());
            BoundKktResiduals {
                infeasibility,
                multiplier_sign: llb.as_deref().map(negative_part_norm),
                complementarity: llb.as_deref().map(|λ| {
                    izip!(λ, x, lb.iter())
                        .filter(|(_, _, l)| l.is_finite())
                        .fold(T::zero(), |acc, (&λi, &xi, &li)| acc + λi * (li - xi))
                        .abs()
                }),
            }
        });

        let upper = self.ub.as_ref().map(|ub| {
            let ub = ub.read();
            let infeasibility = zip(x, ub.iter())
                .map(|(&x, &u)| T::max(x - u, T::zero()))
                .fold(T::zero(), |acc, r| acc + r * r)
                .sqrt();
            let lub = self.lub.as_ref().filter(|v| v.is_valid()).map(|v| v.read());
            BoundKktResiduals {
                infeasibility,
                multiplier_sign: lub.as_deref().map(negative_part_norm),
                complementarity: lub.as_deref().map(|λ| {
                    izip!(λ, x, ub.iter())
                        .filter(|(_, _, u)| u.is_finite())
                        .fold(T::zero(), |acc, (&λi, &xi, &ui)| acc + λi * (xi - ui))
                        .abs()
                }),
            }
        });

        BoxKktResiduals { lower, upper }
    }
}

fn new_multiplier<T: FloatT>(v: &SharedVector<T>) -> SharedVector<T> {
    let λ = v.duplicate();
    λ.invalidate();
    λ
}

// ‖min(λ,0)‖
fn negative_part_norm<T: FloatT>(λ: &[T]) -> T {
    λ.iter()
        .map(|&λ| T::min(λ, T::zero()))
        .fold(T::zero(), |acc, r| acc + r * r)
        .sqrt()
}

impl<T> Constraint<T> for BoxConstraint<T>
where
    T: FloatT,
{
    fn dim(&self) -> usize {
        // at least one bound is always present
        self.lb
            .as_ref()
            .or(self.ub.as_ref())
            .map_or(0, |v| v.len())
    }

    fn block_size(&self) -> usize {
        1
    }

    fn is_linear(&self) -> bool {
        true
    }

    fn is_subsymmetric(&self) -> bool {
        true
    }

    fn type_name(&self) -> &'static str {
        "box"
    }

    fn project(&self, x: &[T], px: &mut [T]) {
        let n = self.dim().min(x.len()).min(px.len());
        let (x, px) = (&x[..n], &mut px[..n]);

        match (&self.lb, &self.ub) {
            (Some(lb), Some(ub)) => {
                px.pointwise_max(x, &lb.read()[..n]);
                for (p, &u) in zip(px.iter_mut(), ub.read().iter()) {
                    *p = T::min(*p, u);
                }
            }
            (Some(lb), None) => {
                px.pointwise_max(x, &lb.read()[..n]);
            }
            (None, Some(ub)) => {
                px.pointwise_min(x, &ub.read()[..n]);
            }
            (None, None) => {
                px.copy_from(x);
            }
        }
    }

    fn feas(&self, x: &[T], d: &[T]) -> T {
        let lb = self.lb.as_ref().map(|v| v.read());
        let ub = self.ub.as_ref().map(|v| v.read());
        let mut α = T::infinity();

        for (i, (&xi, &di)) in zip(x, d).take(self.dim()).enumerate() {
            if di > T::zero() {
                if let Some(l) = lb.as_ref().map(|lb| lb[i]).filter(|l| *l > -T::infinity()) {
                    α = T::min(α, (xi - l) / di);
                }
            }
            if di < T::zero() {
                if let Some(u) = ub.as_ref().map(|ub| ub[i]).filter(|u| *u < T::infinity()) {
                    α = T::min(α, (xi - u) / di);
                }
            }
        }
        α
    }

    fn grads(&self, x: &[T], g: &[T], gf: &mut [T], gc: &mut [T], astol: T) {
        let lb = self.lb.as_ref().map(|v| v.read());
        let ub = self.ub.as_ref().map(|v| v.read());

        for (i, (&xi, &gi, gfi, gci)) in izip!(x, g, gf, gc).take(self.dim()).enumerate() {
            let at_lower = lb.as_ref().is_some_and(|lb| (xi - lb[i]).abs() <= astol);
            let at_upper = ub.as_ref().is_some_and(|ub| (xi - ub[i]).abs() <= astol);

            if at_lower {
                *gfi = T::zero();
                *gci = T::min(gi, T::zero());
            } else if at_upper {
                *gfi = T::zero();
                *gci = T::max(gi, T::zero());
            } else {
                *gfi = gi;
                *gci = T::zero();
            }
        }
    }

    fn grad_reduced(&self, x: &[T], gf: &[T], α: T, gr: &mut [T]) {
        let lb = self.lb.as_ref().map(|v| v.read());
        let ub = self.ub.as_ref().map(|v| v.read());

        for (i, (&xi, &gfi, gri)) in izip!(x, gf, gr).take(self.dim()).enumerate() {
            match (&lb, &ub) {
                (Some(lb), _) if gfi > T::zero() => {
                    *gri = T::min(gfi, (xi - lb[i]) / α);
                }
                (_, Some(ub)) if gfi < T::zero() => {
                    *gri = T::max(gfi, (xi - ub[i]) / α);
                }
                _ => {}
            }
        }
    }

    fn constraint_function(&self, x: &[T], hx: &mut [T]) {
        let lb = self.lb.as_ref().map(|v| v.read());
        let ub = self.ub.as_ref().map(|v| v.read());
        let two: T = (2.).as_T();

        for (i, (&xi, hi)) in zip(x, hx).take(self.dim()).enumerate() {
            let l = lb.as_ref().map(|lb| lb[i]).filter(|l| l.is_finite());
            let u = ub.as_ref().map(|ub| ub[i]).filter(|u| u.is_finite());
            *hi = match (l, u) {
                (Some(l), Some(u)) => (xi - (u + l) / two).abs() - (u - l) / two,
                (Some(l), None) => l - xi,
                (None, Some(u)) => xi - u,
                (None, None) => -T::infinity(),
            };
        }
    }

    fn view(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if let Some(lb) = &self.lb {
            writeln!(out, "lb:")?;
            write_vector(out, &lb.read())?;
        }
        if let Some(ub) = &self.ub {
            writeln!(out, "ub:")?;
            write_vector(out, &ub.read())?;
        }
        Ok(())
    }

    fn view_kkt(&self, x: &[T], normb: T, out: &mut dyn Write) -> std::io::Result<()> {
        let res = self.kkt_residuals(x);

        if let Some(r) = res.lower {
            write_residual(out, "||min(x-lb,0)||     ", Some(r.infeasibility), normb)?;
            write_residual(out, "||min(lambda_lb,0)||", r.multiplier_sign, normb)?;
            write_residual(out, "|lambda_lb'*(lb-x)| ", r.complementarity, normb)?;
        }
        if let Some(r) = res.upper {
            write_residual(out, "||max(x-ub,0)||     ", Some(r.infeasibility), normb)?;
            write_residual(out, "||min(lambda_ub,0)||", r.multiplier_sign, normb)?;
            write_residual(out, "|lambda_ub'*(x-ub)| ", r.complementarity, normb)?;
        }
        Ok(())
    }
}

fn write_residual<T: FloatT>(
    out: &mut dyn Write,
    label: &str,
    r: Option<T>,
    normb: T,
) -> std::io::Result<()> {
    match r {
        Some(r) => writeln!(out, "r = {} = {:.2e}    r/||b|| = {:.2e}", label, r, r / normb),
        None => writeln!(out, "r = {} = not computed", label),
    }
}

pub(crate) fn write_vector<T: FloatT>(out: &mut dyn Write, v: &[T]) -> std::io::Result<()> {
    for vi in v {
        writeln!(out, "    {}", vi)?;
    }
    Ok(())
}
