//! Constraint handlers.
//!
//! A constraint handler knows how to project onto, measure feasibility
//! against and split gradients for one particular constraint geometry.
//! Outer QP algorithms call these primitives once per iteration.
//!
//! Each geometry implements the [`Constraint`] trait.  The geometry is
//! chosen when the handler is created and is fixed for its lifetime; the
//! available geometries are collected in [`SupportedConstraint`] and
//! wrapped by a [`ConstraintHandler`], which adds the optional index set
//! restricting the handler to a subset of the variables.

#![allow(non_snake_case)]

use crate::algebra::FloatT;
use enum_dispatch::*;
use std::io::Write;

mod boxconstraint;
mod handler;
mod settings;

pub use boxconstraint::*;
pub use handler::*;
pub use settings::*;

/// Operations implemented by every constraint geometry.
///
/// All vectors are restricted to the constrained components, i.e. they
/// have length [`dim`](Constraint::dim).  [`ConstraintHandler`] checks
/// the lengths; when the trait is called directly, components past `dim`
/// are ignored and the matching outputs are left untouched.
#[enum_dispatch]
pub trait Constraint<T>
where
    T: FloatT,
{
    /// number of constrained components
    fn dim(&self) -> usize;
    fn block_size(&self) -> usize;
    fn is_linear(&self) -> bool;
    fn is_subsymmetric(&self) -> bool;
    fn type_name(&self) -> &'static str;

    /// Closest feasible point to `x`
    fn project(&self, x: &[T], px: &mut [T]);

    /// Largest α ≥ 0 such that `x - α*d` is feasible, or `+∞`
    fn feas(&self, x: &[T], d: &[T]) -> T;

    /// Split `g` into a free part `gf` and a chopped part `gc`.  Both
    /// outputs are written for every component.
    fn grads(&self, x: &[T], g: &[T], gf: &mut [T], gc: &mut [T], astol: T);

    /// Shorten components of `gr` so that `x - α*gr` stays feasible
    fn grad_reduced(&self, x: &[T], gf: &[T], α: T, gr: &mut [T]);

    /// Signed constraint violation `h(x)`, nonpositive when feasible
    fn constraint_function(&self, x: &[T], hx: &mut [T]);

    fn view(&self, out: &mut dyn Write) -> std::io::Result<()>;
    fn view_kkt(&self, x: &[T], normb: T, out: &mut dyn Write) -> std::io::Result<()>;
}

/// The constraint geometries available to a [`ConstraintHandler`]
#[enum_dispatch(Constraint<T>)]
#[derive(Debug, Clone)]
pub enum SupportedConstraint<T>
where
    T: FloatT,
{
    BoxConstraint(BoxConstraint<T>),
}

impl<T> SupportedConstraint<T>
where
    T: FloatT,
{
    pub fn as_box(&self) -> Option<&BoxConstraint<T>> {
        match self {
            SupportedConstraint::BoxConstraint(b) => Some(b),
        }
    }

    pub fn as_box_mut(&mut self) -> Option<&mut BoxConstraint<T>> {
        match self {
            SupportedConstraint::BoxConstraint(b) => Some(b),
        }
    }
}
