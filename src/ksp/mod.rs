//! Preconditioned Krylov subspace linear solvers.
//!
//! [`Ksp`] solves `A*x = b` for a sparse operator `A` with one of the
//! methods in [`KspType`], a [`Preconditioner`] and a pluggable
//! convergence test.  The test receives the iteration index and the
//! residual norm (measured as selected by [`NormType`]) once per
//! iteration and returns a [`ConvergedReason`].

use crate::algebra::*;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

mod cg;
mod options;
mod pc;
mod reason;
mod richardson;
mod solver;

pub use options::*;
pub use pc::*;
pub use reason::*;
pub use solver::*;

/// Krylov methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KspType {
    /// preconditioned conjugate gradient, for symmetric positive
    /// definite operators
    #[default]
    CG,
    /// preconditioned Richardson iteration `x += ω*M*(b - A*x)`
    Richardson,
}

impl KspType {
    pub fn name(&self) -> &'static str {
        match self {
            KspType::CG => "cg",
            KspType::Richardson => "richardson",
        }
    }
}

impl fmt::Display for KspType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for KspType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cg" => Ok(KspType::CG),
            "richardson" => Ok(KspType::Richardson),
            _ => Err(format!("unknown Krylov method \"{}\"", s)),
        }
    }
}

/// Residual norm reported to the convergence test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NormType {
    /// `‖b - A*x‖`
    Unpreconditioned,
    /// `‖M*(b - A*x)‖`
    #[default]
    Preconditioned,
    /// `sqrt(r'*M*r)`
    Natural,
}

impl NormType {
    pub fn name(&self) -> &'static str {
        match self {
            NormType::Unpreconditioned => "UNPRECONDITIONED",
            NormType::Preconditioned => "PRECONDITIONED",
            NormType::Natural => "NATURAL",
        }
    }

    /// residual norm from the residual `r` and the preconditioned residual `z`
    pub(crate) fn measure<T: FloatT>(&self, r: &[T], z: &[T]) -> T {
        match self {
            NormType::Unpreconditioned => r.norm(),
            NormType::Preconditioned => z.norm(),
            NormType::Natural => T::sqrt(T::abs(r.dot(z))),
        }
    }
}

/// Stopping tolerances of an iterative solve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct Tolerances<T> {
    pub rtol: T,
    pub atol: T,
    pub divtol: T,
    pub max_it: usize,
}

impl<T> Default for Tolerances<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self {
            rtol: (1e-5).as_T(),
            atol: (1e-50).as_T(),
            divtol: (1e4).as_T(),
            max_it: 10000,
        }
    }
}

impl<T> Tolerances<T>
where
    T: FloatT,
{
    /// Standard test of `rnorm` against the reference norm `rnorm0`
    pub fn check(&self, iteration: usize, rnorm: T, rnorm0: T) -> ConvergedReason {
        if !rnorm.is_finite() {
            ConvergedReason::DivergedNanOrInf
        } else if rnorm <= self.rtol * rnorm0 {
            ConvergedReason::ConvergedRtol
        } else if rnorm <= self.atol {
            ConvergedReason::ConvergedAtol
        } else if rnorm >= self.divtol * rnorm0 {
            ConvergedReason::DivergedDtol
        } else if iteration >= self.max_it {
            ConvergedReason::DivergedIts
        } else {
            ConvergedReason::Iterating
        }
    }
}

#[test]
fn test_tolerances_check() {
    let tol = Tolerances::<f64>::default();
    assert_eq!(tol.check(0, 1.0, 1.0), ConvergedReason::Iterating);
    assert_eq!(tol.check(3, 1e-6, 1.0), ConvergedReason::ConvergedRtol);
    assert_eq!(tol.check(3, 1e-51, 0.0), ConvergedReason::ConvergedAtol);
    assert_eq!(tol.check(3, 1e5, 1.0), ConvergedReason::DivergedDtol);
    assert_eq!(tol.check(10000, 0.5, 1.0), ConvergedReason::DivergedIts);
    assert_eq!(tol.check(1, f64::NAN, 1.0), ConvergedReason::DivergedNanOrInf);
}

#[test]
fn test_type_names() {
    assert_eq!("richardson".parse::<KspType>().unwrap(), KspType::Richardson);
    assert!("gmres".parse::<KspType>().is_err());
    assert_eq!(KspType::CG.to_string(), "cg");
    assert_eq!(NormType::Natural.name(), "NATURAL");
}
