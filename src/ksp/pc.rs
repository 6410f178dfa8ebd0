use crate::algebra::*;
use std::fmt;
use std::iter::zip;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Preconditioner kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PcType {
    #[default]
    None,
    /// inverse of the operator diagonal
    Jacobi,
}

impl PcType {
    pub fn name(&self) -> &'static str {
        match self {
            PcType::None => "none",
            PcType::Jacobi => "jacobi",
        }
    }
}

impl fmt::Display for PcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PcType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(PcType::None),
            "jacobi" => Ok(PcType::Jacobi),
            _ => Err(format!("unknown preconditioner type \"{}\"", s)),
        }
    }
}

/// A preconditioner `M ≈ A⁻¹` applied as `z = M*r`.
#[derive(Debug, Clone, Default)]
pub struct Preconditioner<T> {
    kind: PcType,
    inv_diag: Vec<T>,
}

impl<T> Preconditioner<T>
where
    T: FloatT,
{
    pub fn new(kind: PcType) -> Self {
        Self {
            kind,
            inv_diag: Vec::new(),
        }
    }

    pub fn kind(&self) -> PcType {
        self.kind
    }

    /// Compute the preconditioner data from the operator `A`
    #[allow(non_snake_case)]
    pub fn set_up(&mut self, A: &CscMatrix<T>) {
        match self.kind {
            PcType::None => self.inv_diag.clear(),
            PcType::Jacobi => {
                self.inv_diag.resize(A.ncols(), T::zero());
                A.diag(&mut self.inv_diag);
                // zero diagonal entries are left unscaled
                self.inv_diag.scalarop(|d| if d == T::zero() { T::one() } else { T::recip(d) });
            }
        }
    }

    pub fn apply(&self, r: &[T], z: &mut [T]) {
        match self.kind {
            PcType::None => {
                z.copy_from(r);
            }
            PcType::Jacobi => {
                for (zi, (&ri, &di)) in zip(z, zip(r, &self.inv_diag)) {
                    *zi = ri * di;
                }
            }
        }
    }
}

#[test]
#[allow(non_snake_case)]
fn test_jacobi() {
    let A = CscMatrix::from(&[
        [4., 1., 0.], //
        [1., 0., 1.], //
        [0., 1., 2.], //
    ]);
    let mut pc = Preconditioner::new(PcType::Jacobi);
    pc.set_up(&A);
    let mut z = [0.; 3];
    pc.apply(&[1., 1., 1.], &mut z);
    assert_eq!(z, [0.25, 1., 0.5]);

    let mut pc = Preconditioner::<f64>::new(PcType::None);
    pc.set_up(&A);
    pc.apply(&[1., 2., 3.], &mut z);
    assert_eq!(z, [1., 2., 3.]);
}
