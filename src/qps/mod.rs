//! QP solvers.
//!
//! A [`QpSolver`] owns a problem and a [`QpSolverBackend`] that performs
//! the actual iteration.  The backend reports progress through a shared
//! [`ConvergenceMonitor`] and consults the solver's convergence test once
//! per iteration.  [`KspAdapter`] is the backend for problems without
//! constraints, delegating to a [`Ksp`](crate::ksp::Ksp) linear solver.

mod kspadapter;
mod monitor;
mod settings;
mod solver;
mod traits;

pub use kspadapter::*;
pub use monitor::*;
pub use settings::*;
pub use solver::*;
pub use traits::*;
