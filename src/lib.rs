//!  __qpframe__ provides the building blocks of iterative solvers for convex
//! quadratic programs
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T A x - b^T x\\\\\[2ex\]
//!  \text{subject to} & B_{eq} x = c_{eq} \\\\\[1ex\]
//!         & B_{ineq} x \le c_{ineq} \\\\\[1ex\]
//!         & l \le x \le u
//!  \end{array}
//! $$
//!
//! with a symmetric positive semidefinite operator $A$.
//!
//! ## Contents
//!
//! * __Constraint handlers__ ([`qpc`]): box constraints $l \le x \le u$
//! with optional one sided bounds, restricted to an optional index set.
//! Handlers provide the primitives used by active set and projected
//! gradient methods: projection, maximal feasible step, gradient splitting,
//! reduced gradients, constraint function values and KKT diagnostics.
//!
//! * __Problem container__ ([`qp`]): operator, right hand side, iterate,
//! constraint data and preconditioner choice, with JSON file I/O.
//!
//! * __Linear solvers__ ([`ksp`]): preconditioned conjugate gradient and
//! Richardson iteration with pluggable convergence tests.
//!
//! * __QP solvers__ ([`qps`]): a solver container with interchangeable
//! backends.  The KSP backend solves unconstrained problems by delegating to
//! a linear solver.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod error;
pub mod ksp;
pub mod qp;
pub mod qpc;
pub mod qps;

pub use error::{QpError, QpResult, SettingsError};

/// crate version
pub fn version() -> &'static str {
    VERSION
}
