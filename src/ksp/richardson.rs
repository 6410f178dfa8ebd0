#![allow(non_snake_case)]

use super::*;

// Preconditioned Richardson iteration  x += ω*M*(b - A*x)
pub(super) fn solve<T: FloatT>(
    ksp: &mut Ksp<T>,
    A: &CscMatrix<T>,
    b: &[T],
    x: &mut [T],
) -> (usize, T, ConvergedReason) {
    let n = b.len();
    let norm_type = ksp.norm_type();
    let ω = ksp.richardson_scale();

    let mut r = vec![T::zero(); n];
    let mut z = vec![T::zero(); n];
    let mut i = 0;
    let mut rnorm0 = T::zero();

    let (rnorm, reason) = loop {
        // r = b - A*x
        r.copy_from(b);
        A.gemv(&mut r, x, -T::one(), T::one());
        ksp.precondition(&r, &mut z);

        let rnorm = norm_type.measure(&r, &z);
        if i == 0 {
            rnorm0 = rnorm;
        }

        let reason = ksp.test_convergence(i, rnorm, rnorm0);
        if reason != ConvergedReason::Iterating {
            break (rnorm, reason);
        }

        x.axpby(ω, &z, T::one());
        i += 1;
    };

    (i, rnorm, reason)
}
