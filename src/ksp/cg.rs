#![allow(non_snake_case)]

use super::*;

// Preconditioned conjugate gradient.  Returns the number of completed
// iterations, the last residual norm and the stopping reason.
pub(super) fn solve<T: FloatT>(
    ksp: &mut Ksp<T>,
    A: &CscMatrix<T>,
    b: &[T],
    x: &mut [T],
) -> (usize, T, ConvergedReason) {
    let n = b.len();
    let norm_type = ksp.norm_type();

    // r = b - A*x
    let mut r = b.to_vec();
    A.gemv(&mut r, x, -T::one(), T::one());

    let mut z = vec![T::zero(); n];
    let mut q = vec![T::zero(); n];
    ksp.precondition(&r, &mut z);
    let mut p = z.clone();
    let mut ρ = r.dot(&z);

    let mut rnorm = norm_type.measure(&r, &z);
    let rnorm0 = rnorm;
    let mut i = 0;

    let reason = loop {
        let reason = ksp.test_convergence(i, rnorm, rnorm0);
        if reason != ConvergedReason::Iterating {
            break reason;
        }

        // q = A*p
        A.gemv(&mut q, &p, T::one(), T::zero());
        let pAp = p.dot(&q);

        if !pAp.is_finite() || !ρ.is_finite() {
            break ConvergedReason::DivergedNanOrInf;
        }
        if pAp < T::zero() {
            break ConvergedReason::DivergedIndefiniteMat;
        }
        if pAp == T::zero() || ρ <= T::zero() {
            break ConvergedReason::DivergedBreakdown;
        }

        let α = ρ / pAp;
        x.axpby(α, &p, T::one());
        r.axpby(-α, &q, T::one());

        ksp.precondition(&r, &mut z);
        let ρnew = r.dot(&z);
        let β = ρnew / ρ;
        ρ = ρnew;

        // p = z + β*p
        p.axpby(T::one(), &z, β);

        rnorm = norm_type.measure(&r, &z);
        i += 1;
    };

    (i, rnorm, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn spd() -> CscMatrix<f64> {
        CscMatrix::from(&[
            [4., -1., 0.],  //
            [-1., 4., -1.], //
            [0., -1., 2.],  //
        ])
    }

    #[test]
    fn test_cg_solves_spd() {
        let A = spd();
        let xsol = [1., 2., 3.];
        let mut b = [0.; 3];
        A.gemv(&mut b, &xsol, 1., 0.);

        for pc in [PcType::None, PcType::Jacobi] {
            let mut ksp = Ksp::new();
            ksp.set_operators(Arc::new(spd()));
            ksp.set_pc_type(pc);
            ksp.set_tolerances(Tolerances {
                rtol: 1e-12,
                ..Tolerances::default()
            });
            let mut x = [0.; 3];
            let reason = ksp.solve(&b, &mut x).unwrap();
            assert!(reason.is_converged());
            // exact arithmetic converges in n iterations
            assert!(ksp.iteration_number() <= 4);
            assert!(x.norm_inf_diff(&xsol) < 1e-9);
        }
    }

    #[test]
    fn test_cg_nonzero_initial_guess() {
        let A = spd();
        let xsol = [1., -1., 0.5];
        let mut b = [0.; 3];
        A.gemv(&mut b, &xsol, 1., 0.);

        let mut ksp = Ksp::new();
        ksp.set_operators(Arc::new(spd()));
        ksp.set_initial_guess_nonzero(true);
        let mut x = xsol;
        ksp.solve(&b, &mut x).unwrap();
        assert_eq!(ksp.iteration_number(), 0);
        assert_eq!(x, xsol);
    }

    #[test]
    fn test_cg_indefinite() {
        let A = CscMatrix::from(&[
            [1., 0.],  //
            [0., -1.], //
        ]);
        let mut ksp = Ksp::new();
        ksp.set_operators(Arc::new(A));
        let mut x = [0.; 2];
        let reason = ksp.solve(&[0., 1.], &mut x).unwrap();
        assert_eq!(reason, ConvergedReason::DivergedIndefiniteMat);
        assert!(reason.is_numerical_failure());
    }

    #[test]
    fn test_cg_iteration_limit() {
        let mut ksp = Ksp::new();
        ksp.set_operators(Arc::new(spd()));
        ksp.set_tolerances(Tolerances {
            rtol: 0.0,
            atol: 0.0,
            max_it: 1,
            ..Tolerances::default()
        });
        let mut x = [0.; 3];
        let reason = ksp.solve(&[1., 2., 3.], &mut x).unwrap();
        assert_eq!(reason, ConvergedReason::DivergedIts);
        assert_eq!(ksp.iteration_number(), 1);
    }
}
