#![allow(non_snake_case)]
use qpframe::algebra::*;
use qpframe::qp::QP;

fn main() {
    // Bound constrained QP solved by projected gradient steps using
    // the primitives of the box constraint handler.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let A = CscMatrix::from(&[
        [4., -1., 0.],  //
        [-1., 4., -1.], //
        [0., -1., 4.],  //
    ]);
    let b = vec![8., -4., 1.];

    let mut qp = QP::new(A, b).unwrap();
    qp.set_box(
        None,
        Some(SharedVector::from_slice(&[0., 0., 0.])),
        Some(SharedVector::from_slice(&[1., 1., 1.])),
    )
    .unwrap();

    let n = qp.dim();
    let (mut g, mut gf, mut gc, mut y) = (vec![0.; n], vec![0.; n], vec![0.; n], vec![0.; n]);
    let step = 0.2;

    for k in 0..200 {
        qp.compute_gradient(&mut g).unwrap();
        let qpc = qp.qpc().unwrap();
        qpc.grads(qp.solution(), &g, &mut gf, &mut gc).unwrap();

        let gnorm = gf.norm() + gc.norm();
        if gnorm < 1e-10 {
            println!("Converged after {} iterations", k);
            break;
        }

        // y = P(x - step*g)
        y.waxpby(1., qp.solution(), -step, &g);
        let mut px = vec![0.; n];
        qpc.project(&y, &mut px).unwrap();
        qp.set_initial_vector(&px).unwrap();
    }

    println!("Objective = {:.6}", qp.compute_objective());
    println!("Solution = {:?}", qp.solution());

    let mut out = std::io::stdout();
    qp.view(&mut out).unwrap();
    qp.qpc()
        .unwrap()
        .view_kkt(qp.solution(), qp.rhs().norm(), &mut out)
        .unwrap();
}
