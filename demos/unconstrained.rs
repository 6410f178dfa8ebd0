#![allow(non_snake_case)]
use qpframe::algebra::*;
use qpframe::qp::QP;
use qpframe::qps::*;

fn main() {
    // Unconstrained QP solved by a linear solver.  Set RUST_LOG=debug
    // to see the solver events.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let A = CscMatrix::new(
        3,                                    // m
        3,                                    // n
        vec![0, 2, 5, 7],                     // colptr
        vec![0, 1, 0, 1, 2, 1, 2],            // rowval
        vec![4., -1., -1., 4., -1., -1., 4.], // nzval
    );
    let b = vec![1., 2., 3.];

    let qp = QP::new(A, b).unwrap();

    let settings = QpSolverSettingsBuilder::default()
        .rtol(1e-10)
        .build()
        .unwrap();
    let mut solver = QpSolver::new_ksp(settings);
    assert!(solver.is_qp_compatible(&qp));
    solver.set_qp(qp);

    let reason = solver.solve().unwrap();

    let mut out = std::io::stdout();
    solver.view(&mut out).unwrap();
    solver.view_convergence(&mut out).unwrap();
    println!("Reason = {}", reason);
    println!("Iterations = {}", solver.iteration_number());
    println!("Solution = {:?}", solver.qp().unwrap().solution());
}
