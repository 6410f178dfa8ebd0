#![allow(non_snake_case)]

use qpframe::{
    algebra::*,
    ksp::*,
    qp::QP,
    qpc::{ConstraintHandler, ConstraintSettings},
    qps::*,
    QpError,
};

fn laplacian(n: usize) -> CscMatrix<f64> {
    // tridiagonal [-1 2 -1]
    let mut colptr = vec![0];
    let mut rowval = vec![];
    let mut nzval = vec![];
    for j in 0..n {
        if j > 0 {
            rowval.push(j - 1);
            nzval.push(-1.);
        }
        rowval.push(j);
        nzval.push(2.);
        if j + 1 < n {
            rowval.push(j + 1);
            nzval.push(-1.);
        }
        colptr.push(rowval.len());
    }
    CscMatrix::new(n, n, colptr, rowval, nzval)
}

fn residual(qp: &QP<f64>) -> f64 {
    let mut g = vec![0.; qp.dim()];
    qp.compute_gradient(&mut g).unwrap();
    g.norm()
}

#[test]
fn test_compatibility() {
    let mut qp = QP::new(laplacian(3), vec![1.; 3]).unwrap();
    let solver = QpSolver::new_ksp(QpSolverSettings::default());
    assert!(solver.is_qp_compatible(&qp));

    let handler = ConstraintHandler::new_box(
        None,
        Some(SharedVector::constant(3, 0.)),
        None,
        ConstraintSettings::default(),
    )
    .unwrap();
    qp.set_qpc(Some(handler)).unwrap();
    assert!(!solver.is_qp_compatible(&qp));

    qp.set_qpc(None).unwrap();
    assert!(solver.is_qp_compatible(&qp));

    qp.set_eq(Some(CscMatrix::from(&[[1., 1., 1.]])), Some(vec![1.]))
        .unwrap();
    assert!(!solver.is_qp_compatible(&qp));
}

#[test]
fn test_solve_unconstrained() {
    let n = 10;
    let qp = QP::new(laplacian(n), vec![1.; n]).unwrap();

    let settings = QpSolverSettingsBuilder::default()
        .rtol(1e-10)
        .build()
        .unwrap();
    let mut solver = QpSolver::new_ksp(settings);
    solver.set_qp(qp);
    let reason = solver.solve().unwrap();

    assert!(reason.is_converged());
    assert_eq!(solver.converged_reason(), reason);
    assert!(solver.iteration_number() <= 2 * n);
    assert!(residual(solver.qp().unwrap()) <= 1e-8);
}

#[test]
fn test_resolve_after_operator_change() {
    let n = 5;
    let qp = QP::new(laplacian(n), vec![1.; n]).unwrap();
    let mut solver = QpSolver::new_ksp(QpSolverSettings::default());
    solver.set_qp(qp);
    solver.set_up().unwrap();
    solver.solve().unwrap();

    // the new operator is picked up by the next solve
    let qp = solver.qp_mut().unwrap();
    qp.set_operator(CscMatrix::from_diagonal(&[2.; 5])).unwrap();
    qp.set_initial_vector(&[0.; 5]).unwrap();
    let op = std::sync::Arc::clone(qp.operator());

    let reason = solver.solve().unwrap();
    assert!(reason.is_converged());
    assert!(std::sync::Arc::ptr_eq(
        solver.ksp_linear_solver().unwrap().operator().unwrap(),
        &op
    ));
    for &xi in solver.qp().unwrap().solution() {
        assert!((xi - 0.5).abs() < 1e-6);
    }
}

#[test]
fn test_multiple_right_hand_sides() {
    let mut solver = QpSolver::new_ksp(QpSolverSettings::default());
    solver.set_qp(QP::new(CscMatrix::from_diagonal(&[4., 2.]), vec![4., 2.]).unwrap());
    solver.solve().unwrap();
    assert!(solver.qp().unwrap().solution().norm_inf_diff(&[1., 1.]) < 1e-8);

    let qp = solver.qp_mut().unwrap();
    qp.set_rhs(vec![8., -2.]).unwrap();
    solver.solve().unwrap();
    assert!(solver.qp().unwrap().solution().norm_inf_diff(&[2., -1.]) < 1e-8);
}

#[test]
fn test_linear_solver_accessors() {
    let mut solver = QpSolver::<f64>::new_ksp(QpSolverSettings::default());
    assert_eq!(solver.backend_name(), "ksp");
    assert_eq!(solver.ksp_type().unwrap(), KspType::CG);

    solver.ksp_set_type(KspType::Richardson).unwrap();
    assert_eq!(solver.ksp_type().unwrap(), KspType::Richardson);

    let mut ksp = Ksp::new();
    ksp.set_options_prefix("ignored_");
    solver.set_options_prefix("outer_");
    solver.ksp_set_linear_solver(ksp).unwrap();
    let ksp = solver.ksp_linear_solver().unwrap();
    assert_eq!(ksp.ksp_type(), KspType::CG);
    assert_eq!(ksp.options_prefix(), "outer_qps_");

    let mut out = Vec::new();
    solver.view_convergence(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "KSPType: cg\n");
}

#[test]
fn test_indefinite_operator_fails() {
    let A = CscMatrix::from(&[
        [1., 0.], //
        [0., -1.], //
    ]);
    let mut solver = QpSolver::new_ksp(QpSolverSettings::default());
    solver.set_qp(QP::new(A, vec![1., 2.]).unwrap());

    match solver.solve() {
        Err(QpError::LinearSolveFailure { reason }) => {
            assert_eq!(reason, ConvergedReason::DivergedIndefiniteMat);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_iteration_limit() {
    let n = 20;
    let settings = QpSolverSettingsBuilder::default()
        .max_it(2)
        .build()
        .unwrap();
    let mut solver = QpSolver::new_ksp(settings);
    solver.set_qp(QP::new(laplacian(n), vec![1.; n]).unwrap());

    let reason = solver.solve().unwrap();
    assert_eq!(reason, ConvergedReason::DivergedIts);
    assert_eq!(solver.iteration_number(), 2);
}

#[test]
fn test_options_select_preconditioner() {
    let mut solver = QpSolver::new_ksp(QpSolverSettings::default());
    solver.set_qp(QP::new(CscMatrix::from_diagonal(&[1., 10., 100.]), vec![1.; 3]).unwrap());

    let options = QpSolverOptions {
        ksp: KspOptionsBuilder::default()
            .pc_type(PcType::Jacobi)
            .build()
            .unwrap(),
        ..QpSolverOptions::default()
    };
    solver.set_from_options(&options).unwrap();
    let reason = solver.solve().unwrap();

    assert!(reason.is_converged());
    assert_eq!(solver.qp().unwrap().pc(), PcType::Jacobi);
    assert_eq!(solver.ksp_linear_solver().unwrap().pc_type(), PcType::Jacobi);
    // a diagonal operator is solved exactly by the Jacobi preconditioner
    assert!(solver.iteration_number() <= 1);
}

#[test]
fn test_view() {
    let solver = QpSolver::<f64>::new_ksp(
        QpSolverSettingsBuilder::default()
            .options_prefix("demo_".to_string())
            .build()
            .unwrap(),
    );
    let mut out = Vec::new();
    solver.view(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("QPS Object: (demo_)"));
    assert!(text.contains("KSP Object: (demo_qps_)"));
}
