#![allow(non_snake_case)]

#[cfg(feature = "serde")]
#[test]
fn test_json_io() {
    use qpframe::{algebra::*, ksp::*, qp::QP, qps::*};
    use std::io::{Seek, SeekFrom};

    let A = CscMatrix {
        m: 2,
        n: 2,
        colptr: vec![0, 2, 4],
        rowval: vec![0, 1, 0, 1],
        nzval: vec![4.0, 1.0, 1.0, 3.0],
    };
    let b = vec![1.0, 2.0];

    let mut qp = QP::new(A, b).unwrap();
    qp.set_pc(PcType::Jacobi);

    let mut solver = QpSolver::new_ksp(QpSolverSettings::default());
    solver.set_qp(qp.clone());
    solver.solve().unwrap();

    // write the problem to a file
    let mut file = tempfile::tempfile().unwrap();
    qp.write_to_file(&mut file).unwrap();

    // read the problem from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let qp2 = QP::<f64>::read_from_file(&mut file).unwrap();
    assert_eq!(qp2.pc(), PcType::Jacobi);

    let mut solver2 = QpSolver::new_ksp(QpSolverSettings::default());
    solver2.set_qp(qp2);
    solver2.solve().unwrap();
    assert_eq!(
        solver.qp().unwrap().solution(),
        solver2.qp().unwrap().solution()
    );

    // read the problem from the file with custom settings
    file.seek(SeekFrom::Start(0)).unwrap();
    let settings = QpSolverSettingsBuilder::default()
        .max_it(1)
        .build()
        .unwrap();
    let mut solver3 = QpSolver::new_ksp(settings);
    solver3.set_qp(QP::<f64>::read_from_file(&mut file).unwrap());
    assert_eq!(solver3.solve().unwrap(), ConvergedReason::DivergedIts);
}

#[cfg(feature = "serde")]
#[test]
fn test_json_io_bounds() {
    use qpframe::{algebra::*, qp::QP};
    use std::io::{Seek, SeekFrom};

    let mut qp = QP::new(CscMatrix::identity(3), vec![1.0; 3]).unwrap();
    qp.set_box(
        Some(IndexSet::new(vec![0, 2]).unwrap()),
        Some(SharedVector::from_slice(&[0.0, f64::NEG_INFINITY])),
        Some(SharedVector::from_slice(&[f64::INFINITY, 1.0])),
    )
    .unwrap();

    let mut file = tempfile::tempfile().unwrap();
    qp.write_to_file(&mut file).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let qp2 = QP::<f64>::read_from_file(&mut file).unwrap();

    let qpc = qp2.qpc().unwrap();
    assert_eq!(qpc.index_set().unwrap().indices(), &[0, 2]);
    let (lb, ub) = qpc.box_get().unwrap();
    assert_eq!(lb.unwrap().to_vec(), vec![0.0, f64::NEG_INFINITY]);
    assert_eq!(ub.unwrap().to_vec(), vec![f64::INFINITY, 1.0]);
}
