#![allow(non_snake_case)]

use qpframe::{algebra::*, qpc::*, QpError};

fn box_handler(lb: Option<&[f64]>, ub: Option<&[f64]>) -> ConstraintHandler<f64> {
    ConstraintHandler::new_box(
        None,
        lb.map(SharedVector::from_slice),
        ub.map(SharedVector::from_slice),
        ConstraintSettings::default(),
    )
    .unwrap()
}

#[test]
fn test_box_project_unit_box() {
    let qpc = box_handler(Some(&[0., 0., 0.]), Some(&[1., 1., 1.]));

    let mut px = [0.; 3];
    qpc.project(&[-0.5, 0.5, 1.5], &mut px).unwrap();
    assert_eq!(px, [0., 0.5, 1.]);
}

#[test]
fn test_box_grads_active_lower() {
    let qpc = box_handler(Some(&[0.]), None);

    let (mut gf, mut gc) = ([0.], [0.]);
    qpc.grads(&[0.], &[-1.], &mut gf, &mut gc).unwrap();
    assert_eq!(gf, [0.]);
    assert_eq!(gc, [-1.]);
}

#[test]
fn test_box_feas_one_sided() {
    // only the lower bound limits a step along a positive direction
    let qpc = box_handler(None, Some(&[2.]));
    assert_eq!(qpc.feas(&[1.], &[3.]).unwrap(), f64::INFINITY);

    let qpc = box_handler(Some(&[-1.]), None);
    assert_eq!(qpc.feas(&[1.], &[-3.]).unwrap(), f64::INFINITY);
    assert_eq!(qpc.feas(&[1.], &[4.]).unwrap(), 0.5);
}

#[test]
fn test_box_no_bounds_fails() {
    let res = ConstraintHandler::<f64>::new_box(None, None, None, ConstraintSettings::default());
    assert!(matches!(res, Err(QpError::InvalidArgument(_))));
}

#[test]
fn test_box_bounds_ordering() {
    let settings = ConstraintSettingsBuilder::<f64>::default()
        .bounds_check(BoundsCheck::Enabled)
        .build()
        .unwrap();
    let res = ConstraintHandler::new_box(
        None,
        Some(SharedVector::from_slice(&[0., 2.])),
        Some(SharedVector::from_slice(&[1., 1.])),
        settings,
    );
    assert!(matches!(res, Err(QpError::IncompatibleArgument(_))));

    // unchecked construction accepts the crossed bounds
    let settings = ConstraintSettingsBuilder::<f64>::default()
        .bounds_check(BoundsCheck::Disabled)
        .build()
        .unwrap();
    let res = ConstraintHandler::new_box(
        None,
        Some(SharedVector::from_slice(&[0., 2.])),
        Some(SharedVector::from_slice(&[1., 1.])),
        settings,
    );
    assert!(res.is_ok());
}

#[test]
fn test_box_set_get_shares_vectors() {
    let mut qpc = box_handler(Some(&[0., 0.]), None);
    qpc.set_up();

    let lb = SharedVector::from_slice(&[-1., -1.]);
    let ub = SharedVector::from_slice(&[1., 1.]);
    qpc.box_set(Some(lb.clone()), Some(ub.clone())).unwrap();

    let (lb2, ub2) = qpc.box_get().unwrap();
    assert!(SharedVector::ptr_eq(&lb, lb2.unwrap()));
    assert!(SharedVector::ptr_eq(&ub, ub2.unwrap()));

    // caller side modifications are seen by the handler
    lb.assign(&[0., 0.]);
    let mut px = [0.; 2];
    qpc.project(&[-0.5, 0.5], &mut px).unwrap();
    assert_eq!(px, [0., 0.5]);

    // multipliers are fresh and not yet computed
    let (llb, lub) = qpc.box_multipliers().unwrap();
    assert!(!llb.unwrap().is_valid());
    assert!(!lub.unwrap().is_valid());

    // a failed replacement leaves the bounds untouched
    assert!(qpc.box_set(None, None).is_err());
    let (lb2, _) = qpc.box_get().unwrap();
    assert!(SharedVector::ptr_eq(&lb, lb2.unwrap()));
}

#[test]
fn test_box_dropping_handler_releases_bounds() {
    let lb = SharedVector::from_slice(&[0., 0.]);
    let qpc = ConstraintHandler::new_box(
        None,
        Some(lb.clone()),
        None,
        ConstraintSettings::default(),
    )
    .unwrap();
    assert_eq!(lb.reference_count(), 2);
    drop(qpc);
    assert_eq!(lb.reference_count(), 1);
}

#[test]
fn test_box_constraint_function() {
    let mut qpc = box_handler(Some(&[0., 0., f64::NEG_INFINITY]), Some(&[2., 2., 1.]));

    // midpoint, boundary, and a one-sided component
    let hx = qpc.constraint_function(&[1., 2., 3.]).unwrap();
    assert_eq!(hx, &[-1., 0., 2.]);

    let mut qpc = box_handler(Some(&[1.]), None);
    assert_eq!(qpc.constraint_function(&[3.]).unwrap(), &[-2.]);
    assert_eq!(qpc.constraint_function(&[0.]).unwrap(), &[1.]);
}

#[test]
fn test_box_index_set() {
    let is = IndexSet::new(vec![1, 3]).unwrap();
    let qpc = ConstraintHandler::new_box(
        Some(is),
        Some(SharedVector::from_slice(&[0., 0.])),
        Some(SharedVector::from_slice(&[1., 1.])),
        ConstraintSettings::default(),
    )
    .unwrap();
    assert_eq!(qpc.num_constraints(), 2);
    assert!(qpc.fits(4));
    assert!(!qpc.fits(3));

    let x = [-5., -5., 5., 5.];
    let mut px = [0.; 4];
    qpc.project(&x, &mut px).unwrap();
    assert_eq!(px, [-5., 0., 5., 1.]);

    // unconstrained components never limit the step
    let α = qpc.feas(&[0.5, 0.5, 0.5, 0.5], &[1., 0., 1., -1.]).unwrap();
    assert_eq!(α, 0.5);

    let (mut gf, mut gc) = ([0.; 4], [0.; 4]);
    let x = [0., 0., 0., 1.];
    let g = [-1., -1., 2., -2.];
    qpc.grads(&x, &g, &mut gf, &mut gc).unwrap();
    assert_eq!(gf, [-1., 0., 2., 0.]);
    assert_eq!(gc, [0., -1., 0., 0.]);

    let mut short = [0.; 3];
    assert!(matches!(
        qpc.project(&[0.; 3], &mut short),
        Err(QpError::IncompatibleArgument(_))
    ));
}

#[test]
fn test_box_grad_reduced() {
    let qpc = box_handler(Some(&[0., 0.]), Some(&[1., 1.]));
    let x = [0.5, 0.5];
    let gf = [2., -2.];
    let mut gr = gf;
    qpc.grad_reduced(&x, &gf, 1., &mut gr).unwrap();
    assert_eq!(gr, [0.5, -0.5]);

    assert!(matches!(
        qpc.grad_reduced(&x, &gf, 0., &mut gr),
        Err(QpError::InvalidArgument(_))
    ));
}

#[test]
fn test_box_view_kkt() {
    let qpc = box_handler(Some(&[0., f64::NEG_INFINITY]), Some(&[1., 1.]));
    let x = [-1., 0.5];

    let mut out = Vec::new();
    qpc.view_kkt(&x, 2., &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("r = ||min(x-lb,0)||      = 1.00e0    r/||b|| = 5.00e-1"));
    assert!(text.contains("r = ||min(lambda_lb,0)|| = not computed"));

    // write multipliers and look again
    let (llb, lub) = qpc.box_multipliers().unwrap();
    llb.unwrap().assign(&[-3., 4.]);
    lub.unwrap().assign(&[0., 0.]);

    let res = qpc.constraint().as_box().unwrap().kkt_residuals(&x);
    let lower = res.lower.unwrap();
    assert_eq!(lower.multiplier_sign, Some(3.));
    // the infinite lower bound does not contribute
    assert_eq!(lower.complementarity, Some(3.));
    let upper = res.upper.unwrap();
    assert_eq!(upper.infeasibility, 0.);
    assert_eq!(upper.complementarity, Some(0.));
}

#[test]
fn test_box_view() {
    let qpc = box_handler(Some(&[0.]), None);
    let mut out = Vec::new();
    qpc.view(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("QPC Object: type box"));
    assert!(text.contains("number of constraints: 1"));
    assert!(qpc.is_linear());
    assert!(qpc.is_subsymmetric());
    assert_eq!(qpc.block_size(), 1);
}
