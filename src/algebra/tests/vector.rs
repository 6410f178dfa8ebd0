use crate::algebra::*;

#[test]
fn test_copy_from() {
    let x = vec![3., 0., 2., 1.];
    let mut y = vec![0.; 4];
    y.copy_from(&x);
    assert_eq!(x, y);
}

#[test]
fn test_scalarop() {
    let mut x = vec![3., 0., 2., 1.];
    x.scalarop(|x| -2. * x);
    assert_eq!(x, vec![-6., 0., -4., -2.]);
}

#[test]
fn test_scalarop_from() {
    let x: Vec<f64> = vec![3., 0., 2., 1.];
    let mut y: Vec<f64> = vec![0.; 4];
    y.scalarop_from(|x| -2. * x, &x);
    assert_eq!(y, vec![-6., 0., -4., -2.]);
}

#[test]
fn test_set_scale_negate() {
    let mut x = vec![1., 2., 3.];
    x.scale(2.);
    assert_eq!(x, vec![2., 4., 6.]);
    x.negate();
    assert_eq!(x, vec![-2., -4., -6.]);
    x.set(1.5);
    assert_eq!(x, vec![1.5; 3]);
}

#[test]
fn test_hadamard() {
    let mut x = vec![1., -2., 3., -4.];
    let y = vec![4., -3., 2., -1.];
    x.hadamard(&y);
    assert_eq!(x, [4., 6., 6., 4.]);
}

#[test]
fn test_pointwise_max_min() {
    let x = [1., -2., f64::INFINITY, 0.];
    let lb = [0., 0., 0., f64::NEG_INFINITY];
    let ub = [0.5, 1., 4., 2.];

    let mut p = [0.; 4];
    p.pointwise_max(&x, &lb);
    assert_eq!(p, [1., 0., f64::INFINITY, 0.]);

    let q = p;
    p.pointwise_min(&q, &ub);
    assert_eq!(p, [0.5, 0., 4., 0.]);
}

#[test]
fn test_dot() {
    let x = vec![1., -2., 3., -4.];
    let y = vec![4., -3., 2., -1.];
    assert_eq!(x.dot(&y), 20.);
}

#[test]
fn test_sum_and_norms() {
    let x = [-3., 4., 0.];
    assert_eq!(x.sum(), 1.);
    assert_eq!(x.sumsq(), 25.);
    assert_eq!(x.norm(), 5.);
    assert_eq!(x.norm_inf(), 4.);
    assert!([1., f64::NAN].norm_inf().is_nan());
    assert_eq!(x.norm_inf_diff(&[-1., 4., 1.]), 2.);
}

#[test]
fn test_pairwise_sum_long() {
    // long enough to exercise the recursive accumulator
    let x: Vec<f64> = (1..=100).map(|i| i as f64).collect();
    assert_eq!(x.sum(), 5050.);
}

#[test]
fn test_minimum_maximum() {
    let x = [3., -1., 7., 2.];
    assert_eq!(x.minimum(), -1.);
    assert_eq!(x.maximum(), 7.);
}

#[test]
fn test_is_finite() {
    assert!([1., 2.].is_finite());
    assert!(![1., f64::INFINITY].is_finite());
    assert!(![f64::NAN, 2.].is_finite());
}

#[test]
fn test_axpby() {
    let x = vec![1., -2., 3., -4.];
    let mut y = vec![4., -3., 2., -1.];
    y.axpby(2., &x, -1.);
    assert_eq!(y, [-2., -1., 4., -7.]);
}

#[test]
fn test_waxpby() {
    let x = vec![1., -2., 3., -4.];
    let y = vec![4., -3., 2., -1.];
    let mut w = vec![0.; 4];
    w.waxpby(2., &x, -1., &y);
    assert_eq!(w, [-2., -1., 4., -7.]);
}
