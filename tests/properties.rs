use proptest::prelude::*;
use qpframe::{algebra::*, qpc::*};

// (lower bound, width, point in [0,1] relative to the box, direction, gradient)
fn component() -> impl Strategy<Value = (f64, f64, f64, f64, f64)> {
    (
        -10.0..10.0f64,
        0.0..5.0f64,
        0.0..=1.0f64,
        -3.0..3.0f64,
        -3.0..3.0f64,
    )
}

struct Case {
    lb: Vec<f64>,
    ub: Vec<f64>,
    x: Vec<f64>,
    d: Vec<f64>,
    g: Vec<f64>,
}

fn case(components: Vec<(f64, f64, f64, f64, f64)>) -> Case {
    let mut c = Case {
        lb: vec![],
        ub: vec![],
        x: vec![],
        d: vec![],
        g: vec![],
    };
    for (l, w, t, d, g) in components {
        c.lb.push(l);
        c.ub.push(l + w);
        c.x.push(l + t * w);
        c.d.push(d);
        c.g.push(g);
    }
    c
}

fn handler(c: &Case) -> ConstraintHandler<f64> {
    ConstraintHandler::new_box(
        None,
        Some(SharedVector::from_slice(&c.lb)),
        Some(SharedVector::from_slice(&c.ub)),
        ConstraintSettings::default(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn projection_is_idempotent(
        components in prop::collection::vec(component(), 1..8),
        shift in prop::collection::vec(-20.0..20.0f64, 8),
    ) {
        let c = case(components);
        let qpc = handler(&c);
        let n = c.x.len();

        // perturb the feasible point so that some components leave the box
        let y: Vec<f64> = c.x.iter().zip(&shift).map(|(x, s)| x + s).collect();
        let mut p = vec![0.; n];
        qpc.project(&y, &mut p).unwrap();
        for i in 0..n {
            prop_assert!(c.lb[i] <= p[i] && p[i] <= c.ub[i]);
            if c.lb[i] <= y[i] && y[i] <= c.ub[i] {
                prop_assert_eq!(p[i], y[i]);
            }
        }

        let mut pp = vec![0.; n];
        qpc.project(&p, &mut pp).unwrap();
        prop_assert_eq!(pp, p);
    }

    #[test]
    fn feasible_step_is_tight(components in prop::collection::vec(component(), 1..8)) {
        let c = case(components);
        let qpc = handler(&c);
        let α = qpc.feas(&c.x, &c.d).unwrap();
        prop_assert!(α >= 0.);

        if α.is_infinite() {
            prop_assert!(c.d.iter().all(|&d| d == 0.));
            return Ok(());
        }

        let tol = 1e-9;
        let mut hits_bound = false;
        for i in 0..c.x.len() {
            let xn = c.x[i] - α * c.d[i];
            let scale = 1. + c.lb[i].abs() + c.ub[i].abs();
            prop_assert!(xn >= c.lb[i] - tol * scale);
            prop_assert!(xn <= c.ub[i] + tol * scale);
            if c.d[i] != 0. && ((xn - c.lb[i]).abs() <= tol * scale || (xn - c.ub[i]).abs() <= tol * scale) {
                hits_bound = true;
            }
        }
        prop_assert!(hits_bound);
    }

    #[test]
    fn gradient_split_partitions(components in prop::collection::vec(component(), 1..8)) {
        let c = case(components);
        let qpc = handler(&c);
        let n = c.x.len();
        let astol = qpc.astol();

        // put two of every three components on a bound
        let x: Vec<f64> = (0..n)
            .map(|i| match i % 3 {
                0 => c.lb[i],
                1 => c.ub[i],
                _ => c.x[i],
            })
            .collect();

        let (mut gf, mut gc) = (vec![f64::NAN; n], vec![f64::NAN; n]);
        qpc.grads(&x, &c.g, &mut gf, &mut gc).unwrap();

        for i in 0..n {
            let at_lower = (x[i] - c.lb[i]).abs() <= astol;
            let at_upper = (x[i] - c.ub[i]).abs() <= astol;
            if at_lower {
                prop_assert_eq!(gf[i], 0.);
                prop_assert_eq!(gc[i], c.g[i].min(0.));
            } else if at_upper {
                prop_assert_eq!(gf[i], 0.);
                prop_assert_eq!(gc[i], c.g[i].max(0.));
            } else {
                prop_assert_eq!(gf[i], c.g[i]);
                prop_assert_eq!(gc[i], 0.);
            }
            // a component is never counted twice
            prop_assert!(gf[i] == 0. || gc[i] == 0.);
        }
    }

    #[test]
    fn lower_bound_only_projection(
        lb in prop::collection::vec(-5.0..5.0f64, 1..8),
        x in prop::collection::vec(-10.0..10.0f64, 8),
    ) {
        let n = lb.len();
        let qpc = ConstraintHandler::new_box(
            None,
            Some(SharedVector::from_slice(&lb)),
            None,
            ConstraintSettings::default(),
        )
        .unwrap();
        let mut p = vec![0.; n];
        qpc.project(&x[..n], &mut p).unwrap();
        for i in 0..n {
            prop_assert_eq!(p[i], x[i].max(lb[i]));
        }
    }
}
