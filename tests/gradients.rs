use approx::assert_relative_eq;
use pathgrad::{
    add, compute_gradients, compute_gradients_topo, divide, exponential, invert, multiply,
    natural_log, negate, sine, subtract, Term,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn add_gradients_are_one() {
    init_logger();
    for (x, y) in [(1., 2.), (-3.5, 0.), (1e9, -1e-9)] {
        let a = Term::new("a", x);
        let b = Term::new("b", y);
        let grads = compute_gradients(&add(&a, &b));
        assert_eq!(grads.get(&a), 1.);
        assert_eq!(grads.get(&b), 1.);
    }
}

#[test]
fn multiply_gradients_swap_values() {
    init_logger();
    for (x, y) in [(1., 2.), (-3.5, 0.), (7., 7.)] {
        let a = Term::new("a", x);
        let b = Term::new("b", y);
        let grads = compute_gradients(&multiply(&a, &b));
        assert_eq!(grads.get(&a), y);
        assert_eq!(grads.get(&b), x);
    }
}

#[test]
fn diamond() {
    init_logger();
    let a = Term::new("a", 2.);
    let f = add(&multiply(&a, &Term::new("b", 3.)), &a);
    assert_eq!(f.value(), 8.);
    let grads = compute_gradients(&f);
    assert_eq!(grads.get(&a), 4.);
    assert_eq!(grads.by_name("b"), Some(2.));
}

#[test]
fn diamond_through_shared_intermediate() {
    init_logger();
    let a = Term::new("a", 1.);
    let b = Term::new("b", 3.);
    let c = Term::new("c", 5.);
    let ab = add(&a, &b);
    let ac = add(&a, &c);
    let abac = add(&ab, &ac);

    let grads = compute_gradients(&abac);
    assert_eq!(grads.get(&a), 2.);
    assert_eq!(grads.get(&b), 1.);
    assert_eq!(grads.get(&c), 1.);
    assert_eq!(grads.get(&ab), 1.);
    assert_eq!(grads.get(&ac), 1.);
}

#[test]
fn sine_at_zero() {
    init_logger();
    let a = Term::new("a", 0.);
    let f = sine(&a);
    assert_eq!(f.value(), 0.);
    assert_eq!(compute_gradients(&f).get(&a), 1.);
}

#[test]
fn double_inversion_is_identity() {
    init_logger();
    for x in [0.3, -2., 17.] {
        let a = Term::new("a", x);
        let f = invert(&invert(&a));
        assert_relative_eq!(f.value(), x, epsilon = 1e-12);
        assert_relative_eq!(compute_gradients(&f).get(&a), 1., epsilon = 1e-12);
    }
}

#[test]
fn invert_zero_gives_negative_infinity() {
    init_logger();
    let z = Term::new("z", 0.);
    let b = Term::new("b", 2.);
    let f = multiply(&invert(&z), &b);
    let grads = compute_gradients(&f);
    assert_eq!(grads.get(&z), f64::NEG_INFINITY);
    assert_eq!(grads.get(&b), f64::INFINITY);

    let grads = compute_gradients(&invert(&z));
    assert_eq!(grads.get(&z), f64::NEG_INFINITY);
}

#[test]
fn nodes_off_the_path_are_zero() {
    init_logger();
    let a = Term::new("a", 1.);
    let b = Term::new("b", 2.);
    let side = exponential(&b);
    let f = negate(&a);
    let grads = compute_gradients(&f);
    assert!(!grads.contains(&b));
    assert!(!grads.contains(&side));
    assert_eq!(grads.get(&side), 0.);
    assert_eq!(grads.get(&a), -1.);
}

#[test]
fn derived_operators() {
    init_logger();
    let a = Term::new("a", 6.);
    let b = Term::new("b", 4.);

    let grads = compute_gradients(&subtract(&a, &b));
    assert_eq!(grads.get(&a), 1.);
    assert_eq!(grads.get(&b), -1.);

    let grads = compute_gradients(&divide(&a, &b));
    assert_relative_eq!(grads.get(&a), 0.25);
    assert_relative_eq!(grads.get(&b), -6. / 16.);
}

#[test]
fn chain_rule_through_transcendental_ops() {
    init_logger();
    // f = ln(exp(a) * sin(b))
    let a = Term::new("a", 0.5);
    let b = Term::new("b", 1.2);
    let f = natural_log(&multiply(&exponential(&a), &sine(&b)));
    assert_relative_eq!(f.value(), 0.5 + 1.2f64.sin().ln(), epsilon = 1e-12);

    let grads = compute_gradients(&f);
    assert_relative_eq!(grads.get(&a), 1., epsilon = 1e-12);
    assert_relative_eq!(grads.get(&b), 1.2f64.cos() / 1.2f64.sin(), epsilon = 1e-12);

    let topo = compute_gradients_topo(&f);
    assert_relative_eq!(topo.get(&a), grads.get(&a), epsilon = 1e-12);
    assert_relative_eq!(topo.get(&b), grads.get(&b), epsilon = 1e-12);
}

#[test]
fn gradients_match_finite_differences() {
    init_logger();
    let build = |x: f64, y: f64| {
        let a = Term::new("a", x);
        let b = Term::new("b", y);
        let ab = multiply(&a, &b);
        let f = divide(&add(&sine(&ab), &a), &exponential(&b));
        (a, b, f)
    };
    let (x, y) = (0.7, -0.4);
    let (a, b, f) = build(x, y);
    let grads = compute_gradients(&f);

    let h = 1e-6;
    let fd_a = (build(x + h, y).2.value() - build(x - h, y).2.value()) / (2. * h);
    let fd_b = (build(x, y + h).2.value() - build(x, y - h).2.value()) / (2. * h);
    assert_relative_eq!(grads.get(&a), fd_a, epsilon = 1e-6);
    assert_relative_eq!(grads.get(&b), fd_b, epsilon = 1e-6);
}
