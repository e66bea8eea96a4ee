//! Dependency graph in diamond shape. It reaches the same term twice, so the derivative should add up.

use pathgrad::{add, compute_gradients, multiply, Term};

fn main() {
    env_logger::init();

    let a = Term::new("a", 2.);
    let b = Term::new("b", 3.);
    let ab = multiply(&a, &b);
    let f = add(&ab, &a);

    let grads = compute_gradients(&f);
    println!("{f}");
    println!("df/da: {}", grads.get(&a));
    println!("df/db: {}", grads.get(&b));
    println!("df/d{}: {}", ab.name(), grads.get(&ab));
}
