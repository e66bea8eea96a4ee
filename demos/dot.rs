//! Record how an expression is built and print it as a graphviz dot file.
//! Pipe the output to `dot -Tpng` to render it.

use pathgrad::{History, Term};

fn main() -> std::io::Result<()> {
    env_logger::init();

    let x = Term::new("x", 0.5);
    let y = Term::new("y", 2.);
    let mut history = History::new();
    let xy = history.multiply(&x, &y);
    let s = history.sine(&xy);
    let e = history.exponential(&x);
    let q = history.divide(&s, &e);
    history.subtract(&q, &y);

    history.dot(&mut std::io::stdout())?;

    let root = history.last().map(|rec| rec.result.clone());
    if let Some(root) = root {
        eprintln!("traced {} primitive nodes", History::trace(&root).len());
    }
    Ok(())
}
