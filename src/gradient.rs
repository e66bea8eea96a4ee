//! Reverse-mode accumulation of gradients over the expression graph.
//! See https://rufflewind.com/2016-12-30/reverse-mode-automatic-differentiation

use std::collections::HashMap;

use log::{debug, trace};

use crate::term::{topological_order, Term};

/// Total derivatives of a root term with respect to the terms it depends on.
///
/// Terms that do not influence the root have a derivative of 0 and are not
/// stored. The map holds a handle to every key, so the keyed nodes stay alive
/// as long as the map does.
#[derive(Clone, Debug, Default)]
pub struct GradientMap {
    grads: HashMap<Term, f64>,
}

impl GradientMap {
    /// The derivative with respect to `term`, 0 if `term` is not reachable.
    pub fn get(&self, term: &Term) -> f64 {
        self.grads.get(term).copied().unwrap_or(0.)
    }

    pub fn contains(&self, term: &Term) -> bool {
        self.grads.contains_key(term)
    }

    /// The sum of the derivatives of all terms named `name`, or `None` if no
    /// such term was reached.
    pub fn by_name(&self, name: &str) -> Option<f64> {
        self.grads
            .iter()
            .filter(|(term, _)| term.name() == name)
            .map(|(_, grad)| *grad)
            .reduce(|acc, grad| acc + grad)
    }

    pub fn len(&self) -> usize {
        self.grads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, f64)> + '_ {
        self.grads.iter().map(|(term, grad)| (term, *grad))
    }

    fn accumulate(&mut self, term: &Term, grad: f64) {
        *self.grads.entry(term.clone()).or_insert(0.) += grad;
    }
}

/// How [`compute_gradients_with`] walks the graph. Both produce the same map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Depth-first walk of every path from the root. Shared subgraphs are
    /// visited once per path, which is exponential in the worst case.
    #[default]
    Recursive,
    /// Visit each node once in reverse topological order.
    Topological,
}

/// Compute the derivative of `root` with respect to every term it depends on.
pub fn compute_gradients(root: &Term) -> GradientMap {
    debug!("compute_gradients: root {}", root.name());
    let mut grads = GradientMap::default();
    backprop_rec(root, 1., &mut grads);
    debug!("compute_gradients: {} entries", grads.len());
    grads
}

fn backprop_rec(term: &Term, path: f64, grads: &mut GradientMap) {
    for (operand, local) in term.local_grads() {
        let grad = path * local;
        trace!("{} -> {}: {grad}", term.name(), operand.name());
        grads.accumulate(operand, grad);
        backprop_rec(operand, grad, grads);
    }
}

/// Same as [`compute_gradients`], but sums the incoming path weights of each
/// node before propagating them, so every node is expanded only once.
pub fn compute_gradients_topo(root: &Term) -> GradientMap {
    debug!("compute_gradients_topo: root {}", root.name());
    let order = topological_order(root);
    let mut grads = GradientMap::default();
    for term in order.iter().rev() {
        // The root is never an operand, so it is never in the map.
        let path = if term == root { 1. } else { grads.get(term) };
        for (operand, local) in term.local_grads() {
            let grad = path * local;
            trace!("{} -> {}: {grad}", term.name(), operand.name());
            grads.accumulate(operand, grad);
        }
    }
    debug!("compute_gradients_topo: {} entries", grads.len());
    grads
}

pub fn compute_gradients_with(root: &Term, propagation: Propagation) -> GradientMap {
    match propagation {
        Propagation::Recursive => compute_gradients(root),
        Propagation::Topological => compute_gradients_topo(root),
    }
}

impl Term {
    /// One-time derivation of `self` with respect to `wrt`.
    pub fn derive(&self, wrt: &Term) -> f64 {
        self.derive_rec(wrt).unwrap_or(0.)
    }

    /// `None` if `wrt` is not reachable, so that an infinite local gradient
    /// on an unrelated branch does not turn into `inf * 0 = NaN`.
    fn derive_rec(&self, wrt: &Term) -> Option<f64> {
        if self == wrt {
            return Some(1.);
        }
        self.local_grads()
            .iter()
            .filter_map(|(operand, local)| operand.derive_rec(wrt).map(|grad| local * grad))
            .reduce(|acc, grad| acc + grad)
    }
}
