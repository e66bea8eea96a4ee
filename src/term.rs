use std::{
    collections::HashSet,
    fmt::Display,
    hash::{Hash, Hasher},
    rc::Rc,
};

use crate::ops::Op;

#[derive(Debug)]
struct TermPayload {
    name: String,
    data: f64,
    /// `None` for leaf variables.
    op: Option<Op>,
    local_grads: Vec<(Term, f64)>,
}

/// A reference-counted handle to a node in the expression graph.
///
/// A `Term` is either a leaf variable created with [`Term::new`] or the
/// result of an operator such as [`crate::add`]. Both kinds share this type,
/// so any term can be used as an operand. Cloning a `Term` clones the handle,
/// not the node; equality and hashing follow node identity.
#[derive(Clone, Debug)]
pub struct Term(Rc<TermPayload>);

impl Term {
    /// Create a leaf variable.
    pub fn new(name: impl Into<String>, value: f64) -> Term {
        Self(Rc::new(TermPayload {
            name: name.into(),
            data: value,
            op: None,
            local_grads: vec![],
        }))
    }

    /// Create a computation node. `local_grads` must hold one entry per operand.
    pub(crate) fn from_op(
        name: String,
        op: Op,
        data: f64,
        local_grads: Vec<(Term, f64)>,
    ) -> Term {
        debug_assert_eq!(local_grads.len(), op.arity());
        Self(Rc::new(TermPayload {
            name,
            data,
            op: Some(op),
            local_grads,
        }))
    }

    pub fn value(&self) -> f64 {
        self.0.data
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The operator that produced this node, or `None` for a leaf.
    pub fn op(&self) -> Option<&Op> {
        self.0.op.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.0.op.is_none()
    }

    /// Operands of this node paired with the partial derivative of this
    /// node's value with respect to each, evaluated at construction time.
    pub fn local_grads(&self) -> &[(Term, f64)] {
        &self.0.local_grads
    }

    pub fn operands(&self) -> impl Iterator<Item = &Term> + '_ {
        self.0.local_grads.iter().map(|(term, _)| term)
    }

    /// A new node with the same value, operator and local gradients, but a
    /// different name. `self` is left untouched.
    pub fn renamed(&self, name: impl Into<String>) -> Term {
        Self(Rc::new(TermPayload {
            name: name.into(),
            data: self.0.data,
            op: self.0.op.clone(),
            local_grads: self.0.local_grads.clone(),
        }))
    }

    pub fn ptr_eq(&self, other: &Term) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.0.name, self.0.data)
    }
}

/// All terms reachable from `root`, each once, with operands ordered before
/// the nodes that use them. `root` is the last element.
pub(crate) fn topological_order(root: &Term) -> Vec<Term> {
    fn visit(term: &Term, visited: &mut HashSet<Term>, order: &mut Vec<Term>) {
        if visited.contains(term) {
            return;
        }
        visited.insert(term.clone());
        for operand in term.operands() {
            visit(operand, visited, order);
        }
        order.push(term.clone());
    }

    let mut visited = HashSet::new();
    let mut order = vec![];
    visit(root, &mut visited, &mut order);
    order
}
