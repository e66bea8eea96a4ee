//! A record of operator applications, for consumers that want to show how an
//! expression was built without touching gradients.
//!
//! A [`History`] is an ordinary value owned by the caller. Recording never
//! modifies the operands.

use log::trace;

use crate::{
    error::Result,
    ops::{apply, Op},
    term::{topological_order, Term},
};

/// One operator application.
#[derive(Clone, Debug)]
pub struct OpRecord {
    pub lhs: Term,
    /// `None` for unary operators.
    pub rhs: Option<Term>,
    pub op: Op,
    pub name: String,
    pub result: Term,
}

impl OpRecord {
    pub fn operands(&self) -> impl Iterator<Item = &Term> + '_ {
        std::iter::once(&self.lhs).chain(self.rhs.iter())
    }
}

#[derive(Clone, Debug, Default)]
pub struct History {
    records: Vec<OpRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the records of every computation node reachable from `root`,
    /// operands first. Derived operators show up as the primitive nodes they
    /// are made of.
    pub fn trace(root: &Term) -> Self {
        let records = topological_order(root)
            .into_iter()
            .filter_map(|term| {
                let op = term.op()?.clone();
                let (lhs, rhs) = {
                    let mut operands = term.operands().cloned();
                    (operands.next()?, operands.next())
                };
                Some(OpRecord {
                    lhs,
                    rhs,
                    op,
                    name: term.name().to_string(),
                    result: term,
                })
            })
            .collect();
        Self { records }
    }

    /// Apply `op` through the operator library and record the application as
    /// the caller made it, so `Sub` and `Div` are kept as such.
    pub fn apply(&mut self, op: Op, operands: &[&Term], name: Option<&str>) -> Result<Term> {
        let result = apply(&op, operands, name)?;
        let lhs = operands[0].clone();
        let rhs = operands.get(1).map(|term| (*term).clone());
        Ok(self.push(lhs, rhs, op, result))
    }

    fn push(&mut self, lhs: Term, rhs: Option<Term>, op: Op, result: Term) -> Term {
        trace!("history[{}]: {op} -> {}", self.records.len(), result.name());
        self.records.push(OpRecord {
            lhs,
            rhs,
            op,
            name: result.name().to_string(),
            result: result.clone(),
        });
        result
    }

    pub fn add(&mut self, lhs: &Term, rhs: &Term) -> Term {
        let result = crate::add(lhs, rhs);
        self.push(lhs.clone(), Some(rhs.clone()), Op::Add, result)
    }

    pub fn multiply(&mut self, lhs: &Term, rhs: &Term) -> Term {
        let result = crate::multiply(lhs, rhs);
        self.push(lhs.clone(), Some(rhs.clone()), Op::Mul, result)
    }

    pub fn subtract(&mut self, lhs: &Term, rhs: &Term) -> Term {
        let result = crate::subtract(lhs, rhs);
        self.push(lhs.clone(), Some(rhs.clone()), Op::Sub, result)
    }

    pub fn divide(&mut self, lhs: &Term, rhs: &Term) -> Term {
        let result = crate::divide(lhs, rhs);
        self.push(lhs.clone(), Some(rhs.clone()), Op::Div, result)
    }

    pub fn negate(&mut self, term: &Term) -> Term {
        let result = crate::negate(term);
        self.push(term.clone(), None, Op::Neg, result)
    }

    pub fn invert(&mut self, term: &Term) -> Term {
        let result = crate::invert(term);
        self.push(term.clone(), None, Op::Inv, result)
    }

    pub fn sine(&mut self, term: &Term) -> Term {
        let result = crate::sine(term);
        self.push(term.clone(), None, Op::Sin, result)
    }

    pub fn exponential(&mut self, term: &Term) -> Term {
        let result = crate::exponential(term);
        self.push(term.clone(), None, Op::Exp, result)
    }

    pub fn natural_log(&mut self, term: &Term) -> Term {
        let result = crate::natural_log(term);
        self.push(term.clone(), None, Op::Ln, result)
    }

    pub fn records(&self) -> &[OpRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OpRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&OpRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a OpRecord;
    type IntoIter = std::slice::Iter<'a, OpRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_gradients, error::GradError};

    #[test]
    fn records_caller_operations() {
        let a = Term::new("a", 2.);
        let b = Term::new("b", 3.);
        let mut history = History::new();
        let ab = history.multiply(&a, &b);
        let d = history.subtract(&ab, &a);
        let s = history.sine(&d);

        assert_eq!(history.len(), 3);
        let ops: Vec<Op> = history.iter().map(|rec| rec.op.clone()).collect();
        assert_eq!(ops, [Op::Mul, Op::Sub, Op::Sin]);

        let sub = &history.records()[1];
        assert_eq!(sub.lhs, ab);
        assert_eq!(sub.rhs.as_ref(), Some(&a));
        assert_eq!(sub.result, d);
        assert_eq!(sub.name, d.name());

        let last = history.last().unwrap();
        assert_eq!(last.result, s);
        assert!(last.rhs.is_none());
        assert_eq!(last.operands().count(), 1);
    }

    #[test]
    fn recording_does_not_change_results() {
        let a = Term::new("a", 2.);
        let b = Term::new("b", 3.);
        let mut history = History::new();
        let ab = history.multiply(&a, &b);
        let f = history.add(&ab, &a);
        assert_eq!(f.value(), 8.);
        let grads = compute_gradients(&f);
        assert_eq!(grads.get(&a), 4.);
        assert_eq!(grads.get(&b), 2.);
    }

    #[test]
    fn apply_records_named_result() {
        let a = Term::new("a", 4.);
        let mut history = History::new();
        let r = history.apply(Op::Div, &[&a, &a], Some("one")).unwrap();
        assert_eq!(r.name(), "one");
        assert_eq!(r.value(), 1.);
        assert_eq!(history.records()[0].name, "one");
        assert_eq!(history.records()[0].op, Op::Div);

        let err = history.apply(Op::Ln, &[&a, &a], None).unwrap_err();
        assert!(matches!(
            err,
            GradError::InvalidOperand {
                expected: 1,
                actual: 2,
                ..
            }
        ));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn trace_lists_primitive_nodes_once() {
        let a = Term::new("a", 2.);
        let b = Term::new("b", 3.);
        let ab = crate::multiply(&a, &b);
        let f = crate::subtract(&ab, &ab);
        let history = History::trace(&f);

        let ops: Vec<Op> = history.iter().map(|rec| rec.op.clone()).collect();
        assert_eq!(ops, [Op::Mul, Op::Neg, Op::Add]);
        assert_eq!(history.records()[0].result, ab);
        assert_eq!(history.records()[1].lhs, ab);
        assert_eq!(history.last().map(|rec| &rec.result), Some(&f));
        assert!(History::trace(&a).is_empty());
    }
}
