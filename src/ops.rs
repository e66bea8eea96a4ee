//! The operator library.
//!
//! Every operator evaluates its result immediately and records the partial
//! derivative of the result with respect to each operand. Domains are not
//! checked: `invert` of zero gives `inf`, `natural_log` of a negative number
//! gives `NaN`, and so on, exactly as `f64` arithmetic does.

use std::{
    fmt::{Debug, Display},
    rc::Rc,
};

use crate::{
    error::{GradError, Result},
    term::Term,
    unary_fn::{Exponential, NaturalLog, PtrUnaryFn, Sine},
    UnaryFn,
};

/// Identity of an operator.
///
/// `Sub` and `Div` are derived operators: the node they produce is an `Add`
/// over a `Neg`, or a `Mul` over an `Inv`.
#[derive(Clone)]
pub enum Op {
    Add,
    Mul,
    Neg,
    Inv,
    Sub,
    Div,
    Sin,
    Exp,
    Ln,
    /// A user-supplied unary function, see [`apply_fn`].
    Custom(Rc<dyn UnaryFn>),
}

impl Op {
    pub fn arity(&self) -> usize {
        use Op::*;
        match self {
            Add | Mul | Sub | Div => 2,
            Neg | Inv | Sin | Exp | Ln | Custom(_) => 1,
        }
    }

    /// Whether nodes produced by this operator carry it as their own `op`.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Op::Sub | Op::Div)
    }

    pub fn name(&self) -> String {
        use Op::*;
        match self {
            Add => "add".to_string(),
            Mul => "mul".to_string(),
            Neg => "neg".to_string(),
            Inv => "inv".to_string(),
            Sub => "sub".to_string(),
            Div => "div".to_string(),
            Sin => Sine.name(),
            Exp => Exponential.name(),
            Ln => NaturalLog.name(),
            Custom(f) => f.name(),
        }
    }

    #[cfg(feature = "expr_name")]
    fn symbol(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Mul => "*",
            Op::Sub => "-",
            Op::Div => "/",
            _ => "?",
        }
    }
}

impl Debug for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Custom(func) => write!(f, "Custom({:?})", func.name()),
            _ => write!(f, "{}", self.name()),
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Custom functions compare by name.
impl PartialEq for Op {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Op::Custom(lhs), Op::Custom(rhs)) => lhs.name() == rhs.name(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

#[cfg(feature = "expr_name")]
fn auto_name(op: &Op, operands: &[&Term]) -> String {
    match operands {
        [a] => match op {
            Op::Neg => format!("(-{})", a.name()),
            Op::Inv => format!("(1 / {})", a.name()),
            _ => format!("{}({})", op.name(), a.name()),
        },
        [a, b] => format!("({} {} {})", a.name(), op.symbol(), b.name()),
        _ => op.name(),
    }
}

#[cfg(not(feature = "expr_name"))]
fn auto_name(op: &Op, _operands: &[&Term]) -> String {
    op.name()
}

fn add_term(lhs: &Term, rhs: &Term, name: String) -> Term {
    Term::from_op(
        name,
        Op::Add,
        lhs.value() + rhs.value(),
        vec![(lhs.clone(), 1.), (rhs.clone(), 1.)],
    )
}

fn mul_term(lhs: &Term, rhs: &Term, name: String) -> Term {
    Term::from_op(
        name,
        Op::Mul,
        lhs.value() * rhs.value(),
        vec![(lhs.clone(), rhs.value()), (rhs.clone(), lhs.value())],
    )
}

fn neg_term(term: &Term, name: String) -> Term {
    Term::from_op(name, Op::Neg, -term.value(), vec![(term.clone(), -1.)])
}

fn inv_term(term: &Term, name: String) -> Term {
    let x = term.value();
    Term::from_op(name, Op::Inv, 1. / x, vec![(term.clone(), -1. / x.powi(2))])
}

fn sub_term(lhs: &Term, rhs: &Term, name: String) -> Term {
    let neg = neg_term(rhs, auto_name(&Op::Neg, &[rhs]));
    add_term(lhs, &neg, name)
}

fn div_term(lhs: &Term, rhs: &Term, name: String) -> Term {
    let inv = inv_term(rhs, auto_name(&Op::Inv, &[rhs]));
    mul_term(lhs, &inv, name)
}

fn fn_term(term: &Term, op: Op, f: &dyn UnaryFn, name: String) -> Term {
    let x = term.value();
    let fx = f.f(x);
    Term::from_op(name, op, fx, vec![(term.clone(), f.grad(x, fx))])
}

/// Apply `op` to `operands`, naming the result `name` or an automatic name.
///
/// Fails with [`GradError::InvalidOperand`] if the number of operands does
/// not match the operator's arity.
pub fn apply(op: &Op, operands: &[&Term], name: Option<&str>) -> Result<Term> {
    if operands.len() != op.arity() {
        return Err(GradError::InvalidOperand {
            op: op.clone(),
            expected: op.arity(),
            actual: operands.len(),
        });
    }
    let name = name.map_or_else(|| auto_name(op, operands), str::to_string);
    let a = operands[0];
    Ok(match op {
        Op::Add => add_term(a, operands[1], name),
        Op::Mul => mul_term(a, operands[1], name),
        Op::Sub => sub_term(a, operands[1], name),
        Op::Div => div_term(a, operands[1], name),
        Op::Neg => neg_term(a, name),
        Op::Inv => inv_term(a, name),
        Op::Sin => fn_term(a, Op::Sin, &Sine, name),
        Op::Exp => fn_term(a, Op::Exp, &Exponential, name),
        Op::Ln => fn_term(a, Op::Ln, &NaturalLog, name),
        Op::Custom(f) => fn_term(a, op.clone(), &**f, name),
    })
}

pub fn add(lhs: &Term, rhs: &Term) -> Term {
    add_term(lhs, rhs, auto_name(&Op::Add, &[lhs, rhs]))
}

pub fn multiply(lhs: &Term, rhs: &Term) -> Term {
    mul_term(lhs, rhs, auto_name(&Op::Mul, &[lhs, rhs]))
}

pub fn negate(term: &Term) -> Term {
    neg_term(term, auto_name(&Op::Neg, &[term]))
}

pub fn invert(term: &Term) -> Term {
    inv_term(term, auto_name(&Op::Inv, &[term]))
}

/// `lhs + (-rhs)`
pub fn subtract(lhs: &Term, rhs: &Term) -> Term {
    sub_term(lhs, rhs, auto_name(&Op::Sub, &[lhs, rhs]))
}

/// `lhs * (1 / rhs)`
pub fn divide(lhs: &Term, rhs: &Term) -> Term {
    div_term(lhs, rhs, auto_name(&Op::Div, &[lhs, rhs]))
}

pub fn sine(term: &Term) -> Term {
    fn_term(term, Op::Sin, &Sine, auto_name(&Op::Sin, &[term]))
}

pub fn exponential(term: &Term) -> Term {
    fn_term(term, Op::Exp, &Exponential, auto_name(&Op::Exp, &[term]))
}

pub fn natural_log(term: &Term) -> Term {
    fn_term(term, Op::Ln, &NaturalLog, auto_name(&Op::Ln, &[term]))
}

/// Apply a user-defined unary function.
pub fn apply_fn(term: &Term, f: impl UnaryFn + 'static) -> Term {
    let f: Rc<dyn UnaryFn> = Rc::new(f);
    let op = Op::Custom(f.clone());
    let name = auto_name(&op, &[term]);
    fn_term(term, op, &*f, name)
}

impl Term {
    /// Apply a unary function given as a pair of function pointers: the
    /// function itself and its derivative.
    pub fn apply(
        &self,
        name: &(impl AsRef<str> + ?Sized),
        f: fn(f64) -> f64,
        grad: fn(f64) -> f64,
    ) -> Term {
        apply_fn(
            self,
            PtrUnaryFn {
                name: name.as_ref().to_string(),
                f,
                grad,
            },
        )
    }
}
