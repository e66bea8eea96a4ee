/// A trait that represents an unary function on a scalar.
/// It needs to implement the value of the function and its derivative.
pub trait UnaryFn {
    fn name(&self) -> String;
    fn f(&self, x: f64) -> f64;
    /// The derivative at `x`. `fx` is `self.f(x)`, already computed, so
    /// functions like `exp` can reuse it.
    fn grad(&self, x: f64, fx: f64) -> f64;
}

pub(crate) struct Sine;

impl UnaryFn for Sine {
    fn name(&self) -> String {
        "sin".to_string()
    }
    fn f(&self, x: f64) -> f64 {
        x.sin()
    }
    fn grad(&self, x: f64, _fx: f64) -> f64 {
        x.cos()
    }
}

pub(crate) struct Exponential;

impl UnaryFn for Exponential {
    fn name(&self) -> String {
        "exp".to_string()
    }
    fn f(&self, x: f64) -> f64 {
        x.exp()
    }
    fn grad(&self, _x: f64, fx: f64) -> f64 {
        fx
    }
}

pub(crate) struct NaturalLog;

impl UnaryFn for NaturalLog {
    fn name(&self) -> String {
        "ln".to_string()
    }
    fn f(&self, x: f64) -> f64 {
        x.ln()
    }
    fn grad(&self, x: f64, _fx: f64) -> f64 {
        1. / x
    }
}

/// Adapts a pair of plain function pointers, see [`crate::Term::apply`].
pub(crate) struct PtrUnaryFn {
    pub name: String,
    pub f: fn(f64) -> f64,
    pub grad: fn(f64) -> f64,
}

impl UnaryFn for PtrUnaryFn {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn f(&self, x: f64) -> f64 {
        (self.f)(x)
    }
    fn grad(&self, x: f64, _fx: f64) -> f64 {
        (self.grad)(x)
    }
}
