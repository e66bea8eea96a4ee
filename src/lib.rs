//! Scalar reverse-mode automatic differentiation.
//!
//! Build an expression out of named [`Term`]s with the operator functions,
//! then ask [`compute_gradients`] for the derivative of the result with
//! respect to everything it depends on.
//!
//! ```
//! use pathgrad::{add, compute_gradients, multiply, Term};
//!
//! let a = Term::new("a", 2.);
//! let b = Term::new("b", 3.);
//! let f = add(&multiply(&a, &b), &a);
//! assert_eq!(f.value(), 8.);
//!
//! let grads = compute_gradients(&f);
//! assert_eq!(grads.get(&a), 4.);
//! assert_eq!(grads.get(&b), 2.);
//! ```
//!
//! The `pathgrad!` macro (feature `macro`) writes the same graph from plain
//! arithmetic. Anything it cannot translate is rejected at compile time:
//!
//! ```compile_fail
//! use pathgrad_macro::pathgrad;
//!
//! pathgrad! {{
//!     let a = 7.;
//!     let b = 3.;
//!     let f = a % b;
//! }}
//! ```

mod dot;
pub mod error;
mod gradient;
pub mod history;
mod ops;
mod term;
mod unary_fn;

pub use error::{GradError, Result};
pub use gradient::{
    compute_gradients, compute_gradients_topo, compute_gradients_with, GradientMap, Propagation,
};
pub use history::{History, OpRecord};
pub use ops::{
    add, apply, apply_fn, divide, exponential, invert, multiply, natural_log, negate, sine,
    subtract, Op,
};
#[cfg(feature = "macro")]
pub use pathgrad_macro::pathgrad;
pub use term::Term;
pub use unary_fn::UnaryFn;
