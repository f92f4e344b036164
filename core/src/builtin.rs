//! Native operation descriptors
//!
//! A builtin is a plain record: a name, an arity contract, an argument
//! evaluation policy and a function pointer. One generic dispatcher checks
//! the arity, applies the policy, then calls the function.

use std::fmt;

use tracing::trace;

use crate::environment::Environment;
use crate::error::{EvalError, EvalResult};
use crate::interpreter::eval;
use crate::language::Expression;

/// Native function type - Rust functions callable from Misp
///
/// Eager builtins receive evaluated values, lazy builtins receive the raw
/// argument expressions. Both get the caller's environment.
pub type NativeFn = fn(&[Expression], &Environment) -> EvalResult<Expression>;

/// How many arguments a builtin or procedure accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub variadic: bool,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Arity {
            min: n,
            variadic: false,
        }
    }

    pub const fn at_least(n: usize) -> Self {
        Arity {
            min: n,
            variadic: true,
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count == self.min || (self.variadic && count > self.min)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            write!(f, "at least {}", self.min)
        } else {
            write!(f, "{}", self.min)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalPolicy {
    /// Arguments are evaluated left to right before the call
    Eager,
    /// The function gets the unevaluated argument expressions
    Lazy,
}

#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub policy: EvalPolicy,
    pub func: NativeFn,
}

impl Builtin {
    pub const fn eager(name: &'static str, arity: Arity, func: NativeFn) -> Self {
        Builtin {
            name,
            arity,
            policy: EvalPolicy::Eager,
            func,
        }
    }

    pub const fn lazy(name: &'static str, arity: Arity, func: NativeFn) -> Self {
        Builtin {
            name,
            arity,
            policy: EvalPolicy::Lazy,
            func,
        }
    }

    fn check_arity(&self, got: usize) -> EvalResult<()> {
        if self.arity.accepts(got) {
            Ok(())
        } else {
            Err(EvalError::ArityMismatch {
                name: self.name.to_string(),
                expected: self.arity,
                got,
            })
        }
    }

    /// Call from source: `args` are the unevaluated expressions at the call site.
    pub fn invoke(&self, args: &[Expression], env: &Environment) -> EvalResult<Expression> {
        self.check_arity(args.len())?;
        trace!(builtin = self.name, args = args.len(), policy = ?self.policy, "invoke");

        match self.policy {
            EvalPolicy::Eager => {
                let values = args
                    .iter()
                    .map(|arg| eval(arg, env))
                    .collect::<EvalResult<Vec<_>>>()?;
                (self.func)(&values, env)
            }
            EvalPolicy::Lazy => (self.func)(args, env),
        }
    }

    /// Call with arguments that are already values, as `Apply` does.
    pub fn invoke_evaluated(&self, args: &[Expression], env: &Environment) -> EvalResult<Expression> {
        self.check_arity(args.len())?;
        trace!(builtin = self.name, args = args.len(), "invoke with values");
        (self.func)(args, env)
    }
}
