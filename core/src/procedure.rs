use std::fmt;
use std::rc::Rc;

use crate::builtin::Arity;
use crate::environment::Environment;
use crate::error::{EvalError, EvalResult};
use crate::interner::InternedSymbol;
use crate::interpreter::eval;
use crate::language::Expression;

/// A closure built by `Fn`, `Defn` or `Let`.
///
/// Arguments reach `apply` already evaluated; each call gets its own child
/// frame of the captured environment.
#[derive(Clone)]
pub struct Procedure {
    formals: Rc<[InternedSymbol]>,
    body: Expression,
    env: Environment,
}

impl Procedure {
    pub fn new(formals: impl Into<Rc<[InternedSymbol]>>, body: Expression, env: Environment) -> Self {
        Procedure {
            formals: formals.into(),
            body,
            env,
        }
    }

    pub fn formals(&self) -> &[InternedSymbol] {
        &self.formals
    }

    pub fn body(&self) -> &Expression {
        &self.body
    }

    #[tracing::instrument(level = "trace", skip_all, fields(arity = self.formals.len()))]
    pub fn apply(&self, args: &[Expression]) -> EvalResult<Expression> {
        if args.len() != self.formals.len() {
            return Err(EvalError::ArityMismatch {
                name: "procedure".to_string(),
                expected: Arity::exactly(self.formals.len()),
                got: args.len(),
            });
        }

        let local = self.env.extend(&self.formals, args);
        eval(&self.body, &local)
    }
}

// Environment frames can be cyclic through closures, so they are not printed
impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("formals", &self.formals)
            .field("body", &self.body)
            .field("env", &"<environment>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Expression {
        Expression::symbol(name)
    }

    #[test]
    fn test_apply_binds_formals_in_a_fresh_frame() {
        let env = Environment::new();
        let x = InternedSymbol::new("x");
        env.define(x, Expression::from(100));

        // The body just reads the formal back
        let identity = Procedure::new(vec![x], sym("x"), env.clone());
        assert_eq!(identity.apply(&[Expression::from(5)]).unwrap(), Expression::from(5));
        assert_eq!(env.lookup(x).unwrap(), Expression::from(100));
    }

    #[test]
    fn test_apply_reads_captured_environment() {
        let env = Environment::new();
        env.define(InternedSymbol::new("captured"), Expression::string("outer"));
        let proc = Procedure::new(Vec::<InternedSymbol>::new(), sym("captured"), env.child());
        assert_eq!(proc.apply(&[]).unwrap(), Expression::string("outer"));
    }

    #[test]
    fn test_apply_wrong_argument_count() {
        let proc = Procedure::new(
            vec![InternedSymbol::new("a"), InternedSymbol::new("b")],
            sym("a"),
            Environment::new(),
        );
        let err = proc.apply(&[Expression::from(1)]).unwrap_err();
        assert_eq!(
            err,
            EvalError::ArityMismatch {
                name: "procedure".to_string(),
                expected: Arity::exactly(2),
                got: 1,
            }
        );
    }
}
