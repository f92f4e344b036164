use tracing::trace;

use crate::environment::Environment;
use crate::error::{EvalError, EvalResult};
use crate::language::Expression;

// ============================================================================
// Evaluator
// ============================================================================

impl Expression {
    /// Evaluate this expression in `env`
    pub fn evaluate(&self, env: &Environment) -> EvalResult<Expression> {
        eval(self, env)
    }
}

pub fn eval(expr: &Expression, env: &Environment) -> EvalResult<Expression> {
    match expr {
        // Symbol lookup
        Expression::Symbol(name) => env.lookup(*name),

        // Compound forms; the empty one is nil and evaluates to itself
        Expression::SExpression(items) => match items.split_first() {
            Some((head, rest)) => eval_form(head, rest, env),
            None => Ok(expr.clone()),
        },

        // Self-evaluating forms
        Expression::Number(_)
        | Expression::String(_)
        | Expression::Keyword(_)
        | Expression::Procedure(_)
        | Expression::Builtin(_) => Ok(expr.clone()),
    }
}

/// Resolve the head of a form until it is callable, then call it with `rest`.
fn eval_form(head: &Expression, rest: &[Expression], env: &Environment) -> EvalResult<Expression> {
    trace!(head = %head, args = rest.len(), "dispatch");

    let mut callee = head.clone();
    let mut visited: Vec<Expression> = Vec::new();
    loop {
        let resolved = match &callee {
            Expression::Symbol(name) => env.lookup(*name)?,
            Expression::SExpression(items) if !items.is_empty() => eval(&callee, env)?,
            Expression::Procedure(procedure) => {
                let args = eval_args(rest, env)?;
                return procedure.apply(&args);
            }
            Expression::Builtin(builtin) => return builtin.invoke(rest, env),
            _ => return Err(EvalError::UncallableHead(callee.to_string())),
        };

        // A head that resolves back to one already seen would never become callable
        visited.push(callee);
        if visited.contains(&resolved) {
            return Err(EvalError::UncallableHead(resolved.to_string()));
        }
        callee = resolved;
    }
}

/// Evaluate call arguments left to right
pub fn eval_args(args: &[Expression], env: &Environment) -> EvalResult<Vec<Expression>> {
    args.iter().map(|arg| eval(arg, env)).collect()
}

/// Call a procedure or builtin with arguments that are already values
pub fn apply(callee: &Expression, args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    match callee {
        Expression::Procedure(procedure) => procedure.apply(args),
        Expression::Builtin(builtin) => builtin.invoke_evaluated(args, env),
        other => Err(EvalError::type_mismatch(
            "Apply",
            "a procedure or builtin",
            other,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::InternedSymbol;
    use crate::procedure::Procedure;
    use std::rc::Rc;

    fn sym(name: &str) -> Expression {
        Expression::symbol(name)
    }

    #[test]
    fn test_atoms_evaluate_to_themselves() {
        let env = Environment::new();
        for atom in [
            Expression::from(3),
            Expression::string("text"),
            Expression::keyword(":T"),
            Expression::nil(),
        ] {
            assert_eq!(eval(&atom, &env).unwrap(), atom);
            assert_eq!(eval(&eval(&atom, &env).unwrap(), &env).unwrap(), atom);
        }
    }

    #[test]
    fn test_unbound_symbol_fails() {
        let env = Environment::new();
        assert_eq!(
            eval(&sym("nowhere"), &env),
            Err(EvalError::UnboundName("nowhere".to_string()))
        );
    }

    #[test]
    fn test_procedure_head_is_applied_to_evaluated_args() {
        let env = Environment::new();
        env.define(InternedSymbol::new("y"), Expression::from(9));
        let identity = Procedure::new(vec![InternedSymbol::new("v")], sym("v"), env.clone());
        env.define(
            InternedSymbol::new("id"),
            Expression::Procedure(Rc::new(identity)),
        );

        let call = Expression::list([sym("id"), sym("y")]);
        assert_eq!(eval(&call, &env).unwrap(), Expression::from(9));
    }

    #[test]
    fn test_uncallable_head() {
        let env = Environment::new();
        env.define(InternedSymbol::new("n"), Expression::from(1));

        let call = Expression::list([sym("n"), Expression::from(2)]);
        assert_eq!(
            eval(&call, &env),
            Err(EvalError::UncallableHead("1".to_string()))
        );

        let call = Expression::list([Expression::string("f")]);
        assert!(matches!(eval(&call, &env), Err(EvalError::UncallableHead(_))));
    }

    #[test]
    fn test_self_referential_head_does_not_loop() {
        let env = Environment::new();
        let me = InternedSymbol::new("me");
        env.define(me, Expression::Symbol(me));

        let call = Expression::list([sym("me")]);
        assert_eq!(
            eval(&call, &env),
            Err(EvalError::UncallableHead("me".to_string()))
        );

        let call = Expression::list([Expression::nil(), Expression::from(1)]);
        assert!(matches!(eval(&call, &env), Err(EvalError::UncallableHead(_))));
    }

    #[test]
    fn test_head_resolution_cycle_does_not_loop() {
        let env = Environment::new();
        let (a, b) = (InternedSymbol::new("a"), InternedSymbol::new("b"));
        env.define(a, Expression::Symbol(b));
        env.define(b, Expression::Symbol(a));

        let call = Expression::list([sym("a"), Expression::from(1)]);
        assert_eq!(
            eval(&call, &env),
            Err(EvalError::UncallableHead("a".to_string()))
        );
    }

    #[test]
    fn test_apply_rejects_non_callable() {
        let env = Environment::new();
        assert!(matches!(
            apply(&Expression::from(1), &[], &env),
            Err(EvalError::TypeMismatch { .. })
        ));
    }
}
