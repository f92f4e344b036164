//! Quasiquote template expansion
//!
//! Walks a quoted template and replaces every `Unquote[expr]` with the value
//! of `expr`. Nested `Quasiquote` forms are left untouched so their unquotes
//! belong to the inner level.

use crate::builtin::Arity;
use crate::environment::Environment;
use crate::error::{EvalError, EvalResult};
use crate::interpreter::eval;
use crate::language::Expression;

pub const QUASIQUOTE: &str = "Quasiquote";
pub const UNQUOTE: &str = "Unquote";

pub fn expand(template: &Expression, env: &Environment) -> EvalResult<Expression> {
    let Some(items) = template.as_list() else {
        return Ok(template.clone());
    };

    if template.is_form(UNQUOTE) {
        return match &items[1..] {
            [unquoted] => eval(unquoted, env),
            other => Err(EvalError::ArityMismatch {
                name: UNQUOTE.to_string(),
                expected: Arity::exactly(1),
                got: other.len(),
            }),
        };
    }

    if template.is_form(QUASIQUOTE) {
        return Ok(template.clone());
    }

    let expanded = items
        .iter()
        .map(|item| expand(item, env))
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(Expression::list(expanded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::InternedSymbol;
    use pretty_assertions::assert_eq;

    fn sym(name: &str) -> Expression {
        Expression::symbol(name)
    }

    fn unquote(expr: Expression) -> Expression {
        Expression::list([sym(UNQUOTE), expr])
    }

    fn env_with_x() -> Environment {
        let env = Environment::new();
        env.define(InternedSymbol::new("x"), Expression::from(5));
        env
    }

    #[test]
    fn test_atoms_pass_through() {
        let env = Environment::new();
        // Symbols in a template are not looked up
        assert_eq!(expand(&sym("x"), &env).unwrap(), sym("x"));
        assert_eq!(expand(&Expression::from(1), &env).unwrap(), Expression::from(1));
        assert_eq!(expand(&Expression::nil(), &env).unwrap(), Expression::nil());
    }

    #[test]
    fn test_unquote_substitutes_only_its_position() {
        let env = env_with_x();
        let template = Expression::list([
            sym("a"),
            Expression::list([sym("b"), unquote(sym("x"))]),
            sym("x"),
        ]);
        let expected = Expression::list([
            sym("a"),
            Expression::list([sym("b"), Expression::from(5)]),
            sym("x"),
        ]);
        assert_eq!(expand(&template, &env).unwrap(), expected);
    }

    #[test]
    fn test_nested_quasiquote_is_not_expanded() {
        let env = env_with_x();
        let inner = Expression::list([sym(QUASIQUOTE), Expression::list([unquote(sym("x"))])]);
        let template = Expression::list([unquote(sym("x")), inner.clone()]);
        assert_eq!(
            expand(&template, &env).unwrap(),
            Expression::list([Expression::from(5), inner])
        );
    }

    #[test]
    fn test_unquote_needs_exactly_one_argument() {
        let env = env_with_x();
        let template = Expression::list([sym(UNQUOTE), sym("x"), sym("x")]);
        assert!(matches!(
            expand(&template, &env),
            Err(EvalError::ArityMismatch { got: 2, .. })
        ));
    }
}
