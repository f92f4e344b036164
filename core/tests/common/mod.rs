//! Tree builders standing in for the front end.
//!
//! `op("+", [int(1), int(2)])` is the tree for `+[1 2]`, `(+ 1 2)` and
//! `[1 2||+]` alike.
#![allow(dead_code)]

use misp::{Environment, EvalResult, Expression, Number, global_environment};

pub fn sym(name: &str) -> Expression {
    Expression::symbol(name)
}

pub fn int(n: i64) -> Expression {
    Expression::from(n)
}

pub fn num(literal: &str) -> Expression {
    Expression::Number(literal.parse::<Number>().unwrap())
}

pub fn text(s: &str) -> Expression {
    Expression::string(s)
}

pub fn kw(text: &str) -> Expression {
    Expression::keyword(text)
}

/// `head[args...]`
pub fn call(head: Expression, args: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::list(std::iter::once(head).chain(args))
}

/// `name[args...]`
pub fn op(name: &str, args: impl IntoIterator<Item = Expression>) -> Expression {
    call(sym(name), args)
}

/// `{items...}`
pub fn braces(items: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::quoted(items)
}

/// `Fn[{params...} body]`
pub fn lambda(params: &[&str], body: Expression) -> Expression {
    op("Fn", [braces(params.iter().map(|p| sym(p))), body])
}

pub fn truthy() -> Expression {
    kw(":T")
}

pub fn falsy() -> Expression {
    kw(":F")
}

/// Evaluate in a fresh global environment
pub fn eval_fresh(expr: &Expression) -> EvalResult<Expression> {
    expr.evaluate(&global_environment())
}

/// Evaluate each form in order in one environment, returning the last result
pub fn eval_all(env: &Environment, forms: &[Expression]) -> EvalResult<Expression> {
    let mut result = Expression::nil();
    for form in forms {
        result = form.evaluate(env)?;
    }
    Ok(result)
}
