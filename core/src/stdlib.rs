//! Standard builtins
//!
//! The table of native operations every program starts with, and the
//! constructor for the global environment that binds them.

use std::io::{self, Write};
use std::rc::Rc;

use tracing::debug;

use crate::builtin::{Arity, Builtin};
use crate::environment::Environment;
use crate::error::{EvalError, EvalResult};
use crate::interner::InternedSymbol;
use crate::interpreter::{apply, eval};
use crate::language::Expression;
use crate::numeric::Number;
use crate::procedure::Procedure;
use crate::quasiquote::{self, QUASIQUOTE, UNQUOTE};

pub static BUILTINS: &[Builtin] = &[
    // Arithmetic
    Builtin::eager("+", Arity::at_least(2), add),
    Builtin::eager("-", Arity::at_least(2), sub),
    Builtin::eager("*", Arity::at_least(2), mul),
    Builtin::eager("/", Arity::at_least(2), div),
    Builtin::eager("Inc", Arity::exactly(1), inc),
    Builtin::eager("Dec", Arity::exactly(1), dec),
    // Comparison and logic
    Builtin::eager("=", Arity::at_least(2), all_equal),
    Builtin::eager("Not", Arity::exactly(1), not),
    Builtin::lazy("If", Arity::exactly(3), if_),
    Builtin::lazy("Or", Arity::at_least(1), or),
    Builtin::lazy("And", Arity::at_least(1), and),
    // Lists
    Builtin::eager("Head", Arity::exactly(1), head),
    Builtin::eager("Body", Arity::exactly(1), body),
    Builtin::eager("List", Arity::at_least(0), list),
    // Binding and procedures
    Builtin::lazy("Fn", Arity::exactly(2), fn_),
    Builtin::lazy("Def", Arity::exactly(2), def),
    Builtin::lazy("Defn", Arity::exactly(2), defn),
    Builtin::lazy("Set!", Arity::exactly(2), set),
    Builtin::lazy("Let", Arity::exactly(2), let_),
    Builtin::lazy("Do", Arity::at_least(1), do_),
    // Evaluation control
    Builtin::eager("Eval", Arity::exactly(1), eval_),
    Builtin::eager("Apply", Arity::exactly(2), apply_),
    Builtin::lazy("Quote", Arity::exactly(1), quote),
    Builtin::lazy(QUASIQUOTE, Arity::exactly(1), quasiquote_),
    Builtin::lazy(UNQUOTE, Arity::exactly(1), unquote),
    // Introspection and output
    Builtin::eager("Type", Arity::exactly(1), type_),
    Builtin::eager("Print", Arity::at_least(0), print),
];

/// Build a fresh root environment holding every builtin and `Nil`
pub fn global_environment() -> Environment {
    let env = Environment::new();
    for builtin in BUILTINS {
        env.define(InternedSymbol::new(builtin.name), Expression::Builtin(builtin));
    }
    env.define(InternedSymbol::new("Nil"), Expression::nil());
    env
}

// ============================================================================
// Argument Helpers
// ============================================================================

fn extract_number<'a>(operation: &str, value: &'a Expression) -> EvalResult<&'a Number> {
    match value {
        Expression::Number(n) => Ok(n),
        other => Err(EvalError::type_mismatch(operation, "a number", other)),
    }
}

fn extract_symbol(operation: &str, value: &Expression) -> EvalResult<InternedSymbol> {
    value
        .as_symbol()
        .ok_or_else(|| EvalError::type_mismatch(operation, "a symbol", value))
}

/// The elements of `{...}` (a `Quote` form) or of a bare list
fn binding_list<'a>(operation: &str, value: &'a Expression) -> EvalResult<&'a [Expression]> {
    let list = if value.is_form("Quote") {
        match value.as_list() {
            Some([_, quoted]) => quoted.as_list(),
            _ => None,
        }
    } else {
        value.as_list()
    };
    list.ok_or_else(|| EvalError::type_mismatch(operation, "a list", value))
}

fn symbols(operation: &str, values: &[Expression]) -> EvalResult<Vec<InternedSymbol>> {
    values
        .iter()
        .map(|value| extract_symbol(operation, value))
        .collect()
}

fn fold_numbers(
    operation: &str,
    args: &[Expression],
    op: impl Fn(&Number, &Number) -> EvalResult<Number>,
) -> EvalResult<Expression> {
    let (first, rest) = args
        .split_first()
        .ok_or_else(|| EvalError::ArityMismatch {
            name: operation.to_string(),
            expected: Arity::at_least(1),
            got: 0,
        })?;

    let mut acc = extract_number(operation, first)?.clone();
    for arg in rest {
        acc = op(&acc, extract_number(operation, arg)?)?;
    }
    Ok(Expression::Number(acc))
}

// ============================================================================
// Arithmetic
// ============================================================================

fn add(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    fold_numbers("+", args, |a, b| Ok(a + b))
}

fn sub(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    fold_numbers("-", args, |a, b| Ok(a - b))
}

fn mul(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    fold_numbers("*", args, |a, b| Ok(a * b))
}

fn div(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    fold_numbers("/", args, |a, b| {
        a.checked_div(b).ok_or_else(|| EvalError::DivisionByZero {
            operation: "/".to_string(),
        })
    })
}

fn inc(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    Ok(Expression::Number(extract_number("Inc", &args[0])? + &Number::one()))
}

fn dec(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    Ok(Expression::Number(extract_number("Dec", &args[0])? - &Number::one()))
}

// ============================================================================
// Comparison and Logic
// ============================================================================

fn all_equal(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    Ok(Expression::from_bool(args.windows(2).all(|pair| pair[0] == pair[1])))
}

fn not(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    Ok(Expression::from_bool(!args[0].is_truthy()))
}

fn if_(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    if eval(&args[0], env)?.is_truthy() {
        eval(&args[1], env)
    } else {
        eval(&args[2], env)
    }
}

/// First truthy value, or `:F`
fn or(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    for arg in args {
        let value = eval(arg, env)?;
        if value.is_truthy() {
            return Ok(value);
        }
    }
    Ok(Expression::from_bool(false))
}

/// First falsy value, or the value of the last argument
fn and(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    let (last, init) = args.split_last().ok_or_else(|| EvalError::ArityMismatch {
        name: "And".to_string(),
        expected: Arity::at_least(1),
        got: 0,
    })?;
    for arg in init {
        let value = eval(arg, env)?;
        if !value.is_truthy() {
            return Ok(value);
        }
    }
    eval(last, env)
}

// ============================================================================
// Lists
// ============================================================================

fn head(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    match args[0].as_list() {
        Some([first, ..]) => Ok(first.clone()),
        _ => Err(EvalError::type_mismatch("Head", "a non-empty list", &args[0])),
    }
}

fn body(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    match args[0].as_list() {
        Some([_, rest @ ..]) => Ok(Expression::list(rest.to_vec())),
        Some([]) => Ok(Expression::nil()),
        None => Err(EvalError::type_mismatch("Body", "a list", &args[0])),
    }
}

fn list(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    Ok(Expression::list(args.to_vec()))
}

// ============================================================================
// Binding and Procedures
// ============================================================================

/// `Fn[{x y} body]`
fn fn_(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    let formals = symbols("Fn", binding_list("Fn", &args[0])?)?;
    let procedure = Procedure::new(formals, args[1].clone(), env.clone());
    Ok(Expression::Procedure(Rc::new(procedure)))
}

/// `Def[name value]`: declares first, so `value` can refer to `name`
fn def(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    let name = extract_symbol("Def", &args[0])?;
    env.declare(name);
    let value = eval(&args[1], env)?;
    env.assign(name, value.clone())?;
    debug!(%name, %value, "def");
    Ok(value)
}

/// `Defn[name[x y] body]`
fn defn(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    let header = match args[0].as_list() {
        Some(header) if !header.is_empty() => header,
        _ => return Err(EvalError::type_mismatch("Defn", "a non-empty header", &args[0])),
    };
    let mut names = symbols("Defn", header)?;
    let name = names.remove(0);

    env.declare(name);
    let procedure = Procedure::new(names, args[1].clone(), env.clone());
    let value = Expression::Procedure(Rc::new(procedure));
    env.assign(name, value.clone())?;
    debug!(%name, "defn");
    Ok(value)
}

/// `Set![name value]`: rebinds the nearest existing binding
fn set(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    let name = extract_symbol("Set!", &args[0])?;
    let value = eval(&args[1], env)?;
    env.assign(name, value.clone())?;
    debug!(%name, %value, "set!");
    Ok(value)
}

/// `Let[{x 1 y 2} body]`
fn let_(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    let defs = binding_list("Let", &args[0])?;
    if defs.len() % 2 != 0 {
        return Err(EvalError::type_mismatch("Let", "symbol-value pairs", &args[0]));
    }

    let mut names = Vec::with_capacity(defs.len() / 2);
    let mut values = Vec::with_capacity(defs.len() / 2);
    for pair in defs.chunks_exact(2) {
        names.push(extract_symbol("Let", &pair[0])?);
        values.push(eval(&pair[1], env)?);
    }

    Procedure::new(names, args[1].clone(), env.clone()).apply(&values)
}

fn do_(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    let mut result = Expression::nil();
    for arg in args {
        result = eval(arg, env)?;
    }
    Ok(result)
}

// ============================================================================
// Evaluation Control
// ============================================================================

fn eval_(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    eval(&args[0], env)
}

/// `Apply[f {a b}]`: the list elements are passed as values, not re-evaluated
fn apply_(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    let values = args[1]
        .as_list()
        .ok_or_else(|| EvalError::type_mismatch("Apply", "a list", &args[1]))?;
    apply(&args[0], values, env)
}

fn quote(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    Ok(args[0].clone())
}

fn quasiquote_(args: &[Expression], env: &Environment) -> EvalResult<Expression> {
    quasiquote::expand(&args[0], env)
}

fn unquote(_args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    Err(EvalError::DirectUseOfUnquote)
}

// ============================================================================
// Introspection and Output
// ============================================================================

fn type_(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    Ok(Expression::keyword(&format!(":{}", args[0].type_name())))
}

/// Print each argument on its own line; returns the last one, or `Nil`
fn print(args: &[Expression], _env: &Environment) -> EvalResult<Expression> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let io_error = |e: io::Error| EvalError::Output(format!("Print: {e}"));

    if args.is_empty() {
        writeln!(handle).map_err(io_error)?;
    }
    for arg in args {
        writeln!(handle, "{arg}").map_err(io_error)?;
    }
    handle.flush().map_err(io_error)?;

    Ok(args.last().cloned().unwrap_or_else(Expression::nil))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_are_unique() {
        let mut names: Vec<_> = BUILTINS.iter().map(|b| b.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTINS.len());
    }

    #[test]
    fn test_global_environment_binds_every_builtin() {
        let env = global_environment();
        for builtin in BUILTINS {
            let bound = env.lookup(InternedSymbol::new(builtin.name)).unwrap();
            assert_eq!(bound, Expression::Builtin(builtin));
        }
        assert_eq!(env.lookup(InternedSymbol::new("Nil")).unwrap(), Expression::nil());
    }

    #[test]
    fn test_global_environments_are_independent() {
        let first = global_environment();
        let second = global_environment();
        first.define(InternedSymbol::new("only-here"), Expression::from(1));
        assert!(!second.contains(InternedSymbol::new("only-here")));
    }

    #[test]
    fn test_binding_list_accepts_quoted_and_bare() {
        let quoted = Expression::quoted([Expression::symbol("x")]);
        let bare = Expression::list([Expression::symbol("x")]);
        assert_eq!(binding_list("Fn", &quoted).unwrap(), &[Expression::symbol("x")]);
        assert_eq!(binding_list("Fn", &bare).unwrap(), &[Expression::symbol("x")]);
        assert!(binding_list("Fn", &Expression::from(1)).is_err());
    }
}
