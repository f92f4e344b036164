//! Core evaluator for Misp
//!
//! This crate holds the expression model, scoped environments, closures,
//! the builtin table and the evaluator itself. It takes already-parsed
//! expression trees; reading source text and driving a REPL live elsewhere.

pub mod builtin;
pub mod environment;
pub mod error;
pub mod interner;
pub mod interpreter;
pub mod language;
pub mod numeric;
pub mod procedure;
pub mod quasiquote;
pub mod stdlib;

// Re-export commonly used items for convenience
pub use builtin::{Arity, Builtin, EvalPolicy, NativeFn};
pub use environment::Environment;
pub use error::{EvalError, EvalResult};
pub use interner::InternedSymbol;
pub use interpreter::{apply, eval};
pub use language::Expression;
pub use numeric::{Number, ParseNumberError};
pub use procedure::Procedure;
pub use stdlib::global_environment;
