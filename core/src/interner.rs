use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

static INTERNER: Lazy<RwLock<StringInterner<DefaultBackend>>> =
    Lazy::new(|| RwLock::new(StringInterner::default()));

/// A name interned in the global string interner.
///
/// Symbols and keywords both carry one of these, so name comparison in
/// environment frames is an integer compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternedSymbol(DefaultSymbol);

impl InternedSymbol {
    /// Intern a string and return an InternedSymbol
    pub fn new(s: &str) -> Self {
        let mut interner = INTERNER.write().unwrap_or_else(PoisonError::into_inner);
        InternedSymbol(interner.get_or_intern(s))
    }

    /// Resolve the interned symbol back to its string representation
    pub fn resolve(&self) -> String {
        self.with_str(str::to_string)
    }

    /// Resolve the symbol and run a function with the string slice
    pub fn with_str<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let interner = INTERNER.read().unwrap_or_else(PoisonError::into_inner);
        f(interner
            .resolve(self.0)
            .expect("Symbol should always be valid"))
    }
}

impl From<&str> for InternedSymbol {
    fn from(s: &str) -> Self {
        InternedSymbol::new(s)
    }
}

impl fmt::Display for InternedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| write!(f, "{s}"))
    }
}
