use std::fmt;
use std::rc::Rc;

use crate::builtin::Builtin;
use crate::interner::InternedSymbol;
use crate::numeric::Number;
use crate::procedure::Procedure;

const INDENT_SPACES: usize = 4;

pub const TRUE_KEYWORD: &str = ":T";
pub const FALSE_KEYWORD: &str = ":F";

// ============================================================================
// Core Type System
// ============================================================================

/// Every runtime value, and every node of a parsed program.
///
/// Compound forms and strings are reference counted, so cloning an
/// expression is cheap regardless of its size.
#[derive(Clone, Debug)]
pub enum Expression {
    /// Resolved through the environment when evaluated
    Symbol(InternedSymbol),
    Number(Number),
    String(Rc<str>),
    /// Self-evaluating tag such as `:T`; the text keeps its leading marker
    Keyword(InternedSymbol),
    /// Call or list: a head followed by a body. Empty is `Nil`.
    SExpression(Rc<[Expression]>),
    Procedure(Rc<Procedure>),
    Builtin(&'static Builtin),
}

// Procedures compare by formals and body, never by captured environment
impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expression::Symbol(a), Expression::Symbol(b)) => a == b,
            (Expression::Number(a), Expression::Number(b)) => a == b,
            (Expression::String(a), Expression::String(b)) => a == b,
            (Expression::Keyword(a), Expression::Keyword(b)) => a == b,
            (Expression::SExpression(a), Expression::SExpression(b)) => a == b,
            (Expression::Procedure(a), Expression::Procedure(b)) => {
                a.formals() == b.formals() && a.body() == b.body()
            }
            (Expression::Builtin(a), Expression::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Eq for Expression {}

// ============================================================================
// Construction
// ============================================================================

impl Expression {
    pub fn symbol(name: &str) -> Self {
        Expression::Symbol(InternedSymbol::new(name))
    }

    pub fn keyword(text: &str) -> Self {
        Expression::Keyword(InternedSymbol::new(text))
    }

    pub fn string(text: impl Into<Rc<str>>) -> Self {
        Expression::String(text.into())
    }

    pub fn number(n: impl Into<Number>) -> Self {
        Expression::Number(n.into())
    }

    pub fn list(items: impl IntoIterator<Item = Expression>) -> Self {
        Expression::SExpression(items.into_iter().collect())
    }

    /// The empty compound form
    pub fn nil() -> Self {
        Expression::SExpression(Rc::from([]))
    }

    /// `Quote[(items...)]`, the tree a `{...}` literal stands for
    pub fn quoted(items: impl IntoIterator<Item = Expression>) -> Self {
        Expression::list([Expression::symbol("Quote"), Expression::list(items)])
    }

    /// `:T` or `:F`
    pub fn from_bool(b: bool) -> Self {
        Expression::keyword(if b { TRUE_KEYWORD } else { FALSE_KEYWORD })
    }
}

impl From<Number> for Expression {
    fn from(n: Number) -> Self {
        Expression::Number(n)
    }
}

impl From<i64> for Expression {
    fn from(n: i64) -> Self {
        Expression::Number(Number::from(n))
    }
}

// ============================================================================
// Inspection
// ============================================================================

impl Expression {
    /// False only for the empty compound form and `:F`
    pub fn is_truthy(&self) -> bool {
        match self {
            Expression::SExpression(items) => !items.is_empty(),
            Expression::Keyword(k) => k.with_str(|s| s != FALSE_KEYWORD),
            _ => true,
        }
    }

    pub fn as_symbol(&self) -> Option<InternedSymbol> {
        match self {
            Expression::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expression]> {
        match self {
            Expression::SExpression(items) => Some(&items[..]),
            _ => None,
        }
    }

    /// True if this is a compound form whose head is the symbol `name`
    pub fn is_form(&self, name: &str) -> bool {
        match self.as_list() {
            Some([Expression::Symbol(head), ..]) => head.with_str(|s| s == name),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::Symbol(_) => "Symbol",
            Expression::Number(_) => "Number",
            Expression::String(_) => "String",
            Expression::Keyword(_) => "Keyword",
            Expression::SExpression(_) => "SExpression",
            Expression::Procedure(_) => "Procedure",
            Expression::Builtin(_) => "Builtin",
        }
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

fn escape_string(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c => result.push(c),
        }
    }
    result
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Symbol(s) | Expression::Keyword(s) => write!(f, "{s}"),
            Expression::Number(n) => write!(f, "{n}"),
            Expression::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Expression::SExpression(items) => {
                write!(f, "'(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Expression::Procedure(_) => write!(f, "<procedure>"),
            Expression::Builtin(b) => write!(f, "<builtin {}>", b.name),
        }
    }
}

// ============================================================================
// Tree Rendering
// ============================================================================

impl Expression {
    /// Indented, one-node-per-line rendering for debugging parsed trees
    pub fn tree_repr(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, level: usize) {
        let indent = " ".repeat(INDENT_SPACES * level);
        out.push_str(&indent);
        match self {
            Expression::SExpression(items) if !items.is_empty() => {
                out.push_str("SExpression(\n");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(",\n");
                    }
                    item.write_tree(out, level + 1);
                }
                out.push('\n');
                out.push_str(&indent);
                out.push(')');
            }
            Expression::SExpression(_) => out.push_str("SExpression()"),
            Expression::Procedure(p) => {
                let formals = p.formals().iter().map(|s| Expression::Symbol(*s));
                out.push_str(&format!("Procedure({})", Expression::list(formals)));
            }
            Expression::Builtin(b) => out.push_str(&format!("Builtin({})", b.name)),
            atom => out.push_str(&format!("{}({atom})", atom.type_name())),
        }
    }
}
