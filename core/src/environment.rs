//! Environment for variable bindings
//!
//! An Environment is a chain of frames, each child holding a reference to its
//! parent. New bindings only ever appear through `declare`; `assign` walks
//! outward and rebinds the nearest frame that declared the name.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{EvalError, EvalResult};
use crate::interner::InternedSymbol;
use crate::language::Expression;

// ============================================================================
// Environment
// ============================================================================

// A `None` slot is declared but not yet bound.
struct Frame {
    bindings: FxHashMap<InternedSymbol, Option<Expression>>,
    parent: Option<Environment>,
}

/// Handle to one frame of the scope chain.
///
/// Cloning is just an Rc increment; clones share the same frame, which is how
/// procedures keep their defining scope alive.
#[derive(Clone)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create a new, empty root environment
    pub fn new() -> Self {
        Self::with_parent(None, FxHashMap::default())
    }

    fn with_parent(
        parent: Option<Environment>,
        bindings: FxHashMap<InternedSymbol, Option<Expression>>,
    ) -> Self {
        Environment {
            frame: Rc::new(RefCell::new(Frame { bindings, parent })),
        }
    }

    /// Create an empty child frame of this one
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()), FxHashMap::default())
    }

    /// Create a child frame with each name already bound to its value
    pub fn extend(&self, names: &[InternedSymbol], values: &[Expression]) -> Self {
        let bindings = names
            .iter()
            .zip(values)
            .map(|(name, value)| (*name, Some(value.clone())))
            .collect();
        Self::with_parent(Some(self.clone()), bindings)
    }

    /// Introduce `name` in this frame without a value, shadowing outer bindings.
    ///
    /// Redeclaring a name this frame already binds clears its value.
    pub fn declare(&self, name: InternedSymbol) {
        self.frame.borrow_mut().bindings.insert(name, None);
    }

    /// Declare and bind in this frame in one step
    pub fn define(&self, name: InternedSymbol, value: Expression) {
        self.frame.borrow_mut().bindings.insert(name, Some(value));
    }

    /// Look up a name, walking up the parent chain.
    ///
    /// A name declared here but not yet bound is looked up in the parent.
    pub fn lookup(&self, name: InternedSymbol) -> EvalResult<Expression> {
        let mut env = self.clone();
        loop {
            let parent = {
                let frame = env.frame.borrow();
                if let Some(Some(value)) = frame.bindings.get(&name) {
                    return Ok(value.clone());
                }
                frame.parent.clone()
            };
            match parent {
                Some(parent) => env = parent,
                None => return Err(EvalError::UnboundName(name.resolve())),
            }
        }
    }

    /// Rebind `name` in the nearest frame that declared it
    pub fn assign(&self, name: InternedSymbol, value: Expression) -> EvalResult<()> {
        let mut env = self.clone();
        loop {
            let parent = {
                let mut frame = env.frame.borrow_mut();
                if let Some(slot) = frame.bindings.get_mut(&name) {
                    *slot = Some(value);
                    return Ok(());
                }
                frame.parent.clone()
            };
            match parent {
                Some(parent) => env = parent,
                None => return Err(EvalError::UnboundName(name.resolve())),
            }
        }
    }

    /// True if `name` is declared anywhere in the chain
    pub fn contains(&self, name: InternedSymbol) -> bool {
        let frame = self.frame.borrow();
        frame.bindings.contains_key(&name)
            || frame.parent.as_ref().is_some_and(|parent| parent.contains(name))
    }

    /// True if both handles refer to the same frame
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.frame, &other.frame)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.frame.borrow();
        let mut names: Vec<String> = frame.bindings.keys().map(|k| k.resolve()).collect();
        names.sort();
        f.debug_struct("Environment")
            .field("local", &names)
            .field("parent", &frame.parent)
            .finish()
    }
}
