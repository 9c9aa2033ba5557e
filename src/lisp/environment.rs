//! Binding frames.
//!
//! Frames are reference counted so a closure can keep the frame it was
//! created in alive after the call that made it returns. Bindings sit behind
//! a `RefCell`; `define` writes to the current frame only, never through to a
//! parent.

use crate::lisp::error::{LispError, Result};
use crate::lisp::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

pub struct Frame {
    bindings: RefCell<FxHashMap<Rc<str>, Value>>,
    parent: Option<Rc<Frame>>,
    lexical_scoping: bool,
}

impl Frame {
    #[must_use]
    pub fn new(parent: Option<Rc<Self>>, lexical_scoping: bool) -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(FxHashMap::default()),
            parent,
            lexical_scoping,
        })
    }

    /// A frame with no parent.
    #[must_use]
    pub fn root() -> Rc<Self> {
        Self::new(None, true)
    }

    /// A lexically scoped frame enclosed by `parent`.
    #[must_use]
    pub fn child(parent: &Rc<Self>) -> Rc<Self> {
        Self::new(Some(Rc::clone(parent)), true)
    }

    #[must_use]
    pub const fn parent(&self) -> Option<&Rc<Self>> {
        self.parent.as_ref()
    }

    /// Frames searched by `lookup`, innermost first.
    fn chain(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |frame| {
            if frame.lexical_scoping {
                frame.parent.as_deref()
            } else {
                None
            }
        })
    }

    /// # Errors
    ///
    /// `Name` when no frame in the chain binds `name`.
    pub fn lookup(&self, name: &str) -> Result<Value> {
        self.chain()
            .find_map(|frame| frame.bindings.borrow().get(name).cloned())
            .ok_or_else(|| LispError::name(format!("'{name}' is not defined")))
    }

    /// Binds `name` in this frame, shadowing any binding in a parent.
    pub fn bind(&self, name: Rc<str>, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.chain()
            .any(|frame| frame.bindings.borrow().contains_key(name))
    }

    /// Whether this frame itself binds `name`.
    #[must_use]
    pub fn binds_locally(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }
}

// Values can hold closures that point back at this frame, so only the names
// are shown.
impl Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.bindings.borrow();
        let mut names: Vec<&Rc<str>> = bindings.keys().collect();
        names.sort();
        f.debug_struct("Frame")
            .field("names", &names)
            .field("has_parent", &self.parent.is_some())
            .field("lexical_scoping", &self.lexical_scoping)
            .finish()
    }
}
