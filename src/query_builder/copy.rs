//! # Deep Copy
//!
//! Queries are graphs with shared nodes and back-references, so copying one
//! is an identity-keyed walk: each original node is copied at most once and
//! every reference to it resolves to the same clone.
//!
//! Mutable nodes are copied in two steps. An empty clone is registered first,
//! then the contents are filled in, so a walk that reaches the same node again
//! through a cycle finds the registered clone and stops. Back-references are
//! redirected to the clone of their target when that target was copied in the
//! same context, and keep pointing at the original otherwise.
//!
//! ```rust
//! use typesafe_query::prelude::*;
//!
//! # fn main() -> Result<(), QueryError> {
//! let query = TypeSafeQuery::new();
//! let person = query.from("Person");
//! query.filter(person.get::<i32>("age")).gt(30)?;
//!
//! let mut ctx = CopyContext::new();
//! let copy = ctx.copy(&query);
//! let person_copy = ctx.get(&person).expect("copied with the query");
//! copy.filter(person_copy.get::<String>("name")).eq("Alice")?;
//!
//! assert_eq!(query.render().text, "from Person hobj1 where hobj1.age > ?");
//! assert_eq!(
//!     copy.render().text,
//!     "from Person hobj1 where hobj1.age > ? and hobj1.name = ?"
//! );
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Maps original nodes to their copies for the duration of a copy
#[derive(Default)]
pub struct CopyContext {
    // The original is held alongside its clone so its address stays reserved.
    clones: HashMap<usize, (Rc<dyn Any>, Rc<dyn Any>)>,
}

fn identity<T: ?Sized>(node: &Rc<T>) -> usize {
    Rc::as_ptr(node) as *const () as usize
}

impl CopyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `original`, reusing any clones this context already holds
    pub fn copy<H: Copyable>(&mut self, original: &H) -> H {
        original.copy_in(self)
    }

    /// The clone of `original` made through this context, if any
    pub fn get<H: Copyable>(&self, original: &H) -> Option<H> {
        original.lookup_copy(self)
    }

    /// Number of nodes copied so far
    pub fn len(&self) -> usize {
        self.clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }

    pub(crate) fn lookup<T: 'static>(&self, original: &Rc<T>) -> Option<Rc<T>> {
        let (_, clone) = self.clones.get(&identity(original))?;
        clone.clone().downcast::<T>().ok()
    }

    pub(crate) fn register<T: 'static>(&mut self, original: &Rc<T>, clone: &Rc<T>) {
        let key = identity(original);
        let original: Rc<dyn Any> = original.clone();
        let clone: Rc<dyn Any> = clone.clone();
        self.clones.insert(key, (original, clone));
    }

    pub(crate) fn remap_weak<T: 'static>(&self, original: &Weak<T>) -> Weak<T> {
        original
            .upgrade()
            .and_then(|target| self.lookup(&target))
            .map(|clone| Rc::downgrade(&clone))
            .unwrap_or_else(|| original.clone())
    }

    /// Copy a mutable node: register `placeholder` first, then replace it with
    /// the result of `fill`
    pub(crate) fn copy_cell<N: 'static>(
        &mut self,
        original: &Rc<RefCell<N>>,
        placeholder: impl FnOnce() -> N,
        fill: impl FnOnce(&N, &mut CopyContext) -> N,
    ) -> Rc<RefCell<N>> {
        if let Some(existing) = self.lookup(original) {
            return existing;
        }
        let clone = Rc::new(RefCell::new(placeholder()));
        self.register(original, &clone);
        let contents = fill(&original.borrow(), self);
        *clone.borrow_mut() = contents;
        clone
    }
}

/// Internal deep copy of graph nodes
pub(crate) trait DeepCopy {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self;
}

impl<T: DeepCopy> DeepCopy for Vec<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        self.iter().map(|item| item.deep_copy(ctx)).collect()
    }
}

impl<T: DeepCopy> DeepCopy for Option<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        self.as_ref().map(|item| item.deep_copy(ctx))
    }
}

/// Handles that can be deep-copied through a [`CopyContext`]
pub trait Copyable: Sized {
    /// Copy through `ctx`, sharing clones with everything else copied there
    fn copy_in(&self, ctx: &mut CopyContext) -> Self;

    /// The clone of this handle already made through `ctx`
    fn lookup_copy(&self, ctx: &CopyContext) -> Option<Self>;

    /// Copy in a fresh context
    fn deep_clone(&self) -> Self {
        self.copy_in(&mut CopyContext::new())
    }
}
