use std::cell::{Ref, RefCell, RefMut};
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use crate::store::Store;

/// A mutable value that persists across the render passes of one instance.
///
/// All handles acquired for the same slot share one value: a mutation through
/// any of them is visible through all others. Mutating a handle does not
/// trigger a re-render.
pub struct Persistent<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> Persistent<T> {
    /// Create a new, unattached handle.
    pub fn new(value: T) -> Self {
        Self { inner: Rc::new(RefCell::new(value)) }
    }

    /// Borrow the current value immutably.
    pub fn current(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    /// Borrow the current value mutably.
    pub fn current_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    /// Run `f` with an immutable reference to the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Run `f` with a mutable reference to the current value.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Overwrite the current value in place.
    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }

    /// Overwrite the current value in place, returning the old one.
    pub fn replace(&self, value: T) -> T {
        self.inner.replace(value)
    }

    /// Whether two handles refer to the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Persistent<T> {
    /// Clone the current value out.
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }
}

impl<T> Clone for Persistent<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: Debug> Debug for Persistent<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(value) => f.debug_tuple("Persistent").field(&*value).finish(),
            Err(_) => f.pad("Persistent(<borrowed>)"),
        }
    }
}

/// Acquire a persistent cell initialized with `initial`.
///
/// The initial value is only used on the instance's first pass. Later passes
/// drop it and return a handle to the same cell as before.
pub fn use_ref<S, T>(store: &mut S, initial: T) -> Persistent<T>
where
    S: Store,
    T: 'static,
{
    use_ref_with(store, || initial)
}

/// Acquire a persistent cell, computing the initial value only when needed.
pub fn use_ref_with<S, T>(store: &mut S, init: impl FnOnce() -> T) -> Persistent<T>
where
    S: Store,
    T: 'static,
{
    store.slot(|| Persistent::new(init())).clone()
}
