use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;
use std::rc::Rc;

use crate::compare::{Compare, Walk};
use crate::memo::use_memo;
use crate::store::Store;

/// A shared reference to a function that compares by identity.
///
/// Two callbacks are equal under every strategy if and only if they were
/// cloned from the same [`Callback::new`] call. This is what makes props that
/// carry callbacks stable under [`shallow_equals`](crate::shallow_equals).
pub struct Callback<F: ?Sized>(Rc<F>);

impl<F> Callback<F> {
    /// Wrap a function.
    pub fn new(f: F) -> Self {
        Self(Rc::new(f))
    }
}

impl<F: ?Sized> Callback<F> {
    /// Whether both callbacks refer to the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<F: ?Sized> Deref for Callback<F> {
    type Target = F;

    #[inline]
    fn deref(&self) -> &F {
        &self.0
    }
}

impl<F: ?Sized> Clone for Callback<F> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<F: ?Sized> From<Rc<F>> for Callback<F> {
    fn from(f: Rc<F>) -> Self {
        Self(f)
    }
}

impl<F: ?Sized> Debug for Callback<F> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad("Callback(..)")
    }
}

impl<F: ?Sized> Compare for Callback<F> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }

    #[inline]
    fn shallow_eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }

    #[inline]
    fn deep_eq(&self, other: &Self, _: &mut Walk) -> bool {
        self.ptr_eq(other)
    }
}

/// Keep the same callback while the dependencies stay equal.
///
/// The function is never called here. On a cache hit the `f` passed in is
/// dropped and the callback from an earlier pass is returned instead.
pub fn use_callback<S, F, D>(store: &mut S, f: F, deps: D) -> Callback<F>
where
    S: Store,
    F: 'static,
    D: Compare + 'static,
{
    use_memo(store, move || Callback::new(f), deps)
}
