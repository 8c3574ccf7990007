use crate::compare::DEFAULT_DEPTH_LIMIT;

/// Persistent storage provided by the host runtime.
///
/// A store belongs to one instance during one render pass. Each call to
/// [`slot`](Self::slot) hands out the next storage slot of that instance. On
/// the first pass the slot is created with `init`; on every later pass of the
/// same instance the previously created slot is returned and `init` is not
/// called.
///
/// All hooks of this crate are built on top of this trait and do not track
/// instance identity themselves.
pub trait Store {
    /// Acquire the next slot of the current instance.
    fn slot<T: 'static>(&mut self, init: impl FnOnce() -> T) -> &mut T;

    /// Whether caches should be consulted at all.
    ///
    /// If this returns `false`, every cache recomputes its value while still
    /// acquiring its slot.
    fn memoization_enabled(&self) -> bool {
        true
    }

    /// How many nested composites deep comparisons may descend into.
    fn depth_limit(&self) -> usize {
        DEFAULT_DEPTH_LIMIT
    }
}

impl<S: Store> Store for &mut S {
    #[inline]
    fn slot<T: 'static>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        (**self).slot(init)
    }

    #[inline]
    fn memoization_enabled(&self) -> bool {
        (**self).memoization_enabled()
    }

    #[inline]
    fn depth_limit(&self) -> usize {
        (**self).depth_limit()
    }
}
