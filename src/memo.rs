use std::convert::Infallible;

use crate::cell::use_ref_with;
use crate::compare::{Compare, Walk, deep_equals_with, shallow_equals};
use crate::store::Store;

/// Compute a value once and reuse it while the dependencies stay equal.
///
/// The dependencies are compared with [`shallow_equals`]. For a tuple this
/// means that each element must be _identical_ to the one of the previous
/// pass.
///
/// ```
/// # use rememo::{Runtime, use_memo};
/// let mut runtime = Runtime::new();
/// let id = runtime.mount();
/// let total = runtime
///     .render(id, |cx| use_memo(cx, || (1..=100).sum::<u32>(), (1, 100)))
///     .unwrap();
/// assert_eq!(total, 5050);
/// ```
pub fn use_memo<S, D, T>(store: &mut S, producer: impl FnOnce() -> T, deps: D) -> T
where
    S: Store,
    D: Compare + 'static,
    T: Clone + 'static,
{
    use_memo_with(store, producer, deps, shallow_equals::<D>)
}

/// Like [`use_memo`], but compares the dependencies structurally.
///
/// The comparison descends at most [`Store::depth_limit`] levels.
pub fn use_deep_memo<S, D, T>(store: &mut S, producer: impl FnOnce() -> T, deps: D) -> T
where
    S: Store,
    D: Compare + 'static,
    T: Clone + 'static,
{
    let limit = store.depth_limit();
    use_memo_with(store, producer, deps, |a: &D, b: &D| {
        deep_equals_with(a, b, &mut Walk::with_depth_limit(limit))
    })
}

/// Like [`use_memo`], but with a custom equality strategy.
///
/// The strategy receives the previous and the current dependencies as a
/// whole, not element by element.
pub fn use_memo_with<S, D, T, Q>(
    store: &mut S,
    producer: impl FnOnce() -> T,
    deps: D,
    equals: Q,
) -> T
where
    S: Store,
    D: 'static,
    T: Clone + 'static,
    Q: Fn(&D, &D) -> bool,
{
    match try_use_memo_with(store, || Ok::<_, Infallible>(producer()), deps, equals) {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Like [`use_memo`], but with a fallible producer.
///
/// If the producer fails, the cache keeps its previous entry and the error is
/// returned as is.
pub fn try_use_memo<S, D, T, E>(
    store: &mut S,
    producer: impl FnOnce() -> Result<T, E>,
    deps: D,
) -> Result<T, E>
where
    S: Store,
    D: Compare + 'static,
    T: Clone + 'static,
{
    try_use_memo_with(store, producer, deps, shallow_equals::<D>)
}

/// Like [`try_use_memo`], but with a custom equality strategy.
pub fn try_use_memo_with<S, D, T, E, Q>(
    store: &mut S,
    producer: impl FnOnce() -> Result<T, E>,
    deps: D,
    equals: Q,
) -> Result<T, E>
where
    S: Store,
    D: 'static,
    T: Clone + 'static,
    Q: Fn(&D, &D) -> bool,
{
    let cell = use_ref_with(store, || None::<Entry<D, T>>);

    let cached = store
        .memoization_enabled()
        .then(|| {
            cell.with(|entry| {
                entry
                    .as_ref()
                    .filter(|entry| equals(&entry.deps, &deps))
                    .map(|entry| entry.value.clone())
            })
        })
        .flatten();

    if let Some(value) = cached {
        tracing::trace!("memo hit");

        #[cfg(feature = "testing")]
        crate::testing::register_hit();

        return Ok(value);
    }

    // The entry is only replaced once the producer succeeded.
    let value = producer()?;
    if store.memoization_enabled() {
        cell.set(Some(Entry { deps, value: value.clone() }));
    }

    tracing::trace!("memo miss");

    #[cfg(feature = "testing")]
    crate::testing::register_miss();

    Ok(value)
}

/// The dependencies and result of the last computation.
struct Entry<D, T> {
    deps: D,
    value: T,
}
