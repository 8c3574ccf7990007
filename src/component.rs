use std::convert::Infallible;

use crate::compare::{Compare, deep_equals, shallow_equals};
use crate::store::Store;

/// A render function that skips rendering while its props stay equal.
///
/// A `Memo` is created once per component definition and can be shared by
/// any number of instances. The last props and output are kept in the slot
/// storage of the instance that renders, so instances never see each other's
/// output.
pub struct Memo<R, E> {
    render: R,
    equals: E,
}

/// Wrap a render function, comparing props with [`shallow_equals`].
pub fn memo<P, O, R>(render: R) -> Memo<R, fn(&P, &P) -> bool>
where
    P: Compare,
    R: Fn(&P) -> O,
{
    memo_with(render, shallow_equals::<P> as fn(&P, &P) -> bool)
}

/// Wrap a render function, comparing props with [`deep_equals`].
pub fn deep_memo<P, O, R>(render: R) -> Memo<R, fn(&P, &P) -> bool>
where
    P: Compare,
    R: Fn(&P) -> O,
{
    memo_with(render, deep_equals::<P> as fn(&P, &P) -> bool)
}

/// Wrap a render function with a custom props equality strategy.
pub fn memo_with<R, E>(render: R, equals: E) -> Memo<R, E> {
    Memo { render, equals }
}

impl<R, E> Memo<R, E> {
    /// Render with the given props or reuse the previous output.
    ///
    /// The output is reused if the props of this instance's previous pass
    /// equal the current ones. The stored props are replaced on every call,
    /// so the comparison is always against the immediately preceding pass.
    pub fn render<S, P, O>(&self, store: &mut S, props: P) -> O
    where
        S: Store,
        R: Fn(&P) -> O,
        E: Fn(&P, &P) -> bool,
        P: 'static,
        O: Clone + 'static,
    {
        match self.run(store, props, |props| Ok::<_, Infallible>((self.render)(props))) {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }

    /// Like [`render`](Self::render), but for a fallible render function.
    ///
    /// A failed render leaves the stored props and output untouched.
    pub fn try_render<S, P, O, X>(&self, store: &mut S, props: P) -> Result<O, X>
    where
        S: Store,
        R: Fn(&P) -> Result<O, X>,
        E: Fn(&P, &P) -> bool,
        P: 'static,
        O: Clone + 'static,
    {
        self.run(store, props, &self.render)
    }

    fn run<S, P, O, X>(
        &self,
        store: &mut S,
        props: P,
        render: impl FnOnce(&P) -> Result<O, X>,
    ) -> Result<O, X>
    where
        S: Store,
        E: Fn(&P, &P) -> bool,
        P: 'static,
        O: Clone + 'static,
    {
        let enabled = store.memoization_enabled();
        let last = store.slot(|| None::<Rendered<P, O>>);

        if enabled
            && let Some(prev) = last.as_mut()
            && (self.equals)(&prev.props, &props)
        {
            prev.props = props;
            tracing::trace!("memo component hit");

            #[cfg(feature = "testing")]
            crate::testing::register_hit();

            return Ok(prev.output.clone());
        }

        let output = render(&props)?;
        if enabled {
            *last = Some(Rendered { props, output: output.clone() });
        }

        tracing::trace!("memo component miss");

        #[cfg(feature = "testing")]
        crate::testing::register_miss();

        Ok(output)
    }
}

/// The props and output of an instance's last pass.
struct Rendered<P, O> {
    props: P,
    output: O,
}
