//! Render-pass memoization.
//!
//! Building blocks for components that run over and over again:
//!
//! - [`shallow_equals`] and [`deep_equals`] compare values through the
//!   [`Compare`] trait, which can be derived for your own types.
//! - [`use_ref`] persists a mutable cell across the passes of an instance.
//! - [`use_memo`] recomputes a value only when its dependencies change, and
//!   [`use_callback`] keeps a function stable in the same way.
//! - [`memo`] skips a whole render function while its props stay equal.
//!
//! The hooks store their state through the host's [`Store`]. [`Runtime`] is
//! a small host that hands out stable per-instance storage.

mod callback;
mod cell;
mod compare;
mod component;
mod error;
mod hash;
mod memo;
mod prehashed;
mod runtime;
mod store;
#[cfg(feature = "testing")]
mod testing;
mod value;

pub use crate::callback::{Callback, use_callback};
pub use crate::cell::{Persistent, use_ref, use_ref_with};
pub use crate::compare::{
    Compare, DEFAULT_DEPTH_LIMIT, Walk, deep_equals, deep_equals_with, shallow_equals,
};
pub use crate::component::{Memo, deep_memo, memo, memo_with};
pub use crate::error::{Error, Result};
pub use crate::memo::{try_use_memo, try_use_memo_with, use_deep_memo, use_memo, use_memo_with};
pub use crate::prehashed::Prehashed;
pub use crate::runtime::{Config, InstanceId, Runtime, Scope};
pub use crate::store::Store;
pub use crate::value::{Func, Kind, Value};

#[cfg(feature = "macros")]
pub use rememo_macros::Compare;

/// These are implementation details. Do not rely on them!
#[cfg(feature = "testing")]
#[doc(hidden)]
pub mod internal {
    pub use crate::testing::last_was_hit;
}
