use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashSet;

/// How many nested composites [`deep_equals`] enters before giving up.
pub const DEFAULT_DEPTH_LIMIT: usize = 512;

/// Check whether two values are equal on the first level.
///
/// Identical values are always equal. Composites are equal if they have the
/// same set of keys (fields, indices or map keys) and the values behind each
/// key are _identical_. Nested composites are not entered.
///
/// This is the default equality strategy of all caches in this crate.
#[inline]
pub fn shallow_equals<T: Compare + ?Sized>(a: &T, b: &T) -> bool {
    a.identical(b) || a.shallow_eq(b)
}

/// Check whether two values are structurally equal at any depth.
///
/// Shared pointers that were already compared during the same walk are
/// assumed to be equal, so cyclic values terminate. Values with more than
/// [`DEFAULT_DEPTH_LIMIT`] levels of nested composites compare as unequal.
#[inline]
pub fn deep_equals<T: Compare + ?Sized>(a: &T, b: &T) -> bool {
    deep_equals_with(a, b, &mut Walk::new())
}

/// Like [`deep_equals`], but with a caller-configured walk.
#[inline]
pub fn deep_equals_with<T: Compare + ?Sized>(a: &T, b: &T, walk: &mut Walk) -> bool {
    a.identical(b) || a.deep_eq(b, walk)
}

/// A value that can be compared by identity, shallowly and deeply.
///
/// Implement this through `#[derive(Compare)]` for your own structs and enums.
/// A derived implementation treats the declared fields as the keys of a
/// composite.
///
/// # Identity
/// Primitives are identical if their values are equal. Floats use
/// _SameValueZero_ semantics: `NaN` is identical to `NaN`. Shared pointers are
/// identical if they point to the same allocation. Owned composites are only
/// identical to themselves.
/// [`Prehashed`](crate::Prehashed) values are the exception: they are
/// identical if their precomputed hashes are equal.
pub trait Compare {
    /// Whether both values are the very same value.
    fn identical(&self, other: &Self) -> bool;

    /// Whether both values have the same keys with identical values.
    fn shallow_eq(&self, other: &Self) -> bool;

    /// Whether both values are recursively structurally equal.
    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool;
}

/// Guards the recursion of a deep comparison.
///
/// Keeps track of the nesting depth and of the pointer pairs that are being
/// or have been compared. The depth counts composites: every sequence, map,
/// tuple and derived struct or enum is one level. Transparent wrappers
/// (`Option`, `Box`, `Rc`, `Arc`, `RefCell`) add no level of their own.
///
/// A walk serves a single comparison and must not be reused afterwards.
#[derive(Debug)]
pub struct Walk {
    depth: usize,
    limit: usize,
    visited: FxHashSet<(usize, usize)>,
}

impl Walk {
    /// A walk with the default depth limit.
    pub fn new() -> Self {
        Self::with_depth_limit(DEFAULT_DEPTH_LIMIT)
    }

    /// A walk that gives up beyond `limit` levels of nesting.
    pub fn with_depth_limit(limit: usize) -> Self {
        Self { depth: 0, limit, visited: FxHashSet::default() }
    }

    /// The current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Compare one level further down.
    ///
    /// Composites call this once around the comparison of their keys.
    /// Returns `false` without calling `f` if the depth limit is reached.
    #[inline]
    pub fn nest(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        if self.depth >= self.limit {
            tracing::trace!(limit = self.limit, "deep comparison hit depth limit");
            return false;
        }
        self.depth += 1;
        let equal = f(self);
        self.depth -= 1;
        equal
    }

    /// Compare the targets of two pointers.
    ///
    /// A pair that is already being compared further up, or that compared
    /// equal before, counts as equal. If any pair turns out unequal, the
    /// whole comparison is unequal, so the assumption never leaks.
    ///
    /// Visiting does not count as a level; the targets nest on their own.
    #[inline]
    pub fn visit<T: ?Sized>(
        &mut self,
        a: *const T,
        b: *const T,
        f: impl FnOnce(&mut Self) -> bool,
    ) -> bool {
        let pair = (a as *const () as usize, b as *const () as usize);
        if !self.visited.insert(pair) {
            return true;
        }
        f(self)
    }
}

impl Default for Walk {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! primitive {
    ($($ty:ty),* $(,)?) => {$(
        impl Compare for $ty {
            #[inline]
            fn identical(&self, other: &Self) -> bool {
                self == other
            }

            #[inline]
            fn shallow_eq(&self, other: &Self) -> bool {
                self == other
            }

            #[inline]
            fn deep_eq(&self, other: &Self, _: &mut Walk) -> bool {
                self == other
            }
        }
    )*};
}

primitive! {
    (), bool, char, u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize, str, String,
    &'static str,
}

macro_rules! float {
    ($($ty:ty),*) => {$(
        impl Compare for $ty {
            #[inline]
            fn identical(&self, other: &Self) -> bool {
                self == other || (self.is_nan() && other.is_nan())
            }

            #[inline]
            fn shallow_eq(&self, other: &Self) -> bool {
                self.identical(other)
            }

            #[inline]
            fn deep_eq(&self, other: &Self, _: &mut Walk) -> bool {
                self.identical(other)
            }
        }
    )*};
}

float!(f32, f64);

impl<T: Compare> Compare for Option<T> {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.identical(b),
            _ => false,
        }
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => shallow_equals(a, b),
            _ => false,
        }
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => deep_equals_with(a, b, walk),
            _ => false,
        }
    }
}

impl<T: Compare + ?Sized> Compare for Box<T> {
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(&**self, &**other)
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        shallow_equals(&**self, &**other)
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        deep_equals_with(&**self, &**other, walk)
    }
}

macro_rules! shared {
    ($($ptr:ident),*) => {$(
        impl<T: Compare + ?Sized> Compare for $ptr<T> {
            #[inline]
            fn identical(&self, other: &Self) -> bool {
                $ptr::ptr_eq(self, other)
            }

            fn shallow_eq(&self, other: &Self) -> bool {
                shallow_equals(&**self, &**other)
            }

            fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
                walk.visit($ptr::as_ptr(self), $ptr::as_ptr(other), |walk| {
                    deep_equals_with(&**self, &**other, walk)
                })
            }
        }
    )*};
}

shared!(Rc, Arc);

impl<T: Compare + ?Sized> Compare for RefCell<T> {
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        match (self.try_borrow(), other.try_borrow()) {
            (Ok(a), Ok(b)) => shallow_equals(&*a, &*b),
            _ => false,
        }
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        match (self.try_borrow(), other.try_borrow()) {
            (Ok(a), Ok(b)) => deep_equals_with(&*a, &*b, walk),
            _ => false,
        }
    }
}

impl<T: Compare> Compare for [T] {
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.identical(b))
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        self.len() == other.len()
            && walk.nest(|walk| {
                self.iter().zip(other).all(|(a, b)| deep_equals_with(a, b, walk))
            })
    }
}

impl<T: Compare, const N: usize> Compare for [T; N] {
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        self.as_slice().shallow_eq(other.as_slice())
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        self.as_slice().deep_eq(other.as_slice(), walk)
    }
}

impl<T: Compare> Compare for Vec<T> {
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        self.as_slice().shallow_eq(other.as_slice())
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        self.as_slice().deep_eq(other.as_slice(), walk)
    }
}

impl<T: Compare> Compare for VecDeque<T> {
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.identical(b))
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        self.len() == other.len()
            && walk.nest(|walk| {
                self.iter().zip(other).all(|(a, b)| deep_equals_with(a, b, walk))
            })
    }
}

impl<K, V, S> Compare for HashMap<K, V, S>
where
    K: Eq + Hash,
    V: Compare,
    S: BuildHasher,
{
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, a)| other.get(key).is_some_and(|b| a.identical(b)))
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        self.len() == other.len()
            && walk.nest(|walk| {
                self.iter().all(|(key, a)| {
                    other.get(key).is_some_and(|b| deep_equals_with(a, b, walk))
                })
            })
    }
}

impl<K: Ord, V: Compare> Compare for BTreeMap<K, V> {
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, a)| other.get(key).is_some_and(|b| a.identical(b)))
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        self.len() == other.len()
            && walk.nest(|walk| {
                self.iter().all(|(key, a)| {
                    other.get(key).is_some_and(|b| deep_equals_with(a, b, walk))
                })
            })
    }
}

// Tuples are the usual shape of a dependency snapshot. Their elements are the
// keys, so the shallow pass compares each element by identity.
macro_rules! tuple {
    ($($param:tt $idx:tt),*) => {
        impl<$($param: Compare),*> Compare for ($($param,)*) {
            fn identical(&self, other: &Self) -> bool {
                std::ptr::eq(self, other)
            }

            fn shallow_eq(&self, other: &Self) -> bool {
                true $(&& self.$idx.identical(&other.$idx))*
            }

            fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
                walk.nest(|walk| {
                    true $(&& deep_equals_with(&self.$idx, &other.$idx, walk))*
                })
            }
        }
    };
}

tuple! { A 0 }
tuple! { A 0, B 1 }
tuple! { A 0, B 1, C 2 }
tuple! { A 0, B 1, C 2, D 3 }
tuple! { A 0, B 1, C 2, D 3, E 4 }
tuple! { A 0, B 1, C 2, D 3, E 4, F 5 }
tuple! { A 0, B 1, C 2, D 3, E 4, F 5, G 6 }
tuple! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7 }
tuple! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8 }
tuple! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9 }
tuple! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10 }
tuple! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11 }
