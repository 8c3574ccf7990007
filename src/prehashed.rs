use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use crate::compare::{Compare, Walk};
use crate::hash::hash;

/// A wrapper type with precomputed hash.
///
/// Deeply comparing large dependencies on every pass can cost more than the
/// computation they guard. Wrapping such a dependency in `Prehashed` pays for
/// hashing once, when the value is built, and makes every later comparison a
/// single integer comparison, regardless of the strategy.
///
/// # Equality
/// Two prehashed values are equal if their 128-bit hashes are equal. This is
/// a superset of structural equality: values that hash equally but differ
/// would compare as equal. With high-quality 128-bit hashes the risk of such
/// a collision is negligible.
///
/// # Notice
/// For a value `v` of type `T`, `hash(v)` is not necessarily equal to
/// `hash(Prehashed::new(v))`. Writing the precomputed hash into a hasher's
/// state produces different output than writing the value's parts directly.
#[derive(Copy, Clone)]
pub struct Prehashed<T: ?Sized> {
    /// The precomputed hash.
    hash: u128,
    /// The wrapped item.
    item: T,
}

impl<T: Hash + 'static> Prehashed<T> {
    /// Compute an item's hash and wrap it.
    #[inline]
    pub fn new(item: T) -> Self {
        Self { hash: hash(&item), item }
    }

    /// Return the wrapped value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.item
    }
}

impl<T: ?Sized> Prehashed<T> {
    /// The precomputed hash.
    #[inline]
    pub fn digest(&self) -> u128 {
        self.hash
    }
}

impl<T: ?Sized> Deref for Prehashed<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.item
    }
}

impl<T: Hash + 'static> From<T> for Prehashed<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

// Identity is by hash, not by address: two separately built values with the
// same hash are identical, so a rebuilt dependency still hits the cache.
impl<T: ?Sized> Compare for Prehashed<T> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        self.hash == other.hash
    }

    #[inline]
    fn shallow_eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }

    #[inline]
    fn deep_eq(&self, other: &Self, _: &mut Walk) -> bool {
        self.hash == other.hash
    }
}

impl<T: ?Sized> Hash for Prehashed<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u128(self.hash);
    }
}

impl<T: Debug + ?Sized> Debug for Prehashed<T> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.item.fmt(f)
    }
}

impl<T: Default + Hash + 'static> Default for Prehashed<T> {
    #[inline]
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> Eq for Prehashed<T> {}

impl<T: ?Sized> PartialEq for Prehashed<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl<T: Ord + ?Sized> Ord for Prehashed<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.item.cmp(&other.item)
    }
}

impl<T: PartialOrd + ?Sized> PartialOrd for Prehashed<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.item.partial_cmp(&other.item)
    }
}
