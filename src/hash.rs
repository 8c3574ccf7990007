use std::any::Any;
use std::hash::Hash;

use siphasher::sip128::{Hasher128, SipHasher13};

/// Produce a 128-bit hash of a value and its type.
#[inline]
pub fn hash<T: Hash + Any + ?Sized>(value: &T) -> u128 {
    let mut state = SipHasher13::new();
    value.type_id().hash(&mut state);
    value.hash(&mut state);
    state.finish128().as_u128()
}
