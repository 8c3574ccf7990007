use std::cell::Cell;

thread_local! {
    /// Whether the last cache lookup on this thread was a hit.
    static LAST_WAS_HIT: Cell<bool> = const { Cell::new(false) };
}

/// Whether the last cache lookup on this thread was a hit.
pub fn last_was_hit() -> bool {
    LAST_WAS_HIT.with(Cell::get)
}

/// Marks the last lookup as a hit.
pub(crate) fn register_hit() {
    LAST_WAS_HIT.with(|cell| cell.set(true))
}

/// Marks the last lookup as a miss.
pub(crate) fn register_miss() {
    LAST_WAS_HIT.with(|cell| cell.set(false))
}
