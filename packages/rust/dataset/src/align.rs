//! Positional sentinel insertion into an ordered sequence.

use reeltab_shared::{ReeltabError, Result};

/// Merge `sentinels` into `values` at the requested `positions`, returning a
/// new sequence and leaving the inputs untouched.
///
/// A position `p` places the sentinel immediately after the `p`-th source
/// element, so `p = 0` puts it before the first and `p = values.len()`
/// appends it. Several sentinels requested at the same position come out in
/// the order they were supplied.
///
/// The merge is done by sorting on composite keys rather than repeated
/// insert-at-index: source element `i` (1-based) gets key `(i, 0, 0)` and
/// sentinel `k` at position `p` gets key `(p, 1, k)`. Ascending key order
/// interleaves both sequences in one O((n+m) log(n+m)) pass, and the middle
/// component guarantees a sentinel lands after the source element it shares
/// a position with.
///
/// # Errors
///
/// - [`LengthMismatch`] when `positions` and `sentinels` differ in length.
/// - [`InvalidPosition`] when any position exceeds `values.len()`.
///
/// [`LengthMismatch`]: ReeltabError::LengthMismatch
/// [`InvalidPosition`]: ReeltabError::InvalidPosition
pub fn align<T: Clone>(values: &[T], positions: &[usize], sentinels: &[T]) -> Result<Vec<T>> {
    if positions.len() != sentinels.len() {
        return Err(ReeltabError::length_mismatch(format!(
            "{} insertion positions but {} sentinel values",
            positions.len(),
            sentinels.len()
        )));
    }

    if let Some(&bad) = positions.iter().find(|&&p| p > values.len()) {
        return Err(ReeltabError::InvalidPosition {
            position: bad,
            len: values.len(),
        });
    }

    let mut keyed: Vec<((usize, u8, usize), T)> =
        Vec::with_capacity(values.len() + sentinels.len());

    for (i, value) in values.iter().enumerate() {
        keyed.push(((i + 1, 0, 0), value.clone()));
    }
    for (k, (&p, sentinel)) in positions.iter().zip(sentinels).enumerate() {
        keyed.push(((p, 1, k), sentinel.clone()));
    }

    keyed.sort_by_key(|(key, _)| *key);

    Ok(keyed.into_iter().map(|(_, value)| value).collect())
}
