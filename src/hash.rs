//! Bucket selection for string keys.

/// Maps `key` to a bucket index in `[0, capacity)`.
///
/// Walks the key's UTF-16 code units left to right with
/// `h = (31 * h + unit) % capacity`, reducing at every step rather than once
/// at the end. The result depends on `capacity`, so every entry has to be
/// re-bucketed whenever the capacity changes.
///
/// Panics if `capacity` is zero.
pub fn bucket_index(key: &str, capacity: usize) -> usize {
    assert!(capacity > 0, "bucket_index requires a positive capacity");
    key.encode_utf16()
        .fold(0usize, |h, unit| (31 * h + usize::from(unit)) % capacity)
}
