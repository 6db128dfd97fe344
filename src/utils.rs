/// Bit 63 of a length mask stands for "some key of length >= 64".
pub const LONG_KEY_BIT: u64 = 1u64 << 63;

/// Bit index used for a key of `len` codepoints (`len >= 1`).
#[inline]
pub fn length_bit(len: usize) -> u64 {
    debug_assert!(len > 0);
    1u64 << (len.min(64) - 1)
}

/// Calls `f` with every candidate length present in `mask`, longest first,
/// never exceeding `limit`. Stops as soon as `f` returns `true`.
///
/// Lengths 1..=63 map to bits 0..=62. When [`LONG_KEY_BIT`] is set and
/// `limit >= 64`, every length from `limit` down to 64 is tried, since the mask
/// does not say which of them exist.
///
/// ```
/// use opencc_engine::utils::{for_each_len_dec, length_bit};
///
/// let mask = length_bit(1) | length_bit(3) | length_bit(4);
/// let mut seen = Vec::new();
/// for_each_len_dec(mask, 3, |len| {
///     seen.push(len);
///     false
/// });
/// assert_eq!(seen, vec![3, 1]);
/// ```
#[inline]
pub fn for_each_len_dec(mask: u64, limit: usize, mut f: impl FnMut(usize) -> bool) {
    if mask == 0 || limit == 0 {
        return;
    }
    if limit >= 64 && mask & LONG_KEY_BIT != 0 {
        for len in (64..=limit).rev() {
            if f(len) {
                return;
            }
        }
    }

    // Bits for lengths 1..=min(limit, 63).
    let short_limit = limit.min(63) as u32;
    let mut remaining = mask & ((1u64 << short_limit) - 1);
    while remaining != 0 {
        let bit = 63 - remaining.leading_zeros();
        if f(bit as usize + 1) {
            return;
        }
        remaining &= !(1u64 << bit);
    }
}
