//! Stateless 64-bit mixing, a building block for collectors that need
//! approximate cardinality or bucketing.

/// Mix a 64-bit value with a seed into a well-distributed 64-bit hash.
///
/// This is the finalizer of MurmurHash3 applied to `x + seed`; callers
/// shouldn't rely on the exact construction. Pure and allocation-free, safe
/// to call from any number of threads.
pub fn hash64(x: u64, seed: u64) -> u64 {
    let mut x = x.wrapping_add(seed);
    x = (x ^ (x >> 33)).wrapping_mul(0xff51afd7ed558ccd);
    x = (x ^ (x >> 33)).wrapping_mul(0xc4ceb9fe1a85ec53);
    x ^ (x >> 33)
}

/// [`hash64`] with the default seed.
pub fn hash64_default(x: u64) -> u64 {
    hash64(x, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(hash64(42, 7), hash64(42, 7));
        assert_eq!(hash64_default(42), hash64(42, 100));
    }

    #[test]
    fn zero_input_zero_seed_is_fixed_point() {
        assert_eq!(hash64(0, 0), 0);
    }

    #[test]
    fn input_and_seed_both_matter() {
        assert_ne!(hash64(1, 0), hash64(2, 0));
        assert_ne!(hash64(1, 0), hash64(1, 1));
        // seed is combined additively before mixing
        assert_eq!(hash64(1, 2), hash64(2, 1));
    }
}
