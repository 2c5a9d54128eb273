//! Platform-independent hashing shared by the generator and the wire runtime.
//!
//! Both sides fold UTF-16 code units, so a scope or type name hashes to the
//! same 64-bit value whatever the host string encoding is.

use crate::DEFAULT_HASH_SEED;

const MULTIPLIER: i64 = 31;

/// Hash a string with the default seed.
#[must_use]
pub fn platform_independent_hash(s: &str) -> i64 {
    platform_independent_hash_from(s, DEFAULT_HASH_SEED)
}

/// Hash a string starting from an explicit seed.
#[must_use]
pub fn platform_independent_hash_from(s: &str, seed: i64) -> i64 {
    s.encode_utf16().fold(seed, |acc, unit| {
        acc.wrapping_mul(MULTIPLIER).wrapping_add(i64::from(unit))
    })
}

///
/// IncrementalHash64
///
/// Order-sensitive accumulator used for structural fingerprints.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IncrementalHash64 {
    result: i64,
}

impl IncrementalHash64 {
    #[must_use]
    pub const fn new(seed: i64) -> Self {
        Self { result: seed }
    }

    #[must_use]
    pub fn mix_str(self, s: &str) -> Self {
        Self {
            result: platform_independent_hash_from(s, self.result),
        }
    }

    #[must_use]
    pub const fn mix_i64(self, value: i64) -> Self {
        Self {
            result: self.result.wrapping_mul(MULTIPLIER).wrapping_add(value),
        }
    }

    #[must_use]
    pub const fn mix_bool(self, value: bool) -> Self {
        self.mix_i64(if value { 1 } else { 0 })
    }

    #[must_use]
    pub const fn result(self) -> i64 {
        self.result
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_string_hashes_to_seed() {
        assert_eq!(platform_independent_hash(""), DEFAULT_HASH_SEED);
        assert_eq!(platform_independent_hash_from("", 7), 7);
    }

    #[test]
    fn ascii_fold_matches_reference_arithmetic() {
        // 19*31 + 'a'(97) = 686, 686*31 + 'b'(98) = 21364
        assert_eq!(platform_independent_hash("ab"), 21_364);
    }

    #[test]
    fn non_bmp_characters_fold_as_surrogate_pairs() {
        let expected = [0xD83D_u16, 0xDE00]
            .iter()
            .fold(DEFAULT_HASH_SEED, |acc, u| acc * 31 + i64::from(*u));

        assert_eq!(platform_independent_hash("\u{1F600}"), expected);
    }

    #[test]
    fn incremental_hash_is_order_sensitive() {
        let ab = IncrementalHash64::default().mix_str("a").mix_str("b");
        let ba = IncrementalHash64::default().mix_str("b").mix_str("a");

        assert_ne!(ab.result(), ba.result());
    }

    proptest! {
        #[test]
        fn seeding_composes_with_concatenation(a in ".{0,16}", b in ".{0,16}") {
            let joined = format!("{a}{b}");
            let chained = platform_independent_hash_from(&b, platform_independent_hash(&a));

            prop_assert_eq!(platform_independent_hash(&joined), chained);
        }

        #[test]
        fn mix_str_matches_seeded_hash(seed in any::<i64>(), s in ".{0,16}") {
            let mixed = IncrementalHash64::new(seed).mix_str(&s).result();

            prop_assert_eq!(mixed, platform_independent_hash_from(&s, seed));
        }
    }
}
