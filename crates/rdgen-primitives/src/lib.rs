pub mod hash;

pub use hash::{IncrementalHash64, platform_independent_hash, platform_independent_hash_from};

/// Seed used by [`platform_independent_hash`] when no explicit seed is given.
pub const DEFAULT_HASH_SEED: i64 = 19;
