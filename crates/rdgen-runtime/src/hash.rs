//! Java-style hashing shared by every backend, so hash codes agree across
//! processes.

use crate::id::RdId;
use rdgen_primitives::platform_independent_hash_from;
use std::rc::Rc;

/// Multiplier used when folding member hashes.
pub const HASH_MULTIPLIER: i64 = 31;

///
/// RdHash
///

pub trait RdHash {
    fn rd_hash(&self) -> i64;
}

/// Fold one more component into an accumulated hash.
#[must_use]
pub const fn combine(acc: i64, component: i64) -> i64 {
    acc.wrapping_mul(HASH_MULTIPLIER).wrapping_add(component)
}

macro_rules! widen {
    ($($ty:ty),*) => {
        $(
            impl RdHash for $ty {
                fn rd_hash(&self) -> i64 {
                    i64::from(*self)
                }
            }
        )*
    };
}

widen!(i8, i16, i32, i64, u16);

impl RdHash for bool {
    fn rd_hash(&self) -> i64 {
        if *self { 1231 } else { 1237 }
    }
}

impl RdHash for f32 {
    fn rd_hash(&self) -> i64 {
        i64::from(self.to_bits())
    }
}

impl RdHash for f64 {
    fn rd_hash(&self) -> i64 {
        let bits = self.to_bits();

        i64::from_ne_bytes((bits ^ (bits >> 32)).to_ne_bytes())
    }
}

impl RdHash for str {
    fn rd_hash(&self) -> i64 {
        platform_independent_hash_from(self, 0)
    }
}

impl RdHash for String {
    fn rd_hash(&self) -> i64 {
        self.as_str().rd_hash()
    }
}

impl RdHash for RdId {
    fn rd_hash(&self) -> i64 {
        self.0
    }
}

impl<T: RdHash> RdHash for Option<T> {
    fn rd_hash(&self) -> i64 {
        self.as_ref().map_or(0, RdHash::rd_hash)
    }
}

impl<T: RdHash> RdHash for Vec<T> {
    fn rd_hash(&self) -> i64 {
        self.iter().fold(1, |acc, item| combine(acc, item.rd_hash()))
    }
}

impl<T: RdHash + ?Sized> RdHash for Rc<T> {
    fn rd_hash(&self) -> i64 {
        (**self).rd_hash()
    }
}

///
/// TESTS
///
