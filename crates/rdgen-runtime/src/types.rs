//! Runtime value types for predefined schema types without a std counterpart.

use crate::hash::RdHash;
use std::fmt;

///
/// Void
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Void;

///
/// DateTime
///
/// Ticks since the epoch, as carried on the wire.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DateTime(pub i64);

///
/// Guid
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Guid(pub u128);

///
/// Uri
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Uri(pub String);

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

///
/// SecureString
///
/// Same wire form as a string; never printed.
///

#[derive(Clone, Default, Eq, Hash, PartialEq)]
pub struct SecureString(pub String);

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString(***)")
    }
}

impl RdHash for Void {
    fn rd_hash(&self) -> i64 {
        0
    }
}

impl RdHash for DateTime {
    fn rd_hash(&self) -> i64 {
        self.0
    }
}

impl RdHash for Guid {
    fn rd_hash(&self) -> i64 {
        let high = i64::from_le_bytes(self.0.to_le_bytes()[8..].try_into().unwrap_or_default());
        let low = i64::from_le_bytes(self.0.to_le_bytes()[..8].try_into().unwrap_or_default());

        high.wrapping_mul(31).wrapping_add(low)
    }
}

impl RdHash for Uri {
    fn rd_hash(&self) -> i64 {
        self.0.rd_hash()
    }
}

impl RdHash for SecureString {
    fn rd_hash(&self) -> i64 {
        self.0.rd_hash()
    }
}
