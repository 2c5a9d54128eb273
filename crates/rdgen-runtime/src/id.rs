use crate::{buffer::Buffer, error::WireError};
use rdgen_primitives::{IncrementalHash64, platform_independent_hash, platform_independent_hash_from};
use std::{cell::Cell, fmt, rc::Rc};

///
/// RdId
///
/// Wire identity of a bindable entity, and the type id of a polymorphic
/// payload.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RdId(pub i64);

impl RdId {
    pub const NULL: Self = Self(0);

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Derive a child id by hashing `tail` seeded with this id.
    #[must_use]
    pub fn mix(self, tail: &str) -> Self {
        Self(platform_independent_hash_from(tail, self.0))
    }

    #[must_use]
    pub const fn mix_i64(self, tail: i64) -> Self {
        Self(IncrementalHash64::new(self.0).mix_i64(tail).result())
    }

    /// Polymorphic type id of a declaration.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        Self(platform_independent_hash(name))
    }

    pub fn read(buffer: &mut Buffer) -> Result<Self, WireError> {
        buffer.read_i64().map(Self)
    }

    pub fn write(self, buffer: &mut Buffer) {
        buffer.write_i64(self.0);
    }
}

impl fmt::Display for RdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

///
/// IdKind
///
/// The two ends allocate dynamic ids from disjoint (odd/even) sequences.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IdKind {
    Client,
    Server,
}

///
/// Identities
///
/// Dynamic id allocation shared by every entity of one protocol.
///

#[derive(Clone, Debug)]
pub struct Identities {
    kind: IdKind,
    next: Rc<Cell<i64>>,
}

impl Identities {
    #[must_use]
    pub fn new(kind: IdKind) -> Self {
        let first = match kind {
            IdKind::Client => 1,
            IdKind::Server => 2,
        };

        Self {
            kind,
            next: Rc::new(Cell::new(first)),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> IdKind {
        self.kind
    }

    /// Allocate the next dynamic id under `parent`.
    #[must_use]
    pub fn next(&self, parent: RdId) -> RdId {
        let value = self.next.get();
        self.next.set(value + 2);

        parent.mix_i64(value)
    }
}

///
/// TESTS
///
