use crate::{error::WireError, id::RdId, serialization::SerializationCtx};
use std::{
    any::{Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    fmt,
    hash::Hash,
};

///
/// InternTable
///

struct InternTable<V> {
    outgoing: HashMap<V, i32>,
    incoming: Vec<V>,
}

impl<V> Default for InternTable<V> {
    fn default() -> Self {
        Self {
            outgoing: HashMap::new(),
            incoming: Vec::new(),
        }
    }
}

///
/// InternRoot
///
/// Per-scope dedup tables owned by one entity. Each value type gets its own
/// index space; both ends assign indices in first-occurrence order.
///

pub struct InternRoot {
    owner: RdId,
    key: i64,
    tables: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl InternRoot {
    #[must_use]
    pub fn new(owner: RdId, key: i64) -> Self {
        Self {
            owner,
            key,
            tables: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn owner(&self) -> RdId {
        self.owner
    }

    #[must_use]
    pub const fn key(&self) -> i64 {
        self.key
    }

    fn with_table<V, R>(&self, f: impl FnOnce(&mut InternTable<V>) -> R) -> Option<R>
    where
        V: Clone + Eq + Hash + 'static,
    {
        let mut tables = self.tables.borrow_mut();
        let entry = tables
            .entry(TypeId::of::<V>())
            .or_insert_with(|| Box::new(InternTable::<V>::default()));

        // tables are keyed by their value type, so the downcast always succeeds
        entry.downcast_mut::<InternTable<V>>().map(f)
    }

    /// Index of a value already sent in this scope.
    #[must_use]
    pub fn lookup<V: Clone + Eq + Hash + 'static>(&self, value: &V) -> Option<i32> {
        self.with_table(|t: &mut InternTable<V>| t.outgoing.get(value).copied())
            .flatten()
    }

    pub fn remember_outgoing<V: Clone + Eq + Hash + 'static>(&self, value: V) {
        self.with_table(|t: &mut InternTable<V>| {
            let index = i32::try_from(t.outgoing.len()).unwrap_or(i32::MAX);
            t.outgoing.entry(value).or_insert(index);
        });
    }

    pub fn remember_incoming<V: Clone + Eq + Hash + 'static>(&self, value: V) {
        self.with_table(|t: &mut InternTable<V>| t.incoming.push(value));
    }

    /// Value received earlier under `index`.
    #[must_use]
    pub fn resolve<V: Clone + Eq + Hash + 'static>(&self, index: i32) -> Option<V> {
        let index = usize::try_from(index).ok()?;

        self.with_table(|t: &mut InternTable<V>| t.incoming.get(index).cloned())
            .flatten()
    }
}

impl fmt::Debug for InternRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternRoot")
            .field("owner", &self.owner)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

///
/// InternRootsSlot
///
/// Holds the serialization context an intern-root entity attached on its
/// last read or write.
///

#[derive(Debug, Default)]
pub struct InternRootsSlot(RefCell<Option<SerializationCtx>>);

impl InternRootsSlot {
    /// Attach fresh intern tables for one payload and return the context its
    /// members use. Every payload starts from empty tables, so it decodes on
    /// its own.
    pub fn attach(&self, ctx: &SerializationCtx, owner: RdId, keys: &[i64]) -> SerializationCtx {
        let attached = ctx.with_intern_roots_here(owner, keys);
        *self.0.borrow_mut() = Some(attached.clone());

        attached
    }

    pub fn get(&self) -> Result<SerializationCtx, WireError> {
        self.0.borrow().clone().ok_or(WireError::ContextNotAttached)
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.0.borrow().is_some()
    }
}

///
/// TESTS
///
