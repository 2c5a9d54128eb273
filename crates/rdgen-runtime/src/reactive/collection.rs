use crate::{
    buffer::Buffer,
    error::WireError,
    reactive::{ReactiveCore, read_core, write_core},
    serialization::{Codec, RdSerializable, SerializationCtx},
};
use std::{cell::RefCell, marker::PhantomData};

///
/// RdList
///

pub struct RdList<T, C> {
    core: ReactiveCore,
    items: RefCell<Vec<T>>,
    codec: PhantomData<C>,
}

reactive_node!([T, C] RdList<T, C>);

impl<T, C> Default for RdList<T, C> {
    fn default() -> Self {
        Self {
            core: ReactiveCore::default(),
            items: RefCell::new(Vec::new()),
            codec: PhantomData,
        }
    }
}

impl<T, C> RdList<T, C> {
    pub fn add(&self, item: T) {
        self.items.borrow_mut().push(item);
    }

    pub fn remove_at(&self, index: usize) -> Option<T> {
        let mut items = self.items.borrow_mut();
        (index < items.len()).then(|| items.remove(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl<T: Clone, C> RdList<T, C> {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.borrow().clone()
    }
}

///
/// RdSet
///

pub struct RdSet<T, C> {
    core: ReactiveCore,
    items: RefCell<Vec<T>>,
    codec: PhantomData<C>,
}

reactive_node!([T, C] RdSet<T, C>);

impl<T, C> Default for RdSet<T, C> {
    fn default() -> Self {
        Self {
            core: ReactiveCore::default(),
            items: RefCell::new(Vec::new()),
            codec: PhantomData,
        }
    }
}

impl<T: PartialEq, C> RdSet<T, C> {
    /// Insert unless present; returns whether the set changed.
    pub fn add(&self, item: T) -> bool {
        let mut items = self.items.borrow_mut();
        if items.contains(&item) {
            return false;
        }
        items.push(item);

        true
    }

    pub fn remove(&self, item: &T) -> bool {
        let mut items = self.items.borrow_mut();
        let before = items.len();
        items.retain(|i| i != item);

        items.len() != before
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.items.borrow().contains(item)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

///
/// RdMap
///
/// Only the master side of a map resolves conflicting updates.
///

pub struct RdMap<K, V, KC, VC> {
    core: ReactiveCore,
    entries: RefCell<Vec<(K, V)>>,
    codec: PhantomData<(KC, VC)>,
}

reactive_node!([K, V, KC, VC] RdMap<K, V, KC, VC>);

impl<K, V, KC, VC> Default for RdMap<K, V, KC, VC> {
    fn default() -> Self {
        Self {
            core: ReactiveCore::default(),
            entries: RefCell::new(Vec::new()),
            codec: PhantomData,
        }
    }
}

impl<K, V, KC, VC> RdMap<K, V, KC, VC> {
    pub fn set_master(&self, value: bool) {
        self.core.is_master.set(value);
    }

    #[must_use]
    pub fn is_master(&self) -> bool {
        self.core.is_master.get()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<K: PartialEq, V: Clone, KC, VC> RdMap<K, V, KC, VC> {
    /// Insert or replace; returns the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut entries = self.entries.borrow_mut();
        if let Some((_, slot)) = entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }
        entries.push((key, value));

        None
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.borrow_mut();
        let index = entries.iter().position(|(k, _)| k == key)?;

        Some(entries.remove(index).1)
    }
}

// collections carry only their id; contents travel as separate updates
macro_rules! id_only_wire {
    ([$($g:ident),*] $ty:ty, $($bound:tt)*) => {
        impl<$($g),*> RdSerializable for $ty where $($bound)* {
            fn read(_: &SerializationCtx, buffer: &mut Buffer) -> Result<Self, WireError> {
                Ok(Self {
                    core: read_core(buffer)?,
                    ..Self::default()
                })
            }

            fn write(&self, _: &SerializationCtx, buffer: &mut Buffer) -> Result<(), WireError> {
                write_core(&self.core, buffer);
                Ok(())
            }
        }
    };
}

id_only_wire!([T, C] RdList<T, C>, C: Codec<Value = T>);
id_only_wire!([T, C] RdSet<T, C>, C: Codec<Value = T>);
id_only_wire!([K, V, KC, VC] RdMap<K, V, KC, VC>, KC: Codec<Value = K>, VC: Codec<Value = V>);

///
/// TESTS
///
