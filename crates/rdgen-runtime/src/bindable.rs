//! Identity assignment and binding of entity trees.

use crate::{
    id::{Identities, RdId},
    lifetime::Lifetime,
};
use derive_more::Deref;
use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt,
    rc::Rc,
};

///
/// RdBindable
///
/// Anything that takes part in identity assignment and binding: entities,
/// reactive primitives, and containers of them.
///

pub trait RdBindable {
    fn identify(&self, identities: &Identities, id: RdId);

    fn bind(&self, lifetime: &Lifetime, parent: &RdBindableBase, name: &str);
}

///
/// RdDynamic
///
/// A bindable node with its own base state.
///

pub trait RdDynamic: RdBindable {
    fn bindable_base(&self) -> &RdBindableBase;

    fn rdid(&self) -> RdId {
        self.bindable_base().rdid()
    }
}

impl<T: RdBindable + ?Sized> RdBindable for Rc<T> {
    fn identify(&self, identities: &Identities, id: RdId) {
        (**self).identify(identities, id);
    }

    fn bind(&self, lifetime: &Lifetime, parent: &RdBindableBase, name: &str) {
        (**self).bind(lifetime, parent, name);
    }
}

impl<T: RdBindable> RdBindable for Option<T> {
    fn identify(&self, identities: &Identities, id: RdId) {
        if let Some(inner) = self {
            inner.identify(identities, id);
        }
    }

    fn bind(&self, lifetime: &Lifetime, parent: &RdBindableBase, name: &str) {
        if let Some(inner) = self {
            inner.bind(lifetime, parent, name);
        }
    }
}

// Vec
// items get dynamic ids, and bind under an indexed name
impl<T: RdBindable> RdBindable for Vec<T> {
    fn identify(&self, identities: &Identities, id: RdId) {
        for item in self {
            item.identify(identities, identities.next(id));
        }
    }

    fn bind(&self, lifetime: &Lifetime, parent: &RdBindableBase, name: &str) {
        for (i, item) in self.iter().enumerate() {
            item.bind(lifetime, parent, &format!("{name}[{i}]"));
        }
    }
}

///
/// ExtensionEntry
///

trait ExtensionEntry: RdBindable {
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: RdBindable + 'static> ExtensionEntry for T {
    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

///
/// RdBindableBase
///
/// Identity, location and binding scope of one node, plus the extensions
/// created on it.
///

#[derive(Default)]
pub struct RdBindableBase {
    rdid: Cell<RdId>,
    location: RefCell<String>,
    lifetime: RefCell<Option<Lifetime>>,
    identities: RefCell<Option<Identities>>,
    extensions: RefCell<BTreeMap<String, Rc<dyn ExtensionEntry>>>,
}

impl RdBindableBase {
    /// A parentless base at `location`, used as the root of a protocol.
    #[must_use]
    pub fn root(location: impl Into<String>) -> Self {
        let base = Self::default();
        base.location.replace(location.into());

        base
    }

    #[must_use]
    pub fn rdid(&self) -> RdId {
        self.rdid.get()
    }

    /// Assign the id read from the wire.
    pub fn set_id(&self, id: RdId) {
        self.rdid.set(id);
    }

    #[must_use]
    pub fn location(&self) -> String {
        self.location.borrow().clone()
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.lifetime
            .borrow()
            .as_ref()
            .is_some_and(Lifetime::is_alive)
    }

    pub fn identify(&self, identities: &Identities, id: RdId) {
        self.rdid.set(id);
        self.identities.replace(Some(identities.clone()));

        let extensions: Vec<(String, Rc<dyn ExtensionEntry>)> = self
            .extensions
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), Rc::clone(v)))
            .collect();
        for (name, ext) in extensions {
            ext.identify(identities, id.mix(&format!(".{name}")));
        }
    }

    /// Record the parent location and the scope this node is bound in.
    pub fn bind(&self, lifetime: &Lifetime, parent: &RdBindableBase, name: &str) {
        let parent_location = parent.location();
        let location = if parent_location.is_empty() {
            name.to_string()
        } else {
            format!("{parent_location}.{name}")
        };
        tracing::trace!(%location, rdid = %self.rdid(), "bind");

        self.location.replace(location);
        self.lifetime.replace(Some(lifetime.clone()));
    }

    /// Bind the extensions created before this node was bound.
    pub fn init(&self, lifetime: &Lifetime) {
        let extensions: Vec<(String, Rc<dyn ExtensionEntry>)> = self
            .extensions
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), Rc::clone(v)))
            .collect();
        for (name, ext) in extensions {
            ext.bind(lifetime, self, &name);
        }
    }

    /// The extension stored under `name`, created with `create` on first use.
    /// Extensions created on an already bound node are identified and bound
    /// immediately.
    pub fn get_or_create_extension<T: RdBindable + 'static>(
        &self,
        name: &str,
        create: impl FnOnce() -> T,
    ) -> Option<Rc<T>> {
        let existing = self.extensions.borrow().get(name).cloned();
        if let Some(existing) = existing {
            return existing.into_any().downcast::<T>().ok();
        }

        let ext = Rc::new(create());
        self.extensions
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&ext) as Rc<dyn ExtensionEntry>);

        if let Some(identities) = self.identities.borrow().clone() {
            ext.identify(&identities, self.rdid().mix(&format!(".{name}")));
        }
        if let Some(lifetime) = self.lifetime.borrow().clone() {
            ext.bind(&lifetime, self, name);
        }

        Some(ext)
    }
}

impl fmt::Debug for RdBindableBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RdBindableBase")
            .field("rdid", &self.rdid())
            .field("location", &*self.location.borrow())
            .field("extensions", &self.extensions.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

///
/// RdExtBase
///
/// Base of a toplevel: a bindable base that also carries the schema
/// fingerprint it was generated from.
///

#[derive(Debug, Default, Deref)]
pub struct RdExtBase {
    #[deref]
    bindable: RdBindableBase,
    serialization_hash: Cell<i64>,
}

impl RdExtBase {
    #[must_use]
    pub fn serialization_hash(&self) -> i64 {
        self.serialization_hash.get()
    }

    pub fn set_serialization_hash(&self, hash: i64) {
        self.serialization_hash.set(hash);
    }
}

///
/// TESTS
///
