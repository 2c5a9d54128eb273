//! Reactive primitives: storage, flags, binding and identity, plus their
//! static reader and instance writer. Delivery and scheduling live outside
//! this crate.

// reactive_node
// binding, identity and flag accessors shared by every primitive
macro_rules! reactive_node {
    ([$($g:ident),*] $ty:ty) => {
        impl<$($g),*> $crate::bindable::RdBindable for $ty {
            fn identify(&self, identities: &$crate::id::Identities, id: $crate::id::RdId) {
                self.core.base.identify(identities, id);
            }

            fn bind(
                &self,
                lifetime: &$crate::lifetime::Lifetime,
                parent: &$crate::bindable::RdBindableBase,
                name: &str,
            ) {
                self.core.base.bind(lifetime, parent, name);
                self.core.base.init(lifetime);
            }
        }

        impl<$($g),*> $crate::bindable::RdDynamic for $ty {
            fn bindable_base(&self) -> &$crate::bindable::RdBindableBase {
                &self.core.base
            }
        }

        impl<$($g),*> $ty {
            /// Values are stored inline rather than bound as nested entities.
            pub fn set_optimize_nested(&self, value: bool) {
                self.core.optimize_nested.set(value);
            }

            #[must_use]
            pub fn is_optimize_nested(&self) -> bool {
                self.core.optimize_nested.get()
            }

            pub fn set_async(&self, value: bool) {
                self.core.is_async.set(value);
            }

            #[must_use]
            pub fn is_async(&self) -> bool {
                self.core.is_async.get()
            }
        }

        impl<$($g),*> std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("rdid", &self.core.base.rdid())
                    .field("location", &self.core.base.location())
                    .finish_non_exhaustive()
            }
        }
    };
}

mod collection;
mod property;
mod signal;
mod task;

pub use collection::*;
pub use property::*;
pub use signal::*;
pub use task::*;

use crate::{bindable::RdBindableBase, lifetime::Lifetime};
use std::{cell::Cell, cell::RefCell, rc::Rc};

///
/// ReactiveCore
///
/// Base state shared by every primitive.
///

#[derive(Debug)]
pub struct ReactiveCore {
    base: RdBindableBase,
    optimize_nested: Cell<bool>,
    is_master: Cell<bool>,
    is_async: Cell<bool>,
}

impl Default for ReactiveCore {
    fn default() -> Self {
        Self {
            base: RdBindableBase::default(),
            optimize_nested: Cell::new(false),
            is_master: Cell::new(true),
            is_async: Cell::new(false),
        }
    }
}

///
/// Handlers
///
/// Listeners scoped to a lifetime; dead ones are skipped and pruned.
///

pub struct Handlers<T: ?Sized>(RefCell<Vec<(Lifetime, Rc<dyn Fn(&T)>)>>);

impl<T: ?Sized> Default for Handlers<T> {
    fn default() -> Self {
        Self(RefCell::new(Vec::new()))
    }
}

impl<T: ?Sized> Handlers<T> {
    pub fn add(&self, lifetime: &Lifetime, handler: impl Fn(&T) + 'static) {
        if lifetime.is_alive() {
            let handler: Rc<dyn Fn(&T)> = Rc::new(handler);
            self.0.borrow_mut().push((lifetime.clone(), handler));
        }
    }

    pub fn fire(&self, value: &T) {
        self.0.borrow_mut().retain(|(lifetime, _)| lifetime.is_alive());
        let live: Vec<Rc<dyn Fn(&T)>> = self.0.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in live {
            handler(value);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}


// read_core / write_core
// every primitive is prefixed by its id on the wire
pub(crate) fn read_core(
    buffer: &mut crate::buffer::Buffer,
) -> Result<ReactiveCore, crate::error::WireError> {
    let core = ReactiveCore::default();
    core.base.set_id(crate::id::RdId::read(buffer)?);

    Ok(core)
}

pub(crate) fn write_core(core: &ReactiveCore, buffer: &mut crate::buffer::Buffer) {
    core.base.rdid().write(buffer);
}
