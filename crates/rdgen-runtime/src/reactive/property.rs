use crate::{
    buffer::Buffer,
    error::WireError,
    lifetime::Lifetime,
    reactive::{Handlers, ReactiveCore, read_core, write_core},
    serialization::{Codec, RdSerializable, SerializationCtx},
};
use std::{cell::RefCell, marker::PhantomData};

///
/// RdProperty
///
/// A value that may be unset until first assigned. Serialized with its
/// current value.
///

pub struct RdProperty<T, C> {
    core: ReactiveCore,
    value: RefCell<Option<T>>,
    handlers: Handlers<T>,
    codec: PhantomData<C>,
}

reactive_node!([T, C] RdProperty<T, C>);

impl<T, C> Default for RdProperty<T, C> {
    fn default() -> Self {
        Self {
            core: ReactiveCore::default(),
            value: RefCell::new(None),
            handlers: Handlers::default(),
            codec: PhantomData,
        }
    }
}

impl<T, C> RdProperty<T, C> {
    #[must_use]
    pub fn new(value: T) -> Self {
        let property = Self::default();
        property.value.replace(Some(value));

        property
    }

    pub fn set(&self, value: T) {
        self.value.replace(Some(value));
        if let Some(current) = self.value.borrow().as_ref() {
            self.handlers.fire(current);
        }
    }

    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// Call `handler` with the current value (if any) and on every change.
    pub fn advise(&self, lifetime: &Lifetime, handler: impl Fn(&T) + 'static) {
        if let Some(current) = self.value.borrow().as_ref() {
            handler(current);
        }
        self.handlers.add(lifetime, handler);
    }
}

impl<T: Clone, C> RdProperty<T, C> {
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.value.borrow().clone()
    }
}

impl<T, C: Codec<Value = T>> RdSerializable for RdProperty<T, C> {
    fn read(ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<Self, WireError> {
        let core = read_core(buffer)?;
        let value = if buffer.read_bool()? {
            Some(C::read(ctx, buffer)?)
        } else {
            None
        };

        Ok(Self {
            core,
            value: RefCell::new(value),
            handlers: Handlers::default(),
            codec: PhantomData,
        })
    }

    fn write(&self, ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<(), WireError> {
        write_core(&self.core, buffer);
        let value = self.value.borrow();
        buffer.write_bool(value.is_some());
        match value.as_ref() {
            Some(v) => C::write(ctx, buffer, v),
            None => Ok(()),
        }
    }
}

///
/// TESTS
///
