use crate::{
    buffer::Buffer,
    error::WireError,
    lifetime::Lifetime,
    reactive::{Handlers, ReactiveCore, read_core, write_core},
    serialization::{Codec, RdSerializable, SerializationCtx},
};
use std::marker::PhantomData;

///
/// RdSignal
///

pub struct RdSignal<T, C> {
    core: ReactiveCore,
    handlers: Handlers<T>,
    codec: PhantomData<C>,
}

reactive_node!([T, C] RdSignal<T, C>);

impl<T, C> Default for RdSignal<T, C> {
    fn default() -> Self {
        Self {
            core: ReactiveCore::default(),
            handlers: Handlers::default(),
            codec: PhantomData,
        }
    }
}

impl<T, C> RdSignal<T, C> {
    pub fn fire(&self, value: &T) {
        self.handlers.fire(value);
    }

    pub fn advise(&self, lifetime: &Lifetime, handler: impl Fn(&T) + 'static) {
        self.handlers.add(lifetime, handler);
    }
}

impl<T, C: Codec<Value = T>> RdSerializable for RdSignal<T, C> {
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
