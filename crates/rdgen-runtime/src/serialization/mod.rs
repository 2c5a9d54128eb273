//! Codecs, polymorphic dispatch and interning.

mod codec;
mod context;
mod intern;
mod polymorphic;

pub use codec::*;
pub use context::*;
pub use intern::*;
pub use polymorphic::*;

use crate::{buffer::Buffer, error::WireError};
use std::rc::Rc;

///
/// Codec
///
/// Zero-sized reader/writer pair for one surface type. Generated fields
/// are read and written through `<C as Codec>`.
///

pub trait Codec {
    type Value;

    fn read(ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<Self::Value, WireError>;

    fn write(ctx: &SerializationCtx, buffer: &mut Buffer, value: &Self::Value)
    -> Result<(), WireError>;
}

///
/// RdSerializable
///
/// Self-describing entity with a static reader and an instance writer.
///

pub trait RdSerializable: Sized {
    fn read(ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<Self, WireError>;

    fn write(&self, ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<(), WireError>;
}

impl<T: RdSerializable> RdSerializable for Rc<T> {
    fn read(ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<Self, WireError> {
        T::read(ctx, buffer).map(Rc::new)
    }

    fn write(&self, ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<(), WireError> {
        (**self).write(ctx, buffer)
    }
}
