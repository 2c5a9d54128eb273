use crate::{buffer::Buffer, error::WireError, id::RdId, serialization::SerializationCtx};
use std::{
    any::{Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::Rc,
};

///
/// RdPolymorphic
///
/// Object-safe view of a concrete declaration, used wherever the static
/// type is abstract.
///

pub trait RdPolymorphic: Any {
    fn type_name(&self) -> &'static str;

    /// Type id written ahead of the payload.
    fn rd_type_id(&self) -> RdId;

    /// Write the payload (without type id or size).
    fn write_polymorphic(&self, ctx: &SerializationCtx, buffer: &mut Buffer)
    -> Result<(), WireError>;

    fn hash_code_dyn(&self) -> i64;

    fn as_any(&self) -> &dyn Any;
}

///
/// AbstractDeclaration
///
/// Implemented for `dyn Trait` of every abstract declaration: builds the
/// Unknown subtype from a payload whose type id is not registered.
///

pub trait AbstractDeclaration {
    fn read_unknown_instance(
        ctx: &SerializationCtx,
        buffer: &mut Buffer,
        unknown_id: RdId,
        size: usize,
    ) -> Result<Rc<Self>, WireError>;
}

/// Reader registered for one concrete type under one target type.
pub type PolymorphicReader<T> = fn(&SerializationCtx, &mut Buffer) -> Result<Rc<T>, WireError>;

///
/// Serializers
///
/// Per-connection registry keyed by (target type, type id).
///

#[derive(Default)]
pub struct Serializers {
    readers: RefCell<HashMap<(TypeId, RdId), Box<dyn Any>>>,
}

impl Serializers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the reader for `id` when read as `T`.
    pub fn register<T: ?Sized + 'static>(&self, id: RdId, reader: PolymorphicReader<T>) {
        self.readers
            .borrow_mut()
            .insert((TypeId::of::<T>(), id), Box::new(reader));
    }

    pub fn unregister<T: ?Sized + 'static>(&self, id: RdId) -> bool {
        self.readers
            .borrow_mut()
            .remove(&(TypeId::of::<T>(), id))
            .is_some()
    }

    #[must_use]
    pub fn is_registered<T: ?Sized + 'static>(&self, id: RdId) -> bool {
        self.readers
            .borrow()
            .contains_key(&(TypeId::of::<T>(), id))
    }

    #[must_use]
    pub fn reader<T: ?Sized + 'static>(&self, id: RdId) -> Option<PolymorphicReader<T>> {
        self.readers
            .borrow()
            .get(&(TypeId::of::<T>(), id))
            .and_then(|reader| reader.downcast_ref::<PolymorphicReader<T>>())
            .copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.readers.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readers.borrow().is_empty()
    }

    /// Read a registered reader's result, failing on unknown ids.
    pub fn read_registered<T: ?Sized + 'static>(
        &self,
        ctx: &SerializationCtx,
        buffer: &mut Buffer,
        id: RdId,
    ) -> Result<Rc<T>, WireError> {
        let reader = self.reader::<T>(id).ok_or(WireError::UnregisteredType(id))?;

        reader(ctx, buffer)
    }

    /// Read type id, size and payload; unknown ids become the Unknown subtype.
    pub fn read_polymorphic<T>(
        &self,
        ctx: &SerializationCtx,
        buffer: &mut Buffer,
    ) -> Result<Rc<T>, WireError>
    where
        T: AbstractDeclaration + ?Sized + 'static,
    {
        let type_id = RdId::read(buffer)?;
        let size = buffer.read_len()?;
        let start = buffer.position();

        let value = if let Some(reader) = self.reader::<T>(type_id) {
            reader(ctx, buffer)?
        } else {
            tracing::warn!(%type_id, size, "unregistered polymorphic type, reading as unknown");
            T::read_unknown_instance(ctx, buffer, type_id, size)?
        };

        let consumed = buffer.position() - start;
        if consumed != size {
            return Err(WireError::PayloadSizeMismatch {
                type_id,
                declared: size,
                consumed,
            });
        }

        Ok(value)
    }

    /// Write type id, size and payload.
    pub fn write_polymorphic<T>(
        &self,
        ctx: &SerializationCtx,
        buffer: &mut Buffer,
        value: &T,
    ) -> Result<(), WireError>
    where
        T: RdPolymorphic + ?Sized,
    {
        value.rd_type_id().write(buffer);
        let slot = buffer.reserve_i32();
        let start = buffer.len();
        value.write_polymorphic(ctx, buffer)?;

        let size = buffer.len() - start;
        let size = i32::try_from(size).map_err(|_| WireError::InvalidLength(i32::MAX))?;
        buffer.patch_i32(slot, size);

        Ok(())
    }
}

impl fmt::Debug for Serializers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializers")
            .field("registered", &self.len())
            .finish()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{AbstractPolymorphic, Codec};

    trait Shape: RdPolymorphic {
        fn label(&self) -> String;
    }

    #[derive(Debug)]
    struct Circle(i32);

    impl RdPolymorphic for Circle {
        fn type_name(&self) -> &'static str {
            "Circle"
        }

        fn rd_type_id(&self) -> RdId {
            RdId::from_type_name("Circle")
        }

        fn write_polymorphic(&self, _: &SerializationCtx, buffer: &mut Buffer) -> Result<(), WireError> {
            buffer.write_i32(self.0);
            Ok(())
        }

        fn hash_code_dyn(&self) -> i64 {
            i64::from(self.0)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl Shape for Circle {
        fn label(&self) -> String {
            format!("circle {}", self.0)
        }
    }

    struct Unknown(RdId, Vec<u8>);

    impl RdPolymorphic for Unknown {
        fn type_name(&self) -> &'static str {
            "ShapeUnknown"
        }

        fn rd_type_id(&self) -> RdId {
            self.0
        }

        fn write_polymorphic(&self, _: &SerializationCtx, buffer: &mut Buffer) -> Result<(), WireError> {
            buffer.write_raw(&self.1);
            Ok(())
        }

        fn hash_code_dyn(&self) -> i64 {
            0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl Shape for Unknown {
        fn label(&self) -> String {
            "unknown".to_string()
        }
    }

    impl AbstractDeclaration for dyn Shape {
        fn read_unknown_instance(
            _: &SerializationCtx,
            buffer: &mut Buffer,
            unknown_id: RdId,
            size: usize,
        ) -> Result<Rc<Self>, WireError> {
            let start = buffer.position();
            let bytes = buffer.read_rest_of(start, size)?;

            Ok(Rc::new(Unknown(unknown_id, bytes)) as Rc<Self>)
        }
    }

    fn register_circle(serializers: &Serializers) {
        serializers.register::<dyn Shape>(
            RdId::from_type_name("Circle"),
            |_: &SerializationCtx, buffer: &mut Buffer| -> Result<Rc<dyn Shape>, WireError> {
                Ok(Rc::new(Circle(buffer.read_i32()?)) as Rc<dyn Shape>)
            },
        );
    }

    fn encode(value: Rc<dyn Shape>) -> Buffer {
        let mut buffer = Buffer::new();
        AbstractPolymorphic::<dyn Shape>::write(&SerializationCtx::default(), &mut buffer, &value)
            .unwrap();

        buffer
    }

    #[test]
    fn registered_type_dispatches_to_its_reader() {
        let ctx = SerializationCtx::default();
        register_circle(ctx.serializers());
        let mut buffer = encode(Rc::new(Circle(4)));

        let shape = AbstractPolymorphic::<dyn Shape>::read(&ctx, &mut buffer).unwrap();
        assert_eq!(shape.label(), "circle 4");
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn unregistered_type_falls_back_to_unknown_and_re_decodes() {
        let ctx = SerializationCtx::default();
        let mut buffer = encode(Rc::new(Circle(9)));

        let shape = AbstractPolymorphic::<dyn Shape>::read(&ctx, &mut buffer).unwrap();
        assert_eq!(shape.label(), "unknown");
        assert_eq!(shape.rd_type_id(), RdId::from_type_name("Circle"));

        let mut again = encode(shape);
        register_circle(ctx.serializers());
        let circle = AbstractPolymorphic::<dyn Shape>::read(&ctx, &mut again).unwrap();
        assert_eq!(circle.label(), "circle 9");
    }

    #[test]
    fn registry_is_keyed_by_target_type() {
        let serializers = Serializers::new();
        register_circle(&serializers);
        let id = RdId::from_type_name("Circle");

        assert!(serializers.is_registered::<dyn Shape>(id));
        assert!(!serializers.is_registered::<Circle>(id));
        assert!(serializers.unregister::<dyn Shape>(id));
        assert!(serializers.is_empty());
    }

    #[test]
    fn read_registered_reports_missing_ids() {
        let ctx = SerializationCtx::default();
        let mut buffer = Buffer::new();

        let result = ctx
            .serializers()
            .read_registered::<dyn Shape>(&ctx, &mut buffer, RdId(3));
        assert_eq!(result.err(), Some(WireError::UnregisteredType(RdId(3))));
    }
}
