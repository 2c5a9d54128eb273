use crate::{
    buffer::Buffer,
    error::WireError,
    id::RdId,
    serialization::{AbstractDeclaration, Codec, RdPolymorphic, RdSerializable, SerializationCtx},
    types::{DateTime, Guid, SecureString, Uri, Void},
};
use std::{hash::Hash, marker::PhantomData, rc::Rc};

///
/// WireScalar
///
/// Predefined values with a fixed wire form.
///

pub trait WireScalar: Sized {
    fn read_from(buffer: &mut Buffer) -> Result<Self, WireError>;

    fn write_to(&self, buffer: &mut Buffer) -> Result<(), WireError>;
}

macro_rules! scalar {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl WireScalar for $ty {
                fn read_from(buffer: &mut Buffer) -> Result<Self, WireError> {
                    buffer.$read()
                }

                fn write_to(&self, buffer: &mut Buffer) -> Result<(), WireError> {
                    buffer.$write(*self);
                    Ok(())
                }
            }
        )*
    };
}

scalar! {
    bool => write_bool, read_bool;
    i8 => write_i8, read_i8;
    i16 => write_i16, read_i16;
    i32 => write_i32, read_i32;
    i64 => write_i64, read_i64;
    u16 => write_u16, read_u16;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

impl WireScalar for String {
    fn read_from(buffer: &mut Buffer) -> Result<Self, WireError> {
        buffer.read_string()
    }

    fn write_to(&self, buffer: &mut Buffer) -> Result<(), WireError> {
        buffer.write_string(self)
    }
}

impl WireScalar for Void {
    fn read_from(_: &mut Buffer) -> Result<Self, WireError> {
        Ok(Self)
    }

    fn write_to(&self, _: &mut Buffer) -> Result<(), WireError> {
        Ok(())
    }
}

impl WireScalar for DateTime {
    fn read_from(buffer: &mut Buffer) -> Result<Self, WireError> {
        buffer.read_i64().map(Self)
    }

    fn write_to(&self, buffer: &mut Buffer) -> Result<(), WireError> {
        buffer.write_i64(self.0);
        Ok(())
    }
}

impl WireScalar for Guid {
    fn read_from(buffer: &mut Buffer) -> Result<Self, WireError> {
        buffer.read_u128().map(Self)
    }

    fn write_to(&self, buffer: &mut Buffer) -> Result<(), WireError> {
        buffer.write_u128(self.0);
        Ok(())
    }
}

impl WireScalar for Uri {
    fn read_from(buffer: &mut Buffer) -> Result<Self, WireError> {
        buffer.read_string().map(Self)
    }

    fn write_to(&self, buffer: &mut Buffer) -> Result<(), WireError> {
        buffer.write_string(&self.0)
    }
}

impl WireScalar for SecureString {
    fn read_from(buffer: &mut Buffer) -> Result<Self, WireError> {
        buffer.read_string().map(Self)
    }

    fn write_to(&self, buffer: &mut Buffer) -> Result<(), WireError> {
        buffer.write_string(&self.0)
    }
}

impl WireScalar for RdId {
    fn read_from(buffer: &mut Buffer) -> Result<Self, WireError> {
        Self::read(buffer)
    }

    fn write_to(&self, buffer: &mut Buffer) -> Result<(), WireError> {
        self.write(buffer);
        Ok(())
    }
}

///
/// RdEnum
///
/// Generated enums travel as their `i32` ordinal.
///

pub trait RdEnum: Copy {
    const TYPE_NAME: &'static str;

    fn ordinal(self) -> i32;

    fn from_ordinal(ordinal: i32) -> Option<Self>;
}

///
/// Predefined
///

pub struct Predefined<T>(PhantomData<T>);

impl<T: WireScalar> Codec for Predefined<T> {
    type Value = T;

    fn read(_: &SerializationCtx, buffer: &mut Buffer) -> Result<T, WireError> {
        T::read_from(buffer)
    }

    fn write(_: &SerializationCtx, buffer: &mut Buffer, value: &T) -> Result<(), WireError> {
        value.write_to(buffer)
    }
}

///
/// EnumCodec
///

pub struct EnumCodec<E>(PhantomData<E>);

impl<E: RdEnum> Codec for EnumCodec<E> {
    type Value = E;

    fn read(_: &SerializationCtx, buffer: &mut Buffer) -> Result<E, WireError> {
        let ordinal = buffer.read_i32()?;

        E::from_ordinal(ordinal).ok_or(WireError::InvalidEnumOrdinal {
            type_name: E::TYPE_NAME,
            ordinal,
        })
    }

    fn write(_: &SerializationCtx, buffer: &mut Buffer, value: &E) -> Result<(), WireError> {
        buffer.write_i32(value.ordinal());
        Ok(())
    }
}

///
/// Polymorphic
///
/// Concrete declarations are self-describing: no type id on the wire.
///

pub struct Polymorphic<T>(PhantomData<T>);

impl<T: RdSerializable> Codec for Polymorphic<T> {
    type Value = T;

    fn read(ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<T, WireError> {
        T::read(ctx, buffer)
    }

    fn write(ctx: &SerializationCtx, buffer: &mut Buffer, value: &T) -> Result<(), WireError> {
        value.write(ctx, buffer)
    }
}

///
/// AbstractPolymorphic
///
/// Type id, payload size, payload. Readers dispatch through the
/// connection's registry and fall back to the Unknown subtype on a miss.
///

pub struct AbstractPolymorphic<T: ?Sized>(PhantomData<Rc<T>>);

impl<T> Codec for AbstractPolymorphic<T>
where
    T: AbstractDeclaration + RdPolymorphic + ?Sized + 'static,
{
    type Value = Rc<T>;

    fn read(ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<Rc<T>, WireError> {
        ctx.serializers().read_polymorphic::<T>(ctx, buffer)
    }

    fn write(ctx: &SerializationCtx, buffer: &mut Buffer, value: &Rc<T>) -> Result<(), WireError> {
        let value: &T = value;
        ctx.serializers().write_polymorphic(ctx, buffer, value)
    }
}

///
/// PrimitiveArrayCodec
///
/// Bulk form of a primitive array: count, then the raw items.
///

pub struct PrimitiveArrayCodec<T>(PhantomData<T>);

impl<T: WireScalar + Copy> Codec for PrimitiveArrayCodec<T> {
    type Value = Vec<T>;

    fn read(_: &SerializationCtx, buffer: &mut Buffer) -> Result<Vec<T>, WireError> {
        let len = buffer.read_len()?;
        let mut out = Vec::with_capacity(len.min(buffer.remaining()));
        for _ in 0..len {
            out.push(T::read_from(buffer)?);
        }

        Ok(out)
    }

    fn write(_: &SerializationCtx, buffer: &mut Buffer, value: &Vec<T>) -> Result<(), WireError> {
        buffer.write_len(value.len())?;
        for item in value {
            item.write_to(buffer)?;
        }

        Ok(())
    }
}

///
/// ArrayCodec
///

pub struct ArrayCodec<C>(PhantomData<C>);

impl<C: Codec> Codec for ArrayCodec<C> {
    type Value = Vec<C::Value>;

    fn read(ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<Self::Value, WireError> {
        let len = buffer.read_len()?;
        let mut out = Vec::with_capacity(len.min(buffer.remaining()));
        for _ in 0..len {
            out.push(C::read(ctx, buffer)?);
        }

        Ok(out)
    }

    fn write(
        ctx: &SerializationCtx,
        buffer: &mut Buffer,
        value: &Self::Value,
    ) -> Result<(), WireError> {
        buffer.write_len(value.len())?;
        for item in value {
            C::write(ctx, buffer, item)?;
        }

        Ok(())
    }
}

///
/// NullableCodec
///
/// One presence byte, then the value when present.
///

pub struct NullableCodec<C>(PhantomData<C>);

impl<C: Codec> Codec for NullableCodec<C> {
    type Value = Option<C::Value>;

    fn read(ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<Self::Value, WireError> {
        if buffer.read_bool()? {
            C::read(ctx, buffer).map(Some)
        } else {
            Ok(None)
        }
    }

    fn write(
        ctx: &SerializationCtx,
        buffer: &mut Buffer,
        value: &Self::Value,
    ) -> Result<(), WireError> {
        buffer.write_bool(value.is_some());
        match value {
            Some(inner) => C::write(ctx, buffer, inner),
            None => Ok(()),
        }
    }
}

///
/// InternedCodec
///
/// Deduplicates values within the intern root registered for `KEY`: an
/// `i32` tag of `-1` precedes an inline first occurrence, any other tag is
/// the scope-local index of an earlier one.
///

pub struct InternedCodec<C, const KEY: i64>(PhantomData<C>);

/// Tag preceding an inline interned value.
pub const INTERN_INLINE: i32 = -1;

impl<C, const KEY: i64> Codec for InternedCodec<C, KEY>
where
    C: Codec,
    C::Value: Clone + Eq + Hash + 'static,
{
    type Value = C::Value;

    fn read(ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<Self::Value, WireError> {
        let tag = buffer.read_i32()?;
        let root = ctx.intern_root(KEY);

        if tag == INTERN_INLINE {
            let value = C::read(ctx, buffer)?;
            if let Some(root) = root {
                root.remember_incoming(value.clone());
            }
            return Ok(value);
        }

        root.and_then(|root| root.resolve::<C::Value>(tag))
            .ok_or(WireError::UnknownInternReference {
                scope: KEY,
                index: tag,
            })
    }

    fn write(
        ctx: &SerializationCtx,
        buffer: &mut Buffer,
        value: &Self::Value,
    ) -> Result<(), WireError> {
        if let Some(root) = ctx.intern_root(KEY) {
            if let Some(index) = root.lookup(value) {
                buffer.write_i32(index);
                return Ok(());
            }
            root.remember_outgoing(value.clone());
        }

        buffer.write_i32(INTERN_INLINE);
        C::write(ctx, buffer, value)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    enum Color {
        Red,
        Green,
    }

    impl RdEnum for Color {
        const TYPE_NAME: &'static str = "Color";

        fn ordinal(self) -> i32 {
            self as i32
        }

        fn from_ordinal(ordinal: i32) -> Option<Self> {
            match ordinal {
                0 => Some(Self::Red),
                1 => Some(Self::Green),
                _ => None,
            }
        }
    }

    fn round_trip<C: Codec>(value: &C::Value) -> C::Value {
        let ctx = SerializationCtx::default();
        let mut buffer = Buffer::new();
        C::write(&ctx, &mut buffer, value).unwrap();
        let out = C::read(&ctx, &mut buffer).unwrap();
        assert_eq!(buffer.remaining(), 0, "codec must consume what it wrote");

        out
    }

    #[test]
    fn enums_travel_as_ordinals() {
        let ctx = SerializationCtx::default();
        let mut buffer = Buffer::new();
        EnumCodec::<Color>::write(&ctx, &mut buffer, &Color::Green).unwrap();

        assert_eq!(buffer.as_slice(), &[1, 0, 0, 0]);
        assert_eq!(round_trip::<EnumCodec<Color>>(&Color::Red), Color::Red);
    }

    #[test]
    fn bad_ordinal_is_an_error() {
        let ctx = SerializationCtx::default();
        let mut buffer = Buffer::new();
        buffer.write_i32(9);

        assert_eq!(
            EnumCodec::<Color>::read(&ctx, &mut buffer),
            Err(WireError::InvalidEnumOrdinal {
                type_name: "Color",
                ordinal: 9
            })
        );
    }

    #[test]
    fn nullable_uses_presence_byte() {
        let ctx = SerializationCtx::default();
        let mut buffer = Buffer::new();
        NullableCodec::<Predefined<i32>>::write(&ctx, &mut buffer, &None).unwrap();

        assert_eq!(buffer.as_slice(), &[0]);
        assert_eq!(
            round_trip::<NullableCodec<Predefined<String>>>(&Some("x".to_string())),
            Some("x".to_string())
        );
    }

    #[test]
    fn nested_arrays_round_trip() {
        let value = vec![vec![Some(1_i64), None], vec![]];

        assert_eq!(
            round_trip::<ArrayCodec<ArrayCodec<NullableCodec<Predefined<i64>>>>>(&value),
            value
        );
    }

    #[test]
    fn primitive_array_matches_generic_array_layout() {
        let ctx = SerializationCtx::default();
        let value = vec![1_i16, -2, 3];
        let mut bulk = Buffer::new();
        let mut generic = Buffer::new();
        PrimitiveArrayCodec::<i16>::write(&ctx, &mut bulk, &value).unwrap();
        ArrayCodec::<Predefined<i16>>::write(&ctx, &mut generic, &value).unwrap();

        assert_eq!(bulk, generic);
    }

    #[test]
    fn predefined_value_types_round_trip() {
        assert_eq!(round_trip::<Predefined<Guid>>(&Guid(7 << 70)), Guid(7 << 70));
        assert_eq!(round_trip::<Predefined<DateTime>>(&DateTime(-1)), DateTime(-1));
        assert_eq!(
            round_trip::<Predefined<Uri>>(&Uri("rd://x".into())),
            Uri("rd://x".into())
        );
        assert_eq!(round_trip::<Predefined<Void>>(&Void), Void);
    }

    #[test]
    fn interning_without_root_writes_inline() {
        let ctx = SerializationCtx::default();
        let mut buffer = Buffer::new();
        let value = "dup".to_string();
        InternedCodec::<Predefined<String>, 5>::write(&ctx, &mut buffer, &value).unwrap();
        InternedCodec::<Predefined<String>, 5>::write(&ctx, &mut buffer, &value).unwrap();

        assert_eq!(buffer.read_i32().unwrap(), INTERN_INLINE);
        assert_eq!(buffer.read_string().unwrap(), "dup");
        assert_eq!(buffer.read_i32().unwrap(), INTERN_INLINE);
    }
}
