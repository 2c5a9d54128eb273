//! Growable little-endian byte buffer with a read cursor.

use crate::error::WireError;

///
/// Buffer
///
/// Writes append at the end; reads advance `position`. Strings are an `i32`
/// count of UTF-16 units followed by the units, booleans a single byte.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Buffer {
    data: Vec<u8>,
    position: usize,
}

macro_rules! fixed_width {
    ($($write:ident, $read:ident => $ty:ty;)*) => {
        $(
            pub fn $write(&mut self, value: $ty) {
                self.data.extend_from_slice(&value.to_le_bytes());
            }

            pub fn $read(&mut self) -> Result<$ty, WireError> {
                let bytes = self.take(size_of::<$ty>())?;
                let mut raw = [0u8; size_of::<$ty>()];
                raw.copy_from_slice(bytes);

                Ok(<$ty>::from_le_bytes(raw))
            }
        )*
    };
}

impl Buffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            position: 0,
        }
    }

    /// Wrap received bytes for reading from the start.
    #[must_use]
    pub const fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    fn take(&mut self, needed: usize) -> Result<&[u8], WireError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(WireError::EndOfBuffer { needed, remaining });
        }
        let start = self.position;
        self.position += needed;

        Ok(&self.data[start..self.position])
    }

    fixed_width! {
        write_i8, read_i8 => i8;
        write_u8, read_u8 => u8;
        write_i16, read_i16 => i16;
        write_u16, read_u16 => u16;
        write_i32, read_i32 => i32;
        write_i64, read_i64 => i64;
        write_f32, read_f32 => f32;
        write_f64, read_f64 => f64;
        write_u128, read_u128 => u128;
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::InvalidBool(other)),
        }
    }

    /// Write a length prefix.
    pub fn write_len(&mut self, len: usize) -> Result<(), WireError> {
        let len = i32::try_from(len).map_err(|_| WireError::InvalidLength(i32::MAX))?;
        self.write_i32(len);

        Ok(())
    }

    /// Read a non-negative length prefix.
    pub fn read_len(&mut self) -> Result<usize, WireError> {
        let len = self.read_i32()?;

        usize::try_from(len).map_err(|_| WireError::InvalidLength(len))
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn read_raw(&mut self, len: usize) -> Result<Vec<u8>, WireError> {
        self.take(len).map(<[u8]>::to_vec)
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), WireError> {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_len(units.len())?;
        for unit in units {
            self.write_u16(unit);
        }

        Ok(())
    }

    pub fn read_string(&mut self) -> Result<String, WireError> {
        let len = self.read_len()?;
        let bytes = self.take(len.saturating_mul(2))?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        String::from_utf16(&units).map_err(|_| WireError::InvalidUtf16)
    }

    /// Reserve an `i32` slot to be filled by [`Self::patch_i32`].
    pub fn reserve_i32(&mut self) -> usize {
        let at = self.data.len();
        self.write_i32(0);

        at
    }

    pub fn patch_i32(&mut self, at: usize, value: i32) {
        self.data[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Everything from `start` up to `start + size` that has not been read yet.
    pub fn read_rest_of(&mut self, start: usize, size: usize) -> Result<Vec<u8>, WireError> {
        let end = start.saturating_add(size);
        let consumed = self.position.saturating_sub(start);
        if self.position > end {
            return Err(WireError::EndOfBuffer {
                needed: consumed,
                remaining: size,
            });
        }

        self.read_raw(end - self.position)
    }
}

///
/// TESTS
///
