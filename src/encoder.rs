use bytes::{BufMut, Bytes, BytesMut};

use crate::decoder::MAX_ARRAY_LENGTH;
use crate::errors::{
    CodecError,
    CodecError::{ArrayTooLong, StringTooLong},
};

/// Primitives needed to write a request body, in the protocol wire format.
///
/// All integers are big-endian.
/// Writing a string or an array length can fail if it does not fit its length prefix:
/// in that case the output must be discarded.
pub trait PacketEncoder {
    fn put_i32(&mut self, value: i32);

    fn put_i64(&mut self, value: i64);

    /// Writes an `i16` length prefix, followed by the UTF-8 bytes of `value`.
    fn put_string(&mut self, value: &str) -> Result<(), CodecError>;

    /// Like [`Self::put_string`], but [`None`] is written as a length of `-1`.
    fn put_nullable_string(&mut self, value: Option<&str>) -> Result<(), CodecError>;

    /// Writes an `i32` element count, up to [`MAX_ARRAY_LENGTH`].
    fn put_array_length(&mut self, len: usize) -> Result<(), CodecError>;
}

fn string_length(value: &str) -> Result<i16, CodecError> {
    i16::try_from(value.len()).map_err(|_| StringTooLong(value.len()))
}

fn array_length(len: usize) -> Result<i32, CodecError> {
    if len > MAX_ARRAY_LENGTH {
        return Err(ArrayTooLong(len));
    }

    i32::try_from(len).map_err(|_| ArrayTooLong(len))
}

/// A [`PacketEncoder`] writing into a [`BytesMut`].
#[derive(Debug, Default)]
pub struct BytesEncoder {
    buf: BytesMut,
}

impl BytesEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder that won't need to reallocate for the first `capacity` bytes.
    ///
    /// Use [`LengthEncoder`] to know in advance how many bytes a request needs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl PacketEncoder for BytesEncoder {
    fn put_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    fn put_i64(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    fn put_string(&mut self, value: &str) -> Result<(), CodecError> {
        let len = string_length(value)?;
        self.buf.put_i16(len);
        self.buf.put_slice(value.as_bytes());
        Ok(())
    }

    fn put_nullable_string(&mut self, value: Option<&str>) -> Result<(), CodecError> {
        match value {
            None => {
                self.buf.put_i16(-1);
                Ok(())
            },
            Some(s) => self.put_string(s),
        }
    }

    fn put_array_length(&mut self, len: usize) -> Result<(), CodecError> {
        self.buf.put_i32(array_length(len)?);
        Ok(())
    }
}

/// A [`PacketEncoder`] that writes nothing, and only counts how many bytes would be written.
///
/// It applies the same checks as [`BytesEncoder`], so a request that passes through it
/// will also encode successfully.
#[derive(Debug, Default)]
pub struct LengthEncoder {
    len: usize,
}

impl LengthEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl PacketEncoder for LengthEncoder {
    fn put_i32(&mut self, _value: i32) {
        self.len += 4;
    }

    fn put_i64(&mut self, _value: i64) {
        self.len += 8;
    }

    fn put_string(&mut self, value: &str) -> Result<(), CodecError> {
        string_length(value)?;
        self.len += 2 + value.len();
        Ok(())
    }

    fn put_nullable_string(&mut self, value: Option<&str>) -> Result<(), CodecError> {
        match value {
            None => {
                self.len += 2;
                Ok(())
            },
            Some(s) => self.put_string(s),
        }
    }

    fn put_array_length(&mut self, len: usize) -> Result<(), CodecError> {
        array_length(len)?;
        self.len += 4;
        Ok(())
    }
}
