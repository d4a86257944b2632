use bytes_parser::BytesParser;

use crate::errors::{
    CodecError,
    CodecError::{ByteParsingError, InsufficientData, InvalidArrayLength, InvalidStringLength},
};

/// Upper bound to the element count an array length prefix is allowed to declare.
///
/// Requests legitimately carrying more topics or partitions than this do not exist:
/// when decoding, anything bigger is treated as a corrupt prefix, and nothing gets allocated for it.
/// Encoding refuses bigger arrays too, so whatever encodes also decodes.
pub const MAX_ARRAY_LENGTH: usize = 2 * u16::MAX as usize;

/// Primitives needed to read a request body, in the protocol wire format.
///
/// All integers are big-endian.
pub trait PacketDecoder {
    fn get_i32(&mut self) -> Result<i32, CodecError>;

    fn get_i64(&mut self) -> Result<i64, CodecError>;

    /// Reads an `i16` length prefix, followed by that many bytes of UTF-8.
    ///
    /// A length of `-1` (i.e. a `null` on the wire) is read as an empty [`String`].
    fn get_string(&mut self) -> Result<String, CodecError>;

    /// Like [`Self::get_string`], but a length of `-1` is read as [`None`].
    fn get_nullable_string(&mut self) -> Result<Option<String>, CodecError>;

    /// Reads an `i32` element count, and checks it can be satisfied by [`Self::remaining`].
    fn get_array_length(&mut self) -> Result<usize, CodecError>;

    /// Amount of bytes not yet read.
    fn remaining(&self) -> usize;
}

/// A [`PacketDecoder`] reading from a byte slice, via [`BytesParser`].
pub struct BytesDecoder<'a> {
    parser: BytesParser<'a>,
}

impl<'a> From<&'a [u8]> for BytesDecoder<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self {
            parser: BytesParser::from(bytes),
        }
    }
}

impl<'a> BytesDecoder<'a> {
    fn get_i16(&mut self) -> Result<i16, CodecError> {
        self.parser.parse_i16().map_err(ByteParsingError)
    }

    fn get_str(&mut self, len: i16) -> Result<String, CodecError> {
        self.parser.parse_str_utf8(len as usize).map(|s| s.into()).map_err(ByteParsingError)
    }
}

impl<'a> PacketDecoder for BytesDecoder<'a> {
    fn get_i32(&mut self) -> Result<i32, CodecError> {
        self.parser.parse_i32().map_err(ByteParsingError)
    }

    fn get_i64(&mut self) -> Result<i64, CodecError> {
        self.parser.parse_i64().map_err(ByteParsingError)
    }

    fn get_string(&mut self) -> Result<String, CodecError> {
        Ok(self.get_nullable_string()?.unwrap_or_default())
    }

    fn get_nullable_string(&mut self) -> Result<Option<String>, CodecError> {
        match self.get_i16()? {
            -1 => Ok(None),
            len if len < -1 => Err(InvalidStringLength(len)),
            len => self.get_str(len).map(Some),
        }
    }

    fn get_array_length(&mut self) -> Result<usize, CodecError> {
        let len = self.get_i32()?;
        if len < 0 || len as usize > MAX_ARRAY_LENGTH {
            return Err(InvalidArrayLength(len));
        }

        // Every element takes at least 1 byte.
        let declared = len as usize;
        let remaining = self.remaining();
        if declared > remaining {
            return Err(InsufficientData { declared, remaining });
        }

        Ok(declared)
    }

    fn remaining(&self) -> usize {
        self.parser.parseable()
    }
}
