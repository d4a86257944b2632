use bytes_parser::BytesParserError;
use thiserror::Error;

/// Possible errors when encoding or decoding an [`OffsetCommitRequest`].
///
/// [`OffsetCommitRequest`]: crate::OffsetCommitRequest
#[derive(Error, Debug, Eq, PartialEq)]
pub enum CodecError {
    #[error("Encountered a not (yet) supported offset commit request version: {0}")]
    UnsupportedVersion(i16),

    #[error("Failure while parsing bytes: {0}")]
    ByteParsingError(#[source] BytesParserError),

    #[error("String of {0} bytes does not fit in an i16 length prefix")]
    StringTooLong(usize),

    #[error("Array of {0} elements does not fit in an i32 length prefix")]
    ArrayTooLong(usize),

    #[error("Invalid string length prefix: {0}")]
    InvalidStringLength(i16),

    #[error("Invalid array length prefix: {0}")]
    InvalidArrayLength(i32),

    #[error("Array declares {declared} elements but only {remaining} bytes are left")]
    InsufficientData { declared: usize, remaining: usize },

    #[error("Request fully decoded, but {0} bytes were left over")]
    TrailingBytes(usize),

    #[error("No offset blocks for topic {0}")]
    NoSuchTopic(String),

    #[error("No offset block for partition {1} of topic {0}")]
    NoSuchPartition(String, i32),
}
