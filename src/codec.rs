use bytes::Bytes;

use crate::decoder::{BytesDecoder, PacketDecoder};
use crate::encoder::{BytesEncoder, LengthEncoder};
use crate::errors::{CodecError, CodecError::TrailingBytes};
use crate::offset_commit_request::OffsetCommitRequest;
use crate::version::KafkaVersion;

/// Body of a request, as seen by the layer that frames requests and dispatches them.
///
/// The dispatcher needs to know what request this is and at what version,
/// to write the request header and pick the right decoder for the response.
pub trait ProtocolBody {
    /// API key of the request.
    fn key(&self) -> i16;

    /// Version of the request.
    fn version(&self) -> i16;

    /// Version of the request header that precedes this body.
    fn header_version(&self) -> i16;

    /// Is [`Self::version`] one that can be encoded and decoded?
    fn is_valid_version(&self) -> bool;

    /// Earliest broker release able to handle this request at [`Self::version`].
    ///
    /// Only meaningful when [`Self::is_valid_version`] is `true`.
    fn required_version(&self) -> KafkaVersion;
}

/// Number of bytes [`encode_request`] would produce for the given request.
///
/// Fails the same way [`encode_request`] would.
pub fn encoded_len(request: &OffsetCommitRequest) -> Result<usize, CodecError> {
    let mut counter = LengthEncoder::new();
    request.encode(&mut counter)?;
    Ok(counter.len())
}

/// Encodes the body of an [`OffsetCommitRequest`], at its [`OffsetCommitRequest::version`].
///
/// The request is measured first, so the returned [`Bytes`] is allocated once and to size.
/// No framing is added: the caller has to prepend size and request header.
pub fn encode_request(request: &OffsetCommitRequest) -> Result<Bytes, CodecError> {
    let mut encoder = BytesEncoder::with_capacity(encoded_len(request)?);
    request.encode(&mut encoder)?;
    Ok(encoder.into_bytes())
}

/// Decodes the body of an [`OffsetCommitRequest`], as laid out at the given `version`.
///
/// `bytes` must contain exactly one request body: anything left after it is an error,
/// as it's likely the sign the body was decoded with the wrong version.
pub fn decode_request(bytes: &[u8], version: i16) -> Result<OffsetCommitRequest, CodecError> {
    let mut decoder = BytesDecoder::from(bytes);
    let request = OffsetCommitRequest::decode(&mut decoder, version)?;

    match decoder.remaining() {
        0 => Ok(request),
        left => Err(TrailingBytes(left)),
    }
}
