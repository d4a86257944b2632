//! Encode and decode the Kafka `OffsetCommit` request (API key `8`), versions `0` to `2`.
//!
//! A consumer that is part of a group commits the offsets it consumed up to, by sending
//! an [`OffsetCommitRequest`] to the Group Coordinator. The shape of the request on the wire
//! depends on its version, and it can't be told from the bytes: the version travels in
//! the request header, that the caller is responsible for.
//!
//! ## Format
//!
//! All integers are big-endian. Strings are an `i16` length followed by UTF-8 bytes,
//! with length `-1` meaning `null`. Arrays are an `i32` element count followed by the elements.
//!
//! ```text
//! group_id:        string
//! generation_id:   i32       (v1+)
//! member_id:       string    (v1+)
//! retention_time:  i64       (v2+)
//! topics:          [
//!   topic:         string
//!   partitions:    [
//!     partition:   i32
//!     offset:      i64
//!     timestamp:   i64       (v1 only)
//!     metadata:    nullable string
//!   ]
//! ]
//! ```
//!
//! Which field is present at which version is described in one place: [`FieldLayout`].
//! Versions outside `0..=2` are rejected with [`CodecError::UnsupportedVersion`].
//!
//! ## Usage
//!
//! ```rust
//! use offset_commit_codec::{decode_request, encode_request, OffsetCommitRequest};
//!
//! let mut request = OffsetCommitRequest::new(1, "g1");
//! request.generation_id = 3;
//! request.member_id = "m1".into();
//! request.add_block("t1", 0, 100, 12345, Some("meta".into()));
//!
//! let bytes = encode_request(&request).unwrap();
//! assert_eq!(decode_request(&bytes, 1).unwrap(), request);
//! ```
//!
//! ## Features
//!
//! * `serde`: derives `Serialize` and `Deserialize` for the request types.
//! * `ts_chrono`: accessors exposing timestamps and retention as [`chrono`](https://docs.rs/chrono) types.
//! * `ts_time`: accessors exposing timestamps and retention as [`time`](https://docs.rs/time) types.

mod codec;
mod decoder;
mod encoder;
mod errors;
mod offset_commit_request;
mod utils;
mod version;

pub use codec::*;
pub use decoder::*;
pub use encoder::*;
pub use errors::*;
pub use offset_commit_request::*;
pub use version::*;
