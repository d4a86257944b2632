use std::fmt;

use crate::errors::CodecError;

pub(crate) const REQ_V0_OFFSET_COMMIT: i16 = 0;
pub(crate) const REQ_V1_OFFSET_COMMIT: i16 = 1;
pub(crate) const REQ_V2_OFFSET_COMMIT: i16 = 2;

/// Which optional fields of an [`OffsetCommitRequest`] are on the wire, for a given version.
///
/// Both encoding and decoding consult this, and nothing else, to decide the layout:
///
/// | field                 | v0 | v1 | v2 |
/// |-----------------------|----|----|----|
/// | `generation_id`       |    | ✓  | ✓  |
/// | `member_id`           |    | ✓  | ✓  |
/// | `retention_time`      |    |    | ✓  |
/// | partition `timestamp` |    | ✓  |    |
///
/// A version not in the table is rejected with [`CodecError::UnsupportedVersion`].
///
/// [`OffsetCommitRequest`]: crate::OffsetCommitRequest
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FieldLayout {
    pub generation_id: bool,
    pub member_id: bool,
    pub retention_time: bool,
    pub partition_timestamp: bool,
}

impl FieldLayout {
    /// Look up the layout of the given request version.
    pub fn for_version(version: i16) -> Result<Self, CodecError> {
        match version {
            REQ_V0_OFFSET_COMMIT => Ok(Self {
                generation_id: false,
                member_id: false,
                retention_time: false,
                partition_timestamp: false,
            }),
            REQ_V1_OFFSET_COMMIT => Ok(Self {
                generation_id: true,
                member_id: true,
                retention_time: false,
                partition_timestamp: true,
            }),
            REQ_V2_OFFSET_COMMIT => Ok(Self {
                generation_id: true,
                member_id: true,
                retention_time: true,
                partition_timestamp: false,
            }),
            _ => Err(CodecError::UnsupportedVersion(version)),
        }
    }
}

/// A Kafka broker release, used to tell which request versions a broker understands.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct KafkaVersion(pub u16, pub u16, pub u16, pub u16);

impl KafkaVersion {
    pub const V0_8_2_0: KafkaVersion = KafkaVersion(0, 8, 2, 0);
    pub const V0_9_0_0: KafkaVersion = KafkaVersion(0, 9, 0, 0);

    /// Earliest broker release able to handle the given `OffsetCommit` request version.
    ///
    /// Only meaningful for versions accepted by [`FieldLayout::for_version`]: unknown versions
    /// map to the oldest release, which no broker can actually serve them with.
    /// Use [`Self::supports`] to check both at once.
    pub fn required_for(request_version: i16) -> Self {
        match request_version {
            REQ_V2_OFFSET_COMMIT => Self::V0_9_0_0,
            _ => Self::V0_8_2_0,
        }
    }

    /// Does this broker release understand the given request version?
    pub fn supports(&self, request_version: i16) -> bool {
        FieldLayout::for_version(request_version).is_ok() && *self >= Self::required_for(request_version)
    }
}

impl fmt::Display for KafkaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0, self.1, self.2, self.3)
    }
}
