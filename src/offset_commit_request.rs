use crate::decoder::PacketDecoder;
use crate::encoder::PacketEncoder;
use crate::errors::{
    CodecError,
    CodecError::{NoSuchPartition, NoSuchTopic},
};
use crate::version::{FieldLayout, KafkaVersion};
use crate::ProtocolBody;

/// API key identifying `OffsetCommit` requests.
pub const OFFSET_COMMIT_KEY: i16 = 8;

/// Value of [`OffsetCommitRequest::generation_id`] when the group is not managed by the coordinator.
pub const GROUP_GENERATION_UNDEFINED: i32 = -1;

/// Value of [`OffsetCommitRequest::retention_time`] asking the broker to apply its own retention.
pub const RETENTION_TIME_BROKER_DEFAULT: i64 = -1;

/// Value of [`PartitionRequest::timestamp`] asking the broker to use the time it received the commit.
pub const RECEIVE_TIME: i64 = -1;

/// Request sent by a consumer to the [Group Coordinator], to commit the offsets it consumed up to.
///
/// The shape of this request on the wire depends on [`Self::version`]:
/// see [`FieldLayout`] for which fields are present at which version.
/// Fields that are not present at the version are left to their "unset" value
/// when decoding, and ignored when encoding.
///
/// [Group Coordinator]: https://github.com/apache/kafka/blob/trunk/core/src/main/scala/kafka/coordinator/group/GroupCoordinator.scala
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetCommitRequest {
    /// Version of the request.
    ///
    /// This controls the layout of the request on the wire, and it's never read from it:
    /// the caller knows it from the request header.
    pub version: i16,

    /// Consumer group committing the offsets.
    pub group_id: String,

    /// Generation of the group the committing member belongs to.
    ///
    /// Present from version 1; [`GROUP_GENERATION_UNDEFINED`] otherwise.
    pub generation_id: i32,

    /// Member of the group committing the offsets, as assigned by the Group Coordinator.
    ///
    /// Present from version 1; empty otherwise.
    pub member_id: String,

    /// How long (ms) the broker should retain the committed offsets.
    ///
    /// Present from version 2; [`RETENTION_TIME_BROKER_DEFAULT`] otherwise.
    pub retention_time: i64,

    /// Topics to commit offsets for, in the order they appear on the wire.
    pub topics: Vec<TopicRequest>,
}

/// Offsets to commit for the partitions of a topic.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicRequest {
    pub topic: String,

    /// Partitions to commit offsets for, in the order they appear on the wire.
    pub partitions: Vec<PartitionRequest>,
}

/// Offset to commit for a single partition.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionRequest {
    pub partition: i32,

    /// Offset of the next record the consumer expects to consume.
    pub offset: i64,

    /// Time of the commit (ms since epoch).
    ///
    /// Present only in version 1; [`RECEIVE_TIME`] otherwise.
    pub timestamp: i64,

    /// Free-form data the consumer wants stored alongside the offset.
    ///
    /// [`None`] and `Some("")` are different things on the wire, and stay different.
    pub metadata: Option<String>,
}

impl OffsetCommitRequest {
    /// Create an empty request, with all the version-dependent fields set to their "unset" value.
    pub fn new(version: i16, group_id: impl Into<String>) -> Self {
        Self {
            version,
            group_id: group_id.into(),
            generation_id: GROUP_GENERATION_UNDEFINED,
            member_id: String::new(),
            retention_time: RETENTION_TIME_BROKER_DEFAULT,
            topics: Vec::new(),
        }
    }

    /// Add the offset to commit for a partition.
    ///
    /// A topic seen for the first time is appended after the existing ones.
    /// A partition already present for the topic gets its entry replaced, in place.
    pub fn add_block(
        &mut self,
        topic: &str,
        partition: i32,
        offset: i64,
        timestamp: i64,
        metadata: Option<String>,
    ) {
        let block = PartitionRequest {
            partition,
            offset,
            timestamp,
            metadata,
        };

        let topic_idx = match self.topics.iter().position(|t| t.topic == topic) {
            Some(idx) => idx,
            None => {
                self.topics.push(TopicRequest {
                    topic: topic.to_string(),
                    partitions: Vec::new(),
                });
                self.topics.len() - 1
            },
        };

        let partitions = &mut self.topics[topic_idx].partitions;
        match partitions.iter_mut().find(|p| p.partition == partition) {
            Some(existing) => *existing = block,
            None => partitions.push(block),
        }
    }

    /// Offset and metadata committed for a partition of a topic.
    pub fn offset(&self, topic: &str, partition: i32) -> Result<(i64, Option<&str>), CodecError> {
        let topic_req = self.topics.iter().find(|t| t.topic == topic).ok_or_else(|| NoSuchTopic(topic.to_string()))?;

        topic_req
            .partitions
            .iter()
            .find(|p| p.partition == partition)
            .map(|p| (p.offset, p.metadata.as_deref()))
            .ok_or_else(|| NoSuchPartition(topic.to_string(), partition))
    }

    /// Write the request body.
    ///
    /// Fails before writing anything if [`Self::version`] is not supported.
    /// If a string or a sequence doesn't fit its length prefix it fails half-way:
    /// whatever was written into the `encoder` must be discarded.
    pub fn encode<E: PacketEncoder>(&self, encoder: &mut E) -> Result<(), CodecError> {
        let layout = FieldLayout::for_version(self.version)?;

        encoder.put_string(&self.group_id)?;

        if layout.generation_id {
            encoder.put_i32(self.generation_id);
        }

        if layout.member_id {
            encoder.put_string(&self.member_id)?;
        }

        if layout.retention_time {
            encoder.put_i64(self.retention_time);
        }

        encoder.put_array_length(self.topics.len())?;
        for topic in &self.topics {
            topic.encode(encoder, &layout)?;
        }

        Ok(())
    }

    /// Read the request body, as laid out for the given `version`.
    ///
    /// The `decoder` has to be positioned at the beginning of the body (i.e. right after the request header).
    /// Fails before reading anything if `version` is not supported.
    pub fn decode<D: PacketDecoder>(decoder: &mut D, version: i16) -> Result<Self, CodecError> {
        let layout = FieldLayout::for_version(version)?;

        let mut request = Self::new(version, decoder.get_string()?);

        if layout.generation_id {
            request.generation_id = decoder.get_i32()?;
        }

        if layout.member_id {
            request.member_id = decoder.get_string()?;
        }

        if layout.retention_time {
            request.retention_time = decoder.get_i64()?;
        }

        let topics_len = decoder.get_array_length()?;
        request.topics = Vec::with_capacity(topics_len);
        for _ in 0..topics_len {
            request.topics.push(TopicRequest::decode(decoder, &layout)?);
        }

        Ok(request)
    }
}

impl TopicRequest {
    fn encode<E: PacketEncoder>(&self, encoder: &mut E, layout: &FieldLayout) -> Result<(), CodecError> {
        encoder.put_string(&self.topic)?;

        encoder.put_array_length(self.partitions.len())?;
        for partition in &self.partitions {
            partition.encode(encoder, layout)?;
        }

        Ok(())
    }

    fn decode<D: PacketDecoder>(decoder: &mut D, layout: &FieldLayout) -> Result<Self, CodecError> {
        let topic = decoder.get_string()?;

        let partitions_len = decoder.get_array_length()?;
        let mut partitions = Vec::with_capacity(partitions_len);
        for _ in 0..partitions_len {
            partitions.push(PartitionRequest::decode(decoder, layout)?);
        }

        Ok(Self { topic, partitions })
    }
}

impl PartitionRequest {
    fn encode<E: PacketEncoder>(&self, encoder: &mut E, layout: &FieldLayout) -> Result<(), CodecError> {
        encoder.put_i32(self.partition);
        encoder.put_i64(self.offset);

        if layout.partition_timestamp {
            encoder.put_i64(self.timestamp);
        }

        encoder.put_nullable_string(self.metadata.as_deref())
    }

    fn decode<D: PacketDecoder>(decoder: &mut D, layout: &FieldLayout) -> Result<Self, CodecError> {
        Ok(Self {
            partition: decoder.get_i32()?,
            offset: decoder.get_i64()?,
            timestamp: if layout.partition_timestamp {
                decoder.get_i64()?
            } else {
                RECEIVE_TIME
            },
            metadata: decoder.get_nullable_string()?,
        })
    }
}

#[cfg(feature = "ts_chrono")]
impl OffsetCommitRequest {
    /// [`Self::retention_time`] as [`chrono::Duration`], or [`None`] if left to the broker.
    pub fn retention_chrono(&self) -> Option<chrono::Duration> {
        crate::utils::millis_to_chrono_duration(self.retention_time)
    }
}

#[cfg(feature = "ts_chrono")]
impl PartitionRequest {
    /// [`Self::timestamp`] as [`chrono::DateTime`], or [`None`] if left to the broker.
    pub fn timestamp_chrono(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        crate::utils::millis_to_chrono_datetime(self.timestamp)
    }
}

#[cfg(feature = "ts_time")]
impl OffsetCommitRequest {
    /// [`Self::retention_time`] as [`time::Duration`], or [`None`] if left to the broker.
    pub fn retention_time_duration(&self) -> Option<time::Duration> {
        crate::utils::millis_to_time_duration(self.retention_time)
    }
}

#[cfg(feature = "ts_time")]
impl PartitionRequest {
    /// [`Self::timestamp`] as [`time::OffsetDateTime`], or [`None`] if left to the broker.
    pub fn timestamp_time(&self) -> Option<time::OffsetDateTime> {
        crate::utils::millis_to_time_offset_datetime(self.timestamp)
    }
}

impl ProtocolBody for OffsetCommitRequest {
    fn key(&self) -> i16 {
        OFFSET_COMMIT_KEY
    }

    fn version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        1
    }

    fn is_valid_version(&self) -> bool {
        FieldLayout::for_version(self.version).is_ok()
    }

    fn required_version(&self) -> KafkaVersion {
        KafkaVersion::required_for(self.version)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::decoder::BytesDecoder;
    use crate::encoder::{BytesEncoder, LengthEncoder};
    use crate::utils::is_thread_safe;

    fn encode_to_vec(request: &OffsetCommitRequest) -> Vec<u8> {
        let mut encoder = BytesEncoder::new();
        request.encode(&mut encoder).unwrap();
        encoder.as_slice().to_vec()
    }

    fn decode_from(bytes: &[u8], version: i16) -> Result<OffsetCommitRequest, CodecError> {
        OffsetCommitRequest::decode(&mut BytesDecoder::from(bytes), version)
    }

    /// Same content, with the fields of all versions set.
    fn sample_request(version: i16) -> OffsetCommitRequest {
        let mut request = OffsetCommitRequest::new(version, "g1");
        request.generation_id = 3;
        request.member_id = "m1".into();
        request.retention_time = 60000;
        request.add_block("t1", 0, 100, 12345, Some("meta".into()));
        request.add_block("t1", 1, 200, 12346, None);
        request.add_block("t0", 7, 0, 12347, Some(String::new()));
        request
    }

    /// What decoding is expected to produce: the fields not on the wire at `version` are "unset".
    fn as_seen_on_wire(mut request: OffsetCommitRequest) -> OffsetCommitRequest {
        let layout = FieldLayout::for_version(request.version).unwrap();
        if !layout.generation_id {
            request.generation_id = GROUP_GENERATION_UNDEFINED;
        }
        if !layout.member_id {
            request.member_id = String::new();
        }
        if !layout.retention_time {
            request.retention_time = RETENTION_TIME_BROKER_DEFAULT;
        }
        if !layout.partition_timestamp {
            for p in request.topics.iter_mut().flat_map(|t| t.partitions.iter_mut()) {
                p.timestamp = RECEIVE_TIME;
            }
        }
        request
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn round_trip(#[case] version: i16) {
        let request = sample_request(version);

        let bytes = encode_to_vec(&request);
        let decoded = decode_from(&bytes, version).unwrap();

        assert_eq!(decoded, as_seen_on_wire(request));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn length_encoder_agrees(#[case] version: i16) {
        let request = sample_request(version);

        let mut counter = LengthEncoder::new();
        request.encode(&mut counter).unwrap();

        assert_eq!(counter.len(), encode_to_vec(&request).len());
    }

    #[test]
    fn version_1_scenario() {
        let mut request = OffsetCommitRequest::new(1, "g1");
        request.generation_id = 3;
        request.member_id = "m1".into();
        request.add_block("t1", 0, 100, 12345, Some("meta".into()));

        let bytes = encode_to_vec(&request);
        #[rustfmt::skip]
        assert_eq!(bytes, vec![
            0x00, 0x02, b'g', b'1',                         // group id
            0x00, 0x00, 0x00, 0x03,                         // generation id
            0x00, 0x02, b'm', b'1',                         // member id
            0x00, 0x00, 0x00, 0x01,                         // topics
            0x00, 0x02, b't', b'1',                         // topic
            0x00, 0x00, 0x00, 0x01,                         // partitions
            0x00, 0x00, 0x00, 0x00,                         // partition
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x64, // offset
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x30, 0x39, // timestamp
            0x00, 0x04, b'm', b'e', b't', b'a',             // metadata
        ]);

        let decoded = decode_from(&bytes, 1).unwrap();
        assert_eq!(decoded, request);
        assert_eq!(decoded.offset("t1", 0), Ok((100, Some("meta"))));
        assert_eq!(decoded.topics[0].partitions[0].timestamp, 12345);

        // Same bytes, wrong version: it must not come back as the same request.
        if let Ok(misread) = decode_from(&bytes, 0) {
            assert_ne!(misread, request);
        }
    }

    #[test]
    fn version_2_scenario() {
        let mut request = OffsetCommitRequest::new(2, "g1");
        request.generation_id = 3;
        request.member_id = "m1".into();
        request.retention_time = 60000;
        request.add_block("t1", 0, 100, 12345, None);

        let bytes = encode_to_vec(&request);
        #[rustfmt::skip]
        assert_eq!(bytes, vec![
            0x00, 0x02, b'g', b'1',                         // group id
            0x00, 0x00, 0x00, 0x03,                         // generation id
            0x00, 0x02, b'm', b'1',                         // member id
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xea, 0x60, // retention time
            0x00, 0x00, 0x00, 0x01,                         // topics
            0x00, 0x02, b't', b'1',                         // topic
            0x00, 0x00, 0x00, 0x01,                         // partitions
            0x00, 0x00, 0x00, 0x00,                         // partition
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x64, // offset
            0xff, 0xff,                                     // metadata (null)
        ]);

        let decoded = decode_from(&bytes, 2).unwrap();
        assert_eq!(decoded.retention_time, 60000);
        assert_eq!(decoded.topics[0].partitions[0].timestamp, RECEIVE_TIME);
        assert_eq!(decoded.topics[0].partitions[0].metadata, None);
    }

    #[test]
    fn version_gating_only_adds_gated_fields() {
        let v0 = encode_to_vec(&sample_request(0));
        let v1 = encode_to_vec(&sample_request(1));
        let v2 = encode_to_vec(&sample_request(2));

        // v1 adds generation id (4) + member id (2 + 2), and a timestamp (8) to each of the 3 partitions.
        assert_eq!(v1.len(), v0.len() + 8 + 3 * 8);
        // v2 adds retention time (8) on top of v1 header fields, and drops the timestamps.
        assert_eq!(v2.len(), v0.len() + 8 + 8);

        // Header fields land right after the group id, and the rest stays identical.
        let group_len = 2 + 2;
        assert_eq!(v0[..group_len], v1[..group_len]);
        assert_eq!(v1[..group_len + 8], v2[..group_len + 8]);
        assert_eq!(v0[group_len..], v2[group_len + 16..]);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn null_and_empty_metadata_stay_distinct(#[case] version: i16) {
        let mut request = OffsetCommitRequest::new(version, "g");
        request.add_block("t", 0, 1, RECEIVE_TIME, None);
        request.add_block("t", 1, 1, RECEIVE_TIME, Some(String::new()));

        let decoded = decode_from(&encode_to_vec(&request), version).unwrap();

        assert_eq!(decoded.offset("t", 0), Ok((1, None)));
        assert_eq!(decoded.offset("t", 1), Ok((1, Some(""))));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn truncated_input_always_fails(#[case] version: i16) {
        let bytes = encode_to_vec(&sample_request(version));

        for len in 0..bytes.len() {
            assert!(decode_from(&bytes[..len], version).is_err(), "decoding succeeded with only {len} bytes");
        }
    }

    #[rstest]
    #[case(-1)]
    #[case(3)]
    fn unsupported_version_fails_fast(#[case] version: i16) {
        let request = sample_request(version);

        let mut encoder = BytesEncoder::new();
        assert_eq!(request.encode(&mut encoder), Err(CodecError::UnsupportedVersion(version)));
        assert!(encoder.as_slice().is_empty());

        let bytes = encode_to_vec(&sample_request(2));
        assert_eq!(decode_from(&bytes, version), Err(CodecError::UnsupportedVersion(version)));
    }

    #[test]
    fn oversized_strings_fail_encoding() {
        let too_long = "x".repeat(i16::MAX as usize + 1);

        let mut request = sample_request(1);
        request.member_id = too_long.clone();
        assert_eq!(request.encode(&mut BytesEncoder::new()), Err(CodecError::StringTooLong(too_long.len())));

        let mut request = sample_request(1);
        request.add_block(&too_long, 0, 0, RECEIVE_TIME, None);
        assert_eq!(request.encode(&mut LengthEncoder::new()), Err(CodecError::StringTooLong(too_long.len())));

        let mut request = sample_request(2);
        request.add_block("t1", 0, 0, RECEIVE_TIME, Some(too_long.clone()));
        assert_eq!(request.encode(&mut BytesEncoder::new()), Err(CodecError::StringTooLong(too_long.len())));
    }

    #[test]
    fn corrupt_topic_count_does_not_allocate() {
        // Group "g", followed by a topic count of 2^31 - 1.
        let bytes = [0x00, 0x01, b'g', 0x7f, 0xff, 0xff, 0xff];

        assert_eq!(decode_from(&bytes, 0), Err(CodecError::InvalidArrayLength(i32::MAX)));
    }

    #[test]
    fn add_block_keeps_order_and_replaces() {
        let mut request = OffsetCommitRequest::new(2, "g");
        request.add_block("b", 1, 10, RECEIVE_TIME, None);
        request.add_block("a", 0, 20, RECEIVE_TIME, None);
        request.add_block("b", 0, 30, RECEIVE_TIME, None);
        request.add_block("b", 1, 40, RECEIVE_TIME, Some("again".into()));

        let topics: Vec<&str> = request.topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(topics, vec!["b", "a"]);

        let b_partitions: Vec<i32> = request.topics[0].partitions.iter().map(|p| p.partition).collect();
        assert_eq!(b_partitions, vec![1, 0]);

        assert_eq!(request.offset("b", 1), Ok((40, Some("again"))));
        assert_eq!(request.offset("c", 0), Err(NoSuchTopic("c".into())));
        assert_eq!(request.offset("a", 5), Err(NoSuchPartition("a".into(), 5)));
    }

    #[rstest]
    #[case(0, true, KafkaVersion::V0_8_2_0)]
    #[case(1, true, KafkaVersion::V0_8_2_0)]
    #[case(2, true, KafkaVersion::V0_9_0_0)]
    #[case(3, false, KafkaVersion::V0_8_2_0)]
    fn protocol_body(#[case] version: i16, #[case] valid: bool, #[case] required: KafkaVersion) {
        let request = OffsetCommitRequest::new(version, "g");

        assert_eq!(request.key(), OFFSET_COMMIT_KEY);
        assert_eq!(ProtocolBody::version(&request), version);
        assert_eq!(request.header_version(), 1);
        assert_eq!(request.is_valid_version(), valid);
        assert_eq!(request.required_version(), required);
    }

    #[cfg(feature = "ts_chrono")]
    #[test]
    fn chrono_accessors() {
        let request = decode_from(&encode_to_vec(&sample_request(1)), 1).unwrap();

        assert_eq!(request.retention_chrono(), None);
        assert_eq!(request.topics[0].partitions[0].timestamp_chrono().map(|dt| dt.timestamp_millis()), Some(12345));
    }

    #[cfg(feature = "ts_time")]
    #[test]
    fn time_accessors() {
        let request = decode_from(&encode_to_vec(&sample_request(2)), 2).unwrap();

        assert_eq!(request.retention_time_duration(), Some(time::Duration::minutes(1)));
        assert_eq!(request.topics[0].partitions[0].timestamp_time(), None);
    }

    #[test]
    fn test_types_thread_safety() {
        is_thread_safe::<OffsetCommitRequest>();
        is_thread_safe::<TopicRequest>();
        is_thread_safe::<PartitionRequest>();
    }
}
