//! Record types flowing through the per-partition intake queue.

use bytes::Bytes;

use crate::constants::{RECORD_OFFSET_SIZE, RECORD_PARTITION_SIZE, RECORD_TIMESTAMP_SIZE};
use crate::types::{Offset, Timestamp, TopicPartition};

/// A record header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    /// Header key.
    pub key: String,
    /// Header value; may be absent.
    pub value: Option<Bytes>,
}

impl RecordHeader {
    /// Create a new header.
    pub fn new(key: impl Into<String>, value: Option<Bytes>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A raw consumed record: undecoded key/value bytes plus position
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Topic the record was consumed from.
    pub topic: String,
    /// Partition the record was consumed from.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: Offset,
    /// Broker-assigned timestamp.
    pub timestamp: Timestamp,
    /// Serialized key, if present.
    pub key: Option<Bytes>,
    /// Serialized value, if present.
    pub value: Option<Bytes>,
    /// Record headers.
    pub headers: Vec<RecordHeader>,
}

impl RawRecord {
    /// The partition this record belongs to.
    pub fn topic_partition(&self) -> TopicPartition {
        TopicPartition::new(self.topic.clone(), self.partition)
    }

    /// Bytes this record accounts for while buffered: serialized key and
    /// value sizes plus timestamp, offset, topic name, partition and
    /// header overhead.
    pub fn size_in_bytes(&self) -> u64 {
        let header_bytes: u64 = self
            .headers
            .iter()
            .map(|h| h.key.len() as u64 + h.value.as_ref().map_or(0, |v| v.len() as u64))
            .sum();

        self.key.as_ref().map_or(0, |k| k.len() as u64)
            + self.value.as_ref().map_or(0, |v| v.len() as u64)
            + RECORD_TIMESTAMP_SIZE
            + RECORD_OFFSET_SIZE
            + self.topic.len() as u64
            + RECORD_PARTITION_SIZE
            + header_bytes
    }
}

/// A decoded record with typed key and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord<K, V> {
    /// Topic the record was consumed from.
    pub topic: String,
    /// Partition the record was consumed from.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: Offset,
    /// Broker-assigned timestamp.
    pub timestamp: Timestamp,
    /// Decoded key, if present.
    pub key: Option<K>,
    /// Decoded value, if present.
    pub value: Option<V>,
    /// Record headers, carried over from the raw record.
    pub headers: Vec<RecordHeader>,
}

/// A decoded record paired with its extracted timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampedRecord<K, V> {
    /// The decoded record.
    pub record: DecodedRecord<K, V>,
    /// Timestamp assigned by the configured extractor; always valid.
    pub timestamp: Timestamp,
}

impl<K, V> StampedRecord<K, V> {
    /// Offset of the underlying record.
    pub fn offset(&self) -> Offset {
        self.record.offset
    }
}

/// Placeholder for a record that failed decoding, retained so the
/// consumer can still advance committed offsets past poison entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptedRecord {
    /// Topic of the undecodable record.
    pub topic: String,
    /// Partition of the undecodable record.
    pub partition: i32,
    /// Offset of the undecodable record.
    pub offset: Offset,
}

impl CorruptedRecord {
    pub(crate) fn from_raw(raw: &RawRecord) -> Self {
        Self {
            topic: raw.topic.clone(),
            partition: raw.partition,
            offset: raw.offset,
        }
    }
}

/// The materialized head of a record queue: either a decoded,
/// timestamp-validated record or a corrupted-record placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadRecord<K, V> {
    /// A decoded record that passed timestamp validation.
    Stamped(StampedRecord<K, V>),
    /// A decode-failure placeholder.
    Corrupted(CorruptedRecord),
}

impl<K, V> HeadRecord<K, V> {
    /// The extracted timestamp; [`Timestamp::UNKNOWN`] for corrupted
    /// placeholders.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            HeadRecord::Stamped(stamped) => stamped.timestamp,
            HeadRecord::Corrupted(_) => Timestamp::UNKNOWN,
        }
    }

    /// Offset of the underlying record.
    pub fn offset(&self) -> Offset {
        match self {
            HeadRecord::Stamped(stamped) => stamped.offset(),
            HeadRecord::Corrupted(corrupted) => corrupted.offset,
        }
    }

    /// Whether this head is a corrupted-record placeholder.
    pub fn is_corrupted(&self) -> bool {
        matches!(self, HeadRecord::Corrupted(_))
    }
}
