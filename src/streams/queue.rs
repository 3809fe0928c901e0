//! Per-partition FIFO of raw records with a lazily decoded head.
//!
//! The queue buffers raw records for one input partition and materializes
//! at most one decoded, timestamp-validated head record for the
//! processing engine to poll. It also tracks the partition time, defined
//! as the largest valid timestamp seen on the partition so far; this is
//! passed to the timestamp extractor.
//!
//! The queue is owned by a single task thread and is not safe for
//! concurrent access.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{trace, warn};

use super::deserializer::RecordDeserializer;
use super::record::{CorruptedRecord, HeadRecord, RawRecord, StampedRecord};
use super::timestamp::TimestampExtractor;
use crate::error::{StreamsError, TimestampExtractorError};
use crate::metrics;
use crate::types::{Offset, Timestamp, TopicPartition};

/// Ordered intake buffer for one input partition.
pub struct RecordQueue<K, V> {
    partition: TopicPartition,
    /// Name of the source node this queue feeds.
    source: String,
    fifo: VecDeque<RawRecord>,
    head: Option<HeadRecord<K, V>>,
    partition_time: Timestamp,
    deserializer: RecordDeserializer<K, V>,
    extractor: Arc<dyn TimestampExtractor<K, V>>,
    total_bytes_buffered: u64,
    head_record_size_bytes: u64,
}

impl<K, V> RecordQueue<K, V> {
    /// Create an empty queue for one partition.
    pub fn new(
        partition: TopicPartition,
        source: impl Into<String>,
        extractor: Arc<dyn TimestampExtractor<K, V>>,
        deserializer: RecordDeserializer<K, V>,
    ) -> Self {
        Self {
            partition,
            source: source.into(),
            fifo: VecDeque::new(),
            head: None,
            partition_time: Timestamp::UNKNOWN,
            deserializer,
            extractor,
            total_bytes_buffered: 0,
            head_record_size_bytes: 0,
        }
    }

    /// The partition this queue is associated with.
    pub fn partition(&self) -> &TopicPartition {
        &self.partition
    }

    /// The source node this queue feeds.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Append a batch of raw records and refresh the head.
    ///
    /// Returns the queue size (buffered records plus the materialized
    /// head, if any). Fails only on task-terminating errors from the
    /// deserialization policy or the timestamp extractor.
    pub fn add_raw_records(
        &mut self,
        raw_records: impl IntoIterator<Item = RawRecord>,
    ) -> Result<usize, StreamsError> {
        for raw in raw_records {
            self.total_bytes_buffered += raw.size_in_bytes();
            self.fifo.push_back(raw);
        }

        self.update_head()?;
        self.update_bytes_gauge();

        Ok(self.size())
    }

    /// Take the current head record, advance the partition time and
    /// materialize the next head.
    ///
    /// Returns `None` when no head is materialized; callers normally
    /// check [`is_empty`](RecordQueue::is_empty) first.
    pub fn poll(&mut self) -> Result<Option<HeadRecord<K, V>>, StreamsError> {
        let Some(head) = self.head.take() else {
            return Ok(None);
        };

        self.total_bytes_buffered -= self.head_record_size_bytes;
        self.head_record_size_bytes = 0;
        self.partition_time = self.partition_time.max(head.timestamp());

        self.update_head()?;
        self.update_bytes_gauge();

        Ok(Some(head))
    }

    /// Number of buffered records, counting the materialized head.
    pub fn size(&self) -> usize {
        // plus one deserialized head record for timestamp tracking
        self.fifo.len() + usize::from(self.head.is_some())
    }

    /// Whether the queue holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty() && self.head.is_none()
    }

    /// Timestamp of the head record, [`Timestamp::UNKNOWN`] if there is
    /// no head or the head is corrupted.
    pub fn head_record_timestamp(&self) -> Timestamp {
        self.head
            .as_ref()
            .map_or(Timestamp::UNKNOWN, |head| head.timestamp())
    }

    /// Offset of the head record, if one is materialized.
    pub fn head_record_offset(&self) -> Option<Offset> {
        self.head.as_ref().map(|head| head.offset())
    }

    /// Drop all buffered and head state and reset the partition time.
    pub fn clear(&mut self) {
        self.fifo.clear();
        self.head = None;
        self.head_record_size_bytes = 0;
        self.total_bytes_buffered = 0;
        self.partition_time = Timestamp::UNKNOWN;
        self.update_bytes_gauge();
    }

    /// The largest valid timestamp seen on this partition.
    pub fn partition_time(&self) -> Timestamp {
        self.partition_time
    }

    /// Override the partition time (used on restore from checkpoint).
    pub fn set_partition_time(&mut self, partition_time: Timestamp) {
        self.partition_time = partition_time;
    }

    /// Bytes currently buffered, including the head record.
    pub fn total_bytes_buffered(&self) -> u64 {
        self.total_bytes_buffered
    }

    /// Decode buffered records until a head is materialized or the FIFO
    /// runs dry.
    ///
    /// Skipped (undecodable) records and records with a negative extracted
    /// timestamp are dropped here; if a run of undecodable records drains
    /// the FIFO, the last one is installed as a corrupted head so the
    /// consumer can still advance committed offsets past it.
    fn update_head(&mut self) -> Result<(), StreamsError> {
        let mut last_corrupted: Option<RawRecord> = None;

        while self.head.is_none() {
            let Some(raw) = self.fifo.pop_front() else {
                break;
            };

            let Some(decoded) = self.deserializer.deserialize(&raw)? else {
                // The deserializer chose to skip; it already logged why.
                last_corrupted = Some(raw);
                continue;
            };

            let timestamp = match self.extractor.extract(&decoded, self.partition_time) {
                Ok(timestamp) => timestamp,
                Err(TimestampExtractorError::Fatal(fatal)) => return Err(fatal),
                Err(TimestampExtractorError::User(source)) => {
                    return Err(StreamsError::FatalUserError {
                        topic: decoded.topic.clone(),
                        partition: decoded.partition,
                        offset: decoded.offset.value(),
                        source,
                    });
                }
            };
            trace!(
                source = %self.source,
                timestamp = %timestamp,
                offset = %decoded.offset,
                "Extracted timestamp for record"
            );

            // drop message if TS is invalid, i.e., negative
            if !timestamp.is_valid() {
                warn!(
                    topic = %decoded.topic,
                    partition = decoded.partition,
                    offset = %decoded.offset,
                    extracted_timestamp = %timestamp,
                    extractor = self.extractor.name(),
                    "Skipping record due to negative extracted timestamp"
                );
                let partition = decoded.partition.to_string();
                metrics::DROPPED_RECORDS
                    .with_label_values(&[decoded.topic.as_str(), partition.as_str()])
                    .inc();
                continue;
            }

            self.head_record_size_bytes = raw.size_in_bytes();
            self.head = Some(HeadRecord::Stamped(StampedRecord {
                record: decoded,
                timestamp,
            }));
        }

        // If all records in the FIFO were corrupted, make the last one the
        // head so committed offsets can move past the poison run.
        if self.head.is_none() {
            if let Some(raw) = last_corrupted {
                self.head = Some(HeadRecord::Corrupted(CorruptedRecord::from_raw(&raw)));
            }
        }

        Ok(())
    }

    fn update_bytes_gauge(&self) {
        let partition = self.partition.partition().to_string();
        metrics::RECORD_QUEUE_BYTES
            .with_label_values(&[self.partition.topic(), partition.as_str()])
            .set(self.total_bytes_buffered as i64);
    }
}
