//! Timestamp extraction policies.
//!
//! The record queue calls the configured extractor with each decoded
//! record and the current partition time (the largest valid timestamp
//! seen so far). A failed extraction is either framework-fatal (re-raised
//! as-is) or a user-code error (wrapped with record context, then fatal);
//! a negative extracted timestamp makes the queue drop the record.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use super::record::DecodedRecord;
use crate::error::{StreamsError, TimestampExtractorError};
use crate::types::Timestamp;

/// Assigns an event timestamp to each decoded record.
pub trait TimestampExtractor<K, V>: Send + Sync {
    /// Extract a timestamp for `record`, given the partition time
    /// observed so far (which may be [`Timestamp::UNKNOWN`]).
    fn extract(
        &self,
        record: &DecodedRecord<K, V>,
        partition_time: Timestamp,
    ) -> Result<Timestamp, TimestampExtractorError>;

    /// Name used in drop-warning log lines.
    fn name(&self) -> &'static str;
}

/// Use the embedded record timestamp and fail the task if it is invalid.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailOnInvalidTimestamp;

impl<K, V> TimestampExtractor<K, V> for FailOnInvalidTimestamp {
    fn extract(
        &self,
        record: &DecodedRecord<K, V>,
        _partition_time: Timestamp,
    ) -> Result<Timestamp, TimestampExtractorError> {
        if !record.timestamp.is_valid() {
            return Err(TimestampExtractorError::Fatal(StreamsError::Fatal(format!(
                "Input record from {}-{} at offset {} has invalid (negative) timestamp {}. \
                 Possibly because a pre-0.10 producer client was used to write this record \
                 or because the input topic was created before upgrading the broker. \
                 Use a different timestamp extractor to process this data.",
                record.topic, record.partition, record.offset, record.timestamp
            ))));
        }
        Ok(record.timestamp)
    }

    fn name(&self) -> &'static str {
        "FailOnInvalidTimestamp"
    }
}

/// Use the embedded record timestamp; invalid timestamps are passed
/// through for the queue to drop, with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndSkipOnInvalidTimestamp;

impl<K, V> TimestampExtractor<K, V> for LogAndSkipOnInvalidTimestamp {
    fn extract(
        &self,
        record: &DecodedRecord<K, V>,
        _partition_time: Timestamp,
    ) -> Result<Timestamp, TimestampExtractorError> {
        if !record.timestamp.is_valid() {
            warn!(
                topic = %record.topic,
                partition = record.partition,
                offset = %record.offset,
                timestamp = %record.timestamp,
                "Input record has invalid (negative) timestamp; the record will be dropped"
            );
        }
        Ok(record.timestamp)
    }

    fn name(&self) -> &'static str {
        "LogAndSkipOnInvalidTimestamp"
    }
}

/// Use the embedded record timestamp, substituting the current partition
/// time when it is invalid. Fails the task if neither is usable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsePartitionTimeOnInvalidTimestamp;

impl<K, V> TimestampExtractor<K, V> for UsePartitionTimeOnInvalidTimestamp {
    fn extract(
        &self,
        record: &DecodedRecord<K, V>,
        partition_time: Timestamp,
    ) -> Result<Timestamp, TimestampExtractorError> {
        if record.timestamp.is_valid() {
            return Ok(record.timestamp);
        }
        if partition_time.is_valid() {
            return Ok(partition_time);
        }
        Err(TimestampExtractorError::Fatal(StreamsError::Fatal(format!(
            "Could not infer a new timestamp for input record from {}-{} at offset {}: \
             the record timestamp is invalid and no valid partition time has been observed yet",
            record.topic, record.partition, record.offset
        ))))
    }

    fn name(&self) -> &'static str {
        "UsePartitionTimeOnInvalidTimestamp"
    }
}

/// Ignore the embedded timestamp and use wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallclockTimestampExtractor;

impl<K, V> TimestampExtractor<K, V> for WallclockTimestampExtractor {
    fn extract(
        &self,
        _record: &DecodedRecord<K, V>,
        _partition_time: Timestamp,
    ) -> Result<Timestamp, TimestampExtractorError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TimestampExtractorError::User(Box::new(e)))?;
        Ok(Timestamp::new(now.as_millis() as i64))
    }

    fn name(&self) -> &'static str {
        "WallclockTimestampExtractor"
    }
}
