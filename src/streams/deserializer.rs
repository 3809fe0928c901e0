//! Record deserialization and the deserialization-exception policy.
//!
//! Decoding happens lazily, at most one record ahead of the consumer, in
//! the record queue's head update. When a record fails to decode the
//! configured [`DeserializationExceptionHandler`] decides whether the
//! record is skipped (counted, logged, dropped) or the whole task fails.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error as ThisError;
use tracing::{error, warn};

use super::record::{DecodedRecord, RawRecord};
use crate::error::StreamsError;
use crate::metrics;

/// A failure to decode one serialized key or value.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct DeserializationError {
    /// Human-readable failure description.
    pub message: String,
}

impl DeserializationError {
    /// Create a new deserialization error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Decodes one side (key or value) of a record.
pub trait Deserializer<T>: Send + Sync {
    /// Decode `data` consumed from `topic`.
    fn deserialize(&self, topic: &str, data: &Bytes) -> Result<T, DeserializationError>;
}

/// Pass-through deserializer for consumers that want raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesDeserializer;

impl Deserializer<Bytes> for BytesDeserializer {
    fn deserialize(&self, _topic: &str, data: &Bytes) -> Result<Bytes, DeserializationError> {
        Ok(data.clone())
    }
}

/// UTF-8 string deserializer; fails on invalid UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDeserializer;

impl Deserializer<String> for StringDeserializer {
    fn deserialize(&self, _topic: &str, data: &Bytes) -> Result<String, DeserializationError> {
        std::str::from_utf8(data)
            .map(|s| s.to_string())
            .map_err(|e| DeserializationError::new(format!("invalid UTF-8: {}", e)))
    }
}

/// What to do with a record that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeserializationHandlerResponse {
    /// Skip the record and keep going.
    Continue,
    /// Fail the owning task.
    Fail,
}

/// Policy seam consulted when a record fails to decode.
pub trait DeserializationExceptionHandler: Send + Sync {
    /// Decide whether the record is skipped or the task fails.
    fn handle(
        &self,
        record: &RawRecord,
        error: &DeserializationError,
    ) -> DeserializationHandlerResponse;
}

/// Log the failure and skip the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndContinueExceptionHandler;

impl DeserializationExceptionHandler for LogAndContinueExceptionHandler {
    fn handle(
        &self,
        record: &RawRecord,
        error: &DeserializationError,
    ) -> DeserializationHandlerResponse {
        warn!(
            topic = %record.topic,
            partition = record.partition,
            offset = %record.offset,
            error = %error,
            "Skipping record that failed to deserialize"
        );
        DeserializationHandlerResponse::Continue
    }
}

/// Log the failure and fail the task.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndFailExceptionHandler;

impl DeserializationExceptionHandler for LogAndFailExceptionHandler {
    fn handle(
        &self,
        record: &RawRecord,
        error: &DeserializationError,
    ) -> DeserializationHandlerResponse {
        error!(
            topic = %record.topic,
            partition = record.partition,
            offset = %record.offset,
            error = %error,
            "Failing task because a record failed to deserialize"
        );
        DeserializationHandlerResponse::Fail
    }
}

/// Decodes raw records, applying the configured exception policy.
pub struct RecordDeserializer<K, V> {
    key_deserializer: Arc<dyn Deserializer<K>>,
    value_deserializer: Arc<dyn Deserializer<V>>,
    handler: Arc<dyn DeserializationExceptionHandler>,
}

impl<K, V> RecordDeserializer<K, V> {
    /// Create a deserializer with the given key/value codecs and policy.
    pub fn new(
        key_deserializer: Arc<dyn Deserializer<K>>,
        value_deserializer: Arc<dyn Deserializer<V>>,
        handler: Arc<dyn DeserializationExceptionHandler>,
    ) -> Self {
        Self {
            key_deserializer,
            value_deserializer,
            handler,
        }
    }

    /// Decode a raw record.
    ///
    /// Returns `Ok(None)` when the record failed to decode and the handler
    /// chose to skip it; the skip has already been counted and logged.
    pub fn deserialize(
        &self,
        raw: &RawRecord,
    ) -> Result<Option<DecodedRecord<K, V>>, StreamsError> {
        match self.try_decode(raw) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(error) => match self.handler.handle(raw, &error) {
                DeserializationHandlerResponse::Continue => {
                    let partition = raw.partition.to_string();
                    metrics::DROPPED_RECORDS
                        .with_label_values(&[raw.topic.as_str(), partition.as_str()])
                        .inc();
                    Ok(None)
                }
                DeserializationHandlerResponse::Fail => Err(StreamsError::Deserialization {
                    topic: raw.topic.clone(),
                    partition: raw.partition,
                    offset: raw.offset.value(),
                    message: error.message,
                }),
            },
        }
    }

    fn try_decode(&self, raw: &RawRecord) -> Result<DecodedRecord<K, V>, DeserializationError> {
        let key = raw
            .key
            .as_ref()
            .map(|k| self.key_deserializer.deserialize(&raw.topic, k))
            .transpose()?;
        let value = raw
            .value
            .as_ref()
            .map(|v| self.value_deserializer.deserialize(&raw.topic, v))
            .transpose()?;
        Ok(DecodedRecord {
            topic: raw.topic.clone(),
            partition: raw.partition,
            offset: raw.offset,
            timestamp: raw.timestamp,
            key,
            value,
            headers: raw.headers.clone(),
        })
    }
}
