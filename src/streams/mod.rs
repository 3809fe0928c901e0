//! Per-partition record intake for the embedded stream-processing
//! runtime.
//!
//! Each input partition gets a [`RecordQueue`]: batches of raw records go
//! in, and the runtime polls one decoded, timestamp-validated record at a
//! time. Deserialization is lazy (at most one record ahead) and malformed
//! data never propagates: undecodable records are skipped by policy, and
//! a run of them leaves a [`CorruptedRecord`] placeholder behind so
//! committed offsets can still advance.

mod deserializer;
mod queue;
mod record;
mod timestamp;

pub use deserializer::{
    BytesDeserializer, DeserializationError, DeserializationExceptionHandler,
    DeserializationHandlerResponse, Deserializer, LogAndContinueExceptionHandler,
    LogAndFailExceptionHandler, RecordDeserializer, StringDeserializer,
};
pub use queue::RecordQueue;
pub use record::{CorruptedRecord, DecodedRecord, HeadRecord, RawRecord, RecordHeader, StampedRecord};
pub use timestamp::{
    FailOnInvalidTimestamp, LogAndSkipOnInvalidTimestamp, TimestampExtractor,
    UsePartitionTimeOnInvalidTimestamp, WallclockTimestampExtractor,
};
