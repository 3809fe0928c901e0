//! Crate and wire-protocol error types.
//!
//! # Error Hierarchy
//!
//! The crate uses a two-layer error hierarchy:
//!
//! ## Control Plane (`Error`)
//!
//! - [`Error`]: configuration and event-loop errors. Processor failures in
//!   the controller event loop are logged and swallowed by the loop itself
//!   (the event thread never dies from a processing error), so this type
//!   mostly shows up in logs.
//!
//! ## Data Plane (`StreamsError`)
//!
//! - [`StreamsError`]: task-terminating errors raised by the record intake
//!   path. A malformed record is *not* an error at this level (the queue
//!   counts, logs and drops it); only a handler configured to fail, or a
//!   broken timestamp extractor, produces a `StreamsError`.
//! - [`TimestampExtractorError`]: the two-variant return of a timestamp
//!   extractor. The `Fatal` variant is re-raised verbatim, the `User`
//!   variant is wrapped with record context and then raised as fatal.
//!
//! ## Wire Codes (`ErrorCode`)
//!
//! - [`ErrorCode`]: per-partition error codes carried in metadata
//!   responses. Metadata inconsistencies (missing listeners, filtered
//!   replica sets) are encoded here, never raised as Rust errors.

use num_derive::FromPrimitive;
use std::result;
use thiserror::Error as ThisError;

pub type Result<T> = result::Result<T, Error>;

/// Control-plane errors.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An event processor failed; logged by the event loop and swallowed.
    #[error("Event loop error: {0}")]
    EventLoop(String),

    /// A fatal error surfaced from the record intake path.
    #[error(transparent)]
    Streams(#[from] StreamsError),
}

/// Task-terminating errors from the per-partition record intake path.
///
/// Transient data errors (undecodable records, negative timestamps) are
/// counted and dropped before they can reach this type; see the record
/// queue documentation for the full policy.
#[derive(Debug, ThisError)]
pub enum StreamsError {
    /// A record failed to decode and the configured handler chose to fail.
    #[error("Deserialization error on {topic}-{partition} at offset {offset}: {message}")]
    Deserialization {
        topic: String,
        partition: i32,
        offset: i64,
        message: String,
    },

    /// A user-supplied timestamp extractor raised a non-framework error.
    #[error(
        "Fatal user code error in timestamp extractor for record {topic}-{partition}@{offset}"
    )]
    FatalUserError {
        topic: String,
        partition: i32,
        offset: i64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A framework-level invariant was violated.
    #[error("{0}")]
    Fatal(String),
}

/// Two-variant return of a [`TimestampExtractor`] failure.
///
/// The framework variant is re-raised as-is; the user variant is wrapped
/// with a message identifying the record and raised as framework-fatal.
///
/// [`TimestampExtractor`]: crate::streams::TimestampExtractor
#[derive(Debug, ThisError)]
pub enum TimestampExtractorError {
    /// A framework-fatal error; re-raised verbatim.
    #[error(transparent)]
    Fatal(#[from] StreamsError),

    /// Any other failure from user-supplied extractor code.
    #[error("{0}")]
    User(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Per-partition error codes carried in metadata responses.
/// See also the wire protocol error table of the reference broker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, Default)]
pub enum ErrorCode {
    /// An unexpected server error.
    Unknown = -1,
    #[default]
    None = 0,
    /// This request is for a topic or partition that does not exist
    /// on this broker.
    UnknownTopicOrPartition = 3,
    /// There is currently no leader for this partition and hence it is
    /// unavailable for writes.
    LeaderNotAvailable = 5,
    /// The client attempted to send messages to a replica that is not the
    /// leader for some partition. Its metadata is out of date.
    NotLeaderForPartition = 6,
    /// This is not a client facing error and is used mostly by tools
    /// when a broker is not alive.
    BrokerNotAvailable = 8,
    /// If replica is expected on a broker, but is not (this can be
    /// safely ignored).
    ReplicaNotAvailable = 9,
    /// Internal error code for broker-to-broker communication.
    StaleControllerEpoch = 11,
    /// For a request which attempts to access an invalid topic.
    InvalidTopic = 17,
    /// The timestamp of the message is out of acceptable range.
    InvalidTimestamp = 32,
    /// This is not the correct controller for this cluster.
    NotController = 41,
    /// The leader is alive but does not expose the listener the request
    /// arrived on.
    ListenerNotFound = 72,
}
