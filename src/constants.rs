//! Centralized protocol sentinels and configuration constants.
//!
//! This module consolidates the magic numbers used throughout the broker
//! control plane. Having them in one place makes it easier to:
//!
//! - Understand the protocol constraints
//! - Update values consistently
//! - Document the rationale for each constant
//!
//! # Categories
//!
//! - **Leadership Sentinels**: special leader ids and epochs
//! - **Record Accounting**: per-record buffered-size overheads
//! - **Internal Topics**: topic names owned by the broker itself
//! - **Controller Constants**: event loop tuning defaults

// =============================================================================
// Leadership Sentinels
// =============================================================================

/// Leader id meaning "this partition currently has no leader".
pub const NO_LEADER: i32 = -1;

/// Leader id sentinel carried by an update request to signal that the
/// partition is being deleted and must be dropped from the cache.
pub const LEADER_DURING_DELETE: i32 = -2;

/// Leader epoch sent alongside [`LEADER_DURING_DELETE`].
pub const EPOCH_DURING_DELETE: i32 = -2;

/// Initial leader epoch assigned when a partition is first created.
pub const INITIAL_LEADER_EPOCH: i32 = 0;

/// Initial partition epoch assigned when a partition is first created.
pub const INITIAL_PARTITION_EPOCH: i32 = 0;

// =============================================================================
// Record Accounting
// =============================================================================

/// Timestamp value meaning "no timestamp has been observed".
pub const UNKNOWN_TIMESTAMP: i64 = -1;

/// Bytes accounted for the record timestamp field.
pub const RECORD_TIMESTAMP_SIZE: u64 = 8;

/// Bytes accounted for the record offset field.
pub const RECORD_OFFSET_SIZE: u64 = 8;

/// Bytes accounted for the record partition field.
pub const RECORD_PARTITION_SIZE: u64 = 4;

// =============================================================================
// Internal Topics
// =============================================================================

/// Topic backing consumer group offset commits.
pub const CONSUMER_OFFSETS_TOPIC: &str = "__consumer_offsets";

/// Topic backing transaction state.
pub const TRANSACTION_STATE_TOPIC: &str = "__transaction_state";

/// Check whether a topic is owned by the broker itself.
///
/// Internal topics are flagged in metadata responses and listed in
/// cluster views so clients can avoid writing to them.
pub fn is_internal_topic(topic: &str) -> bool {
    topic == CONSUMER_OFFSETS_TOPIC || topic == TRANSACTION_STATE_TOPIC
}

// =============================================================================
// Controller Constants
// =============================================================================

/// How long the controller event thread waits for a new event before it
/// resets the queue-time tracker and falls back to an untimed wait.
///
/// The reset keeps the queue-time histogram from reporting stale latency
/// after a long quiescent period.
pub const DEFAULT_EVENT_QUEUE_POLL_TIMEOUT_MS: u64 = 300_000;
