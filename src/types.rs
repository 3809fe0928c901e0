//! Type-safe wrappers for broker protocol primitives.
//!
//! These newtypes provide type safety to prevent mixing up different
//! integer types that have the same underlying representation but
//! different semantic meanings.

use std::borrow::Borrow;
use std::fmt;

use crate::constants::{LEADER_DURING_DELETE, NO_LEADER, UNKNOWN_TIMESTAMP};

/// A broker identifier.
///
/// Broker ids are 32-bit signed integers that uniquely identify brokers
/// within a cluster. Leader fields reuse this type, so the leadership
/// sentinels live here as well.
///
/// # Special Values
///
/// - [`BrokerId::NO_LEADER`] (`-1`): the partition has no leader.
/// - [`BrokerId::LEADER_DURING_DELETE`] (`-2`): the partition is being
///   deleted; metadata caches drop it on sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BrokerId(pub i32);

impl BrokerId {
    /// No leader is currently elected for the partition.
    pub const NO_LEADER: Self = BrokerId(NO_LEADER);

    /// The partition is being deleted.
    pub const LEADER_DURING_DELETE: Self = BrokerId(LEADER_DURING_DELETE);

    /// Create a new broker id from a raw value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        BrokerId(value)
    }

    /// Get the raw i32 value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Check if this is a valid (non-negative) broker id.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl From<i32> for BrokerId {
    fn from(value: i32) -> Self {
        BrokerId(value)
    }
}

impl From<BrokerId> for i32 {
    fn from(id: BrokerId) -> Self {
        id.0
    }
}

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A monotonically increasing generation number for a partition's
/// leadership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LeaderEpoch(pub i32);

impl LeaderEpoch {
    /// Epoch sent alongside a delete sentinel.
    pub const DURING_DELETE: Self = LeaderEpoch(crate::constants::EPOCH_DURING_DELETE);

    /// Epoch assigned when a partition is first created.
    pub const INITIAL: Self = LeaderEpoch(crate::constants::INITIAL_LEADER_EPOCH);

    /// Create a new leader epoch from a raw value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        LeaderEpoch(value)
    }

    /// Get the raw i32 value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// The next epoch.
    #[inline]
    pub const fn next(self) -> Self {
        LeaderEpoch(self.0 + 1)
    }
}

impl From<i32> for LeaderEpoch {
    fn from(value: i32) -> Self {
        LeaderEpoch(value)
    }
}

impl fmt::Display for LeaderEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A monotonically increasing version of a partition's full replication
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PartitionEpoch(pub i32);

impl PartitionEpoch {
    /// Epoch assigned when a partition is first created.
    pub const INITIAL: Self = PartitionEpoch(crate::constants::INITIAL_PARTITION_EPOCH);

    /// Create a new partition epoch from a raw value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        PartitionEpoch(value)
    }

    /// Get the raw i32 value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// The next epoch.
    #[inline]
    pub const fn next(self) -> Self {
        PartitionEpoch(self.0 + 1)
    }
}

impl From<i32> for PartitionEpoch {
    fn from(value: i32) -> Self {
        PartitionEpoch(value)
    }
}

impl fmt::Display for PartitionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request correlation id.
///
/// Correlation ids are 32-bit signed integers that tie log lines produced
/// while applying a metadata update back to the controller request that
/// caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CorrelationId(pub i32);

impl CorrelationId {
    /// Create a new correlation id from a raw value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        CorrelationId(value)
    }

    /// Get the raw i32 value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for CorrelationId {
    fn from(value: i32) -> Self {
        CorrelationId(value)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message offset within a partition.
///
/// Offsets are 64-bit signed integers that represent the position of a
/// record within a partition's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Offset(pub i64);

impl Offset {
    /// Invalid offset, typically used to indicate an error or unset value.
    pub const INVALID: Self = Offset(-1);

    /// Create a new offset from a raw value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Offset(value)
    }

    /// Get the raw i64 value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Check if this is a valid (non-negative) offset.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl From<i64> for Offset {
    fn from(value: i64) -> Self {
        Offset(value)
    }
}

impl From<Offset> for i64 {
    fn from(offset: Offset) -> Self {
        offset.0
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record timestamp in milliseconds since the epoch.
///
/// # Special Values
///
/// - [`Timestamp::UNKNOWN`] (`-1`): no timestamp has been observed. A
///   fresh record queue reports this as its partition time, and corrupted
///   head records carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// No timestamp has been observed.
    pub const UNKNOWN: Self = Timestamp(UNKNOWN_TIMESTAMP);

    /// Create a new timestamp from a raw value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Timestamp(value)
    }

    /// Get the raw i64 value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Check if this is a valid (non-negative) timestamp.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::UNKNOWN
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Timestamp(value)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A topic-partition identifier.
///
/// This type provides a more ergonomic and type-safe way to identify a
/// specific partition within a topic, replacing the common pattern of
/// using `(String, i32)` tuples throughout the codebase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPartition {
    /// The topic name.
    topic: String,
    /// The partition index.
    partition: i32,
}

impl TopicPartition {
    /// Create a new topic-partition identifier.
    #[inline]
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }

    /// Get the topic name.
    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Get the partition index.
    #[inline]
    pub fn partition(&self) -> i32 {
        self.partition
    }
}

impl From<(String, i32)> for TopicPartition {
    fn from((topic, partition): (String, i32)) -> Self {
        Self { topic, partition }
    }
}

impl From<(&str, i32)> for TopicPartition {
    fn from((topic, partition): (&str, i32)) -> Self {
        Self {
            topic: topic.to_string(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.topic, self.partition)
    }
}

/// A named network endpoint exposed by a broker.
///
/// Listener names distinguish multiple endpoints on one broker (for
/// example `INTERNAL` for replication traffic and `EXTERNAL` for
/// clients). All metadata lookups are listener-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerName(String);

impl ListenerName {
    /// Create a new listener name.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        ListenerName(name.into())
    }

    /// Get the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ListenerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ListenerName {
    fn from(name: &str) -> Self {
        ListenerName(name.to_string())
    }
}

impl From<String> for ListenerName {
    fn from(name: String) -> Self {
        ListenerName(name)
    }
}

impl fmt::Display for ListenerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
