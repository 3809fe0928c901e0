//! Metadata query response data.
//!
//! Built by the cache read paths; the wire codec that serializes them
//! lives outside this crate. Metadata inconsistencies are reported through
//! per-partition [`ErrorCode`]s rather than Rust errors.

use std::collections::HashSet;

use uuid::Uuid;

use super::broker::Node;
use crate::error::ErrorCode;
use crate::types::{BrokerId, LeaderEpoch};

/// Per-partition entry of a topic metadata response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionMetadata {
    /// Partition-level error code.
    pub error_code: ErrorCode,
    /// Partition index within the topic.
    pub partition_index: i32,
    /// The leader, or [`BrokerId::NO_LEADER`] when the leader is not
    /// reachable through the requested listener.
    pub leader_id: BrokerId,
    /// Leader epoch, copied from the cached state even when the leader is
    /// absent from the response.
    pub leader_epoch: LeaderEpoch,
    /// Replicas, possibly filtered down to reachable brokers.
    pub replica_nodes: Vec<BrokerId>,
    /// In-sync replicas, possibly filtered down to reachable brokers.
    pub isr_nodes: Vec<BrokerId>,
    /// Offline replicas, always verbatim.
    pub offline_replicas: Vec<BrokerId>,
}

/// Per-topic entry of a metadata response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMetadata {
    /// Topic-level error code.
    pub error_code: ErrorCode,
    /// Topic name.
    pub name: String,
    /// Topic id; nil when unknown.
    pub topic_id: Uuid,
    /// Whether the topic is internal to the broker.
    pub is_internal: bool,
    /// Partition entries.
    pub partitions: Vec<PartitionMetadata>,
}

/// A partition resolved to nodes, as exposed in a cluster view.
///
/// Unresolvable brokers appear as placeholder nodes that keep the broker
/// id but carry no address, so replica arrays keep their positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    /// Topic name.
    pub topic: String,
    /// Partition index within the topic.
    pub partition: i32,
    /// The leader node, if a valid leader is known.
    pub leader: Option<Node>,
    /// All assigned replicas.
    pub replicas: Vec<Node>,
    /// In-sync replicas.
    pub isr: Vec<Node>,
    /// Offline replicas.
    pub offline_replicas: Vec<Node>,
}

/// A point-in-time view of the cluster for one listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Cluster identifier.
    pub cluster_id: String,
    /// All brokers reachable through the listener.
    pub nodes: Vec<Node>,
    /// All partitions not undergoing deletion.
    pub partitions: Vec<PartitionInfo>,
    /// Topics the caller may not access; always empty here, authorization
    /// happens upstream.
    pub unauthorized_topics: HashSet<String>,
    /// Topics internal to the broker.
    pub internal_topics: HashSet<String>,
    /// The controller, if one is elected and reachable through the
    /// listener.
    pub controller: Option<Node>,
}
