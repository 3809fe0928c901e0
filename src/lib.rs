//! # Brokerage
//! In-memory control plane for a Kafka-compatible broker node.
//!
//! This crate provides the three pieces of a broker node that have to get
//! concurrency exactly right:
//!
//! - [`metadata::MetadataCache`]: a per-node, asynchronously replicated
//!   view of the cluster (partition leadership, replica and in-sync
//!   replica sets, live brokers and their listeners, controller identity,
//!   topic-id mapping). Reads are lock-free against an atomically swapped
//!   immutable snapshot; controller updates are serialized on a writer
//!   lock.
//! - [`controller::ControllerEventManager`]: a single-consumer event
//!   queue that serializes all state-changing operations on the
//!   controller side, with a preemption primitive that discards queued
//!   work so a higher-priority event can run first.
//! - [`streams::RecordQueue`]: a per-partition intake buffer that lazily
//!   decodes raw records, validates extracted timestamps, drops malformed
//!   entries by policy, and exposes a one-record look-ahead to the stream
//!   processing engine.
//!
//! # Goals
//! - Easy to understand code
//! - Leverage best in class libraries such as [Tokio](https://tokio.rs/)
//!   and [arc-swap](https://docs.rs/arc-swap)
//! - Consistent reads under concurrent controller updates, without reader
//!   locks
//!
//! # Example
//!
//! ```rust
//! use brokerage::metadata::{
//!     EndPoint, MetadataCache, PartitionState, SecurityProtocol, UpdateMetadataBroker,
//!     UpdateMetadataRequest,
//! };
//! use brokerage::types::{BrokerId, CorrelationId, LeaderEpoch, ListenerName};
//!
//! let cache = MetadataCache::new(BrokerId::new(0));
//! let request = UpdateMetadataRequest {
//!     controller_id: 0,
//!     controller_epoch: 1,
//!     live_brokers: vec![UpdateMetadataBroker {
//!         id: BrokerId::new(0),
//!         endpoints: vec![EndPoint::new(
//!             "localhost",
//!             9092,
//!             "PLAINTEXT",
//!             SecurityProtocol::Plaintext,
//!         )],
//!         rack: None,
//!     }],
//!     topic_states: vec![],
//!     partition_states: vec![PartitionState {
//!         topic: "orders".to_string(),
//!         partition_index: 0,
//!         leader: BrokerId::new(0),
//!         leader_epoch: LeaderEpoch::new(0),
//!         replicas: vec![BrokerId::new(0)],
//!         isr: vec![BrokerId::new(0)],
//!         offline_replicas: vec![],
//!     }],
//! };
//! let deleted = cache.update_metadata(CorrelationId::new(1), &request);
//! assert!(deleted.is_empty());
//!
//! let leader = cache
//!     .get_partition_leader_endpoint("orders", 0, &ListenerName::new("PLAINTEXT"))
//!     .expect("partition is known");
//! assert_eq!(leader.id, BrokerId::new(0));
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod streams;
pub mod telemetry;
pub mod types;

pub mod prelude {
    //! Main export of control plane structures.

    pub use crate::controller::{
        ControllerEvent, ControllerEventManager, ControllerEventProcessor, ControllerState,
    };
    pub use crate::error::{Error, ErrorCode, Result, StreamsError};
    pub use crate::metadata::{MetadataCache, MetadataSnapshot, UpdateMetadataRequest};
    pub use crate::streams::{RawRecord, RecordQueue};
    pub use crate::types::{
        BrokerId, CorrelationId, LeaderEpoch, ListenerName, Offset, PartitionEpoch, Timestamp,
        TopicPartition,
    };

    pub use bytes;
}
