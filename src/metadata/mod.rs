//! Cluster metadata cache.
//!
//! This module is the single source of truth for what this node believes
//! about the cluster: partition leadership, replica and in-sync replica
//! sets, live brokers and their listener endpoints, the controller
//! identity, and the topic-id mapping.
//!
//! # Architecture
//!
//! - [`MetadataSnapshot`]: immutable snapshot with all metadata
//! - [`MetadataCache`]: thread-safe wrapper with an atomically swapped
//!   snapshot; lock-free reads, mutex-serialized controller updates
//! - Value types: [`PartitionState`], [`LeaderAndIsr`], [`Broker`],
//!   [`EndPoint`], [`Node`]
//!
//! The view is eventually consistent by design: it is rebuilt from
//! controller updates and never persisted.

mod broker;
mod cache;
mod leader_and_isr;
mod partition_state;
mod request;
mod response;
mod snapshot;

pub use broker::{Broker, EndPoint, Node, SecurityProtocol};
pub use cache::MetadataCache;
pub use leader_and_isr::{LeaderAndIsr, LeaderRecoveryState};
pub use partition_state::PartitionState;
pub use request::{UpdateMetadataBroker, UpdateMetadataRequest, UpdateMetadataTopicState};
pub use response::{Cluster, PartitionInfo, PartitionMetadata, TopicMetadata};
pub use snapshot::MetadataSnapshot;
