//! Immutable cluster metadata snapshot.

use imbl::HashMap as ImHashMap;
use uuid::Uuid;

use super::broker::{Broker, Node};
use super::partition_state::PartitionState;
use crate::types::{BrokerId, ListenerName, TopicPartition};

/// Immutable metadata snapshot that is atomically swapped.
/// All reads see a consistent view of the entire cluster metadata.
///
/// Uses `imbl::HashMap` for structural sharing - clones are O(1) and
/// updates only copy the path to the changed node, so the update path can
/// start from the previous snapshot's maps without deep-copying them.
#[derive(Debug, Clone)]
pub struct MetadataSnapshot {
    /// Partition replication state by topic, then partition index.
    pub partition_states: ImHashMap<String, ImHashMap<i32, PartitionState>>,

    /// Topic name to topic id. Ids are never nil; a nil id in an update
    /// clears the entry instead.
    pub topic_ids: ImHashMap<String, Uuid>,

    /// Inverse of `topic_ids`, precomputed at construction.
    pub topic_names: ImHashMap<Uuid, String>,

    /// The current controller, if one is elected.
    pub controller_id: Option<BrokerId>,

    /// Live brokers by id.
    pub alive_brokers: ImHashMap<BrokerId, Broker>,

    /// Live brokers resolved per listener, by id. A broker id appears here
    /// iff it appears in `alive_brokers`.
    pub alive_nodes: ImHashMap<BrokerId, ImHashMap<ListenerName, Node>>,
}

impl Default for MetadataSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl MetadataSnapshot {
    /// The empty snapshot a cache starts from before the first update.
    pub fn empty() -> Self {
        Self {
            partition_states: ImHashMap::new(),
            topic_ids: ImHashMap::new(),
            topic_names: ImHashMap::new(),
            controller_id: None,
            alive_brokers: ImHashMap::new(),
            alive_nodes: ImHashMap::new(),
        }
    }

    /// Assemble a snapshot, computing the topic-name inverse index.
    pub fn new(
        partition_states: ImHashMap<String, ImHashMap<i32, PartitionState>>,
        topic_ids: ImHashMap<String, Uuid>,
        controller_id: Option<BrokerId>,
        alive_brokers: ImHashMap<BrokerId, Broker>,
        alive_nodes: ImHashMap<BrokerId, ImHashMap<ListenerName, Node>>,
    ) -> Self {
        let topic_names = topic_ids
            .iter()
            .map(|(name, id)| (*id, name.clone()))
            .collect();
        Self {
            partition_states,
            topic_ids,
            topic_names,
            controller_id,
            alive_brokers,
            alive_nodes,
        }
    }

    /// The cached state of one partition.
    pub fn partition_state(&self, topic: &str, partition: i32) -> Option<&PartitionState> {
        self.partition_states.get(topic)?.get(&partition)
    }

    /// Whether the topic exists in this snapshot.
    pub fn contains_topic(&self, topic: &str) -> bool {
        self.partition_states.contains_key(topic)
    }

    /// All partitions of a topic.
    pub fn topic_partitions(&self, topic: &str) -> Vec<TopicPartition> {
        self.partition_states
            .get(topic)
            .map(|partitions| {
                partitions
                    .keys()
                    .map(|p| TopicPartition::new(topic, *p))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolve a broker to a node for the given listener.
    pub fn alive_node(&self, broker_id: BrokerId, listener: &ListenerName) -> Option<&Node> {
        self.alive_nodes.get(&broker_id)?.get(listener)
    }

    /// Whether the broker is alive and reachable through the listener.
    pub fn has_alive_endpoint(&self, broker_id: BrokerId, listener: &ListenerName) -> bool {
        self.alive_node(broker_id, listener).is_some()
    }
}
