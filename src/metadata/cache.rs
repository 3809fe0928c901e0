//! Lock-free cluster metadata cache.
//!
//! The cache holds an immutable [`MetadataSnapshot`] behind an `ArcSwap`.
//! Read paths load the snapshot reference exactly once per call and never
//! take a lock; the update path serializes writers on a mutex, builds a
//! new snapshot from the previous one (structural sharing keeps this cheap
//! even for large topic counts) and publishes it with a single atomic
//! pointer swap.
//!
//! Readers therefore observe either the pre- or post-update snapshot,
//! never a torn state, and no reader can block an update or another
//! reader.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;

use arc_swap::ArcSwap;
use imbl::HashMap as ImHashMap;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::broker::{Broker, Node};
use super::partition_state::PartitionState;
use super::request::UpdateMetadataRequest;
use super::response::{Cluster, PartitionInfo, PartitionMetadata, TopicMetadata};
use super::snapshot::MetadataSnapshot;
use crate::constants::is_internal_topic;
use crate::error::ErrorCode;
use crate::types::{BrokerId, CorrelationId, ListenerName, TopicPartition};

/// Per-node, asynchronously replicated view of the cluster.
///
/// Updated only by metadata requests from the controller; queried by every
/// client-facing request path.
pub struct MetadataCache {
    /// This node's broker id, used for diagnostics on the update path.
    broker_id: BrokerId,
    /// The current snapshot. Swapped wholesale on update.
    snapshot: ArcSwap<MetadataSnapshot>,
    /// Serializes writers. Readers never touch it.
    update_lock: Mutex<()>,
}

impl MetadataCache {
    /// Create an empty cache for the given local broker id.
    pub fn new(broker_id: BrokerId) -> Self {
        Self {
            broker_id,
            snapshot: ArcSwap::from_pointee(MetadataSnapshot::empty()),
            update_lock: Mutex::new(()),
        }
    }

    /// The current snapshot.
    ///
    /// Callers that perform multi-step reads should capture this once and
    /// query the returned snapshot, never re-load mid-operation.
    pub fn snapshot(&self) -> Arc<MetadataSnapshot> {
        self.snapshot.load_full()
    }

    // ==================== Read Operations ====================

    /// Topic metadata for each requested topic that exists.
    ///
    /// Unknown topics are omitted; use [`get_non_existing_topics`] to
    /// report absence. With `error_unavailable_endpoints`, replica and ISR
    /// sets are filtered down to brokers reachable through `listener` and
    /// the partition is flagged `ReplicaNotAvailable` when anything was
    /// dropped. With `error_unavailable_listeners`, a live leader missing
    /// the listener reports `ListenerNotFound` instead of
    /// `LeaderNotAvailable`.
    ///
    /// [`get_non_existing_topics`]: MetadataCache::get_non_existing_topics
    pub fn get_topic_metadata(
        &self,
        topics: &[String],
        listener: &ListenerName,
        error_unavailable_endpoints: bool,
        error_unavailable_listeners: bool,
    ) -> Vec<TopicMetadata> {
        let snapshot = self.snapshot.load();
        topics
            .iter()
            .filter_map(|topic| {
                self.get_partition_metadata(
                    &snapshot,
                    topic,
                    listener,
                    error_unavailable_endpoints,
                    error_unavailable_listeners,
                )
                .map(|partitions| TopicMetadata {
                    error_code: ErrorCode::None,
                    name: topic.clone(),
                    topic_id: snapshot.topic_ids.get(topic).copied().unwrap_or_else(Uuid::nil),
                    is_internal: is_internal_topic(topic),
                    partitions,
                })
            })
            .collect()
    }

    fn get_partition_metadata(
        &self,
        snapshot: &MetadataSnapshot,
        topic: &str,
        listener: &ListenerName,
        error_unavailable_endpoints: bool,
        error_unavailable_listeners: bool,
    ) -> Option<Vec<PartitionMetadata>> {
        let partitions = snapshot.partition_states.get(topic)?;
        let mut entries: Vec<PartitionMetadata> = partitions
            .iter()
            .map(|(partition_index, state)| {
                let filtered_replicas = Self::maybe_filter_alive_replicas(
                    snapshot,
                    &state.replicas,
                    listener,
                    error_unavailable_endpoints,
                );
                let filtered_isr = Self::maybe_filter_alive_replicas(
                    snapshot,
                    &state.isr,
                    listener,
                    error_unavailable_endpoints,
                );

                match snapshot.alive_node(state.leader, listener) {
                    None => {
                        let leader_alive = snapshot.alive_brokers.contains_key(&state.leader);
                        debug!(
                            topic,
                            partition = *partition_index,
                            leader = %state.leader,
                            leader_alive,
                            listener = %listener,
                            "Error while fetching metadata: leader not reachable"
                        );
                        let error_code = if !leader_alive {
                            ErrorCode::LeaderNotAvailable
                        } else if error_unavailable_listeners {
                            ErrorCode::ListenerNotFound
                        } else {
                            ErrorCode::LeaderNotAvailable
                        };
                        PartitionMetadata {
                            error_code,
                            partition_index: *partition_index,
                            leader_id: BrokerId::NO_LEADER,
                            leader_epoch: state.leader_epoch,
                            replica_nodes: filtered_replicas,
                            isr_nodes: filtered_isr,
                            offline_replicas: state.offline_replicas.clone(),
                        }
                    }
                    Some(leader) => {
                        let error_code = if filtered_replicas.len() != state.replicas.len()
                            || filtered_isr.len() != state.isr.len()
                        {
                            ErrorCode::ReplicaNotAvailable
                        } else {
                            ErrorCode::None
                        };
                        PartitionMetadata {
                            error_code,
                            partition_index: *partition_index,
                            leader_id: leader.id,
                            leader_epoch: state.leader_epoch,
                            replica_nodes: filtered_replicas,
                            isr_nodes: filtered_isr,
                            offline_replicas: state.offline_replicas.clone(),
                        }
                    }
                }
            })
            .collect();
        entries.sort_by_key(|p| p.partition_index);
        Some(entries)
    }

    /// Filter broker ids down to those reachable through the listener, or
    /// pass them through verbatim when filtering is disabled.
    fn maybe_filter_alive_replicas(
        snapshot: &MetadataSnapshot,
        brokers: &[BrokerId],
        listener: &ListenerName,
        filter_unavailable: bool,
    ) -> Vec<BrokerId> {
        if !filter_unavailable {
            brokers.to_vec()
        } else {
            brokers
                .iter()
                .filter(|id| snapshot.has_alive_endpoint(**id, listener))
                .copied()
                .collect()
        }
    }

    /// All topics in the cache.
    pub fn get_all_topics(&self) -> HashSet<String> {
        let snapshot = self.snapshot.load();
        snapshot.partition_states.keys().cloned().collect()
    }

    /// All partitions of one topic.
    pub fn get_topic_partitions(&self, topic: &str) -> HashSet<TopicPartition> {
        let snapshot = self.snapshot.load();
        snapshot.topic_partitions(topic).into_iter().collect()
    }

    /// Every partition in the cache.
    pub fn get_all_partitions(&self) -> HashSet<TopicPartition> {
        let snapshot = self.snapshot.load();
        snapshot
            .partition_states
            .iter()
            .flat_map(|(topic, partitions)| {
                partitions
                    .keys()
                    .map(|p| TopicPartition::new(topic.clone(), *p))
            })
            .collect()
    }

    /// The subset of `topics` absent from the cache.
    pub fn get_non_existing_topics(&self, topics: &[String]) -> HashSet<String> {
        let snapshot = self.snapshot.load();
        topics
            .iter()
            .filter(|t| !snapshot.partition_states.contains_key(t.as_str()))
            .cloned()
            .collect()
    }

    /// Number of partitions of a topic, if the topic exists.
    pub fn num_partitions(&self, topic: &str) -> Option<usize> {
        let snapshot = self.snapshot.load();
        snapshot.partition_states.get(topic).map(|p| p.len())
    }

    /// Whether the topic exists.
    pub fn contains_topic(&self, topic: &str) -> bool {
        let snapshot = self.snapshot.load();
        snapshot.contains_topic(topic)
    }

    /// Whether the partition exists.
    pub fn contains_partition(&self, tp: &TopicPartition) -> bool {
        let snapshot = self.snapshot.load();
        snapshot.partition_state(tp.topic(), tp.partition()).is_some()
    }

    /// The cached replication state of one partition.
    pub fn get_partition_info(&self, topic: &str, partition: i32) -> Option<PartitionState> {
        let snapshot = self.snapshot.load();
        snapshot.partition_state(topic, partition).cloned()
    }

    /// The leader of a partition resolved for one listener.
    ///
    /// Returns `None` if the topic or partition is unknown, and
    /// `Some(Node::NO_NODE)` when the leader is known but not alive or not
    /// reachable through the listener.
    pub fn get_partition_leader_endpoint(
        &self,
        topic: &str,
        partition: i32,
        listener: &ListenerName,
    ) -> Option<Node> {
        let snapshot = self.snapshot.load();
        snapshot.partition_state(topic, partition).map(|state| {
            snapshot
                .alive_brokers
                .get(&state.leader)
                .and_then(|broker| broker.node(listener))
                .unwrap_or(Node::NO_NODE)
        })
    }

    /// All replicas of a partition resolved for one listener; replicas
    /// without a resolvable node are omitted.
    pub fn get_partition_replica_endpoints(
        &self,
        tp: &TopicPartition,
        listener: &ListenerName,
    ) -> HashMap<BrokerId, Node> {
        let snapshot = self.snapshot.load();
        snapshot
            .partition_state(tp.topic(), tp.partition())
            .map(|state| {
                state
                    .replicas
                    .iter()
                    .filter_map(|replica| {
                        snapshot
                            .alive_brokers
                            .get(replica)
                            .and_then(|broker| broker.node(listener))
                            .map(|node| (*replica, node))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All live brokers.
    pub fn get_alive_brokers(&self) -> Vec<Broker> {
        let snapshot = self.snapshot.load();
        snapshot.alive_brokers.values().cloned().collect()
    }

    /// One live broker resolved for a listener.
    pub fn get_alive_broker_node(
        &self,
        broker_id: BrokerId,
        listener: &ListenerName,
    ) -> Option<Node> {
        let snapshot = self.snapshot.load();
        snapshot.alive_node(broker_id, listener).cloned()
    }

    /// All live brokers resolved for a listener; brokers missing the
    /// listener are omitted.
    pub fn get_alive_broker_nodes(&self, listener: &ListenerName) -> Vec<Node> {
        let snapshot = self.snapshot.load();
        snapshot
            .alive_nodes
            .values()
            .filter_map(|listeners| listeners.get(listener).cloned())
            .collect()
    }

    /// The current controller, if one is elected.
    pub fn get_controller_id(&self) -> Option<BrokerId> {
        self.snapshot.load().controller_id
    }

    /// The id of a topic, nil when unknown.
    pub fn get_topic_id(&self, topic: &str) -> Uuid {
        let snapshot = self.snapshot.load();
        snapshot.topic_ids.get(topic).copied().unwrap_or_else(Uuid::nil)
    }

    /// The name of a topic id, if known.
    pub fn get_topic_name(&self, topic_id: Uuid) -> Option<String> {
        let snapshot = self.snapshot.load();
        snapshot.topic_names.get(&topic_id).cloned()
    }

    /// Both directions of the topic-id mapping, from one snapshot.
    pub fn topic_id_info(&self) -> (ImHashMap<String, Uuid>, ImHashMap<Uuid, String>) {
        let snapshot = self.snapshot.load();
        (snapshot.topic_ids.clone(), snapshot.topic_names.clone())
    }

    /// A point-in-time cluster view for one listener.
    ///
    /// Partitions undergoing deletion are excluded. Replicas that cannot
    /// be resolved keep their broker id on a placeholder node.
    pub fn get_cluster_metadata(&self, cluster_id: &str, listener: &ListenerName) -> Cluster {
        let snapshot = self.snapshot.load();

        let node_of = |id: BrokerId| -> Node {
            snapshot
                .alive_node(id, listener)
                .cloned()
                .unwrap_or_else(|| Node::empty(id))
        };

        let mut partitions = Vec::new();
        let mut internal_topics = HashSet::new();
        for (topic, states) in snapshot.partition_states.iter() {
            if is_internal_topic(topic) {
                internal_topics.insert(topic.clone());
            }
            for (partition_index, state) in states.iter() {
                if state.is_during_delete() {
                    continue;
                }
                partitions.push(PartitionInfo {
                    topic: topic.clone(),
                    partition: *partition_index,
                    leader: state.leader.is_valid().then(|| node_of(state.leader)),
                    replicas: state.replicas.iter().map(|id| node_of(*id)).collect(),
                    isr: state.isr.iter().map(|id| node_of(*id)).collect(),
                    offline_replicas: state
                        .offline_replicas
                        .iter()
                        .map(|id| node_of(*id))
                        .collect(),
                });
            }
        }

        // Everything below reads the snapshot captured above; re-loading
        // here could mix fields across concurrent updates.
        let nodes = snapshot
            .alive_nodes
            .values()
            .filter_map(|listeners| listeners.get(listener).cloned())
            .collect();

        Cluster {
            cluster_id: cluster_id.to_string(),
            nodes,
            partitions,
            unauthorized_topics: HashSet::new(),
            internal_topics,
            controller: snapshot
                .controller_id
                .and_then(|id| snapshot.alive_node(id, listener).cloned()),
        }
    }

    // ==================== Update Operation ====================

    /// Apply a metadata update from the controller and publish a new
    /// snapshot. Returns the partitions deleted by this update.
    pub fn update_metadata(
        &self,
        correlation_id: CorrelationId,
        request: &UpdateMetadataRequest,
    ) -> Vec<TopicPartition> {
        let _guard = self.update_lock.lock().expect("metadata update lock poisoned");
        let current = self.snapshot.load_full();

        // Fresh broker and node maps; brokers absent from the request are
        // no longer alive.
        let mut alive_brokers = ImHashMap::new();
        let mut alive_nodes: ImHashMap<BrokerId, ImHashMap<ListenerName, Node>> = ImHashMap::new();
        for broker in &request.live_brokers {
            let mut nodes = ImHashMap::new();
            for endpoint in &broker.endpoints {
                nodes.insert(
                    endpoint.listener.clone(),
                    Node::new(
                        broker.id,
                        endpoint.host.clone(),
                        endpoint.port,
                        broker.rack.clone(),
                    ),
                );
            }
            alive_nodes.insert(broker.id, nodes);
            alive_brokers.insert(
                broker.id,
                Broker::new(broker.id, broker.endpoints.clone(), broker.rack.clone()),
            );
        }

        // Diagnostic only; lookups tolerate partial listener coverage.
        if let Some(local_listeners) = alive_nodes
            .get(&self.broker_id)
            .map(|nodes| nodes.keys().cloned().collect::<HashSet<_>>())
        {
            let identical = alive_nodes.iter().all(|(_, nodes)| {
                nodes.keys().cloned().collect::<HashSet<_>>() == local_listeners
            });
            if !identical {
                warn!(
                    correlation_id = %correlation_id,
                    "Listeners are not identical across brokers"
                );
            }
        }

        let controller_id = request.controller_id_opt();

        // Merge topic ids: nil ids clear, non-nil ids overwrite.
        let mut topic_ids = current.topic_ids.clone();
        for topic_state in &request.topic_states {
            if topic_state.topic_id.is_nil() {
                topic_ids.remove(&topic_state.topic_name);
            } else {
                topic_ids.insert(topic_state.topic_name.clone(), topic_state.topic_id);
            }
        }

        if request.partition_states.is_empty() {
            // Broker/controller/topic-id only update; partition states
            // carry over from the previous snapshot.
            self.snapshot.store(Arc::new(MetadataSnapshot::new(
                current.partition_states.clone(),
                topic_ids,
                controller_id,
                alive_brokers,
                alive_nodes,
            )));
            trace!(
                correlation_id = %correlation_id,
                controller_epoch = request.controller_epoch,
                "Updated broker metadata without partition states"
            );
            return Vec::new();
        }

        let mut partition_states = current.partition_states.clone();
        let mut deleted = Vec::new();
        for state in &request.partition_states {
            let tp = TopicPartition::new(state.topic.clone(), state.partition_index);
            if state.is_during_delete() {
                let topic_now_empty = match partition_states.get_mut(state.topic.as_str()) {
                    Some(partitions) => {
                        partitions.remove(&state.partition_index);
                        partitions.is_empty()
                    }
                    None => false,
                };
                if topic_now_empty {
                    partition_states.remove(state.topic.as_str());
                    topic_ids.remove(state.topic.as_str());
                }
                trace!(
                    partition = %tp,
                    controller = request.controller_id,
                    controller_epoch = request.controller_epoch,
                    correlation_id = %correlation_id,
                    "Deleted partition from metadata cache"
                );
                deleted.push(tp);
            } else {
                let mut partitions = partition_states
                    .get(state.topic.as_str())
                    .cloned()
                    .unwrap_or_default();
                partitions.insert(state.partition_index, state.clone());
                partition_states.insert(state.topic.clone(), partitions);
                trace!(
                    partition = %tp,
                    leader = %state.leader,
                    leader_epoch = %state.leader_epoch,
                    controller = request.controller_id,
                    controller_epoch = request.controller_epoch,
                    correlation_id = %correlation_id,
                    "Cached leader info for partition"
                );
            }
        }

        self.snapshot.store(Arc::new(MetadataSnapshot::new(
            partition_states,
            topic_ids,
            controller_id,
            alive_brokers,
            alive_nodes,
        )));
        debug!(
            correlation_id = %correlation_id,
            updated = request.partition_states.len() - deleted.len(),
            deleted = deleted.len(),
            "Updated partition metadata cache"
        );
        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cache_is_empty() {
        let cache = MetadataCache::new(BrokerId::new(0));
        assert!(cache.get_all_topics().is_empty());
        assert!(cache.get_alive_brokers().is_empty());
        assert_eq!(cache.get_controller_id(), None);
        assert_eq!(cache.get_topic_id("orders"), Uuid::nil());
        assert_eq!(cache.num_partitions("orders"), None);
    }

    #[test]
    fn test_unknown_partition_lookups() {
        let cache = MetadataCache::new(BrokerId::new(0));
        let listener = ListenerName::new("PLAINTEXT");
        assert_eq!(cache.get_partition_leader_endpoint("orders", 0, &listener), None);
        assert!(cache
            .get_partition_replica_endpoints(&TopicPartition::new("orders", 0), &listener)
            .is_empty());
        assert!(!cache.contains_partition(&TopicPartition::new("orders", 0)));
    }
}
