//! Integration tests for the cluster metadata cache.

use std::sync::Arc;

use brokerage::metadata::{
    EndPoint, MetadataCache, Node, PartitionState, SecurityProtocol, UpdateMetadataBroker,
    UpdateMetadataRequest, UpdateMetadataTopicState,
};
use brokerage::types::{BrokerId, CorrelationId, LeaderEpoch, ListenerName, TopicPartition};
use uuid::Uuid;

fn plaintext_listener() -> ListenerName {
    ListenerName::new("PLAINTEXT")
}

fn broker(id: i32, listeners: &[&str]) -> UpdateMetadataBroker {
    UpdateMetadataBroker {
        id: BrokerId::new(id),
        endpoints: listeners
            .iter()
            .map(|listener| {
                EndPoint::new(
                    format!("broker-{id}.example.com"),
                    9092 + id,
                    *listener,
                    SecurityProtocol::Plaintext,
                )
            })
            .collect(),
        rack: None,
    }
}

fn partition_state(topic: &str, partition: i32, leader: i32, replicas: &[i32], isr: &[i32]) -> PartitionState {
    PartitionState {
        topic: topic.to_string(),
        partition_index: partition,
        leader: BrokerId::new(leader),
        leader_epoch: LeaderEpoch::new(1),
        replicas: replicas.iter().map(|id| BrokerId::new(*id)).collect(),
        isr: isr.iter().map(|id| BrokerId::new(*id)).collect(),
        offline_replicas: vec![],
    }
}

fn deletion_state(topic: &str, partition: i32) -> PartitionState {
    PartitionState {
        topic: topic.to_string(),
        partition_index: partition,
        leader: BrokerId::LEADER_DURING_DELETE,
        leader_epoch: LeaderEpoch::DURING_DELETE,
        replicas: vec![],
        isr: vec![],
        offline_replicas: vec![],
    }
}

// ============================================================================
// Leader endpoint lookups
// ============================================================================

#[test]
fn test_leader_lookup_with_missing_listener_returns_no_node() {
    // Broker 2 leads A-0 but only exposes INTERNAL; an EXTERNAL lookup
    // must report "leader known but unreachable", not "partition unknown".
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![
            broker(1, &["INTERNAL", "EXTERNAL"]),
            broker(2, &["INTERNAL"]),
        ],
        topic_states: vec![],
        partition_states: vec![partition_state("A", 0, 2, &[1, 2], &[1, 2])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let node = cache.get_partition_leader_endpoint("A", 0, &ListenerName::new("EXTERNAL"));
    assert_eq!(node, Some(Node::NO_NODE));

    // Through INTERNAL the leader resolves normally.
    let node = cache
        .get_partition_leader_endpoint("A", 0, &ListenerName::new("INTERNAL"))
        .unwrap();
    assert_eq!(node.id, BrokerId::new(2));
    assert_eq!(node.host, "broker-2.example.com");
}

#[test]
fn test_leader_lookup_unknown_partition_returns_none() {
    let cache = MetadataCache::new(BrokerId::new(1));
    assert_eq!(
        cache.get_partition_leader_endpoint("missing", 0, &plaintext_listener()),
        None
    );
}

#[test]
fn test_leader_lookup_dead_leader_returns_no_node() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        // Leader 9 is not among the live brokers.
        partition_states: vec![partition_state("A", 0, 9, &[9, 1], &[9, 1])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    assert_eq!(
        cache.get_partition_leader_endpoint("A", 0, &plaintext_listener()),
        Some(Node::NO_NODE)
    );
}

// ============================================================================
// Topic metadata assembly
// ============================================================================

#[test]
fn test_topic_metadata_with_filtered_isr_reports_replica_not_available() {
    // Replicas [1,2,3] but only brokers 1 and 2 are alive; with endpoint
    // filtering enabled the response keeps reachable replicas and flags
    // the partition.
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"]), broker(2, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![partition_state("B", 1, 1, &[1, 2, 3], &[1, 2, 3])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let topics = cache.get_topic_metadata(
        &["B".to_string()],
        &plaintext_listener(),
        true,
        false,
    );
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].name, "B");
    assert_eq!(topics[0].error_code, brokerage::error::ErrorCode::None);

    let partition = &topics[0].partitions[0];
    assert_eq!(partition.partition_index, 1);
    assert_eq!(
        partition.error_code,
        brokerage::error::ErrorCode::ReplicaNotAvailable
    );
    assert_eq!(partition.leader_id, BrokerId::new(1));
    assert_eq!(
        partition.replica_nodes,
        vec![BrokerId::new(1), BrokerId::new(2)]
    );
    assert_eq!(partition.isr_nodes, vec![BrokerId::new(1), BrokerId::new(2)]);
}

#[test]
fn test_topic_metadata_without_filtering_passes_replicas_verbatim() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"]), broker(2, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![partition_state("B", 0, 1, &[1, 2, 3], &[1, 2, 3])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let topics = cache.get_topic_metadata(&["B".to_string()], &plaintext_listener(), false, false);
    let partition = &topics[0].partitions[0];
    assert_eq!(partition.error_code, brokerage::error::ErrorCode::None);
    assert_eq!(partition.replica_nodes.len(), 3);
    assert_eq!(partition.isr_nodes.len(), 3);
}

#[test]
fn test_topic_metadata_dead_leader_keeps_leader_epoch() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![partition_state("C", 0, 9, &[1], &[1])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let topics = cache.get_topic_metadata(&["C".to_string()], &plaintext_listener(), false, false);
    let partition = &topics[0].partitions[0];
    assert_eq!(
        partition.error_code,
        brokerage::error::ErrorCode::LeaderNotAvailable
    );
    assert_eq!(partition.leader_id, BrokerId::NO_LEADER);
    assert_eq!(partition.leader_epoch, LeaderEpoch::new(1));
    assert_eq!(partition.offline_replicas, vec![]);
}

#[test]
fn test_topic_metadata_listener_not_found() {
    // Leader alive but missing the requested listener: the error code
    // depends on errorUnavailableListeners.
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["INTERNAL"])],
        topic_states: vec![],
        partition_states: vec![partition_state("C", 0, 1, &[1], &[1])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let external = ListenerName::new("EXTERNAL");
    let topics = cache.get_topic_metadata(&["C".to_string()], &external, false, true);
    assert_eq!(
        topics[0].partitions[0].error_code,
        brokerage::error::ErrorCode::ListenerNotFound
    );

    let topics = cache.get_topic_metadata(&["C".to_string()], &external, false, false);
    assert_eq!(
        topics[0].partitions[0].error_code,
        brokerage::error::ErrorCode::LeaderNotAvailable
    );
}

#[test]
fn test_topic_metadata_omits_unknown_topics() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![partition_state("known", 0, 1, &[1], &[1])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let topics = cache.get_topic_metadata(
        &["known".to_string(), "unknown".to_string()],
        &plaintext_listener(),
        false,
        false,
    );
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].name, "known");

    let missing = cache.get_non_existing_topics(&["known".to_string(), "unknown".to_string()]);
    assert_eq!(missing.len(), 1);
    assert!(missing.contains("unknown"));
}

#[test]
fn test_internal_topic_is_flagged() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![partition_state("__consumer_offsets", 0, 1, &[1], &[1])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let topics = cache.get_topic_metadata(
        &["__consumer_offsets".to_string()],
        &plaintext_listener(),
        false,
        false,
    );
    assert!(topics[0].is_internal);
}

// ============================================================================
// Partition deletion
// ============================================================================

#[test]
fn test_partition_deletion_removes_partition_then_topic() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let topic_id = Uuid::from_u128(42);
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![UpdateMetadataTopicState {
            topic_name: "T".to_string(),
            topic_id,
        }],
        partition_states: vec![
            partition_state("T", 0, 1, &[1], &[1]),
            partition_state("T", 1, 1, &[1], &[1]),
        ],
    };
    cache.update_metadata(CorrelationId::new(1), &request);
    assert_eq!(cache.num_partitions("T"), Some(2));
    assert_eq!(cache.get_topic_id("T"), topic_id);

    // Delete partition 0, leave partition 1 untouched.
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![deletion_state("T", 0), partition_state("T", 1, 1, &[1], &[1])],
    };
    let deleted = cache.update_metadata(CorrelationId::new(2), &request);
    assert_eq!(deleted, vec![TopicPartition::new("T", 0)]);
    assert!(!cache.contains_partition(&TopicPartition::new("T", 0)));
    assert!(cache.contains_partition(&TopicPartition::new("T", 1)));
    assert_eq!(cache.num_partitions("T"), Some(1));
    // The topic still has a partition, so the id survives.
    assert_eq!(cache.get_topic_id("T"), topic_id);

    // Deleting the last partition removes the topic and its id.
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![deletion_state("T", 1)],
    };
    let deleted = cache.update_metadata(CorrelationId::new(3), &request);
    assert_eq!(deleted, vec![TopicPartition::new("T", 1)]);
    assert!(!cache.contains_topic("T"));
    assert_eq!(cache.get_topic_id("T"), Uuid::nil());
    assert_eq!(cache.get_topic_name(topic_id), None);
}

#[test]
fn test_deleted_partitions_are_gone_immediately() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: (0..4)
            .map(|p| partition_state("many", p, 1, &[1], &[1]))
            .collect(),
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: (0..4).map(|p| deletion_state("many", p)).collect(),
    };
    let deleted = cache.update_metadata(CorrelationId::new(2), &request);
    assert_eq!(deleted.len(), 4);
    for tp in &deleted {
        assert!(!cache.contains_partition(tp));
    }
}

// ============================================================================
// Topic ids
// ============================================================================

#[test]
fn test_topic_id_merge_and_zero_uuid_clear() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let orders_id = Uuid::from_u128(1);
    let events_id = Uuid::from_u128(2);

    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![
            UpdateMetadataTopicState {
                topic_name: "orders".to_string(),
                topic_id: orders_id,
            },
            UpdateMetadataTopicState {
                topic_name: "events".to_string(),
                topic_id: events_id,
            },
        ],
        partition_states: vec![
            partition_state("orders", 0, 1, &[1], &[1]),
            partition_state("events", 0, 1, &[1], &[1]),
        ],
    };
    cache.update_metadata(CorrelationId::new(1), &request);
    assert_eq!(cache.get_topic_id("orders"), orders_id);
    assert_eq!(cache.get_topic_name(events_id).as_deref(), Some("events"));

    // A nil id clears the mapping; other entries carry over.
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![UpdateMetadataTopicState {
            topic_name: "events".to_string(),
            topic_id: Uuid::nil(),
        }],
        partition_states: vec![],
    };
    cache.update_metadata(CorrelationId::new(2), &request);
    assert_eq!(cache.get_topic_id("events"), Uuid::nil());
    assert_eq!(cache.get_topic_id("orders"), orders_id);
    assert_eq!(cache.get_topic_name(events_id), None);

    let (ids, names) = cache.topic_id_info();
    assert_eq!(ids.len(), names.len());
    for (name, id) in ids.iter() {
        assert_eq!(names.get(id), Some(name));
    }
}

// ============================================================================
// Broker-only updates
// ============================================================================

#[test]
fn test_update_without_partition_states_preserves_partitions() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![partition_state("stable", 0, 1, &[1], &[1])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    // Controller moves and a broker joins; no partition states attached.
    let request = UpdateMetadataRequest {
        controller_id: 2,
        controller_epoch: 2,
        live_brokers: vec![broker(1, &["PLAINTEXT"]), broker(2, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![],
    };
    let deleted = cache.update_metadata(CorrelationId::new(2), &request);
    assert!(deleted.is_empty());
    assert!(cache.contains_topic("stable"));
    assert_eq!(cache.get_controller_id(), Some(BrokerId::new(2)));
    assert_eq!(cache.get_alive_brokers().len(), 2);
}

#[test]
fn test_negative_controller_id_means_no_controller() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: -1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![],
    };
    cache.update_metadata(CorrelationId::new(1), &request);
    assert_eq!(cache.get_controller_id(), None);
}

#[test]
fn test_brokers_absent_from_update_are_no_longer_alive() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"]), broker(2, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![],
    };
    cache.update_metadata(CorrelationId::new(1), &request);
    assert_eq!(cache.get_alive_brokers().len(), 2);

    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 2,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![],
    };
    cache.update_metadata(CorrelationId::new(2), &request);
    assert_eq!(cache.get_alive_brokers().len(), 1);
    assert!(cache
        .get_alive_broker_node(BrokerId::new(2), &plaintext_listener())
        .is_none());
}

// ============================================================================
// Replica endpoints and cluster views
// ============================================================================

#[test]
fn test_replica_endpoints_omit_unresolvable_brokers() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"]), broker(2, &["INTERNAL"])],
        topic_states: vec![],
        partition_states: vec![partition_state("R", 0, 1, &[1, 2, 3], &[1, 2])],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let endpoints = cache
        .get_partition_replica_endpoints(&TopicPartition::new("R", 0), &plaintext_listener());
    // Broker 2 lacks PLAINTEXT, broker 3 is dead; only broker 1 resolves.
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[&BrokerId::new(1)].host, "broker-1.example.com");
}

#[test]
fn test_cluster_metadata_excludes_deleting_partitions() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![
            partition_state("alive", 0, 1, &[1], &[1]),
            partition_state("alive", 1, 1, &[1, 2], &[1]),
            partition_state("__consumer_offsets", 0, 1, &[1], &[1]),
        ],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let cluster = cache.get_cluster_metadata("test-cluster", &plaintext_listener());
    assert_eq!(cluster.cluster_id, "test-cluster");
    assert_eq!(cluster.nodes.len(), 1);
    assert_eq!(cluster.partitions.len(), 3);
    assert!(cluster.unauthorized_topics.is_empty());
    assert!(cluster.internal_topics.contains("__consumer_offsets"));
    assert_eq!(
        cluster.controller.as_ref().map(|n| n.id),
        Some(BrokerId::new(1))
    );

    // Replicas that cannot be resolved keep their id on an empty node.
    let with_dead_replica = cluster
        .partitions
        .iter()
        .find(|p| p.topic == "alive" && p.partition == 1)
        .unwrap();
    assert_eq!(with_dead_replica.replicas.len(), 2);
    assert!(with_dead_replica.replicas[1].is_empty());
    assert_eq!(with_dead_replica.replicas[1].id, BrokerId::new(2));
}

#[test]
fn test_get_all_topics_and_partitions() {
    let cache = MetadataCache::new(BrokerId::new(1));
    let request = UpdateMetadataRequest {
        controller_id: 1,
        controller_epoch: 1,
        live_brokers: vec![broker(1, &["PLAINTEXT"])],
        topic_states: vec![],
        partition_states: vec![
            partition_state("a", 0, 1, &[1], &[1]),
            partition_state("a", 1, 1, &[1], &[1]),
            partition_state("b", 0, 1, &[1], &[1]),
        ],
    };
    cache.update_metadata(CorrelationId::new(1), &request);

    let topics = cache.get_all_topics();
    assert_eq!(topics.len(), 2);
    assert!(topics.contains("a") && topics.contains("b"));

    let partitions = cache.get_topic_partitions("a");
    assert_eq!(partitions.len(), 2);
    assert!(partitions.contains(&TopicPartition::new("a", 0)));

    assert_eq!(cache.get_all_partitions().len(), 3);
}

// ============================================================================
// Snapshot consistency under concurrent updates
// ============================================================================

#[test]
fn test_reads_never_observe_torn_snapshots() {
    // A writer flips between two self-consistent states; readers capture
    // one snapshot per iteration and verify its internal invariants.
    let cache = Arc::new(MetadataCache::new(BrokerId::new(1)));

    // Each generation holds exactly one topic: its own. The other
    // generation's topic is deleted in the same update, so a reader that
    // mixes fields across updates would see both or neither.
    let make_request = |generation: u32| {
        let flavor = generation % 2;
        let topic = format!("topic-{flavor}");
        let other = format!("topic-{}", 1 - flavor);
        UpdateMetadataRequest {
            controller_id: flavor as i32,
            controller_epoch: generation as i32,
            live_brokers: vec![broker(flavor as i32, &["PLAINTEXT"])],
            topic_states: vec![UpdateMetadataTopicState {
                topic_name: topic.clone(),
                topic_id: Uuid::from_u128(u128::from(flavor) + 1),
            }],
            partition_states: vec![
                deletion_state(&other, 0),
                partition_state(&topic, 0, flavor as i32, &[0], &[0]),
            ],
        }
    };
    cache.update_metadata(CorrelationId::new(0), &make_request(0));

    let writer = {
        let cache = Arc::clone(&cache);
        std::thread::spawn(move || {
            for generation in 1..500u32 {
                cache.update_metadata(CorrelationId::new(generation as i32), &make_request(generation));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for _ in 0..2000 {
                    let snapshot = cache.snapshot();
                    // Invariant: topic_names is the inverse of topic_ids.
                    assert_eq!(snapshot.topic_ids.len(), snapshot.topic_names.len());
                    for (name, id) in snapshot.topic_ids.iter() {
                        assert_eq!(snapshot.topic_names.get(id), Some(name));
                    }
                    // Invariant: a broker is in alive_brokers iff it is in
                    // alive_nodes.
                    assert_eq!(snapshot.alive_brokers.len(), snapshot.alive_nodes.len());
                    for id in snapshot.alive_brokers.keys() {
                        assert!(snapshot.alive_nodes.contains_key(id));
                    }
                    // Invariant: both generations are self-consistent; the
                    // controller id always matches the only topic present.
                    let controller = snapshot.controller_id.unwrap().value();
                    let topic = format!("topic-{controller}");
                    let other = format!("topic-{}", 1 - controller);
                    assert!(
                        snapshot.partition_states.contains_key(&topic),
                        "snapshot mixes fields from different updates"
                    );
                    assert!(
                        !snapshot.partition_states.contains_key(&other),
                        "snapshot mixes fields from different updates"
                    );
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
