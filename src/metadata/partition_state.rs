//! Per-partition replication state as distributed by the controller.

use crate::types::{BrokerId, LeaderEpoch};

/// Replication state of one partition, as carried by a metadata update and
/// stored in the metadata cache.
///
/// Replica and ISR ordering is preserved exactly as supplied by the
/// controller; response construction depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionState {
    /// Topic name.
    pub topic: String,
    /// Partition index within the topic.
    pub partition_index: i32,
    /// Current leader, or a delete/no-leader sentinel.
    pub leader: BrokerId,
    /// Generation number of the current leadership.
    pub leader_epoch: LeaderEpoch,
    /// All assigned replicas, in controller order.
    pub replicas: Vec<BrokerId>,
    /// In-sync replicas, in controller order.
    pub isr: Vec<BrokerId>,
    /// Replicas currently offline, in controller order.
    pub offline_replicas: Vec<BrokerId>,
}

impl PartitionState {
    /// Whether this state is the deletion sentinel.
    pub fn is_during_delete(&self) -> bool {
        self.leader == BrokerId::LEADER_DURING_DELETE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_during_delete() {
        let mut state = PartitionState {
            topic: "orders".to_string(),
            partition_index: 0,
            leader: BrokerId::new(1),
            leader_epoch: LeaderEpoch::new(4),
            replicas: vec![BrokerId::new(1), BrokerId::new(2)],
            isr: vec![BrokerId::new(1)],
            offline_replicas: vec![],
        };
        assert!(!state.is_during_delete());

        state.leader = BrokerId::LEADER_DURING_DELETE;
        assert!(state.is_during_delete());
    }
}
