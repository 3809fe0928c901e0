//! Immutable per-partition leadership descriptor.

use crate::types::{BrokerId, LeaderEpoch, PartitionEpoch};

/// Whether a newly elected leader has finished recovering the partition.
///
/// A leader elected through unclean election starts in `Recovering` and
/// transitions to `Recovered` once log recovery completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderRecoveryState {
    /// The leader has completed recovery.
    #[default]
    Recovered,
    /// The leader is still recovering the partition.
    Recovering,
}

impl LeaderRecoveryState {
    /// Stable wire value for this state.
    pub const fn value(self) -> i8 {
        match self {
            LeaderRecoveryState::Recovered => 0,
            LeaderRecoveryState::Recovering => 1,
        }
    }
}

/// The leader, leader epoch and in-sync replica set of a partition,
/// versioned by a partition epoch.
///
/// Both epochs are monotonically increasing: the leader epoch bumps on
/// every leadership change, the partition epoch on every change to any of
/// the other fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderAndIsr {
    /// The current leader, or a sentinel ([`BrokerId::NO_LEADER`],
    /// [`BrokerId::LEADER_DURING_DELETE`]).
    pub leader: BrokerId,
    /// Generation number of the current leadership.
    pub leader_epoch: LeaderEpoch,
    /// In-sync replicas, in controller-supplied order.
    pub isr: Vec<BrokerId>,
    /// Recovery state of the current leader.
    pub leader_recovery_state: LeaderRecoveryState,
    /// Version of the partition's full state.
    pub partition_epoch: PartitionEpoch,
}

impl LeaderAndIsr {
    /// A freshly created partition with the given leader and ISR.
    pub fn new(leader: BrokerId, isr: Vec<BrokerId>) -> Self {
        Self {
            leader,
            leader_epoch: LeaderEpoch::INITIAL,
            isr,
            leader_recovery_state: LeaderRecoveryState::Recovered,
            partition_epoch: PartitionEpoch::INITIAL,
        }
    }

    /// A partition whose new leader is still recovering.
    pub fn new_recovering(leader: BrokerId, isr: Vec<BrokerId>) -> Self {
        Self {
            leader_recovery_state: LeaderRecoveryState::Recovering,
            ..Self::new(leader, isr)
        }
    }

    /// The delete sentinel for a partition with the given ISR.
    pub fn during_delete(isr: Vec<BrokerId>) -> Self {
        Self::new(BrokerId::LEADER_DURING_DELETE, isr)
    }

    /// Same state, re-versioned with a new partition epoch.
    pub fn with_partition_epoch(&self, partition_epoch: PartitionEpoch) -> Self {
        Self {
            partition_epoch,
            ..self.clone()
        }
    }

    /// A new leader elected for the next leader epoch, keeping the ISR.
    pub fn new_leader(&self, leader: BrokerId) -> Self {
        self.new_leader_and_isr(leader, self.isr.clone())
    }

    /// A new leader and ISR for the next leader epoch.
    pub fn new_leader_and_isr(&self, leader: BrokerId, isr: Vec<BrokerId>) -> Self {
        Self {
            leader,
            leader_epoch: self.leader_epoch.next(),
            isr,
            leader_recovery_state: LeaderRecoveryState::Recovered,
            partition_epoch: self.partition_epoch,
        }
    }

    /// The leader as an option, `None` for sentinel values.
    pub fn leader_opt(&self) -> Option<BrokerId> {
        self.leader.is_valid().then_some(self.leader)
    }

    /// Equality on everything except the partition epoch.
    pub fn equals_ignore_partition_epoch(&self, other: &LeaderAndIsr) -> bool {
        self.leader == other.leader
            && self.leader_epoch == other.leader_epoch
            && self.isr == other.isr
            && self.leader_recovery_state == other.leader_recovery_state
    }
}
