//! Metadata update request data, as produced by the cluster controller.
//!
//! These are plain data types; the wire codec that fills them lives
//! outside this crate.

use uuid::Uuid;

use super::broker::EndPoint;
use super::partition_state::PartitionState;
use crate::types::BrokerId;

/// A live broker as reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMetadataBroker {
    /// The broker id.
    pub id: BrokerId,
    /// One endpoint per listener.
    pub endpoints: Vec<EndPoint>,
    /// Rack the broker lives in, if configured.
    pub rack: Option<String>,
}

/// A topic-id assignment carried by an update request.
///
/// A nil topic id clears any previously cached id for the topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMetadataTopicState {
    /// Topic name.
    pub topic_name: String,
    /// Topic id; `Uuid::nil()` means "clear".
    pub topic_id: Uuid,
}

/// A full metadata update from the controller.
///
/// Partition states replace cached entries wholesale; a state whose leader
/// is the delete sentinel removes the partition instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateMetadataRequest {
    /// The controller's broker id; negative means "no controller".
    pub controller_id: i32,
    /// The controller's epoch.
    pub controller_epoch: i32,
    /// All currently live brokers.
    pub live_brokers: Vec<UpdateMetadataBroker>,
    /// Topic-id assignments.
    pub topic_states: Vec<UpdateMetadataTopicState>,
    /// Partition replication states.
    pub partition_states: Vec<PartitionState>,
}

impl UpdateMetadataRequest {
    /// The controller id as an option, `None` when negative.
    pub fn controller_id_opt(&self) -> Option<BrokerId> {
        (self.controller_id >= 0).then(|| BrokerId::new(self.controller_id))
    }
}
