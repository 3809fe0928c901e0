//! Controller events and processing states.

use std::fmt;

use crate::types::TopicPartition;

/// The processing state the controller advertises while handling an
/// event. Exposed as a gauge; every state except `Idle` also has a
/// processing-time metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// No event is being processed.
    #[default]
    Idle,
    /// Controller election or failover.
    ControllerChange,
    /// A broker joined or left the cluster.
    BrokerChange,
    /// Topics were created or their assignments changed.
    TopicChange,
    /// Topics are being deleted.
    TopicDeletion,
    /// Partitions are being reassigned.
    PartitionReassignment,
    /// In-sync replica sets changed.
    IsrChange,
    /// The controller is starting up.
    Startup,
    /// The controller event thread is shutting down.
    ControllerShutdown,
}

impl ControllerState {
    /// Stable numeric code for the state gauge.
    pub const fn value(self) -> u8 {
        match self {
            ControllerState::Idle => 0,
            ControllerState::ControllerChange => 1,
            ControllerState::BrokerChange => 2,
            ControllerState::TopicChange => 3,
            ControllerState::TopicDeletion => 4,
            ControllerState::PartitionReassignment => 5,
            ControllerState::IsrChange => 6,
            ControllerState::Startup => 7,
            ControllerState::ControllerShutdown => 8,
        }
    }

    /// Inverse of [`value`](ControllerState::value); unknown codes map to
    /// `Idle`.
    pub const fn from_value(value: u8) -> Self {
        match value {
            1 => ControllerState::ControllerChange,
            2 => ControllerState::BrokerChange,
            3 => ControllerState::TopicChange,
            4 => ControllerState::TopicDeletion,
            5 => ControllerState::PartitionReassignment,
            6 => ControllerState::IsrChange,
            7 => ControllerState::Startup,
            8 => ControllerState::ControllerShutdown,
            _ => ControllerState::Idle,
        }
    }

    /// Snake-case name used in logs and metric labels.
    pub const fn name(self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::ControllerChange => "controller_change",
            ControllerState::BrokerChange => "broker_change",
            ControllerState::TopicChange => "topic_change",
            ControllerState::TopicDeletion => "topic_deletion",
            ControllerState::PartitionReassignment => "partition_reassignment",
            ControllerState::IsrChange => "isr_change",
            ControllerState::Startup => "startup",
            ControllerState::ControllerShutdown => "controller_shutdown",
        }
    }

    /// Label for the per-state processing-time histogram, if this state
    /// is timed. `Idle` is not a processing state and has no timer.
    pub const fn rate_and_time_metric_name(self) -> Option<&'static str> {
        match self {
            ControllerState::Idle => None,
            other => Some(other.name()),
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A state-changing operation on the controller.
///
/// Events are serialized through the controller event queue and processed
/// by exactly one thread. [`ControllerEvent::ShutdownEventThread`] is the
/// sentinel the event thread exits on; it is enqueued by the manager's
/// close path and never reaches the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The controller is starting up.
    Startup,
    /// Controller election or failover.
    ControllerChange,
    /// A broker joined or left the cluster.
    BrokerChange,
    /// Topics were created or their assignments changed.
    TopicChange,
    /// The given topics are being deleted.
    TopicDeletion { topics: Vec<String> },
    /// The given partitions are being reassigned.
    PartitionReassignment { partitions: Vec<TopicPartition> },
    /// In-sync replica sets changed.
    IsrChangeNotification,
    /// Shutdown sentinel for the event thread.
    ShutdownEventThread,
}

impl ControllerEvent {
    /// The processing state advertised while this event is handled.
    pub fn state(&self) -> ControllerState {
        match self {
            ControllerEvent::Startup => ControllerState::Startup,
            ControllerEvent::ControllerChange => ControllerState::ControllerChange,
            ControllerEvent::BrokerChange => ControllerState::BrokerChange,
            ControllerEvent::TopicChange => ControllerState::TopicChange,
            ControllerEvent::TopicDeletion { .. } => ControllerState::TopicDeletion,
            ControllerEvent::PartitionReassignment { .. } => {
                ControllerState::PartitionReassignment
            }
            ControllerEvent::IsrChangeNotification => ControllerState::IsrChange,
            ControllerEvent::ShutdownEventThread => ControllerState::ControllerShutdown,
        }
    }

    /// Whether this is the shutdown sentinel.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, ControllerEvent::ShutdownEventThread)
    }
}
