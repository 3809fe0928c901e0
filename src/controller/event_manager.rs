//! Single-consumer controller event queue.
//!
//! All state-changing operations on the controller are funneled through
//! one queue and processed by one task, so processors never observe
//! concurrent state transitions. Producers are serialized on a put lock;
//! [`ControllerEventManager::clear_and_put`] uses it to atomically drain
//! the queue, preempt every drained event in FIFO order and enqueue a
//! higher-priority event, with no other producer able to slip an event in
//! between.
//!
//! A [`QueuedEvent`] is a one-shot state machine: its `spent` flag is
//! flipped exactly once, by whichever of `process` or `preempt` wins the
//! compare-and-swap. The started latch is only a wakeup for
//! [`QueuedEvent::await_processing`], never a state bit.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error};

use super::event::{ControllerEvent, ControllerState};
use crate::constants::DEFAULT_EVENT_QUEUE_POLL_TIMEOUT_MS;
use crate::error::Result;
use crate::metrics;
use crate::types::BrokerId;

/// Handles controller events on the event thread.
///
/// `process` runs on the single consumer task for events that reach the
/// head of the queue; `preempt` runs on the producer that discarded the
/// event via [`ControllerEventManager::clear_and_put`]. For every queued
/// event exactly one of the two is invoked, exactly once.
#[async_trait]
pub trait ControllerEventProcessor: Send + Sync {
    /// Handle an event normally. Errors are logged by the event loop and
    /// swallowed; they never kill the event thread.
    async fn process(&self, event: &ControllerEvent) -> Result<()>;

    /// Handle an event that was discarded before processing.
    async fn preempt(&self, event: &ControllerEvent);
}

/// One-shot wrapper around an enqueued [`ControllerEvent`].
pub struct QueuedEvent {
    event: ControllerEvent,
    enqueued_at: Instant,
    /// Whether `process` or `preempt` already ran. The CAS on this flag is
    /// the single source of truth for who ran the event.
    spent: AtomicBool,
    /// Released once processing or preemption begins.
    started: watch::Sender<bool>,
}

impl QueuedEvent {
    fn new(event: ControllerEvent) -> Self {
        let (started, _) = watch::channel(false);
        Self {
            event,
            enqueued_at: Instant::now(),
            spent: AtomicBool::new(false),
            started,
        }
    }

    /// The wrapped event.
    pub fn event(&self) -> &ControllerEvent {
        &self.event
    }

    /// When the event was enqueued.
    pub fn enqueued_at(&self) -> Instant {
        self.enqueued_at
    }

    /// Whether the event has already been processed or preempted.
    pub fn is_spent(&self) -> bool {
        self.spent.load(Ordering::SeqCst)
    }

    /// Run the event through the processor, unless it was already spent.
    pub async fn process(&self, processor: &dyn ControllerEventProcessor) -> Result<()> {
        if self.mark_spent().is_err() {
            return Ok(());
        }
        self.started.send_replace(true);
        processor.process(&self.event).await
    }

    /// Preempt the event, unless it was already spent.
    pub async fn preempt(&self, processor: &dyn ControllerEventProcessor) {
        if self.mark_spent().is_err() {
            return;
        }
        self.started.send_replace(true);
        processor.preempt(&self.event).await;
    }

    /// Block until either `process` or `preempt` has begun.
    pub async fn await_processing(&self) {
        let mut rx = self.started.subscribe();
        // The sender lives in self, so the channel cannot close under us.
        let _ = rx.wait_for(|started| *started).await;
    }

    fn mark_spent(&self) -> std::result::Result<bool, bool> {
        self.spent
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
    }
}

/// Tracks how many queue-time samples were recorded since the last idle
/// period, gating the timed poll in the event loop.
///
/// The prometheus histogram itself is cumulative; resetting this counter
/// is what keeps stale latency from re-triggering timed polls during
/// quiescent periods.
struct QueueTimeTracker {
    samples: AtomicU64,
}

impl QueueTimeTracker {
    fn new() -> Self {
        Self {
            samples: AtomicU64::new(0),
        }
    }

    fn record(&self, millis: f64) {
        metrics::EVENT_QUEUE_TIME_MS.observe(millis);
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    fn has_samples(&self) -> bool {
        self.samples.load(Ordering::Relaxed) > 0
    }

    fn reset(&self) {
        self.samples.store(0, Ordering::Relaxed);
    }
}

/// Bounded-by-memory FIFO of controller events with a single consumer
/// task and a preemption primitive.
///
/// Back-pressure is not provided; producers that can overwhelm the queue
/// must rate-limit upstream.
pub struct ControllerEventManager {
    broker_id: BrokerId,
    processor: Arc<dyn ControllerEventProcessor>,
    /// Serializes producers; also held across the drain-preempt-put
    /// sequence of [`clear_and_put`](ControllerEventManager::clear_and_put).
    put_lock: tokio::sync::Mutex<()>,
    queue: Mutex<VecDeque<Arc<QueuedEvent>>>,
    available: Notify,
    state: AtomicU8,
    poll_timeout: Duration,
    queue_time: QueueTimeTracker,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ControllerEventManager {
    /// Create a manager for the given processor. The event task does not
    /// run until [`start`](ControllerEventManager::start) is called.
    pub fn new(broker_id: BrokerId, processor: Arc<dyn ControllerEventProcessor>) -> Self {
        Self {
            broker_id,
            processor,
            put_lock: tokio::sync::Mutex::new(()),
            queue: Mutex::new(VecDeque::new()),
            available: Notify::new(),
            state: AtomicU8::new(ControllerState::Idle.value()),
            poll_timeout: Duration::from_millis(DEFAULT_EVENT_QUEUE_POLL_TIMEOUT_MS),
            queue_time: QueueTimeTracker::new(),
            worker: Mutex::new(None),
        }
    }

    /// Override the idle poll timeout.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// The state of the event currently being processed.
    pub fn state(&self) -> ControllerState {
        ControllerState::from_value(self.state.load(Ordering::SeqCst))
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().expect("event queue lock poisoned").is_empty()
    }

    /// Enqueue an event for processing.
    pub async fn put(&self, event: ControllerEvent) -> Arc<QueuedEvent> {
        let _guard = self.put_lock.lock().await;
        self.enqueue(event)
    }

    /// Atomically drain the queue, preempt every drained event in FIFO
    /// order, then enqueue `event`. No other producer can enqueue between
    /// the drain and the final put.
    pub async fn clear_and_put(&self, event: ControllerEvent) -> Arc<QueuedEvent> {
        let _guard = self.put_lock.lock().await;
        let drained: Vec<Arc<QueuedEvent>> = {
            let mut queue = self.queue.lock().expect("event queue lock poisoned");
            queue.drain(..).collect()
        };
        for queued in &drained {
            queued.preempt(self.processor.as_ref()).await;
        }
        self.enqueue(event)
    }

    fn enqueue(&self, event: ControllerEvent) -> Arc<QueuedEvent> {
        let queued = Arc::new(QueuedEvent::new(event));
        {
            let mut queue = self.queue.lock().expect("event queue lock poisoned");
            queue.push_back(Arc::clone(&queued));
            metrics::EVENT_QUEUE_SIZE.set(queue.len() as i64);
        }
        self.available.notify_one();
        queued
    }

    /// Spawn the event task.
    pub fn start(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move { manager.run().await });
        *self.worker.lock().expect("worker handle lock poisoned") = Some(handle);
    }

    /// Shut the event task down: preempt everything still queued, hand the
    /// task the shutdown sentinel, and wait for it to exit.
    pub async fn close(&self) {
        self.clear_and_put(ControllerEvent::ShutdownEventThread).await;
        let handle = self
            .worker
            .lock()
            .expect("worker handle lock poisoned")
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(broker_id = %self.broker_id, error = %e, "Controller event task failed");
            }
        }
        debug!(broker_id = %self.broker_id, "Controller event manager closed");
    }

    async fn run(&self) {
        debug!(broker_id = %self.broker_id, "Controller event task started");
        loop {
            let queued = self.poll_from_event_queue().await;
            {
                let queue = self.queue.lock().expect("event queue lock poisoned");
                metrics::EVENT_QUEUE_SIZE.set(queue.len() as i64);
            }
            if queued.event().is_shutdown() {
                // Shutdown is coordinated by close(); just exit.
                break;
            }

            let state = queued.event().state();
            self.set_state(state);
            let queued_for = queued.enqueued_at().elapsed();
            self.queue_time.record(queued_for.as_secs_f64() * 1000.0);

            let started = Instant::now();
            if let Err(e) = queued.process(self.processor.as_ref()).await {
                error!(
                    broker_id = %self.broker_id,
                    state = state.name(),
                    error = %e,
                    "Uncaught error processing controller event"
                );
            }
            if let Some(label) = state.rate_and_time_metric_name() {
                metrics::EVENT_PROCESSING_TIME_MS
                    .with_label_values(&[label])
                    .observe(started.elapsed().as_secs_f64() * 1000.0);
            }

            self.set_state(ControllerState::Idle);
        }
        debug!(broker_id = %self.broker_id, "Controller event task shut down");
    }

    /// Dequeue the next event.
    ///
    /// While queue-time samples have been recorded, waits with a timeout;
    /// on timeout the sample tracker is reset (so the queue-time metric
    /// reflects only the current quiescent period) and the wait restarts
    /// untimed.
    async fn poll_from_event_queue(&self) -> Arc<QueuedEvent> {
        if self.queue_time.has_samples() {
            match timeout(self.poll_timeout, self.take_next()).await {
                Ok(queued) => queued,
                Err(_) => {
                    self.queue_time.reset();
                    self.take_next().await
                }
            }
        } else {
            self.take_next().await
        }
    }

    async fn take_next(&self) -> Arc<QueuedEvent> {
        loop {
            let notified = self.available.notified();
            if let Some(queued) = self
                .queue
                .lock()
                .expect("event queue lock poisoned")
                .pop_front()
            {
                return queued;
            }
            notified.await;
        }
    }

    fn set_state(&self, state: ControllerState) {
        self.state.store(state.value(), Ordering::SeqCst);
        metrics::CONTROLLER_STATE.set(state.value() as i64);
    }
}
