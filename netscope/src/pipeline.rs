//! # Ingestion Pipeline
//!
//! Bounded hand-off between the capture reader and the rest of the program.
//!
//! ```text
//! ring buffer ──▶ Producer::offer_raw ──▶ [ bounded events ] ──▶ Consumer (poller, tick)
//!                        │ full
//!                        └──────────────▶ [ bounded notices ] ──▶ Consumer::next_notice
//! ```
//!
//! ## Backpressure
//!
//! The event buffer never blocks the producer. When it is full the newest
//! event is dropped and exactly one [`PipelineNotice::EventDropped`] is
//! offered on the notice channel. The notice channel is small and lossy: if
//! it is full too, the notice is discarded (the event is already gone).
//!
//! ## Termination
//!
//! Dropping the [`Producer`] closes the pipeline. Events already buffered
//! can still be drained; after that [`Consumer::drain`] yields nothing and
//! [`Consumer::poll`] reports [`Poll::Closed`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::warn;

use crate::capture::decode_event;
use crate::domain::TrafficEvent;

/// Default event buffer capacity, sized for burst tolerance over memory
pub const DEFAULT_BUFFER_CAPACITY: usize = 1 << 20;

/// Default notice channel capacity
pub const DEFAULT_NOTICE_CAPACITY: usize = 8;

/// Out-of-band conditions reported to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineNotice {
    /// The event buffer was full and one event was dropped
    EventDropped,
}

impl PipelineNotice {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            PipelineNotice::EventDropped => "Events channel full, dropping event",
        }
    }
}

/// Result of offering one event to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    /// Buffer full; the event was dropped
    Dropped,
    /// Sample failed to decode and was discarded
    Malformed,
    /// Every consumer is gone
    Closed,
}

/// Outcome of a bounded wait on the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    Event(TrafficEvent),
    Idle,
    Closed,
}

/// Pipeline counters, shared between producer and consumers
#[derive(Debug, Default)]
pub struct PipelineStats {
    accepted: AtomicU64,
    dropped: AtomicU64,
    malformed: AtomicU64,
    closed: AtomicBool,
}

impl PipelineStats {
    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn malformed(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }
}

/// Create a pipeline with room for `capacity` events and `notice_capacity`
/// pending notices.
#[must_use]
pub fn channel(capacity: usize, notice_capacity: usize) -> (Producer, Consumer) {
    let (event_tx, event_rx) = bounded(capacity);
    let (notice_tx, notice_rx) = bounded(notice_capacity);
    let stats = Arc::new(PipelineStats::default());

    let producer = Producer { events: event_tx, notices: notice_tx, stats: Arc::clone(&stats) };
    let consumer = Consumer { events: event_rx, notices: notice_rx, stats };
    (producer, consumer)
}

/// Writing side, owned by the capture reader
pub struct Producer {
    events: Sender<TrafficEvent>,
    notices: Sender<PipelineNotice>,
    stats: Arc<PipelineStats>,
}

impl Producer {
    /// Non-blocking enqueue of an already-decoded event
    pub fn offer(&self, event: TrafficEvent) -> Offer {
        match self.events.try_send(event) {
            Ok(()) => {
                self.stats.accepted.fetch_add(1, Ordering::Relaxed);
                Offer::Accepted
            }
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                // Losing the notice itself is acceptable
                let _ = self.notices.try_send(PipelineNotice::EventDropped);
                Offer::Dropped
            }
            Err(TrySendError::Disconnected(_)) => Offer::Closed,
        }
    }

    /// Decode a raw ring-buffer sample, stamp it with the current time and offer it
    pub fn offer_raw(&self, bytes: &[u8]) -> Offer {
        match decode_event(bytes, unix_now()) {
            Ok(event) => self.offer(event),
            Err(e) => {
                self.stats.malformed.fetch_add(1, Ordering::Relaxed);
                warn!("Discarding traffic record: {e}");
                Offer::Malformed
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> &Arc<PipelineStats> {
        &self.stats
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        self.stats.closed.store(true, Ordering::Release);
    }
}

/// Reading side; cloned into each render-scheduler loop
#[derive(Clone)]
pub struct Consumer {
    events: Receiver<TrafficEvent>,
    notices: Receiver<PipelineNotice>,
    stats: Arc<PipelineStats>,
}

impl Consumer {
    /// Hand every currently buffered event to `sink` without blocking.
    /// Returns how many events were drained.
    pub fn drain_into(&self, mut sink: impl FnMut(TrafficEvent)) -> usize {
        let mut drained = 0;
        while let Ok(event) = self.events.try_recv() {
            sink(event);
            drained += 1;
        }
        drained
    }

    /// Collect every currently buffered event without blocking
    #[must_use]
    pub fn drain(&self) -> Vec<TrafficEvent> {
        let mut events = Vec::new();
        self.drain_into(|event| events.push(event));
        events
    }

    /// Wait up to `timeout` for the next event
    #[must_use]
    pub fn poll(&self, timeout: Duration) -> Poll {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Poll::Event(event),
            Err(RecvTimeoutError::Timeout) => Poll::Idle,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        }
    }

    /// Next pending notice, if any
    #[must_use]
    pub fn next_notice(&self) -> Option<PipelineNotice> {
        self.notices.try_recv().ok()
    }

    /// The producer is gone and nothing is left to drain
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.stats.closed.load(Ordering::Acquire) && self.events.is_empty()
    }

    /// Events waiting in the buffer right now
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn stats(&self) -> &Arc<PipelineStats> {
        &self.stats
    }
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
