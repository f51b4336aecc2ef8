//! # Render Scheduler
//!
//! Two independent loops feed the flow store:
//!
//! 1. **Poller** ([`spawn_poller`]): a background thread blocked on the
//!    pipeline for at most [`POLL_TIMEOUT`], recording each event as it
//!    arrives. It exits when the pipeline closes.
//! 2. **Tick** ([`Ticker`]): the UI thread, at [`TICK_INTERVAL`], drains
//!    whatever is buffered ([`drain_pending`]), rebuilds the visible rows and
//!    updates [`ScrollState`].
//!
//! Input handling runs between ticks and waits at most
//! [`Ticker::until_next`], so it never delays a tick.

use std::io;
use std::ops::Range;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::flow::FlowStore;
use crate::pipeline::{Consumer, Poll};

/// Poller wait per attempt
pub const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Redraw period (30 Hz)
pub const TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 30);

/// Start the poller thread. Its result is the number of events it recorded.
///
/// # Errors
/// Fails if the thread can't be spawned
pub fn spawn_poller(consumer: Consumer, store: Arc<FlowStore>) -> io::Result<JoinHandle<u64>> {
    thread::Builder::new().name("ingest-poller".to_string()).spawn(move || {
        let mut recorded = 0u64;
        loop {
            match consumer.poll(POLL_TIMEOUT) {
                Poll::Event(event) => {
                    store.record(event);
                    recorded += 1;
                }
                Poll::Idle => {}
                Poll::Closed => break,
            }
        }
        info!("Ingest poller stopped after {recorded} events");
        recorded
    })
}

/// Move every buffered event into the store under one write guard
pub fn drain_pending(consumer: &Consumer, store: &FlowStore) -> usize {
    let events = consumer.drain();
    let drained = events.len();
    if drained > 0 {
        store.record_all(events);
        debug!("Tick drained {drained} events");
    }
    drained
}

/// Fixed-rate deadline tracker for the redraw loop
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    /// First tick is due immediately
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval, next: Instant::now() }
    }

    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Schedule the next tick one interval on. A tick that fell more than an
    /// interval behind is not made up.
    pub fn reschedule(&mut self, now: Instant) {
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
    }

    /// Time left before the next tick is due
    #[must_use]
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

/// Viewport position over a list of rows, pinned to the newest row while
/// auto-follow is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
    auto_follow: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self { offset: 0, auto_follow: true }
    }
}

impl ScrollState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn is_following(&self) -> bool {
        self.auto_follow
    }

    /// Re-clamp for `total` rows in a viewport of `height` rows
    pub fn update(&mut self, total: usize, height: usize) {
        let max_offset = total.saturating_sub(height);
        self.offset = if self.auto_follow { max_offset } else { self.offset.min(max_offset) };
    }

    /// Row indices currently in view
    #[must_use]
    pub fn visible(&self, total: usize, height: usize) -> Range<usize> {
        let start = self.offset.min(total);
        start..(start + height).min(total)
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.auto_follow = false;
        self.offset = self.offset.saturating_sub(rows);
    }

    /// Clamped against the row count on the next [`update`](Self::update)
    pub fn scroll_down(&mut self, rows: usize) {
        self.auto_follow = false;
        self.offset = self.offset.saturating_add(rows);
    }

    pub fn toggle_follow(&mut self) {
        self.auto_follow = !self.auto_follow;
    }

    /// Back to the top of a fresh list
    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::channel;

    #[test]
    fn test_follow_pins_to_bottom() {
        let mut scroll = ScrollState::new();
        scroll.update(100, 10);
        assert_eq!(scroll.offset(), 90);
        scroll.update(150, 10);
        assert_eq!(scroll.offset(), 140);
        assert_eq!(scroll.visible(150, 10), 140..150);
    }

    #[test]
    fn test_manual_scroll_disables_follow() {
        let mut scroll = ScrollState::new();
        scroll.update(100, 10);
        scroll.scroll_up(5);
        assert!(!scroll.is_following());
        scroll.update(200, 10);
        assert_eq!(scroll.offset(), 85);

        scroll.scroll_down(1000);
        scroll.update(200, 10);
        assert_eq!(scroll.offset(), 190);
    }

    #[test]
    fn test_shrinking_list_clamps_offset() {
        let mut scroll = ScrollState::new();
        scroll.update(50, 10);
        scroll.scroll_up(0);
        scroll.update(5, 10);
        assert_eq!(scroll.offset(), 0);
        assert_eq!(scroll.visible(5, 10), 0..5);
    }

    #[test]
    fn test_toggle_follow_snaps_back() {
        let mut scroll = ScrollState::new();
        scroll.update(100, 10);
        scroll.scroll_up(30);
        scroll.toggle_follow();
        scroll.update(100, 10);
        assert_eq!(scroll.offset(), 90);
    }

    #[test]
    fn test_ticker_does_not_burst() {
        let start = Instant::now();
        let mut ticker = Ticker { interval: Duration::from_millis(10), next: start };
        assert!(ticker.is_due(start));

        // Fell far behind: next tick is one interval from now, not from the old deadline
        let late = start + Duration::from_millis(100);
        ticker.reschedule(late);
        assert!(!ticker.is_due(late));
        assert_eq!(ticker.until_next(late), Duration::from_millis(10));
    }

    #[test]
    fn test_poller_exits_when_pipeline_closes() {
        let (producer, consumer) = channel(8, 1);
        let store = Arc::new(FlowStore::new(8));
        let handle = spawn_poller(consumer, Arc::clone(&store)).unwrap();
        drop(producer);
        assert_eq!(handle.join().unwrap(), 0);
    }
}
