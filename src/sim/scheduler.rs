//! Virtual-clock timer scheduler
//!
//! Replaces wall-clock `setTimeout`-style callbacks with typed events that the
//! owning stage dispatches. Nothing fires until the clock is advanced, so tests
//! can drive time explicitly.

use serde::{Deserialize, Serialize};

/// Opaque handle returned when a timer is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer<E> {
    handle: TimerHandle,
    due_ms: u64,
    /// Repeat period; `None` for one-shot timers
    interval_ms: Option<u64>,
    /// Firings left after the next one; `None` repeats forever
    repeats_left: Option<u32>,
    event: E,
}

/// Schedules one-shot and repeating events against a virtual millisecond clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<E> {
    now_ms: u64,
    timers: Vec<Timer<E>>,
    next_handle: u32,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            timers: Vec::new(),
            next_handle: 1,
        }
    }

    /// Current virtual time in milliseconds
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn allocate_handle(&mut self) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Fire `event` once, `delay_ms` from now
    pub fn after(&mut self, delay_ms: u64, event: E) -> TimerHandle {
        let handle = self.allocate_handle();
        self.timers.push(Timer {
            handle,
            due_ms: self.now_ms + delay_ms,
            interval_ms: None,
            repeats_left: Some(0),
            event,
        });
        handle
    }

    /// Fire `event` every `interval_ms`, first firing one interval from now.
    ///
    /// `repeat` counts firings *after* the first, so `Some(n - 1)` fires `n`
    /// times in total. `None` repeats until cancelled. A zero interval is
    /// bumped to 1 ms so a single advance cannot loop forever.
    pub fn every(&mut self, interval_ms: u64, event: E, repeat: Option<u32>) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        let handle = self.allocate_handle();
        self.timers.push(Timer {
            handle,
            due_ms: self.now_ms + interval_ms,
            interval_ms: Some(interval_ms),
            repeats_left: repeat,
            event,
        });
        handle
    }

    /// Cancel a pending timer. Returns false if it already finished or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Cancel an optional handle and clear it
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    /// Drop every pending timer (stage teardown)
    pub fn cancel_all(&mut self) {
        if !self.timers.is_empty() {
            log::debug!("Cancelling {} pending timers", self.timers.len());
        }
        self.timers.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }
}

impl<E: Clone> Scheduler<E> {
    /// Pop the earliest event due at or before `target_ms`, moving the clock to
    /// its due time. Once nothing is due the clock settles on `target_ms` and
    /// `None` is returned.
    ///
    /// Handlers that schedule follow-up timers while draining see the clock at
    /// the firing event's time, so chained delays do not drift with step size.
    pub fn pop_due(&mut self, target_ms: u64) -> Option<E> {
        let next = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= target_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.handle.0))
            .map(|(i, _)| i);

        let Some(index) = next else {
            self.now_ms = self.now_ms.max(target_ms);
            return None;
        };

        let timer = &mut self.timers[index];
        self.now_ms = self.now_ms.max(timer.due_ms);
        let event = timer.event.clone();

        let finished = match (timer.interval_ms, timer.repeats_left) {
            (None, _) => true,
            (Some(_), Some(0)) => true,
            (Some(interval), Some(left)) => {
                timer.repeats_left = Some(left - 1);
                timer.due_ms += interval;
                false
            }
            (Some(interval), None) => {
                timer.due_ms += interval;
                false
            }
        };
        if finished {
            self.timers.remove(index);
        }
        Some(event)
    }

    /// Advance the clock by `dt_ms` and return every event that came due, in
    /// due-time order (ties broken by scheduling order). Repeating timers that
    /// are overdue by several periods fire once per period.
    pub fn advance(&mut self, dt_ms: u64) -> Vec<E> {
        let target = self.now_ms + dt_ms;
        let mut fired = Vec::new();
        while let Some(event) = self.pop_due(target) {
            fired.push(event);
        }
        fired
    }
}
