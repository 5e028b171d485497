//! Timers used to coalesce resize signals.
//!
//! The provider never sleeps or spawns anything itself: delayed work is handed
//! to a [`TimerHost`], which is whatever drives the host's event loop. The
//! crate ships [`ManualTimers`], a host with a virtual clock that only moves
//! when [`ManualTimers::advance`] is called. It is what headless rendering and
//! tests use.

use std::{
    cell::RefCell,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    /// A token that does not correspond to any timer.
    pub const INVALID: TimerToken = TimerToken(0);

    /// Create a new token.
    pub fn next() -> TimerToken {
        static TIMER_COUNTER: AtomicU64 = AtomicU64::new(1);
        TimerToken(TIMER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value for a token.
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

/// Something that can run an action after a delay.
pub trait TimerHost {
    /// Run `action` once `delay` has elapsed. The returned token identifies the
    /// timer for [`cancel`](Self::cancel).
    fn schedule(&self, delay: Duration, action: Box<dyn FnOnce(TimerToken)>) -> TimerToken;

    /// Drop a timer that has not fired yet. Returns `false` if the timer already
    /// fired, was cancelled before, or never existed.
    fn cancel(&self, token: TimerToken) -> bool;
}

struct Timer {
    token: TimerToken,
    action: Box<dyn FnOnce(TimerToken)>,
    deadline: Duration,
}

#[derive(Default)]
struct TimerQueue {
    now: Duration,
    timers: FxHashMap<TimerToken, Timer>,
}

impl TimerQueue {
    /// The earliest timer due at or before `now`, ties broken by scheduling order.
    fn take_due(&mut self) -> Option<Timer> {
        let token = self
            .timers
            .values()
            .filter(|timer| timer.deadline <= self.now)
            .min_by_key(|timer| (timer.deadline, timer.token))
            .map(|timer| timer.token)?;
        self.timers.remove(&token)
    }
}

/// A [`TimerHost`] driven by a virtual clock.
#[derive(Default)]
pub struct ManualTimers {
    queue: RefCell<TimerQueue>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.queue.borrow().now
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.borrow().timers.len()
    }

    /// Move the clock forward by `by`, firing every timer that becomes due in
    /// deadline order. Returns how many timers fired.
    ///
    /// Actions run outside the queue borrow, so they may schedule or cancel
    /// timers; a timer they schedule fires in the same call if it is already due.
    pub fn advance(&self, by: Duration) -> usize {
        self.queue.borrow_mut().now += by;

        let mut fired = 0;
        loop {
            let due = self.queue.borrow_mut().take_due();
            let Some(timer) = due else {
                break;
            };
            tracing::trace!(token = timer.token.into_raw(), "timer fired");
            (timer.action)(timer.token);
            fired += 1;
        }
        fired
    }
}

impl TimerHost for ManualTimers {
    fn schedule(&self, delay: Duration, action: Box<dyn FnOnce(TimerToken)>) -> TimerToken {
        let token = TimerToken::next();
        let mut queue = self.queue.borrow_mut();
        let deadline = queue.now + delay;
        queue.timers.insert(
            token,
            Timer {
                token,
                action,
                deadline,
            },
        );
        token
    }

    fn cancel(&self, token: TimerToken) -> bool {
        self.queue.borrow_mut().timers.remove(&token).is_some()
    }
}
