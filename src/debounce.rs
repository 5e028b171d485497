use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
    time::Duration,
};

use crate::timer::{TimerHost, TimerToken};

/// Trailing-edge debouncer.
///
/// Every [`call`](Debounce::call) restarts the delay and replaces the stored
/// argument. The action runs once, with the most recent argument, after `delay`
/// passes without another call. Clones share the same pending call.
pub struct Debounce<A: 'static> {
    inner: Rc<Inner<A>>,
}

struct Inner<A> {
    timers: Rc<dyn TimerHost>,
    delay: Duration,
    action: Box<dyn Fn(A)>,
    token: Cell<TimerToken>,
    latest: RefCell<Option<A>>,
}

impl<A: 'static> Clone for Debounce<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: 'static> Debounce<A> {
    pub fn new(timers: Rc<dyn TimerHost>, delay: Duration, action: impl Fn(A) + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                timers,
                delay,
                action: Box::new(action),
                token: Cell::new(TimerToken::INVALID),
                latest: RefCell::new(None),
            }),
        }
    }

    pub fn call(&self, args: A) {
        *self.inner.latest.borrow_mut() = Some(args);
        self.inner.cancel_timer();

        let weak = Rc::downgrade(&self.inner);
        let token = self
            .inner
            .timers
            .schedule(self.inner.delay, Box::new(move |token| fire(&weak, token)));
        self.inner.token.set(token);
    }

    /// Drop the pending call, if any. Returns whether something was pending.
    pub fn cancel(&self) -> bool {
        let pending = self.inner.cancel_timer();
        self.inner.latest.borrow_mut().take();
        pending
    }

    pub fn is_pending(&self) -> bool {
        self.inner.token.get() != TimerToken::INVALID
    }
}

impl<A> Inner<A> {
    fn cancel_timer(&self) -> bool {
        let token = self.token.replace(TimerToken::INVALID);
        token != TimerToken::INVALID && self.timers.cancel(token)
    }
}

impl<A> Drop for Inner<A> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn fire<A>(inner: &Weak<Inner<A>>, token: TimerToken) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    // Hosts may still fire a timer that was replaced by a later call.
    if inner.token.get() != token {
        return;
    }
    inner.token.set(TimerToken::INVALID);
    let latest = inner.latest.borrow_mut().take();
    if let Some(args) = latest {
        (inner.action)(args);
    }
}
