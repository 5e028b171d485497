use std::{cell::Cell, rc::Rc};

use floem_reactive::{ReadSignal, SignalWith, use_context};

use crate::{provider::BreakpointState, table::BreakpointTable};

/// Read handle on the breakpoint state published by a
/// [`BreakpointProvider`](crate::BreakpointProvider).
///
/// The tracked getters subscribe the running effect, so a view that reads the
/// breakpoint through them is rebuilt whenever the provider commits a new one,
/// and only then.
///
/// Once the provider is dropped its state is gone: [`use_breakpoints`] returns
/// `None` and the getters of a handle kept from earlier read as `None` too. Use
/// [`is_alive`](Self::is_alive) to tell that apart from a `None` breakpoint.
#[derive(Clone)]
pub struct BreakpointContext {
    pub(crate) state: ReadSignal<BreakpointState>,
    pub(crate) alive: Rc<Cell<bool>>,
}

impl BreakpointContext {
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Run `f` on the current state, tracked.
    pub fn with<O>(&self, f: impl FnOnce(&BreakpointState) -> O) -> Option<O> {
        self.is_alive().then(|| self.state.with(f))
    }

    pub fn with_untracked<O>(&self, f: impl FnOnce(&BreakpointState) -> O) -> Option<O> {
        self.is_alive().then(|| self.state.with_untracked(f))
    }

    /// Snapshot of `{ screen_width, breakpoints, breakpoint }`.
    pub fn get(&self) -> Option<BreakpointState> {
        self.with(BreakpointState::clone)
    }

    pub fn get_untracked(&self) -> Option<BreakpointState> {
        self.with_untracked(BreakpointState::clone)
    }

    /// Threshold of the active bucket, `None` above the widest entry.
    pub fn breakpoint(&self) -> Option<f64> {
        self.with(|state| state.breakpoint).flatten()
    }

    pub fn screen_width(&self) -> Option<f64> {
        self.with(|state| state.screen_width).flatten()
    }

    pub fn breakpoints(&self) -> Option<Rc<BreakpointTable>> {
        self.with(|state| state.breakpoints.clone())
    }

    /// Name of the active bucket.
    pub fn breakpoint_name(&self) -> Option<String> {
        self.with(|state| state.breakpoint_name().map(ToString::to_string))
            .flatten()
    }
}

/// The breakpoint context provided by the closest
/// [`BreakpointProvider::provide`](crate::BreakpointProvider::provide) call,
/// or `None` once that provider has been dropped.
pub fn use_breakpoints() -> Option<BreakpointContext> {
    use_context::<BreakpointContext>().filter(BreakpointContext::is_alive)
}
