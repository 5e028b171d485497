use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
    time::Duration,
};

use floem_reactive::{RwSignal, Scope, SignalUpdate, SignalWith, provide_context};

use crate::{
    config::BreakpointConfig,
    context::BreakpointContext,
    debounce::Debounce,
    error::ConfigError,
    table::BreakpointTable,
    timer::TimerHost,
    viewport::{ListenerId, Viewport, ViewportEvent, ViewportHandler, ViewportSignal},
};

/// What a [`BreakpointProvider`] publishes to its descendants.
#[derive(Clone, Debug, PartialEq)]
pub struct BreakpointState {
    /// Last width that changed the breakpoint, or the configured guess before that.
    pub screen_width: Option<f64>,
    pub breakpoints: Rc<BreakpointTable>,
    /// The threshold, not the name, of the first table entry wider than the
    /// viewport. `None` once the viewport is at least as wide as every entry.
    pub breakpoint: Option<f64>,
}

impl BreakpointState {
    pub fn breakpoint_name(&self) -> Option<&str> {
        self.breakpoint
            .and_then(|pixels| self.breakpoints.name_of(pixels))
    }
}

/// The live environment a provider listens to.
#[derive(Clone)]
pub struct ViewportHost {
    pub viewport: Rc<dyn Viewport>,
    /// Used to debounce resize signals.
    pub timers: Rc<dyn TimerHost>,
}

impl ViewportHost {
    pub fn new(viewport: Rc<dyn Viewport>, timers: Rc<dyn TimerHost>) -> Self {
        Self { viewport, timers }
    }
}

/// Tracks the viewport width and publishes the active breakpoint.
///
/// Without a [`ViewportHost`] (server rendering) the provider resolves the
/// breakpoint once from the configured guess and never changes. With one, it
/// resolves from the live width and, once [`mount`](Self::mount)ed, follows
/// `resize`, `orientationchange` and `load` signals until
/// [`unmount`](Self::unmount) or drop.
///
/// The state only changes when the resolved breakpoint changes, so a resize
/// inside the current bucket notifies nobody.
///
/// The table is captured at construction. A different table needs a new
/// provider.
pub struct BreakpointProvider {
    scope: Scope,
    table: Rc<BreakpointTable>,
    state: RwSignal<BreakpointState>,
    /// Shared with every published context, cleared on drop.
    alive: Rc<Cell<bool>>,
    debounce_resize: bool,
    debounce_delay: Duration,
    host: Option<ViewportHost>,
    subscriptions: RefCell<Option<Subscriptions>>,
}

struct Subscriptions {
    listeners: Vec<ListenerId>,
    resize_debounce: Option<Debounce<ViewportSignal>>,
}

impl BreakpointProvider {
    /// A provider with no live viewport.
    pub fn new(config: BreakpointConfig) -> Result<Self, ConfigError> {
        Self::build(config, None)
    }

    /// A provider that measures `host`'s viewport. Call [`mount`](Self::mount)
    /// to start following it.
    pub fn with_viewport(
        config: BreakpointConfig,
        host: ViewportHost,
    ) -> Result<Self, ConfigError> {
        Self::build(config, Some(host))
    }

    fn build(config: BreakpointConfig, host: Option<ViewportHost>) -> Result<Self, ConfigError> {
        let table = Rc::new(config.validate()?);

        let screen_width = config.initial_width();
        let measured = host
            .as_ref()
            .and_then(|host| host.viewport.inner_width())
            .or(screen_width);
        let breakpoint = measured.and_then(|width| table.find_current_breakpoint(width));
        tracing::debug!(
            ?screen_width,
            ?measured,
            ?breakpoint,
            live = host.is_some(),
            "breakpoint provider created"
        );

        let scope = Scope::new();
        let state = scope.create_rw_signal(BreakpointState {
            screen_width,
            breakpoints: table.clone(),
            breakpoint,
        });

        Ok(Self {
            scope,
            table,
            state,
            alive: Rc::new(Cell::new(true)),
            debounce_resize: config.debounce_resize,
            debounce_delay: config.debounce_delay,
            host,
            subscriptions: RefCell::new(None),
        })
    }

    /// Publish this provider's [`BreakpointContext`] so that
    /// [`use_breakpoints`](crate::use_breakpoints) finds it.
    pub fn provide(&self) -> BreakpointContext {
        let context = self.context();
        provide_context(context.clone());
        context
    }

    pub fn context(&self) -> BreakpointContext {
        BreakpointContext {
            state: self.state.read_only(),
            alive: self.alive.clone(),
        }
    }

    /// Start listening to the viewport. Does nothing without a viewport or
    /// when already mounted.
    pub fn mount(&self) {
        let Some(host) = &self.host else {
            tracing::debug!("no viewport to listen to, breakpoint stays fixed");
            return;
        };
        let mut subscriptions = self.subscriptions.borrow_mut();
        if subscriptions.is_some() {
            tracing::warn!("breakpoint provider is already mounted");
            return;
        }

        let reader = WidthReader {
            table: self.table.clone(),
            state: self.state,
            viewport: Rc::downgrade(&host.viewport),
        };

        let (resize, resize_debounce) = if self.debounce_resize {
            let debounce = Debounce::new(host.timers.clone(), self.debounce_delay, {
                let reader = reader.clone();
                move |signal: ViewportSignal| {
                    reader.read_width(&signal);
                }
            });
            let handler: ViewportHandler = {
                let debounce = debounce.clone();
                Rc::new(move |signal: &ViewportSignal| debounce.call(*signal))
            };
            (handler, Some(debounce))
        } else {
            let reader = reader.clone();
            let handler: ViewportHandler = Rc::new(move |signal: &ViewportSignal| {
                reader.read_width(signal);
            });
            (handler, None)
        };
        let direct: ViewportHandler = Rc::new(move |signal: &ViewportSignal| {
            reader.read_width(signal);
        });

        let listeners = vec![
            host.viewport.add_listener(ViewportEvent::Resize, resize),
            host.viewport
                .add_listener(ViewportEvent::OrientationChange, direct.clone()),
            host.viewport.add_listener(ViewportEvent::Load, direct),
        ];
        tracing::debug!(
            debounced = self.debounce_resize,
            delay_ms = self.debounce_delay.as_millis() as u64,
            "breakpoint provider mounted"
        );

        *subscriptions = Some(Subscriptions {
            listeners,
            resize_debounce,
        });
    }

    /// Remove every listener added by [`mount`](Self::mount) and drop a
    /// pending debounced resize.
    pub fn unmount(&self) {
        let Some(subscriptions) = self.subscriptions.borrow_mut().take() else {
            return;
        };
        if let Some(host) = &self.host {
            for id in subscriptions.listeners {
                if !host.viewport.remove_listener(id) {
                    tracing::trace!(?id, "listener was already removed");
                }
            }
        }
        if let Some(debounce) = subscriptions.resize_debounce {
            debounce.cancel();
        }
        tracing::debug!("breakpoint provider unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.subscriptions.borrow().is_some()
    }

    pub fn has_viewport(&self) -> bool {
        self.host.is_some()
    }

    pub fn breakpoint(&self) -> Option<f64> {
        self.state.with_untracked(|state| state.breakpoint)
    }

    pub fn screen_width(&self) -> Option<f64> {
        self.state.with_untracked(|state| state.screen_width)
    }
}

impl Drop for BreakpointProvider {
    fn drop(&mut self) {
        self.unmount();
        self.alive.set(false);
        self.scope.dispose();
    }
}

/// The handler behind every viewport listener.
#[derive(Clone)]
struct WidthReader {
    table: Rc<BreakpointTable>,
    state: RwSignal<BreakpointState>,
    viewport: Weak<dyn Viewport>,
}

impl WidthReader {
    /// Resolve the breakpoint for the signalled width and commit it if it
    /// changed. Returns whether the state was updated.
    fn read_width(&self, signal: &ViewportSignal) -> bool {
        let width = signal.width.or_else(|| {
            self.viewport
                .upgrade()
                .and_then(|viewport| viewport.inner_width())
        });
        let Some(width) = width else {
            tracing::debug!(event = %signal.event, "viewport width unavailable, signal ignored");
            return false;
        };

        let current = self.table.find_current_breakpoint(width);
        let previous = self.state.with_untracked(|state| state.breakpoint);
        if current == previous {
            tracing::trace!(event = %signal.event, width, "breakpoint unchanged");
            return false;
        }

        tracing::debug!(
            event = %signal.event,
            width,
            ?previous,
            ?current,
            "breakpoint changed"
        );
        self.state.update(|state| {
            state.breakpoint = current;
            state.screen_width = Some(width);
        });
        true
    }
}
