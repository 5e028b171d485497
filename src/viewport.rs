//! The host windowing environment as seen by the provider.
//!
//! A [`Viewport`] reports its inner width and delivers [`ViewportSignal`]s to
//! registered handlers. Registration hands back a [`ListenerId`]; that id, and
//! only that id, removes the handler again.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use rustc_hash::FxHashMap;

/// The viewport events the provider reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportEvent {
    Resize,
    OrientationChange,
    Load,
}

impl ViewportEvent {
    pub const ALL: [ViewportEvent; 3] = [
        ViewportEvent::Resize,
        ViewportEvent::OrientationChange,
        ViewportEvent::Load,
    ];

    /// The DOM name of the event.
    pub const fn as_str(self) -> &'static str {
        match self {
            ViewportEvent::Resize => "resize",
            ViewportEvent::OrientationChange => "orientationchange",
            ViewportEvent::Load => "load",
        }
    }
}

impl fmt::Display for ViewportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown viewport event `{0}`")]
pub struct UnknownViewportEvent(pub String);

impl FromStr for ViewportEvent {
    type Err = UnknownViewportEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewportEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| UnknownViewportEvent(s.to_string()))
    }
}

/// A delivered viewport event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSignal {
    pub event: ViewportEvent,
    /// The inner width carried by the event, if the host reports one.
    pub width: Option<f64>,
}

impl ViewportSignal {
    pub fn new(event: ViewportEvent, width: Option<f64>) -> Self {
        Self { event, width }
    }

    pub fn resize(width: f64) -> Self {
        Self::new(ViewportEvent::Resize, Some(width))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn next() -> ListenerId {
        static LISTENER_COUNTER: AtomicU64 = AtomicU64::new(0);
        ListenerId(LISTENER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

pub type ViewportHandler = Rc<dyn Fn(&ViewportSignal)>;

/// A window (or browser viewport) whose width drives the breakpoint.
pub trait Viewport {
    /// Current inner width in logical pixels, if it can be measured.
    fn inner_width(&self) -> Option<f64>;

    fn add_listener(&self, event: ViewportEvent, handler: ViewportHandler) -> ListenerId;

    /// Returns `false` if `id` is not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

/// An in-process [`Viewport`] with no window behind it.
///
/// The width is set directly and events are delivered with [`emit`](Self::emit).
/// Useful for headless rendering and for tests.
#[derive(Default)]
pub struct HeadlessViewport {
    width: Cell<Option<f64>>,
    listeners: RefCell<FxHashMap<ListenerId, (ViewportEvent, ViewportHandler)>>,
}

impl HeadlessViewport {
    pub fn new(width: f64) -> Self {
        Self {
            width: Cell::new(Some(width)),
            listeners: RefCell::default(),
        }
    }

    /// A viewport that cannot report its width.
    pub fn unmeasured() -> Self {
        Self::default()
    }

    pub fn set_width(&self, width: Option<f64>) {
        self.width.set(width);
    }

    /// Deliver `event` to every handler registered for it, carrying the
    /// current width.
    pub fn emit(&self, event: ViewportEvent) -> usize {
        self.dispatch(ViewportSignal::new(event, self.width.get()))
    }

    /// Set the width and deliver a resize event carrying it.
    pub fn resize(&self, width: f64) -> usize {
        self.width.set(Some(width));
        self.emit(ViewportEvent::Resize)
    }

    /// Deliver `signal` as is, returning the number of handlers that ran.
    pub fn dispatch(&self, signal: ViewportSignal) -> usize {
        // Handlers run outside the registry borrow, they may query the viewport
        // or (un)register listeners.
        let handlers: Vec<ViewportHandler> = self
            .listeners
            .borrow()
            .values()
            .filter(|(event, _)| *event == signal.event)
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in &handlers {
            handler(&signal);
        }
        handlers.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn listeners_for(&self, event: ViewportEvent) -> usize {
        self.listeners
            .borrow()
            .values()
            .filter(|(registered, _)| *registered == event)
            .count()
    }
}

impl Viewport for HeadlessViewport {
    fn inner_width(&self) -> Option<f64> {
        self.width.get()
    }

    fn add_listener(&self, event: ViewportEvent, handler: ViewportHandler) -> ListenerId {
        let id = ListenerId::next();
        self.listeners.borrow_mut().insert(id, (event, handler));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(&id).is_some()
    }
}
