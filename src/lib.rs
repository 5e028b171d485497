//! # Floem Breakpoints
//!
//! Viewport breakpoints for [Floem](https://github.com/lapce/floem) views.
//!
//! A [`BreakpointProvider`] watches the width of a [`Viewport`], resolves it
//! against a [`BreakpointTable`] and publishes the result through the reactive
//! context. Views read it with [`use_breakpoints`] and are rebuilt only when the
//! active breakpoint changes, not on every resize.
//!
//! The published breakpoint is the *threshold* of the first table entry that is
//! wider than the viewport, with `None` meaning "wider than everything".
//! [`BreakpointContext::breakpoint_name`] maps it back to the entry's name.
//!
//! ```rust
//! use std::{rc::Rc, time::Duration};
//!
//! use floem_breakpoints::{
//!     BreakpointConfig, BreakpointProvider, HeadlessViewport, ManualTimers, ViewportHost,
//!     use_breakpoints,
//! };
//!
//! let viewport = Rc::new(HeadlessViewport::new(500.0));
//! let timers = Rc::new(ManualTimers::new());
//!
//! let config = BreakpointConfig::new()
//!     .breakpoints([("mobile", 480.0), ("tablet", 768.0), ("desktop", 1024.0)]);
//! let host = ViewportHost::new(viewport.clone(), timers.clone());
//! let provider = BreakpointProvider::with_viewport(config, host).unwrap();
//! provider.provide();
//! provider.mount();
//!
//! let breakpoints = use_breakpoints().unwrap();
//! assert_eq!(breakpoints.breakpoint(), Some(768.0));
//! assert_eq!(breakpoints.breakpoint_name().as_deref(), Some("tablet"));
//!
//! // Resizes are debounced by 50ms by default.
//! viewport.resize(1200.0);
//! timers.advance(Duration::from_millis(50));
//! assert_eq!(breakpoints.breakpoint(), None);
//! ```
//!
//! ## Server rendering
//!
//! Without a viewport, [`BreakpointProvider::new`] resolves the breakpoint from
//! [`BreakpointConfig::guessed_breakpoint`] (or
//! [`BreakpointConfig::default_breakpoint`]) and [`BreakpointProvider::mount`]
//! does nothing.

mod config;
mod context;
mod debounce;
mod error;
mod provider;
mod table;
pub mod timer;
pub mod viewport;

pub use config::{BreakpointConfig, DEFAULT_DEBOUNCE_DELAY};
pub use context::{BreakpointContext, use_breakpoints};
pub use debounce::Debounce;
pub use error::ConfigError;
pub use provider::{BreakpointProvider, BreakpointState, ViewportHost};
pub use table::BreakpointTable;
pub use timer::{ManualTimers, TimerHost, TimerToken};
pub use viewport::{HeadlessViewport, ListenerId, Viewport, ViewportEvent, ViewportSignal};
