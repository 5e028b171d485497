//! Provider behaviour against a headless viewport.
//!
//! The reactive runtime lives in a thread local that may only be created on one
//! thread, so these scenarios run one after another on the main thread instead
//! of through the default test harness. Each one owns its provider and disposes
//! the scope its effects were created in.

use std::{cell::Cell, rc::Rc, time::Duration};

use floem_breakpoints::{
    BreakpointConfig, BreakpointContext, BreakpointProvider, ConfigError, HeadlessViewport,
    ManualTimers, ViewportEvent, ViewportHost, ViewportSignal, use_breakpoints,
};
use floem_reactive::{Scope, create_effect, with_scope};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn devices() -> BreakpointConfig {
    BreakpointConfig::new().breakpoints([("mobile", 480.0), ("tablet", 768.0), ("desktop", 1024.0)])
}

struct Harness {
    viewport: Rc<HeadlessViewport>,
    timers: Rc<ManualTimers>,
    provider: BreakpointProvider,
}

impl Harness {
    fn new(config: BreakpointConfig, width: f64) -> Self {
        let viewport = Rc::new(HeadlessViewport::new(width));
        let timers = Rc::new(ManualTimers::new());
        let provider = match BreakpointProvider::with_viewport(
            config,
            ViewportHost::new(viewport.clone(), timers.clone()),
        ) {
            Ok(provider) => provider,
            Err(err) => panic!("valid configuration rejected: {err}"),
        };
        provider.mount();
        Self {
            viewport,
            timers,
            provider,
        }
    }
}

/// Counts how many times a consumer effect reading the context has run.
fn subscribe(scope: Scope, context: BreakpointContext) -> Rc<Cell<usize>> {
    let runs = Rc::new(Cell::new(0));
    with_scope(scope, {
        let runs = runs.clone();
        move || {
            create_effect(move |_| {
                context.get();
                runs.set(runs.get() + 1);
            });
        }
    });
    runs
}

fn missing_breakpoints_are_rejected() {
    assert!(matches!(
        BreakpointProvider::new(BreakpointConfig::new()),
        Err(ConfigError::NoBreakpoints)
    ));
    assert!(matches!(
        BreakpointProvider::new(BreakpointConfig::new().guessed_breakpoint(500.0)),
        Err(ConfigError::NoBreakpoints)
    ));
}

fn non_mapping_breakpoints_are_rejected() {
    for value in [json!(768), json!("tablet"), json!([480, 768])] {
        let config = BreakpointConfig::new().breakpoints_value(value.clone());
        assert!(
            matches!(
                BreakpointProvider::new(config),
                Err(ConfigError::NotAMapping { .. })
            ),
            "{value} accepted as a table"
        );
    }
}

fn server_render_uses_guess() {
    let provider = match BreakpointProvider::new(devices().guessed_breakpoint(500.0)) {
        Ok(provider) => provider,
        Err(err) => panic!("{err}"),
    };
    assert_eq!(provider.breakpoint(), Some(768.0));
    assert_eq!(provider.screen_width(), Some(500.0));

    provider.mount();
    assert!(!provider.is_mounted());
    assert!(!provider.has_viewport());
}

fn default_breakpoint_when_not_guessed() {
    let provider = match BreakpointProvider::new(devices().default_breakpoint(300.0)) {
        Ok(provider) => provider,
        Err(err) => panic!("{err}"),
    };
    assert_eq!(provider.breakpoint(), Some(480.0));

    let provider = match BreakpointProvider::new(devices()) {
        Ok(provider) => provider,
        Err(err) => panic!("{err}"),
    };
    assert_eq!(provider.screen_width(), None);
    assert_eq!(provider.breakpoint(), None);
}

fn live_width_resolves_initial_breakpoint() {
    let harness = Harness::new(devices().default_breakpoint(2000.0), 500.0);
    // The breakpoint follows the measured width, the width keeps its seed until
    // the breakpoint first changes.
    assert_eq!(harness.provider.breakpoint(), Some(768.0));
    assert_eq!(harness.provider.screen_width(), Some(2000.0));
}

fn resize_past_every_threshold_propagates_once() {
    let scope = Scope::new();
    let harness = Harness::new(devices().debounce_resize(false), 500.0);
    let context = harness.provider.provide();
    let runs = subscribe(scope, context.clone());
    assert_eq!(runs.get(), 1);

    harness.viewport.resize(1200.0);

    assert_eq!(context.breakpoint(), None);
    assert_eq!(context.screen_width(), Some(1200.0));
    assert_eq!(runs.get(), 2);
    scope.dispose();
}

fn resize_within_bucket_is_silent() {
    let scope = Scope::new();
    let harness = Harness::new(devices().debounce_resize(false).guessed_breakpoint(500.0), 500.0);
    let context = harness.provider.provide();
    let runs = subscribe(scope, context.clone());

    for width in [500.0, 600.0, 767.0, 480.0] {
        harness.viewport.resize(width);
    }

    assert_eq!(context.breakpoint(), Some(768.0));
    assert_eq!(context.screen_width(), Some(500.0));
    assert_eq!(runs.get(), 1);
    scope.dispose();
}

fn resize_burst_is_debounced() {
    let scope = Scope::new();
    let harness = Harness::new(devices().debounce_delay(Duration::from_millis(50)), 500.0);
    let context = harness.provider.provide();
    let runs = subscribe(scope, context.clone());

    // Ten signals within 10ms, only the last width counts.
    for step in 0..10 {
        let width = if step == 9 { 900.0 } else { 1200.0 };
        harness.viewport.resize(width);
        harness.timers.advance(Duration::from_millis(1));
    }
    assert_eq!(context.breakpoint(), Some(768.0));
    assert_eq!(harness.timers.pending(), 1);

    harness.timers.advance(Duration::from_millis(50));

    assert_eq!(context.breakpoint(), Some(1024.0));
    assert_eq!(context.screen_width(), Some(900.0));
    assert_eq!(runs.get(), 2);
    assert_eq!(harness.timers.pending(), 0);
    scope.dispose();
}

fn orientation_and_load_bypass_debounce() {
    let harness = Harness::new(devices(), 500.0);

    harness.viewport.set_width(Some(300.0));
    harness.viewport.emit(ViewportEvent::OrientationChange);
    assert_eq!(harness.provider.breakpoint(), Some(480.0));

    harness.viewport.set_width(Some(800.0));
    harness.viewport.emit(ViewportEvent::Load);
    assert_eq!(harness.provider.breakpoint(), Some(1024.0));
    assert_eq!(harness.timers.pending(), 0);
}

fn signal_without_width_queries_viewport() {
    let harness = Harness::new(devices().debounce_resize(false), 500.0);

    harness.viewport.set_width(Some(100.0));
    harness
        .viewport
        .dispatch(ViewportSignal::new(ViewportEvent::Resize, None));
    assert_eq!(harness.provider.breakpoint(), Some(480.0));
    assert_eq!(harness.provider.screen_width(), Some(100.0));

    harness.viewport.set_width(None);
    harness
        .viewport
        .dispatch(ViewportSignal::new(ViewportEvent::Resize, None));
    assert_eq!(harness.provider.breakpoint(), Some(480.0));
}

fn unmount_releases_listeners() {
    let scope = Scope::new();
    let harness = Harness::new(devices(), 500.0);
    let context = harness.provider.provide();
    let runs = subscribe(scope, context.clone());
    assert_eq!(harness.viewport.listener_count(), 3);
    for event in ViewportEvent::ALL {
        assert_eq!(harness.viewport.listeners_for(event), 1);
    }

    // A debounced resize still in flight when the provider goes away.
    harness.viewport.resize(2000.0);
    assert_eq!(harness.timers.pending(), 1);

    harness.provider.unmount();
    assert!(!harness.provider.is_mounted());
    assert_eq!(harness.viewport.listener_count(), 0);
    assert_eq!(harness.timers.pending(), 0);

    harness.viewport.resize(100.0);
    harness.viewport.emit(ViewportEvent::OrientationChange);
    harness.viewport.emit(ViewportEvent::Load);
    harness.timers.advance(Duration::from_millis(100));

    assert_eq!(context.breakpoint(), Some(768.0));
    assert_eq!(runs.get(), 1);

    // Unmounting twice is harmless.
    harness.provider.unmount();
    scope.dispose();
}

fn remount_after_unmount() {
    let harness = Harness::new(devices().debounce_resize(false), 500.0);
    harness.provider.mount();
    assert_eq!(harness.viewport.listener_count(), 3);

    harness.provider.unmount();
    harness.provider.mount();
    assert_eq!(harness.viewport.listener_count(), 3);

    harness.viewport.resize(1500.0);
    assert_eq!(harness.provider.breakpoint(), None);
}

fn drop_unmounts() {
    let viewport = Rc::new(HeadlessViewport::new(500.0));
    let timers = Rc::new(ManualTimers::new());
    {
        let provider = match BreakpointProvider::with_viewport(
            devices(),
            ViewportHost::new(viewport.clone(), timers.clone()),
        ) {
            Ok(provider) => provider,
            Err(err) => panic!("{err}"),
        };
        provider.mount();
        viewport.resize(1300.0);
        assert_eq!(viewport.listener_count(), 3);
    }
    assert_eq!(viewport.listener_count(), 0);
    assert_eq!(timers.pending(), 0);
}

fn descendants_read_the_published_context() {
    let harness = Harness::new(devices().debounce_resize(false), 500.0);
    harness.provider.provide();

    let Some(context) = use_breakpoints() else {
        panic!("provider did not publish a context");
    };
    let Some(snapshot) = context.get_untracked() else {
        panic!("published context has no state");
    };
    assert_eq!(snapshot.breakpoint, Some(768.0));
    assert_eq!(snapshot.breakpoint_name(), Some("tablet"));
    let names: Vec<_> = snapshot.breakpoints.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["mobile", "tablet", "desktop"]);

    harness.viewport.resize(200.0);
    assert_eq!(context.breakpoint_name().as_deref(), Some("mobile"));
    assert_eq!(
        context.breakpoints().and_then(|table| table.get("desktop")),
        Some(1024.0)
    );
    // Earlier snapshots are not affected by later changes.
    assert_eq!(snapshot.breakpoint, Some(768.0));
}

fn event_width_wins_over_viewport_query() {
    let harness = Harness::new(devices().debounce_resize(false), 500.0);

    harness.viewport.set_width(Some(300.0));
    harness.viewport.dispatch(ViewportSignal::resize(1200.0));

    assert_eq!(harness.provider.breakpoint(), None);
    assert_eq!(harness.provider.screen_width(), Some(1200.0));
}

fn dropped_provider_leaves_no_context() {
    let harness = Harness::new(devices().debounce_resize(false), 500.0);
    let context = harness.provider.provide();
    assert!(use_breakpoints().is_some());

    drop(harness);

    assert!(use_breakpoints().is_none());
    assert!(!context.is_alive());
    assert_eq!(context.get(), None);
    assert_eq!(context.breakpoint(), None);
    assert_eq!(context.screen_width(), None);
    assert_eq!(context.breakpoint_name(), None);
    assert!(context.breakpoints().is_none());
}

fn loads_from_json_document() {
    let config = match BreakpointConfig::from_json_str(
        r#"{
            "breakpoints": { "mobile": 480, "tablet": 768, "desktop": 1024 },
            "debounceResize": false
        }"#,
    ) {
        Ok(config) => config,
        Err(err) => panic!("{err}"),
    };
    let harness = Harness::new(config, 1100.0);
    assert_eq!(harness.provider.breakpoint(), None);

    harness.viewport.resize(1000.0);
    assert_eq!(harness.provider.breakpoint(), Some(1024.0));
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let scenarios: &[(&str, fn())] = &[
        ("missing_breakpoints_are_rejected", missing_breakpoints_are_rejected),
        ("non_mapping_breakpoints_are_rejected", non_mapping_breakpoints_are_rejected),
        ("server_render_uses_guess", server_render_uses_guess),
        ("default_breakpoint_when_not_guessed", default_breakpoint_when_not_guessed),
        ("live_width_resolves_initial_breakpoint", live_width_resolves_initial_breakpoint),
        (
            "resize_past_every_threshold_propagates_once",
            resize_past_every_threshold_propagates_once,
        ),
        ("resize_within_bucket_is_silent", resize_within_bucket_is_silent),
        ("resize_burst_is_debounced", resize_burst_is_debounced),
        ("orientation_and_load_bypass_debounce", orientation_and_load_bypass_debounce),
        ("signal_without_width_queries_viewport", signal_without_width_queries_viewport),
        ("unmount_releases_listeners", unmount_releases_listeners),
        ("remount_after_unmount", remount_after_unmount),
        ("drop_unmounts", drop_unmounts),
        ("descendants_read_the_published_context", descendants_read_the_published_context),
        ("event_width_wins_over_viewport_query", event_width_wins_over_viewport_query),
        ("dropped_provider_leaves_no_context", dropped_provider_leaves_no_context),
        ("loads_from_json_document", loads_from_json_document),
    ];

    println!("\nrunning {} tests", scenarios.len());
    for (name, scenario) in scenarios {
        scenario();
        println!("test {name} ... ok");
    }
    println!("\ntest result: ok. {} passed\n", scenarios.len());
}
