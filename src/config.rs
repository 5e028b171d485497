use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::{error::ConfigError, table::BreakpointTable};

pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(50);

/// Options for a [`BreakpointProvider`](crate::BreakpointProvider).
///
/// Built with the chained setters below, or deserialized from JSON with the
/// camelCase keys `breakpoints`, `guessedBreakpoint`, `defaultBreakpoint`,
/// `debounceResize` and `debounceDelay` (milliseconds).
///
/// The breakpoint table is only checked when the provider is created, so a
/// document with a malformed table still loads and the problem is reported as
/// [`ConfigError::NotAMapping`].
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "RawConfig")]
pub struct BreakpointConfig {
    pub(crate) breakpoints: Option<Breakpoints>,
    pub(crate) guessed_breakpoint: Option<f64>,
    pub(crate) default_breakpoint: Option<f64>,
    pub(crate) debounce_resize: bool,
    pub(crate) debounce_delay: Duration,
}

#[derive(Clone, Debug)]
pub(crate) enum Breakpoints {
    Table(BreakpointTable),
    Json(Value),
    Invalid(String),
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self {
            breakpoints: None,
            guessed_breakpoint: None,
            default_breakpoint: None,
            debounce_resize: true,
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
        }
    }
}

impl BreakpointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Breakpoint names and their pixel widths, in evaluation order.
    ///
    /// A bad entry is kept and reported by [`validate`](Self::validate).
    pub fn breakpoints<K: Into<String>>(
        mut self,
        pairs: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        self.breakpoints = match BreakpointTable::try_from_iter(pairs) {
            Ok(table) => Some(Breakpoints::Table(table)),
            Err(ConfigError::NotAMapping { reason }) => Some(Breakpoints::Invalid(reason)),
            Err(_) => None,
        };
        self
    }

    /// An already validated table.
    pub fn table(mut self, table: BreakpointTable) -> Self {
        self.breakpoints = Some(Breakpoints::Table(table));
        self
    }

    /// An unchecked JSON value to be validated as a table.
    pub fn breakpoints_value(mut self, value: Value) -> Self {
        self.breakpoints = Some(Breakpoints::Json(value));
        self
    }

    /// Width estimate used before the viewport is measured, e.g. derived from
    /// the user agent during server rendering.
    pub fn guessed_breakpoint(mut self, width: f64) -> Self {
        self.guessed_breakpoint = Some(width);
        self
    }

    /// Width estimate used when no guess was supplied.
    pub fn default_breakpoint(mut self, width: f64) -> Self {
        self.default_breakpoint = Some(width);
        self
    }

    pub fn debounce_resize(mut self, debounce: bool) -> Self {
        self.debounce_resize = debounce;
        self
    }

    pub fn debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// The width the provider starts from: the guess, else the default.
    pub fn initial_width(&self) -> Option<f64> {
        self.guessed_breakpoint.or(self.default_breakpoint)
    }

    /// Validate and return the breakpoint table.
    pub fn validate(&self) -> Result<BreakpointTable, ConfigError> {
        match &self.breakpoints {
            None => Err(ConfigError::NoBreakpoints),
            Some(Breakpoints::Table(table)) => Ok(table.clone()),
            Some(Breakpoints::Json(value)) => BreakpointTable::from_value(value),
            Some(Breakpoints::Invalid(reason)) => Err(ConfigError::not_a_mapping(reason.clone())),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    breakpoints: Option<Value>,
    #[serde(default)]
    guessed_breakpoint: Option<f64>,
    #[serde(default)]
    default_breakpoint: Option<f64>,
    #[serde(default = "default_debounce_resize")]
    debounce_resize: bool,
    #[serde(default = "default_debounce_delay_ms")]
    debounce_delay: u64,
}

fn default_debounce_resize() -> bool {
    true
}

fn default_debounce_delay_ms() -> u64 {
    DEFAULT_DEBOUNCE_DELAY.as_millis() as u64
}

impl From<RawConfig> for BreakpointConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            // `"breakpoints": null` is the same as leaving the key out.
            breakpoints: raw
                .breakpoints
                .filter(|value| !value.is_null())
                .map(Breakpoints::Json),
            guessed_breakpoint: raw.guessed_breakpoint,
            default_breakpoint: raw.default_breakpoint,
            debounce_resize: raw.debounce_resize,
            debounce_delay: Duration::from_millis(raw.debounce_delay),
        }
    }
}
