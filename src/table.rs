use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;

/// Breakpoint names mapped to pixel widths, in the order the caller supplied them.
///
/// The order matters: [`find_current_breakpoint`](Self::find_current_breakpoint)
/// picks the *first* entry that is wider than the viewport, so a table given in
/// ascending order resolves to the smallest bucket that still fits, while any
/// other order resolves to whichever matching entry comes first. The table is
/// never sorted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BreakpointTable {
    entries: IndexMap<String, f64>,
}

impl BreakpointTable {
    /// Build a table from `(name, pixels)` pairs.
    ///
    /// Later duplicates of a name overwrite the width but keep the position of
    /// the first occurrence.
    pub fn try_from_iter<K, I>(iter: I) -> Result<Self, ConfigError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut entries = IndexMap::new();
        for (name, pixels) in iter {
            let name = name.into();
            check_threshold(&name, pixels)?;
            entries.insert(name, pixels);
        }
        if entries.is_empty() {
            return Err(ConfigError::NoBreakpoints);
        }
        Ok(Self { entries })
    }

    /// Validate a JSON value as a breakpoint table.
    ///
    /// `null` and `{}` count as "no breakpoints"; any other non-object value, or
    /// an object with a non-numeric or non-positive entry, is rejected as not a
    /// mapping.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let object = match value {
            Value::Null => return Err(ConfigError::NoBreakpoints),
            Value::Object(object) => object,
            other => {
                return Err(ConfigError::not_a_mapping(format!(
                    "expected an object, found {}",
                    json_kind(other)
                )));
            }
        };

        let mut pairs = Vec::with_capacity(object.len());
        for (name, pixels) in object {
            let Some(pixels) = pixels.as_f64() else {
                return Err(ConfigError::not_a_mapping(format!(
                    "`{name}` maps to {}, expected a number",
                    json_kind(pixels)
                )));
            };
            pairs.push((name.as_str(), pixels));
        }
        Self::try_from_iter(pairs)
    }

    /// Returns the first threshold, in table order, that is strictly greater
    /// than `width`, or `None` when the viewport is at least as wide as every
    /// entry.
    pub fn find_current_breakpoint(&self, width: f64) -> Option<f64> {
        self.entries
            .values()
            .copied()
            .find(|&pixels| pixels > width)
    }

    /// Name of the first entry whose width equals `pixels`.
    pub fn name_of(&self, pixels: f64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, value)| **value == pixels)
            .map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(name, &pixels)| (name.as_str(), pixels))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a validated table, kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn check_threshold(name: &str, pixels: f64) -> Result<(), ConfigError> {
    if pixels.is_finite() && pixels > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::not_a_mapping(format!(
            "`{name}` maps to {pixels}, expected a positive pixel width"
        )))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
