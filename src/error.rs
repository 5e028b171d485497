/// Errors raised while building a [`BreakpointProvider`](crate::BreakpointProvider)
/// from its configuration.
///
/// These are configuration mistakes, so nothing retries them: the provider is
/// never constructed and the caller has to fix the options it passed in.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The `breakpoints` option was omitted or empty.
    #[error("no breakpoints were supplied, pass a mapping of breakpoint names to pixel widths")]
    NoBreakpoints,
    /// The `breakpoints` option is not a mapping of names to positive pixel widths.
    #[error("breakpoints must be a mapping of names to positive pixel widths: {reason}")]
    NotAMapping { reason: String },
    /// The configuration document could not be parsed.
    #[error("invalid breakpoint configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn not_a_mapping(reason: impl Into<String>) -> Self {
        Self::NotAMapping {
            reason: reason.into(),
        }
    }
}
