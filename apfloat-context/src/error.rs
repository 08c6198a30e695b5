//! Error types surfaced by the context layer.

/// A configuration property was set to a value that fails its validation rule.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration value for `{key}`: {value}")]
pub struct ConfigError {
    /// Name of the offending property, e.g. `"cacheL1Size"`.
    pub key: String,
    /// The value supplied, rendered for diagnostics.
    pub value: String,
}

impl ConfigError {
    /// Construct a `ConfigError` for `key` with a debug rendering of `value`.
    pub fn new(key: impl Into<String>, value: impl core::fmt::Debug) -> Self {
        ConfigError {
            key: key.into(),
            value: format!("{value:?}"),
        }
    }
}
