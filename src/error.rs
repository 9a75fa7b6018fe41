use thiserror::Error;

/// Rejected command-line settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Background colour that is not `RRGGBB`.
    #[error("invalid hex color: {0} (expected RRGGBB, e.g. 1a1b26)")]
    InvalidColor(String),

    /// Numeric option outside its accepted range.
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
