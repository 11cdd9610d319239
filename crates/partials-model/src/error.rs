//! Error types shared by every partials crate.

use thiserror::Error;

/// Result type for partials operations.
pub type PartialsResult<T> = Result<T, PartialsError>;

/// Errors that can occur while configuring or persisting partials components.
///
/// Numeric algorithms never return these once they have started; every
/// parameter is validated when it is set.
#[derive(Debug, Error)]
pub enum PartialsError {
    /// A configuration or call-time parameter is outside its domain.
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Malformed data at the import/export boundary.
    #[error("format error: {message}")]
    Format {
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PartialsError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Returns a stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            PartialsError::InvalidArgument { .. } => "PARTIALS_001",
            PartialsError::Format { .. } => "PARTIALS_002",
            PartialsError::Io(_) => "PARTIALS_003",
        }
    }

    /// Returns true if this is an invalid argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, PartialsError::InvalidArgument { .. })
    }
}

impl From<serde_json::Error> for PartialsError {
    fn from(err: serde_json::Error) -> Self {
        Self::format(err.to_string())
    }
}

/// Validate that a value is finite.
pub fn validate_finite(name: &str, value: f64) -> PartialsResult<()> {
    if !value.is_finite() {
        return Err(PartialsError::invalid_argument(
            name,
            format!("must be finite, got {}", value),
        ));
    }
    Ok(())
}

/// Validate that a value is positive (> 0).
///
/// # Example
/// ```
/// use partials_model::error::validate_positive;
///
/// assert!(validate_positive("hop_time", 0.01).is_ok());
/// assert!(validate_positive("hop_time", 0.0).is_err());
/// ```
pub fn validate_positive(name: &str, value: f64) -> PartialsResult<()> {
    validate_finite(name, value)?;
    if value <= 0.0 {
        return Err(PartialsError::invalid_argument(
            name,
            format!("must be positive, got {}", value),
        ));
    }
    Ok(())
}

/// Validate that a value is non-negative (>= 0).
pub fn validate_non_negative(name: &str, value: f64) -> PartialsResult<()> {
    validate_finite(name, value)?;
    if value < 0.0 {
        return Err(PartialsError::invalid_argument(
            name,
            format!("must be non-negative, got {}", value),
        ));
    }
    Ok(())
}

/// Validate that a value is negative (< 0), as for dB floors.
pub fn validate_negative(name: &str, value: f64) -> PartialsResult<()> {
    validate_finite(name, value)?;
    if value >= 0.0 {
        return Err(PartialsError::invalid_argument(
            name,
            format!("must be negative, got {}", value),
        ));
    }
    Ok(())
}
