//! Error handling for the motion signal pipeline
//!
//! Every failure is local to the operation that raised it. Structural misuse
//! (bad arguments, missing references, unknown handles) aborts the call;
//! data-quality problems during resampling are reported and skipped.

use core::fmt;

/// Result type alias for pipeline operations
pub type MspResult<T> = Result<T, MspError>;

/// Coarse classification of [`MspError`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad frequency, duration, jitter, kernel, or a missing reference
    InvalidArgument,
    /// Window end lies before window start
    InvalidWindow,
    /// Operation needs samples but the series has none
    EmptyData,
    /// A series handle that does not resolve to a series
    NullHandle,
}

/// Error type for all pipeline operations
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MspError {
    /// A caller-supplied parameter is out of range
    InvalidArgument {
        /// Description of the offending argument
        reason: String,
    },

    /// Correlated generation was asked to run without a usable reference
    MissingReference {
        /// Name of the series that was being generated
        series: String,
    },

    /// Requested time window is inverted
    InvalidWindow {
        /// Window start in seconds relative to series start
        start_s: f64,
        /// Window end in seconds relative to series start
        end_s: f64,
    },

    /// Series holds no samples
    EmptyData {
        /// Name of the empty series
        series: String,
    },

    /// Handle does not name a live series
    NullHandle {
        /// Display form of the handle
        handle: String,
    },
}

impl MspError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MspError::InvalidArgument { .. } | MspError::MissingReference { .. } => {
                ErrorKind::InvalidArgument
            }
            MspError::InvalidWindow { .. } => ErrorKind::InvalidWindow,
            MspError::EmptyData { .. } => ErrorKind::EmptyData,
            MspError::NullHandle { .. } => ErrorKind::NullHandle,
        }
    }

    /// Whether the caller can carry on with other series after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidWindow | ErrorKind::EmptyData)
    }
}

impl fmt::Display for MspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MspError::InvalidArgument { reason } => {
                write!(f, "Invalid argument: {}", reason)
            }
            MspError::MissingReference { series } => {
                write!(f, "Invalid argument: series '{}' requires a non-empty reference series",
                       series)
            }
            MspError::InvalidWindow { start_s, end_s } => {
                write!(f, "Invalid window: end {:.6}s is before start {:.6}s",
                       end_s, start_s)
            }
            MspError::EmptyData { series } => {
                write!(f, "Series '{}' has no samples", series)
            }
            MspError::NullHandle { handle } => {
                write!(f, "No series registered for handle {}", handle)
            }
        }
    }
}

impl std::error::Error for MspError {}

/// Convenience macro for creating argument errors
#[macro_export]
macro_rules! invalid_argument {
    ($($arg:tt)+) => {
        $crate::error::MspError::InvalidArgument {
            reason: format!($($arg)+),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MspError::InvalidWindow { start_s: 0.9, end_s: 0.1 };
        let display = format!("{}", error);
        assert!(display.contains("Invalid window"));
        assert!(display.contains("0.100000"));
        assert!(display.contains("0.900000"));
    }

    #[test]
    fn test_missing_reference_is_invalid_argument() {
        let error = MspError::MissingReference { series: "imu".to_string() };
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
        assert!(!error.is_recoverable());
        assert!(error.to_string().contains("imu"));
    }

    #[test]
    fn test_macro_formats_reason() {
        let error = invalid_argument!("frequency must be positive, got {}", -1.0);
        assert_eq!(
            error,
            MspError::InvalidArgument {
                reason: "frequency must be positive, got -1".to_string()
            }
        );
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_data_quality_errors_are_recoverable() {
        assert!(MspError::EmptyData { series: "hip".into() }.is_recoverable());
        assert!(MspError::InvalidWindow { start_s: 1.0, end_s: 0.0 }.is_recoverable());
        assert!(!MspError::NullHandle { handle: "x".into() }.is_recoverable());
    }
}
