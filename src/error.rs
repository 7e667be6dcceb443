//! Error types for trazador operations.
//!
//! Detection runs are fail-fast: every error here is fatal to the run and
//! propagates to the caller unrecovered. No retry or degraded-mode paths
//! exist anywhere in the crate.

use std::fmt;

/// Main error type for trazador operations.
///
/// # Examples
///
/// ```
/// use trazador::error::TrazadorError;
///
/// let err = TrazadorError::DimensionMismatch {
///     expected: "10x512".to_string(),
///     actual: "10x256".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum TrazadorError {
    /// A caller-side contract was violated (wrong mode, mismatched counts).
    Precondition {
        /// What was violated
        message: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// A numeric input fell outside its mathematical domain.
    NumericDomain {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// A vector that must be normalized has zero (or non-finite) norm.
    ZeroNorm {
        /// Which vector failed the norm precondition
        what: String,
    },

    /// Iterative numeric procedure failed to converge.
    ConvergenceFailure {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// I/O error (missing checkpoint or carrier file, permission denied).
    Io(std::io::Error),

    /// Invalid or corrupt tensor file.
    FormatError {
        /// Error description
        message: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl TrazadorError {
    /// Convenience constructor for precondition violations.
    pub fn precondition(message: impl Into<String>) -> Self {
        TrazadorError::Precondition {
            message: message.into(),
        }
    }

    /// Convenience constructor for dimension mismatches.
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        TrazadorError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Convenience constructor for domain errors.
    pub fn numeric_domain(
        param: impl Into<String>,
        value: impl fmt::Display,
        constraint: impl Into<String>,
    ) -> Self {
        TrazadorError::NumericDomain {
            param: param.into(),
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }

    /// Convenience constructor for zero-norm failures.
    pub fn zero_norm(what: impl Into<String>) -> Self {
        TrazadorError::ZeroNorm { what: what.into() }
    }

    /// Convenience constructor for tensor-file format errors.
    pub fn format(message: impl Into<String>) -> Self {
        TrazadorError::FormatError {
            message: message.into(),
        }
    }
}

impl fmt::Display for TrazadorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrazadorError::Precondition { message } => {
                write!(f, "Precondition violated: {message}")
            }
            TrazadorError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            TrazadorError::NumericDomain {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Numeric domain error: {param} = {value}, expected {constraint}"
                )
            }
            TrazadorError::ZeroNorm { what } => {
                write!(f, "Cannot normalize zero-norm vector: {what}")
            }
            TrazadorError::ConvergenceFailure { iterations } => {
                write!(f, "Failed to converge after {iterations} iterations")
            }
            TrazadorError::Io(e) => write!(f, "I/O error: {e}"),
            TrazadorError::FormatError { message } => {
                write!(f, "Invalid tensor file: {message}")
            }
            TrazadorError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TrazadorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrazadorError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrazadorError {
    fn from(err: std::io::Error) -> Self {
        TrazadorError::Io(err)
    }
}

impl From<&str> for TrazadorError {
    fn from(msg: &str) -> Self {
        TrazadorError::Other(msg.to_string())
    }
}

impl From<String> for TrazadorError {
    fn from(msg: String) -> Self {
        TrazadorError::Other(msg)
    }
}

impl From<serde_json::Error> for TrazadorError {
    fn from(err: serde_json::Error) -> Self {
        TrazadorError::FormatError {
            message: err.to_string(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TrazadorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dimension_mismatch() {
        let err = TrazadorError::dimension_mismatch("100x512", "100x256");
        let msg = err.to_string();
        assert!(msg.contains("100x512"));
        assert!(msg.contains("100x256"));
    }

    #[test]
    fn test_display_numeric_domain() {
        let err = TrazadorError::numeric_domain("c", 1.5, "[-1, 1]");
        let msg = err.to_string();
        assert!(msg.contains("c = 1.5"));
        assert!(msg.contains("[-1, 1]"));
    }

    #[test]
    fn test_display_zero_norm() {
        let err = TrazadorError::zero_norm("classifier weight row 3");
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: TrazadorError = io_err.into();
        assert!(matches!(err, TrazadorError::Io(_)));
    }

    #[test]
    fn test_from_str() {
        let err: TrazadorError = "matrix dimensions don't match".into();
        assert!(matches!(err, TrazadorError::Other(_)));
    }

    #[test]
    fn test_error_source_io() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing carrier file");
        let err = TrazadorError::Io(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source_other() {
        use std::error::Error;
        let err = TrazadorError::Other("test".to_string());
        assert!(err.source().is_none());
    }
}
