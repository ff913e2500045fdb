//! Error types for the OxMP toolchain.
//!
//! Every fallible operation in the reader, the builders and the flattening
//! layer reports one of the kinds below. Read errors carry the location of
//! the offending input and render as `<file>:<line>:<col>: <message>`, which
//! is what a translation driver prints on its error stream before exiting
//! with a non-zero status.

use thiserror::Error;

/// Result type used throughout the toolchain.
pub type Result<T> = std::result::Result<T, NlError>;

/// Position of a token inside an input file.
///
/// Lines and columns are 1-based; column points at the first byte of the
/// token that triggered the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl SourceLocation {
    /// Create a location from 1-based line and column numbers.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Errors produced by the .nl toolchain.
#[derive(Error, Debug)]
pub enum NlError {
    /// Malformed input: bad token, unexpected EOF, wrong opcode for the
    /// context, unknown arithmetic marker, string length violation.
    #[error("{file}:{line}:{column}: {message}")]
    Parse {
        /// Name of the input file (or a stand-in such as `(input)`).
        file: String,
        /// 1-based line of the offending token.
        line: usize,
        /// 1-based column of the offending token.
        column: usize,
        /// Human-readable description of the failure.
        message: String,
    },

    /// Checked integer arithmetic failed while deriving an array size from
    /// header fields.
    #[error("{file}:{line}:{column}: integer overflow")]
    Overflow {
        /// Name of the input file.
        file: String,
        /// 1-based line of the field whose accumulation overflowed.
        line: usize,
        /// 1-based column of that field.
        column: usize,
    },

    /// Valid input that the receiving builder has declared it cannot accept.
    #[error("unsupported: {construct}")]
    Unsupported {
        /// Name of the construct, e.g. `nonlinear objective`.
        construct: String,
    },

    /// An option value outside its documented range.
    #[error("invalid value {value} for option {name}")]
    InvalidOption {
        /// Option name.
        name: String,
        /// The offending value.
        value: i64,
    },

    /// The conversion loop could not make progress on a constraint class the
    /// backend does not accept.
    #[error("cannot rewrite constraint class {class} for this backend")]
    RewriteLimit {
        /// Name of the stuck constraint class.
        class: String,
    },

    /// An underlying I/O failure while reading the input.
    #[error("{file}: {source}")]
    Io {
        /// Name of the input file.
        file: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl NlError {
    /// Create a parse error at the given location.
    #[must_use]
    pub fn parse(file: &str, loc: SourceLocation, message: impl Into<String>) -> Self {
        NlError::Parse {
            file: file.to_string(),
            line: loc.line,
            column: loc.column,
            message: message.into(),
        }
    }

    /// Create an overflow error at the given location.
    #[must_use]
    pub fn overflow(file: &str, loc: SourceLocation) -> Self {
        NlError::Overflow {
            file: file.to_string(),
            line: loc.line,
            column: loc.column,
        }
    }

    /// Create an unsupported-construct error.
    #[must_use]
    pub fn unsupported(construct: impl Into<String>) -> Self {
        NlError::Unsupported {
            construct: construct.into(),
        }
    }

    /// Location of the error, for kinds that carry one.
    #[must_use]
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            NlError::Parse { line, column, .. } | NlError::Overflow { line, column, .. } => {
                Some(SourceLocation::new(*line, *column))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_rendering() {
        let err = NlError::parse("model.nl", SourceLocation::new(12, 3), "expected newline");
        assert_eq!(err.to_string(), "model.nl:12:3: expected newline");
        assert_eq!(err.location(), Some(SourceLocation::new(12, 3)));
    }

    #[test]
    fn test_overflow_rendering() {
        let err = NlError::overflow("in", SourceLocation::new(10, 4));
        assert_eq!(err.to_string(), "in:10:4: integer overflow");
    }

    #[test]
    fn test_unsupported_rendering() {
        let err = NlError::unsupported("logical constraint");
        assert_eq!(err.to_string(), "unsupported: logical constraint");
        assert!(err.location().is_none());
    }

    #[test]
    fn test_invalid_option_rendering() {
        let err = NlError::InvalidOption {
            name: "wantsol".to_string(),
            value: 16,
        };
        assert_eq!(err.to_string(), "invalid value 16 for option wantsol");
    }
}
