//! Runtime error types
//!
//! Every fallible runtime operation returns [`RtResult`]; there is no error
//! code path anywhere in the surface. `?` is the unwind mechanism, so at most
//! one error is in flight per instance at any time, and raising while
//! unwinding simply replaces the propagating value.

use crate::value::Value;
use thiserror::Error;

/// Class tag of an error value, one per built-in error constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Generic error (also used for host-side failures such as file I/O)
    Error,
    /// Error in eval-like facilities
    EvalError,
    /// Value out of allowed range (numeric conversions, array lengths)
    RangeError,
    /// Reference to an unresolvable identifier
    ReferenceError,
    /// Malformed source text, raised by the loader
    SyntaxError,
    /// Operation applied to an incompatible value
    TypeError,
    /// Malformed escape sequence in URI handling routines
    URIError,
}

impl ErrorKind {
    /// All kinds, in prototype-registry order.
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::EvalError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::TypeError,
        ErrorKind::URIError,
    ];

    /// The constructor name, as exposed through the `name` property.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::URIError => "URIError",
        }
    }

    /// Stable index into per-kind tables (the error prototype registry).
    pub fn index(self) -> usize {
        match self {
            ErrorKind::Error => 0,
            ErrorKind::EvalError => 1,
            ErrorKind::RangeError => 2,
            ErrorKind::ReferenceError => 3,
            ErrorKind::SyntaxError => 4,
            ErrorKind::TypeError => 5,
            ErrorKind::URIError => 6,
        }
    }
}

/// A failed runtime operation.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Generic error
    #[error("Error: {0}")]
    Generic(String),

    /// Error in eval-like facilities
    #[error("EvalError: {0}")]
    EvalError(String),

    /// Value out of allowed range
    #[error("RangeError: {0}")]
    RangeError(String),

    /// Unresolvable identifier
    #[error("ReferenceError: {0}")]
    ReferenceError(String),

    /// Malformed source text
    #[error("SyntaxError: {0}")]
    SyntaxError(String),

    /// Operation applied to an incompatible value
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Malformed URI escape sequence
    #[error("URIError: {0}")]
    URIError(String),

    /// A script-level `throw` of an arbitrary value.
    ///
    /// The value is carried as-is so a recovery point can put it back on the
    /// operand stack; it need not be an error-class object.
    #[error("uncaught exception")]
    Thrown(Value),
}

impl RuntimeError {
    /// Create a generic error
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create an eval error
    pub fn eval_error(msg: impl Into<String>) -> Self {
        Self::EvalError(msg.into())
    }

    /// Create a range error
    pub fn range_error(msg: impl Into<String>) -> Self {
        Self::RangeError(msg.into())
    }

    /// Create a reference error
    pub fn reference_error(msg: impl Into<String>) -> Self {
        Self::ReferenceError(msg.into())
    }

    /// Create a syntax error
    pub fn syntax_error(msg: impl Into<String>) -> Self {
        Self::SyntaxError(msg.into())
    }

    /// Create a type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a URI error
    pub fn uri_error(msg: impl Into<String>) -> Self {
        Self::URIError(msg.into())
    }

    /// Create an error of the given class.
    pub fn from_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        match kind {
            ErrorKind::Error => Self::Generic(msg.into()),
            ErrorKind::EvalError => Self::EvalError(msg.into()),
            ErrorKind::RangeError => Self::RangeError(msg.into()),
            ErrorKind::ReferenceError => Self::ReferenceError(msg.into()),
            ErrorKind::SyntaxError => Self::SyntaxError(msg.into()),
            ErrorKind::TypeError => Self::TypeError(msg.into()),
            ErrorKind::URIError => Self::URIError(msg.into()),
        }
    }

    /// The error class this value materializes as.
    ///
    /// Thrown non-error values materialize as themselves, but report the
    /// generic class here.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Generic(_) => ErrorKind::Error,
            Self::EvalError(_) => ErrorKind::EvalError,
            Self::RangeError(_) => ErrorKind::RangeError,
            Self::ReferenceError(_) => ErrorKind::ReferenceError,
            Self::SyntaxError(_) => ErrorKind::SyntaxError,
            Self::TypeError(_) => ErrorKind::TypeError,
            Self::URIError(_) => ErrorKind::URIError,
            Self::Thrown(_) => ErrorKind::Error,
        }
    }

    /// The message component, without the class-name prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Generic(m)
            | Self::EvalError(m)
            | Self::RangeError(m)
            | Self::ReferenceError(m)
            | Self::SyntaxError(m)
            | Self::TypeError(m)
            | Self::URIError(m) => m,
            Self::Thrown(_) => "uncaught exception",
        }
    }
}

/// Result type for runtime operations.
pub type RtResult<T> = std::result::Result<T, RuntimeError>;
