//! Error types for Matrix Market reading and writing.

use std::fmt;
use std::io;

/// Errors raised while reading or writing Matrix Market data.
#[derive(Debug)]
pub enum MarketError {
    /// The stream is not valid Matrix Market text: missing banner, bad
    /// header token, out-of-bounds coordinate, malformed field, or a body
    /// longer or shorter than the header declares. Carries the 1-based
    /// line number where known.
    InvalidFormat { line: Option<u64>, msg: String },
    /// The file's declared field cannot be represented by the target
    /// storage, e.g. complex values into a real sink.
    IncompatibleValueType(String),
    /// The combination of header, options, and storage is not supported,
    /// e.g. symmetry generalization of a vector file.
    Unsupported(String),
    /// A numeric field does not fit the target value or index type.
    OutOfRange { line: Option<u64>, msg: String },
    /// Underlying stream failure.
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, MarketError>;

impl MarketError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MarketError::InvalidFormat { line: None, msg: msg.into() }
    }

    pub(crate) fn invalid_at(line: u64, msg: impl Into<String>) -> Self {
        MarketError::InvalidFormat { line: Some(line), msg: msg.into() }
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Self {
        MarketError::OutOfRange { line: None, msg: msg.into() }
    }

    /// Attach a 1-based line number if the error does not carry one yet.
    /// Chunks are parsed without knowing their position in the file, so
    /// the absolute line is filled in by whoever does know it.
    pub(crate) fn at_line(mut self, line_num: u64) -> Self {
        match &mut self {
            MarketError::InvalidFormat { line: l @ None, .. }
            | MarketError::OutOfRange { line: l @ None, .. } => *l = Some(line_num),
            _ => {}
        }
        self
    }

    /// The 1-based line number the error refers to, when known.
    pub fn line(&self) -> Option<u64> {
        match self {
            MarketError::InvalidFormat { line, .. } | MarketError::OutOfRange { line, .. } => *line,
            _ => None,
        }
    }
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketError::InvalidFormat { line: Some(l), msg } => write!(f, "line {l}: {msg}"),
            MarketError::InvalidFormat { line: None, msg } => write!(f, "{msg}"),
            MarketError::IncompatibleValueType(msg) => write!(f, "{msg}"),
            MarketError::Unsupported(msg) => write!(f, "{msg}"),
            MarketError::OutOfRange { line: Some(l), msg } => write!(f, "line {l}: {msg}"),
            MarketError::OutOfRange { line: None, msg } => write!(f, "{msg}"),
            MarketError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for MarketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MarketError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MarketError {
    fn from(e: io::Error) -> Self {
        MarketError::Io(e)
    }
}
