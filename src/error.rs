//! Error types for bencode encoding, decoding and coercion.
//!
//! Every failure in this crate is reported through the single [`Error`] enum.
//! Decoding errors carry the byte offset at which the problem was detected so
//! malformed input can be located quickly.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: the underlying reader or writer failed
//! - **Syntax Errors**: unexpected bytes, missing terminators, odd-length
//!   dictionaries, non-string keys, negative or short byte strings
//! - **Unexpected End of Input**: the input stopped inside a token or collection
//! - **Unsupported Types**: the encoder met a value with no bencode mapping
//! - **Coercion Errors**: a decoded value could not be converted into the
//!   requested Rust type
//!
//! ## Examples
//!
//! ```rust
//! use serde_bencode::{decode_str, Error};
//!
//! let err = decode_str("d3:bar4:spam3:fooe").unwrap_err();
//! assert!(matches!(err, Error::Syntax { .. }));
//! assert!(err.to_string().contains("odd number of elements"));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding, decoding or
/// coercing bencode data.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed input, reported with the offset of the offending byte
    #[error("Syntax error at byte {offset}: {msg}")]
    Syntax { offset: u64, msg: String },

    /// Input ended inside a token or an unterminated collection
    #[error("Unexpected end of input at byte {offset}: expected {expected}")]
    UnexpectedEof { offset: u64, expected: String },

    /// Unsupported type for encoding
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// No coercion rule exists from the decoded kind to the requested type
    #[error("Cannot coerce {from} into {to}")]
    Coercion { from: String, to: String },

    /// A byte string could not be parsed as the requested numeric type
    #[error("Cannot parse {text:?} as {to}: {msg}")]
    Parse {
        text: String,
        to: String,
        msg: String,
    },

    /// Coercion of a dictionary entry failed
    #[error("field `{field}`: {source}")]
    Field { field: String, source: Box<Error> },

    /// Coercion of a list element failed
    #[error("element {index}: {source}")]
    Element { index: usize, source: Box<Error> },

    /// Custom error raised through serde
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error at the given byte offset.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_bencode::Error;
    ///
    /// let err = Error::syntax(7, "unexpected byte 'x'");
    /// assert!(err.to_string().contains("byte 7"));
    /// ```
    pub fn syntax(offset: u64, msg: &str) -> Self {
        Error::Syntax {
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(offset: u64, expected: &str) -> Self {
        Error::UnexpectedEof {
            offset,
            expected: expected.to_string(),
        }
    }

    /// Creates an unsupported type error for values that have no bencode form.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a coercion error naming the source kind and the destination type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_bencode::Error;
    ///
    /// let err = Error::coercion("list", "i32");
    /// assert_eq!(err.to_string(), "Cannot coerce list into i32");
    /// ```
    pub fn coercion(from: &str, to: &str) -> Self {
        Error::Coercion {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Creates a parse error for text that does not hold the requested number.
    pub fn parse<E: fmt::Display>(text: &str, to: &str, err: E) -> Self {
        Error::Parse {
            text: text.to_string(),
            to: to.to_string(),
            msg: err.to_string(),
        }
    }

    /// Wraps an error raised while coercing the entry stored under `field`.
    pub fn field(field: &str, source: Error) -> Self {
        Error::Field {
            field: field.to_string(),
            source: Box::new(source),
        }
    }

    /// Wraps an error raised while coercing the list element at `index`.
    pub fn element(index: usize, source: Error) -> Self {
        Error::Element {
            index,
            source: Box::new(source),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader or writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` if the input ended before a complete value was read.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::UnexpectedEof { .. })
    }

    /// Returns the byte offset for syntax and end-of-input errors.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::Syntax { offset, .. } | Error::UnexpectedEof { offset, .. } => Some(*offset),
            Error::Field { source, .. } | Error::Element { source, .. } => source.offset(),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_field_errors_name_the_path() {
        let inner = Error::coercion("list", "u16");
        let err = Error::field("spam.mp3", Error::field("length", inner));
        assert_eq!(
            err.to_string(),
            "field `spam.mp3`: field `length`: Cannot coerce list into u16"
        );
    }

    #[test]
    fn test_offset_is_reported_through_wrappers() {
        let err = Error::element(2, Error::syntax(17, "bad"));
        assert_eq!(err.offset(), Some(17));
        assert_eq!(Error::custom("x").offset(), None);
    }

    #[test]
    fn test_io_conversion() {
        let err: Error = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed").into();
        assert!(matches!(err, Error::Io(ref msg) if msg.contains("pipe closed")));
    }
}
