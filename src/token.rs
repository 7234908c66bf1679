//! Low-level bencode tokenizer.
//!
//! Most callers should decode whole values with [`decode_slice`](crate::decode_slice)
//! or deserialize typed data with [`from_slice`](crate::from_slice). The
//! [`Tokenizer`] is exposed for callers that want to walk a stream themselves.
//!
//! ```rust
//! use serde_bencode::{Delimiter, Token, Tokenizer};
//!
//! let mut tokens = Tokenizer::new(&b"l4:spami42ee"[..]);
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::Delimiter(Delimiter::ListOpen)));
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::ByteString(b"spam".to_vec())));
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::Integer(42)));
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::Delimiter(Delimiter::End)));
//! assert_eq!(tokens.next_token().unwrap(), None);
//! ```

use crate::read::ByteCursor;
use crate::{DecodeOptions, Error, Result};
use std::io::Read;

// Longest integer body accepted before parsing; generous enough for padded input.
const MAX_INTEGER_LEN: usize = 64;

/// A structural byte: the start of a list or dictionary, or the end of one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `l`
    ListOpen,
    /// `d`
    DictOpen,
    /// `e`
    End,
}

impl Delimiter {
    /// The wire byte for this delimiter.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Delimiter::ListOpen => b'l',
            Delimiter::DictOpen => b'd',
            Delimiter::End => b'e',
        }
    }
}

/// One lexical unit of a bencode stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Delimiter(Delimiter),
    Integer(i64),
    ByteString(Vec<u8>),
}

impl Token {
    /// Short human-readable name of the token kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Delimiter(Delimiter::ListOpen) => "list start",
            Token::Delimiter(Delimiter::DictOpen) => "dictionary start",
            Token::Delimiter(Delimiter::End) => "end",
            Token::Integer(_) => "integer",
            Token::ByteString(_) => "byte string",
        }
    }
}

/// Turns a byte stream into a sequence of [`Token`]s.
pub struct Tokenizer<R> {
    cursor: ByteCursor<R>,
    strict_integers: bool,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, &DecodeOptions::default())
    }

    pub fn with_options(reader: R, options: &DecodeOptions) -> Self {
        Tokenizer {
            cursor: ByteCursor::new(reader),
            strict_integers: options.strict_integers,
        }
    }

    /// Offset of the next unread byte.
    #[inline]
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Reads the next token.
    ///
    /// Returns `Ok(None)` when the input is exhausted before the first byte of
    /// a token; running out of input inside a token is an error.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let byte = match self.cursor.read_byte()? {
            Some(byte) => byte,
            None => return Ok(None),
        };

        let token = match byte {
            b'i' => Token::Integer(self.read_integer()?),
            b'l' => Token::Delimiter(Delimiter::ListOpen),
            b'd' => Token::Delimiter(Delimiter::DictOpen),
            b'e' => Token::Delimiter(Delimiter::End),
            b'0'..=b'9' => {
                self.cursor.unread_byte();
                Token::ByteString(self.read_byte_string()?)
            }
            other => {
                return Err(Error::syntax(
                    self.position() - 1,
                    &format!("unexpected byte {}", describe(other)),
                ))
            }
        };

        tracing::trace!(offset = self.position(), kind = token.kind(), "scanned token");
        Ok(Some(token))
    }

    fn read_integer(&mut self) -> Result<i64> {
        let start = self.position();
        let digits = self.read_digits(b'e', "integer")?;

        if self.strict_integers {
            let magnitude = digits.strip_prefix('-').unwrap_or(&digits);
            if magnitude.len() > 1 && magnitude.starts_with('0') {
                return Err(Error::syntax(
                    start,
                    &format!("integer {:?} has leading zeros", digits),
                ));
            }
            if digits == "-0" {
                return Err(Error::syntax(start, "negative zero is not a valid integer"));
            }
        }

        digits
            .parse::<i64>()
            .map_err(|e| Error::syntax(start, &format!("invalid integer {:?}: {}", digits, e)))
    }

    fn read_byte_string(&mut self) -> Result<Vec<u8>> {
        let start = self.position();
        let digits = self.read_digits(b':', "byte string length")?;

        if self.strict_integers && digits.len() > 1 && digits.starts_with('0') {
            return Err(Error::syntax(
                start,
                &format!("byte string length {:?} has leading zeros", digits),
            ));
        }

        let len = digits.parse::<i64>().map_err(|e| {
            Error::syntax(
                start,
                &format!("invalid byte string length {:?}: {}", digits, e),
            )
        })?;
        if len < 0 {
            return Err(Error::syntax(
                start,
                &format!("negative length {} declared for byte string", len),
            ));
        }

        self.cursor.read(len as u64)
    }

    /// Accumulates digits and `-` up to `terminator`.
    fn read_digits(&mut self, terminator: u8, what: &str) -> Result<String> {
        let mut digits = String::new();
        loop {
            match self.cursor.read_byte()? {
                None => {
                    return Err(Error::unexpected_eof(
                        self.position(),
                        &format!("{} terminating {}", describe(terminator), what),
                    ))
                }
                Some(b) if b == terminator => return Ok(digits),
                Some(b) if b.is_ascii_digit() || b == b'-' => {
                    if digits.len() == MAX_INTEGER_LEN {
                        return Err(Error::syntax(
                            self.position() - 1,
                            &format!("{} is longer than {} characters", what, MAX_INTEGER_LEN),
                        ));
                    }
                    digits.push(b as char);
                }
                Some(b) => {
                    return Err(Error::syntax(
                        self.position() - 1,
                        &format!("unexpected byte {} in {}", describe(b), what),
                    ))
                }
            }
        }
    }
}

fn describe(byte: u8) -> String {
    format!("'{}'", byte.escape_ascii())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &[u8]) -> Result<Vec<Token>> {
        let mut tokenizer = Tokenizer::new(input);
        let mut out = Vec::new();
        while let Some(token) = tokenizer.next_token()? {
            out.push(token);
        }
        Ok(out)
    }

    #[test]
    fn test_scalar_tokens() {
        assert_eq!(tokens(b"i42e").unwrap(), vec![Token::Integer(42)]);
        assert_eq!(tokens(b"i-42e").unwrap(), vec![Token::Integer(-42)]);
        assert_eq!(
            tokens(b"4:spam").unwrap(),
            vec![Token::ByteString(b"spam".to_vec())]
        );
        assert_eq!(tokens(b"0:").unwrap(), vec![Token::ByteString(Vec::new())]);
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(
            tokens(b"lde").unwrap(),
            vec![
                Token::Delimiter(Delimiter::ListOpen),
                Token::Delimiter(Delimiter::DictOpen),
                Token::Delimiter(Delimiter::End),
            ]
        );
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let mut tokenizer = Tokenizer::new(&b""[..]);
        assert_eq!(tokenizer.next_token().unwrap(), None);
    }

    #[test]
    fn test_unexpected_byte_reports_offset() {
        let err = tokens(b"i1ex").unwrap_err();
        match err {
            Error::Syntax { offset, msg } => {
                assert_eq!(offset, 3);
                assert!(msg.contains("'x'"));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_byte_inside_integer() {
        let err = tokens(b"i4x2e").unwrap_err();
        assert_eq!(err.offset(), Some(2));
        assert!(err.to_string().contains("in integer"));
    }

    #[test]
    fn test_missing_integer_terminator() {
        let err = tokens(b"i3").unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn test_malformed_integer_bodies() {
        assert!(tokens(b"ie").is_err());
        assert!(tokens(b"i1-2e").is_err());
        assert!(tokens(b"i99999999999999999999e").is_err());
    }

    #[test]
    fn test_short_read() {
        let err = tokens(b"5:spam").unwrap_err();
        assert!(err.to_string().contains("short read"));

        let err = tokens(b"5:").unwrap_err();
        assert!(!err.is_eof());
        assert!(err.to_string().contains("short read"));
    }

    #[test]
    fn test_negative_length_is_rejected() {
        // '-' can only follow a digit, so the length fails to parse
        assert!(tokens(b"1-1:x").is_err());
    }

    #[test]
    fn test_lenient_integers_by_default() {
        assert_eq!(tokens(b"i007e").unwrap(), vec![Token::Integer(7)]);
        assert_eq!(tokens(b"i-0e").unwrap(), vec![Token::Integer(0)]);
        assert_eq!(
            tokens(b"04:spam").unwrap(),
            vec![Token::ByteString(b"spam".to_vec())]
        );
    }

    #[test]
    fn test_strict_integers() {
        let options = DecodeOptions::strict();
        for input in [&b"i007e"[..], &b"i-0e"[..], &b"i-01e"[..], &b"04:spam"[..]] {
            let mut tokenizer = Tokenizer::with_options(input, &options);
            assert!(tokenizer.next_token().is_err(), "{:?} should fail", input);
        }

        let mut tokenizer = Tokenizer::with_options(&b"i0e0:"[..], &options);
        assert_eq!(tokenizer.next_token().unwrap(), Some(Token::Integer(0)));
        assert_eq!(
            tokenizer.next_token().unwrap(),
            Some(Token::ByteString(Vec::new()))
        );
    }

    #[test]
    fn test_overlong_integer_literal() {
        let mut input = b"i".to_vec();
        input.extend(std::iter::repeat(b'0').take(MAX_INTEGER_LEN + 1));
        input.push(b'e');
        assert!(tokens(&input).unwrap_err().to_string().contains("longer than"));
    }
}
