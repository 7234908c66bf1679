//! Buffered, position-tracked byte source.
//!
//! [`ByteCursor`] is the lowest layer of the decoder. It wraps any
//! [`io::Read`] in a buffer, counts consumed bytes for error reporting and
//! supports pushing back a single byte, which is all the tokenizer needs to
//! look at the first digit of a byte-string length twice.

use crate::{Error, Result};
use std::io::{self, BufReader, Read};

/// A buffered reader that tracks its offset and supports one byte of pushback.
pub struct ByteCursor<R> {
    reader: BufReader<R>,
    position: u64,
    // last byte returned by `read_byte`, eligible for `unread_byte`
    last: Option<u8>,
    pushed_back: Option<u8>,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(reader: R) -> Self {
        ByteCursor {
            reader: BufReader::new(reader),
            position: 0,
            last: None,
            pushed_back: None,
        }
    }

    /// Offset of the next byte to be read, counted from the start of input.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads one byte, returning `None` at end of input.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if let Some(byte) = self.pushed_back.take() {
            self.position += 1;
            self.last = Some(byte);
            return Ok(Some(byte));
        }

        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.last = None;
                    return Ok(None);
                }
                Ok(_) => {
                    self.position += 1;
                    self.last = Some(buf[0]);
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Pushes back the byte returned by the immediately preceding [`read_byte`].
    ///
    /// Calling this without such a read is a logic error; debug builds panic,
    /// release builds ignore the call.
    ///
    /// [`read_byte`]: ByteCursor::read_byte
    pub fn unread_byte(&mut self) {
        match self.last.take() {
            Some(byte) => {
                self.pushed_back = Some(byte);
                self.position -= 1;
            }
            None => debug_assert!(false, "unread_byte without a preceding read_byte"),
        }
    }

    /// Reads exactly `len` bytes.
    ///
    /// Blocks across partial reads of the underlying source. Input that ends
    /// before `len` bytes arrive, even right away, is a short-read
    /// [`Error::Syntax`].
    pub fn read(&mut self, len: u64) -> Result<Vec<u8>> {
        let start = self.position;
        self.last = None;

        let mut out = Vec::new();
        let mut remaining = len;
        if remaining > 0 {
            if let Some(byte) = self.pushed_back.take() {
                out.push(byte);
                remaining -= 1;
            }
        }

        // `take` keeps a hostile length prefix from reserving memory up front
        (&mut self.reader).take(remaining).read_to_end(&mut out)?;
        self.position = start + out.len() as u64;

        let got = out.len() as u64;
        if got == len {
            Ok(out)
        } else {
            Err(Error::syntax(
                self.position,
                &format!(
                    "short read: byte string declared {} bytes but only {} were available",
                    len, got
                ),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out at most one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((first, rest)) if !buf.is_empty() => {
                    buf[0] = *first;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_read_byte_and_position() {
        let mut cursor = ByteCursor::new(&b"ab"[..]);
        assert_eq!(cursor.read_byte().unwrap(), Some(b'a'));
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_byte().unwrap(), Some(b'b'));
        assert_eq!(cursor.read_byte().unwrap(), None);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_unread_byte_replays_last_byte() {
        let mut cursor = ByteCursor::new(&b"4:spam"[..]);
        assert_eq!(cursor.read_byte().unwrap(), Some(b'4'));
        cursor.unread_byte();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_byte().unwrap(), Some(b'4'));
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_read_includes_pushed_back_byte() {
        let mut cursor = ByteCursor::new(&b"spam"[..]);
        cursor.read_byte().unwrap();
        cursor.unread_byte();
        assert_eq!(cursor.read(4).unwrap(), b"spam".to_vec());
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_read_loops_over_partial_reads() {
        let mut cursor = ByteCursor::new(Trickle(b"hello world"));
        assert_eq!(cursor.read(11).unwrap(), b"hello world".to_vec());
    }

    #[test]
    fn test_read_past_end_is_short_read() {
        let mut cursor = ByteCursor::new(&b""[..]);
        let err = cursor.read(3).unwrap_err();
        assert!(!err.is_eof());
        assert!(err.to_string().contains("only 0 were available"));

        let mut cursor = ByteCursor::new(&b"ab"[..]);
        let err = cursor.read(3).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
        assert!(err.to_string().contains("short read"));
    }

    #[test]
    fn test_read_zero_bytes() {
        let mut cursor = ByteCursor::new(&b""[..]);
        assert_eq!(cursor.read(0).unwrap(), Vec::<u8>::new());
    }
}
