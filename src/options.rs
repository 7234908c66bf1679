//! Configuration options for bencode decoding and encoding.
//!
//! - [`DecodeOptions`]: strictness and nesting limits for the decoder
//! - [`EncodeOptions`]: formatting of values that have no native wire type
//!
//! The defaults accept everything the format's reference decoders accept;
//! [`DecodeOptions::strict`] turns on canonical-form checks.
//!
//! ## Examples
//!
//! ```rust
//! use serde_bencode::{decode_slice_with_options, DecodeOptions};
//!
//! // Leading zeros are tolerated by default...
//! assert!(decode_slice_with_options(b"i007e", &DecodeOptions::new()).is_ok());
//!
//! // ...and rejected in strict mode.
//! assert!(decode_slice_with_options(b"i007e", &DecodeOptions::strict()).is_err());
//! ```

/// Nesting depth accepted by default before the decoder gives up.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Fractional digits used when a float is stringified.
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

/// Configuration options for decoding.
///
/// # Examples
///
/// ```rust
/// use serde_bencode::DecodeOptions;
///
/// let options = DecodeOptions::new()
///     .with_reject_duplicate_keys(true)
///     .with_max_depth(32);
/// assert!(!options.strict_integers);
/// assert_eq!(options.max_depth, 32);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject `-0`, leading zeros in integers and leading zeros in lengths.
    pub strict_integers: bool,
    /// Treat a repeated dictionary key as a syntax error instead of keeping the last value.
    pub reject_duplicate_keys: bool,
    /// Maximum nesting of lists and dictionaries.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            strict_integers: false,
            reject_duplicate_keys: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Creates lenient default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that only accept canonically encoded input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_bencode::DecodeOptions;
    ///
    /// let options = DecodeOptions::strict();
    /// assert!(options.strict_integers);
    /// assert!(options.reject_duplicate_keys);
    /// ```
    #[must_use]
    pub fn strict() -> Self {
        DecodeOptions {
            strict_integers: true,
            reject_duplicate_keys: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_strict_integers(mut self, strict: bool) -> Self {
        self.strict_integers = strict;
        self
    }

    #[must_use]
    pub fn with_reject_duplicate_keys(mut self, reject: bool) -> Self {
        self.reject_duplicate_keys = reject;
        self
    }

    /// Sets the maximum nesting of lists and dictionaries.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Configuration options for encoding.
///
/// Bencode has no float type, so floats are written as fixed-point decimal
/// byte strings with `float_precision` fractional digits.
///
/// # Examples
///
/// ```rust
/// use serde_bencode::{to_string_with_options, EncodeOptions};
///
/// let options = EncodeOptions::new().with_float_precision(2);
/// assert_eq!(to_string_with_options(&3.14159f64, &options).unwrap(), "4:3.14");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub float_precision: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

impl EncodeOptions {
    /// Creates default options (six fractional digits for floats).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = precision;
        self
    }
}
