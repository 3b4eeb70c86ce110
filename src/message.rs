//! The unit of exchange in both directions: one line of text.

use std::fmt;

use memchr::memchr;
use thiserror::Error;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// Every frame on the wire ends with exactly one of these.
pub const DELIMITER: u8 = b'\n';

// -----------------------------------------------------------------------------
// ----- Message ---------------------------------------------------------------

/// Immutable text that never contains [`DELIMITER`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message(String);

impl Message {
    pub fn new(text: impl Into<String>) -> Result<Self, FramingError> {
        let text = text.into();
        check_no_delimiter(&text)?;
        Ok(Self(text))
    }

    /// Wrap a line the reader already split on the delimiter.
    pub(crate) fn from_line(text: String) -> Self {
        debug_assert!(memchr(DELIMITER, text.as_bytes()).is_none());
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Message {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Message {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<String> for Message {
    type Error = FramingError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::new(text)
    }
}

impl TryFrom<&str> for Message {
    type Error = FramingError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::new(text)
    }
}

// -----------------------------------------------------------------------------
// ----- Helpers ---------------------------------------------------------------

#[inline]
pub(crate) fn check_no_delimiter(text: &str) -> Result<(), FramingError> {
    match memchr(DELIMITER, text.as_bytes()) {
        Some(offset) => Err(FramingError::EmbeddedDelimiter { offset }),
        None => Ok(()),
    }
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("message contains a line delimiter at byte {offset}")]
    EmbeddedDelimiter { offset: usize },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
