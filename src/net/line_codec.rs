//! net/line_codec.rs
//!
//! Newline framing. One message per line, no length prefix, no escaping.
//! Outbound frames are built whole before they touch the socket so a frame is
//! always written by a single `write_all_buf`.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::message::{DELIMITER, FramingError, Message, check_no_delimiter};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const READ_CAPACITY: usize = 4 * 1024;

// Lines have no length limit: a peer that never sends a delimiter grows
// `LineReader::scratch` without bound.

// -----------------------------------------------------------------------------
// ----- encode_line -----------------------------------------------------------

/// Frame `text` as `text\n`.
pub fn encode_line(text: &str) -> Result<Bytes, FramingError> {
    check_no_delimiter(text)?;

    let mut buf = BytesMut::with_capacity(text.len() + 1);
    buf.put_slice(text.as_bytes());
    buf.put_u8(DELIMITER);

    Ok(buf.freeze())
}

// -----------------------------------------------------------------------------
// ----- LineReader ------------------------------------------------------------

#[derive(Debug)]
pub struct LineReader<R> {
    inner: BufReader<R>,
    scratch: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(READ_CAPACITY, reader),
            scratch: Vec::with_capacity(256),
        }
    }

    /// Read the next line. `Ok(None)` means the peer closed the stream.
    ///
    /// Cancel safe: bytes of a partially read line stay in the scratch buffer
    /// and are picked up by the next call.
    pub async fn read_message(&mut self) -> io::Result<Option<Message>> {
        let n = self.inner.read_until(DELIMITER, &mut self.scratch).await?;
        if n == 0 && self.scratch.is_empty() {
            return Ok(None);
        }

        let text = String::from_utf8_lossy(strip_line_ending(&self.scratch)).into_owned();
        self.scratch.clear();

        Ok(Some(Message::from_line(text)))
    }
}

// -----------------------------------------------------------------------------
// ----- LineWriter ------------------------------------------------------------

#[derive(Debug)]
pub struct LineWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: writer }
    }

    /// Write one encoded frame and flush it to the peer.
    pub async fn write_line(&mut self, mut frame: Bytes) -> io::Result<()> {
        self.inner.write_all_buf(&mut frame).await?;
        self.inner.flush().await
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.inner.shutdown().await
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(&[DELIMITER]).unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
