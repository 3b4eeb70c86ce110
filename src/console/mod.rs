//! Terminal presentation layer.
//!
//! Stands where the chat window used to: typed lines go out through the
//! channel, inbound messages are drained from an [`Inbox`] on the console's
//! own task and printed one per line.

use std::io;

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout},
    select,
};
use tracing::debug;

use crate::channel::{ChannelError, Inbox, MessageChannel};
use crate::message::{DELIMITER, Message};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const PEER_PREFIX: &str = "peer> ";
const NOTICE_PREFIX: &str = "*** ";

// -----------------------------------------------------------------------------
// ----- Console ---------------------------------------------------------------

#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

/// Why [`Console::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// The user closed input (EOF).
    InputClosed,

    /// The connection is gone and every received message has been shown.
    ChannelClosed,
}

// -----------------------------------------------------------------------------
// ----- Console: Static -------------------------------------------------------

impl Console<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

// -----------------------------------------------------------------------------
// ----- Console: Public -------------------------------------------------------

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Pump input to the channel and the inbox to output until one side ends.
    pub async fn run(&mut self, channel: &MessageChannel, mut inbox: Inbox) -> io::Result<ConsoleExit> {
        // read_until appends on cancellation, so a half-typed line survives
        // an inbound message arriving mid-read.
        let mut pending = Vec::new();

        loop {
            select! {
                biased;

                incoming = inbox.recv() => match incoming {
                    Some(message) => self.render_incoming(&message).await?,
                    None => return self.connection_closed(&mut inbox).await,
                },

                _ = channel.closed() => return self.connection_closed(&mut inbox).await,

                read = self.input.read_until(DELIMITER, &mut pending) => {
                    if read? == 0 && pending.is_empty() {
                        return Ok(ConsoleExit::InputClosed);
                    }

                    let line = String::from_utf8_lossy(&pending).into_owned();
                    pending.clear();

                    let Some(text) = outgoing_text(&line) else {
                        debug!("ignoring empty input");
                        continue;
                    };

                    match channel.send(text).await {
                        Ok(()) => {}
                        Err(ChannelError::SendFailed) => {
                            return self.connection_closed(&mut inbox).await;
                        }
                        Err(e) => self.notice(&e.to_string()).await?,
                    }
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Console: Private ------------------------------------------------------

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Show whatever was received before the close, then the one closure
    /// notice.
    async fn connection_closed(&mut self, inbox: &mut Inbox) -> io::Result<ConsoleExit> {
        while let Some(message) = inbox.try_recv() {
            self.render_incoming(&message).await?;
        }
        self.notice("connection closed").await?;
        Ok(ConsoleExit::ChannelClosed)
    }

    async fn render_incoming(&mut self, message: &Message) -> io::Result<()> {
        self.write_line(PEER_PREFIX, message.as_str()).await
    }

    async fn notice(&mut self, text: &str) -> io::Result<()> {
        self.write_line(NOTICE_PREFIX, text).await
    }

    async fn write_line(&mut self, prefix: &str, text: &str) -> io::Result<()> {
        self.output.write_all(prefix.as_bytes()).await?;
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}

// -----------------------------------------------------------------------------
// ----- Helpers ---------------------------------------------------------------

/// Strip the line ending from typed input. `None` for blank input, which is
/// never sent.
pub fn outgoing_text(line: &str) -> Option<&str> {
    let text = line.strip_suffix('\n').unwrap_or(line);
    let text = text.strip_suffix('\r').unwrap_or(text);

    if text.trim().is_empty() {
        return None;
    }

    Some(text)
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_suppressed() {
        assert_eq!(outgoing_text("\n"), None);
        assert_eq!(outgoing_text("   \r\n"), None);
        assert_eq!(outgoing_text(""), None);
    }

    #[test]
    fn line_ending_is_stripped_but_text_kept() {
        assert_eq!(outgoing_text("hello\n"), Some("hello"));
        assert_eq!(outgoing_text("  padded  \r\n"), Some("  padded  "));
        assert_eq!(outgoing_text("no newline"), Some("no newline"));
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
