use std::{net::SocketAddr, sync::Arc};

use parking_lot::Mutex;
use tokio::{
    net::tcp::{OwnedReadHalf, OwnedWriteHalf},
    select,
    sync::{Mutex as AsyncMutex, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::net::{Connection, LineReader, LineWriter, encode_line};

use super::{ChannelError, ChannelState, CloseReason, Delivery};

// -----------------------------------------------------------------------------
// ----- Types -----------------------------------------------------------------

type Reader = LineReader<OwnedReadHalf>;
type Writer = LineWriter<OwnedWriteHalf>;

// -----------------------------------------------------------------------------
// ----- MessageChannel --------------------------------------------------------

/// Bidirectional line channel over the single accepted connection.
///
/// Cloning yields another handle to the same channel, so several tasks can
/// `send` at once. Frames never interleave: the write half sits behind one
/// async mutex for the whole write-and-flush of a frame.
#[derive(Debug, Clone)]
pub struct MessageChannel {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    peer_addr: SocketAddr,

    // Every transition goes through `send_if_modified`, so exactly one caller
    // wins Idle -> Listening and exactly one wins * -> Closed.
    state: watch::Sender<ChannelState>,
    close_reason: Mutex<Option<CloseReason>>,

    // Present only while Idle. The inbound loop owns it afterwards.
    idle_reader: Mutex<Option<Reader>>,
    writer: AsyncMutex<Option<Writer>>,

    receiver: Mutex<Option<JoinHandle<()>>>,
}

// -----------------------------------------------------------------------------
// ----- MessageChannel: Static ------------------------------------------------

impl MessageChannel {
    pub fn new(connection: Connection) -> Self {
        let peer_addr = connection.peer_addr();
        let (read_half, write_half) = connection.into_split();
        let (state, _) = watch::channel(ChannelState::Idle);

        Self {
            shared: Arc::new(Shared {
                peer_addr,
                state,
                close_reason: Mutex::new(None),
                idle_reader: Mutex::new(Some(LineReader::new(read_half))),
                writer: AsyncMutex::new(Some(LineWriter::new(write_half))),
                receiver: Mutex::new(None),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- MessageChannel: Public ------------------------------------------------

impl MessageChannel {
    /// Spawn the inbound loop and return immediately.
    ///
    /// Each received line is handed to `delivery` exactly once, in arrival
    /// order. The loop ends on end of stream, on a read error, or when the
    /// channel is closed from elsewhere.
    pub fn start_receiving<D: Delivery>(&self, delivery: D) -> Result<(), ChannelError> {
        let mut outcome = Err(ChannelError::Closed);
        self.shared.state.send_if_modified(|state| match *state {
            ChannelState::Idle => {
                *state = ChannelState::Listening;
                outcome = Ok(());
                true
            }
            ChannelState::Listening => {
                outcome = Err(ChannelError::AlreadyReceiving);
                false
            }
            ChannelState::Closed => false,
        });
        outcome?;

        // Teardown may have slipped in between the transition and here.
        let Some(reader) = self.shared.idle_reader.lock().take() else {
            return Err(ChannelError::Closed);
        };

        let handle = tokio::spawn(receive_loop(self.shared.clone(), reader, delivery));
        *self.shared.receiver.lock() = Some(handle);

        debug!("inbound loop started for {}", self.shared.peer_addr);

        Ok(())
    }

    /// Frame `text` with one delimiter and flush it to the peer.
    ///
    /// Text containing the delimiter is rejected before any I/O and leaves the
    /// channel open. Any other failure closes the channel and reports
    /// [`ChannelError::SendFailed`].
    pub async fn send(&self, text: &str) -> Result<(), ChannelError> {
        let frame = encode_line(text)?;
        let frame_len = frame.len();

        if self.shared.is_closed() {
            return Err(ChannelError::SendFailed);
        }

        let mut state_rx = self.shared.state.subscribe();

        let written = {
            let mut guard = select! {
                biased;
                _ = wait_closed(&mut state_rx) => return Err(ChannelError::SendFailed),
                guard = self.shared.writer.lock() => guard,
            };

            let Some(writer) = guard.as_mut() else {
                return Err(ChannelError::SendFailed);
            };

            select! {
                biased;
                _ = wait_closed(&mut state_rx) => return Err(ChannelError::SendFailed),
                res = writer.write_line(frame) => res,
            }
        };

        match written {
            Ok(()) => {
                debug!("sent {frame_len} bytes to {}", self.shared.peer_addr);
                Ok(())
            }
            Err(e) => {
                warn!("send to {} failed: {e}", self.shared.peer_addr);
                self.shared.close(CloseReason::SendFailed).await;
                Err(ChannelError::SendFailed)
            }
        }
    }

    /// Close the channel from any task.
    ///
    /// Returns `true` only for the call that actually ran the teardown. Waits
    /// for the inbound loop to let go of the read half before returning.
    pub async fn shutdown(&self) -> bool {
        let ran = self.shared.close(CloseReason::Shutdown).await;

        let receiver = self.shared.receiver.lock().take();
        if let Some(handle) = receiver {
            if let Err(e) = handle.await {
                warn!("inbound loop for {} ended abnormally: {e}", self.shared.peer_addr);
            }
        }

        ran
    }

    /// Resolves once the channel is closed, for whatever reason.
    pub async fn closed(&self) {
        let mut state_rx = self.shared.state.subscribe();
        wait_closed(&mut state_rx).await;
    }

    pub fn state(&self) -> ChannelState {
        *self.shared.state.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        *self.shared.close_reason.lock()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.shared.peer_addr
    }
}

// -----------------------------------------------------------------------------
// ----- Shared: Teardown ------------------------------------------------------

impl Shared {
    fn is_closed(&self) -> bool {
        self.state.borrow().is_closed()
    }

    /// Exactly-once teardown. Drops an idle reader and shuts down the write
    /// half here. A running loop drops its reader once it sees Closed, so the
    /// socket goes away with whichever half is released last.
    async fn close(&self, reason: CloseReason) -> bool {
        let ran = self.state.send_if_modified(|state| {
            if state.is_closed() {
                return false;
            }
            *state = ChannelState::Closed;
            *self.close_reason.lock() = Some(reason);
            true
        });

        if !ran {
            return false;
        }

        info!("channel with {} closed: {reason}", self.peer_addr);

        // A running loop sees Closed and drops its own reader.
        drop(self.idle_reader.lock().take());

        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer {
            if let Err(e) = writer.shutdown().await {
                debug!("write half of {} already gone: {e}", self.peer_addr);
            }
        }

        true
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Inbound loop ------------------------------------------------

async fn receive_loop<D: Delivery>(shared: Arc<Shared>, mut reader: Reader, mut delivery: D) {
    let mut state_rx = shared.state.subscribe();
    let mut delivered: u64 = 0;

    loop {
        let read = select! {
            biased;
            _ = wait_closed(&mut state_rx) => break,
            read = reader.read_message() => read,
        };

        match read {
            Ok(Some(message)) => {
                if shared.is_closed() {
                    break;
                }

                debug!("received {} bytes from {}", message.as_str().len(), shared.peer_addr);
                delivery.deliver(message);
                delivered += 1;
            }

            Ok(None) => {
                shared.close(CloseReason::PeerClosed).await;
                break;
            }

            Err(e) => {
                warn!("read from {} failed: {e}", shared.peer_addr);
                shared.close(CloseReason::ReadFailed).await;
                break;
            }
        }
    }

    drop(reader);
    debug!(
        "inbound loop for {} exited after {delivered} messages",
        shared.peer_addr
    );
}

async fn wait_closed(state_rx: &mut watch::Receiver<ChannelState>) {
    // The sender lives in `Shared`, which every waiter keeps alive.
    let _ = state_rx.wait_for(ChannelState::is_closed).await;
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::{
        io::{AsyncBufReadExt, BufReader},
        net::TcpStream,
        time::timeout,
    };

    use crate::message::Message;
    use crate::net::ConnectionEndpoint;

    const WAIT: Duration = Duration::from_secs(2);

    async fn connected() -> (MessageChannel, TcpStream) {
        let mut endpoint = ConnectionEndpoint::bind(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        let addr = endpoint.local_addr();

        let (conn, peer) = tokio::join!(endpoint.accept(), TcpStream::connect(addr));
        (MessageChannel::new(conn.unwrap()), peer.unwrap())
    }

    #[tokio::test]
    async fn starts_idle_then_listening() {
        let (channel, _peer) = connected().await;
        assert_eq!(channel.state(), ChannelState::Idle);

        channel.start_receiving(|_m: Message| {}).unwrap();
        assert_eq!(channel.state(), ChannelState::Listening);

        let err = channel.start_receiving(|_m: Message| {}).unwrap_err();
        assert_eq!(err, ChannelError::AlreadyReceiving);
    }

    #[tokio::test]
    async fn start_after_shutdown_is_refused() {
        let (channel, _peer) = connected().await;
        assert!(channel.shutdown().await);

        let err = channel.start_receiving(|_m: Message| {}).unwrap_err();
        assert_eq!(err, ChannelError::Closed);
        assert_eq!(channel.close_reason(), Some(CloseReason::Shutdown));
    }

    #[tokio::test]
    async fn delimiter_is_rejected_without_closing() {
        let (channel, peer) = connected().await;

        let err = channel.send("two\nlines").await.unwrap_err();
        assert_eq!(err, ChannelError::EmbeddedDelimiter { offset: 3 });
        assert!(!channel.is_closed());

        channel.send("fine").await.unwrap();

        let mut lines = BufReader::new(peer).lines();
        let line = timeout(WAIT, lines.next_line()).await.unwrap().unwrap();
        assert_eq!(line.as_deref(), Some("fine"));
    }

    #[tokio::test]
    async fn sends_work_while_idle() {
        let (channel, peer) = connected().await;
        channel.send("before loop").await.unwrap();

        let mut lines = BufReader::new(peer).lines();
        let line = timeout(WAIT, lines.next_line()).await.unwrap().unwrap();
        assert_eq!(line.as_deref(), Some("before loop"));
    }

    #[tokio::test]
    async fn shutdown_releases_the_socket() {
        let (channel, peer) = connected().await;
        channel.start_receiving(|_m: Message| {}).unwrap();

        assert!(channel.shutdown().await);
        assert!(!channel.shutdown().await);

        // peer observes EOF once both halves are gone
        let mut lines = BufReader::new(peer).lines();
        let line = timeout(WAIT, lines.next_line()).await.unwrap().unwrap();
        assert_eq!(line, None);
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
