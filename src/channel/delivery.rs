//! channel/delivery.rs
//!
//! Handoff of inbound messages from the read loop to whoever consumes them.
//!
//! A plain closure runs directly on the read loop's task. Consumers that own a
//! single-threaded context (a UI thread, a render loop) take an [`inbox`]
//! instead: the read loop only posts onto a queue and the consumer drains it
//! on its own thread.

use tokio::sync::mpsc;
use tracing::trace;

use crate::message::Message;

// -----------------------------------------------------------------------------
// ----- Delivery --------------------------------------------------------------

/// Receives each inbound message, once, in wire order.
///
/// Called from the read loop's task. Implementations must not block for long;
/// anything slow belongs on the consumer's side of an [`Inbox`].
pub trait Delivery: Send + 'static {
    fn deliver(&mut self, message: Message);
}

impl<F> Delivery for F
where
    F: FnMut(Message) + Send + 'static,
{
    fn deliver(&mut self, message: Message) {
        self(message)
    }
}

// -----------------------------------------------------------------------------
// ----- Inbox -----------------------------------------------------------------

/// Build a queue-backed delivery and the inbox that drains it.
pub fn inbox() -> (QueueDelivery, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueDelivery { tx }, Inbox { rx })
}

/// Posting side, handed to `MessageChannel::start_receiving`.
#[derive(Debug, Clone)]
pub struct QueueDelivery {
    tx: mpsc::UnboundedSender<Message>,
}

impl Delivery for QueueDelivery {
    fn deliver(&mut self, message: Message) {
        if self.tx.send(message).is_err() {
            trace!("inbox dropped; discarding inbound message");
        }
    }
}

/// Draining side, owned by the presentation layer.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl Inbox {
    /// Next message. `None` once the read loop has ended and the queue is empty.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Non-blocking poll for frame-driven consumers.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// For a dedicated non-async thread. Panics if called from inside a Tokio
    /// runtime.
    pub fn blocking_recv(&mut self) -> Option<Message> {
        self.rx.blocking_recv()
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
